use crate::common::{
    footprint::{Line, Module},
    Vec2D,
};

/// An axis aligned rectangle centred on the origin
#[derive(Debug, PartialEq, Clone)]
pub struct Rectangle {
    pub size: Vec2D,
    /// Corners, counter-clockwise from the bottom left
    pub vertices: [Vec2D; 4],
}

impl Rectangle {
    pub fn new(size: Vec2D) -> Self {
        let (half_width, half_height) = (size.x / 2.0, size.y / 2.0);

        Self {
            size,
            vertices: [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)]
                .map(|(x, y)| Vec2D::new(x * half_width, y * half_height)),
        }
    }

    /// One line per edge, closing back onto the first corner
    pub fn to_lines(&self, layer: &str) -> Vec<Line> {
        self.vertices
            .iter()
            .zip(self.vertices.iter().cycle().skip(1))
            .map(|(start, end)| Line::new(*start, *end, layer))
            .collect()
    }
}

/// A rectangle the size of the box spanned by the module's lines and the
/// origin
pub fn module_boundary(module: &Module) -> Rectangle {
    let (mut min, mut max) = (Vec2D::default(), Vec2D::default());

    for point in module.lines.iter().flat_map(|line| [line.start, line.end]) {
        min.x = min.x.min(point.x);
        min.y = min.y.min(point.y);
        max.x = max.x.max(point.x);
        max.y = max.y.max(point.y);
    }

    Rectangle::new(Vec2D::new(max.x - min.x, max.y - min.y))
}

/// Adds the outline of [`module_boundary`] to the module's lines
pub fn draw_boundary(module: &mut Module, layer: &str) {
    let lines = module_boundary(module).to_lines(layer);
    module.lines.extend(lines);
}
