use std::fmt;

/// A dense two dimensional grid addressed by signed coordinates.
///
/// The grid starts out empty and grows in whichever direction a value is
/// placed, so cells can be laid out around the origin without knowing the
/// extent up front.
#[derive(Debug, PartialEq, Clone)]
pub struct Grid<T> {
    /// Indexed `[x][y]`, every column is `height` cells tall
    columns: Vec<Vec<Option<T>>>,
    height: usize,
    /// Index of coordinate `(0, 0)`
    origin: (usize, usize),
}

impl<T> Default for Grid<T> {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            height: 0,
            origin: (0, 0),
        }
    }
}

impl<T> Grid<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of columns and rows
    pub fn size(&self) -> (usize, usize) {
        (self.columns.len(), self.height)
    }

    /// Stores `value` at `at`, growing the grid to cover it. Returns the value
    /// previously stored there.
    pub fn place(&mut self, at: (i64, i64), value: T) -> Option<T> {
        let (x, y) = self.index(at);

        if x < 0 {
            let extra = x.unsigned_abs() as usize;
            let height = self.height;
            self.columns
                .splice(0..0, (0..extra).map(|_| empty_column(height)));
            self.origin.0 += extra;
        }

        if y < 0 {
            let extra = y.unsigned_abs() as usize;
            for column in &mut self.columns {
                column.splice(0..0, (0..extra).map(|_| None));
            }
            self.height += extra;
            self.origin.1 += extra;
        }

        let (x, y) = self.index(at);
        let (x, y) = (x as usize, y as usize);

        if y >= self.height {
            self.height = y + 1;
            for column in &mut self.columns {
                column.resize_with(self.height, || None);
            }
        }

        if x >= self.columns.len() {
            let height = self.height;
            self.columns.resize_with(x + 1, || empty_column(height));
        }

        self.columns[x][y].replace(value)
    }

    pub fn get(&self, at: (i64, i64)) -> Option<&T> {
        let (x, y) = self.index(at);
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;

        self.columns.get(x)?.get(y)?.as_ref()
    }

    /// Every occupied cell with its coordinates, column by column
    pub fn iter(&self) -> impl Iterator<Item = ((i64, i64), &T)> + '_ {
        let (origin_x, origin_y) = (self.origin.0 as i64, self.origin.1 as i64);

        self.columns.iter().enumerate().flat_map(move |(x, column)| {
            column.iter().enumerate().filter_map(move |(y, cell)| {
                let at = (x as i64 - origin_x, y as i64 - origin_y);
                cell.as_ref().map(|value| (at, value))
            })
        })
    }

    fn index(&self, (x, y): (i64, i64)) -> (i64, i64) {
        (self.origin.0 as i64 + x, self.origin.1 as i64 + y)
    }
}

fn empty_column<T>(height: usize) -> Vec<Option<T>> {
    (0..height).map(|_| None).collect()
}

/// Renders the grid as a table with the highest row first
impl<T: fmt::Display> fmt::Display for Grid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..self.height).rev() {
            f.write_str("|")?;

            for column in &self.columns {
                match &column[y] {
                    Some(value) => write!(f, " {:>5} |", value.to_string())?,
                    None => write!(f, " {:>5} |", "")?,
                }
            }

            writeln!(f)?;
        }

        Ok(())
    }
}
