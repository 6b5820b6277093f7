use crate::Node;

/// The value of one attribute of a [`Node`]
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Int(i64),
    Text(String),
    Bool(bool),
    List(Vec<Value>),
    Node(Box<Node>),
}

macro_rules! value_as {
    ($fn_name:ident, $return_type:ty, $variant:ident) => {
        pub fn $fn_name(&self) -> Option<&$return_type> {
            if let Value::$variant(value) = self {
                Some(value)
            } else {
                None
            }
        }
    };
}

macro_rules! value_take {
    ($fn_name:ident, $return_type:ty, $variant:ident) => {
        pub fn $fn_name(self) -> Option<$return_type> {
            if let Value::$variant(value) = self {
                Some(value)
            } else {
                None
            }
        }
    };
}

impl Value {
    value_as!(as_text, str, Text);
    value_as!(as_list, [Value], List);
    value_as!(as_node, Node, Node);

    value_take!(take_text, String, Text);
    value_take!(take_list, Vec<Value>, List);
    value_take!(take_node, Box<Node>, Node);

    /// Numbers and integers both read as `f64`
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The elements of a list, or the value itself as the only element.
    ///
    /// A field that occurred once holds a scalar and one that occurred
    /// several times holds a list; this reads both the same way.
    pub fn as_slice(&self) -> &[Value] {
        match self {
            Value::List(items) => items,
            value => std::slice::from_ref(value),
        }
    }

    /// Element `index` of [`Self::as_slice`]
    ///
    /// ```
    /// use kicad_schema::Value;
    ///
    /// assert_eq!(Value::from(0.8).get(0), Some(&Value::Number(0.8)));
    /// assert_eq!(Value::from(vec![0.6, 0.8]).get(1), Some(&Value::Number(0.8)));
    /// assert_eq!(Value::from(0.8).get(1), None);
    /// ```
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.as_slice().get(index)
    }

    /// Every element as a number, if all of them are numbers
    pub fn to_numbers(&self) -> Option<Vec<f64>> {
        self.as_slice().iter().map(Value::as_number).collect()
    }

    /// Every element as text, if all of them are text
    pub fn to_texts(&self) -> Option<Vec<String>> {
        self.as_slice()
            .iter()
            .map(|v| v.as_text().map(str::to_string))
            .collect()
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Node> for Value {
    fn from(value: Node) -> Self {
        Value::Node(Box::new(value))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(value: [T; N]) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}
