use std::fmt;

/// Column type. Every column declares exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Int,
    Text,
}

impl DataType {
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Int => "int",
            DataType::Text => "str",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
