pub mod file;
pub mod table;

pub use table::{Column, Table};

use crate::query::QueryErr;
use std::fmt;
use std::str::FromStr;

#[repr(u8)]
#[derive(PartialEq, Eq, Hash, Clone, Debug, Copy)]
pub enum DataType {
    Int = 11,
    Float = 12,
    Bool = 13,
    String = 14,
}

impl DataType {
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Int => "INT",
            DataType::Float => "FLOAT",
            DataType::Bool => "BOOL",
            DataType::String => "STRING",
        }
    }

    /// Whether the whole of `value` is a literal of this type.
    ///
    /// `"123"` is an INT, `"123abc"` and `""` are not.
    pub fn accepts(self, value: &str) -> bool {
        match self {
            DataType::Int => value.parse::<i64>().is_ok(),
            DataType::Float => value.parse::<f64>().is_ok(),
            DataType::Bool => {
                value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false")
            }
            DataType::String => true,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = QueryErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INT" => Ok(DataType::Int),
            "FLOAT" => Ok(DataType::Float),
            "BOOL" => Ok(DataType::Bool),
            "STRING" | "TEXT" => Ok(DataType::String),
            _ => Err(QueryErr::UnknownType(s.to_string())),
        }
    }
}
