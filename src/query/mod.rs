pub mod error;
pub mod lexer;
pub mod parser;

pub use error::QueryErr;
pub use lexer::{Lexer, Operator, Token};
pub use parser::{
    AlterAction, ColumnDefinition, Condition, Logical, Parser, Query, Stmt, TableDefinition,
};
