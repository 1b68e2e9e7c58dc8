pub mod datatype;
pub mod value;
mod row;

pub use row::{Filter, Row};
