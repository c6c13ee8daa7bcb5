pub mod mysql;
pub mod queries;
pub mod sqlite;
pub mod value;

pub use mysql::*;
pub use sqlite::*;
pub use value::*;

use crate::error::Result;

/// Anything that can run a SELECT and hand back every row.
///
/// Calls block until the full result set is available.
pub trait DataSource {
    fn query(&mut self, sql: &str) -> Result<Vec<Row>>;
}

impl<T: DataSource + ?Sized> DataSource for &mut T {
    fn query(&mut self, sql: &str) -> Result<Vec<Row>> {
        (**self).query(sql)
    }
}

impl<T: DataSource + ?Sized> DataSource for Box<T> {
    fn query(&mut self, sql: &str) -> Result<Vec<Row>> {
        (**self).query(sql)
    }
}
