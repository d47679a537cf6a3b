//! Renderers over a filled store and its schema plan.

pub mod ddl;
pub mod rows;

pub use ddl::{parse_table_definitions, table_definitions, TableDefinition};
pub use rows::TableWriter;
