pub mod error;
pub mod grappa;
pub mod cs_table;
pub mod summary;
