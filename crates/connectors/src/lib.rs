pub mod adapter;
pub mod error;
pub mod file;
pub mod source;
pub mod sql;
