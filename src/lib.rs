// Library root: re-exports all modules so integration tests and external
// consumers can access the crate's public API.

pub mod broadcast;
pub mod config;
pub mod csv_io;
pub mod draft;
pub mod stats;
pub mod store;
