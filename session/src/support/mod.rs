// Shared support modules

mod lazy_file_writer;
pub mod tracing;
