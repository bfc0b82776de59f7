//! Concrete adapter implementations for ports.

pub mod best_result_file;
pub mod csv_adapter;
pub mod file_config_adapter;
