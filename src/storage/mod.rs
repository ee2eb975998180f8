//! File system access
//!
//! Maps requested paths onto the server root.

pub mod validation;

pub use validation::resolve_file_path;
