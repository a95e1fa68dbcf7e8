//! Path utilities.

pub mod fs;

pub use fs::{collect_files, copy_file, join_key, normalize_path, relative_key, write_file};
