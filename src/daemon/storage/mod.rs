//!  Storage keeps a single JSON file with the usage of the current day.
//!   - The file is overwritten as a whole, through a temporary file and a rename.
//!   - A file written on another day is ignored on startup.

pub mod entities;
pub mod usage_storage;
