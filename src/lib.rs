//! Keeps a timer on screen while a chosen application runs and remembers how long it has been
//! running today. Usage survives restarts within a day, resets at midnight and doesn't grow while
//! the machine sleeps.
//!

pub mod config;
pub mod daemon;
pub mod display;
pub mod process_api;
pub mod utils;
