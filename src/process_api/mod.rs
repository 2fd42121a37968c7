//! Answers whether the tracked application is running. [ProcessMonitor] is the seam the tracking
//! module depends on, [system::SystemProcessMonitor] is the implementation backed by the process
//! table.

pub mod system;

use anyhow::Result;

/// Intended to serve as a contract every way of detecting the target process must implement.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessMonitor {
    /// Returns whether the target process is running right now. Errors mean the system couldn't be
    /// queried, which callers treat as "not running".
    fn is_running(&mut self) -> Result<bool>;
}
