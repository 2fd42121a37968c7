use anyhow::{bail, Result};
use sysinfo::{get_current_pid, Pid, ProcessesToUpdate, System};
use tracing::trace;

use super::ProcessMonitor;

/// Looks the target up in the process table on every call.
pub struct SystemProcessMonitor {
    system: System,
    target: String,
    current_pid: Option<Pid>,
}

impl SystemProcessMonitor {
    pub fn new(target: &str) -> Self {
        Self {
            system: System::new(),
            target: target.to_lowercase(),
            current_pid: get_current_pid().ok(),
        }
    }
}

/// Matches the way `pgrep <name>` does: any process whose name contains the target.
pub fn matches_target(process_name: &str, target: &str) -> bool {
    !target.is_empty() && process_name.to_lowercase().contains(&target.to_lowercase())
}

impl ProcessMonitor for SystemProcessMonitor {
    fn is_running(&mut self) -> Result<bool> {
        self.system.refresh_processes(ProcessesToUpdate::All, true);

        let processes = self.system.processes();
        if processes.is_empty() {
            bail!("Process table is empty, can't tell whether {} runs", self.target);
        }

        let found = processes
            .iter()
            .filter(|(pid, _)| Some(**pid) != self.current_pid)
            .find(|(_, process)| matches_target(&process.name().to_string_lossy(), &self.target));

        if let Some((pid, process)) = found {
            trace!("Found {} as {:?} with pid {pid}", self.target, process.name());
        }
        Ok(found.is_some())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use crate::process_api::ProcessMonitor;

    use super::{matches_target, SystemProcessMonitor};

    #[test]
    fn test_matches_target() {
        assert!(matches_target("firefox", "firefox"));
        assert!(matches_target("firefox-bin", "firefox"));
        assert!(matches_target("Firefox", "firefox"));
        assert!(!matches_target("chromium", "firefox"));
        assert!(!matches_target("firefox", ""));
        assert!(matches_target("firefox-bin", "Firefox"));
        assert!(matches_target("FIREFOX", "FireFox"));
    }

    #[test]
    fn test_missing_process_is_not_running() -> Result<()> {
        let mut monitor = SystemProcessMonitor::new("definitely-not-a-real-process-name-0451");
        assert!(!monitor.is_running()?);
        Ok(())
    }
}
