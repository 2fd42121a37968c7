//! Settings of the application. Built-in defaults are overridden by TOML files, see [loader] for
//! the order and the fallback rules.

pub mod loader;

use std::{path::PathBuf, time::Duration};

use crate::{
    display::Size,
    utils::{dir::expand_home, time::DayBoundary},
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub general: GeneralConfig,
    pub window: WindowConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneralConfig {
    /// Name of the process whose usage is tracked.
    pub process_name: String,
    pub data_file: PathBuf,
    pub tick_interval: Duration,
    pub save_interval: Duration,
    pub reposition_interval: Duration,
    pub log_interval: Duration,
    /// Gaps between ticks longer than this are treated as the machine sleeping.
    pub suspend_threshold: Duration,
    pub day_boundary: DayBoundary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub screen_width: u32,
    pub screen_height: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            process_name: "firefox".into(),
            data_file: expand_home(&PathBuf::from("~/.local/share/firefox_usage_timer.json")),
            tick_interval: Duration::from_millis(1000),
            save_interval: Duration::from_secs(10),
            reposition_interval: Duration::from_secs(30 * 60),
            log_interval: Duration::from_secs(60),
            suspend_threshold: Duration::from_secs(5),
            day_boundary: DayBoundary::Local,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Firefox Usage Today".into(),
            width: 200,
            height: 80,
            screen_width: 1920,
            screen_height: 1080,
        }
    }
}

impl WindowConfig {
    pub fn window_size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    pub fn screen_size(&self) -> Size {
        Size {
            width: self.screen_width,
            height: self.screen_height,
        }
    }
}
