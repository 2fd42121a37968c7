use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use toml::{Table, Value};
use tracing::{debug, info, warn};

use crate::utils::{
    dir::{config_layer_paths, expand_home},
    time::DayBoundary,
};

use super::{Config, GeneralConfig};

impl Config {
    /// Loads built-in defaults, then the system-wide file, then the user file, then `extra`.
    pub fn load(extra: Option<&Path>) -> Self {
        let mut paths = config_layer_paths();
        paths.extend(extra.map(Path::to_path_buf));
        Self::load_from(&paths)
    }

    /// Applies every file in `paths` on top of the defaults, later files winning. Files that don't
    /// exist or aren't valid TOML are skipped.
    pub fn load_from(paths: &[PathBuf]) -> Self {
        let mut config = Config::default();
        for path in paths {
            match read_layer(path) {
                Ok(Some(table)) => {
                    info!("Applying configuration from {path:?}");
                    config.apply(&table, path);
                }
                Ok(None) => debug!("No configuration at {path:?}"),
                Err(e) => warn!("Skipping configuration {path:?}: {e:?}"),
            }
        }
        config.general.widen_suspend_threshold();
        config
    }

    /// Overrides every key `table` sets correctly. Keys with a wrong type or value keep the
    /// current value.
    pub fn apply(&mut self, table: &Table, source: &Path) {
        if let Some(general) = section(table, "general", source) {
            let layer = Layer {
                section: general,
                name: "general",
                source,
            };
            let target = &mut self.general;
            if let Some(v) = layer.read("process_name", non_empty_string) {
                target.process_name = v;
            }
            if let Some(v) = layer.read("data_file", non_empty_string) {
                target.data_file = expand_home(Path::new(&v));
            }
            if let Some(v) = layer.read("tick_interval_ms", positive_u64) {
                target.tick_interval = Duration::from_millis(v);
            }
            if let Some(v) = layer.read("save_interval_s", positive_u64) {
                target.save_interval = Duration::from_secs(v);
            }
            if let Some(v) = layer.read("reposition_interval_s", positive_u64) {
                target.reposition_interval = Duration::from_secs(v);
            }
            if let Some(v) = layer.read("log_interval_s", positive_u64) {
                target.log_interval = Duration::from_secs(v);
            }
            if let Some(v) = layer.read("suspend_threshold_s", positive_u64) {
                target.suspend_threshold = Duration::from_secs(v);
            }
            if let Some(v) = layer.read("day_boundary", |v| v.as_str()?.parse::<DayBoundary>().ok()) {
                target.day_boundary = v;
            }
        }

        if let Some(window) = section(table, "window", source) {
            let layer = Layer {
                section: window,
                name: "window",
                source,
            };
            let target = &mut self.window;
            if let Some(v) = layer.read("title", non_empty_string) {
                target.title = v;
            }
            if let Some(v) = layer.read("width", positive_u32) {
                target.width = v;
            }
            if let Some(v) = layer.read("height", positive_u32) {
                target.height = v;
            }
            if let Some(v) = layer.read("screen_width", positive_u32) {
                target.screen_width = v;
            }
            if let Some(v) = layer.read("screen_height", positive_u32) {
                target.screen_height = v;
            }
        }
    }
}

impl GeneralConfig {
    /// Every regular tick would look like a suspend if the threshold isn't longer than the tick
    /// interval, and nothing would ever be counted.
    fn widen_suspend_threshold(&mut self) {
        if self.suspend_threshold > self.tick_interval {
            return;
        }
        let widened = self.tick_interval * 2 + GeneralConfig::default().suspend_threshold;
        warn!(
            "Suspend threshold {:?} isn't longer than the tick interval {:?}, using {widened:?}",
            self.suspend_threshold, self.tick_interval
        );
        self.suspend_threshold = widened;
    }
}

/// Returns `None` if the file doesn't exist.
fn read_layer(path: &Path) -> Result<Option<Table>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(v) => v,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("Can't read {path:?}")),
    };
    let table = contents
        .parse::<Table>()
        .with_context(|| format!("Can't parse {path:?}"))?;
    Ok(Some(table))
}

fn section<'a>(table: &'a Table, name: &str, source: &Path) -> Option<&'a Table> {
    match table.get(name)? {
        Value::Table(v) => Some(v),
        other => {
            warn!("Section {name} in {source:?} should be a table, found {other}");
            None
        }
    }
}

struct Layer<'a> {
    section: &'a Table,
    name: &'a str,
    source: &'a Path,
}

impl Layer<'_> {
    fn read<T>(&self, key: &str, parse: impl FnOnce(&Value) -> Option<T>) -> Option<T> {
        let value = self.section.get(key)?;
        let parsed = parse(value);
        if parsed.is_none() {
            warn!(
                "Ignoring invalid value {value} for {}.{key} in {:?}",
                self.name, self.source
            );
        }
        parsed
    }
}

fn non_empty_string(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

fn positive_u64(value: &Value) -> Option<u64> {
    value
        .as_integer()
        .filter(|v| *v > 0)
        .and_then(|v| u64::try_from(v).ok())
}

fn positive_u32(value: &Value) -> Option<u32> {
    positive_u64(value).and_then(|v| u32::try_from(v).ok())
}
