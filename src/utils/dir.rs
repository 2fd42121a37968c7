use std::{
    env, io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

pub const APPLICATION_NAME: &str = "usage-timer";
pub const CONFIG_FILE_NAME: &str = "config.toml";

fn home_dir() -> Result<PathBuf> {
    cfg_if::cfg_if! {
        if #[cfg(windows)] {
            env::var("USERPROFILE").map(PathBuf::from).context("USERPROFILE is not set")
        } else {
            env::var("HOME").map(PathBuf::from).context("HOME is not set")
        }
    }
}

/// Directory for logs. Uses $XDG_STATE_HOME or $HOME/.local/state on linux and %APPDATA% on
/// windows.
pub fn create_application_default_path() -> Result<PathBuf> {
    let mut path = {
        cfg_if::cfg_if! {
            if #[cfg(windows)] {
                env::var("APPDATA").map(PathBuf::from).context("APPDATA is not set")?
            } else {
                env::var("XDG_STATE_HOME")
                    .map(PathBuf::from)
                    .or_else(|_| home_dir().map(|home| home.join(".local/state")))
                    .context("Couldn't find neither XDG_STATE_HOME nor HOME")?
            }
        }
    };
    path.push(APPLICATION_NAME);

    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v).with_context(|| format!("Can't create application directory {path:?}")),
    }
}

/// Configuration files in the order they are applied. Later files override earlier ones.
pub fn config_layer_paths() -> Vec<PathBuf> {
    let mut paths = vec![];

    #[cfg(unix)]
    paths.push(Path::new("/etc").join(APPLICATION_NAME).join(CONFIG_FILE_NAME));

    let user_dir = {
        cfg_if::cfg_if! {
            if #[cfg(windows)] {
                env::var("APPDATA").map(PathBuf::from).ok()
            } else {
                env::var("XDG_CONFIG_HOME")
                    .map(PathBuf::from)
                    .ok()
                    .or_else(|| home_dir().ok().map(|home| home.join(".config")))
            }
        }
    };
    if let Some(dir) = user_dir {
        paths.push(dir.join(APPLICATION_NAME).join(CONFIG_FILE_NAME));
    }

    paths
}

/// Replaces a leading `~` with the home directory. Paths without one are returned as is.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match home_dir() {
            Ok(home) => home.join(rest),
            Err(_) => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
