use std::path::PathBuf;

use clap::Parser;
use tracing::level_filters::LevelFilter;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "usage-timer", version, long_about = None)]
#[command(about = "Keeps track of how long an application has been running today")]
pub struct DaemonArgs {
    /// Extra configuration file, applied on top of the system and user ones.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Name of the process to track. Overrides the configuration.
    #[arg(long)]
    pub process: Option<String>,
    /// Where today's usage is saved. Overrides the configuration.
    #[arg(long = "data-file")]
    pub data_file: Option<PathBuf>,
    #[arg(
        long,
        help = "Directory for logs. By default $XDG_STATE_HOME/usage-timer or $HOME/.local/state/usage-timer"
    )]
    pub dir: Option<PathBuf>,
    /// Detach from the terminal and keep running in the background.
    #[arg(long)]
    pub detach: bool,
    /// This option is for debugging purposes only.
    #[arg(long = "log-console")]
    pub log_console: bool,
    #[arg(long = "log-filter")]
    pub log: Option<LevelFilter>,
}

impl DaemonArgs {
    /// Command line options win over every configuration file.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(process) = self.process.as_ref().filter(|v| !v.is_empty()) {
            config.general.process_name = process.clone();
        }
        if let Some(data_file) = &self.data_file {
            config.general.data_file = data_file.clone();
        }
    }
}
