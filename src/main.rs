use anyhow::Result;
use clap::Parser;
use usage_timer::{
    config::Config,
    daemon::{args::DaemonArgs, start_daemon},
    utils::{
        dir::create_application_default_path, logging::enable_logging,
        runtime::single_thread_runtime,
    },
};

fn main() -> Result<()> {
    let args = DaemonArgs::parse();

    if args.detach {
        #[cfg(unix)]
        {
            use daemonize::Daemonize;

            let daemonize = Daemonize::new()
                .stdout(daemonize::Stdio::devnull())
                .stderr(daemonize::Stdio::devnull())
                .execute();
            match daemonize {
                daemonize::Outcome::Parent(parent) => {
                    parent?;
                    println!("Detached usage-timer");
                    return Ok(());
                }
                daemonize::Outcome::Child(child) => {
                    child?;
                }
            }
        }
        #[cfg(not(unix))]
        eprintln!("--detach is only supported on unix, staying in the foreground");
    }

    run(args)
}

fn run(args: DaemonArgs) -> Result<()> {
    let app_dir = args.dir.clone().map_or_else(create_application_default_path, Ok)?;
    enable_logging(&app_dir.join("logs"), args.log, args.log_console)?;

    let mut config = Config::load(args.config.as_deref());
    args.apply_to(&mut config);

    single_thread_runtime()?.block_on(async move { start_daemon(config).await })?;
    Ok(())
}
