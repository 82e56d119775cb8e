//! gpiosim - command line control of gpio-sim GPIO simulators
//!
//! Takes simulators live from a description given on the command line or in
//! a TOML file, and drives the lines of live simulators from the kernel side.
//!
//! ```bash
//! # Two chips, live until Enter is pressed
//! gpiosim run --name demo --bank left:lines=8,name=3/LED0 --bank right:lines=42
//!
//! # From another shell
//! gpiosim info demo
//! gpiosim pull demo 0 3 up
//! gpiosim level demo 1 5
//! ```

mod banks;
mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use gpiosim::Environment;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG still takes precedence over -v
    logger(env_logger::DEFAULT_FILTER_ENV, cli.verbose).init();

    let env = environment(&cli)?;
    log::debug!("Using gpio-sim in {}", env.configfs.display());

    match cli.command {
        Commands::Run { name, config, bank } => {
            commands::cmd_run(env, name.as_deref(), config.as_deref(), &bank)
        }
        Commands::Info { sim, bank } => commands::cmd_info(&env, &sim, bank),
        Commands::Pull { line, pull } => commands::cmd_pull(&env, &line, pull),
        Commands::Toggle { line } => commands::cmd_toggle(&env, &line),
        Commands::Level { line } => commands::cmd_level(&env, &line),
    }
}

/// Default log filter for the number of -v flags given
fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn logger(filter_var: &str, verbose: u8) -> env_logger::Builder {
    let env = env_logger::Env::default().filter_or(filter_var, log_level(verbose));
    env_logger::Builder::from_env(env)
}

/// Build the environment from the command line, probing for whatever it
/// leaves unspecified
fn environment(cli: &Cli) -> gpiosim::Result<Environment> {
    let mut env = match &cli.configfs {
        Some(configfs) => Environment::with_configfs(configfs),
        None => Environment::resolve()?,
    };
    if let Some(sysfs) = &cli.sysfs {
        env.sysfs = sysfs.clone();
    }
    if let Some(devfs) = &cli.devfs {
        env.dev = devfs.clone();
    }
    Ok(env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{Level, LevelFilter, Log, Metadata};

    const UNSET_VAR: &str = "GPIOSIM_TEST_UNSET_LOG";

    fn enabled(logger: &env_logger::Logger, level: Level) -> bool {
        logger.enabled(&Metadata::builder().level(level).target("gpiosim").build())
    }

    #[test]
    fn test_verbosity_raises_logger_filter() {
        let logger0 = logger(UNSET_VAR, 0).build();
        assert_eq!(logger0.filter(), LevelFilter::Info);
        assert!(enabled(&logger0, Level::Info));
        assert!(!enabled(&logger0, Level::Debug));

        let logger1 = logger(UNSET_VAR, 1).build();
        assert_eq!(logger1.filter(), LevelFilter::Debug);
        assert!(enabled(&logger1, Level::Debug));
        assert!(!enabled(&logger1, Level::Trace));

        let logger3 = logger(UNSET_VAR, 3).build();
        assert_eq!(logger3.filter(), LevelFilter::Trace);
        assert!(enabled(&logger3, Level::Trace));
    }
}
