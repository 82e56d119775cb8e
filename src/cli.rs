//! CLI argument parsing

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Help text describing the --bank syntax
const BANK_HELP: &str = "Bank to simulate, as LABEL:lines=N[,name=OFFSET/NAME][,hog=OFFSET/CONSUMER[/DIRECTION]]... \
(DIRECTION is input, output-low or output-high)";

#[derive(Parser)]
#[command(name = "gpiosim")]
#[command(author, version, about = "Create and control gpio-sim GPIO simulators", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// gpio-sim directory in configfs (probed if not given)
    #[arg(long, global = true, env = "GPIOSIM_CONFIGFS")]
    pub configfs: Option<PathBuf>,

    /// Parent directory of the gpio-sim platform devices in sysfs
    #[arg(long, global = true, env = "GPIOSIM_SYSFS")]
    pub sysfs: Option<PathBuf>,

    /// Directory containing the gpiochip devices
    #[arg(long, global = true, env = "GPIOSIM_DEVFS")]
    pub devfs: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Identifies a line of a live simulator
#[derive(clap::Args, Debug, Clone)]
pub struct LineArgs {
    /// Name of the simulator
    pub sim: String,

    /// Index of the bank within the simulator
    pub bank: usize,

    /// Offset of the line within the bank
    pub offset: u32,
}

/// Pull to apply to a line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullArg {
    Up,
    Down,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Take a simulator live until stdin is closed or a line is entered
    Run {
        /// Name of the simulator (generated if not given)
        #[arg(short, long)]
        name: Option<String>,

        /// Simulator description file (TOML format)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Banks to simulate, after any from --config
        #[arg(short, long, help = BANK_HELP)]
        bank: Vec<String>,
    },

    /// Show the configuration of a live simulator
    Info {
        /// Name of the simulator
        sim: String,

        /// Only show this bank
        #[arg(long)]
        bank: Option<usize>,
    },

    /// Show or set the pull of a line
    Pull {
        #[command(flatten)]
        line: LineArgs,

        /// Pull to apply (shows the current pull if not given)
        #[arg(value_enum)]
        pull: Option<PullArg>,
    },

    /// Flip the pull of a line
    Toggle {
        #[command(flatten)]
        line: LineArgs,
    },

    /// Show the level a line is being driven to
    Level {
        #[command(flatten)]
        line: LineArgs,
    },
}
