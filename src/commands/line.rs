//! Line command implementations

use crate::cli::{LineArgs, PullArg};
use gpiosim::{Chip, Environment, Level};

fn attach(env: &Environment, line: &LineArgs) -> gpiosim::Result<Chip> {
    let chip = Chip::attach(env, &line.sim, line.bank)?;
    if line.offset >= chip.config().num_lines {
        log::warn!(
            "Offset {} is beyond the {} lines of {}",
            line.offset,
            chip.config().num_lines,
            chip.chip_name()
        );
    }
    Ok(chip)
}

/// Show the pull of a line, or set it if a pull is given
pub fn cmd_pull(
    env: &Environment,
    line: &LineArgs,
    pull: Option<PullArg>,
) -> Result<(), Box<dyn std::error::Error>> {
    let chip = attach(env, line)?;
    match pull {
        Some(PullArg::Up) => chip.pull_up(line.offset)?,
        Some(PullArg::Down) => chip.pull_down(line.offset)?,
        None => {
            let pull = match chip.pull(line.offset)? {
                Level::Active => "up",
                Level::Inactive => "down",
            };
            println!("{}", pull);
        }
    }
    Ok(())
}

/// Flip the pull of a line
pub fn cmd_toggle(env: &Environment, line: &LineArgs) -> Result<(), Box<dyn std::error::Error>> {
    let chip = attach(env, line)?;
    chip.toggle(line.offset)?;
    log::info!(
        "{} line {}: pull is now {}",
        chip.chip_name(),
        line.offset,
        chip.pull(line.offset)?
    );
    Ok(())
}

/// Show the level a line is being driven to
pub fn cmd_level(env: &Environment, line: &LineArgs) -> Result<(), Box<dyn std::error::Error>> {
    let chip = attach(env, line)?;
    let level = match chip.level(line.offset)? {
        Level::Active => 1,
        Level::Inactive => 0,
    };
    println!("{}", level);
    Ok(())
}
