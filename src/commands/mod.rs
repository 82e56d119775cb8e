//! CLI command implementations
//!
//! - `run` takes a simulator live for as long as the command runs
//! - `info` reads the configuration of a live simulator back from configfs
//! - `line` drives and inspects individual lines of a live simulator

mod info;
mod line;
mod run;

pub use info::cmd_info;
pub use line::{cmd_level, cmd_pull, cmd_toggle};
pub use run::cmd_run;

use gpiosim::Bank;

/// Print a bank configuration, indented under its chip
fn print_bank(bank: &Bank) {
    println!("  label:     {}", bank.label);
    println!("  num_lines: {}", bank.num_lines);
    for (offset, name) in &bank.names {
        println!("  line {:>3}: name '{}'", offset, name);
    }
    for (offset, hog) in &bank.hogs {
        println!(
            "  line {:>3}: hogged by '{}' as {}",
            offset, hog.consumer, hog.direction
        );
    }
}
