//! Info command implementation

use gpiosim::{Chip, Environment, Sim};

/// Show the configuration of the banks of a live simulator
pub fn cmd_info(
    env: &Environment,
    sim_name: &str,
    bank: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let indices: Vec<usize> = match bank {
        Some(index) => vec![index],
        None => (0..Sim::bank_count(env, sim_name)?).collect(),
    };

    println!("Simulator: {}", sim_name);
    for index in indices {
        let cfg = Sim::read_bank(env, sim_name, index)?;
        match Chip::attach(env, sim_name, index) {
            Ok(chip) => println!(
                "bank{}: {} ({})",
                index,
                chip.chip_name(),
                chip.dev_path().display()
            ),
            Err(e) => {
                log::debug!("bank{} has no chip: {}", index, e);
                println!("bank{}: not live", index);
            }
        }
        super::print_bank(&cfg);
    }
    Ok(())
}
