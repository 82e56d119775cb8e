//! Run command implementation

use crate::banks::parse_bank_string;
use gpiosim::{Environment, SimConfig};
use log::info;
use nix::sys::pthread::{pthread_kill, pthread_self};
use nix::sys::signal::{SigSet, Signal};
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Sent by the input thread to wake the waiting thread
const WAKE_SIGNAL: Signal = Signal::SIGUSR1;

/// Signals that remove the simulator before exiting
fn shutdown_signals() -> SigSet {
    [Signal::SIGINT, Signal::SIGTERM, Signal::SIGHUP]
        .into_iter()
        .collect()
}

/// What ended the wait for the simulator to be released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Release {
    /// A line, or end of file, on the input
    Input,
    /// One of the shutdown signals
    Signal(Signal),
}

/// Wait for a line or end of file on `input`, or for one of `signals`.
///
/// The signals are blocked in the calling thread, and so in any thread it
/// spawns later, which leaves them pending for this thread to accept.
fn wait_for_release<R>(input: R, signals: SigSet) -> nix::Result<Release>
where
    R: BufRead + Send + 'static,
{
    let mut mask = signals;
    mask.add(WAKE_SIGNAL);
    mask.thread_block()?;

    let waiter = pthread_self();
    std::thread::spawn(move || {
        let mut input = input;
        let mut line = String::new();
        let _ = input.read_line(&mut line);
        let _ = pthread_kill(waiter, WAKE_SIGNAL);
    });

    loop {
        let signal = mask.wait()?;
        if signal == WAKE_SIGNAL {
            return Ok(Release::Input);
        }
        if signals.contains(signal) {
            return Ok(Release::Signal(signal));
        }
    }
}

/// Take a simulator live, then wait for stdin or a signal before closing it
pub fn cmd_run(
    env: Environment,
    name: Option<&str>,
    config: Option<&Path>,
    banks: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = match config {
        Some(path) => SimConfig::from_toml_file(path)?.builder(),
        None => gpiosim::builder(),
    };
    if let Some(name) = name {
        builder = builder.with_name(name);
    }
    for spec in banks {
        let bank = parse_bank_string(spec).map_err(|e| format!("--bank {}: {}", spec, e))?;
        builder = builder.with_bank(&bank);
    }
    if builder.banks().is_empty() {
        return Err("No banks given. Use --bank or --config".into());
    }

    // held off until the simulator can be removed
    let signals = shutdown_signals();
    signals.thread_block()?;

    let mut sim = builder.with_env(env).live()?;

    println!("Simulator: {}", sim.name());
    for (i, chip) in sim.chips().iter().enumerate() {
        println!(
            "bank{}: {} ({})",
            i,
            chip.chip_name(),
            chip.dev_path().display()
        );
        super::print_bank(chip.config());
    }
    println!();
    println!("Press Enter, close stdin or interrupt to remove the simulator");

    let released = wait_for_release(BufReader::new(std::io::stdin()), signals);
    if let Ok(Release::Signal(signal)) = released {
        info!("Received {}, removing {}", signal, sim.name());
    }
    // removed even if the wait itself failed
    let closed = sim.close();
    released?;
    closed?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use std::time::Duration;

    /// Input that never becomes readable
    struct Stalled;

    impl Read for Stalled {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            loop {
                std::thread::park();
            }
        }
    }

    fn test_signals() -> SigSet {
        [Signal::SIGUSR2].into_iter().collect()
    }

    #[test]
    fn test_released_by_input() {
        let input = Cursor::new(b"\n".to_vec());
        assert_eq!(
            wait_for_release(input, test_signals()).unwrap(),
            Release::Input
        );
    }

    #[test]
    fn test_released_by_end_of_input() {
        assert_eq!(
            wait_for_release(std::io::empty(), test_signals()).unwrap(),
            Release::Input
        );
    }

    #[test]
    fn test_released_by_signal() {
        let waiter = pthread_self();
        // blocked before the sender exists, so it can't be lost
        test_signals().thread_block().unwrap();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            pthread_kill(waiter, Signal::SIGUSR2).unwrap();
        });
        assert_eq!(
            wait_for_release(BufReader::new(Stalled), test_signals()).unwrap(),
            Release::Signal(Signal::SIGUSR2)
        );
    }

    #[test]
    fn test_shutdown_signals() {
        let signals = shutdown_signals();
        assert!(signals.contains(Signal::SIGINT));
        assert!(signals.contains(Signal::SIGTERM));
        assert!(signals.contains(Signal::SIGHUP));
        assert!(!signals.contains(WAKE_SIGNAL));
    }
}
