//! gpiosim - GPIO simulators for testing GPIO character device users
//!
//! This crate creates and controls simulated gpiochips using the Linux
//! [gpio-sim] kernel module, for testing code that uses the GPIO uAPI.
//!
//! # Overview
//!
//! A simulator ([`Sim`]) contains one or more chips ([`Chip`]), each with a
//! collection of simulated lines. A simulator is described with a
//! [`Builder`], adding a [`Bank`] for each chip, and taken live with
//! [`Builder::live`]. Lines of a bank may be given names, or hogged so they
//! appear to be in use by some other consumer.
//!
//! Once live, a [`Chip`] drives its lines from the kernel side. For input
//! lines, applying a pull with [`Chip::set_pull`] and friends controls the
//! level userspace reads. For output lines, [`Chip::level`] returns the level
//! userspace is driving the line to.
//!
//! Closing or dropping the [`Sim`] removes the gpio-sim configuration and the
//! corresponding gpiochips.
//!
//! For tests that only need vanilla lines on a single chip, [`Simpleton`]
//! provides a slightly simpler interface.
//!
//! # Example
//!
//! ```no_run
//! use gpiosim::{Bank, Direction, Level};
//!
//! let sim = gpiosim::builder()
//!     .with_bank(
//!         &Bank::new("left", 8)
//!             .name(3, "LED0")
//!             .hog(2, "piggy", Direction::OutputLow),
//!     )
//!     .with_bank(&Bank::new("right", 42))
//!     .live()?;
//!
//! let chip = &sim.chips()[0];
//! println!("Simulating {}", chip.dev_path().display());
//! chip.set_pull(5, Level::Active)?;
//! assert_eq!(chip.pull(5)?, Level::Active);
//! # Ok::<(), gpiosim::GpioSimError>(())
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel 5.19+ built with `CONFIG_GPIO_SIM`
//! - configfs mounted (it is mounted, or the module loaded, on demand if
//!   possible)
//! - Write access to configfs and sysfs, so typically root
//!
//! [gpio-sim]: https://www.kernel.org/doc/html/latest/admin-guide/gpio/gpio-sim.html

pub mod attr;
pub mod bank;
pub mod builder;
pub mod chip;
pub mod config;
pub mod env;
pub mod error;
pub mod name;
pub mod sim;
pub mod simpleton;

// Re-exports
pub use bank::{Bank, Direction, Hog, Offset};
pub use builder::{builder, Builder};
pub use chip::{Chip, Level};
pub use config::SimConfig;
pub use env::Environment;
pub use error::{GpioSimError, Result};
pub use name::unique_name;
pub use sim::Sim;
pub use simpleton::Simpleton;
