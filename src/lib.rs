//! TWSI FFT driver - host side of the FPGA FFT core on the Armada 1500 board
//!
//! This library loads the input samples into the FFT core over the TWSI
//! (I2C) bus, starts the transform and reads the results back.

pub mod bus;
pub mod config;
pub mod error;
pub mod protocol;
pub mod session;
pub mod twsi;
pub mod waveform;

// Re-export main types for convenience
pub use bus::{TwsiBus, TwsiDevice};
pub use config::Config;
pub use error::{Result, TwsiError};
pub use session::{run_sequence, Policy, RunReport, Stage};
