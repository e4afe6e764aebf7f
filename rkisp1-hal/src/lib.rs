#![cfg_attr(not(test), no_std)]
#![doc = include_str!("../README.md")]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

mod macros;

mod utils;

pub mod time;
pub mod io;
pub mod regs;
pub mod format;
pub mod platform;
pub mod pad;
pub mod pipeline;
pub mod rsz;
pub mod irq;
mod isp;
mod stream;

pub use isp::Isp;
pub use irq::IspIrqOutcome;

use embassy_time::Duration;

/// ISP core configuration passed at construction.
#[non_exhaustive]
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Sink frame width applied before any format is negotiated.
    pub default_width: u32,
    /// Sink frame height applied before any format is negotiated.
    pub default_height: u32,
    /// Upper bound on the ISP-off poll issued by `stop`.
    pub isp_off_timeout: Duration,
    /// Delay after enabling the receiver before the sensor may free-run.
    pub mipi_settle: Duration,
    /// Demosaic threshold used when Bayer input is processed to YUV.
    pub demosaic_threshold: u8,
    /// CSI2 virtual channel the receiver captures.
    pub virtual_channel: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_width: 800,
            default_height: 600,
            isp_off_timeout: Duration::from_micros(100),
            mipi_settle: Duration::from_millis(1),
            demosaic_threshold: 0x0c,
            virtual_channel: 0,
        }
    }
}

/// ISP control error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Bad pad, selection target, window size or unbalanced call.
    InvalidArgument,
    /// The negotiated formats cannot be programmed: unmapped bit depth,
    /// CSI2 data type, bus width or lane count.
    InvalidConfiguration,
    /// Power or clock could not be acquired.
    ResourceUnavailable,
    /// A hardware status bit did not settle in time.
    Timeout,
    /// Data loss or picture size error. Recovered by a hardware restart,
    /// only ever reported through [`IspIrqOutcome`].
    HardwareFault,
}
