//! Collaborators of the ISP core.
//!
//! The sensor, the statistics and parameter nodes, the two output paths, the
//! power domain and the frame-sync event queue live outside this crate. The
//! core talks to them through the traits below; a board bundles them into a
//! single [`Platform`] value owned by the [`Isp`](crate::Isp).

use embassy_time::Instant;

use crate::format::PixelFormat;
use crate::regs::IspIrq;
use crate::time::Hertz;

/// Parallel or BT.656 bus parameters.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParallelBus {
    /// Data lines wired to the ISP.
    pub bus_width: u8,
    /// Sample on the rising pixel clock edge.
    pub pclk_sample_rising: bool,
    pub vsync_active_low: bool,
    pub hsync_active_low: bool,
}

impl Default for ParallelBus {
    fn default() -> Self {
        Self {
            bus_width: 8,
            pclk_sample_rising: true,
            vsync_active_low: false,
            hsync_active_low: false,
        }
    }
}

/// MIPI CSI2 bus parameters.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Csi2Bus {
    /// Data lanes, 1 to 4.
    pub lanes: u8,
    pub link_frequency: Option<Hertz>,
}

/// Bus of the active sensor.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorBusInfo {
    Parallel(ParallelBus),
    Bt656(ParallelBus),
    Csi2(Csi2Bus),
}

impl SensorBusInfo {
    pub fn is_csi2(&self) -> bool {
        matches!(self, Self::Csi2(_))
    }
}

/// Output paths fed by the ISP.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PathId {
    /// Self path, with its own resizer.
    SelfPath,
    /// Main path.
    MainPath,
}

impl PathId {
    pub const ALL: [PathId; 2] = [PathId::SelfPath, PathId::MainPath];
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PathState {
    Disabled,
    Ready,
    Streaming,
}

/// Quantization range handed to the parameter node.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Quantization {
    FullRange,
}

/// Sensor and PHY side of the input bus.
pub trait SensorLink {
    fn bus_info(&self) -> SensorBusInfo;
    fn set_lane_count(&mut self, lanes: u8);
    fn set_link_rate(&mut self, rate: Hertz);
}

/// Statistics node hooks.
pub trait StatsHooks {
    /// Vertical sync start.
    fn stats_v_start(&mut self, timestamp: Instant);
    /// Frame completely sampled.
    fn stats_frame_in(&mut self, timestamp: Instant);
    /// Full ISP status word, once per interrupt.
    fn stats_isr(&mut self, status: IspIrq);
}

/// Parameter (3A configuration) node hooks.
pub trait ParamsHooks {
    fn params_v_start(&mut self);
    /// Full ISP status word, once per interrupt.
    fn params_isr(&mut self, status: IspIrq);
    /// Called when the ISP processes `sink` into a non-Bayer output.
    fn params_configure(&mut self, sink: &PixelFormat, quantization: Quantization);
    /// Called when the output is raw Bayer.
    fn params_disable(&mut self);
}

/// DMA side of the two output paths.
pub trait OutputPaths {
    fn path_state(&self, path: PathId) -> PathState;
    /// Whether `path` already holds the buffer for the frame after the current one.
    fn has_pending_next_buffer(&self, path: PathId) -> bool;
}

/// Power domain and clocks of the ISP block.
pub trait PowerControl {
    fn power_up(&mut self) -> Result<(), ()>;
    fn power_down(&mut self) -> Result<(), ()>;
}

/// Receiver of frame-sync events.
pub trait FrameSyncSink {
    /// One event per vertical sync, `sequence` counts from 0 each session.
    fn frame_sync(&mut self, sequence: u32);
}

/// Everything the ISP core needs from the board.
pub trait Platform:
    SensorLink + StatsHooks + ParamsHooks + OutputPaths + PowerControl + FrameSyncSink
{
}

impl<T> Platform for T where
    T: SensorLink + StatsHooks + ParamsHooks + OutputPaths + PowerControl + FrameSyncSink
{
}
