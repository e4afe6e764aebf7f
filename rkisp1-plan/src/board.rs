//! Board stand-in for dry runs.
//!
//! Accepts every request and traces it; no frame ever arrives.

use embassy_time::Instant;
use tracing::{debug, trace};

use rkisp1_hal::format::PixelFormat;
use rkisp1_hal::platform::{
    FrameSyncSink, OutputPaths, ParamsHooks, PathId, PathState, PowerControl, Quantization,
    SensorBusInfo, SensorLink, StatsHooks,
};
use rkisp1_hal::regs::IspIrq;
use rkisp1_hal::time::Hertz;

pub struct DryRun {
    bus: SensorBusInfo,
}

impl DryRun {
    pub fn new(bus: SensorBusInfo) -> Self {
        Self { bus }
    }
}

impl SensorLink for DryRun {
    fn bus_info(&self) -> SensorBusInfo {
        self.bus
    }

    fn set_lane_count(&mut self, lanes: u8) {
        debug!(lanes, "sensor lane count");
    }

    fn set_link_rate(&mut self, rate: Hertz) {
        debug!(%rate, "sensor link rate");
    }
}

impl StatsHooks for DryRun {
    fn stats_v_start(&mut self, _timestamp: Instant) {}

    fn stats_frame_in(&mut self, _timestamp: Instant) {}

    fn stats_isr(&mut self, status: IspIrq) {
        trace!(status = status.into_bits(), "stats isr");
    }
}

impl ParamsHooks for DryRun {
    fn params_v_start(&mut self) {}

    fn params_isr(&mut self, status: IspIrq) {
        trace!(status = status.into_bits(), "params isr");
    }

    fn params_configure(&mut self, sink: &PixelFormat, quantization: Quantization) {
        debug!(
            code = sink.code.name().unwrap_or("?"),
            ?quantization,
            "params configured"
        );
    }

    fn params_disable(&mut self) {
        debug!("params disabled, raw output");
    }
}

impl OutputPaths for DryRun {
    fn path_state(&self, _path: PathId) -> PathState {
        PathState::Ready
    }

    fn has_pending_next_buffer(&self, _path: PathId) -> bool {
        false
    }
}

impl PowerControl for DryRun {
    fn power_up(&mut self) -> Result<(), ()> {
        Ok(())
    }

    fn power_down(&mut self) -> Result<(), ()> {
        Ok(())
    }
}

impl FrameSyncSink for DryRun {
    fn frame_sync(&mut self, sequence: u32) {
        trace!(sequence, "frame sync");
    }
}
