#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use embassy_time::Instant;
use rkisp1_hal::format::{BusCode, PixelFormat};
use rkisp1_hal::io::RegisterIo;
use rkisp1_hal::pad::{FrameFormat, IspPad};
use rkisp1_hal::platform::{
    Csi2Bus, FrameSyncSink, OutputPaths, ParamsHooks, PathId, PathState, PowerControl,
    Quantization, SensorBusInfo, SensorLink, StatsHooks,
};
use rkisp1_hal::regs::IspIrq;
use rkisp1_hal::time::Hertz;
use rkisp1_hal::{Config, Isp};

pub const ISP_CTRL: u32 = 0x0400;
pub const IRCL: u32 = 0x0014;
pub const ISP_RIS: u32 = 0x05c0;
pub const ISP_MIS: u32 = 0x05c4;
pub const ISP_ICR: u32 = 0x05c8;
pub const MI_ICR: u32 = 0x1504;
pub const MIPI_MIS: u32 = 0x1c10;
pub const MIPI_ICR: u32 = 0x1c14;

#[derive(Default)]
struct Window {
    words: HashMap<u32, u32>,
    writes: Vec<(u32, u32)>,
}

/// Register window with write-1-to-clear interrupt status.
///
/// Writing an ICR clears the matching RIS and MIS bits. Clearing the ISP
/// enable bit raises ISP_OFF in ISP_RIS unless built with [`MockRegs::holding_isp_on`].
#[derive(Default)]
pub struct MockRegs {
    window: Mutex<Window>,
    hold_isp_on: bool,
}

impl MockRegs {
    pub fn new() -> Self {
        Self::default()
    }

    /// A window whose ISP never reports ISP_OFF.
    pub fn holding_isp_on() -> Self {
        Self {
            hold_isp_on: true,
            ..Self::default()
        }
    }

    pub fn get(&self, offset: u32) -> u32 {
        self.read32(offset)
    }

    /// Sets raw and masked status bits as if the hardware raised them.
    pub fn raise(&self, mis_offset: u32, bits: u32) {
        let mut w = self.window.lock().unwrap();
        *w.words.entry(mis_offset - 4).or_default() |= bits;
        *w.words.entry(mis_offset).or_default() |= bits;
    }

    /// Every value written to `offset`, oldest first.
    pub fn writes_to(&self, offset: u32) -> Vec<u32> {
        let w = self.window.lock().unwrap();
        w.writes
            .iter()
            .filter(|(o, _)| *o == offset)
            .map(|(_, v)| *v)
            .collect()
    }

    pub fn write_count(&self) -> usize {
        self.window.lock().unwrap().writes.len()
    }
}

impl RegisterIo for MockRegs {
    fn read32(&self, offset: u32) -> u32 {
        let w = self.window.lock().unwrap();
        w.words.get(&offset).copied().unwrap_or(0)
    }

    fn write32(&self, offset: u32, value: u32) {
        let mut w = self.window.lock().unwrap();
        w.writes.push((offset, value));

        match offset {
            ISP_ICR | MI_ICR | MIPI_ICR => {
                for status in [offset - 8, offset - 4] {
                    *w.words.entry(status).or_default() &= !value;
                }
                return;
            }
            ISP_CTRL if value & 1 == 0 && !self.hold_isp_on => {
                *w.words.entry(ISP_RIS).or_default() |= 1;
            }
            _ => {}
        }
        w.words.insert(offset, value);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    LaneCount(u8),
    LinkRate(Hertz),
    StatsVStart,
    StatsFrameIn,
    StatsIsr(IspIrq),
    ParamsVStart,
    ParamsIsr(IspIrq),
    ParamsConfigure(BusCode, Quantization),
    ParamsDisable,
    PowerUp,
    PowerDown,
    FrameSync(u32),
}

pub struct MockPlatform {
    pub bus: SensorBusInfo,
    pub paths: [PathState; 2],
    pub next_buffer: [bool; 2],
    pub power_fails: bool,
    pub events: Vec<Event>,
}

impl MockPlatform {
    pub fn csi2(lanes: u8) -> Self {
        Self {
            bus: SensorBusInfo::Csi2(Csi2Bus {
                lanes,
                link_frequency: Some(Hertz::mhz(456)),
            }),
            paths: [PathState::Disabled; 2],
            next_buffer: [false; 2],
            power_fails: false,
            events: Vec::new(),
        }
    }

    pub fn count(&self, f: impl Fn(&Event) -> bool) -> usize {
        self.events.iter().filter(|e| f(e)).count()
    }
}

fn index(path: PathId) -> usize {
    match path {
        PathId::SelfPath => 0,
        PathId::MainPath => 1,
    }
}

impl SensorLink for MockPlatform {
    fn bus_info(&self) -> SensorBusInfo {
        self.bus
    }

    fn set_lane_count(&mut self, lanes: u8) {
        self.events.push(Event::LaneCount(lanes));
    }

    fn set_link_rate(&mut self, rate: Hertz) {
        self.events.push(Event::LinkRate(rate));
    }
}

impl StatsHooks for MockPlatform {
    fn stats_v_start(&mut self, _timestamp: Instant) {
        self.events.push(Event::StatsVStart);
    }

    fn stats_frame_in(&mut self, _timestamp: Instant) {
        self.events.push(Event::StatsFrameIn);
    }

    fn stats_isr(&mut self, status: IspIrq) {
        self.events.push(Event::StatsIsr(status));
    }
}

impl ParamsHooks for MockPlatform {
    fn params_v_start(&mut self) {
        self.events.push(Event::ParamsVStart);
    }

    fn params_isr(&mut self, status: IspIrq) {
        self.events.push(Event::ParamsIsr(status));
    }

    fn params_configure(&mut self, sink: &PixelFormat, quantization: Quantization) {
        self.events.push(Event::ParamsConfigure(sink.code, quantization));
    }

    fn params_disable(&mut self) {
        self.events.push(Event::ParamsDisable);
    }
}

impl OutputPaths for MockPlatform {
    fn path_state(&self, path: PathId) -> PathState {
        self.paths[index(path)]
    }

    fn has_pending_next_buffer(&self, path: PathId) -> bool {
        self.next_buffer[index(path)]
    }
}

impl PowerControl for MockPlatform {
    fn power_up(&mut self) -> Result<(), ()> {
        if self.power_fails {
            return Err(());
        }
        self.events.push(Event::PowerUp);
        Ok(())
    }

    fn power_down(&mut self) -> Result<(), ()> {
        self.events.push(Event::PowerDown);
        Ok(())
    }
}

impl FrameSyncSink for MockPlatform {
    fn frame_sync(&mut self, sequence: u32) {
        self.events.push(Event::FrameSync(sequence));
    }
}

pub type TestIsp = Isp<MockRegs, MockPlatform>;

/// A powered ISP with a 1280x720 RGGB10 sensor on two CSI2 lanes.
pub fn rggb10_720p() -> TestIsp {
    let mut isp = Isp::new(MockRegs::new(), MockPlatform::csi2(2), Config::default());
    isp.subdev_mut()
        .set_format(IspPad::Sink, &FrameFormat::new(BusCode::SRGGB10_1X10, 1280, 720))
        .unwrap();
    isp.power(true).unwrap();
    isp
}

/// Number of first-consumer configurations run so far.
pub fn configurations(isp: &TestIsp) -> usize {
    isp.with_platform(|p| p.count(|e| matches!(e, Event::LaneCount(_))))
}
