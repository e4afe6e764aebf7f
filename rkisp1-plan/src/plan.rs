//! Plan file schema.
//!
//! A plan describes one sensor setup in HJSON:
//!
//! ```hjson
//! {
//!   bus: { type: "csi2", lanes: 2, link_frequency_hz: 456000000 }
//!   sink: { code: "SRGGB10_1X10", width: 1280, height: 720 }
//!   sink_crop: { left: 0, top: 0, width: 1280, height: 720 }
//!   resize: [ { path: "main", width: 640, height: 360 } ]
//! }
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use rkisp1_hal::format::BusCode;
use rkisp1_hal::pad::{FrameFormat, Rect};
use rkisp1_hal::platform::{Csi2Bus, ParallelBus, PathId, SensorBusInfo};
use rkisp1_hal::time::Hertz;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub bus: Bus,
    pub sink: Format,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Format>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sink_crop: Option<Window>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_crop: Option<Window>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resize: Vec<Resize>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Bus {
    Parallel(Parallel),
    Bt656(Parallel),
    Csi2 {
        lanes: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        link_frequency_hz: Option<u32>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parallel {
    #[serde(default = "default_bus_width")]
    pub bus_width: u8,
    #[serde(default = "default_true")]
    pub pclk_sample_rising: bool,
    #[serde(default)]
    pub vsync_active_low: bool,
    #[serde(default)]
    pub hsync_active_low: bool,
}

fn default_bus_width() -> u8 {
    8
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Format {
    pub code: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Window {
    #[serde(default)]
    pub left: u32,
    #[serde(default)]
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Path {
    #[serde(alias = "mp")]
    Main,
    #[serde(alias = "sp")]
    #[serde(rename = "self")]
    SelfPath,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Resize {
    pub path: Path,
    pub width: u32,
    pub height: u32,
    /// Horizontal chroma subsampling of both ends.
    #[serde(default = "default_chroma_div")]
    pub chroma_div: u32,
    /// Dual crop applied in front of the resizer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<Window>,
}

fn default_chroma_div() -> u32 {
    2
}

impl Bus {
    pub fn to_bus_info(&self) -> SensorBusInfo {
        match self {
            Bus::Parallel(p) => SensorBusInfo::Parallel(p.to_parallel_bus()),
            Bus::Bt656(p) => SensorBusInfo::Bt656(p.to_parallel_bus()),
            Bus::Csi2 {
                lanes,
                link_frequency_hz,
            } => SensorBusInfo::Csi2(Csi2Bus {
                lanes: *lanes,
                link_frequency: link_frequency_hz.map(Hertz::hz),
            }),
        }
    }
}

impl Parallel {
    fn to_parallel_bus(&self) -> ParallelBus {
        ParallelBus {
            bus_width: self.bus_width,
            pclk_sample_rising: self.pclk_sample_rising,
            vsync_active_low: self.vsync_active_low,
            hsync_active_low: self.hsync_active_low,
        }
    }
}

impl Format {
    pub fn to_frame_format(&self) -> Result<FrameFormat> {
        let code = BusCode::from_name(&self.code)
            .ok_or_else(|| anyhow!("unknown bus code `{}`", self.code))?;
        Ok(FrameFormat::new(code, self.width, self.height))
    }
}

impl From<Window> for Rect {
    fn from(w: Window) -> Self {
        Rect::new(w.left, w.top, w.width, w.height)
    }
}

impl From<Path> for PathId {
    fn from(path: Path) -> Self {
        match path {
            Path::Main => PathId::MainPath,
            Path::SelfPath => PathId::SelfPath,
        }
    }
}

pub fn parse(text: &str) -> Result<Plan> {
    Ok(serde_hjson::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_csi2_plan() {
        let plan = parse(
            r#"{
                bus: { type: "csi2", lanes: 2, link_frequency_hz: 456000000 }
                sink: { code: "SRGGB10_1X10", width: 1280, height: 720 }
                resize: [ { path: "self", width: 640, height: 360 } ]
            }"#,
        )
        .unwrap();

        assert_eq!(
            plan.bus.to_bus_info(),
            SensorBusInfo::Csi2(Csi2Bus {
                lanes: 2,
                link_frequency: Some(Hertz::mhz(456)),
            })
        );
        assert_eq!(plan.resize[0].path, Path::SelfPath);
        assert_eq!(plan.resize[0].chroma_div, 2);
        assert_eq!(
            plan.sink.to_frame_format().unwrap().code,
            BusCode::SRGGB10_1X10
        );
    }

    #[test]
    fn parallel_defaults() {
        let plan = parse(
            r#"{
                bus: { type: "parallel", vsync_active_low: true }
                sink: { code: "YUYV8_1X16", width: 640, height: 480 }
            }"#,
        )
        .unwrap();

        let SensorBusInfo::Parallel(bus) = plan.bus.to_bus_info() else {
            panic!("expected a parallel bus");
        };
        assert_eq!(bus.bus_width, 8);
        assert!(bus.pclk_sample_rising && bus.vsync_active_low);
        assert!(plan.resize.is_empty());
    }

    #[test]
    fn unknown_code_is_an_error() {
        let format = Format {
            code: "NOPE".into(),
            width: 64,
            height: 64,
        };
        assert!(format.to_frame_format().is_err());
    }
}
