//! Pixel format catalog.
//!
//! Two static tables: formats the sink pad accepts from a sensor, and formats
//! the source path can emit. Entries never change after construction.

use crate::regs::MI_CTRL_SP_INPUT_YUV422;

/// Media bus code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusCode(pub u32);

impl BusCode {
    pub const RGB666_1X18: Self = Self(0x1009);
    pub const RGB888_1X24: Self = Self(0x100a);
    pub const RGB565_1X16: Self = Self(0x1017);

    pub const UYVY8_2X8: Self = Self(0x2006);
    pub const VYUY8_2X8: Self = Self(0x2007);
    pub const YUYV8_2X8: Self = Self(0x2008);
    pub const YVYU8_2X8: Self = Self(0x2009);
    pub const UYVY8_1X16: Self = Self(0x200f);
    pub const VYUY8_1X16: Self = Self(0x2010);
    pub const YUYV8_1X16: Self = Self(0x2011);
    pub const YVYU8_1X16: Self = Self(0x2012);

    pub const SBGGR8_1X8: Self = Self(0x3001);
    pub const SGRBG8_1X8: Self = Self(0x3002);
    pub const SBGGR10_1X10: Self = Self(0x3007);
    pub const SBGGR12_1X12: Self = Self(0x3008);
    pub const SGRBG10_1X10: Self = Self(0x300a);
    pub const SGBRG10_1X10: Self = Self(0x300e);
    pub const SRGGB10_1X10: Self = Self(0x300f);
    pub const SGBRG12_1X12: Self = Self(0x3010);
    pub const SGRBG12_1X12: Self = Self(0x3011);
    pub const SRGGB12_1X12: Self = Self(0x3012);
    pub const SGBRG8_1X8: Self = Self(0x3013);
    pub const SRGGB8_1X8: Self = Self(0x3014);

    /// Looks up a well-known code by name, e.g. `"SRGGB10_1X10"`.
    pub fn from_name(name: &str) -> Option<Self> {
        NAMES.iter().find(|(n, _)| *n == name).map(|(_, code)| *code)
    }

    /// Name of a well-known code.
    pub fn name(self) -> Option<&'static str> {
        NAMES.iter().find(|(_, code)| *code == self).map(|(n, _)| *n)
    }
}

const NAMES: [(&str, BusCode); 23] = [
    ("RGB666_1X18", BusCode::RGB666_1X18),
    ("RGB888_1X24", BusCode::RGB888_1X24),
    ("RGB565_1X16", BusCode::RGB565_1X16),
    ("UYVY8_2X8", BusCode::UYVY8_2X8),
    ("VYUY8_2X8", BusCode::VYUY8_2X8),
    ("YUYV8_2X8", BusCode::YUYV8_2X8),
    ("YVYU8_2X8", BusCode::YVYU8_2X8),
    ("UYVY8_1X16", BusCode::UYVY8_1X16),
    ("VYUY8_1X16", BusCode::VYUY8_1X16),
    ("YUYV8_1X16", BusCode::YUYV8_1X16),
    ("YVYU8_1X16", BusCode::YVYU8_1X16),
    ("SBGGR8_1X8", BusCode::SBGGR8_1X8),
    ("SGRBG8_1X8", BusCode::SGRBG8_1X8),
    ("SBGGR10_1X10", BusCode::SBGGR10_1X10),
    ("SBGGR12_1X12", BusCode::SBGGR12_1X12),
    ("SGRBG10_1X10", BusCode::SGRBG10_1X10),
    ("SGBRG10_1X10", BusCode::SGBRG10_1X10),
    ("SRGGB10_1X10", BusCode::SRGGB10_1X10),
    ("SGBRG12_1X12", BusCode::SGBRG12_1X12),
    ("SGRBG12_1X12", BusCode::SGRBG12_1X12),
    ("SRGGB12_1X12", BusCode::SRGGB12_1X12),
    ("SGBRG8_1X8", BusCode::SGBRG8_1X8),
    ("SRGGB8_1X8", BusCode::SRGGB8_1X8),
];

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FormatFamily {
    Yuv,
    Rgb,
    Bayer,
    Jpeg,
}

/// Bayer colour filter order. Discriminants are the ACQ_PROP encoding.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BayerPattern {
    Rggb = 0,
    Grbg = 1,
    Gbrg = 2,
    Bggr = 3,
}

impl BayerPattern {
    pub const fn into_bits(self) -> u8 {
        self as u8
    }

    pub const fn from_bits(value: u8) -> Self {
        match value & 0x3 {
            0 => Self::Rggb,
            1 => Self::Grbg,
            2 => Self::Gbrg,
            _ => Self::Bggr,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Colorspace {
    Srgb,
    Jpeg,
}

/// Which pad a catalog lookup is for.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PadDirection {
    Sink,
    Source,
}

/// One catalog entry.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PixelFormat {
    pub code: BusCode,
    pub family: FormatFamily,
    /// Bits per pixel of each plane.
    pub bpp: [u8; 3],
    /// Only set for the Bayer family.
    pub bayer_pattern: Option<BayerPattern>,
    /// Horizontal chroma subsampling.
    pub xsubs: u8,
    /// Vertical chroma subsampling.
    pub ysubs: u8,
    pub colorspace: Colorspace,
    pub uv_swap: bool,
    pub yc_swap: bool,
    pub write_format: u32,
    pub input_format: u32,
    pub output_format: u32,
}

impl PixelFormat {
    const fn bayer(code: BusCode, pattern: BayerPattern, depth: u8) -> Self {
        Self {
            code,
            family: FormatFamily::Bayer,
            bpp: [depth, 0, 0],
            bayer_pattern: Some(pattern),
            xsubs: 0,
            ysubs: 0,
            colorspace: Colorspace::Srgb,
            uv_swap: false,
            yc_swap: false,
            write_format: 0,
            input_format: 0,
            output_format: 0,
        }
    }

    /// Packed 4:2:2 YUV on a 16-bit bus.
    const fn yuv422_1x16(code: BusCode, uv_swap: bool, yc_swap: bool) -> Self {
        Self {
            code,
            family: FormatFamily::Yuv,
            bpp: [16, 0, 0],
            bayer_pattern: None,
            xsubs: 2,
            ysubs: 1,
            colorspace: Colorspace::Jpeg,
            uv_swap,
            yc_swap,
            write_format: 0,
            input_format: 0,
            output_format: 0,
        }
    }

    pub fn is_bayer(&self) -> bool {
        self.family == FormatFamily::Bayer
    }
}

/// Formats accepted from the sensor, in enumeration order.
pub static SINK_FORMATS: [PixelFormat; 16] = [
    PixelFormat::bayer(BusCode::SBGGR10_1X10, BayerPattern::Bggr, 10),
    PixelFormat::bayer(BusCode::SRGGB12_1X12, BayerPattern::Rggb, 12),
    PixelFormat::bayer(BusCode::SBGGR12_1X12, BayerPattern::Bggr, 12),
    PixelFormat::bayer(BusCode::SGBRG12_1X12, BayerPattern::Gbrg, 12),
    PixelFormat::bayer(BusCode::SGRBG12_1X12, BayerPattern::Grbg, 12),
    PixelFormat::bayer(BusCode::SRGGB10_1X10, BayerPattern::Rggb, 10),
    PixelFormat::bayer(BusCode::SGBRG10_1X10, BayerPattern::Gbrg, 10),
    PixelFormat::bayer(BusCode::SGRBG10_1X10, BayerPattern::Grbg, 10),
    PixelFormat::bayer(BusCode::SRGGB8_1X8, BayerPattern::Rggb, 8),
    PixelFormat::bayer(BusCode::SBGGR8_1X8, BayerPattern::Bggr, 8),
    PixelFormat::bayer(BusCode::SGBRG8_1X8, BayerPattern::Gbrg, 8),
    PixelFormat::bayer(BusCode::SGRBG8_1X8, BayerPattern::Grbg, 8),
    PixelFormat::yuv422_1x16(BusCode::YUYV8_1X16, false, false),
    PixelFormat::yuv422_1x16(BusCode::YVYU8_1X16, true, false),
    PixelFormat::yuv422_1x16(BusCode::UYVY8_1X16, false, true),
    PixelFormat::yuv422_1x16(BusCode::VYUY8_1X16, true, true),
];

/// Formats the source path can emit, in enumeration order.
pub static SOURCE_FORMATS: [PixelFormat; 13] = [
    PixelFormat {
        code: BusCode::YUYV8_2X8,
        family: FormatFamily::Yuv,
        bpp: [16, 0, 0],
        bayer_pattern: None,
        xsubs: 2,
        ysubs: 1,
        colorspace: Colorspace::Jpeg,
        uv_swap: false,
        yc_swap: false,
        write_format: 0,
        input_format: MI_CTRL_SP_INPUT_YUV422,
        output_format: 0,
    },
    PixelFormat::bayer(BusCode::SRGGB12_1X12, BayerPattern::Rggb, 12),
    PixelFormat::bayer(BusCode::SBGGR12_1X12, BayerPattern::Bggr, 12),
    PixelFormat::bayer(BusCode::SGBRG12_1X12, BayerPattern::Gbrg, 12),
    PixelFormat::bayer(BusCode::SGRBG12_1X12, BayerPattern::Grbg, 12),
    PixelFormat::bayer(BusCode::SRGGB10_1X10, BayerPattern::Rggb, 10),
    PixelFormat::bayer(BusCode::SBGGR10_1X10, BayerPattern::Bggr, 10),
    PixelFormat::bayer(BusCode::SGBRG10_1X10, BayerPattern::Gbrg, 10),
    PixelFormat::bayer(BusCode::SGRBG10_1X10, BayerPattern::Grbg, 10),
    PixelFormat::bayer(BusCode::SRGGB8_1X8, BayerPattern::Rggb, 8),
    PixelFormat::bayer(BusCode::SBGGR8_1X8, BayerPattern::Bggr, 8),
    PixelFormat::bayer(BusCode::SGBRG8_1X8, BayerPattern::Gbrg, 8),
    PixelFormat::bayer(BusCode::SGRBG8_1X8, BayerPattern::Grbg, 8),
];

/// The catalog of one pad direction.
pub fn formats(direction: PadDirection) -> &'static [PixelFormat] {
    match direction {
        PadDirection::Sink => &SINK_FORMATS,
        PadDirection::Source => &SOURCE_FORMATS,
    }
}

/// Finds a catalog entry by bus code or by position.
///
/// The first entry whose code equals `code`, or whose position equals
/// `index`, wins. An `index` past the end of the table finds nothing, even
/// when `code` would have matched.
pub fn find_format(
    direction: PadDirection,
    code: Option<BusCode>,
    index: Option<usize>,
) -> Option<&'static PixelFormat> {
    let table = formats(direction);
    if index.is_some_and(|i| i >= table.len()) {
        return None;
    }

    table
        .iter()
        .enumerate()
        .find(|(i, fmt)| Some(fmt.code) == code || Some(*i) == index)
        .map(|(_, fmt)| fmt)
}
