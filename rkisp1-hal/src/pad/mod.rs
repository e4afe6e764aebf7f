//! ISP subdevice pads: format and crop negotiation.
//!
//! The sink pad owns the sensor frame (`in_win`) and the acquisition window
//! (`in_crop`). The source path pad owns the output window (`out_win`),
//! bounded by `in_crop`. The parameter and statistics pads carry metadata
//! only and reject every negotiation call.

use crate::format::{find_format, formats, BusCode, Colorspace, PadDirection, PixelFormat};
use crate::utils::align_down;
use crate::Error;

pub const MIN_WIDTH: u32 = 32;
pub const MAX_WIDTH: u32 = 4032;
pub const MIN_HEIGHT: u32 = 32;
pub const MAX_HEIGHT: u32 = 3024;

const DEFAULT_SINK_CODE: BusCode = BusCode::SRGGB10_1X10;
const DEFAULT_SOURCE_CODE: BusCode = BusCode::YUYV8_2X8;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IspPad {
    Sink,
    SinkParams,
    SourcePath,
    SourceStats,
}

impl IspPad {
    fn direction(self) -> Result<PadDirection, Error> {
        match self {
            IspPad::Sink => Ok(PadDirection::Sink),
            IspPad::SourcePath => Ok(PadDirection::Source),
            IspPad::SinkParams | IspPad::SourceStats => Err(Error::InvalidArgument),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SelectionTarget {
    Crop,
    CropBounds,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    /// Progressive.
    None,
}

/// Format on a pad, as proposed by a caller or committed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameFormat {
    pub code: BusCode,
    pub width: u32,
    pub height: u32,
    pub field: Field,
    pub colorspace: Colorspace,
}

impl FrameFormat {
    pub fn new(code: BusCode, width: u32, height: u32) -> Self {
        Self {
            code,
            width,
            height,
            field: Field::None,
            colorspace: Colorspace::Srgb,
        }
    }
}

#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// A `width`×`height` rectangle at the origin.
    pub const fn with_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }
}

/// Negotiated state of the ISP pads.
#[derive(Debug, Clone)]
pub struct IspSubdev {
    in_fmt: &'static PixelFormat,
    in_win: Rect,
    in_crop: Rect,
    out_fmt: &'static PixelFormat,
    out_win: Rect,
}

impl IspSubdev {
    /// Default state: the first sink format at `width`×`height`, no crop,
    /// the first source format over the whole acquisition window.
    pub fn new(width: u32, height: u32) -> Self {
        let in_win = Rect::with_size(
            width.clamp(MIN_WIDTH, MAX_WIDTH),
            height.clamp(MIN_HEIGHT, MAX_HEIGHT),
        );
        Self {
            in_fmt: &formats(PadDirection::Sink)[0],
            in_win,
            in_crop: in_win,
            out_fmt: &formats(PadDirection::Source)[0],
            out_win: in_win,
        }
    }

    pub fn in_fmt(&self) -> &'static PixelFormat {
        self.in_fmt
    }

    pub fn out_fmt(&self) -> &'static PixelFormat {
        self.out_fmt
    }

    /// Full sensor frame.
    pub fn in_win(&self) -> Rect {
        self.in_win
    }

    /// Acquisition window.
    pub fn in_crop(&self) -> Rect {
        self.in_crop
    }

    pub fn out_win(&self) -> Rect {
        self.out_win
    }

    /// The `index`-th bus code a pad accepts.
    pub fn enum_bus_code(pad: IspPad, index: usize) -> Result<BusCode, Error> {
        let direction = pad.direction()?;
        find_format(direction, None, Some(index))
            .map(|fmt| fmt.code)
            .ok_or(Error::InvalidArgument)
    }

    /// Resolves `proposed` against a pad's catalog and size limits.
    ///
    /// An unknown bus code falls back to the pad's default code.
    pub fn try_format(pad: IspPad, proposed: &FrameFormat) -> Result<FrameFormat, Error> {
        Self::resolve_format(pad, proposed).map(|(fmt, _)| fmt)
    }

    fn resolve_format(
        pad: IspPad,
        proposed: &FrameFormat,
    ) -> Result<(FrameFormat, &'static PixelFormat), Error> {
        let direction = pad.direction()?;
        let default_code = match direction {
            PadDirection::Sink => DEFAULT_SINK_CODE,
            PadDirection::Source => DEFAULT_SOURCE_CODE,
        };
        let entry = find_format(direction, Some(proposed.code), None)
            .or_else(|| find_format(direction, Some(default_code), None))
            .unwrap_or(&formats(direction)[0]);

        let fmt = FrameFormat {
            code: entry.code,
            width: proposed.width.clamp(MIN_WIDTH, MAX_WIDTH),
            height: proposed.height.clamp(MIN_HEIGHT, MAX_HEIGHT),
            field: Field::None,
            colorspace: entry.colorspace,
        };
        Ok((fmt, entry))
    }

    /// Commits a format. A new sink format drops any acquisition crop and
    /// pulls `out_win` back inside the new window.
    pub fn set_format(&mut self, pad: IspPad, proposed: &FrameFormat) -> Result<FrameFormat, Error> {
        let (fmt, entry) = Self::resolve_format(pad, proposed)?;
        let win = Rect::with_size(fmt.width, fmt.height);

        match pad {
            IspPad::Sink => {
                self.in_win = win;
                self.in_fmt = entry;
                self.in_crop = self.in_win;
                self.out_win = self.try_crop(IspPad::SourcePath, &self.out_win)?;
            }
            _ => {
                self.out_win = win;
                self.out_fmt = entry;
            }
        }
        Ok(fmt)
    }

    pub fn get_format(&self, pad: IspPad) -> Result<FrameFormat, Error> {
        let (entry, win) = match pad.direction()? {
            PadDirection::Sink => (self.in_fmt, self.in_win),
            PadDirection::Source => (self.out_fmt, self.out_win),
        };
        Ok(FrameFormat {
            code: entry.code,
            width: win.width,
            height: win.height,
            field: Field::None,
            colorspace: entry.colorspace,
        })
    }

    /// Bounding box of a pad's crop rectangle.
    fn crop_bounds(&self, pad: IspPad) -> Result<Rect, Error> {
        match pad.direction()? {
            PadDirection::Sink => Ok(self.in_win),
            PadDirection::Source => Ok(self.in_crop),
        }
    }

    /// Clamps `proposed` into the pad's bounding box.
    ///
    /// `left` and `width` are rounded down to even values; the result is at
    /// least `MIN_WIDTH`×`MIN_HEIGHT`.
    pub fn try_crop(&self, pad: IspPad, proposed: &Rect) -> Result<Rect, Error> {
        let bounds = self.crop_bounds(pad)?;

        let max_left = align_down(bounds.width.saturating_sub(MIN_WIDTH), 2);
        let left = align_down(proposed.left, 2).min(max_left);
        let max_width = align_down(bounds.width - left, 2);
        let width = align_down(proposed.width, 2).max(MIN_WIDTH).min(max_width);

        let max_top = bounds.height.saturating_sub(MIN_HEIGHT);
        let top = proposed.top.min(max_top);
        let height = proposed.height.max(MIN_HEIGHT).min(bounds.height - top);

        Ok(Rect::new(left, top, width, height))
    }

    pub fn get_selection(&self, pad: IspPad, target: SelectionTarget) -> Result<Rect, Error> {
        let direction = pad.direction()?;
        Ok(match (target, direction) {
            (SelectionTarget::CropBounds, _) => self.crop_bounds(pad)?,
            (SelectionTarget::Crop, PadDirection::Sink) => self.in_crop,
            (SelectionTarget::Crop, PadDirection::Source) => self.out_win,
        })
    }

    /// Commits a crop. Only [`SelectionTarget::Crop`] is writable.
    ///
    /// A new acquisition window re-clamps `out_win` into it.
    pub fn set_selection(
        &mut self,
        pad: IspPad,
        target: SelectionTarget,
        proposed: &Rect,
    ) -> Result<Rect, Error> {
        let direction = pad.direction()?;
        if target != SelectionTarget::Crop {
            return Err(Error::InvalidArgument);
        }

        let rect = self.try_crop(pad, proposed)?;
        match direction {
            PadDirection::Sink => {
                self.in_crop = rect;
                self.out_win = self.try_crop(IspPad::SourcePath, &self.out_win)?;
            }
            PadDirection::Source => self.out_win = rect,
        }
        Ok(rect)
    }
}

#[cfg(test)]
mod tests;
