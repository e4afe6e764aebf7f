//! Output path resizers and dual crop.

use crate::io::RegisterIo;
use crate::pad::Rect;
use crate::platform::{PathId, Platform};
use crate::regs::{DualCropMode, RszCtrl, SCALE_FACTOR};
use crate::{Error, Isp};

/// Plane size in pixels.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Resizer programming for one path.
///
/// A `None` factor means the axis is disabled and its register must be left
/// untouched.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScaleConfig {
    pub ctrl: RszCtrl,
    /// Luma horizontal.
    pub hy: Option<u32>,
    /// Chroma horizontal, shared by Cb and Cr.
    pub hc: Option<u32>,
    /// Luma vertical.
    pub vy: Option<u32>,
    /// Chroma vertical.
    pub vc: Option<u32>,
}

/// Scale direction and factor of one axis, `None` when no scaling is needed.
fn axis(input: u32, output: u32) -> Result<Option<(bool, u32)>, Error> {
    if input < 2 || output < 2 {
        return Err(Error::InvalidArgument);
    }

    let (i, o, f) = (input as u64, output as u64, SCALE_FACTOR as u64);
    Ok(match input.cmp(&output) {
        core::cmp::Ordering::Equal => None,
        core::cmp::Ordering::Less => Some((true, ((i - 1) * f / (o - 1)) as u32)),
        core::cmp::Ordering::Greater => Some((false, ((o - 1) * f / (i - 1) + 1) as u32)),
    })
}

/// Computes the resizer factors taking `in_y`/`in_c` to `out_y`/`out_c`.
///
/// Every size must be at least 2 along both axes.
pub fn compute_scale(in_y: Size, in_c: Size, out_y: Size, out_c: Size) -> Result<ScaleConfig, Error> {
    let hy = axis(in_y.width, out_y.width)?;
    let hc = axis(in_c.width, out_c.width)?;
    let vy = axis(in_y.height, out_y.height)?;
    let vc = axis(in_c.height, out_c.height)?;

    let mut ctrl = RszCtrl::new();
    if let Some((up, _)) = hy {
        ctrl.set_hy_enable(true);
        ctrl.set_hy_up(up);
    }
    if let Some((up, _)) = hc {
        ctrl.set_hc_enable(true);
        ctrl.set_hc_up(up);
    }
    if let Some((up, _)) = vy {
        ctrl.set_vy_enable(true);
        ctrl.set_vy_up(up);
    }
    if let Some((up, _)) = vc {
        ctrl.set_vc_enable(true);
        ctrl.set_vc_up(up);
    }

    Ok(ScaleConfig {
        ctrl,
        hy: hy.map(|(_, f)| f),
        hc: hc.map(|(_, f)| f),
        vy: vy.map(|(_, f)| f),
        vc: vc.map(|(_, f)| f),
    })
}

impl<R: RegisterIo, P: Platform> Isp<R, P> {
    /// Programs the resizer of `path`.
    ///
    /// Only enabled factors are written. The control register goes last,
    /// with an immediate shadow update.
    pub fn set_scale(
        &self,
        path: PathId,
        in_y: Size,
        in_c: Size,
        out_y: Size,
        out_c: Size,
    ) -> Result<ScaleConfig, Error> {
        let scale = compute_scale(in_y, in_c, out_y, out_c)?;
        let rsz = self.regs().rsz(path);

        critical_section::with(|_| {
            if let Some(f) = scale.hy {
                rsz.scale_hy().write_value(f);
            }
            if let Some(f) = scale.hc {
                rsz.scale_hcb().write_value(f);
                rsz.scale_hcr().write_value(f);
            }
            if let Some(f) = scale.vy {
                rsz.scale_vy().write_value(f);
            }
            if let Some(f) = scale.vc {
                rsz.scale_vc().write_value(f);
            }
            rsz.ctrl().write_value(scale.ctrl.with_cfg_upd(true));
        });

        debug!(
            "{:?} resizer: Y {}x{} -> {}x{}, C {}x{} -> {}x{}",
            path,
            in_y.width,
            in_y.height,
            out_y.width,
            out_y.height,
            in_c.width,
            in_c.height,
            out_c.width,
            out_c.height,
        );
        Ok(scale)
    }

    /// Logs the resizer registers of `path` and their shadow copies.
    pub fn dump_rsz_regs(&self, path: PathId) {
        let rsz = self.regs().rsz(path);
        debug!(
            "{:?} RSZ_CTRL 0x{:08X}/0x{:08X}",
            path,
            rsz.ctrl().read().into_bits(),
            rsz.ctrl_shd().read().into_bits(),
        );

        let pairs = [
            (rsz.scale_hy(), rsz.scale_hy_shd()),
            (rsz.scale_hcb(), rsz.scale_hcb_shd()),
            (rsz.scale_hcr(), rsz.scale_hcr_shd()),
            (rsz.scale_vy(), rsz.scale_vy_shd()),
            (rsz.scale_vc(), rsz.scale_vc_shd()),
            (rsz.phase_hy(), rsz.phase_hy_shd()),
            (rsz.phase_hc(), rsz.phase_hc_shd()),
            (rsz.phase_vy(), rsz.phase_vy_shd()),
            (rsz.phase_vc(), rsz.phase_vc_shd()),
        ];
        for (reg, shd) in pairs {
            debug!(
                "  {} 0x{:08X}, shadow 0x{:08X}",
                crate::regs::RszRegs::name(reg.offset() - rsz.base()).unwrap_or("?"),
                reg.read(),
                shd.read(),
            );
        }
    }

    /// Crops the input of `path` to `rect` and turns its dual crop on in YUV mode.
    ///
    /// `async_update` latches the new window at the next frame instead of
    /// immediately.
    pub fn config_dcrop(&self, path: PathId, rect: &Rect, async_update: bool) {
        let regs = self.regs();
        let [h_offs, v_offs, h_size, v_size] = regs.dual_crop_window(path);

        critical_section::with(|_| {
            h_offs.write_value(rect.left);
            v_offs.write_value(rect.top);
            h_size.write_value(rect.width);
            v_size.write_value(rect.height);

            regs.dual_crop_ctrl().modify(|w| {
                w.set_path_mode(path, DualCropMode::Yuv);
                if async_update {
                    w.set_gen_cfg_upd(true);
                } else {
                    w.set_cfg_upd(true);
                }
            });
        });

        debug!(
            "{:?} dual crop {}x{}+{}+{}",
            path, rect.width, rect.height, rect.left, rect.top
        );
    }

    /// Turns the dual crop of `path` off.
    pub fn disable_dcrop(&self, path: PathId, async_update: bool) {
        self.regs().dual_crop_ctrl().modify(|w| {
            w.set_path_mode(path, DualCropMode::Bypass);
            if async_update {
                w.set_gen_cfg_upd(true);
            } else {
                w.set_cfg_upd(true);
            }
        });
    }
}
