//! Pipeline configuration.
//!
//! Turns the negotiated pad state and the sensor bus description into
//! register programming: input path select, MIPI receiver, acquisition
//! window, output window and image stabilization window.
//!
//! Configuration is not atomic. When a step fails, the registers written by
//! the steps before it keep their new values.

use crate::format::{BusCode, FormatFamily, PixelFormat};
use crate::pad::IspSubdev;
use crate::platform::{Csi2Bus, ParamsHooks, Platform, Quantization, SensorBusInfo, SensorLink};
use crate::regs::{
    csi2_dt, AcqProp, InputSelect, InterfaceSelect, IspCtrl, IspIrq, IspMode, MipiIrq, Regs,
    YuvSequence,
};
use crate::{Config, Error};

/// Enables the clocks of every ISP sub-block used by the capture pipeline.
pub(crate) fn config_clk(regs: &Regs<'_>) {
    regs.iccl().write(|w| {
        w.set_isp_clk(true);
        w.set_cp_clk(true);
        w.set_mrsz_clk(true);
        w.set_srsz_clk(true);
        w.set_jpeg_clk(true);
        w.set_mi_clk(true);
        w.set_mipi_clk(true);
        w.set_dcrop_clk(true);
    });
}

/// Full first-consumer configuration: input path, ISP core, stabilization window.
pub(crate) fn configure<P: Platform>(
    regs: &Regs<'_>,
    sd: &IspSubdev,
    bus: &SensorBusInfo,
    platform: &mut P,
    config: &Config,
) -> Result<(), Error> {
    debug!("ISP id 0x{:08X}", regs.vi_id().read());

    config_path(regs, sd.in_fmt(), bus, platform, config)?;
    config_isp(regs, sd, bus, platform, config)?;
    config_ism(regs, sd);
    Ok(())
}

/// Selects the parallel or MIPI input interface.
///
/// The interface select is written even when MIPI setup fails; the MIPI
/// error is returned afterwards.
pub(crate) fn config_path<S: SensorLink>(
    regs: &Regs<'_>,
    in_fmt: &PixelFormat,
    bus: &SensorBusInfo,
    sensor: &mut S,
    config: &Config,
) -> Result<(), Error> {
    let mut dpcl = regs.vi_dpcl().read();

    let result = match bus {
        SensorBusInfo::Parallel(_) | SensorBusInfo::Bt656(_) => {
            dpcl.set_if_select(InterfaceSelect::Parallel);
            Ok(())
        }
        SensorBusInfo::Csi2(csi) => {
            let result = config_mipi(regs, in_fmt, csi, sensor, config);
            dpcl.set_if_select(InterfaceSelect::Mipi);
            result
        }
    };

    regs.vi_dpcl().write_value(dpcl);
    result
}

/// CSI2 data type carrying `fmt`, if the receiver supports it.
pub fn csi2_data_type(fmt: &PixelFormat) -> Option<u8> {
    match fmt.family {
        FormatFamily::Yuv => match (fmt.xsubs, fmt.ysubs, fmt.bpp[0]) {
            (2, 2, 12) => Some(csi2_dt::YUV420_8B),
            (2, 2, 15) => Some(csi2_dt::YUV420_10B),
            (2, 1, 16) => Some(csi2_dt::YUV422_8B),
            (2, 1, 20) => Some(csi2_dt::YUV422_10B),
            _ => None,
        },
        FormatFamily::Bayer => match fmt.bpp[0] {
            8 => Some(csi2_dt::RAW8),
            10 => Some(csi2_dt::RAW10),
            12 => Some(csi2_dt::RAW12),
            _ => None,
        },
        _ => match fmt.code {
            BusCode::RGB565_1X16 => Some(csi2_dt::RGB565),
            BusCode::RGB666_1X18 => Some(csi2_dt::RGB666),
            BusCode::RGB888_1X24 => Some(csi2_dt::RGB888),
            _ => None,
        },
    }
}

fn config_mipi<S: SensorLink>(
    regs: &Regs<'_>,
    in_fmt: &PixelFormat,
    csi: &Csi2Bus,
    sensor: &mut S,
    config: &Config,
) -> Result<(), Error> {
    if !(1..=4).contains(&csi.lanes) {
        error!("unsupported CSI2 lane count {}", csi.lanes);
        return Err(Error::InvalidConfiguration);
    }

    sensor.set_lane_count(csi.lanes);
    if let Some(rate) = csi.link_frequency {
        sensor.set_link_rate(rate);
    }

    regs.iccl().modify(|w| w.set_mipi_clk(true));

    regs.mipi_ctrl().write(|w| {
        w.set_num_lanes(csi.lanes - 1);
        w.set_shutdown_lanes(0xf);
        w.set_err_sot_sync_hs_skip(true);
        w.set_clocklane_ena(true);
    });

    let Some(data_type) = csi2_data_type(in_fmt) else {
        error!("no CSI2 data type for bus code 0x{:04X}", in_fmt.code.0);
        return Err(Error::InvalidConfiguration);
    };

    regs.mipi_img_data_sel().write(|w| {
        w.set_data_type(data_type);
        w.set_virtual_channel(config.virtual_channel & 0x3);
    });

    regs.mipi_icr().write_value(MipiIrq::ALL);
    regs.mipi_imsc().write_value(MipiIrq::base_mask());

    debug!(
        "MIPI_CTRL 0x{:08X} IMG_DATA_SEL 0x{:08X} STATUS 0x{:08X} IMSC 0x{:08X}",
        regs.mipi_ctrl().read().into_bits(),
        regs.mipi_img_data_sel().read().into_bits(),
        regs.mipi_status().read(),
        regs.mipi_imsc().read().into_bits(),
    );
    Ok(())
}

/// Programs the ISP core: acquisition mode and properties, acquisition and
/// output windows, interrupt mask. Hands the parameter node its setup.
pub(crate) fn config_isp<P: ParamsHooks>(
    regs: &Regs<'_>,
    sd: &IspSubdev,
    bus: &SensorBusInfo,
    params: &mut P,
    config: &Config,
) -> Result<(), Error> {
    let in_fmt = sd.in_fmt();
    let out_fmt = sd.out_fmt();
    let in_crop = sd.in_crop();
    let bt656 = matches!(bus, SensorBusInfo::Bt656(_));

    let mut ctrl = IspCtrl::new();
    let mut acq = AcqProp::new();
    let mut irq_mask = IspIrq::new();
    // Horizontal samples per pixel.
    let mut acq_mult = 1;

    regs.iccl().modify(|w| w.set_isp_clk(true));

    match in_fmt.family {
        FormatFamily::Bayer => {
            if out_fmt.is_bayer() {
                ctrl.set_mode(if bt656 {
                    IspMode::RawPictureItu656
                } else {
                    IspMode::RawPicture
                });
            } else {
                regs.isp_demosaic()
                    .write(|w| w.set_threshold(config.demosaic_threshold));
                ctrl.set_mode(if bt656 {
                    IspMode::BayerItu656
                } else {
                    IspMode::BayerItu601
                });
            }

            acq.set_input_select(match in_fmt.bpp[0] {
                8 => InputSelect::Bits8Msb,
                10 => InputSelect::Bits10Msb,
                12 => InputSelect::Bits12,
                depth => {
                    error!("unsupported Bayer depth {}", depth);
                    return Err(Error::InvalidConfiguration);
                }
            });
            acq.set_bayer_pattern(in_fmt.bayer_pattern.ok_or(Error::InvalidConfiguration)?);
        }
        FormatFamily::Yuv => {
            acq_mult = 2;
            match bus {
                SensorBusInfo::Csi2(_) => {
                    acq.set_input_select(InputSelect::Bits12);
                    ctrl.set_mode(IspMode::Itu601);
                }
                SensorBusInfo::Parallel(p) | SensorBusInfo::Bt656(p) => {
                    ctrl.set_mode(if bt656 { IspMode::Itu656 } else { IspMode::Itu601 });
                    acq.set_input_select(match p.bus_width {
                        8 => InputSelect::Bits8Zero,
                        10 => InputSelect::Bits10Zero,
                        12 => InputSelect::Bits12,
                        width => {
                            error!("unsupported parallel bus width {}", width);
                            return Err(Error::InvalidConfiguration);
                        }
                    });
                }
            }

            irq_mask.set_data_loss(true);

            // yc_swap wins when a format sets both swap flags.
            acq.set_ccir_seq(if in_fmt.yc_swap {
                YuvSequence::CbYCrY
            } else if in_fmt.uv_swap {
                YuvSequence::YCrYCb
            } else {
                YuvSequence::YCbYCr
            });
        }
        family => {
            error!("sink format family {:?} cannot be acquired", family);
            return Err(Error::InvalidConfiguration);
        }
    }

    match bus {
        SensorBusInfo::Parallel(p) => {
            acq.set_sample_pos_edge(p.pclk_sample_rising);
            acq.set_vsync_low(p.vsync_active_low);
            acq.set_hsync_low(p.hsync_active_low);
        }
        SensorBusInfo::Bt656(p) => acq.set_sample_pos_edge(p.pclk_sample_rising),
        SensorBusInfo::Csi2(_) => {}
    }

    regs.isp_ctrl().write_value(ctrl);
    regs.isp_acq_prop().write_value(acq);
    regs.isp_acq_nr_frames().write_value(0);

    regs.isp_acq_h_offs().write_value(acq_mult * in_crop.left);
    regs.isp_acq_v_offs().write_value(in_crop.top);
    regs.isp_acq_h_size().write_value(acq_mult * in_crop.width);
    regs.isp_acq_v_size().write_value(in_crop.height);

    regs.isp_out_h_offs().write_value(0);
    regs.isp_out_v_offs().write_value(0);
    regs.isp_out_h_size().write_value(in_crop.width);
    regs.isp_out_v_size().write_value(in_crop.height);

    irq_mask.set_frame(true);
    irq_mask.set_pic_size_error(true);
    irq_mask.set_frame_in(true);
    irq_mask.set_v_start(true);
    regs.isp_imsc().write_value(irq_mask);

    if out_fmt.is_bayer() {
        params.params_disable();
    } else {
        params.params_configure(in_fmt, Quantization::FullRange);
    }

    Ok(())
}

/// Programs the image stabilization window from `out_win` and enables it.
pub(crate) fn config_ism(regs: &Regs<'_>, sd: &IspSubdev) {
    let out = sd.out_win();

    regs.is_recenter().write_value(0);
    regs.is_max_dx().write_value(0);
    regs.is_max_dy().write_value(0);
    regs.is_displace().write_value(0);
    regs.is_h_offs().write_value(out.left);
    regs.is_v_offs().write_value(out.top);
    regs.is_h_size().write_value(out.width);
    regs.is_v_size().write_value(out.height);

    regs.is_ctrl().write(|w| w.set_is_enable(true));
    regs.isp_ctrl().modify(|w| w.set_cfg_upd(true));
}
