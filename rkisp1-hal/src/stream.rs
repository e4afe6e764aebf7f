//! Power and stream sequencing.
//!
//! Up to three consumers start and stop the ISP: both output paths and the
//! ISP pad itself. Only the first `start` programs the hardware and only the
//! last `stop` shuts it down; the transition check and the count update
//! happen under one lock.

use embassy_time::block_for;
use portable_atomic::Ordering;

use crate::io::RegisterIo;
use crate::pipeline;
use crate::platform::{Platform, SensorBusInfo};
use crate::regs::{Ircl, IspIrq, MiIrq, MipiIrq, Regs};
use crate::utils::blocking_wait_timeout;
use crate::{Error, Isp};

impl<R: RegisterIo, P: Platform> Isp<R, P> {
    /// Powers the ISP block up or down.
    ///
    /// Does nothing while any consumer is streaming, the active stream owns
    /// the power state.
    pub fn power(&self, on: bool) -> Result<(), Error> {
        self.with_shared(|regs, shared| {
            if shared.streamon_count > 0 {
                return Ok(());
            }

            if on {
                shared.platform.power_up().map_err(|_| {
                    error!("ISP power up failed");
                    Error::ResourceUnavailable
                })?;
                pipeline::config_clk(regs);
                shared.power_on = true;
            } else {
                shared.platform.power_down().map_err(|_| Error::ResourceUnavailable)?;
                shared.power_on = false;
            }
            Ok(())
        })
    }

    /// Registers one streaming consumer, configuring and enabling the ISP
    /// for the first one.
    ///
    /// When configuration fails the consumer is not counted and the error is
    /// returned; registers already written keep their values.
    pub fn start(&self) -> Result<(), Error> {
        self.with_shared(|regs, shared| {
            let prev = shared.streamon_count;
            shared.streamon_count += 1;
            if prev > 0 {
                return Ok(());
            }

            if !shared.power_on {
                warn!("ISP started without power");
            }

            self.frame_sync_seq.store(0, Ordering::Relaxed);
            let bus = shared.platform.bus_info();
            if let Err(e) = pipeline::configure(regs, &self.subdev, &bus, &mut shared.platform, &self.config) {
                shared.streamon_count -= 1;
                return Err(e);
            }

            isp_enable(regs, &bus);
            block_for(self.config.mipi_settle);

            info!(
                "ISP started, ISP_CTRL 0x{:08X} MIPI_CTRL 0x{:08X}",
                regs.isp_ctrl().read().into_bits(),
                regs.mipi_ctrl().read().into_bits(),
            );
            Ok(())
        })
    }

    /// Drops one streaming consumer, stopping and resetting the ISP after
    /// the last one.
    ///
    /// The ISP-off poll is bounded by `Config::isp_off_timeout`; on timeout
    /// the reset is issued anyway.
    pub fn stop(&self) -> Result<(), Error> {
        self.with_shared(|regs, shared| {
            if shared.streamon_count == 0 {
                warn!("ISP stop without matching start");
                return Err(Error::InvalidArgument);
            }

            shared.streamon_count -= 1;
            if shared.streamon_count > 0 {
                return Ok(());
            }

            isp_disable(regs);

            if let Err(e) = blocking_wait_timeout(
                || !regs.isp_ris().read().isp_off(),
                self.config.isp_off_timeout,
            )
            .map_err(|_| Error::Timeout)
            {
                warn!("ISP off not confirmed: {:?}", e);
            }

            regs.ircl().write(|w| {
                w.set_mipi_sw_rst(true);
                w.set_isp_sw_rst(true);
            });
            regs.ircl().write_value(Ircl::new());

            info!("ISP stopped, RIS 0x{:08X}", regs.isp_ris().read().into_bits());
            Ok(())
        })
    }

    /// Starts or stops one consumer.
    pub fn set_stream(&self, on: bool) -> Result<(), Error> {
        if on {
            self.start()
        } else {
            self.stop()
        }
    }
}

fn isp_enable(regs: &Regs<'_>, bus: &SensorBusInfo) {
    critical_section::with(|_| {
        if bus.is_csi2() {
            regs.mipi_ctrl().modify(|w| w.set_output_ena(true));
        }
        regs.isp_ctrl().modify(|w| {
            w.set_cfg_upd(true);
            w.set_inform_enable(true);
            w.set_isp_enable(true);
        });
    });
}

/// Masks and acknowledges every interrupt source, then turns the MIPI
/// output and the ISP off.
fn isp_disable(regs: &Regs<'_>) {
    critical_section::with(|_| {
        regs.mipi_imsc().write_value(MipiIrq::new());
        regs.mipi_icr().write_value(MipiIrq::ALL);
        regs.isp_imsc().write_value(IspIrq::new());
        regs.isp_icr().write_value(IspIrq::ALL);
        regs.mi_imsc().write_value(MiIrq::new());
        regs.mi_icr().write_value(MiIrq::ALL);

        regs.mipi_ctrl().modify(|w| w.set_output_ena(false));
        regs.isp_ctrl().modify(|w| {
            w.set_inform_enable(false);
            w.set_isp_enable(false);
        });
        regs.isp_ctrl().modify(|w| w.set_cfg_upd(true));
    });
}
