//! Interrupt handling.
//!
//! The interrupt dispatch layer calls [`Isp::on_interrupt`], or the two
//! per-source handlers directly when the lines are separate. Handlers never
//! block; every register burst runs under the device lock.

use embassy_time::Instant;
use portable_atomic::Ordering;

use crate::io::RegisterIo;
use crate::isp::Shared;
use crate::platform::{PathId, PathState, Platform};
use crate::regs::{Ircl, IspIrq, MiIrq, MipiIrq, Regs};
use crate::utils::BitIter;
use crate::{Error, Isp};

/// What one ISP interrupt did, for the caller's bookkeeping.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IspIrqOutcome {
    /// Sequence number of the frame-sync event emitted, if any.
    pub frame_sync: Option<u32>,
    /// Set to [`Error::HardwareFault`] when a fatal condition forced a restart.
    pub fault: Option<Error>,
    /// Output paths whose frame-done status was forced.
    pub forced_frame_done: MiIrq,
}

impl<R: RegisterIo, P: Platform> Isp<R, P> {
    /// Combined interrupt entry: services the MIPI receiver, then the ISP core.
    pub fn on_interrupt(&self) -> IspIrqOutcome {
        let regs = self.regs();

        let mipi = regs.mipi_mis().read();
        if mipi.into_bits() != 0 {
            self.mipi_isr(mipi);
        }

        let isp = regs.isp_mis().read();
        if isp.into_bits() != 0 {
            self.isp_isr(isp)
        } else {
            IspIrqOutcome::default()
        }
    }

    /// MIPI receiver interrupt, `mis` being the masked status read by the caller.
    pub fn mipi_isr(&self, mis: MipiIrq) {
        let regs = self.regs();

        critical_section::with(|_| {
            regs.mipi_icr().write_value(MipiIrq::ALL);

            if mis.err_ctrl() & MipiIrq::ERR_CTRL_LANES != 0 {
                // Control errors latch until the next line state change.
                regs.mipi_imsc()
                    .modify(|w| w.set_err_ctrl(w.err_ctrl() & !MipiIrq::ERR_CTRL_LANES));
                warn!("MIPI control error 0x{:X}, masked", mis.err_ctrl());
            } else if mis == MipiIrq::new().with_frame_end(true) {
                regs.mipi_imsc()
                    .modify(|w| w.set_err_ctrl(w.err_ctrl() | MipiIrq::ERR_CTRL_LANES));
            } else {
                warn!("MIPI receiver error, MIS 0x{:08X}", mis.into_bits());
                for bit in BitIter(mis.into_bits()) {
                    debug!("  MIPI status bit {}", bit);
                }
            }
        });
    }

    /// ISP core interrupt, `mis` being the masked status read by the caller.
    pub fn isp_isr(&self, mis: IspIrq) -> IspIrqOutcome {
        self.with_shared(|regs, shared| {
            let mut outcome = IspIrqOutcome::default();

            if mis.v_start() {
                let now = Instant::now();
                shared.platform.stats_v_start(now);
                shared.platform.params_v_start();

                let seq = self.frame_sync_seq.fetch_add(1, Ordering::Relaxed);
                shared.platform.frame_sync(seq);
                outcome.frame_sync = Some(seq);

                regs.isp_icr().write_value(IspIrq::new().with_v_start(true));
                if regs.isp_mis().read().v_start() {
                    error!("v_start not cleared");
                }
                regs.isp_ctrl().modify(|w| w.set_gen_cfg_upd(true));
            }

            if mis.frame_in() {
                shared.platform.stats_frame_in(Instant::now());
                regs.isp_icr().write_value(IspIrq::new().with_frame_in(true));
            }

            if mis.pic_size_error() || mis.data_loss() {
                if mis.pic_size_error() {
                    regs.isp_icr().write_value(IspIrq::new().with_pic_size_error(true));
                    let err = regs.isp_err().read();
                    regs.isp_err_clr().write_value(err);
                    error!("ISP picture size error, ERR 0x{:08X}", err);
                } else {
                    regs.isp_icr().write_value(IspIrq::new().with_data_loss(true));
                    let err = regs.isp_err().read();
                    regs.isp_err_clr().write_value(err);
                    error!("ISP data loss, ERR 0x{:08X}", err);
                }

                regs.isp_ctrl().modify(|w| {
                    w.set_inform_enable(false);
                    w.set_isp_enable(false);
                });
                regs.isp_ctrl().modify(|w| w.set_cfg_upd(true));

                hw_restart(regs, shared);
                outcome.fault = Some(Error::HardwareFault);
            }

            if mis.frame_in() {
                regs.isp_icr().write_value(IspIrq::new().with_frame_in(true));
                if regs.isp_mis().read().frame_in() {
                    error!("frame_in not cleared");
                }

                let starved = starved_paths(shared);
                if starved.into_bits() != 0 {
                    regs.mi_isr().write_value(starved);
                    outcome.forced_frame_done = starved;
                }
            }

            if mis.frame() {
                regs.isp_icr().write_value(IspIrq::new().with_frame(true));
                if regs.isp_mis().read().frame() {
                    error!("frame end not cleared");
                }
            }

            shared.platform.stats_isr(mis);
            shared.platform.params_isr(mis);

            outcome
        })
    }
}

/// Frame-end bits of the streaming paths, when neither path holds a next
/// buffer. Empty otherwise.
fn starved_paths<P: Platform>(shared: &Shared<P>) -> MiIrq {
    let mut bits = MiIrq::new();
    if PathId::ALL
        .into_iter()
        .any(|path| shared.platform.has_pending_next_buffer(path))
    {
        return bits;
    }
    for path in PathId::ALL {
        if shared.platform.path_state(path) == PathState::Streaming {
            bits.set_frame_end(path, true);
        }
    }
    bits
}

/// Resets the MIPI receiver, ISP core and memory interface, then re-enables
/// streaming with the configuration already in place.
fn hw_restart<P: Platform>(regs: &Regs<'_>, shared: &Shared<P>) {
    critical_section::with(|_| {
        regs.ircl().write(|w| {
            w.set_mipi_sw_rst(true);
            w.set_isp_sw_rst(true);
            w.set_mi_sw_rst(true);
        });
        regs.ircl().write_value(Ircl::new());

        regs.mipi_imsc().write_value(MipiIrq::base_mask());

        let mut mi_mask = MiIrq::new();
        for path in PathId::ALL {
            if shared.platform.path_state(path) == PathState::Streaming {
                mi_mask.set_frame_end(path, true);
            }
        }
        regs.mi_imsc().write_value(mi_mask);

        for reg in regs.mi_offs_cnt_init() {
            reg.write_value(0);
        }
        regs.mi_ctrl().modify(|w| w.set_init_offset_en(true));

        regs.isp_ctrl().modify(|w| {
            w.set_cfg_upd(true);
            w.set_isp_enable(true);
            w.set_inform_enable(true);
        });
        regs.mipi_ctrl().modify(|w| w.set_output_ena(true));
    });

    info!("ISP restarted");
}
