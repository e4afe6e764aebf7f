mod common;

use common::*;
use rkisp1_hal::pad::{IspPad, Rect, SelectionTarget};
use rkisp1_hal::platform::{PathId, PathState};
use rkisp1_hal::regs::{IspIrq, MiIrq, MipiIrq};
use rkisp1_hal::rsz::Size;
use rkisp1_hal::{Error, IspIrqOutcome};

fn streaming() -> TestIsp {
    let mut isp = rggb10_720p();
    isp.subdev_mut()
        .set_selection(IspPad::Sink, SelectionTarget::Crop, &Rect::new(64, 0, 1024, 720))
        .unwrap();
    isp.with_platform(|p| p.paths = [PathState::Streaming, PathState::Ready]);
    isp.start().unwrap();
    isp.start().unwrap();
    isp
}

#[test]
fn data_loss_restarts_without_touching_stream_state() {
    let isp = streaming();
    let crop = isp.subdev().in_crop();
    let ctrl_writes = isp.io().writes_to(ISP_CTRL).len();

    isp.io().raise(ISP_MIS, IspIrq::new().with_data_loss(true).into_bits());
    let outcome = isp.on_interrupt();

    assert_eq!(outcome.fault, Some(Error::HardwareFault));
    assert_eq!(isp.streamon_count(), 2);
    assert_eq!(isp.subdev().in_crop(), crop);

    // Disabled first, then re-enabled by the restart.
    let writes = isp.io().writes_to(ISP_CTRL);
    let disabled = writes[ctrl_writes..].iter().position(|v| v & 0x11 == 0);
    assert!(disabled.is_some());
    assert_eq!(writes.last().unwrap() & 0x211, 0x211);

    let ircl = isp.io().writes_to(IRCL);
    assert_eq!(ircl[ircl.len() - 2..], [(1 << 0) | (1 << 6) | (1 << 11), 0]);

    let regs = isp.regs();
    assert!(regs.mipi_ctrl().read().output_ena());
    assert_eq!(regs.mipi_imsc().read(), MipiIrq::base_mask());
    assert_eq!(regs.mi_imsc().read(), MiIrq::new().with_sp_frame(true));
    assert!(!regs.isp_ris().read().data_loss());
}

#[test]
fn restart_keeps_frame_sync_running() {
    let isp = streaming();

    isp.io().raise(ISP_MIS, IspIrq::new().with_v_start(true).into_bits());
    assert_eq!(isp.on_interrupt().frame_sync, Some(0));

    isp.io().raise(ISP_MIS, IspIrq::new().with_pic_size_error(true).into_bits());
    assert_eq!(isp.on_interrupt().fault, Some(Error::HardwareFault));

    isp.io().raise(ISP_MIS, IspIrq::new().with_v_start(true).into_bits());
    assert_eq!(isp.on_interrupt().frame_sync, Some(1));

    isp.with_platform(|p| {
        let syncs: Vec<_> = p
            .events
            .iter()
            .filter_map(|e| match e {
                Event::FrameSync(seq) => Some(*seq),
                _ => None,
            })
            .collect();
        assert_eq!(syncs, [0, 1]);
    });
}

#[test]
fn sequence_restarts_with_each_session() {
    let isp = rggb10_720p();
    let v_start = IspIrq::new().with_v_start(true);

    isp.start().unwrap();
    isp.isp_isr(v_start);
    isp.isp_isr(v_start);
    isp.stop().unwrap();

    isp.start().unwrap();
    assert_eq!(isp.frame_sync_seq(), 0);
    assert_eq!(isp.isp_isr(v_start).frame_sync, Some(0));
}

#[test]
fn core_bits_are_handled_before_hooks() {
    let isp = streaming();
    let mis = IspIrq::new()
        .with_v_start(true)
        .with_frame_in(true)
        .with_frame(true)
        .with_awb_done(true);

    isp.io().raise(ISP_MIS, mis.into_bits());
    isp.on_interrupt();

    isp.with_platform(|p| {
        let tail = &p.events[p.events.len() - 6..];
        assert_eq!(
            tail,
            [
                Event::StatsVStart,
                Event::ParamsVStart,
                Event::FrameSync(0),
                Event::StatsFrameIn,
                Event::StatsIsr(mis),
                Event::ParamsIsr(mis),
            ]
        );
    });

    // Only the hook-owned bit is left pending.
    assert_eq!(isp.regs().isp_mis().read(), IspIrq::new().with_awb_done(true));
}

#[test]
fn starved_path_is_forced_done_and_hooks_still_run() {
    let isp = streaming();

    isp.io().raise(ISP_MIS, IspIrq::new().with_frame_in(true).into_bits());
    let outcome = isp.on_interrupt();

    assert_eq!(outcome.forced_frame_done, MiIrq::new().with_sp_frame(true));
    assert_eq!(isp.regs().mi_isr().read(), MiIrq::new().with_sp_frame(true));
    isp.with_platform(|p| assert_eq!(p.count(|e| matches!(e, Event::StatsIsr(_))), 1));

    isp.with_platform(|p| p.next_buffer[0] = true);
    isp.io().raise(ISP_MIS, IspIrq::new().with_frame_in(true).into_bits());
    assert_eq!(isp.on_interrupt(), IspIrqOutcome::default());
}

#[test]
fn mipi_control_errors_rearm_on_clean_frame_end() {
    let isp = streaming();
    let regs = isp.regs();

    isp.io().raise(MIPI_MIS, MipiIrq::new().with_err_ctrl(0x3).into_bits());
    isp.on_interrupt();
    assert_eq!(regs.mipi_imsc().read().err_ctrl(), 0);
    assert_eq!(regs.mipi_mis().read().into_bits(), 0);

    isp.io().raise(MIPI_MIS, MipiIrq::new().with_frame_end(true).into_bits());
    isp.on_interrupt();
    assert_eq!(regs.mipi_imsc().read(), MipiIrq::base_mask());
}

#[test]
fn resizer_and_dual_crop_programming() {
    let isp = streaming();
    let rsz = isp.regs().rsz(PathId::MainPath);
    rsz.scale_hy().write_value(0x8000);
    rsz.scale_hcb().write_value(0x4000);

    let scale = isp
        .set_scale(
            PathId::MainPath,
            Size::new(1024, 720),
            Size::new(512, 720),
            Size::new(1024, 360),
            Size::new(512, 360),
        )
        .unwrap();
    assert_eq!((scale.hy, scale.hc), (None, None));

    assert_eq!(rsz.scale_vy().read(), 359 * 65536 / 719 + 1);
    // Unscaled axes keep whatever they held.
    assert_eq!(rsz.scale_hy().read(), 0x8000);
    assert_eq!(rsz.scale_hcb().read(), 0x4000);
    let ctrl = rsz.ctrl().read();
    assert!(ctrl.vy_enable() && ctrl.vc_enable() && ctrl.cfg_upd());
    assert!(!ctrl.hy_enable());
    // Control goes last.
    assert_eq!(isp.io().writes_to(0x0c00).len(), 1);
    isp.dump_rsz_regs(PathId::MainPath);

    isp.config_dcrop(PathId::SelfPath, &Rect::new(8, 4, 640, 480), true);
    let dcrop = isp.regs().dual_crop_ctrl().read();
    assert!(dcrop.gen_cfg_upd() && !dcrop.cfg_upd());
    assert_eq!(
        dcrop.path_mode(PathId::SelfPath),
        rkisp1_hal::regs::DualCropMode::Yuv
    );
    assert_eq!(isp.regs().dual_crop_s_h_size().read(), 640);

    isp.disable_dcrop(PathId::SelfPath, false);
    let dcrop = isp.regs().dual_crop_ctrl().read();
    assert_eq!(
        dcrop.path_mode(PathId::SelfPath),
        rkisp1_hal::regs::DualCropMode::Bypass
    );
    assert!(dcrop.cfg_upd());

    assert_eq!(
        isp.set_scale(
            PathId::SelfPath,
            Size::new(1, 1),
            Size::new(1, 1),
            Size::new(2, 2),
            Size::new(2, 2)
        ),
        Err(Error::InvalidArgument)
    );
}
