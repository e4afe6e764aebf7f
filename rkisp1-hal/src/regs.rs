//! ISP1 register map.
//!
//! Offsets are bytes from the start of the ISP register window. Value types
//! are `bitfield-struct` words: named fields in, raw `u32` out at the
//! [`RegisterIo`](crate::io::RegisterIo) boundary.

use bitfield_struct::bitfield;

use crate::format::BayerPattern;
use crate::io::RegisterIo;
use crate::platform::PathId;

/// Size of the ISP register window in bytes.
pub const WINDOW_SIZE: u32 = 0x4000;

/// Fixed-point unity of the resizer scale registers.
pub const SCALE_FACTOR: u32 = 1 << 16;

pub const MRSZ_BASE: u32 = 0x0c00;
pub const SRSZ_BASE: u32 = 0x1000;

// ============================================================================
// Field encodings
// ============================================================================

field_enum! {
    /// ISP_CTRL acquisition mode.
    IspMode {
        RawPicture = 0,
        Itu656 = 1,
        Itu601 = 2,
        BayerItu601 = 3,
        DataMode = 4,
        BayerItu656 = 5,
        RawPictureItu656 = 6,
        Reserved = 7,
    }
    fallback Reserved
}

field_enum! {
    /// ACQ_PROP input bit-depth select.
    InputSelect {
        Bits12 = 0,
        Bits10Zero = 1,
        Bits10Msb = 2,
        Bits8Zero = 3,
        Bits8Msb = 4,
        Reserved = 7,
    }
    fallback Reserved
}

field_enum! {
    /// ACQ_PROP YUV component order (CCIR sequence).
    YuvSequence {
        YCbYCr = 0,
        YCrYCb = 1,
        CbYCrY = 2,
        CrYCbY = 3,
    }
    fallback YCbYCr
}

field_enum! {
    /// VI_DPCL input interface select.
    InterfaceSelect {
        Parallel = 0,
        Smia = 1,
        Mipi = 2,
        Reserved = 3,
    }
    fallback Reserved
}

field_enum! {
    /// Dual crop mode of one output path.
    DualCropMode {
        Bypass = 0,
        Yuv = 1,
        Raw = 2,
        Reserved = 3,
    }
    fallback Reserved
}

/// CSI2 data type codes written to MIPI_IMG_DATA_SEL.
pub mod csi2_dt {
    pub const YUV420_8B: u8 = 0x18;
    pub const YUV420_10B: u8 = 0x19;
    pub const YUV422_8B: u8 = 0x1e;
    pub const YUV422_10B: u8 = 0x1f;
    pub const RGB565: u8 = 0x22;
    pub const RGB666: u8 = 0x23;
    pub const RGB888: u8 = 0x24;
    pub const RAW8: u8 = 0x2a;
    pub const RAW10: u8 = 0x2b;
    pub const RAW12: u8 = 0x2c;
}

/// MI_CTRL self-path input format for YUV 4:2:2 data.
pub const MI_CTRL_SP_INPUT_YUV422: u32 = 2 << 26;

// ============================================================================
// Value types
// ============================================================================

/// Internal clock control.
#[bitfield(u32, defmt = cfg(feature = "defmt"))]
#[derive(PartialEq, Eq)]
pub struct Iccl {
    pub isp_clk: bool,
    pub cp_clk: bool,
    #[bits(1)]
    __r2: u8,
    pub mrsz_clk: bool,
    pub srsz_clk: bool,
    pub jpeg_clk: bool,
    pub mi_clk: bool,
    #[bits(1)]
    __r7: u8,
    pub ie_clk: bool,
    pub simp_clk: bool,
    pub smia_clk: bool,
    pub mipi_clk: bool,
    pub dcrop_clk: bool,
    #[bits(19)]
    __r13: u32,
}

/// Internal reset control. Each bit holds its block in soft reset.
#[bitfield(u32, defmt = cfg(feature = "defmt"))]
#[derive(PartialEq, Eq)]
pub struct Ircl {
    pub isp_sw_rst: bool,
    pub cp_sw_rst: bool,
    pub ycs_sw_rst: bool,
    pub mrsz_sw_rst: bool,
    pub srsz_sw_rst: bool,
    pub jpeg_sw_rst: bool,
    pub mi_sw_rst: bool,
    pub cif_sw_rst: bool,
    pub ie_sw_rst: bool,
    pub si_sw_rst: bool,
    #[bits(1)]
    __r10: u8,
    pub mipi_sw_rst: bool,
    #[bits(20)]
    __r12: u32,
}

/// Data path control.
#[bitfield(u32, defmt = cfg(feature = "defmt"))]
#[derive(PartialEq, Eq)]
pub struct Dpcl {
    #[bits(8)]
    __r0: u8,
    #[bits(2, default = InterfaceSelect::Parallel)]
    pub if_select: InterfaceSelect,
    #[bits(22)]
    __r10: u32,
}

#[bitfield(u32, defmt = cfg(feature = "defmt"))]
#[derive(PartialEq, Eq)]
pub struct IspCtrl {
    pub isp_enable: bool,
    #[bits(3, default = IspMode::RawPicture)]
    pub mode: IspMode,
    pub inform_enable: bool,
    #[bits(1)]
    __r5: u8,
    pub gamma_in_enable: bool,
    pub awb_enable: bool,
    pub cfg_upd_permanent: bool,
    /// Immediate configuration update.
    pub cfg_upd: bool,
    /// Configuration update at the next frame start.
    pub gen_cfg_upd: bool,
    pub gamma_out_enable: bool,
    pub flash_mode: bool,
    pub csm_y_full: bool,
    pub csm_c_full: bool,
    #[bits(17)]
    __r15: u32,
}

/// Acquisition properties.
#[bitfield(u32, defmt = cfg(feature = "defmt"))]
#[derive(PartialEq, Eq)]
pub struct AcqProp {
    /// Sample on the rising pixel clock edge.
    pub sample_pos_edge: bool,
    pub hsync_low: bool,
    pub vsync_low: bool,
    #[bits(2, default = BayerPattern::Rggb)]
    pub bayer_pattern: BayerPattern,
    #[bits(2)]
    __r5: u8,
    #[bits(2, default = YuvSequence::YCbYCr)]
    pub ccir_seq: YuvSequence,
    /// 0 samples all fields.
    #[bits(2)]
    pub field_selection: u8,
    #[bits(1)]
    __r11: u8,
    #[bits(3, default = InputSelect::Bits12)]
    pub input_select: InputSelect,
    #[bits(17)]
    __r15: u32,
}

#[bitfield(u32, defmt = cfg(feature = "defmt"))]
#[derive(PartialEq, Eq)]
pub struct Demosaic {
    #[bits(8)]
    pub threshold: u8,
    #[bits(2)]
    __r8: u8,
    pub bypass: bool,
    #[bits(21)]
    __r11: u32,
}

/// ISP interrupt bits, shared by IMSC/RIS/MIS/ICR/ISR.
#[bitfield(u32, defmt = cfg(feature = "defmt"))]
#[derive(PartialEq, Eq)]
pub struct IspIrq {
    pub isp_off: bool,
    /// Frame completely put out.
    pub frame: bool,
    pub data_loss: bool,
    pub pic_size_error: bool,
    pub awb_done: bool,
    /// Frame completely sampled.
    pub frame_in: bool,
    pub v_start: bool,
    pub h_start: bool,
    pub flash_on: bool,
    pub flash_off: bool,
    pub shutter_on: bool,
    pub shutter_off: bool,
    pub afm_sum_of: bool,
    pub afm_lum_of: bool,
    pub afm_fin: bool,
    pub hist_measure_rdy: bool,
    #[bits(1)]
    __r16: u8,
    pub flash_cap: bool,
    pub exp_end: bool,
    pub vsm_end: bool,
    #[bits(12)]
    __r20: u16,
}

impl IspIrq {
    /// All bits set, as written to ICR to acknowledge everything.
    pub const ALL: Self = Self::from_bits(u32::MAX);
}

/// Image stabilization control.
#[bitfield(u32, defmt = cfg(feature = "defmt"))]
#[derive(PartialEq, Eq)]
pub struct IsCtrl {
    pub is_enable: bool,
    #[bits(31)]
    __r1: u32,
}

/// Resizer control.
#[bitfield(u32, defmt = cfg(feature = "defmt"))]
#[derive(PartialEq, Eq)]
pub struct RszCtrl {
    pub hy_enable: bool,
    pub hc_enable: bool,
    pub vy_enable: bool,
    pub vc_enable: bool,
    pub hy_up: bool,
    pub hc_up: bool,
    pub vy_up: bool,
    pub vc_up: bool,
    pub cfg_upd: bool,
    pub cfg_upd_auto: bool,
    #[bits(22)]
    __r10: u32,
}

/// Memory interface control. Only the fields this crate drives are named.
#[bitfield(u32, defmt = cfg(feature = "defmt"))]
#[derive(PartialEq, Eq)]
pub struct MiCtrl {
    #[bits(20)]
    __r0: u32,
    pub init_base_en: bool,
    pub init_offset_en: bool,
    #[bits(10)]
    __r22: u16,
}

/// Memory interface interrupt bits.
#[bitfield(u32, defmt = cfg(feature = "defmt"))]
#[derive(PartialEq, Eq)]
pub struct MiIrq {
    pub mp_frame: bool,
    pub sp_frame: bool,
    pub mblk_line: bool,
    pub fill_mp_y: bool,
    pub wrap_mp_y: bool,
    pub wrap_mp_cb: bool,
    pub wrap_mp_cr: bool,
    pub wrap_sp_y: bool,
    pub wrap_sp_cb: bool,
    pub wrap_sp_cr: bool,
    #[bits(1)]
    __r10: u8,
    pub dma_ready: bool,
    #[bits(20)]
    __r12: u32,
}

impl MiIrq {
    pub const ALL: Self = Self::from_bits(u32::MAX);

    /// Sets the frame-end bit of `path`.
    pub fn set_frame_end(&mut self, path: PathId, val: bool) {
        match path {
            PathId::SelfPath => self.set_sp_frame(val),
            PathId::MainPath => self.set_mp_frame(val),
        }
    }
}

#[bitfield(u32, defmt = cfg(feature = "defmt"))]
#[derive(PartialEq, Eq)]
pub struct DualCropCtrl {
    #[bits(2, default = DualCropMode::Bypass)]
    pub mp_mode: DualCropMode,
    #[bits(2, default = DualCropMode::Bypass)]
    pub sp_mode: DualCropMode,
    pub cfg_upd_permanent: bool,
    pub cfg_upd: bool,
    pub gen_cfg_upd: bool,
    #[bits(25)]
    __r7: u32,
}

impl DualCropCtrl {
    pub fn set_path_mode(&mut self, path: PathId, mode: DualCropMode) {
        match path {
            PathId::SelfPath => self.set_sp_mode(mode),
            PathId::MainPath => self.set_mp_mode(mode),
        }
    }

    pub fn path_mode(&self, path: PathId) -> DualCropMode {
        match path {
            PathId::SelfPath => self.sp_mode(),
            PathId::MainPath => self.mp_mode(),
        }
    }
}

#[bitfield(u32, defmt = cfg(feature = "defmt"))]
#[derive(PartialEq, Eq)]
pub struct MipiCtrl {
    pub output_ena: bool,
    #[bits(7)]
    __r1: u8,
    #[bits(4)]
    pub shutdown_lanes: u8,
    /// Active data lanes minus one.
    #[bits(2)]
    pub num_lanes: u8,
    #[bits(2)]
    __r14: u8,
    pub err_sot_hs_skip: bool,
    pub err_sot_sync_hs_skip: bool,
    pub clocklane_ena: bool,
    #[bits(13)]
    __r19: u16,
}

#[bitfield(u32, defmt = cfg(feature = "defmt"))]
#[derive(PartialEq, Eq)]
pub struct MipiImgDataSel {
    #[bits(6)]
    pub data_type: u8,
    #[bits(2)]
    pub virtual_channel: u8,
    #[bits(24)]
    __r8: u32,
}

/// MIPI receiver interrupt bits. The 4-bit groups carry one bit per lane.
#[bitfield(u32, defmt = cfg(feature = "defmt"))]
#[derive(PartialEq, Eq)]
pub struct MipiIrq {
    #[bits(4)]
    pub sync_fifo_ovflw: u8,
    #[bits(4)]
    pub err_sot: u8,
    #[bits(4)]
    pub err_sot_sync: u8,
    #[bits(4)]
    pub err_eot_sync: u8,
    #[bits(4)]
    pub err_ctrl: u8,
    pub err_protocol: bool,
    pub err_ecc2: bool,
    pub err_ecc1: bool,
    pub err_cs: bool,
    pub frame_end: bool,
    pub add_data_ovflw: bool,
    pub add_data_water_mark: bool,
    #[bits(5)]
    __r27: u8,
}

impl MipiIrq {
    pub const ALL: Self = Self::from_bits(u32::MAX);

    /// Control-error bits of lanes 0 and 1. They latch until the next
    /// line-state transition.
    pub const ERR_CTRL_LANES: u8 = 0x3;

    /// CSI protocol level errors.
    pub const fn with_csi_errors(self) -> Self {
        self.with_err_protocol(true)
            .with_err_ecc2(true)
            .with_err_ecc1(true)
            .with_err_cs(true)
    }

    /// D-PHY errors on lanes 0 and 1.
    pub const fn with_dphy_errors(self) -> Self {
        self.with_err_sot(Self::ERR_CTRL_LANES)
            .with_err_sot_sync(Self::ERR_CTRL_LANES)
            .with_err_eot_sync(Self::ERR_CTRL_LANES)
            .with_err_ctrl(Self::ERR_CTRL_LANES)
    }

    /// Mask armed after MIPI setup and after a hardware restart.
    pub const fn base_mask() -> Self {
        Self::new()
            .with_frame_end(true)
            .with_csi_errors()
            .with_dphy_errors()
            .with_sync_fifo_ovflw(Self::ERR_CTRL_LANES)
            .with_add_data_ovflw(true)
    }
}

// ============================================================================
// Register blocks
// ============================================================================

register_block! {
    /// The whole ISP register window.
    Regs {
        vi_id: u32 = 0x0008;
        iccl: Iccl = 0x0010;
        ircl: Ircl = 0x0014;
        vi_dpcl: Dpcl = 0x0018;

        isp_ctrl: IspCtrl = 0x0400;
        isp_acq_prop: AcqProp = 0x0404;
        isp_acq_h_offs: u32 = 0x0408;
        isp_acq_v_offs: u32 = 0x040c;
        isp_acq_h_size: u32 = 0x0410;
        isp_acq_v_size: u32 = 0x0414;
        isp_acq_nr_frames: u32 = 0x0418;
        isp_demosaic: Demosaic = 0x0478;
        isp_out_h_offs: u32 = 0x0594;
        isp_out_v_offs: u32 = 0x0598;
        isp_out_h_size: u32 = 0x059c;
        isp_out_v_size: u32 = 0x05a0;
        isp_imsc: IspIrq = 0x05bc;
        isp_ris: IspIrq = 0x05c0;
        isp_mis: IspIrq = 0x05c4;
        isp_icr: IspIrq = 0x05c8;
        isp_isr: IspIrq = 0x05cc;
        isp_err: u32 = 0x063c;
        isp_err_clr: u32 = 0x0640;

        mi_ctrl: MiCtrl = 0x1400;
        mi_mp_y_offs_cnt_init: u32 = 0x1410;
        mi_mp_cb_offs_cnt_init: u32 = 0x1424;
        mi_mp_cr_offs_cnt_init: u32 = 0x1434;
        mi_sp_y_offs_cnt_init: u32 = 0x1444;
        mi_sp_cb_offs_cnt_init: u32 = 0x1458;
        mi_sp_cr_offs_cnt_init: u32 = 0x1468;
        mi_imsc: MiIrq = 0x14f8;
        mi_ris: MiIrq = 0x14fc;
        mi_mis: MiIrq = 0x1500;
        mi_icr: MiIrq = 0x1504;
        mi_isr: MiIrq = 0x1508;

        mipi_ctrl: MipiCtrl = 0x1c00;
        mipi_status: u32 = 0x1c04;
        mipi_imsc: MipiIrq = 0x1c08;
        mipi_ris: MipiIrq = 0x1c0c;
        mipi_mis: MipiIrq = 0x1c10;
        mipi_icr: MipiIrq = 0x1c14;
        mipi_isr: MipiIrq = 0x1c18;
        mipi_img_data_sel: MipiImgDataSel = 0x1c20;

        is_ctrl: IsCtrl = 0x2300;
        is_recenter: u32 = 0x2304;
        is_h_offs: u32 = 0x2308;
        is_v_offs: u32 = 0x230c;
        is_h_size: u32 = 0x2310;
        is_v_size: u32 = 0x2314;
        is_max_dx: u32 = 0x2318;
        is_max_dy: u32 = 0x231c;
        is_displace: u32 = 0x2320;

        dual_crop_ctrl: DualCropCtrl = 0x2880;
        dual_crop_m_h_offs: u32 = 0x2884;
        dual_crop_m_v_offs: u32 = 0x2888;
        dual_crop_m_h_size: u32 = 0x288c;
        dual_crop_m_v_size: u32 = 0x2890;
        dual_crop_s_h_offs: u32 = 0x2894;
        dual_crop_s_v_offs: u32 = 0x2898;
        dual_crop_s_h_size: u32 = 0x289c;
        dual_crop_s_v_size: u32 = 0x28a0;
    }
}

register_block! {
    /// One output path resizer. Main path at [`MRSZ_BASE`], self path at [`SRSZ_BASE`].
    RszRegs {
        ctrl: RszCtrl = 0x00;
        scale_hy: u32 = 0x04;
        scale_hcb: u32 = 0x08;
        scale_hcr: u32 = 0x0c;
        scale_vy: u32 = 0x10;
        scale_vc: u32 = 0x14;
        phase_hy: u32 = 0x18;
        phase_hc: u32 = 0x1c;
        phase_vy: u32 = 0x20;
        phase_vc: u32 = 0x24;
        scale_lut_addr: u32 = 0x28;
        scale_lut: u32 = 0x2c;
        ctrl_shd: RszCtrl = 0x30;
        scale_hy_shd: u32 = 0x34;
        scale_hcb_shd: u32 = 0x38;
        scale_hcr_shd: u32 = 0x3c;
        scale_vy_shd: u32 = 0x40;
        scale_vc_shd: u32 = 0x44;
        phase_hy_shd: u32 = 0x48;
        phase_hc_shd: u32 = 0x4c;
        phase_vy_shd: u32 = 0x50;
        phase_vc_shd: u32 = 0x54;
    }
}

impl<'a> Regs<'a> {
    pub fn new(io: &'a dyn RegisterIo) -> Self {
        Self::from_io(io, 0)
    }

    /// Resizer block of an output path.
    pub fn rsz(&self, path: PathId) -> RszRegs<'a> {
        let base = match path {
            PathId::MainPath => MRSZ_BASE,
            PathId::SelfPath => SRSZ_BASE,
        };
        RszRegs::from_io(self.io, base)
    }

    /// Dual crop window registers of a path: h_offs, v_offs, h_size, v_size.
    pub fn dual_crop_window(&self, path: PathId) -> [crate::io::Reg<'a, u32>; 4] {
        match path {
            PathId::MainPath => [
                self.dual_crop_m_h_offs(),
                self.dual_crop_m_v_offs(),
                self.dual_crop_m_h_size(),
                self.dual_crop_m_v_size(),
            ],
            PathId::SelfPath => [
                self.dual_crop_s_h_offs(),
                self.dual_crop_s_v_offs(),
                self.dual_crop_s_h_size(),
                self.dual_crop_s_v_size(),
            ],
        }
    }

    /// Initial offset counters of both paths' Y, Cb and Cr planes.
    pub fn mi_offs_cnt_init(&self) -> [crate::io::Reg<'a, u32>; 6] {
        [
            self.mi_mp_y_offs_cnt_init(),
            self.mi_mp_cb_offs_cnt_init(),
            self.mi_mp_cr_offs_cnt_init(),
            self.mi_sp_y_offs_cnt_init(),
            self.mi_sp_cb_offs_cnt_init(),
            self.mi_sp_cr_offs_cnt_init(),
        ]
    }
}

const RSZ_SIZE: u32 = 0x58;

/// Block prefix and register name at an absolute offset, for dumps.
///
/// Registers of the top-level window have an empty prefix.
pub fn register_name(offset: u32) -> Option<(&'static str, &'static str)> {
    if (MRSZ_BASE..MRSZ_BASE + RSZ_SIZE).contains(&offset) {
        RszRegs::name(offset - MRSZ_BASE).map(|name| ("mrsz", name))
    } else if (SRSZ_BASE..SRSZ_BASE + RSZ_SIZE).contains(&offset) {
        RszRegs::name(offset - SRSZ_BASE).map(|name| ("srsz", name))
    } else {
        Regs::name(offset).map(|name| ("", name))
    }
}
