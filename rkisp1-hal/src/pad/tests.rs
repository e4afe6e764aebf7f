use super::*;
use crate::format::BusCode;

fn subdev() -> IspSubdev {
    IspSubdev::new(800, 600)
}

#[test]
fn default_state() {
    let sd = subdev();
    assert_eq!(sd.in_fmt().code, BusCode::SBGGR10_1X10);
    assert_eq!(sd.out_fmt().code, BusCode::YUYV8_2X8);
    assert_eq!(sd.in_win(), Rect::with_size(800, 600));
    assert_eq!(sd.in_crop(), sd.in_win());
    assert_eq!(sd.out_win(), sd.in_crop());
}

#[test]
fn try_format_clamps_and_falls_back() {
    let fmt = IspSubdev::try_format(IspPad::Sink, &FrameFormat::new(BusCode(0xdead), 8000, 4)).unwrap();
    assert_eq!(fmt.code, BusCode::SRGGB10_1X10);
    assert_eq!((fmt.width, fmt.height), (MAX_WIDTH, MIN_HEIGHT));
    assert_eq!(fmt.field, Field::None);
    assert_eq!(fmt.colorspace, Colorspace::Srgb);

    let fmt = IspSubdev::try_format(IspPad::SourcePath, &FrameFormat::new(BusCode::UYVY8_1X16, 640, 480)).unwrap();
    assert_eq!(fmt.code, BusCode::YUYV8_2X8);
    assert_eq!(fmt.colorspace, Colorspace::Jpeg);
}

#[test]
fn yuv_sensor_reports_jpeg_colorspace() {
    let mut sd = subdev();
    let proposed = FrameFormat::new(BusCode::YUYV8_1X16, 640, 480);
    assert_eq!(IspSubdev::try_format(IspPad::Sink, &proposed).unwrap().colorspace, Colorspace::Jpeg);
    sd.set_format(IspPad::Sink, &proposed).unwrap();
    assert_eq!(sd.get_format(IspPad::Sink).unwrap().colorspace, Colorspace::Jpeg);
}

#[test]
fn metadata_pads_reject_negotiation() {
    let mut sd = subdev();
    let proposed = FrameFormat::new(BusCode::SRGGB10_1X10, 640, 480);
    assert_eq!(IspSubdev::try_format(IspPad::SinkParams, &proposed), Err(Error::InvalidArgument));
    assert_eq!(sd.set_format(IspPad::SourceStats, &proposed), Err(Error::InvalidArgument));
    assert_eq!(sd.get_format(IspPad::SinkParams), Err(Error::InvalidArgument));
    assert_eq!(
        sd.get_selection(IspPad::SourceStats, SelectionTarget::Crop),
        Err(Error::InvalidArgument)
    );
    assert_eq!(IspSubdev::enum_bus_code(IspPad::SinkParams, 0), Err(Error::InvalidArgument));
}

#[test]
fn sink_format_resets_crop() {
    let mut sd = subdev();
    sd.set_selection(IspPad::Sink, SelectionTarget::Crop, &Rect::new(10, 10, 400, 300))
        .unwrap();
    assert_ne!(sd.in_crop(), sd.in_win());

    let fmt = sd
        .set_format(IspPad::Sink, &FrameFormat::new(BusCode::SRGGB10_1X10, 1280, 720))
        .unwrap();
    assert_eq!((fmt.width, fmt.height), (1280, 720));
    assert_eq!(sd.in_win(), Rect::with_size(1280, 720));
    assert_eq!(sd.in_crop(), sd.in_win());
    assert_eq!(sd.in_fmt().code, BusCode::SRGGB10_1X10);
}

#[test]
fn source_format_sets_out_win() {
    let mut sd = subdev();
    sd.set_format(IspPad::SourcePath, &FrameFormat::new(BusCode::SGRBG8_1X8, 320, 240))
        .unwrap();
    assert_eq!(sd.out_win(), Rect::with_size(320, 240));
    assert!(sd.out_fmt().is_bayer());
    assert_eq!(
        sd.get_format(IspPad::SourcePath).unwrap(),
        FrameFormat::new(BusCode::SGRBG8_1X8, 320, 240)
    );
}

#[test]
fn crop_aligns_down_to_even() {
    let sd = subdev();
    let r = sd.try_crop(IspPad::Sink, &Rect::new(7, 3, 101, 99)).unwrap();
    assert_eq!(r, Rect::new(6, 3, 100, 99));
}

#[test]
fn crop_stays_inside_bounds() {
    let sd = subdev();
    let r = sd.try_crop(IspPad::Sink, &Rect::new(790, 590, 500, 500)).unwrap();
    assert_eq!(r, Rect::new(768, 568, 32, 32));

    let r = sd.try_crop(IspPad::Sink, &Rect::new(0, 0, 0, 0)).unwrap();
    assert_eq!(r, Rect::new(0, 0, MIN_WIDTH, MIN_HEIGHT));
}

#[test]
fn crop_properties_hold_over_a_grid() {
    let mut sd = subdev();
    sd.set_format(IspPad::Sink, &FrameFormat::new(BusCode::SRGGB10_1X10, 333, 97))
        .unwrap();

    for pad in [IspPad::Sink, IspPad::SourcePath] {
        let bounds = sd.get_selection(pad, SelectionTarget::CropBounds).unwrap();
        for left in (0..400).step_by(37) {
            for top in (0..120).step_by(13) {
                for width in [0, 1, 31, 33, 100, 333, 5000] {
                    for height in [0, 5, 32, 64, 97, 200] {
                        let r = sd.try_crop(pad, &Rect::new(left, top, width, height)).unwrap();
                        assert_eq!(r.left % 2, 0);
                        assert_eq!(r.width % 2, 0);
                        assert!(r.width >= MIN_WIDTH && r.height >= MIN_HEIGHT);
                        assert!(r.left + r.width <= bounds.width);
                        assert!(r.top + r.height <= bounds.height);
                    }
                }
            }
        }
    }
}

#[test]
fn source_crop_bounded_by_acquisition_window() {
    let mut sd = subdev();
    sd.set_selection(IspPad::Sink, SelectionTarget::Crop, &Rect::new(0, 0, 640, 480))
        .unwrap();

    assert_eq!(
        sd.get_selection(IspPad::SourcePath, SelectionTarget::CropBounds).unwrap(),
        Rect::with_size(640, 480)
    );
    let r = sd
        .set_selection(IspPad::SourcePath, SelectionTarget::Crop, &Rect::new(100, 0, 800, 600))
        .unwrap();
    assert_eq!(r, Rect::new(100, 0, 540, 480));
    assert_eq!(sd.out_win(), r);
}

#[test]
fn output_window_follows_shrinking_acquisition_window() {
    let mut sd = subdev();
    sd.set_selection(IspPad::SourcePath, SelectionTarget::Crop, &Rect::new(100, 50, 600, 500))
        .unwrap();

    sd.set_selection(IspPad::Sink, SelectionTarget::Crop, &Rect::with_size(320, 240))
        .unwrap();
    let bounds = sd.get_selection(IspPad::SourcePath, SelectionTarget::CropBounds).unwrap();
    let crop = sd.get_selection(IspPad::SourcePath, SelectionTarget::Crop).unwrap();
    assert_eq!(bounds, Rect::with_size(320, 240));
    assert_eq!(crop, Rect::new(100, 50, 220, 190));
    assert!(crop.left + crop.width <= bounds.width);
    assert!(crop.top + crop.height <= bounds.height);

    sd.set_format(IspPad::Sink, &FrameFormat::new(BusCode::SRGGB10_1X10, 64, 48))
        .unwrap();
    assert_eq!(sd.in_crop(), Rect::with_size(64, 48));
    assert_eq!(sd.out_win(), Rect::new(32, 16, 32, 32));
}

#[test]
fn only_crop_target_is_writable() {
    let mut sd = subdev();
    assert_eq!(
        sd.set_selection(IspPad::Sink, SelectionTarget::CropBounds, &Rect::with_size(64, 64)),
        Err(Error::InvalidArgument)
    );
    assert_eq!(sd.in_crop(), sd.in_win());
}

#[test]
fn enumerates_catalog() {
    assert_eq!(IspSubdev::enum_bus_code(IspPad::Sink, 0), Ok(BusCode::SBGGR10_1X10));
    assert_eq!(IspSubdev::enum_bus_code(IspPad::SourcePath, 12), Ok(BusCode::SGRBG8_1X8));
    assert_eq!(IspSubdev::enum_bus_code(IspPad::SourcePath, 13), Err(Error::InvalidArgument));
}
