//! Register plan generator for the Rockchip ISP1 control core.
//!
//! Runs the configuration sequence against a RAM-backed register window and
//! prints what the hardware would be programmed with.

mod board;
mod plan;

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rkisp1_hal::format::{formats, PadDirection};
use rkisp1_hal::io::RegisterFile;
use rkisp1_hal::pad::{IspPad, SelectionTarget};
use rkisp1_hal::platform::PathId;
use rkisp1_hal::regs::register_name;
use rkisp1_hal::rsz::{compute_scale, Size};
use rkisp1_hal::{Config, Isp};

use crate::board::DryRun;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, arg_required_else_help(true))]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the sink and source format catalogs
    Formats,
    /// Print the resizer programming for one path
    Scale {
        /// Input luma size, e.g. 1920x1080
        #[arg(long)]
        input: Dim,
        /// Output luma size
        #[arg(long)]
        output: Dim,
        /// Horizontal chroma subsampling
        #[arg(long, default_value_t = 2)]
        chroma_div: u32,
    },
    /// Dry-run a plan file and dump the resulting registers
    Plan {
        /// HJSON plan file
        file: PathBuf,
    },
}

/// `WIDTHxHEIGHT` on the command line.
#[derive(Clone, Copy, Debug)]
struct Dim(Size);

impl FromStr for Dim {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| anyhow!("expected WIDTHxHEIGHT, got `{s}`"))?;
        Ok(Dim(Size::new(w.trim().parse()?, h.trim().parse()?)))
    }
}

/// Attaches `what` to a control core error.
fn hal<T>(result: Result<T, rkisp1_hal::Error>, what: &str) -> Result<T> {
    result.map_err(|e| anyhow!("{e:?}")).context(what.to_owned())
}

fn chroma(size: Size, div: u32) -> Size {
    Size::new(size.width / div.max(1), size.height)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Formats => list_formats(),
        Command::Scale {
            input,
            output,
            chroma_div,
        } => print_scale(input.0, output.0, chroma_div),
        Command::Plan { file } => run_plan(&file),
    }
}

fn list_formats() -> Result<()> {
    for (title, direction) in [("sink", PadDirection::Sink), ("source", PadDirection::Source)] {
        println!("{title}:");
        for (i, fmt) in formats(direction).iter().enumerate() {
            println!(
                "  {:2} {:14} {:6} {:2} bpp {}",
                i,
                fmt.code.name().unwrap_or("?"),
                format!("{:?}", fmt.family),
                fmt.bpp[0],
                fmt.bayer_pattern.map(|p| format!("{p:?}")).unwrap_or_default(),
            );
        }
    }
    Ok(())
}

fn print_scale(input: Size, output: Size, chroma_div: u32) -> Result<()> {
    let scale = hal(
        compute_scale(input, chroma(input, chroma_div), output, chroma(output, chroma_div)),
        "computing scale factors",
    )?;

    println!("RSZ_CTRL 0x{:08x}", scale.ctrl.into_bits());
    for (name, factor) in [
        ("SCALE_HY", scale.hy),
        ("SCALE_HC", scale.hc),
        ("SCALE_VY", scale.vy),
        ("SCALE_VC", scale.vc),
    ] {
        match factor {
            Some(f) => println!("{name} 0x{f:08x}"),
            None => println!("{name} -"),
        }
    }
    Ok(())
}

fn run_plan(file: &Path) -> Result<()> {
    let text = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let plan = plan::parse(&text).with_context(|| format!("parsing {}", file.display()))?;

    let mut isp = Isp::new(
        RegisterFile::new(),
        DryRun::new(plan.bus.to_bus_info()),
        Config::default(),
    );

    let sd = isp.subdev_mut();
    let sink = hal(sd.set_format(IspPad::Sink, &plan.sink.to_frame_format()?), "sink format")?;
    info!(code = ?sink.code, width = sink.width, height = sink.height, "sink format");
    if let Some(crop) = plan.sink_crop {
        hal(sd.set_selection(IspPad::Sink, SelectionTarget::Crop, &crop.into()), "sink crop")?;
    }
    if let Some(source) = &plan.source {
        hal(sd.set_format(IspPad::SourcePath, &source.to_frame_format()?), "source format")?;
    }
    if let Some(crop) = plan.source_crop {
        hal(
            sd.set_selection(IspPad::SourcePath, SelectionTarget::Crop, &crop.into()),
            "source crop",
        )?;
    }

    hal(isp.power(true), "power up")?;
    hal(isp.start(), "starting the ISP")?;

    let out_win = isp.subdev().out_win();
    for resize in &plan.resize {
        if resize.chroma_div == 0 {
            bail!("chroma_div must be non-zero");
        }
        let path = PathId::from(resize.path);
        let input = match resize.crop {
            Some(crop) => {
                isp.config_dcrop(path, &crop.into(), false);
                Size::new(crop.width, crop.height)
            }
            None => Size::new(out_win.width, out_win.height),
        };
        let output = Size::new(resize.width, resize.height);
        hal(
            isp.set_scale(
                path,
                input,
                chroma(input, resize.chroma_div),
                output,
                chroma(output, resize.chroma_div),
            ),
            "programming resizer",
        )?;
    }

    isp.io().for_each_nonzero(|offset, value| {
        let name = match register_name(offset) {
            Some(("", name)) => name.to_owned(),
            Some((block, name)) => format!("{block}.{name}"),
            None => "?".to_owned(),
        };
        println!("0x{offset:04x} {name:28} 0x{value:08x}");
    });
    Ok(())
}
