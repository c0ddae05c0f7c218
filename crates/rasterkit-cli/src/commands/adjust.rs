//! Pixel and tone commands: gray, quantize, cross, brightness, contrast,
//! robust-contrast.

use anyhow::Result;
use rasterkit_ops::BorderStrategy;
#[allow(unused_imports)]
use tracing::{debug, info, trace};

use super::recipe::Step;
use crate::{CrossArgs, IoArgs, PercentArgs, QuantizeArgs};

pub fn run_gray(args: IoArgs, border: BorderStrategy, verbose: u8) -> Result<()> {
    super::process(&args, &[Step::Gray], border, verbose)
}

pub fn run_quantize(args: QuantizeArgs, border: BorderStrategy, verbose: u8) -> Result<()> {
    trace!(bits = args.bits, "quantize::run");
    super::process(&args.io, &[Step::Quantize { bits: args.bits }], border, verbose)
}

pub fn run_cross(args: CrossArgs, border: BorderStrategy, verbose: u8) -> Result<()> {
    super::process(&args.io, &[Step::Cross { percent: args.percent }], border, verbose)
}

pub fn run_brightness(args: PercentArgs, border: BorderStrategy, verbose: u8) -> Result<()> {
    let step = Step::Brightness { percent: args.percent };
    super::process(&args.io, &[step], border, verbose)
}

pub fn run_contrast(args: PercentArgs, border: BorderStrategy, verbose: u8) -> Result<()> {
    let step = Step::Contrast { percent: args.percent };
    super::process(&args.io, &[step], border, verbose)
}

pub fn run_robust_contrast(args: PercentArgs, border: BorderStrategy, verbose: u8) -> Result<()> {
    let step = Step::RobustContrast { percent: args.percent };
    super::process(&args.io, &[step], border, verbose)
}
