//! Canny and unsharp-mask commands.

use anyhow::Result;
use rasterkit_ops::{BorderStrategy, CannyParams, UnsharpParams};
#[allow(unused_imports)]
use tracing::{debug, info, trace};

use super::recipe::Step;
use crate::{CannyArgs, UsmArgs};

pub fn run_canny(args: CannyArgs, border: BorderStrategy, verbose: u8) -> Result<()> {
    let params = CannyParams {
        sigma: args.sigma,
        t_low: args.t_low,
        t_high: args.t_high,
    };
    trace!(?params, "canny::run");
    super::process(&args.io, &[Step::Canny(params)], border, verbose)
}

pub fn run_usm(args: UsmArgs, border: BorderStrategy, verbose: u8) -> Result<()> {
    let params = UnsharpParams {
        sigma: args.sigma,
        sharpness: args.sharpness,
        threshold: args.threshold,
    };
    trace!(?params, "usm::run");
    super::process(&args.io, &[Step::Usm(params)], border, verbose)
}
