//! Filter and blur commands.

use anyhow::{Context, Result};
use rasterkit_ops::{BorderStrategy, Kernel};
#[allow(unused_imports)]
use tracing::{debug, info, trace};

use super::recipe::Step;
use crate::{BlurArgs, FilterArgs};

pub fn run_filter(args: FilterArgs, border: BorderStrategy, verbose: u8) -> Result<()> {
    let kernel = match &args.kernel {
        Some(text) => text
            .parse::<Kernel>()
            .with_context(|| format!("Invalid kernel '{text}'"))?,
        None => Kernel::default(),
    };
    trace!(kernel = %kernel, mode = ?args.mode, "filter::run");

    if verbose > 1 {
        match kernel.separate() {
            Some(sep) => println!("Kernel is separable: hx={:?} hy={:?}", sep.hx, sep.hy),
            None => println!("Kernel rank {}, using direct convolution", kernel.rank()),
        }
    }

    let step = Step::Filter {
        kernel,
        mode: args.mode,
    };
    super::process(&args.io, &[step], border, verbose)
}

pub fn run_blur(args: BlurArgs, border: BorderStrategy, verbose: u8) -> Result<()> {
    trace!(sigma = args.sigma, "blur::run");
    super::process(&args.io, &[Step::Blur { sigma: args.sigma }], border, verbose)
}
