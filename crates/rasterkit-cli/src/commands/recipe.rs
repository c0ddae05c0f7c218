//! YAML recipes.
//!
//! A recipe is an optional border strategy plus an ordered list of steps.
//! Every step is tagged by `op`; omitted parameters take their defaults.
//!
//! ```yaml
//! border: mirror
//! steps:
//!   - op: robust-contrast
//!     percent: 5
//!   - op: filter
//!     kernel: [[0, -1, 0], [-1, 5, -1], [0, -1, 0]]
//!   - op: canny
//!     sigma: 1.4
//!     t_high: 4.0
//! ```
//!
//! Each step works on the output of the one before it.

use anyhow::{Context, Result, bail};
use rasterkit_core::RgbImage;
use rasterkit_ops::{
    BorderStrategy, CannyParams, FilterMode, Kernel, OpsResult, Session, UnsharpParams, params,
    tone,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
#[allow(unused_imports)]
use tracing::{debug, info, trace};

use crate::RunArgs;

fn default_bits() -> u8 {
    params::QUANTIZE_BITS_DEFAULT
}

fn default_cross() -> u32 {
    params::CROSS_PERCENT_DEFAULT
}

fn default_sigma() -> f64 {
    params::SIGMA_DEFAULT
}

/// One operation of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Step {
    /// Gray at luma.
    #[serde(alias = "grey", alias = "grayscale")]
    Gray,
    /// Keep `bits` bits per channel.
    Quantize {
        #[serde(default = "default_bits")]
        bits: u8,
    },
    /// Red diagonal cross.
    Cross {
        #[serde(default = "default_cross")]
        percent: u32,
    },
    /// Luma shift of `percent`% of full scale.
    Brightness { percent: f64 },
    /// Contrast gain of `1 + percent/100`.
    Contrast { percent: f64 },
    /// Percentile stretch clipping `percent/2`% at each end.
    RobustContrast { percent: f64 },
    /// Arbitrary convolution.
    Filter {
        #[serde(default)]
        kernel: Kernel,
        #[serde(default)]
        mode: FilterMode,
    },
    /// Gaussian blur.
    Blur {
        #[serde(default = "default_sigma")]
        sigma: f64,
    },
    /// Canny edge map.
    Canny(CannyParams),
    /// Unsharp mask.
    #[serde(alias = "unsharp")]
    Usm(UnsharpParams),
}

impl Step {
    /// Short name for messages.
    pub fn name(&self) -> &'static str {
        match self {
            Step::Gray => "gray",
            Step::Quantize { .. } => "quantize",
            Step::Cross { .. } => "cross",
            Step::Brightness { .. } => "brightness",
            Step::Contrast { .. } => "contrast",
            Step::RobustContrast { .. } => "robust-contrast",
            Step::Filter { .. } => "filter",
            Step::Blur { .. } => "blur",
            Step::Canny(_) => "canny",
            Step::Usm(_) => "usm",
        }
    }

    /// Checks parameters against the input ranges in [`params`].
    pub fn validate(&self) -> OpsResult<()> {
        match self {
            Step::Gray => {}
            Step::Quantize { bits } => {
                params::QUANTIZE_BITS.check(f64::from(*bits))?;
            }
            Step::Cross { percent } => {
                params::CROSS_PERCENT.check(f64::from(*percent))?;
            }
            Step::Brightness { percent } => {
                params::BRIGHTNESS_PERCENT.check(*percent)?;
            }
            Step::Contrast { percent } => {
                params::CONTRAST_PERCENT.check(*percent)?;
            }
            Step::RobustContrast { percent } => {
                params::ROBUST_PERCENT.check(*percent)?;
            }
            Step::Filter { kernel, .. } => {
                params::check_kernel_dim(kernel.rows())?;
                params::check_kernel_dim(kernel.cols())?;
                for &w in kernel.weights() {
                    params::KERNEL_WEIGHT.check(w)?;
                }
            }
            Step::Blur { sigma } => {
                params::SIGMA.check(*sigma)?;
            }
            Step::Canny(p) => {
                params::SIGMA.check(p.sigma)?;
                params::T_LOW.check(p.t_low)?;
                params::T_HIGH.check(p.t_high)?;
                p.validate()?;
            }
            Step::Usm(p) => {
                params::SIGMA.check(p.sigma)?;
                params::SHARPNESS.check(p.sharpness)?;
                params::T_C.check(p.threshold)?;
                p.validate()?;
            }
        }
        Ok(())
    }

    /// Runs the step on `session`.
    pub fn apply<'s>(&self, session: &'s mut Session) -> OpsResult<&'s RgbImage> {
        match self {
            Step::Gray => session.grayscale(),
            Step::Quantize { bits } => session.quantize(*bits),
            Step::Cross { percent } => session.draw_cross(*percent),
            Step::Brightness { percent } => {
                session.brightness(tone::brightness_delta_from_percent(*percent))
            }
            Step::Contrast { percent } => {
                session.contrast(tone::contrast_factor_from_percent(*percent))
            }
            Step::RobustContrast { percent } => {
                session.robust_contrast(tone::robust_clip_from_percent(*percent))
            }
            Step::Filter { kernel, mode } => session.apply_filter(kernel, *mode),
            Step::Blur { sigma } => session.gaussian_blur(*sigma),
            Step::Canny(p) => session.canny(p),
            Step::Usm(p) => session.unsharp_mask(p),
        }
    }

    /// Builds a step from an operation name and `key=value` pairs.
    ///
    /// Values are parsed as YAML scalars, so `kernel=[[1,1],[1,1]]` works.
    pub fn from_op_args(op: &str, args: &[String]) -> Result<Self> {
        let mut map = serde_yaml::Mapping::new();
        map.insert("op".into(), op.into());
        for arg in args {
            let Some((key, value)) = arg.split_once('=') else {
                bail!("Expected key=value, got '{arg}'");
            };
            let value: serde_yaml::Value = serde_yaml::from_str(value)
                .with_context(|| format!("Bad value for '{key}'"))?;
            map.insert(key.trim().into(), value);
        }
        serde_yaml::from_value(serde_yaml::Value::Mapping(map))
            .with_context(|| format!("Invalid operation '{op}'"))
    }
}

/// A parsed recipe file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Recipe {
    /// Border strategy, overriding `--border` when set.
    pub border: Option<BorderStrategy>,
    /// Steps in order.
    pub steps: Vec<Step>,
}

impl Recipe {
    /// Parses YAML text.
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("Invalid recipe")
    }

    /// Reads and parses a recipe file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read recipe: {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| path.display().to_string())
    }
}

pub fn run(args: RunArgs, border: BorderStrategy, verbose: u8) -> Result<()> {
    trace!(recipe = %args.recipe.display(), "recipe::run");
    let recipe = Recipe::load(&args.recipe)?;
    if recipe.steps.is_empty() {
        bail!("Recipe {} has no steps", args.recipe.display());
    }
    let border = recipe.border.unwrap_or(border);
    info!(steps = recipe.steps.len(), %border, "running recipe");
    super::process(&args.io, &recipe.steps, border, verbose)
}
