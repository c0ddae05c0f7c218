//! Parameter defaults and input ranges.
//!
//! Operators only enforce their mathematical preconditions (positive sigma,
//! clip below one half, ...). The ranges here are the limits an interactive
//! or command-line front end offers, and are checked with
//! [`ParamRange::check`] before an operator is called.

use crate::{OpsError, OpsResult};

/// Inclusive range for a scalar input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    /// Display name used in error messages.
    pub name: &'static str,
    /// Smallest accepted value.
    pub min: f64,
    /// Largest accepted value.
    pub max: f64,
}

impl ParamRange {
    const fn new(name: &'static str, min: f64, max: f64) -> Self {
        Self { name, min, max }
    }

    /// Returns `true` if `value` lies within the range.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Passes `value` through, or rejects it with
    /// [`OpsError::InvalidParameter`].
    pub fn check(&self, value: f64) -> OpsResult<f64> {
        if self.contains(value) {
            Ok(value)
        } else {
            Err(OpsError::param(format!(
                "{} must be in [{}, {}], got {}",
                self.name, self.min, self.max, value
            )))
        }
    }
}

/// Gaussian sigma for blur, Canny and unsharp masking.
pub const SIGMA: ParamRange = ParamRange::new("sigma", 0.5, 8.0);
/// Kernel rows/columns (odd values only).
pub const KERNEL_SIZE: ParamRange = ParamRange::new("kernel size", 1.0, 13.0);
/// Individual kernel weights entered by hand.
pub const KERNEL_WEIGHT: ParamRange = ParamRange::new("kernel weight", -100.0, 100.0);
/// Brightness slider, percent.
pub const BRIGHTNESS_PERCENT: ParamRange = ParamRange::new("brightness", 0.0, 100.0);
/// Contrast slider, percent.
pub const CONTRAST_PERCENT: ParamRange = ParamRange::new("contrast", 0.0, 100.0);
/// Robust contrast slider, percent.
pub const ROBUST_PERCENT: ParamRange = ParamRange::new("robust contrast", 0.0, 100.0);
/// Quantization bit depth.
pub const QUANTIZE_BITS: ParamRange = ParamRange::new("bits", 1.0, 8.0);
/// Cross overlay size, percent.
pub const CROSS_PERCENT: ParamRange = ParamRange::new("cross", 0.0, 100.0);
/// Canny low threshold.
pub const T_LOW: ParamRange = ParamRange::new("t_low", 0.1, 9.0);
/// Canny high threshold.
pub const T_HIGH: ParamRange = ParamRange::new("t_high", 0.2, 10.0);
/// Unsharp-mask sharpness.
pub const SHARPNESS: ParamRange = ParamRange::new("sharpness", 0.2, 4.0);
/// Unsharp-mask gradient threshold.
pub const T_C: ParamRange = ParamRange::new("t_c", 0.2, 10.0);

/// Default blur sigma.
pub const SIGMA_DEFAULT: f64 = 1.0;
/// Default kernel rows and columns.
pub const KERNEL_SIZE_DEFAULT: usize = 3;
/// Default kernel weight of a fresh table.
pub const KERNEL_WEIGHT_DEFAULT: f64 = 1.0;
/// Default quantization depth (identity).
pub const QUANTIZE_BITS_DEFAULT: u8 = 8;
/// Default cross size.
pub const CROSS_PERCENT_DEFAULT: u32 = 49;
/// Default Canny sigma.
pub const CANNY_SIGMA_DEFAULT: f64 = 1.4;
/// Default Canny low threshold.
pub const CANNY_T_LOW_DEFAULT: f64 = 1.5;
/// Default Canny high threshold.
pub const CANNY_T_HIGH_DEFAULT: f64 = 3.0;
/// Default unsharp-mask sigma.
pub const USM_SIGMA_DEFAULT: f64 = 1.0;
/// Default unsharp-mask sharpness.
pub const USM_SHARPNESS_DEFAULT: f64 = 1.0;
/// Default unsharp-mask gradient threshold.
pub const USM_T_C_DEFAULT: f64 = 2.0;

/// Checks a kernel dimension: in [`KERNEL_SIZE`] and odd.
pub fn check_kernel_dim(n: usize) -> OpsResult<usize> {
    KERNEL_SIZE.check(n as f64)?;
    if n % 2 == 0 {
        return Err(OpsError::param(format!("kernel size must be odd, got {n}")));
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_check() {
        assert_eq!(SIGMA.check(0.5).unwrap(), 0.5);
        assert!(SIGMA.check(8.01).is_err());
        let msg = T_LOW.check(0.0).unwrap_err().to_string();
        assert!(msg.contains("t_low"));
    }

    #[test]
    fn test_defaults_in_range() {
        assert!(SIGMA.contains(SIGMA_DEFAULT));
        assert!(SIGMA.contains(CANNY_SIGMA_DEFAULT));
        assert!(T_LOW.contains(CANNY_T_LOW_DEFAULT));
        assert!(T_HIGH.contains(CANNY_T_HIGH_DEFAULT));
        assert!(SHARPNESS.contains(USM_SHARPNESS_DEFAULT));
        assert!(T_C.contains(USM_T_C_DEFAULT));
        assert!(CROSS_PERCENT.contains(CROSS_PERCENT_DEFAULT as f64));
    }

    #[test]
    fn test_kernel_dim() {
        assert!(check_kernel_dim(13).is_ok());
        assert!(check_kernel_dim(4).is_err());
        assert!(check_kernel_dim(15).is_err());
    }
}
