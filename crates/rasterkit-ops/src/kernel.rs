//! Convolution kernels.
//!
//! A [`Kernel`] is an `R x C` matrix of `f64` weights with odd, positive
//! dimensions. Row index `v` runs along y, column index `u` along x, and
//! the center tap sits at `(R/2, C/2)`.
//!
//! Rank-1 kernels factor into a column and a row vector,
//! `K = hy * hx^T`. [`Kernel::separate`] finds that factorization via SVD so
//! the convolution engine can run two 1D passes instead of one 2D pass.
//!
//! # Constructors
//!
//! - [`Kernel::new`] - from a row-major weight vector
//! - [`Kernel::from_rows`] - from nested rows
//! - [`Kernel::box_filter`] - all-ones table
//! - [`Kernel::gaussian`] - outer product of [`gaussian_1d`]
//! - `"1,2,1;2,4,2;1,2,1".parse()` - rows separated by `;`
//!
//! # Example
//!
//! ```rust
//! use rasterkit_ops::Kernel;
//!
//! let k: Kernel = "1,2,1;2,4,2;1,2,1".parse().unwrap();
//! assert_eq!((k.rows(), k.cols()), (3, 3));
//! assert!(k.separate().is_some());
//!
//! let cross: Kernel = "0,1,0;1,1,1;0,1,0".parse().unwrap();
//! assert!(cross.separate().is_none());
//! ```

use std::fmt;
use std::str::FromStr;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::params;
use crate::{OpsError, OpsResult};

/// Tolerance for treating a kernel sum as zero.
pub const ZERO_SUM_EPS: f64 = 1e-9;

/// Largest Gaussian halfwidth `round(3σ)` accepted by [`gaussian_1d`].
pub const MAX_GAUSSIAN_HALFWIDTH: i64 = 4096;

/// 2D convolution kernel with odd dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct Kernel {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

/// Rank-1 factorization of a [`Kernel`]: `K(v, u) ≈ hy[v] * hx[u]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SeparableKernel {
    /// Horizontal taps, one per kernel column.
    pub hx: Vec<f64>,
    /// Vertical taps, one per kernel row.
    pub hy: Vec<f64>,
}

impl Kernel {
    /// Creates a kernel from row-major weights.
    ///
    /// # Errors
    ///
    /// [`OpsError::InvalidParameter`] if a dimension is zero or even, the
    /// data length doesn't match, or any weight is not finite.
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> OpsResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(OpsError::param("kernel dimensions must be positive"));
        }
        if rows % 2 == 0 || cols % 2 == 0 {
            return Err(OpsError::param(format!(
                "kernel dimensions must be odd, got {rows}x{cols}"
            )));
        }
        if data.len() != rows * cols {
            return Err(OpsError::param(format!(
                "kernel data size {} doesn't match {}x{}",
                data.len(),
                rows,
                cols
            )));
        }
        if let Some(w) = data.iter().find(|w| !w.is_finite()) {
            return Err(OpsError::param(format!("kernel weight {w} is not finite")));
        }
        Ok(Self { rows, cols, data })
    }

    /// Creates a kernel from a list of rows.
    ///
    /// # Errors
    ///
    /// As [`new`](Self::new); additionally rejects ragged rows.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> OpsResult<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != n_cols) {
            return Err(OpsError::param("kernel rows have different lengths"));
        }
        Self::new(n_rows, n_cols, rows.into_iter().flatten().collect())
    }

    /// All-ones kernel.
    ///
    /// With an intensity response this is a plain box blur.
    pub fn box_filter(rows: usize, cols: usize) -> OpsResult<Self> {
        Self::new(rows, cols, vec![1.0; rows * cols])
    }

    /// 2D Gaussian, the outer product of [`gaussian_1d`] with itself.
    pub fn gaussian(sigma: f64) -> OpsResult<Self> {
        let g = gaussian_1d(sigma)?;
        let n = g.len();
        let data = g
            .iter()
            .flat_map(|&wy| g.iter().map(move |&wx| wy * wx))
            .collect();
        Self::new(n, n, data)
    }

    /// Number of rows (vertical extent).
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (horizontal extent).
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Weight at row `v`, column `u`.
    #[inline]
    pub fn get(&self, v: usize, u: usize) -> f64 {
        self.data[v * self.cols + u]
    }

    /// Row-major weights.
    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.data
    }

    /// `(cols / 2, rows / 2)`: horizontal and vertical half-extent.
    #[inline]
    pub fn radius(&self) -> (usize, usize) {
        (self.cols / 2, self.rows / 2)
    }

    /// Sum of weights.
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Sum of absolute weights, the intensity normalization factor.
    pub fn abs_sum(&self) -> f64 {
        self.data.iter().map(|w| w.abs()).sum()
    }

    /// Returns `true` if every weight is zero.
    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|&w| w == 0.0)
    }

    /// Returns `true` if the weights sum to zero without all being zero,
    /// the signature of a derivative kernel.
    pub fn is_zero_sum(&self) -> bool {
        !self.is_zero() && self.sum().abs() <= ZERO_SUM_EPS * self.abs_sum().max(1.0)
    }

    /// Numerical rank via SVD.
    ///
    /// Singular values at or below `max(R, C) * σ_max * ε` count as zero.
    pub fn rank(&self) -> usize {
        let svd = self.matrix().svd(false, false);
        let s = &svd.singular_values;
        let s_max = s.iter().copied().fold(0.0, f64::max);
        let tol = self.rows.max(self.cols) as f64 * s_max * f64::EPSILON;
        s.iter().filter(|&&v| v > tol).count()
    }

    /// Factors a rank-1 kernel into `hx` and `hy`.
    ///
    /// Both vectors carry `sqrt(σ0)` of the dominant singular value and are
    /// sign-normalized so that `Σ hx >= 0`. Returns `None` for kernels of
    /// any other rank, including the all-zero kernel.
    pub fn separate(&self) -> Option<SeparableKernel> {
        let svd = self.matrix().svd(true, true);
        let s = &svd.singular_values;

        let mut top = 0usize;
        for i in 1..s.len() {
            if s[i] > s[top] {
                top = i;
            }
        }
        let s0 = s[top];
        let tol = self.rows.max(self.cols) as f64 * s0 * f64::EPSILON;
        let rank = s.iter().filter(|&&v| v > tol).count();
        if rank != 1 {
            trace!(rows = self.rows, cols = self.cols, rank, "kernel not separable");
            return None;
        }

        let u = svd.u?;
        let v_t = svd.v_t?;
        let scale = s0.sqrt();
        let mut hx: Vec<f64> = v_t.row(top).iter().map(|&v| v * scale).collect();
        let mut hy: Vec<f64> = u.column(top).iter().map(|&v| v * scale).collect();
        if hx.iter().sum::<f64>() < 0.0 {
            hx.iter_mut().for_each(|v| *v = -*v);
            hy.iter_mut().for_each(|v| *v = -*v);
        }
        debug!(?hx, ?hy, "kernel is separable");
        Some(SeparableKernel { hx, hy })
    }

    fn matrix(&self) -> DMatrix<f64> {
        DMatrix::from_row_slice(self.rows, self.cols, &self.data)
    }
}

impl Default for Kernel {
    /// 3×3 box filter.
    fn default() -> Self {
        let n = params::KERNEL_SIZE_DEFAULT;
        Self {
            rows: n,
            cols: n,
            data: vec![params::KERNEL_WEIGHT_DEFAULT; n * n],
        }
    }
}

impl SeparableKernel {
    /// Reconstructs the 2D kernel `hy * hx^T`.
    pub fn outer(&self) -> OpsResult<Kernel> {
        let data = self
            .hy
            .iter()
            .flat_map(|&wy| self.hx.iter().map(move |&wx| wy * wx))
            .collect();
        Kernel::new(self.hy.len(), self.hx.len(), data)
    }
}

/// Unnormalized 1D Gaussian.
///
/// `halfwidth = round(3σ)`, length `2·halfwidth + 1`, and
/// `w[i] = exp(-0.5·(halfwidth - i)² / σ²)`. The center weight is 1.
///
/// # Errors
///
/// [`OpsError::InvalidParameter`] unless `sigma` is finite and positive,
/// or if the halfwidth would exceed [`MAX_GAUSSIAN_HALFWIDTH`].
///
/// # Example
///
/// ```rust
/// use rasterkit_ops::kernel::gaussian_1d;
///
/// let g = gaussian_1d(1.0).unwrap();
/// assert_eq!(g.len(), 7);
/// assert_eq!(g[3], 1.0);
/// ```
pub fn gaussian_1d(sigma: f64) -> OpsResult<Vec<f64>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(OpsError::param(format!("sigma must be positive and finite, got {sigma}")));
    }
    let half = (3.0 * sigma).round();
    if half > MAX_GAUSSIAN_HALFWIDTH as f64 {
        return Err(OpsError::param(format!(
            "sigma {sigma} gives a kernel halfwidth above {MAX_GAUSSIAN_HALFWIDTH}"
        )));
    }
    let half = half as i64;
    let sigma2 = sigma * sigma;
    let kernel = (0..=2 * half)
        .map(|i| {
            let r = (half - i) as f64;
            (-0.5 * r * r / sigma2).exp()
        })
        .collect();
    Ok(kernel)
}

impl TryFrom<Vec<Vec<f64>>> for Kernel {
    type Error = OpsError;

    fn try_from(rows: Vec<Vec<f64>>) -> OpsResult<Self> {
        Self::from_rows(rows)
    }
}

impl From<Kernel> for Vec<Vec<f64>> {
    fn from(k: Kernel) -> Self {
        k.data.chunks(k.cols).map(<[f64]>::to_vec).collect()
    }
}

impl FromStr for Kernel {
    type Err = OpsError;

    /// Parses `"a,b,c;d,e,f;g,h,i"`. Whitespace around numbers is ignored.
    fn from_str(s: &str) -> OpsResult<Self> {
        let rows = s
            .split(';')
            .filter(|r| !r.trim().is_empty())
            .map(|row| {
                row.split(',')
                    .map(|v| {
                        v.trim()
                            .parse::<f64>()
                            .map_err(|e| OpsError::param(format!("bad kernel weight '{}': {e}", v.trim())))
                    })
                    .collect::<OpsResult<Vec<f64>>>()
            })
            .collect::<OpsResult<Vec<_>>>()?;
        Self::from_rows(rows)
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.data.chunks(self.cols).enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            let cells: Vec<String> = row.iter().map(|w| w.to_string()).collect();
            f.write_str(&cells.join(","))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_rejects_bad_dims() {
        assert!(Kernel::new(0, 3, vec![]).is_err());
        assert!(Kernel::new(2, 3, vec![0.0; 6]).is_err());
        assert!(Kernel::new(3, 3, vec![0.0; 8]).is_err());
        assert!(Kernel::new(1, 1, vec![f64::NAN]).is_err());
        assert!(Kernel::from_rows(vec![vec![1.0, 2.0, 3.0], vec![1.0]]).is_err());
    }

    #[test]
    fn test_default_is_box() {
        let k = Kernel::default();
        assert_eq!(k, Kernel::box_filter(3, 3).unwrap());
        assert_eq!(k.radius(), (1, 1));
    }

    #[test]
    fn test_parse_and_display() {
        let k: Kernel = "1, 2, 1; 0,0,0 ; -1,-2,-1".parse().unwrap();
        assert_eq!((k.rows(), k.cols()), (3, 3));
        assert_eq!(k.get(2, 1), -2.0);
        assert_eq!(k.to_string(), "1,2,1;0,0,0;-1,-2,-1");
        assert!("1,x,1".parse::<Kernel>().is_err());
    }

    #[test]
    fn test_gaussian_symmetric() {
        for sigma in [0.5, 1.0, 1.4, 2.3, 8.0] {
            let g = gaussian_1d(sigma).unwrap();
            let n = g.len();
            assert_eq!(n % 2, 1);
            assert_eq!(n, 2 * (3.0 * sigma).round() as usize + 1);
            for i in 0..n {
                assert_eq!(g[i], g[n - 1 - i]);
            }
            assert_eq!(g[n / 2], 1.0);
        }
    }

    #[test]
    fn test_gaussian_rejects_sigma() {
        assert!(gaussian_1d(0.0).is_err());
        assert!(gaussian_1d(-1.0).is_err());
        assert!(gaussian_1d(f64::INFINITY).is_err());
    }

    #[test]
    fn test_gaussian_size_bound() {
        let limit = MAX_GAUSSIAN_HALFWIDTH as f64 / 3.0;
        assert_eq!(gaussian_1d(limit).unwrap().len(), 2 * MAX_GAUSSIAN_HALFWIDTH as usize + 1);
        assert!(matches!(gaussian_1d(1e6), Err(OpsError::InvalidParameter(_))));
        assert!(matches!(gaussian_1d(1e19), Err(OpsError::InvalidParameter(_))));
        assert!(gaussian_1d(f64::MAX).is_err());
    }

    #[test]
    fn test_separate_rank_one() {
        let k: Kernel = "1,2,1;2,4,2;1,2,1".parse().unwrap();
        assert_eq!(k.rank(), 1);
        let sep = k.separate().unwrap();
        assert!(sep.hx.iter().sum::<f64>() >= 0.0);
        let back = sep.outer().unwrap();
        for (a, b) in back.weights().iter().zip(k.weights()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_separate_non_square() {
        // hy = [1, -1, 1], hx = [1, 2, 3, 2, 1]
        let k = SeparableKernel {
            hx: vec![1.0, 2.0, 3.0, 2.0, 1.0],
            hy: vec![1.0, -1.0, 1.0],
        }
        .outer()
        .unwrap();
        let sep = k.separate().unwrap();
        assert_eq!(sep.hx.len(), 5);
        assert_eq!(sep.hy.len(), 3);
        let back = sep.outer().unwrap();
        for (a, b) in back.weights().iter().zip(k.weights()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_not_separable() {
        let k: Kernel = "0,1,0;1,1,1;0,1,0".parse().unwrap();
        assert_eq!(k.rank(), 2);
        assert!(k.separate().is_none());
        assert!(Kernel::new(3, 3, vec![0.0; 9]).unwrap().separate().is_none());
    }

    #[test]
    fn test_zero_sum_detection() {
        let sobel: Kernel = "-1,0,1;-2,0,2;-1,0,1".parse().unwrap();
        assert!(sobel.is_zero_sum());
        assert!(!Kernel::box_filter(3, 3).unwrap().is_zero_sum());
        assert!(!Kernel::new(1, 1, vec![0.0]).unwrap().is_zero_sum());
    }

    #[test]
    fn test_serde_rows() {
        let k: Kernel = serde_yaml::from_str("[[1, 2, 1]]").unwrap();
        assert_eq!((k.rows(), k.cols()), (1, 3));
        assert!(serde_yaml::from_str::<Kernel>("[[1, 2]]").is_err());
    }
}
