//! CLI command implementations

pub mod adjust;
pub mod batch;
pub mod edges;
pub mod filter;
pub mod info;
pub mod recipe;

use anyhow::{Context, Result};
use rasterkit_core::RgbImage;
use rasterkit_ops::{BorderStrategy, Session};
use std::path::Path;
#[allow(unused_imports)]
use tracing::{debug, info, trace};

use crate::IoArgs;
use recipe::Step;

/// Load image from path
pub fn load_image(path: &Path) -> Result<RgbImage> {
    rasterkit_io::read(path).with_context(|| format!("Failed to load: {}", path.display()))
}

/// Save image to path
pub fn save_image(path: &Path, image: &RgbImage) -> Result<()> {
    rasterkit_io::write(path, image).with_context(|| format!("Failed to save: {}", path.display()))
}

/// Runs `steps` on a fresh session loaded with `image`.
///
/// Each step reads the result of the previous one. All steps are
/// validated before any pixel work.
pub fn apply_steps(image: RgbImage, steps: &[Step], border: BorderStrategy) -> Result<RgbImage> {
    for (i, step) in steps.iter().enumerate() {
        step.validate().with_context(|| format!("step {} ({})", i + 1, step.name()))?;
    }

    let mut session = Session::with_border(border);
    session.load(image);
    for (i, step) in steps.iter().enumerate() {
        debug!(step = i + 1, op = step.name(), "applying step");
        let out = step
            .apply(&mut session)
            .with_context(|| format!("step {} ({}) failed", i + 1, step.name()))?
            .clone();
        if i + 1 < steps.len() {
            session.load(out);
        } else {
            return Ok(out);
        }
    }
    Ok(session.working()?.clone())
}

/// Loads `io.input`, applies `steps` and saves to `io.output`.
pub fn process(io: &IoArgs, steps: &[Step], border: BorderStrategy, verbose: u8) -> Result<()> {
    trace!(input = %io.input.display(), output = %io.output.display(), steps = steps.len(), "process");
    let image = load_image(&io.input)?;

    if verbose > 0 {
        let names: Vec<&str> = steps.iter().map(|s| s.name()).collect();
        println!(
            "Applying {} to {} ({}x{}, border {})",
            names.join(" -> "),
            io.input.display(),
            image.width(),
            image.height(),
            border
        );
    }

    let result = apply_steps(image, steps, border)?;
    save_image(&io.output, &result)?;

    if verbose > 0 {
        println!("Wrote {}", io.output.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rasterkit_core::Rgb;

    #[test]
    fn test_apply_steps_chains_results() {
        let img = RgbImage::filled(6, 6, Rgb::new(200, 30, 30));
        let steps = [Step::Gray, Step::Brightness { percent: 10.0 }];
        let out = apply_steps(img.clone(), &steps, BorderStrategy::Pad).unwrap();
        let gray = rasterkit_ops::pixel_ops::grayscale(&img);
        let expected = rasterkit_ops::tone::brightness(&gray, 25);
        assert_eq!(out, expected);
    }

    #[test]
    fn test_apply_steps_validates_first() {
        let img = RgbImage::filled(4, 4, Rgb::gray(50));
        let steps = [Step::Gray, Step::Blur { sigma: 20.0 }];
        let err = apply_steps(img, &steps, BorderStrategy::Pad).unwrap_err();
        assert!(format!("{err:#}").contains("sigma"));
    }

    #[test]
    fn test_empty_recipe_is_identity() {
        let img = RgbImage::filled(3, 2, Rgb::new(1, 2, 3));
        assert_eq!(apply_steps(img.clone(), &[], BorderStrategy::Mirror).unwrap(), img);
    }
}
