//! Image info command.
//!
//! Prints size, detected format and luma statistics.

use anyhow::Result;
use rasterkit_core::Histogram;
use rasterkit_io::Format;
use serde::Serialize;
use std::fs;
use std::path::Path;
#[allow(unused_imports)]
use tracing::{debug, info, trace};

use crate::InfoArgs;

/// One image's report, also the JSON schema.
#[derive(Debug, Serialize)]
struct Report {
    path: String,
    format: String,
    width: u32,
    height: u32,
    file_size: u64,
    luma: LumaStats,
}

#[derive(Debug, Serialize)]
struct LumaStats {
    mean: f64,
    variance: f64,
    median: u8,
    min: u8,
    max: u8,
    gray: bool,
}

fn report(path: &Path) -> Result<Report> {
    let file_size = fs::metadata(path)?.len();
    let format = Format::detect(path).unwrap_or(Format::Unknown);
    let image = super::load_image(path)?;
    let stats = Histogram::from_image(&image).stats();
    Ok(Report {
        path: path.display().to_string(),
        format: format!("{format:?}").to_lowercase(),
        width: image.width(),
        height: image.height(),
        file_size,
        luma: LumaStats {
            mean: stats.mean,
            variance: stats.variance,
            median: stats.median,
            min: stats.min,
            max: stats.max,
            gray: image.pixels().iter().all(|p| p.is_gray()),
        },
    })
}

/// Format file size for display
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

fn print_text(r: &Report, verbose: u8) {
    println!("{}", r.path);
    println!("  Resolution: {}x{}", r.width, r.height);
    println!("  Format:     {}", r.format);
    println!("  File size:  {}", format_size(r.file_size));
    println!("  Luma mean:  {:.3}", r.luma.mean);
    println!("  Luma std:   {:.3}", r.luma.variance.sqrt());
    println!("  Median:     {}", r.luma.median);
    println!("  Range:      {}..{}", r.luma.min, r.luma.max);
    if verbose > 0 {
        println!("  Gray:       {}", r.luma.gray);
    }
}

pub fn run(args: InfoArgs, verbose: u8) -> Result<()> {
    let reports = args
        .input
        .iter()
        .map(|p| report(p))
        .collect::<Result<Vec<_>>>()?;

    if args.json {
        let json = if reports.len() == 1 {
            serde_json::to_string_pretty(&reports[0])?
        } else {
            serde_json::to_string_pretty(&reports)?
        };
        println!("{json}");
        return Ok(());
    }

    for (i, r) in reports.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_text(r, verbose);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rasterkit_core::{Rgb, RgbImage};

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(12), "12 B");
        assert_eq!(format_size(2048), "2.00 KB");
    }

    #[test]
    fn test_report_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flat.png");
        rasterkit_io::write(&path, &RgbImage::filled(4, 3, Rgb::gray(128))).unwrap();
        let r = report(&path).unwrap();
        assert_eq!((r.width, r.height), (4, 3));
        assert_eq!(r.format, "png");
        assert_eq!(r.luma.min, r.luma.max);
        assert!(r.luma.gray);

        let value: serde_json::Value = serde_json::to_value(&r).unwrap();
        assert_eq!(value["luma"]["median"], r.luma.median);
        assert_eq!(value["width"], 4);
    }
}
