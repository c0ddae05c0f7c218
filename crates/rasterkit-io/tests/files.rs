use std::fs::File;
use std::io::BufWriter;

use rasterkit_core::{Rgb, RgbImage};
use rasterkit_io::{read, write, Format, IoError};

fn checker(w: u32, h: u32) -> RgbImage {
    RgbImage::from_fn(w, h, |x, y| {
        if (x / 4 + y / 4) % 2 == 0 {
            Rgb::new(250, 20, 20)
        } else {
            Rgb::new(10, 10, 200)
        }
    })
    .unwrap()
}

#[test]
fn png_file_roundtrip_is_lossless() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checker.png");
    let img = checker(20, 12);
    write(&path, &img).unwrap();
    assert_eq!(Format::detect(&path).unwrap(), Format::Png);
    assert_eq!(read(&path).unwrap(), img);
}

#[test]
fn jpeg_file_roundtrip_keeps_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checker.jpg");
    let img = checker(32, 24);
    write(&path, &img).unwrap();
    let back = read(&path).unwrap();
    assert_eq!(back.dimensions(), (32, 24));
    // center of a red tile
    assert!(back.pixel(1, 1).r > 180);
}

#[test]
fn content_wins_over_extension() {
    let dir = tempfile::tempdir().unwrap();
    let jpg = dir.path().join("real.jpg");
    write(&jpg, &checker(8, 8)).unwrap();
    let renamed = dir.path().join("misnamed.png");
    std::fs::rename(&jpg, &renamed).unwrap();
    assert_eq!(Format::detect(&renamed).unwrap(), Format::Jpeg);
    assert_eq!(read(&renamed).unwrap().dimensions(), (8, 8));
}

#[test]
fn gray_png_is_expanded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gray.png");
    {
        let w = BufWriter::new(File::create(&path).unwrap());
        let mut enc = png::Encoder::new(w, 3, 1);
        enc.set_color(png::ColorType::Grayscale);
        enc.set_depth(png::BitDepth::Eight);
        let mut writer = enc.write_header().unwrap();
        writer.write_image_data(&[0, 128, 255]).unwrap();
    }
    let img = read(&path).unwrap();
    assert_eq!(img.row(0), &[Rgb::gray(0), Rgb::gray(128), Rgb::gray(255)]);
}

#[test]
fn sixteen_bit_png_keeps_high_byte() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deep.png");
    {
        let w = BufWriter::new(File::create(&path).unwrap());
        let mut enc = png::Encoder::new(w, 1, 1);
        enc.set_color(png::ColorType::Rgba);
        enc.set_depth(png::BitDepth::Sixteen);
        let mut writer = enc.write_header().unwrap();
        writer
            .write_image_data(&[0x12, 0x34, 0xAB, 0xCD, 0xFF, 0x00, 0x80, 0x80])
            .unwrap();
    }
    assert_eq!(read(&path).unwrap().pixel(0, 0), Rgb::new(0x12, 0xAB, 0xFF));
}

#[test]
fn unknown_extension_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("image.bmp");
    let err = write(&path, &checker(4, 4)).unwrap_err();
    assert!(matches!(err, IoError::UnsupportedFormat(ref ext) if ext == "bmp"));

    std::fs::write(&path, b"BM not really").unwrap();
    assert!(matches!(read(&path), Err(IoError::UnsupportedFormat(_))));
}

#[test]
fn missing_file_is_io_error() {
    let err = read("/definitely/not/here.png").unwrap_err();
    assert!(matches!(err, IoError::Io(_)));
}
