use anyhow::{ensure, Context, Result};
use image::{imageops::FilterType, DynamicImage};
use img3_protocol::{Color, PixelGrid};
use log::debug;
use std::path::Path;

/// Decode an image file and fit it to the receiver resolution
pub fn load_grid(path: &Path, width: u32, height: u32) -> Result<PixelGrid> {
    let img = image::open(path).with_context(|| format!("Failed to decode image: {:?}", path))?;
    debug!("decoded {:?}: {}x{}", path, img.width(), img.height());

    grid_from_image(&img, width, height)
}

/// Drop alpha, resize exactly to `width` x `height` (bilinear) and collect row-major pixels
pub fn grid_from_image(img: &DynamicImage, width: u32, height: u32) -> Result<PixelGrid> {
    ensure!(
        width > 0 && height > 0,
        "Target resolution must be positive, got {}x{}",
        width,
        height
    );

    let rgb = if img.width() == width && img.height() == height {
        img.to_rgb8()
    } else {
        img.resize_exact(width, height, FilterType::Triangle).to_rgb8()
    };

    let pixels = rgb.pixels().map(|p| Color::new(p[0], p[1], p[2])).collect();
    PixelGrid::new(width as usize, height as usize, pixels).context("Invalid target resolution")
}
