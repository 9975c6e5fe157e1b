//! Quantized Frame Preview
//!
//! Renders what the receiver will display: either quantizes an image to the 8-colour
//! palette, or decodes a packet written with `image-sender --output`, and saves the
//! result as a regular image.

use clap::Parser;
use image::{imageops::FilterType, Rgb, RgbImage};
use img3_protocol::{encode, palette_color, Color, Packet, PixelGrid, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use std::error::Error;
use std::path::PathBuf;

#[derive(Debug, Parser)]
struct Args {
    /// Source image, or a packet file with --packet
    input: PathBuf,
    /// Preview image to write (format from extension)
    output: PathBuf,
    /// Treat the input as a raw packet
    #[arg(long)]
    packet: bool,
    #[arg(short = 'W', long, default_value_t = DEFAULT_WIDTH)]
    width: u16,
    #[arg(short = 'H', long, default_value_t = DEFAULT_HEIGHT)]
    height: u16,
    /// Integer upscale factor for viewing small frames
    #[arg(short, long, default_value_t = 4)]
    scale: u32,
}

/// Palette indices back to RGB
fn render(indices: &[u8], width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let index = indices[(y * width + x) as usize];
        Rgb(palette_color(index).to_array())
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let (indices, width, height) = if args.packet {
        let bytes = std::fs::read(&args.input)?;
        let packet = Packet::from_bytes(&bytes)?;
        println!(
            "Packet: magic {:?}, {}×{}",
            String::from_utf8_lossy(&packet.magic),
            packet.width,
            packet.height
        );
        if packet.width == 0 || packet.height == 0 {
            return Err("packet has an empty frame".into());
        }
        (packet.data, packet.width as u32, packet.height as u32)
    } else {
        let img = image::open(&args.input)?;
        println!("Original image: {}×{}", img.width(), img.height());

        let (width, height) = (args.width as u32, args.height as u32);
        let rgb = img.resize_exact(width, height, FilterType::Triangle).to_rgb8();
        let pixels = rgb.pixels().map(|p| Color::new(p[0], p[1], p[2])).collect();
        let grid = PixelGrid::new(width as usize, height as usize, pixels)?;
        (encode(&grid), width, height)
    };

    let mut counts = [0usize; 8];
    for &index in &indices {
        counts[index as usize & 7] += 1;
    }

    let mut preview = render(&indices, width, height);
    let scale = args.scale.max(1);
    if scale > 1 {
        preview = image::imageops::resize(&preview, width * scale, height * scale, FilterType::Nearest);
    }
    preview.save(&args.output)?;

    println!("Generated {:?} ({}×{})", args.output, preview.width(), preview.height());
    for (index, count) in counts.iter().enumerate() {
        let c = palette_color(index as u8);
        println!("  {}: ({:3}, {:3}, {:3}) {} px", index, c.r, c.g, c.b, count);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use img3_protocol::build_packet;

    #[test]
    fn test_render_packet_colours() {
        let bytes = build_packet(&[4, 2, 1, 7], 2, 2, b"IMG3").unwrap();
        let packet = Packet::from_bytes(&bytes).unwrap();
        let img = render(&packet.data, 2, 2);

        assert_eq!(img.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(img.get_pixel(1, 0), &Rgb([0, 255, 0]));
        assert_eq!(img.get_pixel(0, 1), &Rgb([0, 0, 255]));
        assert_eq!(img.get_pixel(1, 1), &Rgb([255, 255, 255]));
    }
}
