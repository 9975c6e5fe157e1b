use anyhow::{bail, Context, Result};
use clap::Parser;
use img3_protocol::{DEFAULT_HEIGHT, DEFAULT_MAGIC, DEFAULT_WIDTH};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

mod image_source;
mod sender;
mod serial;
mod transport;

use sender::{ImageSender, SendReport};
use serial::SerialSink;
use transport::{FileSink, TransportSink};

#[derive(Parser, Debug)]
#[command(name = "image-sender")]
#[command(about = "Quantize an image to 8 colours and send it to an FPGA framebuffer over serial")]
#[command(version = "0.1.0")]
struct Cli {
    /// Input image (PNG, JPEG, BMP, ...)
    #[arg(short, long)]
    image: PathBuf,

    /// Serial port to send to (e.g. /dev/ttyUSB0, COM3)
    #[arg(short, long, required_unless_present = "output")]
    port: Option<String>,

    /// Baud rate
    #[arg(short, long, default_value_t = 115200)]
    baud: u32,

    /// Target frame width
    #[arg(short = 'W', long, default_value_t = DEFAULT_WIDTH)]
    width: u16,

    /// Target frame height
    #[arg(short = 'H', long, default_value_t = DEFAULT_HEIGHT)]
    height: u16,

    /// 4-byte protocol identifier
    #[arg(long, default_value = "IMG3", value_parser = parse_magic)]
    magic: [u8; 4],

    /// Write timeout on top of the line time (e.g. "2s", "500ms")
    #[arg(short, long, default_value = "2s", value_parser = humantime::parse_duration)]
    timeout: Duration,

    /// Write the packet to a file instead of a serial port
    #[arg(short, long, conflicts_with = "port")]
    output: Option<PathBuf>,

    /// Worker threads used for quantization
    #[arg(long, default_value_t = 1)]
    threads: usize,
}

fn parse_magic(s: &str) -> Result<[u8; 4], String> {
    s.as_bytes()
        .try_into()
        .map_err(|_| format!("magic must be exactly 4 bytes, got {}", s.len()))
}

async fn deliver<S: TransportSink>(
    sink: &mut S,
    cli: &Cli,
    grid: &img3_protocol::PixelGrid,
) -> Result<SendReport> {
    let mut sender = ImageSender::new(sink, cli.magic).with_threads(cli.threads);

    println!("Building packet...");
    let packet = sender.prepare(grid)?;

    let pb = ProgressBar::new(packet.len() as u64);
    pb.set_style(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] {msg}")
        .context("Invalid progress template")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    let report = sender.send_packet_with_progress(&packet, &pb).await;
    match &report {
        Ok(_) => pb.finish_with_message("Send completed!"),
        Err(_) => pb.abandon_with_message("Send failed"),
    }
    report
}

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    println!("Loading image: {:?}", cli.image);
    let grid = image_source::load_grid(&cli.image, cli.width as u32, cli.height as u32)?;
    println!("Converted to {}x{} pixels, 3 bits per pixel", grid.width(), grid.height());

    let report = match (&cli.output, &cli.port) {
        (Some(path), _) => {
            let mut sink = FileSink::new(path);
            deliver(&mut sink, &cli, &grid).await?
        }
        (None, Some(port)) => {
            println!("Opening {} @ {} baud...", port, cli.baud);
            let mut sink = SerialSink::open(port, cli.baud, cli.timeout)
                .context("Failed to connect to receiver")?;
            deliver(&mut sink, &cli, &grid).await?
        }
        (None, None) => bail!("either --port or --output is required"),
    };

    println!("Sent {} bytes (CRC-32 0x{:08X})", report.bytes, report.crc32);
    println!("Operation completed successfully!");
    Ok(())
}
