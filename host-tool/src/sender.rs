use anyhow::{Context, Result};
use img3_protocol::*;
use indicatif::ProgressBar;
use log::{debug, info};
use std::time::Instant;

use crate::transport::TransportSink;

/// Summary of one delivered frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendReport {
    pub bytes: usize,
    pub crc32: u32,
}

pub struct ImageSender<'a, S: TransportSink> {
    sink: &'a mut S,
    magic: [u8; 4],
    threads: usize,
}

impl<'a, S: TransportSink> ImageSender<'a, S> {
    pub fn new(sink: &'a mut S, magic: [u8; 4]) -> Self {
        Self {
            sink,
            magic,
            threads: 1,
        }
    }

    /// Worker threads used to quantize a frame
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Quantize the grid and frame it
    pub fn prepare(&self, grid: &PixelGrid) -> Result<Packet> {
        let started = Instant::now();
        let indices = encode_parallel(grid, self.threads);
        debug!(
            "quantized {}x{} in {:?} ({} threads)",
            grid.width(),
            grid.height(),
            started.elapsed(),
            self.threads
        );

        let packet = Packet::build(&indices, grid.width(), grid.height(), &self.magic)
            .context("Failed to build image packet")?;
        debug!("header: {}", hex::encode(packet.header_bytes()));
        Ok(packet)
    }

    /// Hand the packet to the sink in a single call. Failures are not retried.
    pub async fn send_packet(&mut self, packet: &Packet) -> Result<SendReport> {
        let data = packet.to_bytes();
        let crc32 = crc32fast::hash(&data);

        info!("sending {} bytes to {}", data.len(), self.sink.describe());
        self.sink
            .send(&data)
            .await
            .with_context(|| format!("Failed to send packet to {}", self.sink.describe()))?;

        Ok(SendReport {
            bytes: data.len(),
            crc32,
        })
    }

    pub async fn send_packet_with_progress(&mut self, packet: &Packet, progress: &ProgressBar) -> Result<SendReport> {
        progress.set_message(format!("Sending {} bytes...", packet.len()));
        let report = self.send_packet(packet).await?;
        progress.set_position(report.bytes as u64);
        Ok(report)
    }

    pub async fn send_grid(&mut self, grid: &PixelGrid) -> Result<SendReport> {
        let packet = self.prepare(grid)?;
        self.send_packet(&packet).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportError;

    #[derive(Default)]
    struct MemorySink {
        sent: Vec<Vec<u8>>,
    }

    impl TransportSink for MemorySink {
        async fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
            self.sent.push(bytes.to_vec());
            Ok(())
        }

        fn describe(&self) -> String {
            "memory".to_string()
        }
    }

    #[derive(Default)]
    struct FailingSink {
        attempts: usize,
    }

    impl TransportSink for FailingSink {
        async fn send(&mut self, _bytes: &[u8]) -> Result<(), TransportError> {
            self.attempts += 1;
            Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "link down",
            )))
        }

        fn describe(&self) -> String {
            "broken link".to_string()
        }
    }

    fn grid(width: usize, height: usize, color: Color) -> PixelGrid {
        PixelGrid::new(width, height, vec![color; width * height]).unwrap()
    }

    #[tokio::test]
    async fn test_send_grid_single_call() {
        let mut sink = MemorySink::default();
        let report = ImageSender::new(&mut sink, DEFAULT_MAGIC)
            .send_grid(&grid(2, 2, Color::new(255, 0, 0)))
            .await
            .unwrap();

        assert_eq!(sink.sent.len(), 1);
        assert_eq!(
            sink.sent[0],
            vec![0x49, 0x4D, 0x47, 0x33, 0x00, 0x02, 0x00, 0x02, 4, 4, 4, 4]
        );
        assert_eq!(report.bytes, 12);
        assert_eq!(report.crc32, crc32fast::hash(&sink.sent[0]));
    }

    #[tokio::test]
    async fn test_threads_do_not_change_payload() {
        let pixels: Vec<Color> = (0..40 * 30)
            .map(|i| Color::new((i * 13 % 256) as u8, (i * 7 % 256) as u8, (i % 256) as u8))
            .collect();
        let grid = PixelGrid::new(40, 30, pixels).unwrap();

        let mut single = MemorySink::default();
        ImageSender::new(&mut single, DEFAULT_MAGIC).send_grid(&grid).await.unwrap();
        let mut multi = MemorySink::default();
        ImageSender::new(&mut multi, DEFAULT_MAGIC)
            .with_threads(4)
            .send_grid(&grid)
            .await
            .unwrap();

        assert_eq!(single.sent, multi.sent);
        assert_eq!(single.sent[0].len(), 8 + 40 * 30);
    }

    #[tokio::test]
    async fn test_transport_failure_not_retried() {
        let mut sink = FailingSink::default();
        let err = ImageSender::new(&mut sink, DEFAULT_MAGIC)
            .send_grid(&grid(1, 1, Color::new(0, 0, 0)))
            .await
            .unwrap_err();

        assert_eq!(sink.attempts, 1);
        let transport = err.downcast_ref::<TransportError>().unwrap();
        assert!(matches!(transport, TransportError::Io(e) if e.kind() == std::io::ErrorKind::NotConnected));
    }

    #[tokio::test]
    async fn test_custom_magic_in_header() {
        let mut sink = MemorySink::default();
        let sender = ImageSender::new(&mut sink, *b"FPGA");
        let packet = sender.prepare(&grid(3, 1, Color::new(0, 255, 0))).unwrap();

        assert_eq!(packet.magic, *b"FPGA");
        assert_eq!(packet.data, vec![2, 2, 2]);
    }

    #[tokio::test]
    async fn test_oversized_grid_fails_before_send() {
        let mut sink = MemorySink::default();
        let err = ImageSender::new(&mut sink, DEFAULT_MAGIC)
            .send_grid(&grid(70_000, 1, Color::new(0, 0, 0)))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<img3_protocol::Error>(),
            Some(img3_protocol::Error::DimensionOutOfRange { .. })
        ));
        assert!(sink.sent.is_empty());
    }
}
