use log::debug;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;
use tokio_serial::{DataBits, Parity, SerialStream, StopBits};

use crate::transport::{TransportError, TransportSink};

/// UART link to the receiver, 8-N-1
pub struct SerialSink {
    port: SerialStream,
    port_name: String,
    baud_rate: u32,
    write_timeout: Duration,
}

impl SerialSink {
    pub fn open(port_name: &str, baud_rate: u32, write_timeout: Duration) -> Result<Self, TransportError> {
        let builder = tokio_serial::new(port_name, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(write_timeout);

        let port = SerialStream::open(&builder).map_err(|source| TransportError::Open {
            port: port_name.to_string(),
            source,
        })?;
        debug!("opened {} at {} baud", port_name, baud_rate);

        Ok(Self {
            port,
            port_name: port_name.to_string(),
            baud_rate,
            write_timeout,
        })
    }

    async fn write_and_flush(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.port.write_all(bytes).await?;
        self.port.flush().await?;
        Ok(())
    }
}

/// Time the UART needs to shift out `len` bytes, 10 bit periods per 8-N-1 frame
pub fn line_time(len: usize, baud_rate: u32) -> Duration {
    let bits = len as u64 * 10;
    Duration::from_micros(bits * 1_000_000 / baud_rate.max(1) as u64)
}

impl TransportSink for SerialSink {
    async fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let limit = self.write_timeout + line_time(bytes.len(), self.baud_rate);
        match timeout(limit, self.write_and_flush(bytes)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(limit)),
        }
    }

    fn describe(&self) -> String {
        format!("{} @ {} baud", self.port_name, self.baud_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_time() {
        assert_eq!(line_time(0, 115_200), Duration::ZERO);
        assert_eq!(line_time(1152, 115_200), Duration::from_millis(100));
        // default 160x120 frame plus header
        assert_eq!(line_time(8 + 160 * 120, 115_200).as_millis(), 1667);
    }

    #[tokio::test]
    async fn test_open_missing_port_fails() {
        let err = SerialSink::open("/dev/img3-no-such-port", 115_200, Duration::from_secs(1))
            .err()
            .unwrap();
        assert!(matches!(err, TransportError::Open { .. }));
    }
}
