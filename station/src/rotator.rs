//! Antenna rotator over a serial link.
//!
//! Commands are ASCII `AZ###.# EL##.#\r\n`. The port is owned exclusively
//! by the tracker; an absent port or a failed write degrades to logging
//! the command, never to aborting a pass.

use std::io::Write;
use std::time::Duration;
use tracing::{info, warn};

/// Serial read/write timeout.
const PORT_TIMEOUT: Duration = Duration::from_secs(1);
/// Settle time after opening; the controller resets on port open.
const OPEN_SETTLE: Duration = Duration::from_secs(2);

pub struct Rotator {
    port: Option<Box<dyn serialport::SerialPort>>,
}

pub fn format_command(az_deg: f64, el_deg: f64) -> String {
    format!("AZ{:06.1} EL{:05.1}\r\n", az_deg, el_deg)
}

impl Rotator {
    /// Open the rotator port. Failure is not fatal: steering commands are
    /// logged instead of sent.
    pub fn open(port_name: &str, baudrate: u32) -> Self {
        match serialport::new(port_name, baudrate)
            .timeout(PORT_TIMEOUT)
            .open()
        {
            Ok(port) => {
                std::thread::sleep(OPEN_SETTLE);
                info!("serial open {} @ {}", port_name, baudrate);
                Self { port: Some(port) }
            }
            Err(e) => {
                warn!("cannot open serial {}: {}; tracking without sending", port_name, e);
                Self { port: None }
            }
        }
    }

    #[cfg(test)]
    pub fn disconnected() -> Self {
        Self { port: None }
    }

    /// Send one steering command; errors are logged and the next tick
    /// retries.
    pub fn point(&mut self, az_deg: f64, el_deg: f64) {
        let cmd = format_command(az_deg, el_deg);
        match &mut self.port {
            Some(port) => {
                if let Err(e) = port.write_all(cmd.as_bytes()) {
                    warn!("serial write error: {} cmd: {}", e, cmd.trim_end());
                }
            }
            None => info!("{}", cmd.trim_end()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_format() {
        assert_eq!(format_command(12.34, 5.6), "AZ0012.3 EL005.6\r\n");
        assert_eq!(format_command(359.96, 89.97), "AZ0360.0 EL090.0\r\n");
        assert_eq!(format_command(0.0, 0.0), "AZ0000.0 EL000.0\r\n");
        assert_eq!(format_command(180.0, 45.5), "AZ0180.0 EL045.5\r\n");
    }

    #[test]
    fn test_point_without_port_does_not_panic() {
        let mut rotator = Rotator::disconnected();
        rotator.point(123.4, 56.7);
    }
}
