//! Serial scale line (8N1, no flow control).

use std::io::{self, BufRead, BufReader};

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

use crate::domain::ScaleConfig;
use crate::error::{HardwareError, HardwareResult};
use crate::ports::{SerialLine, SerialOpener};

/// Opens the configured device with the `serialport` crate.
pub struct SerialportOpener {
    config: ScaleConfig,
}

impl SerialportOpener {
    pub fn new(config: ScaleConfig) -> Self {
        Self { config }
    }
}

impl SerialOpener for SerialportOpener {
    fn open(&self) -> HardwareResult<Box<dyn SerialLine>> {
        let port = serialport::new(&self.config.port, self.config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(self.config.read_timeout())
            .open()
            .map_err(|e| HardwareError::SerialUnavailable {
                port: self.config.port.clone(),
                reason: e.to_string(),
            })?;

        Ok(Box::new(PortLine {
            reader: BufReader::new(port),
        }))
    }

    fn port_name(&self) -> &str {
        &self.config.port
    }
}

struct PortLine {
    reader: BufReader<Box<dyn SerialPort>>,
}

impl SerialLine for PortLine {
    fn read_line(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        match self.reader.read_until(b'\n', &mut buf) {
            Ok(_) => Ok(buf),
            // A partial line before the timeout still counts as a read.
            Err(e) if e.kind() == io::ErrorKind::TimedOut && !buf.is_empty() => Ok(buf),
            Err(e) => Err(e),
        }
    }
}
