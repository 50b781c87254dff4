use super::*;
use serialport::{SerialPortInfo, SerialPortType};
use std::time::Duration;

#[derive(Clone, Default, Debug)]
pub struct TransportBuilder {
    path: Option<String>,
    baud_rate: Option<u32>,
    timeout: Option<Duration>,
}

/// Picks the port most likely to be the Bluetooth serial link
fn select_port(ports: &[SerialPortInfo]) -> Option<&str> {
    ports
        .iter()
        .find(|p| matches!(p.port_type, SerialPortType::BluetoothPort))
        .or_else(|| ports.iter().find(|p| p.port_name.contains("rfcomm")))
        .map(|p| p.port_name.as_str())
}

impl TransportBuilder {
    fn determine_serial_port() -> String {
        match serialport::available_ports() {
            Ok(ports) => match select_port(&ports) {
                Some(port) => port.to_owned(),
                None => {
                    tracing::warn!(
                        "No Bluetooth serial port found, falling back to {}",
                        consts::FALLBACK_PATH
                    );
                    consts::FALLBACK_PATH.to_owned()
                }
            },
            Err(e) => {
                tracing::warn!("Couldn't list serial ports: {}", e.description);
                consts::FALLBACK_PATH.to_owned()
            }
        }
    }

    pub fn new() -> Self {
        TransportBuilder::default()
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = Some(baud_rate);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn open(&self) -> TrackerResult<SerialTransport> {
        let path = match &self.path {
            Some(path) => path.clone(),
            None => {
                let port = Self::determine_serial_port();
                tracing::warn!("Using serial port at {}", port);
                port
            }
        };
        let baud_rate = self.baud_rate.unwrap_or(consts::BAUD_RATE);
        let timeout = self
            .timeout
            .unwrap_or_else(|| Duration::from_millis(consts::DEFAULT_TIMEOUT_MILLIS));

        let port = serialport::new(&path, baud_rate)
            .timeout(timeout)
            .open()
            .map_err(|e| {
                TrackerError::Transport(format!("Couldn't open {}: {}", path, e.description))
            })?;
        tracing::info!("Opened {} at {} baud", path, baud_rate);

        Ok(SerialTransport {
            port: Arc::new(Mutex::new(port)),
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(name: &str, port_type: SerialPortType) -> SerialPortInfo {
        SerialPortInfo {
            port_name: name.to_owned(),
            port_type,
        }
    }

    #[test]
    fn test_select_port_prefers_bluetooth() {
        let ports = vec![
            port("/dev/ttyS0", SerialPortType::PciPort),
            port("/dev/rfcomm1", SerialPortType::Unknown),
            port("/dev/tty.HC-05", SerialPortType::BluetoothPort),
        ];
        assert_eq!(select_port(&ports), Some("/dev/tty.HC-05"));
        assert_eq!(select_port(&ports[..2]), Some("/dev/rfcomm1"));
        assert_eq!(select_port(&ports[..1]), None);
        assert_eq!(select_port(&[]), None);
    }

    #[test]
    fn test_open_missing_port_is_transport_error() {
        let result = TransportBuilder::new()
            .with_path("/dev/does-not-exist-sky-tracker")
            .with_timeout(Duration::from_millis(10))
            .open();
        assert!(matches!(result, Err(TrackerError::Transport(_))));
    }
}
