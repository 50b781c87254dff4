use crate::astro_math::Degrees;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackerError {
    /// Bad window, unknown site/body or an impossible local time. Fatal to the operation.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// Operator typed something unusable. The session reprompts.
    #[error("Input error: {0}")]
    Input(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Position provider error: {0}")]
    Provider(String),
    #[error("Frame error: {0}")]
    Frame(String),
}

pub type TrackerResult<T> = Result<T, TrackerError>;

impl TrackerError {
    pub fn configuration(msg: impl std::fmt::Display) -> Self {
        Self::Configuration(msg.to_string())
    }

    pub fn input(msg: impl std::fmt::Display) -> Self {
        Self::Input(msg.to_string())
    }

    pub fn provider(msg: impl std::fmt::Display) -> Self {
        Self::Provider(msg.to_string())
    }

    pub fn frame(msg: impl std::fmt::Display) -> Self {
        Self::Frame(msg.to_string())
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Input(_))
    }
}

impl From<std::io::Error> for TrackerError {
    fn from(e: std::io::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

impl From<serialport::Error> for TrackerError {
    fn from(e: serialport::Error) -> Self {
        Self::Transport(e.description)
    }
}

pub fn check_latitude(lat: Degrees) -> TrackerResult<()> {
    if (-90. ..=90.).contains(&lat) {
        Ok(())
    } else {
        Err(TrackerError::configuration(format_args!(
            "Latitude of {} is outside the valid range of -90 to 90",
            lat
        )))
    }
}

pub fn check_longitude(lon: Degrees) -> TrackerResult<()> {
    if (-180. ..=180.).contains(&lon) {
        Ok(())
    } else {
        Err(TrackerError::configuration(format_args!(
            "Longitude of {} is outside the valid range of -180 to 180",
            lon
        )))
    }
}

pub fn check_elevation(elevation: f64) -> TrackerResult<()> {
    if elevation.is_finite() && 0. <= elevation {
        Ok(())
    } else {
        Err(TrackerError::configuration(format_args!(
            "Elevation of {} m is not valid",
            elevation
        )))
    }
}

pub fn check_alt(alt: Degrees) -> TrackerResult<()> {
    if (-90. ..=90.).contains(&alt) {
        Ok(())
    } else {
        Err(TrackerError::provider(format_args!(
            "Altitude of {} is not valid",
            alt
        )))
    }
}

pub fn check_az(az: Degrees) -> TrackerResult<()> {
    if az.is_finite() {
        Ok(())
    } else {
        Err(TrackerError::provider(format_args!(
            "Azimuth {} is not valid",
            az
        )))
    }
}
