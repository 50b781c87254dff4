use crate::astro_math::Degrees;
use crate::tracker::frame::MAX_FIELD_VALUE;
use crate::tracker::position::RealPosition;
use crate::util::*;

/// Highest elevation the tilt servo accepts
pub const MAX_SERVO_ELEVATION: u16 = 90;

/// The span of real azimuth spread over the full servo travel.
/// Typically where the sun rises and sets as seen from the rig.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AzimuthWindow {
    start: Degrees,
    end: Degrees,
}

impl AzimuthWindow {
    pub fn new(start: Degrees, end: Degrees) -> TrackerResult<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(TrackerError::configuration(format_args!(
                "Azimuth window ({}, {}) must be finite",
                start, end
            )));
        }
        if end <= start {
            return Err(TrackerError::configuration(format_args!(
                "Azimuth window end {} must be greater than start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> Degrees {
        self.start
    }

    pub fn end(&self) -> Degrees {
        self.end
    }
}

/// Maps a real azimuth onto servo travel. Inclusive at both window edges.
pub fn map_azimuth(real_azimuth: Degrees, window: &AzimuthWindow, servo_max_deg: u16) -> u16 {
    if real_azimuth < window.start {
        0
    } else if real_azimuth > window.end {
        servo_max_deg
    } else {
        let fraction = (real_azimuth - window.start) / (window.end - window.start);
        // float -> int casts saturate, so this stays within [0, servo_max_deg]
        (fraction * servo_max_deg as f64) as u16
    }
}

/// Whole degrees above the horizon. Below-horizon bodies park the tilt servo at 0.
pub fn map_elevation(real_altitude: Degrees) -> u16 {
    if real_altitude.is_nan() {
        return 0;
    }
    real_altitude.floor().clamp(0., MAX_SERVO_ELEVATION as f64) as u16
}

/// Validated mapping parameters, built once from configuration
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ServoCalibration {
    window: AzimuthWindow,
    servo_max_deg: u16,
}

impl ServoCalibration {
    pub fn new(window: AzimuthWindow, servo_max_deg: u16) -> TrackerResult<Self> {
        if servo_max_deg == 0 || MAX_FIELD_VALUE < servo_max_deg {
            return Err(TrackerError::configuration(format_args!(
                "Servo travel of {} degrees is outside the valid range of 1 to {}",
                servo_max_deg, MAX_FIELD_VALUE
            )));
        }
        Ok(Self {
            window,
            servo_max_deg,
        })
    }

    pub fn window(&self) -> &AzimuthWindow {
        &self.window
    }

    pub fn servo_max_deg(&self) -> u16 {
        self.servo_max_deg
    }

    pub fn map(&self, position: &RealPosition) -> ServoTarget {
        ServoTarget {
            azimuth: map_azimuth(position.azimuth, &self.window, self.servo_max_deg),
            elevation: map_elevation(position.altitude),
        }
    }
}

/// The pan/tilt angles actually transmitted, always inside the servo's legal range
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ServoTarget {
    azimuth: u16,
    elevation: u16,
}

impl ServoTarget {
    /// For angles that did not come through the mapper, such as operator input
    pub fn checked(azimuth: i64, elevation: i64, servo_max_deg: u16) -> TrackerResult<Self> {
        if !(0..=servo_max_deg as i64).contains(&azimuth) {
            return Err(TrackerError::input(format_args!(
                "Servo azimuth {} is outside the valid range of 0 to {}",
                azimuth, servo_max_deg
            )));
        }
        if !(0..=MAX_SERVO_ELEVATION as i64).contains(&elevation) {
            return Err(TrackerError::input(format_args!(
                "Servo elevation {} is outside the valid range of 0 to {}",
                elevation, MAX_SERVO_ELEVATION
            )));
        }
        Ok(Self {
            azimuth: azimuth as u16,
            elevation: elevation as u16,
        })
    }

    pub fn azimuth(&self) -> u16 {
        self.azimuth
    }

    pub fn elevation(&self) -> u16 {
        self.elevation
    }
}
