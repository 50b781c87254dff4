use crate::tracker::angle_mapper::ServoTarget;
use crate::tracker::frame::Frame;
use crate::util::*;
use async_trait::async_trait;

/// One pair of servo angles as typed by the operator
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ManualEntry {
    pub azimuth: String,
    pub elevation: String,
}

impl ManualEntry {
    pub fn new(azimuth: impl Into<String>, elevation: impl Into<String>) -> Self {
        Self {
            azimuth: azimuth.into(),
            elevation: elevation.into(),
        }
    }

    pub fn parse(&self, servo_max_deg: u16) -> TrackerResult<ServoTarget> {
        ServoTarget::checked(
            parse_angle("azimuth", &self.azimuth)?,
            parse_angle("elevation", &self.elevation)?,
            servo_max_deg,
        )
    }
}

fn parse_angle(name: &str, text: &str) -> TrackerResult<i64> {
    text.trim().parse().map_err(|_| {
        TrackerError::input(format_args!(
            "{} {:?} is not a whole number of degrees",
            name,
            text.trim()
        ))
    })
}

/// Source of manual servo angles for a ManualOverride session
#[async_trait]
pub trait OperatorInput: Send {
    /// Waits for the next entry. None once the operator has nothing more to send.
    async fn next_entry(&mut self) -> Option<ManualEntry>;

    fn rejected(&mut self, _error: &TrackerError) {}

    fn sent(&mut self, _frame: &Frame) {}
}
