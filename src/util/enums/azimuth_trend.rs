use crate::astro_math::{modulo, Degrees};

/// Apparent direction of travel between two consecutive azimuth samples
#[derive(Eq, PartialEq, Debug, Copy, Clone)]
pub enum AzimuthTrend {
    Forward,
    Backward,
    Still,
}

impl AzimuthTrend {
    const STILL_THRESHOLD: Degrees = 0.01;

    /// Uses the shortest arc, so 359 -> 1 is Forward
    pub fn between(previous: Degrees, current: Degrees) -> Self {
        let delta = modulo(current - previous + 180., 360.) - 180.;
        if delta.abs() < Self::STILL_THRESHOLD {
            Self::Still
        } else if 0. < delta {
            Self::Forward
        } else {
            Self::Backward
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            AzimuthTrend::Forward => "-->",
            AzimuthTrend::Backward => "<--",
            AzimuthTrend::Still => "---",
        }
    }
}
