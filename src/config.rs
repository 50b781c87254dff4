use crate::astro_math::Degrees;
use crate::tracker::*;
use crate::util::*;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/* Config */
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub com_settings: ComSettings,
    pub servo: ServoSettings,
    pub pacing: PacingSettings,
    pub simulation: SimulationSettings,
    pub sites: Vec<Site>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            com_settings: ComSettings::default(),
            servo: ServoSettings::default(),
            pacing: PacingSettings::default(),
            simulation: SimulationSettings::default(),
            sites: default_sites(),
        }
    }
}

/* Serial Port Settings */
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComSettings {
    pub path: Option<String>, // None for automatic
    pub baud_rate: u32,
    pub timeout_millis: u64,
}

impl Default for ComSettings {
    fn default() -> Self {
        Self {
            path: None,
            baud_rate: connection::consts::BAUD_RATE,
            timeout_millis: connection::consts::DEFAULT_TIMEOUT_MILLIS,
        }
    }
}

impl ComSettings {
    pub fn transport_builder(&self) -> TransportBuilder {
        let builder = TransportBuilder::new()
            .with_baud_rate(self.baud_rate)
            .with_timeout(Duration::from_millis(self.timeout_millis));
        match &self.path {
            Some(path) => builder.with_path(path),
            None => builder,
        }
    }
}

/* Servo Geometry */
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct ServoSettings {
    /// Real azimuth mapped to servo 0
    pub window_start: Degrees,
    /// Real azimuth mapped to servo_max_deg
    pub window_end: Degrees,
    pub servo_max_deg: u16,
    /// Site whose timezone stamps manual frames
    pub manual_site: SiteId,
}

impl Default for ServoSettings {
    fn default() -> Self {
        Self {
            window_start: 60.,
            window_end: 300.,
            servo_max_deg: 270,
            manual_site: 1,
        }
    }
}

/* Tick Delays */
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct PacingSettings {
    pub live_tick_millis: u64,
    pub day_simulation_tick_millis: u64,
    pub retrograde_tick_millis: u64,
}

impl Default for PacingSettings {
    fn default() -> Self {
        Self {
            live_tick_millis: 1000,
            day_simulation_tick_millis: 150,
            retrograde_tick_millis: 100,
        }
    }
}

/* Simulations */
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct SimulationSettings {
    pub day_start: NaiveTime,
    pub day_end: NaiveTime,
    pub day_step_minutes: u32,
    /// How far ahead a body look-ahead replays, in day simulation steps
    pub look_ahead_hours: u32,
    pub retrograde_body: Body,
    pub retrograde_site: SiteId,
    pub retrograde_start: NaiveDate,
    pub retrograde_end: NaiveDate,
    pub retrograde_step_days: u32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            day_start: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or(NaiveTime::MIN),
            day_end: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN),
            day_step_minutes: 10,
            look_ahead_hours: 12,
            retrograde_body: Body::Mars,
            retrograde_site: 1,
            retrograde_start: NaiveDate::from_ymd_opt(2024, 10, 1).unwrap_or_default(),
            retrograde_end: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap_or_default(),
            retrograde_step_days: 1,
        }
    }
}

/// How long each mode waits between ticks
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pacing {
    pub live_tick: Duration,
    pub day_simulation_tick: Duration,
    pub retrograde_tick: Duration,
}

impl Pacing {
    pub fn delay_for(&self, mode: ModeKind) -> Duration {
        match mode {
            ModeKind::AutomaticTracking => self.live_tick,
            ModeKind::ManualOverride => Duration::ZERO,
            ModeKind::DaySimulation => self.day_simulation_tick,
            ModeKind::RetrogradeSimulation => self.retrograde_tick,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SimulationPlan {
    pub day_start: NaiveTime,
    pub day_end: NaiveTime,
    pub day_step: chrono::Duration,
    pub look_ahead: chrono::Duration,
    pub retrograde_body: Body,
    pub retrograde_site: SiteId,
    pub retrograde_start: NaiveDate,
    pub retrograde_end: NaiveDate,
    pub retrograde_step: chrono::Duration,
}

/// Validated, immutable settings shared by every session
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub calibration: ServoCalibration,
    pub pacing: Pacing,
    pub simulation: SimulationPlan,
    pub registry: Registry,
    pub manual_site: SiteId,
}

impl Config {
    pub fn validate(&self) -> TrackerResult<TrackerConfig> {
        let window = AzimuthWindow::new(self.servo.window_start, self.servo.window_end)?;
        let calibration = ServoCalibration::new(window, self.servo.servo_max_deg)?;
        let registry = Registry::new(self.sites.clone())?;
        registry.site(self.servo.manual_site)?;

        let sim = &self.simulation;
        if sim.day_end <= sim.day_start {
            return Err(TrackerError::configuration(format_args!(
                "Day simulation ends at {} before it starts at {}",
                sim.day_end, sim.day_start
            )));
        }
        if sim.day_step_minutes == 0 || sim.look_ahead_hours == 0 || sim.retrograde_step_days == 0
        {
            return Err(TrackerError::configuration("Simulation steps must be positive"));
        }
        if sim.retrograde_end < sim.retrograde_start {
            return Err(TrackerError::configuration(format_args!(
                "Retrograde playback ends on {} before it starts on {}",
                sim.retrograde_end, sim.retrograde_start
            )));
        }
        registry.site(sim.retrograde_site)?;

        Ok(TrackerConfig {
            calibration,
            pacing: Pacing {
                live_tick: Duration::from_millis(self.pacing.live_tick_millis),
                day_simulation_tick: Duration::from_millis(self.pacing.day_simulation_tick_millis),
                retrograde_tick: Duration::from_millis(self.pacing.retrograde_tick_millis),
            },
            simulation: SimulationPlan {
                day_start: sim.day_start,
                day_end: sim.day_end,
                day_step: chrono::Duration::minutes(sim.day_step_minutes as i64),
                look_ahead: chrono::Duration::hours(sim.look_ahead_hours as i64),
                retrograde_body: sim.retrograde_body,
                retrograde_site: sim.retrograde_site,
                retrograde_start: sim.retrograde_start,
                retrograde_end: sim.retrograde_end,
                retrograde_step: chrono::Duration::days(sim.retrograde_step_days as i64),
            },
            registry,
            manual_site: self.servo.manual_site,
        })
    }
}
