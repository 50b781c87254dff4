use crate::config::{Config, PacingSettings, TrackerConfig};
use crate::tracker::connection::Transport;
use crate::tracker::frame::Frame;
use crate::tracker::operator::{ManualEntry, OperatorInput};
use crate::tracker::position::{ObservingLocation, PositionProvider, RealPosition};
use crate::util::*;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Default configuration without any tick delays
pub(in crate::tracker) fn test_config() -> TrackerConfig {
    let mut config = Config::default();
    config.pacing = PacingSettings {
        live_tick_millis: 0,
        day_simulation_tick_millis: 0,
        retrograde_tick_millis: 0,
    };
    config.validate().unwrap()
}

#[derive(Debug, Clone)]
pub(in crate::tracker) struct ProviderCall {
    pub body: Body,
    pub location: ObservingLocation,
    pub instant: DateTime<Utc>,
}

type Respond = Box<dyn Fn(usize) -> TrackerResult<RealPosition> + Send + Sync>;

pub(in crate::tracker) struct StubProvider {
    respond: Respond,
    calls: Mutex<Vec<ProviderCall>>,
}

impl StubProvider {
    pub fn fixed(azimuth: f64, altitude: f64) -> Self {
        Self::from_fn(move |_| Ok(RealPosition { azimuth, altitude }))
    }

    /// `respond` gets the zero based index of the call
    pub fn from_fn(
        respond: impl Fn(usize) -> TrackerResult<RealPosition> + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Box::new(respond),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl PositionProvider for StubProvider {
    fn position_of(
        &self,
        body: Body,
        location: &ObservingLocation,
        instant: DateTime<Utc>,
    ) -> TrackerResult<RealPosition> {
        let mut calls = self.calls.lock().unwrap();
        let index = calls.len();
        calls.push(ProviderCall {
            body,
            location: *location,
            instant,
        });
        (self.respond)(index)
    }
}

#[derive(Default)]
pub(in crate::tracker) struct RecordingTransport {
    pub frames: Vec<String>,
    fail_on: Option<usize>,
    cancel_after: Option<(usize, CancelSignal)>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the write with this zero based index, and every later one
    pub fn failing_on(index: usize) -> Self {
        Self {
            fail_on: Some(index),
            ..Self::default()
        }
    }

    /// Fires `signal` once `count` frames went out
    pub fn cancelling_after(count: usize, signal: CancelSignal) -> Self {
        Self {
            cancel_after: Some((count, signal)),
            ..Self::default()
        }
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn write_frame(&mut self, frame: &[u8]) -> TrackerResult<()> {
        if matches!(self.fail_on, Some(index) if self.frames.len() >= index) {
            return Err(TrackerError::Transport("link dropped".to_owned()));
        }
        self.frames.push(String::from_utf8_lossy(frame).into_owned());
        if let Some((count, signal)) = &self.cancel_after {
            if self.frames.len() >= *count {
                signal.cancel();
            }
        }
        Ok(())
    }
}

pub(in crate::tracker) struct ScriptedInput {
    entries: VecDeque<ManualEntry>,
    hang_when_empty: bool,
    pub rejected: Vec<TrackerError>,
    pub sent: Vec<Frame>,
}

impl ScriptedInput {
    /// Closes once the entries run out
    pub fn new(entries: Vec<ManualEntry>) -> Self {
        Self {
            entries: entries.into(),
            hang_when_empty: false,
            rejected: Vec::new(),
            sent: Vec::new(),
        }
    }

    /// Waits forever once the entries run out
    pub fn hanging(entries: Vec<ManualEntry>) -> Self {
        Self {
            hang_when_empty: true,
            ..Self::new(entries)
        }
    }
}

#[async_trait]
impl OperatorInput for ScriptedInput {
    async fn next_entry(&mut self) -> Option<ManualEntry> {
        match self.entries.pop_front() {
            Some(entry) => Some(entry),
            None if self.hang_when_empty => std::future::pending().await,
            None => None,
        }
    }

    fn rejected(&mut self, error: &TrackerError) {
        self.rejected.push(error.clone());
    }

    fn sent(&mut self, frame: &Frame) {
        self.sent.push(*frame);
    }
}
