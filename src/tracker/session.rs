use crate::astro_math::Degrees;
use crate::config::{SimulationPlan, TrackerConfig};
use crate::tracker::clock::*;
use crate::tracker::connection::Transport;
use crate::tracker::frame::{Frame, TimeOfDay};
use crate::tracker::operator::OperatorInput;
use crate::tracker::position::{PositionProvider, RealPosition};
use crate::tracker::registry::{Site, SiteId, MANUAL_SOURCE_ID};
use crate::util::*;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// What a session should do, and with which site and body
#[derive(Debug, Clone, PartialEq)]
pub enum RunMode {
    /// Follow a body in real time until cancelled
    AutomaticTracking { site: SiteId, body: Body },
    /// Send operator supplied servo angles, stamped with the site's local time
    ManualOverride { site: SiteId },
    /// Replay one local day at the site
    DaySimulation {
        site: SiteId,
        body: Body,
        date: NaiveDate,
    },
    /// Replay the configured look-ahead span from `from` in day simulation steps
    LookAhead {
        site: SiteId,
        body: Body,
        from: DateTime<Utc>,
    },
    /// Step across days at 00:00 UTC, both dates inclusive
    RetrogradeSimulation {
        site: SiteId,
        body: Body,
        start: NaiveDate,
        end: NaiveDate,
    },
}

impl RunMode {
    pub fn kind(&self) -> ModeKind {
        match self {
            RunMode::AutomaticTracking { .. } => ModeKind::AutomaticTracking,
            RunMode::ManualOverride { .. } => ModeKind::ManualOverride,
            RunMode::DaySimulation { .. } | RunMode::LookAhead { .. } => ModeKind::DaySimulation,
            RunMode::RetrogradeSimulation { .. } => ModeKind::RetrogradeSimulation,
        }
    }

    pub fn site(&self) -> SiteId {
        match self {
            RunMode::AutomaticTracking { site, .. }
            | RunMode::ManualOverride { site }
            | RunMode::DaySimulation { site, .. }
            | RunMode::LookAhead { site, .. }
            | RunMode::RetrogradeSimulation { site, .. } => *site,
        }
    }

    /// The configured retrograde playback
    pub fn retrograde(plan: &SimulationPlan) -> Self {
        RunMode::RetrogradeSimulation {
            site: plan.retrograde_site,
            body: plan.retrograde_body,
            start: plan.retrograde_start,
            end: plan.retrograde_end,
        }
    }
}

enum Plan<'c> {
    Computed {
        site: &'c Site,
        body: Body,
        clock: Box<dyn ClockSource>,
        delay: Duration,
    },
    Manual {
        site: &'c Site,
    },
}

/// Drives one run at a time: clock, provider, mapper, codec, transport
pub struct TrackingSession<'a> {
    config: &'a TrackerConfig,
    provider: &'a dyn PositionProvider,
    transport: &'a mut dyn Transport,
    input: Option<&'a mut dyn OperatorInput>,
    state: SessionState,
}

impl<'a> TrackingSession<'a> {
    pub fn new(
        config: &'a TrackerConfig,
        provider: &'a dyn PositionProvider,
        transport: &'a mut dyn Transport,
    ) -> Self {
        Self {
            config,
            provider,
            transport,
            input: None,
            state: SessionState::Idle,
        }
    }

    /// Required for ManualOverride
    pub fn with_operator_input(mut self, input: &'a mut dyn OperatorInput) -> Self {
        self.input = Some(input);
        self
    }

    #[cfg(test)]
    pub fn state(&self) -> SessionState {
        self.state
    }

    fn transition(&mut self, next: SessionState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "{:?} -> {:?}",
            self.state,
            next
        );
        debug!("Session {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Runs `mode` until it completes, is cancelled or fails.
    /// The session is Idle again once this returns.
    pub async fn run(&mut self, mode: RunMode, cancel: &CancelSignal) -> TrackerResult<RunOutcome> {
        if !self.state.is_idle() {
            return Err(TrackerError::configuration(format_args!(
                "Session is busy ({:?})",
                self.state
            )));
        }

        let kind = mode.kind();
        let plan = self.prepare(&mode).map_err(|e| {
            error!("Couldn't start {}: {}", kind, e);
            e
        })?;

        self.transition(SessionState::Running(kind));
        info!("Starting {} at site {}", kind, mode.site());

        let result = match plan {
            Plan::Computed {
                site,
                body,
                clock,
                delay,
            } => self.run_computed(site, body, clock, delay, cancel).await,
            Plan::Manual { site } => self.run_manual(site, cancel).await,
        };

        match &result {
            Ok(outcome) => {
                let next = if outcome.is_completed() {
                    SessionState::Completed
                } else {
                    SessionState::Cancelled
                };
                self.transition(next);
                info!("{} finished after {} frames: {:?}", kind, outcome.frames_sent(), next);
            }
            Err(e) => error!("{} stopped: {}", kind, e),
        }
        self.transition(SessionState::Idle);
        result
    }

    fn prepare(&self, mode: &RunMode) -> TrackerResult<Plan<'a>> {
        let config: &'a TrackerConfig = self.config;
        let sim = &config.simulation;
        let site = config.registry.site(mode.site())?;
        let delay = config.pacing.delay_for(mode.kind());

        let plan = match *mode {
            RunMode::AutomaticTracking { body, .. } => Plan::Computed {
                site,
                body,
                clock: Box::new(LiveClock::new(site.timezone)),
                delay,
            },
            RunMode::ManualOverride { .. } => {
                if self.input.is_none() {
                    return Err(TrackerError::configuration(
                        "Manual override needs an operator input",
                    ));
                }
                Plan::Manual { site }
            }
            RunMode::DaySimulation { body, date, .. } => Plan::Computed {
                site,
                body,
                clock: Box::new(SimulatedClock::day(
                    site.timezone,
                    date,
                    sim.day_start,
                    sim.day_end,
                    sim.day_step,
                )?),
                delay,
            },
            RunMode::LookAhead { body, from, .. } => {
                let start = from.with_timezone(&site.timezone);
                Plan::Computed {
                    site,
                    body,
                    clock: Box::new(SimulatedClock::new(
                        start,
                        start + sim.look_ahead,
                        sim.day_step,
                    )?),
                    delay,
                }
            }
            RunMode::RetrogradeSimulation {
                body, start, end, ..
            } => Plan::Computed {
                site,
                body,
                clock: Box::new(SimulatedClock::days(
                    start,
                    end,
                    NaiveTime::MIN,
                    sim.retrograde_step,
                )?),
                delay,
            },
        };
        Ok(plan)
    }

    async fn run_computed(
        &mut self,
        site: &Site,
        body: Body,
        mut clock: Box<dyn ClockSource>,
        delay: Duration,
        cancel: &CancelSignal,
    ) -> TrackerResult<RunOutcome> {
        let mut frames_sent = 0;
        let mut previous_azimuth: Option<Degrees> = None;

        loop {
            if cancel.is_cancelled() {
                return Ok(RunOutcome::Cancelled { frames_sent });
            }

            let instant = clock.now();
            let real = self.locate(body, site, instant)?;
            let target = self.config.calibration.map(&real);
            let frame = Frame::for_target(target, TimeOfDay::of(&instant), site.source_id())?;
            self.transport.write_frame(&frame.encode()).await?;
            frames_sent += 1;

            let trend = previous_azimuth
                .map(|previous| AzimuthTrend::between(previous, real.azimuth))
                .unwrap_or(AzimuthTrend::Still);
            info!(
                "{} {} az {:.2} {} alt {:.2} => {}",
                instant.format("%Y-%m-%d %H:%M:%S %Z"),
                body,
                real.azimuth,
                trend.arrow(),
                real.altitude,
                frame
            );
            previous_azimuth = Some(real.azimuth);

            clock.tick()?;
            if clock.is_finished() {
                return Ok(RunOutcome::Completed { frames_sent });
            }

            pause(delay, cancel).await;
        }
    }

    async fn run_manual(&mut self, site: &Site, cancel: &CancelSignal) -> TrackerResult<RunOutcome> {
        let clock = LiveClock::new(site.timezone);
        let servo_max_deg = self.config.calibration.servo_max_deg();
        let mut frames_sent = 0;

        loop {
            if cancel.is_cancelled() {
                return Ok(RunOutcome::Cancelled { frames_sent });
            }

            let Some(input) = self.input.as_deref_mut() else {
                return Err(TrackerError::configuration(
                    "Manual override needs an operator input",
                ));
            };
            let entry = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(RunOutcome::Cancelled { frames_sent }),
                entry = input.next_entry() => entry,
            };
            let Some(entry) = entry else {
                info!("Operator input closed");
                return Ok(RunOutcome::Cancelled { frames_sent });
            };

            match entry.parse(servo_max_deg) {
                Ok(target) => {
                    let frame =
                        Frame::for_target(target, TimeOfDay::of(&clock.now()), MANUAL_SOURCE_ID)?;
                    self.transport.write_frame(&frame.encode()).await?;
                    frames_sent += 1;
                    info!("Manual => {}", frame);
                    if let Some(input) = self.input.as_deref_mut() {
                        input.sent(&frame);
                    }
                }
                Err(e) if e.is_recoverable() => {
                    warn!("Rejected manual entry: {}", e);
                    if let Some(input) = self.input.as_deref_mut() {
                        input.rejected(&e);
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn locate(&self, body: Body, site: &Site, instant: DateTime<Tz>) -> TrackerResult<RealPosition> {
        self.provider
            .position_of(body, &site.location(), instant.with_timezone(&Utc))?
            .checked()
    }
}

/// Waits out a tick delay, cut short by cancellation
async fn pause(delay: Duration, cancel: &CancelSignal) {
    if delay.is_zero() {
        tokio::task::yield_now().await;
        return;
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {}
        _ = tokio::time::sleep(delay) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, PacingSettings};
    use crate::tracker::operator::ManualEntry;
    use crate::tracker::test_util::*;
    use chrono::{Duration as ChronoDuration, TimeZone, Timelike};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn run_with(
        config: &TrackerConfig,
        provider: &StubProvider,
        transport: &mut RecordingTransport,
        mode: RunMode,
        cancel: &CancelSignal,
    ) -> (TrackerResult<RunOutcome>, SessionState) {
        let mut session = TrackingSession::new(config, provider, transport);
        let result = session.run(mode, cancel).await;
        (result, session.state())
    }

    #[tokio::test]
    async fn test_day_simulation_sends_every_step() {
        let config = test_config();
        let provider = StubProvider::fixed(180., 45.);
        let mut transport = RecordingTransport::new();
        let mode = RunMode::DaySimulation {
            site: 2,
            body: Body::Sun,
            date: date(2024, 6, 21),
        };

        let (result, state) =
            run_with(&config, &provider, &mut transport, mode, &CancelSignal::new()).await;

        assert_eq!(result, Ok(RunOutcome::Completed { frames_sent: 73 }));
        assert_eq!(state, SessionState::Idle);
        assert_eq!(transport.frames.len(), 73);
        assert_eq!(transport.frames[0], "A135E045H060000I2");
        assert_eq!(transport.frames[72], "A135E045H180000I2");

        let frames: Vec<Frame> = transport
            .frames
            .iter()
            .map(|f| Frame::decode(f.as_bytes()).unwrap())
            .collect();
        assert!(frames
            .iter()
            .all(|f| f.azimuth() == 135 && f.elevation() == 45 && f.source_id() == 2));
        assert_eq!(frames[0].time().seconds_of_day(), 6 * 3600);
        for pair in frames.windows(2) {
            assert_eq!(
                pair[1].time().seconds_of_day(),
                pair[0].time().seconds_of_day() + 600
            );
        }

        let calls = provider.calls();
        assert_eq!(calls.len(), 73);
        for pair in calls.windows(2) {
            assert_eq!(pair[1].instant - pair[0].instant, ChronoDuration::minutes(10));
        }
        assert!(calls.iter().all(|c| c.body == Body::Sun));
        assert!(calls.iter().all(|c| c.location.elevation == 650.));
        // Madrid is on UTC+2 in June
        assert_eq!(calls[0].instant.hour(), 4);
    }

    #[tokio::test]
    async fn test_look_ahead_tracks_chosen_body() {
        let config = test_config();
        let provider = StubProvider::fixed(180., 30.);
        let mut transport = RecordingTransport::new();
        let from = Utc.with_ymd_and_hms(2024, 6, 21, 20, 0, 0).unwrap();
        let mode = RunMode::LookAhead {
            site: 1,
            body: Body::Jupiter,
            from,
        };

        let (result, state) =
            run_with(&config, &provider, &mut transport, mode, &CancelSignal::new()).await;

        // 12 hours in 10 minute steps, both ends included
        assert_eq!(result, Ok(RunOutcome::Completed { frames_sent: 73 }));
        assert_eq!(state, SessionState::Idle);

        let calls = provider.calls();
        assert_eq!(calls.len(), 73);
        assert!(calls.iter().all(|c| c.body == Body::Jupiter));
        assert_eq!(calls[0].instant, from);
        assert_eq!(calls[72].instant, from + ChronoDuration::hours(12));
        for pair in calls.windows(2) {
            assert_eq!(pair[1].instant - pair[0].instant, ChronoDuration::minutes(10));
        }

        // Bogota is UTC-5, so the replay crosses local midnight
        assert_eq!(transport.frames[0], "A135E030H150000I1");
        assert_eq!(transport.frames[72], "A135E030H030000I1");
    }

    #[tokio::test]
    async fn test_below_horizon_parks_tilt() {
        let config = test_config();
        let provider = StubProvider::fixed(10., -12.);
        let mut transport = RecordingTransport::new();
        let mode = RunMode::DaySimulation {
            site: 1,
            body: Body::Moon,
            date: date(2024, 6, 21),
        };

        let (result, _) =
            run_with(&config, &provider, &mut transport, mode, &CancelSignal::new()).await;

        assert!(result.unwrap().is_completed());
        assert!(transport.frames.iter().all(|f| f.starts_with("A000E000H")));
    }

    #[tokio::test]
    async fn test_azimuth_normalised_before_mapping() {
        let config = test_config();
        let provider = StubProvider::fixed(540., 20.);
        let mut transport = RecordingTransport::new();
        let mode = RunMode::RetrogradeSimulation {
            site: 1,
            body: Body::Mars,
            start: date(2024, 10, 1),
            end: date(2024, 10, 1),
        };

        let (result, _) =
            run_with(&config, &provider, &mut transport, mode, &CancelSignal::new()).await;

        assert_eq!(result, Ok(RunOutcome::Completed { frames_sent: 1 }));
        assert_eq!(transport.frames, vec!["A135E020H000000I1".to_owned()]);
    }

    #[tokio::test]
    async fn test_retrograde_covers_inclusive_dates() {
        let config = test_config();
        let provider = StubProvider::fixed(200., 30.);
        let mut transport = RecordingTransport::new();
        let mode = RunMode::RetrogradeSimulation {
            site: 1,
            body: Body::Mars,
            start: date(2024, 10, 1),
            end: date(2024, 10, 10),
        };

        let (result, state) =
            run_with(&config, &provider, &mut transport, mode, &CancelSignal::new()).await;

        assert_eq!(result, Ok(RunOutcome::Completed { frames_sent: 10 }));
        assert_eq!(state, SessionState::Idle);
        assert!(transport.frames.iter().all(|f| f.ends_with("H000000I1")));

        let calls = provider.calls();
        assert_eq!(calls[0].instant, date(2024, 10, 1).and_time(NaiveTime::MIN).and_utc());
        assert_eq!(calls[9].instant, date(2024, 10, 10).and_time(NaiveTime::MIN).and_utc());
        assert!(calls.iter().all(|c| c.body == Body::Mars));
        assert!(calls.iter().all(|c| c.location.elevation == 2640.));
    }

    #[tokio::test]
    async fn test_default_retrograde_mode() {
        let config = test_config();
        let mode = RunMode::retrograde(&config.simulation);
        assert_eq!(
            mode,
            RunMode::RetrogradeSimulation {
                site: 1,
                body: Body::Mars,
                start: date(2024, 10, 1),
                end: date(2025, 5, 1),
            }
        );

        let provider = StubProvider::fixed(200., 30.);
        let mut transport = RecordingTransport::new();
        let (result, _) =
            run_with(&config, &provider, &mut transport, mode, &CancelSignal::new()).await;
        assert_eq!(result, Ok(RunOutcome::Completed { frames_sent: 213 }));
    }

    #[tokio::test]
    async fn test_cancel_stops_live_tracking() {
        let config = test_config();
        let provider = StubProvider::fixed(180., 45.);
        let cancel = CancelSignal::new();
        let mut transport = RecordingTransport::cancelling_after(3, cancel.clone());
        let mode = RunMode::AutomaticTracking {
            site: 4,
            body: Body::Sun,
        };

        let (result, state) = run_with(&config, &provider, &mut transport, mode, &cancel).await;

        assert_eq!(result, Ok(RunOutcome::Cancelled { frames_sent: 3 }));
        assert_eq!(state, SessionState::Idle);
        assert_eq!(transport.frames.len(), 3);
        assert!(transport.frames.iter().all(|f| f.ends_with("I4")));
    }

    #[tokio::test]
    async fn test_cancel_interrupts_tick_delay() {
        let mut config = test_config();
        config.pacing.live_tick = Duration::from_secs(3600);
        let provider = StubProvider::fixed(180., 45.);
        let cancel = CancelSignal::new();
        let mut transport = RecordingTransport::new();
        let remote = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            remote.cancel();
        });

        let mode = RunMode::AutomaticTracking {
            site: 1,
            body: Body::Sun,
        };
        let (result, _) = tokio::time::timeout(
            Duration::from_secs(5),
            run_with(&config, &provider, &mut transport, mode, &cancel),
        )
        .await
        .unwrap();

        assert_eq!(result, Ok(RunOutcome::Cancelled { frames_sent: 1 }));
        assert_eq!(transport.frames.len(), 1);
    }

    #[tokio::test]
    async fn test_already_cancelled_sends_nothing() {
        let config = test_config();
        let provider = StubProvider::fixed(180., 45.);
        let cancel = CancelSignal::new();
        cancel.cancel();
        let mut transport = RecordingTransport::new();
        let mode = RunMode::DaySimulation {
            site: 1,
            body: Body::Sun,
            date: date(2024, 6, 21),
        };

        let (result, _) = run_with(&config, &provider, &mut transport, mode, &cancel).await;

        assert_eq!(result, Ok(RunOutcome::Cancelled { frames_sent: 0 }));
        assert!(transport.frames.is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_ends_run() {
        let config = test_config();
        let provider = StubProvider::fixed(180., 45.);
        let mut transport = RecordingTransport::failing_on(1);
        let mode = RunMode::DaySimulation {
            site: 1,
            body: Body::Sun,
            date: date(2024, 6, 21),
        };

        let (result, state) =
            run_with(&config, &provider, &mut transport, mode, &CancelSignal::new()).await;

        assert!(matches!(result, Err(TrackerError::Transport(_))));
        assert_eq!(state, SessionState::Idle);
        assert_eq!(transport.frames.len(), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_sends_nothing_for_that_tick() {
        let config = test_config();
        let provider = StubProvider::from_fn(|call| {
            if call == 2 {
                Err(TrackerError::provider("ephemeris unavailable"))
            } else {
                Ok(RealPosition {
                    azimuth: 180.,
                    altitude: 45.,
                })
            }
        });
        let mut transport = RecordingTransport::new();
        let mode = RunMode::DaySimulation {
            site: 1,
            body: Body::Sun,
            date: date(2024, 6, 21),
        };

        let (result, state) =
            run_with(&config, &provider, &mut transport, mode, &CancelSignal::new()).await;

        assert!(matches!(result, Err(TrackerError::Provider(_))));
        assert_eq!(state, SessionState::Idle);
        assert_eq!(transport.frames.len(), 2);
    }

    #[tokio::test]
    async fn test_non_finite_position_is_provider_error() {
        let config = test_config();
        let provider = StubProvider::fixed(f64::NAN, 45.);
        let mut transport = RecordingTransport::new();
        let mode = RunMode::AutomaticTracking {
            site: 1,
            body: Body::Venus,
        };

        let (result, _) =
            run_with(&config, &provider, &mut transport, mode, &CancelSignal::new()).await;

        assert!(matches!(result, Err(TrackerError::Provider(_))));
        assert!(transport.frames.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_site_never_starts() {
        let config = test_config();
        let provider = StubProvider::fixed(180., 45.);
        let mut transport = RecordingTransport::new();
        let mode = RunMode::AutomaticTracking {
            site: 9,
            body: Body::Sun,
        };

        let (result, state) =
            run_with(&config, &provider, &mut transport, mode, &CancelSignal::new()).await;

        assert!(matches!(result, Err(TrackerError::Configuration(_))));
        assert_eq!(state, SessionState::Idle);
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_day_start_in_dst_gap() {
        let mut config = Config::default();
        config.pacing = PacingSettings {
            live_tick_millis: 0,
            day_simulation_tick_millis: 0,
            retrograde_tick_millis: 0,
        };
        config.simulation.day_start = NaiveTime::from_hms_opt(2, 30, 0).unwrap();
        let config = config.validate().unwrap();
        let provider = StubProvider::fixed(180., 45.);
        let mut transport = RecordingTransport::new();
        let mode = RunMode::DaySimulation {
            site: 2,
            body: Body::Sun,
            date: date(2024, 3, 31),
        };

        let (result, _) =
            run_with(&config, &provider, &mut transport, mode, &CancelSignal::new()).await;

        assert!(matches!(result, Err(TrackerError::Configuration(_))));
        assert!(transport.frames.is_empty());
    }

    #[tokio::test]
    async fn test_manual_override_skips_invalid_entries() {
        let config = test_config();
        let provider = StubProvider::fixed(180., 45.);
        let mut transport = RecordingTransport::new();
        let mut input = ScriptedInput::new(vec![
            ManualEntry::new("5", "90"),
            ManualEntry::new("abc", "10"),
            ManualEntry::new("300", "10"),
            ManualEntry::new("270", "0"),
        ]);

        let (result, state) = {
            let mut session = TrackingSession::new(&config, &provider, &mut transport)
                .with_operator_input(&mut input);
            let result = session
                .run(RunMode::ManualOverride { site: 1 }, &CancelSignal::new())
                .await;
            (result, session.state())
        };

        assert_eq!(result, Ok(RunOutcome::Cancelled { frames_sent: 2 }));
        assert_eq!(state, SessionState::Idle);
        assert_eq!(transport.frames.len(), 2);
        assert!(transport.frames[0].starts_with("A005E090H"));
        assert!(transport.frames[1].starts_with("A270E000H"));
        assert!(transport.frames.iter().all(|f| f.len() == 17 && f.ends_with("I7")));
        assert_eq!(input.rejected.len(), 2);
        assert!(input.rejected.iter().all(|e| e.is_recoverable()));
        assert_eq!(input.sent.len(), 2);
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_manual_override_cancelled_while_waiting() {
        let config = test_config();
        let provider = StubProvider::fixed(180., 45.);
        let mut transport = RecordingTransport::new();
        let mut input = ScriptedInput::hanging(vec![ManualEntry::new("100", "20")]);
        let cancel = CancelSignal::new();
        let remote = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            remote.cancel();
        });

        let result = {
            let mut session = TrackingSession::new(&config, &provider, &mut transport)
                .with_operator_input(&mut input);
            tokio::time::timeout(
                Duration::from_secs(5),
                session.run(RunMode::ManualOverride { site: 3 }, &cancel),
            )
            .await
            .unwrap()
        };

        assert_eq!(result, Ok(RunOutcome::Cancelled { frames_sent: 1 }));
        assert_eq!(transport.frames.len(), 1);
    }

    #[tokio::test]
    async fn test_manual_override_requires_input() {
        let config = test_config();
        let provider = StubProvider::fixed(180., 45.);
        let mut transport = RecordingTransport::new();

        let (result, state) = run_with(
            &config,
            &provider,
            &mut transport,
            RunMode::ManualOverride { site: 1 },
            &CancelSignal::new(),
        )
        .await;

        assert!(matches!(result, Err(TrackerError::Configuration(_))));
        assert_eq!(state, SessionState::Idle);
    }

    #[tokio::test]
    async fn test_session_is_reusable() {
        let config = test_config();
        let provider = StubProvider::fixed(180., 45.);
        let mut transport = RecordingTransport::new();
        let mode = RunMode::RetrogradeSimulation {
            site: 5,
            body: Body::Saturn,
            start: date(2025, 1, 1),
            end: date(2025, 1, 3),
        };

        let mut session = TrackingSession::new(&config, &provider, &mut transport);
        let cancel = CancelSignal::new();
        let first = session.run(mode.clone(), &cancel).await.unwrap();
        let second = session.run(mode, &cancel).await.unwrap();
        assert_eq!(first.frames_sent() + second.frames_sent(), 6);
        assert_eq!(session.state(), SessionState::Idle);
    }
}
