use crate::util::*;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Where a session gets "now" from
pub trait ClockSource: Send {
    fn now(&self) -> DateTime<Tz>;

    /// Moves to the next tick. Live clocks follow the system time and have nothing to do.
    fn tick(&mut self) -> TrackerResult<()> {
        Ok(())
    }

    /// A live clock never runs out
    fn is_finished(&self) -> bool {
        false
    }
}

#[derive(Debug, Copy, Clone)]
pub struct LiveClock {
    timezone: Tz,
}

impl LiveClock {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }
}

impl ClockSource for LiveClock {
    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.timezone)
    }
}

/// Resolves a wall-clock time at a site. Times skipped by a DST jump are an error,
/// repeated times resolve to their first occurrence.
pub fn localize(timezone: Tz, date: NaiveDate, time: NaiveTime) -> TrackerResult<DateTime<Tz>> {
    timezone
        .from_local_datetime(&date.and_time(time))
        .earliest()
        .ok_or_else(|| {
            TrackerError::configuration(format_args!(
                "{} {} does not exist in {}",
                date, time, timezone
            ))
        })
}

/// A cursor stepping through a fixed range of instants, inclusive at both ends
#[derive(Debug, Clone)]
pub struct SimulatedClock {
    cursor: DateTime<Tz>,
    end: DateTime<Tz>,
    step: Duration,
}

impl SimulatedClock {
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>, step: Duration) -> TrackerResult<Self> {
        if step <= Duration::zero() {
            return Err(TrackerError::configuration(format_args!(
                "Simulation step of {} must be positive",
                step
            )));
        }
        if end < start {
            return Err(TrackerError::configuration(format_args!(
                "Simulation ends at {} before it starts at {}",
                end, start
            )));
        }
        Ok(Self {
            cursor: start,
            end,
            step,
        })
    }

    /// Steps through one local day at a site, from `start` to `end` wall-clock time
    pub fn day(
        timezone: Tz,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        step: Duration,
    ) -> TrackerResult<Self> {
        Self::new(
            localize(timezone, date, start)?,
            localize(timezone, date, end)?,
            step,
        )
    }

    /// Steps across whole days at a fixed UTC time of day
    pub fn days(
        start: NaiveDate,
        end: NaiveDate,
        at: NaiveTime,
        step: Duration,
    ) -> TrackerResult<Self> {
        let utc = Tz::UTC;
        Self::new(
            localize(utc, start, at)?,
            localize(utc, end, at)?,
            step,
        )
    }

    pub fn advance(&mut self, by: Duration) -> TrackerResult<()> {
        if by < Duration::zero() {
            return Err(TrackerError::configuration(format_args!(
                "Cannot move a simulated clock backwards by {}",
                by
            )));
        }
        self.cursor = self.cursor.checked_add_signed(by).ok_or_else(|| {
            TrackerError::configuration(format_args!("{} + {} is out of range", self.cursor, by))
        })?;
        Ok(())
    }

    /// How many instants the clock yields in total, counting from the current cursor
    #[cfg(test)]
    pub fn remaining_ticks(&self) -> u64 {
        if self.is_finished() {
            return 0;
        }
        let span = self.end.signed_duration_since(self.cursor);
        match (span.num_nanoseconds(), self.step.num_nanoseconds()) {
            (Some(span), Some(step)) => (span / step) as u64 + 1,
            _ => (span.num_seconds() / self.step.num_seconds().max(1)) as u64 + 1,
        }
    }
}

impl ClockSource for SimulatedClock {
    fn now(&self) -> DateTime<Tz> {
        self.cursor
    }

    /// Advances by the configured step
    fn tick(&mut self) -> TrackerResult<()> {
        self.advance(self.step)
    }

    fn is_finished(&self) -> bool {
        self.cursor > self.end
    }
}
