//! ASCII command frames understood by the servo controller:
//! `A{azimuth:03}E{elevation:03}H{HHMMSS}I{source id}`, sent without a terminator.

use crate::tracker::angle_mapper::ServoTarget;
use crate::util::*;
use chrono::Timelike;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Largest value a three digit angle field can carry
pub const MAX_FIELD_VALUE: u16 = 999;

const ANGLE_DIGITS: usize = 3;
const TIME_DIGITS: usize = 6;
// A + 3 digits + E + 3 digits + H + 6 digits + I
const PREFIX_LEN: usize = 1 + ANGLE_DIGITS + 1 + ANGLE_DIGITS + 1 + TIME_DIGITS + 1;

/// Wall-clock time at second resolution, as it appears on the wire
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
    second: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8, second: u8) -> TrackerResult<Self> {
        if hour > 23 || minute > 59 || second > 59 {
            return Err(TrackerError::frame(format_args!(
                "{:02}:{:02}:{:02} is not a time of day",
                hour, minute, second
            )));
        }
        Ok(Self {
            hour,
            minute,
            second,
        })
    }

    /// Truncates sub-second precision
    pub fn of<T: Timelike>(time: &T) -> Self {
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
            // chrono reports a leap second as second 59 with an overflowing nanosecond field
            second: time.second().min(59) as u8,
        }
    }

    #[cfg(test)]
    pub fn hour(&self) -> u8 {
        self.hour
    }

    #[cfg(test)]
    pub fn minute(&self) -> u8 {
        self.minute
    }

    #[cfg(test)]
    pub fn second(&self) -> u8 {
        self.second
    }

    #[cfg(test)]
    pub fn seconds_of_day(&self) -> u32 {
        self.hour as u32 * 3600 + self.minute as u32 * 60 + self.second as u32
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}{:02}{:02}", self.hour, self.minute, self.second)
    }
}

impl FromStr for TimeOfDay {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != TIME_DIGITS || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TrackerError::frame(format_args!(
                "Time field {:?} must be exactly {} digits",
                s, TIME_DIGITS
            )));
        }
        let field = |i: usize| s[i..i + 2].parse::<u8>().map_err(TrackerError::frame);
        Self::new(field(0)?, field(2)?, field(4)?)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Frame {
    azimuth: u16,
    elevation: u16,
    time: TimeOfDay,
    source_id: u16,
}

impl Frame {
    pub fn new(azimuth: u16, elevation: u16, time: TimeOfDay, source_id: u16) -> TrackerResult<Self> {
        check_field("Azimuth", azimuth)?;
        check_field("Elevation", elevation)?;
        Ok(Self {
            azimuth,
            elevation,
            time,
            source_id,
        })
    }

    pub fn for_target(target: ServoTarget, time: TimeOfDay, source_id: u16) -> TrackerResult<Self> {
        Self::new(target.azimuth(), target.elevation(), time, source_id)
    }

    pub fn encode(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

// The controller never answers, so only tests read frames back
#[cfg(test)]
impl Frame {
    pub fn azimuth(&self) -> u16 {
        self.azimuth
    }

    pub fn elevation(&self) -> u16 {
        self.elevation
    }

    pub fn time(&self) -> TimeOfDay {
        self.time
    }

    pub fn source_id(&self) -> u16 {
        self.source_id
    }

    pub fn decode(bytes: &[u8]) -> TrackerResult<Self> {
        let text = std::str::from_utf8(bytes).map_err(TrackerError::frame)?;
        text.parse()
    }
}

fn check_field(name: &str, value: u16) -> TrackerResult<()> {
    if value > MAX_FIELD_VALUE {
        Err(TrackerError::frame(format_args!(
            "{} {} does not fit in {} digits",
            name, value, ANGLE_DIGITS
        )))
    } else {
        Ok(())
    }
}

impl Display for Frame {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "A{:03}E{:03}H{}I{}",
            self.azimuth, self.elevation, self.time, self.source_id
        )
    }
}

impl FromStr for Frame {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() <= PREFIX_LEN || !s.is_ascii() {
            return Err(TrackerError::frame(format_args!("Malformed frame {:?}", s)));
        }

        let expect_marker = move |offset: usize, marker: u8| {
            if bytes[offset] == marker {
                Ok(())
            } else {
                Err(TrackerError::frame(format_args!(
                    "Expected '{}' at offset {} of {:?}",
                    marker as char, offset, s
                )))
            }
        };
        let digits = move |from: usize, to: usize| -> TrackerResult<&str> {
            let field = &s[from..to];
            if field.bytes().all(|b| b.is_ascii_digit()) {
                Ok(field)
            } else {
                Err(TrackerError::frame(format_args!(
                    "Field {:?} of {:?} is not numeric",
                    field, s
                )))
            }
        };

        let el_marker = 1 + ANGLE_DIGITS;
        let time_marker = el_marker + 1 + ANGLE_DIGITS;
        let id_marker = time_marker + 1 + TIME_DIGITS;
        expect_marker(0, b'A')?;
        expect_marker(el_marker, b'E')?;
        expect_marker(time_marker, b'H')?;
        expect_marker(id_marker, b'I')?;

        let azimuth: u16 = digits(1, el_marker)?.parse().map_err(TrackerError::frame)?;
        let elevation: u16 = digits(el_marker + 1, time_marker)?
            .parse()
            .map_err(TrackerError::frame)?;
        let time: TimeOfDay = digits(time_marker + 1, id_marker)?.parse()?;

        let id_text = digits(PREFIX_LEN, s.len())?;
        if id_text.len() > 1 && id_text.starts_with('0') {
            return Err(TrackerError::frame(format_args!(
                "Source id {:?} has leading zeros",
                id_text
            )));
        }
        let source_id: u16 = id_text.parse().map_err(TrackerError::frame)?;

        Frame::new(azimuth, elevation, time, source_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use rand::Rng;

    fn time(h: u8, m: u8, s: u8) -> TimeOfDay {
        TimeOfDay::new(h, m, s).unwrap()
    }

    #[test]
    fn test_encode_zero_pads() {
        let frame = Frame::new(5, 90, time(14, 30, 0), 1).unwrap();
        assert_eq!(frame.encode(), b"A005E090H143000I1");
        let frame = Frame::new(270, 0, time(0, 0, 9), 7).unwrap();
        assert_eq!(frame.to_string(), "A270E000H000009I7");
    }

    #[test]
    fn test_encode_rejects_wide_fields() {
        assert!(matches!(
            Frame::new(1000, 0, time(0, 0, 0), 1),
            Err(TrackerError::Frame(_))
        ));
        assert!(Frame::new(0, 1000, time(0, 0, 0), 1).is_err());
        assert!(Frame::new(999, 999, time(23, 59, 59), 65535).is_ok());
    }

    #[test]
    fn test_decode() {
        let frame = Frame::decode(b"A135E045H061000I3").unwrap();
        assert_eq!(frame.azimuth(), 135);
        assert_eq!(frame.elevation(), 45);
        assert_eq!(frame.time(), time(6, 10, 0));
        assert_eq!(frame.source_id(), 3);

        let wide_id = Frame::decode(b"A000E000H235959I65535").unwrap();
        assert_eq!(wide_id.source_id(), 65535);
    }

    #[test]
    fn test_decode_inverts_encode() {
        let mut rng = rand::thread_rng();
        for _ in 0..500 {
            let frame = Frame::new(
                rng.gen_range(0..=MAX_FIELD_VALUE),
                rng.gen_range(0..=MAX_FIELD_VALUE),
                time(rng.gen_range(0..24), rng.gen_range(0..60), rng.gen_range(0..60)),
                rng.gen(),
            )
            .unwrap();
            assert_eq!(Frame::decode(&frame.encode()).unwrap(), frame);
        }
    }

    #[test]
    fn test_decode_rejects_malformed() {
        for bad in [
            "",
            "A005E090H143000I",
            "A005E090H143000",
            "B005E090H143000I1",
            "A05E090H143000I12",
            "A005X090H143000I1",
            "A005E090H14300I11",
            "A005E090H246000I1",
            "A005E090H143000I01",
            "A005E090H143000I1x",
            "A0x5E090H143000I1",
            "A005E090H143000I99999",
        ] {
            assert!(bad.parse::<Frame>().is_err(), "{:?} should not decode", bad);
        }
        assert!(Frame::decode(&[b'A', 0xff, 0xfe]).is_err());
    }

    #[test]
    fn test_time_of_day() {
        let t = NaiveTime::from_hms_milli_opt(9, 5, 7, 999).unwrap();
        assert_eq!(TimeOfDay::of(&t).to_string(), "090507");
        assert!(TimeOfDay::new(24, 0, 0).is_err());
        assert!(TimeOfDay::new(0, 60, 0).is_err());
        assert_eq!("235959".parse::<TimeOfDay>().unwrap(), time(23, 59, 59));
        assert!("12345".parse::<TimeOfDay>().is_err());
    }
}
