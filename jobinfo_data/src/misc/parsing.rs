pub mod duration {
    use std::num::ParseIntError;

    use thiserror::Error;

    /// A duration as printed by `sacct`/`sstat`: `[[days-]hours:]minutes:seconds[.fraction]`.
    ///
    /// The components are kept as they were read so the renderer can lay out the day column.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SlurmDuration {
        pub days: u64,
        pub hours: u64,
        pub minutes: u64,
        pub seconds: u64,
        pub millis: u64,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    pub enum DurationParseError {
        #[error("trying to parse an empty string")]
        Empty,
        #[error("expected `[[days-]hours:]minutes:seconds[.fraction]`, got `{0}`")]
        Shape(String),
        #[error("component is not an unsigned integer")]
        InvalidInt(#[from] ParseIntError),
    }

    impl SlurmDuration {
        pub const ZERO: Self = Self {
            days: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
            millis: 0,
        };

        /// Normalizing constructor, e.g. `from_millis(90_000)` is `00:01:30`.
        pub fn from_millis(total: u64) -> Self {
            let millis = total % 1000;
            let secs = total / 1000;
            Self {
                days: secs / 86_400,
                hours: secs % 86_400 / 3600,
                minutes: secs % 3600 / 60,
                seconds: secs % 60,
                millis,
            }
        }

        pub fn total_millis(&self) -> u64 {
            let secs = self
                .days
                .saturating_mul(86_400)
                .saturating_add(self.hours.saturating_mul(3600))
                .saturating_add(self.minutes.saturating_mul(60))
                .saturating_add(self.seconds);
            secs.saturating_mul(1000).saturating_add(self.millis)
        }

        pub fn is_zero(&self) -> bool {
            self.total_millis() == 0
        }

        pub fn try_parse(input: &str) -> Result<Self, DurationParseError> {
            use DurationParseError::*;
            let input = input.trim();
            if input.is_empty() {
                return Err(Empty);
            }

            let (clock, fraction) = match input.split_once('.') {
                Some((clock, fraction)) => (clock, Some(fraction)),
                None => (input, None),
            };
            let (days, clock) = match clock.split_once('-') {
                Some((days, clock)) => (Some(days.parse::<u64>()?), clock),
                None => (None, clock),
            };

            let parts = clock.split(':').map(str::parse::<u64>).collect::<Result<Vec<_>, _>>()?;
            let (hours, minutes, seconds) = match (days, parts.as_slice()) {
                (_, &[h, m, s]) => (h, m, s),
                (None, &[m, s]) => (0, m, s),
                _ => return Err(Shape(input.to_owned())),
            };

            Ok(Self {
                days: days.unwrap_or(0),
                hours,
                minutes,
                seconds,
                millis: fraction.map(parse_fraction).transpose()?.unwrap_or(0),
            })
        }

        /// Never fails, malformed input is the zero duration.
        pub fn parse(input: &str) -> Self {
            Self::try_parse(input).unwrap_or_default()
        }
    }

    /// `.5` is 500ms, `.123456` is 123ms
    fn parse_fraction(fraction: &str) -> Result<u64, DurationParseError> {
        let digits: String = fraction.chars().chain(std::iter::repeat('0')).take(3).collect();
        Ok(digits.parse::<u64>()?)
    }
}

pub mod size {
    use derive_more::derive::{Deref, From, Into};

    /// Token printed in place of a size that could not be measured.
    pub const UNKNOWN_SIZE: &str = "Unknown";

    const SUFFIXES: [char; 7] = [' ', 'K', 'M', 'G', 'T', 'P', 'E'];

    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deref, From, Into)]
    pub struct ByteSize(pub u64);

    impl ByteSize {
        pub fn as_bytes(&self) -> u64 {
            self.0
        }

        /// Decimal number with an optional power-of-1024 suffix (`K` … `E`).
        ///
        /// An unrecognized suffix counts as bytes, anything else unparseable is zero.
        pub fn parse(input: &str) -> Self {
            let input = input.trim();
            if input.is_empty() || input == UNKNOWN_SIZE {
                return Self(0);
            }

            let (number, scale) = match input.char_indices().last() {
                Some((i, c)) if c.is_ascii_alphabetic() => (&input[..i], Self::scale_of(c)),
                _ => (input, 1),
            };

            match number.parse::<f64>() {
                // `as` saturates, which is what we want for absurd values
                Ok(n) if n.is_finite() && n >= 0f64 => Self((n * scale as f64) as u64),
                _ => Self(0),
            }
        }

        fn scale_of(suffix: char) -> u64 {
            SUFFIXES
                .iter()
                .skip(1)
                .position(|&s| s == suffix.to_ascii_uppercase())
                .map(|exp| 1024u64.pow(exp as u32 + 1))
                .unwrap_or(1)
        }

        /// Largest whole unit not above the value, two decimals: `1.00G`, `512.00K`, `0.00 `.
        pub fn to_human(&self) -> String {
            let exp = (1..SUFFIXES.len())
                .take_while(|&exp| self.0 >= 1024u64.pow(exp as u32))
                .last()
                .unwrap_or(0);
            let value = self.0 as f64 / 1024f64.powi(exp as i32);
            format!("{value:.2}{}", SUFFIXES[exp])
        }
    }
}

pub mod date {
    use chrono::NaiveDateTime;
    use derive_more::derive::{Deref, Display};

    /// Sorts after every real timestamp, so `min` over start times skips rows without one.
    pub const UNSET_TIMESTAMP: &str = "9999-01-01T00:00:00";

    const SLURM_FMT: &str = "%Y-%m-%dT%H:%M:%S";

    /// `YYYY-MM-DDTHH:MM:SS`, compared as text (fixed width).
    #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deref, Display)]
    pub struct Timestamp(String);

    impl Default for Timestamp {
        fn default() -> Self {
            Self(UNSET_TIMESTAMP.to_owned())
        }
    }

    impl Timestamp {
        pub fn parse(input: &str) -> Self {
            match input.trim() {
                "" | "Unknown" | "None" => Self::default(),
                text => Self(text.to_owned()),
            }
        }

        pub fn is_unset(&self) -> bool {
            self.0 == UNSET_TIMESTAMP
        }

        pub fn to_datetime(&self) -> Option<NaiveDateTime> {
            NaiveDateTime::parse_from_str(&self.0, SLURM_FMT).ok()
        }
    }
}

pub use date::Timestamp;
pub use duration::SlurmDuration;
pub use size::ByteSize;

#[allow(non_snake_case)]
#[cfg(test)]
mod test {
    use super::*;

    fn hms(hours: u64, minutes: u64, seconds: u64) -> SlurmDuration {
        SlurmDuration {
            hours,
            minutes,
            seconds,
            ..SlurmDuration::ZERO
        }
    }

    #[test]
    fn SlurmDuration__parse__all_shapes() {
        assert_eq!(SlurmDuration::parse("03:04"), hms(0, 3, 4));
        assert_eq!(SlurmDuration::parse("02:03:04"), hms(2, 3, 4));
        assert_eq!(
            SlurmDuration::parse("1-02:03:04"),
            SlurmDuration {
                days: 1,
                ..hms(2, 3, 4)
            }
        );
        assert_eq!(
            SlurmDuration::parse("00:01.234"),
            SlurmDuration {
                millis: 234,
                ..hms(0, 0, 1)
            }
        );
        assert_eq!(SlurmDuration::parse("00:00.5").millis, 500);
    }

    #[test]
    fn SlurmDuration__parse__malformed_is_zero() {
        for input in ["", "INVALID", "UNLIMITED", "12", "1-03:04", "a:b", "1:2:3:4"] {
            assert_eq!(SlurmDuration::parse(input), SlurmDuration::ZERO, "{input}");
        }
        assert!(SlurmDuration::try_parse("").is_err());
        assert!(SlurmDuration::try_parse("1-03:04").is_err());
    }

    #[test]
    fn SlurmDuration__total__round_trips_through_from_millis() {
        let dur = SlurmDuration::parse("2-10:17:36.250");
        assert_eq!(dur.total_millis(), ((2 * 86_400 + 10 * 3600 + 17 * 60 + 36) * 1000) + 250);
        assert_eq!(SlurmDuration::from_millis(dur.total_millis()), dur);
        assert!(SlurmDuration::parse("00:00:00").is_zero());
    }

    #[test]
    fn ByteSize__parse__suffixes() {
        assert_eq!(ByteSize::parse("10").as_bytes(), 10);
        assert_eq!(ByteSize::parse("10K").as_bytes(), 10 * 1024);
        assert_eq!(ByteSize::parse("1.5M").as_bytes(), 3 * 512 * 1024);
        assert_eq!(ByteSize::parse("2G").as_bytes(), 2 << 30);
        assert_eq!(ByteSize::parse("1T").as_bytes(), 1 << 40);
        assert_eq!(ByteSize::parse("1P").as_bytes(), 1 << 50);
        assert_eq!(ByteSize::parse("1E").as_bytes(), 1 << 60);
    }

    #[test]
    fn ByteSize__parse__fallbacks() {
        assert_eq!(ByteSize::parse(""), ByteSize(0));
        assert_eq!(ByteSize::parse(size::UNKNOWN_SIZE), ByteSize(0));
        assert_eq!(ByteSize::parse("10X"), ByteSize(10));
        assert_eq!(ByteSize::parse("-321"), ByteSize(0));
        assert_eq!(ByteSize::parse("garbage"), ByteSize(0));
    }

    #[test]
    fn ByteSize__to_human() {
        assert_eq!(ByteSize(0).to_human(), "0.00 ");
        assert_eq!(ByteSize(1023).to_human(), "1023.00 ");
        assert_eq!(ByteSize(1 << 30).to_human(), "1.00G");
        assert_eq!(ByteSize(3 << 29).to_human(), "1.50G");
        assert_eq!(ByteSize(u64::MAX).to_human(), "16.00E");
    }

    #[test]
    fn Timestamp__parse__unset_tokens() {
        for input in ["", "Unknown", "None"] {
            let ts = Timestamp::parse(input);
            assert!(ts.is_unset());
            assert_eq!(*ts, date::UNSET_TIMESTAMP);
        }
        let ts = Timestamp::parse("2024-03-01T12:00:00");
        assert!(!ts.is_unset());
        assert!(ts.to_datetime().is_some());
        assert!(ts < Timestamp::default());
    }
}
