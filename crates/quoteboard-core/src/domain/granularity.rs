use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Intraday sampling granularity supported by the upstream series endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Granularity {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "60m")]
    SixtyMinutes,
}

impl Granularity {
    /// Ascending bucket order; `from_minutes` walks it front to back.
    pub const ALL: [Self; 5] = [
        Self::OneMinute,
        Self::FiveMinutes,
        Self::FifteenMinutes,
        Self::ThirtyMinutes,
        Self::SixtyMinutes,
    ];

    /// Map a requested chart interval onto the smallest bucket that is not finer
    /// than the request. Anything above 30 minutes lands in the hourly bucket.
    pub fn from_minutes(minutes: u32) -> Self {
        Self::ALL
            .into_iter()
            .find(|bucket| minutes <= bucket.minutes())
            .unwrap_or(Self::SixtyMinutes)
    }

    pub const fn minutes(self) -> u32 {
        match self {
            Self::OneMinute => 1,
            Self::FiveMinutes => 5,
            Self::FifteenMinutes => 15,
            Self::ThirtyMinutes => 30,
            Self::SixtyMinutes => 60,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneMinute => "1m",
            Self::FiveMinutes => "5m",
            Self::FifteenMinutes => "15m",
            Self::ThirtyMinutes => "30m",
            Self::SixtyMinutes => "60m",
        }
    }
}

impl Display for Granularity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_requested_minutes_to_buckets() {
        let mapped = [1, 3, 10, 25, 45]
            .into_iter()
            .map(|minutes| Granularity::from_minutes(minutes).minutes())
            .collect::<Vec<_>>();
        assert_eq!(mapped, vec![1, 5, 15, 30, 60]);
    }

    #[test]
    fn boundaries_resolve_to_the_smaller_bucket() {
        assert_eq!(Granularity::from_minutes(5), Granularity::FiveMinutes);
        assert_eq!(Granularity::from_minutes(15), Granularity::FifteenMinutes);
        assert_eq!(Granularity::from_minutes(30), Granularity::ThirtyMinutes);
        assert_eq!(Granularity::from_minutes(31), Granularity::SixtyMinutes);
        assert_eq!(Granularity::from_minutes(600), Granularity::SixtyMinutes);
    }

    #[test]
    fn mapping_is_never_finer_than_requested() {
        for minutes in 1..=120 {
            let bucket = Granularity::from_minutes(minutes);
            assert!(bucket.minutes() >= minutes.min(60), "minutes={minutes}");
        }
    }
}
