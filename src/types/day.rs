use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DataError;

/// One day of the journey, counted from 1.
///
/// Days travel as text ("1".."70") in JSON, URL paths and map keys, so the
/// serde impls write a string and accept either a string or a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DayId(u16);

impl DayId {
    pub const FIRST: DayId = DayId(1);

    pub fn new(n: u16) -> Option<Self> {
        (n >= 1).then_some(Self(n))
    }

    pub fn get(self) -> u16 {
        self.0
    }

    pub fn prev(self) -> Option<Self> {
        Self::new(self.0 - 1)
    }

    pub fn is_first(self) -> bool {
        self.0 == 1
    }

    /// Parses a day and checks it against the length of the journey.
    pub fn parse_within(s: &str, total_days: u16) -> Result<Self, DataError> {
        let day: DayId = s.parse()?;
        if day.0 > total_days {
            return Err(DataError::DayOutOfRange {
                day: day.0,
                total: total_days,
            });
        }
        Ok(day)
    }

    /// Every day of a journey of `total_days`, in order.
    pub fn all(total_days: u16) -> impl Iterator<Item = DayId> {
        (1..=total_days).map(DayId)
    }
}

impl FromStr for DayId {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u16>()
            .ok()
            .and_then(DayId::new)
            .ok_or_else(|| DataError::InvalidDay(s.to_string()))
    }
}

impl fmt::Display for DayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for DayId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DayId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DayIdVisitor)
    }
}

struct DayIdVisitor;

impl<'de> Visitor<'de> for DayIdVisitor {
    type Value = DayId;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a day number >= 1, as a string or an integer")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<DayId, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<DayId, E> {
        u16::try_from(v)
            .ok()
            .and_then(DayId::new)
            .ok_or_else(|| E::custom(format!("invalid day: {v}")))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<DayId, E> {
        u64::try_from(v)
            .map_err(|_| E::custom(format!("invalid day: {v}")))
            .and_then(|v| self.visit_u64(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<DayId, E> {
        if v.fract() != 0.0 || v < 1.0 {
            return Err(E::custom(format!("invalid day: {v}")));
        }
        self.visit_u64(v as u64)
    }
}
