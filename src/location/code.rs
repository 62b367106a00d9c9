use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::access::ScopeError;

pub const SEPARATOR: char = '-';

/// Hierarchy level, one per dash-delimited segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Level {
    Country = 1,
    State = 2,
    Region = 3,
    Group = 4,
    Location = 5,
    Serial = 6,
}

impl Level {
    pub const ALL: [Level; 6] = [
        Level::Country,
        Level::State,
        Level::Region,
        Level::Group,
        Level::Location,
        Level::Serial,
    ];

    /// Number of segments a code at this level carries.
    pub fn depth(self) -> usize {
        self as usize
    }

    pub fn from_depth(depth: usize) -> Option<Level> {
        Level::ALL.get(depth.checked_sub(1)?).copied()
    }

    pub fn child(self) -> Option<Level> {
        Level::from_depth(self.depth() + 1)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Country => "country",
            Level::State => "state",
            Level::Region => "region",
            Level::Group => "group",
            Level::Location => "location",
            Level::Serial => "serial",
        }
    }

    /// Whether `segment` is well-formed for this level.
    pub fn accepts(self, segment: &str) -> bool {
        if segment.is_empty() {
            return false;
        }
        match self {
            Level::Serial => segment.chars().all(|c| c.is_ascii_digit()),
            _ => segment.chars().all(|c| c.is_ascii_alphanumeric()),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .iter()
            .copied()
            .find(|l| l.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ScopeError::NotFound(format!("level '{}'", s)))
    }
}

/// Composite location identifier `COUNTRY-STATE-REGION-GROUP-LOCATION[-SERIAL]`.
///
/// Stored upper-cased; the segment count is the node's depth.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocationCode(String);

impl LocationCode {
    pub fn parse(raw: &str) -> Result<Self, ScopeError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ScopeError::invalid_code(raw, "empty code"));
        }

        let segments: Vec<&str> = trimmed.split(SEPARATOR).collect();
        if segments.len() > Level::Serial.depth() {
            return Err(ScopeError::invalid_code(
                raw,
                format!("{} segments, at most {} allowed", segments.len(), Level::Serial.depth()),
            ));
        }

        for (i, segment) in segments.iter().enumerate() {
            // i < 6 was checked above
            let level = Level::ALL[i];
            if !level.accepts(segment) {
                return Err(ScopeError::invalid_code(
                    raw,
                    format!("malformed {} segment '{}'", level, segment),
                ));
            }
        }

        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR)
    }

    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    pub fn level(&self) -> Level {
        // parse() guarantees 1..=6 segments
        Level::from_depth(self.depth()).unwrap_or(Level::Serial)
    }

    /// First `depth` segments, or `InvalidLocationCode` when the code is shorter.
    pub fn truncate(&self, depth: usize) -> Result<LocationCode, ScopeError> {
        if depth == 0 || depth > self.depth() {
            return Err(ScopeError::invalid_code(
                self.as_str(),
                format!("needs at least {} segments, has {}", depth.max(1), self.depth()),
            ));
        }
        let prefix: Vec<&str> = self.segments().take(depth).collect();
        Ok(Self(prefix.join("-")))
    }

    pub fn parent(&self) -> Option<LocationCode> {
        match self.depth() {
            1 => None,
            d => self.truncate(d - 1).ok(),
        }
    }

    pub fn last_segment(&self) -> &str {
        self.0.rsplit(SEPARATOR).next().unwrap_or(&self.0)
    }

    /// `self + "-" + suffix`, validated for the child level.
    pub fn child(&self, suffix: &str) -> Result<LocationCode, ScopeError> {
        LocationCode::parse(&format!("{}{}{}", self.0, SEPARATOR, suffix))
    }

    /// True when `other` equals `self` or lies underneath it.
    pub fn is_ancestor_or_self(&self, other: &LocationCode) -> bool {
        other.0 == self.0
            || (other.0.len() > self.0.len()
                && other.0.starts_with(&self.0)
                && other.0[self.0.len()..].starts_with(SEPARATOR))
    }
}

impl fmt::Display for LocationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LocationCode {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LocationCode::parse(s)
    }
}

impl TryFrom<String> for LocationCode {
    type Error = ScopeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        LocationCode::parse(&value)
    }
}

impl From<LocationCode> for String {
    fn from(code: LocationCode) -> Self {
        code.0
    }
}

impl AsRef<str> for LocationCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
