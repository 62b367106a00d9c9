use serde::{Deserialize, Serialize};

use crate::access::{RoleScore, ScopeError};
use crate::location::{Level, LocationCode};

/// One row of the depth table: callers scoring at least `threshold` see
/// `segments` leading segments of their own code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthRule {
    pub threshold: u8,
    pub segments: usize,
}

/// Ordered `(threshold, segments)` table, highest threshold first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeTable {
    rules: Vec<DepthRule>,
}

impl ScopeTable {
    pub fn new(mut rules: Vec<DepthRule>) -> Result<Self, ScopeError> {
        if rules.is_empty() {
            return Err(ScopeError::InvalidScopeTable("table is empty".into()));
        }
        rules.sort_by(|a, b| b.threshold.cmp(&a.threshold));

        let max_depth = Level::Serial.depth();
        for rule in &rules {
            if rule.segments == 0 || rule.segments > max_depth {
                return Err(ScopeError::InvalidScopeTable(format!(
                    "threshold {} maps to {} segments, expected 1..={}",
                    rule.threshold, rule.segments, max_depth
                )));
            }
        }
        for pair in rules.windows(2) {
            let (higher, lower) = (pair[0], pair[1]);
            if higher.threshold == lower.threshold {
                return Err(ScopeError::InvalidScopeTable(format!(
                    "threshold {} listed twice",
                    higher.threshold
                )));
            }
            // higher score must never see a narrower scope
            if higher.segments > lower.segments {
                return Err(ScopeError::InvalidScopeTable(format!(
                    "threshold {} ({} segments) is narrower than threshold {} ({} segments)",
                    higher.threshold, higher.segments, lower.threshold, lower.segments
                )));
            }
        }
        Ok(Self { rules })
    }

    /// Parse `threshold:segments` pairs separated by commas, e.g. `7:1,4:4,1:5`.
    pub fn parse_rules(text: &str) -> Result<Self, ScopeError> {
        let mut rules = Vec::new();
        for pair in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (threshold, segments) = pair
                .split_once(':')
                .ok_or_else(|| ScopeError::InvalidScopeTable(format!("expected threshold:segments, got '{}'", pair)))?;
            let threshold = threshold
                .trim()
                .parse::<u8>()
                .map_err(|e| ScopeError::InvalidScopeTable(format!("threshold '{}': {}", threshold, e)))?;
            let segments = segments
                .trim()
                .parse::<usize>()
                .map_err(|e| ScopeError::InvalidScopeTable(format!("segments '{}': {}", segments, e)))?;
            rules.push(DepthRule { threshold, segments });
        }
        Self::new(rules)
    }

    pub fn rules(&self) -> &[DepthRule] {
        &self.rules
    }

    /// Segment count visible to `score`.
    pub fn depth_for(&self, score: RoleScore) -> Result<usize, ScopeError> {
        self.rules
            .iter()
            .find(|rule| score.value() >= rule.threshold)
            .map(|rule| rule.segments)
            .ok_or_else(|| ScopeError::NotFound(format!("no scope defined for score {}", score)))
    }

    pub fn resolve(&self, score: RoleScore, location: &LocationCode) -> Result<ScopePrefix, ScopeError> {
        let depth = self.depth_for(score)?;
        let code = location.truncate(depth)?;
        Ok(ScopePrefix { code })
    }
}

impl Default for ScopeTable {
    fn default() -> Self {
        Self {
            rules: vec![
                DepthRule { threshold: 7, segments: 1 },
                DepthRule { threshold: 6, segments: 2 },
                DepthRule { threshold: 5, segments: 3 },
                DepthRule { threshold: 4, segments: 4 },
                DepthRule { threshold: 1, segments: 5 },
            ],
        }
    }
}

/// Resolve against the default table, parsing the raw code first.
pub fn resolve_scope(score: RoleScore, location_code: &str) -> Result<ScopePrefix, ScopeError> {
    let location = LocationCode::parse(location_code)?;
    ScopeTable::default().resolve(score, &location)
}

/// Leading part of a location code bounding what a caller may see.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ScopePrefix {
    code: LocationCode,
}

impl ScopePrefix {
    pub fn code(&self) -> &LocationCode {
        &self.code
    }

    pub fn as_str(&self) -> &str {
        self.code.as_str()
    }

    pub fn depth(&self) -> usize {
        self.code.depth()
    }

    /// Case-insensitive, segment-aligned starts-with over a raw code.
    pub fn contains(&self, raw_code: &str) -> bool {
        let prefix = self.code.as_str();
        let candidate = raw_code.trim();
        if candidate.len() < prefix.len() || !candidate.is_char_boundary(prefix.len()) {
            return false;
        }
        let (head, rest) = candidate.split_at(prefix.len());
        head.eq_ignore_ascii_case(prefix) && (rest.is_empty() || rest.starts_with('-'))
    }

    pub fn contains_code(&self, code: &LocationCode) -> bool {
        self.code.is_ancestor_or_self(code)
    }

    /// `ILIKE` pattern for strict descendants; pair it with an equality test on
    /// `as_str()` to include the scope node itself.
    pub fn like_pattern(&self) -> String {
        let mut pattern = escape_like(self.code.as_str());
        pattern.push_str("-%");
        pattern
    }
}

impl std::fmt::Display for ScopePrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.code.fmt(f)
    }
}

/// Escape `%`, `_` and `\` so `raw` matches literally inside a `LIKE`
/// pattern using the default backslash escape.
pub fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len() + 2);
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
