use crate::access::{RoleScore, ScopeError};
use crate::location::Level;

/// Lowest score allowed to create a node at `level`. Countries are seeded,
/// never created through the API. The parent must also be inside the
/// caller's scope, which is checked separately.
pub fn min_score_to_create(level: Level) -> Option<RoleScore> {
    match level {
        Level::Country => None,
        Level::State => Some(RoleScore(6)),
        Level::Region => Some(RoleScore(5)),
        Level::Group => Some(RoleScore(3)),
        Level::Location => Some(RoleScore(5)),
        Level::Serial => Some(RoleScore(2)),
    }
}

/// Lowest score allowed to post a bulletin.
pub const MIN_SCORE_TO_PUBLISH: RoleScore = RoleScore(2);

pub fn ensure_can_publish(score: RoleScore) -> Result<(), ScopeError> {
    if score >= MIN_SCORE_TO_PUBLISH {
        Ok(())
    } else {
        Err(ScopeError::InsufficientScore {
            score: score.value(),
            required: MIN_SCORE_TO_PUBLISH.value(),
        })
    }
}

pub fn ensure_can_create(score: RoleScore, level: Level) -> Result<(), ScopeError> {
    match min_score_to_create(level) {
        Some(min) if score >= min => Ok(()),
        Some(min) => Err(ScopeError::InsufficientScore {
            score: score.value(),
            required: min.value(),
        }),
        None => Err(ScopeError::NotFound(format!("{} nodes cannot be created", level))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_per_level() {
        assert!(ensure_can_create(RoleScore(3), Level::Group).is_ok());
        assert!(ensure_can_create(RoleScore(2), Level::Group).is_err());
        assert!(ensure_can_create(RoleScore(4), Level::Location).is_err());
        assert!(ensure_can_create(RoleScore(2), Level::Serial).is_ok());
        assert!(ensure_can_create(RoleScore(8), Level::Country).is_err());
        assert!(ensure_can_create(RoleScore(5), Level::State).is_err());
        assert!(ensure_can_create(RoleScore(6), Level::State).is_ok());
        assert_eq!(
            ensure_can_create(RoleScore(4), Level::Region),
            Err(ScopeError::InsufficientScore { score: 4, required: 5 })
        );
        assert!(ensure_can_publish(RoleScore(1)).is_err());
        assert!(ensure_can_publish(RoleScore(2)).is_ok());
    }
}
