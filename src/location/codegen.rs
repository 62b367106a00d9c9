use rand::Rng;

use crate::access::ScopeError;
use crate::location::{Level, LocationCode};

pub const DEFAULT_MAX_ATTEMPTS: usize = 50;
pub const DEFAULT_SERIAL_WIDTH: usize = 3;
const TOKEN_LEN: usize = 3;

/// Allocates child codes beneath a parent node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeGenerator {
    pub max_attempts: usize,
    pub serial_width: usize,
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            serial_width: DEFAULT_SERIAL_WIDTH,
        }
    }
}

impl CodeGenerator {
    pub fn new(max_attempts: usize, serial_width: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            serial_width: serial_width.max(1),
        }
    }

    /// `parent-XYZ` where XYZ is drawn from the seed's alphanumerics (or A-Z
    /// when the seed has fewer than three). `exists` is checked once per attempt.
    pub fn child_code<R, F>(
        &self,
        parent: &LocationCode,
        seed_text: &str,
        mut exists: F,
        rng: &mut R,
    ) -> Result<LocationCode, ScopeError>
    where
        R: Rng + ?Sized,
        F: FnMut(&str) -> bool,
    {
        match parent.level().child() {
            None => {
                return Err(ScopeError::invalid_code(parent.as_str(), "serial codes have no children"));
            }
            Some(Level::Serial) => {
                return Err(ScopeError::invalid_code(
                    parent.as_str(),
                    "children of a location are numbered, not lettered",
                ));
            }
            Some(_) => {}
        }

        let alphabet = token_alphabet(seed_text);
        for _ in 0..self.max_attempts {
            let token: String = (0..TOKEN_LEN)
                .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
                .collect();
            let code = parent.child(&token)?;
            if !exists(code.as_str()) {
                return Ok(code);
            }
        }

        Err(ScopeError::IdGenerationExhausted {
            parent: parent.to_string(),
            attempts: self.max_attempts,
        })
    }

    /// Next zero-padded number after the highest numeric direct child of
    /// `parent` in `existing`. Starts at 1.
    pub fn next_serial<'a, I>(&self, parent: &LocationCode, existing: I) -> Result<LocationCode, ScopeError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        if parent.level() == Level::Serial {
            return Err(ScopeError::invalid_code(parent.as_str(), "serial codes have no children"));
        }

        let highest = existing
            .into_iter()
            .filter_map(|code| serial_suffix(parent, code))
            .max()
            .unwrap_or(0);

        let next = highest
            .checked_add(1)
            .ok_or_else(|| ScopeError::IdGenerationExhausted {
                parent: parent.to_string(),
                attempts: 1,
            })?;

        parent.child(&format!("{:0width$}", next, width = self.serial_width))
    }
}

/// Random child code with the default attempt cap.
pub fn generate_child_code<F>(parent: &LocationCode, seed_text: &str, exists: F) -> Result<LocationCode, ScopeError>
where
    F: FnMut(&str) -> bool,
{
    CodeGenerator::default().child_code(parent, seed_text, exists, &mut rand::thread_rng())
}

/// Sequential child code with the default width.
pub fn next_serial_code<'a, I>(parent: &LocationCode, existing: I) -> Result<LocationCode, ScopeError>
where
    I: IntoIterator<Item = &'a str>,
{
    CodeGenerator::default().next_serial(parent, existing)
}

fn token_alphabet(seed_text: &str) -> Vec<char> {
    let cleaned: Vec<char> = seed_text
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if cleaned.len() >= TOKEN_LEN {
        cleaned
    } else {
        ('A'..='Z').collect()
    }
}

fn serial_suffix(parent: &LocationCode, code: &str) -> Option<u64> {
    let parent = parent.as_str();
    let code = code.trim();
    if code.len() <= parent.len() + 1 || !code.is_char_boundary(parent.len()) {
        return None;
    }
    let (head, rest) = code.split_at(parent.len());
    if !head.eq_ignore_ascii_case(parent) {
        return None;
    }
    let suffix = rest.strip_prefix('-')?;
    if suffix.is_empty() || !suffix.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn code(raw: &str) -> LocationCode {
        LocationCode::parse(raw).unwrap()
    }

    #[test]
    fn draws_from_seed_letters() {
        let parent = code("DCL-234-KW-ILR");
        let taken: HashSet<&str> = ["DCL-234-KW-ILR-ILE"].into_iter().collect();
        let allowed: HashSet<char> = "ILORINEAST".chars().collect();
        let mut rng = StdRng::seed_from_u64(7);
        let gen = CodeGenerator::default();

        for _ in 0..200 {
            let child = gen
                .child_code(&parent, "Ilorin East", |c| taken.contains(c), &mut rng)
                .unwrap();
            assert_ne!(child.as_str(), "DCL-234-KW-ILR-ILE");
            let token = child.last_segment();
            assert_eq!(token.len(), 3);
            assert!(token.chars().all(|c| allowed.contains(&c)), "token {}", token);
        }
    }

    #[test]
    fn short_seed_falls_back_to_alphabet() {
        let parent = code("DCL-234");
        let mut rng = StdRng::seed_from_u64(1);
        let child = CodeGenerator::default()
            .child_code(&parent, "K-", |_| false, &mut rng)
            .unwrap();
        assert!(child.last_segment().chars().all(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn checks_until_first_free_code() {
        let parent = code("DCL-234-KW");
        let mut rng = StdRng::seed_from_u64(3);
        let mut lookups = 0;
        let child = CodeGenerator::default()
            .child_code(
                &parent,
                "Ilorin",
                |_| {
                    lookups += 1;
                    lookups <= 4
                },
                &mut rng,
            )
            .unwrap();
        assert_eq!(lookups, 5);
        assert!(child.as_str().starts_with("DCL-234-KW-"));
    }

    #[test]
    fn gives_up_after_cap() {
        let parent = code("DCL-234-KW");
        let mut rng = StdRng::seed_from_u64(3);
        let mut lookups = 0;
        let err = CodeGenerator::new(5, 3)
            .child_code(&parent, "Ilorin", |_| {
                lookups += 1;
                true
            }, &mut rng)
            .unwrap_err();
        assert_eq!(lookups, 5);
        assert_eq!(
            err,
            ScopeError::IdGenerationExhausted { parent: "DCL-234-KW".into(), attempts: 5 }
        );
    }

    #[test]
    fn lettered_children_not_allowed_under_location() {
        let parent = code("DCL-234-KW-ILR-ILE");
        assert!(generate_child_code(&parent, "Anything", |_| false).is_err());
    }

    #[test]
    fn serial_numbering() {
        let parent = code("DCL-234-KW-ILR-ILE");
        assert_eq!(next_serial_code(&parent, Vec::<&str>::new()).unwrap().as_str(), "DCL-234-KW-ILR-ILE-001");

        let existing = [
            "DCL-234-KW-ILR-ILE-0002",
            "dcl-234-kw-ilr-ile-007",
            "DCL-234-KW-ILR-ILEX-999",
            "DCL-234-KW-ILR-ILE-ABC",
        ];
        assert_eq!(
            next_serial_code(&parent, existing).unwrap().as_str(),
            "DCL-234-KW-ILR-ILE-008"
        );
    }
}
