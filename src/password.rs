//! Password composition policy, strength scoring and generation.

use rand::{rngs::OsRng, seq::SliceRandom, Rng};
use std::fmt;

pub const MIN_LENGTH: usize = 8;
const STRONG_LENGTH: usize = 12;
const MAX_STRENGTH: u8 = 5;
const GENERATED_LENGTH: usize = 12;

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const SPECIAL: &[u8] = b"!@#$%^&*()_+-=[]{}|;:,.<>?";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PasswordRule {
    MinLength,
    Uppercase,
    Lowercase,
    Digit,
    Special,
}

impl fmt::Display for PasswordRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MinLength => write!(f, "Password must be at least {MIN_LENGTH} characters long"),
            Self::Uppercase => f.write_str("Password must contain at least one uppercase letter"),
            Self::Lowercase => f.write_str("Password must contain at least one lowercase letter"),
            Self::Digit => f.write_str("Password must contain at least one number"),
            Self::Special => f.write_str("Password must contain at least one special character"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PasswordValidation {
    pub valid: bool,
    pub errors: Vec<PasswordRule>,
    pub strength: u8,
}

impl PasswordValidation {
    /// Human-readable messages, one per unmet rule.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

fn has_uppercase(candidate: &str) -> bool {
    candidate.chars().any(|c| c.is_ascii_uppercase())
}

fn has_lowercase(candidate: &str) -> bool {
    candidate.chars().any(|c| c.is_ascii_lowercase())
}

fn has_digit(candidate: &str) -> bool {
    candidate.chars().any(|c| c.is_ascii_digit())
}

fn has_special(candidate: &str) -> bool {
    candidate.chars().any(|c| !c.is_ascii_alphanumeric())
}

/// Checks `candidate` against the composition rules.
#[must_use]
pub fn validate_password(candidate: &str) -> PasswordValidation {
    let length = candidate.chars().count();
    let checks = [
        (PasswordRule::MinLength, length >= MIN_LENGTH),
        (PasswordRule::Uppercase, has_uppercase(candidate)),
        (PasswordRule::Lowercase, has_lowercase(candidate)),
        (PasswordRule::Digit, has_digit(candidate)),
        (PasswordRule::Special, has_special(candidate)),
    ];
    let errors: Vec<PasswordRule> = checks
        .into_iter()
        .filter_map(|(rule, met)| (!met).then_some(rule))
        .collect();

    PasswordValidation {
        valid: errors.is_empty(),
        errors,
        strength: strength_score(candidate),
    }
}

/// Score from 0 to 5. Six criteria contribute one point each; the total is capped.
#[must_use]
pub fn strength_score(candidate: &str) -> u8 {
    let length = candidate.chars().count();
    let score = [
        length >= MIN_LENGTH,
        length >= STRONG_LENGTH,
        has_uppercase(candidate),
        has_lowercase(candidate),
        has_digit(candidate),
        has_special(candidate),
    ]
    .into_iter()
    .filter(|met| *met)
    .count();
    u8::try_from(score).map_or(MAX_STRENGTH, |score| score.min(MAX_STRENGTH))
}

fn pick<R: Rng + ?Sized>(rng: &mut R, set: &[u8]) -> u8 {
    set[rng.gen_range(0..set.len())]
}

/// Generates a 12-character password containing every character class.
#[must_use]
pub fn generate_strong_password() -> String {
    let mut rng = OsRng;
    let all: Vec<u8> = [UPPERCASE, LOWERCASE, DIGITS, SPECIAL].concat();

    let mut chars = vec![
        pick(&mut rng, UPPERCASE),
        pick(&mut rng, LOWERCASE),
        pick(&mut rng, DIGITS),
        pick(&mut rng, SPECIAL),
    ];
    while chars.len() < GENERATED_LENGTH {
        chars.push(pick(&mut rng, &all));
    }
    chars.shuffle(&mut rng);

    chars.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_lowercase_fails_every_other_rule() {
        let result = validate_password("abc");
        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec![
                PasswordRule::MinLength,
                PasswordRule::Uppercase,
                PasswordRule::Digit,
                PasswordRule::Special,
            ]
        );
        assert_eq!(result.strength, 1);
    }

    #[test]
    fn digits_only_flags_all_letter_rules() {
        let result = validate_password("123");
        assert_eq!(
            result.errors,
            vec![
                PasswordRule::MinLength,
                PasswordRule::Uppercase,
                PasswordRule::Lowercase,
                PasswordRule::Special,
            ]
        );
    }

    #[test]
    fn empty_password_fails_all_five_rules() {
        let result = validate_password("");
        assert_eq!(result.errors.len(), 5);
        assert_eq!(result.strength, 0);
        assert_eq!(
            result.messages()[0],
            "Password must be at least 8 characters long"
        );
    }

    #[test]
    fn compliant_password_passes_with_top_strength() {
        let result = validate_password("Abcdef1!");
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert_eq!(result.strength, 5);
    }

    #[test]
    fn strength_is_capped_at_five() {
        assert_eq!(strength_score("Abcdefghij1!"), 5);
        assert_eq!(strength_score("abcdefghijkl"), 3);
        assert_eq!(strength_score("ABCDEFGH"), 2);
        assert_eq!(strength_score(""), 0);
    }

    #[test]
    fn non_ascii_counts_as_special() {
        assert!(has_special("Ééé"));
        assert_eq!(strength_score("ñ"), 1);
    }

    #[test]
    fn generated_passwords_meet_policy() {
        for _ in 0..500 {
            let password = generate_strong_password();
            assert_eq!(password.len(), 12);
            assert!(password.bytes().any(|b| UPPERCASE.contains(&b)));
            assert!(password.bytes().any(|b| LOWERCASE.contains(&b)));
            assert!(password.bytes().any(|b| DIGITS.contains(&b)));
            assert!(password.bytes().any(|b| SPECIAL.contains(&b)));
            assert!(validate_password(&password).valid);
        }
    }
}
