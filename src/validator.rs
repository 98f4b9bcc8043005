//! Cleaning and validation of user-supplied protein sequences.
//!
//! Ambiguity symbols are resolved at validation time so that downstream code
//! only ever sees the 20-letter alphabet.  Resolution of `B`, `Z`, `J` and `X`
//! is randomized (matching the upstream submission pipeline) through an
//! explicitly injected random source; `U` and `O` resolve deterministically to
//! their conventional stand-ins.  The optimizers themselves are deterministic,
//! so any run-to-run variation traces back to this step alone.

use rand::Rng;

use crate::codons::{AMBIGUITY_SYMBOLS, AMINO_ACIDS};

pub use self::error::Error;

mod error {
    /// Error type for protein sequence validation.
    #[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
    pub enum Error {
        #[error("illegal character {symbol:?} at position {position}")]
        IllegalCharacter { symbol: char, position: usize },
        #[error("stop marker inside the sequence at position {0}")]
        InternalStop(usize),
        #[error("cleaned sequence has {0} residues but at least 2 are required")]
        TooShort(usize),
    }
}

/// Sequences longer than this trigger a performance warning.
const LONG_SEQUENCE_THRESHOLD: usize = 10_000;

/// A non-fatal observation made while cleaning a sequence.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// An ambiguity symbol was replaced by a concrete residue.
    AmbiguityResolved { position: usize, from: char, to: char },
    /// The sequence is long enough that optimization will take a while.
    LongSequence { length: usize },
    /// The sequence does not begin with a start methionine.
    MissingLeadingMet,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::AmbiguityResolved { position, from, to } => {
                write!(f, "resolved ambiguous {} at position {} to {}", from, position, to)
            }
            Warning::LongSequence { length } => {
                write!(f, "sequence has {} residues; optimization may be slow", length)
            }
            Warning::MissingLeadingMet => write!(f, "sequence does not start with M"),
        }
    }
}

/// A cleaned protein sequence together with the warnings produced on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedProtein {
    /// Uppercase residues from the 20-letter alphabet only.
    pub sequence: String,
    pub warnings: Vec<Warning>,
}

/// Validates a raw protein string using the thread-local random source for
/// ambiguity resolution.
pub fn validate(raw: &str) -> Result<ValidatedProtein, Error> {
    validate_with_rng(raw, &mut rand::rng())
}

/// Validates a raw protein string.
///
/// Cleaning steps, in order: drop whitespace, digits, hyphens and dots;
/// uppercase; reject anything outside the amino-acid alphabet, the ambiguity
/// symbols and `*`; resolve ambiguity symbols (`U`→`C`, `O`→`K`, `B`→`D`/`N`,
/// `Z`→`E`/`Q`, `J`→`L`/`I`, `X`→any residue); strip trailing stop markers.
///
/// # Args
///
/// * `raw` -- The sequence as submitted, possibly with formatting noise.
/// * `rng` -- Random source used to resolve `B`, `Z`, `J` and `X`.
///
/// # Returns
///
/// The cleaned sequence plus warnings, or the first fatal problem found.
pub fn validate_with_rng<R: Rng>(raw: &str, rng: &mut R) -> Result<ValidatedProtein, Error> {
    let mut cleaned: Vec<u8> = Vec::with_capacity(raw.len());
    for symbol in raw.chars() {
        if symbol.is_whitespace() || symbol.is_ascii_digit() || symbol == '-' || symbol == '.' {
            continue;
        }
        let upper = symbol.to_ascii_uppercase();
        let byte = upper as u32;
        let accepted = byte <= 0x7f
            && (upper == '*'
                || AMINO_ACIDS.contains(&(upper as u8))
                || AMBIGUITY_SYMBOLS.contains(&(upper as u8)));
        if !accepted {
            return Err(Error::IllegalCharacter {
                symbol,
                position: cleaned.len(),
            });
        }
        cleaned.push(upper as u8);
    }

    let mut warnings = Vec::new();
    for (position, residue) in cleaned.iter_mut().enumerate() {
        let replacement = match *residue {
            b'U' => b'C',
            b'O' => b'K',
            b'B' => pick(rng, b"DN"),
            b'Z' => pick(rng, b"EQ"),
            b'J' => pick(rng, b"LI"),
            b'X' => pick(rng, &AMINO_ACIDS),
            _ => continue,
        };
        warnings.push(Warning::AmbiguityResolved {
            position,
            from: *residue as char,
            to: replacement as char,
        });
        *residue = replacement;
    }

    while cleaned.last() == Some(&b'*') {
        cleaned.pop();
    }
    if let Some(position) = cleaned.iter().position(|&residue| residue == b'*') {
        return Err(Error::InternalStop(position));
    }
    if cleaned.len() < 2 {
        return Err(Error::TooShort(cleaned.len()));
    }

    if cleaned.len() > LONG_SEQUENCE_THRESHOLD {
        warnings.push(Warning::LongSequence {
            length: cleaned.len(),
        });
    }
    if cleaned[0] != b'M' {
        warnings.push(Warning::MissingLeadingMet);
    }

    Ok(ValidatedProtein {
        sequence: String::from_utf8(cleaned).expect("cleaned sequence is ASCII"),
        warnings,
    })
}

fn pick<R: Rng>(rng: &mut R, choices: &[u8]) -> u8 {
    choices[rng.random_range(0..choices.len())]
}

#[cfg(test)]
mod test {
    use super::*;

    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::rstest;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[rstest]
    #[case("MA", "MA")]
    #[case("ma", "MA")]
    #[case("M A\n2-Q.", "MAQ")]
    #[case("MA*", "MA")]
    #[case("MA***", "MA")]
    fn cleaning(#[case] raw: &str, #[case] expected: &str) {
        let validated = validate_with_rng(raw, &mut rng()).unwrap();
        assert_eq!(validated.sequence, expected);
    }

    #[test]
    fn deterministic_ambiguity_resolutions() {
        let validated = validate_with_rng("MUO", &mut rng()).unwrap();
        assert_eq!(validated.sequence, "MCK");
        assert_eq!(validated.warnings.len(), 2);
        assert_eq!(
            validated.warnings[0],
            Warning::AmbiguityResolved {
                position: 1,
                from: 'U',
                to: 'C'
            }
        );
    }

    #[test]
    fn sampled_ambiguity_resolutions() {
        let validated = validate_with_rng("MBZJX", &mut rng()).unwrap();
        assert_eq!(validated.sequence.len(), 5);
        assert_eq!(validated.warnings.len(), 4);
        let residues = validated.sequence.as_bytes();
        assert!(b"DN".contains(&residues[1]));
        assert!(b"EQ".contains(&residues[2]));
        assert!(b"LI".contains(&residues[3]));
        assert!(AMINO_ACIDS.contains(&residues[4]));
        // The same seed resolves the same way.
        let again = validate_with_rng("MBZJX", &mut rng()).unwrap();
        assert_eq!(again.sequence, validated.sequence);
    }

    #[test]
    fn rejects_illegal_characters() {
        assert_eq!(
            validate_with_rng("MA@", &mut rng()),
            Err(Error::IllegalCharacter {
                symbol: '@',
                position: 2
            })
        );
        assert!(matches!(
            validate_with_rng("MÃ", &mut rng()),
            Err(Error::IllegalCharacter { .. })
        ));
    }

    #[test]
    fn rejects_internal_stop() {
        assert_eq!(
            validate_with_rng("MA*QQ", &mut rng()),
            Err(Error::InternalStop(2))
        );
    }

    #[rstest]
    #[case("", 0)]
    #[case("M", 1)]
    #[case("*", 0)]
    #[case("  \n", 0)]
    fn rejects_too_short(#[case] raw: &str, #[case] cleaned_len: usize) {
        assert_eq!(
            validate_with_rng(raw, &mut rng()),
            Err(Error::TooShort(cleaned_len))
        );
    }

    #[test]
    fn warns_on_missing_leading_met() {
        let validated = validate_with_rng("AQ", &mut rng()).unwrap();
        assert!(validated.warnings.contains(&Warning::MissingLeadingMet));
        let validated = validate_with_rng("MQ", &mut rng()).unwrap();
        assert!(validated.warnings.is_empty());
    }

    #[test]
    fn warns_on_long_sequences() {
        let raw = "M".repeat(10_001);
        let validated = validate_with_rng(&raw, &mut rng()).unwrap();
        assert!(validated
            .warnings
            .contains(&Warning::LongSequence { length: 10_001 }));
    }
}

// <LICENSE>
// Copyright 2026 codonopt Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
// </LICENSE>
