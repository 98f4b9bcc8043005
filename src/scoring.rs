//! The learned 9-mer scoring table.
//!
//! The table maps an amino-acid triplet to integer weights over the 9-nt
//! windows that can encode it.  It is loaded once at worker startup and shared
//! by reference across jobs; missing triplets and missing 9-mers score 0.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use ahash::AHashMap;
use indexmap::IndexMap;
use serde::Deserialize;

use crate::codons;

pub use self::error::Error;

mod error {
    /// Error type for loading the scoring table.
    #[derive(thiserror::Error, Debug)]
    pub enum Error {
        #[error("cannot read scoring table")]
        Io(#[from] std::io::Error),
        #[error("cannot parse scoring table")]
        Parse(#[from] serde_json::Error),
        #[error("invalid amino-acid triplet key: {0:?}")]
        InvalidTriplet(String),
        #[error("invalid 9-mer key {ninemer:?} under triplet {triplet:?}")]
        InvalidNinemer { triplet: String, ninemer: String },
    }
}

/// Size of the 18-bit packed 9-mer key space.
const NINEMER_SPACE: usize = 1 << 18;

/// Inner maps at or above this population are stored as dense arrays.
const DENSE_THRESHOLD: usize = 4096;

#[derive(Debug, Deserialize)]
struct ScoringFile {
    ninemer_scores: IndexMap<String, IndexMap<String, i32>>,
}

#[derive(Debug)]
enum TripletScores {
    /// Indexed by the packed 9-mer; zero means absent.
    Dense(Vec<i32>),
    Sparse(AHashMap<u32, i32>),
}

/// Immutable lookup of 9-mer scores, shared by all jobs.
#[derive(Debug, Default)]
pub struct ScoringOracle {
    triplets: AHashMap<[u8; 3], TripletScores>,
}

impl ScoringOracle {
    /// An oracle that scores everything 0; useful for constraint-only runs.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads the table from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let start = std::time::Instant::now();
        log::debug!("loading scoring table from {:?}", path.as_ref());
        let oracle = Self::from_reader(BufReader::new(File::open(path)?))?;
        log::debug!(
            "loaded {} scored triplets in {:?}",
            oracle.triplet_count(),
            start.elapsed()
        );
        Ok(oracle)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        let file: ScoringFile = serde_json::from_reader(reader)?;
        Self::from_scoring_file(file)
    }

    pub fn from_str(text: &str) -> Result<Self, Error> {
        let file: ScoringFile = serde_json::from_str(text)?;
        Self::from_scoring_file(file)
    }

    fn from_scoring_file(file: ScoringFile) -> Result<Self, Error> {
        let mut triplets = AHashMap::default();
        for (triplet, scores) in file.ninemer_scores {
            let key: [u8; 3] = triplet
                .as_bytes()
                .try_into()
                .map_err(|_| Error::InvalidTriplet(triplet.clone()))?;
            if !key.iter().all(|aa| codons::AMINO_ACIDS.contains(aa)) {
                return Err(Error::InvalidTriplet(triplet));
            }

            let mut entries = Vec::with_capacity(scores.len());
            for (ninemer, score) in scores {
                let packed = codons::pack_ninemer(ninemer.as_bytes()).ok_or_else(|| {
                    Error::InvalidNinemer {
                        triplet: triplet.clone(),
                        ninemer: ninemer.clone(),
                    }
                })?;
                entries.push((packed, score));
            }

            let table = if entries.len() >= DENSE_THRESHOLD {
                let mut dense = vec![0; NINEMER_SPACE];
                for (packed, score) in entries {
                    dense[packed as usize] = score;
                }
                TripletScores::Dense(dense)
            } else {
                TripletScores::Sparse(entries.into_iter().collect())
            };
            triplets.insert(key, table);
        }
        Ok(Self { triplets })
    }

    /// The score of encoding `triplet` by `ninemer`; 0 when either is unknown.
    pub fn score(&self, triplet: &[u8], ninemer: &[u8]) -> i64 {
        let Ok(key) = <[u8; 3]>::try_from(triplet) else {
            return 0;
        };
        let Some(table) = self.triplets.get(&key) else {
            return 0;
        };
        let Some(packed) = codons::pack_ninemer(ninemer) else {
            return 0;
        };
        let score = match table {
            TripletScores::Dense(dense) => dense[packed as usize],
            TripletScores::Sparse(sparse) => sparse.get(&packed).copied().unwrap_or(0),
        };
        i64::from(score)
    }

    pub fn triplet_count(&self) -> usize {
        self.triplets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triplets.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use pretty_assertions::assert_eq;
    use test_log::test;

    #[test]
    fn parses_and_scores() {
        let oracle = ScoringOracle::from_str(
            r#"{
                "ninemer_scores": {
                    "MAA": {"ATGGCTGCT": 5, "ATGGCAGCA": 12},
                    "AAQ": {"GCTGCTCAA": -3}
                }
            }"#,
        )
        .unwrap();
        assert_eq!(oracle.triplet_count(), 2);
        assert_eq!(oracle.score(b"MAA", b"ATGGCTGCT"), 5);
        assert_eq!(oracle.score(b"MAA", b"ATGGCAGCA"), 12);
        assert_eq!(oracle.score(b"AAQ", b"GCTGCTCAA"), -3);
        // Missing entries score 0.
        assert_eq!(oracle.score(b"MAA", b"ATGGCGGCG"), 0);
        assert_eq!(oracle.score(b"QQQ", b"CAACAACAA"), 0);
        assert_eq!(oracle.score(b"MA", b"ATGGCTGCT"), 0);
        assert_eq!(oracle.score(b"MAA", b"ATGGCTGC"), 0);
    }

    #[test]
    fn empty_oracle_scores_zero() {
        assert_eq!(ScoringOracle::empty().score(b"MAA", b"ATGGCTGCT"), 0);
    }

    #[test]
    fn rejects_bad_keys() {
        let err = ScoringOracle::from_str(r#"{"ninemer_scores": {"MA": {}}}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidTriplet(key) if key == "MA"));

        let err =
            ScoringOracle::from_str(r#"{"ninemer_scores": {"MXA": {}}}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidTriplet(_)));

        let err = ScoringOracle::from_str(
            r#"{"ninemer_scores": {"MAA": {"ATGGCTGCN": 1}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidNinemer { .. }));
    }

    #[test]
    fn dense_storage_above_threshold() {
        // Build a triplet with DENSE_THRESHOLD entries by enumerating packed
        // 9-mer keys.
        let bases = [b'A', b'C', b'G', b'T'];
        let mut scores = String::new();
        for packed in 0..DENSE_THRESHOLD as u32 {
            let mut ninemer = [0u8; 9];
            for slot in 0..9 {
                ninemer[8 - slot] = bases[((packed >> (2 * slot)) & 3) as usize];
            }
            if packed > 0 {
                scores.push(',');
            }
            scores.push_str(&format!(
                r#""{}": {}"#,
                std::str::from_utf8(&ninemer).unwrap(),
                packed % 7
            ));
        }
        let json = format!(r#"{{"ninemer_scores": {{"LLL": {{{}}}}}}}"#, scores);
        let oracle = ScoringOracle::from_str(&json).unwrap();
        assert!(matches!(
            oracle.triplets.get(b"LLL"),
            Some(TripletScores::Dense(_))
        ));
        assert_eq!(oracle.score(b"LLL", b"AAAAAAAAC"), 1);
        assert_eq!(oracle.score(b"LLL", b"TTTTTTTTT"), 0);
    }

    #[test]
    fn loads_from_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            br#"{"ninemer_scores": {"MQQ": {"ATGCAACAA": 7}}}"#,
        )
        .unwrap();
        let oracle = ScoringOracle::from_path(file.path()).unwrap();
        assert_eq!(oracle.score(b"MQQ", b"ATGCAACAA"), 7);
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
