//! Incremental structural constraints over the growing DNA prefix.
//!
//! Both engines pre-analyze the protein once and then answer per-position
//! queries against the committed prefix.  Runs and 6-mers consisting solely of
//! `M` and `W` are skipped: those residues have a single codon each, so their
//! encodings cannot be diversified.

use ahash::AHashMap;

/// A maximal run of identical residues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    /// Protein position of the first residue.
    pub start: usize,
    pub len: usize,
    pub aa: u8,
}

/// Rejects encodings where four consecutive positions of a homopolymeric
/// amino-acid run use four identical codons.
#[derive(Debug, Clone)]
pub struct HomopolymerRuns {
    runs: Vec<Run>,
    /// Per protein position: whether the window `pos-3..=pos` lies inside a run.
    check_at: Vec<bool>,
}

impl HomopolymerRuns {
    pub fn analyze(protein: &[u8]) -> Self {
        let mut runs = Vec::new();
        let mut at = 0;
        while at < protein.len() {
            let aa = protein[at];
            let mut end = at + 1;
            while end < protein.len() && protein[end] == aa {
                end += 1;
            }
            if end - at >= 4 && aa != b'M' && aa != b'W' {
                runs.push(Run {
                    start: at,
                    len: end - at,
                    aa,
                });
            }
            at = end;
        }

        let mut check_at = vec![false; protein.len()];
        for run in &runs {
            for pos in run.start + 3..run.start + run.len {
                check_at[pos] = true;
            }
        }

        Self { runs, check_at }
    }

    pub fn is_active(&self) -> bool {
        !self.runs.is_empty()
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Whether the prefix covering positions `0..=pos` is admissible at `pos`.
    pub fn admits(&self, pos: usize, dna: &[u8]) -> bool {
        if !self.check_at.get(pos).copied().unwrap_or(false) {
            return true;
        }
        let window_start = pos - 3;
        let first = &dna[window_start * 3..window_start * 3 + 3];
        !(1..4).all(|offset| {
            let at = (window_start + offset) * 3;
            &dna[at..at + 3] == first
        })
    }
}

/// Rejects encodings where a duplicated amino-acid 6-mer is encoded by the
/// same 18 nucleotides at two positions.
#[derive(Debug, Clone)]
pub struct RepeatedSixmers {
    /// Protein position completing a duplicated 6-mer occurrence, mapped to
    /// the start positions of all earlier occurrences.
    by_completion: AHashMap<usize, Vec<usize>>,
}

impl RepeatedSixmers {
    pub fn analyze(protein: &[u8]) -> Self {
        let mut occurrences: AHashMap<&[u8], Vec<usize>> = AHashMap::default();
        if protein.len() >= 6 {
            for start in 0..=protein.len() - 6 {
                let sixmer = &protein[start..start + 6];
                if sixmer.iter().all(|&aa| aa == b'M' || aa == b'W') {
                    continue;
                }
                occurrences.entry(sixmer).or_default().push(start);
            }
        }

        let mut by_completion: AHashMap<usize, Vec<usize>> = AHashMap::default();
        for starts in occurrences.into_values() {
            for (nth, &start) in starts.iter().enumerate().skip(1) {
                by_completion.insert(start + 5, starts[..nth].to_vec());
            }
        }

        Self { by_completion }
    }

    pub fn is_active(&self) -> bool {
        !self.by_completion.is_empty()
    }

    /// Whether the prefix covering positions `0..=pos` is admissible at `pos`.
    ///
    /// When `pos` completes a duplicated 6-mer, its 18-nt window is compared
    /// against every earlier occurrence already committed in the prefix.
    pub fn admits(&self, pos: usize, dna: &[u8]) -> bool {
        let Some(earlier) = self.by_completion.get(&pos) else {
            return true;
        };
        let current_start = (pos - 5) * 3;
        let current = &dna[current_start..current_start + 18];
        earlier
            .iter()
            .all(|&start| &dna[start * 3..start * 3 + 18] != current)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn finds_homopolymer_runs() {
        let engine = HomopolymerRuns::analyze(b"MAAAAQQQLLLL");
        assert!(engine.is_active());
        assert_eq!(
            engine.runs(),
            &[
                Run {
                    start: 1,
                    len: 4,
                    aa: b'A'
                },
                Run {
                    start: 8,
                    len: 4,
                    aa: b'L'
                },
            ]
        );
    }

    #[test]
    fn short_runs_and_single_codon_residues_are_skipped() {
        assert!(!HomopolymerRuns::analyze(b"MAAAQ").is_active());
        assert!(!HomopolymerRuns::analyze(b"MMMMMM").is_active());
        assert!(!HomopolymerRuns::analyze(b"QWWWWQ").is_active());
    }

    #[test]
    fn homopolymer_admits() {
        // MAAAA: the A run spans positions 1..=4, so only position 4 completes
        // a window of four run positions.
        let engine = HomopolymerRuns::analyze(b"MAAAA");
        let uniform = b"ATGGCTGCTGCTGCT";
        let diverse = b"ATGGCTGCCGCAGCG";
        for pos in 0..4 {
            assert!(engine.admits(pos, &uniform[..(pos + 1) * 3]));
        }
        assert!(!engine.admits(4, uniform));
        assert!(engine.admits(4, diverse));
        // One differing codon anywhere in the window is enough.
        assert!(engine.admits(4, b"ATGGCTGCCGCTGCT"));
    }

    #[test]
    fn finds_repeated_sixmers() {
        // GSGSGS at 1 and also at 3 (overlapping) in GSGSGSGS.
        let engine = RepeatedSixmers::analyze(b"MGSGSGSGS");
        assert!(engine.is_active());
        assert!(!RepeatedSixmers::analyze(b"MGSGSG").is_active());
    }

    #[test]
    fn sixmers_of_single_codon_residues_are_skipped() {
        assert!(!RepeatedSixmers::analyze(b"AMWMWMWMWMWMWA").is_active());
    }

    #[test]
    fn repeated_sixmer_admits() {
        // QQQQQQ appears at positions 0 and 6; position 11 completes the
        // second occurrence.
        let engine = RepeatedSixmers::analyze(b"QQQQQQQQQQQQ");
        assert!(engine.is_active());
        let same = b"CAACAACAACAACAACAACAACAACAACAACAACAA";
        let differs = b"CAACAACAACAACAACAACAACAACAACAACAACAG";
        assert!(!engine.admits(11, same));
        assert!(engine.admits(11, differs));
        // Other positions are unconstrained by this pair.
        assert!(engine.admits(5, &same[..18]));
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
