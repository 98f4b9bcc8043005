//! Reverse translation of a protein into codon-optimized DNA.
//!
//! Two variants share the same scoring and constraint semantics and differ
//! only in pruning geometry: [`optimize_beam`] keeps a flat frontier of the
//! best partial solutions, [`optimize_dp`] buckets them by their last two
//! codons so that diverse prefixes survive behind equivalent tails.  The DP
//! variant tends to reach higher final scores; the beam variant is the
//! fallback when DP reports over-constraint.
//!
//! Both variants are deterministic: candidate codons are enumerated in
//! canonical index order and all pruning uses stable sorts on the score alone,
//! so equal scores resolve to the earlier-enumerated candidate.

mod beam;
mod dp;

use std::time::{Duration, Instant};

use crate::codons;
use crate::constraints::{HomopolymerRuns, RepeatedSixmers};
use crate::exclusion::ExclusionSet;
use crate::scoring::ScoringOracle;

pub use self::error::Error;

mod error {
    /// Error type for optimization runs.
    #[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
    pub enum Error {
        #[error("protein must have at least two residues, got {0}")]
        ProteinTooShort(usize),
        #[error("every candidate codon was eliminated at position {position}")]
        OverConstrained { position: usize },
        #[error("optimized DNA does not translate back to the input protein")]
        TranslationMismatch,
    }
}

/// Pruning parameters shared by both optimizer variants.
///
/// The defaults are empirical; `beam_width` caps the flat frontier of the
/// beam variant and the number of state buckets of the DP variant, while
/// `paths_per_state` caps the paths kept per DP bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub beam_width: usize,
    pub paths_per_state: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            beam_width: 100,
            paths_per_state: 8,
        }
    }
}

/// A successful optimization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Optimized {
    pub dna: String,
    /// Sum of 9-mer window scores over the whole sequence.
    pub score: i64,
    pub elapsed: Duration,
    /// Candidates dropped by exclusion or structural constraints.
    pub candidates_pruned: u64,
}

/// Runs the beam-search variant.
pub fn optimize_beam(
    protein: &[u8],
    oracle: &ScoringOracle,
    exclusions: &ExclusionSet,
    params: &SearchParams,
) -> Result<Optimized, Error> {
    let started = Instant::now();
    let mut context = SearchContext::new(protein, oracle, exclusions)?;
    beam::run(&mut context, params, started)
}

/// Runs the DP-with-state-grouping variant.
pub fn optimize_dp(
    protein: &[u8],
    oracle: &ScoringOracle,
    exclusions: &ExclusionSet,
    params: &SearchParams,
) -> Result<Optimized, Error> {
    let started = Instant::now();
    let mut context = SearchContext::new(protein, oracle, exclusions)?;
    dp::run(&mut context, params, started)
}

/// One surviving search path: accumulated score and committed DNA prefix.
#[derive(Debug, Clone)]
pub(crate) struct PartialSolution {
    pub(crate) score: i64,
    pub(crate) dna: Vec<u8>,
}

impl PartialSolution {
    pub(crate) fn root() -> Self {
        Self {
            score: 0,
            dna: Vec::new(),
        }
    }
}

/// Per-run state shared by both variants.
pub(crate) struct SearchContext<'a> {
    protein: &'a [u8],
    candidates: Vec<&'static [u8]>,
    oracle: &'a ScoringOracle,
    exclusions: &'a ExclusionSet,
    homopolymers: HomopolymerRuns,
    repeats: RepeatedSixmers,
    pruned: u64,
}

impl<'a> SearchContext<'a> {
    fn new(
        protein: &'a [u8],
        oracle: &'a ScoringOracle,
        exclusions: &'a ExclusionSet,
    ) -> Result<Self, Error> {
        if protein.len() < 2 {
            return Err(Error::ProteinTooShort(protein.len()));
        }
        let candidates = protein
            .iter()
            .map(|&aa| codons::codon_indices_for_aa(aa))
            .collect();
        Ok(Self {
            protein,
            candidates,
            oracle,
            exclusions,
            homopolymers: HomopolymerRuns::analyze(protein),
            repeats: RepeatedSixmers::analyze(protein),
            pruned: 0,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.protein.len()
    }

    /// Candidate codon indices for the residue at `pos`, in enumeration order.
    pub(crate) fn candidates_at(&self, pos: usize) -> &'static [u8] {
        self.candidates[pos]
    }

    /// Extends `parent` by one codon at `pos`.
    ///
    /// Returns `None` when the exclusion set or a structural engine eliminates
    /// the candidate.  For `pos >= 2` the 9-mer window ending at `pos` is
    /// scored and added to the accumulated score.
    pub(crate) fn try_extend(
        &mut self,
        parent: &PartialSolution,
        pos: usize,
        codon_index: u8,
    ) -> Option<PartialSolution> {
        let mut dna = Vec::with_capacity(parent.dna.len() + 3);
        dna.extend_from_slice(&parent.dna);
        dna.extend_from_slice(codons::codon_bytes(codon_index));

        if !self.exclusions.admits(&dna)
            || !self.homopolymers.admits(pos, &dna)
            || !self.repeats.admits(pos, &dna)
        {
            self.pruned += 1;
            return None;
        }

        let mut score = parent.score;
        if pos >= 2 {
            let triplet = &self.protein[pos - 2..=pos];
            let ninemer = &dna[(pos - 2) * 3..(pos + 1) * 3];
            score += self.oracle.score(triplet, ninemer);
        }
        Some(PartialSolution { score, dna })
    }

    /// Verifies the winner by translation and assembles the outcome.
    pub(crate) fn finish(
        &self,
        winner: PartialSolution,
        started: Instant,
    ) -> Result<Optimized, Error> {
        let translated =
            codons::translate(&winner.dna).map_err(|_| Error::TranslationMismatch)?;
        if translated != self.protein {
            log::error!(
                "optimizer invariant violated: candidate DNA does not encode its protein"
            );
            return Err(Error::TranslationMismatch);
        }
        Ok(Optimized {
            dna: String::from_utf8(winner.dna).expect("DNA is ASCII"),
            score: winner.score,
            elapsed: started.elapsed(),
            candidates_pruned: self.pruned,
        })
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
