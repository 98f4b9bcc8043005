//! Genetic-code tables and DNA primitives.
//!
//! Codons are addressed by a canonical index obtained by packing their bases
//! into 2 bits each (`A=0, C=1, G=2, T=3`), so the index order is the
//! lexicographic order over `ACGT` and a "last two codons" search state fits
//! into a single machine word.  The lookup tables are generated by `build.rs`.

pub use crate::codons::error::Error;
use crate::Sequence;

include!(concat!(env!("OUT_DIR"), "/tables_gen.rs"));

mod error {
    /// Error type for translation of DNA sequences.
    #[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
    pub enum Error {
        #[error("can only translate DNA whose length is a multiple of 3, but is: {0}")]
        UntranslatableDnaLength(usize),
        #[error("codon is undefined in the genetic code: {0}")]
        UndefinedCodon(String),
    }
}

/// The 20 standard amino acids in 1-letter alphabetical order.
pub const AMINO_ACIDS: [u8; 20] = *b"ACDEFGHIKLMNPQRSTVWY";

/// Ambiguity symbols accepted on input; resolved away during validation.
pub const AMBIGUITY_SYMBOLS: [u8; 6] = *b"BJOUXZ";

/// Returns the 2-bit representation of a nucleotide, `None` for non-ACGT input.
#[inline]
pub fn base_2bit(base: u8) -> Option<u8> {
    let value = DNA_ASCII_TO_2BIT[base as usize];
    (value != 255).then_some(value)
}

/// Returns the canonical index (0..64) of a 3-nucleotide codon.
pub fn codon_index(codon: &[u8]) -> Option<u8> {
    if codon.len() != 3 {
        return None;
    }
    let mut result = 0;
    for &base in codon {
        result = (result << 2) | base_2bit(base)?;
    }
    Some(result)
}

/// Returns the codon bytes for a canonical index.
#[inline]
pub fn codon_bytes(index: u8) -> &'static [u8; 3] {
    &CODONS[index as usize]
}

/// Returns the 1-letter amino acid encoded by the codon at `index` (`*` for stops).
#[inline]
pub fn aa_for_codon_index(index: u8) -> u8 {
    CODON_TO_AA1[index as usize]
}

/// Returns the candidate codon indices for a 1-letter amino acid, in canonical
/// index order.  Empty for unknown symbols and for `*`.
#[inline]
pub fn codon_indices_for_aa(aa1: u8) -> &'static [u8] {
    _aa1_to_codon_indices(aa1)
}

#[inline]
pub fn is_stop_codon_index(index: u8) -> bool {
    STOP_CODON_INDICES.contains(&index)
}

/// Packs a 9-nucleotide window into an 18-bit key, `None` for non-ACGT input.
pub fn pack_ninemer(window: &[u8]) -> Option<u32> {
    if window.len() != 9 {
        return None;
    }
    let mut result = 0u32;
    for &base in window {
        result = (result << 2) | u32::from(base_2bit(base)?);
    }
    Some(result)
}

/// Translates a DNA sequence into 1-letter amino acids, codon by codon,
/// stopping at the first stop codon (`TAA`, `TAG`, `TGA`).
pub fn translate(dna: &[u8]) -> Result<Sequence, Error> {
    if dna.len() % 3 != 0 {
        return Err(Error::UntranslatableDnaLength(dna.len()));
    }

    let mut result = Vec::with_capacity(dna.len() / 3);
    for chunk in dna.chunks_exact(3) {
        let index = codon_index(chunk).ok_or_else(|| {
            Error::UndefinedCodon(String::from_utf8_lossy(chunk).to_string())
        })?;
        let aa1 = aa_for_codon_index(index);
        if aa1 == b'*' {
            break;
        }
        result.push(aa1);
    }

    Ok(result)
}

/// Reverse complementing shortcut.
pub fn revcomp(seq: &[u8]) -> Sequence {
    bio::alphabets::dna::revcomp(seq)
}

/// Fraction of `G` and `C` bases in `dna`; 0.0 for an empty sequence.
pub fn gc_fraction(dna: &[u8]) -> f64 {
    if dna.is_empty() {
        return 0.0;
    }
    let gc = dna
        .iter()
        .filter(|&&base| matches!(base, b'G' | b'g' | b'C' | b'c'))
        .count();
    gc as f64 / dna.len() as f64
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
