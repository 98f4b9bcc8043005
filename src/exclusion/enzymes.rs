//! Static registry of restriction-enzyme recognition sites.
//!
//! Sites are written 5'→3' in IUPAC notation.  A site is matched on both
//! strands: callers emit the forward sequence and, unless the site is
//! palindromic, its reverse complement as well.

use std::sync::LazyLock;

use indexmap::IndexMap;

use crate::codons::revcomp;

static REGISTRY: LazyLock<IndexMap<&'static str, &'static str>> = LazyLock::new(|| {
    IndexMap::from([
        ("AarI", "CACCTGC"),
        ("AscI", "GGCGCGCC"),
        ("AvrII", "CCTAGG"),
        ("BamHI", "GGATCC"),
        ("BbsI", "GAAGAC"),
        ("BglII", "AGATCT"),
        ("BsaI", "GGTCTC"),
        ("BsmBI", "CGTCTC"),
        ("BspEI", "TCCGGA"),
        ("DraI", "TTTAAA"),
        ("EcoRI", "GAATTC"),
        ("EcoRV", "GATATC"),
        ("HindIII", "AAGCTT"),
        ("KpnI", "GGTACC"),
        ("MluI", "ACGCGT"),
        ("NcoI", "CCATGG"),
        ("NdeI", "CATATG"),
        ("NotI", "GCGGCCGC"),
        ("PacI", "TTAATTAA"),
        ("PmeI", "GTTTAAAC"),
        ("PstI", "CTGCAG"),
        ("SacI", "GAGCTC"),
        ("SalI", "GTCGAC"),
        ("SapI", "GCTCTTC"),
        ("SfiI", "GGCCNNNNNGGCC"),
        ("SmaI", "CCCGGG"),
        ("SpeI", "ACTAGT"),
        ("SphI", "GCATGC"),
        ("StuI", "AGGCCT"),
        ("SwaI", "ATTTAAAT"),
        ("XbaI", "TCTAGA"),
        ("XhoI", "CTCGAG"),
    ])
});

/// Looks up the recognition site for an enzyme name, case-insensitively.
pub fn recognition_site(name: &str) -> Option<&'static str> {
    REGISTRY.get(name).copied().or_else(|| {
        REGISTRY
            .iter()
            .find(|(registered, _)| registered.eq_ignore_ascii_case(name))
            .map(|(_, site)| *site)
    })
}

/// All registered enzyme names.
pub fn names() -> impl Iterator<Item = &'static str> {
    REGISTRY.keys().copied()
}

/// Expands an IUPAC site into a regular expression over `ACGT`.
pub fn iupac_to_regex(site: &str) -> String {
    let mut pattern = String::with_capacity(site.len());
    for symbol in site.chars() {
        match symbol.to_ascii_uppercase() {
            'A' => pattern.push('A'),
            'C' => pattern.push('C'),
            'G' => pattern.push('G'),
            'T' | 'U' => pattern.push('T'),
            'R' => pattern.push_str("[AG]"),
            'Y' => pattern.push_str("[CT]"),
            'S' => pattern.push_str("[CG]"),
            'W' => pattern.push_str("[AT]"),
            'K' => pattern.push_str("[GT]"),
            'M' => pattern.push_str("[AC]"),
            'B' => pattern.push_str("[CGT]"),
            'D' => pattern.push_str("[AGT]"),
            'H' => pattern.push_str("[ACT]"),
            'V' => pattern.push_str("[ACG]"),
            'N' => pattern.push_str("[ACGT]"),
            other => pattern.push(other),
        }
    }
    pattern
}

/// Whether a pattern consists solely of IUPAC nucleotide letters, i.e. can be
/// treated as a degenerate DNA literal rather than a regex fragment.
pub fn is_iupac_literal(pattern: &str) -> bool {
    !pattern.is_empty()
        && pattern
            .chars()
            .all(|symbol| "ACGTURYSWKMBDHVN".contains(symbol.to_ascii_uppercase()))
}

/// Whether a site reads the same on both strands.
pub fn is_palindromic(site: &str) -> bool {
    revcomp(site.as_bytes()) == site.as_bytes()
}

/// The reverse complement of an IUPAC site.
pub fn reverse_complement(site: &str) -> String {
    String::from_utf8(revcomp(site.as_bytes())).expect("IUPAC sites are ASCII")
}

#[cfg(test)]
mod test {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn lookups() {
        assert_eq!(recognition_site("EcoRI"), Some("GAATTC"));
        assert_eq!(recognition_site("ecori"), Some("GAATTC"));
        assert_eq!(recognition_site("NoSuchEnzyme"), None);
        assert!(names().count() >= 30);
    }

    #[test]
    fn iupac_expansion() {
        assert_eq!(iupac_to_regex("GAATTC"), "GAATTC");
        assert_eq!(iupac_to_regex("GGCCNNNNNGGCC"), "GGCC[ACGT][ACGT][ACGT][ACGT][ACGT]GGCC");
        assert_eq!(iupac_to_regex("RY"), "[AG][CT]");
    }

    #[test]
    fn iupac_literal_detection() {
        assert!(is_iupac_literal("GAATTC"));
        assert!(is_iupac_literal("ggtacc"));
        assert!(is_iupac_literal("GGCCNNNNNGGCC"));
        assert!(!is_iupac_literal("A{8,}"));
        assert!(!is_iupac_literal(""));
    }

    #[test]
    fn palindromes() {
        assert!(is_palindromic("GAATTC"));
        assert!(is_palindromic("GGTACC"));
        assert!(!is_palindromic("GGTCTC"));
        assert_eq!(reverse_complement("GGTCTC"), "GAGACC");
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
