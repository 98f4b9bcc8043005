//! Compilation and evaluation of disallowed-motif patterns.
//!
//! Three sources feed the effective pattern set of a job, merged in order:
//! the process-wide base file, the job's enzyme names (resolved through
//! [`enzymes`], emitted on both strands), and the job's raw patterns.  All
//! patterns compile case-insensitively; matching cost per search step stays
//! bounded by re-testing only a fixed-size window at the end of the growing
//! prefix.

pub mod enzymes;

use std::fs;
use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

pub use self::error::Error;

mod error {
    /// Error type for exclusion-pattern compilation.
    #[derive(thiserror::Error, Debug)]
    pub enum Error {
        #[error("unknown enzyme name: {0}")]
        UnknownEnzyme(String),
        #[error("cannot compile exclusion pattern {pattern:?}")]
        InvalidPattern {
            pattern: String,
            #[source]
            source: regex::Error,
        },
        #[error("cannot read exclusion pattern file")]
        Io(#[from] std::io::Error),
    }
}

/// Default bound on the incremental scan window, in nucleotides.  Patterns are
/// assumed not to match spans longer than this.
pub const DEFAULT_SCAN_WINDOW: usize = 100;

/// Marker suffix for codon-frame-aligned patterns in the base file.
const CODON_MARKER: &str = "@codon";

const BASE_PATTERNS: &str = include_str!("base_patterns.txt");

/// A compiled disallowed motif.
#[derive(Debug, Clone)]
pub struct ExclusionPattern {
    regex: Regex,
    /// When set, a match counts only at offsets divisible by three.
    pub codon_aligned: bool,
    /// The text the pattern was compiled from, for diagnostics.
    pub source: String,
}

impl ExclusionPattern {
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}

/// Per-job exclusion configuration as carried on a job record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobExclusions {
    /// Enzyme names to resolve through the registry.
    #[serde(default)]
    pub enzymes: Vec<String>,
    /// Raw patterns: degenerate DNA literals or regex fragments.
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl JobExclusions {
    pub fn is_empty(&self) -> bool {
        self.enzymes.is_empty() && self.patterns.is_empty()
    }
}

/// An ordered set of compiled exclusion patterns.
#[derive(Debug, Clone)]
pub struct ExclusionSet {
    patterns: Vec<ExclusionPattern>,
    scan_window: usize,
}

impl ExclusionSet {
    /// An empty set; nothing is excluded.
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
            scan_window: DEFAULT_SCAN_WINDOW,
        }
    }

    /// The embedded standard base set (GoldenGate sites, AOX1 priming sites,
    /// UPP cassette seed, homopolymer stretches).
    pub fn standard() -> Self {
        Self::parse_str(BASE_PATTERNS).expect("embedded base patterns must compile")
    }

    /// Parses a base pattern file: one pattern per line, `#` starts a comment,
    /// a trailing `@codon` marks the pattern as codon-frame aligned.
    pub fn parse_str(text: &str) -> Result<Self, Error> {
        let mut set = Self::empty();
        for line in text.lines() {
            let line = match line.find('#') {
                Some(at) => &line[..at],
                None => line,
            };
            let mut line = line.trim();
            let codon_aligned = match line.strip_suffix(CODON_MARKER) {
                Some(rest) => {
                    line = rest.trim();
                    true
                }
                None => false,
            };
            if line.is_empty() {
                continue;
            }
            set.patterns.push(compile(line, codon_aligned)?);
        }
        Ok(set)
    }

    /// Reads and parses a base pattern file from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Self::parse_str(&fs::read_to_string(path)?)
    }

    /// Overrides the incremental scan window bound.
    pub fn with_scan_window(mut self, scan_window: usize) -> Self {
        self.scan_window = scan_window;
        self
    }

    /// Merges a job's exclusion configuration into a copy of this set.
    ///
    /// Enzyme sites are emitted for both strands; palindromic sites only once.
    pub fn with_job_config(&self, config: &JobExclusions) -> Result<Self, Error> {
        let mut merged = self.clone();
        for name in &config.enzymes {
            let site = enzymes::recognition_site(name)
                .ok_or_else(|| Error::UnknownEnzyme(name.clone()))?;
            merged
                .patterns
                .push(compile(&enzymes::iupac_to_regex(site), false)?);
            if !enzymes::is_palindromic(site) {
                let bottom = enzymes::reverse_complement(site);
                merged
                    .patterns
                    .push(compile(&enzymes::iupac_to_regex(&bottom), false)?);
            }
        }
        for pattern in &config.patterns {
            merged.patterns.push(compile(pattern, false)?);
        }
        Ok(merged)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn scan_window(&self) -> usize {
        self.scan_window
    }

    pub fn patterns(&self) -> &[ExclusionPattern] {
        &self.patterns
    }

    /// Whether `dna` passes the incremental check after one codon was appended.
    ///
    /// Only the trailing `scan_window` bytes are rescanned; earlier offsets
    /// were checked when the prefix was shorter.
    pub fn admits(&self, dna: &[u8]) -> bool {
        let start = dna.len().saturating_sub(self.scan_window);
        self.first_hit_from(dna, start).is_none()
    }

    /// Scans the whole sequence; used for final verification.
    pub fn first_hit(&self, dna: &[u8]) -> Option<(usize, &ExclusionPattern)> {
        self.first_hit_from(dna, 0)
    }

    fn first_hit_from(&self, dna: &[u8], start: usize) -> Option<(usize, &ExclusionPattern)> {
        let text = std::str::from_utf8(dna).expect("DNA sequences are ASCII");
        let window = &text[start..];
        for pattern in &self.patterns {
            if pattern.codon_aligned {
                // Matches can overlap, so re-seed the search one byte past
                // each rejected match start.
                let mut at = 0;
                while let Some(found) = pattern.regex.find_at(window, at) {
                    let offset = start + found.start();
                    if offset % 3 == 0 {
                        return Some((offset, pattern));
                    }
                    at = found.start() + 1;
                }
            } else if let Some(found) = pattern.regex.find(window) {
                return Some((start + found.start(), pattern));
            }
        }
        None
    }
}

fn compile(pattern: &str, codon_aligned: bool) -> Result<ExclusionPattern, Error> {
    let expanded = if enzymes::is_iupac_literal(pattern) {
        enzymes::iupac_to_regex(pattern)
    } else {
        pattern.to_string()
    };
    let regex = RegexBuilder::new(&expanded)
        .case_insensitive(true)
        .build()
        .map_err(|source| Error::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
    Ok(ExclusionPattern {
        regex,
        codon_aligned,
        source: pattern.to_string(),
    })
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
