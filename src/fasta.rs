//! Minimal FASTA parsing for the upload collaborator.
//!
//! Only the pieces the optimizer pipeline needs: records of name, optional
//! description, and raw sequence text.  Validation of the sequence itself
//! happens later in [`crate::validator`].

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

pub use self::error::Error;

mod error {
    /// Error type for FASTA parsing.
    #[derive(thiserror::Error, Debug)]
    pub enum Error {
        #[error("cannot read FASTA input")]
        Io(#[from] std::io::Error),
        #[error("FASTA input contains no records")]
        Empty,
        #[error("sequence data before any header at line {0}")]
        MissingHeader(usize),
        #[error("header with an empty name at line {0}")]
        EmptyName(usize),
    }
}

/// One FASTA record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    pub description: Option<String>,
    pub sequence: String,
}

/// Parses FASTA records from a string.
///
/// Headers may take the forms `>Name [Description]`, `>Name|Description` or
/// `>Name Description`.  Sequence lines may span multiple lines; blank lines
/// and whitespace inside sequence lines are dropped.
pub fn parse_str(content: &str) -> Result<Vec<Record>, Error> {
    let mut records = Vec::new();
    let mut current: Option<Record> = None;

    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('>') {
            if let Some(record) = current.take() {
                records.push(record);
            }
            let (name, description) = split_header(header);
            if name.is_empty() {
                return Err(Error::EmptyName(line_number));
            }
            current = Some(Record {
                name: name.to_string(),
                description: description.map(str::to_string),
                sequence: String::new(),
            });
        } else {
            let record = current
                .as_mut()
                .ok_or(Error::MissingHeader(line_number))?;
            record
                .sequence
                .extend(line.chars().filter(|symbol| !symbol.is_whitespace()));
        }
    }

    if let Some(record) = current.take() {
        records.push(record);
    }
    if records.is_empty() {
        return Err(Error::Empty);
    }
    Ok(records)
}

/// Parses FASTA records from a reader.
pub fn from_reader<R: BufRead>(mut reader: R) -> Result<Vec<Record>, Error> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    parse_str(&content)
}

/// Parses FASTA records from a file.
pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Record>, Error> {
    from_reader(BufReader::new(File::open(path)?))
}

fn split_header(header: &str) -> (&str, Option<&str>) {
    let header = header.trim();
    // `>Name [Description]`
    if let Some((name, rest)) = header.split_once('[') {
        if let Some(description) = rest.strip_suffix(']') {
            return (name.trim(), non_empty(description.trim()));
        }
    }
    // `>Name|Description`
    if let Some((name, description)) = header.split_once('|') {
        return (name.trim(), non_empty(description.trim()));
    }
    // `>Name Description`
    match header.split_once(char::is_whitespace) {
        Some((name, description)) => (name, non_empty(description.trim())),
        None => (header, None),
    }
}

fn non_empty(text: &str) -> Option<&str> {
    (!text.is_empty()).then_some(text)
}
