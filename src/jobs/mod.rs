//! Codon-optimization jobs: records, submission, the store seam, the worker
//! and notification delivery.

pub mod notify;
pub mod store;
pub mod worker;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codons;
use crate::exclusion::{ExclusionSet, JobExclusions};
use crate::optimizer;
use crate::validator::{self, Warning};

pub use self::store::{JobStore, MemoryJobStore};
pub use self::worker::Worker;

pub type JobId = i64;

/// Organism tag applied when a submission does not name one.
pub const DEFAULT_TARGET_ORGANISM: &str = "pichia";

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

/// Structured failure recorded on a FAILED job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobError {
    #[error("invalid protein sequence: {message}")]
    InvalidSequence { message: String },
    #[error("every candidate codon was eliminated at position {position}")]
    OverConstrained { position: usize },
    #[error("optimized DNA failed round-trip translation")]
    TranslationMismatch,
    #[error("internal error: {message}")]
    InternalError { message: String },
}

impl From<optimizer::Error> for JobError {
    fn from(error: optimizer::Error) -> Self {
        match &error {
            optimizer::Error::ProteinTooShort(_) => JobError::InvalidSequence {
                message: error.to_string(),
            },
            optimizer::Error::OverConstrained { position } => JobError::OverConstrained {
                position: *position,
            },
            optimizer::Error::TranslationMismatch => JobError::TranslationMismatch,
        }
    }
}

/// A submission as handed to [`submit`]; the sequence is still raw.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobRequest {
    pub protein_sequence: String,
    #[serde(default)]
    pub protein_name: Option<String>,
    #[serde(default)]
    pub target_organism: Option<String>,
    #[serde(default)]
    pub notification_address: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub exclusions: JobExclusions,
}

/// Validated fields a store turns into a PENDING job.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub protein_sequence: String,
    pub protein_name: Option<String>,
    pub target_organism: String,
    pub notification_address: Option<String>,
    pub user_id: Option<String>,
    pub exclusions: JobExclusions,
}

/// A job record as held by a [`JobStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub state: JobState,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Cleaned protein sequence; immutable after creation.
    pub protein_sequence: String,
    pub protein_name: Option<String>,
    pub target_organism: String,
    pub notification_address: Option<String>,
    pub user_id: Option<String>,
    pub exclusions: JobExclusions,
    pub dna_sequence: Option<String>,
    pub score: Option<i64>,
    pub error: Option<JobError>,
    pub email_sent_at: Option<DateTime<Utc>>,
}

impl Job {
    /// The polling view of this job.
    pub fn status(&self) -> JobStatus {
        let stats = match (&self.state, &self.dna_sequence) {
            (JobState::Completed, Some(dna)) => Some(SequenceStats::of(dna)),
            _ => None,
        };
        JobStatus {
            id: self.id,
            state: self.state,
            protein_sequence: self.protein_sequence.clone(),
            protein_name: self.protein_name.clone(),
            target_organism: self.target_organism.clone(),
            dna_sequence: match self.state {
                JobState::Completed => self.dna_sequence.clone(),
                _ => None,
            },
            error: match self.state {
                JobState::Failed => self.error.clone(),
                _ => None,
            },
            created_at: self.created_at,
            started_at: self.started_at,
            completed_at: self.completed_at,
            stats,
        }
    }
}

/// Derived sequence statistics, reported for COMPLETED jobs only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceStats {
    pub aa_count: usize,
    pub dna_length: usize,
    /// Percentage of G and C bases, rounded to two decimals.
    pub gc_percent: f64,
}

impl SequenceStats {
    fn of(dna: &str) -> Self {
        let gc_percent =
            (codons::gc_fraction(dna.as_bytes()) * 10_000.0).round() / 100.0;
        Self {
            aa_count: dna.len() / 3,
            dna_length: dna.len(),
            gc_percent,
        }
    }
}

/// What a consumer sees when polling a job.
#[derive(Debug, Clone, Serialize)]
pub struct JobStatus {
    pub id: JobId,
    pub state: JobState,
    pub protein_sequence: String,
    pub protein_name: Option<String>,
    pub target_organism: String,
    pub dna_sequence: Option<String>,
    pub error: Option<JobError>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub stats: Option<SequenceStats>,
}

/// Synchronous failures of [`submit`]; no job is created for these.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("invalid protein sequence")]
    InvalidSequence(#[from] validator::Error),
    #[error("invalid exclusion configuration")]
    InvalidConfiguration(#[from] crate::exclusion::Error),
    #[error("job store failure")]
    Store(#[from] store::Error),
}

/// Accepted submission: the job id plus the validator's warnings.
#[derive(Debug, Clone)]
pub struct Submission {
    pub job_id: JobId,
    pub warnings: Vec<Warning>,
}

/// Validates a request and inserts a PENDING job.
///
/// The sequence is cleaned (ambiguity resolution is randomized, see
/// [`validator::validate`]) and the exclusion configuration is compiled once
/// to surface bad enzyme names and patterns before a job is created.
pub async fn submit(
    store: &dyn JobStore,
    base_exclusions: &ExclusionSet,
    request: JobRequest,
) -> Result<Submission, SubmitError> {
    let validated = validator::validate(&request.protein_sequence)?;
    base_exclusions.with_job_config(&request.exclusions)?;

    let job = store
        .insert(NewJob {
            protein_sequence: validated.sequence,
            protein_name: request.protein_name,
            target_organism: request
                .target_organism
                .unwrap_or_else(|| DEFAULT_TARGET_ORGANISM.to_string()),
            notification_address: request.notification_address,
            user_id: request.user_id,
            exclusions: request.exclusions,
        })
        .await?;
    Ok(Submission {
        job_id: job.id,
        warnings: validated.warnings,
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
