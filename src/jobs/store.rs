//! The job store seam and its in-memory reference implementation.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::{Job, JobError, JobId, JobState, NewJob};

pub use self::error::Error;

mod error {
    use super::{JobId, JobState};

    /// Error type for job store operations.
    #[derive(thiserror::Error, Debug)]
    pub enum Error {
        #[error("job {0} does not exist")]
        NotFound(JobId),
        #[error("job {id} cannot leave state {actual:?} this way")]
        InvalidTransition { id: JobId, actual: JobState },
        #[error("job store backend failure: {0}")]
        Backend(String),
    }
}

/// Persistence seam for job records.
///
/// Implementations must make `claim_next_pending` an atomic conditional
/// update: the oldest PENDING job transitions to PROCESSING exactly once,
/// even with several worker processes polling the same store.  Everything
/// else is plain record access.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Creates a PENDING job and returns the stored record.
    async fn insert(&self, new_job: NewJob) -> Result<Job, Error>;

    async fn get(&self, id: JobId) -> Result<Option<Job>, Error>;

    /// Atomically claims the oldest PENDING job, transitioning it to
    /// PROCESSING with `started_at` set; `None` when the queue is empty.
    async fn claim_next_pending(&self) -> Result<Option<Job>, Error>;

    /// Transitions a PROCESSING job to COMPLETED with its result.
    async fn mark_completed(&self, id: JobId, dna: String, score: i64)
        -> Result<Job, Error>;

    /// Transitions a PROCESSING job to FAILED with a structured error.
    async fn mark_failed(&self, id: JobId, error: JobError) -> Result<Job, Error>;

    /// Stamps `email_sent_at` on a terminal job.
    async fn mark_notified(&self, id: JobId) -> Result<(), Error>;

    /// Deletes a job if it is still PENDING; returns whether it was deleted.
    async fn delete_pending(&self, id: JobId) -> Result<bool, Error>;
}

/// In-memory store: a mutex over an ordered map.  Ids are handed out
/// monotonically, so "oldest PENDING" is "smallest PENDING id".
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: JobId,
    jobs: BTreeMap<JobId, Job>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("job store mutex poisoned")
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn insert(&self, new_job: NewJob) -> Result<Job, Error> {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        let job = Job {
            id,
            state: JobState::Pending,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            protein_sequence: new_job.protein_sequence,
            protein_name: new_job.protein_name,
            target_organism: new_job.target_organism,
            notification_address: new_job.notification_address,
            user_id: new_job.user_id,
            exclusions: new_job.exclusions,
            dna_sequence: None,
            score: None,
            error: None,
            email_sent_at: None,
        };
        inner.jobs.insert(id, job.clone());
        Ok(job)
    }

    async fn get(&self, id: JobId) -> Result<Option<Job>, Error> {
        Ok(self.lock().jobs.get(&id).cloned())
    }

    async fn claim_next_pending(&self) -> Result<Option<Job>, Error> {
        let mut inner = self.lock();
        let claimed = inner
            .jobs
            .values_mut()
            .find(|job| job.state == JobState::Pending);
        Ok(claimed.map(|job| {
            job.state = JobState::Processing;
            job.started_at = Some(Utc::now());
            job.clone()
        }))
    }

    async fn mark_completed(
        &self,
        id: JobId,
        dna: String,
        score: i64,
    ) -> Result<Job, Error> {
        let mut inner = self.lock();
        let job = inner.jobs.get_mut(&id).ok_or(Error::NotFound(id))?;
        if job.state != JobState::Processing {
            return Err(Error::InvalidTransition {
                id,
                actual: job.state,
            });
        }
        job.state = JobState::Completed;
        job.dna_sequence = Some(dna);
        job.score = Some(score);
        job.completed_at = Some(Utc::now());
        Ok(job.clone())
    }

    async fn mark_failed(&self, id: JobId, error: JobError) -> Result<Job, Error> {
        let mut inner = self.lock();
        let job = inner.jobs.get_mut(&id).ok_or(Error::NotFound(id))?;
        if job.state != JobState::Processing {
            return Err(Error::InvalidTransition {
                id,
                actual: job.state,
            });
        }
        job.state = JobState::Failed;
        job.error = Some(error);
        job.completed_at = Some(Utc::now());
        Ok(job.clone())
    }

    async fn mark_notified(&self, id: JobId) -> Result<(), Error> {
        let mut inner = self.lock();
        let job = inner.jobs.get_mut(&id).ok_or(Error::NotFound(id))?;
        job.email_sent_at = Some(Utc::now());
        Ok(())
    }

    async fn delete_pending(&self, id: JobId) -> Result<bool, Error> {
        let mut inner = self.lock();
        match inner.jobs.get(&id).map(|job| job.state) {
            Some(JobState::Pending) => {
                inner.jobs.remove(&id);
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(Error::NotFound(id)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use pretty_assertions::assert_eq;

    use crate::exclusion::JobExclusions;
    use crate::jobs::DEFAULT_TARGET_ORGANISM;

    fn new_job(sequence: &str) -> NewJob {
        NewJob {
            protein_sequence: sequence.to_string(),
            protein_name: None,
            target_organism: DEFAULT_TARGET_ORGANISM.to_string(),
            notification_address: None,
            user_id: None,
            exclusions: JobExclusions::default(),
        }
    }

    #[tokio::test]
    async fn claims_oldest_pending_first() {
        let store = MemoryJobStore::new();
        let first = store.insert(new_job("MA")).await.unwrap();
        let second = store.insert(new_job("MQ")).await.unwrap();

        let claimed = store.claim_next_pending().await.unwrap().unwrap();
        assert_eq!(claimed.id, first.id);
        assert_eq!(claimed.state, JobState::Processing);
        assert!(claimed.started_at.is_some());

        let claimed = store.claim_next_pending().await.unwrap().unwrap();
        assert_eq!(claimed.id, second.id);
        assert!(store.claim_next_pending().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn concurrent_claims_never_hand_out_the_same_job() {
        let store = std::sync::Arc::new(MemoryJobStore::new());
        for _ in 0..16 {
            store.insert(new_job("MA")).await.unwrap();
        }
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.claim_next_pending().await.unwrap().unwrap().id
            }));
        }
        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 16);
    }

    #[tokio::test]
    async fn completion_requires_processing_state() {
        let store = MemoryJobStore::new();
        let job = store.insert(new_job("MA")).await.unwrap();
        let err = store
            .mark_completed(job.id, "ATGGCT".into(), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTransition { .. }));

        store.claim_next_pending().await.unwrap().unwrap();
        let done = store.mark_completed(job.id, "ATGGCT".into(), 7).await.unwrap();
        assert_eq!(done.state, JobState::Completed);
        assert_eq!(done.dna_sequence.as_deref(), Some("ATGGCT"));
        assert_eq!(done.score, Some(7));
        assert!(done.completed_at.is_some());

        // Terminal results are immutable.
        let err = store
            .mark_failed(job.id, JobError::TranslationMismatch)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn timestamps_are_monotonic() {
        let store = MemoryJobStore::new();
        let job = store.insert(new_job("MA")).await.unwrap();
        store.claim_next_pending().await.unwrap().unwrap();
        let done = store
            .mark_failed(job.id, JobError::OverConstrained { position: 0 })
            .await
            .unwrap();
        assert!(done.created_at <= done.started_at.unwrap());
        assert!(done.started_at.unwrap() <= done.completed_at.unwrap());
    }

    #[tokio::test]
    async fn delete_pending_only_removes_unclaimed_jobs() {
        let store = MemoryJobStore::new();
        let job = store.insert(new_job("MA")).await.unwrap();
        assert!(store.delete_pending(job.id).await.unwrap());
        assert!(store.get(job.id).await.unwrap().is_none());
        assert!(matches!(
            store.delete_pending(job.id).await.unwrap_err(),
            Error::NotFound(_)
        ));

        let job = store.insert(new_job("MQ")).await.unwrap();
        store.claim_next_pending().await.unwrap().unwrap();
        assert!(!store.delete_pending(job.id).await.unwrap());
    }

    #[tokio::test]
    async fn mark_notified_stamps_the_job() {
        let store = MemoryJobStore::new();
        let job = store.insert(new_job("MA")).await.unwrap();
        store.claim_next_pending().await.unwrap().unwrap();
        store.mark_completed(job.id, "ATGGCT".into(), 0).await.unwrap();
        store.mark_notified(job.id).await.unwrap();
        let job = store.get(job.id).await.unwrap().unwrap();
        assert!(job.email_sent_at.is_some());
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
