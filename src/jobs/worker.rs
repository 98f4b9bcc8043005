//! The single-writer job worker.
//!
//! One cooperative loop: claim the oldest PENDING job, compile its exclusion
//! configuration, run the DP optimizer, fall back to beam search on failure,
//! record the terminal state, deliver at most one notification.  Job-local
//! failures never crash the loop; store failures are infrastructure errors
//! that end [`Worker::run`] so a supervisor can restart the process.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, warn};

use super::notify::Notifier;
use super::store::{self, JobStore};
use super::{Job, JobError};
use crate::config::Config;
use crate::exclusion::ExclusionSet;
use crate::optimizer::{self, Optimized, SearchParams};
use crate::scoring::ScoringOracle;

pub struct Worker {
    store: Arc<dyn JobStore>,
    oracle: Arc<ScoringOracle>,
    base_exclusions: Arc<ExclusionSet>,
    notifier: Arc<dyn Notifier>,
    params: SearchParams,
    poll_interval: Duration,
}

impl Worker {
    pub fn new(
        store: Arc<dyn JobStore>,
        oracle: Arc<ScoringOracle>,
        base_exclusions: Arc<ExclusionSet>,
        notifier: Arc<dyn Notifier>,
        config: &Config,
    ) -> Self {
        Self {
            store,
            oracle,
            base_exclusions,
            notifier,
            params: config.search.clone(),
            poll_interval: config.poll_interval,
        }
    }

    /// Polls until `shutdown` flips to `true`.
    ///
    /// An in-flight job is always drained to a terminal state before the loop
    /// exits; the flag is only consulted between jobs.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), store::Error> {
        info!(poll_interval = ?self.poll_interval, "worker started");
        loop {
            if *shutdown.borrow() {
                break;
            }
            match self.store.claim_next_pending().await? {
                Some(job) => self.process(job).await?,
                None => {
                    tokio::select! {
                        _ = tokio::time::sleep(self.poll_interval) => {}
                        _ = shutdown.changed() => {}
                    }
                }
            }
        }
        info!("worker stopped");
        Ok(())
    }

    /// Runs until SIGINT or SIGTERM arrives, then drains and returns.
    pub async fn run_until_signalled(&self) -> Result<(), store::Error> {
        let (trigger, shutdown) = watch::channel(false);
        tokio::spawn(async move {
            wait_for_signal().await;
            let _ = trigger.send(true);
        });
        self.run(shutdown).await
    }

    async fn process(&self, job: Job) -> Result<(), store::Error> {
        let id = job.id;
        info!(
            job = id,
            residues = job.protein_sequence.len(),
            organism = %job.target_organism,
            "processing codon optimization job"
        );
        let recorded = match self.optimize(&job) {
            Ok(result) => {
                info!(
                    job = id,
                    score = result.score,
                    pruned = result.candidates_pruned,
                    elapsed = ?result.elapsed,
                    "optimization complete"
                );
                self.store.mark_completed(id, result.dna, result.score).await?
            }
            Err(job_error) => {
                if job_error == JobError::TranslationMismatch {
                    error!(
                        job = id,
                        "translation mismatch: optimizer produced DNA that does not \
                         encode its protein"
                    );
                } else {
                    warn!(job = id, %job_error, "optimization failed");
                }
                self.store.mark_failed(id, job_error).await?
            }
        };
        self.deliver_notification(&recorded).await;
        Ok(())
    }

    fn optimize(&self, job: &Job) -> Result<Optimized, JobError> {
        let exclusions = self
            .base_exclusions
            .with_job_config(&job.exclusions)
            .map_err(|compile_error| JobError::InternalError {
                message: compile_error.to_string(),
            })?;
        let protein = job.protein_sequence.as_bytes();

        let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
            optimizer::optimize_dp(protein, &self.oracle, &exclusions, &self.params).or_else(
                |dp_error| {
                    warn!(job = job.id, %dp_error, "DP optimizer failed, falling back to beam search");
                    optimizer::optimize_beam(protein, &self.oracle, &exclusions, &self.params)
                },
            )
        }));
        match attempt {
            Ok(result) => result.map_err(JobError::from),
            Err(_) => Err(JobError::InternalError {
                message: "optimizer panicked".to_string(),
            }),
        }
    }

    /// Sends at most one notification for a terminal job.  Delivery failures
    /// are logged and never alter the job state.
    async fn deliver_notification(&self, job: &Job) {
        if job.notification_address.is_none() {
            return;
        }
        match self.notifier.notify(job).await {
            Ok(()) => {
                if let Err(stamp_error) = self.store.mark_notified(job.id).await {
                    warn!(job = job.id, %stamp_error, "could not stamp notification time");
                }
            }
            Err(delivery_error) => {
                warn!(job = job.id, %delivery_error, "notification delivery failed");
            }
        }
    }
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm =
            signal(SignalKind::terminate()).expect("cannot install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
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
