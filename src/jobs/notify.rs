//! Delivery of the single completion/failure notification per job.

use async_trait::async_trait;
use serde::Serialize;

use super::{Job, JobState};

pub use self::error::Error;

mod error {
    /// Error type for notification delivery.
    #[derive(thiserror::Error, Debug)]
    pub enum Error {
        #[error("notification transport failure")]
        Transport(#[from] reqwest::Error),
        #[error("notification service rejected the message: HTTP {0}")]
        Rejected(u16),
        #[error("job has no notification address")]
        NoAddress,
        #[error("job is not in a terminal state")]
        NotTerminal,
    }
}

/// Delivery seam.  Implementations must not be relied on for job-state
/// correctness: a failed delivery never rolls back a terminal job.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, job: &Job) -> Result<(), Error>;
}

/// Discards notifications; used when no service is configured.
#[derive(Debug, Default)]
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn notify(&self, _job: &Job) -> Result<(), Error> {
        Ok(())
    }
}

/// The message handed to the notification service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub address: String,
    pub subject: String,
    pub body: String,
}

/// Renders the notification for a terminal job.  Success and failure get
/// distinct subjects and bodies.
pub fn render(job: &Job) -> Result<Message, Error> {
    let address = job
        .notification_address
        .clone()
        .ok_or(Error::NoAddress)?;
    let name = job.protein_name.as_deref().unwrap_or("your protein");
    let message = match job.state {
        JobState::Completed => {
            let dna = job.dna_sequence.as_deref().unwrap_or_default();
            Message {
                address,
                subject: format!("Codon optimization finished: {}", name),
                body: format!(
                    "The optimized coding sequence for {} is ready.\n\n{}\n\nScore: {}\n",
                    name,
                    dna,
                    job.score.unwrap_or_default()
                ),
            }
        }
        JobState::Failed => {
            let reason = job
                .error
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "unknown error".to_string());
            Message {
                address,
                subject: format!("Codon optimization failed: {}", name),
                body: format!(
                    "Optimization of {} did not produce a sequence.\n\nReason: {}\n",
                    name, reason
                ),
            }
        }
        JobState::Pending | JobState::Processing => return Err(Error::NotTerminal),
    };
    Ok(message)
}

/// Posts rendered messages to a notification webhook as JSON.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl WebhookNotifier {
    pub fn new(endpoint: impl Into<String>, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            token,
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, job: &Job) -> Result<(), Error> {
        let message = render(job)?;
        let mut request = self.client.post(&self.endpoint).json(&message);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Error::Rejected(response.status().as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use crate::exclusion::JobExclusions;
    use crate::jobs::{JobError, DEFAULT_TARGET_ORGANISM};

    fn job(state: JobState) -> Job {
        Job {
            id: 9,
            state,
            created_at: Utc::now(),
            started_at: Some(Utc::now()),
            completed_at: Some(Utc::now()),
            protein_sequence: "MA".into(),
            protein_name: Some("mAb heavy chain".into()),
            target_organism: DEFAULT_TARGET_ORGANISM.into(),
            notification_address: Some("lab@example.com".into()),
            user_id: None,
            exclusions: JobExclusions::default(),
            dna_sequence: Some("ATGGCT".into()),
            score: Some(42),
            error: None,
            email_sent_at: None,
        }
    }

    #[test]
    fn success_and_failure_render_differently() {
        let done = render(&job(JobState::Completed)).unwrap();
        assert_eq!(done.address, "lab@example.com");
        assert!(done.subject.contains("finished"));
        assert!(done.body.contains("ATGGCT"));
        assert!(done.body.contains("42"));

        let mut failed_job = job(JobState::Failed);
        failed_job.dna_sequence = None;
        failed_job.error = Some(JobError::OverConstrained { position: 12 });
        let failed = render(&failed_job).unwrap();
        assert!(failed.subject.contains("failed"));
        assert!(failed.body.contains("position 12"));
        assert_ne!(done.subject, failed.subject);
        assert_ne!(done.body, failed.body);
    }

    #[test]
    fn render_requires_an_address_and_a_terminal_state() {
        let mut no_address = job(JobState::Completed);
        no_address.notification_address = None;
        assert!(matches!(render(&no_address), Err(Error::NoAddress)));
        assert!(matches!(
            render(&job(JobState::Processing)),
            Err(Error::NotTerminal)
        ));
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
