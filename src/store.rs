//! Persistence boundary.
//!
//! `Store` is the authoritative interface the orchestrator depends on to
//! persist a job's status and results. No implementation ships in this
//! crate — wiring it to a concrete database is an integration concern for
//! the caller, not something the orchestrator owns.

use async_trait::async_trait;

use crate::domain::{CompetitorRecord, FeedbackRecord, JobStatus};
use crate::error::Result;

#[async_trait]
pub trait Store: Send + Sync {
    /// Record the job's overall status. `extra` carries whatever
    /// diagnostic payload the caller wants attached (e.g. a short error
    /// string); it has no meaning to the orchestrator itself.
    async fn update_status(&self, job_id: &str, status: JobStatus, extra: &serde_json::Value) -> Result<()>;

    /// Persist competitor records found for a job. May be called once per
    /// source or once for the fully aggregated/deduplicated set,
    /// depending on the caller's batching strategy.
    async fn insert_competitors(&self, job_id: &str, competitors: &[CompetitorRecord]) -> Result<()>;

    /// Persist feedback records found for a job.
    async fn insert_feedback(&self, job_id: &str, feedback: &[FeedbackRecord]) -> Result<()>;

    /// Persist arbitrary job-level metadata (processing time, source
    /// counts, error strings) once the run completes.
    async fn insert_metadata(&self, job_id: &str, metadata: &serde_json::Value) -> Result<()>;
}
