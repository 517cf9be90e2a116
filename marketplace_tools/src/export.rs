use log::*;
use tokio::time::Instant;

use crate::{
    catalog::{parse_catalog_export, ParsedCatalog},
    data_objects::{ExportJob, JobStatus},
    MarketplaceApi,
    MarketplaceApiError,
};

/// Drives a bulk offer export from job request to parsed catalog.
///
/// The poll loop is the longest wait in a sync run. All waiting happens in `tokio::time::sleep`, so concurrent work
/// in the host process keeps running.
#[derive(Clone)]
pub struct ExportJobRunner {
    api: MarketplaceApi,
}

impl ExportJobRunner {
    pub fn new(api: MarketplaceApi) -> Self {
        Self { api }
    }

    /// Request, poll, download and parse in one go.
    pub async fn run(&self) -> Result<ParsedCatalog, MarketplaceApiError> {
        let job = self.api.request_export().await?;
        let report_id = self.poll_to_completion(&job.job_id).await?;
        self.download_and_parse(&report_id).await
    }

    /// Polls the job until it reaches a terminal state and returns the report id of a successful one.
    ///
    /// `Failure` and `Timeout` reported by the server raise [`MarketplaceApiError::ExportFailed`] with the server's
    /// reason; exceeding the local wall-clock budget raises [`MarketplaceApiError::ExportTimeout`]. Without a
    /// complete catalog snapshot no reconciliation is attempted, so either error aborts the run.
    pub async fn poll_to_completion(&self, job_id: &str) -> Result<String, MarketplaceApiError> {
        let started = Instant::now();
        let budget = self.api.config().max_poll_wait;
        let interval = self.api.config().poll_interval;
        loop {
            let job = self.api.export_status(job_id).await?;
            match job.status {
                JobStatus::Success => {
                    let report_id = job.result_handle().ok_or(MarketplaceApiError::MissingResultHandle)?;
                    info!("📦️ Export job {job_id} completed. Report id: {report_id}");
                    return Ok(report_id);
                },
                JobStatus::Failure | JobStatus::Timeout => {
                    let reason = failure_reason(&job);
                    warn!("📦️ Export job {job_id} ended in {:?}: {reason}", job.status);
                    return Err(MarketplaceApiError::ExportFailed(reason));
                },
                JobStatus::Pending => {
                    trace!("📦️ Export job {job_id} still pending after {:?}", started.elapsed());
                },
            }
            if started.elapsed() >= budget {
                warn!("📦️ Export job {job_id} did not complete within {}s. Aborting.", budget.as_secs());
                return Err(MarketplaceApiError::ExportTimeout { waited_secs: budget.as_secs() });
            }
            tokio::time::sleep(interval).await;
        }
    }

    pub async fn download_and_parse(&self, report_id: &str) -> Result<ParsedCatalog, MarketplaceApiError> {
        let text = self.api.download_export(report_id).await?;
        parse_catalog_export(&text)
    }
}

fn failure_reason(job: &ExportJob) -> String {
    job.error_message
        .clone()
        .unwrap_or_else(|| format!("Job ended as {:?} without a server-reported reason", job.status))
}
