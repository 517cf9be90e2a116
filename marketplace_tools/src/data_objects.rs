//! Wire shapes for the retailer API.
//!
//! The marketplace has shipped several API revisions with fields appearing and disappearing between them, so every
//! optional field is decoded as `Option`/defaulted here, at the boundary. Nothing downstream should need a fallback.

use serde::{Deserialize, Serialize};
use ssg_common::Ean;

/// Response of the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds. Absent in at least one observed API revision.
    #[serde(default)]
    pub expires_in: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    Pending,
    Success,
    Failure,
    Timeout,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
    #[serde(default)]
    pub method: Option<String>,
}

/// An asynchronous export job as reported by the job-status endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportJob {
    #[serde(rename = "jobId")]
    pub job_id: String,
    pub status: JobStatus,
    #[serde(rename = "errorMessage", default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl ExportJob {
    /// The report id of a successful job, extracted from the `result` link. The href's last path segment is the
    /// identifier accepted by the export-download endpoint.
    pub fn result_handle(&self) -> Option<String> {
        self.links
            .iter()
            .find(|link| link.rel == "result")
            .and_then(|link| link.href.trim_end_matches('/').rsplit('/').next())
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
    }
}

/// One page of the platform warehouse inventory listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryPage {
    #[serde(default)]
    pub inventory: Vec<InventoryEntry>,
}

/// Platform-held stock for one EAN, split by condition. Decisions only ever read the regular subtotal; graded and
/// non-conforming stock cannot be sold as new.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub ean: Ean,
    #[serde(rename = "regularStock", default)]
    pub regular_stock: i64,
    #[serde(rename = "gradedStock", default)]
    pub graded_stock: i64,
    #[serde(rename = "nonConformingStock", default)]
    pub non_conforming_stock: i64,
}

/// Body of the per-offer stock-update endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct StockUpdate {
    pub amount: i64,
    #[serde(rename = "managedByMerchant")]
    pub managed_by_merchant: bool,
}

/// Body of the per-offer fulfilment-update endpoint. `delivery_code` is mandatory for the merchant channel and must
/// be absent for the platform channel.
#[derive(Debug, Clone, Serialize)]
pub struct FulfilmentUpdate {
    pub method: String,
    #[serde(rename = "deliveryCode", skip_serializing_if = "Option::is_none")]
    pub delivery_code: Option<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn result_handle_comes_from_the_result_link() {
        let job: ExportJob = serde_json::from_str(
            r#"{
                "jobId": "job-123",
                "status": "SUCCESS",
                "links": [
                    {"rel": "self", "href": "https://api.example/jobs/job-123"},
                    {"rel": "result", "href": "https://api.example/offers/export/report-77", "method": "GET"}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(job.result_handle().as_deref(), Some("report-77"));
    }

    #[test]
    fn missing_result_link_yields_none() {
        let job: ExportJob = serde_json::from_str(r#"{"jobId": "job-1", "status": "SUCCESS"}"#).unwrap();
        assert!(job.links.is_empty());
        assert!(job.result_handle().is_none());
    }

    #[test]
    fn token_response_tolerates_missing_expiry() {
        let token: TokenResponse = serde_json::from_str(r#"{"access_token": "abc"}"#).unwrap();
        assert_eq!(token.access_token, "abc");
        assert!(token.expires_in.is_none());
        assert!(token.token_type.is_none());
    }

    #[test]
    fn inventory_entries_default_missing_subtotals() {
        let entry: InventoryEntry =
            serde_json::from_str(r#"{"ean": "8712345678906", "regularStock": 4}"#).unwrap();
        assert_eq!(entry.regular_stock, 4);
        assert_eq!(entry.graded_stock, 0);
        assert_eq!(entry.non_conforming_stock, 0);
    }
}
