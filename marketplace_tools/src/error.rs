use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarketplaceApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not obtain an access token: {0}")]
    Auth(String),
    #[error("Rate limit budget exhausted after {attempts} attempts")]
    RateLimited { attempts: u32 },
    #[error("Marketplace API call failed. Status {status}. {detail}")]
    Api { status: u16, detail: String },
    #[error("HTTP transport error: {0}")]
    Http(String),
    #[error("Could not deserialize JSON: {0}")]
    Json(String),
    #[error("The marketplace returned an empty response where a body was expected")]
    EmptyResponse,
    #[error("The export job failed on the marketplace side: {0}")]
    ExportFailed(String),
    #[error("The export job did not reach a terminal state within {waited_secs}s")]
    ExportTimeout { waited_secs: u64 },
    #[error("The export job succeeded but did not provide a result link")]
    MissingResultHandle,
    #[error("The export is missing required columns: {}", .0.join(", "))]
    MissingRequiredColumns(Vec<String>),
}
