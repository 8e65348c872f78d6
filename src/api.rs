//! HTTP client for the PDF variable-extraction service.
//!
//! Two endpoints are consumed. Analysis uploads the PDF as multipart
//! form data and is retried with exponential backoff, because
//! resubmitting the same file is always safe. Refinement posts the
//! user's edited table and is deliberately not retried: silently
//! resubmitting partially-edited data is not safe without the user
//! asking again.

use bytes::Bytes;
use reqwest::{multipart, Client, StatusCode};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::ApiConfig;
use crate::models::{AnalysisResult, RefineRequest, RefineResponse, VariableRecord};
use crate::pdf::SelectedPdf;
use crate::utils::retry::{retry_with_backoff, RetryPolicy};

/// How much of a non-JSON error body is surfaced to the user.
const ERROR_BODY_PREVIEW_CHARS: usize = 100;

/// Multipart field name the analysis endpoint expects.
const PDF_FORM_FIELD: &str = "pdf_file";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response. `detail` is the server's structured detail
    /// message when the body carried one, otherwise a generic line
    /// with a short excerpt of the raw body.
    #[error("{detail}")]
    Status { status: StatusCode, detail: String },

    #[error("Server returned 200 OK, but the response body was empty.")]
    EmptyBody,

    #[error("Failed to parse server response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    analyze_url: String,
    refine_url: String,
    retry: RetryPolicy,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            http,
            analyze_url: config.analyze_url.clone(),
            refine_url: config.refine_url.clone(),
            retry: RetryPolicy::default(),
        })
    }

    /// Override the retry schedule (tests use a zero-delay policy).
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Upload a PDF for analysis, retrying per the client's policy.
    /// `on_attempt` is called with the 0-based attempt index before
    /// each try so the caller can show progress.
    pub async fn analyze_pdf<N>(
        &self,
        pdf: &SelectedPdf,
        mut on_attempt: N,
    ) -> Result<AnalysisResult, ApiError>
    where
        N: FnMut(u32),
    {
        let client = self.http.clone();
        let url = self.analyze_url.clone();
        let filename = pdf.filename.clone();
        let bytes = pdf.bytes.clone();

        let result = retry_with_backoff(self.retry, move |attempt| {
            on_attempt(attempt);
            let client = client.clone();
            let url = url.clone();
            let filename = filename.clone();
            let bytes = bytes.clone();
            Box::pin(async move { post_pdf(client, url, filename, bytes, attempt).await })
        })
        .await?;

        info!(
            "Analysis of {} extracted {} variables",
            result.filename,
            result.variables.len()
        );
        Ok(result)
    }

    /// Send the current table for refinement. Exactly one attempt; the
    /// caller keeps its table untouched on failure.
    pub async fn refine_variables(
        &self,
        document_text: &str,
        current_variables: &[VariableRecord],
    ) -> Result<Vec<VariableRecord>, ApiError> {
        info!(
            "Requesting refinement of {} variables",
            current_variables.len()
        );

        let request = RefineRequest {
            document_text,
            current_variables,
        };

        let response = self
            .http
            .post(&self.refine_url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("Refine endpoint answered {}", status);

        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        if body.is_empty() {
            return Err(ApiError::EmptyBody);
        }

        let parsed: RefineResponse = serde_json::from_str(&body)?;
        Ok(parsed.variables)
    }
}

/// One analysis attempt: multipart POST of the PDF bytes, then decode.
async fn post_pdf(
    client: Client,
    url: String,
    filename: String,
    bytes: Bytes,
    attempt: u32,
) -> Result<AnalysisResult, ApiError> {
    debug!("Uploading {} for analysis (attempt {})", filename, attempt + 1);

    let part = multipart::Part::bytes(bytes.to_vec())
        .file_name(filename)
        .mime_str("application/pdf")?;
    let form = multipart::Form::new().part(PDF_FORM_FIELD, part);

    let response = client.post(&url).multipart(form).send().await?;

    let status = response.status();
    let body = response.text().await?;
    debug!("Analyze endpoint answered {}", status);

    if !status.is_success() {
        return Err(status_error(status, &body));
    }
    if body.is_empty() {
        return Err(ApiError::EmptyBody);
    }

    Ok(serde_json::from_str(&body)?)
}

/// Build the user-facing message for a non-2xx response. The server's
/// `{detail}` field wins when present; a JSON body without one gets a
/// bare status line; anything else gets the status plus a truncated
/// excerpt of the raw body.
fn status_error(status: StatusCode, body: &str) -> ApiError {
    let detail = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value
            .get("detail")
            .and_then(|detail| detail.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP error! Status: {}", status.as_u16())),
        Err(_) => format!(
            "HTTP error! Status: {}. Response: {}",
            status.as_u16(),
            truncate_chars(body, ERROR_BODY_PREVIEW_CHARS)
        ),
    };

    ApiError::Status { status, detail }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
