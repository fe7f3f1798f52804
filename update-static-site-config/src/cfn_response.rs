//! Reporting custom resource results back to CloudFormation.
//!
//! CloudFormation waits on the pre-signed `ResponseURL` from the event
//! until it receives a response document or the operation times out.

use anyhow::Context;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::event_handler::Request;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub(crate) enum Status {
    Success,
    Failed,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct CustomResourceResponse {
    pub(crate) status: Status,
    pub(crate) reason: String,
    pub(crate) physical_resource_id: String,
    pub(crate) stack_id: Option<String>,
    pub(crate) request_id: String,
    pub(crate) logical_resource_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) data: Option<Map<String, Value>>,
}

impl CustomResourceResponse {
    pub(crate) fn success(
        request: &Request,
        physical_resource_id: String,
        data: Map<String, Value>,
        log_stream: &str,
    ) -> Self {
        Self {
            status: Status::Success,
            reason: format!("See the details in CloudWatch Log Stream: {log_stream}"),
            physical_resource_id,
            stack_id: request.stack_id.clone(),
            request_id: request.request_id.clone(),
            logical_resource_id: request.logical_resource_id.clone(),
            data: Some(data),
        }
    }

    /// An existing physical id from the event wins, so a failed update does
    /// not look like a replacement.
    pub(crate) fn failure(
        request: &Request,
        physical_resource_id: String,
        error: &anyhow::Error,
    ) -> Self {
        Self {
            status: Status::Failed,
            reason: format!("{error:#}"),
            physical_resource_id: request
                .physical_resource_id
                .clone()
                .unwrap_or(physical_resource_id),
            stack_id: request.stack_id.clone(),
            request_id: request.request_id.clone(),
            logical_resource_id: request.logical_resource_id.clone(),
            data: None,
        }
    }
}

/// PUTs the response document. The pre-signed URL is signed without a
/// content type, so the header must be present but empty.
pub(crate) async fn send(
    http: &reqwest::Client,
    response_url: &str,
    response: &CustomResourceResponse,
) -> anyhow::Result<()> {
    let body = serde_json::to_vec(response)?;

    http.put(response_url)
        .header(CONTENT_TYPE, "")
        .body(body)
        .send()
        .await
        .context("failed to send custom resource response")?
        .error_for_status()
        .context("custom resource response was rejected")?;

    Ok(())
}
