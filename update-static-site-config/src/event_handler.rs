use anyhow::Context as _;
use lambda_runtime::{tracing, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cfn_response::{self, CustomResourceResponse};
use crate::site_config::SiteConfig;
use crate::store::ConfigStore;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

/// CloudFormation custom resource event.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct Request {
    pub request_type: RequestType,
    #[serde(default)]
    pub request_id: String,
    #[serde(rename = "ResponseURL")]
    pub response_url: Option<String>,
    pub stack_id: Option<String>,
    pub logical_resource_id: Option<String>,
    pub physical_resource_id: Option<String>,
    pub resource_type: Option<String>,
    pub resource_properties: Option<Map<String, Value>>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct Response {
    resource_properties: Map<String, Value>,
    physical_resource_id: String,
}

/// Long-lived dependencies, built once at cold start.
pub(crate) struct Services<S> {
    pub(crate) store: S,
    pub(crate) http: reqwest::Client,
}

/// The invocation's log stream, or the event's request id outside Lambda.
pub(crate) fn physical_resource_id(log_stream: &str, request_id: &str) -> String {
    if log_stream.is_empty() {
        request_id.to_string()
    } else {
        log_stream.to_string()
    }
}

fn required_str<'a>(properties: &'a Map<String, Value>, name: &str) -> anyhow::Result<&'a str> {
    properties
        .get(name)
        .with_context(|| format!("ResourceProperties is missing {name}"))?
        .as_str()
        .with_context(|| format!("ResourceProperties.{name} must be a string"))
}

async fn apply<S: ConfigStore>(
    store: &S,
    request: &Request,
    physical_resource_id: String,
) -> anyhow::Result<Response> {
    let properties = request
        .resource_properties
        .as_ref()
        .context("event has no ResourceProperties")?;

    let bucket = required_str(properties, "S3Bucket")?;
    let key = required_str(properties, "S3Object")?;

    match request.request_type {
        RequestType::Create | RequestType::Update => {
            let invoke_url = required_str(properties, "RequestRideUrl")?;
            let body = SiteConfig::with_invoke_url(invoke_url).render()?;

            store.put_config(bucket, key, body).await?;
            tracing::info!(bucket, key, invoke_url, "Wrote site config");
        }
        RequestType::Delete => {
            store.delete_config(bucket, key).await?;
            tracing::info!(bucket, key, "Deleted site config");
        }
    }

    Ok(Response {
        resource_properties: properties.clone(),
        physical_resource_id,
    })
}

pub(crate) async fn function_handler<S: ConfigStore>(
    services: &Services<S>,
    event: LambdaEvent<Request>,
) -> Result<Response, Error> {
    let LambdaEvent {
        payload: request,
        context,
        ..
    } = event;
    tracing::info!(
        request_type = ?request.request_type,
        resource_type = request.resource_type.as_deref(),
        ?request,
        "Custom resource event"
    );

    let log_stream = context.env_config.log_stream.as_str();
    let physical_resource_id = physical_resource_id(log_stream, &request.request_id);

    let outcome = apply(&services.store, &request, physical_resource_id.clone()).await;

    if let Some(response_url) = request.response_url.as_deref() {
        let report = match &outcome {
            Ok(response) => CustomResourceResponse::success(
                &request,
                response.physical_resource_id.clone(),
                response.resource_properties.clone(),
                log_stream,
            ),
            Err(error) => CustomResourceResponse::failure(&request, physical_resource_id, error),
        };
        tracing::info!(status = ?report.status, "Reporting to CloudFormation");
        cfn_response::send(&services.http, response_url, &report).await?;
    }

    let response = outcome?;
    tracing::info!(?response, "Response");
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site_config::CONFIG_PREFIX;
    use crate::store::memory::MemoryStore;
    use lambda_runtime::Context;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn services() -> Services<MemoryStore> {
        Services {
            store: MemoryStore::default(),
            http: reqwest::Client::new(),
        }
    }

    fn event(request_type: &str, properties: Value) -> LambdaEvent<Request> {
        let request = serde_json::from_value(json!({
            "RequestType": request_type,
            "RequestId": "request-1",
            "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/wild-rydes/guid",
            "LogicalResourceId": "StaticSiteConfig",
            "ResourceType": "Custom::StaticSiteConfig",
            "ResourceProperties": properties
        }))
        .unwrap();

        LambdaEvent::new(request, Context::default())
    }

    fn properties(url: &str) -> Value {
        json!({
            "ServiceToken": "arn:aws:lambda:us-east-1:123456789012:function:update-static-site-config",
            "RequestRideUrl": url,
            "S3Bucket": "b",
            "S3Object": "o"
        })
    }

    async fn stored_config(store: &MemoryStore) -> Value {
        let body = store.get("b", "o").await.unwrap();
        serde_json::from_str(body.strip_prefix(CONFIG_PREFIX).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn create_writes_config() {
        let services = services();

        let response = function_handler(&services, event("Create", properties("https://x")))
            .await
            .unwrap();

        let config = stored_config(&services.store).await;
        assert_eq!(config["api"]["invokeUrl"], "https://x");
        assert_eq!(config["cognito"]["disabled"], true);

        assert_eq!(response.physical_resource_id, "request-1");
        assert_eq!(Value::Object(response.resource_properties), properties("https://x"));
    }

    #[tokio::test]
    async fn update_overwrites_config() {
        let services = services();

        function_handler(&services, event("Create", properties("https://old")))
            .await
            .unwrap();
        function_handler(&services, event("Update", properties("https://new")))
            .await
            .unwrap();

        let config = stored_config(&services.store).await;
        assert_eq!(config["api"]["invokeUrl"], "https://new");
        assert_eq!(services.store.len().await, 1);
    }

    #[tokio::test]
    async fn delete_removes_config() {
        let services = services();
        function_handler(&services, event("Create", properties("https://x")))
            .await
            .unwrap();

        function_handler(&services, event("Delete", json!({"S3Bucket": "b", "S3Object": "o"})))
            .await
            .unwrap();

        assert_eq!(services.store.get("b", "o").await, None);
    }

    #[tokio::test]
    async fn delete_of_absent_object_succeeds() {
        let services = services();

        let result =
            function_handler(&services, event("Delete", json!({"S3Bucket": "b", "S3Object": "o"})))
                .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn missing_bucket_fails_every_operation() {
        for request_type in ["Create", "Update", "Delete"] {
            let services = services();
            let props = json!({"RequestRideUrl": "https://x", "S3Object": "o"});

            let err = function_handler(&services, event(request_type, props))
                .await
                .unwrap_err();

            assert_eq!(err.to_string(), "ResourceProperties is missing S3Bucket");
            assert_eq!(services.store.len().await, 0);
        }
    }

    #[tokio::test]
    async fn missing_invoke_url_fails_create() {
        let services = services();

        let result =
            function_handler(&services, event("Create", json!({"S3Bucket": "b", "S3Object": "o"})))
                .await;

        assert!(result.is_err());
        assert_eq!(services.store.len().await, 0);
    }

    #[tokio::test]
    async fn non_string_property_fails() {
        let services = services();

        let err = function_handler(
            &services,
            event("Create", json!({"RequestRideUrl": "https://x", "S3Bucket": 7, "S3Object": "o"})),
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "ResourceProperties.S3Bucket must be a string");
    }

    #[tokio::test]
    async fn missing_resource_properties_fails() {
        let services = services();
        let request = serde_json::from_value(json!({
            "RequestType": "Delete",
            "RequestId": "request-1"
        }))
        .unwrap();

        let result = function_handler(&services, LambdaEvent::new(request, Context::default())).await;

        assert!(result.is_err());
    }

    #[test]
    fn unknown_request_type_is_rejected() {
        let result = serde_json::from_value::<Request>(json!({
            "RequestType": "Replace",
            "RequestId": "request-1"
        }));

        assert!(result.is_err());
    }

    #[test]
    fn physical_id_prefers_log_stream() {
        assert_eq!(
            physical_resource_id("2024/01/01/[$LATEST]abc", "request-1"),
            "2024/01/01/[$LATEST]abc"
        );
        assert_eq!(physical_resource_id("", "request-1"), "request-1");
    }

    #[tokio::test]
    async fn reports_success_to_response_url() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/cfn"))
            .and(body_partial_json(json!({
                "Status": "SUCCESS",
                "PhysicalResourceId": "request-1",
                "RequestId": "request-1",
                "LogicalResourceId": "StaticSiteConfig",
                "Data": {"RequestRideUrl": "https://x"}
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let services = services();
        let mut event = event("Create", properties("https://x"));
        event.payload.response_url = Some(format!("{}/cfn", server.uri()));

        function_handler(&services, event).await.unwrap();
    }

    #[tokio::test]
    async fn reports_failure_and_still_fails() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/cfn"))
            .and(body_partial_json(json!({
                "Status": "FAILED",
                "Reason": "ResourceProperties is missing S3Bucket",
                "PhysicalResourceId": "request-1"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let services = services();
        let mut event = event("Update", json!({"RequestRideUrl": "https://x", "S3Object": "o"}));
        event.payload.response_url = Some(format!("{}/cfn", server.uri()));

        assert!(function_handler(&services, event).await.is_err());
    }

    #[tokio::test]
    async fn undeliverable_report_fails_invocation() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let services = services();
        let mut event = event("Create", properties("https://x"));
        event.payload.response_url = Some(server.uri());

        assert!(function_handler(&services, event).await.is_err());
        assert!(services.store.get("b", "o").await.is_some());
    }
}
