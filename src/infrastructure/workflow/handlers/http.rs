//! HTTP node: one outbound request with resolved url, headers and body

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::{NodeHandler, NodeServices};
use crate::domain::workflow::{ExecutionContext, HttpNode, WorkflowError};
use crate::infrastructure::http_client::{OutboundBody, OutboundRequest, OutboundResponse};

#[async_trait]
impl NodeHandler for HttpNode {
    async fn handle(
        &self,
        node_id: &str,
        context: &ExecutionContext,
        services: &NodeServices,
    ) -> Result<Value, WorkflowError> {
        let url = context.resolve(&self.url);
        if url.trim().is_empty() {
            return Err(WorkflowError::configuration("HTTP node requires a url"));
        }
        if self.timeout_seconds == 0 {
            return Err(WorkflowError::configuration(
                "HTTP node timeout_seconds must be positive",
            ));
        }

        let timeout = Duration::from_secs(self.timeout_seconds);
        let mut request = OutboundRequest::new(self.method, url, timeout);

        for (name, value) in &self.headers {
            let value = match value {
                Value::String(s) => context.resolve(s),
                Value::Null => continue,
                other => other.to_string(),
            };
            request = request.with_header(name.as_str(), value);
        }

        if let Some(body) = self.body.as_ref().and_then(|b| outbound_body(b, context)) {
            request = request.with_body(body);
        }

        debug!(node_id = %node_id, method = %request.method, url = %request.url, "Sending HTTP request");

        let response = services.http.send(request).await.map_err(|e| {
            if e.is_timeout() {
                WorkflowError::timeout(node_id, timeout.as_millis() as u64)
            } else {
                WorkflowError::request(e.to_string())
            }
        })?;

        Ok(json!({
            "status_code": response.status,
            "headers": response_headers(&response),
            "body": response_body(&response),
        }))
    }
}

/// String bodies are sent as JSON when the resolved text parses, else as text
fn outbound_body(body: &Value, context: &ExecutionContext) -> Option<OutboundBody> {
    match body {
        Value::Null => None,
        Value::String(text) => {
            let resolved = context.resolve(text);
            Some(match serde_json::from_str::<Value>(&resolved) {
                Ok(value) => OutboundBody::Json(value),
                Err(_) => OutboundBody::Text(resolved),
            })
        }
        other => Some(OutboundBody::Json(context.resolve_value(other))),
    }
}

fn response_headers(response: &OutboundResponse) -> Map<String, Value> {
    let mut headers = Map::new();
    for (name, value) in &response.headers {
        match headers.get_mut(name) {
            Some(Value::String(existing)) => {
                existing.push_str(", ");
                existing.push_str(value);
            }
            _ => {
                headers.insert(name.clone(), Value::String(value.clone()));
            }
        }
    }
    headers
}

/// Parse the body as JSON when it looks like JSON, else keep the raw text
fn response_body(response: &OutboundResponse) -> Value {
    let declared_json = response
        .content_type()
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"));

    match serde_json::from_str::<Value>(&response.body) {
        Ok(value) if declared_json || value.is_object() || value.is_array() => value,
        _ => Value::String(response.body.clone()),
    }
}
