//! Intent node: classifies a query into a configured intent

use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::llm::{agent_and_model, call_model};
use super::{NodeHandler, NodeServices};
use crate::domain::llm::LlmRequest;
use crate::domain::workflow::{ExecutionContext, IntentNode, IntentOption, WorkflowError};

#[async_trait]
impl NodeHandler for IntentNode {
    async fn handle(
        &self,
        node_id: &str,
        context: &ExecutionContext,
        services: &NodeServices,
    ) -> Result<Value, WorkflowError> {
        validate_intents(&self.intents)?;

        let (agent, model) = agent_and_model(services, &self.agent_id).await?;
        let query = context.resolve(&self.query);
        if query.trim().is_empty() {
            return Err(WorkflowError::configuration("intent node requires a query"));
        }

        let request = LlmRequest::builder()
            .system(build_system_prompt(&self.intents, agent.system_prompt()))
            .user(query)
            .temperature(0.0)
            .build();

        let response = call_model(services, &model, request, node_id, self.timeout_seconds).await?;
        let response_text = response.content().to_string();

        let (intent, matched) = match match_intent(&response_text, &self.intents) {
            Some(name) => (Some(name.to_string()), true),
            None => (self.default_intent.clone(), false),
        };

        Ok(json!({
            "intent": intent,
            "matched": matched,
            "response_text": response_text,
        }))
    }
}

fn validate_intents(intents: &[IntentOption]) -> Result<(), WorkflowError> {
    if intents.is_empty() {
        return Err(WorkflowError::configuration(
            "intent node requires at least one intent",
        ));
    }

    let mut seen = HashSet::new();
    for intent in intents {
        let name = intent.name.trim();
        if name.is_empty() {
            return Err(WorkflowError::configuration("intent name must not be empty"));
        }
        if !seen.insert(name.to_lowercase()) {
            return Err(WorkflowError::configuration(format!(
                "duplicate intent name: {}",
                name
            )));
        }
    }

    Ok(())
}

fn build_system_prompt(intents: &[IntentOption], persona: Option<&str>) -> String {
    let mut prompt = String::new();
    if let Some(persona) = persona {
        prompt.push_str(persona.trim());
        prompt.push_str("\n\n");
    }

    prompt.push_str(
        "Classify the user's message into exactly one of the following intents.\n\n### Intents\n",
    );
    for intent in intents {
        match intent.description.as_deref() {
            Some(description) => {
                prompt.push_str(&format!("- {}: {}\n", intent.name.trim(), description))
            }
            None => prompt.push_str(&format!("- {}\n", intent.name.trim())),
        }
    }

    prompt.push_str("\n### Output format\nRespond ONLY with the intent name. Do not add any other text.");
    prompt
}

/// Find the intent the model answered with.
///
/// Accepts a bare name (quotes and trailing punctuation ignored), a JSON
/// object with an `intent` field, or free text naming exactly one intent.
fn match_intent<'a>(response: &str, intents: &'a [IntentOption]) -> Option<&'a str> {
    let find = |candidate: &str| {
        intents
            .iter()
            .map(|i| i.name.trim())
            .find(|name| name.eq_ignore_ascii_case(candidate.trim()))
    };

    let bare = response
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '`' || c == '.' || c == '!');
    if let Some(name) = find(bare) {
        return Some(name);
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(response.trim()) {
        if let Some(name) = map.get("intent").and_then(Value::as_str).and_then(find) {
            return Some(name);
        }
    }

    let lowered = response.to_lowercase();
    let mut mentioned = intents
        .iter()
        .map(|i| i.name.trim())
        .filter(|name| lowered.contains(&name.to_lowercase()));

    match (mentioned.next(), mentioned.next()) {
        (Some(name), None) => Some(name),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent::Agent;
    use crate::domain::llm::{MessageRole, MockLlmProvider};
    use crate::domain::model::Model;
    use crate::infrastructure::catalog::InMemoryCatalog;
    use crate::infrastructure::workflow::handlers::test_support;
    use std::sync::Arc;

    fn intents() -> Vec<IntentOption> {
        vec![
            IntentOption::new("refund").with_description("Customer wants money back"),
            IntentOption::new("greeting"),
        ]
    }

    fn services(provider: Arc<MockLlmProvider>) -> NodeServices {
        let catalog = InMemoryCatalog::new()
            .with_agent(
                Agent::new("router", "Router")
                    .with_system_prompt("You route support tickets.")
                    .with_model("m1"),
            )
            .with_model(Model::new("m1", "gpt-4o-mini"));
        test_support::with_llm(
            test_support::with_catalog(test_support::services(), catalog),
            provider,
        )
    }

    fn node() -> IntentNode {
        intents()
            .into_iter()
            .fold(IntentNode::new("router", "{input.text}"), IntentNode::with_intent)
    }

    #[tokio::test]
    async fn test_classifies_query() {
        let provider = Arc::new(MockLlmProvider::new("mock").with_response("Refund"));
        let ctx = ExecutionContext::new(json!({"text": "I want my money back"}));

        let output = node().handle("intent", &ctx, &services(provider.clone())).await.unwrap();

        assert_eq!(
            output,
            json!({"intent": "refund", "matched": true, "response_text": "Refund"})
        );

        let requests = provider.requests();
        let request = &requests[0].1;
        assert_eq!(request.messages[0].role, MessageRole::System);
        assert!(request.messages[0].content.starts_with("You route support tickets."));
        assert!(request.messages[0].content.contains("- refund: Customer wants money back"));
        assert_eq!(request.messages[1].content, "I want my money back");
    }

    #[tokio::test]
    async fn test_unmatched_answer_falls_back_to_default() {
        let provider = Arc::new(MockLlmProvider::new("mock").with_response("weather"));
        let ctx = ExecutionContext::new(json!({"text": "Is it raining?"}));

        let output = node()
            .with_default_intent("other")
            .handle("intent", &ctx, &services(provider))
            .await
            .unwrap();

        assert_eq!(output["intent"], "other");
        assert_eq!(output["matched"], false);
    }

    #[tokio::test]
    async fn test_unmatched_without_default_is_null() {
        let provider = Arc::new(MockLlmProvider::new("mock").with_response("no idea"));
        let ctx = ExecutionContext::new(json!({"text": "?"}));

        let output = node().handle("intent", &ctx, &services(provider)).await.unwrap();

        assert!(output["intent"].is_null());
        assert_eq!(output["matched"], false);
    }

    #[tokio::test]
    async fn test_no_intents_is_configuration_error() {
        let provider = Arc::new(MockLlmProvider::new("mock").with_response("refund"));
        let ctx = ExecutionContext::new(json!({"text": "hi"}));

        let err = IntentNode::new("router", "{input.text}")
            .handle("intent", &ctx, &services(provider.clone()))
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::Configuration(_)));
        assert!(provider.requests().is_empty());
    }

    #[test]
    fn test_duplicate_intents_rejected() {
        let intents = vec![IntentOption::new("refund"), IntentOption::new("Refund")];
        assert!(validate_intents(&intents).is_err());
    }

    #[test]
    fn test_match_intent_forms() {
        let intents = intents();

        assert_eq!(match_intent("greeting", &intents), Some("greeting"));
        assert_eq!(match_intent("  \"GREETING\". ", &intents), Some("greeting"));
        assert_eq!(match_intent(r#"{"intent": "refund"}"#, &intents), Some("refund"));
        assert_eq!(
            match_intent("The intent is refund because of the wording", &intents),
            Some("refund")
        );
        assert_eq!(match_intent("refund or greeting", &intents), None);
        assert_eq!(match_intent("", &intents), None);
    }
}
