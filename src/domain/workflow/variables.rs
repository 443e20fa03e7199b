//! `{...}` reference substitution against an execution context
//!
//! Supported forms:
//! - `{input.<param>}` - an input parameter, looked up by its full key first
//! - `{<node_id>}` - a node's whole output
//! - `{<node_id>.<field>.<field>}` - descent into a node's output objects
//!
//! A reference that cannot be resolved is left in place unchanged.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

use super::context::{ExecutionContext, INPUT_KEY};

static REFERENCE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^{}]+)\}").unwrap());

/// Replace every resolvable `{...}` reference in `text`
pub fn resolve(text: &str, context: &ExecutionContext) -> String {
    if !text.contains('{') {
        return text.to_string();
    }

    REFERENCE_PATTERN
        .replace_all(text, |caps: &Captures| {
            lookup(&caps[1], context).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Apply [`resolve`] to every string leaf of `value`, keeping its shape
pub fn resolve_value(value: &Value, context: &ExecutionContext) -> Value {
    match value {
        Value::String(s) => Value::String(resolve(s, context)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| resolve_value(item, context))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), resolve_value(v, context)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn lookup(path: &str, context: &ExecutionContext) -> Option<String> {
    // Input keys may themselves contain dots, so try the flat key first
    if let Some(param) = path.strip_prefix("input.") {
        if let Some(value) = context.input().get(param).filter(|v| !v.is_null()) {
            return Some(render(value));
        }
    }

    let (root, fields) = match path.split_once('.') {
        Some((root, fields)) => (root, Some(fields)),
        None => (path, None),
    };

    let mut current = if root == INPUT_KEY {
        context.input()
    } else {
        context.get(root)?
    };

    if let Some(fields) = fields {
        for field in fields.split('.') {
            current = current.as_object()?.get(field)?;
        }
    }

    if current.is_null() {
        return None;
    }

    Some(render(current))
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        // Compact JSON for objects and arrays, display form for scalars
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context() -> ExecutionContext {
        let mut ctx = ExecutionContext::new(json!({
            "name": "Ann",
            "count": 3,
            "user.id": "flat-key",
        }));
        ctx.set_output("llm1", json!({"response_text": "hello", "usage_stats": {"total_tokens": 20}}));
        ctx.set_output("plain", json!("just text"));
        ctx.set_output("flag", json!(true));
        ctx.set_output("nothing", Value::Null);
        ctx
    }

    #[test]
    fn test_resolve_input_parameter() {
        assert_eq!(resolve("Hi {input.name}", &context()), "Hi Ann");
    }

    #[test]
    fn test_resolve_input_number() {
        assert_eq!(resolve("n={input.count}", &context()), "n=3");
    }

    #[test]
    fn test_resolve_input_flat_dotted_key() {
        assert_eq!(resolve("{input.user.id}", &context()), "flat-key");
    }

    #[test]
    fn test_resolve_node_field() {
        assert_eq!(resolve("{llm1.response_text}!", &context()), "hello!");
        assert_eq!(resolve("{llm1.usage_stats.total_tokens}", &context()), "20");
    }

    #[test]
    fn test_resolve_whole_node_output() {
        assert_eq!(resolve("{plain}", &context()), "just text");
        assert_eq!(resolve("{flag}", &context()), "true");
        assert_eq!(
            resolve("{llm1}", &context()),
            r#"{"response_text":"hello","usage_stats":{"total_tokens":20}}"#
        );
    }

    #[test]
    fn test_unresolvable_references_left_unchanged() {
        let ctx = context();
        assert_eq!(resolve("Hi {input.missing}", &ctx), "Hi {input.missing}");
        assert_eq!(resolve("{ghost}", &ctx), "{ghost}");
        assert_eq!(resolve("{llm1.absent}", &ctx), "{llm1.absent}");
        assert_eq!(resolve("{plain.field}", &ctx), "{plain.field}");
        assert_eq!(resolve("{nothing}", &ctx), "{nothing}");
    }

    #[test]
    fn test_text_without_references_is_identity() {
        let ctx = context();
        assert_eq!(resolve("no references here", &ctx), "no references here");
        assert_eq!(resolve("", &ctx), "");
        assert_eq!(resolve("{}", &ctx), "{}");
    }

    #[test]
    fn test_json_text_keeps_structure() {
        let ctx = context();
        assert_eq!(
            resolve(r#"{"who": "{input.name}"}"#, &ctx),
            r#"{"who": "Ann"}"#
        );
    }

    #[test]
    fn test_multiple_references() {
        assert_eq!(
            resolve("{input.name} said {llm1.response_text} {input.count} times", &context()),
            "Ann said hello 3 times"
        );
    }

    #[test]
    fn test_resolve_value_recurses_into_strings_only() {
        let value = json!({
            "greeting": "Hi {input.name}",
            "items": ["{plain}", 7, null],
            "nested": {"n": "{input.count}"},
            "flag": false,
        });

        assert_eq!(
            resolve_value(&value, &context()),
            json!({
                "greeting": "Hi Ann",
                "items": ["just text", 7, null],
                "nested": {"n": "3"},
                "flag": false,
            })
        );
    }
}
