//! String node

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{NodeHandler, NodeServices};
use crate::domain::workflow::{
    ExecutionContext, FormatArgs, StringNode, StringOperation, WorkflowError,
};

#[async_trait]
impl NodeHandler for StringNode {
    async fn handle(
        &self,
        node_id: &str,
        context: &ExecutionContext,
        _services: &NodeServices,
    ) -> Result<Value, WorkflowError> {
        let input = context.resolve(&self.input_string);

        let result = match &self.operation {
            StringOperation::Concat { strings, separator } => strings
                .iter()
                .map(|s| context.resolve(s))
                .collect::<Vec<_>>()
                .join(separator),
            StringOperation::Replace {
                old_text,
                new_text,
                count,
            } => replace(&input, old_text, new_text, *count),
            StringOperation::Substring { start, end } => substring(&input, *start, *end),
            StringOperation::Format {
                format_string,
                args,
            } => format_template(format_string, &resolve_args(args, context))?,
            StringOperation::Trim => input.trim().to_string(),
            StringOperation::Upper => input.to_uppercase(),
            StringOperation::Lower => input.to_lowercase(),
        };

        debug!(
            node_id = %node_id,
            operation = self.operation.name(),
            result_len = result.len(),
            "String operation finished"
        );

        Ok(json!({ "result": result }))
    }
}

/// Replace up to `count` occurrences; a negative count replaces all
fn replace(input: &str, old_text: &str, new_text: &str, count: i64) -> String {
    match usize::try_from(count) {
        Ok(limit) => input.replacen(old_text, new_text, limit),
        Err(_) => input.replace(old_text, new_text),
    }
}

/// Character slice `[start, end)`; negative offsets count from the end
fn substring(input: &str, start: i64, end: Option<i64>) -> String {
    let len = input.chars().count() as i64;
    let clamp = |offset: i64| {
        if offset < 0 {
            (len + offset).max(0)
        } else {
            offset.min(len)
        }
    };

    let start = clamp(start);
    let end = end.map_or(len, clamp);
    if start >= end {
        return String::new();
    }

    input
        .chars()
        .skip(start as usize)
        .take((end - start) as usize)
        .collect()
}

fn resolve_args(args: &FormatArgs, context: &ExecutionContext) -> FormatArgs {
    match args {
        FormatArgs::Named(map) => FormatArgs::Named(
            map.iter()
                .map(|(k, v)| (k.clone(), resolve_scalar(v, context)))
                .collect(),
        ),
        FormatArgs::Positional(items) => FormatArgs::Positional(
            items.iter().map(|v| resolve_scalar(v, context)).collect(),
        ),
    }
}

fn resolve_scalar(value: &Value, context: &ExecutionContext) -> Value {
    match value {
        Value::String(s) => Value::String(context.resolve(s)),
        other => other.clone(),
    }
}

/// Fill `{name}`, `{}` and `{0}` placeholders; `{{` and `}}` are literal braces
fn format_template(template: &str, args: &FormatArgs) -> Result<String, WorkflowError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    let mut next_auto = 0usize;

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut key = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    key.push(c);
                }
                if !closed {
                    return Err(WorkflowError::configuration(
                        "unmatched '{' in format string",
                    ));
                }
                out.push_str(&lookup_arg(&key, args, &mut next_auto)?);
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => {
                return Err(WorkflowError::configuration(
                    "single '}' encountered in format string",
                ));
            }
            c => out.push(c),
        }
    }

    Ok(out)
}

fn lookup_arg(key: &str, args: &FormatArgs, next_auto: &mut usize) -> Result<String, WorkflowError> {
    let value = if key.is_empty() {
        let index = *next_auto;
        *next_auto += 1;
        positional(args, index)
    } else if let Ok(index) = key.parse::<usize>() {
        positional(args, index)
    } else {
        match args {
            FormatArgs::Named(map) => map.get(key),
            FormatArgs::Positional(_) => None,
        }
    };

    value.map(render).ok_or_else(|| {
        WorkflowError::configuration(format!("missing format argument '{{{}}}'", key))
    })
}

fn positional(args: &FormatArgs, index: usize) -> Option<&Value> {
    match args {
        FormatArgs::Positional(items) => items.get(index),
        FormatArgs::Named(_) => None,
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::workflow::handlers::test_support;
    use serde_json::Map;

    async fn run(operation: StringOperation, input: &str, ctx: &ExecutionContext) -> Result<Value, WorkflowError> {
        StringNode::new(operation, input)
            .handle("s", ctx, &test_support::services())
            .await
    }

    fn named(pairs: Value) -> FormatArgs {
        match pairs {
            Value::Object(map) => FormatArgs::Named(map),
            _ => FormatArgs::Named(Map::new()),
        }
    }

    #[test]
    fn test_replace_count() {
        assert_eq!(replace("aaa", "a", "b", -1), "bbb");
        assert_eq!(replace("aaa", "a", "b", 1), "baa");
        assert_eq!(replace("aaa", "a", "b", 0), "aaa");
        assert_eq!(replace("aaa", "a", "b", -5), "bbb");
    }

    #[test]
    fn test_substring_offsets() {
        assert_eq!(substring("hello world", 0, Some(5)), "hello");
        assert_eq!(substring("hello world", 6, None), "world");
        assert_eq!(substring("hello world", -5, None), "world");
        assert_eq!(substring("hello world", 0, Some(-6)), "hello");
        assert_eq!(substring("hello", 3, Some(1)), "");
        assert_eq!(substring("hello", 10, None), "");
        assert_eq!(substring("hello", -99, Some(2)), "he");
        assert_eq!(substring("héllo", 1, Some(3)), "él");
    }

    #[test]
    fn test_format_named_and_positional() {
        let args = named(json!({"name": "Ada", "n": 3}));
        assert_eq!(format_template("{name} has {n}", &args).unwrap(), "Ada has 3");

        let args = FormatArgs::Positional(vec![json!("a"), json!(true)]);
        assert_eq!(format_template("{} and {}", &args).unwrap(), "a and true");
        assert_eq!(format_template("{1}-{0}", &args).unwrap(), "true-a");
    }

    #[test]
    fn test_format_escapes() {
        let args = named(json!({"x": 1}));
        assert_eq!(format_template("{{x}} = {x}", &args).unwrap(), "{x} = 1");
    }

    #[test]
    fn test_format_errors() {
        let args = named(json!({"x": 1}));
        assert!(matches!(
            format_template("{y}", &args),
            Err(WorkflowError::Configuration(_))
        ));
        assert!(format_template("{x", &args).is_err());
        assert!(format_template("x}", &args).is_err());
        assert!(format_template("{}", &args).is_err());
    }

    #[tokio::test]
    async fn test_input_string_resolved_before_operation() {
        let ctx = ExecutionContext::new(json!({"name": "  ada  "}));

        let output = run(StringOperation::Trim, "{input.name}", &ctx).await.unwrap();
        assert_eq!(output, json!({"result": "ada"}));

        let output = run(StringOperation::Upper, "{input.name}", &ctx).await.unwrap();
        assert_eq!(output["result"], "  ADA  ");

        let output = run(StringOperation::Lower, "MiXeD", &ctx).await.unwrap();
        assert_eq!(output["result"], "mixed");
    }

    #[tokio::test]
    async fn test_concat_resolves_each_string() {
        let mut ctx = ExecutionContext::new(json!({"first": "Ada"}));
        ctx.set_output("llm1", json!({"response_text": "Lovelace"}));

        let op = StringOperation::Concat {
            strings: vec!["{input.first}".into(), "{llm1.response_text}".into()],
            separator: " ".into(),
        };

        let output = run(op, "", &ctx).await.unwrap();
        assert_eq!(output["result"], "Ada Lovelace");
    }

    #[tokio::test]
    async fn test_format_resolves_string_args() {
        let ctx = ExecutionContext::new(json!({"name": "Ada"}));
        let op = StringOperation::Format {
            format_string: "Hello, {who}! You have {count} messages.".into(),
            args: named(json!({"who": "{input.name}", "count": 2})),
        };

        let output = run(op, "", &ctx).await.unwrap();
        assert_eq!(output["result"], "Hello, Ada! You have 2 messages.");
    }

    #[tokio::test]
    async fn test_replace_through_handler() {
        let ctx = ExecutionContext::new(json!({"word": "aaa"}));
        let op = StringOperation::Replace {
            old_text: "a".into(),
            new_text: "b".into(),
            count: 1,
        };

        let output = run(op, "{input.word}", &ctx).await.unwrap();
        assert_eq!(output["result"], "baa");
    }
}
