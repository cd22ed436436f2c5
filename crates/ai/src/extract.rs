use crate::{
    AiError, ChatMessage, Result,
    router::{CompletionOptions, ModelRouter, TaskKind},
};

/// Expected top-level shape of the embedded JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    Array,
    Object,
}

impl JsonShape {
    fn brackets(self) -> (char, char) {
        match self {
            JsonShape::Array => ('[', ']'),
            JsonShape::Object => ('{', '}'),
        }
    }

    fn matches(self, value: &serde_json::Value) -> bool {
        match self {
            JsonShape::Array => value.is_array(),
            JsonShape::Object => value.is_object(),
        }
    }
}

/// Find and parse the first balanced top-level JSON value of the expected
/// shape inside free text. Models routinely wrap JSON in prose; this skips
/// the prose.
pub fn extract_json(text: &str, shape: JsonShape) -> Option<serde_json::Value> {
    let (open, close) = shape.brackets();

    for (start, _) in text.char_indices().filter(|(_, c)| *c == open) {
        let Some(len) = balanced_span(&text[start..], open, close) else {
            continue;
        };
        let candidate = &text[start..start + len];
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(candidate) {
            if shape.matches(&value) {
                return Some(value);
            }
        }
    }
    None
}

/// Length of the balanced span starting at the opening bracket, counting only
/// the target bracket kind and skipping string literals.
fn balanced_span(s: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        if c == '"' {
            in_string = true;
        } else if c == open {
            depth += 1;
        } else if c == close {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(i + c.len_utf8());
            }
        }
    }
    None
}

/// Extract JSON from a model reply, with one repair round-trip through a
/// structured-output-specialized backend before giving up.
///
/// Call sites choose what a hard failure means: plan generation aborts,
/// task generation degrades to an empty list.
pub async fn extract_structured(
    router: &ModelRouter,
    text: &str,
    shape: JsonShape,
) -> Result<serde_json::Value> {
    if let Some(value) = extract_json(text, shape) {
        return Ok(value);
    }

    tracing::warn!("primary JSON extraction failed, issuing repair call");
    let shape_hint = match shape {
        JsonShape::Array => "a JSON array",
        JsonShape::Object => "a JSON object",
    };
    let messages = [
        ChatMessage::system(
            "You repair malformed JSON. Respond with only the corrected JSON, no commentary.",
        ),
        ChatMessage::user(format!(
            "The following text should contain {shape_hint} but it does not parse. \
             Return only the corrected JSON:\n\n{text}"
        )),
    ];
    let options = CompletionOptions {
        temperature: 0.0,
        top_p: 1.0,
        ..Default::default()
    };

    let repaired = router
        .complete(&messages, TaskKind::JsonRepair, &options)
        .await
        .map_err(|e| AiError::ExtractionFailed(format!("repair call failed: {e}")))?;

    extract_json(&repaired.content, shape).ok_or_else(|| {
        AiError::ExtractionFailed(format!(
            "no parseable JSON after repair via {}",
            repaired.model_used
        ))
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{Json as AxumJson, Router as AxumRouter, extract::State, routing::post};
    use serde_json::json;

    use super::*;
    use crate::router::ModelBackend;

    async fn canned_completion(
        State(reply): State<&'static str>,
        AxumJson(_): AxumJson<serde_json::Value>,
    ) -> AxumJson<serde_json::Value> {
        AxumJson(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": reply}}],
        }))
    }

    /// Backend that answers every completion with a fixed reply.
    async fn spawn_backend(reply: &'static str) -> String {
        let app = AxumRouter::new()
            .route("/v1/chat/completions", post(canned_completion))
            .with_state(reply);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1/chat/completions")
    }

    fn repair_router(endpoint: String) -> ModelRouter {
        let mut priorities = HashMap::new();
        priorities.insert(
            TaskKind::JsonRepair,
            vec![ModelBackend {
                id: "fixer".to_string(),
                max_tokens: 2048,
            }],
        );
        ModelRouter::with_endpoint(endpoint, None, priorities)
    }

    #[tokio::test]
    async fn repair_round_trip_recovers_broken_json() {
        // Trailing comma defeats primary extraction; the repair backend
        // answers with a corrected array wrapped in prose.
        let endpoint =
            spawn_backend(r#"Here is the fixed JSON: [{"title": "A", "duration": 10}]"#).await;
        let router = repair_router(endpoint);

        let broken = r#"Your tasks: [{"title": "A", "duration": 10,}]"#;
        assert!(extract_json(broken, JsonShape::Array).is_none());

        let value = extract_structured(&router, broken, JsonShape::Array)
            .await
            .expect("repair should recover the array");
        assert_eq!(value, json!([{"title": "A", "duration": 10}]));
    }

    #[tokio::test]
    async fn failed_repair_surfaces_extraction_error() {
        let endpoint = spawn_backend("sorry, I still cannot produce JSON").await;
        let router = repair_router(endpoint);

        let err = extract_structured(&router, "definitely not json", JsonShape::Object)
            .await
            .expect_err("garbage repair output must fail");

        assert!(matches!(err, AiError::ExtractionFailed(_)));
        assert!(err.to_string().contains("no parseable JSON after repair"));
    }

    #[test]
    fn extracts_array_from_prose() {
        let text = r#"Sure! Here are your tasks: [{"title":"A","duration":10}] Hope that helps!"#;
        let value = extract_json(text, JsonShape::Array).unwrap();
        assert_eq!(value, json!([{"title": "A", "duration": 10}]));
    }

    #[test]
    fn extracts_object_skipping_nested_arrays() {
        let text = r#"Plan below.
{"schedule": [{"time": "09:00", "activity": "Standup", "kind": "task"}]}
Enjoy!"#;
        let value = extract_json(text, JsonShape::Object).unwrap();
        assert_eq!(value["schedule"][0]["time"], "09:00");
    }

    #[test]
    fn brackets_inside_strings_do_not_confuse_the_scanner() {
        let text = r#"noise ["a ] tricky [ string", "b"] tail"#;
        let value = extract_json(text, JsonShape::Array).unwrap();
        assert_eq!(value, json!(["a ] tricky [ string", "b"]));
    }

    #[test]
    fn shape_mismatch_is_skipped() {
        // An object is present but we asked for an array.
        assert!(extract_json(r#"{"a": 1}"#, JsonShape::Array).is_none());
    }

    #[test]
    fn unbalanced_text_yields_none() {
        assert!(extract_json("[1, 2, {\"open\": true", JsonShape::Array).is_none());
        assert!(extract_json("no json here at all", JsonShape::Object).is_none());
    }

    #[test]
    fn first_balanced_candidate_wins() {
        let text = r#"[not json] then ["real", "json"]"#;
        // "[not json]" fails to parse, scanner moves on to the next candidate.
        let value = extract_json(text, JsonShape::Array).unwrap();
        assert_eq!(value, json!(["real", "json"]));
    }
}
