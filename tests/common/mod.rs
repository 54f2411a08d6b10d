#![allow(dead_code)]

use serde_json::json;
use wiremock::ResponseTemplate;

pub const API_KEY: &str = "test-api-key";
pub const MODEL: &str = "gpt-4o-mini";

/// Text streamed by `fixtures/chat_stream.sse`.
pub const FIXTURE_TEXT: &str =
    "Sourdough bread rises slowly thanks to wild yeast and lactic acid bacteria.";

/// Load test fixture from file
pub fn load_fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
    std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to load test fixture: {path}"))
}

/// A streamed completion that delivers `text` word by word.
pub fn sse_body(text: &str) -> String {
    let mut body = String::new();
    let mut push = |payload: serde_json::Value| {
        body.push_str(&format!("data: {payload}\n\n"));
    };

    for (i, word) in text.split_inclusive(' ').enumerate() {
        push(json!({
            "object": "chat.completion.chunk",
            "choices": [{"index": 0, "delta": {"content": word}, "finish_reason": null}],
            "seq": i,
        }));
    }
    push(json!({
        "object": "chat.completion.chunk",
        "choices": [{"index": 0, "delta": {}, "finish_reason": "stop"}],
    }));
    push(json!({
        "object": "chat.completion.chunk",
        "choices": [],
        "usage": {"prompt_tokens": 12, "completion_tokens": 40, "total_tokens": 52},
    }));
    body.push_str("data: [DONE]\n\n");
    body
}

pub fn sse_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/event-stream")
        .insert_header("cache-control", "no-cache")
}

pub fn api_error(status: u16, message: &str, code: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "error": {"message": message, "type": "invalid_request_error", "param": null, "code": code}
    }))
}
