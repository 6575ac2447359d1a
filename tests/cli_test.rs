//! The console front end, run as a subprocess

mod common;

use common::CliContext;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn test_manual_turn_with_unreachable_model() {
    let ctx = CliContext::new("http://127.0.0.1:9");
    let output = ctx.run(
        &["--ephemeral", "--mode", "manual", "--language", "hi-IN"],
        &["रुको"],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "{stdout}");
    assert!(stdout.contains("🔊 [hi-IN] सर्वर से कनेक्शन में समस्या हुई।"), "{stdout}");
    assert!(stdout.contains("MOTION_MOCK_OK"), "{stdout}");
}

#[test]
fn test_rejects_unknown_language() {
    let ctx = CliContext::new("http://127.0.0.1:9");
    let output = ctx.run(&["--ephemeral", "--language", "fr-FR"], &[]);
    assert!(!output.status.success());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_auto_turn_detects_tamil_and_settings_persist() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("language identifier"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"language\": \"ta-IN\"}" }] } }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("தமிழில்"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "நான் நலம்" }] } }]
        })))
        .mount(&server)
        .await;

    let ctx = CliContext::new(&server.uri());
    let output = tokio::task::spawn_blocking(move || {
        let first = ctx.run(
            &["--mode", "auto"],
            &["vanakkam epdi irukinga", ":mode manual", ":lang si-LK"],
        );
        let second = ctx.run(&[], &["ayubowan"]);
        (first, second)
    })
    .await
    .unwrap();

    let first = String::from_utf8_lossy(&output.0.stdout);
    assert!(first.contains("🔊 [ta-IN] நான் நலம்"), "{first}");
    assert!(first.contains("manual mode, si-LK"), "{first}");

    // Settings were saved to the store, so the next run starts in manual Sinhala
    let second = String::from_utf8_lossy(&output.1.stdout);
    assert!(second.contains("[si-LK]"), "{second}");
}
