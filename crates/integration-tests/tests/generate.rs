mod harness;

use harness::config::ConfigBuilder;
use harness::mock_elevenlabs::{MockElevenLabs, audio_for};
use harness::server::TestServer;
use serde_json::{Value, json};

const SCRIPT: &str = "The lighthouse keeper climbed the stairs. \
                      Every night the lamp needed fresh oil. \
                      Storms rolled in from the western sea. \
                      Ships passed safely through the narrows.";

async fn start(mock: &MockElevenLabs) -> TestServer {
    let config = ConfigBuilder::new()
        .with_upstream(&mock.base_url())
        .with_slot_key(0, "sk_main")
        .with_budget(20, 45)
        .build();
    TestServer::start(config).await.unwrap()
}

async fn preview(server: &TestServer) -> Vec<String> {
    let body: Value = server
        .post_json("/api/chunks", &json!({ "text": SCRIPT }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    serde_json::from_value(body["chunks"].clone()).unwrap()
}

#[tokio::test]
async fn generation_synthesizes_every_chunk_in_order() {
    let mock = MockElevenLabs::start().await.unwrap();
    let server = start(&mock).await;
    let chunks = preview(&server).await;

    let resp = server
        .post_json("/api/generate", &json!({ "text": SCRIPT, "voiceId": "voice-1" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let report: Value = resp.json().await.unwrap();
    assert_eq!(report["status"], "completed");
    assert_eq!(report["total_parts"], chunks.len());
    assert!(report.get("error").is_none());

    let sent: Vec<String> = mock
        .calls()
        .iter()
        .map(|call| call.body["text"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(sent, chunks);

    let expected_chars: usize = chunks.iter().map(|chunk| chunk.encode_utf16().count()).sum();
    assert_eq!(report["characters_processed"], expected_chars);
}

#[tokio::test]
async fn generation_stops_at_first_failure() {
    let mock = MockElevenLabs::start_failing_at(
        2,
        402,
        json!({ "detail": { "status": "payment_required", "message": "Upgrade required" } }),
    )
    .await
    .unwrap();
    let server = start(&mock).await;
    let chunks = preview(&server).await;
    assert!(chunks.len() >= 3);

    let resp = server
        .post_json("/api/generate", &json!({ "text": SCRIPT, "voiceId": "voice-1" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 402);
    let report: Value = resp.json().await.unwrap();
    assert_eq!(report["status"], "failed");
    assert_eq!(report["total_parts"], chunks.len());
    assert_eq!(report["parts"].as_array().unwrap().len(), 1);
    assert_eq!(report["error"]["part_number"], 2);
    assert_eq!(report["error"]["kind"], "plan_limit");

    // nothing after the failing part reaches upstream
    assert_eq!(mock.calls().len(), 2);

    let id = report["id"].as_str().unwrap();
    let part = server
        .client()
        .get(server.url(&format!("/api/generations/{id}/parts/1")))
        .send()
        .await
        .unwrap();
    assert_eq!(part.status(), 200);

    let missing = server
        .client()
        .get(server.url(&format!("/api/generations/{id}/parts/2")))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);
}

#[tokio::test]
async fn generated_audio_can_be_downloaded() {
    let mock = MockElevenLabs::start().await.unwrap();
    let server = start(&mock).await;
    let chunks = preview(&server).await;

    let report: Value = server
        .post_json("/api/generate", &json!({ "text": SCRIPT, "voiceId": "voice-1" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = report["id"].as_str().unwrap();

    let stored: Value = server
        .client()
        .get(server.url(&format!("/api/generations/{id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stored, report);

    let part = server
        .client()
        .get(server.url(&format!("/api/generations/{id}/parts/1")))
        .send()
        .await
        .unwrap();
    assert_eq!(part.status(), 200);
    assert_eq!(
        part.headers()["content-disposition"],
        "attachment; filename=\"part_1.mp3\""
    );
    assert_eq!(part.bytes().await.unwrap().as_ref(), audio_for(&chunks[0]).as_slice());

    let full = server
        .client()
        .get(server.url(&format!("/api/generations/{id}/audio")))
        .send()
        .await
        .unwrap();
    assert_eq!(full.status(), 200);
    let expected: Vec<u8> = chunks.iter().flat_map(|chunk| audio_for(chunk)).collect();
    assert_eq!(full.bytes().await.unwrap().as_ref(), expected.as_slice());
}

#[tokio::test]
async fn generation_validates_input() {
    let mock = MockElevenLabs::start().await.unwrap();
    let server = start(&mock).await;

    let resp = server
        .post_json("/api/generate", &json!({ "text": "   ", "voiceId": "voice-1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "No text entered");

    let resp = server
        .post_json("/api/generate", &json!({ "text": SCRIPT }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Missing voiceId");

    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn unknown_generation_is_not_found() {
    let mock = MockElevenLabs::start().await.unwrap();
    let server = start(&mock).await;

    let resp = server
        .client()
        .get(server.url("/api/generations/does-not-exist"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Generation not found");
}
