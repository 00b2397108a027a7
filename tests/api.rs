use axum_test::TestServer;
use serde_json::{json, Value};

use treiglo::content::{load, seed_rows};
use treiglo::db::MemoryStore;
use treiglo::handlers;
use treiglo::state::{AppState, Trainer};

fn server() -> TestServer {
  let trainer = Trainer::new(load(&seed_rows()), Box::new(MemoryStore::new()));
  TestServer::new(handlers::router(AppState::new(trainer))).unwrap()
}

/// Look up the expected answer for a card id in the built-in deck.
fn expected_for(id: &str) -> String {
  load(&seed_rows())
    .into_iter()
    .find(|c| c.id == id)
    .map(|c| c.answer)
    .unwrap_or_default()
}

async fn current_answer(server: &TestServer) -> String {
  let body: Value = server.get("/api/card").await.json();
  let id = body["card"]["id"].as_str().unwrap().to_string();
  expected_for(&id)
}

#[tokio::test]
async fn test_get_card_returns_prompt_without_answer() {
  let server = server();
  let res = server.get("/api/card").await;
  res.assert_status_ok();
  let body: Value = res.json();
  assert!(body["card"]["id"].is_string());
  assert!(body["card"].get("answer").is_none());
  assert_eq!(body["pool"].as_u64().unwrap() as usize, seed_rows().len());
  assert_eq!(body["mode"], "shuffle");
  assert!(body["position"].is_string());
}

#[tokio::test]
async fn test_correct_answer_scores_and_streaks() {
  let server = server();
  let answer = current_answer(&server).await;
  let res = server.post("/api/check").json(&json!({ "guess": answer })).await;
  res.assert_status_ok();
  let body: Value = res.json();
  assert_eq!(body["feedback"]["result"], "correct");
  assert_eq!(body["session"]["done"], 1);
  assert_eq!(body["session"]["correct"], 1);
  assert_eq!(body["session"]["streak"], 1);
  assert_eq!(body["session"]["points"], 10);
}

#[tokio::test]
async fn test_wrong_answer_breaks_streak() {
  let server = server();
  let res = server
    .post("/api/check")
    .json(&json!({ "guess": "hollol anghywir" }))
    .await;
  let body: Value = res.json();
  assert_eq!(body["feedback"]["result"], "wrong");
  assert!(body["feedback"]["expected"].is_string());
  assert_eq!(body["session"]["done"], 1);
  assert_eq!(body["session"]["correct"], 0);
  assert_eq!(body["session"]["streak"], 0);
}

#[tokio::test]
async fn test_double_check_does_not_double_count() {
  let server = server();
  let answer = current_answer(&server).await;
  server.post("/api/check").json(&json!({ "guess": answer })).await;
  let res = server.post("/api/check").json(&json!({ "guess": "eto" })).await;
  let body: Value = res.json();
  assert_eq!(body["feedback"]["result"], "correct");
  assert_eq!(body["session"]["done"], 1);
}

#[tokio::test]
async fn test_reveal_then_correct_gives_no_streak() {
  let server = server();
  let answer = current_answer(&server).await;
  let res = server.post("/api/reveal").await;
  let body: Value = res.json();
  assert_eq!(body["feedback"]["result"], "revealed");
  assert_eq!(body["feedback"]["expected"].as_str().unwrap(), answer);

  let res = server.post("/api/check").json(&json!({ "guess": answer })).await;
  let body: Value = res.json();
  assert_eq!(body["feedback"]["result"], "correct");
  assert_eq!(body["session"]["correct"], 1);
  assert_eq!(body["session"]["streak"], 0);
}

#[tokio::test]
async fn test_skip_counts_and_moves_on() {
  let server = server();
  let before: Value = server.get("/api/card").await.json();
  let res = server.post("/api/skip").await;
  let body: Value = res.json();
  assert_eq!(body["feedback"]["result"], "skipped");
  assert_eq!(body["session"]["done"], 1);
  assert_eq!(body["session"]["correct"], 0);
  assert_ne!(body["card"]["card"]["id"], before["card"]["id"]);
}

#[tokio::test]
async fn test_next_advances() {
  let server = server();
  let before: Value = server.get("/api/card").await.json();
  let after: Value = server.post("/api/next").await.json();
  assert_ne!(before["card"]["id"], after["card"]["id"]);
}

#[tokio::test]
async fn test_family_filter_narrows_pool() {
  let server = server();
  let res = server
    .post("/api/filters")
    .json(&json!({ "families": ["Nasal"] }))
    .await;
  res.assert_status_ok();
  let body: Value = res.json();
  let pool = body["pool"].as_u64().unwrap();
  assert!(pool > 0);
  assert!((pool as usize) < seed_rows().len());

  let res = server.post("/api/filters/clear").await;
  let body: Value = res.json();
  assert_eq!(body["pool"].as_u64().unwrap() as usize, seed_rows().len());
}

#[tokio::test]
async fn test_trigger_query_filter() {
  let server = server();
  let res = server
    .post("/api/filters")
    .json(&json!({ "trigger_query": "i (to)" }))
    .await;
  let body: Value = res.json();
  assert_eq!(body["pool"], 1);

  let card: Value = server.get("/api/card").await.json();
  assert_eq!(card["card"]["trigger"], "i");
}

#[tokio::test]
async fn test_empty_pool_is_not_an_error() {
  let server = server();
  let res = server
    .post("/api/filters")
    .json(&json!({ "categories": ["NoSuchCategory"] }))
    .await;
  res.assert_status_ok();
  let body: Value = res.json();
  assert_eq!(body["pool"], 0);

  let res = server.get("/api/card").await;
  res.assert_status_ok();
  let body: Value = res.json();
  assert!(body["card"].is_null());

  let res = server.post("/api/check").json(&json!({ "guess": "x" })).await;
  res.assert_status_ok();
  let body: Value = res.json();
  assert!(body["feedback"].is_null());
}

#[tokio::test]
async fn test_pack_apply_resets_user_filters() {
  let server = server();
  server
    .post("/api/filters")
    .json(&json!({ "families": ["Nasal"], "nil_only": true }))
    .await;

  let res = server.post("/api/packs/starter-preps").await;
  res.assert_status_ok();

  let body: Value = server.get("/api/filters").await.json();
  assert_eq!(body["filters"]["pack"]["pack_id"], "starter-preps");
  assert_eq!(body["filters"]["families"].as_array().unwrap().len(), 4);
  assert_eq!(body["filters"]["nil_only"], false);
  assert!(body["pool"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_pack_clear_preserves_user_filters() {
  let server = server();
  server.post("/api/packs/starter-preps").await;
  server
    .post("/api/filters")
    .json(&json!({ "families": ["Soft"] }))
    .await;

  server.post("/api/packs/clear").await;
  let body: Value = server.get("/api/filters").await.json();
  assert!(body["filters"]["pack"].is_null());
  assert_eq!(body["filters"]["families"], json!(["Soft"]));
}

#[tokio::test]
async fn test_unknown_pack_is_404() {
  let server = server();
  let res = server.post("/api/packs/dim-byd").await;
  res.assert_status_not_found();
}

#[tokio::test]
async fn test_list_packs_marks_active() {
  let server = server();
  server.post("/api/packs/numbers-1-10").await;
  let body: Value = server.get("/api/packs").await.json();
  let packs = body.as_array().unwrap();
  assert_eq!(packs.len(), 4);
  let active: Vec<&str> = packs
    .iter()
    .filter(|p| p["active"] == true)
    .map(|p| p["id"].as_str().unwrap())
    .collect();
  assert_eq!(active, vec!["numbers-1-10"]);
}

#[tokio::test]
async fn test_mode_switch() {
  let server = server();
  let res = server.post("/api/mode").json(&json!({ "mode": "smart" })).await;
  res.assert_status_ok();
  let body: Value = res.json();
  assert_eq!(body["mode"], "smart");
  assert!(body["position"].is_null());
  assert!(body["card"]["id"].is_string());

  let res = server.post("/api/mode").json(&json!({ "mode": "wibble" })).await;
  res.assert_status_bad_request();
}

#[tokio::test]
async fn test_new_session_resets_counts() {
  let server = server();
  let answer = current_answer(&server).await;
  server.post("/api/check").json(&json!({ "guess": answer })).await;

  let res = server.post("/api/session/new").await;
  let body: Value = res.json();
  assert_eq!(body["done"], 0);
  assert_eq!(body["streak"], 0);

  // Lifetime history survives a new session
  let stats: Value = server.get("/api/stats").await.json();
  assert_eq!(stats["lifetime"]["attempts"], 1);
}

#[tokio::test]
async fn test_reset_streak_keeps_counts() {
  let server = server();
  let answer = current_answer(&server).await;
  server.post("/api/check").json(&json!({ "guess": answer })).await;

  let res = server.post("/api/session/reset-streak").await;
  let body: Value = res.json();
  assert_eq!(body["streak"], 0);
  assert_eq!(body["done"], 1);
  assert_eq!(body["correct"], 1);
}

#[tokio::test]
async fn test_stats_reports_boxes_and_mastery() {
  let server = server();
  let answer = current_answer(&server).await;
  server.post("/api/check").json(&json!({ "guess": answer })).await;

  let body: Value = server.get("/api/stats").await.json();
  let boxes = body["boxes"].as_array().unwrap();
  assert_eq!(boxes.len(), 6);
  // One card promoted to box 2, the rest in box 1
  assert_eq!(boxes[2], 1);
  assert_eq!(boxes[1].as_u64().unwrap() as usize, seed_rows().len() - 1);
  assert_eq!(body["mastered"], 0);
}

#[tokio::test]
async fn test_device_reset_wipes_progress() {
  let server = server();
  let answer = current_answer(&server).await;
  server.post("/api/check").json(&json!({ "guess": answer })).await;
  server.post("/api/packs/articles").await;

  let res = server.post("/api/reset").await;
  res.assert_status_ok();

  let session: Value = server.get("/api/session").await.json();
  assert_eq!(session["done"], 0);
  let stats: Value = server.get("/api/stats").await.json();
  assert_eq!(stats["lifetime"]["attempts"], 0);
  let filters: Value = server.get("/api/filters").await.json();
  assert!(filters["filters"]["pack"].is_null());
}
