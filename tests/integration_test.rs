//! Integration tests using the DiceTest harness

mod common;

use common::DiceTest;
use dicecream::dice::RollMode;
use dicecream::Config;
use serde_json::{json, Value};

#[tokio::test]
async fn test_server_starts_and_stops() {
    let dice = DiceTest::start().await.expect("Failed to start server");
    // Server shuts down automatically when dice is dropped
    drop(dice);
}

#[tokio::test]
async fn test_health_endpoint() {
    let dice = DiceTest::start().await.expect("Failed to start server");

    let resp = dice.get("/health").await.expect("Failed to get health");
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["heaps"], 1);
}

#[tokio::test]
async fn test_root_endpoint() {
    let dice = DiceTest::start().await.expect("Failed to start server");

    let resp = dice.get("/").await.expect("Failed to get root");
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["name"], "dicecream");
}

#[tokio::test]
async fn test_pool_scenario() {
    let dice = DiceTest::start().await.expect("Failed to start server");

    let body: Value = dice.get("/pool").await.unwrap().json().await.unwrap();
    assert_eq!(body["descriptor"], "1d6");

    let resp = dice
        .post("/pool/heaps", &json!({"count": 3, "facets": 10}))
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["descriptor"], "1d6+3d10");

    let body: Value = dice.delete("/pool/heaps/6").await.unwrap().json().await.unwrap();
    assert_eq!(body["removed"], true);
    assert_eq!(body["pool"]["descriptor"], "3d10");

    // Last heap stays
    let body: Value = dice.delete("/pool/heaps/10").await.unwrap().json().await.unwrap();
    assert_eq!(body["removed"], false);
    assert_eq!(dice.pool().lock().describe_all(), "3d10");
}

#[tokio::test]
async fn test_roll_all_matches_heaps() {
    let dice = DiceTest::start().await.expect("Failed to start server");
    dice.post("/pool/heaps", &json!({"count": 4, "facets": 20}))
        .await
        .unwrap();

    let body: Value = dice.post_empty("/pool/roll").await.unwrap().json().await.unwrap();
    let total = body["total"].as_u64().unwrap();
    assert!((5..=86).contains(&total));

    let pool = dice.pool();
    let pool = pool.lock();
    assert_eq!(pool.last_total(), total);
    assert_eq!(pool.heap(20).unwrap().outcomes().len(), 4);
}

#[tokio::test]
async fn test_single_heap_roll_leaves_others() {
    let dice = DiceTest::start().await.expect("Failed to start server");
    dice.post("/pool/heaps", &json!({"count": 2, "facets": 8}))
        .await
        .unwrap();

    let resp = dice.post_empty("/pool/heaps/8/roll").await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["descriptor"], "2d8");
    assert_eq!(body["outcomes"].as_array().unwrap().len(), 2);

    let pool = dice.pool();
    assert!(pool.lock().heap(6).unwrap().outcomes().is_empty());
}

#[tokio::test]
async fn test_errors() {
    let dice = DiceTest::start().await.expect("Failed to start server");

    let resp = dice
        .post("/pool/heaps", &json!({"count": 2, "facets": 0}))
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = dice
        .post("/pool/heaps/12/dice", &json!({"delta": 1}))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "no heap of d12 in the pool");
}

#[tokio::test]
async fn test_configured_pool_and_seed() {
    let config = Config {
        seed: Some(77),
        default_pool: "2d4+d12".to_string(),
        ..Config::default()
    };
    let first = DiceTest::start_with(config.clone()).await.unwrap();
    let second = DiceTest::start_with(config).await.unwrap();

    let a: Value = first.post_empty("/pool/roll").await.unwrap().json().await.unwrap();
    let b: Value = second.post_empty("/pool/roll").await.unwrap().json().await.unwrap();

    assert_eq!(a["descriptor"], "2d4+1d12");
    assert_eq!(a["total"], b["total"]);
    assert_eq!(a["heaps"], b["heaps"]);
}

#[tokio::test]
async fn test_legacy_mode_excludes_highest_face() {
    let config = Config {
        seed: Some(5),
        default_pool: "50d4".to_string(),
        roll_mode: RollMode::Legacy,
        ..Config::default()
    };
    let dice = DiceTest::start_with(config).await.unwrap();

    let body: Value = dice.post_empty("/pool/roll").await.unwrap().json().await.unwrap();
    let outcomes = body["heaps"][0]["outcomes"].as_array().unwrap();
    assert_eq!(outcomes.len(), 50);
    assert!(outcomes.iter().all(|d| (1..=3).contains(&d.as_u64().unwrap())));
}

#[tokio::test]
async fn test_invalid_default_pool_fails_startup() {
    let config = Config {
        default_pool: "six dice".to_string(),
        ..Config::default()
    };
    assert!(dicecream::Server::new(config).is_err());
}
