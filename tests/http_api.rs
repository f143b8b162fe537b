//! HTTP 接口集成测试
//!
//! 用 Router::oneshot 测试 `/api/chess/*` 路由

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chess_backend::test_positions as tp;
use chess_backend::{http, Board, ChessMove, ChessResult, ChessService, ExternalEngine, ServiceConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tower::ServiceExt;

/// 总是返回固定走法的引擎
struct FixedEngine(&'static str);

impl ExternalEngine for FixedEngine {
    fn name(&self) -> &str {
        "fixed"
    }

    fn best_move(&self, _board: &Board, _budget: Duration) -> ChessResult<ChessMove> {
        Ok(ChessMove::from_uci_str(self.0).unwrap())
    }
}

/// 超时不返回的引擎
struct SlowEngine;

impl ExternalEngine for SlowEngine {
    fn name(&self) -> &str {
        "slow"
    }

    fn best_move(&self, board: &Board, _budget: Duration) -> ChessResult<ChessMove> {
        thread::sleep(Duration::from_secs(2));
        Ok(board.legal_moves()[0])
    }
}

fn basic_router() -> Router {
    http::router(Arc::new(ChessService::default()))
}

fn engine_router(engine: impl ExternalEngine + 'static) -> Router {
    http::router(Arc::new(ChessService::with_engine(
        Arc::new(engine),
        ServiceConfig::basic(),
    )))
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    read(response).await
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    read(response).await
}

async fn read(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    (status, body)
}

#[tokio::test]
async fn test_status_basic() {
    let (status, body) = get(basic_router(), "/api/chess/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "status": "available", "engine": "basic", "version": "1.0" })
    );
}

#[tokio::test]
async fn test_status_with_engine() {
    let (_, body) = get(engine_router(FixedEngine("e2e4")), "/api/chess/status").await;
    assert_eq!(body["engine"], "stockfish");
}

#[tokio::test]
async fn test_valid_moves() {
    let (status, body) = post(
        basic_router(),
        "/api/chess/valid-moves",
        json!({ "position": tp::START, "square": "e2" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "moves": ["e3", "e4"] }));

    let (_, body) = post(
        basic_router(),
        "/api/chess/valid-moves",
        json!({ "position": tp::START, "square": "e4" }),
    )
    .await;
    assert_eq!(body, json!({ "moves": [] }));
}

#[tokio::test]
async fn test_valid_moves_missing_fields() {
    let (status, body) = post(
        basic_router(),
        "/api/chess/valid-moves",
        json!({ "position": tp::START }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing position or square");
}

#[tokio::test]
async fn test_invalid_json_body() {
    let response = basic_router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/chess/hint")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    let (status, body) = read(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_make_move() {
    let (status, body) = post(
        basic_router(),
        "/api/chess/make-move",
        json!({ "position": tp::START, "from": "e2", "to": "e4" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["newPosition"],
        "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
    );
    assert_eq!(body["moveNotation"], "e4");
    assert_eq!(body["isCheck"], false);
    assert_eq!(body["isCheckmate"], false);
    assert_eq!(body["isDraw"], false);
    assert!(body["drawReason"].is_null());
    assert!(body["winner"].is_null());
}

#[tokio::test]
async fn test_make_move_checkmate() {
    let fen = "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2";
    let (status, body) = post(
        basic_router(),
        "/api/chess/make-move",
        json!({ "position": fen, "from": "d8", "to": "h4" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["moveNotation"], "Qh4#");
    assert_eq!(body["isCheckmate"], true);
    assert_eq!(body["winner"], "Black");
}

#[tokio::test]
async fn test_make_move_promotion() {
    let (_, body) = post(
        basic_router(),
        "/api/chess/make-move",
        json!({ "position": tp::PROMOTION, "from": "a7", "to": "a8" }),
    )
    .await;
    assert_eq!(body["moveNotation"], "a8=Q+");

    let (_, body) = post(
        basic_router(),
        "/api/chess/make-move",
        json!({ "position": tp::PROMOTION, "from": "a7", "to": "a8", "promotion": "n" }),
    )
    .await;
    assert_eq!(body["moveNotation"], "a8=N");
}

#[tokio::test]
async fn test_make_move_illegal() {
    let (status, body) = post(
        basic_router(),
        "/api/chess/make-move",
        json!({ "position": tp::START, "from": "e2", "to": "e5" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Illegal move: e2e5");
}

#[tokio::test]
async fn test_make_move_malformed_position() {
    let (status, body) = post(
        basic_router(),
        "/api/chess/make-move",
        json!({ "position": "8/8/8 w", "from": "e2", "to": "e4" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Malformed position"));
}

#[tokio::test]
async fn test_make_move_missing_fields() {
    let (status, body) = post(
        basic_router(),
        "/api/chess/make-move",
        json!({ "position": tp::START, "from": "e2" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required parameters");
}

#[tokio::test]
async fn test_ai_move_basic() {
    let (status, body) = post(
        basic_router(),
        "/api/chess/ai-move",
        json!({ "position": tp::HANGING_ROOK }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["from"], "d1");
    assert_eq!(body["to"], "d5");
    assert_eq!(body["moveNotation"], "Qxd5");
}

#[tokio::test]
async fn test_ai_move_external_engine() {
    let (status, body) = post(
        engine_router(FixedEngine("g1f3")),
        "/api/chess/ai-move",
        json!({ "position": tp::START, "difficulty": 3 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["from"], "g1");
    assert_eq!(body["to"], "f3");
    assert_eq!(body["moveNotation"], "Nf3");
}

#[tokio::test]
async fn test_ai_move_engine_timeout() {
    let (status, body) = post(
        engine_router(SlowEngine),
        "/api/chess/ai-move",
        json!({ "position": tp::START, "difficulty": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert!(body["error"].as_str().unwrap().contains("timed out"));
}

#[tokio::test]
async fn test_ai_move_no_legal_moves() {
    let (status, body) = post(
        basic_router(),
        "/api/chess/ai-move",
        json!({ "position": tp::STALEMATE }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No legal moves available");
}

#[tokio::test]
async fn test_hint() {
    let (status, body) = post(
        basic_router(),
        "/api/chess/hint",
        json!({ "position": tp::HANGING_ROOK }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "hint": "Consider Qxd5", "from": "d1", "to": "d5" })
    );
}

#[tokio::test]
async fn test_hint_unavailable() {
    let (status, body) = post(
        basic_router(),
        "/api/chess/hint",
        json!({ "position": tp::STALEMATE }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "hint": "No hints available", "from": null, "to": null })
    );
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, body) = get(basic_router(), "/api/chess/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Endpoint not found");
}
