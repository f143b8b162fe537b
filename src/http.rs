//! HTTP 接口（axum）
//!
//! 路由：
//! - `GET  /api/chess/status`
//! - `POST /api/chess/valid-moves`  `{position, square}`
//! - `POST /api/chess/make-move`    `{position, from, to, promotion?}`
//! - `POST /api/chess/ai-move`      `{position, difficulty?}`
//! - `POST /api/chess/hint`         `{position}`
//!
//! 核心调用是同步的，放在 `spawn_blocking` 里执行。

use crate::ai::Difficulty;
use crate::error::{ChessError, ChessResult};
use crate::service::{parse_promotion, BackendStatus, ChessService, EngineMoveResult, HintResult, MoveOutcome};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

type AppState = Arc<ChessService>;

#[derive(Deserialize, Default)]
pub struct ValidMovesRequest {
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub square: Option<String>,
}

#[derive(Serialize)]
pub struct ValidMovesResponse {
    pub moves: Vec<String>,
}

#[derive(Deserialize, Default)]
pub struct MakeMoveRequest {
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub promotion: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct AiMoveRequest {
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub difficulty: Option<u32>,
}

#[derive(Deserialize, Default)]
pub struct HintRequest {
    #[serde(default)]
    pub position: Option<String>,
}

/// 错误响应：`{"error": "..."}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<ChessError> for ApiError {
    fn from(e: ChessError) -> Self {
        let status = match e {
            ChessError::EngineTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ChessError::EngineUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        };
        ApiError {
            status,
            message: e.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::bad_request(e.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// 非空字段
fn required(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// 在阻塞线程池里执行核心调用
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> ChessResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .map_err(ApiError::from)
}

pub fn router(service: Arc<ChessService>) -> Router {
    Router::new()
        .route("/api/chess/status", get(status))
        .route("/api/chess/valid-moves", post(valid_moves))
        .route("/api/chess/make-move", post(make_move))
        .route("/api/chess/ai-move", post(ai_move))
        .route("/api/chess/hint", post(hint))
        .fallback(not_found)
        .with_state(service)
}

/// 启动 HTTP 服务
pub async fn serve(service: Arc<ChessService>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Chess API listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(service)).await
}

async fn status(State(service): State<AppState>) -> Json<BackendStatus> {
    Json(service.status())
}

async fn valid_moves(
    State(service): State<AppState>,
    payload: Result<Json<ValidMovesRequest>, JsonRejection>,
) -> Result<Json<ValidMovesResponse>, ApiError> {
    let Json(req) = payload?;
    let (fen, square) = match (required(req.position), required(req.square)) {
        (Some(fen), Some(square)) => (fen, square),
        _ => return Err(ApiError::bad_request("Missing position or square")),
    };

    let moves = blocking(move || service.legal_destinations(&fen, &square)).await?;
    Ok(Json(ValidMovesResponse { moves }))
}

async fn make_move(
    State(service): State<AppState>,
    payload: Result<Json<MakeMoveRequest>, JsonRejection>,
) -> Result<Json<MoveOutcome>, ApiError> {
    let Json(req) = payload?;
    let promotion = parse_promotion(req.promotion.as_deref());
    let (fen, from, to) = match (required(req.position), required(req.from), required(req.to)) {
        (Some(fen), Some(from), Some(to)) => (fen, from, to),
        _ => return Err(ApiError::bad_request("Missing required parameters")),
    };

    let result = blocking(move || service.apply_move(&fen, &from, &to, promotion)).await?;
    Ok(Json(result))
}

async fn ai_move(
    State(service): State<AppState>,
    payload: Result<Json<AiMoveRequest>, JsonRejection>,
) -> Result<Json<EngineMoveResult>, ApiError> {
    let Json(req) = payload?;
    let fen = required(req.position).ok_or_else(|| ApiError::bad_request("Missing position"))?;
    let difficulty = req.difficulty.map(Difficulty).unwrap_or_default();

    let result = blocking(move || service.engine_move(&fen, difficulty)).await?;
    Ok(Json(result))
}

async fn hint(
    State(service): State<AppState>,
    payload: Result<Json<HintRequest>, JsonRejection>,
) -> Result<Json<HintResult>, ApiError> {
    let Json(req) = payload?;
    let fen = required(req.position).ok_or_else(|| ApiError::bad_request("Missing position"))?;

    let result = blocking(move || service.hint(&fen)).await?;
    Ok(Json(result))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Endpoint not found" })))
}
