use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::App;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PingPayload {
    url: String,
}

#[derive(Debug, Serialize)]
pub struct PingResponse {
    success: bool,
}

pub async fn ping(State(app): State<App>, Json(payload): Json<PingPayload>) -> Json<PingResponse> {
    let success = app.indexnow.submit(&payload.url).await;
    Json(PingResponse { success })
}
