use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use snafu::ResultExt;

use crate::model::Subscriber;
use crate::service::database::orm;

use super::{App, BadRequestSnafu, DatabaseSnafu, Result, EMAIL_REGEX};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SubscribePayload {
    email: String,
}

pub async fn subscribe(
    State(app): State<App>,
    Json(payload): Json<SubscribePayload>,
) -> Result<impl IntoResponse> {
    let email = payload.email.trim().to_string();

    if email.is_empty() {
        return BadRequestSnafu {
            message: "Email is required",
        }
        .fail();
    }

    if !EMAIL_REGEX.is_match(&email) {
        return BadRequestSnafu {
            message: "Invalid email format",
        }
        .fail();
    }

    let existing = orm::subscribers::find_by_email(&email, &app.database)
        .await
        .context(DatabaseSnafu)?;

    if existing.is_some() {
        return BadRequestSnafu {
            message: "Email already subscribed",
        }
        .fail();
    }

    // The unique index backstops a race between the lookup and the insert;
    // the violation maps to the same 400 as the lookup hit.
    orm::subscribers::create(Subscriber::new(email), &app.database)
        .await
        .context(DatabaseSnafu)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Successfully subscribed to newsletter!" })),
    ))
}
