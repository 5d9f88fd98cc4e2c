use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use snafu::{OptionExt, ResultExt};

use crate::model::{now, CallLocation, IntroCall};
use crate::service::database::orm;

use super::{App, BadRequestSnafu, DatabaseSnafu, Result, EMAIL_REGEX};

static COUNTRY_CODE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+\d{1,4}$").expect("country code pattern compiles")
});

static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4,20}$").expect("phone pattern compiles"));

const DEFAULT_DURATION_MINUTES: i64 = 15;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IntroCallPayload {
    name: String,
    email: String,
    location: String,
    phone_country_code: String,
    phone_number: String,
    notes: Option<String>,
    guests: Vec<String>,
    date: String,
    duration: Option<i64>,
}

pub async fn schedule(
    State(app): State<App>,
    Json(payload): Json<IntroCallPayload>,
) -> Result<impl IntoResponse> {
    let name = payload.name.trim();
    let email = payload.email.trim();
    let date = payload.date.trim();

    if name.is_empty() || email.is_empty() || payload.location.trim().is_empty() || date.is_empty()
    {
        return BadRequestSnafu {
            message: "Missing required fields",
        }
        .fail();
    }

    let location = CallLocation::parse(payload.location.trim()).context(BadRequestSnafu {
        message: "Invalid location",
    })?;

    let phone = match location {
        CallLocation::Phone => {
            let code = payload.phone_country_code.trim();
            let number = payload.phone_number.trim();

            if code.is_empty() || number.is_empty() {
                return BadRequestSnafu {
                    message: "Phone number with country code is required when location is Phone",
                }
                .fail();
            }

            if !COUNTRY_CODE_REGEX.is_match(code) {
                return BadRequestSnafu {
                    message: "Invalid country code",
                }
                .fail();
            }

            if !PHONE_REGEX.is_match(number) {
                return BadRequestSnafu {
                    message: "Invalid phone number",
                }
                .fail();
            }

            Some(format!("{code}{number}"))
        }
        CallLocation::GoogleMeet => None,
    };

    if !EMAIL_REGEX.is_match(email) {
        return BadRequestSnafu {
            message: "Invalid email format",
        }
        .fail();
    }

    let date = DateTime::parse_from_rfc3339(date)
        .ok()
        .context(BadRequestSnafu {
            message: "Invalid date",
        })?
        .with_timezone(&Utc);

    let call = IntroCall {
        name: name.to_string(),
        email: email.to_string(),
        location,
        phone,
        notes: payload.notes,
        guests: payload.guests,
        date,
        duration: payload.duration.unwrap_or(DEFAULT_DURATION_MINUTES),
        created_at: now(),
    };

    let saved = orm::intro_calls::create(call, &app.database)
        .await
        .context(DatabaseSnafu)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Intro call scheduled successfully",
            "data": saved,
        })),
    ))
}
