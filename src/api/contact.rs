use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use snafu::{OptionExt, ResultExt};

use crate::service::mailer::{ContactMessage, MailerSetup};

use super::{
    App, BadRequestSnafu, MailerCredentialsMissingSnafu, MailerNotConfiguredSnafu, Result,
    SendEmailSnafu, EMAIL_REGEX,
};

const MAX_NAME: usize = 80;
const MAX_EMAIL: usize = 254;
const MAX_SUBJECT: usize = 120;
const MAX_MESSAGE: usize = 4000;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ContactPayload {
    name: String,
    email: String,
    subject: String,
    message: String,
    company: String,
}

pub async fn send(State(app): State<App>, body: String) -> Result<impl IntoResponse> {
    // Body parsed by hand so a malformed payload gets our message instead
    // of the extractor's.
    let payload: ContactPayload = serde_json::from_str(&body).ok().context(BadRequestSnafu {
        message: "Invalid JSON body",
    })?;

    let name = payload.name.trim().to_string();
    let email = payload.email.trim().to_string();
    let subject = payload.subject.trim().to_string();
    let message = payload.message.trim().to_string();

    // Honeypot: bots that fill the hidden field get a success response and
    // no mail.
    if !payload.company.trim().is_empty() {
        return Ok((StatusCode::OK, Json(json!({ "message": "Message sent" }))));
    }

    if name.is_empty() || email.is_empty() || subject.is_empty() || message.is_empty() {
        return BadRequestSnafu {
            message: "Missing required fields",
        }
        .fail();
    }

    if !EMAIL_REGEX.is_match(&email) || has_crlf(&email) {
        return BadRequestSnafu {
            message: "Invalid email",
        }
        .fail();
    }

    if has_crlf(&subject) {
        return BadRequestSnafu {
            message: "Invalid subject",
        }
        .fail();
    }

    if !length_within(&name, 2, MAX_NAME)
        || !length_within(&email, 5, MAX_EMAIL)
        || !length_within(&subject, 3, MAX_SUBJECT)
        || !length_within(&message, 10, MAX_MESSAGE)
    {
        return BadRequestSnafu {
            message: "One or more fields are out of range",
        }
        .fail();
    }

    let mailer = match &app.mailer {
        MailerSetup::Ready(mailer) => mailer,
        MailerSetup::Unconfigured => return MailerNotConfiguredSnafu.fail(),
        MailerSetup::IncompleteCredentials => return MailerCredentialsMissingSnafu.fail(),
    };

    mailer
        .send_contact(&ContactMessage {
            name,
            email,
            subject,
            message,
        })
        .await
        .context(SendEmailSnafu)?;

    Ok((StatusCode::OK, Json(json!({ "message": "Message sent" }))))
}

/// CR or LF in a value destined for a mail header means header injection.
fn has_crlf(value: &str) -> bool {
    value.contains('\r') || value.contains('\n')
}

fn length_within(value: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&value.len())
}
