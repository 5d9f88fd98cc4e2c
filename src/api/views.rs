use axum::extract::{Query, State};
use axum::http::header::USER_AGENT;
use axum::http::HeaderMap;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::service::views::{Visit, HERO_KEY};

use super::{App, Result, ViewCountSnafu};

/// Client-side marker that this browser was already counted this window.
pub const VIEW_COOKIE: &str = "hero_viewed";
const VIEW_COOKIE_MAX_AGE: time::Duration = time::Duration::hours(24);

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ViewParams {
    force: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ViewCountResponse {
    count: i64,
}

/// GET and POST behave identically; the widget uses whichever fits its
/// fetch call.
pub async fn view_count(
    State(app): State<App>,
    Query(params): Query<ViewParams>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<(CookieJar, Json<ViewCountResponse>)> {
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_string();

    let visit = Visit {
        user_agent,
        force: params.force.as_deref() == Some("1"),
        deduped: jar.get(VIEW_COOKIE).map(|cookie| cookie.value()) == Some("1"),
    };

    let decision = app
        .views
        .decide(HERO_KEY, &visit)
        .await
        .context(ViewCountSnafu)?;

    let jar = if decision.set_cookie {
        jar.add(
            Cookie::build((VIEW_COOKIE, "1"))
                .http_only(true)
                .same_site(SameSite::Lax)
                .path("/")
                .max_age(VIEW_COOKIE_MAX_AGE),
        )
    } else {
        jar
    };

    Ok((
        jar,
        Json(ViewCountResponse {
            count: decision.count,
        }),
    ))
}
