use axum::extract::{Path, State};
use axum::Json;
use chrono::{Datelike, Utc};
use serde::Serialize;

use crate::service::github::{ContributionCalendar, YearCalendar};

use super::App;

pub async fn contributions(
    State(app): State<App>,
    Path(username): Path<String>,
) -> Json<ContributionCalendar> {
    Json(app.github.contributions(&username).await)
}

#[derive(Debug, Serialize)]
pub struct ContributionYears {
    username: String,
    years: Vec<YearCalendar>,
}

pub async fn contributions_all(
    State(app): State<App>,
    Path(username): Path<String>,
) -> Json<ContributionYears> {
    let current = Utc::now().year();

    // Most recent year first, matching what the heatmap renders.
    let mut years = Vec::new();
    for year in [current, current - 1, current - 2] {
        years.push(app.github.contributions_for_year(&username, year).await);
    }

    Json(ContributionYears { username, years })
}
