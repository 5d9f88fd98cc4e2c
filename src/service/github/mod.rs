use chrono::{Datelike, Duration, NaiveDate, Utc};
use derive_new::new;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use snafu::{OptionExt, ResultExt};

pub use error::*;

mod error;

const GRAPHQL_URL: &str = "https://api.github.com/graphql";

const CALENDAR_QUERY: &str = "\
query($username: String!) {
  user(login: $username) {
    contributionsCollection {
      contributionCalendar {
        totalContributions
        weeks {
          contributionDays {
            date
            contributionCount
            color
          }
        }
      }
    }
  }
}";

const RANGE_QUERY: &str = "\
query($username: String!, $from: DateTime!, $to: DateTime!) {
  user(login: $username) {
    contributionsCollection(from: $from, to: $to) {
      contributionCalendar {
        totalContributions
        weeks {
          contributionDays {
            date
            contributionCount
            color
          }
        }
      }
    }
  }
}";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionDay {
    pub date: String,
    pub contribution_count: i64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionWeek {
    pub contribution_days: Vec<ContributionDay>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionCalendar {
    pub total_contributions: i64,
    pub weeks: Vec<ContributionWeek>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearCalendar {
    pub year: i32,
    #[serde(flatten)]
    pub calendar: ContributionCalendar,
}

#[derive(Debug, Clone, new)]
pub struct Github {
    #[new(value = "reqwest::Client::new()")]
    client: reqwest::Client,
    token: Option<String>,
}

impl Github {
    /// Past year of contributions. Falls back to a mock calendar when the
    /// token is missing or the upstream call fails, so the endpoint never
    /// fails hard.
    pub async fn contributions(&self, username: &str) -> ContributionCalendar {
        match self.fetch(username, None).await {
            Ok(calendar) => calendar,
            Err(error) => {
                tracing::warn!(%username, %error, "falling back to mock contribution data");

                let today = Utc::now().date_naive();
                let mut calendar = mock_calendar(today - Duration::days(365), today);

                // The real calendar is 53 columns wide; trim the leading
                // partial week the grid alignment can introduce.
                if calendar.weeks.len() > 53 {
                    let excess = calendar.weeks.len() - 53;
                    calendar.weeks.drain(..excess);
                }

                calendar
            }
        }
    }

    /// Calendar for a single year, bounded to today for the current year.
    pub async fn contributions_for_year(&self, username: &str, year: i32) -> YearCalendar {
        let (from, to) = year_range(year, Utc::now().date_naive());

        let calendar = match self.fetch(username, Some((from, to))).await {
            Ok(calendar) => calendar,
            Err(error) => {
                tracing::warn!(%username, year, %error, "falling back to mock contribution data");
                mock_calendar(from, to)
            }
        };

        YearCalendar { year, calendar }
    }

    async fn fetch(
        &self,
        username: &str,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<ContributionCalendar> {
        let token = self.token.as_ref().context(MissingTokenSnafu)?;

        let (query, variables) = match range {
            None => (CALENDAR_QUERY, json!({ "username": username })),
            Some((from, to)) => (
                RANGE_QUERY,
                json!({
                    "username": username,
                    "from": format!("{from}T00:00:00Z"),
                    "to": format!("{to}T23:59:59Z"),
                }),
            ),
        };

        let response = self
            .client
            .post(GRAPHQL_URL)
            .bearer_auth(token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .context(RequestSnafu)?;

        let body: serde_json::Value = response.json().await.context(RequestSnafu)?;

        if let Some(errors) = body.get("errors").and_then(|errors| errors.as_array()) {
            let message = errors
                .first()
                .and_then(|error| error.get("message"))
                .and_then(|message| message.as_str())
                .unwrap_or("unknown error")
                .to_string();
            return ApiSnafu { message }.fail();
        }

        let calendar = body
            .pointer("/data/user/contributionsCollection/contributionCalendar")
            .cloned()
            .context(MalformedResponseSnafu)?;

        serde_json::from_value(calendar).context(DeserializeSnafu)
    }
}

fn year_range(year: i32, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let from = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(today);
    let to = if year == today.year() {
        today
    } else {
        NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(today)
    };
    (from, to)
}

/// Plausible-looking calendar for when the real data is unavailable. Counts
/// are random; the shape matches the GraphQL response exactly.
fn mock_calendar(from: NaiveDate, to: NaiveDate) -> ContributionCalendar {
    let mut rng = rand::thread_rng();

    // Align the grid to the Sunday on or before the start of the range.
    let mut day = from - Duration::days(i64::from(from.weekday().num_days_from_sunday()));

    let mut weeks = Vec::new();
    let mut total = 0;

    while day <= to {
        let mut days = Vec::new();

        for _ in 0..7 {
            if day >= from && day <= to {
                let roll: f64 = rng.gen();
                let count: i64 = if roll > 0.95 {
                    rng.gen_range(8..18)
                } else if roll > 0.85 {
                    rng.gen_range(4..9)
                } else if roll > 0.7 {
                    rng.gen_range(1..4)
                } else {
                    0
                };

                total += count;
                days.push(ContributionDay {
                    date: day.to_string(),
                    contribution_count: count,
                    color: if count == 0 { "#161b22" } else { "#39d353" }.to_string(),
                });
            }

            day += Duration::days(1);
        }

        if !days.is_empty() {
            weeks.push(ContributionWeek {
                contribution_days: days,
            });
        }
    }

    ContributionCalendar {
        total_contributions: total,
        weeks,
    }
}
