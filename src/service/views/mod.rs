use std::sync::Arc;

use derive_new::new;
use tracing::instrument;

pub use error::*;
pub use store::*;

mod error;
mod store;

/// The one counter key the site exposes today.
pub const HERO_KEY: &str = "hero";

/// Signatures of automated agents, matched case-insensitively anywhere in
/// the user-agent string. A static table, not a classifier.
const BOT_SIGNATURES: &[&str] = &[
    "bot",
    "crawler",
    "spider",
    "crawling",
    "preview",
    "facebookexternalhit",
    "twitterbot",
    "slackbot",
    "discordbot",
    "whatsapp",
];

pub fn is_bot(user_agent: &str) -> bool {
    let user_agent = user_agent.to_ascii_lowercase();
    BOT_SIGNATURES
        .iter()
        .any(|signature| user_agent.contains(signature))
}

/// Per-request classification inputs, extracted from the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Visit {
    pub user_agent: String,
    pub force: bool,
    pub deduped: bool,
}

/// What the endpoint should do: the count to report and whether to hand the
/// client a dedup cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub count: i64,
    pub set_cookie: bool,
}

/// Decides whether a request increments a view counter.
///
/// Priority order, first match wins: force flag, bot signature, dedup
/// cookie, genuine visit. Only the first and last paths perform the atomic
/// increment; the middle two read (or lazily seed) the counter.
#[derive(Clone, new)]
pub struct ViewAccounting {
    store: Arc<dyn CounterStore>,
    /// Stand-in for views accumulated before the counter existed; replaces
    /// the transient `1` of a freshly created record.
    baseline: i64,
    /// Cookies are only handed out in production, so local runs keep
    /// incrementing on every refresh.
    production: bool,
}

impl ViewAccounting {
    #[instrument(skip(self))]
    pub async fn decide(&self, key: &str, visit: &Visit) -> Result<Decision> {
        if visit.force {
            // Manual recount: skips bot and cookie classification entirely.
            let count = self.increment(key).await?;
            return Ok(Decision {
                count,
                set_cookie: false,
            });
        }

        if is_bot(&visit.user_agent) || visit.deduped {
            let count = self.read_or_seed(key).await?;
            return Ok(Decision {
                count,
                set_cookie: false,
            });
        }

        let count = self.increment(key).await?;
        Ok(Decision {
            count,
            set_cookie: self.production,
        })
    }

    /// Atomic increment-or-create plus the one-time baseline correction.
    ///
    /// The correction is a second, separate write: a concurrent reader can
    /// observe the transient count of 1 before it lands. The counter
    /// self-corrects within one extra write and never regresses afterwards.
    async fn increment(&self, key: &str) -> Result<i64> {
        let counter = self.store.increment(key).await?;

        if counter.count == 1 {
            // The upsert just created the record and counted up from an
            // implicit zero, so this counter was never seeded.
            self.store.set(key, self.baseline).await?;
            return Ok(self.baseline);
        }

        Ok(counter.count)
    }

    /// Read without incrementing; seeds the counter with the baseline when
    /// it does not exist yet, so the endpoint always has a count to report.
    async fn read_or_seed(&self, key: &str) -> Result<i64> {
        match self.store.read(key).await? {
            Some(counter) => Ok(counter.count),
            None => {
                let created = self.store.create(key, self.baseline).await?;
                Ok(created.count)
            }
        }
    }
}
