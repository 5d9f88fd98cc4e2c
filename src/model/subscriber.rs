use chrono::{DateTime, Utc};
use derive_new::new;
use serde::{Deserialize, Serialize};

use super::now;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, new)]
pub struct Subscriber {
    pub email: String,
    #[new(value = "now()")]
    pub created_at: DateTime<Utc>,
}
