use chrono::{DateTime, Utc};

pub use intro_call::*;
pub use subscriber::*;
pub use view_counter::*;

mod intro_call;
mod subscriber;
mod view_counter;

pub fn now() -> DateTime<Utc> {
    Utc::now()
}
