pub mod database;
pub mod github;
pub mod indexnow;
pub mod mailer;
pub mod views;
