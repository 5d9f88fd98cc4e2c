use std::sync::Arc;

use crate::config::Config;
use crate::service::database::Backend;
use crate::service::github::Github;
use crate::service::indexnow::IndexNow;
use crate::service::mailer::{Mailer, MailerSetup};
use crate::service::views::{SurrealCounterStore, ViewAccounting};

#[derive(Clone)]
pub struct App {
    pub views: ViewAccounting,
    pub database: Backend,
    pub mailer: MailerSetup,
    pub github: Github,
    pub indexnow: IndexNow,
}

pub fn create_app(database: Backend, config: &Config) -> App {
    let store = Arc::new(SurrealCounterStore::new(database.clone()));
    let views = ViewAccounting::new(
        store,
        config.views.baseline,
        config.environment.is_production(),
    );

    let mailer = match Mailer::from_config(&config.smtp) {
        Ok(setup) => setup,
        Err(error) => {
            tracing::warn!(%error, "invalid smtp settings, mail disabled");
            MailerSetup::Unconfigured
        }
    };

    App {
        views,
        database,
        mailer,
        github: Github::new(config.github.token.clone()),
        indexnow: IndexNow::from_config(&config.indexnow),
    }
}
