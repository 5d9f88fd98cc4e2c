use std::ops::Deref;

use snafu::ResultExt;
use surrealdb::engine::any::Any;
use surrealdb::opt::auth;
use surrealdb::Surreal;

use crate::config::SurrealConfig;

pub use error::*;

mod error;

/// Schema applied on every connect. Re-running the definitions is a no-op.
const SETUP: &str = include_str!("../../../schema.surrealql");

#[derive(Debug, Clone)]
pub struct Backend {
    database: Surreal<Any>,
}

impl Backend {
    pub async fn connect(config: &SurrealConfig) -> Result<Self> {
        let context = || DatabaseConnectionSnafu {
            url: config.url.to_string(),
            namespace: config.namespace.clone(),
            database: config.database.clone(),
        };

        let database = surrealdb::engine::any::connect(config.url.as_str())
            .await
            .with_context(|_| context())?;

        if let Some(credentials) = &config.credentials {
            database
                .signin(auth::Database {
                    namespace: &config.namespace,
                    database: &config.database,
                    username: &credentials.username,
                    password: &credentials.password,
                })
                .await
                .with_context(|_| context())?;
        }

        database
            .use_ns(&config.namespace)
            .use_db(&config.database)
            .await
            .with_context(|_| context())?;

        database.query(SETUP).await.context(DatabaseQuerySnafu)?;

        Ok(Self { database })
    }

    /// In-memory backend with the schema applied, for tests.
    pub async fn memory() -> Result<Self> {
        let database = surrealdb::engine::any::connect("mem://")
            .await
            .context(DatabaseConnectionSnafu {
                url: "mem://",
                namespace: "test",
                database: "test",
            })?;

        database
            .use_ns("test")
            .use_db("test")
            .await
            .context(DatabaseQuerySnafu)?;

        database.query(SETUP).await.context(DatabaseQuerySnafu)?;

        Ok(Self { database })
    }
}

impl Deref for Backend {
    type Target = Surreal<Any>;

    fn deref(&self) -> &Self::Target {
        &self.database
    }
}

pub mod orm {
    use super::*;
    use snafu::OptionExt;

    pub mod subscribers {
        use super::*;
        use crate::model::Subscriber;

        pub async fn find_by_email(email: &str, db: &Backend) -> Result<Option<Subscriber>> {
            let mut response = db
                .query("SELECT * FROM subscribers WHERE email = $email")
                .bind(("email", email.to_string()))
                .await
                .context(DatabaseQuerySnafu)?;

            let subscribers: Vec<Subscriber> =
                response.take(0).context(DatabaseDeserializeSnafu)?;

            Ok(subscribers.into_iter().next())
        }

        pub async fn create(subscriber: Subscriber, db: &Backend) -> Result<Subscriber> {
            let created: Vec<Subscriber> = db
                .create("subscribers")
                .content(subscriber)
                .await
                .context(DatabaseQuerySnafu)?;

            created.into_iter().next().context(EmptyQuerySnafu)
        }
    }

    pub mod intro_calls {
        use super::*;
        use crate::model::IntroCall;

        pub async fn create(call: IntroCall, db: &Backend) -> Result<IntroCall> {
            let created: Vec<IntroCall> = db
                .create("intro_calls")
                .content(call)
                .await
                .context(DatabaseQuerySnafu)?;

            created.into_iter().next().context(EmptyQuerySnafu)
        }
    }
}
