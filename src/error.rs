use std::net::SocketAddr;

use snafu::{Location, Snafu};

use crate::service::database::BackendError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ApplicationError {
    /// could not parse the configuration from the environment
    ConfigLoad {
        source: envy::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not connect to the database
    ConnectDatabase {
        source: BackendError,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not serve the application
    WebServer {
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not bind to the given address, check if it's already in use
    BindAddress {
        address: SocketAddr,
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },
}
