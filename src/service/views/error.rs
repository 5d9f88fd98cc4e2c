use snafu::Snafu;

pub type Result<T, E = ViewError> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(super)))]
pub enum ViewError {
    #[snafu(display("Failed to query the view counter store: {source}"))]
    Store { source: surrealdb::Error },
    #[snafu(display("Failed to deserialize the view counter: {source}"))]
    Deserialize { source: surrealdb::Error },
    #[snafu(display("store returned no record for counter `{key}`"))]
    MissingRecord { key: String },
}
