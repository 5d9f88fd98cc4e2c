use snafu::Snafu;

pub type Result<T, E = GithubError> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(super)))]
pub enum GithubError {
    #[snafu(display("no GitHub token configured"))]
    MissingToken,
    #[snafu(display("GitHub request failed: {source}"))]
    Request { source: reqwest::Error },
    #[snafu(display("GitHub API returned an error: {message}"))]
    Api { message: String },
    #[snafu(display("unexpected response shape from the GitHub API"))]
    MalformedResponse,
    #[snafu(display("could not deserialize the contribution calendar: {source}"))]
    Deserialize { source: serde_json::Error },
}
