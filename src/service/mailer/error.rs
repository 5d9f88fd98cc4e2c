use snafu::Snafu;

pub type Result<T, E = MailerError> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(super)))]
pub enum MailerError {
    #[snafu(display("invalid mail address `{address}`: {source}"))]
    Address {
        address: String,
        source: lettre::address::AddressError,
    },
    #[snafu(display("failed to build the SMTP transport: {source}"))]
    Transport {
        source: lettre::transport::smtp::Error,
    },
    #[snafu(display("failed to assemble the message: {source}"))]
    Build { source: lettre::error::Error },
    #[snafu(display("failed to send the message: {source}"))]
    Send {
        source: lettre::transport::smtp::Error,
    },
}
