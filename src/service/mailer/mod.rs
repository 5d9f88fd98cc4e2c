use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use snafu::ResultExt;

use crate::config::SmtpConfig;

pub use error::*;

mod error;

/// Contact-form submission, already validated by the API layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

/// Outcome of reading the SMTP settings at startup, kept on the app state
/// so the contact endpoint can report what exactly is missing.
#[derive(Clone)]
pub enum MailerSetup {
    Ready(Mailer),
    /// No host/from/to: mail simply is not set up.
    Unconfigured,
    /// One credential half without the other. A config mistake, not a
    /// credential-less relay.
    IncompleteCredentials,
}

impl Mailer {
    /// Builds the mailer when the SMTP settings are complete. Incomplete
    /// settings disable mail instead of failing at startup.
    pub fn from_config(config: &SmtpConfig) -> Result<MailerSetup> {
        let (Some(host), Some(from), Some(to)) = (&config.host, &config.from, &config.to) else {
            return Ok(MailerSetup::Unconfigured);
        };

        if config.username.is_some() != config.password.is_some() {
            tracing::warn!("smtp username and password must be set together, mail disabled");
            return Ok(MailerSetup::IncompleteCredentials);
        }

        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::relay(host).context(TransportSnafu)?;

        if let Some(port) = config.port {
            builder = builder.port(port);
        }

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let mailer = Mailer {
            transport: builder.build(),
            from: parse_mailbox(from)?,
            to: parse_mailbox(to)?,
        };

        Ok(MailerSetup::Ready(mailer))
    }

    pub async fn send_contact(&self, contact: &ContactMessage) -> Result<()> {
        let reply_to = parse_mailbox(&contact.email)?;

        let message = Message::builder()
            .from(self.from.clone())
            .reply_to(reply_to)
            .to(self.to.clone())
            .subject(format!("New message: {}", contact.subject))
            .multipart(MultiPart::alternative_plain_html(
                contact.plain_body(),
                contact.html_body(),
            ))
            .context(BuildSnafu)?;

        self.transport.send(message).await.context(SendSnafu)?;

        Ok(())
    }
}

impl ContactMessage {
    fn plain_body(&self) -> String {
        format!(
            "Name: {}\nEmail: {}\nSubject: {}\n\n{}",
            self.name, self.email, self.subject, self.message
        )
    }

    fn html_body(&self) -> String {
        let name = escape_html(&self.name);
        let email = escape_html(&self.email);
        let subject = escape_html(&self.subject);
        let message = escape_html(&self.message).replace('\n', "<br />");

        format!(
            "<div style=\"font-family: Arial, sans-serif; line-height: 1.6; color: #0f172a;\">\
             <h2 style=\"margin: 0 0 12px;\">New Contact Message</h2>\
             <p><strong>Name:</strong> {name}</p>\
             <p><strong>Email:</strong> {email}</p>\
             <p><strong>Subject:</strong> {subject}</p>\
             <div style=\"margin-top: 16px; padding: 12px; background: #f8fafc; \
             border: 1px solid #e2e8f0;\">{message}</div>\
             </div>"
        )
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address.parse().context(AddressSnafu { address })
}

/// Minimal HTML escape for user input interpolated into the mail body.
pub fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
