use crate::{common::utils, smtp::{smtp_error::SmtpError, smtp_mode::SmtpMode}};

const PORT_SMTPS: u16 = 465;
const PORT_SUBMISSION: u16 = 587;

const PROVIDERS: [(&str, &str); 6] = [
    ("gmail", "smtp.gmail.com"),
    ("outlook", "smtp-mail.outlook.com"),
    ("office365", "smtp.office365.com"),
    ("yahoo", "smtp.mail.yahoo.com"),
    ("icloud", "smtp.mail.me.com"),
    ("zoho", "smtp.zoho.com"),
];

/// A mail relay endpoint and the TLS strategy used to reach it.
#[derive(Debug, Clone)]
pub struct SmtpEndpoint {
    pub host: String,
    pub port: u16,
    pub mode: SmtpMode,
}

impl SmtpEndpoint {
    /// Looks up a named provider from the catalog, choosing the standard port
    /// for the TLS strategy: 465 for implicit TLS, 587 for `STARTTLS`.
    pub fn resolve<T: AsRef<str>>(provider: T, secure: bool) -> Result<Self, SmtpError> {
        let provider = provider.as_ref();
        let host = PROVIDERS
            .iter()
            .find(|(name, _)| *name == provider)
            .map(|(_, host)| *host)
            .ok_or_else(|| SmtpError::Validation {
                reason: format!("unsupported email provider: {}", provider),
            })?;

        let (port, mode) = match secure {
            true => (PORT_SMTPS, SmtpMode::Tls),
            false => (PORT_SUBMISSION, SmtpMode::StartTls),
        };
        Ok(SmtpEndpoint { host: host.to_string(), port, mode })
    }

    /// Builds an endpoint for any relay outside the catalog.
    /// The host accepts a plain name or `host:port`, where an explicit port wins over `port`.
    pub fn new<T: AsRef<str>>(host: T, port: u16, mode: SmtpMode) -> Result<Self, SmtpError> {
        let (host, port) = utils::parse_host(host.as_ref(), port).map_err(|err| SmtpError::Validation {
            reason: format!("invalid endpoint port: {}", err),
        })?;
        Ok(SmtpEndpoint { host: host.to_string(), port, mode })
    }

    /// Names accepted by [`SmtpEndpoint::resolve`].
    pub fn providers() -> impl Iterator<Item = &'static str> {
        PROVIDERS.iter().map(|(name, _)| *name)
    }
}
