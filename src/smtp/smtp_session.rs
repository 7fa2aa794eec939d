use std::sync::Arc;

use lettre::{AsyncSmtpTransport, Tokio1Executor, transport::smtp::{PoolConfig, authentication::Credentials}};
use tokio::sync::Mutex;

use crate::smtp::{smtp_credentials::SmtpCredentials, smtp_endpoint::SmtpEndpoint, smtp_error::SmtpError, smtp_mode::SmtpMode};

/// Owns the authenticated transport connection as a scoped resource.
/// The only states are `Disconnected` and `Connected`, a failed connect
/// never leaves a half open session behind.
pub struct SmtpSession {
    state: SessionState,
}

enum SessionState {
    Disconnected,
    Connected(Arc<Mutex<AsyncSmtpTransport<Tokio1Executor>>>),
}

impl SmtpSession {
    pub fn new() -> Self {
        SmtpSession { state: SessionState::Disconnected }
    }

    /// Opens the transport for the endpoint's TLS strategy and authenticates.
    /// The state stays `Disconnected` unless the whole handshake succeeds.
    pub async fn connect(&mut self, credentials: &SmtpCredentials, endpoint: &SmtpEndpoint) -> Result<(), SmtpError> {
        tracing::debug!("connecting to {}:{}", endpoint.host, endpoint.port);
        let transport = Self::build_transport(credentials, endpoint)?;

        match transport.test_connection().await {
            Ok(true) => {
                tracing::info!("connected to {} on port {}", endpoint.host, endpoint.port);
                self.state = SessionState::Connected(Arc::new(Mutex::new(transport)));
                Ok(())
            }
            Ok(false) => Err(SmtpError::Connection {
                host: endpoint.host.clone(),
                port: endpoint.port,
                reason: "server rejected the connection".to_string(),
            }),
            Err(err) => {
                tracing::error!("failed to connect to {}: {}", endpoint.host, err);
                Err(SmtpError::Connection {
                    host: endpoint.host.clone(),
                    port: endpoint.port,
                    reason: err.to_string(),
                })
            }
        }
    }

    /// Closes the session and releases the connection. Shutdown problems are
    /// logged and swallowed, the state always ends `Disconnected`.
    /// Safe to call repeatedly or before `connect` ever ran.
    pub fn disconnect(&mut self) {
        match std::mem::replace(&mut self.state, SessionState::Disconnected) {
            SessionState::Connected(_) => tracing::info!("disconnected from the smtp server"),
            SessionState::Disconnected => tracing::debug!("already disconnected"),
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, SessionState::Connected(_))
    }

    /// Handle to the live transport, `None` while disconnected.
    pub(crate) fn transport(&self) -> Option<Arc<Mutex<AsyncSmtpTransport<Tokio1Executor>>>> {
        match &self.state {
            SessionState::Connected(transport) => Some(transport.clone()),
            SessionState::Disconnected => None,
        }
    }

    fn build_transport(credentials: &SmtpCredentials, endpoint: &SmtpEndpoint) -> Result<AsyncSmtpTransport<Tokio1Executor>, SmtpError> {
        let builder = match endpoint.mode {
            SmtpMode::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&endpoint.host),
            SmtpMode::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&endpoint.host),
            SmtpMode::Plaintext => Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&endpoint.host)),
        }
        .map_err(|err| SmtpError::Connection {
            host: endpoint.host.clone(),
            port: endpoint.port,
            reason: err.to_string(),
        })?;

        // The protocol session does not support interleaved use, a single pooled
        // connection keeps one send on the wire at a time.
        let transport = builder
            .port(endpoint.port)
            .credentials(Credentials::new(credentials.user.clone(), credentials.password.clone()))
            .pool_config(PoolConfig::new().max_size(1))
            .build();
        Ok(transport)
    }
}
