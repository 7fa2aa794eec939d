use std::{path::Path, sync::Arc};

use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor, message::Mailbox};
use tokio::{sync::Mutex, task::JoinSet};

use crate::smtp::{
    smtp_attachment::{self, AttachmentStore, ResolvedAttachment, ResolvedInlineImage, SmtpAttachment, SmtpInlineImage},
    smtp_credentials::SmtpCredentials,
    smtp_endpoint::SmtpEndpoint,
    smtp_error::SmtpError,
    smtp_message::{FinalizedMessage, SmtpMessage},
    smtp_recipients::SmtpRecipients,
    smtp_report::{SmtpDispatchEntry, SmtpDispatchReport},
    smtp_session::SmtpSession,
};

/// Composes a multipart mail message and dispatches it to every recipient
/// over a single authenticated SMTP session.
///
/// Each recipient receives its own copy of the message with a personalized
/// `To` header, sends run concurrently within one session.
pub struct SmtpSender {
    credentials: SmtpCredentials,
    endpoint: SmtpEndpoint,
    session: SmtpSession,
    message: Option<SmtpMessage>,
    recipients: SmtpRecipients,
    attachments: Vec<SmtpAttachment>,
    inline_images: Vec<SmtpInlineImage>,
    store: AttachmentStore,
}

impl SmtpSender {
    /// Creates a sender for a named provider from the endpoint catalog.
    /// `secure` selects implicit TLS over the default `STARTTLS` upgrade.
    pub fn new<T: AsRef<str>>(username: T, password: T, provider: T, secure: bool) -> Result<Self, SmtpError> {
        let endpoint = SmtpEndpoint::resolve(provider, secure)?;
        Ok(Self::with_endpoint(username, password, endpoint))
    }

    /// Creates a sender for a relay outside the catalog.
    pub fn with_endpoint<T: AsRef<str>>(username: T, password: T, endpoint: SmtpEndpoint) -> Self {
        SmtpSender {
            credentials: SmtpCredentials {
                user: username.as_ref().to_string(),
                password: password.as_ref().to_string(),
            },
            endpoint,
            session: SmtpSession::new(),
            message: None,
            recipients: SmtpRecipients::new(),
            attachments: Vec::new(),
            inline_images: Vec::new(),
            store: AttachmentStore::new(),
        }
    }

    /// Opens and authenticates the transport session.
    pub async fn connect(&mut self) -> Result<(), SmtpError> {
        self.session.connect(&self.credentials, &self.endpoint).await
    }

    /// Closes the transport session. Never fails and is safe to call at any time.
    pub fn disconnect(&mut self) {
        self.session.disconnect();
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// Composes the message. At least one of the two bodies is required,
    /// the sender address defaults to the login user when absent.
    pub fn set_message<T: AsRef<str>>(&mut self, subject: T, from: Option<T>, plaintext: Option<T>, htmltext: Option<T>) -> Result<(), SmtpError> {
        let from = match &from {
            Some(from) => from.as_ref(),
            None => self.credentials.user.as_str(),
        };
        let message = SmtpMessage::new(
            subject.as_ref(),
            from,
            plaintext.as_ref().map(AsRef::as_ref),
            htmltext.as_ref().map(AsRef::as_ref),
        )?;
        self.message = Some(message);
        Ok(())
    }

    /// Queues a file attachment, the source is read when the message is dispatched.
    pub fn add_attachment<P: AsRef<Path>, T: AsRef<str>>(&mut self, path: P, filename: T) {
        self.attachments.push(SmtpAttachment {
            path: path.as_ref().to_path_buf(),
            filename: filename.as_ref().to_string(),
        });
        tracing::debug!("attachment queued: {}", filename.as_ref());
    }

    /// Queues an inline image for the html body, referenced as `cid:<content_id>`.
    pub fn add_inline_image<P: AsRef<Path>, T: AsRef<str>>(&mut self, path: P, content_id: T, filename: T) {
        self.inline_images.push(SmtpInlineImage {
            path: path.as_ref().to_path_buf(),
            content_id: content_id.as_ref().to_string(),
            filename: filename.as_ref().to_string(),
        });
        tracing::debug!("inline image queued with cid: {}", content_id.as_ref());
    }

    /// Replaces the recipient sets. Addresses failing validation are dropped
    /// from their role and returned.
    pub fn set_recipients<T: AsRef<str>>(&mut self, to: &[T], cc: &[T], bcc: &[T]) -> Vec<String> {
        self.recipients.set(to, cc, bcc)
    }

    /// Sends the message to every recipient in to + cc + bcc and reports the
    /// outcome per recipient. A failed recipient never aborts the others, the
    /// report always holds one entry per target.
    ///
    /// Attachment buffers are resolved once before the first send. Message
    /// copies are built concurrently, the transmits share the single session.
    /// Dropping the returned future cancels in flight sends at task boundaries
    /// and leaves the session in a defined state.
    pub async fn send_all(&mut self) -> Result<SmtpDispatchReport, SmtpError> {
        let transport = self.session.transport().ok_or_else(|| SmtpError::Connection {
            host: self.endpoint.host.clone(),
            port: self.endpoint.port,
            reason: "not connected to any server, connect first".to_string(),
        })?;
        let message = self.message.clone().ok_or_else(|| SmtpError::Message {
            reason: "message not set, set the message before sending".to_string(),
        })?;

        let finalized = Arc::new(self.finalize(&message).await?);
        let recipients = Arc::new(self.recipients.clone());
        let targets = self.recipients.targets();

        let mut join_set: JoinSet<SmtpDispatchEntry> = JoinSet::new();
        for target in targets {
            let transport = transport.clone();
            let finalized = finalized.clone();
            let recipients = recipients.clone();

            join_set.spawn(async move {
                let recipient = target.email.to_string();
                tracing::debug!("sending to {}", recipient);
                let result = Self::send_one(&transport, &finalized, &recipients, &target).await;
                match &result {
                    Ok(_) => tracing::info!("mail sent to {}", recipient),
                    Err(err) => tracing::error!("failed to send to {}: {}", recipient, err),
                }
                SmtpDispatchEntry { recipient, result }
            });
        }

        let mut entries = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(entry) => entries.push(entry),
                Err(err) => tracing::error!("send task failed to run: {}", err),
            }
        }

        let report = SmtpDispatchReport { entries };
        tracing::info!("dispatch finished, {} of {} sent", report.len() - report.failures().count(), report.len());
        Ok(report)
    }

    async fn send_one(
        transport: &Arc<Mutex<AsyncSmtpTransport<Tokio1Executor>>>,
        message: &FinalizedMessage,
        recipients: &SmtpRecipients,
        target: &Mailbox,
    ) -> Result<(), SmtpError> {
        let mail = message.for_recipient(target, &recipients.cc, &recipients.bcc)?;

        // Only the transmit is serialized, message assembly stays concurrent.
        let transport = transport.lock().await;
        match transport.send(mail).await {
            Ok(_) => Ok(()),
            Err(err) => Err(SmtpError::Send {
                recipient: target.email.to_string(),
                source: err,
            }),
        }
    }

    /// Resolves every queued attachment and inline image into shared buffers.
    /// All or nothing, a partial attachment set is never sent.
    async fn finalize(&mut self, message: &SmtpMessage) -> Result<FinalizedMessage, SmtpError> {
        let mut attachments = Vec::with_capacity(self.attachments.len());
        for attachment in &self.attachments {
            let content = self.store.resolve(&attachment.path).await?;
            attachments.push(ResolvedAttachment {
                filename: attachment.filename.clone(),
                content_type: smtp_attachment::octet_stream(),
                content,
            });
        }

        let mut inline_images = Vec::with_capacity(self.inline_images.len());
        for image in &self.inline_images {
            let content = self.store.resolve(&image.path).await?;
            inline_images.push(ResolvedInlineImage {
                content_id: image.content_id.clone(),
                content_type: smtp_attachment::image_content_type(&image.path),
                content,
            });
        }

        Ok(FinalizedMessage {
            subject: message.subject.clone(),
            from: message.from.clone(),
            plaintext: message.plaintext.clone(),
            htmltext: message.htmltext.clone(),
            attachments,
            inline_images,
        })
    }
}
