use lettre::{Message, message::{Attachment, Mailbox, MultiPart, SinglePart}};

use crate::smtp::{smtp_attachment::{ResolvedAttachment, ResolvedInlineImage}, smtp_error::SmtpError};

/// Canonical message content, immutable once set.
#[derive(Debug, Clone)]
pub struct SmtpMessage {
    pub subject: String,
    pub from: Mailbox,
    pub plaintext: Option<String>,
    pub htmltext: Option<String>,
}

impl SmtpMessage {
    /// A message needs at least one non empty body. Empty strings count as absent.
    pub fn new(subject: &str, from: &str, plaintext: Option<&str>, htmltext: Option<&str>) -> Result<Self, SmtpError> {
        let plaintext = plaintext.filter(|body| !body.is_empty());
        let htmltext = htmltext.filter(|body| !body.is_empty());
        if plaintext.is_none() && htmltext.is_none() {
            return Err(SmtpError::Message {
                reason: "either a plaintext or an html body is required".to_string(),
            });
        }

        let from = from.parse::<Mailbox>().map_err(|err| SmtpError::Validation {
            reason: format!("invalid from address {}: {}", from, err),
        })?;
        Ok(SmtpMessage {
            subject: subject.to_string(),
            from,
            plaintext: plaintext.map(str::to_string),
            htmltext: htmltext.map(str::to_string),
        })
    }
}

/// A message with every attachment buffer resolved, shared across all
/// per recipient builds of one send cycle.
pub(crate) struct FinalizedMessage {
    pub subject: String,
    pub from: Mailbox,
    pub plaintext: Option<String>,
    pub htmltext: Option<String>,
    pub attachments: Vec<ResolvedAttachment>,
    pub inline_images: Vec<ResolvedInlineImage>,
}

impl FinalizedMessage {
    /// Builds the wire message for a single recipient: `To` is the recipient alone,
    /// `Cc` and `Bcc` carry the full canonical sets.
    ///
    /// Part layout is `mixed(related(alternative(plain, html), inline images), attachments)`
    /// with empty containers collapsed. The plain part comes first and the html part
    /// last, mail readers prefer the last alternative.
    pub fn for_recipient(&self, to: &Mailbox, cc: &[Mailbox], bcc: &[Mailbox]) -> Result<Message, SmtpError> {
        let mut builder = Message::builder()
            .subject(self.subject.clone())
            .from(self.from.clone())
            .to(to.clone());
        for mailbox in cc {
            builder = builder.cc(mailbox.clone());
        }
        for mailbox in bcc {
            builder = builder.bcc(mailbox.clone());
        }

        let alternative = match (&self.plaintext, &self.htmltext) {
            (Some(plain), Some(html)) => MultiPart::alternative()
                .singlepart(SinglePart::plain(plain.clone()))
                .singlepart(SinglePart::html(html.clone())),
            (Some(plain), None) => MultiPart::alternative().singlepart(SinglePart::plain(plain.clone())),
            (None, Some(html)) => MultiPart::alternative().singlepart(SinglePart::html(html.clone())),
            (None, None) => {
                return Err(SmtpError::Message {
                    reason: "message has no body content".to_string(),
                });
            }
        };

        let related = match self.inline_images.is_empty() {
            true => alternative,
            false => {
                let mut related = MultiPart::related().multipart(alternative);
                for image in &self.inline_images {
                    let part = Attachment::new_inline(image.content_id.clone())
                        .body(image.content.to_vec(), image.content_type.clone());
                    related = related.singlepart(part);
                }
                related
            }
        };

        let body = match self.attachments.is_empty() {
            true => related,
            false => {
                let mut mixed = MultiPart::mixed().multipart(related);
                for attachment in &self.attachments {
                    let part = Attachment::new(attachment.filename.clone())
                        .body(attachment.content.to_vec(), attachment.content_type.clone());
                    mixed = mixed.singlepart(part);
                }
                mixed
            }
        };

        builder.multipart(body).map_err(|err| SmtpError::Message {
            reason: format!("failed to build message: {}", err),
        })
    }
}
