use lettre::message::Mailbox;

use crate::common::utils;

/// Validated recipient sets for one send cycle.
/// Order is preserved and no role is deduplicated, an address appearing
/// twice receives two delivery attempts.
#[derive(Debug, Clone)]
pub struct SmtpRecipients {
    pub to: Vec<Mailbox>,
    pub cc: Vec<Mailbox>,
    pub bcc: Vec<Mailbox>,
}

impl SmtpRecipients {
    pub fn new() -> Self {
        SmtpRecipients {
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
        }
    }

    /// Replaces all three role sets. Addresses failing the syntax check are
    /// dropped from their role and returned so the caller can react to them.
    pub fn set<T: AsRef<str>>(&mut self, to: &[T], cc: &[T], bcc: &[T]) -> Vec<String> {
        let mut rejected = Vec::new();
        self.to = Self::validate_role(to, "to", &mut rejected);
        self.cc = Self::validate_role(cc, "cc", &mut rejected);
        self.bcc = Self::validate_role(bcc, "bcc", &mut rejected);
        rejected
    }

    fn validate_role<T: AsRef<str>>(addresses: &[T], role: &str, rejected: &mut Vec<String>) -> Vec<Mailbox> {
        let mut valid = Vec::new();
        for address in addresses {
            let address = address.as_ref();
            if !utils::validate_email(address) {
                tracing::warn!("dropping invalid {} address: {}", role, address);
                rejected.push(address.to_string());
                continue;
            }
            match address.parse::<Mailbox>() {
                Ok(mailbox) => valid.push(mailbox),
                Err(err) => {
                    tracing::warn!("dropping unparsable {} address {}: {}", role, address, err);
                    rejected.push(address.to_string());
                }
            }
        }
        valid
    }

    pub fn is_empty(&self) -> bool {
        self.to.is_empty() && self.cc.is_empty() && self.bcc.is_empty()
    }

    /// Flat dispatch target list: to + cc + bcc, concatenated, duplicates kept.
    pub fn targets(&self) -> Vec<Mailbox> {
        self.to.iter().chain(self.cc.iter()).chain(self.bcc.iter()).cloned().collect()
    }
}
