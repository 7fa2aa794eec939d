use crate::smtp::smtp_error::SmtpError;

/// Outcome of one send cycle, exactly one entry per dispatch target.
/// Entry order follows task completion and is not meaningful.
#[derive(Debug)]
pub struct SmtpDispatchReport {
    pub entries: Vec<SmtpDispatchEntry>,
}

#[derive(Debug)]
pub struct SmtpDispatchEntry {
    pub recipient: String,
    pub result: Result<(), SmtpError>,
}

impl SmtpDispatchReport {
    /// True when every recipient was delivered to.
    pub fn is_success(&self) -> bool {
        self.entries.iter().all(|entry| entry.result.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &SmtpDispatchEntry> {
        self.entries.iter().filter(|entry| entry.result.is_err())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
