#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpMode {
    /// Implicit TLS on a dedicated port (`SMTPS`)
    Tls,
    /// Plaintext connect upgraded in band with `STARTTLS`
    StartTls,
    /// Testing SMTP without TLS
    Plaintext,
}
