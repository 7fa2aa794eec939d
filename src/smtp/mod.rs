mod smtp_credentials;
mod smtp_session;
pub mod smtp_mode;
pub mod smtp_endpoint;
pub mod smtp_error;
pub mod smtp_attachment;
pub mod smtp_recipients;
pub mod smtp_message;
pub mod smtp_report;
pub mod smtp_sender;
