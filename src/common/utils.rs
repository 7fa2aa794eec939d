use std::sync::LazyLock;

use regex::Regex;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap()
});

pub fn parse_host(host: &str, default_port: u16) -> Result<(&str, u16), std::num::ParseIntError> {
    if let Some((host, port)) = host.split_once(":") {
        let port: u16 = port.parse()?;
        Ok((host, port))
    } else {
        Ok((host, default_port))
    }
}

/// Syntactic check that an address has a local part, a domain and a top level domain.
pub fn validate_email(address: &str) -> bool {
    EMAIL_PATTERN.is_match(address)
}
