//! Line framing for the SyndrDB wire protocol.
//!
//! Every client message is one `\n`-terminated line. A server reply is
//! complete as soon as any `\n` or `\r` byte has been received.

use crate::models::connection::{AUTH_FIELD_DELIMITER, AUTH_TERMINATOR};
use crate::models::ConnectionConfig;

/// Substring the server uses to accept a handshake.
const WELCOME_MARKER: &str = "Welcome";

/// Lowercase substrings that reject a handshake.
const REJECTION_MARKERS: [&str; 4] = ["error", "failed", "denied", "invalid"];

/// Build the authentication line sent once per connection.
///
/// `scheme://hostname:port:database:username:password;\n`
pub fn auth_line(config: &ConnectionConfig) -> String {
    let d = AUTH_FIELD_DELIMITER;
    format!(
        "{scheme}://{host}{d}{port}{d}{db}{d}{user}{d}{pass}{AUTH_TERMINATOR}\n",
        scheme = config.options.scheme,
        host = config.hostname,
        port = config.port,
        db = config.database,
        user = config.username,
        pass = config.password,
    )
}

/// Build a query line.
pub fn query_line(query: &str) -> String {
    let mut line = String::with_capacity(query.len() + 1);
    line.push_str(query);
    line.push('\n');
    line
}

/// The five credential fields carried by an authentication line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthFields {
    pub hostname: String,
    pub port: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

/// Split an authentication line back into its fields.
///
/// Returns `None` if the scheme, terminator or field count do not match.
pub fn split_auth_line(line: &str, scheme: &str) -> Option<AuthFields> {
    let body = line.trim_end_matches(['\n', '\r']);
    let body = body.strip_prefix(scheme)?.strip_prefix("://")?;
    let body = body.strip_suffix(AUTH_TERMINATOR)?;

    let mut parts = body.split(AUTH_FIELD_DELIMITER);
    let fields = AuthFields {
        hostname: parts.next()?.to_string(),
        port: parts.next()?.to_string(),
        database: parts.next()?.to_string(),
        username: parts.next()?.to_string(),
        password: parts.next()?.to_string(),
    };
    if parts.next().is_some() {
        return None;
    }
    Some(fields)
}

/// Check whether an accumulated reply buffer holds a complete frame.
pub fn is_frame_complete(buffer: &[u8]) -> bool {
    buffer.iter().any(|b| matches!(b, b'\n' | b'\r'))
}

/// Verdict on one handshake reply line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeReply {
    /// Server accepted the credentials.
    Welcome(String),
    /// Server rejected the credentials.
    Rejected(String),
    /// Anything else; keep waiting.
    Noise,
}

/// Classify a handshake reply by its literal content.
pub fn classify_handshake(reply: &str) -> HandshakeReply {
    let text = reply.trim();
    if text.contains(WELCOME_MARKER) {
        return HandshakeReply::Welcome(text.to_string());
    }
    let lower = text.to_lowercase();
    if REJECTION_MARKERS.iter().any(|marker| lower.contains(marker)) {
        return HandshakeReply::Rejected(text.to_string());
    }
    HandshakeReply::Noise
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(password: &str) -> ConnectionConfig {
        ConnectionConfig::new("local", "10.0.0.5", 1776, "testdb", "root", password)
    }

    #[test]
    fn test_auth_line_is_byte_exact() {
        assert_eq!(auth_line(&config("pw")), "syndrdb://10.0.0.5:1776:testdb:root:pw;\n");
    }

    #[test]
    fn test_auth_line_round_trips_fields() {
        for password in ["pw", "", "p@ss w0rd!", "ünïcode"] {
            let cfg = config(password);
            let fields = split_auth_line(&auth_line(&cfg), "syndrdb").unwrap();
            assert_eq!(fields.hostname, cfg.hostname);
            assert_eq!(fields.port, cfg.port.to_string());
            assert_eq!(fields.database, cfg.database);
            assert_eq!(fields.username, cfg.username);
            assert_eq!(fields.password, cfg.password);
        }
    }

    #[test]
    fn test_split_rejects_wrong_shape() {
        assert!(split_auth_line("syndrdb://a:1:db:u:p\n", "syndrdb").is_none());
        assert!(split_auth_line("http://a:1:db:u:p;\n", "syndrdb").is_none());
        assert!(split_auth_line("syndrdb://a:1:db:u;\n", "syndrdb").is_none());
        assert!(split_auth_line("syndrdb://a:1:db:u:p:x;\n", "syndrdb").is_none());
    }

    #[test]
    fn test_query_line_appends_newline() {
        assert_eq!(query_line("USE \"testdb\";"), "USE \"testdb\";\n");
    }

    #[test]
    fn test_frame_completion() {
        assert!(!is_frame_complete(b""));
        assert!(!is_frame_complete(b"{\"success\":tr"));
        assert!(is_frame_complete(b"{\"success\":true}\n"));
        assert!(is_frame_complete(b"partial\rmore"));
    }

    #[test]
    fn test_classify_handshake() {
        assert_eq!(
            classify_handshake("Welcome to testdb\n"),
            HandshakeReply::Welcome("Welcome to testdb".to_string())
        );
        assert_eq!(
            classify_handshake("Authentication failed: bad password"),
            HandshakeReply::Rejected("Authentication failed: bad password".to_string())
        );
        assert_eq!(
            classify_handshake("ACCESS DENIED"),
            HandshakeReply::Rejected("ACCESS DENIED".to_string())
        );
        assert_eq!(classify_handshake("SyndrDB v0.3 ready"), HandshakeReply::Noise);
    }
}
