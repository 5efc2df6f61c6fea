//! HTTP Basic authentication header encoding (§6).

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Build a `"Basic <base64>"` Authorization header value from a username
/// and password, joined with `:` and UTF-8 encoded before base64.
pub fn basic_auth_header(username: &str, password: &str) -> String {
    let credential = format!("{username}:{password}");
    format!("Basic {}", STANDARD.encode(credential.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_username_and_password() {
        // "Aladdin:open sesame" -> well-known RFC 7617 example.
        assert_eq!(
            basic_auth_header("Aladdin", "open sesame"),
            "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ=="
        );
    }
}
