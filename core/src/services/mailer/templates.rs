//! Email bodies for account workflows

use super::EmailMessage;

/// Builds absolute links into the public API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBuilder {
    base_url: String,
}

impl LinkBuilder {
    /// `api_host` may be a bare host (`api.example.com`) or carry a scheme.
    /// Bare hosts get `https` when `secure`, otherwise `http`.
    pub fn new(api_host: &str, secure: bool) -> Self {
        let host = api_host.trim_end_matches('/');
        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else if secure {
            format!("https://{}", host)
        } else {
            format!("http://{}", host)
        };
        Self { base_url }
    }

    pub fn verify_email(&self, email: &str, secret_code: &str) -> String {
        format!(
            "{}/api/v1/verify_email?email={}&secret_code={}",
            self.base_url,
            encode_query_component(email),
            encode_query_component(secret_code)
        )
    }

    pub fn reset_password(&self, reset_token: &str) -> String {
        format!(
            "{}/api/v1/reset_password?reset_token={}",
            self.base_url,
            encode_query_component(reset_token)
        )
    }
}

/// Percent-encode everything outside the RFC 3986 unreserved set
pub fn encode_query_component(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

pub fn verify_email_email(full_name: &str, to: &str, verify_url: &str) -> EmailMessage {
    let body = format!(
        "Hello {}, <br/>\n\
         Thank you for registering with us! <br/>\n\
         Please <a href=\"{}\">Click here</a> to verify your email address.<br/>\n",
        full_name, verify_url
    );
    EmailMessage::new("Welcome to KeyKeeper", body, vec![to.to_string()])
}

pub fn reset_password_email(to: &str, reset_url: &str) -> EmailMessage {
    let body = format!(
        "Hi, <br/>\n\
         Someone has requested a link to change your password. You can do this through the link below! <br/>\n\
         Please <a href=\"{}\">Click here</a> to reset your password.<br/>\n",
        reset_url
    );
    EmailMessage::new("Reset password instructions", body, vec![to.to_string()])
}
