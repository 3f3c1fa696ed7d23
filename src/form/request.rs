use std::fmt::Write;

use crate::creds::Credentials;

use super::config::{FormConfig, FormMethod};
use super::Error;

const HTTP_VERSION: &str = "HTTP/1.0";

/// Percent encode everything but ASCII letters and digits.
pub(crate) fn url_encode(s: &str) -> String {
    let mut encoded = String::with_capacity(s.len() * 3 + 1);
    for byte in s.bytes() {
        if byte.is_ascii_alphanumeric() {
            encoded.push(byte as char);
        } else {
            // writing to a String can't fail
            let _ = write!(encoded, "%{:02X}", byte);
        }
    }
    encoded
}

/// `user=<username>&pass=<password>[&extra]`. Only the password is encoded,
/// the username goes on the wire as is.
pub(crate) fn build_parameters(config: &FormConfig, creds: &Credentials) -> String {
    let mut params = format!(
        "{}={}&{}={}",
        &config.user_key,
        &creds.username,
        &config.pass_key,
        url_encode(&creds.password)
    );

    if !config.extra_fields.is_empty() {
        params.push('&');
        params.push_str(&config.extra_fields);
    }

    params
}

fn common_headers(config: &FormConfig) -> String {
    format!(
        "Host: {}\r\nUser-Agent: {}\r\n{}{}",
        &config.host_header,
        &config.user_agent,
        &config.custom_headers,
        config.cookie_jar.as_str()
    )
}

/// Render the raw request for the current state of the configuration.
pub(crate) fn build_request(config: &FormConfig, creds: &Credentials) -> Result<String, Error> {
    // the request that follows a downgraded redirect carries no credentials
    let params = if config.method_changed {
        String::new()
    } else {
        build_parameters(config, creds)
    };

    match config.method {
        FormMethod::Get => {
            let query = if params.is_empty() {
                String::new()
            } else {
                format!("?{}", params)
            };

            Ok(format!(
                "GET {}{} {}\r\n{}\r\n",
                &config.resource_path,
                query,
                HTTP_VERSION,
                common_headers(config)
            ))
        }
        FormMethod::Post => Ok(format!(
            "POST {} {}\r\n{}Content-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n{}",
            &config.resource_path,
            HTTP_VERSION,
            common_headers(config),
            params.len(),
            params
        )),
        FormMethod::Unrecognized => Err(Error::InvalidFormConfiguration(
            "unknown form method".to_owned(),
        )),
    }
}
