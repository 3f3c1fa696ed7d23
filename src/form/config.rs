use std::fmt;

use super::cookies::CookieJar;
use super::options::Options;
use super::target::Target;
use super::Error;

pub(crate) const DEFAULT_RESOURCE_PATH: &str = "/";
pub(crate) const DEFAULT_USER_AGENT: &str = "Mozilla/1.22 (compatible; MSIE 10.0; Windows 3.1)";
pub(crate) const DEFAULT_DENY_SIGNAL: &str = "Login incorrect";
pub(crate) const DEFAULT_USERNAME_KEY: &str = "username";
pub(crate) const DEFAULT_PASSWORD_KEY: &str = "password";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum FormMethod {
    Get,
    #[default]
    Post,
    Unrecognized,
}

impl FormMethod {
    fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("post") {
            FormMethod::Post
        } else if raw.eq_ignore_ascii_case("get") {
            FormMethod::Get
        } else {
            FormMethod::Unrecognized
        }
    }
}

impl fmt::Display for FormMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                FormMethod::Get => "GET",
                FormMethod::Post => "POST",
                FormMethod::Unrecognized => "?",
            }
        )
    }
}

/// Parsed `<METHOD>?<userKey>&<passKey>&<extraFields>` format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FormData {
    pub method: FormMethod,
    pub user_key: String,
    pub pass_key: String,
    pub extra_fields: String,
}

impl Default for FormData {
    fn default() -> Self {
        Self {
            method: FormMethod::Post,
            user_key: DEFAULT_USERNAME_KEY.to_owned(),
            pass_key: DEFAULT_PASSWORD_KEY.to_owned(),
            extra_fields: String::new(),
        }
    }
}

fn field_key(raw: Option<&str>) -> Option<String> {
    let key = raw?;
    let key = key.strip_suffix('=').unwrap_or(key);
    if key.is_empty() {
        None
    } else {
        Some(key.to_owned())
    }
}

impl FormData {
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidFormConfiguration(raw.to_owned());

        let (method, fields) = raw.split_once('?').unwrap_or((raw, ""));
        let method = FormMethod::parse(method);
        if method == FormMethod::Unrecognized {
            return Err(invalid());
        }

        // the username field always comes first, the password second
        let mut parts = fields.splitn(3, '&');
        let user_key = field_key(parts.next()).ok_or_else(invalid)?;
        let pass_key = field_key(parts.next()).ok_or_else(invalid)?;
        let extra_fields = parts.next().unwrap_or("").to_owned();

        Ok(Self {
            method,
            user_key,
            pass_key,
            extra_fields,
        })
    }
}

/// Per target state, mutated while following redirects and across attempts.
#[derive(Clone, Debug, Default)]
pub(crate) struct FormConfig {
    pub resource_path: String,
    /// Path to go back to once a method downgraded redirect completes.
    pub resource_path_previous: Option<String>,
    pub host_header: String,
    pub user_agent: String,
    pub deny_signal: String,
    pub custom_headers: String,
    pub cookie_jar: CookieJar,
    pub method: FormMethod,
    pub user_key: String,
    pub pass_key: String,
    pub extra_fields: String,
    pub method_changed: bool,
}

fn normalize_resource_path(path: &str) -> String {
    if path.starts_with('/') || super::path::classify(path) == super::path::PathType::Uri {
        path.to_owned()
    } else {
        format!("/{}", path)
    }
}

impl FormConfig {
    /// Resolve every user supplied option against its default.
    pub fn initialize(opts: &Options, target: &Target) -> Self {
        let resource_path = normalize_resource_path(
            opts.form
                .as_deref()
                .or(target.path.as_deref())
                .unwrap_or(DEFAULT_RESOURCE_PATH),
        );

        let form_data = match opts.form_data.as_deref() {
            None => FormData::default(),
            Some(raw) => match FormData::parse(raw) {
                Ok(data) => {
                    log::debug!("user-supplied form method: {}", data.method);
                    log::debug!("user-supplied form user field: {}", &data.user_key);
                    log::debug!("user-supplied form pass field: {}", &data.pass_key);
                    log::debug!("user-supplied form rest field: {}", &data.extra_fields);
                    data
                }
                Err(e) => {
                    log::warn!(
                        "{}, using default format: \"post?{}&{}\"",
                        e,
                        DEFAULT_USERNAME_KEY,
                        DEFAULT_PASSWORD_KEY
                    );
                    FormData::default()
                }
            },
        };

        let custom_headers: String = opts
            .custom_headers
            .iter()
            .map(|header| format!("{}\r\n", header))
            .collect();

        Self {
            resource_path,
            resource_path_previous: None,
            host_header: target.authority(),
            user_agent: opts
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()),
            deny_signal: opts
                .deny_signal
                .clone()
                .unwrap_or_else(|| DEFAULT_DENY_SIGNAL.to_owned()),
            custom_headers,
            cookie_jar: CookieJar::default(),
            method: form_data.method,
            user_key: form_data.user_key,
            pass_key: form_data.pass_key,
            extra_fields: form_data.extra_fields,
            method_changed: false,
        }
    }

    /// Move to a new resource path, remembering where the chain started.
    pub fn replace_resource_path(&mut self, path: String) {
        let previous = std::mem::replace(&mut self.resource_path, path);
        if self.resource_path_previous.is_none() {
            self.resource_path_previous = Some(previous);
        }
    }

    /// Replay the form as GET after a 301/302 answered a POST.
    pub fn downgrade_method(&mut self) {
        log::debug!("changing request method to GET for redirect");
        self.method = FormMethod::Get;
        self.method_changed = true;
    }

    /// Called on every 200. Undoes a method downgrade if one is outstanding.
    pub fn settle(&mut self) {
        let previous = self.resource_path_previous.take();
        if self.method_changed {
            log::debug!("redirect completed, restoring POST");
            self.method_changed = false;
            self.method = FormMethod::Post;
            if let Some(previous) = previous {
                self.resource_path = previous;
            }
            self.cookie_jar.clear();
        }
    }

    /// Called when an attempt fails. Drops any half followed redirect chain so
    /// the next attempt starts from the original form again.
    pub fn abort(&mut self) {
        if let Some(previous) = self.resource_path_previous.take() {
            self.resource_path = previous;
        }
        if self.method_changed {
            log::debug!("redirect aborted, restoring POST");
            self.method_changed = false;
            self.method = FormMethod::Post;
            self.cookie_jar.clear();
        }
    }
}
