use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::session::Error;

const DEFAULT_MAX_REDIRECTS: usize = 16;

#[derive(Parser, Debug, Serialize, Deserialize, Clone)]
#[group(skip)]
pub(crate) struct Options {
    #[clap(long)]
    /// Target form to request (default "/", or the path of a url target).
    pub form: Option<String>,
    #[clap(long)]
    /// Authentication failure message. An attempt is flagged as successful if this text is not present in the response (default "Login incorrect").
    pub deny_signal: Option<String>,
    #[clap(long)]
    /// Form method and fields as <METHOD>?<USER FIELD>&<PASS FIELD>&<EXTRA FIELDS>, username field first (default "post?username&password").
    pub form_data: Option<String>,
    #[clap(long)]
    /// User-Agent header value.
    pub user_agent: Option<String>,
    #[clap(long = "custom-header")]
    /// Custom HTTP header, can be specified multiple times.
    pub custom_headers: Vec<String>,
    #[clap(long, default_value_t = DEFAULT_MAX_REDIRECTS)]
    /// Maximum number of redirects to follow for a single attempt.
    pub form_max_redirects: usize,
    #[clap(short = 'm', long = "module-option")]
    /// Module option as KEY:VALUE, one of FORM, DENY-SIGNAL, FORM-DATA, USER-AGENT, CUSTOM-HEADER (repeatable). Overrides the equivalent flags.
    pub module_options: Vec<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            form: None,
            deny_signal: None,
            form_data: None,
            user_agent: None,
            custom_headers: vec![],
            form_max_redirects: DEFAULT_MAX_REDIRECTS,
            module_options: vec![],
        }
    }
}

impl Options {
    /// Apply a single `KEY:VALUE` module option.
    pub fn apply_module_option(&mut self, raw: &str) -> Result<(), Error> {
        log::debug!("processing module option: {}", raw);

        let (key, value) = raw.split_once(':').unwrap_or((raw, ""));
        let slot = match key {
            "FORM" => &mut self.form,
            "DENY-SIGNAL" => &mut self.deny_signal,
            "FORM-DATA" => &mut self.form_data,
            "USER-AGENT" => &mut self.user_agent,
            "CUSTOM-HEADER" => {
                if value.is_empty() {
                    return Err("option CUSTOM-HEADER requires a value".to_owned());
                }
                self.custom_headers.push(value.to_owned());
                return Ok(());
            }
            _ => return Err(format!("invalid module option: {}", key)),
        };

        if value.is_empty() {
            return Err(format!("option {} requires an argument", key));
        }

        *slot = Some(value.to_owned());
        Ok(())
    }

    /// Fold every `-m` option into the flags, warning about bad ones.
    pub fn resolved(&self) -> Self {
        let mut resolved = self.clone();
        for raw in &self.module_options {
            if let Err(e) = resolved.apply_module_option(raw) {
                log::warn!("{}", e);
            }
        }
        resolved.module_options.clear();
        resolved
    }
}
