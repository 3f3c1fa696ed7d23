use std::fmt;
use std::fs::OpenOptions;
use std::io::prelude::*;

use ansi_term::Colour;
use clap::ValueEnum;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::session::Error;

#[derive(ValueEnum, Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub(crate) enum OutputFormat {
    #[default]
    Text,
    JSONL,
}

/// Credentials that got through a form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub(crate) struct Loot {
    target: String,
    data: IndexMap<String, String>,
}

impl Loot {
    pub fn new<I: IntoIterator<Item = (String, String)>>(target: &str, iterable: I) -> Self {
        Self {
            target: target.to_owned(),
            data: IndexMap::from_iter(iterable),
        }
    }

    fn to_text(&self) -> String {
        let mut parts = vec![format!("target={}", &self.target)];
        parts.extend(self.data.iter().map(|(k, v)| format!("{}={}", k, v)));
        parts.join("\t")
    }

    pub fn append_to_file(&self, path: &str, format: &OutputFormat) -> Result<(), Error> {
        let data = match format {
            OutputFormat::JSONL => serde_json::to_string(self).map_err(|e| e.to_string())?,
            OutputFormat::Text => self.to_text(),
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| e.to_string())?;

        writeln!(file, "{}", data).map_err(|e| e.to_string())
    }
}

impl fmt::Display for Loot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut str = format!("[{}] ", &self.target);
        for (key, value) in &self.data {
            if !value.is_empty() {
                str.push_str(&format!("{}={} ", key, Colour::Green.bold().paint(value)));
            }
        }
        write!(f, "{}", str.trim_end())
    }
}
