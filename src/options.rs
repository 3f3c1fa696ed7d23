use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::session;

#[derive(Parser, Debug, Serialize, Deserialize, Clone, Default)]
#[clap(version, arg_required_else_help(true))]
pub(crate) struct Options {
    /// Target host, host:port, [ipv6]:port or http(s)://host[:port]/path url. Comma separated list or @filename for multiple targets.
    #[clap(short = 'T', long)]
    pub target: Option<String>,
    /// Force SSL for targets that are not given as https:// urls.
    #[clap(long, default_value_t = false)]
    pub ssl: bool,
    /// Port to use for every target (default 80, or 443 with SSL).
    #[clap(long)]
    pub port: Option<u16>,

    /// Constant username or wordlist file.
    #[clap(short = 'U', long)]
    pub username: Option<String>,
    /// Constant password or wordlist file.
    #[clap(short = 'P', long)]
    pub password: Option<String>,
    /// Load username:password combinations from this file.
    #[clap(short = 'C', long)]
    pub combinations: Option<String>,
    /// Separator if using the --combinations/-C argument.
    #[clap(long, default_value = ":")]
    pub separator: String,

    /// Save results to this file.
    #[clap(short = 'O', long)]
    pub output: Option<String>,
    /// Output file format.
    #[clap(long, value_enum, default_value_t = session::loot::OutputFormat::Text)]
    pub output_format: session::loot::OutputFormat,
    /// Connection and read timeout in milliseconds.
    #[clap(long, default_value_t = 10000)]
    pub timeout: u64,
    /// Number of attempts if a login attempt is inconclusive.
    #[clap(long, default_value_t = 3)]
    pub retries: usize,
    /// Delay in milliseconds to wait before a retry.
    #[clap(long, default_value_t = 1000)]
    pub retry_time: u64,
    #[clap(long, default_value_t = false)]
    /// Exit after the first positive match is found.
    pub single_match: bool,

    /// Number of targets tested concurrently.
    #[clap(long, default_value_t = 1)]
    pub concurrency: usize,
    /// Minimum number of milliseconds for random request jittering.
    #[clap(long, default_value_t = 0)]
    pub jitter_min: u64,
    /// Maximum number of milliseconds for random request jittering.
    #[clap(long, default_value_t = 0)]
    pub jitter_max: u64,

    /// Do not report statistics.
    #[clap(short = 'Q', long, default_value_t = false)]
    pub quiet: bool,

    /// Generate shell completions
    #[clap(long)]
    #[serde(skip)]
    pub generate_completions: Option<clap_complete::Shell>,

    #[clap(flatten, next_help_heading = "WEB FORM")]
    pub form: crate::form::options::Options,
}
