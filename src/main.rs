use std::env;
use std::io;
use std::time;

use clap::{CommandFactory, Parser};
use env_logger::Target;

mod creds;
mod form;
mod options;
mod session;
mod utils;

pub(crate) use crate::options::Options;
pub(crate) use crate::session::Session;

fn setup() -> Result<Options, session::Error> {
    if env::var_os("RUST_LOG").is_none() {
        // set `RUST_LOG=debug` to see debug logs
        unsafe {
            env::set_var("RUST_LOG", "info");
        }
    }

    env_logger::builder()
        .format_module_path(false)
        .format_target(false)
        .format_timestamp(None)
        .target(Target::Stdout)
        .init();

    let options: Options = Options::parse();

    // generate shell completions and exit
    if let Some(shell) = options.generate_completions {
        clap_complete::generate(shell, &mut Options::command(), "formcrack", &mut io::stdout());
        std::process::exit(0);
    }

    print!(
        "{} v{}\n\n",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    log::debug!(
        "{}",
        serde_json::to_string_pretty(&options).map_err(|e| e.to_string())?
    );

    Ok(options)
}

async fn start_session(opts: Options) -> Result<(), session::Error> {
    // NOTE: from this moment on we use session.options
    let session = Session::new(opts)?;

    let le_session = session.clone();
    ctrlc::set_handler(move || {
        log::info!("stopping ...");
        le_session.set_stop();
    })
    .map_err(|e| format!("error setting ctrl-c handler: {}", e))?;

    if !session.options.quiet {
        // start statistics reporting
        let stat_sess = session.clone();
        tokio::task::spawn(async move {
            stat_sess.report_runtime_statistics().await;
        });
    }

    let start = time::Instant::now();

    session::run(session.clone()).await?;

    log::info!(
        "runtime {:?}, done={} errors={} found={}",
        start.elapsed(),
        session.get_done(),
        session.get_errors(),
        session.get_results().len()
    );

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), session::Error> {
    // initialize and parse command line
    let opts = setup()?;

    start_session(opts).await
}
