use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time;

use crate::creds::Combinator;
use crate::form::Target;
use crate::utils::parse_multiple_targets;
use crate::Options;

pub(crate) mod loot;
mod runtime;
mod worker;

pub(crate) use loot::Loot;
pub(crate) use worker::run;

use runtime::Runtime;

pub(crate) type Error = String;

const STATS_INTERVAL_SECS: u64 = 10;

#[derive(Debug)]
pub(crate) struct Session {
    pub options: Options,
    pub targets: Vec<String>,
    pub total: AtomicUsize,
    pub done: AtomicUsize,
    pub errors: AtomicUsize,
    pub results: Mutex<Vec<Loot>>,

    runtime: Runtime,
}

impl Session {
    pub fn new(options: Options) -> Result<Arc<Self>, Error> {
        let Some(target) = options.target.as_ref() else {
            return Err("no --target argument provided".to_owned());
        };

        let targets = parse_multiple_targets(target)?;
        if targets.is_empty() {
            return Err("empty list of target(s) provided".to_owned());
        }

        // perform pre-emptive target validation
        for target in &targets {
            Target::parse(target, options.ssl, options.port)?;
        }

        // same for credentials, this also gives us the per target search space
        let combinator = Combinator::from_options(&options)?;
        log::info!("{}", combinator.description());

        let total = AtomicUsize::new(combinator.search_space_size() * targets.len());
        let runtime = Runtime::new(options.concurrency);

        Ok(Arc::new(Self {
            options,
            targets,
            total,
            done: AtomicUsize::new(0),
            errors: AtomicUsize::new(0),
            results: Mutex::new(vec![]),
            runtime,
        }))
    }

    pub fn is_stop(&self) -> bool {
        self.runtime.is_stop()
    }

    pub fn set_stop(&self) {
        self.runtime.set_stop();
    }

    pub fn inc_errors(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_errors(&self) -> usize {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn inc_done(&self) {
        self.done.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_done(&self) -> usize {
        self.done.load(Ordering::Relaxed)
    }

    pub fn get_total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    pub fn get_results(&self) -> Vec<Loot> {
        self.results
            .lock()
            .map(|results| results.clone())
            .unwrap_or_default()
    }

    pub fn is_finished(&self) -> bool {
        self.is_stop() || self.get_done() >= self.get_total()
    }

    pub async fn report_runtime_statistics(&self) {
        let interval = time::Duration::from_secs(STATS_INTERVAL_SECS);

        while !self.is_finished() {
            tokio::time::sleep(interval).await;
            if self.is_finished() {
                break;
            }

            let total = self.get_total();
            let done = self.get_done();
            let perc = (done as f32 / total.max(1) as f32) * 100.0;

            log::info!(
                "tasks={} done={} ({:.2}%) errors={} found={}",
                total,
                done,
                perc,
                self.get_errors(),
                self.get_results().len(),
            );
        }
    }

    pub fn add_loot(&self, loot: Loot) -> Result<(), Error> {
        let mut results = self
            .results
            .lock()
            .map_err(|_| "could not lock session results".to_owned())?;

        if results.contains(&loot) {
            return Ok(());
        }

        results.push(loot.clone());

        // report credentials to screen
        log::info!("{}", &loot);

        // check if we have to output to file
        if let Some(path) = &self.options.output {
            if let Err(e) = loot.append_to_file(path, &self.options.output_format) {
                log::error!("could not write to {}: {:?}", &path, e);
            }
        }

        // if we only need one match, stop
        if self.options.single_match {
            self.set_stop();
        }

        Ok(())
    }
}
