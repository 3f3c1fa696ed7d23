use std::sync::atomic::{AtomicBool, Ordering};

use super::Error;

#[derive(Debug)]
pub(crate) struct Runtime {
    stop: AtomicBool,
    targets_tx: async_channel::Sender<String>,
    targets_rx: async_channel::Receiver<String>,
}

impl Runtime {
    pub(crate) fn new(concurrency: usize) -> Self {
        let (targets_tx, targets_rx) = async_channel::bounded(concurrency.max(1));
        Self {
            stop: AtomicBool::new(false),
            targets_tx,
            targets_rx,
        }
    }

    pub fn is_stop(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    pub fn set_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub async fn send_target(&self, target: String) -> Result<(), Error> {
        self.targets_tx.send(target).await.map_err(|e| e.to_string())
    }

    pub async fn recv_target(&self) -> Result<String, Error> {
        self.targets_rx.recv().await.map_err(|e| e.to_string())
    }

    /// No more targets, idle workers will exit.
    pub fn close(&self) {
        self.targets_tx.close();
    }
}
