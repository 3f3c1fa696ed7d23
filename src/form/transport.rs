use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::utils::net::{self, StreamLike};

use super::target::Target;
use super::Error;

/// Line oriented connection to the target.
#[async_trait]
pub(crate) trait Transport: Send {
    /// Open a fresh connection, dropping any previous one.
    async fn connect(&mut self) -> Result<(), Error>;

    async fn send(&mut self, data: &[u8]) -> Result<(), Error>;

    /// Next line including its terminator, `None` once the peer is done.
    async fn receive_line(&mut self) -> Result<Option<String>, Error>;

    async fn disconnect(&mut self);
}

pub(crate) struct TcpTransport {
    address: String,
    domain: String,
    ssl: bool,
    timeout: Duration,
    stream: Option<BufReader<Box<dyn StreamLike>>>,
}

impl TcpTransport {
    pub fn new(target: &Target, timeout: Duration) -> Self {
        Self {
            address: target.authority(),
            domain: target.host.clone(),
            ssl: target.ssl,
            timeout,
            stream: None,
        }
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&mut self) -> Result<(), Error> {
        self.disconnect().await;

        let stream = net::async_tcp_stream(&self.address, &self.domain, self.timeout, self.ssl)
            .await
            .map_err(|reason| Error::ConnectionFailed {
                address: self.address.clone(),
                reason,
            })?;

        self.stream = Some(BufReader::new(stream));
        Ok(())
    }

    async fn send(&mut self, data: &[u8]) -> Result<(), Error> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| Error::SendFailed("not connected".to_owned()))?;

        tokio::time::timeout(self.timeout, stream.write_all(data))
            .await
            .map_err(|e| Error::SendFailed(e.to_string()))?
            .map_err(|e| Error::SendFailed(e.to_string()))?;

        stream
            .flush()
            .await
            .map_err(|e| Error::SendFailed(e.to_string()))
    }

    async fn receive_line(&mut self) -> Result<Option<String>, Error> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| Error::ReceiveFailed("not connected".to_owned()))?;

        let mut line = vec![];
        let read = tokio::time::timeout(self.timeout, stream.read_until(b'\n', &mut line))
            .await
            .map_err(|e| Error::ReceiveFailed(e.to_string()))?
            .map_err(|e| Error::ReceiveFailed(e.to_string()))?;

        if read == 0 {
            Ok(None)
        } else {
            Ok(Some(String::from_utf8_lossy(&line).into_owned()))
        }
    }

    async fn disconnect(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                log::debug!("error closing connection to {}: {:?}", &self.address, e);
            }
        }
    }
}
