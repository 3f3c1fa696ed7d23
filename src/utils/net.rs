use std::time::Duration;

use async_native_tls::TlsStream;

use crate::session::Error;

pub(crate) trait StreamLike:
    tokio::io::AsyncRead + tokio::io::AsyncWrite + std::fmt::Debug + Send + Sync + Unpin
{
}

impl StreamLike for tokio::net::TcpStream {}

impl StreamLike for async_native_tls::TlsStream<tokio::net::TcpStream> {}

// certificates and hostnames are never verified
pub(crate) async fn upgrade_tcp_stream_to_tls(
    tcp_stream: tokio::net::TcpStream,
    domain: &str,
    timeout: Duration,
) -> Result<TlsStream<tokio::net::TcpStream>, Error> {
    let tls = async_native_tls::TlsConnector::new()
        .danger_accept_invalid_certs(true)
        .danger_accept_invalid_hostnames(true);

    tokio::time::timeout(timeout, tls.connect(domain, tcp_stream))
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())
}

pub(crate) async fn async_tcp_stream(
    address: &str,
    domain: &str,
    timeout: Duration,
    ssl: bool,
) -> Result<Box<dyn StreamLike>, Error> {
    let tcp_stream = tokio::time::timeout(timeout, tokio::net::TcpStream::connect(address))
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())?;

    if ssl {
        Ok(Box::new(
            upgrade_tcp_stream_to_tls(tcp_stream, domain, timeout).await?,
        ))
    } else {
        Ok(Box::new(tcp_stream))
    }
}
