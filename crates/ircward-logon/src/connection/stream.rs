//! Low-level IRC stream handling.

use std::sync::Arc;

use rustls::pki_types::ServerName;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio_rustls::{
    TlsConnector,
    client::TlsStream,
    rustls::{ClientConfig, RootCertStore},
};

use crate::error::{Error, Result};

/// IRC stream (plain or TLS) over any byte transport.
#[derive(Debug)]
pub enum IrcStream<S = TcpStream> {
    /// Plain-text connection.
    Plain(BufReader<S>),
    /// TLS-encrypted connection.
    Tls(Box<BufReader<TlsStream<S>>>),
}

impl<S> IrcStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps a plain-text transport.
    pub fn plain(stream: S) -> Self {
        Self::Plain(BufReader::new(stream))
    }

    /// Returns true if the stream is TLS-encrypted.
    #[must_use]
    pub const fn is_tls(&self) -> bool {
        matches!(self, Self::Tls(_))
    }

    /// Reads one line, without its terminator.
    ///
    /// Returns `None` once the peer has closed the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = match self {
            Self::Plain(reader) => reader.read_line(&mut line).await?,
            Self::Tls(reader) => reader.read_line(&mut line).await?,
        };
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Writes one line followed by CRLF and flushes.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn write_line(&mut self, line: &str) -> Result<()> {
        let mut data = Vec::with_capacity(line.len() + 2);
        data.extend_from_slice(line.as_bytes());
        data.extend_from_slice(b"\r\n");
        match self {
            Self::Plain(reader) => {
                reader.get_mut().write_all(&data).await?;
                reader.get_mut().flush().await?;
            }
            Self::Tls(reader) => {
                reader.get_mut().write_all(&data).await?;
                reader.get_mut().flush().await?;
            }
        }
        Ok(())
    }

    /// Shuts down the write side of the transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the shutdown fails.
    pub async fn shutdown(&mut self) -> Result<()> {
        match self {
            Self::Plain(reader) => reader.get_mut().shutdown().await?,
            Self::Tls(reader) => reader.get_mut().shutdown().await?,
        }
        Ok(())
    }

    /// Upgrades a plain-text stream to TLS over the same transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is already TLS, if the server sent data
    /// that has not been read yet, or if the TLS handshake fails.
    pub async fn upgrade_to_tls(self, connector: &TlsConnector, hostname: &str) -> Result<Self> {
        let reader = match self {
            Self::Plain(reader) => reader,
            Self::Tls(_) => return Err(Error::InvalidState("Already using TLS".into())),
        };
        if !reader.buffer().is_empty() {
            return Err(Error::InvalidState(
                "Unread plain-text data before TLS handshake".into(),
            ));
        }

        let server_name = ServerName::try_from(hostname.to_string())?;
        let tls_stream = connector
            .connect(server_name, reader.into_inner())
            .await?;
        Ok(Self::Tls(Box::new(BufReader::new(tls_stream))))
    }
}

/// Connects to an IRC server over plain TCP.
///
/// # Errors
///
/// Returns an error if the connection fails.
pub async fn connect_plain(hostname: &str, port: u16) -> Result<IrcStream> {
    let addr = format!("{hostname}:{port}");
    let stream = TcpStream::connect(&addr).await?;
    Ok(IrcStream::plain(stream))
}

/// Connects to an IRC server over TLS from the start (`ircs://`).
///
/// # Errors
///
/// Returns an error if the connection or TLS handshake fails.
pub async fn connect_tls(
    connector: &TlsConnector,
    hostname: &str,
    port: u16,
) -> Result<IrcStream> {
    connect_plain(hostname, port)
        .await?
        .upgrade_to_tls(connector, hostname)
        .await
}

/// Creates a TLS connector with webpki root certificates.
///
/// # Errors
///
/// Returns [`Error::TlsUnavailable`] if the crypto provider supports none of
/// the safe default protocol versions.
pub fn create_tls_connector() -> Result<TlsConnector> {
    let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
    let root_store = RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };

    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| Error::TlsUnavailable(e.to_string()))?
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Ok(TlsConnector::from(Arc::new(config)))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, duplex};

    #[test]
    fn test_create_tls_connector() {
        assert!(create_tls_connector().is_ok());
    }

    #[tokio::test]
    async fn test_plain_line_io() {
        let (client, mut server) = duplex(1024);
        let mut stream = IrcStream::plain(client);

        stream.write_line("NICK bot").await.unwrap();
        let mut buf = [0u8; 10];
        server.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"NICK bot\r\n");

        server
            .write_all(b":irc.example.net 670 bot :STARTTLS successful\r\n")
            .await
            .unwrap();
        let line = stream.read_line().await.unwrap();
        assert_eq!(
            line.as_deref(),
            Some(":irc.example.net 670 bot :STARTTLS successful")
        );
        assert!(!stream.is_tls());
    }

    #[tokio::test]
    async fn test_read_line_eof() {
        let (client, server) = duplex(64);
        drop(server);
        let mut stream = IrcStream::plain(client);
        assert_eq!(stream.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_upgrade_fails_when_peer_is_gone() {
        let (client, server) = duplex(4096);
        drop(server);
        let connector = create_tls_connector().unwrap();
        let result = IrcStream::plain(client)
            .upgrade_to_tls(&connector, "irc.example.net")
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_upgrade_refuses_unread_data() {
        let (client, mut server) = duplex(1024);
        server
            .write_all(b":srv 670 bot :go ahead\r\n:srv NOTICE * :early\r\n")
            .await
            .unwrap();
        let mut stream = IrcStream::plain(client);
        stream.read_line().await.unwrap();

        let connector = create_tls_connector().unwrap();
        let err = stream
            .upgrade_to_tls(&connector, "irc.example.net")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidState(_)));
    }
}
