//! Stream-backed connection.

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

use super::stream::{IrcStream, create_tls_connector};
use super::{Connection, Handler, Listeners, Trigger};
use crate::command::Command;
use crate::config::{Config, Settings};
use crate::error::{Error, Result};

/// A [`Connection`] over an [`IrcStream`].
pub struct IrcConnection<S = TcpStream, C = Settings> {
    stream: Option<IrcStream<S>>,
    config: C,
    server_name: String,
    tls: Option<TlsConnector>,
    listeners: Listeners,
}

impl<S, C> IrcConnection<S, C>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
    C: Config,
{
    /// Creates a connection over an open stream.
    ///
    /// `server_name` is the host used to verify the server certificate if the
    /// connection is later upgraded to TLS.
    pub fn new(stream: IrcStream<S>, config: C, server_name: impl Into<String>) -> Self {
        let tls = match create_tls_connector() {
            Ok(connector) => Some(connector),
            Err(e) => {
                tracing::warn!(error = %e, "TLS unavailable for this connection");
                None
            }
        };
        Self {
            stream: Some(stream),
            config,
            server_name: server_name.into(),
            tls,
            listeners: Listeners::new(),
        }
    }

    /// Replaces the TLS connector; `None` disables TLS upgrades.
    #[must_use]
    pub fn with_tls_connector(mut self, connector: Option<TlsConnector>) -> Self {
        self.tls = connector;
        self
    }

    /// Returns true until the connection has been closed.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Returns true if the transport is TLS-encrypted.
    #[must_use]
    pub fn is_tls(&self) -> bool {
        self.stream.as_ref().is_some_and(IrcStream::is_tls)
    }

    /// Reads the next line from the server.
    ///
    /// Returns `None` once the server has closed the connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection is closed or the read fails.
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        self.stream_mut()?.read_line().await
    }

    fn stream_mut(&mut self) -> Result<&mut IrcStream<S>> {
        self.stream.as_mut().ok_or(Error::Disconnected)
    }
}

impl<S, C> Connection for IrcConnection<S, C>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
    C: Config,
{
    fn config(&self) -> &dyn Config {
        &self.config
    }

    async fn send_command(&mut self, line: &str) -> Result<()> {
        let verb = line.split(' ').next().unwrap_or_default();
        tracing::trace!(command = verb, "sending");
        self.stream_mut()?.write_line(line).await
    }

    async fn disconnect(&mut self, quit_message: Option<&str>, forced: bool) -> Result<()> {
        let Some(mut stream) = self.stream.take() else {
            return Ok(());
        };

        if forced {
            tracing::debug!("dropping connection");
            if let Err(e) = stream.shutdown().await {
                tracing::debug!(error = %e, "shutdown after forced disconnect failed");
            }
            return Ok(());
        }

        let quit = Command::Quit {
            message: quit_message.map(str::to_string),
        };
        stream.write_line(&quit.to_string()).await?;
        stream.shutdown().await
    }

    fn tls_supported(&self) -> bool {
        self.tls.is_some()
    }

    async fn enable_tls(&mut self) -> Result<()> {
        let connector = self
            .tls
            .clone()
            .ok_or_else(|| Error::TlsUnavailable("no TLS connector".into()))?;
        let stream = self.stream.take().ok_or(Error::Disconnected)?;
        let upgraded = stream.upgrade_to_tls(&connector, &self.server_name).await?;
        self.stream = Some(upgraded);
        Ok(())
    }

    fn add_listener(&mut self, trigger: Trigger, handler: Handler) {
        self.listeners.add(trigger, handler);
    }

    fn remove_listener(&mut self, trigger: Trigger) -> Option<Handler> {
        self.listeners.remove(trigger)
    }

    fn listener(&self, trigger: Trigger) -> Option<Handler> {
        self.listeners.get(trigger)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, duplex};

    fn connection(client: DuplexStream) -> IrcConnection<DuplexStream> {
        let settings = Settings::builder()
            .uri("irc://irc.example.net/")
            .nickname("bot")
            .build();
        IrcConnection::new(IrcStream::plain(client), settings, "irc.example.net")
    }

    async fn drain(mut server: DuplexStream) -> String {
        let mut out = String::new();
        server.read_to_string(&mut out).await.unwrap();
        out
    }

    #[tokio::test]
    async fn test_send_command_appends_crlf() {
        let (client, server) = duplex(1024);
        let mut conn = connection(client);
        conn.send_command("NICK bot").await.unwrap();
        conn.disconnect(None, true).await.unwrap();
        assert_eq!(drain(server).await, "NICK bot\r\n");
    }

    #[tokio::test]
    async fn test_clean_disconnect_sends_quit() {
        let (client, server) = duplex(1024);
        let mut conn = connection(client);
        conn.disconnect(Some("See you"), false).await.unwrap();
        assert!(!conn.is_open());
        assert_eq!(drain(server).await, "QUIT :See you\r\n");
    }

    #[tokio::test]
    async fn test_clean_disconnect_without_message() {
        let (client, server) = duplex(1024);
        let mut conn = connection(client);
        conn.disconnect(Some(""), false).await.unwrap();
        assert_eq!(drain(server).await, "QUIT\r\n");
    }

    #[tokio::test]
    async fn test_forced_disconnect_sends_nothing() {
        let (client, server) = duplex(1024);
        let mut conn = connection(client);
        conn.disconnect(None, true).await.unwrap();
        assert_eq!(drain(server).await, "");

        assert!(matches!(
            conn.send_command("NICK bot").await,
            Err(Error::Disconnected)
        ));
        conn.disconnect(None, true).await.unwrap();
    }

    #[tokio::test]
    async fn test_read_line() {
        let (client, mut server) = duplex(1024);
        let mut conn = connection(client);
        server.write_all(b"PING :irc.example.net\r\n").await.unwrap();
        assert_eq!(
            conn.read_line().await.unwrap().as_deref(),
            Some("PING :irc.example.net")
        );
    }

    #[tokio::test]
    async fn test_enable_tls_without_connector() {
        let (client, _server) = duplex(1024);
        let mut conn = connection(client).with_tls_connector(None);
        assert!(!conn.tls_supported());
        let err = conn.enable_tls().await.unwrap_err();
        assert!(matches!(err, Error::TlsUnavailable(_)));
        assert!(conn.is_open());
    }

    #[tokio::test]
    async fn test_enable_tls_failure_closes_connection() {
        let (client, server) = duplex(4096);
        drop(server);
        let mut conn = connection(client);
        assert!(conn.tls_supported());
        assert!(conn.enable_tls().await.is_err());
        assert!(!conn.is_open());
        assert!(!conn.is_tls());
    }

    #[test]
    fn test_listener_table() {
        let (client, _server) = duplex(64);
        let mut conn = connection(client);
        conn.add_listener(Trigger::Logon, Handler::Logon);
        assert_eq!(conn.listener(Trigger::Logon), Some(Handler::Logon));
        assert_eq!(conn.remove_listener(Trigger::Logon), Some(Handler::Logon));
        assert_eq!(conn.listener(Trigger::Logon), None);
    }
}
