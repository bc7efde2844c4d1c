#![allow(clippy::doc_markdown, clippy::uninlined_format_args)]
//! Example: register with an IRC server, optionally upgrading with STARTTLS
//!
//! ## Running
//!
//! ```bash
//! cargo run --package ircward-logon --example logon -- irc://irc.example.net:6667/ mynick --upgrade
//! ```
//!
//! Press Ctrl-C to quit. Set `RUST_LOG=ircward_logon=trace` for more detail.

use std::time::Instant;

use ircward_logon::{
    Connection, IrcConnection, Numeric, RegistrationNegotiator, Settings, Trigger, UriParser,
    UrlParser, connect_plain, connect_tls, create_tls_connector, handshake,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ircward_logon=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let uri = args
        .next()
        .unwrap_or_else(|| "irc://irc.libera.chat:6667/".to_string());
    let nickname = args.next().unwrap_or_else(|| "ircward-demo".to_string());
    let upgrade = args.next().is_some_and(|arg| arg == "--upgrade");

    let settings = Settings::builder()
        .uri(uri.as_str())
        .nickname(nickname)
        .realname("ircward logon example")
        .upgrade(upgrade)
        .quit_message("Bye")
        .build();

    let target = UrlParser.parse(&uri)?;
    println!("Connecting to {}:{}...", target.host, target.port_or_default());
    let stream = if target.is_secure() {
        let connector = create_tls_connector()?;
        connect_tls(&connector, target.server_name(), target.port_or_default()).await?
    } else {
        connect_plain(target.server_name(), target.port_or_default()).await?
    };

    let mut conn = IrcConnection::new(stream, settings, target.server_name());
    handshake::install(&mut conn);
    let mut negotiator = RegistrationNegotiator::new();
    negotiator.dispatch(&mut conn, Trigger::Logon).await?;

    while conn.is_open() {
        let deadline = negotiator.poll_timeout();
        tokio::select! {
            line = conn.read_line() => {
                let Some(line) = line? else {
                    println!("Server closed the connection");
                    break;
                };
                println!("<< {}", line);

                if let Some(token) = line.strip_prefix("PING ") {
                    conn.send_command(&format!("PONG {}", token)).await?;
                    continue;
                }
                let Some(numeric) = numeric_of(&line) else {
                    continue;
                };
                negotiator.dispatch(&mut conn, Trigger::Numeric(numeric)).await?;
                if numeric == Numeric::RPL_WELCOME {
                    println!("Registered as {:?}", negotiator.registration().map(|r| &r.nickname));
                }
            }
            () = sleep_until(deadline) => {
                negotiator.handle_timeout(&mut conn, Instant::now()).await?;
            }
            _ = tokio::signal::ctrl_c() => {
                negotiator.dispatch(&mut conn, Trigger::Exit).await?;
            }
        }
    }

    println!("Handshake ended in state {:?}", negotiator.state());
    Ok(())
}

/// Extracts the numeric from a server line such as `:srv 670 nick :text`.
fn numeric_of(line: &str) -> Option<Numeric> {
    let mut words = line.split(' ');
    if line.starts_with(':') {
        words.next();
    }
    words.next().and_then(Numeric::parse)
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline.into()).await,
        None => std::future::pending().await,
    }
}
