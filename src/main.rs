use std::io;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing_subscriber::EnvFilter;

use selfplay_chess::api::router::create_router;
use selfplay_chess::api::state::AppState;
use selfplay_chess::config::AppConfig;

const DEFAULT_LOG_FILTER: &str = "selfplay_chess=info,tower_http=info";

#[tokio::main]
async fn main() -> io::Result<()> {
    let config = AppConfig::from_env();

    // `--health-check` turns the binary into its own liveness client.
    if std::env::args().any(|a| a == "--health-check") {
        let code = match check_health(config.port).await {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("selfplay-chess is unhealthy: {e}");
                1
            }
        };
        std::process::exit(code);
    }

    init_tracing();

    let bind_addr = config.bind_addr();
    tracing::info!(
        max_games = config.max_games,
        version = env!("CARGO_PKG_VERSION"),
        "listening on {bind_addr}"
    );

    let listener = TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, create_router(AppState::new(config))).await
}

/// `RUST_LOG` wins; otherwise our crate and the HTTP trace layer log at info.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// GET /health on the loopback interface and require a 200 status line.
async fn check_health(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let mut stream = TcpStream::connect(("127.0.0.1", port)).await?;
    stream.write_all(health_request(port).as_bytes()).await?;

    let mut buf = [0u8; 1024];
    let n = stream.read(&mut buf).await?;
    let reply = String::from_utf8_lossy(&buf[..n]);
    let status_line = reply.lines().next().unwrap_or_default();
    if status_is_ok(status_line) {
        Ok(())
    } else {
        Err(format!("unexpected status line {status_line:?}").into())
    }
}

fn health_request(port: u16) -> String {
    format!("GET /health HTTP/1.1\r\nHost: 127.0.0.1:{port}\r\nConnection: close\r\n\r\n")
}

fn status_is_ok(status_line: &str) -> bool {
    let mut parts = status_line.split_whitespace();
    matches!(
        (parts.next(), parts.next()),
        (Some(version), Some("200")) if version.starts_with("HTTP/1.")
    )
}
