//! Binds a link on a headless page to a local endpoint that takes two seconds
//! to "generate" a file before answering with the handshake cookie.

use dlwatch_core::{ListenOptions, ServerHandshake};
use dlwatch_engine::{listen_with, PollTiming};
use dlwatch_headless::HeadlessPage;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

async fn serve(listener: TcpListener) -> std::io::Result<()> {
    loop {
        let (mut socket, _) = listener.accept().await?;
        tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await?;
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();

            tokio::time::sleep(Duration::from_secs(2)).await;

            let cookie = ServerHandshake::from_url(&path)
                .map(|h| format!("Set-Cookie: {}\r\n", h.set_cookie_header()))
                .unwrap_or_default();
            let body = "id,total\n1,42\n";
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/csv\r\nContent-Disposition: attachment; filename=report.csv\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                cookie,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await
        });
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    let server = TcpListener::bind("127.0.0.1:0").await?;
    let base = format!("http://{}/", server.local_addr()?);
    tokio::spawn(serve(server));

    let page = HeadlessPage::new(r#"<body><a id="exportBtn" href="/export?id=7">Export</a></body>"#, &base)?;
    let options = ListenOptions::new().attempts(10).callback(|ctx| {
        println!("download of {} finished", ctx.target);
        Ok(())
    });
    let timing = PollTiming::default().with_interval(250);
    let listener = listen_with(page.host(), "exportBtn", options, timing).await;

    if let Some(cycle) = listener.click(0).await?.cycle() {
        println!("indicator shown: {:?}", page.indicator.node().await.map(|n| n.message));
        let outcome = cycle.finished().await?;
        println!("{:?} after {} ticks, cookie jar now '{}'", outcome.reason, outcome.ticks, page.cookies.header().await);
    }
    Ok(())
}
