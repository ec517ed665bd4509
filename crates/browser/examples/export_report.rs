use dlwatch_browser::{ChromiumSession, LaunchConfig};
use dlwatch_core::{ListenOptions, SharedParams};
use dlwatch_engine::{listen, Click};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Usage: export_report <page-url> <selector-or-id>
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let url = args.next().unwrap_or_else(|| "http://localhost:8080/reports".to_string());
    let target = args.next().unwrap_or_else(|| "exportBtn".to_string());

    let session = ChromiumSession::launch(LaunchConfig::visible().with_navigation(60000).with_viewport(1440, 900)).await?;
    let page = Arc::new(session.open(&url).await?);

    let options = ListenOptions::new()
        .message("Generating report...")
        .param(SharedParams::new([("format", "xlsx")]))
        .callback(|ctx| {
            tracing::info!(binding = %ctx.target, "report downloaded");
            Ok(())
        });
    let listener = listen(page.host(), target.as_str(), options).await;
    tracing::info!(
        binding = %listener.context().target,
        elements = listener.elements().len(),
        cookie = %listener.config().token_name,
        "listening"
    );

    match listener.click(0).await? {
        Click::Started(cycle) => {
            let outcome = cycle.finished().await?;
            println!("{:?} after {} ticks", outcome.reason, outcome.ticks);
        }
        Click::Suppressed => println!("binding is disabled"),
    }

    session.close().await?;
    Ok(())
}
