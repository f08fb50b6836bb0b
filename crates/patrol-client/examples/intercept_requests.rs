/// Request interception through the Fetch domain: every image request is
/// aborted, everything else continues. The final screenshot shows the
/// page rendered without any images.
///
/// Run with:
///   cargo run --example intercept_requests --features browser
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, FailRequestParams,
};
use chromiumoxide::cdp::browser_protocol::network::{ErrorReason, ResourceType};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use futures::StreamExt;
use patrol_client::{BrowserSession, SessionConfig};
use patrol_core::output::output_path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let url = std::env::var("PATROL_DEMO_URL")
        .unwrap_or_else(|_| "https://en.wikipedia.org/wiki/Cat".to_string());

    println!("Launching browser…");
    let session = BrowserSession::launch(SessionConfig::default()).await?;
    let page = session.blank_page().await?;

    // Pause every request at the Fetch domain before it leaves the
    // browser, then decide per request.
    page.execute(EnableParams::default()).await?;
    let mut paused = page.event_listener::<EventRequestPaused>().await?;
    println!("Request interception enabled");

    let blocked = Arc::new(AtomicUsize::new(0));
    let blocked_counter = blocked.clone();
    let intercept_page = page.clone();
    tokio::spawn(async move {
        while let Some(event) = paused.next().await {
            let request_id = event.request_id.clone();
            let result = if event.resource_type == ResourceType::Image {
                blocked_counter.fetch_add(1, Ordering::Relaxed);
                tracing::info!("blocking image request: {}", event.request.url);
                intercept_page
                    .execute(FailRequestParams::new(request_id, ErrorReason::Aborted))
                    .await
                    .map(|_| ())
            } else {
                intercept_page
                    .execute(ContinueRequestParams::new(request_id))
                    .await
                    .map(|_| ())
            };
            if let Err(err) = result {
                // Requests can finish (or the tab can go away) before the
                // verdict lands.
                tracing::debug!("interception verdict not delivered: {err}");
            }
        }
    });

    println!("Visiting {url} …");
    page.goto(url.as_str()).await?;
    page.wait_for_navigation().await?;

    println!(
        "Page loaded, {} image requests blocked",
        blocked.load(Ordering::Relaxed)
    );

    let path = output_path(Path::new("output"), "no-images", "png")?;
    page.save_screenshot(
        ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(false)
            .build(),
        &path,
    )
    .await?;
    println!("Screenshot saved: {}", path.display());

    session.close().await?;
    println!("Done");
    Ok(())
}
