/// Device emulation: an iPhone-sized viewport with a matching user
/// agent, captured as a screenshot.
///
/// Run with:
///   cargo run --example emulate_device --features browser
use std::path::Path;

use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use patrol_client::{BrowserSession, SessionConfig};
use patrol_core::output::{delay, output_path};

const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 16_6 like Mac OS X) \
    AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Mobile/15E148 Safari/604.1";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let url =
        std::env::var("PATROL_DEMO_URL").unwrap_or_else(|_| "https://example.com".to_string());

    println!("Launching browser…");
    let session = BrowserSession::launch(SessionConfig::default()).await?;
    let page = session.blank_page().await?;

    println!("Emulating iPhone 13 Pro Max…");
    page.set_user_agent(IPHONE_UA).await?;
    page.execute(
        SetDeviceMetricsOverrideParams::builder()
            .width(428)
            .height(926)
            .device_scale_factor(3.0)
            .mobile(true)
            .build()
            .map_err(|e| anyhow::anyhow!(e))?,
    )
    .await?;

    println!("Visiting {url} …");
    page.goto(url.as_str()).await?;
    page.wait_for_navigation().await?;
    // Give the responsive layout a moment to settle before capturing.
    delay(1500).await;

    let path = output_path(Path::new("output"), "emulated-iphone", "png")?;
    page.save_screenshot(
        ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build(),
        &path,
    )
    .await?;
    println!("Screenshot saved: {}", path.display());

    session.close().await?;
    println!("Done");
    Ok(())
}
