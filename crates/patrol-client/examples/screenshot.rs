/// Screenshot gallery: full-page, viewport-only, clipped region, JPEG,
/// element capture, device-emulated, and in-memory base64.
///
/// Everything lands in `output/` with a timestamped name.
///
/// Run with:
///   cargo run --example screenshot --features browser
use std::path::Path;

use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, CaptureScreenshotParams, Viewport,
};
use chromiumoxide::page::ScreenshotParams;
use patrol_client::{BrowserSession, SessionConfig};
use patrol_core::output::output_path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let out = Path::new("output");
    let url =
        std::env::var("PATROL_DEMO_URL").unwrap_or_else(|_| "https://example.com".to_string());

    println!("Launching browser…");
    let session =
        BrowserSession::launch(SessionConfig::default().with_window(1920, 1080)).await?;
    let page = session.page(&url).await?;

    // 1. Full page, including anything below the fold.
    let path = output_path(out, "full-page-screenshot", "png")?;
    page.save_screenshot(
        ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build(),
        &path,
    )
    .await?;
    println!("Full-page screenshot saved: {}", path.display());

    // 2. Viewport only.
    let path = output_path(out, "viewport-screenshot", "png")?;
    page.save_screenshot(
        ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(false)
            .build(),
        &path,
    )
    .await?;
    println!("Viewport screenshot saved: {}", path.display());

    // 3. Clipped region.
    let path = output_path(out, "clip-screenshot", "png")?;
    page.save_screenshot(
        ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .clip(Viewport {
                x: 0.0,
                y: 0.0,
                width: 800.0,
                height: 600.0,
                scale: 1.0,
            })
            .build(),
        &path,
    )
    .await?;
    println!("Clipped screenshot saved: {}", path.display());

    // 4. JPEG with explicit quality.
    let path = output_path(out, "jpeg-screenshot", "jpg")?;
    page.save_screenshot(
        ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Jpeg)
            .quality(90)
            .full_page(true)
            .build(),
        &path,
    )
    .await?;
    println!("JPEG screenshot saved: {}", path.display());

    // 5. A single element.
    match page.find_element("h1").await {
        Ok(element) => {
            let path = output_path(out, "heading-element", "png")?;
            element
                .save_screenshot(CaptureScreenshotFormat::Png, &path)
                .await?;
            println!("Element screenshot saved: {}", path.display());
        }
        Err(err) => println!("No <h1> on this page, skipping element shot ({err})"),
    }

    // 6. Emulate a phone and capture the responsive layout.
    page.execute(
        SetDeviceMetricsOverrideParams::builder()
            .width(390)
            .height(844)
            .device_scale_factor(3.0)
            .mobile(true)
            .build()
            .map_err(|e| anyhow::anyhow!(e))?,
    )
    .await?;
    page.goto(url.as_str()).await?;
    page.wait_for_navigation().await?;

    let path = output_path(out, "mobile-screenshot", "png")?;
    page.save_screenshot(
        ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build(),
        &path,
    )
    .await?;
    println!("Mobile screenshot saved: {}", path.display());

    // 7. Base64 capture, no file written.
    let shot = page
        .execute(
            CaptureScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .build(),
        )
        .await?;
    println!("Base64 screenshot generated: {} chars", shot.data.len());

    session.close().await?;
    println!("All screenshots are in the output directory");
    Ok(())
}
