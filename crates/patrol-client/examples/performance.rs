/// Performance probing: CDP runtime metrics, navigation and resource
/// timing pulled from the page, then a second load under network and CPU
/// throttling for comparison. Everything ends up in a JSON report.
///
/// Run with:
///   cargo run --example performance --features browser
use std::path::Path;
use std::time::Instant;

use chromiumoxide::cdp::browser_protocol::emulation::SetCpuThrottlingRateParams;
use chromiumoxide::cdp::browser_protocol::network::EmulateNetworkConditionsParams;
use chromiumoxide::cdp::browser_protocol::performance::{EnableParams, GetMetricsParams};
use patrol_client::{BrowserSession, SessionConfig};
use patrol_core::output::output_path;
use serde_json::{Value, json};

fn metrics_to_json(metrics: &[chromiumoxide::cdp::browser_protocol::performance::Metric]) -> Value {
    Value::Object(
        metrics
            .iter()
            .map(|m| (m.name.clone(), json!(m.value)))
            .collect(),
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let url =
        std::env::var("PATROL_DEMO_URL").unwrap_or_else(|_| "https://example.com".to_string());

    println!("Launching browser…");
    let session = BrowserSession::launch(SessionConfig::default()).await?;
    let page = session.blank_page().await?;
    page.execute(EnableParams::default()).await?;

    // First load, unthrottled.
    println!("Visiting {url} …");
    let start = Instant::now();
    page.goto(url.as_str()).await?;
    page.wait_for_navigation().await?;
    let plain_load_ms = start.elapsed().as_millis() as u64;
    println!("Loaded in {plain_load_ms}ms");

    let initial = page.execute(GetMetricsParams::default()).await?;
    for metric in &initial.metrics {
        match metric.name.as_str() {
            "Nodes" => println!("DOM nodes: {}", metric.value),
            "Documents" => println!("Documents: {}", metric.value),
            "JSEventListeners" => println!("Event listeners: {}", metric.value),
            "JSHeapUsedSize" => {
                println!("JS heap used: {:.2} MB", metric.value / 1024.0 / 1024.0);
            }
            _ => {}
        }
    }

    // Navigation timing as the page itself measured it.
    let navigation = page
        .evaluate_function(
            "() => {
                const nav = performance.getEntriesByType('navigation')[0];
                if (!nav) return null;
                return {
                    ttfb: nav.responseStart - nav.requestStart,
                    domContentLoaded: nav.domContentLoadedEventEnd - nav.startTime,
                    load: nav.loadEventEnd - nav.startTime,
                    transferSize: nav.transferSize,
                };
            }",
        )
        .await?
        .into_value::<Value>()?;
    println!(
        "Navigation timing:\n{}",
        serde_json::to_string_pretty(&navigation)?
    );

    // The heaviest resources on the page.
    let resources = page
        .evaluate_function(
            "() => performance.getEntriesByType('resource').slice(0, 20).map(r => ({
                name: r.name,
                type: r.initiatorType,
                duration: Math.round(r.duration),
                size: r.transferSize,
            }))",
        )
        .await?
        .into_value::<Value>()?;

    // Second load under a slow connection and a 4x slower CPU.
    println!("Throttling network and CPU, reloading…");
    page.execute(
        EmulateNetworkConditionsParams::builder()
            .offline(false)
            .latency(40.0)
            .download_throughput(750_000.0)
            .upload_throughput(250_000.0)
            .build()
            .map_err(|e| anyhow::anyhow!(e))?,
    )
    .await?;
    page.execute(
        SetCpuThrottlingRateParams::builder()
            .rate(4.0)
            .build()
            .map_err(|e| anyhow::anyhow!(e))?,
    )
    .await?;

    let start = Instant::now();
    page.goto(url.as_str()).await?;
    page.wait_for_navigation().await?;
    let throttled_load_ms = start.elapsed().as_millis() as u64;
    println!("Throttled load took {throttled_load_ms}ms");

    let throttled = page.execute(GetMetricsParams::default()).await?;

    // Back to normal before the session closes.
    page.execute(
        EmulateNetworkConditionsParams::builder()
            .offline(false)
            .latency(0.0)
            .download_throughput(-1.0)
            .upload_throughput(-1.0)
            .build()
            .map_err(|e| anyhow::anyhow!(e))?,
    )
    .await?;
    page.execute(
        SetCpuThrottlingRateParams::builder()
            .rate(1.0)
            .build()
            .map_err(|e| anyhow::anyhow!(e))?,
    )
    .await?;

    let report = json!({
        "url": url,
        "load_ms": { "plain": plain_load_ms, "throttled": throttled_load_ms },
        "navigation": navigation,
        "resources": resources,
        "metrics": {
            "initial": metrics_to_json(&initial.metrics),
            "throttled": metrics_to_json(&throttled.metrics),
        },
    });
    let path = output_path(Path::new("output"), "performance-report", "json")?;
    std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
    println!("Report saved: {}", path.display());

    session.close().await?;
    println!("Done");
    Ok(())
}
