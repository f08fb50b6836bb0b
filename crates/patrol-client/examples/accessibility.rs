/// Accessibility snapshot: dump the full accessibility tree the browser
/// exposes to assistive technology, as JSON.
///
/// Run with:
///   cargo run --example accessibility --features browser
use std::path::Path;

use chromiumoxide::cdp::browser_protocol::accessibility::{EnableParams, GetFullAxTreeParams};
use patrol_client::{BrowserSession, SessionConfig};
use patrol_core::output::output_path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let url =
        std::env::var("PATROL_DEMO_URL").unwrap_or_else(|_| "https://example.com".to_string());

    println!("Launching browser…");
    let session = BrowserSession::launch(SessionConfig::default()).await?;

    println!("Visiting {url} …");
    let page = session.page(&url).await?;

    println!("Capturing accessibility tree…");
    page.execute(EnableParams::default()).await?;
    let tree = page.execute(GetFullAxTreeParams::default()).await?;
    println!("Tree has {} nodes", tree.nodes.len());

    let path = output_path(Path::new("output"), "accessibility-tree", "json")?;
    std::fs::write(&path, serde_json::to_string_pretty(&tree.nodes)?)?;
    println!("Accessibility tree saved: {}", path.display());

    session.close().await?;
    println!("Done");
    Ok(())
}
