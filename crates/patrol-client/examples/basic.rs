/// Basic browser-session walkthrough: launch, navigate, read the page
/// title, URL, and rendered HTML, and evaluate a snippet in the page.
///
/// Run with:
///   cargo run --example basic --features browser
use patrol_client::{BrowserSession, SessionConfig};
use patrol_core::output::delay;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    // Set PATROL_HEADFUL=1 to watch the browser do its thing.
    let cfg = if std::env::var_os("PATROL_HEADFUL").is_some() {
        SessionConfig::headful()
    } else {
        SessionConfig::default()
    };

    println!("Launching browser…");
    let session = BrowserSession::launch(cfg).await?;

    let url =
        std::env::var("PATROL_DEMO_URL").unwrap_or_else(|_| "https://example.com".to_string());
    println!("Visiting {url} …");
    let page = session.page(&url).await?;

    let title = page
        .evaluate("document.title")
        .await?
        .into_value::<String>()?;
    println!("Page title: {title}");

    let current = page.url().await?.unwrap_or_default();
    println!("Current URL: {current}");

    let html = page.content().await?;
    println!("Rendered HTML: {} chars", html.len());

    let info = page
        .evaluate_function(
            "() => ({
                windowWidth: window.innerWidth,
                windowHeight: window.innerHeight,
                userAgent: navigator.userAgent,
                cookiesEnabled: navigator.cookieEnabled,
                language: navigator.language,
            })",
        )
        .await?
        .into_value::<serde_json::Value>()?;
    println!("Browser info:\n{}", serde_json::to_string_pretty(&info)?);

    // Leave the page up briefly, useful when running headful.
    delay(3000).await;

    session.close().await?;
    println!("Done");
    Ok(())
}
