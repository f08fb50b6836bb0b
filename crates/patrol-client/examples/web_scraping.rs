/// Scraping three ways: a live site, a static HTML table, and content
/// that only appears after a script runs. Results land in a JSON report.
///
/// Run with:
///   cargo run --example web_scraping --features browser
use std::path::Path;

use patrol_client::{BrowserSession, SessionConfig};
use patrol_core::output::{delay, output_path};
use serde::Deserialize;

#[derive(Debug, Deserialize, serde::Serialize)]
struct Story {
    title: String,
    url: Option<String>,
    score: Option<String>,
}

#[derive(Debug, Deserialize, serde::Serialize)]
struct Product {
    name: String,
    price: String,
    stock: String,
}

const TABLE_HTML: &str = r#"<!DOCTYPE html>
<html>
<body>
    <table id="products">
        <tr><th>Name</th><th>Price</th><th>Stock</th></tr>
        <tr><td>Keyboard</td><td>49.00</td><td>In stock</td></tr>
        <tr><td>Mouse</td><td>25.50</td><td>In stock</td></tr>
        <tr><td>Monitor</td><td>320.00</td><td>Backorder</td></tr>
    </table>
</body>
</html>"#;

const DYNAMIC_HTML: &str = r#"<!DOCTYPE html>
<html>
<body>
    <div id="dynamic-content"><p>Loading…</p></div>
    <script>
        setTimeout(() => {
            document.querySelector('#dynamic-content').innerHTML =
                '<h3>Loaded after 500ms</h3><ul><li>alpha</li><li>beta</li><li>gamma</li></ul>';
        }, 500);
    </script>
</body>
</html>"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    println!("Launching browser…");
    let session = BrowserSession::launch(SessionConfig::default()).await?;

    // 1. A live page: front-page headlines.
    println!("Scraping news.ycombinator.com …");
    let page = session.page("https://news.ycombinator.com").await?;
    let stories = page
        .evaluate_function(
            "() => Array.from(document.querySelectorAll('.athing')).slice(0, 10).map(row => {
                const link = row.querySelector('.titleline a');
                const score = row.nextElementSibling?.querySelector('.score');
                return {
                    title: link?.innerText ?? '',
                    url: link?.href ?? null,
                    score: score?.innerText ?? null,
                };
            })",
        )
        .await?
        .into_value::<Vec<Story>>()?;
    println!("Got {} stories:", stories.len());
    for (i, story) in stories.iter().enumerate() {
        println!(
            "  {}. {} ({})",
            i + 1,
            story.title,
            story.score.as_deref().unwrap_or("no score")
        );
    }

    // 2. A static table, row by row.
    println!("Extracting table rows…");
    let table_page = session.blank_page().await?;
    table_page.set_content(TABLE_HTML).await?;
    let products = table_page
        .evaluate_function(
            "() => Array.from(document.querySelectorAll('#products tr')).slice(1).map(row => {
                const cells = row.querySelectorAll('td');
                return {
                    name: cells[0].innerText,
                    price: cells[1].innerText,
                    stock: cells[2].innerText,
                };
            })",
        )
        .await?
        .into_value::<Vec<Product>>()?;
    println!("Got {} products", products.len());

    // 3. Content inserted by a script after load.
    println!("Waiting for dynamically inserted content…");
    let dynamic_page = session.blank_page().await?;
    dynamic_page.set_content(DYNAMIC_HTML).await?;
    delay(800).await;
    let heading = dynamic_page
        .find_element("#dynamic-content h3")
        .await?
        .inner_text()
        .await?
        .unwrap_or_default();
    let items = dynamic_page
        .evaluate_function(
            "() => Array.from(document.querySelectorAll('#dynamic-content li')).map(li => li.innerText)",
        )
        .await?
        .into_value::<Vec<String>>()?;
    println!("Dynamic heading: {heading}; items: {items:?}");

    // Everything into one report.
    let report = serde_json::json!({
        "stories": stories,
        "products": products,
        "dynamic": { "heading": heading, "items": items },
    });
    let path = output_path(Path::new("output"), "scraping-report", "json")?;
    std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
    println!("Report saved: {}", path.display());

    session.close().await?;
    println!("Done");
    Ok(())
}
