/// PDF export: defaults, custom margins with header/footer templates,
/// landscape orientation, a page range, and a PDF of generated HTML.
///
/// Run with:
///   cargo run --example generate_pdf --features browser
use std::path::Path;

use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use patrol_client::{BrowserSession, SessionConfig};
use patrol_core::output::output_path;

const REPORT_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>patrol PDF sample</title>
    <style>
        body { font-family: Arial, sans-serif; margin: 0; padding: 20px; line-height: 1.6; color: #333; }
        .header { border-bottom: 2px solid #007bff; padding-bottom: 10px; }
        table { width: 100%; border-collapse: collapse; margin-top: 20px; }
        th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
        th { background: #f8f9fa; }
        .note { margin-top: 30px; padding: 12px; background: #fff3cd; border-radius: 4px; }
    </style>
</head>
<body>
    <div class="header"><h1>Endpoint smoke-test report</h1></div>
    <p>Generated from in-memory HTML, no network round trip involved.</p>
    <table>
        <tr><th>Endpoint</th><th>Status</th><th>Elapsed</th></tr>
        <tr><td>current-time</td><td>200</td><td>41ms</td></tr>
        <tr><td>sso-parameter</td><td>200</td><td>88ms</td></tr>
        <tr><td>console-check</td><td>500</td><td>1203ms</td></tr>
    </table>
    <div class="note">One anomaly was appended to the rotating error log.</div>
</body>
</html>"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let out = Path::new("output");
    let url =
        std::env::var("PATROL_DEMO_URL").unwrap_or_else(|_| "https://example.com".to_string());

    println!("Launching browser…");
    let session = BrowserSession::launch(SessionConfig::default()).await?;
    let page = session.page(&url).await?;

    // 1. Plain A4 export with backgrounds.
    let path = output_path(out, "basic-webpage", "pdf")?;
    page.save_pdf(
        PrintToPdfParams::builder().print_background(true).build(),
        &path,
    )
    .await?;
    println!("Basic PDF saved: {}", path.display());

    // 2. Custom margins plus header and footer templates.
    let path = output_path(out, "custom-settings", "pdf")?;
    page.save_pdf(
        PrintToPdfParams::builder()
            .print_background(true)
            .margin_top(1.0)
            .margin_bottom(1.0)
            .margin_left(0.5)
            .margin_right(0.5)
            .display_header_footer(true)
            .header_template(
                r#"<div style="font-size: 10px; width: 100%; text-align: center;">patrol demo</div>"#,
            )
            .footer_template(
                r#"<div style="font-size: 10px; width: 100%; text-align: center;">Page <span class="pageNumber"></span> of <span class="totalPages"></span></div>"#,
            )
            .build(),
        &path,
    )
    .await?;
    println!("Custom-settings PDF saved: {}", path.display());

    // 3. Landscape orientation.
    let path = output_path(out, "landscape", "pdf")?;
    page.save_pdf(
        PrintToPdfParams::builder()
            .landscape(true)
            .print_background(true)
            .build(),
        &path,
    )
    .await?;
    println!("Landscape PDF saved: {}", path.display());

    // 4. First page only.
    let path = output_path(out, "page-range", "pdf")?;
    page.save_pdf(
        PrintToPdfParams::builder()
            .page_ranges("1")
            .print_background(true)
            .build(),
        &path,
    )
    .await?;
    println!("Page-range PDF saved: {}", path.display());

    // 5. Render generated HTML straight to PDF.
    let report = session.blank_page().await?;
    report.set_content(REPORT_HTML).await?;
    let pdf = report
        .pdf(PrintToPdfParams::builder().print_background(true).build())
        .await?;
    let path = output_path(out, "generated-report", "pdf")?;
    std::fs::write(&path, &pdf)?;
    println!(
        "Generated-content PDF saved: {} ({} bytes)",
        path.display(),
        pdf.len()
    );

    session.close().await?;
    println!("All PDFs are in the output directory");
    Ok(())
}
