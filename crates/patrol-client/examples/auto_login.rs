/// Hard-coded login-and-submit flow against a staging deployment: sign
/// in, open the application form, fill it, submit, and capture evidence
/// screenshots along the way. A missing element saves a screenshot of
/// the stuck page before bailing out.
///
/// The target host and credentials come from the environment so the demo
/// itself carries no secrets:
///   PATROL_DEMO_BASE, PATROL_DEMO_PHONE, PATROL_DEMO_PASSWORD
///
/// Run with:
///   cargo run --example auto_login --features browser
use std::path::Path;

use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page, ScreenshotParams};
use patrol_client::{BrowserSession, SessionConfig};
use patrol_core::output::{delay, output_path};

async fn save_shot(page: &Page, name: &str) -> anyhow::Result<()> {
    let path = output_path(Path::new("output"), name, "png")?;
    page.save_screenshot(
        ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(false)
            .build(),
        &path,
    )
    .await?;
    println!("Screenshot saved: {}", path.display());
    Ok(())
}

/// Find an element or bail with a screenshot of the page as it was.
async fn require_element(
    page: &Page,
    selector: &str,
) -> anyhow::Result<chromiumoxide::Element> {
    match page.find_element(selector).await {
        Ok(element) => Ok(element),
        Err(err) => {
            save_shot(page, "error-missing-element").await?;
            anyhow::bail!("element `{selector}` not found: {err}");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let base = std::env::var("PATROL_DEMO_BASE")
        .unwrap_or_else(|_| "http://staging.internal.example".to_string());
    let phone = std::env::var("PATROL_DEMO_PHONE").unwrap_or_else(|_| "13800000000".to_string());
    let password = std::env::var("PATROL_DEMO_PASSWORD").unwrap_or_else(|_| "123456".to_string());

    println!("Launching browser…");
    let session =
        BrowserSession::launch(SessionConfig::default().with_window(1366, 768)).await?;

    // 1. Sign in.
    let login_url = format!("{base}/login.htm");
    println!("Opening login page {login_url} …");
    let page = session.page(&login_url).await?;

    require_element(&page, "input#normal_login_phone")
        .await?
        .click()
        .await?
        .type_str(&phone)
        .await?;
    require_element(&page, "input#normal_login_password")
        .await?
        .click()
        .await?
        .type_str(&password)
        .await?;

    println!("Submitting credentials…");
    require_element(&page, "button[type=submit]").await?.click().await?;
    page.wait_for_navigation().await?;
    println!("Logged in, now at {}", page.url().await?.unwrap_or_default());
    save_shot(&page, "after-login").await?;

    // 2. Open the application form.
    let apply_url = format!("{base}/console/apply/seal.htm");
    println!("Opening application form {apply_url} …");
    page.goto(apply_url.as_str()).await?;
    page.wait_for_navigation().await?;

    // 3. Fill it in.
    println!("Filling the form…");
    require_element(&page, "input[name=name]")
        .await?
        .click()
        .await?
        .type_str("Automated application")
        .await?;
    require_element(&page, "input[name=use_count]")
        .await?
        .click()
        .await?
        .type_str("20")
        .await?;
    require_element(&page, "textarea[name=reason]")
        .await?
        .click()
        .await?
        .type_str("Submitted by the patrol auto-login demo.")
        .await?;
    save_shot(&page, "form-filled").await?;

    // 4. Submit and give the backend a moment to answer.
    println!("Submitting the form…");
    require_element(&page, "#commentForm button").await?.click().await?;
    delay(2000).await;
    save_shot(&page, "after-submit").await?;

    session.close().await?;
    println!("Done");
    Ok(())
}
