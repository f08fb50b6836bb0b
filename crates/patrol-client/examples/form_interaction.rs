/// Form driving: text, email and number inputs, a select, radio buttons,
/// checkboxes, a textarea, and submit, all against a self-contained page
/// so the demo needs no network at all.
///
/// Run with:
///   cargo run --example form_interaction --features browser
use std::path::Path;

use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use patrol_client::{BrowserSession, SessionConfig};
use patrol_core::output::{delay, output_path};

const FORM_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Form interaction test</title>
    <style>
        body { font-family: Arial, sans-serif; max-width: 800px; margin: 0 auto; padding: 20px; }
        .form-group { margin-bottom: 15px; }
        label { display: block; margin-bottom: 5px; font-weight: bold; }
        input, select, textarea { width: 100%; padding: 8px; border: 1px solid #ddd; border-radius: 4px; }
        .inline input { width: auto; }
        button { background: #007bff; color: white; padding: 10px 20px; border: none; border-radius: 4px; }
        .result { margin-top: 20px; padding: 15px; background: #f8f9fa; border-radius: 4px; }
    </style>
</head>
<body>
    <h1>Form interaction test page</h1>
    <form id="test-form">
        <div class="form-group">
            <label for="name">Name:</label>
            <input type="text" id="name" name="name" placeholder="Your name">
        </div>
        <div class="form-group">
            <label for="email">Email:</label>
            <input type="email" id="email" name="email" placeholder="example@email.com">
        </div>
        <div class="form-group">
            <label for="age">Age:</label>
            <input type="number" id="age" name="age" min="1" max="120">
        </div>
        <div class="form-group">
            <label for="city">City:</label>
            <select id="city" name="city">
                <option value="">Choose a city</option>
                <option value="beijing">Beijing</option>
                <option value="shanghai">Shanghai</option>
                <option value="guangzhou">Guangzhou</option>
                <option value="shenzhen">Shenzhen</option>
            </select>
        </div>
        <div class="form-group inline">
            <label>Newsletter:</label>
            <input type="radio" id="sub-yes" name="subscribe" value="yes"> <label for="sub-yes">yes</label>
            <input type="radio" id="sub-no" name="subscribe" value="no"> <label for="sub-no">no</label>
        </div>
        <div class="form-group inline">
            <label>Interests:</label>
            <input type="checkbox" id="reading" name="hobbies" value="reading"> <label for="reading">reading</label>
            <input type="checkbox" id="sports" name="hobbies" value="sports"> <label for="sports">sports</label>
            <input type="checkbox" id="music" name="hobbies" value="music"> <label for="music">music</label>
        </div>
        <div class="form-group">
            <label for="message">Message:</label>
            <textarea id="message" name="message" rows="4" placeholder="Anything else…"></textarea>
        </div>
        <button type="submit">Submit</button>
    </form>
    <div id="result" class="result" style="display:none"></div>
    <script>
        document.getElementById('test-form').addEventListener('submit', (e) => {
            e.preventDefault();
            const data = Object.fromEntries(new FormData(e.target).entries());
            data.hobbies = Array.from(document.querySelectorAll('input[name=hobbies]:checked')).map(c => c.value);
            const result = document.getElementById('result');
            result.style.display = 'block';
            result.textContent = 'Submitted: ' + JSON.stringify(data);
        });
    </script>
</body>
</html>"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    println!("Launching browser…");
    let session = BrowserSession::launch(SessionConfig::default()).await?;
    let page = session.blank_page().await?;
    page.set_content(FORM_HTML).await?;

    // Text-like fields: focus by clicking, then type.
    println!("Filling text fields…");
    let name = page.find_element("#name").await?;
    name.click().await?;
    name.type_str("Alice Chen").await?;

    let email = page.find_element("#email").await?;
    email.click().await?;
    email.type_str("alice@example.com").await?;

    let age = page.find_element("#age").await?;
    age.click().await?;
    age.type_str("30").await?;

    // Selects don't open reliably through synthesized clicks; set the
    // value in the page and fire the change event instead.
    println!("Choosing a city…");
    page.evaluate_function(
        "() => {
            const select = document.querySelector('#city');
            select.value = 'shanghai';
            select.dispatchEvent(new Event('change', { bubbles: true }));
            return select.value;
        }",
    )
    .await?;

    println!("Clicking radio and checkboxes…");
    page.find_element("#sub-yes").await?.click().await?;
    page.find_element("#reading").await?.click().await?;
    page.find_element("#music").await?.click().await?;

    let message = page.find_element("#message").await?;
    message.click().await?;
    message
        .type_str("Filled in by the patrol form demo.")
        .await?;

    // Read everything back before submitting.
    let values = page
        .evaluate_function(
            "() => ({
                name: document.querySelector('#name').value,
                email: document.querySelector('#email').value,
                age: document.querySelector('#age').value,
                city: document.querySelector('#city').value,
                subscribe: document.querySelector('input[name=subscribe]:checked')?.value ?? null,
                hobbies: Array.from(document.querySelectorAll('input[name=hobbies]:checked')).map(c => c.value),
                message: document.querySelector('#message').value,
            })",
        )
        .await?
        .into_value::<serde_json::Value>()?;
    println!("Form state:\n{}", serde_json::to_string_pretty(&values)?);

    println!("Submitting…");
    page.find_element("button[type=submit]").await?.click().await?;
    delay(200).await;

    let result = page
        .evaluate("document.querySelector('#result').textContent")
        .await?
        .into_value::<String>()?;
    println!("{result}");

    let path = output_path(Path::new("output"), "form-submitted", "png")?;
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
