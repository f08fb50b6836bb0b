use std::path::PathBuf;

use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;

use patrol_core::error::AppError;

/// Launch options for a [`BrowserSession`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub headless: bool,
    pub width: u32,
    pub height: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            headless: true,
            width: 1280,
            height: 720,
        }
    }
}

impl SessionConfig {
    pub fn headful() -> Self {
        Self {
            headless: false,
            ..Self::default()
        }
    }

    pub fn with_window(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// A Chromium process driven over the Chrome DevTools Protocol.
///
/// One process per session; each [`page`](Self::page) call opens a new
/// tab. The CDP handler is polled on a background task for the lifetime
/// of the session; without that polling no command completes.
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl BrowserSession {
    /// Launch Chromium with the given options.
    ///
    /// Requires a Chrome/Chromium binary reachable via `$PATH`, one of
    /// the well-known install locations, or the `CHROME_BIN` override.
    pub async fn launch(cfg: SessionConfig) -> Result<Self, AppError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .disable_default_args()
            .window_size(cfg.width, cfg.height);

        if let Some(bin) = find_chrome_binary() {
            tracing::info!("Using Chrome binary: {}", bin.display());
            builder = builder.chrome_executable(bin);
        }

        if cfg.headless {
            builder = builder.arg("--headless=new").arg("--disable-gpu");
        } else {
            builder = builder.with_head();
        }

        let config = builder
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-popup-blocking")
            .arg("--disable-translate")
            .arg("--no-first-run")
            .build()
            .map_err(|e| AppError::BrowserError(format!("Browser config error: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AppError::BrowserError(format!("Failed to launch browser: {e}")))?;

        // The CDP handler must be polled continuously for the connection
        // to work.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    tracing::warn!("Browser CDP handler error: {event:?}");
                    break;
                }
            }
        });

        Ok(Self { browser, handler })
    }

    /// Open a new tab, navigate to `url`, and wait for the load event.
    pub async fn page(&self, url: &str) -> Result<Page, AppError> {
        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| AppError::BrowserError(format!("Failed to open {url}: {e}")))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| AppError::BrowserError(format!("Navigation to {url} failed: {e}")))?;
        Ok(page)
    }

    /// Open an empty tab for `set_content` flows.
    pub async fn blank_page(&self) -> Result<Page, AppError> {
        self.browser
            .new_page("about:blank")
            .await
            .map_err(|e| AppError::BrowserError(format!("Failed to open blank page: {e}")))
    }

    /// Shut the browser down and wait for the handler task to finish.
    pub async fn close(mut self) -> Result<(), AppError> {
        self.browser
            .close()
            .await
            .map_err(|e| AppError::BrowserError(format!("Failed to close browser: {e}")))?;
        let _ = self.handler.await;
        Ok(())
    }
}

/// Locate a usable Chrome/Chromium binary.
///
/// Snap-packaged Chromium wraps the real binary in a launcher that
/// rejects standard Chrome CLI flags, so the path buried inside the snap
/// comes first, then other common install locations. `CHROME_BIN` wins
/// over everything. Returning `None` lets chromiumoxide run its own
/// lookup.
fn find_chrome_binary() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("CHROME_BIN") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    let candidates: &[&str] = &[
        "/snap/chromium/current/usr/lib/chromium-browser/chrome",
        "/var/lib/flatpak/exports/bin/org.chromium.Chromium",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/google-chrome",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    ];

    candidates.iter().map(PathBuf::from).find(|p| p.exists())
}
