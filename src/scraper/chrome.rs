use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::app::{CorpusError, Result};
use crate::scraper::config::{RowSelectors, ScraperConfig};
use crate::scraper::driver::{DriverError, DriverResult, PageDriver, RawRow, RawTitle};

/// Headless Chrome tab driven through chromiumoxide
pub struct ChromePage {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    poll_interval: Duration,
    read_timeout: Duration,
}

impl ChromePage {
    /// Launch a browser with one blank tab
    pub async fn launch(config: &ScraperConfig) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-software-rasterizer")
            .request_timeout(config.page_load_timeout());

        if !config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .build()
            .map_err(|e| CorpusError::Browser(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            CorpusError::Browser(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            ))
        })?;

        // Spawn the browser handler
        let handler = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {
                // Handle browser events
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| CorpusError::Browser(format!("Failed to create page: {}", e)))?;

        if let Some(ref ua) = config.user_agent {
            page.set_user_agent(ua)
                .await
                .map_err(|e| CorpusError::Browser(format!("Failed to set user agent: {}", e)))?;
        }

        tracing::info!("Browser initialized successfully");

        Ok(Self {
            browser,
            page,
            handler,
            poll_interval: config.poll_interval(),
            read_timeout: config.content_ready_timeout(),
        })
    }

    async fn evaluate<T: DeserializeOwned>(
        &self,
        script: String,
        budget: Duration,
    ) -> DriverResult<T> {
        within(budget, "evaluating script", async {
            self.page
                .evaluate(script)
                .await
                .map_err(|e| DriverError::Script(e.to_string()))?
                .into_value()
                .map_err(|e| DriverError::Script(format!("Failed to parse result: {:?}", e)))
        })
        .await
    }

    /// Poll `probe` until it returns true or `timeout` elapses. A stalled
    /// evaluation is cut off at the deadline too.
    async fn poll_until(&self, what: &str, timeout: Duration, probe: &str) -> DriverResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            // Script errors mid-render count as "not yet"
            if let Ok(true) = self.evaluate::<bool>(probe.to_string(), remaining).await {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(DriverError::Timeout(format!(
                    "{} after {:.1}s",
                    what,
                    timeout.as_secs_f64()
                )));
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            tokio::time::sleep(self.poll_interval.min(remaining)).await;
        }
    }
}

/// Run `fut`, failing with a timeout once `budget` is spent
async fn within<T, F>(budget: Duration, what: &str, fut: F) -> DriverResult<T>
where
    F: std::future::Future<Output = DriverResult<T>>,
{
    match tokio::time::timeout(budget, fut).await {
        Ok(result) => result,
        Err(_) => Err(DriverError::Timeout(format!(
            "{} after {:.1}s",
            what,
            budget.as_secs_f64()
        ))),
    }
}

#[async_trait]
impl PageDriver for ChromePage {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> DriverResult<()> {
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(CdpError::Timeout)) | Err(_) => {
                Err(DriverError::Timeout(format!("loading {}", url)))
            }
            Ok(Err(e)) => Err(DriverError::Browser(format!("Navigation failed: {}", e))),
        }
    }

    async fn page_source(&mut self) -> DriverResult<String> {
        within(self.read_timeout, "reading page source", async {
            self.page
                .content()
                .await
                .map_err(|e| DriverError::Browser(format!("Failed to read page source: {}", e)))
        })
        .await
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> DriverResult<()> {
        let probe = format!("document.querySelector({}) !== null", js_string(selector));
        self.poll_until(&format!("waiting for {}", selector), timeout, &probe)
            .await
    }

    async fn click_when_ready(&mut self, selector: &str, timeout: Duration) -> DriverResult<()> {
        let probe = format!(
            r#"
            (() => {{
                const el = document.querySelector({selector});
                if (!el || el.disabled) return false;
                const rect = el.getBoundingClientRect();
                if (rect.width === 0 && rect.height === 0) return false;
                el.click();
                return true;
            }})()
            "#,
            selector = js_string(selector)
        );
        self.poll_until(&format!("clickable {}", selector), timeout, &probe)
            .await
            .map_err(|e| match e {
                DriverError::Timeout(_) => DriverError::NotFound(selector.to_string()),
                other => other,
            })
    }

    async fn read_title(
        &mut self,
        title_selector: &str,
        chapter_class: &str,
    ) -> DriverResult<Option<RawTitle>> {
        let script = format!(
            r#"
            (() => {{
                const text = el => el ? (el.innerText || el.textContent || '') : null;
                const title = document.querySelector({title});
                const chapter = title ? title.getElementsByClassName({chapter})[0] : null;
                return {{ book: text(title), chapter: text(chapter) }};
            }})()
            "#,
            title = js_string(title_selector),
            chapter = js_string(chapter_class)
        );
        // CDP drops a bare `null` result, so absence comes back as null fields
        let found: TitleProbe = self.evaluate(script, self.read_timeout).await?;
        Ok(match (found.book, found.chapter) {
            (Some(book), Some(chapter)) => Some(RawTitle { book, chapter }),
            _ => None,
        })
    }

    async fn read_rows(&mut self, selectors: RowSelectors<'_>) -> DriverResult<Vec<RawRow>> {
        self.evaluate(row_script(selectors), self.read_timeout).await
    }

    async fn release(mut self) -> DriverResult<()> {
        let closed = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| DriverError::Browser(format!("Failed to close browser: {}", e)));
        let _ = self.browser.wait().await;
        self.handler.abort();
        closed
    }
}

#[derive(Deserialize)]
struct TitleProbe {
    book: Option<String>,
    chapter: Option<String>,
}

/// Quote `s` as a JavaScript string literal
fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Script returning `[{number, content}]` for every row, `null` for a missing cell
fn row_script(selectors: RowSelectors<'_>) -> String {
    format!(
        r#"
        (() => {{
            const text = el => el ? (el.innerText || el.textContent || '') : null;
            return Array.from(document.querySelectorAll({rows})).map(row => ({{
                number: text(row.getElementsByClassName({number})[0]),
                content: text(row.getElementsByClassName({content})[0])
            }}));
        }})()
        "#,
        rows = js_string(selectors.rows),
        number = js_string(selectors.number_class),
        content = js_string(selectors.content_class)
    )
}
