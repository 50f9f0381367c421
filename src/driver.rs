// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! The headless-browser driver contract.
//!
//! The browser itself is out of scope (spec.md §1): it is modeled as an
//! opaque controller with `load(url)` / `quit()`. Production wiring of a
//! real Chrome/Firefox driver is an external integration; this crate ships
//! the trait plus two test doubles.

use async_trait::async_trait;
use tracing::info;

use crate::error::Result;

/// A headless browser, as far as the crawl coordinator needs to know about
/// one: something that can be told to load a URL and, eventually, quit.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Navigate to `url` and block until the page has settled.
    async fn load(&self, url: &str) -> Result<()>;

    /// Terminate the browser. Takes `self` by value (boxed) so a driver
    /// cannot be used after quitting.
    async fn quit(self: Box<Self>);
}

/// A driver that does nothing but log. Used in tests and as a placeholder
/// when no real browser is wired up.
#[derive(Debug, Default)]
pub struct NullDriver;

#[async_trait]
impl BrowserDriver for NullDriver {
    async fn load(&self, _url: &str) -> Result<()> {
        Ok(())
    }

    async fn quit(self: Box<Self>) {}
}

/// Like [`NullDriver`], but logs every `load` call at info level. Useful for
/// dry-running the crawl coordinator against a real proxy without a real
/// browser attached.
#[derive(Debug, Default)]
pub struct LoggingDriver;

#[async_trait]
impl BrowserDriver for LoggingDriver {
    async fn load(&self, url: &str) -> Result<()> {
        info!("LoggingDriver: would load {}", url);
        Ok(())
    }

    async fn quit(self: Box<Self>) {
        info!("LoggingDriver: quit");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_driver_never_fails() {
        let driver = NullDriver;
        assert!(driver.load("http://localhost:8080/").await.is_ok());
        Box::new(driver).quit().await;
    }

    #[tokio::test]
    async fn logging_driver_never_fails() {
        let driver = LoggingDriver;
        assert!(driver.load("http://localhost:8080/x").await.is_ok());
        Box::new(driver).quit().await;
    }
}
