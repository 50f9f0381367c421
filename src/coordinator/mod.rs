// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! The crawl coordinator (spec.md §4.E): owns the URL frontier, the browser
//! driver, and the lifecycle of the proxy and report-endpoint servers.

pub mod frontier;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use tokio::time::Instant;
use tracing::info;

use crate::csp::Policy;
use crate::driver::BrowserDriver;
use crate::engine::PolicyEngine;
use crate::error::{Error, Result};
use crate::proxy::{self, ProxyConfig, ProxyState};
use crate::report;
use crate::server::ServerHandle;
use frontier::FrontierHandle;

const STARTUP_SETTLE: Duration = Duration::from_secs(1);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);
const SHUTDOWN_FORCE: Duration = Duration::from_secs(1);

/// Everything the coordinator needs to run one crawl.
pub struct CoordinatorConfig {
    pub target_domain: String,
    pub proxy_port: u16,
    pub starting_uris: Vec<String>,
    pub timeout_minutes: u64,
    pub load_delay_seconds: u64,
    pub reporting_api_group: Option<String>,
}

impl CoordinatorConfig {
    pub fn starting_uris_or_default(target_domain: String, proxy_port: u16, uris: Vec<String>) -> Self {
        let starting_uris = if uris.is_empty() { vec!["/".to_string()] } else { uris };
        Self {
            target_domain,
            proxy_port,
            starting_uris,
            timeout_minutes: 10,
            load_delay_seconds: 2,
            reporting_api_group: None,
        }
    }
}

/// Owns the frontier actor, the browser driver, and the proxy/report
/// server lifecycle for a single crawl of one target domain.
pub struct CrawlCoordinator {
    config: CoordinatorConfig,
    driver: Box<dyn BrowserDriver>,
}

impl CrawlCoordinator {
    pub fn new(config: CoordinatorConfig, driver: Box<dyn BrowserDriver>) -> Self {
        Self { config, driver }
    }

    /// Run the full lifecycle: seed the frontier, start both servers,
    /// crawl under the global timeout, then shut everything down and
    /// return the final serialized policy.
    pub async fn run(self) -> Result<String> {
        let CrawlCoordinator { config, driver } = self;

        // Start the report endpoint first: its OS-chosen port feeds the
        // strict policy's `report-uri` directive.
        let report_listener = ServerHandle::bind(local_addr(0)).await?;
        let report_port = report_listener
            .local_addr()
            .expect("bound listener has a local address")
            .port();
        let report_uri_endpoint = format!("http://localhost:{report_port}/uri");

        let self_pattern = Regex::new(&format!(r"(https?://localhost:{}).*", config.proxy_port))
            .expect("self pattern always compiles");
        let policy = Policy::make_strict(
            config.reporting_api_group.as_deref(),
            Some(&report_uri_endpoint),
        );
        let engine = Arc::new(PolicyEngine::new(policy, self_pattern));

        let report_router = report::router(engine.clone());
        let report_server = ServerHandle::serve(report_listener, report_router);
        tokio::time::sleep(STARTUP_SETTLE).await;

        let frontier = FrontierHandle::spawn(config.starting_uris.clone());

        let proxy_config = ProxyConfig {
            target_domain: config.target_domain.clone(),
            proxy_port: config.proxy_port,
            reporting_api_group: config.reporting_api_group.clone(),
        };
        let proxy_state = Arc::new(ProxyState::new(proxy_config, engine.clone(), Some(frontier.clone())));
        let proxy_server =
            ServerHandle::spawn(local_addr(config.proxy_port), proxy::router(proxy_state)).await?;
        tokio::time::sleep(STARTUP_SETTLE).await;

        let deadline = Instant::now() + Duration::from_secs(config.timeout_minutes * 60);
        loop {
            if Instant::now() >= deadline {
                break;
            }

            let Some(path) = frontier.get_url().await else {
                break;
            };

            let url = format!("http://localhost:{}{}", config.proxy_port, path);
            info!("Visiting {}", url);
            if let Err(err) = driver.load(&url).await {
                let err = Error::driver(format!("failed loading {url}: {err}"));
                tracing::error!("{}", err);
                break;
            }
            tokio::time::sleep(Duration::from_secs(config.load_delay_seconds)).await;
        }

        info!("Policy for {}:", config.target_domain);
        driver.quit().await;
        drop(frontier);

        let final_policy = engine.serialize();
        info!("{}", final_policy);

        proxy_server.stop(SHUTDOWN_GRACE, SHUTDOWN_FORCE).await;
        report_server.stop(SHUTDOWN_GRACE, SHUTDOWN_FORCE).await;

        Ok(final_policy)
    }
}

fn local_addr(port: u16) -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::NullDriver;

    #[tokio::test]
    async fn immediately_empty_frontier_exits_without_visiting() {
        let config = CoordinatorConfig {
            target_domain: "example.com".to_string(),
            proxy_port: 0,
            starting_uris: Vec::new(),
            timeout_minutes: 5,
            load_delay_seconds: 0,
            reporting_api_group: None,
        };
        // proxy_port 0 lets the OS choose, so this test does not collide
        // with a real proxy instance on a fixed port.
        let coordinator = CrawlCoordinator::new(config, Box::new(NullDriver));
        let policy = coordinator.run().await.unwrap();
        assert!(policy.contains("default-src 'none'"));
    }
}
