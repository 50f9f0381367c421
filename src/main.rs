// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! `auto-csp` CLI: `proxy`, `endpoint-and-proxy`, `automated-browser`.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use regex::Regex;
use tracing::info;

use auto_csp::config::{BrowserKind, Cli, Command};
use auto_csp::coordinator::{CoordinatorConfig, CrawlCoordinator};
use auto_csp::csp::Policy;
use auto_csp::driver::LoggingDriver;
use auto_csp::engine::PolicyEngine;
use auto_csp::proxy::{self, ProxyConfig, ProxyState};
use auto_csp::report;
use auto_csp::server::ServerHandle;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let log_path = match &cli.command {
        Command::AutomatedBrowser { log, .. } => log.as_deref(),
        _ => None,
    };
    if let Err(err) = auto_csp::config::init_logging(log_path) {
        eprintln!("failed to initialize logging: {err}");
        return std::process::ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:?}");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Proxy { proxy_port, target_domain } => run_proxy_only(proxy_port, target_domain).await,
        Command::EndpointAndProxy { proxy_port, target_domain } => {
            run_endpoint_and_proxy(proxy_port, target_domain).await
        }
        Command::AutomatedBrowser {
            proxy_port,
            target_domains,
            alternate_start,
            browser,
            delay,
            timeout,
            log: _,
        } => run_automated_browser(proxy_port, target_domains, alternate_start, browser, delay, timeout).await,
    }
}

/// `proxy`: the rewriting proxy alone, no report endpoint, no relaxation.
/// The policy it serves is the strict scaffold, static for the process
/// lifetime, since there is nowhere for violation reports to land.
async fn run_proxy_only(proxy_port: u16, target_domain: String) -> anyhow::Result<()> {
    let self_pattern = Regex::new(&format!(r"(https?://localhost:{proxy_port}).*"))
        .expect("self pattern always compiles");
    let engine = Arc::new(PolicyEngine::new(Policy::make_strict(None, None), self_pattern));

    let proxy_config = ProxyConfig {
        target_domain,
        proxy_port,
        reporting_api_group: None,
    };
    let state = Arc::new(ProxyState::new(proxy_config, engine, None));
    let server = ServerHandle::spawn(local_addr(proxy_port), proxy::router(state))
        .await
        .context("failed to start proxy")?;

    info!("proxy listening on {}", server.addr);
    wait_for_ctrl_c().await;
    server.stop(Duration::from_secs(1), Duration::from_secs(1)).await;
    Ok(())
}

/// `endpoint-and-proxy`: both servers, with relaxation wired end to end.
async fn run_endpoint_and_proxy(proxy_port: u16, target_domain: String) -> anyhow::Result<()> {
    let report_listener = ServerHandle::bind(local_addr(0)).await.context("failed to bind report endpoint")?;
    let report_port = report_listener.local_addr()?.port();
    let report_uri_endpoint = format!("http://localhost:{report_port}/uri");

    let self_pattern = Regex::new(&format!(r"(https?://localhost:{proxy_port}).*"))
        .expect("self pattern always compiles");
    let engine = Arc::new(PolicyEngine::new(
        Policy::make_strict(None, Some(&report_uri_endpoint)),
        self_pattern,
    ));

    let report_server = ServerHandle::serve(report_listener, report::router(engine.clone()));
    info!("report endpoint listening on {}", report_server.addr);

    let proxy_config = ProxyConfig {
        target_domain,
        proxy_port,
        reporting_api_group: None,
    };
    let state = Arc::new(ProxyState::new(proxy_config, engine, None));
    let proxy_server = ServerHandle::spawn(local_addr(proxy_port), proxy::router(state))
        .await
        .context("failed to start proxy")?;
    info!("proxy listening on {}", proxy_server.addr);

    wait_for_ctrl_c().await;
    proxy_server.stop(Duration::from_secs(1), Duration::from_secs(1)).await;
    report_server.stop(Duration::from_secs(1), Duration::from_secs(1)).await;
    Ok(())
}

/// `automated-browser`: run the full crawl pipeline per target domain, in
/// sequence. The real Chrome/Firefox driver is an external integration
/// (spec.md §1); this binary wires a [`LoggingDriver`] so the pipeline is
/// exercisable end to end without one.
async fn run_automated_browser(
    proxy_port: u16,
    target_domains: Vec<String>,
    alternate_start: Vec<String>,
    browser: BrowserKind,
    delay: u64,
    timeout: u64,
) -> anyhow::Result<()> {
    for target_domain in target_domains {
        info!("starting crawl of {} via {:?} driver placeholder", target_domain, browser);
        let config = CoordinatorConfig {
            target_domain: target_domain.clone(),
            proxy_port,
            starting_uris: alternate_start.clone(),
            timeout_minutes: timeout,
            load_delay_seconds: delay,
            reporting_api_group: None,
        };
        let coordinator = CrawlCoordinator::new(config, Box::new(LoggingDriver));
        let policy = coordinator
            .run()
            .await
            .with_context(|| format!("crawl of {target_domain} failed"))?;
        println!("{policy}");
    }
    Ok(())
}

fn local_addr(port: u16) -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
}

async fn wait_for_ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for ctrl-c: {}", err);
    }
}
