// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # auto-csp
//!
//! Derives a minimal, working Content-Security-Policy for a target web
//! origin by observing which resources that origin actually loads.
//!
//! A rewriting reverse proxy ([`proxy`]) makes the target origin appear to
//! the browser as `localhost:<proxy_port>`, injecting a maximally
//! restrictive policy in `Content-Security-Policy-Report-Only` mode
//! ([`csp`]). Violation reports land on a second embedded server
//! ([`report`]) and are folded into the policy by the relaxation engine
//! ([`engine`]). A crawl coordinator ([`coordinator`]) drives a headless
//! browser (an opaque [`driver::BrowserDriver`]) over the proxied site
//! until a timeout or an exhausted URL frontier, at which point the
//! accumulated policy is emitted.
//!
//! ## Example
//!
//! ```rust,no_run
//! use auto_csp::coordinator::{CoordinatorConfig, CrawlCoordinator};
//! use auto_csp::driver::NullDriver;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CoordinatorConfig::starting_uris_or_default(
//!         "example.com".to_string(),
//!         8080,
//!         Vec::new(),
//!     );
//!     let coordinator = CrawlCoordinator::new(config, Box::new(NullDriver));
//!     let policy = coordinator.run().await?;
//!     println!("{policy}");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod coordinator;
pub mod csp;
pub mod driver;
pub mod engine;
pub mod error;
pub mod proxy;
pub mod report;
pub mod server;

pub use coordinator::{CoordinatorConfig, CrawlCoordinator};
pub use csp::{Directive, Policy, ViolationReport};
pub use driver::BrowserDriver;
pub use engine::PolicyEngine;
pub use error::{Error, Result};
