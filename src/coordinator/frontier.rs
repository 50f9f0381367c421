// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! The URL-frontier actor: a single-consumer message loop owning a FIFO
//! queue of not-yet-visited paths plus a membership set, so that no path is
//! ever enqueued twice for the lifetime of a crawl.

use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::warn;

const SEND_TIMEOUT: Duration = Duration::from_secs(1);

enum Message {
    SendUrls(Vec<String>),
    GetUrl(oneshot::Sender<Option<String>>),
}

/// A handle to a running frontier actor. Cloning shares the same underlying
/// queue; producers talk to the actor only through this channel, never by
/// touching the queue directly.
#[derive(Clone)]
pub struct FrontierHandle {
    tx: mpsc::Sender<Message>,
}

impl FrontierHandle {
    /// Spawn the actor, seeded with `starting_uris`, and return a handle to
    /// it. The actor task runs until every clone of the handle is dropped.
    pub fn spawn(starting_uris: Vec<String>) -> Self {
        let (tx, mut rx) = mpsc::channel(256);

        tokio::spawn(async move {
            let mut queue = VecDeque::new();
            let mut seen = HashSet::new();
            for uri in starting_uris {
                if seen.insert(uri.clone()) {
                    queue.push_back(uri);
                }
            }

            while let Some(msg) = rx.recv().await {
                match msg {
                    Message::SendUrls(urls) => {
                        for url in urls {
                            if seen.insert(url.clone()) {
                                queue.push_back(url);
                            }
                        }
                    }
                    Message::GetUrl(reply) => {
                        let _ = reply.send(queue.pop_front());
                    }
                }
            }
        });

        Self { tx }
    }

    /// `SendUrls`: enqueue every URL not already seen. Bounded by a 1-second
    /// send timeout; on timeout the URLs are silently dropped (best-effort
    /// scraping under backpressure), per spec.md §4.E.
    pub async fn send_urls(&self, urls: Vec<String>) {
        if urls.is_empty() {
            return;
        }
        let send = self.tx.send(Message::SendUrls(urls));
        if tokio::time::timeout(SEND_TIMEOUT, send).await.is_err() {
            warn!("frontier SendUrls timed out after {:?}; dropping URLs", SEND_TIMEOUT);
        }
    }

    /// `GetUrl`: dequeue the head, or `None` if the frontier is empty.
    pub async fn get_url(&self) -> Option<String> {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self.tx.send(Message::GetUrl(reply_tx)).await.is_err() {
            return None;
        }
        reply_rx.await.unwrap_or(None)
    }
}
