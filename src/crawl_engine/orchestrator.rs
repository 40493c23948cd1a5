//! Worker pool orchestration
//!
//! Coordinates a crawl with:
//! - A fixed pool of tokio workers pulling from the shared frontier
//! - Cancellation that closes the frontier and aborts in-flight work
//! - The page limit
//! - Per-worker pacing between dequeues

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use log::{debug, error, info};
use std::sync::Arc;

use super::crawl_types::{CrawlError, CrawlResult};
use super::frontier::Pop;
use super::page_processor::{CrawlContext, UrlResult, process_url};

/// Pull URLs from the frontier until it drains, is closed or the crawl is cancelled
pub async fn worker_loop(ctx: Arc<CrawlContext>, worker_id: usize) {
    debug!(target: "frontier::coordinator", "Worker {worker_id} started");

    loop {
        if ctx.cancel.is_cancelled() {
            break;
        }

        let lease = match ctx.frontier.pop(ctx.config.pop_timeout()).await {
            Pop::Item(lease) => lease,
            Pop::Empty => {
                debug!(
                    target: "frontier::coordinator",
                    "Worker {worker_id} idle, {} urls in flight elsewhere",
                    ctx.frontier.in_flight()
                );
                continue;
            }
            Pop::Drained => break,
        };

        let url = lease.url().clone();
        let result = tokio::select! {
            biased;
            () = ctx.cancel.cancelled() => UrlResult::cancelled(),
            result = process_url(&ctx, &url) => result,
        };

        ctx.report(url.as_str(), &result);
        enforce_limit(&ctx);

        // Everything this URL pushed is already visible; release the lease before pacing
        drop(lease);

        if let Some(delay) = result.pace
            && !delay.is_zero()
        {
            tokio::select! {
                () = ctx.cancel.cancelled() => break,
                () = tokio::time::sleep(delay) => {}
            }
        }
    }

    debug!(target: "frontier::coordinator", "Worker {worker_id} finished");
}

fn enforce_limit(ctx: &CrawlContext) {
    if let Some(limit) = ctx.config.limit()
        && ctx.stats.pages_processed() >= limit as u64
        && !ctx.frontier.is_closed()
    {
        info!(target: "frontier::coordinator", "Reached page limit of {limit}");
        ctx.frontier.close();
    }
}

/// Run `concurrency` workers against `ctx` until all of them exit
///
/// # Errors
///
/// Returns `CrawlError::Bootstrap` when a worker task panicked. The remaining
/// workers still run to completion first.
pub async fn run_workers(ctx: Arc<CrawlContext>, concurrency: usize) -> CrawlResult<()> {
    if ctx.config.limit() == Some(0) {
        ctx.frontier.close();
    }

    // Cancellation closes the frontier so idle workers wake up and exit
    let closer = {
        let ctx = Arc::clone(&ctx);
        tokio::spawn(async move {
            ctx.cancel.cancelled().await;
            info!(target: "frontier::coordinator", "Crawl cancelled, closing frontier");
            ctx.frontier.close();
        })
    };

    let mut workers: FuturesUnordered<_> = (0..concurrency.max(1))
        .map(|worker_id| tokio::spawn(worker_loop(Arc::clone(&ctx), worker_id)))
        .collect();

    let mut failure = None;
    while let Some(joined) = workers.next().await {
        if let Err(e) = joined {
            error!(target: "frontier::coordinator", "Worker task failed: {e}");
            failure.get_or_insert(e.to_string());
        }
    }

    closer.abort();

    match failure {
        Some(reason) => Err(CrawlError::Bootstrap(format!("worker task failed: {reason}"))),
        None => Ok(()),
    }
}
