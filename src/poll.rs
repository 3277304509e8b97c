//! Background catalog requests.
//!
//! The UI thread never touches the network.  It queues [`Request`]s; a
//! dispatcher task on the tokio runtime runs each one as its own task and
//! sends the [`Response`] back over an unbounded channel.
//!
//! Requests run concurrently and may complete in any order.  Page loads
//! and polls carry a sequence number issued by a [`RequestSeq`], and the
//! app drops any completion that is not the latest of its class.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::catalog::{CatalogSource, FetchError, PageResult, SourceView};

/// Why a page load was issued.  Decides how a failure is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    Startup,
    Navigate,
    ManualRefresh,
}

/// Work queued by the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Replace the collection with `page`.
    LoadPage { seq: u64, page: u32, origin: LoadOrigin },
    /// Re-fetch page 1 and look for new items.
    Poll { seq: u64 },
    /// Load the raw source of one item.
    LoadSource { id: String, raw_url: String },
}

/// Completions sent back to the app.
#[derive(Debug)]
pub enum Response {
    Page {
        seq: u64,
        page: u32,
        origin: LoadOrigin,
        result: Result<PageResult, FetchError>,
    },
    Poll {
        seq: u64,
        result: Result<PageResult, FetchError>,
    },
    Source {
        id: String,
        result: Result<SourceView, FetchError>,
    },
}

/// Monotonic sequence numbers for one class of request.
#[derive(Debug, Clone, Default)]
pub struct RequestSeq {
    latest: u64,
}

impl RequestSeq {
    /// Issue the next number; it becomes the only current one.
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub fn is_latest(&self, seq: u64) -> bool {
        seq == self.latest
    }
}

/// Start the dispatcher on `runtime`.
///
/// Returns the request sender and the response receiver.  The dispatcher
/// exits when the request sender is dropped; in-flight tasks still finish
/// and their responses are discarded if the receiver is gone.
pub fn spawn(
    runtime: &Handle,
    catalog: Arc<dyn CatalogSource>,
) -> (UnboundedSender<Request>, UnboundedReceiver<Response>) {
    let (req_tx, mut req_rx) = mpsc::unbounded_channel::<Request>();
    let (resp_tx, resp_rx) = mpsc::unbounded_channel();

    runtime.spawn(async move {
        while let Some(request) = req_rx.recv().await {
            let catalog = Arc::clone(&catalog);
            let resp_tx = resp_tx.clone();
            tokio::spawn(async move {
                let response = execute(catalog.as_ref(), request).await;
                // Receiver gone means the UI has exited.
                let _ = resp_tx.send(response);
            });
        }
        tracing::debug!("request channel closed; dispatcher stopping");
    });

    (req_tx, resp_rx)
}

/// Run one request to completion.
pub async fn execute(catalog: &dyn CatalogSource, request: Request) -> Response {
    match request {
        Request::LoadPage { seq, page, origin } => Response::Page {
            seq,
            page,
            origin,
            result: catalog.fetch_page(page).await,
        },
        Request::Poll { seq } => Response::Poll {
            seq,
            result: catalog.fetch_page(1).await,
        },
        Request::LoadSource { id, raw_url } => Response::Source {
            result: catalog.fetch_source(&raw_url).await,
            id,
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
