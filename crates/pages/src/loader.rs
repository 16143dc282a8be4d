//! Runs page fetches off the interactive task and hands results back over a
//! single-consumer channel. Navigating again while a fetch is in flight
//! cancels it; a cancelled fetch delivers nothing.

use std::sync::Arc;

use {
    tokio::sync::mpsc,
    tokio_util::sync::CancellationToken,
    tracing::{debug, warn},
};

use crate::page::{Page, PageContext, PageRequest};
use crate::model::PageData;

/// What the interactive loop receives. Fetch failures are always delivered
/// as [`PageEvent::Failed`]; they never cross the channel as a panic.
#[derive(Debug)]
pub enum PageEvent {
    Loading { id: String },
    Ready { id: String, data: PageData },
    Failed { id: String, error: String },
}

pub struct ContentLoader {
    ctx: Arc<PageContext>,
    events: mpsc::Sender<PageEvent>,
    in_flight: Option<CancellationToken>,
}

impl ContentLoader {
    pub fn new(ctx: PageContext, events: mpsc::Sender<PageEvent>) -> Self {
        Self {
            ctx: Arc::new(ctx),
            events,
            in_flight: None,
        }
    }

    /// Start loading the requested page, abandoning any fetch still in
    /// flight from a previous navigation.
    pub fn load(&mut self, request: &PageRequest) {
        self.load_page(request.build());
    }

    pub fn load_page(&mut self, page: Box<dyn Page>) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
        let token = CancellationToken::new();
        self.in_flight = Some(token.clone());

        let ctx = Arc::clone(&self.ctx);
        let events = self.events.clone();
        let id = page.id();

        tokio::spawn(async move {
            let _ = events.send(PageEvent::Loading { id: id.clone() }).await;

            tokio::select! {
                _ = token.cancelled() => {
                    debug!(page = %id, "fetch abandoned");
                }
                result = page.fetch(&ctx) => {
                    let event = match result {
                        Ok(data) => PageEvent::Ready { id, data },
                        Err(e) => {
                            warn!(page = %id, error = %e, "page fetch failed");
                            PageEvent::Failed {
                                id,
                                error: e.to_string(),
                            }
                        }
                    };
                    let _ = events.send(event).await;
                }
            }
        });
    }
}
