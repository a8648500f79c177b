//! Fallback pagination over the full catalog listing

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::session::Session;
use crate::state::{Generation, PaginationState, SearchPhase};

/// Why a page request did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Another page fetch is still outstanding
    Loading,
    /// The catalog already reported its last page
    Exhausted,
    /// The live generation has not settled
    NotReady,
}

/// Result of one page request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PageOutcome {
    Merged {
        page: u32,
        /// Designs new to the flat list
        added: usize,
        exhausted: bool,
    },
    Skipped {
        reason: SkipReason,
    },
    /// Reported to the notifier; state untouched
    Failed {
        page: u32,
        message: String,
    },
    /// A newer generation started while the page was in flight
    Stale,
}

/// Serialized page fetches into the live generation's aggregate
///
/// Cheap to clone; all clones drive the same session.
#[derive(Clone)]
pub struct PaginationController {
    session: Arc<Session>,
}

impl PaginationController {
    pub(crate) fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Fetch a specific page for the live generation
    pub async fn fetch_page(&self, page: u32) -> PageOutcome {
        self.fetch(None, Some(page)).await
    }

    /// The "load more" trigger: fetch the next unfetched page
    pub async fn load_more(&self) -> PageOutcome {
        self.fetch(None, None).await
    }

    pub async fn state(&self) -> PaginationState {
        self.session.state.lock().await.pagination
    }

    /// `expected`: only proceed if this generation is still live.
    /// `page`: `None` means the next unfetched page.
    pub(crate) async fn fetch(&self, expected: Option<Generation>, page: Option<u32>) -> PageOutcome {
        let session = &self.session;

        let (generation, page, context) = {
            let mut state = session.state.lock().await;

            if expected.is_some_and(|g| !state.is_live(g)) {
                return PageOutcome::Stale;
            }
            if state.phase != SearchPhase::Settled {
                return PageOutcome::Skipped {
                    reason: SkipReason::NotReady,
                };
            }
            if state.pagination.is_loading_page {
                return PageOutcome::Skipped {
                    reason: SkipReason::Loading,
                };
            }
            if !state.pagination.has_more_pages {
                return PageOutcome::Skipped {
                    reason: SkipReason::Exhausted,
                };
            }

            let page = page.unwrap_or(state.pagination.current_page).max(1);
            state.pagination.is_loading_page = true;
            session.publish_pagination(&state);

            (state.generation, page, state.context.clone())
        };

        debug!(%generation, page, "fetching catalog page");
        let result = session
            .client
            .fetch_page(page, &context, session.settings.page_size)
            .await;

        let mut state = session.state.lock().await;
        if !state.is_live(generation) {
            // The new generation already reset pagination; leave it alone
            debug!(%generation, page, "discarding page for superseded generation");
            return PageOutcome::Stale;
        }

        let outcome = match result {
            Ok(catalog_page) => {
                let set = session.settings.filter.filter(catalog_page.buckets);
                let added = state.aggregate.absorb(&set);

                if page >= catalog_page.last_page {
                    state.pagination.has_more_pages = false;
                }
                if page >= state.pagination.current_page {
                    state.pagination.current_page = page.saturating_add(1);
                }
                session.publish_aggregate(&state);

                info!(
                    %generation,
                    page,
                    last_page = catalog_page.last_page,
                    added,
                    total = state.aggregate.len(),
                    "merged catalog page"
                );
                PageOutcome::Merged {
                    page,
                    added,
                    exhausted: !state.pagination.has_more_pages,
                }
            }
            Err(e) => {
                let message = e.to_string();
                warn!(%generation, page, error = %message, "catalog page fetch failed");
                session.notifier.on_error(&message);
                PageOutcome::Failed { page, message }
            }
        };

        state.pagination.is_loading_page = false;
        session.publish_pagination(&state);

        outcome
    }
}
