//! Search generations: fan-out, staleness, incremental aggregation

use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tpl_catalog::{CatalogClient, CatalogError, QueryContext};
use tpl_core::SearchResultSet;
use tracing::{debug, info, warn};

use crate::keywords::normalize_keywords;
use crate::observer::{DisplaySink, Notifier, TracingObserver};
use crate::pagination::{PageOutcome, PaginationController};
use crate::session::{EngineSettings, Session, SessionState};
use crate::state::{AggregateState, Generation, PaginationState, SearchPhase, SessionSnapshot};

/// A keyword whose query failed and was counted as empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordFailure {
    pub keyword: String,
    pub message: String,
}

/// Summary of a generation that ran to completion
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub generation: Generation,
    pub keywords: Vec<String>,
    pub failures: Vec<KeywordFailure>,
    /// Flat aggregate size once the keyword queries settled
    pub total: usize,
    /// Present when the result was sparse enough to fetch page 1
    pub top_up: Option<PageOutcome>,
}

/// How a generation ended
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SearchOutcome {
    Settled(SearchReport),
    /// A newer generation took over; nothing further was applied
    Superseded,
    /// Cancelled through its handle while still live
    Cancelled,
}

/// Handle to one running generation
pub struct SearchHandle {
    generation: Generation,
    keywords: Vec<String>,
    cancel: CancellationToken,
    task: JoinHandle<SearchOutcome>,
}

impl SearchHandle {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Abort outstanding requests; anything still in flight is discarded
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub async fn wait(self) -> SearchOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(generation = %self.generation, error = %e, "search task ended abnormally");
                SearchOutcome::Cancelled
            }
        }
    }
}

enum Resolution {
    Applied,
    /// Generation superseded or cancelled; stop processing
    Discarded,
}

/// Builder for [`SearchCoordinator`]
pub struct SearchCoordinatorBuilder {
    client: Arc<dyn CatalogClient>,
    settings: EngineSettings,
    context: QueryContext,
    display: Arc<dyn DisplaySink>,
    notifier: Arc<dyn Notifier>,
}

impl SearchCoordinatorBuilder {
    pub fn settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn context(mut self, context: QueryContext) -> Self {
        self.context = context;
        self
    }

    pub fn display(mut self, display: Arc<dyn DisplaySink>) -> Self {
        self.display = display;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn build(self) -> SearchCoordinator {
        let session = Arc::new(Session {
            client: self.client,
            settings: self.settings,
            display: self.display,
            notifier: self.notifier,
            state: Mutex::new(SessionState::new(self.context)),
        });

        SearchCoordinator {
            pagination: PaginationController::new(Arc::clone(&session)),
            session,
        }
    }
}

/// Runs search generations against a catalog and keeps the aggregate
pub struct SearchCoordinator {
    session: Arc<Session>,
    pagination: PaginationController,
}

impl SearchCoordinator {
    pub fn builder(client: Arc<dyn CatalogClient>) -> SearchCoordinatorBuilder {
        SearchCoordinatorBuilder {
            client,
            settings: EngineSettings::default(),
            context: QueryContext::default(),
            display: Arc::new(TracingObserver),
            notifier: Arc::new(TracingObserver),
        }
    }

    pub fn pagination(&self) -> &PaginationController {
        &self.pagination
    }

    /// Replace the query context used by the next generation. Does not start
    /// a search by itself; see [`Self::set_page_builder`].
    pub async fn set_context(&self, context: QueryContext) {
        self.session.state.lock().await.context = context;
    }

    pub async fn context(&self) -> QueryContext {
        self.session.state.lock().await.context.clone()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.session.state.lock().await.snapshot()
    }

    /// Switch page builder and re-run the latest keywords against it.
    ///
    /// Falls back to the context's initial keyword when nothing has been
    /// searched yet. Returns `None` when the builder is unchanged.
    pub async fn set_page_builder(&self, page_builder: impl Into<String>) -> Option<SearchHandle> {
        let page_builder = page_builder.into();
        let input = {
            let mut state = self.session.state.lock().await;
            if state.context.page_builder == page_builder {
                return None;
            }
            info!(from = %state.context.page_builder, to = %page_builder, "page builder changed");
            state.context.page_builder = page_builder;
            if state.keywords.is_empty() {
                state.context.initial_keyword()
            } else {
                state.keywords.join(",")
            }
        };
        self.search(&input).await
    }

    /// Search with the context's initial keyword
    pub async fn search_initial(&self) -> Option<SearchHandle> {
        let keyword = self.context().await.initial_keyword();
        self.search(&keyword).await
    }

    /// Start a new generation for comma-separated keyword input.
    ///
    /// Returns `None` without touching any state when the input normalizes
    /// to no keywords. Otherwise the previous generation is cancelled and
    /// the aggregate cleared before this returns.
    pub async fn search(&self, input: &str) -> Option<SearchHandle> {
        let keywords = normalize_keywords(input);
        if keywords.is_empty() {
            debug!(input, "no keywords after normalization, ignoring");
            return None;
        }

        let session = &self.session;
        let (generation, cancel, context) = {
            let mut state = session.state.lock().await;

            state.cancel.cancel();
            state.generation = state.generation.next();
            state.cancel = CancellationToken::new();
            state.phase = SearchPhase::Fetching;
            state.aggregate = AggregateState::default();
            state.pagination = PaginationState::default();
            state.keywords = keywords.clone();

            session.set_loading(&mut state, true);
            session.publish_aggregate(&state);
            session.publish_pagination(&state);

            (state.generation, state.cancel.clone(), state.context.clone())
        };

        info!(%generation, keywords = ?keywords, "starting search generation");

        let task = tokio::spawn(run_generation(
            Arc::clone(session),
            self.pagination.clone(),
            generation,
            keywords.clone(),
            context,
            cancel.clone(),
        ));

        Some(SearchHandle {
            generation,
            keywords,
            cancel,
            task,
        })
    }

    pub async fn load_more(&self) -> PageOutcome {
        self.pagination.load_more().await
    }
}

async fn run_generation(
    session: Arc<Session>,
    pagination: PaginationController,
    generation: Generation,
    keywords: Vec<String>,
    context: QueryContext,
    cancel: CancellationToken,
) -> SearchOutcome {
    let mut calls: FuturesUnordered<_> = keywords
        .iter()
        .map(|keyword| {
            let client = Arc::clone(&session.client);
            let context = &context;
            let cancel = &cancel;
            async move {
                let result = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(CatalogError::Cancelled),
                    result = client.search_by_keyword(keyword, context, cancel) => result,
                };
                (keyword.as_str(), result)
            }
        })
        .collect();

    let mut failures = Vec::new();

    while let Some((keyword, result)) = calls.next().await {
        let resolution = match result {
            Ok(set) => {
                let set = session.settings.filter.filter(set);
                apply_results(&session, generation, &cancel, keyword, &set).await
            }
            Err(e) if e.is_cancelled() => {
                debug!(%generation, keyword, "keyword query cancelled");
                continue;
            }
            Err(e) => {
                let failure = KeywordFailure {
                    keyword: keyword.to_string(),
                    message: e.to_string(),
                };
                let resolution = apply_failure(&session, generation, &cancel, &failure).await;
                failures.push(failure);
                resolution
            }
        };

        if let Resolution::Discarded = resolution {
            break;
        }
    }
    // Aborts whatever is still in flight
    drop(calls);

    let total = {
        let mut state = session.state.lock().await;
        if !state.is_live(generation) {
            debug!(%generation, "generation superseded");
            return SearchOutcome::Superseded;
        }

        session.set_loading(&mut state, false);
        if cancel.is_cancelled() {
            state.phase = SearchPhase::Cancelled;
            info!(%generation, "search generation cancelled");
            return SearchOutcome::Cancelled;
        }

        state.phase = SearchPhase::Settled;
        state.pagination.has_more_pages = true;
        session.publish_pagination(&state);
        state.aggregate.len()
    };

    info!(
        %generation,
        total,
        failed = failures.len(),
        "search generation settled"
    );

    let top_up = if total < session.settings.min_results_before_top_up {
        debug!(%generation, total, "sparse results, topping up from page 1");
        Some(pagination.fetch(Some(generation), Some(1)).await)
    } else {
        None
    };

    SearchOutcome::Settled(SearchReport {
        generation,
        keywords,
        failures,
        total,
        top_up,
    })
}

async fn apply_results(
    session: &Session,
    generation: Generation,
    cancel: &CancellationToken,
    keyword: &str,
    set: &SearchResultSet,
) -> Resolution {
    let mut state = session.state.lock().await;
    if !state.is_live(generation) || cancel.is_cancelled() {
        debug!(%generation, keyword, "dropping stale keyword results");
        return Resolution::Discarded;
    }

    let added = state.aggregate.absorb(set);
    session.set_loading(&mut state, false);
    session.publish_aggregate(&state);

    debug!(
        %generation,
        keyword,
        added,
        total = state.aggregate.len(),
        "merged keyword results"
    );
    Resolution::Applied
}

async fn apply_failure(
    session: &Session,
    generation: Generation,
    cancel: &CancellationToken,
    failure: &KeywordFailure,
) -> Resolution {
    let mut state = session.state.lock().await;
    if !state.is_live(generation) || cancel.is_cancelled() {
        return Resolution::Discarded;
    }

    warn!(
        %generation,
        keyword = %failure.keyword,
        error = %failure.message,
        "keyword query failed, counting as no results"
    );
    session.set_loading(&mut state, false);
    session
        .display
        .on_keyword_failed(&failure.keyword, &failure.message);
    Resolution::Applied
}
