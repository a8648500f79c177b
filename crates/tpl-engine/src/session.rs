use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tpl_catalog::{CatalogClient, QueryContext};
use tpl_core::VisibilityFilter;

use crate::observer::{DisplaySink, Notifier};
use crate::state::{AggregateState, Generation, PaginationState, SearchPhase, SessionSnapshot};

/// Tunables for one search session
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub filter: VisibilityFilter,
    pub page_size: u32,
    /// Generations ending with fewer designs than this fetch page 1
    pub min_results_before_top_up: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            filter: VisibilityFilter::default(),
            page_size: 9,
            min_results_before_top_up: 4,
        }
    }
}

/// Everything the coordinator and pagination controller share.
///
/// All mutation happens inside `state`'s critical section, and every
/// asynchronous resolution re-checks `generation` there before touching
/// anything.
pub(crate) struct Session {
    pub client: Arc<dyn CatalogClient>,
    pub settings: EngineSettings,
    pub display: Arc<dyn DisplaySink>,
    pub notifier: Arc<dyn Notifier>,
    pub state: Mutex<SessionState>,
}

pub(crate) struct SessionState {
    pub generation: Generation,
    pub phase: SearchPhase,
    pub cancel: CancellationToken,
    pub context: QueryContext,
    /// Normalized keywords of the latest generation
    pub keywords: Vec<String>,
    pub loading: bool,
    pub aggregate: AggregateState,
    pub pagination: PaginationState,
}

impl SessionState {
    pub fn new(context: QueryContext) -> Self {
        Self {
            generation: Generation::default(),
            phase: SearchPhase::Idle,
            cancel: CancellationToken::new(),
            context,
            keywords: Vec::new(),
            loading: false,
            aggregate: AggregateState::default(),
            pagination: PaginationState::default(),
        }
    }

    pub fn is_live(&self, generation: Generation) -> bool {
        self.generation == generation
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            generation: self.generation,
            phase: self.phase,
            aggregate: self.aggregate.clone(),
            composed: self.aggregate.composed(),
            pagination: self.pagination,
        }
    }
}

impl Session {
    pub fn publish_aggregate(&self, state: &SessionState) {
        self.display
            .on_aggregate_update(&state.aggregate.flat, &state.aggregate.composed());
    }

    pub fn publish_pagination(&self, state: &SessionState) {
        self.display.on_pagination_state_changed(state.pagination);
    }

    pub fn set_loading(&self, state: &mut SessionState, loading: bool) {
        if state.loading != loading {
            state.loading = loading;
            self.display.on_loading_changed(loading);
        }
    }
}
