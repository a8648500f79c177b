//! Search aggregation engine for tpl
//!
//! A [`SearchCoordinator`] turns keyword input into search generations: one
//! concurrent catalog query per keyword, results filtered and merged into a
//! single de-duplicated aggregate as they arrive. Results from a superseded
//! generation are dropped at resolution time. Sparse results are topped up
//! through the [`PaginationController`].

pub mod coordinator;
pub mod keywords;
pub mod observer;
pub mod pagination;
mod session;
pub mod state;

pub use coordinator::{
    KeywordFailure, SearchCoordinator, SearchCoordinatorBuilder, SearchHandle, SearchOutcome,
    SearchReport,
};
pub use keywords::normalize_keywords;
pub use observer::{ChannelObserver, DisplaySink, Notifier, SearchEvent, TracingObserver};
pub use pagination::{PageOutcome, PaginationController, SkipReason};
pub use session::EngineSettings;
pub use state::{AggregateState, Generation, PaginationState, SearchPhase, SessionSnapshot};
