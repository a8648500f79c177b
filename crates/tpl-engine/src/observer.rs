//! Collaborators notified as the session changes
//!
//! The engine never renders anything itself. A [`DisplaySink`] receives the
//! aggregate after every merge and a [`Notifier`] receives user-facing errors.

use serde::Serialize;
use tokio::sync::mpsc;
use tpl_core::{ComposedResults, Design};
use tracing::{debug, info, warn};

use crate::state::PaginationState;

/// Receives state the presentation layer renders
pub trait DisplaySink: Send + Sync {
    /// Called after every applied merge and when a generation clears the list
    fn on_aggregate_update(&self, flat: &[Design], composed: &ComposedResults);

    fn on_loading_changed(&self, loading: bool);

    fn on_pagination_state_changed(&self, state: PaginationState);

    /// A keyword query failed; its results count as empty
    fn on_keyword_failed(&self, _keyword: &str, _message: &str) {}
}

/// Receives errors the user should see (pagination failures)
pub trait Notifier: Send + Sync {
    fn on_error(&self, message: &str);
}

/// Everything a [`ChannelObserver`] forwards
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SearchEvent {
    AggregateUpdated {
        flat: Vec<Design>,
        composed: ComposedResults,
    },
    LoadingChanged {
        loading: bool,
    },
    PaginationChanged {
        state: PaginationState,
    },
    KeywordFailed {
        keyword: String,
        message: String,
    },
    Error {
        message: String,
    },
}

/// Forwards collaborator callbacks as [`SearchEvent`]s over a channel
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<SearchEvent>,
}

impl ChannelObserver {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SearchEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: SearchEvent) {
        // Receiver gone means nobody is watching any more
        let _ = self.tx.send(event);
    }
}

impl DisplaySink for ChannelObserver {
    fn on_aggregate_update(&self, flat: &[Design], composed: &ComposedResults) {
        self.send(SearchEvent::AggregateUpdated {
            flat: flat.to_vec(),
            composed: composed.clone(),
        });
    }

    fn on_loading_changed(&self, loading: bool) {
        self.send(SearchEvent::LoadingChanged { loading });
    }

    fn on_pagination_state_changed(&self, state: PaginationState) {
        self.send(SearchEvent::PaginationChanged { state });
    }

    fn on_keyword_failed(&self, keyword: &str, message: &str) {
        self.send(SearchEvent::KeywordFailed {
            keyword: keyword.to_string(),
            message: message.to_string(),
        });
    }
}

impl Notifier for ChannelObserver {
    fn on_error(&self, message: &str) {
        self.send(SearchEvent::Error {
            message: message.to_string(),
        });
    }
}

/// Logs every callback; the default when no observer is supplied
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl DisplaySink for TracingObserver {
    fn on_aggregate_update(&self, flat: &[Design], composed: &ComposedResults) {
        debug!(flat = flat.len(), composed = composed.len(), "aggregate updated");
    }

    fn on_loading_changed(&self, loading: bool) {
        debug!(loading, "loading changed");
    }

    fn on_pagination_state_changed(&self, state: PaginationState) {
        debug!(
            page = state.current_page,
            loading = state.is_loading_page,
            has_more = state.has_more_pages,
            "pagination changed"
        );
    }

    fn on_keyword_failed(&self, keyword: &str, message: &str) {
        info!(keyword, message, "no results for keyword");
    }
}

impl Notifier for TracingObserver {
    fn on_error(&self, message: &str) {
        warn!("{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_observer_forwards_in_order() {
        let (observer, mut rx) = ChannelObserver::new();

        observer.on_loading_changed(true);
        observer.on_keyword_failed("cafe", "HTTP error 500");
        observer.on_error("Error while fetching templates");

        assert!(matches!(rx.try_recv().unwrap(), SearchEvent::LoadingChanged { loading: true }));
        assert!(matches!(
            rx.try_recv().unwrap(),
            SearchEvent::KeywordFailed { ref keyword, .. } if keyword == "cafe"
        ));
        assert!(matches!(rx.try_recv().unwrap(), SearchEvent::Error { .. }));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (observer, rx) = ChannelObserver::new();
        drop(rx);
        observer.on_loading_changed(false);
    }

    #[test]
    fn test_event_json_shape() {
        let event = SearchEvent::LoadingChanged { loading: true };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "loading_changed");
        assert_eq!(json["loading"], true);
    }
}
