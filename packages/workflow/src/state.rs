//! Display state shared by every map action.
//!
//! Each operation takes an [`OperationToken`] when it starts and writes its
//! result through [`StateCell`] in one locked step when it finishes. A
//! completion is applied only if no newer operation has already been
//! applied, so a slow, superseded request can never overwrite a newer
//! result. An older request that finishes first is still applied.
//!
//! `loading` is derived from the number of operations in flight. An
//! [`Operation`] that is dropped without completing (for example because
//! its future was cancelled) still releases its slot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use geojson::GeoJson;
use serde_json::Value;

/// What the map and the JSON inspector currently show.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayState {
    /// Result of the last point/rectangle/overlap lookup or search.
    pub generic_field: Option<GeoJson>,
    /// Registered geometry from the last registration.
    pub registered: Option<GeoJson>,
    /// Requested geometry from a partial-overlap registration.
    pub requested: Option<GeoJson>,
    /// Raw payload for the JSON inspector.
    pub inspection: Option<Value>,
    /// Whether any operation is in flight.
    pub loading: bool,
    /// Message for the error toast.
    pub error_message: Option<String>,
}

impl DisplayState {
    /// Clears every geometry layer, the inspector and the error message.
    pub fn reset(&mut self) {
        self.generic_field = None;
        self.registered = None;
        self.requested = None;
        self.inspection = None;
        self.error_message = None;
    }
}

/// Monotonically increasing id of a started operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperationToken(u64);

impl OperationToken {
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// The result an operation writes back.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Completion {
    /// Lookup succeeded; `field` is `None` when nothing matched.
    Field {
        inspection: Value,
        field: Option<GeoJson>,
    },
    /// Registration succeeded.
    Registration {
        inspection: Value,
        registered: GeoJson,
        requested: Option<GeoJson>,
    },
    /// Only the inspector changes (percentage overlap).
    Inspection(Value),
    /// A search result was selected.
    SearchResult {
        inspection: Value,
        field: Option<GeoJson>,
    },
    /// Operation failed. Layers stay as they are; `inspection` replaces the
    /// inspector when the failure still produced a body worth showing.
    Failed {
        message: String,
        inspection: Option<Value>,
    },
    /// The shape could not be dispatched at all; the lookup layer and the
    /// inspector are dropped.
    Rejected { message: String },
}

impl Completion {
    fn apply(self, display: &mut DisplayState) {
        match self {
            Self::Field { inspection, field } => {
                display.inspection = Some(inspection);
                display.generic_field = field;
            }
            Self::Registration {
                inspection,
                registered,
                requested,
            } => {
                display.inspection = Some(inspection);
                display.registered = Some(registered);
                display.requested = requested;
            }
            Self::Inspection(inspection) => display.inspection = Some(inspection),
            Self::SearchResult { inspection, field } => {
                display.inspection = Some(inspection);
                display.generic_field = field;
            }
            Self::Failed {
                message,
                inspection,
            } => {
                if inspection.is_some() {
                    display.inspection = inspection;
                }
                display.error_message = Some(message);
            }
            Self::Rejected { message } => {
                display.inspection = None;
                display.generic_field = None;
                display.error_message = Some(message);
            }
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    display: DisplayState,
    in_flight: usize,
    last_applied: u64,
}

/// Single-writer cell around [`DisplayState`].
#[derive(Debug, Default)]
pub struct StateCell {
    inner: Mutex<Inner>,
    next_token: AtomicU64,
}

impl StateCell {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A copy of the current display state.
    #[must_use]
    pub fn snapshot(&self) -> DisplayState {
        self.lock().display.clone()
    }

    /// Starts an operation. `prepare` runs under the same lock, before the
    /// operation's request goes out.
    pub(crate) fn begin(&self, prepare: impl FnOnce(&mut DisplayState)) -> Operation<'_> {
        let token = OperationToken(self.next_token.fetch_add(1, Ordering::SeqCst) + 1);

        let mut inner = self.lock();
        inner.in_flight += 1;
        inner.display.loading = true;
        prepare(&mut inner.display);
        drop(inner);

        log::debug!("Operation {} started", token.0);
        Operation {
            cell: self,
            token,
            finished: false,
        }
    }

    /// Releases an in-flight slot and applies `completion` unless a newer
    /// operation has already been applied. Returns whether it was applied.
    fn finish(&self, token: OperationToken, completion: Option<Completion>) -> bool {
        let mut inner = self.lock();
        inner.in_flight = inner.in_flight.saturating_sub(1);
        inner.display.loading = inner.in_flight > 0;

        let Some(completion) = completion else {
            log::debug!("Operation {} dropped before completing", token.0);
            return false;
        };

        if token.0 <= inner.last_applied {
            log::debug!(
                "Discarding result of operation {}: operation {} already applied",
                token.0,
                inner.last_applied
            );
            return false;
        }

        inner.last_applied = token.0;
        completion.apply(&mut inner.display);
        true
    }

    /// Mutates the display outside of any operation.
    pub(crate) fn update(&self, f: impl FnOnce(&mut DisplayState)) {
        f(&mut self.lock().display);
    }

    /// Clears all layers, the inspector and the error message.
    pub fn reset(&self) {
        self.update(DisplayState::reset);
    }
}

/// An operation in flight. Completing it (or dropping it) releases its
/// loading slot.
#[must_use = "an operation must be completed to publish its result"]
pub(crate) struct Operation<'a> {
    cell: &'a StateCell,
    token: OperationToken,
    finished: bool,
}

impl Operation<'_> {
    #[cfg(test)]
    pub(crate) const fn token(&self) -> OperationToken {
        self.token
    }

    /// Publishes the operation's result. Returns whether it was applied.
    pub(crate) fn complete(mut self, completion: Completion) -> bool {
        self.finished = true;
        self.cell.finish(self.token, Some(completion))
    }
}

impl Drop for Operation<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.cell.finish(self.token, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn field(name: &str) -> GeoJson {
        GeoJson::from_json_value(json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [1.0, 2.0] },
            "properties": { "name": name }
        }))
        .unwrap()
    }

    fn lookup(name: &str) -> Completion {
        Completion::Field {
            inspection: json!({ "name": name }),
            field: Some(field(name)),
        }
    }

    #[test]
    fn tokens_increase() {
        let cell = StateCell::new();
        let first = cell.begin(|_| {});
        let second = cell.begin(|_| {});
        assert!(second.token() > first.token());
        first.complete(lookup("a"));
        second.complete(lookup("b"));
    }

    #[test]
    fn loading_tracks_operations_in_flight() {
        let cell = StateCell::new();
        assert!(!cell.snapshot().loading);

        let first = cell.begin(|_| {});
        let second = cell.begin(|_| {});
        assert!(cell.snapshot().loading);

        first.complete(lookup("a"));
        assert!(cell.snapshot().loading);

        second.complete(lookup("b"));
        assert!(!cell.snapshot().loading);
    }

    #[test]
    fn dropped_operation_releases_loading() {
        let cell = StateCell::new();
        let operation = cell.begin(|_| {});
        drop(operation);
        assert!(!cell.snapshot().loading);
    }

    #[test]
    fn newer_result_wins_when_it_finishes_last() {
        let cell = StateCell::new();
        let older = cell.begin(|_| {});
        let newer = cell.begin(|_| {});

        assert!(older.complete(lookup("older")));
        assert!(newer.complete(lookup("newer")));

        assert_eq!(cell.snapshot().generic_field, Some(field("newer")));
    }

    #[test]
    fn stale_result_is_discarded_when_it_finishes_last() {
        let cell = StateCell::new();
        let older = cell.begin(|_| {});
        let newer = cell.begin(|_| {});

        assert!(newer.complete(lookup("newer")));
        assert!(!older.complete(lookup("older")));

        let display = cell.snapshot();
        assert_eq!(display.generic_field, Some(field("newer")));
        assert_eq!(display.inspection, Some(json!({ "name": "newer" })));
        assert!(!display.loading);
    }

    #[test]
    fn failure_keeps_layers() {
        let cell = StateCell::new();
        cell.begin(|_| {}).complete(lookup("kept"));
        cell.begin(|_| {}).complete(Completion::Failed {
            message: "boom".to_string(),
            inspection: None,
        });

        let display = cell.snapshot();
        assert_eq!(display.generic_field, Some(field("kept")));
        assert_eq!(display.error_message.as_deref(), Some("boom"));
    }

    #[test]
    fn rejection_drops_lookup_layer_and_inspector() {
        let cell = StateCell::new();
        cell.begin(|_| {}).complete(lookup("gone"));
        cell.begin(|_| {}).complete(Completion::Rejected {
            message: "nope".to_string(),
        });

        let display = cell.snapshot();
        assert_eq!(display.generic_field, None);
        assert_eq!(display.inspection, None);
    }

    #[test]
    fn prepare_runs_before_result() {
        let cell = StateCell::new();
        cell.begin(|_| {}).complete(Completion::Registration {
            inspection: json!({}),
            registered: field("r"),
            requested: Some(field("q")),
        });

        let operation = cell.begin(|display| {
            display.registered = None;
            display.requested = None;
        });
        let display = cell.snapshot();
        assert!(display.registered.is_none());
        assert!(display.requested.is_none());
        assert!(display.loading);
        drop(operation);
    }

    #[test]
    fn reset_clears_everything_but_loading() {
        let cell = StateCell::new();
        cell.begin(|_| {}).complete(Completion::Registration {
            inspection: json!({ "x": 1 }),
            registered: field("r"),
            requested: Some(field("q")),
        });
        cell.begin(|_| {}).complete(lookup("g"));
        cell.begin(|_| {}).complete(Completion::Failed {
            message: "e".to_string(),
            inspection: None,
        });

        cell.reset();
        assert_eq!(cell.snapshot(), DisplayState::default());
    }
}
