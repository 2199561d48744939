//! Scripted registry backend for workflow tests.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use asset_registry_client::{ClientError, RegistryBackend};
use asset_registry_client_models::{
    FieldQueryResponse, OverlapLookup, PercentageOverlap, PointLookup, RectangleLookup,
    RegisterField,
};
use geojson::GeoJson;
use serde_json::{Value, json};
use tokio::sync::oneshot;

/// A request the backend received.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    PointLookup(PointLookup),
    RectangleLookup(RectangleLookup),
    OverlapLookup(OverlapLookup),
    RegisterField(RegisterField),
    PercentageOverlap(PercentageOverlap),
    Logout,
}

/// Records every call and answers from a script.
///
/// Lookup responses are consumed in order; the last one is repeated.
/// Calls without a scripted answer fail with a 404.
#[derive(Debug, Default)]
pub struct MockBackend {
    calls: Mutex<Vec<Call>>,
    lookups: Mutex<VecDeque<FieldQueryResponse>>,
    registration: Option<Value>,
    overlap: Option<Value>,
    failure: Mutex<Option<String>>,
    gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockBackend {
    pub fn with_lookup(self, response: FieldQueryResponse) -> Self {
        lock(&self.lookups).push_back(response);
        self
    }

    pub fn with_registration(mut self, body: Value) -> Self {
        self.registration = Some(body);
        self
    }

    pub fn with_overlap(mut self, body: Value) -> Self {
        self.overlap = Some(body);
        self
    }

    pub fn failing(self, message: &str) -> Self {
        self.fail_with(message);
        self
    }

    /// Makes every following call fail with `message`.
    pub fn fail_with(&self, message: &str) {
        *lock(&self.failure) = Some(message.to_string());
    }

    /// Holds the next call until the returned sender fires.
    pub fn gate(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        lock(&self.gates).push_back(rx);
        tx
    }

    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    fn record(&self, call: Call) -> Result<(), ClientError> {
        lock(&self.calls).push(call);
        match lock(&self.failure).clone() {
            Some(message) => Err(ClientError::Status {
                status: 500,
                message,
            }),
            None => Ok(()),
        }
    }

    async fn hold(&self) {
        let gate = lock(&self.gates).pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
    }

    /// Records the call, picks its answer, then waits on the call's gate.
    async fn answer<T>(
        &self,
        call: Call,
        answer: impl FnOnce() -> Result<T, ClientError>,
    ) -> Result<T, ClientError> {
        let result = self.record(call).and_then(|()| answer());
        self.hold().await;
        result
    }

    fn next_lookup(&self) -> Result<FieldQueryResponse, ClientError> {
        let mut lookups = lock(&self.lookups);
        let response = if lookups.len() > 1 {
            lookups.pop_front()
        } else {
            lookups.front().cloned()
        };
        response.ok_or_else(not_scripted)
    }
}

fn not_scripted() -> ClientError {
    ClientError::Status {
        status: 404,
        message: "Request failed with status code 404".to_string(),
    }
}

#[async_trait::async_trait]
impl RegistryBackend for MockBackend {
    async fn point_lookup(&self, request: &PointLookup) -> Result<FieldQueryResponse, ClientError> {
        self.answer(Call::PointLookup(request.clone()), || self.next_lookup())
            .await
    }

    async fn rectangle_lookup(
        &self,
        request: &RectangleLookup,
    ) -> Result<FieldQueryResponse, ClientError> {
        self.answer(Call::RectangleLookup(request.clone()), || self.next_lookup())
            .await
    }

    async fn overlap_lookup(
        &self,
        request: &OverlapLookup,
    ) -> Result<FieldQueryResponse, ClientError> {
        self.answer(Call::OverlapLookup(request.clone()), || self.next_lookup())
            .await
    }

    async fn register_field(&self, request: &RegisterField) -> Result<Value, ClientError> {
        self.answer(Call::RegisterField(request.clone()), || {
            self.registration.clone().ok_or_else(not_scripted)
        })
        .await
    }

    async fn percentage_overlap(
        &self,
        request: &PercentageOverlap,
    ) -> Result<Value, ClientError> {
        self.answer(Call::PercentageOverlap(request.clone()), || {
            self.overlap.clone().ok_or_else(not_scripted)
        })
        .await
    }

    async fn logout(&self) -> Result<(), ClientError> {
        self.answer(Call::Logout, || Ok(())).await
    }
}

/// A small polygon feature tagged with `name`.
pub fn feature(name: &str) -> Value {
    json!({
        "type": "Feature",
        "geometry": {
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
        },
        "properties": { "name": name }
    })
}

pub fn geojson(name: &str) -> GeoJson {
    GeoJson::from_json_value(feature(name)).unwrap()
}

pub fn lookup_response(json: Value, data: Value) -> FieldQueryResponse {
    FieldQueryResponse {
        json,
        data: Some(GeoJson::from_json_value(data).unwrap()),
    }
}

/// A lookup answer that matched no field.
pub fn empty_lookup(json: Value) -> FieldQueryResponse {
    FieldQueryResponse { json, data: None }
}
