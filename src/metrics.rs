// Request counters shared between the API pipeline and the debug listener
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

/// How often, in completed requests, the in-flight gauge is sampled
pub const SAMPLE_EVERY: u64 = 100;

#[derive(Debug, Default)]
pub struct Metrics {
    requests: AtomicU64,
    errors: AtomicU64,
    in_flight: AtomicI64,
    in_flight_sampled: AtomicI64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub errors: u64,
    pub in_flight: i64,
    pub in_flight_sampled: i64,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Open a request that stays in flight until the returned guard is
    /// finished or dropped
    pub fn track(self: &Arc<Self>) -> InFlight {
        self.request_started();
        InFlight {
            metrics: self.clone(),
            finished: AtomicBool::new(false),
        }
    }

    pub fn request_started(&self) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
    }

    /// Count a finished request. Every `SAMPLE_EVERY`th one also records how
    /// many were in flight, itself included.
    pub fn request_finished(&self, failed: bool) {
        let in_flight = self.in_flight.fetch_sub(1, Ordering::SeqCst);
        let requests = self.requests.fetch_add(1, Ordering::SeqCst) + 1;

        if requests % SAMPLE_EVERY == 0 {
            self.in_flight_sampled.store(in_flight, Ordering::SeqCst);
        }
        if failed {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests.load(Ordering::SeqCst),
            errors: self.errors.load(Ordering::SeqCst),
            in_flight: self.in_flight.load(Ordering::SeqCst),
            in_flight_sampled: self.in_flight_sampled.load(Ordering::SeqCst),
        }
    }
}

/// One request in flight. The first `finish` records its result; dropping it
/// unfinished, as a cancelled or panicking request does, records a failure.
#[derive(Debug)]
pub struct InFlight {
    metrics: Arc<Metrics>,
    finished: AtomicBool,
}

impl InFlight {
    pub fn finish(&self, failed: bool) {
        if !self.finished.swap(true, Ordering::SeqCst) {
            self.metrics.request_finished(failed);
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.finish(true);
    }
}

/// Routes served on the debug listener, never on the public API
pub fn debug_router(metrics: Arc<Metrics>) -> Router {
    Router::new()
        .route("/debug/vars", get(vars))
        .with_state(metrics)
}

async fn vars(State(metrics): State<Arc<Metrics>>) -> Json<MetricsSnapshot> {
    Json(metrics.snapshot())
}
