//! Scripted connection for executor and backend tests.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::operation::{Operation, Query, ResultSet};
use crate::domain::outcome::{ErrorCode, StorageFailure};
use crate::ports::outbound::{Completion, StorageConnection};

/// Connection that answers from a fixed script and counts submissions.
///
/// Each submission pops the next scripted result; once the script is empty
/// the fallback (if any) answers every further submission. Completions run
/// on a fresh thread, never on the submitting one.
pub struct ScriptedConnection {
    script: Mutex<VecDeque<Result<ResultSet, StorageFailure>>>,
    fallback: Option<Result<ResultSet, StorageFailure>>,
    latency: Mutex<Duration>,
    submissions: AtomicU32,
    queries: Mutex<Vec<Query>>,
}

impl ScriptedConnection {
    pub fn new(script: Vec<Result<ResultSet, StorageFailure>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: None,
            latency: Mutex::new(Duration::ZERO),
            submissions: AtomicU32::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Answers every submission with `result`.
    pub fn always(result: Result<ResultSet, StorageFailure>) -> Self {
        Self {
            fallback: Some(result),
            ..Self::new(Vec::new())
        }
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = latency;
    }

    pub fn submissions(&self) -> u32 {
        self.submissions.load(Ordering::SeqCst)
    }

    /// Queries in submission order.
    pub fn queries(&self) -> Vec<Query> {
        self.queries.lock().clone()
    }
}

impl StorageConnection for ScriptedConnection {
    fn submit(&self, operation: Arc<Operation>, completion: Completion) {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().push(operation.query());

        let result = self
            .script
            .lock()
            .pop_front()
            .or_else(|| self.fallback.clone())
            .unwrap_or_else(|| {
                Err(StorageFailure::new(
                    ErrorCode::ServerError,
                    "scripted connection exhausted",
                ))
            });
        let latency = *self.latency.lock();

        std::thread::spawn(move || {
            if !latency.is_zero() {
                std::thread::sleep(latency);
            }
            completion(result);
        });
    }
}
