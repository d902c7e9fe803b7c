//! Fault-injecting connection wrapper.
//!
//! Queued faults are consumed in order by the first submission they match;
//! everything else is delegated to the wrapped connection.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::domain::operation::{Operation, OperationClass, Query};
use crate::domain::outcome::{ErrorCode, StorageFailure};
use crate::ports::outbound::{Completion, StorageConnection};

/// Injected misbehaviour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Complete with this failure instead of delegating.
    Fail(ErrorCode),
    /// Drop the completion without invoking it.
    DropCompletion,
}

#[derive(Debug, Clone)]
enum Target {
    Any,
    Class(OperationClass),
    Query(Query),
}

impl Target {
    fn matches(&self, operation: &Operation) -> bool {
        match self {
            Target::Any => true,
            Target::Class(class) => operation.class() == *class,
            Target::Query(query) => operation.query() == *query,
        }
    }
}

/// Wraps any connection and injects queued faults before delegating.
pub struct FaultyConnection<C> {
    inner: C,
    faults: Mutex<VecDeque<(Target, Fault)>>,
    submissions: AtomicU32,
    injected: AtomicU32,
}

impl<C: StorageConnection> FaultyConnection<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            faults: Mutex::new(VecDeque::new()),
            submissions: AtomicU32::new(0),
            injected: AtomicU32::new(0),
        }
    }

    /// Fault the next submission, whatever it is.
    pub fn inject(&self, fault: Fault) {
        self.faults.lock().push_back((Target::Any, fault));
    }

    /// Fault the next `count` submissions with `code`.
    pub fn inject_failures(&self, code: ErrorCode, count: usize) {
        let mut faults = self.faults.lock();
        for _ in 0..count {
            faults.push_back((Target::Any, Fault::Fail(code)));
        }
    }

    /// Fault the next submission of the given class.
    pub fn inject_for_class(&self, class: OperationClass, fault: Fault) {
        self.faults.lock().push_back((Target::Class(class), fault));
    }

    /// Fault the next submission of the given query.
    pub fn inject_for_query(&self, query: Query, fault: Fault) {
        self.faults.lock().push_back((Target::Query(query), fault));
    }

    pub fn clear(&self) {
        self.faults.lock().clear();
    }

    pub fn pending_faults(&self) -> usize {
        self.faults.lock().len()
    }

    /// Every submission seen, faulted or delegated.
    pub fn submissions(&self) -> u32 {
        self.submissions.load(Ordering::SeqCst)
    }

    pub fn injected(&self) -> u32 {
        self.injected.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    fn take_fault(&self, operation: &Operation) -> Option<Fault> {
        let mut faults = self.faults.lock();
        let position = faults.iter().position(|(target, _)| target.matches(operation))?;
        faults.remove(position).map(|(_, fault)| fault)
    }
}

impl<C: StorageConnection> StorageConnection for FaultyConnection<C> {
    fn submit(&self, operation: Arc<Operation>, completion: Completion) {
        self.submissions.fetch_add(1, Ordering::SeqCst);

        match self.take_fault(&operation) {
            None => self.inner.submit(operation, completion),
            Some(fault) => {
                self.injected.fetch_add(1, Ordering::SeqCst);
                debug!(query = %operation.query(), ?fault, "Injecting storage fault");
                match fault {
                    Fault::Fail(code) => completion(Err(StorageFailure::new(
                        code,
                        format!("injected {code} for {}", operation.query()),
                    ))),
                    Fault::DropCompletion => drop(completion),
                }
            }
        }
    }
}
