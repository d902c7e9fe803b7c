//! # Outbound Ports (Driven Ports)
//!
//! The cluster driver as seen by the executor: submit an operation, get one
//! callback when it completes.
//!
//! Implementations:
//! - [`InMemoryCluster`](crate::adapters::memory::InMemoryCluster) - simulated multi-node cluster
//! - [`FaultyConnection`](crate::adapters::faulty::FaultyConnection) - fault-injecting wrapper

use std::sync::Arc;

use crate::domain::operation::{Operation, ResultSet};
use crate::domain::outcome::StorageFailure;

/// Continuation invoked with the result of one submission.
pub type Completion = Box<dyn FnOnce(Result<ResultSet, StorageFailure>) + Send + 'static>;

/// Abstract interface for a storage cluster connection.
///
/// ## Contract
///
/// - `submit` returns without waiting for the operation to finish.
/// - `completion` is invoked exactly once, from any thread.
/// - Dropping `completion` without invoking it is a contract violation; the
///   executor reports it as a fatal `Internal` error.
pub trait StorageConnection: Send + Sync {
    fn submit(&self, operation: Arc<Operation>, completion: Completion);
}

impl<C: StorageConnection + ?Sized> StorageConnection for Arc<C> {
    fn submit(&self, operation: Arc<Operation>, completion: Completion) {
        (**self).submit(operation, completion)
    }
}
