//! Application state for the API server.

use std::sync::Arc;

use super::Config;
use crate::auth::SessionVerifier;
use crate::db::Database;
use crate::service::{TaskService, TicketService};

/// Shared application state.
///
/// Generic over `D: Database` and `V: SessionVerifier`; production wires in
/// SQLite and the identity provider, tests an in-memory database and a
/// static verifier.
pub struct AppState<D: Database, V: SessionVerifier> {
    db: Arc<D>,
    verifier: Arc<V>,
    config: Arc<Config>,
    tickets: TicketService<D>,
    tasks: TaskService<D>,
}

impl<D: Database, V: SessionVerifier> Clone for AppState<D, V> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            verifier: Arc::clone(&self.verifier),
            config: Arc::clone(&self.config),
            tickets: self.tickets.clone(),
            tasks: self.tasks.clone(),
        }
    }
}

impl<D: Database, V: SessionVerifier> AppState<D, V> {
    pub fn new(db: D, verifier: V, config: Config) -> Self {
        let db = Arc::new(db);
        Self {
            tickets: TicketService::new(Arc::clone(&db)),
            tasks: TaskService::new(Arc::clone(&db)),
            db,
            verifier: Arc::new(verifier),
            config: Arc::new(config),
        }
    }

    /// Replace the task service, e.g. to pin its clock.
    pub fn with_task_service(mut self, tasks: TaskService<D>) -> Self {
        self.tasks = tasks;
        self
    }

    /// Get a cloned Arc to the database.
    pub fn db_arc(&self) -> Arc<D> {
        Arc::clone(&self.db)
    }

    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tickets(&self) -> &TicketService<D> {
        &self.tickets
    }

    pub fn tasks(&self) -> &TaskService<D> {
        &self.tasks
    }
}
