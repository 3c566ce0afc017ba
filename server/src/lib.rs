//! Axum server for the todo API.
//!
//! # Design
//! Routes are registered by walking the contract's route table: method and
//! path come from the table, and each `Operation` maps to exactly one
//! handler. The store sits behind a single `RwLock` shared by all handlers.

pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod store;

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{on, MethodFilter, MethodRouter};
use axum::Router;
use todo_core::{
    Contract, ContractError, ContractKind, HttpMethod, Operation, PatchContract, PutContract,
};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tracing::Instrument;

pub use config::{Cli, ServerConfig};
pub use error::ServerError;
pub use store::{MemoryStore, StoreError, TodoStore};

pub type Db = Arc<RwLock<Box<dyn TodoStore>>>;

pub fn shared(store: impl TodoStore + 'static) -> Db {
    let store: Box<dyn TodoStore> = Box::new(store);
    Arc::new(RwLock::new(store))
}

fn method_filter(method: HttpMethod) -> MethodFilter {
    match method {
        HttpMethod::Get => MethodFilter::GET,
        HttpMethod::Post => MethodFilter::POST,
        HttpMethod::Put => MethodFilter::PUT,
        HttpMethod::Patch => MethodFilter::PATCH,
        HttpMethod::Delete => MethodFilter::DELETE,
    }
}

/// Rewrite a `:name` template into axum's `{name}` syntax.
fn axum_path(template: &str) -> String {
    template
        .split('/')
        .map(|seg| match seg.strip_prefix(':') {
            Some(name) => format!("{{{name}}}"),
            None => seg.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Router for contract `C` over `db`.
pub fn app<C: Contract>(db: Db) -> Router {
    let mut router = Router::new();
    for route in C::routes() {
        let filter = method_filter(route.method);
        let method_router: MethodRouter<Db> = match route.operation {
            Operation::GetAllTodos => on(filter, handlers::get_all_todos),
            Operation::CreateTodo => on(filter, handlers::create_todo::<C>),
            Operation::GetTodoById => on(filter, handlers::get_todo_by_id::<C>),
            Operation::UpdateTodoById => on(filter, handlers::update_todo_by_id::<C>),
            Operation::DeleteTodoById => on(filter, handlers::delete_todo_by_id::<C>),
        };
        router = router.route(&axum_path(route.path), method_router);
    }
    router
        .layer(middleware::from_fn(trace_requests))
        .with_state(db)
}

/// Check the configured contract and build its router over a fresh store.
pub fn router(config: &ServerConfig) -> Result<Router, ContractError> {
    config.contract.routes().check()?;
    let store = if config.seed {
        MemoryStore::seeded()
    } else {
        MemoryStore::new()
    };
    let db = shared(store);
    Ok(match config.contract {
        ContractKind::Patch => app::<PatchContract>(db),
        ContractKind::Put => app::<PutContract>(db),
    })
}

pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}

async fn trace_requests(request: Request, next: Next) -> Response {
    let span = tracing::info_span!(
        "http.request",
        method = %request.method(),
        path = %request.uri().path(),
    );
    let started = Instant::now();
    let response = next.run(request).instrument(span.clone()).await;
    span.in_scope(|| {
        tracing::info!(
            status = response.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );
    });
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_become_axum_paths() {
        assert_eq!(axum_path("/todos"), "/todos");
        assert_eq!(axum_path("/todos/:id"), "/todos/{id}");
    }

    #[test]
    fn router_builds_for_both_contracts() {
        for contract in [ContractKind::Patch, ContractKind::Put] {
            let config = ServerConfig {
                contract,
                ..ServerConfig::default()
            };
            assert!(router(&config).is_ok());
        }
    }
}
