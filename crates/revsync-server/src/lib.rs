//! HTTP trigger and orchestration for the revsync reconciler.
//!
//! One POST endpoint drives one reconciliation pass against a Cloud Run
//! service; collaborator clients are built once at startup and shared through
//! axum state.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod reconciler;
pub mod server;

pub use config::AppConfig;
pub use reconciler::Reconciler;
pub use server::{AppState, RevsyncServer, ServerBuilder, build_app};
