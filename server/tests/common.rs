//! Common utilities for integration tests

use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use axum::Router;
use server::config::ServerConfig;
use server::{build_router, AppState};
use voice_core::{GeminiClient, GeminiConfig};

/// Create a test app instance. The remote client carries a dummy key; no
/// test goes through the network.
pub fn create_test_app() -> Router {
    // The blocking reqwest client cannot be constructed on an async runtime
    // thread, so build it on a dedicated OS thread.
    let gemini = Arc::new(
        std::thread::spawn(|| {
            GeminiClient::new(GeminiConfig::new("test-key-for-integration-tests"))
        })
        .join()
        .expect("client builder thread panicked")
        .expect("Failed to create client for tests"),
    );

    let state = AppState {
        gemini,
        request_count: Arc::new(AtomicU64::new(0)),
        config: ServerConfig::default(),
    };

    build_router(state)
}
