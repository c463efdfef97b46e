//! HTTP API for the voice studio: voice-sample analysis, speech synthesis,
//! and PCM-to-WAV rendering.

pub mod config;
pub mod error;
pub mod validation;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::GlobalKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use audio_core::{GEMINI_TTS_CHANNELS, GEMINI_TTS_SAMPLE_RATE};
use voice_core::{GeminiClient, PrebuiltVoice, SynthesisConfig, VoiceProfile};

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::validation::{
    validate_analyze_request, validate_render_request, validate_synthesize_request,
};

#[derive(Clone)]
pub struct AppState {
    pub gemini: Arc<GeminiClient>,
    pub request_count: Arc<AtomicU64>,
    pub config: ServerConfig,
}

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    audio_base64: String,
    mime_type: String,
}

#[derive(Deserialize)]
pub struct SynthesizeRequest {
    text: String,
    profile: VoiceProfile,
    config: Option<SynthesisConfig>,
}

#[derive(Deserialize)]
pub struct RenderRequest {
    pcm_base64: String,
    sample_rate: u32,
    channel_count: u16,
}

#[derive(Serialize)]
pub struct AudioResponse {
    audio_base64: String,
    sample_rate: u32,
    duration_ms: u64,
}

static START_TIME: std::sync::OnceLock<std::time::Instant> = std::sync::OnceLock::new();

pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn list_voices() -> Json<Vec<&'static str>> {
    Json(PrebuiltVoice::ALL.iter().map(|v| v.as_str()).collect())
}

/// Collapse the timeout/join/handler result nesting of a remote call.
fn flatten_remote<T>(
    result: Result<
        Result<Result<T, ApiError>, tokio::task::JoinError>,
        tokio::time::error::Elapsed,
    >,
    timeout_secs: u64,
) -> Result<T, ApiError> {
    match result {
        Ok(Ok(inner)) => inner,
        Ok(Err(join_err)) => {
            error!("Task join error: {join_err}");
            Err(ApiError::InternalError(format!("Task join error: {join_err}")))
        }
        Err(_) => {
            error!("Upstream request timed out after {} seconds", timeout_secs);
            Err(ApiError::Upstream(format!(
                "Request timed out after {} seconds. Please try again.",
                timeout_secs
            )))
        }
    }
}

/// Base64-encode a WAV byte stream and derive its duration from the data
/// chunk size.
fn audio_response(wav: Vec<u8>, sample_rate: u32, channel_count: u16) -> AudioResponse {
    let frame_count = wav.len().saturating_sub(44) / (channel_count as usize * 2);
    let duration_ms = frame_count as u64 * 1000 / sample_rate as u64;
    AudioResponse {
        audio_base64: audio_core::encode(&wav),
        sample_rate,
        duration_ms,
    }
}

pub async fn analyze_endpoint(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<VoiceProfile>, ApiError> {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    validate_analyze_request(&req.audio_base64, &req.mime_type)?;

    info!(
        "Analysis request received: payload={} base64 bytes, mime={}",
        req.audio_base64.len(),
        req.mime_type
    );

    let gemini = state.gemini.clone();
    // Blocking HTTP client runs off the async runtime
    let result = tokio::time::timeout(
        state.config.upstream_timeout(),
        tokio::task::spawn_blocking(move || {
            gemini
                .analyze_voice(&req.audio_base64, &req.mime_type)
                .map_err(|e| ApiError::Upstream(format!("Analysis error: {e}")))
        }),
    )
    .await;

    let profile = flatten_remote(result, state.config.upstream_timeout().as_secs())?;
    Ok(Json(profile))
}

pub async fn synthesize_endpoint(
    State(state): State<AppState>,
    Json(req): Json<SynthesizeRequest>,
) -> Result<Json<AudioResponse>, ApiError> {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    let config = req.config.unwrap_or_default();
    validate_synthesize_request(&req.text, &config)?;

    info!("Synthesis request received: text length={}", req.text.len());

    let gemini = state.gemini.clone();
    let text = req.text;
    let profile = req.profile;
    let result = tokio::time::timeout(
        state.config.upstream_timeout(),
        tokio::task::spawn_blocking(move || {
            let pcm_base64 = gemini
                .synthesize(&text, &profile, &config)
                .map_err(|e| ApiError::Upstream(format!("Synthesis error: {e}")))?;
            // The TTS models return raw 16-bit PCM at 24 kHz mono
            let wav = audio_core::synthesize_to_wav(
                &pcm_base64,
                GEMINI_TTS_SAMPLE_RATE,
                GEMINI_TTS_CHANNELS,
            )?;
            Ok::<_, ApiError>(wav)
        }),
    )
    .await;

    let wav = flatten_remote(result, state.config.upstream_timeout().as_secs())?;
    Ok(Json(audio_response(
        wav,
        GEMINI_TTS_SAMPLE_RATE,
        GEMINI_TTS_CHANNELS,
    )))
}

/// Run the PCM-to-WAV pipeline on a caller-supplied payload, no remote call.
pub async fn render_endpoint(
    State(state): State<AppState>,
    Json(req): Json<RenderRequest>,
) -> Result<Json<AudioResponse>, ApiError> {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    validate_render_request(&req.pcm_base64)?;

    let wav = audio_core::synthesize_to_wav(&req.pcm_base64, req.sample_rate, req.channel_count)?;
    Ok(Json(audio_response(wav, req.sample_rate, req.channel_count)))
}

#[derive(Serialize)]
pub struct MetricsResponse {
    pub cpu_usage_percent: f32,
    pub memory_used_mb: u64,
    pub memory_total_mb: u64,
    pub memory_usage_percent: f32,
    pub request_count: u64,
    pub uptime_seconds: u64,
}

pub async fn metrics_endpoint(State(state): State<AppState>) -> Json<MetricsResponse> {
    let mut system = sysinfo::System::new();
    system.refresh_cpu();
    system.refresh_memory();

    let cpu_usage = system.global_cpu_info().cpu_usage();
    let memory_used = system.used_memory();
    let memory_total = system.total_memory();
    let memory_usage_percent = if memory_total > 0 {
        (memory_used as f64 / memory_total as f64 * 100.0) as f32
    } else {
        0.0
    };

    let uptime = START_TIME
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0);

    Json(MetricsResponse {
        cpu_usage_percent: cpu_usage,
        memory_used_mb: memory_used / 1024 / 1024,
        memory_total_mb: memory_total / 1024 / 1024,
        memory_usage_percent,
        request_count: state.request_count.load(Ordering::Relaxed),
        uptime_seconds: uptime,
    })
}

/// Request ID middleware for tracing
async fn add_request_id(mut request: Request, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    request.headers_mut().insert(
        "x-request-id",
        axum::http::HeaderValue::from_str(&request_id).unwrap(),
    );
    let mut response = next.run(request).await;
    response.headers_mut().insert(
        "x-request-id",
        axum::http::HeaderValue::from_str(&request_id).unwrap(),
    );
    response
}

/// CORS configuration - environment-aware
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let permissive = || {
        CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(tower_http::cors::Any)
            .allow_credentials(false)
    };

    if let Some(ref allowed_origins) = config.cors_allowed_origins {
        let origins: Vec<axum::http::HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| origin.parse::<axum::http::HeaderValue>().ok())
            .collect();

        if origins.is_empty() {
            warn!("CORS_ALLOWED_ORIGINS is empty, falling back to permissive CORS");
            permissive()
        } else {
            info!("CORS configured for {} origin(s)", origins.len());
            CorsLayer::new()
                .allow_origin(tower_http::cors::AllowOrigin::list(origins))
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers(tower_http::cors::Any)
                .allow_credentials(false)
        }
    } else {
        warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (development mode)");
        permissive()
    }
}

/// Assemble the full application router with its middleware stack.
pub fn build_router(state: AppState) -> Router {
    let _ = START_TIME.get_or_init(std::time::Instant::now);

    let cors = cors_layer(&state.config);

    // Global rate limiting; per-IP extraction is unreliable behind proxies
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second((state.config.rate_limit_per_minute / 60).max(1) as u64)
            .burst_size(state.config.rate_limit_per_minute)
            .key_extractor(GlobalKeyExtractor)
            .finish()
            .unwrap(),
    );

    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(GovernorLayer::new(governor_conf))
        .layer(TimeoutLayer::new(state.config.request_timeout()))
        .layer(cors)
        .into_inner();

    let api = Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
        .route("/voices", get(list_voices))
        .route("/analyze", post(analyze_endpoint))
        .route("/synthesize", post(synthesize_endpoint))
        .route("/render", post(render_endpoint))
        .route("/metrics", get(metrics_endpoint));

    Router::new()
        .merge(api.clone()) // root paths
        .nest("/api", api) // /api prefix
        .layer(axum::middleware::from_fn(add_request_id))
        .layer(middleware_stack)
        .with_state(state)
}
