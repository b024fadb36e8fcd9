use std::time::Duration;

use axum::{middleware::from_fn, Router};
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

use crate::http::request_id::{self, MakeReqId};

/// Knobs for the standard middleware stack.
#[derive(Debug, Clone)]
pub struct HttpLayerOptions {
    /// Handler deadline; the request future is dropped when it expires.
    pub timeout: Duration,
    pub body_limit_bytes: usize,
    pub cors_enabled: bool,
}

impl Default for HttpLayerOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            body_limit_bytes: 16 * 1024 * 1024,
            cors_enabled: false,
        }
    }
}

/// Wrap a router in the standard stack.
///
/// Order, outermost to innermost:
/// SetRequestId -> PropagateRequestId -> Trace -> push_req_id_to_extensions -> Timeout -> CORS -> BodyLimit
pub fn apply_standard_layers(mut router: Router, opts: &HttpLayerOptions) -> Router {
    let x_request_id = request_id::header();

    // `Router::layer` wraps everything added so far, so layers go innermost first.
    router = router.layer(RequestBodyLimitLayer::new(opts.body_limit_bytes));

    if opts.cors_enabled {
        router = router.layer(CorsLayer::permissive());
    }

    router = router.layer(TimeoutLayer::new(opts.timeout));
    router = router.layer(from_fn(request_id::push_req_id_to_extensions));
    router = router.layer(request_id::create_trace_layer());
    router = router.layer(PropagateRequestIdLayer::new(x_request_id.clone()));
    router.layer(SetRequestIdLayer::new(x_request_id, MakeReqId))
}
