//! Application router.
//!
//! Admin pages carry `Cache-Control: no-store` so the dashboard is not
//! served from history after the key cookie is gone. Every request passes
//! through the access log.
//!
//! NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue};
use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints::{self, register::MAX_UPLOAD_BYTES};
use crate::api::error::ApiError;
use crate::api::middleware;
use crate::api::types::AppContext;

pub fn app_router(ctx: AppContext) -> Router {
    let admin = Router::new()
        .route("/admin", get(endpoints::admin::dashboard))
        .route("/admin/passkey", post(endpoints::admin::submit_passkey))
        .route("/admin/close", get(endpoints::admin::close))
        .route(
            "/admin/appointments/:id/schedule",
            post(endpoints::admin::schedule),
        )
        .route(
            "/admin/appointments/:id/cancel",
            post(endpoints::admin::cancel),
        )
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    Router::new()
        .route(
            "/",
            get(endpoints::intake::show).post(endpoints::intake::submit),
        )
        .route(
            "/patients/:user_id/register",
            get(endpoints::register::show)
                .post(endpoints::register::submit)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/patients/:user_id/new-appointment",
            get(endpoints::appointments::show).post(endpoints::appointments::submit),
        )
        .route(
            "/patients/:user_id/new-appointment/success",
            get(endpoints::appointments::success),
        )
        .route("/health", get(endpoints::health::check))
        .merge(admin)
        .fallback(not_found)
        .with_state(ctx)
        .layer(axum::middleware::from_fn(middleware::access::log_requests))
}

async fn not_found() -> ApiError {
    ApiError::NotFound("This page does not exist".into())
}
