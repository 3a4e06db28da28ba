//! Client IP allow-list middleware.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use duckflix_common::Error;

use super::error::AppError;
use super::AppContext;
use crate::config::AccessPolicy;

/// Reject requests from peers the access policy does not allow.
///
/// The peer address comes from [`ConnectInfo`], so the router must be served
/// with `into_make_service_with_connect_info::<SocketAddr>()`. Under an
/// allow-list, a request without a known peer is rejected.
pub async fn access_middleware(
    State(ctx): State<AppContext>,
    request: Request,
    next: Next,
) -> Response {
    if ctx.access == AccessPolicy::Open {
        return next.run(request).await;
    }

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    match peer {
        Some(ip) if ctx.access.allows(ip) => next.run(request).await,
        Some(ip) => {
            tracing::warn!(client = %ip, path = %request.uri().path(), "Client not in allow-list");
            AppError(Error::Forbidden(format!("client {} is not allowed", ip.to_canonical())))
                .into_response()
        }
        None => {
            tracing::warn!(path = %request.uri().path(), "Rejecting request with unknown peer address");
            AppError(Error::Forbidden("client address unknown".into())).into_response()
        }
    }
}
