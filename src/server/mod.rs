//! Local server for the generated site, with the preview endpoints
//!
//! Static pages come from the public directory. Post pages are rendered live
//! while a preview cookie is set, so editors see draft revisions.

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderMap, Request, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::client::ClientError;
use crate::generator::Generator;
use crate::helpers::{post_url, url_for};
use crate::preview::{PreviewContext, PREVIEW_COOKIE};
use crate::{Blog, Error};

/// Cookie value characters left as-is
const COOKIE_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Server state
struct ServerState {
    generator: Generator,
}

#[derive(Debug, Deserialize)]
struct PreviewParams {
    token: Option<String>,
    slug: Option<String>,
}

/// Start the server
pub async fn start(blog: &Blog, ip: &str, port: u16) -> Result<()> {
    let generator = Generator::new(blog, blog.client()?)?;
    let app = router(generator);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(generator: Generator) -> Router {
    let state = Arc::new(ServerState { generator });

    Router::new()
        .route("/api/preview", get(preview_handler))
        .route("/api/exit-preview", get(exit_preview_handler))
        .route("/post/:slug", get(post_handler))
        .route("/post/:slug/", get(post_handler))
        .fallback(static_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Enter preview mode for a draft ref and jump to the previewed post
async fn preview_handler(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<PreviewParams>,
) -> Response {
    let Some(token) = params.token.filter(|t| !t.trim().is_empty()) else {
        return (StatusCode::BAD_REQUEST, "Missing preview token").into_response();
    };

    let config = &state.generator.blog().config;
    let location = match params.slug.filter(|s| !s.is_empty()) {
        Some(slug) => post_url(config, &slug),
        None => url_for(config, ""),
    };

    tracing::info!("Entering preview mode, redirecting to {}", location);
    (
        [(header::SET_COOKIE, preview_cookie(&token))],
        Redirect::temporary(&location),
    )
        .into_response()
}

/// Leave preview mode
async fn exit_preview_handler(State(state): State<Arc<ServerState>>) -> Response {
    let location = url_for(&state.generator.blog().config, "");
    tracing::info!("Leaving preview mode");
    (
        [(header::SET_COOKIE, clear_preview_cookie())],
        Redirect::temporary(&location),
    )
        .into_response()
}

/// Post page: live render in preview mode, generated file otherwise
async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
    request: Request<Body>,
) -> Response {
    let Some(token) = preview_ref(request.headers()) else {
        return static_handler(State(state), request).await;
    };

    let preview = PreviewContext::from_ref(Some(token));
    let loader = state.generator.loader();
    let view = match loader.load_post(&slug, &preview).await {
        Ok(view) => view,
        Err(Error::Client(ClientError::NotFound { .. })) => {
            return (StatusCode::NOT_FOUND, "Not found").into_response();
        }
        Err(e) => {
            tracing::error!("Preview of {} failed: {}", slug, e);
            return (StatusCode::BAD_GATEWAY, "Content API error").into_response();
        }
    };

    match state.generator.render_post(&view) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Failed to render {}: {:#}", slug, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Render error").into_response()
        }
    }
}

/// Serve generated files using tower-http
async fn static_handler(State(state): State<Arc<ServerState>>, request: Request<Body>) -> Response {
    let public_dir = &state.generator.blog().public_dir;
    let mut service = ServeDir::new(public_dir).append_index_html_on_directories(true);
    match service.try_call(request).await {
        Ok(response) => response.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

/// `Set-Cookie` value that starts a preview session
fn preview_cookie(token: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        PREVIEW_COOKIE,
        utf8_percent_encode(token, COOKIE_VALUE)
    )
}

/// `Set-Cookie` value that expires the preview session
fn clear_preview_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", PREVIEW_COOKIE)
}

/// Preview ref carried by the request cookies, if any
fn preview_ref(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == PREVIEW_COOKIE)
        .and_then(|(_, value)| percent_decode_str(value).decode_utf8().ok())
        .map(|value| value.into_owned())
        .filter(|value| !value.is_empty())
}
