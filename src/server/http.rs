//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling.

use std::net::SocketAddr;
use std::sync::Arc;

use hyper::body::Incoming;
use hyper::header::ORIGIN;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::auth::{Authenticator, TokenCodec};
use crate::config::Args;
use crate::db::{
    CredentialStore, MemoryCredentialStore, MemoryPostStore, MongoClient, MongoCredentialStore,
    MongoPostStore, PostStore,
};
use crate::routes::{self, BoxBody};
use crate::server::CorsPolicy;
use crate::services::{AccountAdmin, PostService};
use crate::types::WicketError;

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// Token-based login and request authentication
    pub authenticator: Authenticator,
    /// Admin-gated account management
    pub accounts: AccountAdmin,
    /// Test post resource
    pub posts: PostService,
    pub cors: CorsPolicy,
    /// Which store backend is in use, for logging
    pub backend: &'static str,
}

impl AppState {
    /// Assemble state from explicit stores
    pub fn new(
        args: Args,
        codec: TokenCodec,
        credentials: Arc<dyn CredentialStore>,
        posts: Arc<dyn PostStore>,
        backend: &'static str,
    ) -> Self {
        let cors = CorsPolicy::new(args.cors_origin_list());
        Self {
            authenticator: Authenticator::new(Arc::clone(&credentials), codec),
            accounts: AccountAdmin::new(credentials),
            posts: PostService::new(posts),
            cors,
            backend,
            args,
        }
    }

    /// State backed by in-memory stores (dev mode without MongoDB, tests)
    pub fn in_memory(args: Args, codec: TokenCodec) -> Self {
        Self::new(
            args,
            codec,
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(MemoryPostStore::new()),
            "memory",
        )
    }

    /// State backed by MongoDB collections
    pub async fn with_mongo(
        args: Args,
        codec: TokenCodec,
        mongo: &MongoClient,
    ) -> Result<Self, WicketError> {
        let credentials = Arc::new(MongoCredentialStore::new(mongo).await?);
        let posts = Arc::new(MongoPostStore::new(mongo).await?);
        Ok(Self::new(args, codec, credentials, posts, "mongodb"))
    }
}

/// Start the HTTP server on the configured address
pub async fn run(state: Arc<AppState>) -> Result<(), WicketError> {
    let listener = TcpListener::bind(state.args.listen).await?;
    serve(listener, state).await
}

/// Serve connections from an already-bound listener
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> Result<(), WicketError> {
    info!(
        "Wicket listening on {} ({} store)",
        listener.local_addr()?,
        state.backend
    );

    if state.args.dev_mode {
        warn!("Development mode enabled - do not expose to the internet");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .preserve_header_case(true)
                        .title_case_headers(true)
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<BoxBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let origin = req
        .headers()
        .get(ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    info!("[{}] {} {}", addr, method, path);

    let mut response = match (method, path.as_str()) {
        // CORS preflight
        (Method::OPTIONS, _) => routes::preflight_response(),

        (Method::GET, "/") => routes::root(),
        (Method::GET, "/ping") => routes::ping(),

        (Method::POST, "/login") => routes::handle_login(req, Arc::clone(&state)).await,
        (Method::POST, "/auth") => routes::handle_auth(req, Arc::clone(&state)).await,

        (Method::POST, p) if routes::accounts::is_account_path(p) => {
            routes::handle_account_request(req, Arc::clone(&state)).await
        }

        (_, p) if p.starts_with(routes::posts::PREFIX) => {
            routes::handle_test_posts_request(req, Arc::clone(&state)).await
        }

        _ => routes::not_found_response(&path),
    };

    state.cors.apply(response.headers_mut(), origin.as_deref());
    Ok(response)
}
