//! Test post routes
//!
//! - `GET /test-posts/` - all posts, ascending id
//! - `GET /test-posts/{id}` - one post
//! - `POST /test-posts/` - create, attributed to the caller if a token is sent
//! - `DELETE /test-posts/` - delete by `{id}`; owned posts need the owner or an admin

use std::sync::Arc;

use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};

use crate::routes::auth_routes::bearer_token;
use crate::routes::{error_response, json_response, not_found_response, parse_json_body, BoxBody};
use crate::server::AppState;
use crate::services::{DeleteRequest, PostRequest};
use crate::types::WicketError;

pub const PREFIX: &str = "/test-posts";

/// Which post route a path names
#[derive(Debug, PartialEq, Eq)]
enum PostRoute<'a> {
    Collection,
    Item(&'a str),
}

fn match_route(path: &str) -> Option<PostRoute<'_>> {
    let rest = path.strip_prefix(PREFIX)?;
    match rest {
        "" | "/" => Some(PostRoute::Collection),
        _ => {
            let id = rest.strip_prefix('/')?.trim_end_matches('/');
            if id.is_empty() || id.contains('/') {
                None
            } else {
                Some(PostRoute::Item(id))
            }
        }
    }
}

pub async fn handle_test_posts_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let Some(route) = match_route(&path) else {
        return not_found_response(&path);
    };

    match (method, route) {
        (Method::GET, PostRoute::Collection) => match state.posts.list().await {
            Ok(posts) => json_response(StatusCode::OK, &posts),
            Err(e) => error_response(&e),
        },

        (Method::GET, PostRoute::Item(raw)) => {
            let Ok(id) = raw.parse::<i64>() else {
                return error_response(&WicketError::BadRequest(format!(
                    "Invalid post id: {}",
                    raw
                )));
            };
            match state.posts.get(id).await {
                Ok(post) => json_response(StatusCode::OK, &post),
                Err(e) => error_response(&e),
            }
        }

        (Method::POST, PostRoute::Collection) => {
            let token = bearer_token(&req);
            let author = match state.authenticator.authenticate_optional(token.as_deref()).await {
                Ok(a) => a,
                Err(e) => return error_response(&e),
            };
            let body: PostRequest = match parse_json_body(req).await {
                Ok(b) => b,
                Err(e) => return error_response(&e),
            };
            match state.posts.create(body, author.as_ref()).await {
                Ok(posts) => json_response(StatusCode::OK, &posts),
                Err(e) => error_response(&e),
            }
        }

        (Method::DELETE, PostRoute::Collection) => {
            let token = bearer_token(&req);
            let caller = match state.authenticator.authenticate_optional(token.as_deref()).await {
                Ok(c) => c,
                Err(e) => return error_response(&e),
            };
            let body: DeleteRequest = match parse_json_body(req).await {
                Ok(b) => b,
                Err(e) => return error_response(&e),
            };
            match state.posts.delete(body.id, caller.as_ref()).await {
                Ok(posts) => json_response(StatusCode::OK, &posts),
                Err(e) => error_response(&e),
            }
        }

        _ => json_response(
            StatusCode::METHOD_NOT_ALLOWED,
            &serde_json::json!({ "detail": "Method Not Allowed" }),
        ),
    }
}
