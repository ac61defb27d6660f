//! CORS origin policy
//!
//! The request's `Origin` is echoed back only when it is allowed. With no
//! configured list, local development origins are allowed: `localhost`,
//! `127.0.0.1` and `192.168.x.x`, over http or https, on any port.

use hyper::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, VARY,
};

const ALLOW_METHODS: &str = "GET, POST, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";

#[derive(Debug, Clone, Default)]
pub struct CorsPolicy {
    /// Exact origins to allow; `None` means the local-network default
    origins: Option<Vec<String>>,
}

impl CorsPolicy {
    pub fn new(origins: Option<Vec<String>>) -> Self {
        Self { origins }
    }

    pub fn allows(&self, origin: &str) -> bool {
        match self.origins {
            Some(ref list) => list.iter().any(|o| o == "*" || o == origin),
            None => is_local_origin(origin),
        }
    }

    /// Add CORS headers for `origin` to a response
    pub fn apply(&self, headers: &mut HeaderMap, origin: Option<&str>) {
        let Some(origin) = origin.filter(|o| self.allows(o)) else {
            return;
        };
        let Ok(value) = HeaderValue::from_str(origin) else {
            return;
        };

        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
        headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
        headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("86400"));
        headers.append(VARY, HeaderValue::from_static("Origin"));
    }
}

fn is_local_origin(origin: &str) -> bool {
    let Some(rest) = origin
        .strip_prefix("http://")
        .or_else(|| origin.strip_prefix("https://"))
    else {
        return false;
    };

    let host = match rest.split_once(':') {
        Some((host, port)) => {
            if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
                return false;
            }
            host
        }
        None => rest,
    };

    if host == "localhost" || host == "127.0.0.1" {
        return true;
    }

    match host.strip_prefix("192.168.") {
        Some(tail) => {
            let parts: Vec<&str> = tail.split('.').collect();
            parts.len() == 2
                && parts
                    .iter()
                    .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
        }
        None => false,
    }
}
