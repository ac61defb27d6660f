//! Configuration for wicket
//!
//! CLI arguments and environment variable handling using clap. A `.env` file
//! is loaded by the binaries before parsing.

use std::net::SocketAddr;

use clap::Parser;

use crate::auth::{TokenCodec, DEFAULT_EXPIRY_MINUTES};
use crate::types::{Result, WicketError};

/// Wicket - account authentication and session tokens
#[derive(Parser, Debug, Clone)]
#[command(name = "wicket")]
#[command(about = "Account authentication and session-token service")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Enable development mode (built-in token secret, in-memory store fallback)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// MongoDB configuration
    #[command(flatten)]
    pub mongo: MongoArgs,

    /// HS256 secret for session tokens (required in production)
    #[arg(long, env = "AUTH_SECRET_KEY")]
    pub auth_secret_key: Option<String>,

    /// File holding the token secret, used when AUTH_SECRET_KEY is unset
    #[arg(long, env = "AUTH_SECRET_FILE")]
    pub auth_secret_file: Option<String>,

    /// Session token lifetime in minutes (0 means 15)
    #[arg(long, env = "TOKEN_EXPIRY_MINUTES", default_value_t = DEFAULT_EXPIRY_MINUTES)]
    pub token_expiry_minutes: u64,

    /// Comma-separated list of allowed CORS origins
    /// If unset, localhost, 127.0.0.1 and 192.168.x.x origins are allowed
    #[arg(long, env = "CORS_ORIGINS")]
    pub cors_origins: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// MongoDB connection configuration
#[derive(Parser, Debug, Clone)]
pub struct MongoArgs {
    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "wicket")]
    pub mongodb_db: String,
}

impl Args {
    /// Token secret from AUTH_SECRET_KEY, else from AUTH_SECRET_FILE
    pub fn auth_secret(&self) -> Result<Option<String>> {
        if let Some(ref key) = self.auth_secret_key {
            return Ok(Some(key.clone()));
        }

        match self.auth_secret_file {
            Some(ref path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| {
                    WicketError::Config(format!("Cannot read AUTH_SECRET_FILE {}: {}", path, e))
                })?;
                Ok(Some(raw.trim().to_string()))
            }
            None => Ok(None),
        }
    }

    /// Build the token codec (uses a built-in secret in dev mode)
    pub fn token_codec(&self) -> Result<TokenCodec> {
        match self.auth_secret()? {
            Some(secret) => TokenCodec::new(&secret, self.token_expiry_minutes),
            None if self.dev_mode => TokenCodec::new_dev(self.token_expiry_minutes),
            None => Err(WicketError::Config(
                "AUTH_SECRET_KEY is required in production mode".into(),
            )),
        }
    }

    /// Configured CORS origins, if any
    pub fn cors_origin_list(&self) -> Option<Vec<String>> {
        self.cors_origins.as_ref().map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.dev_mode && self.auth_secret_key.is_none() && self.auth_secret_file.is_none() {
            return Err(
                "AUTH_SECRET_KEY or AUTH_SECRET_FILE is required in production mode".to_string(),
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "a-production-secret-of-at-least-32-chars";

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["wicket"];
        argv.extend_from_slice(args);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["--dev-mode"]);
        assert_eq!(args.listen.port(), 8080);
        assert_eq!(args.mongo.mongodb_db, "wicket");
        assert_eq!(args.token_expiry_minutes, 10080);
        assert_eq!(args.cors_origin_list(), None);
    }

    #[test]
    fn test_production_requires_secret() {
        let args = parse(&[]);
        assert!(args.validate().is_err());
        assert!(matches!(args.token_codec(), Err(WicketError::Config(_))));

        let args = parse(&["--auth-secret-key", SECRET]);
        assert!(args.validate().is_ok());
        assert!(args.token_codec().is_ok());
    }

    #[test]
    fn test_short_secret_rejected() {
        let args = parse(&["--auth-secret-key", "short"]);
        assert!(args.validate().is_ok());
        assert!(args.token_codec().is_err());
    }

    #[test]
    fn test_dev_mode_codec() {
        let args = parse(&["--dev-mode"]);
        assert!(args.validate().is_ok());
        let codec = args.token_codec().unwrap();
        let token = codec.issue("guest_1", None).unwrap();
        assert!(codec.verify(&token).is_ok());
    }

    #[test]
    fn test_oversized_token_expiry_rejected() {
        let args = parse(&[
            "--auth-secret-key",
            SECRET,
            "--token-expiry-minutes",
            "18446744073709551615",
        ]);
        assert!(matches!(args.token_codec(), Err(WicketError::Config(_))));

        let args = parse(&["--dev-mode", "--token-expiry-minutes", "1000000000000"]);
        assert!(matches!(args.token_codec(), Err(WicketError::Config(_))));
    }

    #[test]
    fn test_secret_file() {
        let path = std::env::temp_dir().join(format!("wicket-secret-{}", std::process::id()));
        std::fs::write(&path, format!("{SECRET}\n")).unwrap();

        let args = parse(&["--auth-secret-file", path.to_str().unwrap()]);
        assert_eq!(args.auth_secret().unwrap().as_deref(), Some(SECRET));
        assert!(args.token_codec().is_ok());

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_secret_file() {
        let args = parse(&["--auth-secret-file", "/nonexistent/wicket/secret"]);
        assert!(matches!(args.auth_secret(), Err(WicketError::Config(_))));
    }

    #[test]
    fn test_cors_origins() {
        let args = parse(&[
            "--dev-mode",
            "--cors-origins",
            "https://a.example, https://b.example,,",
        ]);
        assert_eq!(
            args.cors_origin_list().unwrap(),
            vec!["https://a.example", "https://b.example"]
        );
    }
}
