//! Shared types for wicket

mod error;

pub use error::{Result, WicketError};
