//! Authentication module — GitHub OAuth + JWT sessions
//!
//! Provides:
//! - Session credential signing/parsing (`jwt` submodule)
//! - Anti-CSRF state signing (`state` submodule)
//! - GitHub authorization code flow client (`github` submodule)
//! - Identity reconciliation (`store` submodule)
//! - Login orchestration (`service` submodule)
//! - Request authentication (`middleware`, `extractor` submodules)

pub mod error;
pub mod extractor;
pub mod github;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod service;
pub mod state;
pub mod store;

pub use error::AuthError;
pub use service::{AuthResult, AuthService, AuthStart};
