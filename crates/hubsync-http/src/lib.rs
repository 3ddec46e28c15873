//! Automation Hub HTTP client for hubsync
//!
//! Implements [`hubsync_core::HubClient`] against the Galaxy NG REST API.
//!
//! # Example
//!
//! ```ignore
//! use hubsync_http::{Auth, HttpHubClient, HubConnection};
//!
//! let connection = HubConnection::new("https://hub.example.com")
//!     .with_auth(Auth::Token("abc123".to_string()));
//! let client = HttpHubClient::new(connection)?;
//!
//! let outcome = hubsync_core::reconcile(&client, &desired).await?;
//! ```

pub mod client;
pub mod error;

pub use client::{Auth, HttpHubClient, HubConnection};
pub use error::{HttpError, Result};
