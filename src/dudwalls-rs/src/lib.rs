//! Dudwalls Client Library
//!
//! HTTP client for the Dudwalls document database REST API.
//!
//! ```rust,no_run
//! use dudwalls_rs::{Client, Document};
//!
//! #[tokio::main]
//! async fn main() -> dudwalls_rs::Result<()> {
//!     let client = Client::connect("https://your-dudwalls-instance.com", "your-api-key")?;
//!
//!     client.create_database("app").await?;
//!     client.create_collection("app", "users").await?;
//!
//!     let mut user = Document::new();
//!     user.insert("name", "John Doe");
//!     let stored = client.insert_one("app", "users", &user).await?;
//!     println!("stored {:?}", stored.id());
//!     Ok(())
//! }
//! ```

mod client;

pub use client::{Client, InsertManyReport};
pub use dudwalls_core::{Config, Document};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(String),

    #[error("Invalid database, collection or document name: {0:?}")]
    InvalidName(String),

    #[error("API key is not a valid header value")]
    InvalidApiKey,
}

impl ClientError {
    /// HTTP status reported by the server, if the failure came from one
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } => Some(*status),
            ClientError::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Request(e) if e.is_timeout())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_helpers() {
        let err = ClientError::Server {
            status: 404,
            message: "Document not found".to_string(),
        };
        assert!(err.is_not_found());
        assert!(!err.is_timeout());
        assert_eq!(err.to_string(), "Server error: 404 - Document not found");

        let err = ClientError::InvalidResponse("expected a JSON object".to_string());
        assert_eq!(err.status(), None);
        assert!(!err.is_not_found());
    }
}
