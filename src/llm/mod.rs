mod client_core;
mod history;
mod stream;
mod tool_def;
mod tool_execution;
mod tool_runtime;
pub mod types;

use reqwest::StatusCode;
use thiserror::Error;

pub use client_core::*;
pub use history::ChatHistory;
pub use stream::*;
pub use tool_def::*;
pub use tool_execution::*;
pub use tool_runtime::{MAX_TURNS, ToolRuntime};
pub use types::*;

/// Fatal transport failures. Every variant ends the session.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("cannot connect to chat endpoint at {url}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("chat error: {status} - {body}")]
    Status { status: StatusCode, body: String },
    #[error("send chat request")]
    Request(#[source] reqwest::Error),
    #[error("byte stream read error")]
    Body(#[source] reqwest::Error),
}

impl ChatError {
    pub fn from_send(url: &str, err: reqwest::Error) -> Self {
        if err.is_connect() {
            ChatError::Connect {
                url: url.to_string(),
                source: err,
            }
        } else {
            ChatError::Request(err)
        }
    }

    pub fn is_connect(&self) -> bool {
        matches!(self, ChatError::Connect { .. })
    }
}

/// True when the error chain contains a connection failure to the endpoint.
pub fn is_connect_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<ChatError>()
            .is_some_and(ChatError::is_connect)
    })
}
