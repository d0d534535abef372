//! Error taxonomy for the inventory / esxcli core.
//!
//! Every variant carries enough context (path expression, namespace, method
//! name) to locate the failure without re-running at higher verbosity.
//! The core performs no recovery and no retries; all of these surface to the
//! immediate caller unchanged.

use thiserror::Error;

/// Errors produced by path resolution and dynamic command execution.
#[derive(Debug, Error)]
pub enum VimError {
    /// `..` components are rejected in any position.
    #[error("cannot traverse up a tree: '{expr}'")]
    UnsupportedTraversal { expr: String },

    /// A caller required exactly one match and got zero.
    #[error("no object matches '{expr}'")]
    NoMatch { expr: String },

    /// A caller required exactly one match and got several.
    #[error("'{expr}' resolves to {count} objects, expected one")]
    Ambiguous { expr: String, count: usize },

    /// Schema lookup found the namespace but not the method.
    #[error("method '{name}' not found in name space '{namespace}'")]
    MethodNotFound { name: String, namespace: String },

    /// Unknown flag, missing value, or malformed value in raw arguments.
    #[error("argument error: {0}")]
    Argument(String),

    /// The remote endpoint rejected the call with an explicit fault message.
    #[error("{0}")]
    Fault(String),

    /// Network / transport failure, opaque to this core.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl VimError {
    /// Transport failure from a bare message (fixture client, tests).
    pub fn transport_msg(msg: impl Into<String>) -> Self {
        VimError::Transport(msg.into().into())
    }
}

pub type Result<T> = std::result::Result<T, VimError>;
