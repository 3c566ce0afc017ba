//! Wire DTOs shared by every contract variant.
//!
//! # Design
//! Only the shapes both variants agree on live here. Creation and update
//! payloads differ per variant and are defined next to their contract in
//! `contract::patch` / `contract::put`.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::ValidationError;

/// A single todo item returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoItem {
    pub id: Uuid,
    pub title: String,
    pub completed: bool,
}

impl TodoItem {
    /// A fresh item with a server-assigned v4 identifier.
    pub fn new(title: impl Into<String>, completed: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            completed,
        }
    }
}

/// Uniform error body for every non-success response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoError {
    pub code: i64,
    pub message: String,
}

impl TodoError {
    pub const NOT_FOUND_MESSAGE: &'static str = "Todo item not found";

    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::new(404, Self::NOT_FOUND_MESSAGE)
    }

    pub fn invalid_input(err: &ValidationError) -> Self {
        Self::new(400, format!("Invalid input: {err}"))
    }
}

impl fmt::Display for TodoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.message)
    }
}
