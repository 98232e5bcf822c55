//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Downflow.
//! The Downflow project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! # Downflow Error Module
//!
//! This module defines the error types used throughout the Downflow library
//! for consistent error handling and reporting.
//!
//! ## Error Handling Philosophy
//!
//! Downflow uses a structured error approach with the following principles:
//!
//! - **Fail at build time**: Every pipeline misconfiguration (style clash,
//!   type mismatch, invalid index list) surfaces as a structured error from
//!   the build pass, before any element flows
//! - **Context-Rich**: Errors carry the offending stage name and full type
//!   names to aid debugging
//! - **Serde Support**: Errors can be serialized/deserialized for logging
//!   and persistence
//!
//! ## Error Categories
//!
//! - **Config**: Pipeline composition violations (connection rules, invalid
//!   stage parameters)
//! - **TypeMismatch**: A stage was asked to consume a slot of the wrong type
//! - **Stage**: A stage failed while processing elements
//! - **Internal**: Library invariant violations

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience result alias used across the library.
pub type Result<T> = std::result::Result<T, FlowError>;

/// Structured error type for all Downflow operations.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum FlowError {
    /// Pipeline composition violation detected by the build pass.
    #[error("configuration error in stage '{stage}': {message}")]
    Config { stage: String, message: String },

    /// A stage was wired to a slot of the wrong type.
    #[error("type mismatch in stage '{stage}': expected {expected}, found {found}")]
    TypeMismatch {
        stage: String,
        expected: String,
        found: String,
    },

    /// A stage failed while processing elements.
    #[error("stage '{stage}' failed: {message}")]
    Stage { stage: String, message: String },

    /// Library invariant violation.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FlowError {
    /// Creates a configuration error naming the offending stage.
    pub fn config(stage: impl Into<String>, message: impl Into<String>) -> Self {
        FlowError::Config {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Creates a type-mismatch error with full type names.
    pub fn type_mismatch(
        stage: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        FlowError::TypeMismatch {
            stage: stage.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Creates a stage processing error.
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        FlowError::Stage {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Creates an internal invariant-violation error.
    pub fn internal(message: impl Into<String>) -> Self {
        FlowError::Internal(message.into())
    }
}

/// Concrete error payload carried by the short-circuit stages.
///
/// `unwrap_ok` consumes `Fallible<T>` values and reports the first `Fault`
/// it encounters instead of the pipeline result.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct Fault {
    pub message: String,
}

impl Fault {
    pub fn new(message: impl Into<String>) -> Self {
        Fault {
            message: message.into(),
        }
    }
}

/// Result alias for values flowing through `unwrap_ok`.
pub type Fallible<T> = std::result::Result<T, Fault>;
