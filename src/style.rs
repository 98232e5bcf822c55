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

//! # Downflow Style Module
//!
//! Stage input/output styles. A stage consumes its input either
//! incrementally (one element at a time) or completely (the whole upstream
//! value at once), and produces its output the same two ways. The build
//! pass uses the four combinations to decide how adjacent stages connect.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How one side of a stage handles data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// One element at a time.
    Incremental,
    /// The whole value at once.
    Complete,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Incremental => f.write_str("incremental"),
            Mode::Complete => f.write_str("complete"),
        }
    }
}

/// Input/output style of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageStyle {
    pub input: Mode,
    pub output: Mode,
}

impl StageStyle {
    /// Incremental in, incremental out: element transforms, filters.
    pub const STREAMING: StageStyle = StageStyle {
        input: Mode::Incremental,
        output: Mode::Incremental,
    };

    /// Incremental in, complete out: folds, collectors.
    pub const AGGREGATING: StageStyle = StageStyle {
        input: Mode::Incremental,
        output: Mode::Complete,
    };

    /// Complete in, complete out: whole-value transforms, in-place sort.
    pub const WHOLE: StageStyle = StageStyle {
        input: Mode::Complete,
        output: Mode::Complete,
    };

    pub const fn new(input: Mode, output: Mode) -> StageStyle {
        StageStyle { input, output }
    }
}

impl fmt::Display for StageStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.input, self.output)
    }
}
