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

//! # Downflow Core Library
//!
//! This is the main library entry point for the Downflow pipeline engine.
//! It provides a push-based, stage-composed data pipeline: a source value
//! flows through a validated chain of stages, and the result comes back
//! with the ownership the caller handed in.
//!
//! ## Module Overview
//!
//! The library is organized into the following major modules:
//!
//! - **value**: Slots, rows, ownership categories, and runtime type metadata
//! - **stream**: Push-iteration over containers and generators
//! - **generator**: Unbounded callback-driven sources
//! - **stage**: Stage descriptors and the runnable stage trait
//! - **chain**: The build pass that validates and links a pipeline
//! - **engine**: Single-threaded chain execution
//! - **source**: Source construction from owned and borrowed values
//! - **compose**: Reusable stage lists and pre-bound pipelines
//! - **stages**: The leaf stage catalogue (map, filter, fold, collect, ...)
//! - **higher_order**: Fan-out and grouping over sub-pipelines
//! - **finalize**: Terminal ownership normalization and the output view
//!
//! ## Quick Start
//!
//! ```rust
//! use downflow::{apply, stages::{filter, map, collect}};
//!
//! let doubled_evens = apply(
//!     vec![1i64, 2, 3, 4, 5, 6],
//!     [
//!         filter(|x: &i64| x % 2 == 0),
//!         map(|x: i64| x * 10),
//!         collect::<Vec<i64>>(),
//!     ],
//! )
//! .and_then(|out| out.value::<Vec<i64>>());
//! assert_eq!(doubled_evens.unwrap(), vec![20, 40, 60]);
//! ```
//!
//! ## Architecture
//!
//! Downflow follows a two-phase design:
//! 1. **Build**: stage descriptors are linked against the source shape;
//!    every type and connection error surfaces here, before any element
//!    flows
//! 2. **Run**: elements are pushed through the chain in a single pass;
//!    aggregators absorb, streaming stages forward, and the done protocol
//!    cuts the scan short as soon as nothing downstream wants more
//!
//! ## Error Handling
//!
//! All operations return `Result<T, FlowError>` for explicit error
//! handling. Build-time violations surface as configuration and type
//! mismatch errors; runtime invariant violations surface as internal
//! errors.

pub mod errors;
pub mod value;
pub mod stream;
pub mod generator;
pub mod style;
pub mod stage;
pub mod chain;
pub mod engine;
pub mod finalize;
pub mod source;
pub mod compose;
pub mod apply;
pub mod stages;
pub mod higher_order;

pub use errors::{Fallible, Fault, FlowError, Result};
pub use value::{Category, FlowValue, FromRow, Row, RowShape, Slot, SlotMeta, SlotShape, Wrapper};
pub use stream::{StreamSink, Streamable, StreamVtable};
pub use generator::{generate, generator_from, generator_range, Gen};
pub use style::{Mode, StageStyle};
pub use stage::{AtomSpec, BuiltStage, StageImpl, StageSpec};
pub use chain::{Chain, ChainDescription, StageDescription};
pub use engine::NextStages;
pub use finalize::Output;
pub use source::{IntoSource, Source, SourceValue};
pub use compose::{compose, IntoStageList, Pipeline};
pub use apply::{apply, apply_debug, describe};
pub use higher_order::{group_by, map_group_by, map_group_by_ordered, tee};
