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

//! # Downflow Stage Module
//!
//! Stage descriptors and stage instances.
//!
//! A [`StageSpec`] is a cheap-to-clone description of a stage: its name,
//! its style, and a build closure that, given the input row shape, either
//! produces a runnable instance plus its output shape or reports a
//! structured configuration error. Descriptors carry no element state, so
//! the same descriptor can participate in many pipelines.
//!
//! A [`StageImpl`] is a built instance driven by the engine. The trait is
//! object-safe; built chains are `Vec<Box<dyn StageImpl>>`.

use std::rc::Rc;

use crate::chain::ChainDescription;
use crate::engine::NextStages;
use crate::errors::{FlowError, Result};
use crate::style::StageStyle;
use crate::value::{Row, RowShape};

/// A built stage instance plus the shape of the rows it emits.
pub struct BuiltStage {
    pub stage: Box<dyn StageImpl>,
    pub output: RowShape,
}

type BuildFn = dyn Fn(&RowShape) -> Result<BuiltStage>;

/// Descriptor of one atomic stage.
pub struct AtomSpec {
    pub name: &'static str,
    pub style: StageStyle,
    pub(crate) build: Box<BuildFn>,
}

/// A cloneable stage descriptor: an atomic stage or a composed list.
///
/// Compound descriptors come from [`crate::compose`] and flatten during
/// the build pass; composition never changes runtime behavior.
#[derive(Clone)]
pub enum StageSpec {
    Atom(Rc<AtomSpec>),
    Compound(Vec<StageSpec>),
}

impl StageSpec {
    /// Creates an atomic stage descriptor. The build closure validates the
    /// input shape and constructs the runnable instance.
    pub fn atom<F>(name: &'static str, style: StageStyle, build: F) -> StageSpec
    where
        F: Fn(&RowShape) -> Result<BuiltStage> + 'static,
    {
        StageSpec::Atom(Rc::new(AtomSpec {
            name,
            style,
            build: Box::new(build),
        }))
    }

    pub fn name(&self) -> &'static str {
        match self {
            StageSpec::Atom(a) => a.name,
            StageSpec::Compound(_) => "composed",
        }
    }
}

/// A runnable stage instance.
///
/// Incremental-input stages override [`accept`](StageImpl::accept);
/// Complete-input stages override [`accept_all`](StageImpl::accept_all).
/// Aggregating stages additionally override
/// [`finish`](StageImpl::finish) to emit their accumulated value; the
/// default forwards the finish signal downstream.
pub trait StageImpl {
    fn style(&self) -> StageStyle;

    /// Receives one element row. Only called on Incremental-input stages.
    fn accept(&mut self, input: Row<'_>, next: &mut NextStages<'_>) -> Result<()> {
        let _ = (input, next);
        Err(FlowError::internal(
            "stage does not accept incremental input",
        ))
    }

    /// Receives the whole upstream value. Only called on Complete-input
    /// stages. Returns the completed downstream result.
    fn accept_all<'v>(&mut self, input: Row<'v>, next: &mut NextStages<'_>) -> Result<Row<'v>> {
        let _ = (input, next);
        Err(FlowError::internal("stage does not accept complete input"))
    }

    /// Signals that the upstream is exhausted. Aggregators emit their
    /// value here; pass-through stages delegate.
    fn finish(&mut self, next: &mut NextStages<'_>) -> Result<Row<'static>> {
        next.finish()
    }

    /// How this stage reshapes the completed chain result on finish.
    /// Short-circuit stages lift the downstream result into their wrapper
    /// here, so the build pass advertises the wrapped shape. `None` leaves
    /// the shape untouched.
    fn finish_shape(&self, name: &'static str, result: &RowShape) -> Result<Option<RowShape>> {
        let _ = (name, result);
        Ok(None)
    }

    /// This stage's opinion on early termination. `None` defers to the
    /// next stage downstream.
    fn is_done(&self) -> Option<bool> {
        None
    }

    /// Nested pipeline descriptions, for debug introspection of
    /// higher-order stages.
    fn describe_subchains(&self) -> Vec<(String, ChainDescription)> {
        Vec::new()
    }
}
