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

//! # Downflow Chain Module
//!
//! The build pass: turns a list of stage descriptors into a runnable
//! [`Chain`], or a structured error.
//!
//! ## What the Build Pass Proves
//!
//! Walking the flattened descriptor list, a [`RowShape`] is threaded from
//! the source through every stage:
//!
//! - **Connection rules**: matching modes connect directly; a Complete
//!   output feeding an Incremental input is auto-iterated when the value
//!   is a single iterable slot; an Incremental output can never feed a
//!   Complete input
//! - **Type checks**: every stage's build closure compares the incoming
//!   slot types against what it consumes, reporting mismatches with full
//!   type names
//! - **Terminal rule**: the chain must end with a Complete-output stage
//! - **Result shape**: the declared chain output reflects the wrapping
//!   short-circuit stages apply to the result on finish
//! - **Generator rule**: a generator source cannot feed a Complete-input
//!   stage
//!
//! All violations surface before any element flows.

use std::fmt;
use std::rc::Rc;

use crate::engine::NextStages;
use crate::errors::{FlowError, Result};
use crate::stage::{AtomSpec, StageImpl, StageSpec};
use crate::style::{Mode, StageStyle};
use crate::value::{Row, RowShape, SlotShape};

/// Debug record for one built stage.
#[derive(Debug, Clone)]
pub struct StageDescription {
    pub name: &'static str,
    pub style: StageStyle,
    pub input: String,
    pub output: String,
    pub nested: Vec<(String, ChainDescription)>,
}

/// Debug record for a built chain, nesting into sub-pipelines.
#[derive(Debug, Clone)]
pub struct ChainDescription {
    pub stages: Vec<StageDescription>,
}

impl ChainDescription {
    fn render(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = "    ".repeat(indent);
        for (i, stage) in self.stages.iter().enumerate() {
            writeln!(
                f,
                "{}stage {}: {} [{}] {} -> {}",
                pad,
                i + 1,
                stage.name,
                stage.style,
                stage.input,
                stage.output
            )?;
            for (label, sub) in &stage.nested {
                writeln!(f, "{}    {}:", pad, label)?;
                sub.render(f, indent + 2)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for ChainDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, 0)
    }
}

/// A validated, runnable pipeline chain.
pub struct Chain {
    stages: Vec<Box<dyn StageImpl>>,
    description: ChainDescription,
    output: RowShape,
}

impl Chain {
    pub fn description(&self) -> &ChainDescription {
        &self.description
    }

    pub fn output_shape(&self) -> &RowShape {
        &self.output
    }

    pub(crate) fn stages_mut(&mut self) -> &mut [Box<dyn StageImpl>] {
        &mut self.stages
    }

    /// Pushes one element row into the chain head. Used to drive
    /// sub-pipelines inside higher-order stages.
    pub(crate) fn push(&mut self, row: Row<'_>) -> Result<()> {
        NextStages::new(&mut self.stages).accept(row)
    }

    /// Finishes the chain from its head and returns the completed result.
    pub(crate) fn finish(&mut self) -> Result<Row<'static>> {
        NextStages::new(&mut self.stages).finish()
    }

    pub(crate) fn is_done(&self) -> bool {
        for stage in &self.stages {
            if let Some(done) = stage.is_done() {
                return done;
            }
        }
        false
    }
}

fn flatten(specs: &[StageSpec], out: &mut Vec<Rc<AtomSpec>>) {
    for spec in specs {
        match spec {
            StageSpec::Atom(atom) => out.push(Rc::clone(atom)),
            StageSpec::Compound(inner) => flatten(inner, out),
        }
    }
}

/// Builds the main chain against a source slot shape. The source counts as
/// a Complete-output head.
pub(crate) fn build_chain(source: &SlotShape, specs: &[StageSpec]) -> Result<Chain> {
    let is_generator = source.meta.stream.map_or(false, |vt| vt.is_generator);
    build_from(RowShape::single(source.clone()), Mode::Complete, is_generator, specs)
}

/// Builds a sub-pipeline fed element rows of the given shape. The head
/// stage must consume incrementally.
pub(crate) fn build_subchain(element: &RowShape, specs: &[StageSpec]) -> Result<Chain> {
    build_from(element.clone(), Mode::Incremental, false, specs)
}

fn build_from(
    mut shape: RowShape,
    mut mode: Mode,
    mut from_generator: bool,
    specs: &[StageSpec],
) -> Result<Chain> {
    let mut atoms = Vec::new();
    flatten(specs, &mut atoms);

    let mut stages: Vec<Box<dyn StageImpl>> = Vec::with_capacity(atoms.len());
    let mut descriptions = Vec::with_capacity(atoms.len());

    for atom in &atoms {
        let input_shape = match (mode, atom.style.input) {
            (Mode::Incremental, Mode::Complete) => {
                return Err(FlowError::config(
                    atom.name,
                    "cannot connect an incremental output to a complete-input stage; \
                     insert an explicit collecting stage",
                ));
            }
            (Mode::Complete, Mode::Incremental) => {
                if shape.arity() != 1 {
                    return Err(FlowError::config(
                        atom.name,
                        format!(
                            "completed value of shape {} is not iterable at an incremental boundary",
                            shape.type_names()
                        ),
                    ));
                }
                let slot = &shape.slots[0];
                let vt = slot.meta.stream.ok_or_else(|| {
                    FlowError::config(
                        atom.name,
                        format!(
                            "completed value of type {} is not iterable at an incremental boundary",
                            slot.type_name()
                        ),
                    )
                })?;
                (vt.element_shape)(slot.category)
            }
            (Mode::Complete, Mode::Complete) => {
                if from_generator {
                    return Err(FlowError::config(
                        atom.name,
                        "a generator source cannot feed a complete-input stage",
                    ));
                }
                shape.clone()
            }
            (Mode::Incremental, Mode::Incremental) => shape.clone(),
        };

        let built = (atom.build)(&input_shape)?;
        descriptions.push(StageDescription {
            name: atom.name,
            style: atom.style,
            input: input_shape.type_names(),
            output: built.output.type_names(),
            nested: built.stage.describe_subchains(),
        });
        shape = built.output;
        mode = atom.style.output;
        from_generator = false;
        stages.push(built.stage);
    }

    if mode != Mode::Complete {
        return Err(FlowError::config(
            atoms.last().map_or("pipeline", |a| a.name),
            "pipeline must end with a complete-output stage",
        ));
    }

    // Finish-time reshaping propagates from the tail back to the head, so
    // the declared output accounts for short-circuit wrapping.
    for (atom, stage) in atoms.iter().zip(stages.iter()).rev() {
        if let Some(reshaped) = stage.finish_shape(atom.name, &shape)? {
            shape = reshaped;
        }
    }

    log::debug!(
        "built chain: {} stages, output shape {}",
        stages.len(),
        shape.type_names()
    );
    Ok(Chain {
        stages,
        description: ChainDescription {
            stages: descriptions,
        },
        output: shape,
    })
}
