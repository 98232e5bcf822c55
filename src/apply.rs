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

//! # Downflow Apply Module
//!
//! The library's entry points: build a chain against a source, run it to
//! completion, and hand back the finalized [`Output`].
//!
//! All composition errors surface from the build step, before any element
//! flows. `apply_debug` additionally prints the built chain's structure —
//! stage names, styles, and input/output types, recursing into
//! sub-pipelines — before running.

use crate::chain::{build_chain, ChainDescription};
use crate::compose::IntoStageList;
use crate::engine::run;
use crate::errors::Result;
use crate::finalize::Output;
use crate::source::IntoSource;

/// Builds and runs a pipeline over `source`.
pub fn apply<'s, S, L>(source: S, stages: L) -> Result<Output<'s>>
where
    S: IntoSource<'s>,
    L: IntoStageList,
{
    let (source, mut specs) = source.into_source();
    specs.extend(stages.into_stage_list());
    let mut chain = build_chain(&source.shape(), &specs)?;
    let row = run(source.into_slot(), &mut chain)?;
    Ok(Output::new(row))
}

/// Builds the chain without running it and returns its debug description.
pub fn describe<'s, S, L>(source: S, stages: L) -> Result<ChainDescription>
where
    S: IntoSource<'s>,
    L: IntoStageList,
{
    let (source, mut specs) = source.into_source();
    specs.extend(stages.into_stage_list());
    let chain = build_chain(&source.shape(), &specs)?;
    Ok(chain.description().clone())
}

/// Like [`apply`], but prints the built chain's structure first.
pub fn apply_debug<'s, S, L>(source: S, stages: L) -> Result<Output<'s>>
where
    S: IntoSource<'s>,
    L: IntoStageList,
{
    let (source, mut specs) = source.into_source();
    specs.extend(stages.into_stage_list());
    let mut chain = build_chain(&source.shape(), &specs)?;
    println!("{}", chain.description());
    let row = run(source.into_slot(), &mut chain)?;
    Ok(Output::new(row))
}
