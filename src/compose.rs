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

//! # Downflow Compose Module
//!
//! Composition: bundling stages — and optionally a source — into
//! reusable units.
//!
//! [`compose`] packs a stage list into a single descriptor usable
//! anywhere a stage is expected; the build pass flattens nested
//! compositions, so composition never changes runtime behavior.
//! [`Pipeline`] bundles a source with a stage prefix and is usable
//! anywhere a source is expected.

use crate::source::{IntoSource, Source};
use crate::stage::StageSpec;

/// Conversion into a list of stage descriptors.
pub trait IntoStageList {
    fn into_stage_list(self) -> Vec<StageSpec>;
}

impl IntoStageList for Vec<StageSpec> {
    fn into_stage_list(self) -> Vec<StageSpec> {
        self
    }
}

impl<const N: usize> IntoStageList for [StageSpec; N] {
    fn into_stage_list(self) -> Vec<StageSpec> {
        self.into_iter().collect()
    }
}

impl IntoStageList for StageSpec {
    fn into_stage_list(self) -> Vec<StageSpec> {
        vec![self]
    }
}

impl IntoStageList for &[StageSpec] {
    fn into_stage_list(self) -> Vec<StageSpec> {
        self.to_vec()
    }
}

/// Packs a stage list into one reusable descriptor.
pub fn compose(stages: impl IntoStageList) -> StageSpec {
    StageSpec::Compound(stages.into_stage_list())
}

/// A source bundled with a stage prefix.
pub struct Pipeline<'s> {
    source: Source<'s>,
    stages: Vec<StageSpec>,
}

impl<'s> Pipeline<'s> {
    pub fn new(source: impl IntoSource<'s>, stages: impl IntoStageList) -> Pipeline<'s> {
        let (source, mut prefix) = source.into_source();
        prefix.extend(stages.into_stage_list());
        Pipeline {
            source,
            stages: prefix,
        }
    }
}

impl<'s> IntoSource<'s> for Pipeline<'s> {
    fn into_source(self) -> (Source<'s>, Vec<StageSpec>) {
        (self.source, self.stages)
    }
}
