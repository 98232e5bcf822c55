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

//! # Downflow Higher-Order Stages
//!
//! Stages that run whole sub-pipelines per element or per group.
//!
//! ## Fan-Out
//!
//! [`tee`] feeds every element to several independent branches by shared
//! borrow and completes with all branch results side by side. A branch
//! that reports done stops receiving elements; the upstream scan stops
//! only once every branch is done.
//!
//! ## Grouping
//!
//! [`group_by`] folds *adjacent* runs of equal keys: each run gets a
//! fresh sub-pipeline, and the finished `(key, result)` row is emitted
//! the moment the run ends, preserving encounter order of runs.
//! [`map_group_by`] keeps one sub-pipeline per distinct key in a hash
//! map and emits all groups at finish in arbitrary order;
//! [`map_group_by_ordered`] uses an ordered map and emits in ascending
//! key order. All keying reads slot 0 shared and clones it once per
//! group.
//!
//! Sub-pipelines are built from the same descriptors as top-level ones.
//! They consume element rows, so their head must take incremental input,
//! and they must end with a complete-output stage.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::marker::PhantomData;
use std::mem;

use crate::chain::{build_subchain, Chain, ChainDescription};
use crate::compose::IntoStageList;
use crate::engine::NextStages;
use crate::errors::{FlowError, Result};
use crate::stage::{BuiltStage, StageImpl, StageSpec};
use crate::style::StageStyle;
use crate::value::{Category, FlowValue, Row, RowShape, Slot, SlotShape};

/// The shape a chain result has after terminal finalization: borrowed
/// slots come back owned unless they are marked to escape.
fn finalize_shape(shape: &RowShape) -> RowShape {
    RowShape {
        slots: shape
            .slots
            .iter()
            .map(|slot| {
                if slot.escape {
                    slot.clone()
                } else {
                    SlotShape {
                        meta: slot.meta,
                        category: Category::Owned,
                        escape: false,
                    }
                }
            })
            .collect(),
    }
}

fn shared_element_shape(shape: &RowShape) -> RowShape {
    RowShape {
        slots: shape
            .slots
            .iter()
            .map(|slot| SlotShape {
                meta: slot.meta,
                category: Category::Borrow,
                escape: false,
            })
            .collect(),
    }
}

struct Tee {
    chains: Vec<Chain>,
}

impl StageImpl for Tee {
    fn style(&self) -> StageStyle {
        StageStyle::AGGREGATING
    }

    fn accept(&mut self, input: Row<'_>, _next: &mut NextStages<'_>) -> Result<()> {
        for chain in &mut self.chains {
            if !chain.is_done() {
                chain.push(input.as_borrowed())?;
            }
        }
        Ok(())
    }

    fn is_done(&self) -> Option<bool> {
        Some(self.chains.iter().all(Chain::is_done))
    }

    fn finish(&mut self, next: &mut NextStages<'_>) -> Result<Row<'static>> {
        let mut slots = Vec::new();
        for chain in &mut self.chains {
            slots.extend(chain.finish()?.into_slots());
        }
        next.complete(Row::from_slots(slots))
    }

    fn describe_subchains(&self) -> Vec<(String, ChainDescription)> {
        self.chains
            .iter()
            .enumerate()
            .map(|(i, chain)| (format!("branch {}", i + 1), chain.description().clone()))
            .collect()
    }
}

/// Fans each element out to every branch by shared borrow; completes with
/// the branch results concatenated into one row.
pub fn tee(branches: impl IntoStageList) -> StageSpec {
    let branches = branches.into_stage_list();
    StageSpec::atom("tee", StageStyle::AGGREGATING, move |input| {
        if branches.is_empty() {
            return Err(FlowError::config("tee", "requires at least one branch"));
        }
        let element = shared_element_shape(input);
        let mut chains = Vec::with_capacity(branches.len());
        let mut output = RowShape { slots: Vec::new() };
        for branch in &branches {
            let chain = build_subchain(&element, std::slice::from_ref(branch))?;
            output
                .slots
                .extend(finalize_shape(chain.output_shape()).slots);
            chains.push(chain);
        }
        Ok(BuiltStage {
            stage: Box::new(Tee { chains }),
            output,
        })
    })
}

fn emit_group(
    key_slot: Slot<'static>,
    result: Row<'static>,
    next: &mut NextStages<'_>,
) -> Result<()> {
    let mut slots = vec![key_slot];
    slots.extend(result.into_slots());
    next.accept(Row::from_slots(slots))
}

struct GroupBy<A, K, F> {
    key: F,
    sub_specs: Vec<StageSpec>,
    element_shape: RowShape,
    current: Option<(K, Chain)>,
    desc: ChainDescription,
    _pd: PhantomData<fn(&A)>,
}

impl<A, K, F> StageImpl for GroupBy<A, K, F>
where
    A: FlowValue,
    K: FlowValue + PartialEq,
    F: FnMut(&A) -> K + 'static,
{
    fn style(&self) -> StageStyle {
        StageStyle::STREAMING
    }

    fn accept(&mut self, input: Row<'_>, next: &mut NextStages<'_>) -> Result<()> {
        let k = (self.key)(input.get::<A>(0)?);
        match &mut self.current {
            Some((current, chain)) if *current == k => chain.push(input),
            _ => {
                if let Some((finished, mut chain)) = self.current.take() {
                    emit_group(Slot::owned(finished), chain.finish()?, next)?;
                }
                let mut chain = build_subchain(&self.element_shape, &self.sub_specs)?;
                chain.push(input)?;
                self.current = Some((k, chain));
                Ok(())
            }
        }
    }

    fn finish(&mut self, next: &mut NextStages<'_>) -> Result<Row<'static>> {
        if let Some((key, mut chain)) = self.current.take() {
            emit_group(Slot::owned(key), chain.finish()?, next)?;
        }
        next.finish()
    }

    fn describe_subchains(&self) -> Vec<(String, ChainDescription)> {
        vec![("group".to_string(), self.desc.clone())]
    }
}

/// Folds adjacent runs of equal keys. Each run feeds a fresh
/// sub-pipeline; when the run ends, a `(key, result)` row flows
/// downstream immediately. Runs of a key that reappears later form
/// separate groups.
pub fn group_by<A, K, F>(key: F, sub: impl IntoStageList) -> StageSpec
where
    A: FlowValue,
    K: FlowValue + PartialEq,
    F: FnMut(&A) -> K + Clone + 'static,
{
    let sub_specs = sub.into_stage_list();
    StageSpec::atom("group_by", StageStyle::STREAMING, move |input| {
        input.expect_type::<A>("group_by", 0)?;
        let prototype = build_subchain(input, &sub_specs)?;
        let mut output = RowShape::single(SlotShape::of::<K>(Category::Owned));
        output
            .slots
            .extend(finalize_shape(prototype.output_shape()).slots);
        Ok(BuiltStage {
            stage: Box::new(GroupBy::<A, K, F> {
                key: key.clone(),
                sub_specs: sub_specs.clone(),
                element_shape: input.clone(),
                current: None,
                desc: prototype.description().clone(),
                _pd: PhantomData,
            }),
            output,
        })
    })
}

/// Keyed storage for per-group sub-pipelines.
trait GroupMap<K>: Default + 'static {
    fn get_or_insert(
        &mut self,
        key: K,
        make: impl FnOnce() -> Result<Chain>,
    ) -> Result<&mut Chain>;

    /// Removes all groups in this map's emission order.
    fn drain_groups(&mut self) -> Vec<(K, Chain)>;
}

impl<K: FlowValue + Eq + Hash> GroupMap<K> for HashMap<K, Chain> {
    fn get_or_insert(
        &mut self,
        key: K,
        make: impl FnOnce() -> Result<Chain>,
    ) -> Result<&mut Chain> {
        if !self.contains_key(&key) {
            let chain = make()?;
            self.insert(key.clone(), chain);
        }
        self.get_mut(&key)
            .ok_or_else(|| FlowError::internal("group vanished between insert and access"))
    }

    fn drain_groups(&mut self) -> Vec<(K, Chain)> {
        self.drain().collect()
    }
}

impl<K: FlowValue + Ord> GroupMap<K> for BTreeMap<K, Chain> {
    fn get_or_insert(
        &mut self,
        key: K,
        make: impl FnOnce() -> Result<Chain>,
    ) -> Result<&mut Chain> {
        if !self.contains_key(&key) {
            let chain = make()?;
            self.insert(key.clone(), chain);
        }
        self.get_mut(&key)
            .ok_or_else(|| FlowError::internal("group vanished between insert and access"))
    }

    fn drain_groups(&mut self) -> Vec<(K, Chain)> {
        mem::take(self).into_iter().collect()
    }
}

struct MapGroupBy<A, K, F, M> {
    key: F,
    sub_specs: Vec<StageSpec>,
    element_shape: RowShape,
    groups: M,
    desc: ChainDescription,
    _pd: PhantomData<fn(&A) -> K>,
}

impl<A, K, F, M> StageImpl for MapGroupBy<A, K, F, M>
where
    A: FlowValue,
    K: FlowValue,
    F: FnMut(&A) -> K + 'static,
    M: GroupMap<K>,
{
    fn style(&self) -> StageStyle {
        StageStyle::STREAMING
    }

    fn accept(&mut self, input: Row<'_>, _next: &mut NextStages<'_>) -> Result<()> {
        let MapGroupBy {
            key,
            sub_specs,
            element_shape,
            groups,
            ..
        } = self;
        let k = key(input.get::<A>(0)?);
        groups
            .get_or_insert(k, || build_subchain(element_shape, sub_specs))?
            .push(input)
    }

    fn finish(&mut self, next: &mut NextStages<'_>) -> Result<Row<'static>> {
        for (key, mut chain) in self.groups.drain_groups() {
            if next.is_done() {
                break;
            }
            emit_group(Slot::owned(key), chain.finish()?, next)?;
        }
        next.finish()
    }

    fn describe_subchains(&self) -> Vec<(String, ChainDescription)> {
        vec![("group".to_string(), self.desc.clone())]
    }
}

fn map_group_spec<A, K, F, M>(name: &'static str, key: F, sub_specs: Vec<StageSpec>) -> StageSpec
where
    A: FlowValue,
    K: FlowValue,
    F: FnMut(&A) -> K + Clone + 'static,
    M: GroupMap<K>,
{
    StageSpec::atom(name, StageStyle::STREAMING, move |input| {
        input.expect_type::<A>(name, 0)?;
        let prototype = build_subchain(input, &sub_specs)?;
        let mut output = RowShape::single(SlotShape::of::<K>(Category::Owned));
        output
            .slots
            .extend(finalize_shape(prototype.output_shape()).slots);
        Ok(BuiltStage {
            stage: Box::new(MapGroupBy::<A, K, F, M> {
                key: key.clone(),
                sub_specs: sub_specs.clone(),
                element_shape: input.clone(),
                groups: M::default(),
                desc: prototype.description().clone(),
                _pd: PhantomData,
            }),
            output,
        })
    })
}

/// Groups by key across the whole stream; one sub-pipeline per distinct
/// key. Groups emit at finish in arbitrary order.
pub fn map_group_by<A, K, F>(key: F, sub: impl IntoStageList) -> StageSpec
where
    A: FlowValue,
    K: FlowValue + Eq + Hash,
    F: FnMut(&A) -> K + Clone + 'static,
{
    map_group_spec::<A, K, F, HashMap<K, Chain>>("map_group_by", key, sub.into_stage_list())
}

/// Like [`map_group_by`], but groups emit in ascending key order.
pub fn map_group_by_ordered<A, K, F>(key: F, sub: impl IntoStageList) -> StageSpec
where
    A: FlowValue,
    K: FlowValue + Ord,
    F: FnMut(&A) -> K + Clone + 'static,
{
    map_group_spec::<A, K, F, BTreeMap<K, Chain>>("map_group_by_ordered", key, sub.into_stage_list())
}
