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

//! # Collection Stages
//!
//! [`collect`] gathers a stream into a container and emits it as an
//! iterable owned value, so further incremental stages can follow. The
//! `for_each` family runs a side-effecting visitor and completes with
//! unit.
//!
//! Map targets take `(K, V)` pair elements in a single slot; a pair-slot
//! stream from a map source must pass through
//! [`pack2`](crate::stages::pack2) first.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;
use std::marker::PhantomData;

use crate::engine::NextStages;
use crate::errors::{FlowError, Result};
use crate::stage::{BuiltStage, StageImpl, StageSpec};
use crate::stream::Streamable;
use crate::style::StageStyle;
use crate::value::{Category, FlowValue, Row, RowShape, Slot, SlotShape};

/// A container a stream can be gathered into.
pub trait CollectTarget: FlowValue + Streamable {
    type Item: FlowValue;

    fn empty() -> Self;
    fn add(&mut self, item: Self::Item);
}

impl<T: FlowValue> CollectTarget for Vec<T> {
    type Item = T;

    fn empty() -> Self {
        Vec::new()
    }

    fn add(&mut self, item: T) {
        self.push(item);
    }
}

impl<T: FlowValue + Eq + Hash> CollectTarget for HashSet<T> {
    type Item = T;

    fn empty() -> Self {
        HashSet::new()
    }

    fn add(&mut self, item: T) {
        self.insert(item);
    }
}

impl<T: FlowValue + Ord> CollectTarget for BTreeSet<T> {
    type Item = T;

    fn empty() -> Self {
        BTreeSet::new()
    }

    fn add(&mut self, item: T) {
        self.insert(item);
    }
}

impl<K: FlowValue + Eq + Hash, V: FlowValue> CollectTarget for HashMap<K, V> {
    type Item = (K, V);

    fn empty() -> Self {
        HashMap::new()
    }

    fn add(&mut self, (k, v): (K, V)) {
        self.insert(k, v);
    }
}

impl<K: FlowValue + Ord, V: FlowValue> CollectTarget for BTreeMap<K, V> {
    type Item = (K, V);

    fn empty() -> Self {
        BTreeMap::new()
    }

    fn add(&mut self, (k, v): (K, V)) {
        self.insert(k, v);
    }
}

struct Collect<C: CollectTarget> {
    target: Option<C>,
}

impl<C: CollectTarget> StageImpl for Collect<C> {
    fn style(&self) -> StageStyle {
        StageStyle::AGGREGATING
    }

    fn accept(&mut self, input: Row<'_>, _next: &mut NextStages<'_>) -> Result<()> {
        let item = input.take1::<C::Item>()?;
        self.target
            .as_mut()
            .ok_or_else(|| FlowError::internal("collect state consumed twice"))?
            .add(item);
        Ok(())
    }

    fn finish(&mut self, next: &mut NextStages<'_>) -> Result<Row<'static>> {
        let target = self
            .target
            .take()
            .ok_or_else(|| FlowError::internal("collect state consumed twice"))?;
        next.complete(Row::single(Slot::owned_iterable(target)))
    }
}

/// Gathers elements into a fresh `C`; emits it owned and iterable.
pub fn collect<C: CollectTarget>() -> StageSpec {
    StageSpec::atom("collect", StageStyle::AGGREGATING, move |input| {
        input.expect_single::<C::Item>("collect")?;
        Ok(BuiltStage {
            stage: Box::new(Collect::<C> {
                target: Some(C::empty()),
            }),
            output: RowShape::single(SlotShape::of_iterable::<C>(Category::Owned)),
        })
    })
}

struct ForEach1<A, F> {
    f: F,
    _pd: PhantomData<fn(A)>,
}

impl<A, F> StageImpl for ForEach1<A, F>
where
    A: FlowValue,
    F: FnMut(A) + 'static,
{
    fn style(&self) -> StageStyle {
        StageStyle::AGGREGATING
    }

    fn accept(&mut self, input: Row<'_>, _next: &mut NextStages<'_>) -> Result<()> {
        (self.f)(input.take1::<A>()?);
        Ok(())
    }

    fn finish(&mut self, next: &mut NextStages<'_>) -> Result<Row<'static>> {
        next.complete(Row::single(Slot::owned(())))
    }
}

/// Runs a visitor over each element; completes with unit.
pub fn for_each<A, F>(f: F) -> StageSpec
where
    A: FlowValue,
    F: FnMut(A) + Clone + 'static,
{
    StageSpec::atom("for_each", StageStyle::AGGREGATING, move |input| {
        input.expect_single::<A>("for_each")?;
        Ok(BuiltStage {
            stage: Box::new(ForEach1 {
                f: f.clone(),
                _pd: PhantomData,
            }),
            output: RowShape::single(SlotShape::of::<()>(Category::Owned)),
        })
    })
}

struct ForEach2<A1, A2, F> {
    f: F,
    _pd: PhantomData<fn(A1, A2)>,
}

impl<A1, A2, F> StageImpl for ForEach2<A1, A2, F>
where
    A1: FlowValue,
    A2: FlowValue,
    F: FnMut(A1, A2) + 'static,
{
    fn style(&self) -> StageStyle {
        StageStyle::AGGREGATING
    }

    fn accept(&mut self, input: Row<'_>, _next: &mut NextStages<'_>) -> Result<()> {
        let (a1, a2) = input.take2::<A1, A2>()?;
        (self.f)(a1, a2);
        Ok(())
    }

    fn finish(&mut self, next: &mut NextStages<'_>) -> Result<Row<'static>> {
        next.complete(Row::single(Slot::owned(())))
    }
}

/// Two-slot visitor; completes with unit.
pub fn for_each2<A1, A2, F>(f: F) -> StageSpec
where
    A1: FlowValue,
    A2: FlowValue,
    F: FnMut(A1, A2) + Clone + 'static,
{
    StageSpec::atom("for_each2", StageStyle::AGGREGATING, move |input| {
        input.expect_arity("for_each2", 2)?;
        input.expect_type::<A1>("for_each2", 0)?;
        input.expect_type::<A2>("for_each2", 1)?;
        Ok(BuiltStage {
            stage: Box::new(ForEach2 {
                f: f.clone(),
                _pd: PhantomData,
            }),
            output: RowShape::single(SlotShape::of::<()>(Category::Owned)),
        })
    })
}

struct ForEach3<A1, A2, A3, F> {
    f: F,
    _pd: PhantomData<fn(A1, A2, A3)>,
}

impl<A1, A2, A3, F> StageImpl for ForEach3<A1, A2, A3, F>
where
    A1: FlowValue,
    A2: FlowValue,
    A3: FlowValue,
    F: FnMut(A1, A2, A3) + 'static,
{
    fn style(&self) -> StageStyle {
        StageStyle::AGGREGATING
    }

    fn accept(&mut self, input: Row<'_>, _next: &mut NextStages<'_>) -> Result<()> {
        let (a1, a2, a3) = input.take3::<A1, A2, A3>()?;
        (self.f)(a1, a2, a3);
        Ok(())
    }

    fn finish(&mut self, next: &mut NextStages<'_>) -> Result<Row<'static>> {
        next.complete(Row::single(Slot::owned(())))
    }
}

/// Three-slot visitor; completes with unit.
pub fn for_each3<A1, A2, A3, F>(f: F) -> StageSpec
where
    A1: FlowValue,
    A2: FlowValue,
    A3: FlowValue,
    F: FnMut(A1, A2, A3) + Clone + 'static,
{
    StageSpec::atom("for_each3", StageStyle::AGGREGATING, move |input| {
        input.expect_arity("for_each3", 3)?;
        input.expect_type::<A1>("for_each3", 0)?;
        input.expect_type::<A2>("for_each3", 1)?;
        input.expect_type::<A3>("for_each3", 2)?;
        Ok(BuiltStage {
            stage: Box::new(ForEach3 {
                f: f.clone(),
                _pd: PhantomData,
            }),
            output: RowShape::single(SlotShape::of::<()>(Category::Owned)),
        })
    })
}
