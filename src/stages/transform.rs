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

//! # Transform Stages
//!
//! Element transforms (`map` family), whole-value transforms
//! (`map_whole`), tuple construction (`construct`, `pack2`/`pack3`), and
//! computed-slot appends (`append` family).
//!
//! Consuming transforms move owned inputs and clone borrowed ones; their
//! outputs are always owned. `append` reads the existing slots shared and
//! pushes the computed value onto the row, preserving the categories of
//! everything already there.

use std::marker::PhantomData;

use crate::stage::{BuiltStage, StageImpl, StageSpec};
use crate::style::StageStyle;
use crate::value::{Category, FlowValue, FromRow, Row, RowShape, Slot, SlotShape};
use crate::errors::Result;
use crate::engine::NextStages;

struct Map<A, B, F> {
    f: F,
    _pd: PhantomData<fn(A) -> B>,
}

impl<A, B, F> StageImpl for Map<A, B, F>
where
    A: FlowValue,
    B: FlowValue,
    F: FnMut(A) -> B + 'static,
{
    fn style(&self) -> StageStyle {
        StageStyle::STREAMING
    }

    fn accept(&mut self, input: Row<'_>, next: &mut NextStages<'_>) -> Result<()> {
        let a = input.take1::<A>()?;
        next.accept(Row::single(Slot::owned((self.f)(a))))
    }
}

/// One-argument consuming transform.
pub fn map<A, B, F>(f: F) -> StageSpec
where
    A: FlowValue,
    B: FlowValue,
    F: FnMut(A) -> B + Clone + 'static,
{
    StageSpec::atom("map", StageStyle::STREAMING, move |input| {
        input.expect_single::<A>("map")?;
        Ok(BuiltStage {
            stage: Box::new(Map {
                f: f.clone(),
                _pd: PhantomData,
            }),
            output: RowShape::single(SlotShape::of::<B>(Category::Owned)),
        })
    })
}

struct Map2<A1, A2, B, F> {
    f: F,
    _pd: PhantomData<fn(A1, A2) -> B>,
}

impl<A1, A2, B, F> StageImpl for Map2<A1, A2, B, F>
where
    A1: FlowValue,
    A2: FlowValue,
    B: FlowValue,
    F: FnMut(A1, A2) -> B + 'static,
{
    fn style(&self) -> StageStyle {
        StageStyle::STREAMING
    }

    fn accept(&mut self, input: Row<'_>, next: &mut NextStages<'_>) -> Result<()> {
        let (a1, a2) = input.take2::<A1, A2>()?;
        next.accept(Row::single(Slot::owned((self.f)(a1, a2))))
    }
}

/// Two-argument consuming transform over a two-slot row.
pub fn map2<A1, A2, B, F>(f: F) -> StageSpec
where
    A1: FlowValue,
    A2: FlowValue,
    B: FlowValue,
    F: FnMut(A1, A2) -> B + Clone + 'static,
{
    StageSpec::atom("map2", StageStyle::STREAMING, move |input| {
        input.expect_arity("map2", 2)?;
        input.expect_type::<A1>("map2", 0)?;
        input.expect_type::<A2>("map2", 1)?;
        Ok(BuiltStage {
            stage: Box::new(Map2 {
                f: f.clone(),
                _pd: PhantomData,
            }),
            output: RowShape::single(SlotShape::of::<B>(Category::Owned)),
        })
    })
}

struct Map3<A1, A2, A3, B, F> {
    f: F,
    _pd: PhantomData<fn(A1, A2, A3) -> B>,
}

impl<A1, A2, A3, B, F> StageImpl for Map3<A1, A2, A3, B, F>
where
    A1: FlowValue,
    A2: FlowValue,
    A3: FlowValue,
    B: FlowValue,
    F: FnMut(A1, A2, A3) -> B + 'static,
{
    fn style(&self) -> StageStyle {
        StageStyle::STREAMING
    }

    fn accept(&mut self, input: Row<'_>, next: &mut NextStages<'_>) -> Result<()> {
        let (a1, a2, a3) = input.take3::<A1, A2, A3>()?;
        next.accept(Row::single(Slot::owned((self.f)(a1, a2, a3))))
    }
}

/// Three-argument consuming transform over a three-slot row.
pub fn map3<A1, A2, A3, B, F>(f: F) -> StageSpec
where
    A1: FlowValue,
    A2: FlowValue,
    A3: FlowValue,
    B: FlowValue,
    F: FnMut(A1, A2, A3) -> B + Clone + 'static,
{
    StageSpec::atom("map3", StageStyle::STREAMING, move |input| {
        input.expect_arity("map3", 3)?;
        input.expect_type::<A1>("map3", 0)?;
        input.expect_type::<A2>("map3", 1)?;
        input.expect_type::<A3>("map3", 2)?;
        Ok(BuiltStage {
            stage: Box::new(Map3 {
                f: f.clone(),
                _pd: PhantomData,
            }),
            output: RowShape::single(SlotShape::of::<B>(Category::Owned)),
        })
    })
}

struct MapRef<A, B, F> {
    f: F,
    _pd: PhantomData<fn(A) -> B>,
}

impl<A, B, F> StageImpl for MapRef<A, B, F>
where
    A: FlowValue,
    B: FlowValue,
    F: FnMut(&A) -> B + 'static,
{
    fn style(&self) -> StageStyle {
        StageStyle::STREAMING
    }

    fn accept(&mut self, input: Row<'_>, next: &mut NextStages<'_>) -> Result<()> {
        let b = (self.f)(input.ref1::<A>()?);
        next.accept(Row::single(Slot::owned(b)))
    }
}

/// Shared-read transform: never clones the input element.
pub fn map_ref<A, B, F>(f: F) -> StageSpec
where
    A: FlowValue,
    B: FlowValue,
    F: FnMut(&A) -> B + Clone + 'static,
{
    StageSpec::atom("map_ref", StageStyle::STREAMING, move |input| {
        input.expect_single::<A>("map_ref")?;
        Ok(BuiltStage {
            stage: Box::new(MapRef {
                f: f.clone(),
                _pd: PhantomData,
            }),
            output: RowShape::single(SlotShape::of::<B>(Category::Owned)),
        })
    })
}

struct MapWhole<C, B, F> {
    f: F,
    _pd: PhantomData<fn(C) -> B>,
}

impl<C, B, F> StageImpl for MapWhole<C, B, F>
where
    C: FlowValue,
    B: FlowValue,
    F: FnMut(&C) -> B + 'static,
{
    fn style(&self) -> StageStyle {
        StageStyle::WHOLE
    }

    fn accept_all<'v>(&mut self, input: Row<'v>, next: &mut NextStages<'_>) -> Result<Row<'v>> {
        let b = (self.f)(input.ref1::<C>()?);
        next.complete(Row::single(Slot::owned(b)))
    }
}

fn map_whole_spec<C, B, F>(
    name: &'static str,
    f: F,
    output: fn() -> SlotShape,
) -> StageSpec
where
    C: FlowValue,
    B: FlowValue,
    F: FnMut(&C) -> B + Clone + 'static,
{
    StageSpec::atom(name, StageStyle::WHOLE, move |input| {
        input.expect_single::<C>(name)?;
        Ok(BuiltStage {
            stage: Box::new(MapWhole::<C, B, _> {
                f: f.clone(),
                _pd: PhantomData,
            }),
            output: RowShape::single(output()),
        })
    })
}

/// Whole-value transform: consumes the completed upstream value by shared
/// read and completes with the result.
pub fn map_whole<C, B, F>(f: F) -> StageSpec
where
    C: FlowValue,
    B: FlowValue,
    F: FnMut(&C) -> B + Clone + 'static,
{
    map_whole_spec::<C, B, F>("map_whole", f, || SlotShape::of::<B>(Category::Owned))
}

/// Like [`map_whole`], but the result can feed an incremental boundary.
pub fn map_whole_iterable<C, B, F>(f: F) -> StageSpec
where
    C: FlowValue,
    B: FlowValue + crate::stream::Streamable,
    F: FnMut(&C) -> B + Clone + 'static,
{
    map_whole_spec::<C, B, F>("map_whole_iterable", f, || {
        SlotShape::of_iterable::<B>(Category::Owned)
    })
}

struct Construct<T> {
    _pd: PhantomData<fn() -> T>,
}

impl<T: FromRow> StageImpl for Construct<T> {
    fn style(&self) -> StageStyle {
        StageStyle::STREAMING
    }

    fn accept(&mut self, input: Row<'_>, next: &mut NextStages<'_>) -> Result<()> {
        let value = T::from_row(input)?;
        next.accept(Row::single(Slot::owned(value)))
    }
}

/// Builds a `T` from the current tuple slots. The conversion is proven
/// buildable at build time via [`FromRow::check`].
pub fn construct<T: FromRow>() -> StageSpec {
    StageSpec::atom("construct", StageStyle::STREAMING, move |input| {
        T::check(input, "construct")?;
        Ok(BuiltStage {
            stage: Box::new(Construct::<T> { _pd: PhantomData }),
            output: RowShape::single(SlotShape::of::<T>(Category::Owned)),
        })
    })
}

/// Packs a two-slot row into one owned pair slot.
pub fn pack2<A: FlowValue, B: FlowValue>() -> StageSpec {
    construct::<(A, B)>()
}

/// Packs a three-slot row into one owned triple slot.
pub fn pack3<A: FlowValue, B: FlowValue, C: FlowValue>() -> StageSpec {
    construct::<(A, B, C)>()
}

struct Append1<A, B, F> {
    f: F,
    _pd: PhantomData<fn(A) -> B>,
}

impl<A, B, F> StageImpl for Append1<A, B, F>
where
    A: FlowValue,
    B: FlowValue,
    F: FnMut(&A) -> B + 'static,
{
    fn style(&self) -> StageStyle {
        StageStyle::STREAMING
    }

    fn accept(&mut self, input: Row<'_>, next: &mut NextStages<'_>) -> Result<()> {
        let b = (self.f)(input.get::<A>(0)?);
        let mut row = input;
        row.push(Slot::owned(b));
        next.accept(row)
    }
}

/// Appends a slot computed from a shared read of slot 0; existing slots
/// keep their categories.
pub fn append<A, B, F>(f: F) -> StageSpec
where
    A: FlowValue,
    B: FlowValue,
    F: FnMut(&A) -> B + Clone + 'static,
{
    StageSpec::atom("append", StageStyle::STREAMING, move |input| {
        input.expect_type::<A>("append", 0)?;
        let mut output = input.clone();
        output.slots.push(SlotShape::of::<B>(Category::Owned));
        Ok(BuiltStage {
            stage: Box::new(Append1 {
                f: f.clone(),
                _pd: PhantomData,
            }),
            output,
        })
    })
}

struct Append2<A1, A2, B, F> {
    f: F,
    _pd: PhantomData<fn(A1, A2) -> B>,
}

impl<A1, A2, B, F> StageImpl for Append2<A1, A2, B, F>
where
    A1: FlowValue,
    A2: FlowValue,
    B: FlowValue,
    F: FnMut(&A1, &A2) -> B + 'static,
{
    fn style(&self) -> StageStyle {
        StageStyle::STREAMING
    }

    fn accept(&mut self, input: Row<'_>, next: &mut NextStages<'_>) -> Result<()> {
        let b = (self.f)(input.get::<A1>(0)?, input.get::<A2>(1)?);
        let mut row = input;
        row.push(Slot::owned(b));
        next.accept(row)
    }
}

/// Appends a slot computed from shared reads of slots 0 and 1.
pub fn append2<A1, A2, B, F>(f: F) -> StageSpec
where
    A1: FlowValue,
    A2: FlowValue,
    B: FlowValue,
    F: FnMut(&A1, &A2) -> B + Clone + 'static,
{
    StageSpec::atom("append2", StageStyle::STREAMING, move |input| {
        input.expect_type::<A1>("append2", 0)?;
        input.expect_type::<A2>("append2", 1)?;
        let mut output = input.clone();
        output.slots.push(SlotShape::of::<B>(Category::Owned));
        Ok(BuiltStage {
            stage: Box::new(Append2 {
                f: f.clone(),
                _pd: PhantomData,
            }),
            output,
        })
    })
}

struct Append3<A1, A2, A3, B, F> {
    f: F,
    _pd: PhantomData<fn(A1, A2, A3) -> B>,
}

impl<A1, A2, A3, B, F> StageImpl for Append3<A1, A2, A3, B, F>
where
    A1: FlowValue,
    A2: FlowValue,
    A3: FlowValue,
    B: FlowValue,
    F: FnMut(&A1, &A2, &A3) -> B + 'static,
{
    fn style(&self) -> StageStyle {
        StageStyle::STREAMING
    }

    fn accept(&mut self, input: Row<'_>, next: &mut NextStages<'_>) -> Result<()> {
        let b = (self.f)(input.get::<A1>(0)?, input.get::<A2>(1)?, input.get::<A3>(2)?);
        let mut row = input;
        row.push(Slot::owned(b));
        next.accept(row)
    }
}

/// Appends a slot computed from shared reads of slots 0, 1 and 2.
pub fn append3<A1, A2, A3, B, F>(f: F) -> StageSpec
where
    A1: FlowValue,
    A2: FlowValue,
    A3: FlowValue,
    B: FlowValue,
    F: FnMut(&A1, &A2, &A3) -> B + Clone + 'static,
{
    StageSpec::atom("append3", StageStyle::STREAMING, move |input| {
        input.expect_type::<A1>("append3", 0)?;
        input.expect_type::<A2>("append3", 1)?;
        input.expect_type::<A3>("append3", 2)?;
        let mut output = input.clone();
        output.slots.push(SlotShape::of::<B>(Category::Owned));
        Ok(BuiltStage {
            stage: Box::new(Append3 {
                f: f.clone(),
                _pd: PhantomData,
            }),
            output,
        })
    })
}
