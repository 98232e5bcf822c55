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

//! # Row-Shape Stages
//!
//! Stages that rearrange the tuple structure of element rows without
//! touching the values: unpacking a pair or triple slot into separate
//! slots, reordering or dropping slots by index, and prepending a running
//! counter.

use std::marker::PhantomData;

use crate::engine::NextStages;
use crate::errors::{FlowError, Result};
use crate::stage::{BuiltStage, StageImpl, StageSpec};
use crate::style::StageStyle;
use crate::value::{Category, FlowValue, Row, RowShape, Slot, SlotShape};

struct Expand2<A, B> {
    _pd: PhantomData<fn() -> (A, B)>,
}

impl<A, B> StageImpl for Expand2<A, B>
where
    A: FlowValue,
    B: FlowValue,
{
    fn style(&self) -> StageStyle {
        StageStyle::STREAMING
    }

    fn accept(&mut self, input: Row<'_>, next: &mut NextStages<'_>) -> Result<()> {
        let mut slots = input.into_slots();
        let last = slots
            .pop()
            .ok_or_else(|| FlowError::internal("expand2 saw an empty row"))?;
        let (a, b) = last.take::<(A, B)>()?;
        slots.push(Slot::owned(a));
        slots.push(Slot::owned(b));
        next.accept(Row::from_slots(slots))
    }
}

/// Unpacks a trailing pair slot into two owned slots.
pub fn expand2<A: FlowValue, B: FlowValue>() -> StageSpec {
    StageSpec::atom("expand2", StageStyle::STREAMING, move |input| {
        let arity = input.arity();
        if arity == 0 {
            return Err(FlowError::config("expand2", "input row is empty"));
        }
        input.expect_type::<(A, B)>("expand2", arity - 1)?;
        let mut output = input.clone();
        output.slots.pop();
        output.slots.push(SlotShape::of::<A>(Category::Owned));
        output.slots.push(SlotShape::of::<B>(Category::Owned));
        Ok(BuiltStage {
            stage: Box::new(Expand2::<A, B> { _pd: PhantomData }),
            output,
        })
    })
}

struct Expand3<A, B, C> {
    _pd: PhantomData<fn() -> (A, B, C)>,
}

impl<A, B, C> StageImpl for Expand3<A, B, C>
where
    A: FlowValue,
    B: FlowValue,
    C: FlowValue,
{
    fn style(&self) -> StageStyle {
        StageStyle::STREAMING
    }

    fn accept(&mut self, input: Row<'_>, next: &mut NextStages<'_>) -> Result<()> {
        let mut slots = input.into_slots();
        let last = slots
            .pop()
            .ok_or_else(|| FlowError::internal("expand3 saw an empty row"))?;
        let (a, b, c) = last.take::<(A, B, C)>()?;
        slots.push(Slot::owned(a));
        slots.push(Slot::owned(b));
        slots.push(Slot::owned(c));
        next.accept(Row::from_slots(slots))
    }
}

/// Unpacks a trailing triple slot into three owned slots.
pub fn expand3<A: FlowValue, B: FlowValue, C: FlowValue>() -> StageSpec {
    StageSpec::atom("expand3", StageStyle::STREAMING, move |input| {
        let arity = input.arity();
        if arity == 0 {
            return Err(FlowError::config("expand3", "input row is empty"));
        }
        input.expect_type::<(A, B, C)>("expand3", arity - 1)?;
        let mut output = input.clone();
        output.slots.pop();
        output.slots.push(SlotShape::of::<A>(Category::Owned));
        output.slots.push(SlotShape::of::<B>(Category::Owned));
        output.slots.push(SlotShape::of::<C>(Category::Owned));
        Ok(BuiltStage {
            stage: Box::new(Expand3::<A, B, C> { _pd: PhantomData }),
            output,
        })
    })
}

struct Reorder {
    indices: Vec<usize>,
}

impl StageImpl for Reorder {
    fn style(&self) -> StageStyle {
        StageStyle::STREAMING
    }

    fn accept(&mut self, input: Row<'_>, next: &mut NextStages<'_>) -> Result<()> {
        next.accept(input.select(&self.indices)?)
    }
}

/// Keeps the named slots in the given order; dropped indices discard
/// their slots. Indices must be distinct and in range.
pub fn reorder(indices: &[usize]) -> StageSpec {
    let indices = indices.to_vec();
    StageSpec::atom("reorder", StageStyle::STREAMING, move |input| {
        if indices.is_empty() {
            return Err(FlowError::config("reorder", "index list is empty"));
        }
        let mut seen = vec![false; input.arity()];
        for &i in &indices {
            if i >= input.arity() {
                return Err(FlowError::config(
                    "reorder",
                    format!("index {} out of range for a row of {} slots", i, input.arity()),
                ));
            }
            if seen[i] {
                return Err(FlowError::config(
                    "reorder",
                    format!("index {} picked twice", i),
                ));
            }
            seen[i] = true;
        }
        let output = RowShape {
            slots: indices.iter().map(|&i| input.slots[i].clone()).collect(),
        };
        Ok(BuiltStage {
            stage: Box::new(Reorder {
                indices: indices.clone(),
            }),
            output,
        })
    })
}

struct Enumerate {
    next_index: i64,
}

impl StageImpl for Enumerate {
    fn style(&self) -> StageStyle {
        StageStyle::STREAMING
    }

    fn accept(&mut self, input: Row<'_>, next: &mut NextStages<'_>) -> Result<()> {
        let mut row = input;
        row.insert_front(Slot::owned(self.next_index));
        self.next_index += 1;
        next.accept(row)
    }
}

/// Prepends a running `i64` counter starting at `start`.
pub fn enumerate(start: i64) -> StageSpec {
    StageSpec::atom("enumerate", StageStyle::STREAMING, move |input| {
        let mut output = input.clone();
        output
            .slots
            .insert(0, SlotShape::of::<i64>(Category::Owned));
        Ok(BuiltStage {
            stage: Box::new(Enumerate { next_index: start }),
            output,
        })
    })
}
