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

//! # Fold Stages
//!
//! Aggregators: generic [`fold`], the counting and summing shorthands,
//! and the extremum family. All of them absorb elements without
//! forwarding and emit one owned value on finish.
//!
//! The extremum stages emit `Option`-shaped results (`None` on an empty
//! input) carried under an option slot meta, so a downstream
//! [`unwrap_some`](crate::stages::unwrap_some) recognizes the value as
//! already wrapped.

use std::cmp::Ordering;
use std::marker::PhantomData;
use std::ops::AddAssign;

use crate::engine::NextStages;
use crate::errors::{FlowError, Result};
use crate::stage::{BuiltStage, StageImpl, StageSpec};
use crate::style::StageStyle;
use crate::value::{Category, FlowValue, Row, RowShape, Slot, SlotMeta, SlotShape};

struct Fold<A, B, F> {
    acc: Option<B>,
    f: F,
    _pd: PhantomData<fn(A)>,
}

impl<A, B, F> StageImpl for Fold<A, B, F>
where
    A: FlowValue,
    B: FlowValue,
    F: FnMut(B, A) -> B + 'static,
{
    fn style(&self) -> StageStyle {
        StageStyle::AGGREGATING
    }

    fn accept(&mut self, input: Row<'_>, _next: &mut NextStages<'_>) -> Result<()> {
        let a = input.take1::<A>()?;
        let acc = self
            .acc
            .take()
            .ok_or_else(|| FlowError::internal("fold state consumed twice"))?;
        self.acc = Some((self.f)(acc, a));
        Ok(())
    }

    fn finish(&mut self, next: &mut NextStages<'_>) -> Result<Row<'static>> {
        let acc = self
            .acc
            .take()
            .ok_or_else(|| FlowError::internal("fold state consumed twice"))?;
        next.complete(Row::single(Slot::owned(acc)))
    }
}

fn fold_spec<A, B, F>(name: &'static str, init: B, f: F) -> StageSpec
where
    A: FlowValue,
    B: FlowValue,
    F: FnMut(B, A) -> B + Clone + 'static,
{
    StageSpec::atom(name, StageStyle::AGGREGATING, move |input| {
        input.expect_single::<A>(name)?;
        Ok(BuiltStage {
            stage: Box::new(Fold {
                acc: Some(init.clone()),
                f: f.clone(),
                _pd: PhantomData::<fn(A)>,
            }),
            output: RowShape::single(SlotShape::of::<B>(Category::Owned)),
        })
    })
}

/// Left fold from `init`; consumes each element.
pub fn fold<A, B, F>(init: B, f: F) -> StageSpec
where
    A: FlowValue,
    B: FlowValue,
    F: FnMut(B, A) -> B + Clone + 'static,
{
    fold_spec::<A, B, F>("fold", init, f)
}

/// Sums elements with `+=` from the type's default.
pub fn sum<A>() -> StageSpec
where
    A: FlowValue + Default + AddAssign<A>,
{
    fold_spec::<A, A, _>("sum", A::default(), |mut acc: A, x: A| {
        acc += x;
        acc
    })
}

struct Count {
    n: usize,
}

impl StageImpl for Count {
    fn style(&self) -> StageStyle {
        StageStyle::AGGREGATING
    }

    fn accept(&mut self, _input: Row<'_>, _next: &mut NextStages<'_>) -> Result<()> {
        self.n += 1;
        Ok(())
    }

    fn finish(&mut self, next: &mut NextStages<'_>) -> Result<Row<'static>> {
        next.complete(Row::single(Slot::owned(self.n)))
    }
}

/// Counts elements of any row shape; emits a `usize`.
pub fn count() -> StageSpec {
    StageSpec::atom("count", StageStyle::AGGREGATING, move |_input| {
        Ok(BuiltStage {
            stage: Box::new(Count { n: 0 }),
            output: RowShape::single(SlotShape::of::<usize>(Category::Owned)),
        })
    })
}

struct Extreme<A, F> {
    best: Option<A>,
    cmp: F,
    pick_max: bool,
}

impl<A, F> StageImpl for Extreme<A, F>
where
    A: FlowValue,
    F: FnMut(&A, &A) -> Ordering + 'static,
{
    fn style(&self) -> StageStyle {
        StageStyle::AGGREGATING
    }

    fn accept(&mut self, input: Row<'_>, _next: &mut NextStages<'_>) -> Result<()> {
        let a = input.take1::<A>()?;
        self.best = match self.best.take() {
            None => Some(a),
            Some(best) => {
                let ord = (self.cmp)(&a, &best);
                let replace = if self.pick_max {
                    ord == Ordering::Greater
                } else {
                    ord == Ordering::Less
                };
                Some(if replace { a } else { best })
            }
        };
        Ok(())
    }

    fn finish(&mut self, next: &mut NextStages<'_>) -> Result<Row<'static>> {
        let out = Slot::owned_boxed(Box::new(self.best.take()), SlotMeta::option_of::<A>());
        next.complete(Row::single(out))
    }
}

fn option_shape<A: FlowValue>() -> SlotShape {
    SlotShape {
        meta: SlotMeta::option_of::<A>(),
        category: Category::Owned,
        escape: false,
    }
}

fn extreme_spec<A, F>(name: &'static str, cmp: F, pick_max: bool) -> StageSpec
where
    A: FlowValue,
    F: FnMut(&A, &A) -> Ordering + Clone + 'static,
{
    StageSpec::atom(name, StageStyle::AGGREGATING, move |input| {
        input.expect_single::<A>(name)?;
        Ok(BuiltStage {
            stage: Box::new(Extreme {
                best: None,
                cmp: cmp.clone(),
                pick_max,
            }),
            output: RowShape::single(option_shape::<A>()),
        })
    })
}

/// Smallest element under a comparator; `None` on empty input. Ties keep
/// the earlier element.
pub fn min_by<A, F>(cmp: F) -> StageSpec
where
    A: FlowValue,
    F: FnMut(&A, &A) -> Ordering + Clone + 'static,
{
    extreme_spec::<A, F>("min_by", cmp, false)
}

/// Largest element under a comparator; `None` on empty input. Ties keep
/// the earlier element.
pub fn max_by<A, F>(cmp: F) -> StageSpec
where
    A: FlowValue,
    F: FnMut(&A, &A) -> Ordering + Clone + 'static,
{
    extreme_spec::<A, F>("max_by", cmp, true)
}

/// Smallest element by the type's ordering.
pub fn min<A: FlowValue + Ord>() -> StageSpec {
    extreme_spec::<A, _>("min", A::cmp, false)
}

/// Largest element by the type's ordering.
pub fn max<A: FlowValue + Ord>() -> StageSpec {
    extreme_spec::<A, _>("max", A::cmp, true)
}

struct MinMax<A> {
    bounds: Option<(A, A)>,
}

impl<A> StageImpl for MinMax<A>
where
    A: FlowValue + Ord,
{
    fn style(&self) -> StageStyle {
        StageStyle::AGGREGATING
    }

    fn accept(&mut self, input: Row<'_>, _next: &mut NextStages<'_>) -> Result<()> {
        let a = input.take1::<A>()?;
        self.bounds = match self.bounds.take() {
            None => Some((a.clone(), a)),
            Some((lo, hi)) => {
                let lo = if a < lo { a.clone() } else { lo };
                let hi = if a > hi { a } else { hi };
                Some((lo, hi))
            }
        };
        Ok(())
    }

    fn finish(&mut self, next: &mut NextStages<'_>) -> Result<Row<'static>> {
        let out = Slot::owned_boxed(
            Box::new(self.bounds.take()),
            SlotMeta::option_of::<(A, A)>(),
        );
        next.complete(Row::single(out))
    }
}

/// Both bounds in one pass; `None` on empty input.
pub fn min_max<A: FlowValue + Ord>() -> StageSpec {
    StageSpec::atom("min_max", StageStyle::AGGREGATING, move |input| {
        input.expect_single::<A>("min_max")?;
        Ok(BuiltStage {
            stage: Box::new(MinMax::<A> { bounds: None }),
            output: RowShape::single(option_shape::<(A, A)>()),
        })
    })
}
