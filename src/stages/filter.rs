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

//! # Filter Stages
//!
//! Predicate filters over one, two, or three slots, plus the prefix
//! limiter [`take_n`]. Filters read their slots shared and forward the
//! original row untouched, so element categories pass through unchanged.
//! `take_n` participates in the done protocol: once its budget is spent it
//! votes to stop the upstream scan.

use std::marker::PhantomData;

use crate::engine::NextStages;
use crate::errors::Result;
use crate::stage::{BuiltStage, StageImpl, StageSpec};
use crate::style::StageStyle;
use crate::value::{FlowValue, Row};

struct Filter<A, F> {
    pred: F,
    _pd: PhantomData<fn(&A)>,
}

impl<A, F> StageImpl for Filter<A, F>
where
    A: FlowValue,
    F: FnMut(&A) -> bool + 'static,
{
    fn style(&self) -> StageStyle {
        StageStyle::STREAMING
    }

    fn accept(&mut self, input: Row<'_>, next: &mut NextStages<'_>) -> Result<()> {
        if (self.pred)(input.ref1::<A>()?) {
            next.accept(input)?;
        }
        Ok(())
    }
}

/// Keeps elements the predicate accepts; the element passes through with
/// its category intact.
pub fn filter<A, F>(pred: F) -> StageSpec
where
    A: FlowValue,
    F: FnMut(&A) -> bool + Clone + 'static,
{
    StageSpec::atom("filter", StageStyle::STREAMING, move |input| {
        input.expect_type::<A>("filter", 0)?;
        input.expect_arity("filter", 1)?;
        Ok(BuiltStage {
            stage: Box::new(Filter {
                pred: pred.clone(),
                _pd: PhantomData,
            }),
            output: input.clone(),
        })
    })
}

struct Filter2<A1, A2, F> {
    pred: F,
    _pd: PhantomData<fn(&A1, &A2)>,
}

impl<A1, A2, F> StageImpl for Filter2<A1, A2, F>
where
    A1: FlowValue,
    A2: FlowValue,
    F: FnMut(&A1, &A2) -> bool + 'static,
{
    fn style(&self) -> StageStyle {
        StageStyle::STREAMING
    }

    fn accept(&mut self, input: Row<'_>, next: &mut NextStages<'_>) -> Result<()> {
        let keep = {
            let (a1, a2) = input.ref2::<A1, A2>()?;
            (self.pred)(a1, a2)
        };
        if keep {
            next.accept(input)?;
        }
        Ok(())
    }
}

/// Two-slot predicate filter.
pub fn filter2<A1, A2, F>(pred: F) -> StageSpec
where
    A1: FlowValue,
    A2: FlowValue,
    F: FnMut(&A1, &A2) -> bool + Clone + 'static,
{
    StageSpec::atom("filter2", StageStyle::STREAMING, move |input| {
        input.expect_arity("filter2", 2)?;
        input.expect_type::<A1>("filter2", 0)?;
        input.expect_type::<A2>("filter2", 1)?;
        Ok(BuiltStage {
            stage: Box::new(Filter2 {
                pred: pred.clone(),
                _pd: PhantomData,
            }),
            output: input.clone(),
        })
    })
}

struct Filter3<A1, A2, A3, F> {
    pred: F,
    _pd: PhantomData<fn(&A1, &A2, &A3)>,
}

impl<A1, A2, A3, F> StageImpl for Filter3<A1, A2, A3, F>
where
    A1: FlowValue,
    A2: FlowValue,
    A3: FlowValue,
    F: FnMut(&A1, &A2, &A3) -> bool + 'static,
{
    fn style(&self) -> StageStyle {
        StageStyle::STREAMING
    }

    fn accept(&mut self, input: Row<'_>, next: &mut NextStages<'_>) -> Result<()> {
        let keep = {
            let (a1, a2, a3) = input.ref3::<A1, A2, A3>()?;
            (self.pred)(a1, a2, a3)
        };
        if keep {
            next.accept(input)?;
        }
        Ok(())
    }
}

/// Three-slot predicate filter.
pub fn filter3<A1, A2, A3, F>(pred: F) -> StageSpec
where
    A1: FlowValue,
    A2: FlowValue,
    A3: FlowValue,
    F: FnMut(&A1, &A2, &A3) -> bool + Clone + 'static,
{
    StageSpec::atom("filter3", StageStyle::STREAMING, move |input| {
        input.expect_arity("filter3", 3)?;
        input.expect_type::<A1>("filter3", 0)?;
        input.expect_type::<A2>("filter3", 1)?;
        input.expect_type::<A3>("filter3", 2)?;
        Ok(BuiltStage {
            stage: Box::new(Filter3 {
                pred: pred.clone(),
                _pd: PhantomData,
            }),
            output: input.clone(),
        })
    })
}

struct TakeN {
    left: usize,
}

impl StageImpl for TakeN {
    fn style(&self) -> StageStyle {
        StageStyle::STREAMING
    }

    fn accept(&mut self, input: Row<'_>, next: &mut NextStages<'_>) -> Result<()> {
        if self.left > 0 {
            self.left -= 1;
            next.accept(input)?;
        }
        Ok(())
    }

    fn is_done(&self) -> Option<bool> {
        Some(self.left == 0)
    }
}

/// Forwards at most `n` elements, then reports done. Works over any row
/// shape. `take_n(0)` is done before the first element arrives.
pub fn take_n(n: usize) -> StageSpec {
    StageSpec::atom("take_n", StageStyle::STREAMING, move |input| {
        Ok(BuiltStage {
            stage: Box::new(TakeN { left: n }),
            output: input.clone(),
        })
    })
}
