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

//! # Sort Stages
//!
//! In-place sorting of a mutably borrowed `Vec`. These are whole-value
//! stages: they require a `MutBorrow` vector, rearrange it where it
//! lives, and forward the same borrow downstream. A pipeline fed the
//! vector by value or by shared borrow fails at build time.
//!
//! Both variants are stable.

use std::cmp::Ordering;
use std::marker::PhantomData;

use crate::engine::NextStages;
use crate::errors::{FlowError, Result};
use crate::stage::{BuiltStage, StageImpl, StageSpec};
use crate::style::StageStyle;
use crate::value::{Category, FlowValue, Row};

struct SortBy<T, F> {
    cmp: F,
    _pd: PhantomData<fn(&T)>,
}

impl<T, F> StageImpl for SortBy<T, F>
where
    T: FlowValue,
    F: FnMut(&T, &T) -> Ordering + 'static,
{
    fn style(&self) -> StageStyle {
        StageStyle::WHOLE
    }

    fn accept_all<'v>(&mut self, mut input: Row<'v>, next: &mut NextStages<'_>) -> Result<Row<'v>> {
        let cmp = &mut self.cmp;
        input.slot_mut(0)?.get_mut::<Vec<T>>()?.sort_by(|a, b| cmp(a, b));
        next.complete(input)
    }
}

fn sort_spec<T, F>(name: &'static str, cmp: F) -> StageSpec
where
    T: FlowValue,
    F: FnMut(&T, &T) -> Ordering + Clone + 'static,
{
    StageSpec::atom(name, StageStyle::WHOLE, move |input| {
        let slot = input.expect_single::<Vec<T>>(name)?;
        if slot.category != Category::MutBorrow {
            return Err(FlowError::config(
                name,
                format!(
                    "requires a mutably borrowed collection, found {} input",
                    slot.category
                ),
            ));
        }
        Ok(BuiltStage {
            stage: Box::new(SortBy {
                cmp: cmp.clone(),
                _pd: PhantomData::<fn(&T)>,
            }),
            output: input.clone(),
        })
    })
}

/// Sorts the borrowed vector by the element ordering.
pub fn sort<T: FlowValue + Ord>() -> StageSpec {
    sort_spec::<T, _>("sort", T::cmp)
}

/// Sorts the borrowed vector by a comparator.
pub fn sort_by<T, F>(cmp: F) -> StageSpec
where
    T: FlowValue,
    F: FnMut(&T, &T) -> Ordering + Clone + 'static,
{
    sort_spec::<T, F>("sort_by", cmp)
}
