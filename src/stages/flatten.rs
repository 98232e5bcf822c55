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

//! # Flatten Stages
//!
//! Inner iteration: the trailing slot of each element row is itself a
//! streamable container, and every one of its elements is emitted
//! downstream paired with the leading slots.
//!
//! [`flatten_last`] shares the leading slots: an owned prefix value is
//! viewed immutably by every emitted row. [`flatten_last_cloning`] gives
//! each emitted row its own clone of owned prefix values instead, so
//! downstream stages can consume them per element.
//!
//! Both honor the done protocol: the inner scan stops as soon as the
//! downstream chain reports done.

use std::marker::PhantomData;

use crate::engine::NextStages;
use crate::errors::{FlowError, Result};
use crate::stage::{BuiltStage, StageImpl, StageSpec};
use crate::stream::{stream_vtable, Streamable};
use crate::style::StageStyle;
use crate::value::{Category, FlowValue, RawSlot, Row, RowShape};

struct FlattenLast<C> {
    clone_owned_prefix: bool,
    _pd: PhantomData<fn() -> C>,
}

impl<C> StageImpl for FlattenLast<C>
where
    C: FlowValue + Streamable,
{
    fn style(&self) -> StageStyle {
        StageStyle::STREAMING
    }

    fn accept(&mut self, input: Row<'_>, next: &mut NextStages<'_>) -> Result<()> {
        let mut prefix = input.into_slots();
        let last = prefix
            .pop()
            .ok_or_else(|| FlowError::internal("flatten saw an empty row"))?;
        if next.is_done() {
            return Ok(());
        }
        let (raw, _, _) = last.into_raw();
        let vt = stream_vtable::<C>();
        let clone_owned_prefix = self.clone_owned_prefix;
        let mut sink = |elem: Row<'_>| -> Result<bool> {
            let mut slots = Vec::with_capacity(prefix.len() + elem.arity());
            for s in prefix.iter_mut() {
                if clone_owned_prefix && s.category() == Category::Owned {
                    slots.push(s.reborrow().into_owned());
                } else {
                    slots.push(s.reborrow());
                }
            }
            slots.extend(elem.into_slots());
            next.accept(Row::from_slots(slots))?;
            Ok(!next.is_done())
        };
        match raw {
            RawSlot::Owned(payload) => (vt.stream_owned)(payload, &mut sink)?,
            RawSlot::Borrow(payload) => (vt.stream_ref)(payload, &mut sink)?,
            RawSlot::MutBorrow(payload) => (vt.stream_mut)(payload, &mut sink)?,
        }
        Ok(())
    }
}

fn flatten_spec<C>(name: &'static str, clone_owned_prefix: bool) -> StageSpec
where
    C: FlowValue + Streamable,
{
    StageSpec::atom(name, StageStyle::STREAMING, move |input| {
        let arity = input.arity();
        if arity == 0 {
            return Err(FlowError::config(name, "input row is empty"));
        }
        let last = input.expect_type::<C>(name, arity - 1)?;
        let element = C::element_shape(last.category);
        let mut output = RowShape {
            slots: Vec::with_capacity(arity - 1 + element.arity()),
        };
        for slot in &input.slots[..arity - 1] {
            let mut shape = slot.clone();
            if !clone_owned_prefix && shape.category == Category::Owned {
                shape.category = Category::Borrow;
            }
            output.slots.push(shape);
        }
        output.slots.extend(element.slots);
        Ok(BuiltStage {
            stage: Box::new(FlattenLast::<C> {
                clone_owned_prefix,
                _pd: PhantomData,
            }),
            output,
        })
    })
}

/// Streams the trailing container slot; leading slots are shared across
/// the emitted rows.
pub fn flatten_last<C>() -> StageSpec
where
    C: FlowValue + Streamable,
{
    flatten_spec::<C>("flatten_last", false)
}

/// Like [`flatten_last`], but each emitted row gets its own clone of
/// owned leading slots.
pub fn flatten_last_cloning<C>() -> StageSpec
where
    C: FlowValue + Streamable,
{
    flatten_spec::<C>("flatten_last_cloning", true)
}
