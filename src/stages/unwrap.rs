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

//! # Short-Circuit Stages
//!
//! [`unwrap_some`] consumes `Option<T>` elements and forwards the inner
//! values; the first `None` stops the upstream scan, and on finish the
//! downstream result is lifted into `Option` (`None` when the scan was
//! cut short). [`unwrap_ok`] does the same for [`Fallible<T>`] with the
//! first [`Fault`] as the error payload.
//!
//! If the downstream result is already wrapped (the extremum stages emit
//! one), the failure substitutes the empty value of the same wrapper
//! instead of nesting. The build pass applies the same wrap to the
//! declared chain output, so consumers downstream of a sub-pipeline see
//! the wrapped type, and a downstream result that is wrapper-typed but
//! built without wrapper metadata is rejected before any element flows.
//! Wrapping an already-lifted value a second time is not supported;
//! lifted metadata carries no further lift hooks.

use std::marker::PhantomData;

use crate::engine::NextStages;
use crate::errors::{Fallible, Fault, FlowError, Result};
use crate::stage::{BuiltStage, StageImpl, StageSpec};
use crate::style::StageStyle;
use crate::value::{Category, FlowValue, Row, RowShape, Slot, SlotShape, Wrapper};

const NESTED_WRAP: &str = "nested short-circuit wrapping is not supported";

fn is_untagged_option(type_name: &str) -> bool {
    type_name.starts_with("core::option::Option<")
}

fn is_untagged_fallible(type_name: &str) -> bool {
    type_name.starts_with("core::result::Result<") && type_name.ends_with("Fault>")
}

/// Build-pass counterpart of the finish-time wrap: computes the shape the
/// downstream result takes once lifted into `wrapper`, or rejects shapes
/// the wrap cannot handle before any element flows.
fn wrapped_shape(stage: &'static str, result: &RowShape, wrapper: Wrapper) -> Result<RowShape> {
    if result.arity() != 1 {
        return Err(FlowError::config(
            stage,
            format!(
                "short-circuit wrapping requires a single result slot, found shape {}",
                result.type_names()
            ),
        ));
    }
    let slot = &result.slots[0];
    let meta = slot.meta;
    if meta.wrapper == wrapper {
        return Ok(RowShape::single(SlotShape {
            meta,
            category: Category::Owned,
            escape: false,
        }));
    }
    let untagged = match wrapper {
        Wrapper::Option => is_untagged_option(meta.type_name),
        Wrapper::Fallible => is_untagged_fallible(meta.type_name),
        Wrapper::Plain => false,
    };
    if untagged {
        return Err(FlowError::config(
            stage,
            format!(
                "downstream result of type {} carries no wrapper metadata; produce \
                 it through a wrapper-aware stage so failure substitutes the empty \
                 value instead of nesting",
                meta.type_name
            ),
        ));
    }
    let lift = meta.lift.ok_or_else(|| FlowError::config(stage, NESTED_WRAP))?;
    let wrapped_meta = match wrapper {
        Wrapper::Option => (lift.option_meta)(),
        Wrapper::Fallible => (lift.fallible_meta)(),
        Wrapper::Plain => return Err(FlowError::internal("plain is not a wrapper")),
    };
    Ok(RowShape::single(SlotShape {
        meta: wrapped_meta,
        category: Category::Owned,
        escape: false,
    }))
}

fn wrap_option(row: Row<'static>, failed: bool) -> Result<Row<'static>> {
    if row.arity() != 1 {
        return Err(FlowError::internal(
            "short-circuit wrapping requires a single-slot result",
        ));
    }
    let slot = row.into_single()?;
    let meta = *slot.meta();
    if meta.wrapper == Wrapper::Option {
        if failed {
            let make_none = meta
                .make_none
                .ok_or_else(|| FlowError::internal("option metadata lost its empty hook"))?;
            return Ok(Row::single(Slot::owned_boxed(make_none(), meta)));
        }
        return Ok(Row::single(slot));
    }
    let lift = meta.lift.ok_or_else(|| FlowError::internal(NESTED_WRAP))?;
    let wrapped_meta = (lift.option_meta)();
    let payload = if failed {
        (lift.none)()
    } else {
        (lift.some)(slot.take_boxed())
    };
    Ok(Row::single(Slot::owned_boxed(payload, wrapped_meta)))
}

fn wrap_fallible(row: Row<'static>, fault: Option<Fault>) -> Result<Row<'static>> {
    if row.arity() != 1 {
        return Err(FlowError::internal(
            "short-circuit wrapping requires a single-slot result",
        ));
    }
    let slot = row.into_single()?;
    let meta = *slot.meta();
    if meta.wrapper == Wrapper::Fallible {
        if let Some(fault) = fault {
            let make_err = meta
                .make_err
                .ok_or_else(|| FlowError::internal("fallible metadata lost its error hook"))?;
            return Ok(Row::single(Slot::owned_boxed(make_err(fault), meta)));
        }
        return Ok(Row::single(slot));
    }
    let lift = meta.lift.ok_or_else(|| FlowError::internal(NESTED_WRAP))?;
    let wrapped_meta = (lift.fallible_meta)();
    let payload = match fault {
        Some(fault) => (lift.err)(fault),
        None => (lift.ok)(slot.take_boxed()),
    };
    Ok(Row::single(Slot::owned_boxed(payload, wrapped_meta)))
}

struct UnwrapSome<T> {
    stopped: bool,
    _pd: PhantomData<fn() -> T>,
}

impl<T: FlowValue> StageImpl for UnwrapSome<T> {
    fn style(&self) -> StageStyle {
        StageStyle::STREAMING
    }

    fn accept(&mut self, input: Row<'_>, next: &mut NextStages<'_>) -> Result<()> {
        match input.take1::<Option<T>>()? {
            Some(value) if !self.stopped => next.accept(Row::single(Slot::owned(value))),
            Some(_) => Ok(()),
            None => {
                self.stopped = true;
                Ok(())
            }
        }
    }

    fn is_done(&self) -> Option<bool> {
        Some(self.stopped)
    }

    fn finish(&mut self, next: &mut NextStages<'_>) -> Result<Row<'static>> {
        let row = next.finish()?;
        wrap_option(row, self.stopped)
    }

    fn finish_shape(&self, name: &'static str, result: &RowShape) -> Result<Option<RowShape>> {
        wrapped_shape(name, result, Wrapper::Option).map(Some)
    }
}

/// Forwards the values inside `Some`; the first `None` short-circuits,
/// and the pipeline result arrives wrapped in `Option`.
pub fn unwrap_some<T: FlowValue>() -> StageSpec {
    StageSpec::atom("unwrap_some", StageStyle::STREAMING, move |input| {
        input.expect_single::<Option<T>>("unwrap_some")?;
        Ok(BuiltStage {
            stage: Box::new(UnwrapSome::<T> {
                stopped: false,
                _pd: PhantomData,
            }),
            output: RowShape::single(SlotShape::of::<T>(Category::Owned)),
        })
    })
}

struct UnwrapOk<T> {
    fault: Option<Fault>,
    _pd: PhantomData<fn() -> T>,
}

impl<T: FlowValue> StageImpl for UnwrapOk<T> {
    fn style(&self) -> StageStyle {
        StageStyle::STREAMING
    }

    fn accept(&mut self, input: Row<'_>, next: &mut NextStages<'_>) -> Result<()> {
        match input.take1::<Fallible<T>>()? {
            Ok(value) if self.fault.is_none() => next.accept(Row::single(Slot::owned(value))),
            Ok(_) => Ok(()),
            Err(fault) => {
                if self.fault.is_none() {
                    self.fault = Some(fault);
                }
                Ok(())
            }
        }
    }

    fn is_done(&self) -> Option<bool> {
        Some(self.fault.is_some())
    }

    fn finish(&mut self, next: &mut NextStages<'_>) -> Result<Row<'static>> {
        let row = next.finish()?;
        wrap_fallible(row, self.fault.take())
    }

    fn finish_shape(&self, name: &'static str, result: &RowShape) -> Result<Option<RowShape>> {
        wrapped_shape(name, result, Wrapper::Fallible).map(Some)
    }
}

/// Forwards the values inside `Ok`; the first `Err` short-circuits, and
/// the pipeline result arrives as [`Fallible`] carrying that fault.
pub fn unwrap_ok<T: FlowValue>() -> StageSpec {
    StageSpec::atom("unwrap_ok", StageStyle::STREAMING, move |input| {
        input.expect_single::<Fallible<T>>("unwrap_ok")?;
        Ok(BuiltStage {
            stage: Box::new(UnwrapOk::<T> {
                fault: None,
                _pd: PhantomData,
            }),
            output: RowShape::single(SlotShape::of::<T>(Category::Owned)),
        })
    })
}
