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

//! # Downflow Value Module
//!
//! The runtime value model: every datum moving through a pipeline is a
//! [`Row`] of [`Slot`]s, and every slot carries an ownership [`Category`]
//! plus type metadata ([`SlotMeta`]).
//!
//! ## Ownership Categories
//!
//! A slot is `Owned`, `MutBorrow`, or `Borrow`. Transitions are
//! downgrade-only — an owned value may be viewed mutably or immutably, a
//! mutable borrow may be viewed immutably, and an immutable borrow stays
//! immutable. There is no upgrade path.
//!
//! ## Access Entry Points
//!
//! - [`Slot::get`] — shared read, available for every category
//! - [`Slot::get_mut`] — exclusive read-write, rejected for `Borrow` slots
//! - [`Slot::take`] — consuming take; moves an owned payload, clones a
//!   borrowed one
//!
//! ## Metadata
//!
//! [`SlotMeta`] records the payload's `TypeId`, its printable type name, a
//! clone hook, an optional iteration vtable (containers and generators),
//! and an optional lift vtable used by the short-circuit stages to wrap a
//! finished result in `Option` / `Fallible` without knowing its type.

use std::any::{type_name, Any, TypeId};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{Fallible, Fault, FlowError, Result};
use crate::stream::StreamVtable;

/// Bound satisfied by every value type that can flow through a pipeline.
///
/// `Clone` stands in for copyability: borrowed slots are cloned when a
/// stage consumes them or when finalization converts them to owned.
pub trait FlowValue: Clone + 'static {}

impl<T: Clone + 'static> FlowValue for T {}

/// Ownership category of a slot. Transitions are downgrade-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    /// The pipeline owns the value outright.
    Owned,
    /// Exclusive borrow of caller-owned state.
    MutBorrow,
    /// Shared borrow of caller-owned state.
    Borrow,
}

impl Category {
    /// Whether a value of this category may be viewed as `target`.
    pub fn can_downgrade_to(self, target: Category) -> bool {
        match (self, target) {
            (Category::Owned, _) => true,
            (Category::MutBorrow, Category::Owned) => false,
            (Category::MutBorrow, _) => true,
            (Category::Borrow, Category::Borrow) => true,
            (Category::Borrow, _) => false,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Owned => "owned",
            Category::MutBorrow => "mutable borrow",
            Category::Borrow => "immutable borrow",
        };
        f.write_str(s)
    }
}

/// Marks metadata whose payload type is a short-circuit wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrapper {
    Plain,
    Option,
    Fallible,
}

type CloneFn = fn(&dyn Any) -> Box<dyn Any>;
type WrapFn = fn(Box<dyn Any>) -> Box<dyn Any>;
type EmptyFn = fn() -> Box<dyn Any>;
type FaultFn = fn(Fault) -> Box<dyn Any>;
type MetaFn = fn() -> SlotMeta;

const PAYLOAD_MISMATCH: &str = "slot payload does not match recorded metadata";

/// Erased wrapping hooks for a payload type `T`: lift a finished value into
/// `Option<T>` / `Fallible<T>` without static knowledge of `T`.
pub struct LiftVtable {
    pub some: WrapFn,
    pub none: EmptyFn,
    pub option_meta: MetaFn,
    pub ok: WrapFn,
    pub err: FaultFn,
    pub fallible_meta: MetaFn,
}

fn clone_erased<T: FlowValue>(v: &dyn Any) -> Box<dyn Any> {
    let t = v.downcast_ref::<T>().expect(PAYLOAD_MISMATCH);
    Box::new(t.clone())
}

fn some_erased<T: FlowValue>(b: Box<dyn Any>) -> Box<dyn Any> {
    match b.downcast::<T>() {
        Ok(t) => Box::new(Some(*t)),
        Err(_) => panic!("{}", PAYLOAD_MISMATCH),
    }
}

fn none_erased<T: FlowValue>() -> Box<dyn Any> {
    Box::new(None::<T>)
}

fn ok_erased<T: FlowValue>(b: Box<dyn Any>) -> Box<dyn Any> {
    match b.downcast::<T>() {
        Ok(t) => Box::new(Fallible::<T>::Ok(*t)),
        Err(_) => panic!("{}", PAYLOAD_MISMATCH),
    }
}

fn err_erased<T: FlowValue>(fault: Fault) -> Box<dyn Any> {
    Box::new(Fallible::<T>::Err(fault))
}

fn option_meta_of<T: FlowValue>() -> SlotMeta {
    SlotMeta {
        type_id: TypeId::of::<Option<T>>(),
        type_name: type_name::<Option<T>>(),
        clone_fn: clone_erased::<Option<T>>,
        wrapper: Wrapper::Option,
        make_none: Some(none_erased::<T>),
        make_err: None,
        lift: None,
        stream: None,
    }
}

fn fallible_meta_of<T: FlowValue>() -> SlotMeta {
    SlotMeta {
        type_id: TypeId::of::<Fallible<T>>(),
        type_name: type_name::<Fallible<T>>(),
        clone_fn: clone_erased::<Fallible<T>>,
        wrapper: Wrapper::Fallible,
        make_none: None,
        make_err: Some(err_erased::<T>),
        lift: None,
        stream: None,
    }
}

struct LiftVt<T>(std::marker::PhantomData<T>);

impl<T: FlowValue> LiftVt<T> {
    const VT: LiftVtable = LiftVtable {
        some: some_erased::<T>,
        none: none_erased::<T>,
        option_meta: option_meta_of::<T>,
        ok: ok_erased::<T>,
        err: err_erased::<T>,
        fallible_meta: fallible_meta_of::<T>,
    };
}

pub(crate) fn lift_vtable<T: FlowValue>() -> &'static LiftVtable {
    &LiftVt::<T>::VT
}

/// Runtime type metadata carried by every slot.
#[derive(Clone, Copy)]
pub struct SlotMeta {
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub clone_fn: CloneFn,
    pub wrapper: Wrapper,
    /// Produces the `None` value of an `Option`-wrapped payload type.
    pub make_none: Option<EmptyFn>,
    /// Produces an `Err(fault)` value of a `Fallible`-wrapped payload type.
    pub make_err: Option<FaultFn>,
    pub lift: Option<&'static LiftVtable>,
    pub stream: Option<&'static StreamVtable>,
}

impl SlotMeta {
    /// Metadata for a plain payload type.
    pub fn of<T: FlowValue>() -> SlotMeta {
        SlotMeta {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            clone_fn: clone_erased::<T>,
            wrapper: Wrapper::Plain,
            make_none: None,
            make_err: None,
            lift: Some(lift_vtable::<T>()),
            stream: None,
        }
    }

    /// Metadata for a payload type that can feed an iteration boundary.
    pub fn of_iterable<T>() -> SlotMeta
    where
        T: FlowValue + crate::stream::Streamable,
    {
        let mut meta = SlotMeta::of::<T>();
        meta.stream = Some(crate::stream::stream_vtable::<T>());
        meta
    }

    /// Metadata for `Option<T>`, marked as already wrapped.
    pub fn option_of<T: FlowValue>() -> SlotMeta {
        option_meta_of::<T>()
    }

    /// Metadata for `Fallible<T>`, marked as already wrapped.
    pub fn fallible_of<T: FlowValue>() -> SlotMeta {
        fallible_meta_of::<T>()
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

impl fmt::Debug for SlotMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotMeta")
            .field("type_name", &self.type_name)
            .field("wrapper", &self.wrapper)
            .field("iterable", &self.stream.is_some())
            .finish()
    }
}

enum SlotValue<'a> {
    Owned(Box<dyn Any>),
    MutBorrow(&'a mut dyn Any),
    Borrow(&'a dyn Any),
}

/// One value slot: a payload, its ownership category, and its metadata.
///
/// The `escape` flag marks a borrow that finalization must return live
/// instead of copying (the opt-in reference wrapper).
pub struct Slot<'a> {
    value: SlotValue<'a>,
    meta: SlotMeta,
    escape: bool,
}

impl<'a> Slot<'a> {
    pub fn owned<T: FlowValue>(value: T) -> Slot<'static> {
        Slot {
            value: SlotValue::Owned(Box::new(value)),
            meta: SlotMeta::of::<T>(),
            escape: false,
        }
    }

    /// Owned slot whose payload can feed an iteration boundary downstream.
    pub fn owned_iterable<T>(value: T) -> Slot<'static>
    where
        T: FlowValue + crate::stream::Streamable,
    {
        Slot {
            value: SlotValue::Owned(Box::new(value)),
            meta: SlotMeta::of_iterable::<T>(),
            escape: false,
        }
    }

    pub fn borrowed<T: FlowValue>(value: &'a T) -> Slot<'a> {
        Slot {
            value: SlotValue::Borrow(value),
            meta: SlotMeta::of::<T>(),
            escape: false,
        }
    }

    pub fn borrowed_mut<T: FlowValue>(value: &'a mut T) -> Slot<'a> {
        Slot {
            value: SlotValue::MutBorrow(value),
            meta: SlotMeta::of::<T>(),
            escape: false,
        }
    }

    pub(crate) fn owned_boxed(payload: Box<dyn Any>, meta: SlotMeta) -> Slot<'static> {
        Slot {
            value: SlotValue::Owned(payload),
            meta,
            escape: false,
        }
    }

    pub(crate) fn borrowed_with_meta(payload: &'a dyn Any, meta: SlotMeta, escape: bool) -> Slot<'a> {
        Slot {
            value: SlotValue::Borrow(payload),
            meta,
            escape,
        }
    }

    pub(crate) fn mut_with_meta(payload: &'a mut dyn Any, meta: SlotMeta, escape: bool) -> Slot<'a> {
        Slot {
            value: SlotValue::MutBorrow(payload),
            meta,
            escape,
        }
    }

    pub fn category(&self) -> Category {
        match self.value {
            SlotValue::Owned(_) => Category::Owned,
            SlotValue::MutBorrow(_) => Category::MutBorrow,
            SlotValue::Borrow(_) => Category::Borrow,
        }
    }

    pub fn meta(&self) -> &SlotMeta {
        &self.meta
    }

    pub fn escape(&self) -> bool {
        self.escape
    }

    pub(crate) fn set_escape(&mut self, escape: bool) {
        self.escape = escape;
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.meta.is::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        match &self.value {
            SlotValue::Owned(b) => b.as_ref(),
            SlotValue::MutBorrow(m) => &**m,
            SlotValue::Borrow(r) => *r,
        }
    }

    fn mismatch<T: 'static>(&self) -> FlowError {
        FlowError::type_mismatch("slot access", type_name::<T>(), self.meta.type_name)
    }

    /// Shared read, available for every category.
    pub fn get<T: 'static>(&self) -> Result<&T> {
        self.as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| self.mismatch::<T>())
    }

    /// Exclusive read-write access. Rejected for immutably borrowed slots;
    /// there is no upgrade path.
    pub fn get_mut<T: 'static>(&mut self) -> Result<&mut T> {
        let mismatch = self.mismatch::<T>();
        match &mut self.value {
            SlotValue::Owned(b) => b.downcast_mut::<T>().ok_or(mismatch),
            SlotValue::MutBorrow(m) => m.downcast_mut::<T>().ok_or(mismatch),
            SlotValue::Borrow(_) => Err(FlowError::internal(format!(
                "cannot mutably access an immutably borrowed slot of {}",
                self.meta.type_name
            ))),
        }
    }

    /// Consuming take: moves an owned payload, clones a borrowed one.
    pub fn take<T: FlowValue>(self) -> Result<T> {
        let Slot { value, meta, .. } = self;
        let mismatch = || FlowError::type_mismatch("slot access", type_name::<T>(), meta.type_name);
        match value {
            SlotValue::Owned(b) => b.downcast::<T>().map(|t| *t).map_err(|_| mismatch()),
            SlotValue::MutBorrow(m) => (*m).downcast_ref::<T>().cloned().ok_or_else(mismatch),
            SlotValue::Borrow(r) => r.downcast_ref::<T>().cloned().ok_or_else(mismatch),
        }
    }

    /// Consuming take in erased form; clones borrowed payloads.
    pub(crate) fn take_boxed(self) -> Box<dyn Any> {
        match self.value {
            SlotValue::Owned(b) => b,
            SlotValue::MutBorrow(m) => (self.meta.clone_fn)(&*m),
            SlotValue::Borrow(r) => (self.meta.clone_fn)(r),
        }
    }

    /// Immutable view of this slot, with the category forced to `Borrow`.
    pub fn as_borrowed(&self) -> Slot<'_> {
        Slot {
            value: SlotValue::Borrow(self.as_any()),
            meta: self.meta,
            escape: false,
        }
    }

    /// Downgrading reborrow used at fan-out boundaries: owned payloads are
    /// viewed immutably, lvalue borrows keep their category.
    pub(crate) fn reborrow(&mut self) -> Slot<'_> {
        let meta = self.meta;
        let escape = self.escape;
        match &mut self.value {
            SlotValue::Owned(b) => Slot {
                value: SlotValue::Borrow(&**b),
                meta,
                escape,
            },
            SlotValue::MutBorrow(m) => Slot {
                value: SlotValue::MutBorrow(&mut **m),
                meta,
                escape,
            },
            SlotValue::Borrow(r) => Slot {
                value: SlotValue::Borrow(*r),
                meta,
                escape,
            },
        }
    }

    /// Converts to an owned slot, cloning borrowed payloads. Clears the
    /// escape flag: the result is pipeline-owned storage.
    pub(crate) fn into_owned(self) -> Slot<'static> {
        let meta = self.meta;
        let payload = self.take_boxed();
        Slot {
            value: SlotValue::Owned(payload),
            meta,
            escape: false,
        }
    }

    pub fn shape(&self) -> SlotShape {
        SlotShape {
            meta: self.meta,
            category: self.category(),
            escape: self.escape,
        }
    }

    /// Splits the slot for category dispatch at iteration boundaries.
    pub(crate) fn into_raw(self) -> (RawSlot<'a>, SlotMeta, bool) {
        let raw = match self.value {
            SlotValue::Owned(b) => RawSlot::Owned(b),
            SlotValue::MutBorrow(m) => RawSlot::MutBorrow(m),
            SlotValue::Borrow(r) => RawSlot::Borrow(r),
        };
        (raw, self.meta, self.escape)
    }
}

/// Crate-visible payload forms, used by the engine to dispatch streaming
/// by category.
pub(crate) enum RawSlot<'a> {
    Owned(Box<dyn Any>),
    MutBorrow(&'a mut dyn Any),
    Borrow(&'a dyn Any),
}

/// An ordered tuple of slots; the unit of data flow.
pub struct Row<'a> {
    slots: Vec<Slot<'a>>,
}

impl<'a> Row<'a> {
    pub fn new() -> Row<'a> {
        Row { slots: Vec::new() }
    }

    pub fn from_slots(slots: Vec<Slot<'a>>) -> Row<'a> {
        Row { slots }
    }

    pub fn single(slot: Slot<'a>) -> Row<'a> {
        Row { slots: vec![slot] }
    }

    pub fn pair(a: Slot<'a>, b: Slot<'a>) -> Row<'a> {
        Row { slots: vec![a, b] }
    }

    pub fn arity(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[Slot<'a>] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [Slot<'a>] {
        &mut self.slots
    }

    pub fn push(&mut self, slot: Slot<'a>) {
        self.slots.push(slot);
    }

    pub fn insert_front(&mut self, slot: Slot<'a>) {
        self.slots.insert(0, slot);
    }

    pub fn into_slots(self) -> Vec<Slot<'a>> {
        self.slots
    }

    pub fn slot(&self, index: usize) -> Result<&Slot<'a>> {
        self.slots
            .get(index)
            .ok_or_else(|| FlowError::internal(format!("slot index {} out of range", index)))
    }

    pub fn slot_mut(&mut self, index: usize) -> Result<&mut Slot<'a>> {
        self.slots
            .get_mut(index)
            .ok_or_else(|| FlowError::internal(format!("slot index {} out of range", index)))
    }

    pub fn into_single(self) -> Result<Slot<'a>> {
        let mut slots = self.slots;
        if slots.len() != 1 {
            return Err(FlowError::internal(format!(
                "expected a single-slot row, found arity {}",
                slots.len()
            )));
        }
        Ok(slots.remove(0))
    }

    /// Immutable whole-row view: every slot forced to `Borrow`.
    pub fn as_borrowed(&self) -> Row<'_> {
        Row {
            slots: self.slots.iter().map(Slot::as_borrowed).collect(),
        }
    }

    /// Selects slots by index, in index order. Indices must be distinct and
    /// in range (validated by the build pass); slots not named are dropped.
    pub fn select(self, indices: &[usize]) -> Result<Row<'a>> {
        let mut pool: Vec<Option<Slot<'a>>> = self.slots.into_iter().map(Some).collect();
        let mut out = Vec::with_capacity(indices.len());
        for &i in indices {
            let slot = pool
                .get_mut(i)
                .and_then(Option::take)
                .ok_or_else(|| FlowError::internal(format!("invalid slot selection index {}", i)))?;
            out.push(slot);
        }
        Ok(Row { slots: out })
    }

    pub fn shape(&self) -> RowShape {
        RowShape {
            slots: self.slots.iter().map(Slot::shape).collect(),
        }
    }

    fn expect_arity(&self, n: usize) -> Result<()> {
        if self.slots.len() != n {
            return Err(FlowError::internal(format!(
                "expected arity {} row, found {}",
                n,
                self.slots.len()
            )));
        }
        Ok(())
    }

    pub fn get<T: 'static>(&self, index: usize) -> Result<&T> {
        self.slot(index)?.get::<T>()
    }

    pub fn ref1<A: 'static>(&self) -> Result<&A> {
        self.expect_arity(1)?;
        self.slots[0].get::<A>()
    }

    pub fn ref2<A: 'static, B: 'static>(&self) -> Result<(&A, &B)> {
        self.expect_arity(2)?;
        Ok((self.slots[0].get::<A>()?, self.slots[1].get::<B>()?))
    }

    pub fn ref3<A: 'static, B: 'static, C: 'static>(&self) -> Result<(&A, &B, &C)> {
        self.expect_arity(3)?;
        Ok((
            self.slots[0].get::<A>()?,
            self.slots[1].get::<B>()?,
            self.slots[2].get::<C>()?,
        ))
    }

    pub fn take1<A: FlowValue>(self) -> Result<A> {
        self.expect_arity(1)?;
        let mut slots = self.slots;
        slots.remove(0).take::<A>()
    }

    pub fn take2<A: FlowValue, B: FlowValue>(self) -> Result<(A, B)> {
        self.expect_arity(2)?;
        let mut it = self.slots.into_iter();
        let a = it.next().map(|s| s.take::<A>()).transpose()?;
        let b = it.next().map(|s| s.take::<B>()).transpose()?;
        match (a, b) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(FlowError::internal("row arity changed during take")),
        }
    }

    pub fn take3<A: FlowValue, B: FlowValue, C: FlowValue>(self) -> Result<(A, B, C)> {
        self.expect_arity(3)?;
        let mut it = self.slots.into_iter();
        let a = it.next().map(|s| s.take::<A>()).transpose()?;
        let b = it.next().map(|s| s.take::<B>()).transpose()?;
        let c = it.next().map(|s| s.take::<C>()).transpose()?;
        match (a, b, c) {
            (Some(a), Some(b), Some(c)) => Ok((a, b, c)),
            _ => Err(FlowError::internal("row arity changed during take")),
        }
    }

    /// Materializes every slot as owned storage, cloning borrows.
    pub fn into_owned(self) -> Row<'static> {
        Row {
            slots: self.slots.into_iter().map(Slot::into_owned).collect(),
        }
    }
}

impl<'a> Default for Row<'a> {
    fn default() -> Self {
        Row::new()
    }
}

/// Build-pass descriptor of one slot.
#[derive(Debug, Clone)]
pub struct SlotShape {
    pub meta: SlotMeta,
    pub category: Category,
    pub escape: bool,
}

impl SlotShape {
    pub fn of<T: FlowValue>(category: Category) -> SlotShape {
        SlotShape {
            meta: SlotMeta::of::<T>(),
            category,
            escape: false,
        }
    }

    pub fn of_iterable<T>(category: Category) -> SlotShape
    where
        T: FlowValue + crate::stream::Streamable,
    {
        SlotShape {
            meta: SlotMeta::of_iterable::<T>(),
            category,
            escape: false,
        }
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.meta.is::<T>()
    }

    pub fn type_name(&self) -> &'static str {
        self.meta.type_name
    }
}

/// Build-pass descriptor of a full row: per-slot type, category, flags.
#[derive(Debug, Clone)]
pub struct RowShape {
    pub slots: Vec<SlotShape>,
}

impl RowShape {
    pub fn new(slots: Vec<SlotShape>) -> RowShape {
        RowShape { slots }
    }

    pub fn single(slot: SlotShape) -> RowShape {
        RowShape { slots: vec![slot] }
    }

    pub fn pair(a: SlotShape, b: SlotShape) -> RowShape {
        RowShape { slots: vec![a, b] }
    }

    pub fn arity(&self) -> usize {
        self.slots.len()
    }

    /// Renders `(i64, alloc::string::String)`-style type listings for
    /// diagnostics.
    pub fn type_names(&self) -> String {
        let names: Vec<&str> = self.slots.iter().map(|s| s.meta.type_name).collect();
        if names.len() == 1 {
            names[0].to_string()
        } else {
            format!("({})", names.join(", "))
        }
    }

    pub fn expect_arity(&self, stage: &str, n: usize) -> Result<()> {
        if self.slots.len() != n {
            return Err(FlowError::config(
                stage,
                format!("expects a row of {} slots, found {}", n, self.slots.len()),
            ));
        }
        Ok(())
    }

    pub fn expect_type<T: FlowValue>(&self, stage: &str, index: usize) -> Result<&SlotShape> {
        let slot = self.slots.get(index).ok_or_else(|| {
            FlowError::config(stage, format!("references slot {} of an arity-{} row", index, self.arity()))
        })?;
        if !slot.is::<T>() {
            return Err(FlowError::type_mismatch(
                stage,
                type_name::<T>(),
                slot.meta.type_name,
            ));
        }
        Ok(slot)
    }

    pub fn expect_single<T: FlowValue>(&self, stage: &str) -> Result<&SlotShape> {
        self.expect_arity(stage, 1)?;
        self.expect_type::<T>(stage, 0)
    }
}

/// Conversion from the current tuple slots into a concrete value, used by
/// the `construct` stage. `check` lets the build pass prove the conversion
/// before any element flows.
pub trait FromRow: FlowValue {
    fn check(shape: &RowShape, stage: &str) -> Result<()>;
    fn from_row(row: Row<'_>) -> Result<Self>;
}

impl<A: FlowValue, B: FlowValue> FromRow for (A, B) {
    fn check(shape: &RowShape, stage: &str) -> Result<()> {
        shape.expect_arity(stage, 2)?;
        shape.expect_type::<A>(stage, 0)?;
        shape.expect_type::<B>(stage, 1)?;
        Ok(())
    }

    fn from_row(row: Row<'_>) -> Result<Self> {
        row.take2::<A, B>()
    }
}

impl<A: FlowValue, B: FlowValue, C: FlowValue> FromRow for (A, B, C) {
    fn check(shape: &RowShape, stage: &str) -> Result<()> {
        shape.expect_arity(stage, 3)?;
        shape.expect_type::<A>(stage, 0)?;
        shape.expect_type::<B>(stage, 1)?;
        shape.expect_type::<C>(stage, 2)?;
        Ok(())
    }

    fn from_row(row: Row<'_>) -> Result<Self> {
        row.take3::<A, B, C>()
    }
}
