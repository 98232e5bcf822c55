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

//! # Downflow Source Module
//!
//! Pipeline heads. A [`Source`] wraps a single iterable slot — a
//! container or generator — in one of the ownership flavors:
//!
//! - [`Source::owned`] — the pipeline consumes the collection; elements
//!   stream owned
//! - [`Source::borrowed`] — shared borrow; elements stream as immutable
//!   borrows, and the finalized result copies out
//! - [`Source::by_ref`] — shared borrow with the escape flag: the
//!   finalized result returns the live borrow instead of copying
//! - [`Source::by_mut`] — exclusive borrow with the escape flag; required
//!   for in-place stages such as `sort`
//! - [`Source::generator`] — a push generator, consume-only
//!
//! [`IntoSource`] lets `apply` accept containers directly: by value, `&`,
//! or `&mut`, plus fixed-size array literals.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;

use crate::generator::Gen;
use crate::stage::StageSpec;
use crate::stream::Streamable;
use crate::value::{FlowValue, Slot, SlotMeta, SlotShape};

/// Bound satisfied by every type usable as a pipeline source.
pub trait SourceValue: FlowValue + Streamable {}

impl<T: FlowValue + Streamable> SourceValue for T {}

/// The head of a pipeline: one iterable slot.
pub struct Source<'s> {
    slot: Slot<'s>,
}

impl<'s> Source<'s> {
    /// Consumes the collection. Elements stream owned; hash containers
    /// extract destructively.
    pub fn owned<C: SourceValue>(value: C) -> Source<'static> {
        Source {
            slot: Slot::owned_iterable(value),
        }
    }

    /// Shared borrow. Elements stream as immutable borrows.
    pub fn borrowed<C: SourceValue>(value: &'s C) -> Source<'s> {
        Source {
            slot: Slot::borrowed_with_meta(value, SlotMeta::of_iterable::<C>(), false),
        }
    }

    /// Shared borrow that escapes finalization: the result row returns
    /// the live borrow instead of copying.
    pub fn by_ref<C: SourceValue>(value: &'s C) -> Source<'s> {
        Source {
            slot: Slot::borrowed_with_meta(value, SlotMeta::of_iterable::<C>(), true),
        }
    }

    /// Exclusive borrow, escaping finalization. Elements stream as
    /// mutable borrows and in-place stages may reorder the collection.
    pub fn by_mut<C: SourceValue>(value: &'s mut C) -> Source<'s> {
        Source {
            slot: Slot::mut_with_meta(value, SlotMeta::of_iterable::<C>(), true),
        }
    }

    /// A push generator; consume-only.
    pub fn generator<T: FlowValue>(gen: Gen<T>) -> Source<'static> {
        Source {
            slot: Slot::owned_iterable(gen),
        }
    }

    pub fn shape(&self) -> SlotShape {
        self.slot.shape()
    }

    pub(crate) fn into_slot(self) -> Slot<'s> {
        self.slot
    }
}

/// Conversion into a pipeline head, possibly with a stage prefix (see
/// [`crate::compose::Pipeline`]).
pub trait IntoSource<'s> {
    fn into_source(self) -> (Source<'s>, Vec<StageSpec>);
}

impl<'s> IntoSource<'s> for Source<'s> {
    fn into_source(self) -> (Source<'s>, Vec<StageSpec>) {
        (self, Vec::new())
    }
}

impl<'s, T: FlowValue> IntoSource<'s> for Gen<T> {
    fn into_source(self) -> (Source<'s>, Vec<StageSpec>) {
        (Source::generator(self), Vec::new())
    }
}

macro_rules! impl_container_source {
    ($ty:ty, [$($gen:tt)*]) => {
        impl<'s, $($gen)*> IntoSource<'s> for $ty {
            fn into_source(self) -> (Source<'s>, Vec<StageSpec>) {
                (Source::owned(self), Vec::new())
            }
        }

        impl<'s, $($gen)*> IntoSource<'s> for &'s $ty {
            fn into_source(self) -> (Source<'s>, Vec<StageSpec>) {
                (Source::borrowed(self), Vec::new())
            }
        }

        impl<'s, $($gen)*> IntoSource<'s> for &'s mut $ty {
            fn into_source(self) -> (Source<'s>, Vec<StageSpec>) {
                (Source::by_mut(self), Vec::new())
            }
        }
    };
}

impl_container_source!(Vec<T>, [T: FlowValue]);
impl_container_source!(HashSet<T>, [T: FlowValue + Eq + Hash]);
impl_container_source!(BTreeSet<T>, [T: FlowValue + Ord]);
impl_container_source!(HashMap<K, V>, [K: FlowValue + Eq + Hash, V: FlowValue]);
impl_container_source!(BTreeMap<K, V>, [K: FlowValue + Ord, V: FlowValue]);

impl<'s, T: FlowValue, const N: usize> IntoSource<'s> for [T; N] {
    fn into_source(self) -> (Source<'s>, Vec<StageSpec>) {
        (Source::owned(self), Vec::new())
    }
}
