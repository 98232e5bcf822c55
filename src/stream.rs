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

//! # Downflow Stream Module
//!
//! The iteration adapter: uniform push-iteration over bounded containers
//! and generators, used by the engine wherever a Complete value feeds an
//! Incremental stage.
//!
//! ## Element Categories
//!
//! The ownership category of streamed elements derives from the category
//! of the source slot:
//!
//! - A borrowed source yields immutably borrowed elements
//! - A mutably borrowed source yields mutably borrowed elements (map keys
//!   stay immutable)
//! - An owned source yields owned elements; hash containers extract
//!   destructively, while ordered containers are retained for the pass and
//!   yield immutable borrows, matching their in-place iteration order
//!
//! ## Early Termination
//!
//! The sink returns `Ok(false)` to stop iteration; implementations must
//! honor it between elements. The engine probes downstream doneness before
//! the first element and folds the probe into the sink's return value.

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::Hash;
use std::marker::PhantomData;

use crate::errors::{FlowError, Result};
use crate::value::{Category, FlowValue, Row, RowShape, Slot, SlotShape};

/// Push-iteration callback. Returns whether iteration should continue.
pub type StreamSink<'f> = dyn FnMut(Row<'_>) -> Result<bool> + 'f;

/// Uniform push-iteration over a container or generator.
///
/// Implementations deliver one row per element (two slots for map-like
/// containers: key, then value) and stop as soon as the sink returns
/// `Ok(false)`.
pub trait Streamable: Sized + 'static {
    /// Generators are consume-only and may not feed Complete-input stages.
    const IS_GENERATOR: bool = false;

    /// Shape of the rows this source streams, given the source category.
    fn element_shape(category: Category) -> RowShape;

    fn stream_owned(self, sink: &mut StreamSink<'_>) -> Result<()>;

    fn stream_ref(&self, sink: &mut StreamSink<'_>) -> Result<()>;

    fn stream_mut(&mut self, sink: &mut StreamSink<'_>) -> Result<()>;
}

/// Erased fn-pointer table stored in slot metadata for iterable payloads.
pub struct StreamVtable {
    pub element_shape: fn(Category) -> RowShape,
    pub stream_owned: fn(Box<dyn Any>, &mut StreamSink<'_>) -> Result<()>,
    pub stream_ref: fn(&dyn Any, &mut StreamSink<'_>) -> Result<()>,
    pub stream_mut: fn(&mut dyn Any, &mut StreamSink<'_>) -> Result<()>,
    pub is_generator: bool,
}

const ITER_MISMATCH: &str = "iteration payload does not match recorded metadata";

fn stream_owned_erased<T: Streamable>(b: Box<dyn Any>, sink: &mut StreamSink<'_>) -> Result<()> {
    match b.downcast::<T>() {
        Ok(v) => (*v).stream_owned(sink),
        Err(_) => Err(FlowError::internal(ITER_MISMATCH)),
    }
}

fn stream_ref_erased<T: Streamable>(r: &dyn Any, sink: &mut StreamSink<'_>) -> Result<()> {
    r.downcast_ref::<T>()
        .ok_or_else(|| FlowError::internal(ITER_MISMATCH))?
        .stream_ref(sink)
}

fn stream_mut_erased<T: Streamable>(m: &mut dyn Any, sink: &mut StreamSink<'_>) -> Result<()> {
    m.downcast_mut::<T>()
        .ok_or_else(|| FlowError::internal(ITER_MISMATCH))?
        .stream_mut(sink)
}

struct StreamVt<T>(PhantomData<T>);

impl<T: Streamable> StreamVt<T> {
    const VT: StreamVtable = StreamVtable {
        element_shape: T::element_shape,
        stream_owned: stream_owned_erased::<T>,
        stream_ref: stream_ref_erased::<T>,
        stream_mut: stream_mut_erased::<T>,
        is_generator: T::IS_GENERATOR,
    };
}

pub(crate) fn stream_vtable<T: Streamable>() -> &'static StreamVtable {
    &StreamVt::<T>::VT
}

impl<T: FlowValue> Streamable for Vec<T> {
    fn element_shape(category: Category) -> RowShape {
        RowShape::single(SlotShape::of::<T>(category))
    }

    fn stream_owned(self, sink: &mut StreamSink<'_>) -> Result<()> {
        for x in self {
            if !sink(Row::single(Slot::owned(x)))? {
                return Ok(());
            }
        }
        Ok(())
    }

    fn stream_ref(&self, sink: &mut StreamSink<'_>) -> Result<()> {
        for x in self {
            if !sink(Row::single(Slot::borrowed(x)))? {
                return Ok(());
            }
        }
        Ok(())
    }

    fn stream_mut(&mut self, sink: &mut StreamSink<'_>) -> Result<()> {
        for x in self.iter_mut() {
            if !sink(Row::single(Slot::borrowed_mut(x)))? {
                return Ok(());
            }
        }
        Ok(())
    }
}

impl<T: FlowValue, const N: usize> Streamable for [T; N] {
    fn element_shape(category: Category) -> RowShape {
        RowShape::single(SlotShape::of::<T>(category))
    }

    fn stream_owned(self, sink: &mut StreamSink<'_>) -> Result<()> {
        for x in self {
            if !sink(Row::single(Slot::owned(x)))? {
                return Ok(());
            }
        }
        Ok(())
    }

    fn stream_ref(&self, sink: &mut StreamSink<'_>) -> Result<()> {
        for x in self.iter() {
            if !sink(Row::single(Slot::borrowed(x)))? {
                return Ok(());
            }
        }
        Ok(())
    }

    fn stream_mut(&mut self, sink: &mut StreamSink<'_>) -> Result<()> {
        for x in self.iter_mut() {
            if !sink(Row::single(Slot::borrowed_mut(x)))? {
                return Ok(());
            }
        }
        Ok(())
    }
}

impl<T: FlowValue + Eq + Hash> Streamable for HashSet<T> {
    fn element_shape(category: Category) -> RowShape {
        // Set elements are never mutable in place.
        let cat = match category {
            Category::Owned => Category::Owned,
            _ => Category::Borrow,
        };
        RowShape::single(SlotShape::of::<T>(cat))
    }

    /// Destructive extraction: the set is drained as it streams.
    fn stream_owned(self, sink: &mut StreamSink<'_>) -> Result<()> {
        for x in self {
            if !sink(Row::single(Slot::owned(x)))? {
                return Ok(());
            }
        }
        Ok(())
    }

    fn stream_ref(&self, sink: &mut StreamSink<'_>) -> Result<()> {
        for x in self.iter() {
            if !sink(Row::single(Slot::borrowed(x)))? {
                return Ok(());
            }
        }
        Ok(())
    }

    fn stream_mut(&mut self, sink: &mut StreamSink<'_>) -> Result<()> {
        self.stream_ref(sink)
    }
}

impl<K: FlowValue + Eq + Hash, V: FlowValue> Streamable for HashMap<K, V> {
    fn element_shape(category: Category) -> RowShape {
        match category {
            Category::Owned => RowShape::pair(
                SlotShape::of::<K>(Category::Owned),
                SlotShape::of::<V>(Category::Owned),
            ),
            Category::MutBorrow => RowShape::pair(
                SlotShape::of::<K>(Category::Borrow),
                SlotShape::of::<V>(Category::MutBorrow),
            ),
            Category::Borrow => RowShape::pair(
                SlotShape::of::<K>(Category::Borrow),
                SlotShape::of::<V>(Category::Borrow),
            ),
        }
    }

    /// Destructive extraction: entries move out as they stream.
    fn stream_owned(self, sink: &mut StreamSink<'_>) -> Result<()> {
        for (k, v) in self {
            if !sink(Row::pair(Slot::owned(k), Slot::owned(v)))? {
                return Ok(());
            }
        }
        Ok(())
    }

    fn stream_ref(&self, sink: &mut StreamSink<'_>) -> Result<()> {
        for (k, v) in self.iter() {
            if !sink(Row::pair(Slot::borrowed(k), Slot::borrowed(v)))? {
                return Ok(());
            }
        }
        Ok(())
    }

    fn stream_mut(&mut self, sink: &mut StreamSink<'_>) -> Result<()> {
        for (k, v) in self.iter_mut() {
            if !sink(Row::pair(Slot::borrowed(k), Slot::borrowed_mut(v)))? {
                return Ok(());
            }
        }
        Ok(())
    }
}

impl<K: FlowValue + Ord, V: FlowValue> Streamable for BTreeMap<K, V> {
    fn element_shape(category: Category) -> RowShape {
        match category {
            // Ordered maps have no cheap extract-remove; an owned map is
            // retained for the pass and streams borrows in key order.
            Category::Owned | Category::Borrow => RowShape::pair(
                SlotShape::of::<K>(Category::Borrow),
                SlotShape::of::<V>(Category::Borrow),
            ),
            Category::MutBorrow => RowShape::pair(
                SlotShape::of::<K>(Category::Borrow),
                SlotShape::of::<V>(Category::MutBorrow),
            ),
        }
    }

    fn stream_owned(self, sink: &mut StreamSink<'_>) -> Result<()> {
        for (k, v) in self.iter() {
            if !sink(Row::pair(Slot::borrowed(k), Slot::borrowed(v)))? {
                return Ok(());
            }
        }
        Ok(())
    }

    fn stream_ref(&self, sink: &mut StreamSink<'_>) -> Result<()> {
        for (k, v) in self.iter() {
            if !sink(Row::pair(Slot::borrowed(k), Slot::borrowed(v)))? {
                return Ok(());
            }
        }
        Ok(())
    }

    fn stream_mut(&mut self, sink: &mut StreamSink<'_>) -> Result<()> {
        for (k, v) in self.iter_mut() {
            if !sink(Row::pair(Slot::borrowed(k), Slot::borrowed_mut(v)))? {
                return Ok(());
            }
        }
        Ok(())
    }
}

impl<T: FlowValue + Ord> Streamable for BTreeSet<T> {
    fn element_shape(_: Category) -> RowShape {
        RowShape::single(SlotShape::of::<T>(Category::Borrow))
    }

    fn stream_owned(self, sink: &mut StreamSink<'_>) -> Result<()> {
        self.stream_ref(sink)
    }

    fn stream_ref(&self, sink: &mut StreamSink<'_>) -> Result<()> {
        for x in self.iter() {
            if !sink(Row::single(Slot::borrowed(x)))? {
                return Ok(());
            }
        }
        Ok(())
    }

    fn stream_mut(&mut self, sink: &mut StreamSink<'_>) -> Result<()> {
        self.stream_ref(sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The sink's false return stops iteration between elements.
    #[test]
    fn test_early_stop() {
        let v = vec![1i64, 2, 3, 4];
        let mut seen = Vec::new();
        v.stream_owned(&mut |row: Row<'_>| {
            let x = row.take1::<i64>()?;
            seen.push(x);
            Ok(seen.len() < 2)
        })
        .unwrap();
        assert_eq!(seen, vec![1, 2]);
    }

    /// A mutably borrowed vector streams mutable element borrows.
    #[test]
    fn test_mut_elements() {
        let mut v = vec![1i64, 2, 3];
        v.stream_mut(&mut |mut row: Row<'_>| {
            *row.slot_mut(0)?.get_mut::<i64>()? += 10;
            Ok(true)
        })
        .unwrap();
        assert_eq!(v, vec![11, 12, 13]);
    }

    /// An owned ordered map streams borrows in key order.
    #[test]
    fn test_owned_btreemap_streams_borrows() {
        let mut m = BTreeMap::new();
        m.insert(2i64, "b".to_string());
        m.insert(1i64, "a".to_string());
        let mut keys = Vec::new();
        m.stream_owned(&mut |row: Row<'_>| {
            assert_eq!(row.slots()[0].category(), Category::Borrow);
            keys.push(*row.get::<i64>(0)?);
            Ok(true)
        })
        .unwrap();
        assert_eq!(keys, vec![1, 2]);
    }
}
