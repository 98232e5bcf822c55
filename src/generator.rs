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

//! # Downflow Generator Module
//!
//! Push generators: unbounded (or bounded) element producers usable as
//! pipeline sources.
//!
//! A generator step receives an emit callback, invokes it zero or more
//! times, and returns whether production may continue. Unbounded
//! generators are legal; pairing one with a bounding stage such as
//! `take_n` is the caller's responsibility.

use crate::errors::{FlowError, Result};
use crate::stream::{StreamSink, Streamable};
use crate::value::{Category, FlowValue, Row, RowShape, Slot, SlotShape};

trait GenStep<T> {
    fn step(&mut self, emit: &mut dyn FnMut(T)) -> bool;
    fn clone_box(&self) -> Box<dyn GenStep<T>>;
}

impl<T, F> GenStep<T> for F
where
    T: 'static,
    F: FnMut(&mut dyn FnMut(T)) -> bool + Clone + 'static,
{
    fn step(&mut self, emit: &mut dyn FnMut(T)) -> bool {
        self(emit)
    }

    fn clone_box(&self) -> Box<dyn GenStep<T>> {
        Box::new(self.clone())
    }
}

/// A cloneable push generator producing values of type `T`.
pub struct Gen<T> {
    f: Box<dyn GenStep<T>>,
}

impl<T: 'static> Gen<T> {
    pub fn new<F>(f: F) -> Gen<T>
    where
        F: FnMut(&mut dyn FnMut(T)) -> bool + Clone + 'static,
    {
        Gen { f: Box::new(f) }
    }

    /// Runs one production step. Returns whether the generator may
    /// continue producing.
    pub fn step(&mut self, emit: &mut dyn FnMut(T)) -> bool {
        self.f.step(emit)
    }
}

impl<T: 'static> Clone for Gen<T> {
    fn clone(&self) -> Self {
        Gen {
            f: self.f.clone_box(),
        }
    }
}

/// Wraps a step closure as a generator source.
pub fn generate<T, F>(f: F) -> Gen<T>
where
    T: FlowValue,
    F: FnMut(&mut dyn FnMut(T)) -> bool + Clone + 'static,
{
    Gen::new(f)
}

/// Unbounded ascending integer generator starting at `start`.
pub fn generator_from(start: i64) -> Gen<i64> {
    let mut next = start;
    Gen::new(move |emit| {
        emit(next);
        next += 1;
        true
    })
}

/// Half-open integer range generator over `start..end`.
pub fn generator_range(start: i64, end: i64) -> Gen<i64> {
    let mut next = start;
    Gen::new(move |emit| {
        if next >= end {
            return false;
        }
        emit(next);
        next += 1;
        true
    })
}

impl<T: FlowValue> Streamable for Gen<T> {
    const IS_GENERATOR: bool = true;

    fn element_shape(_: Category) -> RowShape {
        RowShape::single(SlotShape::of::<T>(Category::Owned))
    }

    fn stream_owned(mut self, sink: &mut StreamSink<'_>) -> Result<()> {
        let mut keep = true;
        let mut failed: Result<()> = Ok(());
        loop {
            if !keep || failed.is_err() {
                break;
            }
            let produced = self.f.step(&mut |x| {
                if !keep || failed.is_err() {
                    return;
                }
                match sink(Row::single(Slot::owned(x))) {
                    Ok(c) => keep = c,
                    Err(e) => failed = Err(e),
                }
            });
            if !produced {
                break;
            }
        }
        failed
    }

    fn stream_ref(&self, _: &mut StreamSink<'_>) -> Result<()> {
        Err(FlowError::config(
            "generator",
            "generator sources must be consumed by value",
        ))
    }

    fn stream_mut(&mut self, _: &mut StreamSink<'_>) -> Result<()> {
        Err(FlowError::config(
            "generator",
            "generator sources must be consumed by value",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A bounded range generator streams exactly its range.
    #[test]
    fn test_range_generator() {
        let g = generator_range(2, 6);
        let mut out = Vec::new();
        g.stream_owned(&mut |row: Row<'_>| {
            out.push(row.take1::<i64>()?);
            Ok(true)
        })
        .unwrap();
        assert_eq!(out, vec![2, 3, 4, 5]);
    }

    /// An unbounded generator stops as soon as the sink declines.
    #[test]
    fn test_unbounded_stops_on_sink() {
        let g = generator_from(0);
        let mut out = Vec::new();
        g.stream_owned(&mut |row: Row<'_>| {
            out.push(row.take1::<i64>()?);
            Ok(out.len() < 3)
        })
        .unwrap();
        assert_eq!(out, vec![0, 1, 2]);
    }

    /// Clones advance independently.
    #[test]
    fn test_clone_is_independent() {
        let mut a = generator_from(10);
        let mut b = a.clone();
        let mut got = Vec::new();
        a.step(&mut |x| got.push(x));
        a.step(&mut |x| got.push(x));
        b.step(&mut |x| got.push(x));
        assert_eq!(got, vec![10, 11, 10]);
    }
}
