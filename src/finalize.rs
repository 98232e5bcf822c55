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

//! # Downflow Finalize Module
//!
//! Result finalization: the conversion applied to a completed row before
//! it is handed back to the caller.
//!
//! Borrowed slots are cloned to owned storage so the result outlives the
//! pipeline's borrows — except slots flagged with the opt-in escape
//! wrapper, which are returned as live borrows with contents unconverted.
//! Finalization is idempotent: an already-finalized row passes through
//! unchanged.

use std::fmt;

use crate::errors::Result;
use crate::value::{Category, FlowValue, Row};

/// Converts a completed row for return to the caller.
pub(crate) fn finalize(row: Row<'_>) -> Row<'_> {
    let slots = row
        .into_slots()
        .into_iter()
        .map(|slot| {
            if slot.escape() || slot.category() == Category::Owned {
                slot
            } else {
                slot.into_owned()
            }
        })
        .collect();
    Row::from_slots(slots)
}

/// The finalized result of a pipeline run, with typed accessors.
pub struct Output<'s> {
    row: Row<'s>,
}

impl<'s> Output<'s> {
    pub(crate) fn new(row: Row<'s>) -> Output<'s> {
        Output { row }
    }

    pub fn arity(&self) -> usize {
        self.row.arity()
    }

    pub fn row(&self) -> &Row<'s> {
        &self.row
    }

    pub fn into_row(self) -> Row<'s> {
        self.row
    }

    /// Shared read of slot `index`.
    pub fn get<T: 'static>(&self, index: usize) -> Result<&T> {
        self.row.get::<T>(index)
    }

    /// Consumes an arity-1 result. Escaped borrows are cloned.
    pub fn value<T: FlowValue>(self) -> Result<T> {
        self.row.take1::<T>()
    }

    /// Consumes an arity-2 result.
    pub fn pair<A: FlowValue, B: FlowValue>(self) -> Result<(A, B)> {
        self.row.take2::<A, B>()
    }

    /// Consumes an arity-3 result.
    pub fn triple<A: FlowValue, B: FlowValue, C: FlowValue>(self) -> Result<(A, B, C)> {
        self.row.take3::<A, B, C>()
    }

    /// Whether this is the unit result of a side-effect-only pipeline.
    pub fn is_unit(&self) -> bool {
        self.row.arity() == 1 && self.row.slots()[0].is::<()>()
    }
}

impl fmt::Debug for Output<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Output")?;
        let mut list = f.debug_list();
        for slot in self.row.slots() {
            list.entry(&format_args!(
                "{} {}",
                slot.category(),
                slot.shape().type_name()
            ));
        }
        list.finish()
    }
}
