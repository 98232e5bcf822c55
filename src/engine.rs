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

//! # Downflow Engine Module
//!
//! Single-threaded pipeline execution over a built chain.
//!
//! [`NextStages`] is a cursor over the remaining stages, implemented as a
//! mutable tail slice. Three signals move through it:
//!
//! - `accept`: one element row pushed to the next incremental stage
//! - `complete`: a whole value delivered downstream; at the terminal it is
//!   finalized, a Complete-input head consumes it wholesale, and an
//!   Incremental head triggers auto-iteration followed by the finish
//!   protocol
//! - `finish`: the upstream is exhausted; aggregators emit here
//!
//! Doneness delegates downstream: the first stage with an opinion decides,
//! no opinion anywhere means not done. The probe runs before the first
//! element of every iteration boundary and after each delivered element.

use crate::chain::Chain;
use crate::errors::{FlowError, Result};
use crate::finalize::finalize;
use crate::stage::StageImpl;
use crate::style::Mode;
use crate::value::{RawSlot, Row, Slot};

fn chain_done(stages: &[Box<dyn StageImpl>]) -> bool {
    for stage in stages {
        if let Some(done) = stage.is_done() {
            return done;
        }
    }
    false
}

/// Cursor over the stages downstream of the current one.
pub struct NextStages<'c> {
    stages: &'c mut [Box<dyn StageImpl>],
}

impl<'c> NextStages<'c> {
    pub(crate) fn new(stages: &'c mut [Box<dyn StageImpl>]) -> NextStages<'c> {
        NextStages { stages }
    }

    /// Downstream doneness: first opinion wins, none means not done.
    pub fn is_done(&self) -> bool {
        chain_done(self.stages)
    }

    /// Pushes one element row to the next incremental stage.
    pub fn accept(&mut self, row: Row<'_>) -> Result<()> {
        match self.stages.split_first_mut() {
            None => Err(FlowError::internal(
                "element pushed past the end of the chain",
            )),
            Some((head, tail)) => head.accept(row, &mut NextStages { stages: tail }),
        }
    }

    /// Delivers a completed value downstream and returns the completed
    /// result of the remaining chain.
    pub fn complete<'v>(&mut self, row: Row<'v>) -> Result<Row<'v>> {
        match self.stages.split_first_mut() {
            None => Ok(finalize(row)),
            Some((head, tail)) => {
                if head.style().input == Mode::Complete {
                    head.accept_all(row, &mut NextStages { stages: tail })
                } else {
                    let slot = row.into_single()?;
                    let (raw, meta, _) = slot.into_raw();
                    let vt = meta.stream.ok_or_else(|| {
                        FlowError::internal(format!(
                            "completed value of type {} reached an incremental boundary without an iteration adapter",
                            meta.type_name
                        ))
                    })?;
                    let pre_done = match head.is_done() {
                        Some(done) => done,
                        None => chain_done(tail),
                    };
                    if !pre_done {
                        let mut sink = |elem: Row<'_>| -> Result<bool> {
                            head.accept(elem, &mut NextStages { stages: &mut *tail })?;
                            let done = match head.is_done() {
                                Some(done) => done,
                                None => chain_done(tail),
                            };
                            Ok(!done)
                        };
                        match raw {
                            RawSlot::Owned(payload) => (vt.stream_owned)(payload, &mut sink)?,
                            RawSlot::Borrow(payload) => (vt.stream_ref)(payload, &mut sink)?,
                            RawSlot::MutBorrow(payload) => (vt.stream_mut)(payload, &mut sink)?,
                        }
                    }
                    let result = head.finish(&mut NextStages { stages: tail })?;
                    Ok(result)
                }
            }
        }
    }

    /// Propagates the finish signal from the head of the remaining chain.
    pub fn finish(&mut self) -> Result<Row<'static>> {
        match self.stages.split_first_mut() {
            None => Err(FlowError::internal(
                "finish propagated past the end of the chain",
            )),
            Some((head, tail)) => head.finish(&mut NextStages { stages: tail }),
        }
    }
}

/// Runs a built chain over the source slot to completion.
pub(crate) fn run<'s>(source: Slot<'s>, chain: &mut Chain) -> Result<Row<'s>> {
    let result = NextStages::new(chain.stages_mut()).complete(Row::single(source))?;
    log::debug!("pipeline run complete, result arity {}", result.arity());
    Ok(result)
}
