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

//! # Downflow Stages Module
//!
//! The leaf stage catalogue. Every factory returns a [`crate::StageSpec`]
//! that validates its input shape at build time and produces a runnable
//! instance.

pub mod collect;
pub mod filter;
pub mod flatten;
pub mod fold;
pub mod shape;
pub mod sort;
pub mod transform;
pub mod unwrap;

pub use collect::{collect, for_each, for_each2, for_each3, CollectTarget};
pub use filter::{filter, filter2, filter3, take_n};
pub use flatten::{flatten_last, flatten_last_cloning};
pub use fold::{count, fold, max, max_by, min, min_by, min_max, sum};
pub use shape::{enumerate, expand2, expand3, reorder};
pub use sort::{sort, sort_by};
pub use transform::{
    append, append2, append3, construct, map, map2, map3, map_ref, map_whole,
    map_whole_iterable, pack2, pack3,
};
pub use unwrap::{unwrap_ok, unwrap_some};
