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

use downflow::stages::{collect, for_each, map_ref, sort, sum};
use downflow::{apply, Category, Source, StageSpec};

/// A shared-borrow run copies the result out; the source stays live and
/// untouched.
#[test]
fn test_borrowed_result_is_owned_copy() {
    let data = vec![1i64, 2, 3];
    let out = apply(&data, [map_ref(|x: &i64| x + 1), collect::<Vec<i64>>()]).unwrap();
    assert_eq!(out.row().slots()[0].category(), Category::Owned);
    let result: Vec<i64> = out.value().unwrap();
    assert_eq!(result, vec![2, 3, 4]);
    assert_eq!(data, vec![1, 2, 3]);
}

/// `Source::by_ref` opts out of the copy: the result row holds the live
/// borrow.
#[test]
fn test_by_ref_escapes_finalization() {
    let data = vec![1i64, 2, 3];
    let out = apply(Source::by_ref(&data), Vec::<StageSpec>::new()).unwrap();
    assert_eq!(out.row().slots()[0].category(), Category::Borrow);
    assert_eq!(out.get::<Vec<i64>>(0).unwrap(), &data);
}

/// An exclusive-borrow run returns the live mutable borrow, and the
/// caller sees in-place effects after it drops.
#[test]
fn test_by_mut_mutation_visible_to_caller() {
    let mut data = vec![9i64, 4, 7];
    {
        let out = apply(&mut data, [sort::<i64>()]).unwrap();
        assert_eq!(out.row().slots()[0].category(), Category::MutBorrow);
    }
    assert_eq!(data, vec![4, 7, 9]);
}

#[test]
fn test_unit_output() {
    let out = apply(vec![1i64], [for_each(|_: i64| {})]).unwrap();
    assert!(out.is_unit());
    assert_eq!(out.arity(), 1);
}

#[test]
fn test_typed_accessors() {
    let out = apply(vec![2i64, 3], [sum::<i64>()]).unwrap();
    assert_eq!(out.arity(), 1);
    assert_eq!(out.get::<i64>(0).unwrap(), &5);
    assert_eq!(out.value::<i64>().unwrap(), 5);
}

#[test]
fn test_accessor_type_mismatch() {
    let out = apply(vec![2i64], [sum::<i64>()]).unwrap();
    assert!(out.value::<String>().is_err());
}
