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

use downflow::stages::{collect, count, filter, map, map2, map_ref, sum, take_n};
use downflow::{apply, compose, describe, generator_from, generator_range, Pipeline};
use downflow::stages::enumerate;
use proptest::prelude::*;

#[test]
fn test_owned_vector_end_to_end() {
    let result: Vec<i64> = apply(
        vec![1i64, 2, 3, 4, 5, 6],
        [
            filter(|x: &i64| x % 2 == 0),
            map(|x: i64| x * 10),
            collect::<Vec<i64>>(),
        ],
    )
    .unwrap()
    .value()
    .unwrap();
    assert_eq!(result, vec![20, 40, 60]);
}

/// Stages apply in list order; swapping a filter and a map changes what
/// survives.
#[test]
fn test_stage_order_changes_results() {
    let data = vec![1i64, 2, 3, 4, 5];
    let filtered_first: Vec<i64> = apply(
        &data,
        [
            filter(|x: &i64| x % 2 == 0),
            map(|x: i64| x * 2),
            collect::<Vec<i64>>(),
        ],
    )
    .unwrap()
    .value()
    .unwrap();
    let mapped_first: Vec<i64> = apply(
        &data,
        [
            map(|x: i64| x * 2),
            filter(|x: &i64| *x > 5),
            collect::<Vec<i64>>(),
        ],
    )
    .unwrap()
    .value()
    .unwrap();
    assert_eq!(filtered_first, vec![4, 8]);
    assert_eq!(mapped_first, vec![6, 8, 10]);
}

#[test]
fn test_borrowed_source_copies_out() {
    let data = vec![String::from("ab"), String::from("cde")];
    let lengths: Vec<usize> = apply(
        &data,
        [map_ref(|s: &String| s.len()), collect::<Vec<usize>>()],
    )
    .unwrap()
    .value()
    .unwrap();
    assert_eq!(lengths, vec![2, 3]);
    // the source is untouched after a shared-borrow run
    assert_eq!(data.len(), 2);
}

/// An unbounded generator is safe as long as a bounding stage sits
/// downstream: the done protocol stops the scan.
#[test]
fn test_generator_with_bounding_stage() {
    let result: Vec<i64> = apply(
        generator_from(1),
        [
            filter(|x: &i64| x % 3 == 0),
            take_n(5),
            enumerate(0),
            map2(|_i: i64, v: i64| v * 2),
            collect::<Vec<i64>>(),
        ],
    )
    .unwrap()
    .value()
    .unwrap();
    assert_eq!(result, vec![6, 12, 18, 24, 30]);
}

#[test]
fn test_bounded_range_generator() {
    let total: i64 = apply(generator_range(1, 11), [sum::<i64>()])
        .unwrap()
        .value()
        .unwrap();
    assert_eq!(total, 55);
}

/// `take_n(0)` is done before the first element, so even an unbounded
/// generator terminates immediately.
#[test]
fn test_take_zero_never_scans() {
    let result: Vec<i64> = apply(generator_from(0), [take_n(0), collect::<Vec<i64>>()])
        .unwrap()
        .value()
        .unwrap();
    assert!(result.is_empty());
}

#[test]
fn test_empty_source_neutral_results() {
    let empty: Vec<i64> = Vec::new();
    let n: usize = apply(empty.clone(), [count()]).unwrap().value().unwrap();
    assert_eq!(n, 0);
    let total: i64 = apply(empty, [sum::<i64>()]).unwrap().value().unwrap();
    assert_eq!(total, 0);
}

/// A composed descriptor is reusable across pipelines and sources.
#[test]
fn test_composed_stage_reuse() {
    let positive_doubled = compose([
        filter(|x: &i64| *x > 0),
        map(|x: i64| x * 2),
    ]);

    let a: Vec<i64> = apply(
        vec![-1i64, 2, 3],
        [positive_doubled.clone(), collect::<Vec<i64>>()],
    )
    .unwrap()
    .value()
    .unwrap();
    let b: i64 = apply(vec![-5i64, 5], [positive_doubled, sum::<i64>()])
        .unwrap()
        .value()
        .unwrap();
    assert_eq!(a, vec![4, 6]);
    assert_eq!(b, 10);
}

#[test]
fn test_prebound_pipeline_source() {
    let pipeline = Pipeline::new(vec![1i64, 2, 3], [map(|x: i64| x + 1)]);
    let result: Vec<i64> = apply(pipeline, [collect::<Vec<i64>>()])
        .unwrap()
        .value()
        .unwrap();
    assert_eq!(result, vec![2, 3, 4]);
}

#[test]
fn test_describe_reports_stage_names() {
    let description = describe(
        vec![1i64, 2],
        [map(|x: i64| x * 2), collect::<Vec<i64>>()],
    )
    .unwrap();
    let rendered = description.to_string();
    assert!(rendered.contains("map"));
    assert!(rendered.contains("collect"));
    assert!(rendered.contains("i64"));
}

#[test]
fn test_set_and_map_sources() {
    use std::collections::{BTreeMap, BTreeSet};

    let set: BTreeSet<i64> = [3, 1, 2].into_iter().collect();
    let total: i64 = apply(set, [sum::<i64>()]).unwrap().value().unwrap();
    assert_eq!(total, 6);

    let mut map_src = BTreeMap::new();
    map_src.insert(String::from("a"), 1i64);
    map_src.insert(String::from("b"), 2i64);
    let values: Vec<i64> = apply(
        map_src,
        [
            map2(|_k: String, v: i64| v),
            collect::<Vec<i64>>(),
        ],
    )
    .unwrap()
    .value()
    .unwrap();
    assert_eq!(values, vec![1, 2]);
}

proptest! {
    /// Pipeline summation agrees with the iterator fold.
    #[test]
    fn prop_sum_matches_iterator(xs in proptest::collection::vec(-1000i64..1000, 0..50)) {
        let expected: i64 = xs.iter().sum();
        let actual: i64 = apply(xs, [sum::<i64>()]).unwrap().value().unwrap();
        prop_assert_eq!(actual, expected);
    }

    /// Filtering never grows the stream.
    #[test]
    fn prop_filter_count_bounded(xs in proptest::collection::vec(any::<i64>(), 0..50)) {
        let len = xs.len();
        let kept: usize = apply(xs, [filter(|x: &i64| x % 2 == 0), count()])
            .unwrap()
            .value()
            .unwrap();
        prop_assert!(kept <= len);
    }

    /// `take_n` forwards at most its budget, in order.
    #[test]
    fn prop_take_n_prefix(xs in proptest::collection::vec(any::<i64>(), 0..50), n in 0usize..60) {
        let expected: Vec<i64> = xs.iter().copied().take(n).collect();
        let actual: Vec<i64> = apply(xs, [take_n(n), collect::<Vec<i64>>()])
            .unwrap()
            .value()
            .unwrap();
        prop_assert_eq!(actual, expected);
    }
}
