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

use std::collections::HashMap;

use downflow::stages::{collect, count, map, pack2, sum, take_n, unwrap_some};
use downflow::{apply, describe, group_by, map_group_by, map_group_by_ordered};
use proptest::prelude::*;

/// Adjacent runs of equal keys form separate groups, in encounter order.
#[test]
fn test_group_by_adjacent_runs() {
    let runs: Vec<(char, usize)> = apply(
        "aaabbaac".chars().collect::<Vec<char>>(),
        [
            group_by(|c: &char| *c, count()),
            pack2::<char, usize>(),
            collect::<Vec<(char, usize)>>(),
        ],
    )
    .unwrap()
    .value()
    .unwrap();
    assert_eq!(runs, vec![('a', 3), ('b', 2), ('a', 2), ('c', 1)]);
}

#[test]
fn test_group_by_multi_stage_sub_pipeline() {
    let totals: Vec<(bool, i64)> = apply(
        vec![1i64, 3, 2, 4, 5],
        [
            group_by(
                |x: &i64| x % 2 == 0,
                [map(|x: i64| x * 10), sum::<i64>()],
            ),
            pack2::<bool, i64>(),
            collect::<Vec<(bool, i64)>>(),
        ],
    )
    .unwrap()
    .value()
    .unwrap();
    assert_eq!(totals, vec![(false, 40), (true, 60), (false, 50)]);
}

/// A short-circuit stage inside a sub-pipeline lifts each group's value;
/// downstream stages consume the wrapped type.
#[test]
fn test_short_circuit_inside_groups() {
    let data = vec![Some(1i64), None, Some(2), Some(4)];
    let totals: Vec<(bool, Option<i64>)> = apply(
        data,
        [
            map_group_by_ordered(
                |v: &Option<i64>| v.is_some(),
                [unwrap_some::<i64>(), sum::<i64>()],
            ),
            pack2::<bool, Option<i64>>(),
            collect::<Vec<(bool, Option<i64>)>>(),
        ],
    )
    .unwrap()
    .value()
    .unwrap();
    assert_eq!(totals, vec![(false, None), (true, Some(7))]);
}

/// `map_group_by` merges all occurrences of a key, wherever they appear.
#[test]
fn test_map_group_by_merges_across_stream() {
    let words = vec![
        String::from("apple"),
        String::from("brie"),
        String::from("avocado"),
        String::from("bread"),
        String::from("ant"),
    ];
    let counts: HashMap<char, usize> = apply(
        words,
        [
            map_group_by(|w: &String| w.chars().next().unwrap_or('?'), count()),
            pack2::<char, usize>(),
            collect::<HashMap<char, usize>>(),
        ],
    )
    .unwrap()
    .value()
    .unwrap();
    assert_eq!(counts.get(&'a'), Some(&3));
    assert_eq!(counts.get(&'b'), Some(&2));
}

/// The ordered variant emits groups in ascending key order.
#[test]
fn test_map_group_by_ordered_emission_order() {
    let totals: Vec<(i64, i64)> = apply(
        vec![7i64, 2, 9, 4, 1, 8],
        [
            map_group_by_ordered(|x: &i64| x % 3, sum::<i64>()),
            pack2::<i64, i64>(),
            collect::<Vec<(i64, i64)>>(),
        ],
    )
    .unwrap()
    .value()
    .unwrap();
    assert_eq!(totals, vec![(0, 9), (1, 12), (2, 10)]);
}

/// Downstream doneness cuts group emission short.
#[test]
fn test_group_by_respects_downstream_done() {
    let runs: Vec<(char, usize)> = apply(
        "aabbcc".chars().collect::<Vec<char>>(),
        [
            group_by(|c: &char| *c, count()),
            take_n(2),
            pack2::<char, usize>(),
            collect::<Vec<(char, usize)>>(),
        ],
    )
    .unwrap()
    .value()
    .unwrap();
    assert_eq!(runs, vec![('a', 2), ('b', 2)]);
}

#[test]
fn test_description_nests_sub_pipeline() {
    let description = describe(
        vec![1i64, 2],
        [
            group_by(|x: &i64| *x, count()),
            pack2::<i64, usize>(),
            collect::<Vec<(i64, usize)>>(),
        ],
    )
    .unwrap();
    let rendered = description.to_string();
    assert!(rendered.contains("group_by"));
    assert!(rendered.contains("group:"));
    assert!(rendered.contains("count"));
}

proptest! {
    /// Adjacent-run lengths sum back to the stream length.
    #[test]
    fn prop_group_by_partitions(xs in proptest::collection::vec(0i64..4, 0..60)) {
        let runs: Vec<(i64, usize)> = apply(
            xs.clone(),
            [
                group_by(|x: &i64| *x, count()),
                pack2::<i64, usize>(),
                collect::<Vec<(i64, usize)>>(),
            ],
        )
        .unwrap()
        .value()
        .unwrap();
        let total: usize = runs.iter().map(|(_, n)| n).sum();
        prop_assert_eq!(total, xs.len());
        // adjacent runs never share a key
        for pair in runs.windows(2) {
            prop_assert!(pair[0].0 != pair[1].0);
        }
    }

    /// Hash grouping agrees with a reference fold.
    #[test]
    fn prop_map_group_by_totals(xs in proptest::collection::vec(0i64..10, 0..60)) {
        let mut expected: HashMap<i64, i64> = HashMap::new();
        for x in &xs {
            *expected.entry(x % 3).or_insert(0) += x;
        }
        let actual: HashMap<i64, i64> = apply(
            xs,
            [
                map_group_by(|x: &i64| x % 3, sum::<i64>()),
                pack2::<i64, i64>(),
                collect::<HashMap<i64, i64>>(),
            ],
        )
        .unwrap()
        .value()
        .unwrap();
        prop_assert_eq!(actual, expected);
    }
}
