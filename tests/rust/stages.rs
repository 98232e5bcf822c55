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

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use downflow::stages::{
    append, collect, count, enumerate, expand2, filter2, flatten_last, flatten_last_cloning,
    fold, for_each, map, map2, map_whole, max, max_by, min, min_max, pack2, reorder, sort,
    sort_by, sum,
};
use downflow::{apply, tee};
use proptest::prelude::*;

#[test]
fn test_fold_concatenates() {
    let joined: String = apply(
        vec![String::from("a"), String::from("b"), String::from("c")],
        [fold(String::new(), |mut acc: String, s: String| {
            acc.push_str(&s);
            acc
        })],
    )
    .unwrap()
    .value()
    .unwrap();
    assert_eq!(joined, "abc");
}

#[test]
fn test_extrema() {
    let data = vec![5i64, 6, 8, 7];
    let hi: Option<i64> = apply(data.clone(), [max::<i64>()]).unwrap().value().unwrap();
    let lo: Option<i64> = apply(data.clone(), [min::<i64>()]).unwrap().value().unwrap();
    let bounds: Option<(i64, i64)> = apply(data, [min_max::<i64>()]).unwrap().value().unwrap();
    assert_eq!(hi, Some(8));
    assert_eq!(lo, Some(5));
    assert_eq!(bounds, Some((5, 8)));
}

#[test]
fn test_extrema_empty_is_none() {
    let hi: Option<i64> = apply(Vec::<i64>::new(), [max::<i64>()])
        .unwrap()
        .value()
        .unwrap();
    assert_eq!(hi, None);
}

/// `max_by` keeps the earliest element among ties.
#[test]
fn test_max_by_first_of_ties() {
    let longest: Option<String> = apply(
        vec![String::from("aa"), String::from("bb"), String::from("c")],
        [max_by(|a: &String, b: &String| a.len().cmp(&b.len()))],
    )
    .unwrap()
    .value()
    .unwrap();
    assert_eq!(longest, Some(String::from("aa")));
}

#[test]
fn test_append_and_reorder() {
    let pairs: Vec<(usize, String)> = apply(
        vec![String::from("ab"), String::from("cde")],
        [
            append(|s: &String| s.len()),
            reorder(&[1, 0]),
            pack2::<usize, String>(),
            collect::<Vec<(usize, String)>>(),
        ],
    )
    .unwrap()
    .value()
    .unwrap();
    assert_eq!(
        pairs,
        vec![(2, String::from("ab")), (3, String::from("cde"))]
    );
}

#[test]
fn test_expand2_unpacks_pairs() {
    let kept: Vec<(i64, i64)> = apply(
        vec![(1i64, 10i64), (5, 2)],
        [
            expand2::<i64, i64>(),
            filter2(|a: &i64, b: &i64| a < b),
            pack2::<i64, i64>(),
            collect::<Vec<(i64, i64)>>(),
        ],
    )
    .unwrap()
    .value()
    .unwrap();
    assert_eq!(kept, vec![(1, 10)]);
}

#[test]
fn test_enumerate_prepends_counter() {
    let indexed: Vec<(i64, String)> = apply(
        vec![String::from("x"), String::from("y")],
        [
            enumerate(10),
            pack2::<i64, String>(),
            collect::<Vec<(i64, String)>>(),
        ],
    )
    .unwrap()
    .value()
    .unwrap();
    assert_eq!(
        indexed,
        vec![(10, String::from("x")), (11, String::from("y"))]
    );
}

/// `sort` rearranges the caller's vector through the exclusive borrow.
#[test]
fn test_sort_in_place() {
    let mut data = vec![3i64, 1, 2];
    let sorted: Vec<i64> = apply(&mut data, [sort::<i64>()]).unwrap().value().unwrap();
    assert_eq!(sorted, vec![1, 2, 3]);
    assert_eq!(data, vec![1, 2, 3]);
}

/// `sort_by` is stable: equal keys keep their relative order.
#[test]
fn test_sort_by_stable() {
    let mut data = vec![(2i64, 'a'), (1, 'b'), (2, 'c'), (1, 'd')];
    apply(&mut data, [sort_by(|a: &(i64, char), b: &(i64, char)| a.0.cmp(&b.0))]).unwrap();
    assert_eq!(data, vec![(1, 'b'), (1, 'd'), (2, 'a'), (2, 'c')]);
}

#[test]
fn test_for_each_side_effects() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let out = apply(
        vec![1i64, 2, 3],
        [for_each(move |x: i64| sink.borrow_mut().push(x))],
    )
    .unwrap();
    assert!(out.is_unit());
    assert_eq!(*seen.borrow(), vec![1, 2, 3]);
}

#[test]
fn test_map_whole_over_collected_value() {
    let longest: usize = apply(
        vec![String::from("abc"), String::from("z")],
        [
            map(|s: String| s.len()),
            collect::<Vec<usize>>(),
            map_whole(|lengths: &Vec<usize>| lengths.iter().copied().max().unwrap_or(0)),
        ],
    )
    .unwrap()
    .value()
    .unwrap();
    assert_eq!(longest, 3);
}

#[test]
fn test_flatten_last_shares_prefix() {
    let flat: Vec<(i64, i64)> = apply(
        vec![(1i64, vec![10i64, 11]), (2, vec![20])],
        [
            expand2::<i64, Vec<i64>>(),
            flatten_last::<Vec<i64>>(),
            map2(|tag: i64, x: i64| (tag, x)),
            collect::<Vec<(i64, i64)>>(),
        ],
    )
    .unwrap()
    .value()
    .unwrap();
    assert_eq!(flat, vec![(1, 10), (1, 11), (2, 20)]);
}

/// The cloning flatten hands every emitted row its own copy of owned
/// prefix slots, so a consuming stage downstream is legal.
#[test]
fn test_flatten_last_cloning_consumes_prefix() {
    let flat: Vec<(String, i64)> = apply(
        vec![(String::from("t"), vec![1i64, 2])],
        [
            expand2::<String, Vec<i64>>(),
            flatten_last_cloning::<Vec<i64>>(),
            pack2::<String, i64>(),
            collect::<Vec<(String, i64)>>(),
        ],
    )
    .unwrap()
    .value()
    .unwrap();
    assert_eq!(flat, vec![(String::from("t"), 1), (String::from("t"), 2)]);
}

#[test]
fn test_collect_into_map() {
    let by_len: HashMap<String, usize> = apply(
        vec![String::from("ab"), String::from("xyz")],
        [
            append(|s: &String| s.len()),
            pack2::<String, usize>(),
            collect::<HashMap<String, usize>>(),
        ],
    )
    .unwrap()
    .value()
    .unwrap();
    assert_eq!(by_len.get("ab"), Some(&2));
    assert_eq!(by_len.get("xyz"), Some(&3));
}

/// One scan, two branches: count and max side by side.
#[test]
fn test_tee_two_branches() {
    let (n, hi): (usize, Option<i64>) = apply(
        vec![5i64, 6, 8, 7],
        [tee([count(), max::<i64>()])],
    )
    .unwrap()
    .pair()
    .unwrap();
    assert_eq!(n, 4);
    assert_eq!(hi, Some(8));
}

proptest! {
    /// Sorting through the pipeline matches the standard sort.
    #[test]
    fn prop_sort_matches_std(mut xs in proptest::collection::vec(any::<i64>(), 0..50)) {
        let mut expected = xs.clone();
        expected.sort();
        apply(&mut xs, [sort::<i64>()]).unwrap();
        prop_assert_eq!(xs, expected);
    }

    /// `min_max` brackets every element.
    #[test]
    fn prop_min_max_brackets(xs in proptest::collection::vec(any::<i64>(), 1..50)) {
        let bounds: Option<(i64, i64)> = apply(xs.clone(), [min_max::<i64>()])
            .unwrap()
            .value()
            .unwrap();
        let (lo, hi) = bounds.unwrap();
        for x in &xs {
            prop_assert!(lo <= *x && *x <= hi);
        }
    }

    /// Count plus sum through `tee` agree with direct iteration.
    #[test]
    fn prop_tee_agrees_with_direct(xs in proptest::collection::vec(-100i64..100, 0..40)) {
        let (n, total): (usize, i64) = apply(xs.clone(), [tee([count(), sum::<i64>()])])
            .unwrap()
            .pair()
            .unwrap();
        prop_assert_eq!(n, xs.len());
        prop_assert_eq!(total, xs.iter().sum::<i64>());
    }
}
