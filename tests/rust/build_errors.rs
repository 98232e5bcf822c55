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

//! Every composition mistake must surface from the build pass as a
//! structured error, before any element flows.

use downflow::stages::{collect, count, filter, map, map2, pack2, reorder, sort, sum, take_n, unwrap_some};
use downflow::{apply, generator_from, map_group_by_ordered, tee, FlowError, StageSpec};

#[test]
fn test_incremental_into_complete_input() {
    let err = apply(
        vec![3i64, 1, 2],
        [filter(|x: &i64| *x > 0), sort::<i64>()],
    )
    .unwrap_err();
    match err {
        FlowError::Config { stage, message } => {
            assert_eq!(stage, "sort");
            assert!(message.contains("collecting"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_non_iterable_at_incremental_boundary() {
    let err = apply(
        vec![1i64, 2],
        [count(), filter(|x: &usize| *x > 0), collect::<Vec<usize>>()],
    )
    .unwrap_err();
    match err {
        FlowError::Config { stage, message } => {
            assert_eq!(stage, "filter");
            assert!(message.contains("not iterable"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_element_type_mismatch() {
    let err = apply(
        vec![1i64, 2],
        [map(|s: String| s.len()), collect::<Vec<usize>>()],
    )
    .unwrap_err();
    match err {
        FlowError::TypeMismatch { stage, expected, found } => {
            assert_eq!(stage, "map");
            assert!(expected.contains("String"));
            assert_eq!(found, "i64");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_pipeline_must_end_complete() {
    let err = apply(vec![1i64, 2], [filter(|x: &i64| *x > 0)]).unwrap_err();
    match err {
        FlowError::Config { stage, message } => {
            assert_eq!(stage, "filter");
            assert!(message.contains("complete-output"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_generator_cannot_feed_complete_input() {
    let err = apply(generator_from(0), [sort::<i64>()]).unwrap_err();
    match err {
        FlowError::Config { stage, message } => {
            assert_eq!(stage, "sort");
            assert!(message.contains("generator"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_sort_rejects_shared_borrow() {
    let data = vec![3i64, 1];
    let err = apply(
        &data,
        [collect::<Vec<i64>>(), sort::<i64>()],
    )
    .unwrap_err();
    // the collected value is owned, not mutably borrowed
    match err {
        FlowError::Config { stage, message } => {
            assert_eq!(stage, "sort");
            assert!(message.contains("mutably borrowed"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_reorder_validates_indices() {
    let out_of_range = apply(vec![1i64], [reorder(&[1]), collect::<Vec<i64>>()]).unwrap_err();
    assert!(matches!(out_of_range, FlowError::Config { .. }));

    let duplicate = apply(
        vec![1i64],
        [reorder(&[0, 0]), collect::<Vec<i64>>()],
    )
    .unwrap_err();
    assert!(matches!(duplicate, FlowError::Config { .. }));

    let empty = apply(vec![1i64], [reorder(&[]), collect::<Vec<i64>>()]).unwrap_err();
    assert!(matches!(empty, FlowError::Config { .. }));
}

#[test]
fn test_tee_requires_a_branch() {
    let err = apply(vec![1i64], [tee(Vec::<StageSpec>::new())]).unwrap_err();
    match err {
        FlowError::Config { stage, .. } => assert_eq!(stage, "tee"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_arity_mismatch() {
    let err = apply(
        vec![1i64, 2],
        [map2(|a: i64, b: i64| a + b), collect::<Vec<i64>>()],
    )
    .unwrap_err();
    assert!(matches!(err, FlowError::Config { .. }));
}

/// A short-circuit stage inside a sub-pipeline wraps the group value, so
/// a consumer typed against the unwrapped value fails at build.
#[test]
fn test_wrapped_group_value_checked_at_build() {
    let data: Vec<Option<i64>> = vec![Some(1), None, Some(2)];
    let err = apply(
        data,
        [
            map_group_by_ordered(
                |v: &Option<i64>| v.is_some(),
                [unwrap_some::<i64>(), sum::<i64>()],
            ),
            pack2::<bool, i64>(),
            collect::<Vec<(bool, i64)>>(),
        ],
    )
    .unwrap_err();
    match err {
        FlowError::TypeMismatch { stage, expected, found } => {
            assert_eq!(stage, "construct");
            assert!(expected.contains("i64"));
            assert!(found.contains("Option"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// Build errors fire before any element flows: a stage after the faulty
/// boundary never runs.
#[test]
fn test_build_error_precedes_execution() {
    let err = apply(
        generator_from(0),
        [take_n(3), sort::<i64>()],
    )
    .unwrap_err();
    assert!(matches!(err, FlowError::Config { .. }));
}
