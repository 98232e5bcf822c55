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
use std::rc::Rc;

use downflow::stages::{collect, fold, map_ref, max, sum, unwrap_ok, unwrap_some};
use downflow::{apply, Fallible, Fault, FlowError};

#[test]
fn test_unwrap_some_all_present() {
    let total: Option<i64> = apply(
        vec![Some(1i64), Some(2), Some(3)],
        [unwrap_some::<i64>(), sum::<i64>()],
    )
    .unwrap()
    .value()
    .unwrap();
    assert_eq!(total, Some(6));
}

/// The first `None` voids the result.
#[test]
fn test_unwrap_some_short_circuits() {
    let total: Option<i64> = apply(
        vec![Some(1i64), None, Some(2)],
        [unwrap_some::<i64>(), sum::<i64>()],
    )
    .unwrap()
    .value()
    .unwrap();
    assert_eq!(total, None);
}

/// After the first `None`, no further element reaches downstream: the
/// upstream scan stops.
#[test]
fn test_unwrap_some_stops_the_scan() {
    let delivered = Rc::new(RefCell::new(0usize));
    let counter = Rc::clone(&delivered);
    let result: Option<Vec<i64>> = apply(
        vec![Some(1i64), None, Some(2), Some(3)],
        [
            unwrap_some::<i64>(),
            map_ref(move |x: &i64| {
                *counter.borrow_mut() += 1;
                *x
            }),
            collect::<Vec<i64>>(),
        ],
    )
    .unwrap()
    .value()
    .unwrap();
    assert_eq!(result, None);
    assert_eq!(*delivered.borrow(), 1);
}

/// A result that is already `Option`-shaped is not nested: failure
/// substitutes `None` of the same wrapper.
#[test]
fn test_unwrap_some_over_wrapped_extremum() {
    let hi: Option<i64> = apply(
        vec![Some(5i64), Some(3)],
        [unwrap_some::<i64>(), max::<i64>()],
    )
    .unwrap()
    .value()
    .unwrap();
    assert_eq!(hi, Some(5));

    let voided: Option<i64> = apply(
        vec![Some(5i64), None],
        [unwrap_some::<i64>(), max::<i64>()],
    )
    .unwrap()
    .value()
    .unwrap();
    assert_eq!(voided, None);
}

/// An `Option`-typed result built by a plain stage carries no wrapper
/// metadata, so the wrap cannot tell substitution from nesting; the build
/// pass rejects it instead of returning `Option<Option<_>>`.
#[test]
fn test_untagged_option_result_rejected() {
    let err = apply(
        vec![Some(1i64), Some(2)],
        [
            unwrap_some::<i64>(),
            fold(None::<i64>, |acc: Option<i64>, x: i64| {
                Some(acc.unwrap_or(0) + x)
            }),
        ],
    )
    .unwrap_err();
    match err {
        FlowError::Config { stage, message } => {
            assert_eq!(stage, "unwrap_some");
            assert!(message.contains("wrapper metadata"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unwrap_ok_all_present() {
    let input: Vec<Fallible<i64>> = vec![Ok(1), Ok(2), Ok(3)];
    let total: Fallible<i64> = apply(input, [unwrap_ok::<i64>(), sum::<i64>()])
        .unwrap()
        .value()
        .unwrap();
    assert_eq!(total, Ok(6));
}

/// The first fault wins and becomes the pipeline result.
#[test]
fn test_unwrap_ok_reports_first_fault() {
    let input: Vec<Fallible<i64>> = vec![
        Ok(1),
        Err(Fault::new("bad record 2")),
        Err(Fault::new("bad record 3")),
        Ok(4),
    ];
    let total: Fallible<i64> = apply(input, [unwrap_ok::<i64>(), sum::<i64>()])
        .unwrap()
        .value()
        .unwrap();
    assert_eq!(total, Err(Fault::new("bad record 2")));
}

#[test]
fn test_unwrap_ok_empty_stream_is_ok() {
    let input: Vec<Fallible<i64>> = Vec::new();
    let total: Fallible<i64> = apply(input, [unwrap_ok::<i64>(), sum::<i64>()])
        .unwrap()
        .value()
        .unwrap();
    assert_eq!(total, Ok(0));
}

/// Wrapping applies to the whole downstream result, collections
/// included.
#[test]
fn test_unwrap_some_wraps_collections() {
    let collected: Option<Vec<i64>> = apply(
        vec![Some(4i64), Some(5)],
        [unwrap_some::<i64>(), collect::<Vec<i64>>()],
    )
    .unwrap()
    .value()
    .unwrap();
    assert_eq!(collected, Some(vec![4, 5]));
}
