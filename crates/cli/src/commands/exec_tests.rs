// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use clap::Parser;

#[derive(Parser)]
struct Harness {
    #[command(flatten)]
    args: ExecArgs,
}

fn parse(argv: &[&str]) -> ExecArgs {
    Harness::try_parse_from(std::iter::once("exec").chain(argv.iter().copied()))
        .unwrap()
        .args
}

#[test]
fn plain_numbers_are_tensors_with_shared_layout() {
    let args = parse(&["add", "1.5", "-2", "--shape", "2,16", "--dtype", "float32"]);

    let request = args.to_request().unwrap();

    assert_eq!(request.operation, "add");
    assert_eq!(
        request.inputs,
        vec![
            Input::Tensor {
                value: 1.5,
                shape: "2,16".to_string(),
                dtype: "float32".to_string(),
            },
            Input::Tensor {
                value: -2.0,
                shape: "2,16".to_string(),
                dtype: "float32".to_string(),
            },
        ]
    );
}

#[test]
fn prefixed_values_are_scalars() {
    let args = parse(&["where", "1", "s:-3", "4"]);

    let request = args.to_request().unwrap();

    assert_eq!(request.inputs[1], Input::scalar(-3.0));
    assert_eq!(request.inputs[0], Input::tensor(1.0));
}

#[test]
fn params_are_forwarded() {
    let args = parse(&["threshold", "0.5", "--param", "-0.25", "--param2", "9"]);

    let request = args.to_request().unwrap();

    assert_eq!(request.optional_param, Some(-0.25));
    assert_eq!(request.optional_param_2, Some(9.0));
}

#[test]
fn garbage_value_is_rejected() {
    let err = parse_input("one", "1,1,32,32", "bfloat16").unwrap_err();
    assert!(err.to_string().contains("invalid input value"));
}

#[test]
fn nan_is_a_valid_input() {
    match parse_input("NaN", "1,1,32,32", "bfloat16").unwrap() {
        Input::Tensor { value, .. } => assert!(value.is_nan()),
        other => panic!("Expected tensor, got {:?}", other),
    }
}
