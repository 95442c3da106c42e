//! End-to-end script execution through the public `ren` library surface —
//! grounded on `ox-bin`'s own integration test style (`tests/status_only_delta.rs`):
//! exercise the library crate's own code from outside, via a file on disk.

use std::io::Write;

use ren::host;

fn write_script(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn running_a_script_file_returns_its_last_expressions_value() {
    let script = write_script("add 1 2\nmultiply 3 4\n");
    let source = std::fs::read_to_string(script.path()).unwrap();

    let (mut engine, mut ctx, coupling) = host::new_session();
    let result = host::reb_value(&mut engine, &mut ctx, coupling, &source).unwrap();
    assert_eq!(result, core_value::Cell::integer(12));
}

#[test]
fn a_multi_expression_script_evaluates_every_expression_and_returns_the_last() {
    let script = write_script("add 1 2\nsubtract 10 4\nmultiply 2 5\n");
    let source = std::fs::read_to_string(script.path()).unwrap();

    let (mut engine, mut ctx, coupling) = host::new_session();
    let result = host::reb_value(&mut engine, &mut ctx, coupling, &source).unwrap();
    assert_eq!(result, core_value::Cell::integer(10));
}

#[test]
fn referencing_an_unbound_word_surfaces_as_a_thrown_no_binding_error() {
    let script = write_script("x: 10\n");
    let source = std::fs::read_to_string(script.path()).unwrap();

    let (mut engine, mut ctx, coupling) = host::new_session();
    let err = host::reb_value(&mut engine, &mut ctx, coupling, &source).unwrap_err();
    assert!(matches!(err, host::HostError::Thrown(_)));
}

#[test]
fn comparison_natives_return_keyword_booleans() {
    let script = write_script("less? 1 2\n");
    let source = std::fs::read_to_string(script.path()).unwrap();

    let (mut engine, mut ctx, coupling) = host::new_session();
    let result = host::reb_value(&mut engine, &mut ctx, coupling, &source).unwrap();
    assert!(host::reb_did(&result));
}

#[test]
fn dividing_by_zero_in_a_script_surfaces_as_an_uncaught_throw() {
    let script = write_script("divide 10 0\n");
    let source = std::fs::read_to_string(script.path()).unwrap();

    let (mut engine, mut ctx, coupling) = host::new_session();
    let err = host::reb_value(&mut engine, &mut ctx, coupling, &source).unwrap_err();
    assert!(matches!(err, host::HostError::Thrown(_)));
}

#[test]
fn nested_blocks_and_strings_scan_and_evaluate() {
    let script = write_script(r#"print "hello world""#);
    let source = std::fs::read_to_string(script.path()).unwrap();

    let (mut engine, mut ctx, coupling) = host::new_session();
    let result = host::reb_value(&mut engine, &mut ctx, coupling, &source);
    assert!(result.is_ok());
}
