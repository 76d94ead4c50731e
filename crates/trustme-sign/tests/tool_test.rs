#![cfg(unix)]

use trustme_sign::error::ToolError;
use trustme_sign::tool::{ExitOutcome, ProcessRunner, ToolInvocation, ToolRunner};

#[test]
fn zero_exit_is_success() {
    let inv = ToolInvocation::new("sh").arg("-c").arg("echo discarded; exit 0");
    assert!(ProcessRunner.run(&inv).is_ok());
}

#[test]
fn non_zero_exit_is_reported_with_code() {
    let inv = ToolInvocation::new("sh").arg("-c").arg("exit 3");
    match ProcessRunner.run(&inv) {
        Err(ToolError::Failed { tool, outcome }) => {
            assert_eq!(tool, std::path::Path::new("sh"));
            assert_eq!(outcome, ExitOutcome(Some(3)));
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn missing_program_is_a_spawn_error() {
    let inv = ToolInvocation::new("/nonexistent/trustme-makecert");
    let err = ProcessRunner.run(&inv).unwrap_err();
    assert!(matches!(err, ToolError::Spawn { .. }));
    assert!(err.to_string().contains("trustme-makecert"));
}
