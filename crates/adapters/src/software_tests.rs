// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn parses_commit_line() {
    let info = parse_log_line(
        "3f2a9c1d0e8b7a6f5e4d3c2b1a0f9e8d7c6b5a4f|3f2a9c1|2 days ago|Fix eltwise broadcast\n",
    )
    .unwrap();

    assert_eq!(
        info,
        SoftwareInfo {
            full_hash: "3f2a9c1d0e8b7a6f5e4d3c2b1a0f9e8d7c6b5a4f".to_string(),
            short_hash: "3f2a9c1".to_string(),
            time_ago: "2 days ago".to_string(),
            message: "Fix eltwise broadcast".to_string(),
        }
    );
}

#[test]
fn subject_keeps_its_separators() {
    let info = parse_log_line("abc|ab|1 hour ago|ops: add | sub").unwrap();
    assert_eq!(info.message, "ops: add | sub");
}

#[parameterized(
    empty = { "" },
    too_few_fields = { "abc|ab|1 hour ago" },
    no_hash = { "|ab|1 hour ago|subject" },
)]
fn rejects_malformed_lines(line: &str) {
    assert!(matches!(
        parse_log_line(line),
        Err(SoftwareError::Unparsable(_))
    ));
}

#[tokio::test]
async fn directory_without_repository_is_a_command_failure() {
    let dir = tempfile::tempdir().unwrap();
    let provenance = GitProvenance::new(dir.path().join("missing"));

    // Spawning in a directory that does not exist fails whether or not git is installed
    let result = provenance.latest_commit().await;
    assert!(
        matches!(result, Err(SoftwareError::CommandFailed(_))),
        "{result:?}"
    );
}
