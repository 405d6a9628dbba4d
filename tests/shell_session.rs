use serial_test::serial;
use shellcap::parsers::parse_log;
use shellcap::shell::{Launcher, run_session};
use shellcap::workspace::{CaptureOutcome, Workspace};
use std::io::{self, Write};
use std::process::{Command, ExitStatus, Stdio};

/// Feeds a typed session to the real shell through its stdin.
struct ScriptedUser(&'static str);

impl Launcher for ScriptedUser {
    fn launch(&self, command: &mut Command) -> io::Result<ExitStatus> {
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(self.0.as_bytes())?;
        }
        child.wait()
    }
}

fn bash_available() -> bool {
    Command::new("bash")
        .arg("--version")
        .stdout(Stdio::null())
        .status()
        .is_ok_and(|status| status.success())
}

fn captured_commands(workspace: &Workspace) -> Vec<String> {
    parse_log(&workspace.log_path())
        .unwrap()
        .into_iter()
        .map(|entry| entry.command)
        .collect()
}

#[test]
#[serial]
fn test_bash_logs_one_entry_per_typed_line() {
    if !bash_available() {
        eprintln!("bash not installed, skipping");
        return;
    }
    let tmp = tempfile::tempdir().unwrap();
    let workspace = Workspace::create_in(tmp.path()).unwrap();
    let user = ScriptedUser(
        "for i in 1 2; do echo $i; done\necho a | tr a b\nx=5\necho $x\ntrue && echo ok\nshellcap save\n",
    );

    let report = run_session(&workspace, "bash", &user).unwrap();
    assert_eq!(report.code, Some(0));
    assert_eq!(workspace.outcome(), CaptureOutcome::Saved);
    assert_eq!(
        captured_commands(&workspace),
        vec![
            "for i in 1 2; do echo $i; done",
            "echo a | tr a b",
            "x=5",
            "echo $x",
            "true && echo ok",
        ]
    );

    let log = std::fs::read_to_string(workspace.log_path()).unwrap();
    let first = log.lines().next().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(first.split(' ').next().unwrap()).is_ok());
}

#[test]
#[serial]
fn test_bash_cancel_is_not_saved() {
    if !bash_available() {
        eprintln!("bash not installed, skipping");
        return;
    }
    let tmp = tempfile::tempdir().unwrap();
    let workspace = Workspace::create_in(tmp.path()).unwrap();
    let user = ScriptedUser("shellcap cancel\n");

    run_session(&workspace, "bash", &user).unwrap();
    assert_eq!(workspace.outcome(), CaptureOutcome::NotSaved);
    assert!(captured_commands(&workspace).is_empty());
}

#[test]
#[serial]
fn test_bash_end_of_input_is_not_saved() {
    if !bash_available() {
        eprintln!("bash not installed, skipping");
        return;
    }
    let tmp = tempfile::tempdir().unwrap();
    let workspace = Workspace::create_in(tmp.path()).unwrap();
    let user = ScriptedUser("echo hi\nls\n");

    run_session(&workspace, "bash", &user).unwrap();
    assert_eq!(workspace.outcome(), CaptureOutcome::NotSaved);
    assert_eq!(captured_commands(&workspace), vec!["echo hi", "ls"]);
}
