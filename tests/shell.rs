//! End-to-end tests driving the `smallsh` binary through a pipe.
//!
//! Every shell runs in its own process group so that `exit`, which signals
//! the whole group, cannot reach the test harness.

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::fs;
use std::io::{Read, Write};
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

struct Run {
    pid: u32,
    status: ExitStatus,
    stdout: String,
    stderr: String,
}

fn spawn_shell(dir: &Path, home: &Path) -> Child {
    Command::new(env!("CARGO_BIN_EXE_smallsh"))
        .arg("--plain")
        .current_dir(dir)
        .env("HOME", home)
        .process_group(0)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn smallsh")
}

fn run_shell_in(dir: &Path, home: &Path, script: &str) -> Run {
    run_shell_bytes(dir, home, script.as_bytes())
}

fn run_shell_bytes(dir: &Path, home: &Path, script: &[u8]) -> Run {
    let mut child = spawn_shell(dir, home);
    let pid = child.id();
    {
        let mut stdin = child.stdin.take().expect("stdin");
        stdin.write_all(script).expect("write script");
    }
    let output = child.wait_with_output().expect("wait for smallsh");
    Run {
        pid,
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}

fn run_shell(script: &str) -> (tempfile::TempDir, Run) {
    let dir = tempfile::tempdir().expect("tempdir");
    let run = run_shell_in(dir.path(), dir.path(), script);
    (dir, run)
}

fn write_script(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).expect("write helper script");
}

/// Collect a child's stdout on a thread so it can be inspected while the
/// shell is still waiting for input.
fn capture_stdout(child: &mut Child) -> Arc<Mutex<Vec<u8>>> {
    let mut stdout = child.stdout.take().expect("stdout");
    let captured = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&captured);
    thread::spawn(move || {
        let mut buf = [0u8; 256];
        while let Ok(n) = stdout.read(&mut buf) {
            if n == 0 {
                break;
            }
            sink.lock().unwrap().extend_from_slice(&buf[..n]);
        }
    });
    captured
}

fn wait_for_text(captured: &Mutex<Vec<u8>>, text: &str, limit: Duration) -> bool {
    let started = Instant::now();
    while started.elapsed() < limit {
        if String::from_utf8_lossy(&captured.lock().unwrap()).contains(text) {
            return true;
        }
        thread::sleep(Duration::from_millis(20));
    }
    false
}

fn background_pids(stdout: &str) -> Vec<String> {
    stdout
        .match_indices("background pid is ")
        .map(|(at, prefix)| {
            stdout[at + prefix.len()..]
                .chars()
                .take_while(char::is_ascii_digit)
                .collect()
        })
        .collect()
}

#[test]
fn prompt_and_clean_end_of_input() {
    let (_dir, run) = run_shell("");
    assert!(run.status.success());
    assert_eq!(run.stdout, ": ");
}

#[test]
fn status_on_fresh_shell() {
    let (_dir, run) = run_shell("status\n");
    assert!(run.stdout.contains("exit value 0\n"), "{}", run.stdout);
}

#[test]
fn comments_and_blank_lines_do_nothing() {
    let (_dir, run) = run_shell("# echo hidden\n\n   \necho shown\n");
    assert!(!run.stdout.contains("hidden"));
    assert!(run.stdout.contains("shown\n"));
    assert!(run.stderr.is_empty(), "{}", run.stderr);
}

#[test]
fn pid_marker_expands_to_shell_pid() {
    let (_dir, run) = run_shell("echo pid=$$\n");
    assert!(
        run.stdout.contains(&format!("pid={}\n", run.pid)),
        "{}",
        run.stdout
    );
}

#[test]
fn foreground_exit_value_is_recorded() {
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "seven.sh", "exit 7\n");
    let run = run_shell_in(dir.path(), dir.path(), "sh seven.sh\nstatus\n");
    assert!(run.stdout.contains("exit value 7\n"), "{}", run.stdout);
}

#[test]
fn foreground_signal_is_recorded() {
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "die.sh", "kill -9 $$\n");
    let run = run_shell_in(dir.path(), dir.path(), "sh die.sh\nstatus\n");
    assert!(
        run.stdout.contains("terminated by signal 9\n"),
        "{}",
        run.stdout
    );
}

#[test]
fn failed_cd_keeps_last_status() {
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "seven.sh", "exit 7\n");
    let run = run_shell_in(
        dir.path(),
        dir.path(),
        "sh seven.sh\ncd /nonexistent/smallsh\nstatus\n",
    );
    assert!(run.stderr.contains("cd: /nonexistent/smallsh"), "{}", run.stderr);
    assert!(run.stdout.contains("exit value 7\n"), "{}", run.stdout);
}

#[test]
fn output_and_input_redirection() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("in.txt"), "banana\napple\n").unwrap();
    let run = run_shell_in(
        dir.path(),
        dir.path(),
        "echo hello > out.txt\nsort < in.txt > sorted.txt\n",
    );
    assert!(!run.stdout.contains("hello"));
    assert_eq!(
        fs::read_to_string(dir.path().join("out.txt")).unwrap(),
        "hello\n"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("sorted.txt")).unwrap(),
        "apple\nbanana\n"
    );
}

#[test]
fn output_redirection_truncates() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("out.txt"), "a much longer previous content\n").unwrap();
    run_shell_in(dir.path(), dir.path(), "echo new > out.txt\n");
    assert_eq!(
        fs::read_to_string(dir.path().join("out.txt")).unwrap(),
        "new\n"
    );
}

#[test]
fn missing_input_file_fails_the_child_only() {
    let (_dir, run) = run_shell("cat < missing.txt\nstatus\n");
    assert!(
        run.stderr.contains("cannot open missing.txt for input"),
        "{}",
        run.stderr
    );
    assert!(run.stdout.contains("exit value 1\n"), "{}", run.stdout);
    assert!(run.status.success());
}

#[test]
fn unknown_program_reports_and_exits_one() {
    let (_dir, run) = run_shell("no-such-program-smallsh\nstatus\n");
    assert!(
        run.stderr.contains("no-such-program-smallsh: "),
        "{}",
        run.stderr
    );
    assert!(run.stdout.contains("exit value 1\n"), "{}", run.stdout);
}

#[test]
fn parse_error_aborts_only_that_line() {
    let (_dir, run) = run_shell("ls >\nstatus\n");
    assert!(run.stderr.contains("syntax error"), "{}", run.stderr);
    assert!(run.stdout.contains("exit value 0\n"), "{}", run.stdout);
}

#[test]
fn cd_without_argument_goes_home() {
    let start = tempfile::tempdir().unwrap();
    let home = tempfile::tempdir().unwrap();
    let run = run_shell_in(start.path(), home.path(), "cd\npwd\n");
    let home = home.path().canonicalize().unwrap();
    assert!(
        run.stdout.contains(&format!("{}\n", home.display())),
        "{}",
        run.stdout
    );
}

#[test]
fn cd_changes_directory_for_later_commands() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    let run = run_shell_in(dir.path(), dir.path(), "cd sub\necho here > marker.txt\n");
    assert!(run.stderr.is_empty(), "{}", run.stderr);
    assert!(dir.path().join("sub").join("marker.txt").exists());
}

#[test]
fn failed_cd_leaves_directory_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let run = run_shell_in(dir.path(), dir.path(), "cd /nonexistent/smallsh\npwd\n");
    let cwd = dir.path().canonicalize().unwrap();
    assert!(run.stderr.contains("cd: "), "{}", run.stderr);
    assert!(
        run.stdout.contains(&format!("{}\n", cwd.display())),
        "{}",
        run.stdout
    );
}

#[test]
fn background_command_is_reported_when_done() {
    let (_dir, run) = run_shell("echo bg-marker &\ncat &\nsleep 1\nstatus\n");
    let pids = background_pids(&run.stdout);
    assert_eq!(pids.len(), 2, "{}", run.stdout);
    // Background stdout goes to the null device, stdin comes from it.
    assert!(!run.stdout.contains("bg-marker"), "{}", run.stdout);
    for pid in pids {
        assert!(
            run.stdout
                .contains(&format!("background pid {} is done: exit value 0\n", pid)),
            "{}",
            run.stdout
        );
    }
}

#[test]
fn background_with_explicit_redirection() {
    let dir = tempfile::tempdir().unwrap();
    let run = run_shell_in(dir.path(), dir.path(), "echo kept > bg.txt &\nsleep 1\n");
    assert_eq!(background_pids(&run.stdout).len(), 1, "{}", run.stdout);
    assert_eq!(
        fs::read_to_string(dir.path().join("bg.txt")).unwrap(),
        "kept\n"
    );
}

#[test]
fn interrupt_does_not_stop_the_shell() {
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "int.sh", "kill -INT $1\n");
    let run = run_shell_in(dir.path(), dir.path(), "sh int.sh $$\necho still-here\n");
    assert!(run.stdout.contains("still-here\n"), "{}", run.stdout);
    assert!(run.status.success());
}

#[test]
fn suspend_signal_toggles_foreground_only_mode() {
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "tstp.sh", "kill -TSTP $1\n");
    let script = "sh tstp.sh $$\n\
                  echo fg-only-marker &\n\
                  sh tstp.sh $$\n\
                  echo bg-again-marker &\n";
    let run = run_shell_in(dir.path(), dir.path(), script);

    assert!(
        run.stdout.contains("Entering foreground-only mode"),
        "{}",
        run.stdout
    );
    assert!(
        run.stdout.contains("Exiting foreground-only mode"),
        "{}",
        run.stdout
    );
    // Ignored `&`: ran in the foreground with inherited stdout.
    assert!(run.stdout.contains("fg-only-marker\n"), "{}", run.stdout);
    // Back to normal: backgrounded and sent to the null device.
    assert!(!run.stdout.contains("bg-again-marker"), "{}", run.stdout);
    assert_eq!(background_pids(&run.stdout).len(), 1, "{}", run.stdout);
}

#[test]
fn suspend_banner_is_printed_while_waiting_for_input() {
    let dir = tempfile::tempdir().unwrap();
    let mut child = spawn_shell(dir.path(), dir.path());
    let stdin = child.stdin.take().expect("stdin");
    let captured = capture_stdout(&mut child);

    assert!(wait_for_text(&captured, ": ", Duration::from_secs(5)));
    let shell = Pid::from_raw(child.id() as i32);
    signal::kill(shell, Signal::SIGTSTP).unwrap();

    // No further line has been sent; the banner must not wait for one.
    let shown = wait_for_text(
        &captured,
        "Entering foreground-only mode (& is now ignored)",
        Duration::from_secs(5),
    );
    drop(stdin);
    let status = child.wait().unwrap();
    assert!(shown, "{}", String::from_utf8_lossy(&captured.lock().unwrap()));
    assert!(status.success(), "{:?}", status);
}

#[test]
fn invalid_utf8_line_does_not_end_the_shell() {
    let dir = tempfile::tempdir().unwrap();
    let run = run_shell_bytes(
        dir.path(),
        dir.path(),
        b"echo \xff\xfe\necho still-alive\n",
    );
    assert!(run.status.success(), "{:?}", run.status);
    assert!(run.stdout.contains("still-alive\n"), "{}", run.stdout);
}

#[test]
fn foreground_child_can_be_interrupted() {
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "self-int.sh", "kill -INT $$\necho not-reached\n");
    let run = run_shell_in(dir.path(), dir.path(), "sh self-int.sh\nstatus\n");
    assert!(!run.stdout.contains("not-reached"), "{}", run.stdout);
    assert!(
        run.stdout.contains("terminated by signal 2\n"),
        "{}",
        run.stdout
    );
    assert!(run.status.success());
}

#[test]
fn foreground_child_ignores_suspend() {
    let dir = tempfile::tempdir().unwrap();
    write_script(dir.path(), "self-tstp.sh", "kill -TSTP $$\necho survived\n");
    let started = Instant::now();
    let run = run_shell_in(dir.path(), dir.path(), "sh self-tstp.sh\nstatus\n");
    assert!(run.stdout.contains("survived\n"), "{}", run.stdout);
    assert!(run.stdout.contains("exit value 0\n"), "{}", run.stdout);
    assert!(started.elapsed() < Duration::from_secs(20));
}

#[test]
fn exit_stops_reading_and_kills_background_children() {
    let started = Instant::now();
    let (_dir, run) = run_shell("sleep 30 &\nexit\necho after-exit\n");
    assert!(run.status.success(), "{:?}", run.status);
    assert!(!run.stdout.contains("after-exit"));
    // A surviving `sleep` would hold the stderr pipe open for 30 seconds.
    assert!(started.elapsed() < Duration::from_secs(20));
}
