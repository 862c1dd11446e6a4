use std::io::Write;
use std::process::{Command, Output, Stdio};

fn run(args: &[&str], input: &str) -> Output {
    // Spawn the calculator and feed the buffer on stdin
    let mut child = Command::new(env!("CARGO_BIN_EXE_scratchpad_calc"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    {
        let stdin = child.stdin.as_mut().unwrap();
        stdin.write_all(input.as_bytes()).unwrap();
    }
    child.wait_with_output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn prints_one_line_per_input_line() {
    let output = run(&[], "# rent\nrent = 1200\n\nrent * 12\n5 / 0\n");
    assert!(output.status.success());
    assert_eq!(stdout(&output), "\n1200\n\n14400\nDivision by zero\n");
}

#[test]
fn final_line_break_is_optional() {
    assert_eq!(stdout(&run(&[], "2 * 3\n")), "6\n");
    assert_eq!(stdout(&run(&[], "2 * 3")), "6\n");
    assert_eq!(stdout(&run(&[], "1\r\n2\r\n")), "1\n2\n");
}

#[test]
fn show_names_labels_assignments() {
    let output = run(&["--show-names"], "x = 2 ^ 10\nx / 4\n");
    assert_eq!(stdout(&output), "x = 1024\n256\n");
}

#[test]
fn strict_mode_fails_on_errors() {
    let output = run(&["--strict"], "1 + 1\nnope\n");
    assert!(!output.status.success());
    let output = run(&["-s"], "1 + 1\n");
    assert!(output.status.success());
}

#[test]
fn verbose_reports_failures_on_stderr() {
    let output = run(&["-v"], "1 +\n2\n");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 1: Invalid syntax: expression ended abruptly"));
    assert_eq!(stdout(&output), "Invalid syntax\n2\n");
}

#[test]
fn interactive_mode_reevaluates_the_buffer() {
    let output = run(&["-i"], "width = 3\nheight = 4\nwidth * height\n\nignored\n");
    let out = stdout(&output);
    assert!(out.contains("> 3\n"));
    assert!(out.contains("> 12\n"));
    assert!(!out.contains("ignored"));
}

#[test]
fn reads_buffer_from_file() {
    let path = std::env::temp_dir().join(format!("scratchpad_calc_{}.txt", std::process::id()));
    std::fs::write(&path, "bin(10)\nhex(4096)\n").unwrap();
    let output = run(&[path.to_str().unwrap()], "");
    std::fs::remove_file(&path).ok();
    assert_eq!(stdout(&output), "1010\n1000\n");
}

#[test]
fn missing_file_is_reported() {
    let output = run(&["/definitely/not/here.txt"], "");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read the input"));
}
