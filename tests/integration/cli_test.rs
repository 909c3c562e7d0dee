use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn swapsort() -> Command {
    Command::new(env!("CARGO_BIN_EXE_swapsort"))
}

fn template_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("models")
        .join("sorting_template.mzn")
}

fn run(cmd: &mut Command) -> Output {
    cmd.output().expect("Failed to execute swapsort")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_list_strategies() {
    let output = run(swapsort().arg("list-strategies").arg("--show-model"));
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let text = stdout(&output);
    for name in ["1_Default_Restart", "2_Moves_FirstFail", "3_Moves_DomWdeg"] {
        assert!(text.contains(name), "missing {} in:\n{}", name, text);
    }
    assert!(text.contains("restart_luby(250)"));
}

#[test]
fn test_bound_prints_breakdown() {
    let output = run(swapsort().args(["bound", "2,3,1,5,4"]));
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let text = stdout(&output);
    assert!(text.contains("Cycles: 2 (1 2 3) (4 5)"), "got:\n{}", text);
    assert!(text.contains("Inversions: 3"));
    assert!(text.contains("Lower bound: 3"));
}

#[test]
fn test_bound_rejects_non_permutation() {
    let output = run(swapsort().args(["bound", "1,1,2"]));
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("more than once"));
}

#[test]
fn test_unknown_strategy_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(swapsort()
        .args(["run", "--strategy", "dfs", "--template"])
        .arg(template_path())
        .arg("--output")
        .arg(dir.path().join("out")));

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("unknown strategy 'dfs'"));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_missing_template_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(swapsort()
        .args(["run", "--sizes", "3", "--instances-per-size", "1", "--template"])
        .arg(dir.path().join("missing.mzn"))
        .arg("--output")
        .arg(dir.path().join("out")));

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("model template not found"));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_generate_to_stdout() {
    let output = run(swapsort().args([
        "generate",
        "--sizes",
        "4,6",
        "--instances-per-size",
        "2",
        "--seed",
        "3",
        "--output",
        "-",
    ]));
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let text = stdout(&output);
    assert_eq!(text.matches("[[instance]]").count(), 4);

    let again = run(swapsort().args([
        "generate",
        "--sizes",
        "4,6",
        "--instances-per-size",
        "2",
        "--seed",
        "3",
        "--output",
        "-",
    ]));
    assert_eq!(text, stdout(&again));
}

#[cfg(unix)]
fn fake_minizinc(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-minizinc");
    fs::write(
        &path,
        "#!/bin/sh\n\
         if [ \"$1\" = \"--version\" ]; then echo \"MiniZinc fake 0.0\"; exit 0; fi\n\
         echo \"swap 1 2\"\n\
         echo \"%%%mzn-stat: solveTime=0.001\"\n\
         echo \"----------\"\n",
    )
    .unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(unix)]
#[test]
fn test_run_with_stub_solver_writes_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("results");
    let solver = fake_minizinc(dir.path());

    let output = run(swapsort()
        .args([
            "run",
            "--sizes",
            "3",
            "--instances-per-size",
            "2",
            "--seed",
            "11",
            "--timeout",
            "20",
            "--strategy",
            "1_Default_Restart,moves-dom-wdeg",
        ])
        .arg("--template")
        .arg(template_path())
        .arg("--minizinc")
        .arg(&solver)
        .arg("--output")
        .arg(&out));
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let csv = fs::read_to_string(out.join("summary_results.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "ID,N,Strategy,K,Time,Status");
    assert_eq!(lines.len(), 5);
    assert!(lines[1..].iter().all(|l| l.ends_with(",0.0010,OK")), "{}", csv);

    for strategy in ["1_Default_Restart", "3_Moves_DomWdeg"] {
        for id in [1, 2] {
            let detail = out.join(strategy).join(format!("result_{:02}_N3.txt", id));
            let text = fs::read_to_string(&detail).unwrap();
            assert!(text.contains("STATUS: SOLVED"));
            assert!(text.contains("swap 1 2"));
        }
    }
    assert!(!out.join("2_Moves_FirstFail").exists());
    assert!(out.join("instances.toml").is_file());
    assert!(fs::read_to_string(out.join("report.md")).unwrap().contains("## Comparison"));
    assert!(stdout(&output).contains("=== DONE"));
}
