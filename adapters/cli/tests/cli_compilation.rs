use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "delve"])
        .status()
        .expect("failed to invoke cargo check for delve CLI binary");

    assert!(status.success(), "cargo check --bin delve should succeed");
}

#[test]
fn cli_rejects_unknown_moves() {
    let output = Command::new(env!("CARGO_BIN_EXE_delve"))
        .args(["--seed", "3", "--moves", "NNQ"])
        .output()
        .expect("failed to run delve");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid --moves"), "stderr: {stderr}");
}

#[test]
fn cli_plays_scripted_moves() {
    let output = Command::new(env!("CARGO_BIN_EXE_delve"))
        .args(["--seed", "3", "--moves", "NNEE"])
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run delve");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("level 1 | food"), "stdout: {stdout}");
    assert!(stdout.contains('@'), "stdout: {stdout}");
}
