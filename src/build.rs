use std::process::Command;

fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn main() {
    // Set build timestamp
    let timestamp = chrono::Utc::now().to_rfc3339();
    println!("cargo:rustc-env=BUILD_TIMESTAMP={}", timestamp);

    // Always set, so the binary can use env! for its long version
    let rust_version = command_output("rustc", &["--version"]).unwrap_or("unknown".to_string());
    println!("cargo:rustc-env=RUST_VERSION={}", rust_version);

    let git_hash = command_output("git", &["rev-parse", "--short", "HEAD"]).unwrap_or("unknown".to_string());
    println!("cargo:rustc-env=GIT_HASH={}", git_hash);
}
