use std::env;
use std::process::Command;

const PREFIX: &str = "ATTENDANCE_CORE";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs");

    let commit = match stdout_of("git", &["rev-parse", "--short", "HEAD"]) {
        Some(hash) => {
            let dirty = stdout_of("git", &["status", "--porcelain", "--untracked-files=no"])
                .is_some_and(|status| !status.is_empty());
            if dirty {
                format!("{hash}+dirty")
            } else {
                hash
            }
        }
        None => "unknown".to_string(),
    };
    emit("COMMIT", &commit);

    let built_at = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC").to_string();
    emit("BUILT_AT", &built_at);

    let target = env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    emit("TARGET", &format!("{target} ({profile})"));

    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    emit(
        "RUSTC",
        &stdout_of(&rustc, &["--version"]).unwrap_or_else(|| "unknown".to_string()),
    );
}

fn emit(key: &str, value: &str) {
    println!("cargo:rustc-env={PREFIX}_{key}={value}");
}

/// Trimmed stdout of a successful command; `None` when it fails or prints nothing.
fn stdout_of(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
