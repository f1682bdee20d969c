//! Embeds a short commit id for `--version`. Release packaging without a
//! checkout can pin it through `TRIAGE_BUILD_SHA`.

use std::path::Path;
use std::process::Command;

fn git_short_sha(repo: &Path) -> Option<String> {
    let out = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    let sha = String::from_utf8(out.stdout).ok()?;
    let sha = sha.trim();
    (!sha.is_empty()).then(|| sha.to_owned())
}

fn main() {
    println!("cargo:rerun-if-env-changed=TRIAGE_BUILD_SHA");

    let sha = match std::env::var("TRIAGE_BUILD_SHA") {
        Ok(pinned) if !pinned.trim().is_empty() => pinned.trim().to_owned(),
        _ => {
            let manifest = std::env::var_os("CARGO_MANIFEST_DIR").unwrap_or_else(|| ".".into());
            let workspace = Path::new(&manifest).join("..");
            println!("cargo:rerun-if-changed={}", workspace.join(".git/HEAD").display());
            git_short_sha(&workspace).unwrap_or_else(|| "unknown".into())
        }
    };

    println!("cargo:rustc-env=TRIAGE_BUILD_SHA={sha}");
}
