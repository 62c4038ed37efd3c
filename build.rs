use std::process::Command;

fn git(args: &[&str]) -> Option<std::process::Output> {
    Command::new("git").args(args).output().ok()
}

fn main() {
    let sha = git(&["rev-parse", "--short", "HEAD"])
        .filter(|out| out.status.success())
        .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string())
        .filter(|sha| !sha.is_empty());

    let version = match sha {
        Some(mut sha) => {
            let dirty = git(&["status", "--porcelain", "--untracked-files=no"])
                .map(|out| !out.stdout.is_empty())
                .unwrap_or(false);
            if dirty {
                sha.push_str("-dirty");
            }
            sha
        }
        None => "unknown".to_string(),
    };

    println!("cargo:rustc-env=ERRBUDDY_GIT_SHA={version}");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
    println!("cargo:rerun-if-changed=src/data");
}
