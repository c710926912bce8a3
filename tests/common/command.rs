use crate::common::REPOSITORY_DIR;
use crate::common::file::{FileSpec, write_file};
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

/// Fixed commit date so commit ids are reproducible
pub const COMMIT_DATE: &str = "2023-01-01 12:00:00 +0000";

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// A repository whose `main` branch holds one commit with `README` = "hello"
#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_minigit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    stage_and_commit(repository_dir.path(), &[("README", "hello")], "first");

    repository_dir
}

pub fn run_minigit_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("minigit").expect("Failed to find minigit binary");
    cmd.env_remove("MINIGIT_LOG");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn minigit_commit(dir: &Path, message: &str) -> Command {
    let mut cmd = run_minigit_command(dir, &["commit", "-m", message]);
    cmd.env("MINIGIT_COMMIT_DATE", COMMIT_DATE);
    cmd
}

/// Write the files, stage them and commit, asserting every step succeeds
pub fn stage_and_commit(dir: &Path, files: &[(&str, &str)], message: &str) {
    for (path, content) in files {
        write_file(FileSpec::new(dir.join(path), content.to_string()));
        run_minigit_command(dir, &["add", path]).assert().success();
    }

    minigit_commit(dir, message).assert().success();
}

/// Commit id HEAD resolves to, empty for an unborn branch
pub fn head_commit_id(dir: &Path) -> String {
    let repository = dir.join(REPOSITORY_DIR);
    let head = std::fs::read_to_string(repository.join("HEAD")).expect("Failed to read HEAD");

    match head.trim().strip_prefix("ref: ") {
        Some(branch) => branch_commit_id(dir, branch),
        None => head.trim().to_string(),
    }
}

pub fn branch_commit_id(dir: &Path, branch: &str) -> String {
    let ref_path = dir.join(REPOSITORY_DIR).join("refs").join(branch);
    std::fs::read_to_string(ref_path)
        .expect("Failed to read branch ref")
        .trim()
        .to_string()
}

pub fn count_objects(dir: &Path) -> usize {
    walkdir::WalkDir::new(dir.join(REPOSITORY_DIR).join("objects"))
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .count()
}
