#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[allow(dead_code)]
pub const CMD_TIMEOUT: Duration = Duration::from_secs(15);

/// Create a configured `litesitemap` command suitable for integration tests.
#[allow(dead_code)]
pub fn litesitemap_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("litesitemap"));
    cmd.timeout(CMD_TIMEOUT);
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("LITESITEMAP_DOMAIN");
    cmd.env_remove("LITESITEMAP_CONFIG");
    cmd.env_remove("LITESITEMAP_OUTPUT_FORMAT");
    cmd
}

/// Write a URL list with one entry per line.
#[allow(dead_code)]
pub fn write_urls(dir: &Path, urls: &[&str]) -> PathBuf {
    let path = dir.join("urls.txt");
    fs::write(&path, urls.join("\n")).expect("failed to write URL list");
    path
}

/// Sorted file names in `dir`, excluding the URL list.
#[allow(dead_code)]
pub fn output_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name != "urls.txt")
        .collect();
    names.sort();
    names
}
