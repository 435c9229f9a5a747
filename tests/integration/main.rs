// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod gain;
mod peaks;

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
    process::Output,
    str::from_utf8,
};

use assert_cmd::{output::OutputError, Command};
use itertools::Itertools;
use tempfile::TempDir;

use mca_calibrate::peaks::gaussian;

fn mca_calibrate() -> Command {
    Command::cargo_bin("mca_calibrate").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

/// Write a 1024-channel spectrum with a flat background of 5 counts and
/// Gaussians of (centre, sigma, height). Files ending in .json get a json
/// array, anything else one count per line.
fn write_spectrum<P: AsRef<Path>>(dir: P, filename: &str, peaks: &[(f64, f64, f64)]) -> PathBuf {
    let counts: Vec<f64> = (0..1024)
        .map(|i| {
            5.0 + peaks
                .iter()
                .map(|&(c, s, h)| gaussian(h, i as f64, c, s))
                .sum::<f64>()
        })
        .collect();
    let path = dir.as_ref().join(filename);
    let mut f = File::create(&path).expect("couldn't make file");
    if filename.ends_with(".json") {
        serde_json::to_writer(&mut f, &counts).unwrap();
    } else {
        writeln!(f, "# Synthetic spectrum").unwrap();
        writeln!(f, "{}", counts.iter().map(|c| format!("{c:.3}")).join("\n")).unwrap();
    }
    path
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_reader(File::open(path).unwrap()).unwrap()
}

#[test]
fn test_mca_calibrate_help_is_correct() {
    let mut stdouts = vec![];

    // First with --help
    let cmd = mca_calibrate().arg("--help").ok();
    assert!(cmd.is_ok());
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty());
    stdouts.push(stdout);

    // Then with -h
    let cmd = mca_calibrate().arg("-h").ok();
    assert!(cmd.is_ok());
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty());
    stdouts.push(stdout);

    for stdout in stdouts {
        assert!(stdout.contains("peaks"));
        assert!(stdout.contains("gain"));
    }
}

#[test]
fn test_no_subcommand_is_an_error() {
    let cmd = mca_calibrate().ok();
    assert!(cmd.is_err());
}
