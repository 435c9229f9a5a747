// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests against the command-line interface for peak searching.

use indoc::formatdoc;

use crate::*;

#[test]
fn test_peaks_help_lists_search_arguments() {
    let cmd = mca_calibrate().args(["peaks", "--help"]).ok();
    assert!(cmd.is_ok());
    let (stdout, _) = get_cmd_output(cmd);
    for arg in [
        "--spectra",
        "--energies",
        "--background-range-min",
        "--noise-multiplier",
        "--max-iterations",
        "--output",
    ] {
        assert!(stdout.contains(arg), "{arg} missing from help text");
    }
    assert!(stdout
        .split_ascii_whitespace()
        .join(" ")
        .contains("Supported formats: toml, json"));
}

#[test]
fn test_peaks_writes_json() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let spectrum = write_spectrum(&tmp_dir, "element.txt", &[(400.0, 6.0, 2000.0)]);
    let output = tmp_dir.path().join("peaks.json");

    #[rustfmt::skip]
    let cmd = mca_calibrate()
        .args([
            "peaks",
            "--spectra", &spectrum.display().to_string(),
            "--background-range-min", "100",
            "--background-range-max", "200",
            "--output", &output.display().to_string(),
        ])
        .ok();
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
    assert!(stdout.contains("centroids"));
    assert!(stdout.contains("mca_calibrate peaks complete."));

    let json = read_json(&output);
    let reports = json.as_array().unwrap();
    assert_eq!(reports.len(), 1);
    let centroid = reports[0]["centroids"][0].as_u64().unwrap();
    assert!((399..=401).contains(&centroid));
    assert_eq!(reports[0]["stop_reason"], "found_all");
    assert!(reports[0]["scaled_fwhms"].is_null());
}

#[test]
fn test_peaks_reads_json_spectra() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let spectrum = write_spectrum(
        &tmp_dir,
        "element.json",
        &[(300.0, 6.0, 1000.0), (600.0, 7.0, 3000.0), (800.0, 5.0, 2000.0)],
    );
    let output = tmp_dir.path().join("peaks.json");

    #[rustfmt::skip]
    let cmd = mca_calibrate()
        .args([
            "peaks",
            "--spectra", &spectrum.display().to_string(),
            "--background-range-min", "100",
            "--background-range-max", "200",
            "--max-peaks", "3",
            "--output", &output.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "{:?}", get_cmd_output(cmd));

    let json = read_json(&output);
    let centroids: Vec<u64> = json[0]["centroids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c.as_u64().unwrap())
        .collect();
    assert_eq!(centroids.len(), 3);
    // Strongest first.
    assert!((599..=601).contains(&centroids[0]));
    assert!((799..=801).contains(&centroids[1]));
    assert!((299..=301).contains(&centroids[2]));
}

#[test]
fn test_peaks_arg_file_and_cli_override() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let spectrum = write_spectrum(
        &tmp_dir,
        "element.txt",
        &[(300.0, 6.0, 1000.0), (600.0, 7.0, 3000.0)],
    );
    let output = tmp_dir.path().join("peaks.json");
    let arg_file = tmp_dir.path().join("args.toml");
    {
        let mut f = File::create(&arg_file).unwrap();
        write!(
            f,
            "{}",
            formatdoc! {r#"
                output = "{output}"

                [search]
                spectra = ["{spectrum}"]
                energies = [6.0, 3.0]
                background_range_min = 100
                background_range_max = 200
            "#,
                output = output.display(),
                spectrum = spectrum.display(),
            }
        )
        .unwrap();
    }

    // The CLI asks for a single peak, overriding the number of energies.
    let cmd = mca_calibrate()
        .args(["peaks", &arg_file.display().to_string(), "--max-peaks", "1"])
        .ok();
    assert!(cmd.is_ok(), "{:?}", get_cmd_output(cmd));

    let json = read_json(&output);
    assert_eq!(json[0]["centroids"].as_array().unwrap().len(), 1);
    // Too few peaks to match both energies.
    assert_eq!(json[0]["scaled_fwhms"].as_array().unwrap().len(), 0);

    // Without the override, both peaks are found and scaled.
    let cmd = mca_calibrate()
        .args(["peaks", &arg_file.display().to_string()])
        .ok();
    assert!(cmd.is_ok(), "{:?}", get_cmd_output(cmd));
    let json = read_json(&output);
    let fwhms = json[0]["fwhms"].as_array().unwrap();
    let scaled = json[0]["scaled_fwhms"].as_array().unwrap();
    assert_eq!(scaled.len(), 2);
    let expected = fwhms[0].as_f64().unwrap() * 6.0;
    assert!((scaled[0].as_f64().unwrap() - expected).abs() < 1e-9);
}

#[test]
fn test_peaks_dry_run_and_save_toml() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let spectrum = write_spectrum(&tmp_dir, "element.txt", &[(400.0, 6.0, 2000.0)]);
    let output = tmp_dir.path().join("peaks.json");
    let saved = tmp_dir.path().join("saved.toml");

    #[rustfmt::skip]
    let cmd = mca_calibrate()
        .args([
            "peaks",
            "--spectra", &spectrum.display().to_string(),
            "--background-range-min", "100",
            "--background-range-max", "200",
            "--noise-multiplier", "4",
            "--output", &output.display().to_string(),
            "--dry-run",
            "--save-toml", &saved.display().to_string(),
        ])
        .ok();
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Dry run -- exiting now."));
    assert!(!output.exists());
    assert!(saved.exists());

    // The saved arguments reproduce the run.
    let cmd = mca_calibrate()
        .args(["peaks", &saved.display().to_string()])
        .ok();
    assert!(cmd.is_ok(), "{:?}", get_cmd_output(cmd));
    assert!(output.exists());
    let centroid = read_json(&output)[0]["centroids"][0].as_u64().unwrap();
    assert!((399..=401).contains(&centroid));
}

#[test]
fn test_peaks_missing_background_range() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let spectrum = write_spectrum(&tmp_dir, "element.txt", &[(400.0, 6.0, 2000.0)]);

    let cmd = mca_calibrate()
        .args(["peaks", "--spectra", &spectrum.display().to_string()])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Error:"));
    assert!(stderr.contains("background range"), "{stderr}");
}

#[test]
fn test_peaks_bad_spectrum() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let spectrum = tmp_dir.path().join("bad.txt");
    std::fs::write(&spectrum, "1 2 three 4\n").unwrap();

    #[rustfmt::skip]
    let cmd = mca_calibrate()
        .args([
            "peaks",
            "--spectra", &spectrum.display().to_string(),
            "--background-range-min", "0",
            "--background-range-max", "2",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("three"), "{stderr}");
}
