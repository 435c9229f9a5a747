// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests against the command-line interface for gain calibration.

use approx::assert_abs_diff_eq;
use indoc::formatdoc;

use crate::*;

#[test]
fn test_gain_single_energy() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let spectrum = write_spectrum(&tmp_dir, "element.txt", &[(512.0, 6.0, 2000.0)]);
    let output = tmp_dir.path().join("gains.json");

    #[rustfmt::skip]
    let cmd = mca_calibrate()
        .args([
            "gain",
            "--spectra", &spectrum.display().to_string(),
            "--energies", "5.9",
            "--background-range-min", "100",
            "--background-range-max", "200",
            "--output", &output.display().to_string(),
        ])
        .ok();
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
    assert!(stdout.contains("new gain"));

    let json = read_json(&output);
    let report = &json[0];
    let centroid = report["centroids"][0].as_u64().unwrap();
    assert!((511..=513).contains(&centroid));
    assert_abs_diff_eq!(
        report["gain"].as_f64().unwrap(),
        centroid as f64 / 590.0,
        epsilon = 1e-12
    );
    assert_abs_diff_eq!(report["previous_gain"].as_f64().unwrap(), 1.0);
    // The lone match is anchored to the origin.
    assert_eq!(report["pairs"][0]["channel"], 0);
    assert_eq!(report["pairs"][1]["channel"].as_u64().unwrap(), centroid);
}

#[test]
fn test_gain_arg_file_with_cli_previous_gain() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let spectra = [
        write_spectrum(&tmp_dir, "a.txt", &[(512.0, 6.0, 2000.0)]),
        write_spectrum(&tmp_dir, "b.json", &[(512.0, 6.0, 2000.0)]),
    ];
    let output = tmp_dir.path().join("gains.json");
    let arg_file = tmp_dir.path().join("args.json");
    {
        let mut f = File::create(&arg_file).unwrap();
        write!(
            f,
            "{}",
            formatdoc! {r#"
                {{
                    "previous_gains": [1.0, 3.0],
                    "output": "{output}",
                    "search": {{
                        "spectra": ["{a}", "{b}"],
                        "energies": [5.9],
                        "background_range_min": 100,
                        "background_range_max": 200
                    }}
                }}
            "#,
                output = output.display(),
                a = spectra[0].display(),
                b = spectra[1].display(),
            }
        )
        .unwrap();
    }

    let cmd = mca_calibrate()
        .args(["gain", &arg_file.display().to_string()])
        .ok();
    assert!(cmd.is_ok(), "{:?}", get_cmd_output(cmd));
    let json = read_json(&output);
    let first = json[0]["gain"].as_f64().unwrap();
    assert_abs_diff_eq!(json[1]["gain"].as_f64().unwrap(), 3.0 * first, epsilon = 1e-12);

    // A single CLI gain overrides the file and applies to both elements.
    let cmd = mca_calibrate()
        .args([
            "gain",
            &arg_file.display().to_string(),
            "--previous-gains",
            "2",
        ])
        .ok();
    assert!(cmd.is_ok(), "{:?}", get_cmd_output(cmd));
    let json = read_json(&output);
    for report in json.as_array().unwrap() {
        assert_abs_diff_eq!(report["previous_gain"].as_f64().unwrap(), 2.0);
        assert_abs_diff_eq!(report["gain"].as_f64().unwrap(), 2.0 * first, epsilon = 1e-12);
    }
}

#[test]
fn test_gain_unmatched_element_warns() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let good = write_spectrum(&tmp_dir, "good.txt", &[(512.0, 6.0, 2000.0)]);
    let flat = write_spectrum(&tmp_dir, "flat.txt", &[]);
    let output = tmp_dir.path().join("gains.json");

    #[rustfmt::skip]
    let cmd = mca_calibrate()
        .args([
            "gain",
            "--spectra", &good.display().to_string(), &flat.display().to_string(),
            "--energies", "5.9",
            "--background-range-min", "100",
            "--background-range-max", "200",
            "--output", &output.display().to_string(),
        ])
        .ok();
    // An element without a gain isn't a failure.
    assert!(cmd.is_ok(), "{:?}", get_cmd_output(cmd));
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("no gain derived"));

    let json = read_json(&output);
    assert!(json[0]["gain"].is_f64());
    assert!(json[1]["gain"].is_null());
    assert_eq!(json[1]["pairs"].as_array().unwrap().len(), 0);
}

#[test]
fn test_gain_requires_energies() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let spectrum = write_spectrum(&tmp_dir, "element.txt", &[(512.0, 6.0, 2000.0)]);

    #[rustfmt::skip]
    let cmd = mca_calibrate()
        .args([
            "gain",
            "--spectra", &spectrum.display().to_string(),
            "--background-range-min", "100",
            "--background-range-max", "200",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("No reference energies"), "{stderr}");
}

#[test]
fn test_gain_rejects_three_energies() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let spectrum = write_spectrum(&tmp_dir, "element.txt", &[(512.0, 6.0, 2000.0)]);

    #[rustfmt::skip]
    let cmd = mca_calibrate()
        .args([
            "gain",
            "--spectra", &spectrum.display().to_string(),
            "--energies", "1", "2", "3",
            "--background-range-min", "100",
            "--background-range-max", "200",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("At most 2 reference energies"), "{stderr}");
}
