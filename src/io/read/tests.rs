// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::io::Write;

use tempfile::Builder;

use super::*;
use crate::spectrum::SpectrumError;

#[test]
fn test_parse_text_counts() {
    let contents = "# channel counts from element 1\n1 2 3\n4,5, 6\n\n  7.5\t8\n";
    let counts = parse_text_counts(contents).unwrap();
    assert_eq!(counts, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.5, 8.0]);
}

#[test]
fn test_parse_text_counts_bad_token() {
    let result = parse_text_counts("1 2\n3 four\n");
    assert_eq!(result, Err((2, "four".to_string())));
}

#[test]
fn test_file_types() {
    assert_eq!(
        SpectrumFileType::from_path(Path::new("a/b.JSON")),
        SpectrumFileType::Json
    );
    assert_eq!(
        SpectrumFileType::from_path(Path::new("a/b.txt")),
        SpectrumFileType::Text
    );
    assert_eq!(
        SpectrumFileType::from_path(Path::new("spectrum")),
        SpectrumFileType::Text
    );
}

#[test]
fn test_read_json_spectrum() {
    let mut f = Builder::new().suffix(".json").tempfile().unwrap();
    write!(f, "[0, 1.5, 3]").unwrap();
    let spectrum = read_spectrum_file(f.path()).unwrap();
    assert_eq!(spectrum.counts(), &[0.0, 1.5, 3.0]);
}

#[test]
fn test_read_text_spectrum() {
    let mut f = Builder::new().suffix(".txt").tempfile().unwrap();
    writeln!(f, "10\n20\n30").unwrap();
    let spectrum = read_spectrum_file(f.path()).unwrap();
    assert_eq!(spectrum.len(), 3);
}

#[test]
fn test_read_empty_spectrum() {
    let mut f = Builder::new().suffix(".txt").tempfile().unwrap();
    writeln!(f, "# nothing here").unwrap();
    let result = read_spectrum_file(f.path());
    assert!(matches!(
        result,
        Err(SpectrumReadError::Spectrum {
            err: SpectrumError::Empty,
            ..
        })
    ));
}

#[test]
fn test_read_negative_counts() {
    let mut f = Builder::new().suffix(".json").tempfile().unwrap();
    write!(f, "[1, -2]").unwrap();
    let result = read_spectrum_file(f.path());
    assert!(matches!(
        result,
        Err(SpectrumReadError::Spectrum {
            err: SpectrumError::InvalidCount { channel: 1, .. },
            ..
        })
    ));
}

#[test]
fn test_read_bad_json() {
    let mut f = Builder::new().suffix(".json").tempfile().unwrap();
    write!(f, "{{\"counts\": [1]}}").unwrap();
    assert!(matches!(
        read_spectrum_file(f.path()),
        Err(SpectrumReadError::Json { .. })
    ));
}
