// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Reading spectra saved as plain numeric arrays.
//!
//! `.json` files must hold a single array of counts. Anything else is treated
//! as text: counts separated by whitespace and/or commas, with lines starting
//! with `#` ignored.

mod error;
#[cfg(test)]
mod tests;

pub use error::SpectrumReadError;

use std::path::Path;

use log::{debug, trace};

use crate::spectrum::Spectrum;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SpectrumFileType {
    Json,
    Text,
}

impl SpectrumFileType {
    pub(crate) fn from_path(file: &Path) -> SpectrumFileType {
        match file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("json") => SpectrumFileType::Json,
            _ => SpectrumFileType::Text,
        }
    }
}

/// Read a spectrum from `file`.
pub fn read_spectrum_file(file: &Path) -> Result<Spectrum, SpectrumReadError> {
    debug!("Reading spectrum from {}", file.display());
    let contents = std::fs::read_to_string(file)?;
    let file_str = || file.display().to_string();

    let counts = match SpectrumFileType::from_path(file) {
        SpectrumFileType::Json => {
            serde_json::from_str::<Vec<f64>>(&contents).map_err(|err| SpectrumReadError::Json {
                file: file_str(),
                err,
            })?
        }
        SpectrumFileType::Text => parse_text_counts(&contents).map_err(|(line, token)| {
            SpectrumReadError::ParseCount {
                file: file_str(),
                line,
                token,
            }
        })?,
    };
    trace!("{} channels in {}", counts.len(), file.display());

    Spectrum::new(counts).map_err(|err| SpectrumReadError::Spectrum {
        file: file_str(),
        err,
    })
}

/// Parse text counts. On failure, the 1-based line number and offending token
/// are returned.
pub(crate) fn parse_text_counts(contents: &str) -> Result<Vec<f64>, (usize, String)> {
    let mut counts = vec![];
    for (i_line, line) in contents.lines().enumerate() {
        if line.trim_start().starts_with('#') {
            continue;
        }
        for token in line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
        {
            let count = token
                .parse::<f64>()
                .map_err(|_| (i_line + 1, token.to_string()))?;
            counts.push(count);
        }
    }
    Ok(counts)
}
