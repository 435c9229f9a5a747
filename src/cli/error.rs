// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all mca_calibrate-related errors. This should be the *only*
//! error enum that is publicly visible from the command-line interface.

use thiserror::Error;

use super::common::SearchArgsError;
use crate::{
    calibration::CalibrationError,
    io::{FileWriteError, SpectrumReadError},
    peaks::SearchConfigError,
};

/// The *only* publicly visible error from the command-line interface. Variants
/// group errors by topic.
#[derive(Error, Debug)]
pub enum McaCalError {
    /// An error related to peak-search parameters.
    #[error("{0}\n\nCheck the search range, background range and noise multiplier.")]
    Search(String),

    /// An error related to matching peaks and energies, or computing gains.
    #[error("{0}")]
    Calibration(String),

    /// An error related to reading spectra.
    #[error("{0}\n\nSpectra must be json arrays of counts (.json), or text with counts separated by whitespace or commas.")]
    SpectrumRead(String),

    /// An error related to writing results.
    #[error("{0}")]
    FileWrite(String),

    /// An error related to argument files.
    #[error("{0}")]
    ArgFile(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<SearchArgsError> for McaCalError {
    fn from(e: SearchArgsError) -> Self {
        let s = e.to_string();
        match e {
            SearchArgsError::NoSpectra
            | SearchArgsError::NoBackgroundRange
            | SearchArgsError::InvalidRange { .. } => Self::Search(s),
            SearchArgsError::NoEnergies
            | SearchArgsError::InvalidEnergy(_)
            | SearchArgsError::TooManyEnergies { .. }
            | SearchArgsError::EnergySeparation { .. }
            | SearchArgsError::PreviousGainCount { .. } => Self::Calibration(s),
        }
    }
}

impl From<SearchConfigError> for McaCalError {
    fn from(e: SearchConfigError) -> Self {
        Self::Search(e.to_string())
    }
}

impl From<CalibrationError> for McaCalError {
    fn from(e: CalibrationError) -> Self {
        Self::Calibration(e.to_string())
    }
}

impl From<SpectrumReadError> for McaCalError {
    fn from(e: SpectrumReadError) -> Self {
        match e {
            SpectrumReadError::IO(e) => Self::from(e),
            _ => Self::SpectrumRead(e.to_string()),
        }
    }
}

impl From<FileWriteError> for McaCalError {
    fn from(e: FileWriteError) -> Self {
        match e {
            FileWriteError::IO(e) => Self::from(e),
            _ => Self::FileWrite(e.to_string()),
        }
    }
}

impl From<std::io::Error> for McaCalError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
