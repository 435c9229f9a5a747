// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with reading spectra.

use thiserror::Error;

use crate::spectrum::SpectrumError;

#[derive(Error, Debug)]
pub enum SpectrumReadError {
    #[error("When reading {file}, couldn't parse '{token}' on line {line} as a count")]
    ParseCount {
        file: String,
        line: usize,
        token: String,
    },

    #[error("Couldn't decode a json array of counts from {file}: {err}")]
    Json {
        file: String,
        err: serde_json::Error,
    },

    #[error("The spectrum in {file} is unusable: {err}")]
    Spectrum { file: String, err: SpectrumError },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
