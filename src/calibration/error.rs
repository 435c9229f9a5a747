// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("A gain calibration needs exactly 2 calibration pairs, but {0} were supplied")]
    PairCount(usize),

    #[error("The calibration energies {first} keV and {second} keV don't define a usable energy separation")]
    EnergySeparation { first: f64, second: f64 },

    #[error("The previous gain must be finite, but got {0}")]
    InvalidPreviousGain(f64),
}
