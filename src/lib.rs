// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Peak extraction and gain calibration for multichannel-analyser (MCA) spectra.

Spectra are searched iteratively for their strongest peaks ([`peaks`]), which
are then paired with known reference energies to derive a new amplifier gain
([`calibration`]).
 */

pub mod calibration;
mod cli;
pub mod constants;
pub mod io;
pub mod peaks;
pub mod spectrum;

// Re-exports.
pub use calibration::{calibrate, compute_gain, match_peaks, CalibrationPair, GainResult};
pub use cli::{McaCalError, McaCalibrate};
pub use peaks::{extract, Peak, PeakExtractor, PeakSearch, SearchConfig, StopReason};
pub use spectrum::Spectrum;
