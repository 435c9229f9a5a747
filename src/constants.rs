// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. Counts are smoothed and fitted as
`f64`s; only channel indices are integers.
 */

/// The number of samples in the moving average used to smooth spectra before
/// searching.
pub const SMOOTHING_WINDOW: usize = 3;

/// Added to the mean background so that spectra with an empty background window
/// don't have a zero background level.
pub const BACKGROUND_FLOOR: f64 = 1.0;

/// If the remaining counts in the search range are fewer than this, the search
/// stops.
pub const MIN_TOTAL_COUNTS: f64 = 50.0;

/// The tallest remaining value must be at least this many times the background
/// level for the search to continue.
pub const MIN_PEAK_TO_BACKGROUND: f64 = 3.0;

/// Peaks with fewer half-maximum crossing channels than this can't be modelled.
pub const MIN_CROSSING_CHANNELS: usize = 7;

/// Peaks with a working width smaller than this can't be modelled.
pub const MIN_WORKING_WIDTH: usize = 5;

/// Added to the smaller of the two half-maximum side widths to get the working
/// width.
pub const WIDTH_MARGIN: usize = 2;

/// Half of the number of candidate centres tried by the grid search.
pub const CENTRE_HALF_SPAN: usize = 3;

/// Widths in `[working width - WIDTH_HALF_SPAN, working width + WIDTH_HALF_SPAN)`
/// are tried by the grid search.
pub const WIDTH_HALF_SPAN: usize = 5;

/// The default maximum number of search iterations.
pub const DEFAULT_MAX_ITERATIONS: usize = 7;

/// The default number of background standard deviations defining the
/// significance ceiling.
pub const DEFAULT_NOISE_MULTIPLIER: f64 = 5.0;

/// The detector's channel-to-keV convention used in the gain formula.
pub const CHANNELS_PER_KEV_SCALE: f64 = 100.0;

/// The default previous amplifier gain.
pub const DEFAULT_PREVIOUS_GAIN: f64 = 1.0;

/// The most reference energies the two-point gain calibration can use.
pub const MAX_GAIN_ENERGIES: usize = 2;

/// The FWHM of a Gaussian divided by its sigma (2 sqrt(2 ln 2)).
pub const FWHM_PER_SIGMA: f64 = 2.354_820_045_030_949_3;
