// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with peak-search configuration.

use thiserror::Error;

/// A [`super::SearchConfig`] that can't be used with a spectrum. These are
/// detected before any search work begins.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchConfigError {
    #[error("The peak search range [{min}, {max}) is empty; the maximum channel must be greater than the minimum")]
    EmptyChannelRange { min: usize, max: usize },

    #[error("The peak search range ends at channel {max}, but the spectrum only has {len} channels")]
    ChannelRangeOutOfBounds { max: usize, len: usize },

    #[error("The background range [{start}, {end}) is empty")]
    EmptyBackgroundRange { start: usize, end: usize },

    #[error("The background range ends at channel {end}, but the spectrum only has {len} channels")]
    BackgroundRangeOutOfBounds { end: usize, len: usize },

    #[error("The noise multiplier must be finite and non-negative, but got {0}")]
    InvalidNoiseMultiplier(f64),
}
