// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! One-dimensional spectral histograms (channel index -> counts), and the
//! helpers used to condition them before a peak search.

mod error;

pub use error::SpectrumError;

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A spectrum read from a single detector element. The counts are never
/// modified; anything that needs to change them works on its own copy.
///
/// A `Spectrum` always has at least one channel, and every count is finite and
/// non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Spectrum {
    counts: Vec<f64>,
}

impl Spectrum {
    pub fn new(counts: Vec<f64>) -> Result<Spectrum, SpectrumError> {
        if counts.is_empty() {
            return Err(SpectrumError::Empty);
        }
        if let Some((channel, &value)) = counts
            .iter()
            .enumerate()
            .find(|(_, c)| !c.is_finite() || **c < 0.0)
        {
            return Err(SpectrumError::InvalidCount { channel, value });
        }

        Ok(Spectrum { counts })
    }

    /// The number of channels.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    /// A smoothed copy of the counts. See [`moving_average`].
    pub fn smoothed(&self, window: usize) -> Vec<f64> {
        moving_average(&self.counts, window)
    }
}

impl TryFrom<Vec<f64>> for Spectrum {
    type Error = SpectrumError;

    fn try_from(counts: Vec<f64>) -> Result<Self, Self::Error> {
        Spectrum::new(counts)
    }
}

impl From<Spectrum> for Vec<f64> {
    fn from(s: Spectrum) -> Self {
        s.counts
    }
}

/// Centred moving average of `window` samples. Samples closer to either end
/// than half the window keep their original value, so the ends of a spectrum
/// aren't dragged towards zero. Even windows are treated as the next odd
/// window down; a window of 0 or 1 returns the input unchanged.
pub fn moving_average(counts: &[f64], window: usize) -> Vec<f64> {
    let half = window.saturating_sub(1) / 2;
    let mut smoothed = counts.to_vec();
    if half == 0 || counts.len() <= 2 * half {
        return smoothed;
    }

    let norm = (2 * half + 1) as f64;
    for (i, s) in smoothed
        .iter_mut()
        .enumerate()
        .take(counts.len() - half)
        .skip(half)
    {
        *s = counts[i - half..=i + half].iter().sum::<f64>() / norm;
    }
    smoothed
}

/// The mean and (population) standard deviation of some channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    pub mean: f64,
    pub std_dev: f64,
}

impl WindowStats {
    /// Statistics over `range` of `counts`. The range is clamped to the
    /// available channels; an empty range has zero mean and deviation.
    pub fn over(counts: &[f64], range: Range<usize>) -> WindowStats {
        let end = range.end.min(counts.len());
        let start = range.start.min(end);
        let window = &counts[start..end];
        if window.is_empty() {
            return WindowStats {
                mean: 0.0,
                std_dev: 0.0,
            };
        }

        let n = window.len() as f64;
        let mean = window.iter().sum::<f64>() / n;
        let variance = window.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / n;
        WindowStats {
            mean,
            std_dev: variance.sqrt(),
        }
    }
}
