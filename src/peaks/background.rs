// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Background estimation around peaks.

use std::ops::Range;

use crate::{constants::BACKGROUND_FLOOR, spectrum::WindowStats};

/// The background level of a spectrum and the ceiling below which a channel is
/// considered to be background.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Background {
    /// The mean count of the background window, plus a small floor.
    pub(crate) level: f64,

    /// `level` plus some multiple of the background window's standard
    /// deviation.
    pub(crate) ceiling: f64,
}

impl Background {
    pub(crate) fn estimate(
        smoothed: &[f64],
        range: Range<usize>,
        noise_multiplier: f64,
    ) -> Background {
        let WindowStats { mean, std_dev } = WindowStats::over(smoothed, range);
        let level = mean + BACKGROUND_FLOOR;
        Background {
            level,
            ceiling: level + noise_multiplier * std_dev,
        }
    }
}

/// Scan outward from `peak_index` for the nearest channel on each side whose
/// value is at or below `ceiling`. The low channel may be the peak itself, as
/// may the high channel, in which case the returned window is empty.
///
/// If no channel on a side is at or below the ceiling, the ends of the spectrum
/// bound the window instead.
pub(crate) fn fit_window(working: &[f64], peak_index: usize, ceiling: f64) -> Range<usize> {
    let low = (0..=peak_index)
        .rev()
        .find(|&i| working[i] <= ceiling)
        .unwrap_or(0);
    let high = (peak_index..working.len())
        .find(|&i| working[i] <= ceiling)
        .unwrap_or(working.len() - 1);
    low..high
}

/// A straight line over `window`, starting at the value of the first channel
/// of the window and ending at the value of the channel just past it.
pub(crate) fn linear_baseline(working: &[f64], window: &Range<usize>) -> Vec<f64> {
    let num_points = window.len();
    match num_points {
        0 => vec![],
        1 => vec![working[window.start]],
        _ => {
            let start = working[window.start];
            let end = working[window.end];
            let step = (end - start) / (num_points - 1) as f64;
            let mut line: Vec<f64> = (0..num_points).map(|i| start + step * i as f64).collect();
            // Land exactly on the end value.
            line[num_points - 1] = end;
            line
        }
    }
}
