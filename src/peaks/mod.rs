// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Iterative multi-peak extraction.
//!
//! The strongest remaining feature of a spectrum is located, modelled as a
//! Gaussian on a linear background, and replaced by that background before the
//! next feature is searched for. The search stops as soon as any stop condition
//! fires; finding fewer peaks than requested is not an error.

mod background;
mod error;
mod gaussian;

pub use error::SearchConfigError;
pub use gaussian::gaussian;

use std::ops::Range;

use log::debug;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::{
    constants::{
        CENTRE_HALF_SPAN, DEFAULT_MAX_ITERATIONS, DEFAULT_NOISE_MULTIPLIER, MIN_CROSSING_CHANNELS,
        MIN_PEAK_TO_BACKGROUND, MIN_TOTAL_COUNTS, MIN_WORKING_WIDTH, SMOOTHING_WINDOW,
        WIDTH_HALF_SPAN, WIDTH_MARGIN,
    },
    spectrum::Spectrum,
};
use background::{fit_window, linear_baseline, Background};
use gaussian::{grid_search, FitTarget};

/// Parameters of a peak search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// The number of peaks to look for.
    pub max_peaks: usize,

    /// The first channel searched.
    pub channel_range_min: usize,

    /// One past the last channel searched.
    pub channel_range_max: usize,

    /// Channels assumed to contain no peak. Channels below the start of this
    /// range are never searched.
    pub background_range: Range<usize>,

    /// The number of background standard deviations above the background
    /// level that a channel must exceed to be part of a peak.
    pub noise_multiplier: f64,

    /// A hard stop on the number of search iterations, independent of
    /// `max_peaks`.
    pub max_iterations: usize,
}

impl SearchConfig {
    /// A configuration with the default noise multiplier and iteration limit.
    pub fn new(
        max_peaks: usize,
        channel_range: Range<usize>,
        background_range: Range<usize>,
    ) -> SearchConfig {
        SearchConfig {
            max_peaks,
            channel_range_min: channel_range.start,
            channel_range_max: channel_range.end,
            background_range,
            noise_multiplier: DEFAULT_NOISE_MULTIPLIER,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_noise_multiplier(self, noise_multiplier: f64) -> SearchConfig {
        SearchConfig {
            noise_multiplier,
            ..self
        }
    }

    pub fn with_max_iterations(self, max_iterations: usize) -> SearchConfig {
        SearchConfig {
            max_iterations,
            ..self
        }
    }

    pub fn channel_range(&self) -> Range<usize> {
        self.channel_range_min..self.channel_range_max
    }

    /// Check that this configuration can be used on a spectrum with
    /// `spectrum_len` channels.
    pub fn validate(&self, spectrum_len: usize) -> Result<(), SearchConfigError> {
        if self.channel_range_max <= self.channel_range_min {
            return Err(SearchConfigError::EmptyChannelRange {
                min: self.channel_range_min,
                max: self.channel_range_max,
            });
        }
        if self.channel_range_max > spectrum_len {
            return Err(SearchConfigError::ChannelRangeOutOfBounds {
                max: self.channel_range_max,
                len: spectrum_len,
            });
        }
        if self.background_range.is_empty() {
            return Err(SearchConfigError::EmptyBackgroundRange {
                start: self.background_range.start,
                end: self.background_range.end,
            });
        }
        if self.background_range.end > spectrum_len {
            return Err(SearchConfigError::BackgroundRangeOutOfBounds {
                end: self.background_range.end,
                len: spectrum_len,
            });
        }
        if !self.noise_multiplier.is_finite() || self.noise_multiplier < 0.0 {
            return Err(SearchConfigError::InvalidNoiseMultiplier(
                self.noise_multiplier,
            ));
        }

        Ok(())
    }
}

/// A peak found by the search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    /// The channel holding the maximum of the fitted model.
    pub centroid_channel: usize,

    /// The full width at half maximum of the fitted model, i.e. the number of
    /// model samples at or above half the model's maximum.
    pub fwhm_channels: f64,

    /// The sigma of the accepted Gaussian [channels].
    pub sigma_channels: f64,

    /// The fitted background + Gaussian values over `window`.
    pub model_curve: Vec<f64>,

    /// The background-crossing channels the model was fitted on.
    pub window: Range<usize>,
}

/// Why a peak search stopped.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The requested number of peaks were found.
    #[strum(to_string = "found all requested peaks")]
    FoundAll,

    /// Too few counts remained in the search range.
    #[strum(to_string = "not enough counts in the spectrum")]
    InsufficientCounts,

    /// Nothing remaining rose clearly above the background.
    #[strum(to_string = "no feature rises clearly above the background")]
    NoSignificantPeak,

    /// The iteration limit was reached.
    #[strum(to_string = "reached the iteration limit")]
    IterationLimit,

    /// The strongest remaining feature was too narrow to model.
    #[strum(to_string = "peak width or number of centres is insufficient")]
    DegenerateGeometry,
}

/// The result of a peak search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakSearch {
    /// Strongest first.
    pub peaks: Vec<Peak>,
    pub stop_reason: StopReason,
    pub iterations: usize,
}

impl PeakSearch {
    pub fn centroids(&self) -> Vec<usize> {
        self.peaks.iter().map(|p| p.centroid_channel).collect()
    }

    pub fn fwhms(&self) -> Vec<f64> {
        self.peaks.iter().map(|p| p.fwhm_channels).collect()
    }
}

/// Extracts peaks from spectra with a fixed configuration. An extractor holds
/// no state between calls, so one may be shared between threads.
#[derive(Debug, Clone)]
pub struct PeakExtractor {
    config: SearchConfig,
}

impl PeakExtractor {
    pub fn new(config: SearchConfig) -> PeakExtractor {
        PeakExtractor { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Search `spectrum` for peaks. The configuration is validated against the
    /// spectrum before any searching is done.
    pub fn extract(&self, spectrum: &Spectrum) -> Result<PeakSearch, SearchConfigError> {
        self.config.validate(spectrum.len())?;

        let mut search = Search::new(spectrum, &self.config);
        let mut state = SearchState::Searching;
        let stop_reason = loop {
            state = match state {
                SearchState::Searching => match search.stop_condition() {
                    Some(reason) => SearchState::Exhausted(reason),
                    None => search.step(),
                },
                SearchState::Found => SearchState::Searching,
                SearchState::Exhausted(reason) => break reason,
                SearchState::Degenerate => break StopReason::DegenerateGeometry,
            };
        };
        debug!(
            "Peak search stopped after {} iterations with {} peak(s): {stop_reason}",
            search.iterations,
            search.peaks.len()
        );

        Ok(PeakSearch {
            peaks: search.peaks,
            stop_reason,
            iterations: search.iterations,
        })
    }
}

/// Search `spectrum` for at most `config.max_peaks` peaks, strongest first.
pub fn extract(spectrum: &Spectrum, config: &SearchConfig) -> Result<Vec<Peak>, SearchConfigError> {
    PeakExtractor::new(config.clone())
        .extract(spectrum)
        .map(|s| s.peaks)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SearchState {
    /// About to check the stop conditions.
    Searching,
    /// A peak was just found and subtracted.
    Found,
    /// A stop condition fired.
    Exhausted(StopReason),
    /// The strongest remaining feature can't be modelled.
    Degenerate,
}

/// The state of one peak search. The working buffer belongs to this search
/// alone.
struct Search<'a> {
    config: &'a SearchConfig,
    working: Vec<f64>,
    background: Background,
    peaks: Vec<Peak>,
    iterations: usize,
}

impl<'a> Search<'a> {
    fn new(spectrum: &Spectrum, config: &'a SearchConfig) -> Search<'a> {
        let smoothed = spectrum.smoothed(SMOOTHING_WINDOW);
        let background = Background::estimate(
            &smoothed,
            config.background_range.clone(),
            config.noise_multiplier,
        );
        debug!(
            "Background level {:.3}, significance ceiling {:.3}",
            background.level, background.ceiling
        );

        let first_searched = config
            .channel_range_min
            .max(config.background_range.start);
        let working = smoothed
            .into_iter()
            .enumerate()
            .map(|(i, c)| {
                if i < first_searched || i >= config.channel_range_max {
                    0.0
                } else {
                    c
                }
            })
            .collect();

        Search {
            config,
            working,
            background,
            peaks: Vec::with_capacity(config.max_peaks),
            iterations: 0,
        }
    }

    /// Check the stop conditions in order.
    fn stop_condition(&self) -> Option<StopReason> {
        if self.peaks.len() >= self.config.max_peaks {
            return Some(StopReason::FoundAll);
        }
        if self.working.iter().sum::<f64>() < MIN_TOTAL_COUNTS {
            return Some(StopReason::InsufficientCounts);
        }
        let (_, tallest) = argmax(&self.working);
        if tallest < MIN_PEAK_TO_BACKGROUND * self.background.level {
            return Some(StopReason::NoSignificantPeak);
        }
        if self.iterations >= self.config.max_iterations {
            return Some(StopReason::IterationLimit);
        }
        None
    }

    /// Model and subtract the strongest remaining feature.
    fn step(&mut self) -> SearchState {
        let (peak_index, peak_value) = argmax(&self.working);
        debug!(
            "Search iteration {}: candidate channel {peak_index} ({peak_value:.1} counts)",
            self.iterations
        );

        let (lows, highs) = half_max_crossings(&self.working, peak_index, peak_value);
        let width = lows.len().min(highs.len()) + WIDTH_MARGIN;
        let centres: Vec<usize> = lows.into_iter().chain(highs).collect();
        if centres.len() < MIN_CROSSING_CHANNELS || width < MIN_WORKING_WIDTH {
            debug!(
                "Channel {peak_index}: {} crossing channels, working width {width}",
                centres.len()
            );
            return SearchState::Degenerate;
        }

        let window = fit_window(&self.working, peak_index, self.background.ceiling);
        if window.is_empty() {
            debug!("Channel {peak_index} doesn't rise above the significance ceiling");
            return SearchState::Degenerate;
        }
        let baseline = linear_baseline(&self.working, &window);

        let mid = (centres.len() + 1) / 2;
        let candidates = &centres[mid - CENTRE_HALF_SPAN..(mid + CENTRE_HALF_SPAN).min(centres.len())];
        let widths = width - WIDTH_HALF_SPAN..width + WIDTH_HALF_SPAN;
        let target = FitTarget {
            observed: &self.working[window.clone()],
            window: window.clone(),
            baseline: &baseline,
            height: peak_value,
        };
        let fit = match grid_search(&target, candidates, widths) {
            Some(f) => f,
            None => return SearchState::Degenerate,
        };

        debug!(
            "Best model: centre {}, sigma {} (residual {:.3})",
            fit.centre, fit.sigma, fit.residual
        );
        let (model_peak, model_max) = argmax(&fit.curve);
        let fwhm = fit.curve.iter().filter(|&&c| c >= 0.5 * model_max).count();
        let peak = Peak {
            centroid_channel: model_peak + window.start,
            fwhm_channels: fwhm as f64,
            sigma_channels: fit.sigma,
            model_curve: fit.curve,
            window: window.clone(),
        };
        debug!(
            "Peak centre is {} (FWHM {} channels, window [{}, {}))",
            peak.centroid_channel, peak.fwhm_channels, window.start, window.end
        );

        self.working[window].copy_from_slice(&baseline);
        self.peaks.push(peak);
        self.iterations += 1;
        SearchState::Found
    }
}

/// The first index of the maximum value, and that value. An empty slice gives
/// (0, -inf).
fn argmax(values: &[f64]) -> (usize, f64) {
    values
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(i_max, max), (i, v)| {
            if v > max {
                (i, v)
            } else {
                (i_max, max)
            }
        })
}

/// The contiguous channels either side of `peak_index` whose values are at
/// least half of `peak_value`. Both runs include the peak channel and are in
/// ascending channel order.
fn half_max_crossings(
    working: &[f64],
    peak_index: usize,
    peak_value: f64,
) -> (Vec<usize>, Vec<usize>) {
    let half = 0.5 * peak_value;
    let low_start = (0..=peak_index)
        .rev()
        .take_while(|&i| working[i] >= half)
        .last()
        .unwrap_or(peak_index + 1);
    let high_end = (peak_index..working.len())
        .take_while(|&i| working[i] >= half)
        .last()
        .map(|i| i + 1)
        .unwrap_or(peak_index);
    (
        (low_start..=peak_index).collect(),
        (peak_index..high_end).collect(),
    )
}
