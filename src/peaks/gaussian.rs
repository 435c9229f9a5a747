// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A brute-force Gaussian model search over candidate centres and widths.

use std::ops::Range;

use log::trace;

/// `height * exp(-(x - centre)^2 / (2 sigma^2))`
#[inline]
pub fn gaussian(height: f64, x: f64, centre: f64, sigma: f64) -> f64 {
    height * (-(x - centre).powi(2) / (2.0 * sigma * sigma)).exp()
}

/// The best background + Gaussian model found by [`grid_search`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GaussianFit {
    pub(crate) centre: usize,
    pub(crate) sigma: f64,
    /// The model over the fit window, rescaled to the observed maximum.
    pub(crate) curve: Vec<f64>,
    pub(crate) residual: f64,
}

/// Everything the grid search compares models against.
pub(crate) struct FitTarget<'a> {
    /// The observed values over the fit window.
    pub(crate) observed: &'a [f64],
    /// The channels of the fit window.
    pub(crate) window: Range<usize>,
    /// The background baseline over the fit window.
    pub(crate) baseline: &'a [f64],
    /// The height of the synthesised Gaussians before rescaling.
    pub(crate) height: f64,
}

impl FitTarget<'_> {
    /// Synthesise a model and get its residual sum of squares against the
    /// observed values. `None` if the model can't be rescaled.
    fn model(&self, centre: usize, sigma: f64, observed_max: f64) -> Option<(Vec<f64>, f64)> {
        let mut curve: Vec<f64> = self
            .window
            .clone()
            .zip(self.baseline)
            .map(|(x, b)| gaussian(self.height, x as f64, centre as f64, sigma) + b)
            .collect();
        let model_max = curve.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if model_max <= 0.0 || !model_max.is_finite() {
            return None;
        }

        let scale = observed_max / model_max;
        curve.iter_mut().for_each(|c| *c *= scale);
        let residual = self
            .observed
            .iter()
            .zip(curve.iter())
            .map(|(o, m)| (o - m).powi(2))
            .sum();
        Some((curve, residual))
    }
}

/// Try every (centre, width) pair, with the widths used directly as sigma, and
/// keep the model with the smallest residual. The first minimum encountered
/// wins ties; centres are the outer loop. Widths below 1 are skipped.
pub(crate) fn grid_search(
    target: &FitTarget,
    centres: &[usize],
    widths: Range<usize>,
) -> Option<GaussianFit> {
    let observed_max = target
        .observed
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);

    let mut best: Option<GaussianFit> = None;
    for &centre in centres {
        for width in widths.clone().filter(|&w| w >= 1) {
            let sigma = width as f64;
            let (curve, residual) = match target.model(centre, sigma, observed_max) {
                Some(m) => m,
                None => continue,
            };
            trace!("centre {centre}, sigma {sigma}: residual {residual}");

            let better = match &best {
                Some(b) => residual < b.residual,
                None => true,
            };
            if better {
                best = Some(GaussianFit {
                    centre,
                    sigma,
                    curve,
                    residual,
                });
            }
        }
    }

    best
}
