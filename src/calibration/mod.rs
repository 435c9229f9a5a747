// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Matching found peaks to reference energies, and turning the matches into a
//! new amplifier gain.
//!
//! Peaks and reference energies are both ordered by peak significance
//! (strongest first), not by channel.

mod error;

pub use error::CalibrationError;

use log::debug;
use serde::{Deserialize, Serialize};
use vec1::Vec1;

use crate::constants::CHANNELS_PER_KEV_SCALE;

/// A channel believed to correspond to a known energy [keV].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPair {
    pub channel: usize,
    pub energy: f64,
}

impl CalibrationPair {
    /// The synthetic pair used to anchor a single measured point.
    pub const ORIGIN: CalibrationPair = CalibrationPair {
        channel: 0,
        energy: 0.0,
    };
}

/// Per-peak values paired with reference energies.
#[derive(Debug, Clone, PartialEq)]
pub struct Matched<T> {
    pub pairs: Vec<(T, f64)>,
    /// `false` if there were fewer values than energies. `pairs` is then
    /// empty, and nothing should be calibrated from it.
    pub matched: bool,
}

/// Pair per-peak values (e.g. centroids or FWHMs) with reference energies.
///
/// - Equal lengths are paired index for index.
/// - If there are more values than energies, the first (strongest) values are
///   paired and the rest are dropped.
/// - If there are fewer values than energies, nothing is paired.
pub fn match_to_energies<T: Copy>(energies: &Vec1<f64>, values: &[T]) -> Matched<T> {
    if values.len() < energies.len() {
        debug!(
            "Only {} peak(s) for {} reference energies; can't match",
            values.len(),
            energies.len()
        );
        return Matched {
            pairs: vec![],
            matched: false,
        };
    }

    if values.len() > energies.len() {
        debug!(
            "Using the {} strongest of {} peaks",
            energies.len(),
            values.len()
        );
    }
    Matched {
        pairs: values.iter().copied().zip(energies.iter().copied()).collect(),
        matched: true,
    }
}

/// The result of matching peak positions with reference energies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matching {
    pub pairs: Vec<CalibrationPair>,
    pub matched: bool,
}

/// Match peak centroids with reference energies. See [`match_to_energies`].
pub fn match_peaks(energies: &Vec1<f64>, positions: &[usize]) -> Matching {
    let Matched { pairs, matched } = match_to_energies(energies, positions);
    Matching {
        pairs: pairs
            .into_iter()
            .map(|(channel, energy)| CalibrationPair { channel, energy })
            .collect(),
        matched,
    }
}

/// A lone pair needs a second reference point; it is anchored to the origin,
/// which is put first. Any other number of pairs is returned unchanged.
pub fn pad(pairs: Vec<CalibrationPair>) -> Vec<CalibrationPair> {
    match pairs.as_slice() {
        [only] => vec![CalibrationPair::ORIGIN, *only],
        _ => pairs,
    }
}

/// Linear two-point gain calibration:
///
/// `new_gain = (channel_delta / (energy_delta * 100)) * previous_gain`
///
/// where the deltas are the second pair minus the first. Exactly two pairs are
/// required; pad single matches with [`pad`] first.
pub fn compute_gain(pairs: &[CalibrationPair], previous_gain: f64) -> Result<f64, CalibrationError> {
    let (first, second) = match pairs {
        [first, second] => (first, second),
        _ => return Err(CalibrationError::PairCount(pairs.len())),
    };
    if !previous_gain.is_finite() {
        return Err(CalibrationError::InvalidPreviousGain(previous_gain));
    }

    let channel_delta = second.channel as f64 - first.channel as f64;
    let energy_delta = second.energy - first.energy;
    if energy_delta == 0.0 || !energy_delta.is_finite() {
        return Err(CalibrationError::EnergySeparation {
            first: first.energy,
            second: second.energy,
        });
    }

    Ok(channel_delta / (energy_delta * CHANNELS_PER_KEV_SCALE) * previous_gain)
}

/// A new gain and the pairs it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GainResult {
    pub gain: f64,
    pub previous_gain: f64,
    pub pairs: Vec<CalibrationPair>,
}

/// Match, pad and compute a new gain. `Ok(None)` when there are fewer peaks than
/// reference energies; no gain may be derived in that case.
pub fn calibrate(
    energies: &Vec1<f64>,
    positions: &[usize],
    previous_gain: f64,
) -> Result<Option<GainResult>, CalibrationError> {
    let Matching { pairs, matched } = match_peaks(energies, positions);
    if !matched {
        return Ok(None);
    }

    let pairs = pad(pairs);
    let gain = compute_gain(&pairs, previous_gain)?;
    debug!("New gain {gain} (previous {previous_gain}) from {pairs:?}");
    Ok(Some(GainResult {
        gain,
        previous_gain,
        pairs,
    }))
}

/// FWHMs of matched peaks multiplied by their reference energies. Empty if
/// there are fewer FWHMs than energies.
pub fn scale_fwhms(energies: &Vec1<f64>, fwhms: &[f64]) -> Vec<f64> {
    match_to_energies(energies, fwhms)
        .pairs
        .into_iter()
        .map(|(fwhm, energy)| fwhm * energy)
        .collect()
}
