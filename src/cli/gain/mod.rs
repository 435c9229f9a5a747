// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Derive new amplifier gains for detector elements from the peaks in their
//! spectra.


use std::path::PathBuf;

use clap::Parser;
use itertools::Itertools;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use vec1::Vec1;

use super::common::{
    display_warnings, InfoPrinter, SearchArgs, SearchArgsError, SearchParams, Warn, ARG_FILE_HELP,
};
use crate::{
    calibration::{calibrate, CalibrationError, CalibrationPair, GainResult},
    constants::{DEFAULT_PREVIOUS_GAIN, MAX_GAIN_ENERGIES},
    io::{can_write_to_file, write_json},
    peaks::StopReason,
    McaCalError,
};

lazy_static::lazy_static! {
    static ref PREVIOUS_GAINS_HELP: String =
        format!("The gains the spectra were taken with. Supply one value for all spectra, or one per spectrum. Default: {DEFAULT_PREVIOUS_GAIN}");
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct GainArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    args_file: Option<PathBuf>,

    #[clap(short, long, multiple_values(true), help = PREVIOUS_GAINS_HELP.as_str(), help_heading = "GAIN")]
    previous_gains: Option<Vec<f64>>,

    /// Write the new gains to this json file.
    #[clap(short, long, help_heading = "OUTPUT FILES")]
    output: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(rename = "search")]
    #[serde(default)]
    search_args: SearchArgs,
}

/// The gain calibration of one detector element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(super) struct GainReport {
    pub(super) spectrum: PathBuf,
    pub(super) centroids: Vec<usize>,
    pub(super) stop_reason: StopReason,
    pub(super) previous_gain: f64,
    /// `None` if too few peaks were found to match the reference energies.
    pub(super) gain: Option<f64>,
    pub(super) pairs: Vec<CalibrationPair>,
}

struct GainParams {
    search: SearchParams,
    energies: Vec1<f64>,
    /// One per spectrum.
    previous_gains: Vec1<f64>,
    output: Option<PathBuf>,
}

impl GainArgs {
    /// Merge the command-line arguments with those in the arguments file (if
    /// one was given), preferring the CLI values.
    pub(super) fn merge(self) -> Result<GainArgs, McaCalError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            let GainArgs {
                args_file: _,
                previous_gains,
                output,
                search_args,
            } = unpack_arg_file!(arg_file);

            Ok(GainArgs {
                args_file: None,
                previous_gains: cli_args.previous_gains.or(previous_gains),
                output: cli_args.output.or(output),
                search_args: cli_args.search_args.merge(search_args),
            })
        } else {
            Ok(cli_args)
        }
    }

    fn parse(self) -> Result<GainParams, McaCalError> {
        debug!("{:#?}", self);

        let GainArgs {
            args_file: _,
            previous_gains,
            output,
            search_args,
        } = self;

        let search = search_args.parse()?;
        let energies = search.energies.clone().ok_or(SearchArgsError::NoEnergies)?;
        if energies.len() > MAX_GAIN_ENERGIES {
            return Err(SearchArgsError::TooManyEnergies {
                got: energies.len(),
                max: MAX_GAIN_ENERGIES,
            }
            .into());
        }
        // A lone energy is paired with the origin.
        match energies.as_slice() {
            [only] if *only <= 0.0 => {
                return Err(SearchArgsError::EnergySeparation {
                    first: 0.0,
                    second: *only,
                }
                .into())
            }
            [first, second] if first == second => {
                return Err(SearchArgsError::EnergySeparation {
                    first: *first,
                    second: *second,
                }
                .into())
            }
            _ => (),
        }
        if search.max_peaks < energies.len() {
            format!(
                "Searching for {} peak(s) can never match {} reference energies",
                search.max_peaks,
                energies.len()
            )
            .warn();
        }

        let num_spectra = search.spectra.len();
        let previous_gains = match previous_gains.as_deref() {
            None => vec![DEFAULT_PREVIOUS_GAIN; num_spectra],
            Some([gain]) => vec![*gain; num_spectra],
            Some(gains) if gains.len() == num_spectra => gains.to_vec(),
            Some(gains) => {
                return Err(SearchArgsError::PreviousGainCount {
                    got: gains.len(),
                    num_spectra,
                }
                .into())
            }
        };
        if let Some(&bad) = previous_gains.iter().find(|g| !g.is_finite()) {
            return Err(CalibrationError::InvalidPreviousGain(bad).into());
        }
        // There's at least one spectrum.
        let previous_gains =
            Vec1::try_from_vec(previous_gains).map_err(|_| SearchArgsError::NoSpectra)?;

        if let Some(output) = &output {
            can_write_to_file(output)?;
        }

        search.display("Gain calibration set up");
        let mut printer = InfoPrinter::new("Gains".into());
        printer.push_line(
            format!(
                "Previous gains: {}",
                previous_gains.iter().unique_by(|g| g.to_bits()).join(", ")
            )
            .into(),
        );
        if let Some(output) = &output {
            printer.push_line(format!("Writing gains to {}", output.display()).into());
        }
        printer.display();
        display_warnings();

        Ok(GainParams {
            search,
            energies,
            previous_gains,
            output,
        })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<Option<Vec<GainReport>>, McaCalError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let GainParams {
            search,
            energies,
            previous_gains,
            output,
        } = self.parse()?;

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(None);
        }

        let mut reports = Vec::with_capacity(previous_gains.len());
        for (s, &previous_gain) in search.search_all()?.into_iter().zip(previous_gains.iter()) {
            let centroids = s.search.centroids();
            let (gain, pairs) = match calibrate(&energies, &centroids, previous_gain)? {
                Some(GainResult { gain, pairs, .. }) => {
                    info!("{}: new gain {gain}", s.file.display());
                    (Some(gain), pairs)
                }
                None => {
                    format!(
                        "{}: {} peak(s) for {} reference energies; no gain derived",
                        s.file.display(),
                        centroids.len(),
                        energies.len()
                    )
                    .warn();
                    (None, vec![])
                }
            };
            reports.push(GainReport {
                spectrum: s.file,
                centroids,
                stop_reason: s.search.stop_reason,
                previous_gain,
                gain,
                pairs,
            });
        }
        display_warnings();

        if let Some(output) = output {
            write_json(&output, &reports)?;
            info!("Gains written to {}", output.display());
        }

        Ok(Some(reports))
    }
}
