// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Find peaks in spectra and report their centroids and widths.


use std::path::PathBuf;

use clap::Parser;
use itertools::Itertools;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};

use super::common::{display_warnings, SearchArgs, SearchParams, ARG_FILE_HELP};
use crate::{
    calibration::scale_fwhms,
    io::{can_write_to_file, write_json},
    peaks::{Peak, StopReason},
    McaCalError,
};

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct PeaksArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    args_file: Option<PathBuf>,

    /// Write the peaks found in every spectrum to this json file.
    #[clap(short, long, help_heading = "OUTPUT FILES")]
    output: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(rename = "search")]
    #[serde(default)]
    search_args: SearchArgs,
}

/// The peaks found in one spectrum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(super) struct PeaksReport {
    pub(super) spectrum: PathBuf,
    /// Strongest first.
    pub(super) centroids: Vec<usize>,
    pub(super) fwhms: Vec<f64>,
    /// FWHMs multiplied by their reference energies. Only present when
    /// reference energies were given; empty if too few peaks were found to
    /// match them.
    pub(super) scaled_fwhms: Option<Vec<f64>>,
    pub(super) stop_reason: StopReason,
    pub(super) iterations: usize,
    pub(super) peaks: Vec<Peak>,
}

struct PeaksParams {
    search: SearchParams,
    output: Option<PathBuf>,
}

impl PeaksArgs {
    /// Merge the command-line arguments with those in the arguments file (if
    /// one was given), preferring the CLI values.
    pub(super) fn merge(self) -> Result<PeaksArgs, McaCalError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            let PeaksArgs {
                args_file: _,
                output,
                search_args,
            } = unpack_arg_file!(arg_file);

            Ok(PeaksArgs {
                args_file: None,
                output: cli_args.output.or(output),
                search_args: cli_args.search_args.merge(search_args),
            })
        } else {
            Ok(cli_args)
        }
    }

    fn parse(self) -> Result<PeaksParams, McaCalError> {
        debug!("{:#?}", self);

        let PeaksArgs {
            args_file: _,
            output,
            search_args,
        } = self;

        let search = search_args.parse()?;
        if let Some(output) = &output {
            can_write_to_file(output)?;
        }

        search.display("Peak search set up");
        if let Some(output) = &output {
            info!("Writing peaks to {}", output.display());
        }
        display_warnings();

        Ok(PeaksParams { search, output })
    }

    pub(super) fn run(self, dry_run: bool) -> Result<Option<Vec<PeaksReport>>, McaCalError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let PeaksParams { search, output } = self.parse()?;

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(None);
        }

        let reports: Vec<PeaksReport> = search
            .search_all()?
            .into_iter()
            .map(|s| {
                let fwhms = s.search.fwhms();
                PeaksReport {
                    spectrum: s.file,
                    centroids: s.search.centroids(),
                    scaled_fwhms: search.energies.as_ref().map(|e| scale_fwhms(e, &fwhms)),
                    fwhms,
                    stop_reason: s.search.stop_reason,
                    iterations: s.search.iterations,
                    peaks: s.search.peaks,
                }
            })
            .collect();

        for report in &reports {
            info!("{}:", report.spectrum.display());
            info!("  centroids: [{}]", report.centroids.iter().join(", "));
            info!("  FWHMs:     [{}]", report.fwhms.iter().join(", "));
            if let Some(scaled) = &report.scaled_fwhms {
                info!("  FWHM × energy: [{}]", scaled.iter().join(", "));
            }
            debug!(
                "  stopped after {} iteration(s): {}",
                report.iterations, report.stop_reason
            );
        }
        display_warnings();

        if let Some(output) = output {
            write_json(&output, &reports)?;
            info!("Peaks written to {}", output.display());
        }

        Ok(Some(reports))
    }
}
