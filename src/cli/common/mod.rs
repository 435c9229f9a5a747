// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Common arguments for command-line interfaces. Both the `peaks` and `gain`
//! subcommands read spectra and search them for peaks, so the same spectrum and
//! search arguments are shared between them.

mod printers;

pub(super) use printers::InfoPrinter;
pub(crate) use printers::{display_warnings, Warn};

use std::{ops::Range, path::PathBuf};

use clap::Parser;
use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;
use vec1::Vec1;

use super::McaCalError;
use crate::{
    constants::{DEFAULT_MAX_ITERATIONS, DEFAULT_NOISE_MULTIPLIER},
    io::read_spectrum_file,
    peaks::{PeakExtractor, PeakSearch, SearchConfig},
};

lazy_static::lazy_static! {
    pub(super) static ref ARG_FILE_TYPES_COMMA_SEPARATED: String = ArgFileTypes::iter().join(", ");

    pub(super) static ref ARG_FILE_HELP: String =
        format!("All arguments may be specified in a file. Any CLI arguments override arguments set in the file. Supported formats: {}", *ARG_FILE_TYPES_COMMA_SEPARATED);

    static ref NOISE_MULTIPLIER_HELP: String =
        format!("The number of background standard deviations above the background level that a channel must exceed to be part of a peak. Default: {DEFAULT_NOISE_MULTIPLIER}");

    static ref MAX_ITERATIONS_HELP: String =
        format!("The maximum number of peak-search iterations, regardless of how many peaks are wanted. Default: {DEFAULT_MAX_ITERATIONS}");
}

#[derive(Debug, Display, EnumIter, EnumString)]
pub(super) enum ArgFileTypes {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

macro_rules! unpack_arg_file {
    ($arg_file:expr) => ({
        use std::{fs::File, io::Read, str::FromStr};

        use crate::cli::common::{ArgFileTypes, ARG_FILE_TYPES_COMMA_SEPARATED};

        debug!("Attempting to parse argument file {}", $arg_file.display());

        let mut contents = String::new();
        let arg_file_type = $arg_file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| ArgFileTypes::from_str(&e).ok());

        match arg_file_type {
            Some(ArgFileTypes::Toml) => {
                debug!("Parsing toml file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match toml::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(McaCalError::ArgFile(format!(
                            "Couldn't decode toml structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }
            Some(ArgFileTypes::Json) => {
                debug!("Parsing json file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match serde_json::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(McaCalError::ArgFile(format!(
                            "Couldn't decode json structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }

            _ => {
                return Err(McaCalError::ArgFile(format!(
                    "Argument file '{:?}' doesn't have a recognised file extension! Valid extensions are: {}", $arg_file, *ARG_FILE_TYPES_COMMA_SEPARATED)
                ))
            }
        }
    });
}

#[derive(Error, Debug)]
pub(crate) enum SearchArgsError {
    #[error("No spectra were supplied")]
    NoSpectra,

    #[error("No background range was supplied; both --background-range-min and --background-range-max are required")]
    NoBackgroundRange,

    #[error("The {thing} [{min}, {max}) is empty")]
    InvalidRange {
        thing: &'static str,
        min: usize,
        max: usize,
    },

    #[error("No reference energies were supplied")]
    NoEnergies,

    #[error("Reference energies must be finite and non-negative, but got {0} keV")]
    InvalidEnergy(f64),

    #[error("At most {max} reference energies can be used for a gain calibration, but {got} were supplied")]
    TooManyEnergies { got: usize, max: usize },

    #[error("The reference energies {first} keV and {second} keV can't calibrate a gain; a lone energy must be above 0 keV, and two energies must differ")]
    EnergySeparation { first: f64, second: f64 },

    #[error("Got {got} previous gains for {num_spectra} spectra; supply either one gain or one per spectrum")]
    PreviousGainCount { got: usize, num_spectra: usize },
}

/// Arguments describing which spectra to read and how to search them.
#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct SearchArgs {
    /// Paths to the spectra to search, one per detector element. Files ending
    /// in .json must contain an array of counts; anything else is read as text
    /// with counts separated by whitespace or commas.
    #[clap(short, long, multiple_values(true), help_heading = "INPUT SPECTRA")]
    pub(super) spectra: Option<Vec<PathBuf>>,

    /// The reference energies of the peaks [keV], strongest peak first.
    #[clap(short, long, multiple_values(true), help_heading = "PEAK SEARCH")]
    pub(super) energies: Option<Vec<f64>>,

    /// The number of peaks to search for. Default: the number of reference
    /// energies, or 1 if there are none.
    #[clap(long, help_heading = "PEAK SEARCH")]
    pub(super) max_peaks: Option<usize>,

    /// The first channel to search. Default: the end of the background range.
    #[clap(long, help_heading = "PEAK SEARCH")]
    pub(super) channel_range_min: Option<usize>,

    /// One past the last channel to search. Default: the number of channels
    /// in each spectrum.
    #[clap(long, help_heading = "PEAK SEARCH")]
    pub(super) channel_range_max: Option<usize>,

    /// The first channel of a region containing only background. Channels
    /// below this are never searched.
    #[clap(long, help_heading = "PEAK SEARCH")]
    pub(super) background_range_min: Option<usize>,

    /// One past the last channel of the background region.
    #[clap(long, help_heading = "PEAK SEARCH")]
    pub(super) background_range_max: Option<usize>,

    #[clap(long, help = NOISE_MULTIPLIER_HELP.as_str(), help_heading = "PEAK SEARCH")]
    pub(super) noise_multiplier: Option<f64>,

    #[clap(long, help = MAX_ITERATIONS_HELP.as_str(), help_heading = "PEAK SEARCH")]
    pub(super) max_iterations: Option<usize>,
}

impl SearchArgs {
    pub(super) fn merge(self, other: Self) -> Self {
        Self {
            spectra: self.spectra.or(other.spectra),
            energies: self.energies.or(other.energies),
            max_peaks: self.max_peaks.or(other.max_peaks),
            channel_range_min: self.channel_range_min.or(other.channel_range_min),
            channel_range_max: self.channel_range_max.or(other.channel_range_max),
            background_range_min: self.background_range_min.or(other.background_range_min),
            background_range_max: self.background_range_max.or(other.background_range_max),
            noise_multiplier: self.noise_multiplier.or(other.noise_multiplier),
            max_iterations: self.max_iterations.or(other.max_iterations),
        }
    }

    pub(super) fn parse(self) -> Result<SearchParams, SearchArgsError> {
        let SearchArgs {
            spectra,
            energies,
            max_peaks,
            channel_range_min,
            channel_range_max,
            background_range_min,
            background_range_max,
            noise_multiplier,
            max_iterations,
        } = self;

        let spectra = spectra
            .and_then(|s| Vec1::try_from_vec(s).ok())
            .ok_or(SearchArgsError::NoSpectra)?;

        let energies = match energies {
            None => None,
            Some(e) => Some(parse_energies(e)?),
        };

        let background_range = match (background_range_min, background_range_max) {
            (Some(min), Some(max)) if max > min => min..max,
            (Some(min), Some(max)) => {
                return Err(SearchArgsError::InvalidRange {
                    thing: "background range",
                    min,
                    max,
                })
            }
            _ => return Err(SearchArgsError::NoBackgroundRange),
        };

        let channel_range_min = channel_range_min.unwrap_or(background_range.end);
        if let Some(max) = channel_range_max {
            if max <= channel_range_min {
                return Err(SearchArgsError::InvalidRange {
                    thing: "peak search range",
                    min: channel_range_min,
                    max,
                });
            }
        }

        let max_peaks = max_peaks.unwrap_or_else(|| energies.as_ref().map(|e| e.len()).unwrap_or(1));

        Ok(SearchParams {
            spectra,
            energies,
            max_peaks,
            channel_range_min,
            channel_range_max,
            background_range,
            noise_multiplier: noise_multiplier.unwrap_or(DEFAULT_NOISE_MULTIPLIER),
            max_iterations: max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS),
        })
    }
}

fn parse_energies(energies: Vec<f64>) -> Result<Vec1<f64>, SearchArgsError> {
    if let Some(&bad) = energies.iter().find(|e| !e.is_finite() || **e < 0.0) {
        return Err(SearchArgsError::InvalidEnergy(bad));
    }
    Vec1::try_from_vec(energies).map_err(|_| SearchArgsError::NoEnergies)
}

/// Parsed [`SearchArgs`].
#[derive(Debug, Clone)]
pub(super) struct SearchParams {
    pub(super) spectra: Vec1<PathBuf>,
    pub(super) energies: Option<Vec1<f64>>,
    pub(super) max_peaks: usize,
    pub(super) channel_range_min: usize,
    /// If not set, the whole of each spectrum past `channel_range_min` is
    /// searched.
    pub(super) channel_range_max: Option<usize>,
    pub(super) background_range: Range<usize>,
    pub(super) noise_multiplier: f64,
    pub(super) max_iterations: usize,
}

/// One spectrum and its search result.
#[derive(Debug, Clone)]
pub(super) struct SpectrumSearch {
    pub(super) file: PathBuf,
    pub(super) search: PeakSearch,
}

impl SearchParams {
    /// The search configuration for a spectrum with `num_channels` channels.
    pub(super) fn config_for(&self, num_channels: usize) -> SearchConfig {
        SearchConfig::new(
            self.max_peaks,
            self.channel_range_min..self.channel_range_max.unwrap_or(num_channels),
            self.background_range.clone(),
        )
        .with_noise_multiplier(self.noise_multiplier)
        .with_max_iterations(self.max_iterations)
    }

    pub(super) fn display(&self, title: &'static str) {
        let mut printer = InfoPrinter::new(title.into());
        printer.push_line(format!("{} spectra", self.spectra.len()).into());
        let mut block = vec![
            format!("Searching for up to {} peak(s)", self.max_peaks).into(),
            match self.channel_range_max {
                Some(max) => format!("Channels [{}, {max})", self.channel_range_min).into(),
                None => format!("Channels [{}, end)", self.channel_range_min).into(),
            },
            format!(
                "Background channels [{}, {})",
                self.background_range.start, self.background_range.end
            )
            .into(),
            format!(
                "Noise multiplier {}, at most {} iterations",
                self.noise_multiplier, self.max_iterations
            )
            .into(),
        ];
        if let Some(energies) = &self.energies {
            block.push(
                format!(
                    "Reference energies: {} keV",
                    energies.iter().map(|e| e.to_string()).join(", ")
                )
                .into(),
            );
        }
        printer.push_block(block);
        printer.display();
    }

    /// Read and search every spectrum. Spectra are independent, so they're
    /// handled in parallel; results are in the same order as the spectra.
    pub(super) fn search_all(&self) -> Result<Vec<SpectrumSearch>, McaCalError> {
        self.spectra
            .par_iter()
            .map(|file| {
                let spectrum = read_spectrum_file(file)?;
                let config = self.config_for(spectrum.len());
                let search = PeakExtractor::new(config).extract(&spectrum)?;
                if search.peaks.len() < self.max_peaks {
                    format!(
                        "{}: found {} of {} peak(s); {}",
                        file.display(),
                        search.peaks.len(),
                        self.max_peaks,
                        search.stop_reason
                    )
                    .warn();
                }
                Ok(SpectrumSearch {
                    file: file.clone(),
                    search,
                })
            })
            .collect()
    }
}
