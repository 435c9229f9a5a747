// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpectrumError {
    #[error("A spectrum must have at least one channel")]
    Empty,

    #[error("Channel {channel} has count {value}; counts must be finite and non-negative")]
    InvalidCount { channel: usize, value: f64 },
}
