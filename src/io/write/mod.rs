// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to handle writing out results.

mod error;

pub use error::FileWriteError;

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use log::{debug, trace};
use serde::Serialize;

use crate::cli::Warn;

/// Write `value` to `file` as pretty-printed json.
pub fn write_json<T: Serialize>(file: &Path, value: &T) -> Result<(), FileWriteError> {
    debug!("Writing json to {}", file.display());
    let mut f = BufWriter::new(File::create(file)?);
    serde_json::to_writer_pretty(&mut f, value)?;
    writeln!(f)?;
    f.flush()?;
    Ok(())
}

/// Test whether a file is writable. This does not check whether the file
/// already exists; if it does, a warning is emitted that it will be
/// overwritten. Any directories leading up to the file are created.
pub fn can_write_to_file(file: &Path) -> Result<(), FileWriteError> {
    trace!("Testing whether we can write to {}", file.display());

    let file_exists = file.exists();
    match std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(file)
        .map_err(|e| e.kind())
    {
        // File is writable.
        Ok(_) => {
            // If the file in question didn't already exist, `OpenOptions::new`
            // creates it as part of its work. We don't want to keep the 0-sized
            // file; remove it if it didn't exist before.
            if file_exists {
                format!("Will overwrite the existing file '{}'", file.display()).warn();
            } else {
                std::fs::remove_file(file)?;
            }
        }

        // File doesn't exist. Attempt to make the directories leading up to the
        // file; if this fails, then we can't write the file anyway.
        Err(std::io::ErrorKind::NotFound) => {
            if let Some(p) = file.parent() {
                match std::fs::DirBuilder::new()
                    .recursive(true)
                    .create(p)
                    .map_err(|e| e.kind())
                {
                    Ok(()) => (),
                    Err(std::io::ErrorKind::PermissionDenied) => {
                        return Err(FileWriteError::NewDirectory(p.to_path_buf()))
                    }
                    Err(e) => return Err(FileWriteError::IO(e.into())),
                }
            }
        }

        Err(std::io::ErrorKind::PermissionDenied) => {
            return Err(FileWriteError::FileNotWritable {
                file: file.display().to_string(),
            })
        }

        Err(e) => {
            return Err(FileWriteError::IO(e.into()));
        }
    }

    Ok(())
}
