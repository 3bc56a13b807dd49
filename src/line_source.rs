/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! A bzip2-backed line source: opens a file, decompresses it, and yields one
//! decoded text line at a time.

use crate::error::Result;
use bzip2::read::BzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// An iterator over the decoded lines of a bzip2-compressed dump file.
pub struct CompressedLineSource {
    lines: std::io::Lines<BufReader<BzDecoder<File>>>,
}

impl CompressedLineSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let decoder = BzDecoder::new(file);
        Ok(CompressedLineSource {
            lines: BufReader::new(decoder).lines(),
        })
    }
}

impl Iterator for CompressedLineSource {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.lines.next().map(|r| r.map_err(Into::into))
    }
}
