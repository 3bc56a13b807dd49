/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Crate-wide error type.

use thiserror::Error;

/// Every failure kind the ingest pipeline, the data model, and the query
/// façade can raise.
#[derive(Error, Debug)]
pub enum WikiError {
    /// A single input line could not be parsed. Ingest logs and skips the
    /// line; this variant exists mostly so tests can assert on it.
    #[error("malformed input line: {0}")]
    InputMalformed(String),

    /// A resource, label, or id was not found in the article table.
    #[error("not found: {0}")]
    LookupMiss(String),

    /// An id was out of range for the article table or the link store.
    #[error("invalid article id: {0}")]
    InvalidArticleId(String),

    /// The link store was never initialized via [`crate::adjacency::AdjacencyStore::resize`].
    #[error("link database not loaded")]
    LinkStoreNotLoaded,

    /// A file could not be opened, or the bzip2 stream could not be decoded.
    #[error("I/O failure: {0}")]
    IoFailure(#[from] std::io::Error),

    /// An interactive command used an unrecognized verb.
    #[error("unknown command: {0}")]
    UsageError(String),
}

pub type Result<T> = std::result::Result<T, WikiError>;
