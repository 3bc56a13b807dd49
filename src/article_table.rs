/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The sorted, dual-keyed article table (resource ↔ label ↔ [`ArticleId`]).

use crate::error::{Result, WikiError};
use crate::normalize::{denormalize_title, normalize_title};
use std::sync::Mutex;

/// A dense index into the article table. Assigned implicitly by the final
/// sort order established by [`ArticleTable::finalize`].
pub type ArticleId = u32;

/// Sentinel value for "no such article".
pub const NOT_FOUND: ArticleId = ArticleId::MAX;

/// A resource and, if it cannot be recovered from the resource alone, a
/// label, packed into one byte string: `resource`, or `resource '\0' label`.
///
/// Stored as raw bytes rather than `String` because the embedded `'\0'` is a
/// significant separator, not a UTF-8 violation to sanitize away.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CompressedLabel(Vec<u8>);

impl CompressedLabel {
    /// Builds a compressed label for `resource`/`label`, omitting the label
    /// when it is recoverable from the resource by denormalization alone.
    pub fn new(resource: &str, label: &str) -> Self {
        if denormalize_title(resource) == label {
            CompressedLabel(resource.as_bytes().to_vec())
        } else {
            let mut bytes = Vec::with_capacity(resource.len() + 1 + label.len());
            bytes.extend_from_slice(resource.as_bytes());
            bytes.push(0);
            bytes.extend_from_slice(label.as_bytes());
            CompressedLabel(bytes)
        }
    }

    /// Whether this label was stored without a separate label part.
    pub fn is_resource_only(&self) -> bool {
        !self.0.contains(&0)
    }

    fn zero_pos(&self) -> Option<usize> {
        self.0.iter().position(|&b| b == 0)
    }

    pub fn resource(&self) -> String {
        let end = self.zero_pos().unwrap_or(self.0.len());
        String::from_utf8_lossy(&self.0[..end]).into_owned()
    }

    pub fn label(&self) -> String {
        match self.zero_pos() {
            Some(pos) => String::from_utf8_lossy(&self.0[pos + 1..]).into_owned(),
            None => denormalize_title(&self.resource()),
        }
    }

    /// Comparator key: the raw bytes up to (and not including) the
    /// separator, i.e. the resource, compared as bytes.
    fn resource_bytes(&self) -> &[u8] {
        let end = self.zero_pos().unwrap_or(self.0.len());
        &self.0[..end]
    }
}

/// The sorted, append-then-freeze article table.
///
/// During ingest, [`append_unsafe`](Self::append_unsafe) is called
/// concurrently under the table's own mutex; after [`finalize`](Self::finalize)
/// the table is immutable and reads need no further synchronization.
pub struct ArticleTable {
    records: Mutex<Vec<CompressedLabel>>,
    finalized: Vec<CompressedLabel>,
    is_finalized: bool,
}

impl Default for ArticleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ArticleTable {
    pub fn new() -> Self {
        ArticleTable {
            records: Mutex::new(Vec::new()),
            finalized: Vec::new(),
            is_finalized: false,
        }
    }

    /// Appends a record without sorting. Safe for concurrent callers: growth
    /// is serialized by the table's internal mutex.
    pub fn append_unsafe(&self, compressed: CompressedLabel) {
        self.records.lock().unwrap().push(compressed);
    }

    /// Sorts the accumulated records in ascending byte order, fixing
    /// [`ArticleId`] assignment. Must be called exactly once, after all
    /// appends have completed.
    pub fn finalize(&mut self) {
        let mut records = std::mem::take(&mut *self.records.lock().unwrap());
        records.sort_unstable();
        self.finalized = records;
        self.is_finalized = true;
    }

    /// Number of articles currently stored (valid before and after finalize).
    pub fn len(&self) -> usize {
        if self.is_finalized {
            self.finalized.len()
        } else {
            self.records.lock().unwrap().len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Binary search for a record whose resource part equals `resource`.
    pub fn find_by_resource(&self, resource: &str) -> ArticleId {
        debug_assert!(self.is_finalized, "find_by_resource before finalize");
        let key = resource.as_bytes();
        match self
            .finalized
            .binary_search_by(|r| r.resource_bytes().cmp(key))
        {
            Ok(idx) => idx as ArticleId,
            Err(_) => NOT_FOUND,
        }
    }

    /// Normalizes `label`, then locates the lower bound of the normalized
    /// key against the full raw record bytes (not just the resource
    /// prefix): a record whose resource differs from its label sorts as an
    /// extension of that record's resource prefix, so the normalized label
    /// and the record's resource prefix land at the same position even
    /// though they are different byte strings. Finally verifies the located
    /// record's extracted label actually matches.
    pub fn find_by_label(&self, label: &str) -> ArticleId {
        debug_assert!(self.is_finalized, "find_by_label before finalize");
        let normalized = normalize_title(label);
        let key = normalized.as_bytes();
        let idx = self.finalized.partition_point(|r| r.0.as_slice() < key);
        match self.finalized.get(idx) {
            Some(r) if r.label() == label => idx as ArticleId,
            _ => NOT_FOUND,
        }
    }

    pub fn resource_of(&self, id: ArticleId) -> Result<String> {
        self.record(id).map(CompressedLabel::resource)
    }

    pub fn label_of(&self, id: ArticleId) -> Result<String> {
        self.record(id).map(CompressedLabel::label)
    }

    fn record(&self, id: ArticleId) -> Result<&CompressedLabel> {
        self.finalized
            .get(id as usize)
            .ok_or_else(|| WikiError::InvalidArticleId(format!("article not found: {id}")))
    }
}
