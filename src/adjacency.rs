/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The bit-packed adjacency store: a per-article sorted vector of 32-bit
//! [`PageLink`] records.

use crate::article_table::ArticleId;
use crate::error::{Result, WikiError};
use std::sync::RwLock;

/// A bit-packed edge record: the target [`ArticleId`] in the upper 30 bits,
/// with bit 0 set iff the edge is outgoing and bit 1 set iff incoming.
///
/// The direction flags live in the low bits (not the high bits) so that a
/// probe key `target << 2` — with both flag bits zero — sorts correctly
/// against any stored record for `target` regardless of that record's flags:
/// ordering by the full 32-bit word already orders by target first.
pub type PageLink = u32;

const OUTGOING_BIT: u32 = 0b01;
const INCOMING_BIT: u32 = 0b10;

fn pack(target: ArticleId, outgoing: bool, incoming: bool) -> PageLink {
    let mut word = target << 2;
    if outgoing {
        word |= OUTGOING_BIT;
    }
    if incoming {
        word |= INCOMING_BIT;
    }
    word
}

pub fn target_of(link: PageLink) -> ArticleId {
    link >> 2
}

pub fn is_outgoing(link: PageLink) -> bool {
    link & OUTGOING_BIT != 0
}

pub fn is_incoming(link: PageLink) -> bool {
    link & INCOMING_BIT != 0
}

/// Per-article sorted adjacency lists. Each shard of owners is written by
/// exactly one thread during ingest (see [`crate::ingest`]), so concurrent
/// `add_edge` calls for distinct owners never race; calling `add_edge` twice
/// concurrently for the *same* owner is undefined, as documented.
#[derive(Default)]
pub struct AdjacencyStore {
    // One lock per article keeps the "single writer per shard" contract
    // cheap to state while still allowing concurrent readers once ingest
    // has finished; shards never contend on different owners because each
    // owner maps to exactly one writer thread.
    links: Vec<RwLock<Vec<PageLink>>>,
}

impl AdjacencyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates `n` empty per-article edge lists. Called once, before any
    /// edge insertion.
    pub fn resize(&mut self, n: usize) {
        self.links = (0..n).map(|_| RwLock::new(Vec::new())).collect();
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Inserts or merges an edge `owner -> target` (or `target -> owner`
    /// incoming, per `outgoing`). Not safe to call concurrently for the same
    /// `owner`.
    pub fn add_edge(&self, owner: ArticleId, target: ArticleId, outgoing: bool) -> Result<()> {
        let list = self.list(owner)?;
        let mut list = list.write().unwrap();
        let key = target << 2;
        match list.binary_search_by_key(&key, |link| link & !0b11) {
            Ok(idx) => list[idx] |= pack(0, outgoing, !outgoing),
            Err(idx) => list.insert(idx, pack(target, outgoing, !outgoing)),
        }
        Ok(())
    }

    /// True iff an outgoing record `owner -> target` exists.
    pub fn outgoing_exists(&self, owner: ArticleId, target: ArticleId) -> Result<bool> {
        let list = self.list(owner)?;
        let list = list.read().unwrap();
        if list.is_empty() {
            return Ok(false);
        }
        let key = target << 2;
        match list.binary_search_by_key(&key, |link| link & !0b11) {
            Ok(idx) => Ok(is_outgoing(list[idx])),
            Err(_) => Ok(false),
        }
    }

    /// All records for `owner` whose direction bits intersect the requested
    /// directions, in stored (ascending target) order.
    pub fn links_of(&self, owner: ArticleId, want_out: bool, want_in: bool) -> Result<Vec<PageLink>> {
        let list = self.list(owner)?;
        let list = list.read().unwrap();
        Ok(list
            .iter()
            .copied()
            .filter(|&l| (want_out && is_outgoing(l)) || (want_in && is_incoming(l)))
            .collect())
    }

    fn list(&self, owner: ArticleId) -> Result<&RwLock<Vec<PageLink>>> {
        if self.links.is_empty() {
            return Err(WikiError::LinkStoreNotLoaded);
        }
        self.links
            .get(owner as usize)
            .ok_or_else(|| WikiError::InvalidArticleId(format!("invalid article id for link store: {owner}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // S3 — adjacency from test fixture
    #[test]
    fn adjacency_fixture_scenario() {
        let mut store = AdjacencyStore::new();
        store.resize(4);
        store.add_edge(0, 1, true).unwrap();
        store.add_edge(0, 2, true).unwrap();
        store.add_edge(0, 3, true).unwrap();
        store.add_edge(3, 0, true).unwrap();

        assert!(store.outgoing_exists(0, 1).unwrap());
        assert!(!store.outgoing_exists(1, 0).unwrap());
        assert!(store.outgoing_exists(3, 0).unwrap());
        assert!(!store.outgoing_exists(0, 0).unwrap());

        let links = store.links_of(0, true, true).unwrap();
        let targets: Vec<ArticleId> = links.iter().map(|&l| target_of(l)).collect();
        assert_eq!(targets, vec![1, 2, 3]);
        for l in links {
            assert!(is_outgoing(l));
            assert!(!is_incoming(l));
        }
    }

    // S2 — packed edge invariant
    #[test]
    fn merge_direction_bits_scenario() {
        let mut store = AdjacencyStore::new();
        store.resize(8);
        store.add_edge(4, 7, true).unwrap();
        store.add_edge(4, 7, false).unwrap();

        let links = store.links_of(4, true, true).unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(target_of(links[0]), 7);
        assert!(is_outgoing(links[0]));
        assert!(is_incoming(links[0]));
    }

    #[test]
    fn empty_adjacency_guards_without_panicking() {
        let mut store = AdjacencyStore::new();
        store.resize(2);
        assert!(!store.outgoing_exists(0, 1).unwrap());
    }

    #[test]
    fn not_loaded_is_a_distinct_error() {
        let store = AdjacencyStore::new();
        match store.add_edge(0, 1, true) {
            Err(WikiError::LinkStoreNotLoaded) => {}
            other => panic!("expected LinkStoreNotLoaded, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_owner_is_invalid_article_id() {
        let mut store = AdjacencyStore::new();
        store.resize(2);
        match store.add_edge(5, 1, true) {
            Err(WikiError::InvalidArticleId(_)) => {}
            other => panic!("expected InvalidArticleId, got {other:?}"),
        }
    }
}
