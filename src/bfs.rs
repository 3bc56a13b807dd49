/*
 * SPDX-FileCopyrightText: 2024 Matteo Dell'Acqua
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Breadth-first shortest-path enumeration with an exclusion set.
//!
//! This implementation deliberately does not store parents or distances in a
//! classical per-node struct: instead each slot packs a parent id into the
//! low bits and a visited flag into the top bit, following the source
//! corpus's compact encoding. `to` is never marked visited, which is what
//! lets repeated [`Bfs::next_path`] calls discover every distinct predecessor of
//! `to` that reaches the search frontier.

use crate::adjacency::{is_outgoing, target_of, AdjacencyStore};
use crate::article_table::ArticleId;
use crate::error::{Result, WikiError};
use std::collections::{HashSet, VecDeque};

const VISITED_BIT: u32 = 1 << 31;
const PARENT_MASK: u32 = !VISITED_BIT;
const UNVISITED: u32 = PARENT_MASK;

pub type Path = Vec<ArticleId>;

/// A resumable breadth-first search over an [`AdjacencyStore`], yielding
/// shortest paths from `from` to `to` in order of discovery.
pub struct Bfs<'a> {
    adjacency: &'a AdjacencyStore,
    from: ArticleId,
    to: ArticleId,
    exclude: HashSet<ArticleId>,
    directed: bool,
    state: Vec<u32>,
    work: VecDeque<ArticleId>,
}

impl<'a> Bfs<'a> {
    /// Constructs a search from `from` to `to`. Fails if either endpoint is
    /// out of range for `adjacency`, or if `to` is in `exclude`. `exclude` is
    /// cloned so the search owns its exclusion set independently of the
    /// caller's, letting a long-lived search outlive the call that started
    /// it (the query façade keeps one alive across `*`-suffixed commands).
    pub fn new(
        adjacency: &'a AdjacencyStore,
        exclude: &HashSet<ArticleId>,
        from: ArticleId,
        to: ArticleId,
        directed: bool,
    ) -> Result<Self> {
        let n = adjacency.len();
        if n == 0 {
            return Err(WikiError::LinkStoreNotLoaded);
        }
        if from as usize >= n {
            return Err(WikiError::InvalidArticleId(format!(
                "invalid article id for link store: {from}"
            )));
        }
        if to as usize >= n {
            return Err(WikiError::InvalidArticleId(format!(
                "invalid article id for link store: {to}"
            )));
        }
        if exclude.contains(&to) {
            return Err(WikiError::InvalidArticleId(
                "'to' node is contained in the excluded nodes".to_string(),
            ));
        }

        let mut state = vec![UNVISITED; n];
        state[from as usize] = VISITED_BIT | (from & PARENT_MASK);
        let mut work = VecDeque::new();
        work.push_back(from);

        Ok(Bfs {
            adjacency,
            from,
            to,
            exclude: exclude.clone(),
            directed,
            state,
            work,
        })
    }

    fn is_visited(&self, article: ArticleId) -> bool {
        self.state[article as usize] & VISITED_BIT != 0
    }

    fn set_visited(&mut self, article: ArticleId) {
        self.state[article as usize] |= VISITED_BIT;
    }

    fn parent(&self, article: ArticleId) -> ArticleId {
        self.state[article as usize] & PARENT_MASK
    }

    fn set_parent(&mut self, article: ArticleId, parent: ArticleId, force: bool) {
        if force || self.parent(article) == UNVISITED {
            self.state[article as usize] =
                (self.state[article as usize] & VISITED_BIT) | (parent & PARENT_MASK);
        }
    }

    fn backtrack(&self, to: ArticleId) -> Path {
        let mut path = vec![to];
        let mut current = to;
        while current != self.from {
            current = self.parent(current);
            path.push(current);
        }
        path.reverse();
        path
    }

    /// Returns the next shortest path, or an empty path once no further
    /// paths exist. Exhaustion is sticky: once empty, every subsequent call
    /// keeps returning empty.
    pub fn next_path(&mut self) -> Path {
        while let Some(current) = self.work.pop_front() {
            let links = match self.adjacency.links_of(current, true, true) {
                Ok(l) => l,
                Err(_) => continue,
            };
            for link in links {
                if self.directed && !is_outgoing(link) {
                    continue;
                }
                let next = target_of(link);

                if next == self.to {
                    self.set_parent(next, current, true);
                    return self.backtrack(self.to);
                }

                if self.is_visited(next) {
                    continue;
                }
                if self.exclude.contains(&next) {
                    continue;
                }
                self.set_parent(next, current, false);
                self.set_visited(next);
                self.work.push_back(next);
            }
        }
        Path::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_from_edges(n: usize, edges: &[(ArticleId, ArticleId)]) -> AdjacencyStore {
        let mut store = AdjacencyStore::new();
        store.resize(n);
        for &(u, v) in edges {
            store.add_edge(u, v, true).unwrap();
        }
        store
    }

    // S4 — BFS directed
    #[test]
    fn bfs_directed_scenario() {
        let store = store_from_edges(4, &[(0, 1), (1, 2), (2, 3), (0, 3)]);
        let exclude = HashSet::new();
        let mut bfs = Bfs::new(&store, &exclude, 0, 3, true).unwrap();
        assert_eq!(bfs.next_path(), vec![0, 3]);
        assert_eq!(bfs.next_path(), vec![0, 1, 2, 3]);
        assert_eq!(bfs.next_path(), Path::new());
        // idempotent after exhaustion
        assert_eq!(bfs.next_path(), Path::new());
    }

    // S5 — BFS excludes `to` visit, enumerating alternate last-edges
    #[test]
    fn bfs_alternate_last_edges_scenario() {
        let store = store_from_edges(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
        let exclude = HashSet::new();
        let mut bfs = Bfs::new(&store, &exclude, 0, 3, true).unwrap();
        let first = bfs.next_path();
        let second = bfs.next_path();
        assert_eq!(first, vec![0, 1, 3]);
        assert_eq!(second, vec![0, 2, 3]);
        assert_eq!(bfs.next_path(), Path::new());
    }

    #[test]
    fn bfs_rejects_excluded_destination() {
        let store = store_from_edges(2, &[(0, 1)]);
        let mut exclude = HashSet::new();
        exclude.insert(1);
        assert!(Bfs::new(&store, &exclude, 0, 1, true).is_err());
    }

    #[test]
    fn bfs_rejects_out_of_range_endpoints() {
        let store = store_from_edges(2, &[(0, 1)]);
        let exclude = HashSet::new();
        assert!(Bfs::new(&store, &exclude, 0, 9, true).is_err());
    }

    #[test]
    fn bfs_nondecreasing_path_lengths() {
        let store = store_from_edges(
            5,
            &[(0, 1), (0, 2), (1, 3), (2, 3), (3, 4), (0, 4)],
        );
        let exclude = HashSet::new();
        let mut bfs = Bfs::new(&store, &exclude, 0, 4, true).unwrap();
        let mut last_len = 0;
        loop {
            let path = bfs.next_path();
            if path.is_empty() {
                break;
            }
            assert!(path.len() >= last_len);
            last_len = path.len();
        }
    }
}
