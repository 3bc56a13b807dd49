/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The parallel ingest pipeline: decompressed lines flow through a bounded
//! queue into a parser pool, which either appends directly to the article
//! table (label phase) or dispatches resolved edges to a sharded writer pool
//! (link phase).
//!
//! Both phases use [`std::thread::scope`] so the worker pools can borrow the
//! article table / adjacency store directly, without reference counting:
//! synchronization is entirely carried by the bounded queues and, for the
//! article table, its single internal append mutex.

use crate::adjacency::AdjacencyStore;
use crate::article_table::{ArticleId, ArticleTable, CompressedLabel};
use crate::error::Result;
use crate::line_source::CompressedLineSource;
use crate::normalize::{abbreviate_resource, denormalize_title, parse_quoted_literal};
use crate::queue::{bounded, DEFAULT_MAX_DEPTH};
use crate::tokenize::tokenize;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

const NUM_LABEL_THREADS: usize = 2;
const PARSE_LINK_THREADS: usize = 4;
const ADD_LINK_THREADS: usize = 2;

/// Reads all labels from `path` (a bzip2-compressed N-Triples-like dump)
/// into a freshly built, finalized [`ArticleTable`].
pub fn read_labels(path: impl AsRef<Path>) -> Result<ArticleTable> {
    let start = Instant::now();
    log::info!("reading labels from {}", path.as_ref().display());

    let mut table = ArticleTable::new();
    let (tx, rx) = bounded::<String>(DEFAULT_MAX_DEPTH);
    let line_count = AtomicUsize::new(0);
    let no_label_count = AtomicUsize::new(0);

    std::thread::scope(|scope| -> Result<()> {
        for _ in 0..NUM_LABEL_THREADS {
            let rx = rx.clone();
            let table = &table;
            let line_count = &line_count;
            let no_label_count = &no_label_count;
            scope.spawn(move || {
                while let Some(line) = rx.pop() {
                    if add_label(table, &line, no_label_count) {
                        let n = line_count.fetch_add(1, Ordering::Relaxed) + 1;
                        if n.is_multiple_of(1_000_000) {
                            log::info!("read {n} labels, queue depth {}", rx.len());
                        }
                    }
                }
            });
        }

        let mut source = CompressedLineSource::open(path)?;
        for line in &mut source {
            tx.push(line?);
        }
        drop(tx);
        Ok(())
    })?;

    table.finalize();
    log::info!(
        "loaded {} labels in {:.2}s ({} resources needed no separate label)",
        table.len(),
        start.elapsed().as_secs_f64(),
        no_label_count.load(Ordering::Relaxed)
    );
    Ok(table)
}

/// Parses one labels line and appends it to `table`. Returns `false` if the
/// line was skipped (blank, a comment, or malformed).
fn add_label(table: &ArticleTable, line: &str, no_label_count: &AtomicUsize) -> bool {
    if line.is_empty() || line.starts_with('#') {
        return false;
    }
    let tokens = tokenize(line);
    if tokens.len() < 3 {
        log::warn!("malformed labels line (fewer than 3 fields): {line}");
        return false;
    }

    let resource = abbreviate_resource(&tokens[0]);
    let label = parse_quoted_literal(&tokens[2]);

    if denormalize_title(&resource) == label {
        no_label_count.fetch_add(1, Ordering::Relaxed);
    }
    table.append_unsafe(CompressedLabel::new(&resource, &label));
    true
}

/// Reads all page links from `path` into `adjacency` (already sized to
/// `table.len()`), resolving endpoints against the finalized `table`. If
/// `incoming` is set, a reverse edge is dispatched for every forward edge.
/// Returns the number of lines read.
pub fn read_page_links(
    table: &ArticleTable,
    adjacency: &AdjacencyStore,
    path: impl AsRef<Path>,
    incoming: bool,
) -> Result<usize> {
    let start = Instant::now();
    log::info!("reading page links from {}", path.as_ref().display());

    type Edge = (ArticleId, ArticleId, bool);
    let mut writer_txs = Vec::with_capacity(ADD_LINK_THREADS);
    let mut writer_rxs = Vec::with_capacity(ADD_LINK_THREADS);
    for _ in 0..ADD_LINK_THREADS {
        let (tx, rx) = bounded::<Edge>(DEFAULT_MAX_DEPTH);
        writer_txs.push(tx);
        writer_rxs.push(rx);
    }

    let line_count = AtomicUsize::new(0);

    let result = std::thread::scope(|outer| -> Result<()> {
        // Writers: one per shard, shard key is `from_id mod ADD_LINK_THREADS`.
        // Each lives for the whole outer scope and only stops once every
        // `writer_txs` sender is dropped below.
        for rx in writer_rxs {
            outer.spawn(move || {
                while let Some((from, to, outgoing)) = rx.pop() {
                    if let Err(e) = adjacency.add_edge(from, to, outgoing) {
                        log::warn!("failed to add edge {from}->{to}: {e}");
                    }
                }
            });
        }

        // Parsers run to completion in a nested scope, so that by the time
        // it returns we know no thread still holds a `writer_txs` reference
        // and it is safe to drop the senders, signaling the writers above.
        let (parse_tx, parse_rx) = bounded::<String>(DEFAULT_MAX_DEPTH);
        std::thread::scope(|inner| -> Result<()> {
            for _ in 0..PARSE_LINK_THREADS {
                let rx = parse_rx.clone();
                let writer_txs = &writer_txs;
                inner.spawn(move || {
                    while let Some(line) = rx.pop() {
                        parse_add_pagelink(table, &line, writer_txs, incoming);
                    }
                });
            }
            drop(parse_rx);

            let mut source = CompressedLineSource::open(&path)?;
            for line in &mut source {
                let line = line?;
                parse_tx.push(line);
                let n = line_count.fetch_add(1, Ordering::Relaxed) + 1;
                if n.is_multiple_of(1_000_000) {
                    log::info!("read {n} link lines");
                }
            }
            drop(parse_tx);
            Ok(())
        })?;

        drop(writer_txs);
        Ok(())
    });
    result?;

    let n = line_count.load(Ordering::Relaxed);
    log::info!(
        "read {n} page link lines in {:.2}s",
        start.elapsed().as_secs_f64()
    );
    Ok(n)
}

/// Parses one page-links line (exactly 4 whitespace-delimited tokens),
/// resolves its endpoints, and dispatches the resolved edge(s) to the
/// writer shard owning `from_id` (and, if `incoming`, the shard owning
/// `to_id` for the reverse edge).
fn parse_add_pagelink(
    table: &ArticleTable,
    line: &str,
    writer_txs: &[crate::queue::Sender<(ArticleId, ArticleId, bool)>],
    incoming: bool,
) {
    if line.is_empty() || line.starts_with('#') {
        return;
    }
    let tokens: Vec<&str> = line.split(' ').collect();
    if tokens.len() != 4 {
        log::warn!("malformed page link line (expected 4 fields): {line}");
        return;
    }

    let source = abbreviate_resource(tokens[0]);
    let target = abbreviate_resource(tokens[2]);

    let from_id = table.find_by_resource(&source);
    if from_id == crate::article_table::NOT_FOUND {
        return;
    }
    let to_id = table.find_by_resource(&target);
    if to_id == crate::article_table::NOT_FOUND {
        return;
    }

    let n = writer_txs.len() as u32;
    writer_txs[(from_id % n) as usize].push((from_id, to_id, true));
    if incoming {
        writer_txs[(to_id % n) as usize].push((to_id, from_id, false));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bzip2::write::BzEncoder;
    use bzip2::Compression;
    use std::io::Write;

    fn bzip2_fixture(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.bz2");
        let file = std::fs::File::create(&path).unwrap();
        let mut encoder = BzEncoder::new(file, Compression::best());
        encoder.write_all(contents.as_bytes()).unwrap();
        encoder.finish().unwrap();
        (dir, path)
    }

    #[test]
    fn read_labels_builds_a_finalized_table() {
        let (_dir, path) = bzip2_fixture(concat!(
            "<http://dbpedia.org/resource/Apple> <foo> \"Apple\"@en .\n",
            "<http://dbpedia.org/resource/New_York> <foo> \"New York\"@en .\n",
            "# a comment line\n",
            "malformed\n",
        ));

        let table = read_labels(&path).unwrap();
        assert_eq!(table.len(), 2);
        let apple = table.find_by_resource("Apple");
        assert_ne!(apple, crate::article_table::NOT_FOUND);
        assert_eq!(table.label_of(apple).unwrap(), "Apple");
    }

    // S7 — end-to-end ingest
    #[test]
    fn end_to_end_ingest_scenario() {
        let (_labels_dir, labels_path) = bzip2_fixture(concat!(
            "<http://dbpedia.org/resource/Apple> <foo> \"Apple\"@en .\n",
            "<http://dbpedia.org/resource/Banana_Republic> <foo> \"Banana Republic\"@en .\n",
            "<http://dbpedia.org/resource/Cherry> <foo> \"Cherry\"@en .\n",
        ));
        let (_links_dir, links_path) = bzip2_fixture(concat!(
            "<http://dbpedia.org/resource/Apple> <foo> <http://dbpedia.org/resource/Banana_Republic> .\n",
            "<http://dbpedia.org/resource/Banana_Republic> <foo> <http://dbpedia.org/resource/Cherry> .\n",
        ));

        let table = read_labels(&labels_path).unwrap();
        let mut adjacency = AdjacencyStore::new();
        adjacency.resize(table.len());
        let n = read_page_links(&table, &adjacency, &links_path, true).unwrap();
        assert_eq!(n, 2);

        let apple = table.find_by_resource("Apple");
        let banana = table.find_by_resource("Banana_Republic");
        let cherry = table.find_by_resource("Cherry");

        assert!(adjacency.outgoing_exists(apple, banana).unwrap());
        assert!(adjacency.outgoing_exists(banana, cherry).unwrap());

        let exclude = std::collections::HashSet::new();
        let mut bfs = crate::bfs::Bfs::new(&adjacency, &exclude, apple, cherry, true).unwrap();
        assert_eq!(bfs.next_path(), vec![apple, banana, cherry]);
    }
}
