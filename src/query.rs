/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The interactive query façade: parses one line of textual command at a
//! time from a reader and dispatches it against the article table, the
//! adjacency store, and the BFS engine, writing formatted results to a
//! writer.
//!
//! Every command line is independent and errors never abort the session:
//! a malformed or out-of-range command is reported on the output stream
//! and the façade goes back to reading the next line.

use crate::adjacency::{is_incoming, is_outgoing, target_of, AdjacencyStore};
use crate::article_table::{ArticleId, ArticleTable, NOT_FOUND};
use crate::bfs::Bfs;
use crate::error::{Result, WikiError};
use std::collections::HashSet;
use std::io::{BufRead, Write};

/// Holds the excluded-node set that persists across `path-exclude-*`
/// commands, and the in-flight search (if any) of a `*`-suffixed path
/// command awaiting its next `n`/`a` line.
pub struct Session<'a> {
    exclude: HashSet<ArticleId>,
    pending: Option<Bfs<'a>>,
}

impl Default for Session<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Session<'a> {
    pub fn new() -> Self {
        Session {
            exclude: HashSet::new(),
            pending: None,
        }
    }

    /// Reads commands from `input` until EOF, writing formatted results (and
    /// error messages) to `output`. Returns once the input is exhausted.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        table: &'a ArticleTable,
        adjacency: &'a AdjacencyStore,
        input: R,
        mut output: W,
    ) -> Result<()> {
        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Err(e) = self.dispatch(table, adjacency, line, &mut output) {
                writeln!(output, "error: {e}")?;
            }
        }
        Ok(())
    }

    fn dispatch<W: Write>(
        &mut self,
        table: &'a ArticleTable,
        adjacency: &'a AdjacencyStore,
        line: &str,
        output: &mut W,
    ) -> Result<()> {
        let mut parts = line.splitn(2, char::is_whitespace);
        let verb = parts.next().unwrap_or("");
        let rest = parts.next().unwrap_or("").trim();

        if self.pending.is_some() {
            return match verb {
                "n" => self.advance_pending(table, output),
                "a" => {
                    self.pending = None;
                    Ok(())
                }
                _ => Err(WikiError::UsageError(
                    "expected [n]ext or [a]bort".to_string(),
                )),
            };
        }

        match verb {
            "resource" => self.cmd_resource(table, rest, output),
            "label" => self.cmd_label(table, rest, output),
            "id" => self.cmd_id(table, rest, output),
            "outs" => self.cmd_links(table, adjacency, rest, true, false, output),
            "ins" => self.cmd_links(table, adjacency, rest, false, true, output),
            "inouts" => self.cmd_links(table, adjacency, rest, true, true, output),
            "path" => self.cmd_path(table, adjacency, rest, true, false, output),
            "path*" => self.cmd_path(table, adjacency, rest, true, true, output),
            "path-undirected" => self.cmd_path(table, adjacency, rest, false, false, output),
            "path-undirected*" => self.cmd_path(table, adjacency, rest, false, true, output),
            "path-exclude-add" => self.cmd_exclude_add(table, rest, output),
            "path-exclude-clear" => {
                self.exclude.clear();
                Ok(())
            }
            _ => Err(WikiError::UsageError(verb.to_string())),
        }
    }

    fn advance_pending<W: Write>(&mut self, table: &ArticleTable, output: &mut W) -> Result<()> {
        let bfs = self.pending.as_mut().expect("pending checked by caller");
        let path = bfs.next_path();
        if path.is_empty() {
            writeln!(output, "no (more) path found")?;
            self.pending = None;
            return Ok(());
        }
        for &id in &path {
            write_article(table, id, output)?;
        }
        writeln!(output, "[n]ext/[a]bort")?;
        Ok(())
    }

    fn cmd_resource<W: Write>(&self, table: &ArticleTable, arg: &str, output: &mut W) -> Result<()> {
        let id = table.find_by_resource(arg);
        if id == NOT_FOUND {
            return Err(WikiError::LookupMiss(format!("resource not found: {arg}")));
        }
        write_article(table, id, output)
    }

    fn cmd_label<W: Write>(&self, table: &ArticleTable, arg: &str, output: &mut W) -> Result<()> {
        let id = table.find_by_label(arg);
        if id == NOT_FOUND {
            return Err(WikiError::LookupMiss(format!("label not found: {arg}")));
        }
        write_article(table, id, output)
    }

    fn cmd_id<W: Write>(&self, table: &ArticleTable, arg: &str, output: &mut W) -> Result<()> {
        let id = parse_id(arg)?;
        write_article(table, id, output)
    }

    fn cmd_links<W: Write>(
        &self,
        table: &ArticleTable,
        adjacency: &AdjacencyStore,
        arg: &str,
        want_out: bool,
        want_in: bool,
        output: &mut W,
    ) -> Result<()> {
        let id = parse_id(arg)?;
        for link in adjacency.links_of(id, want_out, want_in)? {
            let mut marker = [b'[', b' ', b'-', b' ', b']'];
            if is_incoming(link) {
                marker[1] = b'<';
            }
            if is_outgoing(link) {
                marker[3] = b'>';
            }
            let marker = std::str::from_utf8(&marker).unwrap();
            write!(output, "{marker} ")?;
            write_article(table, target_of(link), output)?;
        }
        Ok(())
    }

    fn cmd_path<W: Write>(
        &mut self,
        table: &'a ArticleTable,
        adjacency: &'a AdjacencyStore,
        arg: &str,
        directed: bool,
        interactive: bool,
        output: &mut W,
    ) -> Result<()> {
        let mut ids = arg.split_whitespace();
        let from = parse_id(ids.next().unwrap_or(""))?;
        let to = parse_id(ids.next().unwrap_or(""))?;

        let mut bfs = Bfs::new(adjacency, &self.exclude, from, to, directed)?;
        let path = bfs.next_path();
        if path.is_empty() {
            writeln!(output, "no (more) path found")?;
            return Ok(());
        }
        for &id in &path {
            write_article(table, id, output)?;
        }
        if interactive {
            writeln!(output, "[n]ext/[a]bort")?;
            self.pending = Some(bfs);
        }
        Ok(())
    }

    fn cmd_exclude_add<W: Write>(&mut self, table: &ArticleTable, arg: &str, output: &mut W) -> Result<()> {
        let id = parse_id(arg)?;
        // Validate the id resolves to a real article before admitting it.
        table.resource_of(id)?;
        self.exclude.insert(id);
        writeln!(output, "excluded {id}")?;
        Ok(())
    }
}

fn parse_id(arg: &str) -> Result<ArticleId> {
    arg.trim()
        .parse::<ArticleId>()
        .map_err(|_| WikiError::UsageError(format!("expected an article id, got: {arg}")))
}

fn write_article<W: Write>(table: &ArticleTable, id: ArticleId, output: &mut W) -> Result<()> {
    let resource = table.resource_of(id)?;
    let label = table.label_of(id)?;
    writeln!(output, "{id:>9} : {resource} \"{label}\"")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (ArticleTable, AdjacencyStore) {
        let mut table = ArticleTable::new();
        for (resource, label) in [
            ("Apple", "Apple"),
            ("Banana_Republic", "Banana Republic"),
            ("Cherry", "Cherry"),
        ] {
            table.append_unsafe(crate::article_table::CompressedLabel::new(resource, label));
        }
        table.finalize();

        let mut adjacency = AdjacencyStore::new();
        adjacency.resize(table.len());
        adjacency.add_edge(0, 1, true).unwrap();
        adjacency.add_edge(1, 2, true).unwrap();
        (table, adjacency)
    }

    fn run<'a>(
        session: &mut Session<'a>,
        table: &'a ArticleTable,
        adjacency: &'a AdjacencyStore,
        script: &str,
    ) -> String {
        let mut out = Vec::new();
        session
            .run(table, adjacency, script.as_bytes(), &mut out)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn resource_and_label_lookup() {
        let (table, adjacency) = fixture();
        let mut session = Session::new();
        let out = run(&mut session, &table, &adjacency, "resource Apple\nlabel Cherry\n");
        assert!(out.contains("Apple"));
        assert!(out.contains("Cherry"));
    }

    #[test]
    fn unknown_command_is_reported_and_session_continues() {
        let (table, adjacency) = fixture();
        let mut session = Session::new();
        let out = run(&mut session, &table, &adjacency, "bogus\nid 0\n");
        assert!(out.contains("error:"));
        assert!(out.contains("Apple"));
    }

    #[test]
    fn path_query_reports_shortest_path() {
        let (table, adjacency) = fixture();
        let mut session = Session::new();
        let out = run(&mut session, &table, &adjacency, "path 0 2\n");
        assert!(out.contains("Apple"));
        assert!(out.contains("Banana"));
        assert!(out.contains("Cherry"));
    }

    #[test]
    fn exclude_then_clear_round_trips() {
        let (table, adjacency) = fixture();
        let mut session = Session::new();
        let out = run(
            &mut session,
            &table,
            &adjacency,
            "path-exclude-add 1\npath 0 2\npath-exclude-clear\npath 0 2\n",
        );
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines.iter().any(|l| l.contains("no (more) path found")));
        assert!(lines.iter().filter(|l| l.contains("Cherry")).count() >= 1);
    }

    #[test]
    fn link_markers_follow_the_bracket_template() {
        let (table, _) = fixture();
        let mut adjacency = AdjacencyStore::new();
        adjacency.resize(table.len());
        // 0 -> 1 both ways (merged record), 0 -> 2 outgoing only.
        adjacency.add_edge(0, 1, true).unwrap();
        adjacency.add_edge(0, 1, false).unwrap();
        adjacency.add_edge(0, 2, true).unwrap();

        let mut session = Session::new();
        let out = run(&mut session, &table, &adjacency, "inouts 0\n");
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines.iter().any(|l| l.starts_with("[<->]") && l.contains("Banana")));
        assert!(lines.iter().any(|l| l.starts_with("[ ->]") && l.contains("Cherry")));
    }
}
