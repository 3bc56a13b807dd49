/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use wikigraph::adjacency::AdjacencyStore;
use wikigraph::ingest::{read_labels, read_page_links};
use wikigraph::query::Session;

#[derive(Parser, Debug)]
#[command(
    name = "wikigraph",
    about = "An in-memory graph database over a Wikipedia-like dump corpus."
)]
struct CliArgs {
    /// Path to the bzip2-compressed labels dump.
    #[arg(long)]
    labels: Option<PathBuf>,

    /// Path to the bzip2-compressed page-links dump.
    #[arg(long)]
    links: Option<PathBuf>,

    /// Also add the reverse edge for every parsed page link.
    #[arg(long, default_value_t = false)]
    inlinks: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut cli_args = CliArgs::command();
    let args = CliArgs::parse();

    let Some(labels) = &args.labels else {
        cli_args.print_help()?;
        println!();
        std::process::exit(1);
    };

    let table = read_labels(labels)?;
    let mut adjacency = AdjacencyStore::new();

    if let Some(links) = &args.links {
        adjacency.resize(table.len());
        read_page_links(&table, &adjacency, links, args.inlinks)?;
    }

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut session = Session::new();
    session.run(&table, &adjacency, stdin.lock(), stdout.lock())?;

    Ok(())
}
