/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![doc = include_str!("../README.md")]

pub mod adjacency;
pub mod article_table;
pub mod bfs;
pub mod error;
pub mod ingest;
pub mod line_source;
pub mod normalize;
pub mod queue;
pub mod query;
pub mod tokenize;

/// Prelude module to import everything from this crate.
pub mod prelude {
    pub use crate::adjacency::*;
    pub use crate::article_table::*;
    pub use crate::bfs::*;
    pub use crate::error::*;
    pub use crate::ingest::*;
    pub use crate::query::*;
}
