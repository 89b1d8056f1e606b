//! Combined matching expressions for variable routes.
//!
//! Testing every variable route's regex one by one is wasteful, and
//! collapsing all of them into a single alternation is not possible either:
//! regex engines cap the number of distinguishable capture groups per
//! expression, and a flat alternation gives no way to tell which
//! alternative fired. The classic answer is group-count dispatch: split a
//! method's routes into chunks of roughly [`APPROX_CHUNK_SIZE`] and, within
//! a chunk, pad every alternative with trailing empty groups `()` so each
//! one produces a distinct, strictly increasing number of capture groups.
//! The group count of a successful match then identifies the alternative.
//!
//! Engines with branch-reset alternation restart group numbering per
//! alternative; the `regex` crate numbers groups globally, so each recovery
//! entry also records where the alternative's groups start in the flat
//! numbering.

use std::collections::HashMap;

use regex::Regex;

use super::core::VarRoute;

/// Target number of routes combined into one expression. Chunk sizes are
/// balanced: 25 routes become three chunks of at most 9 rather than
/// 10, 10, 5.
pub(crate) const APPROX_CHUNK_SIZE: usize = 10;

/// A bounded group of variable routes compiled into one alternation.
pub(crate) struct Chunk {
    regex: Regex,
    /// Participating-capture-group count of a match → how to read it.
    recovery: HashMap<usize, Recovery>,
}

struct Recovery {
    /// Index into the method's full route list.
    route: usize,
    /// Number of capture groups belonging to earlier alternatives.
    first_group: usize,
    num_vars: usize,
}

/// A successful chunk match: which route fired and its captured values in
/// placeholder order.
pub(crate) struct ChunkMatch {
    pub route: usize,
    pub values: Vec<String>,
}

/// Compiles a method's variable routes into balanced chunks, preserving
/// registration order across and within chunks.
pub(crate) fn compile(routes: &[VarRoute]) -> Vec<Chunk> {
    if routes.is_empty() {
        return Vec::new();
    }

    let count = routes.len();
    let num_parts = ((count as f64 / APPROX_CHUNK_SIZE as f64).round() as usize).max(1);
    let chunk_size = count.div_ceil(num_parts);

    routes
        .chunks(chunk_size)
        .enumerate()
        .map(|(i, group)| Chunk::build(group, i * chunk_size))
        .collect()
}

impl Chunk {
    fn build(routes: &[VarRoute], base: usize) -> Chunk {
        let mut alternatives = Vec::with_capacity(routes.len());
        let mut recovery = HashMap::with_capacity(routes.len());
        // Running padded group count; bumping it after every alternative
        // keeps the counts strictly increasing, which makes the recovery
        // keys unique within the chunk.
        let mut group_count = 0usize;
        let mut flat_offset = 0usize;

        for (i, route) in routes.iter().enumerate() {
            let num_vars = route.var_names.len();
            group_count = group_count.max(num_vars);

            let padding = group_count - num_vars;
            let mut alternative =
                String::with_capacity(route.regex_key.len() + padding * 2);
            alternative.push_str(&route.regex_key);
            for _ in 0..padding {
                alternative.push_str("()");
            }
            alternatives.push(alternative);

            recovery.insert(
                group_count,
                Recovery {
                    route: base + i,
                    first_group: flat_offset,
                    num_vars,
                },
            );

            flat_offset += group_count;
            group_count += 1;
        }

        let pattern = format!("^(?:{})$", alternatives.join("|"));
        let regex = Regex::new(&pattern).expect("failed to compile chunk expression");

        Chunk { regex, recovery }
    }

    /// Matches `path` against the chunk and recovers the winning route via
    /// its capture-group count.
    pub(crate) fn find(&self, path: &str) -> Option<ChunkMatch> {
        let captures = self.regex.captures(path)?;
        let participating = captures.iter().skip(1).flatten().count();
        let entry = &self.recovery[&participating];

        let values = (0..entry.num_vars)
            .map(|i| {
                captures
                    .get(entry.first_group + 1 + i)
                    .map_or_else(String::new, |m| m.as_str().to_string())
            })
            .collect();

        Some(ChunkMatch {
            route: entry.route,
            values,
        })
    }
}
