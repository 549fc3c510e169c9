//! Static division of the projections among the members of a group.
//!
//! Every member recomputes the same partition from the shared constants, so
//! no communication is needed to agree on it.

use std::ops::Range;

use group::Context;
use serde::Deserialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Partitioning {
    /// Equal shares of `total / size`; the last rank also takes the remainder
    #[default]
    RemainderToLast,
    /// Share sizes differ by at most one; the first `total % size` ranks take
    /// one extra projection each
    Balanced,
}

/// Half-open range of projection ids processed by the member in `context`
pub fn assigned(total: usize, context: Context, partitioning: Partitioning) -> Range<usize> {
    let (rank, size) = (context.rank(), context.size());
    let share = total / size;
    match partitioning {
        Partitioning::RemainderToLast => {
            let start = rank * share;
            let stop = if context.is_last() { total } else { start + share };
            start..stop
        }
        Partitioning::Balanced => {
            let extra = total % size;
            let start = rank * share + rank.min(extra);
            let stop = start + share + usize::from(rank < extra);
            start..stop
        }
    }
}
