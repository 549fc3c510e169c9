//! Process groups whose members cooperate through collective operations.
//!
//! Every member of a group runs the same program with a different rank. The
//! members coordinate only through *collective* calls: operations which every
//! member must invoke, in the same order and with matching arguments, before
//! any of them can complete.
//!
//! Skipping a collective on any member, or issuing a different one, would
//! deadlock a real multi-process group. The in-process [`ThreadGroup`] fails
//! fast instead: the participants of a mismatched call all receive a
//! [`GroupError`].

pub mod error;
pub mod threads;

pub use error::GroupError;
pub use threads::{Member, ThreadGroup};

use std::fmt;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, GroupError>;

/// Rank of this member and size of the group it belongs to.
///
/// Passed explicitly to everything that needs to know which member it is
/// running in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Context {
    rank: usize,
    size: usize,
}

impl Context {

    pub fn new(rank: usize, size: usize) -> Result<Self> {
        if size == 0 || rank >= size { return Err(GroupError::InvalidContext { rank, size }) }
        Ok(Self { rank, size })
    }

    /// Context of the only member of a single-member group
    pub fn solo() -> Self { Self { rank: 0, size: 1 } }

    pub fn rank(&self) -> usize { self.rank }
    pub fn size(&self) -> usize { self.size }

    /// The coordinator (rank 0) collects reductions and writes results
    pub fn is_coordinator(&self) -> bool { self.rank == 0 }

    pub fn is_last(&self) -> bool { self.rank + 1 == self.size }
}

/// Description of one collective step.
///
/// All members of a group must issue equal `Call`s at the same position in
/// their sequences of collective operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    /// Read `len` floats from `path`, starting at element `offset`
    Read { path: PathBuf, offset: u64, len: usize },
    /// Element-wise sum of `len` floats contributed by every member
    SumReduce { len: usize },
    Barrier,
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Call::Read { path, offset, len } => write!(f, "read({}, offset {offset}, {len} floats)", path.display()),
            Call::SumReduce { len }          => write!(f, "sum-reduce({len} floats)"),
            Call::Barrier                    => write!(f, "barrier"),
        }
    }
}

/// Collective operations available to a member of a process group.
pub trait ProcessGroup {

    fn context(&self) -> Context;

    /// Block until every member has issued `call`.
    ///
    /// Fails if any member issued a different call at this position.
    fn synchronize(&self, call: Call) -> Result<()>;

    /// Element-wise sum of the `local` contributions of all members.
    ///
    /// Only the coordinator receives the sum; every other member gets `None`.
    /// All contributions must have the same length.
    fn sum_reduce(&self, local: Vec<f32>) -> Result<Option<Vec<f32>>>;

    /// Block until every member has reached this point
    fn barrier(&self) -> Result<()> { self.synchronize(Call::Barrier) }
}

/// A group with exactly one member: every collective completes immediately.
#[derive(Clone, Copy, Debug, Default)]
pub struct Solo;

impl ProcessGroup for Solo {
    fn context(&self) -> Context { Context::solo() }
    fn synchronize(&self, _call: Call) -> Result<()> { Ok(()) }
    fn sum_reduce(&self, local: Vec<f32>) -> Result<Option<Vec<f32>>> { Ok(Some(local)) }
}

#[cfg(test)]
mod test_context {
    use super::*;
    use rstest::rstest;

    #[rstest(/**/ rank, size, valid,
             case(0, 1, true),
             case(3, 4, true),
             case(4, 4, false),
             case(0, 0, false),
    )]
    fn context_validation(rank: usize, size: usize, valid: bool) {
        assert_eq!(Context::new(rank, size).is_ok(), valid);
    }

    #[test]
    fn coordinator_and_last() {
        let first = Context::new(0, 3).unwrap();
        let last  = Context::new(2, 3).unwrap();
        assert!( first.is_coordinator());
        assert!(!first.is_last());
        assert!(!last .is_coordinator());
        assert!( last .is_last());
        assert!(Context::solo().is_coordinator() && Context::solo().is_last());
    }

    #[test]
    fn solo_reduction_returns_contribution() -> Result<()> {
        let local = vec![1.0, 2.0, 3.0];
        assert_eq!(Solo.sum_reduce(local.clone())?, Some(local));
        Solo.barrier()
    }
}
