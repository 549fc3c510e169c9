use thiserror::Error;

use crate::Call;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GroupError {

    #[error("collective call #{generation} does not match across the group: {}", describe(.calls))]
    Mismatch { generation: u64, calls: Vec<Call> },

    #[error("rank {rank} left the group while a collective call was pending")]
    Departed { rank: usize },

    #[error("process group state was poisoned by a panicking member")]
    Poisoned,

    #[error("rank {rank} is not valid in a group of size {size}")]
    InvalidContext { rank: usize, size: usize },
}

fn describe(calls: &[Call]) -> String {
    calls.iter()
        .enumerate()
        .map(|(rank, call)| format!("rank {rank}: {call}"))
        .collect::<Vec<_>>()
        .join(", ")
}
