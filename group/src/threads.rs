//! Simulated process group whose members are threads of a single process.
//!
//! Each member owns a [`Member`] handle. Collective calls rendezvous on a
//! shared, mutex-protected table: the last member to arrive checks that all
//! calls match, performs any reduction, and wakes the others.
//!
//! Instead of deadlocking, the group fails fast when
//!
//! + the members issue different calls at the same position, or
//!
//! + a member drops its handle while others still expect it to take part in
//!   a collective call.
//!
//! Either failure poisons the group: every later collective call fails too.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;

use ndarray::azip;

use crate::{Call, Context, GroupError, ProcessGroup, Result};

/// Constructor of simulated groups
pub struct ThreadGroup;

impl ThreadGroup {

    /// Handles for every member of a new group of `size` members, in rank order
    pub fn members(size: usize) -> Result<Vec<Member>> {
        if size == 0 { return Err(GroupError::InvalidContext { rank: 0, size }) }
        let shared = Arc::new(Shared {
            state: Mutex::new(State::new(size)),
            turn: Condvar::new(),
        });
        (0..size)
            .map(|rank| Ok(Member { context: Context::new(rank, size)?, shared: Arc::clone(&shared) }))
            .collect()
    }

    /// Run `body` once per member, each on its own thread.
    ///
    /// Returns the values produced by each member, in rank order. A panic in
    /// any member is propagated to the caller.
    pub fn run<T, F>(size: usize, body: F) -> Result<Vec<T>>
    where
        F: Fn(Member) -> T + Sync,
        T: Send,
    {
        let members = Self::members(size)?;
        Ok(thread::scope(|scope| {
            let body = &body;
            let handles: Vec<_> = members
                .into_iter()
                .map(|member| scope.spawn(move || body(member)))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                .collect()
        }))
    }
}

/// One member's handle on a [`ThreadGroup`].
///
/// Dropping the handle signals that this member will not take part in any
/// further collective calls.
pub struct Member {
    context: Context,
    shared: Arc<Shared>,
}

struct Shared {
    state: Mutex<State>,
    turn: Condvar,
}

struct State {
    size: usize,
    /// Number of collective calls completed so far
    generation: u64,
    calls: Vec<Option<Call>>,
    contributions: Vec<Option<Vec<f32>>>,
    n_arrived: usize,
    /// Result of the latest reduction, waiting to be collected by the coordinator
    reduced: Option<Vec<f32>>,
    failure: Option<GroupError>,
    departed: Option<usize>,
}

impl State {

    fn new(size: usize) -> Self {
        Self {
            size,
            generation: 0,
            calls: vec![None; size],
            contributions: vec![None; size],
            n_arrived: 0,
            reduced: None,
            failure: None,
            departed: None,
        }
    }

    fn check(&self) -> Result<()> {
        if let Some(error) = &self.failure { return Err(error.clone()) }
        if let Some(rank)  =  self.departed { return Err(GroupError::Departed { rank }) }
        Ok(())
    }

    /// Called by the last member to arrive at the current collective call
    fn complete(&mut self) -> Result<()> {
        let calls: Vec<Call> = self.calls.iter_mut().filter_map(Option::take).collect();
        let contributions: Vec<Vec<f32>> = self.contributions.iter_mut().filter_map(Option::take).collect();
        self.n_arrived = 0;

        if calls.iter().any(|call| call != &calls[0]) {
            let error = GroupError::Mismatch { generation: self.generation, calls };
            self.failure = Some(error.clone());
            return Err(error);
        }

        if let Call::SumReduce { len } = calls[0] {
            // Summed in rank order, so the result does not depend on arrival order
            let mut total = vec![0.0; len];
            for contribution in &contributions {
                azip!((t in &mut total[..], &c in &contribution[..]) *t += c);
            }
            self.reduced = Some(total);
        }
        self.generation += 1;
        Ok(())
    }
}

impl Member {

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.shared.state.lock().map_err(|_| GroupError::Poisoned)
    }

    fn collective(&self, call: Call, contribution: Option<Vec<f32>>) -> Result<Option<Vec<f32>>> {
        let rank = self.context.rank();
        let mut state = self.lock()?;
        state.check()?;

        let generation = state.generation;
        state.calls[rank] = Some(call);
        state.contributions[rank] = contribution;
        state.n_arrived += 1;

        if state.n_arrived == state.size {
            let completed = state.complete();
            self.shared.turn.notify_all();
            completed?;
        } else {
            while state.generation == generation {
                state.check()?;
                state = self.shared.turn.wait(state).map_err(|_| GroupError::Poisoned)?;
            }
        }
        Ok(if self.context.is_coordinator() { state.reduced.take() } else { None })
    }
}

impl ProcessGroup for Member {

    fn context(&self) -> Context { self.context }

    fn synchronize(&self, call: Call) -> Result<()> {
        self.collective(call, None).map(|_| ())
    }

    fn sum_reduce(&self, local: Vec<f32>) -> Result<Option<Vec<f32>>> {
        self.collective(Call::SumReduce { len: local.len() }, Some(local))
    }
}

impl Drop for Member {
    fn drop(&mut self) {
        if let Ok(mut state) = self.shared.state.lock() {
            state.departed.get_or_insert(self.context.rank());
            self.shared.turn.notify_all();
        }
    }
}
