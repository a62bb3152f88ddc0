/*
 * This file is part of Hyperfan.
 *
 * Copyright (C) 2025 Hyperfan contributors
 *
 * Hyperfan is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Hyperfan is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Hyperfan. If not, see <https://www.gnu.org/licenses/>.
 */

//! Per cooling device transition statistics.
//!
//! Time spent in a state is accrued lazily: only a real transition or a read
//! of the time-in-state report folds the elapsed time into the current
//! state's bucket. A request for the state the device is already in is not a
//! transition and touches nothing.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde_json::json;

use crate::clock::Clock;
use crate::error::{Result, ThermalError};
use crate::logger;

static TRANS_TABLE_OVERFLOW_LOGGED: AtomicBool = AtomicBool::new(false);

#[derive(Debug)]
struct StatsInner {
    total_trans: u32,
    state: usize,
    last_time: Duration,
    time_in_state: Vec<Duration>,
    // row-major, row = from-state
    trans_table: Vec<u32>,
}

impl StatsInner {
    fn update_time_in_state(&mut self, now: Duration) {
        let delta = now.saturating_sub(self.last_time);
        self.time_in_state[self.state] += delta;
        self.last_time = now;
    }
}

/// Snapshot of the from-state × to-state transition counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTable {
    states: usize,
    counts: Vec<u32>,
}

impl TransitionTable {
    pub fn states(&self) -> usize {
        self.states
    }

    pub fn get(&self, from: usize, to: usize) -> u32 {
        self.counts[from * self.states + to]
    }

    pub fn row(&self, from: usize) -> &[u32] {
        &self.counts[from * self.states..(from + 1) * self.states]
    }

    pub fn is_zero(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// Fixed-width text matrix, refused once it would fill `page_size` bytes.
    pub fn render(&self, page_size: usize) -> Result<String> {
        let mut out = String::new();
        out.push_str(" From  :    To\n");
        out.push_str("       : ");
        for i in 0..self.states {
            if out.len() >= page_size {
                break;
            }
            let _ = write!(out, "state{:2}  ", i);
        }
        if out.len() < page_size {
            out.push('\n');
        }
        for i in 0..self.states {
            if out.len() >= page_size {
                break;
            }
            let _ = write!(out, "state{:2}:", i);
            for count in self.row(i) {
                let _ = write!(out, "{:8} ", count);
            }
            out.push('\n');
        }

        if out.len() >= page_size {
            if !TRANS_TABLE_OVERFLOW_LOGGED.swap(true, Ordering::Relaxed) {
                logger::log_event(
                    "trans_table_overflow",
                    json!({ "states": self.states, "page_size": page_size }),
                );
            }
            return Err(ThermalError::OverCapacity {
                what: "trans_table",
                len: out.len(),
                max: page_size,
            });
        }
        Ok(out)
    }
}

pub struct CoolingStats {
    clock: Arc<dyn Clock>,
    max_states: usize,
    inner: Mutex<StatsInner>,
}

impl std::fmt::Debug for CoolingStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoolingStats")
            .field("max_states", &self.max_states)
            .field("inner", &*self.lock())
            .finish()
    }
}

impl CoolingStats {
    /// Stats for a device whose highest state is `max_state`; the device is
    /// assumed to start in state 0.
    pub fn new(max_state: u64, clock: Arc<dyn Clock>) -> Result<Self> {
        let states = usize::try_from(max_state)
            .ok()
            .and_then(|m| m.checked_add(1))
            .ok_or(ThermalError::OutOfMemory("cooling stats"))?;
        let cells = states
            .checked_mul(states)
            .ok_or(ThermalError::OutOfMemory("cooling stats"))?;

        let mut time_in_state = Vec::new();
        time_in_state.try_reserve_exact(states)?;
        time_in_state.resize(states, Duration::ZERO);
        let mut trans_table = Vec::new();
        trans_table.try_reserve_exact(cells)?;
        trans_table.resize(cells, 0);

        let now = clock.now();
        Ok(Self {
            clock,
            max_states: states,
            inner: Mutex::new(StatsInner {
                total_trans: 0,
                state: 0,
                last_time: now,
                time_in_state,
                trans_table,
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, StatsInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Number of states, i.e. max state + 1.
    pub fn max_states(&self) -> usize {
        self.max_states
    }

    pub fn current_state(&self) -> usize {
        self.lock().state
    }

    /// Returns whether a transition was counted.
    pub fn record_transition(&self, new_state: usize) -> Result<bool> {
        if new_state >= self.max_states {
            return Err(ThermalError::invalid(format!(
                "state {} beyond max state {}",
                new_state,
                self.max_states - 1
            )));
        }
        let mut inner = self.lock();
        if inner.state == new_state {
            return Ok(false);
        }
        let now = self.clock.now();
        inner.update_time_in_state(now);
        let from = inner.state;
        inner.trans_table[from * self.max_states + new_state] += 1;
        inner.state = new_state;
        inner.total_trans += 1;
        Ok(true)
    }

    pub fn total_transitions(&self) -> u32 {
        self.lock().total_trans
    }

    /// Cumulative time per state, current up to this call.
    pub fn time_in_state(&self) -> Vec<(usize, Duration)> {
        let mut inner = self.lock();
        let now = self.clock.now();
        inner.update_time_in_state(now);
        inner.time_in_state.iter().copied().enumerate().collect()
    }

    pub fn time_in_state_ms(&self) -> Vec<(usize, u64)> {
        self.time_in_state()
            .into_iter()
            .map(|(state, t)| (state, t.as_millis() as u64))
            .collect()
    }

    pub fn transition_table(&self) -> TransitionTable {
        let inner = self.lock();
        TransitionTable {
            states: self.max_states,
            counts: inner.trans_table.clone(),
        }
    }

    /// Zero every counter. Time elapsed since the last accrual is discarded.
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.total_trans = 0;
        inner.last_time = self.clock.now();
        inner.trans_table.iter_mut().for_each(|c| *c = 0);
        inner.time_in_state.iter_mut().for_each(|t| *t = Duration::ZERO);
    }

    pub fn render_total_trans(&self) -> String {
        format!("{}\n", self.total_transitions())
    }

    pub fn render_time_in_state(&self) -> String {
        let mut out = String::new();
        for (state, ms) in self.time_in_state_ms() {
            let _ = writeln!(out, "state{}\t{}", state, ms);
        }
        out
    }

    pub fn render_trans_table(&self, page_size: usize) -> Result<String> {
        self.transition_table().render(page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn stats_with_clock(max_state: u64) -> (CoolingStats, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let stats = CoolingStats::new(max_state, clock.clone()).unwrap();
        (stats, clock)
    }

    fn total_ms(stats: &CoolingStats) -> u64 {
        stats.time_in_state_ms().iter().map(|(_, ms)| ms).sum()
    }

    #[test]
    fn test_new_sizes_from_max_state() {
        let (stats, _) = stats_with_clock(3);
        assert_eq!(stats.max_states(), 4);
        assert_eq!(stats.transition_table().states(), 4);
        assert_eq!(stats.time_in_state().len(), 4);
        assert_eq!(stats.current_state(), 0);
    }

    #[test]
    fn test_new_rejects_unrepresentable_size() {
        let clock = Arc::new(ManualClock::new());
        assert!(matches!(
            CoolingStats::new(u64::MAX, clock),
            Err(ThermalError::OutOfMemory(_))
        ));
    }

    #[test]
    fn test_same_state_is_noop() {
        let (stats, clock) = stats_with_clock(2);
        clock.advance_ms(100);
        assert!(!stats.record_transition(0).unwrap());
        assert_eq!(stats.total_transitions(), 0);
        assert!(stats.transition_table().is_zero());
    }

    #[test]
    fn test_transition_counts_once() {
        let (stats, clock) = stats_with_clock(2);
        clock.advance_ms(10);
        assert!(stats.record_transition(2).unwrap());
        clock.advance_ms(10);
        assert!(stats.record_transition(1).unwrap());
        assert!(!stats.record_transition(1).unwrap());

        let table = stats.transition_table();
        assert_eq!(table.get(0, 2), 1);
        assert_eq!(table.get(2, 1), 1);
        assert_eq!(table.get(1, 1), 0);
        assert_eq!(stats.total_transitions(), 2);
        assert_eq!(table.row(0), &[0, 0, 1]);
    }

    #[test]
    fn test_diagonal_never_incremented() {
        let (stats, _) = stats_with_clock(3);
        for s in [1, 1, 2, 2, 0, 0, 3, 3] {
            stats.record_transition(s).unwrap();
        }
        let table = stats.transition_table();
        for i in 0..4 {
            assert_eq!(table.get(i, i), 0);
        }
        assert_eq!(stats.total_transitions(), 4);
    }

    #[test]
    fn test_record_rejects_out_of_range_state() {
        let (stats, _) = stats_with_clock(1);
        assert!(stats.record_transition(2).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_time_in_state_accrual() {
        let (stats, clock) = stats_with_clock(2);
        clock.advance_ms(100);
        stats.record_transition(1).unwrap();
        clock.advance_ms(250);
        stats.record_transition(2).unwrap();
        clock.advance_ms(40);

        assert_eq!(stats.time_in_state_ms(), vec![(0, 100), (1, 250), (2, 40)]);
    }

    #[test]
    fn test_time_sum_matches_elapsed() {
        let (stats, clock) = stats_with_clock(4);
        for (ms, s) in [(7, 3), (13, 1), (0, 1), (21, 4), (5, 0)] {
            clock.advance_ms(ms);
            stats.record_transition(s).unwrap();
        }
        clock.advance_ms(9);
        assert_eq!(total_ms(&stats), 7 + 13 + 21 + 5 + 9);
    }

    #[test]
    fn test_same_state_request_keeps_timer_baseline() {
        let (stats, clock) = stats_with_clock(1);
        stats.record_transition(1).unwrap();
        clock.advance_ms(30);
        stats.record_transition(1).unwrap();
        clock.advance_ms(30);
        stats.record_transition(0).unwrap();
        assert_eq!(stats.time_in_state_ms(), vec![(0, 0), (1, 60)]);
    }

    #[test]
    fn test_reset_discards_elapsed_time() {
        let (stats, clock) = stats_with_clock(2);
        clock.advance_ms(50);
        stats.record_transition(2).unwrap();
        clock.advance_ms(70);
        stats.reset();

        assert!(stats.transition_table().is_zero());
        assert_eq!(stats.total_transitions(), 0);
        assert_eq!(total_ms(&stats), 0);
        // state survives a reset
        assert_eq!(stats.current_state(), 2);

        clock.advance_ms(15);
        assert_eq!(stats.time_in_state_ms(), vec![(0, 0), (1, 0), (2, 15)]);
    }

    #[test]
    fn test_render_time_in_state() {
        let (stats, clock) = stats_with_clock(1);
        clock.advance_ms(12);
        stats.record_transition(1).unwrap();
        clock.advance_ms(3);
        assert_eq!(stats.render_time_in_state(), "state0\t12\nstate1\t3\n");
        assert_eq!(stats.render_total_trans(), "1\n");
    }

    #[test]
    fn test_render_trans_table_layout() {
        let (stats, _) = stats_with_clock(1);
        stats.record_transition(1).unwrap();
        stats.record_transition(0).unwrap();
        stats.record_transition(1).unwrap();

        let text = stats.render_trans_table(4096).unwrap();
        let expected = concat!(
            " From  :    To\n",
            "       : state 0  state 1  \n",
            "state 0:       0        2 \n",
            "state 1:       1        0 \n",
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_trans_table_over_capacity() {
        let (stats, _) = stats_with_clock(40);
        let err = stats.render_trans_table(4096).unwrap_err();
        assert!(matches!(err, ThermalError::OverCapacity { max: 4096, .. }));

        let (small, _) = stats_with_clock(3);
        assert!(small.render_trans_table(4096).is_ok());
    }

    #[test]
    fn test_concurrent_transitions_are_all_counted() {
        let (stats, _) = stats_with_clock(7);
        let stats = Arc::new(stats);
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let stats = Arc::clone(&stats);
                std::thread::spawn(move || {
                    for i in 0..500usize {
                        let _ = stats.record_transition((i + t) % 8);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let table = stats.transition_table();
        let sum: u64 = (0..8).flat_map(|i| table.row(i).to_vec()).map(u64::from).sum();
        assert_eq!(sum, u64::from(stats.total_transitions()));
        for i in 0..8 {
            assert_eq!(table.get(i, i), 0);
        }
    }
}
