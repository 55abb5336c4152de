/*
 * This file is part of Sensorpoll.
 *
 * Copyright (C) 2025 Sensorpoll contributors
 *
 * Sensorpoll is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Sensorpoll is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Sensorpoll. If not, see <https://www.gnu.org/licenses/>.
 */

//! The poll loop and its cancellation token.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, info};

use crate::backend::SensorBackend;
use crate::collector::WorkingSet;
use crate::emitter::emit_cycle;
use crate::error::Result;

#[derive(Debug, Default)]
struct Shared {
    cancelled: AtomicBool,
    lock: Mutex<()>,
    wake: Condvar,
}

/// Cancellation request shared between the interrupt handler and the poll
/// loop. Set once, never reset.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    shared: Arc<Shared>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.shared.cancelled.store(true, Ordering::SeqCst);
        let _guard = self.shared.lock.lock();
        self.shared.wake.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.cancelled.load(Ordering::SeqCst)
    }

    /// Sleep for `timeout` or until cancelled. Returns whether the token was
    /// cancelled when the wait ended.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut guard = self.shared.lock.lock();
        while !self.is_cancelled() {
            if self.shared.wake.wait_until(&mut guard, deadline).timed_out() {
                break;
            }
        }
        self.is_cancelled()
    }
}

/// Route SIGINT/SIGTERM to `token`. The handler does nothing but cancel.
pub fn install_interrupt_handler(token: &CancellationToken) -> Result<()> {
    let token = token.clone();
    ctrlc::set_handler(move || token.cancel())?;
    debug!("interrupt handler installed");
    Ok(())
}

/// Emit cycles over `set` every `interval` until `token` is cancelled.
///
/// Cancellation is only checked between cycles; a cycle that has started
/// always completes. Returns the number of cycles emitted.
pub fn run<B, O, E>(
    backend: &B,
    chip: &B::Chip,
    set: &WorkingSet,
    interval: Duration,
    token: &CancellationToken,
    out: &mut O,
    err: &mut E,
) -> io::Result<u64>
where
    B: SensorBackend,
    O: Write + ?Sized,
    E: Write + ?Sized,
{
    let mut cycles = 0u64;

    while !token.is_cancelled() {
        let report = emit_cycle(backend, chip, set, out, err)?;
        cycles += 1;
        debug!(cycle = cycles, emitted = report.emitted, failed = report.failed, "poll cycle done");
        token.wait_timeout(interval);
    }

    info!(cycles, "poll loop stopped");
    Ok(cycles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::collect_readable;
    use crate::test_utils::test_utils::{FakeBackend, FakeChip, FakePoint, FlushHook};
    use std::cell::Cell;
    use std::rc::Rc;
    use std::thread;

    fn chip() -> FakeChip {
        FakeChip::new("acme-1").feature(
            "temp1",
            vec![FakePoint::ok("temp1_input", 40.0), FakePoint::ok("temp1_max", 80.0)],
        )
    }

    #[test]
    fn test_token_starts_clear_and_stays_set() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
        token.cancel();
        assert!(token.clone().is_cancelled());
    }

    #[test]
    fn test_wait_times_out_without_cancel() {
        let token = CancellationToken::new();
        let start = Instant::now();
        assert!(!token.wait_timeout(Duration::from_millis(30)));
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_wait_returns_early_on_cancel() {
        let token = CancellationToken::new();
        let remote = token.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            remote.cancel();
        });

        let start = Instant::now();
        assert!(token.wait_timeout(Duration::from_secs(30)));
        assert!(start.elapsed() < Duration::from_secs(10));
        handle.join().unwrap();
    }

    #[test]
    fn test_cancelled_before_start_emits_nothing() {
        let chip = chip();
        let backend = FakeBackend::new().chip(chip.clone());
        let set = collect_readable(&backend, &chip).unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let mut out = Vec::new();
        let mut err = Vec::new();
        let cycles = run(&backend, &chip, &set, Duration::from_secs(60), &token, &mut out, &mut err).unwrap();
        assert_eq!(cycles, 0);
        assert!(out.is_empty());
        assert_eq!(backend.read_count("temp1_input"), 0);
    }

    #[test]
    fn test_cancel_mid_cycle_finishes_that_cycle_only() {
        let chip = chip();
        let token = CancellationToken::new();
        let remote = token.clone();
        // Cancel while the first point of the second cycle is being read.
        let reads = Rc::new(Cell::new(0));
        let counter = reads.clone();
        let backend = FakeBackend::new().chip(chip.clone()).on_read(move |_| {
            counter.set(counter.get() + 1);
            if counter.get() == 3 {
                remote.cancel();
            }
        });
        let set = collect_readable(&backend, &chip).unwrap();

        let mut out = Vec::new();
        let mut err = Vec::new();
        let cycles = run(&backend, &chip, &set, Duration::from_millis(1), &token, &mut out, &mut err).unwrap();

        assert_eq!(cycles, 2);
        assert_eq!(reads.get(), 4);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("temp1_max|float|80.000000\n").count(), 2);
        assert!(text.ends_with("\n\n"));
    }

    #[test]
    fn test_cancel_during_sleep_stops_promptly() {
        let chip = chip();
        let backend = FakeBackend::new().chip(chip.clone());
        let set = collect_readable(&backend, &chip).unwrap();
        let token = CancellationToken::new();
        let remote = token.clone();
        let mut out = FlushHook::new(move || remote.cancel());
        let mut err = Vec::new();

        let start = Instant::now();
        let cycles = run(&backend, &chip, &set, Duration::from_secs(3600), &token, &mut out, &mut err).unwrap();

        assert_eq!(cycles, 1);
        assert!(start.elapsed() < Duration::from_secs(60));
        assert_eq!(out.text(), "temp1_input|float|40.000000\ntemp1_max|float|80.000000\n\n");
    }
}
