// Copyright 2026 the Ferry Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Periodic transfer scheduling.
//!
//! The [`TransferScheduler`] decides, on a fixed cadence, which stack sends an
//! item where. It never touches the registry itself: [`poll`] and [`step`]
//! read stack lengths through a caller-supplied closure and return a [`Step`]
//! for the caller to carry out.
//!
//! Destinations follow a fixed [`RotationSchedule`]: source `i` targets
//! `i + 1, i + 2, …` (mod N), skipping itself. The source moves on to
//! `i + 1` when the current one is empty or when the [`SourcePolicy`] says so.
//!
//! [`poll`]: TransferScheduler::poll
//! [`step`]: TransferScheduler::step

use alloc::vec::Vec;

use crate::config::{SceneConfig, SourcePolicy};
use crate::registry::StackId;
use crate::time::{Duration, HostTime};

/// Lifecycle of a [`TransferScheduler`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SchedulerState {
    /// Created but not yet started.
    #[default]
    Idle,
    /// Producing steps on its cadence.
    Running,
    /// Halted for good; flights already launched are unaffected.
    Stopped,
}

/// Why the scheduler moved to a new source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AdvanceReason {
    /// A tick found the source empty; no launch happened.
    Empty,
    /// The per-source move cap was reached.
    MoveCap,
    /// The launch took the source's last item.
    Drained,
}

/// A change of source stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Advance {
    /// Previous source.
    pub from: StackId,
    /// New source.
    pub to: StackId,
    /// Why.
    pub reason: AdvanceReason,
}

/// What one scheduler tick asks the caller to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    /// Launch the top item of `source` toward `destination`.
    Launch {
        /// Sending stack.
        source: StackId,
        /// Receiving stack.
        destination: StackId,
        /// Source change that follows this launch, if any.
        then: Option<Advance>,
    },
    /// The source was empty; nothing launches this tick.
    Skip(Advance),
}

/// Fixed per-source destination order.
///
/// Source `i` lists the other `N - 1` stacks starting just after itself:
/// `targets[i][j] = (i + j + 1) mod N`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RotationSchedule {
    targets: Vec<Vec<StackId>>,
}

impl RotationSchedule {
    /// Builds the schedule for `stack_count` stacks.
    #[must_use]
    pub fn new(stack_count: usize) -> Self {
        let targets = (0..stack_count)
            .map(|i| {
                (0..stack_count.saturating_sub(1))
                    .map(|j| stack((i + j + 1) % stack_count))
                    .collect()
            })
            .collect();
        Self { targets }
    }

    /// Number of stacks.
    #[must_use]
    pub fn stack_count(&self) -> usize {
        self.targets.len()
    }

    /// Destination candidates for `source`, in rotation order.
    #[must_use]
    pub fn candidates(&self, source: StackId) -> &[StackId] {
        &self.targets[source.index()]
    }

    /// The `step`th destination of `source`, wrapping around.
    #[must_use]
    pub fn destination(&self, source: StackId, step: usize) -> StackId {
        let candidates = self.candidates(source);
        candidates[step % candidates.len()]
    }
}

/// Cadence-driven source/destination picker.
#[derive(Clone, Debug)]
pub struct TransferScheduler {
    schedule: RotationSchedule,
    policy: SourcePolicy,
    interval: Duration,
    state: SchedulerState,
    source: StackId,
    step_index: usize,
    moves: u32,
    next_due: HostTime,
}

impl TransferScheduler {
    /// Creates an idle scheduler starting at stack 0.
    ///
    /// # Panics
    ///
    /// Panics if `stack_count < 2`; validated configurations never are.
    #[must_use]
    pub fn new(stack_count: usize, policy: SourcePolicy, interval: Duration) -> Self {
        assert!(stack_count >= 2, "a transfer needs at least two stacks");
        Self {
            schedule: RotationSchedule::new(stack_count),
            policy,
            interval,
            state: SchedulerState::Idle,
            source: stack(0),
            step_index: 0,
            moves: 0,
            next_due: HostTime(0),
        }
    }

    /// Creates a scheduler from the configured stack count, policy and
    /// cadence.
    #[must_use]
    pub fn from_config(config: &SceneConfig) -> Self {
        Self::new(
            config.stack_count,
            config.source_policy,
            config.move_interval,
        )
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Stack the next launch comes from.
    #[must_use]
    pub fn source(&self) -> StackId {
        self.source
    }

    /// Position in the current source's destination list.
    #[must_use]
    pub fn step_index(&self) -> usize {
        self.step_index
    }

    /// Launches made from the current source.
    #[must_use]
    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// The destination rotation.
    #[must_use]
    pub fn schedule(&self) -> &RotationSchedule {
        &self.schedule
    }

    /// Time at which the next step is due while running.
    #[must_use]
    pub fn next_due(&self) -> HostTime {
        self.next_due
    }

    /// Starts the cadence; the first step is due one interval after `now`.
    ///
    /// Returns `false` without changing anything unless the scheduler is
    /// [`Idle`](SchedulerState::Idle). In particular a second `start` never
    /// adds a second cadence, and a stopped scheduler stays stopped.
    pub fn start(&mut self, now: HostTime) -> bool {
        if self.state != SchedulerState::Idle {
            return false;
        }
        self.state = SchedulerState::Running;
        self.next_due = now + self.interval;
        true
    }

    /// Halts future steps. Returns `false` if already stopped.
    pub fn stop(&mut self) -> bool {
        if self.state == SchedulerState::Stopped {
            return false;
        }
        self.state = SchedulerState::Stopped;
        true
    }

    /// Produces at most one [`Step`] if one is due at `now`.
    ///
    /// Missed intervals are not replayed: after a late poll the next step is
    /// due one full interval later.
    pub fn poll(&mut self, now: HostTime, len_of: impl Fn(StackId) -> usize) -> Option<Step> {
        if self.state != SchedulerState::Running || now < self.next_due {
            return None;
        }
        self.next_due = self.next_due + self.interval;
        if self.next_due <= now {
            self.next_due = now + self.interval;
        }
        Some(self.step(len_of))
    }

    /// Runs one scheduling decision regardless of state or cadence.
    pub fn step(&mut self, len_of: impl Fn(StackId) -> usize) -> Step {
        let source = self.source;
        let len = len_of(source);
        if len == 0 {
            return Step::Skip(self.advance(AdvanceReason::Empty));
        }

        let destination = self.schedule.destination(source, self.step_index);
        self.step_index = (self.step_index + 1) % self.schedule.candidates(source).len();
        self.moves = self.moves.saturating_add(1);

        let then = match self.policy {
            SourcePolicy::MoveCap { moves } if self.moves >= moves => {
                Some(self.advance(AdvanceReason::MoveCap))
            }
            SourcePolicy::UntilEmpty if len == 1 => Some(self.advance(AdvanceReason::Drained)),
            _ => None,
        };
        Step::Launch {
            source,
            destination,
            then,
        }
    }

    fn advance(&mut self, reason: AdvanceReason) -> Advance {
        let from = self.source;
        let to = stack((from.index() + 1) % self.schedule.stack_count());
        self.source = to;
        self.step_index = 0;
        self.moves = 0;
        Advance { from, to, reason }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "stack counts are tiny"
)]
fn stack(index: usize) -> StackId {
    StackId::new(index as u32)
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn ms(millis: u64) -> HostTime {
        HostTime::from_millis(millis)
    }

    fn capped(stacks: usize, cap: u32) -> TransferScheduler {
        TransferScheduler::new(
            stacks,
            SourcePolicy::MoveCap { moves: cap },
            Duration::from_millis(1000),
        )
    }

    #[test]
    fn schedule_excludes_self_and_cycles() {
        let schedule = RotationSchedule::new(4);
        assert_eq!(
            schedule.candidates(stack(2)),
            &[stack(3), stack(0), stack(1)]
        );
        for i in 0..4 {
            assert_eq!(schedule.candidates(stack(i)).len(), 3);
            assert!(!schedule.candidates(stack(i)).contains(&stack(i)));
        }
        assert_eq!(schedule.destination(stack(2), 4), stack(0));
    }

    #[test]
    fn cap_of_six_rotates_source_after_six_launches() {
        let mut lens = vec![12_usize; 12];
        let mut scheduler = capped(12, 6);
        let mut released = 0;
        for _ in 0..6 {
            match scheduler.step(|s| lens[s.index()]) {
                Step::Launch {
                    source,
                    destination,
                    ..
                } => {
                    assert_eq!(source, stack(0));
                    lens[source.index()] -= 1;
                    lens[destination.index()] += 1;
                    released += 1;
                }
                Step::Skip(_) => panic!("source was not empty"),
            }
        }
        assert_eq!(scheduler.source(), stack(1));
        assert_eq!(released, 6);
        assert_eq!(lens[0], 6);
        assert_eq!(&lens[1..7], &[13; 6]);
    }

    #[test]
    fn cap_advance_is_reported_with_the_last_launch() {
        let mut scheduler = capped(3, 2);
        assert!(matches!(
            scheduler.step(|_| 5),
            Step::Launch { then: None, .. }
        ));
        assert_eq!(
            scheduler.step(|_| 5),
            Step::Launch {
                source: stack(0),
                destination: stack(2),
                then: Some(Advance {
                    from: stack(0),
                    to: stack(1),
                    reason: AdvanceReason::MoveCap,
                }),
            }
        );
        assert_eq!(scheduler.step_index(), 0);
        assert_eq!(scheduler.moves(), 0);
    }

    #[test]
    fn empty_source_skips_and_advances() {
        let mut scheduler = capped(3, 6);
        let step = scheduler.step(|s| if s == stack(0) { 0 } else { 4 });
        assert_eq!(
            step,
            Step::Skip(Advance {
                from: stack(0),
                to: stack(1),
                reason: AdvanceReason::Empty,
            })
        );
        assert_eq!(scheduler.source(), stack(1));
    }

    #[test]
    fn until_empty_rotates_on_last_item() {
        let mut scheduler = TransferScheduler::new(
            3,
            SourcePolicy::UntilEmpty,
            Duration::from_millis(1000),
        );
        for _ in 0..10 {
            assert!(matches!(
                scheduler.step(|_| 4),
                Step::Launch { then: None, .. }
            ));
        }
        let Step::Launch { then, .. } = scheduler.step(|_| 1) else {
            panic!("expected a launch");
        };
        assert_eq!(then.map(|a| a.reason), Some(AdvanceReason::Drained));
        assert_eq!(scheduler.source(), stack(1));
    }

    #[test]
    fn source_wraps_around() {
        let mut scheduler = capped(2, 1);
        scheduler.step(|_| 3);
        assert_eq!(scheduler.source(), stack(1));
        scheduler.step(|_| 3);
        assert_eq!(scheduler.source(), stack(0));
    }

    #[test]
    fn poll_fires_once_per_interval() {
        let mut scheduler = capped(4, 6);
        assert_eq!(scheduler.poll(ms(5_000), |_| 3), None, "idle never fires");
        assert!(scheduler.start(ms(0)));
        assert_eq!(scheduler.poll(ms(999), |_| 3), None);
        assert!(scheduler.poll(ms(1_000), |_| 3).is_some());
        assert_eq!(scheduler.poll(ms(1_500), |_| 3), None);
        assert!(scheduler.poll(ms(2_000), |_| 3).is_some());
    }

    #[test]
    fn start_is_idempotent() {
        let mut scheduler = capped(4, 6);
        assert!(scheduler.start(ms(0)));
        assert!(!scheduler.start(ms(400)));
        assert_eq!(scheduler.next_due(), ms(1_000));

        let fired = (0..=1_000)
            .step_by(50)
            .filter(|&t| scheduler.poll(ms(t), |_| 3).is_some())
            .count();
        assert_eq!(fired, 1);
    }

    #[test]
    fn late_poll_does_not_replay_missed_steps() {
        let mut scheduler = capped(4, 6);
        scheduler.start(ms(0));
        assert!(scheduler.poll(ms(4_300), |_| 3).is_some());
        assert_eq!(scheduler.poll(ms(4_300), |_| 3), None);
        assert_eq!(scheduler.next_due(), ms(5_300));
    }

    #[test]
    fn stop_halts_and_cannot_restart() {
        let mut scheduler = capped(4, 6);
        scheduler.start(ms(0));
        assert!(scheduler.stop());
        assert!(!scheduler.stop());
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        assert_eq!(scheduler.poll(ms(10_000), |_| 3), None);
        assert!(!scheduler.start(ms(10_000)));
    }
}
