//! Armed transitions
//!
//! Transitions are plain values tagged with a [`TransitionAction`]. The
//! timer only keeps them until they are due; the controller dispatches
//! the action itself.

use chrono::NaiveDateTime;
use heapless::Vec;

/// What happens when a transition fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionAction {
    /// Fade to full brightness
    FadeOn,
    /// Fade to minimum brightness
    FadeOff,
    /// Recompute the day's transitions
    Reschedule,
}

/// A transition armed for a local wall-clock instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTransition {
    pub label: &'static str,
    pub fire_at: NaiveDateTime,
    pub action: TransitionAction,
}

impl ScheduledTransition {
    pub const fn new(label: &'static str, fire_at: NaiveDateTime, action: TransitionAction) -> Self {
        Self {
            label,
            fire_at,
            action,
        }
    }
}

/// Reason a transition was not armed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmError {
    /// `fire_at` is not after the current time
    PastDue(ScheduledTransition),
    /// No free slot left
    Full(ScheduledTransition),
}

/// Timer primitive the scheduler arms transitions on
pub trait TransitionTimer {
    /// Arm `transition`. Rejects anything firing at or before `now`.
    fn arm(&mut self, transition: ScheduledTransition, now: NaiveDateTime) -> Result<(), ArmError>;

    /// Drop every armed transition with `action`
    fn cancel(&mut self, action: TransitionAction);
}

/// Fixed-capacity timer queue polled from the main loop
#[derive(Debug, Clone, Default)]
pub struct TimerQueue<const N: usize> {
    armed: Vec<ScheduledTransition, N>,
}

impl<const N: usize> TimerQueue<N> {
    pub const fn new() -> Self {
        Self { armed: Vec::new() }
    }

    /// Armed transitions in arming order
    pub fn armed(&self) -> &[ScheduledTransition] {
        &self.armed
    }

    pub fn len(&self) -> usize {
        self.armed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.armed.is_empty()
    }

    /// Earliest armed transition
    pub fn next(&self) -> Option<&ScheduledTransition> {
        self.armed.iter().min_by_key(|transition| transition.fire_at)
    }

    /// Remove and return the earliest transition due at `now`
    pub fn pop_due(&mut self, now: NaiveDateTime) -> Option<ScheduledTransition> {
        let (index, _) = self
            .armed
            .iter()
            .enumerate()
            .filter(|(_, transition)| transition.fire_at <= now)
            .min_by_key(|(_, transition)| transition.fire_at)?;
        Some(self.armed.remove(index))
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.armed.clear();
    }
}

impl<const N: usize> TransitionTimer for TimerQueue<N> {
    fn arm(&mut self, transition: ScheduledTransition, now: NaiveDateTime) -> Result<(), ArmError> {
        if transition.fire_at <= now {
            return Err(ArmError::PastDue(transition));
        }
        self.armed.push(transition).map_err(ArmError::Full)
    }

    fn cancel(&mut self, action: TransitionAction) {
        self.armed.retain(|transition| transition.action != action);
    }
}
