//! User intents
//!
//! Buttons, a web handler or an interrupt push [`LampIntent`]s into an
//! [`IntentChannel`]; the lamp drains it on its own tick, so lamp state
//! keeps a single owner. The queue is a `heapless::Deque` behind a
//! `critical-section` mutex, which makes the senders interrupt safe.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;

use crate::config::LampMode;

/// Request to change what the lamp does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LampIntent {
    /// Manual on/off, applied without fading
    Toggle,
    /// Switch between scheduled fades and the daylight curve
    SetMode(LampMode),
    /// Recompute today's transitions now, e.g. after a clock sync or an
    /// alarm change
    Reschedule,
}

/// Returned when the channel has no room; carries the rejected intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntentQueueFull(pub LampIntent);

/// Bounded intent queue shared between producers and the lamp
pub struct IntentChannel<const SIZE: usize> {
    queue: Mutex<RefCell<Deque<LampIntent, SIZE>>>,
}

impl<const SIZE: usize> IntentChannel<SIZE> {
    pub const fn new() -> Self {
        Self {
            queue: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Producer handle
    pub const fn sender(&self) -> IntentSender<'_, SIZE> {
        IntentSender { channel: self }
    }

    /// Consumer handle, normally held by the lamp
    pub const fn receiver(&self) -> IntentReceiver<'_, SIZE> {
        IntentReceiver { channel: self }
    }

    fn push(&self, intent: LampIntent) -> Result<(), IntentQueueFull> {
        critical_section::with(|cs| {
            self.queue
                .borrow(cs)
                .borrow_mut()
                .push_back(intent)
                .map_err(IntentQueueFull)
        })
    }

    fn pop(&self) -> Option<LampIntent> {
        critical_section::with(|cs| self.queue.borrow(cs).borrow_mut().pop_front())
    }

    /// Number of queued intents
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.queue.borrow(cs).borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<const SIZE: usize> Default for IntentChannel<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer side of an [`IntentChannel`]
#[derive(Clone, Copy)]
pub struct IntentSender<'a, const SIZE: usize> {
    channel: &'a IntentChannel<SIZE>,
}

impl<const SIZE: usize> IntentSender<'_, SIZE> {
    /// Queue an intent, failing if the channel is full
    pub fn try_send(&self, intent: LampIntent) -> Result<(), IntentQueueFull> {
        self.channel.push(intent)
    }

    pub fn toggle(&self) -> Result<(), IntentQueueFull> {
        self.try_send(LampIntent::Toggle)
    }

    pub fn set_mode(&self, mode: LampMode) -> Result<(), IntentQueueFull> {
        self.try_send(LampIntent::SetMode(mode))
    }

    pub fn reschedule(&self) -> Result<(), IntentQueueFull> {
        self.try_send(LampIntent::Reschedule)
    }
}

/// Consumer side of an [`IntentChannel`]
#[derive(Clone, Copy)]
pub struct IntentReceiver<'a, const SIZE: usize> {
    channel: &'a IntentChannel<SIZE>,
}

impl<const SIZE: usize> IntentReceiver<'_, SIZE> {
    /// Take the oldest queued intent
    pub fn try_receive(&self) -> Option<LampIntent> {
        self.channel.pop()
    }
}
