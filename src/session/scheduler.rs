use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    CountdownTick,
    TurnTimeout,
}

/// Posted back to the session when a timer expires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerFired {
    pub kind: TimerKind,
    pub generation: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArmedTimer {
    pub kind: TimerKind,
    pub delay: Duration,
    pub generation: u64,
}

impl ArmedTimer {
    pub fn fired(&self) -> TimerFired {
        TimerFired {
            kind: self.kind,
            generation: self.generation,
        }
    }
}

/// Single timer slot of a session.
///
/// Aborting the sleeping task is not enough on its own: the task may have already posted its
/// `TimerFired`. Every arm/disarm bumps the generation, and `accept` only lets through the firing
/// of the timer that is armed right now.
pub struct TurnScheduler {
    generation: u64,
    armed: Option<ArmedTimer>,
    task: Option<JoinHandle<()>>,
    timer_tx: Option<UnboundedSender<TimerFired>>,
}

impl TurnScheduler {
    pub fn new(timer_tx: UnboundedSender<TimerFired>) -> Self {
        TurnScheduler {
            generation: 0,
            armed: None,
            task: None,
            timer_tx: Some(timer_tx),
        }
    }

    /// Keeps track of the armed timer without spawning anything, firings are injected by hand.
    pub fn detached() -> Self {
        TurnScheduler {
            generation: 0,
            armed: None,
            task: None,
            timer_tx: None,
        }
    }

    pub fn arm(&mut self, kind: TimerKind, delay: Duration) -> ArmedTimer {
        self.disarm();
        let armed = ArmedTimer {
            kind,
            delay,
            generation: self.generation,
        };
        self.armed = Some(armed);

        if let Some(timer_tx) = &self.timer_tx {
            let timer_tx = timer_tx.clone();
            let fired = armed.fired();
            self.task = Some(tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                // The session is gone when the receiver is closed, nothing to notify
                let _ = timer_tx.send(fired);
            }));
        }

        armed
    }

    /// Returns the timer that was armed, if any. Safe to call repeatedly.
    pub fn disarm(&mut self) -> Option<ArmedTimer> {
        self.generation = self.generation.wrapping_add(1);
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.armed.take()
    }

    pub fn accept(&mut self, fired: TimerFired) -> bool {
        match self.armed {
            Some(armed) if armed.fired() == fired => {
                self.armed = None;
                self.task = None;
                true
            }
            _ => false,
        }
    }

    pub fn armed(&self) -> Option<&ArmedTimer> {
        self.armed.as_ref()
    }
}

impl Drop for TurnScheduler {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
