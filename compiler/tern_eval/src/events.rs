//! Timer and idle events.
//!
//! The event loop is cooperative and single-threaded. Scripts register
//! callbacks with `after`; nothing runs until a script explicitly waits
//! (`update`, `vwait`, `after ms`) or the host calls
//! [`Interp::process_events`]. Callbacks run in the global frame. An error
//! in a callback is a *background error*: it is handed to a `bgerror`
//! command if one exists and otherwise printed to stderr, and the loop
//! carries on.

use std::collections::{BTreeMap, VecDeque};
use std::time::{Duration, Instant};

use bitflags::bitflags;
use tern_value::Obj;

use crate::errors::{Flow, ScriptError};
use crate::print_handler::Channel;
use crate::Interp;

bitflags! {
    /// Which events [`Interp::process_events`] services.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct EventFlags: u8 {
        const TIMER = 1 << 0;
        const IDLE = 1 << 1;
        /// Return at once when nothing is ready instead of sleeping until
        /// the next timer is due.
        const DONT_WAIT = 1 << 2;
        const ALL = Self::TIMER.bits() | Self::IDLE.bits();
    }
}

/// Kind of a scheduled event, as `after info` reports it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Timer,
    Idle,
}

impl EventKind {
    pub fn name(self) -> &'static str {
        match self {
            EventKind::Timer => "timer",
            EventKind::Idle => "idle",
        }
    }
}

/// Pending events of one interpreter.
#[derive(Debug, Default)]
pub struct EventLoop {
    /// Keyed by due time, then id so equal deadlines run in creation order.
    timers: BTreeMap<(Instant, u64), Obj>,
    idle: VecDeque<(u64, Obj)>,
    next_id: u64,
}

impl EventLoop {
    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn schedule(&mut self, delay: Duration, script: Obj) -> u64 {
        let id = self.next_id();
        self.timers.insert((Instant::now() + delay, id), script);
        id
    }

    pub fn schedule_idle(&mut self, script: Obj) -> u64 {
        let id = self.next_id();
        self.idle.push_back((id, script));
        id
    }

    pub fn cancel(&mut self, id: u64) -> bool {
        let key = self.timers.keys().find(|(_, t)| *t == id).copied();
        if let Some(key) = key {
            self.timers.remove(&key);
            return true;
        }
        let before = self.idle.len();
        self.idle.retain(|(i, _)| *i != id);
        self.idle.len() != before
    }

    /// Cancel the first event whose script is `script`.
    pub fn cancel_script(&mut self, script: &str) -> bool {
        let id = self
            .timers
            .iter()
            .map(|((_, id), s)| (*id, s))
            .chain(self.idle.iter().map(|(id, s)| (*id, s)))
            .find(|(_, s)| s.as_str() == script)
            .map(|(id, _)| id);
        id.is_some_and(|id| self.cancel(id))
    }

    /// Ids of every pending event, timers in due order, then idle ones.
    pub fn ids(&self) -> Vec<u64> {
        self.timers
            .keys()
            .map(|(_, id)| *id)
            .chain(self.idle.iter().map(|(id, _)| *id))
            .collect()
    }

    pub fn info(&self, id: u64) -> Option<(Obj, EventKind)> {
        self.timers
            .iter()
            .find(|((_, t), _)| *t == id)
            .map(|(_, s)| (s.clone(), EventKind::Timer))
            .or_else(|| {
                self.idle
                    .iter()
                    .find(|(i, _)| *i == id)
                    .map(|(_, s)| (s.clone(), EventKind::Idle))
            })
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty() && self.idle.is_empty()
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.timers.keys().next().map(|(when, _)| *when)
    }

    /// Remove and return the earliest timer due at `now`.
    fn pop_due(&mut self, now: Instant) -> Option<Obj> {
        let key = *self.timers.keys().next()?;
        if key.0 > now {
            return None;
        }
        self.timers.remove(&key)
    }

    fn take_idle(&mut self) -> VecDeque<(u64, Obj)> {
        std::mem::take(&mut self.idle)
    }
}

/// `after#N`, the script-visible name of event `id`.
pub fn event_name(id: u64) -> String {
    format!("after#{id}")
}

pub fn parse_event_name(name: &str) -> Option<u64> {
    name.strip_prefix("after#")?.parse().ok()
}

impl Interp {
    /// Run ready events. Without [`EventFlags::DONT_WAIT`] this sleeps until
    /// the next timer when nothing is ready yet. Returns how many callbacks
    /// ran; zero means there was nothing to wait for.
    ///
    /// Only `exit` and signals escape; errors are background errors.
    pub fn process_events(&mut self, flags: EventFlags) -> Result<usize, Flow> {
        loop {
            let mut ran = 0;
            if flags.contains(EventFlags::TIMER) {
                let now = Instant::now();
                while let Some(script) = self.events.pop_due(now) {
                    self.run_event(&script)?;
                    ran += 1;
                }
            }
            if ran == 0 && flags.contains(EventFlags::IDLE) {
                for (_, script) in self.events.take_idle() {
                    self.run_event(&script)?;
                    ran += 1;
                }
            }
            if ran > 0 || flags.contains(EventFlags::DONT_WAIT) {
                return Ok(ran);
            }
            match self.events.next_due() {
                Some(when) if flags.contains(EventFlags::TIMER) => {
                    std::thread::sleep(when.saturating_duration_since(Instant::now()));
                }
                _ => return Ok(0),
            }
        }
    }

    fn run_event(&mut self, script: &Obj) -> Result<(), Flow> {
        match self.with_level(0, |interp| interp.eval_obj(script)) {
            Ok(_) | Err(Flow::Break | Flow::Continue | Flow::Return { .. }) => Ok(()),
            Err(Flow::Error(err)) => {
                self.background_error(&err);
                Ok(())
            }
            Err(flow) => Err(flow),
        }
    }

    /// Report an error no script is waiting for.
    pub(crate) fn background_error(&mut self, err: &ScriptError) {
        self.note_error(err);
        if self.has_command("bgerror") {
            let argv = [Obj::new_string("bgerror"), err.message.clone()];
            match self.with_level(0, |interp| interp.invoke(&argv)) {
                Ok(_) => return,
                Err(Flow::Error(nested)) => {
                    tracing::warn!(error = %nested, "bgerror failed");
                }
                Err(_) => return,
            }
        }
        self.write(
            Channel::Stderr,
            &format!("background error: {}\n", err.error_info()),
        );
    }

    /// Block until global variable `name` is written, running events.
    pub(crate) fn wait_for_var(&mut self, name: &str) -> Result<(), Flow> {
        let key: std::rc::Rc<str> = std::rc::Rc::from(name.trim_start_matches(':'));
        self.watched.insert(key.clone(), false);
        let outcome = loop {
            if self.watched.get(&key).copied().unwrap_or(false) {
                break Ok(());
            }
            match self.process_events(EventFlags::ALL) {
                Ok(0) => {
                    break Err(ScriptError::new(format!(
                        "can't wait for variable \"{name}\": would wait forever"
                    ))
                    .into())
                }
                Ok(_) => {}
                Err(flow) => break Err(flow),
            }
        };
        self.watched.remove(&key);
        outcome
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
