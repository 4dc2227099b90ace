//! Shared keypad state: event queue, pressed-key tracking, handler registry
//! and the wait/query API built on top of them.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::{with_timeout, Duration, Instant};

use crate::config::KeypadConfig;
use crate::key::{KeyEvent, KeyId, KEY_COUNT};
use crate::timeout::Timeout;

type KeyHandler = Box<dyn FnMut() + Send>;
type AnyKeyHandler = Box<dyn FnMut(KeyId) + Send>;

struct State {
    initialized: bool,
    pressed: [bool; KEY_COUNT],
    last_pressed: Option<KeyId>,
    last_released: Option<KeyId>,
    // Unbounded: nothing caps the queue if no task ever consumes it.
    queue: VecDeque<KeyEvent>,
}

impl State {
    const fn new() -> Self {
        Self {
            initialized: false,
            pressed: [false; KEY_COUNT],
            last_pressed: None,
            last_released: None,
            queue: VecDeque::new(),
        }
    }

    fn track(&mut self, event: KeyEvent) {
        if event.pressed {
            self.last_pressed = Some(event.key);
        } else {
            self.last_released = Some(event.key);
        }
        self.pressed[event.key.index() as usize] = event.pressed;
    }
}

struct Handlers {
    press: [Option<KeyHandler>; KEY_COUNT],
    release: [Option<KeyHandler>; KEY_COUNT],
    any_press: Vec<AnyKeyHandler>,
    any_release: Vec<AnyKeyHandler>,
}

impl Handlers {
    fn new() -> Self {
        Self {
            press: core::array::from_fn(|_| None),
            release: core::array::from_fn(|_| None),
            any_press: Vec::new(),
            any_release: Vec::new(),
        }
    }

    fn fire(&mut self, event: KeyEvent) {
        let (single, any) = if event.pressed {
            (&mut self.press, &mut self.any_press)
        } else {
            (&mut self.release, &mut self.any_release)
        };
        if let Some(handler) = single[event.key.index() as usize].as_mut() {
            handler();
        }
        for handler in any.iter_mut() {
            handler(event.key);
        }
    }

    /// Folds in handlers registered while `self` was detached for firing.
    /// Later per-key registrations win; wildcard handlers are appended.
    fn merge(&mut self, added: Handlers) {
        let slots = self.press.iter_mut().chain(self.release.iter_mut());
        let added_slots = added.press.into_iter().chain(added.release);
        for (slot, handler) in slots.zip(added_slots) {
            if handler.is_some() {
                *slot = handler;
            }
        }
        self.any_press.extend(added.any_press);
        self.any_release.extend(added.any_release);
    }
}

/// Keypad state shared between the task draining the TCA8418 and the
/// application.
///
/// A `Keypad` is filled by a [`KeypadController`](crate::KeypadController)
/// and read through the query and wait methods below. Every decoded event is
/// handed to the registered handlers first and then queued; waiters consume
/// the queue in order and each event is delivered to at most one waiter.
///
/// `M` selects the mutex guarding the state. Use `CriticalSectionRawMutex`
/// when the controller runs in an interrupt executor or on another core,
/// `NoopRawMutex` when everything shares one executor.
pub struct Keypad<M: RawMutex> {
    state: Mutex<M, RefCell<State>>,
    handlers: Mutex<M, RefCell<Handlers>>,
    queued: Signal<M, ()>,
    idle_interval: Duration,
    sequence_timeout: Timeout,
}

impl<M: RawMutex> Keypad<M> {
    /// Creates an uninitialized keypad. Queries return neutral values and
    /// waits fail until a controller has run its init sequence against it.
    pub fn new(config: &KeypadConfig) -> Self {
        Self {
            state: Mutex::new(RefCell::new(State::new())),
            handlers: Mutex::new(RefCell::new(Handlers::new())),
            queued: Signal::new(),
            idle_interval: config.idle_interval,
            sequence_timeout: config.sequence_timeout,
        }
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        self.state.lock(|state| f(&mut *state.borrow_mut()))
    }

    fn with_handlers(&self, f: impl FnOnce(&mut Handlers)) {
        self.handlers.lock(|handlers| f(&mut *handlers.borrow_mut()));
    }

    /// Calls the handlers for `event` with the handler lock released.
    ///
    /// The table is swapped out for an empty one while the handlers run, so
    /// a handler may query the keypad or register handlers. Registrations
    /// made meanwhile take effect from the next event.
    fn fire_handlers(&self, event: KeyEvent) {
        let mut running = self.handlers.lock(|handlers| handlers.replace(Handlers::new()));
        running.fire(event);
        self.handlers.lock(|handlers| {
            let added = handlers.replace(running);
            handlers.borrow_mut().merge(added);
        });
    }

    /// Clears all key state and pending events and marks the keypad usable.
    /// Registered handlers are kept.
    pub(crate) fn reset(&self) {
        self.with_state(|state| {
            *state = State::new();
            state.initialized = true;
        });
        self.queued.reset();
    }

    /// Delivers a freshly decoded event: state is updated, handlers run, and
    /// the event is queued for waiters.
    pub(crate) fn dispatch(&self, event: KeyEvent) {
        log::debug!("Key event {event:?}");
        self.with_state(|state| state.track(event));
        self.fire_handlers(event);
        self.with_state(|state| state.queue.push_back(event));
        self.queued.signal(());
    }

    fn dequeue(&self) -> Option<KeyEvent> {
        self.with_state(|state| {
            let event = state.queue.pop_front()?;
            state.track(event);
            Some(event)
        })
    }

    /// Returns `true` once the init sequence has completed.
    pub fn is_initialized(&self) -> bool {
        self.with_state(|state| state.initialized)
    }

    /// Returns `true` if `key` is currently held down.
    pub fn is_key_pressed(&self, key: KeyId) -> bool {
        self.with_state(|state| state.initialized && state.pressed[key.index() as usize])
    }

    /// All keys currently held down, in numbering order.
    pub fn pressed_keys(&self) -> heapless::Vec<KeyId, KEY_COUNT> {
        self.with_state(|state| {
            KeyId::all()
                .filter(|key| state.initialized && state.pressed[key.index() as usize])
                .collect()
        })
    }

    /// The most recently pressed key.
    pub fn last_key_pressed(&self) -> Option<KeyId> {
        self.with_state(|state| state.last_pressed)
    }

    /// The most recently released key.
    pub fn last_key_released(&self) -> Option<KeyId> {
        self.with_state(|state| state.last_released)
    }

    /// Number of events queued and not yet consumed by a waiter.
    pub fn pending_events(&self) -> usize {
        self.with_state(|state| state.queue.len())
    }

    /// Drops every queued event. Pressed state and the last pressed/released
    /// keys are left untouched.
    pub fn clear_event_queue(&self) {
        self.with_state(|state| state.queue.clear());
    }

    /// Runs `handler` whenever `key` is pressed, replacing any previous press
    /// handler for that key.
    ///
    /// Handlers run synchronously inside the drain routine, outside any
    /// keypad lock. A handler registered from inside a handler is first
    /// called for the next event.
    pub fn on_key_pressed(&self, key: KeyId, handler: impl FnMut() + Send + 'static) {
        self.with_handlers(|handlers| {
            handlers.press[key.index() as usize] = Some(Box::new(handler))
        });
    }

    /// Runs `handler` whenever `key` is released, replacing any previous
    /// release handler for that key.
    pub fn on_key_released(&self, key: KeyId, handler: impl FnMut() + Send + 'static) {
        self.with_handlers(|handlers| {
            handlers.release[key.index() as usize] = Some(Box::new(handler))
        });
    }

    /// Adds a handler called with the key number of every press.
    pub fn on_any_key_pressed(&self, handler: impl FnMut(KeyId) + Send + 'static) {
        self.with_handlers(|handlers| handlers.any_press.push(Box::new(handler)));
    }

    /// Adds a handler called with the key number of every release.
    pub fn on_any_key_released(&self, handler: impl FnMut(KeyId) + Send + 'static) {
        self.with_handlers(|handlers| handlers.any_release.push(Box::new(handler)));
    }

    /// Takes the oldest queued event, waiting for one until `deadline`.
    ///
    /// Waiters are woken by the drain routine; the idle interval bounds each
    /// sleep so several concurrent waiters all get to re-check the queue.
    async fn next_event(&self, deadline: Option<Instant>) -> Option<KeyEvent> {
        loop {
            if let Some(event) = self.dequeue() {
                return Some(event);
            }
            let now = Instant::now();
            let idle = match deadline {
                Some(deadline) if now >= deadline => return None,
                Some(deadline) => (deadline - now).min(self.idle_interval),
                None => self.idle_interval,
            };
            let _ = with_timeout(idle, self.queued.wait()).await;
        }
    }

    /// Consumes events until one satisfies `matches`. Events that do not
    /// match are discarded.
    async fn wait_for(
        &self,
        timeout: Timeout,
        matches: impl Fn(KeyEvent) -> bool,
    ) -> Option<KeyEvent> {
        if !self.is_initialized() {
            return None;
        }
        if timeout == Timeout::Immediate {
            return self.dequeue().filter(|event| matches(*event));
        }

        let deadline = timeout.deadline(Instant::now());
        loop {
            let event = self.next_event(deadline).await?;
            if matches(event) {
                return Some(event);
            }
            if deadline.is_some_and(|deadline| Instant::now() > deadline) {
                return None;
            }
        }
    }

    /// Waits for any key to be pressed and returns it.
    ///
    /// With [`Timeout::Immediate`] only the head of the queue is inspected.
    pub async fn wait_for_any_key(&self, timeout: Timeout) -> Option<KeyId> {
        self.wait_for(timeout, |event| event.pressed)
            .await
            .map(|event| event.key)
    }

    /// Waits for any key to be released and returns it.
    pub async fn wait_for_any_key_release(&self, timeout: Timeout) -> Option<KeyId> {
        self.wait_for(timeout, KeyEvent::released)
            .await
            .map(|event| event.key)
    }

    /// Waits for `key` to be pressed.
    pub async fn wait_for_key_press(&self, key: KeyId, timeout: Timeout) -> bool {
        self.wait_for(timeout, |event| event.pressed && event.key == key)
            .await
            .is_some()
    }

    /// Waits for `key` to be released.
    pub async fn wait_for_key_release(&self, key: KeyId, timeout: Timeout) -> bool {
        self.wait_for(timeout, |event| event.released() && event.key == key)
            .await
            .is_some()
    }

    /// Waits for `keys` to be pressed in exactly this order.
    ///
    /// Release events are skipped. The first press of a key other than the
    /// next expected one fails the whole wait; there is no re-synchronisation.
    /// With [`Timeout::Immediate`] the sequence has to be fully queued
    /// already.
    pub async fn wait_for_sequence(&self, keys: &[KeyId], timeout: Timeout) -> bool {
        if !self.is_initialized() {
            return false;
        }

        let deadline = timeout.deadline(Instant::now());
        let mut expected = keys.iter();
        let mut next = expected.next();
        while let Some(&want) = next {
            let Some(event) = self.next_event(deadline).await else {
                return false;
            };
            if event.released() {
                continue;
            }
            if event.key != want {
                log::debug!("Sequence broken: expected key {want}, got {}", event.key);
                return false;
            }
            next = expected.next();
        }
        true
    }

    /// [`Keypad::wait_for_sequence`] with the configured sequence timeout.
    pub async fn wait_for_sequence_default(&self, keys: &[KeyId]) -> bool {
        self.wait_for_sequence(keys, self.sequence_timeout).await
    }
}
