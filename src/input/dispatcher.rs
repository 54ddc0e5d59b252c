use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::{Duration, Instant};
use tracing::trace;

use super::combination::KeyCombination;
use super::key::Key;

/// Two keys only count as a combination when typed within this window
pub const COMBINATION_TIMEOUT: Duration = Duration::from_secs(1);

/// Bound behaviour. Receives the state the dispatcher was handed on `press`.
pub type Callback<T> = Box<dyn FnMut(&mut T)>;

/// Notified with the pending combination after every key press
pub type Observer<T> = Box<dyn FnMut(&mut T, &KeyCombination)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Keys accumulate into a combination that restarts after two keys
    #[default]
    Normal,
    /// Keys form a rolling window of the last two presses, and a single-key
    /// action on the newest key still fires when no combination matches
    Input,
}

/// Routes key presses to callbacks bound per `(caller, action)`.
///
/// Actions are attached to key combinations with [`bind_keys`](Self::bind_keys)
/// and callers register behaviour for them with [`bind`](Self::bind). One
/// combination may carry several actions; the first one the pressing caller
/// has a callback for wins.
pub struct Dispatcher<C, A, T> {
    mode: InputMode,
    combination: KeyCombination,
    last_press: Option<Instant>,
    timeout: Duration,
    bindings: HashMap<KeyCombination, Vec<A>>,
    callbacks: HashMap<(C, A), Callback<T>>,
    observer: Option<Observer<T>>,
}

impl<C, A, T> Default for Dispatcher<C, A, T>
where
    C: Eq + Hash + Clone + Debug,
    A: Eq + Hash + Clone + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C, A, T> Dispatcher<C, A, T>
where
    C: Eq + Hash + Clone + Debug,
    A: Eq + Hash + Clone + Debug,
{
    pub fn new() -> Self {
        Self::with_timeout(COMBINATION_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            mode: InputMode::Normal,
            combination: KeyCombination::Idle,
            last_press: None,
            timeout,
            bindings: HashMap::new(),
            callbacks: HashMap::new(),
            observer: None,
        }
    }

    /// Attach `action` to `combination`, detaching it from any previous one
    pub fn bind_keys(&mut self, action: A, combination: KeyCombination) {
        for actions in self.bindings.values_mut() {
            actions.retain(|bound| *bound != action);
        }
        self.bindings.retain(|_, actions| !actions.is_empty());
        if combination.is_empty() {
            return;
        }
        self.bindings.entry(combination).or_default().push(action);
    }

    /// Combination currently attached to `action`
    pub fn keys_for(&self, action: &A) -> Option<KeyCombination> {
        self.bindings
            .iter()
            .find(|(_, actions)| actions.contains(action))
            .map(|(combination, _)| *combination)
    }

    /// Register what `caller` does on `action`. Replaces any earlier callback.
    pub fn bind(&mut self, caller: C, action: A, callback: impl FnMut(&mut T) + 'static) {
        self.callbacks.insert((caller, action), Box::new(callback));
    }

    pub fn unbind(&mut self, caller: &C, action: &A) -> bool {
        self.callbacks
            .remove(&(caller.clone(), action.clone()))
            .is_some()
    }

    pub fn set_observer(&mut self, observer: impl FnMut(&mut T, &KeyCombination) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// Switch modes. A half-typed combination does not survive the switch.
    pub fn set_mode(&mut self, mode: InputMode) {
        if self.mode != mode {
            self.mode = mode;
            self.reset();
        }
    }

    /// Keys pressed so far that have not triggered anything
    pub fn combination(&self) -> KeyCombination {
        self.combination
    }

    pub fn reset(&mut self) {
        self.combination = KeyCombination::Idle;
    }

    pub fn press(&mut self, caller: &C, key: Key, state: &mut T) -> bool {
        self.press_at(caller, key, Instant::now(), state)
    }

    /// Feed one key press that happened at `now`. Returns whether a callback ran.
    pub fn press_at(&mut self, caller: &C, key: Key, now: Instant, state: &mut T) -> bool {
        let in_time = self
            .last_press
            .is_some_and(|last| now.saturating_duration_since(last) < self.timeout);
        self.last_press = Some(now);

        self.combination = match self.mode {
            InputMode::Normal => {
                // A stale first key is forgotten: `key` starts a new combination
                let pending = if in_time {
                    self.combination
                } else {
                    KeyCombination::Idle
                };
                pending.press_normal(key)
            }
            InputMode::Input => self.combination.press_input(key),
        };

        if let Some(observer) = self.observer.as_mut() {
            observer(state, &self.combination);
        }

        let fired = match self.combination {
            KeyCombination::Idle => false,
            single @ KeyCombination::One(_) => self.fire(caller, single, state),
            pair @ KeyCombination::Two(_, last) => {
                (in_time && self.fire(caller, pair, state))
                    || self.fire(caller, KeyCombination::One(last), state)
            }
        };

        if fired {
            self.combination = KeyCombination::Idle;
        }
        fired
    }

    fn fire(&mut self, caller: &C, combination: KeyCombination, state: &mut T) -> bool {
        let Some(actions) = self.bindings.get(&combination) else {
            return false;
        };
        for action in actions {
            if let Some(callback) = self.callbacks.get_mut(&(caller.clone(), action.clone())) {
                trace!(?caller, ?action, keys = %combination, "dispatching");
                callback(state);
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Who {
        List,
        Dialog,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Act {
        Quit,
        Top,
        Delete,
        Close,
    }

    type Log = Vec<(Who, Act)>;

    fn recorder(who: Who, act: Act) -> impl FnMut(&mut Log) + 'static {
        move |log: &mut Log| log.push((who, act))
    }

    fn key(c: char) -> Key {
        Key::char(c)
    }

    fn combo(s: &str) -> KeyCombination {
        s.parse().unwrap()
    }

    struct Clock(Instant);

    impl Clock {
        fn after_ms(&mut self, ms: u64) -> Instant {
            self.0 += Duration::from_millis(ms);
            self.0
        }
    }

    fn clock() -> Clock {
        Clock(Instant::now())
    }

    #[test]
    fn single_keys_fire_or_do_nothing() {
        let mut d: Dispatcher<Who, Act, Log> = Dispatcher::new();
        d.bind_keys(Act::Quit, combo("q"));
        d.bind(Who::List, Act::Quit, recorder(Who::List, Act::Quit));
        let mut log = Log::new();
        let mut t = clock();

        assert!(!d.press_at(&Who::List, key('x'), t.after_ms(10), &mut log));
        assert!(d.press_at(&Who::List, key('q'), t.after_ms(10), &mut log));
        assert!(!d.press_at(&Who::List, key('y'), t.after_ms(10), &mut log));
        assert!(d.press_at(&Who::List, key('q'), t.after_ms(10), &mut log));
        assert_eq!(log, vec![(Who::List, Act::Quit), (Who::List, Act::Quit)]);
    }

    #[test]
    fn two_keys_within_timeout_fire_once() {
        let mut d: Dispatcher<Who, Act, Log> = Dispatcher::new();
        d.bind_keys(Act::Top, combo("g g"));
        d.bind(Who::List, Act::Top, recorder(Who::List, Act::Top));
        let mut log = Log::new();
        let mut t = clock();

        assert!(!d.press_at(&Who::List, key('g'), t.after_ms(0), &mut log));
        assert_eq!(d.combination(), combo("g"));
        assert!(d.press_at(&Who::List, key('g'), t.after_ms(300), &mut log));
        assert_eq!(d.combination(), KeyCombination::Idle);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn slow_second_key_starts_a_new_combination() {
        let mut d: Dispatcher<Who, Act, Log> = Dispatcher::new();
        d.bind_keys(Act::Delete, combo("d x"));
        d.bind(Who::List, Act::Delete, recorder(Who::List, Act::Delete));
        let mut log = Log::new();
        let mut t = clock();

        d.press_at(&Who::List, key('d'), t.after_ms(0), &mut log);
        assert!(!d.press_at(&Who::List, key('x'), t.after_ms(1500), &mut log));
        assert_eq!(d.combination(), combo("x"));
        assert!(log.is_empty());

        // the late key leads the pair now, and a third key starts over
        d.press_at(&Who::List, key('d'), t.after_ms(100), &mut log);
        assert_eq!(d.combination(), combo("x d"));
        assert!(!d.press_at(&Who::List, key('x'), t.after_ms(100), &mut log));
        assert_eq!(d.combination(), combo("x"));

        assert!(!d.press_at(&Who::List, key('d'), t.after_ms(2000), &mut log));
        assert!(d.press_at(&Who::List, key('x'), t.after_ms(100), &mut log));
        assert_eq!(log, vec![(Who::List, Act::Delete)]);
    }

    #[test]
    fn exactly_one_second_is_too_slow() {
        let mut d: Dispatcher<Who, Act, Log> = Dispatcher::new();
        d.bind_keys(Act::Top, combo("g g"));
        d.bind(Who::List, Act::Top, recorder(Who::List, Act::Top));
        let mut log = Log::new();
        let mut t = clock();

        d.press_at(&Who::List, key('g'), t.after_ms(0), &mut log);
        assert!(!d.press_at(&Who::List, key('g'), t.after_ms(1000), &mut log));
        assert!(d.press_at(&Who::List, key('g'), t.after_ms(999), &mut log));
    }

    #[test]
    fn combination_beats_overlapping_single_key() {
        let mut d: Dispatcher<Who, Act, Log> = Dispatcher::new();
        d.bind_keys(Act::Quit, combo("q"));
        d.bind_keys(Act::Close, combo("j q"));
        d.bind(Who::List, Act::Quit, recorder(Who::List, Act::Quit));
        d.bind(Who::List, Act::Close, recorder(Who::List, Act::Close));
        let mut log = Log::new();
        let mut t = clock();

        d.press_at(&Who::List, key('j'), t.after_ms(0), &mut log);
        assert!(d.press_at(&Who::List, key('q'), t.after_ms(200), &mut log));
        assert_eq!(log, vec![(Who::List, Act::Close)]);

        // too slow for the pair: the single-key action fires instead
        d.press_at(&Who::List, key('j'), t.after_ms(200), &mut log);
        assert!(d.press_at(&Who::List, key('q'), t.after_ms(1200), &mut log));
        assert_eq!(log, vec![(Who::List, Act::Close), (Who::List, Act::Quit)]);
    }

    #[test]
    fn unbound_prefix_does_not_swallow_single_key() {
        let mut d: Dispatcher<Who, Act, Log> = Dispatcher::new();
        d.bind_keys(Act::Quit, combo("q"));
        d.bind(Who::List, Act::Quit, recorder(Who::List, Act::Quit));
        let mut log = Log::new();
        let mut t = clock();

        d.press_at(&Who::List, key('a'), t.after_ms(0), &mut log);
        assert!(d.press_at(&Who::List, key('q'), t.after_ms(50), &mut log));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn same_key_different_callers() {
        let mut d: Dispatcher<Who, Act, Log> = Dispatcher::new();
        d.bind_keys(Act::Quit, combo("Esc"));
        d.bind_keys(Act::Close, combo("Esc"));
        d.bind(Who::List, Act::Quit, recorder(Who::List, Act::Quit));
        d.bind(Who::Dialog, Act::Close, recorder(Who::Dialog, Act::Close));
        let mut log = Log::new();
        let mut t = clock();
        let esc = Key::new(crossterm::event::KeyCode::Esc);

        assert!(d.press_at(&Who::Dialog, esc, t.after_ms(0), &mut log));
        assert!(d.press_at(&Who::List, esc, t.after_ms(2000), &mut log));
        assert_eq!(log, vec![(Who::Dialog, Act::Close), (Who::List, Act::Quit)]);
    }

    #[test]
    fn caller_without_callback_is_a_no_op() {
        let mut d: Dispatcher<Who, Act, Log> = Dispatcher::new();
        d.bind_keys(Act::Quit, combo("q"));
        d.bind(Who::List, Act::Quit, recorder(Who::List, Act::Quit));
        let mut log = Log::new();

        assert!(!d.press(&Who::Dialog, key('q'), &mut log));
        assert!(log.is_empty());
    }

    #[test]
    fn rebinding_overwrites_callback() {
        let mut d: Dispatcher<Who, Act, Log> = Dispatcher::new();
        d.bind_keys(Act::Quit, combo("q"));
        d.bind(Who::List, Act::Quit, recorder(Who::List, Act::Quit));
        d.bind(Who::List, Act::Quit, recorder(Who::List, Act::Close));
        let mut log = Log::new();

        d.press(&Who::List, key('q'), &mut log);
        assert_eq!(log, vec![(Who::List, Act::Close)]);

        assert!(d.unbind(&Who::List, &Act::Quit));
        assert!(!d.unbind(&Who::List, &Act::Quit));
    }

    #[test]
    fn rebinding_keys_moves_the_action() {
        let mut d: Dispatcher<Who, Act, Log> = Dispatcher::new();
        d.bind_keys(Act::Quit, combo("q"));
        d.bind_keys(Act::Quit, combo("Ctrl+c"));
        d.bind(Who::List, Act::Quit, recorder(Who::List, Act::Quit));
        let mut log = Log::new();
        let mut t = clock();

        assert!(!d.press_at(&Who::List, key('q'), t.after_ms(0), &mut log));
        assert!(d.press_at(&Who::List, Key::ctrl('c'), t.after_ms(2000), &mut log));
        assert_eq!(d.keys_for(&Act::Quit), Some(combo("Ctrl+c")));
    }

    #[test]
    fn input_mode_rolls_the_window() {
        let mut d: Dispatcher<Who, Act, Log> = Dispatcher::new();
        d.set_mode(InputMode::Input);
        let mut log = Log::new();
        let mut t = clock();

        for c in ['a', 'b', 'c'] {
            d.press_at(&Who::Dialog, key(c), t.after_ms(50), &mut log);
        }
        assert_eq!(d.combination(), combo("b c"));
    }

    #[test]
    fn input_mode_prefers_pair_then_falls_back_to_newest_key() {
        let mut d: Dispatcher<Who, Act, Log> = Dispatcher::new();
        d.set_mode(InputMode::Input);
        d.bind_keys(Act::Close, combo("j k"));
        d.bind_keys(Act::Quit, combo("k"));
        d.bind(Who::Dialog, Act::Close, recorder(Who::Dialog, Act::Close));
        d.bind(Who::Dialog, Act::Quit, recorder(Who::Dialog, Act::Quit));
        let mut log = Log::new();
        let mut t = clock();

        // typing "xjk": the window slides to (j, k) and the pair wins
        d.press_at(&Who::Dialog, key('x'), t.after_ms(0), &mut log);
        d.press_at(&Who::Dialog, key('j'), t.after_ms(50), &mut log);
        assert!(d.press_at(&Who::Dialog, key('k'), t.after_ms(50), &mut log));
        assert_eq!(log, vec![(Who::Dialog, Act::Close)]);

        // typing "ak": no pair, the single key still fires mid-word
        d.press_at(&Who::Dialog, key('a'), t.after_ms(50), &mut log);
        assert!(d.press_at(&Who::Dialog, key('k'), t.after_ms(50), &mut log));
        assert_eq!(log.last(), Some(&(Who::Dialog, Act::Quit)));
    }

    #[test]
    fn input_mode_pair_needs_the_timeout_too() {
        let mut d: Dispatcher<Who, Act, Log> = Dispatcher::new();
        d.set_mode(InputMode::Input);
        d.bind_keys(Act::Close, combo("j k"));
        d.bind_keys(Act::Quit, combo("k"));
        d.bind(Who::Dialog, Act::Close, recorder(Who::Dialog, Act::Close));
        d.bind(Who::Dialog, Act::Quit, recorder(Who::Dialog, Act::Quit));
        let mut log = Log::new();
        let mut t = clock();

        assert!(!d.press_at(&Who::Dialog, key('j'), t.after_ms(0), &mut log));
        assert!(d.press_at(&Who::Dialog, key('k'), t.after_ms(1500), &mut log));
        assert_eq!(log, vec![(Who::Dialog, Act::Quit)]);
    }

    #[test]
    fn observer_sees_every_press() {
        let mut d: Dispatcher<Who, Act, (Log, Vec<String>)> = Dispatcher::new();
        d.bind_keys(Act::Top, combo("g g"));
        d.bind(Who::List, Act::Top, |state: &mut (Log, Vec<String>)| {
            state.0.push((Who::List, Act::Top))
        });
        d.set_observer(|state: &mut (Log, Vec<String>), keys: &KeyCombination| {
            state.1.push(keys.to_string())
        });
        let mut state = (Log::new(), Vec::new());
        let mut t = clock();

        d.press_at(&Who::List, key('x'), t.after_ms(0), &mut state);
        d.press_at(&Who::List, key('g'), t.after_ms(2000), &mut state);
        d.press_at(&Who::List, key('g'), t.after_ms(100), &mut state);
        assert_eq!(state.1, vec!["x", "g", "g g"]);
        assert_eq!(state.0.len(), 1);
    }

    #[test]
    fn switching_mode_clears_pending_keys() {
        let mut d: Dispatcher<Who, Act, Log> = Dispatcher::new();
        let mut log = Log::new();
        d.press(&Who::List, key('g'), &mut log);
        assert_eq!(d.combination(), combo("g"));

        d.set_mode(InputMode::Normal);
        assert_eq!(d.combination(), combo("g"));
        d.set_mode(InputMode::Input);
        assert_eq!(d.combination(), KeyCombination::Idle);
        assert_eq!(d.mode(), InputMode::Input);
    }
}
