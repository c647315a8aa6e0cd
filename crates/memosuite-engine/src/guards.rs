//! Exit guards consulted before leaving a screen.
//!
//! Each open dialog or editor registers a named guard. A back navigation asks
//! the stack, newest guard first, whether it may proceed.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// No opinion, ask the next guard.
    Continue,
    /// Leave immediately, skipping older guards.
    Allow,
    /// Stay; the guard has handled the request itself.
    Prevent,
}

type Handler = Box<dyn FnMut() -> GuardDecision>;

#[derive(Default)]
pub struct ExitGuards {
    stack: Vec<(String, Handler)>,
}

impl ExitGuards {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a guard. An existing guard with the same id is replaced and moves to the top.
    pub fn register<F>(&mut self, id: impl Into<String>, handler: F)
    where
        F: FnMut() -> GuardDecision + 'static,
    {
        let id = id.into();
        self.stack.retain(|(existing, _)| *existing != id);
        log::debug!("Registered exit guard {id}");
        self.stack.push((id, Box::new(handler)));
    }

    /// Remove a guard. Returns false if it was not registered.
    pub fn unregister(&mut self, id: &str) -> bool {
        let before = self.stack.len();
        self.stack.retain(|(existing, _)| existing != id);
        before != self.stack.len()
    }

    pub fn check(&mut self) -> GuardDecision {
        for (id, handler) in self.stack.iter_mut().rev() {
            match handler() {
                GuardDecision::Continue => continue,
                decision => {
                    log::debug!("Exit guard {id} decided {decision:?}");
                    return decision;
                }
            }
        }
        GuardDecision::Continue
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Guard ids, oldest first.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.stack.iter().map(|(id, _)| id.as_str())
    }
}

impl fmt::Debug for ExitGuards {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExitGuards")
            .field("ids", &self.ids().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_empty_stack_continues() {
        let mut guards = ExitGuards::new();
        assert_eq!(guards.check(), GuardDecision::Continue);
    }

    #[test]
    fn test_newest_guard_decides_first() {
        let mut guards = ExitGuards::new();
        guards.register("editor", || GuardDecision::Prevent);
        guards.register("modal", || GuardDecision::Allow);

        assert_eq!(guards.check(), GuardDecision::Allow);

        guards.unregister("modal");
        assert_eq!(guards.check(), GuardDecision::Prevent);
    }

    #[test]
    fn test_continue_falls_through_to_older_guards() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut guards = ExitGuards::new();
        for (id, decision) in [
            ("sidebar", GuardDecision::Prevent),
            ("viewer", GuardDecision::Continue),
            ("toast", GuardDecision::Continue),
        ] {
            let calls = Rc::clone(&calls);
            guards.register(id, move || {
                calls.borrow_mut().push(id);
                decision
            });
        }

        assert_eq!(guards.check(), GuardDecision::Prevent);
        assert_eq!(*calls.borrow(), vec!["toast", "viewer", "sidebar"]);
    }

    #[test]
    fn test_reregister_moves_guard_to_top() {
        let mut guards = ExitGuards::new();
        guards.register("a", || GuardDecision::Prevent);
        guards.register("b", || GuardDecision::Allow);
        guards.register("a", || GuardDecision::Prevent);

        assert_eq!(guards.ids().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(guards.check(), GuardDecision::Prevent);
    }

    #[test]
    fn test_unregister_unknown_id() {
        let mut guards = ExitGuards::new();
        assert!(!guards.unregister("missing"));
        assert!(guards.is_empty());
    }
}
