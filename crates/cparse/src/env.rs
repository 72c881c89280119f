//! The typedef-aware scope table.
//!
//! C's grammar is context-sensitive: whether an identifier is a type
//! name or an ordinary identifier depends on whether a prior
//! `typedef` bound it in an enclosing scope (§4.4's "lexical feedback"
//! rule). `Env` is the single source of truth for that question; the
//! lexer never precomputes typedef-ness (§9).

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Binding {
    is_typedef: bool,
}

#[derive(Debug, Default)]
struct Frame {
    bindings: HashMap<String, Binding>,
}

/// A stack of scopes mapping identifier to `{ is_typedef }` (§3).
///
/// The global frame is never popped; [`Env::enter`]/[`Env::leave`]
/// must always be paired, and at the end of a parse only the global
/// frame remains (§8, "scope balance").
#[derive(Debug)]
pub struct Env {
    frames: Vec<Frame>,
}

impl Env {
    pub fn new() -> Self {
        Env {
            frames: vec![Frame::default()],
        }
    }

    /// Builds an `Env` whose global frame already has the given
    /// typedef names bound, e.g. `__builtin_va_list` (§6, "Scope
    /// seed").
    pub fn with_builtins<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut env = Env::new();
        for name in names {
            env.declare_typedef(name.into());
        }
        env
    }

    pub fn enter(&mut self) {
        self.frames.push(Frame::default());
    }

    pub fn leave(&mut self) {
        assert!(
            self.frames.len() > 1,
            "leave() called without a matching enter() (global frame is never popped)"
        );
        self.frames.pop();
    }

    /// True once only the global frame remains; used to assert scope
    /// balance at the end of a parse (§8).
    pub fn is_at_global_scope(&self) -> bool {
        self.frames.len() == 1
    }

    pub fn declare_ordinary(&mut self, name: impl Into<String>) {
        self.declare(name.into(), false);
    }

    pub fn declare_typedef(&mut self, name: impl Into<String>) {
        self.declare(name.into(), true);
    }

    fn declare(&mut self, name: String, is_typedef: bool) {
        let frame = self.frames.last_mut().expect("global frame always present");
        frame.bindings.insert(name, Binding { is_typedef });
    }

    /// Walks frames top-down; the nearest binding wins (shadowing).
    /// An unbound name is not a typedef name.
    pub fn is_typedef_in_scope(&self, name: &str) -> bool {
        for frame in self.frames.iter().rev() {
            if let Some(binding) = frame.bindings.get(name) {
                return binding.is_typedef;
            }
        }
        false
    }
}

impl Default for Env {
    fn default() -> Self {
        Env::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_frame_is_never_popped() {
        let env = Env::new();
        assert!(env.is_at_global_scope());
    }

    #[test]
    #[should_panic]
    fn leave_without_enter_panics() {
        let mut env = Env::new();
        env.leave();
    }

    #[test]
    fn typedef_visible_after_declaration() {
        let mut env = Env::new();
        assert!(!env.is_typedef_in_scope("u32"));
        env.declare_typedef("u32");
        assert!(env.is_typedef_in_scope("u32"));
    }

    #[test]
    fn nested_scope_shadows_outer_binding() {
        let mut env = Env::new();
        env.declare_typedef("T");
        env.enter();
        assert!(env.is_typedef_in_scope("T"));
        env.declare_ordinary("T");
        assert!(!env.is_typedef_in_scope("T"));
        env.leave();
        assert!(env.is_typedef_in_scope("T"));
    }

    #[test]
    fn builtins_seed_global_frame() {
        let env = Env::with_builtins(["__builtin_va_list"]);
        assert!(env.is_typedef_in_scope("__builtin_va_list"));
    }
}
