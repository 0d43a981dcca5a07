//! The ordered action table and request resolution.
//!
//! Registration order is the canonical execution order. Resolution never
//! sorts topologically; it filters the table down to the requested names,
//! so `slice build` and `build slice` produce the same plan.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use super::context::Context;
use crate::error::{MakeError, Result};
use crate::stream::Output;

/// Handler signature shared by every action: `(context, stdout, debug_stdout)`.
pub type ActionFn = fn(&mut Context, &Output, &Output) -> Result<()>;

/// Names the user asked for; resolution adds implied actions in place.
pub type RequestedSet = BTreeSet<String>;

/// Behavior switches of an action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionFlags {
    /// Must be the only requested action.
    pub isolated: bool,
    /// Needs the merged options loaded before running.
    pub needs_options: bool,
    /// Operates on a project or an input file.
    pub takes_input_file: bool,
    /// Hidden from users; only reachable as an implied action.
    pub internal: bool,
    /// Nothing may run after it.
    pub last_in_chain: bool,
}

/// One named step.
#[derive(Debug, Clone)]
pub struct Action {
    pub name: &'static str,
    pub doc: &'static str,
    /// The "-ing" form used in headings when not simply `name + "ing"`.
    pub gerund: Option<&'static str>,
    pub flags: ActionFlags,
    pub implied: Vec<&'static str>,
    pub handler: ActionFn,
}

impl Action {
    /// A standalone action that cannot be combined with others.
    pub fn isolated(name: &'static str, doc: &'static str, handler: ActionFn) -> Self {
        Self {
            name,
            doc,
            gerund: None,
            flags: ActionFlags {
                isolated: true,
                ..Default::default()
            },
            implied: Vec::new(),
            handler,
        }
    }

    /// A pipeline step operating on the project files.
    pub fn pipeline(name: &'static str, doc: &'static str, handler: ActionFn) -> Self {
        Self {
            name,
            doc,
            gerund: None,
            flags: ActionFlags {
                needs_options: true,
                takes_input_file: true,
                ..Default::default()
            },
            implied: Vec::new(),
            handler,
        }
    }

    /// A hidden pipeline step that other steps depend on.
    pub fn internal(name: &'static str, handler: ActionFn) -> Self {
        let mut action = Self::pipeline(name, "", handler);
        action.flags.internal = true;
        action
    }

    pub fn needs_options(mut self) -> Self {
        self.flags.needs_options = true;
        self
    }

    pub fn last_in_chain(mut self) -> Self {
        self.flags.last_in_chain = true;
        self
    }

    pub fn gerund(mut self, gerund: &'static str) -> Self {
        self.gerund = Some(gerund);
        self
    }

    pub fn implies(mut self, names: &[&'static str]) -> Self {
        self.implied.extend_from_slice(names);
        self
    }

    /// Section heading printed before the step runs, e.g. `Slicing...`.
    pub fn heading(&self) -> String {
        let gerund = match self.gerund {
            Some(g) => g.to_string(),
            None => format!("{}ing", self.name),
        };
        let mut chars = gerund.chars();
        match chars.next() {
            Some(first) => format!("{}{}...", first.to_uppercase(), chars.as_str()),
            None => "...".to_string(),
        }
    }
}

/// Immutable, order-preserving table of actions.
#[derive(Debug, Clone, Default)]
pub struct ActionCatalog {
    actions: Vec<Action>,
    index: HashMap<&'static str, usize>,
}

impl ActionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action at the end of the canonical order.
    ///
    /// # Panics
    ///
    /// On a duplicate name, or if an implied action is not registered yet.
    /// The second rule keeps implied actions earlier in canonical order and
    /// the dependency graph acyclic.
    pub fn register(&mut self, action: Action) -> &mut Self {
        assert!(
            !self.index.contains_key(action.name),
            "action `{}` registered twice",
            action.name
        );
        for implied in &action.implied {
            assert!(
                self.index.contains_key(implied),
                "action `{}` implies `{}`, which must be registered first",
                action.name,
                implied
            );
        }
        assert!(
            !action.doc.is_empty() || action.flags.internal,
            "action `{}` lacks a description",
            action.name
        );

        self.index.insert(action.name, self.actions.len());
        self.actions.push(action);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Action> {
        self.index.get(name).map(|&i| &self.actions[i])
    }

    /// Canonical position of `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// All actions in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    /// Actions users may request, in canonical order.
    pub fn visible(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter().filter(|a| !a.flags.internal)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Validate `requested`, add implied actions to it, and order the result.
    ///
    /// Every check runs before anything executes.
    pub fn resolve(&self, requested: &mut RequestedSet) -> Result<ExecutionPlan<'_>> {
        for name in requested.iter() {
            match self.get(name) {
                Some(action) if !action.flags.internal => {}
                _ => return Err(MakeError::UnknownAction { name: name.clone() }),
            }
        }

        if requested.len() > 1 {
            if let Some(action) = self
                .iter()
                .find(|a| a.flags.isolated && requested.contains(a.name))
            {
                return Err(MakeError::IsolatedConflict {
                    action: action.name.to_string(),
                });
            }
        }

        self.expand_implied(requested);

        for (position, action) in self.actions.iter().enumerate() {
            if !action.flags.last_in_chain || !requested.contains(action.name) {
                continue;
            }
            let later: Vec<&str> = self.actions[position + 1..]
                .iter()
                .filter(|a| !a.flags.internal && requested.contains(a.name))
                .map(|a| a.name)
                .collect();
            if !later.is_empty() {
                return Err(MakeError::ChainOrder {
                    action: action.name.to_string(),
                    later: later.join(", "),
                });
            }
        }

        let plan = ExecutionPlan {
            actions: self
                .iter()
                .filter(|a| requested.contains(a.name))
                .collect(),
        };
        debug!("Resolved plan: {}", plan.names().join(" -> "));
        Ok(plan)
    }

    /// Union implied actions into `requested` until nothing changes.
    fn expand_implied(&self, requested: &mut RequestedSet) {
        loop {
            let missing: Vec<&'static str> = self
                .iter()
                .filter(|a| requested.contains(a.name))
                .flat_map(|a| a.implied.iter().copied())
                .filter(|name| !requested.contains(*name))
                .collect();
            if missing.is_empty() {
                return;
            }
            requested.extend(missing.into_iter().map(String::from));
        }
    }
}

/// Actions to run, in canonical order.
#[derive(Debug, Clone)]
pub struct ExecutionPlan<'a> {
    actions: Vec<&'a Action>,
}

impl<'a> ExecutionPlan<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &'a Action> + '_ {
        self.actions.iter().copied()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.actions.iter().map(|a| a.name).collect()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Whether any step needs options loaded.
    pub fn needs_options(&self) -> bool {
        self.actions.iter().any(|a| a.flags.needs_options)
    }

    /// Whether any step works on project or input files.
    pub fn takes_input_file(&self) -> bool {
        self.actions.iter().any(|a| a.flags.takes_input_file)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.iter().any(|a| a.name == name)
    }
}
