use std::collections::HashSet;

use crate::model::record::GroupIdentity;

/// Which kind of rendered row a click landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    GroupHeader,
    Member,
}

/// Where a registered action is offered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionScope {
    GroupHeader,
    Member,
    Both,
}

impl ActionScope {
    fn applies_to(self, kind: RowKind) -> bool {
        match self {
            ActionScope::Both => true,
            ActionScope::GroupHeader => kind == RowKind::GroupHeader,
            ActionScope::Member => kind == RowKind::Member,
        }
    }
}

/// Callback invoked with the clicked group's identity
pub type ActionHandler = Box<dyn FnMut(&GroupIdentity)>;

struct RegisteredAction {
    command: String,
    scope: ActionScope,
    handler: ActionHandler,
}

/// Routes group-row interactions back to the host.
///
/// Collapse state is rendering-local and never round-tripped to the server.
/// Actions are opaque to the controller: it matches the command id, hands the
/// clicked group's identity to the registered handler, and interprets
/// nothing.
#[derive(Default)]
pub struct GroupActionController {
    collapsed: HashSet<String>,
    actions: Vec<RegisteredAction>,
}

impl GroupActionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action under a command id, visible in the given scope
    pub fn register(
        &mut self,
        command: impl Into<String>,
        scope: ActionScope,
        handler: ActionHandler,
    ) {
        self.actions.push(RegisteredAction {
            command: command.into(),
            scope,
            handler,
        });
    }

    /// Flip a group's collapse state; returns the new state
    pub fn toggle_collapsed(&mut self, group_id: &str) -> bool {
        if self.collapsed.remove(group_id) {
            false
        } else {
            self.collapsed.insert(group_id.to_string());
            true
        }
    }

    pub fn is_collapsed(&self, group_id: &str) -> bool {
        self.collapsed.contains(group_id)
    }

    /// Command ids offered on the context menu for this row kind
    pub fn context_actions(&self, kind: RowKind) -> Vec<&str> {
        self.actions
            .iter()
            .filter(|a| a.scope.applies_to(kind))
            .map(|a| a.command.as_str())
            .collect()
    }

    /// Route a clicked command to its handler. Returns `false` for commands
    /// no one registered.
    pub fn dispatch(&mut self, command: &str, identity: &GroupIdentity) -> bool {
        let Some(action) = self.actions.iter_mut().find(|a| a.command == command) else {
            tracing::debug!(command, "ignoring unregistered group action");
            return false;
        };
        (action.handler)(identity);
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn identity() -> GroupIdentity {
        GroupIdentity {
            group_id: "PIP-1".into(),
            group_name: "Package".into(),
            job_no: "J-100".into(),
            function_group: "FG-A".into(),
        }
    }

    #[test]
    fn collapse_toggles_per_group() {
        let mut controller = GroupActionController::new();
        assert!(!controller.is_collapsed("PIP-1"));
        assert!(controller.toggle_collapsed("PIP-1"));
        assert!(controller.is_collapsed("PIP-1"));
        assert!(!controller.is_collapsed("PIP-2"));
        assert!(!controller.toggle_collapsed("PIP-1"));
        assert!(!controller.is_collapsed("PIP-1"));
    }

    #[test]
    fn dispatch_routes_identity_to_the_handler() {
        let mut controller = GroupActionController::new();
        let seen: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        controller.register(
            "add-row",
            ActionScope::GroupHeader,
            Box::new(move |identity| {
                sink.borrow_mut()
                    .push(format!("{}/{}", identity.group_id, identity.job_no));
            }),
        );

        assert!(controller.dispatch("add-row", &identity()));
        assert!(!controller.dispatch("unknown", &identity()));
        assert_eq!(seen.borrow().as_slice(), ["PIP-1/J-100"]);
    }

    #[test]
    fn context_menu_filters_by_row_kind() {
        let mut controller = GroupActionController::new();
        controller.register("add-row", ActionScope::GroupHeader, Box::new(|_| {}));
        controller.register("open-detail", ActionScope::Member, Box::new(|_| {}));
        controller.register("copy-id", ActionScope::Both, Box::new(|_| {}));

        assert_eq!(
            controller.context_actions(RowKind::GroupHeader),
            vec!["add-row", "copy-id"]
        );
        assert_eq!(
            controller.context_actions(RowKind::Member),
            vec!["open-detail", "copy-id"]
        );
    }
}
