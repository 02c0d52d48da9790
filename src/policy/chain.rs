use std::fmt;

use indexmap::IndexMap;

use super::{EditPolicy, FeedbackContext, PolicyContext, Role};
use crate::command::{Command, chain};
use crate::editpart::PartId;
use crate::request::Request;
use crate::selection::SelectionState;

/// The ordered `role -> policy` table of one edit part.
///
/// Installing under an existing role replaces the policy in place, so the
/// order roles were first installed in is the order requests are dispatched
/// in. A role may hold no policy: such a reserved slot is skipped during
/// dispatch but keeps its position for a later install.
pub struct PolicyChain<M> {
    host: Option<PartId>,
    policies: IndexMap<Role, Option<Box<dyn EditPolicy<M>>>>,
    active: bool,
}

impl<M> fmt::Debug for PolicyChain<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyChain")
            .field("host", &self.host)
            .field("policies", &self.policies)
            .field("active", &self.active)
            .finish()
    }
}

impl<M> Default for PolicyChain<M> {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<M> PolicyChain<M> {
    pub fn new(host: Option<PartId>) -> Self {
        Self {
            host,
            policies: IndexMap::new(),
            active: false,
        }
    }

    pub fn host(&self) -> Option<PartId> {
        self.host
    }

    pub(crate) fn set_host(&mut self, host: Option<PartId>) {
        self.host = host;
        for (_, policy) in self.iter_mut() {
            policy.set_host(host);
        }
    }

    /// Installs `policy` under `role`, replacing (and releasing) whatever was
    /// there. `None` reserves the slot.
    ///
    /// # Panics
    /// If `role` is empty.
    pub fn install(&mut self, role: Role, policy: Option<Box<dyn EditPolicy<M>>>) {
        assert!(!role.is_empty(), "Edit policies must be installed with keys");

        if let Some(Some(old)) = self.policies.get_mut(&role) {
            log::trace!("Replacing edit policy {}", role);
            if self.active {
                old.deactivate();
            }
            old.set_host(None);
        }

        let policy = policy.map(|mut policy| {
            policy.set_host(self.host);
            if self.active {
                policy.activate();
            }
            policy
        });
        self.policies.insert(role, policy);
    }

    /// Takes the policy out of `role`. The role keeps its position.
    pub fn remove(&mut self, role: &Role) -> Option<Box<dyn EditPolicy<M>>> {
        let mut old = self.policies.get_mut(role)?.take()?;
        if self.active {
            old.deactivate();
        }
        old.set_host(None);
        Some(old)
    }

    pub fn get(&self, role: &Role) -> Option<&dyn EditPolicy<M>> {
        self.policies.get(role).and_then(|policy| policy.as_deref())
    }

    pub fn contains(&self, role: &Role) -> bool {
        self.get(role).is_some()
    }

    /// All roles in dispatch order, reserved slots included.
    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.policies.keys()
    }

    /// Installed policies in dispatch order.
    pub fn iter(&self) -> impl Iterator<Item = (&Role, &Box<dyn EditPolicy<M>>)> {
        self.policies
            .iter()
            .filter_map(|(role, policy)| policy.as_ref().map(|policy| (role, policy)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&Role, &mut Box<dyn EditPolicy<M>>)> {
        self.policies
            .iter_mut()
            .filter_map(|(role, policy)| policy.as_mut().map(|policy| (role, policy)))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn activate(&mut self) {
        if self.active {
            return;
        }
        self.active = true;
        for (_, policy) in self.iter_mut() {
            policy.activate();
        }
    }

    pub fn deactivate(&mut self) {
        if !self.active {
            return;
        }
        for (_, policy) in self.iter_mut() {
            policy.deactivate();
        }
        self.active = false;
    }

    /// Releases every policy from the host. Used when the host goes away.
    pub(crate) fn release(&mut self) {
        self.deactivate();
        self.set_host(None);
    }

    /// Chains the commands of every policy, left to right. `None` when every
    /// policy declined.
    pub fn command(&self, request: &Request, ctx: &PolicyContext<'_, M>) -> Option<Box<dyn Command<M>>>
    where
        M: 'static,
    {
        let mut command: Option<Box<dyn Command<M>>> = None;
        for (_, policy) in self.iter() {
            let next = policy.command(request, ctx);
            command = match command {
                Some(command) => Some(chain(command, next)),
                None => next,
            };
        }
        command
    }

    /// The first target any policy names.
    pub fn target_edit_part(&self, request: &Request, ctx: &PolicyContext<'_, M>) -> Option<PartId> {
        self.iter().find_map(|(_, policy)| policy.target_edit_part(request, ctx))
    }

    pub fn understands_request(&self, request: &Request, ctx: &PolicyContext<'_, M>) -> bool {
        self.iter().any(|(_, policy)| policy.understands_request(request, ctx))
    }

    pub fn show_source_feedback(&mut self, request: &Request, feedback: &mut FeedbackContext<'_>) {
        for (_, policy) in self.iter_mut() {
            policy.show_source_feedback(request, feedback);
        }
    }

    pub fn erase_source_feedback(&mut self, request: &Request, feedback: &mut FeedbackContext<'_>) {
        for (_, policy) in self.iter_mut() {
            policy.erase_source_feedback(request, feedback);
        }
    }

    pub fn show_target_feedback(&mut self, request: &Request, feedback: &mut FeedbackContext<'_>) {
        for (_, policy) in self.iter_mut() {
            policy.show_target_feedback(request, feedback);
        }
    }

    pub fn erase_target_feedback(&mut self, request: &Request, feedback: &mut FeedbackContext<'_>) {
        for (_, policy) in self.iter_mut() {
            policy.erase_target_feedback(request, feedback);
        }
    }

    pub(crate) fn clear_feedback(&mut self, feedback: &mut FeedbackContext<'_>) {
        for (_, policy) in self.iter_mut() {
            policy.clear_feedback(feedback);
        }
    }

    pub(crate) fn host_selection_changed(
        &mut self,
        selected: SelectionState,
        focus: bool,
        feedback: &mut FeedbackContext<'_>,
    ) {
        for (_, policy) in self.iter_mut() {
            policy.host_selection_changed(selected, focus, feedback);
        }
    }
}
