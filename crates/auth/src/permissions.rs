//! Typed per-module capability sets.
//!
//! Permissions are modeled as an explicit set of allowed actions per module
//! rather than a nested map of booleans: a module or action that is absent
//! from the set is denied by construction, never undefined.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Business module a permission applies to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    Inventory,
    Production,
    Orders,
    Financial,
    Security,
    Hr,
    Admin,
}

impl Module {
    pub const ALL: [Module; 7] = [
        Module::Inventory,
        Module::Production,
        Module::Orders,
        Module::Financial,
        Module::Security,
        Module::Hr,
        Module::Admin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Inventory => "inventory",
            Module::Production => "production",
            Module::Orders => "orders",
            Module::Financial => "financial",
            Module::Security => "security",
            Module::Hr => "hr",
            Module::Admin => "admin",
        }
    }
}

impl core::fmt::Display for Module {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action that can be allowed on a module.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
    Approve,
    ViewReports,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::View,
        Action::Create,
        Action::Edit,
        Action::Delete,
        Action::Approve,
        Action::ViewReports,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::Approve => "approve",
            Action::ViewReports => "viewReports",
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability set: module → allowed actions.
///
/// # Invariants
/// - A (module, action) pair not present in the set is denied.
/// - The set never stores an explicit "denied" marker; revoking removes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionMatrix {
    modules: BTreeMap<Module, BTreeSet<Action>>,
}

impl PermissionMatrix {
    /// An empty matrix: every action on every module is denied.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A fully-enabled matrix: every action on every module is allowed.
    pub fn full() -> Self {
        let mut matrix = Self::default();
        for module in Module::ALL {
            for action in Action::ALL {
                matrix.allow(module, action);
            }
        }
        matrix
    }

    pub fn allows(&self, module: Module, action: Action) -> bool {
        self.modules
            .get(&module)
            .is_some_and(|actions| actions.contains(&action))
    }

    pub fn allow(&mut self, module: Module, action: Action) {
        self.modules.entry(module).or_default().insert(action);
    }

    pub fn revoke(&mut self, module: Module, action: Action) {
        if let Some(actions) = self.modules.get_mut(&module) {
            actions.remove(&action);
            if actions.is_empty() {
                self.modules.remove(&module);
            }
        }
    }

    /// Builder-style grant used when constructing role presets.
    pub fn with(mut self, module: Module, actions: &[Action]) -> Self {
        for action in actions {
            self.allow(module, *action);
        }
        self
    }

    /// Allowed actions for a module, in stable order.
    pub fn allowed_actions(&self, module: Module) -> Vec<Action> {
        self.modules
            .get(&module)
            .map(|actions| actions.iter().copied().collect())
            .unwrap_or_default()
    }
}
