//! In-memory role registry.

use std::collections::HashSet;

use parking_lot::RwLock;

use crate::traits::RoleGate;
use crate::types::{Address, Role};

/// Role registry backed by three address sets.
///
/// Membership can change at runtime; every check reads the current sets.
#[derive(Debug, Default)]
pub struct StaticRoleGate {
    operators: RwLock<HashSet<Address>>,
    core_team: RwLock<HashSet<Address>>,
    supervisors: RwLock<HashSet<Address>>,
}

impl StaticRoleGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a system operator.
    pub fn with_operator(self, who: Address) -> Self {
        self.grant(Role::SystemOperator, who);
        self
    }

    /// Builder: add a core-team administrator.
    pub fn with_core_team(self, who: Address) -> Self {
        self.grant(Role::CoreTeamAdmin, who);
        self
    }

    /// Builder: add a supervisor.
    pub fn with_supervisor(self, who: Address) -> Self {
        self.grant(Role::Supervisor, who);
        self
    }

    /// Grant a registry role. Returns `false` if `who` already held it or
    /// `role` is not backed by a registry (owner roles live on the unit).
    pub fn grant(&self, role: Role, who: Address) -> bool {
        match self.registry(role) {
            Some(set) => set.write().insert(who),
            None => false,
        }
    }

    /// Revoke a registry role. Returns `false` if `who` did not hold it.
    pub fn revoke(&self, role: Role, who: &Address) -> bool {
        match self.registry(role) {
            Some(set) => set.write().remove(who),
            None => false,
        }
    }

    fn registry(&self, role: Role) -> Option<&RwLock<HashSet<Address>>> {
        match role {
            Role::SystemOperator => Some(&self.operators),
            Role::CoreTeamAdmin => Some(&self.core_team),
            Role::Supervisor => Some(&self.supervisors),
            Role::Owner | Role::OwnerOrOperator => None,
        }
    }
}

impl RoleGate for StaticRoleGate {
    fn is_system_operator(&self, who: &Address) -> bool {
        self.operators.read().contains(who)
    }

    fn is_core_team_admin(&self, who: &Address) -> bool {
        self.core_team.read().contains(who)
    }

    fn is_supervisor(&self, who: &Address) -> bool {
        self.supervisors.read().contains(who)
    }
}
