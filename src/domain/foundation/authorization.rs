//! Authorization support types.
//!
//! The core never authenticates anybody. It receives an already resolved
//! [`Caller`] and answers a single question before each mutation:
//! may this caller modify this entity?
//!
//! ```text
//! owner / creator          -> allowed
//! assignee                 -> allowed
//! manager-role + company   -> allowed
//! everyone else            -> Forbidden
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{CompanyId, UserId, ValidationError};

/// Role held by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SuperAdmin,
    CompanyAdmin,
    Manager,
    Market,
    ProjectManager,
    ProjectLeader,
    Viewer,
    ApiService,
}

impl Role {
    /// Roles allowed to modify records they neither own nor are assigned to.
    pub fn is_manager_role(&self) -> bool {
        matches!(self, Role::Manager | Role::CompanyAdmin | Role::SuperAdmin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::CompanyAdmin => "company_admin",
            Role::Manager => "manager",
            Role::Market => "market",
            Role::ProjectManager => "project_manager",
            Role::ProjectLeader => "project_leader",
            Role::Viewer => "viewer",
            Role::ApiService => "api_service",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "super_admin" => Ok(Role::SuperAdmin),
            "company_admin" => Ok(Role::CompanyAdmin),
            "manager" => Ok(Role::Manager),
            "market" => Ok(Role::Market),
            "project_manager" => Ok(Role::ProjectManager),
            "project_leader" => Ok(Role::ProjectLeader),
            "viewer" => Ok(Role::Viewer),
            "api_service" => Ok(Role::ApiService),
            other => Err(ValidationError::invalid_format(
                "role",
                format!("unknown role '{}'", other),
            )),
        }
    }
}

/// Resolved identity of whoever issued a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: UserId,
    pub display_name: Option<String>,
    pub roles: Vec<Role>,
    /// Home company of the caller.
    pub company_id: CompanyId,
}

impl Caller {
    pub fn new(user_id: UserId, roles: Vec<Role>, company_id: CompanyId) -> Self {
        Self {
            user_id,
            display_name: None,
            roles,
            company_id,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn has_manager_role(&self) -> bool {
        self.roles.iter().any(Role::is_manager_role)
    }

    /// Super admins and parent-company users see every company.
    pub fn can_access_company(&self, company: &CompanyId) -> bool {
        self.has_role(Role::SuperAdmin)
            || self.company_id.as_str() == CompanyId::GRUPPEN
            || &self.company_id == company
    }

    /// Name recorded on history entries and activities.
    pub fn name(&self) -> &str {
        self.display_name
            .as_deref()
            .unwrap_or_else(|| self.user_id.as_str())
    }
}

/// Implemented by aggregates that carry ownership and assignment.
pub trait Modifiable {
    /// The type name for authorization logs (e.g., "Deal", "Offer").
    const RESOURCE_TYPE: &'static str;

    fn resource_id(&self) -> String;

    /// The user who created or owns the record, if known.
    fn owner(&self) -> Option<&UserId>;

    /// The user currently responsible for the record, if any.
    fn assignee(&self) -> Option<&UserId>;

    fn company(&self) -> &CompanyId;
}

/// Single capability check evaluated before every mutating operation.
pub fn can_modify<T: Modifiable>(caller: &Caller, entity: &T) -> bool {
    if entity.owner() == Some(&caller.user_id) || entity.assignee() == Some(&caller.user_id) {
        return true;
    }
    caller.has_manager_role() && caller.can_access_company(entity.company())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Record {
        owner: UserId,
        assignee: Option<UserId>,
        company: CompanyId,
    }

    impl Modifiable for Record {
        const RESOURCE_TYPE: &'static str = "Record";

        fn resource_id(&self) -> String {
            "record-1".to_string()
        }

        fn owner(&self) -> Option<&UserId> {
            Some(&self.owner)
        }

        fn assignee(&self) -> Option<&UserId> {
            self.assignee.as_ref()
        }

        fn company(&self) -> &CompanyId {
            &self.company
        }
    }

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn company(id: &str) -> CompanyId {
        CompanyId::new(id).unwrap()
    }

    fn record() -> Record {
        Record {
            owner: user("owner"),
            assignee: Some(user("assignee")),
            company: company("tak"),
        }
    }

    #[test]
    fn owner_may_modify() {
        let caller = Caller::new(user("owner"), vec![Role::Market], company("tak"));
        assert!(can_modify(&caller, &record()));
    }

    #[test]
    fn assignee_may_modify() {
        let caller = Caller::new(user("assignee"), vec![Role::Viewer], company("stalbygg"));
        assert!(can_modify(&caller, &record()));
    }

    #[test]
    fn manager_in_same_company_may_modify() {
        let caller = Caller::new(user("boss"), vec![Role::Manager], company("tak"));
        assert!(can_modify(&caller, &record()));
    }

    #[test]
    fn manager_of_other_company_may_not_modify() {
        let caller = Caller::new(user("boss"), vec![Role::Manager], company("stalbygg"));
        assert!(!can_modify(&caller, &record()));
    }

    #[test]
    fn gruppen_admin_reaches_every_company() {
        let caller = Caller::new(user("admin"), vec![Role::CompanyAdmin], company("gruppen"));
        assert!(can_modify(&caller, &record()));
    }

    #[test]
    fn unrelated_market_user_may_not_modify() {
        let caller = Caller::new(user("someone"), vec![Role::Market], company("tak"));
        assert!(!can_modify(&caller, &record()));
    }

    #[test]
    fn role_parses_from_snake_case() {
        assert_eq!("company_admin".parse::<Role>().unwrap(), Role::CompanyAdmin);
        assert!("wizard".parse::<Role>().is_err());
    }

    #[test]
    fn caller_name_falls_back_to_user_id() {
        let caller = Caller::new(user("u-1"), vec![], company("tak"));
        assert_eq!(caller.name(), "u-1");
        assert_eq!(caller.with_display_name("Kari").name(), "Kari");
    }
}
