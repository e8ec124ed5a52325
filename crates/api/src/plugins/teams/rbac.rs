use std::collections::HashMap;

/// Resource types for permission checks
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resource {
    Company,
    Member,
    Invitation,
    Invoice,
    Billing,
}

impl Resource {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "company" => Some(Self::Company),
            "member" => Some(Self::Member),
            "invitation" => Some(Self::Invitation),
            "invoice" => Some(Self::Invoice),
            "billing" => Some(Self::Billing),
            _ => None,
        }
    }
}

/// Actions that can be performed on resources
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    Cancel,
    Manage,
}

impl Action {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "create" => Some(Self::Create),
            "read" => Some(Self::Read),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            "cancel" => Some(Self::Cancel),
            "manage" => Some(Self::Manage),
            _ => None,
        }
    }
}

/// Permission definition
pub type Permissions = HashMap<Resource, Vec<Action>>;

/// Role with associated permissions
#[derive(Debug, Clone)]
pub struct Role {
    pub name: String,
    pub permissions: Permissions,
}

/// Default role definitions: owner, admin, member.
pub fn default_roles() -> HashMap<String, Role> {
    let mut roles = HashMap::new();

    // Owner - full permissions
    roles.insert(
        "owner".to_string(),
        Role {
            name: "owner".to_string(),
            permissions: {
                let mut p = HashMap::new();
                p.insert(Resource::Company, vec![Action::Update, Action::Delete]);
                p.insert(
                    Resource::Member,
                    vec![Action::Create, Action::Update, Action::Delete],
                );
                p.insert(Resource::Invitation, vec![Action::Create, Action::Cancel]);
                p.insert(
                    Resource::Invoice,
                    vec![Action::Create, Action::Update, Action::Delete],
                );
                p.insert(Resource::Billing, vec![Action::Manage]);
                p
            },
        },
    );

    // Admin - everything except company deletion and billing
    roles.insert(
        "admin".to_string(),
        Role {
            name: "admin".to_string(),
            permissions: {
                let mut p = HashMap::new();
                p.insert(Resource::Company, vec![Action::Update]);
                p.insert(
                    Resource::Member,
                    vec![Action::Create, Action::Update, Action::Delete],
                );
                p.insert(Resource::Invitation, vec![Action::Create, Action::Cancel]);
                p.insert(
                    Resource::Invoice,
                    vec![Action::Create, Action::Update, Action::Delete],
                );
                p
            },
        },
    );

    // Member - day-to-day invoicing, nothing structural
    roles.insert(
        "member".to_string(),
        Role {
            name: "member".to_string(),
            permissions: {
                let mut p = HashMap::new();
                p.insert(Resource::Invoice, vec![Action::Create, Action::Update]);
                p
            },
        },
    );

    roles
}

/// Check if a role has permission for an action on a resource
pub fn has_permission(
    role: &str,
    resource: &Resource,
    action: &Action,
    custom_roles: &HashMap<String, super::config::RolePermissions>,
) -> bool {
    let default = default_roles();

    // Check custom roles first
    if let Some(custom_role) = custom_roles.get(role) {
        let actions = match resource {
            Resource::Company => &custom_role.company,
            Resource::Member => &custom_role.member,
            Resource::Invitation => &custom_role.invitation,
            Resource::Invoice => &custom_role.invoice,
            Resource::Billing => &custom_role.billing,
        };
        let action_str = match action {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Cancel => "cancel",
            Action::Manage => "manage",
        };
        if actions.iter().any(|a| a == action_str) {
            return true;
        }
    }

    // Fall back to default roles
    if let Some(role_def) = default.get(role) {
        if let Some(actions) = role_def.permissions.get(resource) {
            return actions.contains(action);
        }
    }

    false
}

/// Handle composite roles (comma-separated)
pub fn has_permission_any(
    roles_str: &str,
    resource: &Resource,
    action: &Action,
    custom_roles: &HashMap<String, super::config::RolePermissions>,
) -> bool {
    for role in roles_str.split(',').map(|s| s.trim()) {
        if has_permission(role, resource, action, custom_roles) {
            return true;
        }
    }
    false
}

/// Permission check against the default role matrix only, for plugins that
/// carry no custom-role configuration of their own.
pub fn role_allows(roles_str: &str, resource: &Resource, action: &Action) -> bool {
    has_permission_any(roles_str, resource, action, &HashMap::new())
}
