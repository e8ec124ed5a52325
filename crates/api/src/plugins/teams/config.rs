use std::collections::HashMap;

/// Configuration for the Teams plugin
#[derive(Debug, Clone)]
pub struct TeamsConfig {
    /// Allow users to create companies (default: true)
    pub allow_user_to_create_company: bool,
    /// Maximum companies per user (None = unlimited)
    pub company_limit: Option<usize>,
    /// Maximum members per company (None = unlimited)
    pub membership_limit: Option<usize>,
    /// Role assigned to the company creator (default: "owner")
    pub creator_role: String,
    /// Invitation expiration in seconds (default: 48 hours)
    pub invitation_expires_in: u64,
    /// Maximum pending invitations per company (None = unlimited)
    pub invitation_limit: Option<usize>,
    /// Disable company deletion (default: false)
    pub disable_company_deletion: bool,
    /// Custom role definitions (extending default roles)
    pub roles: HashMap<String, RolePermissions>,
}

/// Permission definitions for a role
#[derive(Debug, Clone, Default)]
pub struct RolePermissions {
    pub company: Vec<String>,
    pub member: Vec<String>,
    pub invitation: Vec<String>,
    pub invoice: Vec<String>,
    pub billing: Vec<String>,
}

impl Default for TeamsConfig {
    fn default() -> Self {
        Self {
            allow_user_to_create_company: true,
            company_limit: None,
            membership_limit: Some(100),
            creator_role: "owner".to_string(),
            invitation_expires_in: 60 * 60 * 48, // 48 hours
            invitation_limit: Some(100),
            disable_company_deletion: false,
            roles: HashMap::new(),
        }
    }
}

impl TeamsConfig {
    pub fn new() -> Self {
        Self::default()
    }
}
