pub mod config;
pub mod handlers;
pub mod rbac;
#[cfg(test)]
mod tests;
pub mod types;

use async_trait::async_trait;
use vendhub_core::adapters::DatabaseAdapter;
use vendhub_core::{AppContext, AppPlugin, AppRequest, AppResponse, AppResult, HttpMethod, Route};

pub use config::TeamsConfig;

/// Team-management feature area: companies, memberships, and invitations.
pub struct TeamsPlugin {
    config: TeamsConfig,
}

impl TeamsPlugin {
    pub fn new() -> Self {
        Self {
            config: TeamsConfig::default(),
        }
    }

    pub fn with_config(config: TeamsConfig) -> Self {
        Self { config }
    }

    // Builder methods
    pub fn allow_user_to_create_company(mut self, allow: bool) -> Self {
        self.config.allow_user_to_create_company = allow;
        self
    }

    pub fn company_limit(mut self, limit: usize) -> Self {
        self.config.company_limit = Some(limit);
        self
    }

    pub fn membership_limit(mut self, limit: usize) -> Self {
        self.config.membership_limit = Some(limit);
        self
    }

    pub fn creator_role(mut self, role: impl Into<String>) -> Self {
        self.config.creator_role = role.into();
        self
    }

    pub fn invitation_expires_in(mut self, seconds: u64) -> Self {
        self.config.invitation_expires_in = seconds;
        self
    }

    pub fn invitation_limit(mut self, limit: usize) -> Self {
        self.config.invitation_limit = Some(limit);
        self
    }

    pub fn disable_company_deletion(mut self, disable: bool) -> Self {
        self.config.disable_company_deletion = disable;
        self
    }
}

impl Default for TeamsPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<DB: DatabaseAdapter> AppPlugin<DB> for TeamsPlugin {
    fn name(&self) -> &'static str {
        "teams"
    }

    fn routes(&self) -> Vec<Route> {
        vec![
            // Company CRUD
            Route::post("/teams/create", "create_company"),
            Route::post("/teams/update", "update_company"),
            Route::post("/teams/delete", "delete_company"),
            Route::get("/teams/list", "list_companies"),
            Route::get("/teams/get-full-company", "get_full_company"),
            Route::post("/teams/check-slug", "check_slug"),
            Route::post("/teams/set-active", "set_active_company"),
            Route::post("/teams/leave", "leave_company"),
            // Member management
            Route::get("/teams/get-active-member", "get_active_member"),
            Route::get("/teams/list-members", "list_members"),
            Route::post("/teams/remove-member", "remove_member"),
            Route::post("/teams/update-member-role", "update_member_role"),
            // Invitations
            Route::post("/teams/invite-member", "invite_member"),
            Route::get("/teams/get-invitation", "get_invitation"),
            Route::get("/teams/list-invitations", "list_invitations"),
            Route::get("/teams/list-user-invitations", "list_user_invitations"),
            Route::post("/teams/accept-invitation", "accept_invitation"),
            Route::post("/teams/reject-invitation", "reject_invitation"),
            Route::post("/teams/cancel-invitation", "cancel_invitation"),
            // Permission check
            Route::post("/teams/has-permission", "has_permission"),
        ]
    }

    async fn on_request(
        &self,
        req: &AppRequest,
        ctx: &AppContext<DB>,
    ) -> AppResult<Option<AppResponse>> {
        match (req.method(), req.path()) {
            // Company CRUD
            (HttpMethod::Post, "/teams/create") => Ok(Some(
                handlers::handle_create_company(req, ctx, &self.config).await?,
            )),
            (HttpMethod::Post, "/teams/update") => Ok(Some(
                handlers::handle_update_company(req, ctx, &self.config).await?,
            )),
            (HttpMethod::Post, "/teams/delete") => Ok(Some(
                handlers::handle_delete_company(req, ctx, &self.config).await?,
            )),
            (HttpMethod::Get, "/teams/list") => {
                Ok(Some(handlers::handle_list_companies(req, ctx).await?))
            }
            (HttpMethod::Get, "/teams/get-full-company") => {
                Ok(Some(handlers::handle_get_full_company(req, ctx).await?))
            }
            (HttpMethod::Post, "/teams/check-slug") => {
                Ok(Some(handlers::handle_check_slug(req, ctx).await?))
            }
            (HttpMethod::Post, "/teams/set-active") => {
                Ok(Some(handlers::handle_set_active_company(req, ctx).await?))
            }
            (HttpMethod::Post, "/teams/leave") => {
                Ok(Some(handlers::handle_leave_company(req, ctx).await?))
            }
            // Member management
            (HttpMethod::Get, "/teams/get-active-member") => {
                Ok(Some(handlers::handle_get_active_member(req, ctx).await?))
            }
            (HttpMethod::Get, "/teams/list-members") => {
                Ok(Some(handlers::handle_list_members(req, ctx).await?))
            }
            (HttpMethod::Post, "/teams/remove-member") => Ok(Some(
                handlers::handle_remove_member(req, ctx, &self.config).await?,
            )),
            (HttpMethod::Post, "/teams/update-member-role") => Ok(Some(
                handlers::handle_update_member_role(req, ctx, &self.config).await?,
            )),
            // Invitations
            (HttpMethod::Post, "/teams/invite-member") => Ok(Some(
                handlers::handle_invite_member(req, ctx, &self.config).await?,
            )),
            (HttpMethod::Get, "/teams/get-invitation") => {
                Ok(Some(handlers::handle_get_invitation(req, ctx).await?))
            }
            (HttpMethod::Get, "/teams/list-invitations") => {
                Ok(Some(handlers::handle_list_invitations(req, ctx).await?))
            }
            (HttpMethod::Get, "/teams/list-user-invitations") => Ok(Some(
                handlers::handle_list_user_invitations(req, ctx).await?,
            )),
            (HttpMethod::Post, "/teams/accept-invitation") => Ok(Some(
                handlers::handle_accept_invitation(req, ctx, &self.config).await?,
            )),
            (HttpMethod::Post, "/teams/reject-invitation") => {
                Ok(Some(handlers::handle_reject_invitation(req, ctx).await?))
            }
            (HttpMethod::Post, "/teams/cancel-invitation") => Ok(Some(
                handlers::handle_cancel_invitation(req, ctx, &self.config).await?,
            )),
            // Permission check
            (HttpMethod::Post, "/teams/has-permission") => Ok(Some(
                handlers::handle_has_permission(req, ctx, &self.config).await?,
            )),
            _ => Ok(None),
        }
    }
}
