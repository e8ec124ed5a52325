pub mod company;
pub mod invitation;
pub mod member;

pub use company::*;
pub use invitation::*;
pub use member::*;

use vendhub_core::adapters::DatabaseAdapter;
use vendhub_core::{AppContext, AppError, AppRequest, AppResponse, AppResult, Session, UserProfile};

use super::config::TeamsConfig;
use super::rbac::{has_permission_any, Action, Resource};
use super::types::{HasPermissionRequest, HasPermissionResponse};
use crate::plugins::helpers::{require_member, require_session, resolve_company_id};

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

pub(crate) async fn has_permission_core<DB: DatabaseAdapter>(
    body: &HasPermissionRequest,
    user: &UserProfile,
    session: &Session,
    config: &TeamsConfig,
    ctx: &AppContext<DB>,
) -> AppResult<HasPermissionResponse> {
    let company_id = resolve_company_id(body.company_id.as_deref(), None, session, ctx).await?;

    let member = require_member(ctx, &company_id, &user.id).await?;

    let mut has_all_permissions = true;

    for (resource_str, actions) in &body.permissions {
        let resource = match Resource::parse(resource_str) {
            Some(r) => r,
            None => {
                has_all_permissions = false;
                break;
            }
        };

        for action_str in actions {
            let action = match Action::parse(action_str) {
                Some(a) => a,
                None => {
                    has_all_permissions = false;
                    break;
                }
            };

            if !has_permission_any(&member.role, &resource, &action, &config.roles) {
                has_all_permissions = false;
                break;
            }
        }

        if !has_all_permissions {
            break;
        }
    }

    Ok(HasPermissionResponse {
        success: has_all_permissions,
        error: if has_all_permissions {
            None
        } else {
            Some("Permission denied".to_string())
        },
    })
}

/// Handle has-permission request
pub async fn handle_has_permission<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
    config: &TeamsConfig,
) -> AppResult<AppResponse> {
    let (user, session) = require_session(req, ctx).await?;
    let body: HasPermissionRequest = req
        .body_as_json()
        .map_err(|e| AppError::bad_request(format!("Invalid request body: {}", e)))?;
    let response = has_permission_core(&body, &user, &session, config, ctx).await?;
    Ok(AppResponse::json(200, &response)?)
}
