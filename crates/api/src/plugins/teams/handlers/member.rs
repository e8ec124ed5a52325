use vendhub_core::adapters::DatabaseAdapter;
use vendhub_core::{
    AppContext, AppError, AppRequest, AppResponse, AppResult, Membership, RecordAudit,
};

use super::super::config::TeamsConfig;
use super::super::rbac::{has_permission_any, Action, Resource};
use super::super::types::{
    ListMembersQuery, ListMembersResponse, MemberResponse, RemoveMemberRequest, SuccessResponse,
    UpdateMemberRoleRequest,
};
use crate::plugins::helpers::{parse_query, require_member, require_session, resolve_company_id};

/// Handle get active member request
pub async fn handle_get_active_member<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
) -> AppResult<AppResponse> {
    let (user, session) = require_session(req, ctx).await?;

    let company_id = session
        .active_company_id
        .as_deref()
        .ok_or_else(|| AppError::bad_request("No active company"))?;

    let member = require_member(ctx, company_id, &user.id).await?;
    let member_response = MemberResponse::from_membership_and_user(&member, &user);

    Ok(AppResponse::json(200, &member_response)?)
}

/// Handle list members request
pub async fn handle_list_members<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
) -> AppResult<AppResponse> {
    let (user, session) = require_session(req, ctx).await?;

    let query = parse_query::<ListMembersQuery>(&req.query);

    let company_id = resolve_company_id(
        query.company_id.as_deref(),
        query.company_slug.as_deref(),
        &session,
        ctx,
    )
    .await?;

    require_member(ctx, &company_id, &user.id).await?;

    let members_raw = ctx.database.list_company_members(&company_id).await?;
    let total = members_raw.len();

    let offset = query.offset.unwrap_or(0);
    let limit = query.limit.unwrap_or(50).min(100);

    let members_page: Vec<_> = members_raw.into_iter().skip(offset).take(limit).collect();

    let mut members = Vec::with_capacity(members_page.len());
    for membership in &members_page {
        if let Some(user_info) = ctx.database.get_profile_by_id(&membership.user_id).await? {
            members.push(MemberResponse::from_membership_and_user(membership, &user_info));
        }
    }

    let response = ListMembersResponse { members, total };

    Ok(AppResponse::json(200, &response)?)
}

/// Resolve the target membership of a remove/update request by member id or
/// email, verifying it belongs to the company.
async fn resolve_target_member<DB: DatabaseAdapter>(
    member_id: Option<&str>,
    email: Option<&str>,
    company_id: &str,
    ctx: &AppContext<DB>,
) -> AppResult<Membership> {
    let target = if let Some(member_id) = member_id {
        ctx.database
            .get_membership_by_id(member_id)
            .await?
            .ok_or_else(|| AppError::not_found("Member not found"))?
    } else if let Some(email) = email {
        let target_user = ctx
            .database
            .get_profile_by_email(email)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;
        ctx.database
            .get_membership(company_id, &target_user.id)
            .await?
            .ok_or_else(|| AppError::not_found("Member not found"))?
    } else {
        return Err(AppError::bad_request(
            "Either member_id or email must be provided",
        ));
    };

    if target.company_id != company_id {
        return Err(AppError::bad_request("Member not in this company"));
    }

    Ok(target)
}

/// Handle remove member request
pub async fn handle_remove_member<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
    config: &TeamsConfig,
) -> AppResult<AppResponse> {
    let (user, session) = require_session(req, ctx).await?;
    let body: RemoveMemberRequest = req
        .body_as_json()
        .map_err(|e| AppError::bad_request(format!("Invalid request body: {}", e)))?;

    let company_id = resolve_company_id(body.company_id.as_deref(), None, &session, ctx).await?;

    let requester = require_member(ctx, &company_id, &user.id).await?;

    let target = resolve_target_member(
        body.member_id.as_deref(),
        body.email.as_deref(),
        &company_id,
        ctx,
    )
    .await?;

    // Removing yourself needs no permission; removing others does.
    let is_self_removal = target.user_id == user.id;
    if !is_self_removal
        && !has_permission_any(&requester.role, &Resource::Member, &Action::Delete, &config.roles)
    {
        return Err(AppError::forbidden(
            "You don't have permission to remove members",
        ));
    }

    if target.role.contains("owner") {
        let all_members = ctx.database.list_company_members(&company_id).await?;
        let owner_count = all_members
            .iter()
            .filter(|m| m.role.contains("owner"))
            .count();
        if owner_count <= 1 {
            return Err(AppError::bad_request("Cannot remove the last owner"));
        }
    }

    ctx.database.delete_membership(&target.id).await?;

    ctx.database
        .record_audit(RecordAudit::new(
            &company_id,
            &user.id,
            "member.removed",
            &target.user_id,
        ))
        .await?;

    Ok(AppResponse::json(200, &SuccessResponse { success: true })?)
}

/// Handle update member role request
pub async fn handle_update_member_role<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
    config: &TeamsConfig,
) -> AppResult<AppResponse> {
    let (user, session) = require_session(req, ctx).await?;
    let body: UpdateMemberRoleRequest = req
        .body_as_json()
        .map_err(|e| AppError::bad_request(format!("Invalid request body: {}", e)))?;

    let company_id = resolve_company_id(body.company_id.as_deref(), None, &session, ctx).await?;

    let requester = require_member(ctx, &company_id, &user.id).await?;
    if !has_permission_any(&requester.role, &Resource::Member, &Action::Update, &config.roles) {
        return Err(AppError::forbidden(
            "You don't have permission to update member roles",
        ));
    }

    let target = resolve_target_member(Some(&body.member_id), None, &company_id, ctx).await?;

    // Demoting the last owner would orphan the company.
    if target.role.contains("owner") && !body.role.contains("owner") {
        let all_members = ctx.database.list_company_members(&company_id).await?;
        let owner_count = all_members
            .iter()
            .filter(|m| m.role.contains("owner"))
            .count();
        if owner_count <= 1 {
            return Err(AppError::bad_request("Cannot demote the last owner"));
        }
    }

    let updated = ctx
        .database
        .update_membership_role(&target.id, &body.role)
        .await?;

    ctx.database
        .record_audit(RecordAudit::new(
            &company_id,
            &user.id,
            "member.role_updated",
            &updated.user_id,
        ))
        .await?;

    let target_user = ctx
        .database
        .get_profile_by_id(&updated.user_id)
        .await?
        .ok_or(AppError::UserNotFound)?;
    let response = MemberResponse::from_membership_and_user(&updated, &target_user);

    Ok(AppResponse::json(200, &response)?)
}
