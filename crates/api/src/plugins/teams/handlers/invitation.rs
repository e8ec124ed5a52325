use vendhub_core::adapters::DatabaseAdapter;
use vendhub_core::{
    AppContext, AppError, AppRequest, AppResponse, AppResult, CreateInvitation, CreateMembership,
    Invitation, InvitationStatus, Logger as _, RecordAudit, Session, UserProfile,
};

use super::super::config::TeamsConfig;
use super::super::rbac::{has_permission_any, Action, Resource};
use super::super::types::{
    AcceptInvitationRequest, AcceptInvitationResponse, CancelInvitationRequest,
    GetInvitationQuery, GetInvitationResponse, InviteMemberRequest, ListInvitationsQuery,
    MemberResponse, RejectInvitationRequest, SuccessResponse,
};
use crate::plugins::helpers::{parse_query, require_member, require_session, resolve_company_id};

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

pub(crate) async fn invite_member_core<DB: DatabaseAdapter>(
    body: &InviteMemberRequest,
    user: &UserProfile,
    session: &Session,
    config: &TeamsConfig,
    ctx: &AppContext<DB>,
) -> AppResult<Invitation> {
    let company_id = resolve_company_id(body.company_id.as_deref(), None, session, ctx).await?;

    let member = require_member(ctx, &company_id, &user.id).await?;

    if !has_permission_any(&member.role, &Resource::Invitation, &Action::Create, &config.roles) {
        return Err(AppError::forbidden(
            "You don't have permission to invite members",
        ));
    }

    if let Some(limit) = config.membership_limit {
        let members = ctx.database.count_company_members(&company_id).await?;
        if members >= limit {
            return Err(AppError::bad_request(format!(
                "Membership limit of {} reached",
                limit
            )));
        }
    }

    if let Some(limit) = config.invitation_limit {
        let invitations = ctx.database.list_company_invitations(&company_id).await?;
        let pending_count = invitations.iter().filter(|i| i.is_pending()).count();
        if pending_count >= limit {
            return Err(AppError::bad_request(format!(
                "Pending invitation limit of {} reached",
                limit
            )));
        }
    }

    if let Some(existing_user) = ctx.database.get_profile_by_email(&body.email).await? {
        if ctx
            .database
            .get_membership(&company_id, &existing_user.id)
            .await?
            .is_some()
        {
            return Err(AppError::bad_request("User is already a member"));
        }
    }

    // Return the existing pending invitation if one exists
    if let Some(existing) = ctx
        .database
        .get_pending_invitation(&company_id, &body.email)
        .await?
    {
        return Ok(existing);
    }

    let expires_at =
        chrono::Utc::now() + chrono::Duration::seconds(config.invitation_expires_in as i64);

    let invitation_data = CreateInvitation {
        company_id: company_id.clone(),
        email: body.email.clone(),
        role: body.role.clone(),
        inviter_id: user.id.clone(),
        expires_at,
    };

    let invitation = ctx.database.create_invitation(invitation_data).await?;

    ctx.database
        .record_audit(RecordAudit::new(
            &company_id,
            &user.id,
            "invitation.created",
            &invitation.email,
        ))
        .await?;
    ctx.config.logger.info(&format!(
        "invited {} to company {} as {}",
        invitation.email, company_id, invitation.role
    ));

    Ok(invitation)
}

pub(crate) async fn get_invitation_core<DB: DatabaseAdapter>(
    query: &GetInvitationQuery,
    ctx: &AppContext<DB>,
) -> AppResult<GetInvitationResponse> {
    if query.id.is_empty() {
        return Err(AppError::bad_request("Missing invitation id"));
    }

    let invitation = ctx
        .database
        .get_invitation_by_id(&query.id)
        .await?
        .ok_or_else(|| AppError::not_found("Invitation not found"))?;

    let company = ctx
        .database
        .get_company_by_id(&invitation.company_id)
        .await?
        .ok_or_else(|| AppError::not_found("Company not found"))?;

    let inviter_email = ctx
        .database
        .get_profile_by_id(&invitation.inviter_id)
        .await?
        .map(|p| p.email);

    Ok(GetInvitationResponse {
        invitation,
        company_name: company.name,
        company_slug: company.slug,
        inviter_email,
    })
}

pub(crate) async fn list_invitations_core<DB: DatabaseAdapter>(
    query: &ListInvitationsQuery,
    user: &UserProfile,
    session: &Session,
    ctx: &AppContext<DB>,
) -> AppResult<Vec<Invitation>> {
    let company_id = resolve_company_id(query.company_id.as_deref(), None, session, ctx).await?;

    require_member(ctx, &company_id, &user.id).await?;

    let invitations = ctx.database.list_company_invitations(&company_id).await?;

    Ok(invitations)
}

pub(crate) async fn list_user_invitations_core<DB: DatabaseAdapter>(
    user: &UserProfile,
    ctx: &AppContext<DB>,
) -> AppResult<Vec<Invitation>> {
    let all_invitations = ctx.database.list_invitations_for_email(&user.email).await?;

    let pending: Vec<_> = all_invitations
        .into_iter()
        .filter(|i| i.is_pending() && !i.is_expired())
        .collect();

    Ok(pending)
}

pub(crate) async fn accept_invitation_core<DB: DatabaseAdapter>(
    body: &AcceptInvitationRequest,
    user: &UserProfile,
    session: &Session,
    config: &TeamsConfig,
    ctx: &AppContext<DB>,
) -> AppResult<AcceptInvitationResponse> {
    let invitation = ctx
        .database
        .get_invitation_by_id(&body.invitation_id)
        .await?
        .ok_or_else(|| AppError::not_found("Invitation not found"))?;

    if !invitation.email.eq_ignore_ascii_case(&user.email) {
        return Err(AppError::forbidden("This invitation is not for you"));
    }

    if !invitation.is_pending() {
        return Err(AppError::bad_request(format!(
            "Invitation is {:?}",
            invitation.status
        )));
    }

    if invitation.is_expired() {
        return Err(AppError::bad_request("Invitation has expired"));
    }

    if let Some(limit) = config.membership_limit {
        let members = ctx
            .database
            .count_company_members(&invitation.company_id)
            .await?;
        if members >= limit {
            return Err(AppError::bad_request("Company membership limit reached"));
        }
    }

    if ctx
        .database
        .get_membership(&invitation.company_id, &user.id)
        .await?
        .is_some()
    {
        ctx.database
            .update_invitation_status(&invitation.id, InvitationStatus::Accepted)
            .await?;
        return Err(AppError::bad_request("Already a member of this company"));
    }

    let membership_data = CreateMembership {
        company_id: invitation.company_id.clone(),
        user_id: user.id.clone(),
        role: invitation.role.clone(),
    };

    let membership = ctx.database.create_membership(membership_data).await?;

    let updated_invitation = ctx
        .database
        .update_invitation_status(&invitation.id, InvitationStatus::Accepted)
        .await?;

    ctx.database
        .update_session_active_company(&session.token, Some(&invitation.company_id))
        .await?;

    ctx.database
        .record_audit(RecordAudit::new(
            &invitation.company_id,
            &user.id,
            "invitation.accepted",
            &invitation.id,
        ))
        .await?;

    let member_response = MemberResponse::from_membership_and_user(&membership, user);

    Ok(AcceptInvitationResponse {
        invitation: updated_invitation,
        member: member_response,
    })
}

pub(crate) async fn reject_invitation_core<DB: DatabaseAdapter>(
    body: &RejectInvitationRequest,
    user: &UserProfile,
    ctx: &AppContext<DB>,
) -> AppResult<SuccessResponse> {
    let invitation = ctx
        .database
        .get_invitation_by_id(&body.invitation_id)
        .await?
        .ok_or_else(|| AppError::not_found("Invitation not found"))?;

    if !invitation.email.eq_ignore_ascii_case(&user.email) {
        return Err(AppError::forbidden("This invitation is not for you"));
    }

    if !invitation.is_pending() {
        return Err(AppError::bad_request(format!(
            "Invitation is already {:?}",
            invitation.status
        )));
    }

    ctx.database
        .update_invitation_status(&invitation.id, InvitationStatus::Rejected)
        .await?;

    Ok(SuccessResponse { success: true })
}

pub(crate) async fn cancel_invitation_core<DB: DatabaseAdapter>(
    body: &CancelInvitationRequest,
    user: &UserProfile,
    config: &TeamsConfig,
    ctx: &AppContext<DB>,
) -> AppResult<SuccessResponse> {
    let invitation = ctx
        .database
        .get_invitation_by_id(&body.invitation_id)
        .await?
        .ok_or_else(|| AppError::not_found("Invitation not found"))?;

    let member = require_member(ctx, &invitation.company_id, &user.id).await?;

    if !has_permission_any(&member.role, &Resource::Invitation, &Action::Cancel, &config.roles) {
        return Err(AppError::forbidden(
            "You don't have permission to cancel invitations",
        ));
    }

    if !invitation.is_pending() {
        return Err(AppError::bad_request(format!(
            "Invitation is already {:?}",
            invitation.status
        )));
    }

    ctx.database
        .update_invitation_status(&invitation.id, InvitationStatus::Canceled)
        .await?;

    Ok(SuccessResponse { success: true })
}

// ---------------------------------------------------------------------------
// Request handlers
// ---------------------------------------------------------------------------

/// Handle invite member request
pub async fn handle_invite_member<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
    config: &TeamsConfig,
) -> AppResult<AppResponse> {
    let (user, session) = require_session(req, ctx).await?;
    let body: InviteMemberRequest = match vendhub_core::validate_request_body(req) {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    let invitation = invite_member_core(&body, &user, &session, config, ctx).await?;
    Ok(AppResponse::json(200, &invitation)?)
}

/// Handle get invitation request
pub async fn handle_get_invitation<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
) -> AppResult<AppResponse> {
    let query = parse_query::<GetInvitationQuery>(&req.query);
    let response = get_invitation_core(&query, ctx).await?;
    Ok(AppResponse::json(200, &response)?)
}

/// Handle list invitations request
pub async fn handle_list_invitations<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
) -> AppResult<AppResponse> {
    let (user, session) = require_session(req, ctx).await?;
    let query = parse_query::<ListInvitationsQuery>(&req.query);
    let invitations = list_invitations_core(&query, &user, &session, ctx).await?;
    Ok(AppResponse::json(200, &invitations)?)
}

/// Handle list user invitations request
pub async fn handle_list_user_invitations<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
) -> AppResult<AppResponse> {
    let (user, _session) = require_session(req, ctx).await?;
    let pending = list_user_invitations_core(&user, ctx).await?;
    Ok(AppResponse::json(200, &pending)?)
}

/// Handle accept invitation request
pub async fn handle_accept_invitation<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
    config: &TeamsConfig,
) -> AppResult<AppResponse> {
    let (user, session) = require_session(req, ctx).await?;
    let body: AcceptInvitationRequest = req
        .body_as_json()
        .map_err(|e| AppError::bad_request(format!("Invalid request body: {}", e)))?;
    let response = accept_invitation_core(&body, &user, &session, config, ctx).await?;
    Ok(AppResponse::json(200, &response)?)
}

/// Handle reject invitation request
pub async fn handle_reject_invitation<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
) -> AppResult<AppResponse> {
    let (user, _session) = require_session(req, ctx).await?;
    let body: RejectInvitationRequest = req
        .body_as_json()
        .map_err(|e| AppError::bad_request(format!("Invalid request body: {}", e)))?;
    let response = reject_invitation_core(&body, &user, ctx).await?;
    Ok(AppResponse::json(200, &response)?)
}

/// Handle cancel invitation request
pub async fn handle_cancel_invitation<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
    config: &TeamsConfig,
) -> AppResult<AppResponse> {
    let (user, _session) = require_session(req, ctx).await?;
    let body: CancelInvitationRequest = req
        .body_as_json()
        .map_err(|e| AppError::bad_request(format!("Invalid request body: {}", e)))?;
    let response = cancel_invitation_core(&body, &user, config, ctx).await?;
    Ok(AppResponse::json(200, &response)?)
}
