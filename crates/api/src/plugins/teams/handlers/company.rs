use vendhub_core::adapters::DatabaseAdapter;
use vendhub_core::{
    AppContext, AppError, AppRequest, AppResponse, AppResult, Company, CreateCompany,
    CreateMembership, RecordAudit, Session, UpdateCompany, UserProfile,
};

use super::super::config::TeamsConfig;
use super::super::rbac::{has_permission_any, Action, Resource};
use super::super::types::{
    CheckSlugRequest, CheckSlugResponse, CreateCompanyRequest, CreateCompanyResponse,
    DeleteCompanyRequest, FullCompanyResponse, LeaveCompanyRequest, GetFullCompanyQuery,
    MemberResponse, SetActiveCompanyRequest, SuccessResponse, UpdateCompanyRequest,
};
use crate::plugins::helpers::{parse_query, require_member, require_session, resolve_company_id};

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

pub(crate) async fn create_company_core<DB: DatabaseAdapter>(
    body: &CreateCompanyRequest,
    user: &UserProfile,
    config: &TeamsConfig,
    ctx: &AppContext<DB>,
) -> AppResult<CreateCompanyResponse> {
    if !config.allow_user_to_create_company {
        return Err(AppError::forbidden("Company creation is not allowed"));
    }

    if let Some(limit) = config.company_limit {
        let user_companies = ctx.database.list_user_companies(&user.id).await?;
        if user_companies.len() >= limit {
            return Err(AppError::bad_request(format!(
                "Company limit of {} reached",
                limit
            )));
        }
    }

    if ctx
        .database
        .get_company_by_slug(&body.slug)
        .await?
        .is_some()
    {
        return Err(AppError::bad_request("Slug is already taken"));
    }

    let company_data = CreateCompany {
        id: None,
        name: body.name.clone(),
        slug: body.slug.clone(),
        logo: body.logo.clone(),
    };

    let company = ctx.database.create_company(company_data).await?;

    let membership_data = CreateMembership {
        company_id: company.id.clone(),
        user_id: user.id.clone(),
        role: config.creator_role.clone(),
    };

    let membership = ctx.database.create_membership(membership_data).await?;

    ctx.database
        .record_audit(RecordAudit::new(
            &company.id,
            &user.id,
            "company.created",
            &company.slug,
        ))
        .await?;

    let member_response = MemberResponse::from_membership_and_user(&membership, user);

    Ok(CreateCompanyResponse {
        company,
        members: vec![member_response],
    })
}

pub(crate) async fn update_company_core<DB: DatabaseAdapter>(
    body: &UpdateCompanyRequest,
    user: &UserProfile,
    session: &Session,
    config: &TeamsConfig,
    ctx: &AppContext<DB>,
) -> AppResult<Company> {
    let company_id = resolve_company_id(body.company_id.as_deref(), None, session, ctx).await?;

    let member = require_member(ctx, &company_id, &user.id).await?;

    if !has_permission_any(&member.role, &Resource::Company, &Action::Update, &config.roles) {
        return Err(AppError::forbidden(
            "You don't have permission to update this company",
        ));
    }

    if let Some(new_slug) = &body.slug {
        if let Some(existing) = ctx.database.get_company_by_slug(new_slug).await? {
            if existing.id != company_id {
                return Err(AppError::bad_request("Slug is already taken"));
            }
        }
    }

    let update_data = UpdateCompany {
        name: body.name.clone(),
        slug: body.slug.clone(),
        logo: body.logo.clone(),
    };

    let updated = ctx.database.update_company(&company_id, update_data).await?;

    ctx.database
        .record_audit(RecordAudit::new(
            &company_id,
            &user.id,
            "company.updated",
            &updated.slug,
        ))
        .await?;

    Ok(updated)
}

pub(crate) async fn delete_company_core<DB: DatabaseAdapter>(
    body: &DeleteCompanyRequest,
    user: &UserProfile,
    config: &TeamsConfig,
    ctx: &AppContext<DB>,
) -> AppResult<SuccessResponse> {
    if config.disable_company_deletion {
        return Err(AppError::forbidden("Company deletion is disabled"));
    }

    let member = require_member(ctx, &body.company_id, &user.id).await?;

    if !has_permission_any(&member.role, &Resource::Company, &Action::Delete, &config.roles) {
        return Err(AppError::forbidden(
            "You don't have permission to delete this company",
        ));
    }

    ctx.database.delete_company(&body.company_id).await?;

    Ok(SuccessResponse { success: true })
}

pub(crate) async fn list_companies_core<DB: DatabaseAdapter>(
    user: &UserProfile,
    ctx: &AppContext<DB>,
) -> AppResult<Vec<Company>> {
    let companies = ctx.database.list_user_companies(&user.id).await?;
    Ok(companies)
}

pub(crate) async fn get_full_company_core<DB: DatabaseAdapter>(
    query: &GetFullCompanyQuery,
    user: &UserProfile,
    session: &Session,
    ctx: &AppContext<DB>,
) -> AppResult<FullCompanyResponse> {
    let company_id = resolve_company_id(
        query.company_id.as_deref(),
        query.company_slug.as_deref(),
        session,
        ctx,
    )
    .await?;

    require_member(ctx, &company_id, &user.id).await?;

    let company = ctx
        .database
        .get_company_by_id(&company_id)
        .await?
        .ok_or_else(|| AppError::not_found("Company not found"))?;

    let members_raw = ctx.database.list_company_members(&company_id).await?;
    let mut members = Vec::with_capacity(members_raw.len());

    for membership in &members_raw {
        if let Some(user_info) = ctx.database.get_profile_by_id(&membership.user_id).await? {
            members.push(MemberResponse::from_membership_and_user(membership, &user_info));
        }
    }

    let invitations = ctx.database.list_company_invitations(&company_id).await?;

    Ok(FullCompanyResponse {
        company,
        members,
        invitations,
    })
}

pub(crate) async fn check_slug_core<DB: DatabaseAdapter>(
    body: &CheckSlugRequest,
    ctx: &AppContext<DB>,
) -> AppResult<CheckSlugResponse> {
    let exists = ctx
        .database
        .get_company_by_slug(&body.slug)
        .await?
        .is_some();

    Ok(CheckSlugResponse { available: !exists })
}

pub(crate) async fn set_active_company_core<DB: DatabaseAdapter>(
    body: &SetActiveCompanyRequest,
    user: &UserProfile,
    session: &Session,
    ctx: &AppContext<DB>,
) -> AppResult<Session> {
    let company_id = if body.company_id.is_some() || body.company_slug.is_some() {
        Some(
            resolve_company_id(
                body.company_id.as_deref(),
                body.company_slug.as_deref(),
                session,
                ctx,
            )
            .await?,
        )
    } else {
        None
    };

    if let Some(ref cid) = company_id {
        require_member(ctx, cid, &user.id).await?;
    }

    let updated_session = ctx
        .database
        .update_session_active_company(&session.token, company_id.as_deref())
        .await?;

    Ok(updated_session)
}

pub(crate) async fn leave_company_core<DB: DatabaseAdapter>(
    body: &LeaveCompanyRequest,
    user: &UserProfile,
    session: &Session,
    ctx: &AppContext<DB>,
) -> AppResult<SuccessResponse> {
    let member = require_member(ctx, &body.company_id, &user.id).await?;

    if member.role.contains("owner") {
        let all_members = ctx.database.list_company_members(&body.company_id).await?;
        let owner_count = all_members
            .iter()
            .filter(|m| m.role.contains("owner"))
            .count();

        if owner_count <= 1 {
            return Err(AppError::bad_request(
                "Cannot leave the company as the last owner. Delete the company or transfer ownership first.",
            ));
        }
    }

    ctx.database.delete_membership(&member.id).await?;

    ctx.database
        .record_audit(RecordAudit::new(
            &body.company_id,
            &user.id,
            "member.left",
            &user.id,
        ))
        .await?;

    if session.active_company_id.as_deref() == Some(body.company_id.as_str()) {
        ctx.database
            .update_session_active_company(&session.token, None)
            .await?;
    }

    Ok(SuccessResponse { success: true })
}

// ---------------------------------------------------------------------------
// Request handlers
// ---------------------------------------------------------------------------

/// Handle create company request
pub async fn handle_create_company<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
    config: &TeamsConfig,
) -> AppResult<AppResponse> {
    let (user, _session) = require_session(req, ctx).await?;
    let body: CreateCompanyRequest = match vendhub_core::validate_request_body(req) {
        Ok(v) => v,
        Err(resp) => return Ok(resp),
    };
    let response = create_company_core(&body, &user, config, ctx).await?;
    Ok(AppResponse::json(200, &response)?)
}

/// Handle update company request
pub async fn handle_update_company<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
    config: &TeamsConfig,
) -> AppResult<AppResponse> {
    let (user, session) = require_session(req, ctx).await?;
    let body: UpdateCompanyRequest = req
        .body_as_json()
        .map_err(|e| AppError::bad_request(format!("Invalid request body: {}", e)))?;
    let updated = update_company_core(&body, &user, &session, config, ctx).await?;
    Ok(AppResponse::json(200, &updated)?)
}

/// Handle delete company request
pub async fn handle_delete_company<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
    config: &TeamsConfig,
) -> AppResult<AppResponse> {
    let (user, _session) = require_session(req, ctx).await?;
    let body: DeleteCompanyRequest = req
        .body_as_json()
        .map_err(|e| AppError::bad_request(format!("Invalid request body: {}", e)))?;
    let response = delete_company_core(&body, &user, config, ctx).await?;
    Ok(AppResponse::json(200, &response)?)
}

/// Handle list companies request
pub async fn handle_list_companies<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
) -> AppResult<AppResponse> {
    let (user, _session) = require_session(req, ctx).await?;
    let companies = list_companies_core(&user, ctx).await?;
    Ok(AppResponse::json(200, &companies)?)
}

/// Handle get full company request
pub async fn handle_get_full_company<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
) -> AppResult<AppResponse> {
    let (user, session) = require_session(req, ctx).await?;
    let query = parse_query::<GetFullCompanyQuery>(&req.query);
    let response = get_full_company_core(&query, &user, &session, ctx).await?;
    Ok(AppResponse::json(200, &response)?)
}

/// Handle check slug request
pub async fn handle_check_slug<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
) -> AppResult<AppResponse> {
    let _session = require_session(req, ctx).await?;
    let body: CheckSlugRequest = req
        .body_as_json()
        .map_err(|e| AppError::bad_request(format!("Invalid request body: {}", e)))?;
    let response = check_slug_core(&body, ctx).await?;
    Ok(AppResponse::json(200, &response)?)
}

/// Handle set active company request
pub async fn handle_set_active_company<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
) -> AppResult<AppResponse> {
    let (user, session) = require_session(req, ctx).await?;
    let body: SetActiveCompanyRequest = req
        .body_as_json()
        .map_err(|e| AppError::bad_request(format!("Invalid request body: {}", e)))?;
    let updated_session = set_active_company_core(&body, &user, &session, ctx).await?;
    Ok(AppResponse::json(200, &updated_session)?)
}

/// Handle leave company request
pub async fn handle_leave_company<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
) -> AppResult<AppResponse> {
    let (user, session) = require_session(req, ctx).await?;
    let body: LeaveCompanyRequest = req
        .body_as_json()
        .map_err(|e| AppError::bad_request(format!("Invalid request body: {}", e)))?;
    let response = leave_company_core(&body, &user, &session, ctx).await?;
    Ok(AppResponse::json(200, &response)?)
}
