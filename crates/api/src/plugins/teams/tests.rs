use std::collections::HashMap;

use vendhub_core::adapters::{InvitationOps, MembershipOps, ProfileOps, SessionOps};
use vendhub_core::{CreateProfile, CreateSession, HttpMethod, InvitationStatus};

use super::config::TeamsConfig;
use super::handlers;
use crate::plugins::test_helpers;

fn post(path: &str, token: &str, body: serde_json::Value) -> vendhub_core::AppRequest {
    test_helpers::create_app_request(
        HttpMethod::Post,
        path,
        Some(token),
        Some(body.to_string().into_bytes()),
        HashMap::new(),
    )
}

async fn session_for(
    ctx: &vendhub_core::AppContext<vendhub_core::MemoryDatabaseAdapter>,
    email: &str,
) -> (vendhub_core::UserProfile, vendhub_core::Session) {
    let user = ctx
        .database
        .create_profile(CreateProfile::new(email))
        .await
        .unwrap();
    let session = ctx
        .database
        .create_session(CreateSession {
            user_id: user.id.clone(),
            expires_at: chrono::Utc::now() + chrono::Duration::hours(24),
            ip_address: None,
            user_agent: None,
            active_company_id: None,
        })
        .await
        .unwrap();
    (user, session)
}

#[tokio::test]
async fn create_company_makes_creator_owner() {
    let (ctx, _gw) = test_helpers::create_test_context();
    let (_user, session) = session_for(&ctx, "founder@example.com").await;

    let body = serde_json::json!({ "name": "Acme Vending", "slug": "acme" });
    let response =
        handlers::handle_create_company(&post("/teams/create", &session.token, body), &ctx, &TeamsConfig::default())
            .await
            .unwrap();
    assert_eq!(response.status, 200);

    let created: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(created["slug"], "acme");
    assert_eq!(created["members"][0]["role"], "owner");
}

#[tokio::test]
async fn duplicate_slug_is_rejected() {
    let (ctx, _gw) = test_helpers::create_test_context();
    let (_user, session) = session_for(&ctx, "founder@example.com").await;

    let body = serde_json::json!({ "name": "Acme", "slug": "acme" });
    handlers::handle_create_company(
        &post("/teams/create", &session.token, body.clone()),
        &ctx,
        &TeamsConfig::default(),
    )
    .await
    .unwrap();

    let response = handlers::handle_create_company(
        &post("/teams/create", &session.token, body),
        &ctx,
        &TeamsConfig::default(),
    )
    .await
    .unwrap_err();
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn member_cannot_update_company() {
    let (ctx, _gw, _user, company, session) = test_helpers::create_company_context("member").await;

    let body = serde_json::json!({ "name": "Renamed", "company_id": company.id });
    let err = handlers::handle_update_company(
        &post("/teams/update", &session.token, body),
        &ctx,
        &TeamsConfig::default(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), 403);
}

#[tokio::test]
async fn last_owner_cannot_leave() {
    let (ctx, _gw, _user, company, session) = test_helpers::create_company_context("owner").await;

    let body = serde_json::json!({ "company_id": company.id });
    let err = handlers::handle_leave_company(&post("/teams/leave", &session.token, body), &ctx)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn invitation_full_lifecycle() {
    let (ctx, _gw, _owner, company, owner_session) =
        test_helpers::create_company_context("owner").await;

    // Invite
    let body = serde_json::json!({
        "email": "newhire@example.com",
        "role": "member",
        "company_id": company.id,
    });
    let response = handlers::handle_invite_member(
        &post("/teams/invite-member", &owner_session.token, body),
        &ctx,
        &TeamsConfig::default(),
    )
    .await
    .unwrap();
    assert_eq!(response.status, 200);
    let invitation: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(invitation["status"], "pending");
    let invitation_id = invitation["id"].as_str().unwrap().to_string();

    // The invitee sees it among their pending invitations
    let (invitee, invitee_session) = session_for(&ctx, "newhire@example.com").await;
    let req = test_helpers::create_app_request(
        HttpMethod::Get,
        "/teams/list-user-invitations",
        Some(&invitee_session.token),
        None,
        HashMap::new(),
    );
    let response = handlers::handle_list_user_invitations(&req, &ctx).await.unwrap();
    let pending: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(pending.as_array().unwrap().len(), 1);

    // Accept
    let body = serde_json::json!({ "invitation_id": invitation_id });
    let response = handlers::handle_accept_invitation(
        &post("/teams/accept-invitation", &invitee_session.token, body),
        &ctx,
        &TeamsConfig::default(),
    )
    .await
    .unwrap();
    assert_eq!(response.status, 200);

    let accepted: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(accepted["invitation"]["status"], "accepted");
    assert_eq!(accepted["member"]["role"], "member");

    // Membership exists, session switched to the company
    let membership = ctx
        .database
        .get_membership(&company.id, &invitee.id)
        .await
        .unwrap();
    assert!(membership.is_some());
    let refreshed = ctx
        .database
        .get_session(&invitee_session.token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(refreshed.active_company_id.as_deref(), Some(company.id.as_str()));
}

#[tokio::test]
async fn accepting_someone_elses_invitation_is_forbidden() {
    let (ctx, _gw, _owner, company, owner_session) =
        test_helpers::create_company_context("owner").await;

    let body = serde_json::json!({
        "email": "intended@example.com",
        "role": "member",
        "company_id": company.id,
    });
    let response = handlers::handle_invite_member(
        &post("/teams/invite-member", &owner_session.token, body),
        &ctx,
        &TeamsConfig::default(),
    )
    .await
    .unwrap();
    let invitation: serde_json::Value = serde_json::from_slice(&response.body).unwrap();

    let (_imposter, imposter_session) = session_for(&ctx, "imposter@example.com").await;
    let body = serde_json::json!({ "invitation_id": invitation["id"] });
    let err = handlers::handle_accept_invitation(
        &post("/teams/accept-invitation", &imposter_session.token, body),
        &ctx,
        &TeamsConfig::default(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), 403);
}

#[tokio::test]
async fn inviting_twice_returns_the_pending_invitation() {
    let (ctx, _gw, _owner, company, owner_session) =
        test_helpers::create_company_context("owner").await;

    let body = serde_json::json!({
        "email": "newhire@example.com",
        "role": "member",
        "company_id": company.id,
    });
    let first = handlers::handle_invite_member(
        &post("/teams/invite-member", &owner_session.token, body.clone()),
        &ctx,
        &TeamsConfig::default(),
    )
    .await
    .unwrap();
    let second = handlers::handle_invite_member(
        &post("/teams/invite-member", &owner_session.token, body),
        &ctx,
        &TeamsConfig::default(),
    )
    .await
    .unwrap();

    let a: serde_json::Value = serde_json::from_slice(&first.body).unwrap();
    let b: serde_json::Value = serde_json::from_slice(&second.body).unwrap();
    assert_eq!(a["id"], b["id"]);
}

#[tokio::test]
async fn cancel_invitation_requires_permission() {
    let (ctx, _gw, _owner, company, owner_session) =
        test_helpers::create_company_context("owner").await;

    let body = serde_json::json!({
        "email": "newhire@example.com",
        "role": "member",
        "company_id": company.id,
    });
    let response = handlers::handle_invite_member(
        &post("/teams/invite-member", &owner_session.token, body),
        &ctx,
        &TeamsConfig::default(),
    )
    .await
    .unwrap();
    let invitation: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    let invitation_id = invitation["id"].as_str().unwrap().to_string();

    // A plain member cannot cancel
    let (member_user, member_session) = session_for(&ctx, "plain@example.com").await;
    ctx.database
        .create_membership(vendhub_core::CreateMembership {
            company_id: company.id.clone(),
            user_id: member_user.id.clone(),
            role: "member".to_string(),
        })
        .await
        .unwrap();

    let body = serde_json::json!({ "invitation_id": invitation_id });
    let err = handlers::handle_cancel_invitation(
        &post("/teams/cancel-invitation", &member_session.token, body.clone()),
        &ctx,
        &TeamsConfig::default(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), 403);

    // The owner can
    let response = handlers::handle_cancel_invitation(
        &post("/teams/cancel-invitation", &owner_session.token, body),
        &ctx,
        &TeamsConfig::default(),
    )
    .await
    .unwrap();
    assert_eq!(response.status, 200);

    let stored = ctx
        .database
        .get_invitation_by_id(&invitation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, InvitationStatus::Canceled);
}

#[tokio::test]
async fn remove_member_and_last_owner_guard() {
    let (ctx, _gw, owner, company, owner_session) =
        test_helpers::create_company_context("owner").await;

    let (member_user, _member_session) = session_for(&ctx, "plain@example.com").await;
    let membership = ctx
        .database
        .create_membership(vendhub_core::CreateMembership {
            company_id: company.id.clone(),
            user_id: member_user.id.clone(),
            role: "member".to_string(),
        })
        .await
        .unwrap();

    // Owner removes the member
    let body = serde_json::json!({ "member_id": membership.id, "company_id": company.id });
    let response = handlers::handle_remove_member(
        &post("/teams/remove-member", &owner_session.token, body),
        &ctx,
        &TeamsConfig::default(),
    )
    .await
    .unwrap();
    assert_eq!(response.status, 200);

    // Removing the last owner is refused
    let owner_membership = ctx
        .database
        .get_membership(&company.id, &owner.id)
        .await
        .unwrap()
        .unwrap();
    let body = serde_json::json!({ "member_id": owner_membership.id, "company_id": company.id });
    let err = handlers::handle_remove_member(
        &post("/teams/remove-member", &owner_session.token, body),
        &ctx,
        &TeamsConfig::default(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[tokio::test]
async fn has_permission_reflects_role_matrix() {
    let (ctx, _gw, _user, company, session) = test_helpers::create_company_context("admin").await;

    let body = serde_json::json!({
        "company_id": company.id,
        "permissions": { "company": ["update"] },
    });
    let response = handlers::handle_has_permission(
        &post("/teams/has-permission", &session.token, body),
        &ctx,
        &TeamsConfig::default(),
    )
    .await
    .unwrap();
    let result: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(result["success"], true);

    let body = serde_json::json!({
        "company_id": company.id,
        "permissions": { "company": ["delete"] },
    });
    let response = handlers::handle_has_permission(
        &post("/teams/has-permission", &session.token, body),
        &ctx,
        &TeamsConfig::default(),
    )
    .await
    .unwrap();
    let result: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
    assert_eq!(result["success"], false);
}
