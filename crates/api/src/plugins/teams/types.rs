use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

use vendhub_core::{Company, Invitation, Membership, UserProfile};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCompanyRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "Slug must be 1-100 characters"))]
    pub slug: String,
    pub logo: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCompanyRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub logo: Option<String>,
    pub company_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteCompanyRequest {
    pub company_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckSlugRequest {
    pub slug: String,
}

#[derive(Debug, Deserialize)]
pub struct SetActiveCompanyRequest {
    pub company_id: Option<String>,
    pub company_slug: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LeaveCompanyRequest {
    pub company_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct GetFullCompanyQuery {
    pub company_id: Option<String>,
    pub company_slug: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct InviteMemberRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Role is required"))]
    pub role: String,
    pub company_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveMemberRequest {
    pub member_id: Option<String>,
    pub email: Option<String>,
    pub company_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMemberRoleRequest {
    pub member_id: String,
    pub role: String,
    pub company_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListMembersQuery {
    pub company_id: Option<String>,
    pub company_slug: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct AcceptInvitationRequest {
    pub invitation_id: String,
}

#[derive(Debug, Deserialize)]
pub struct RejectInvitationRequest {
    pub invitation_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CancelInvitationRequest {
    pub invitation_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct GetInvitationQuery {
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListInvitationsQuery {
    pub company_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HasPermissionRequest {
    pub permissions: HashMap<String, Vec<String>>,
    pub company_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckSlugResponse {
    pub available: bool,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct HasPermissionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateCompanyResponse {
    #[serde(flatten)]
    pub company: Company,
    pub members: Vec<MemberResponse>,
}

#[derive(Debug, Serialize)]
pub struct FullCompanyResponse {
    #[serde(flatten)]
    pub company: Company,
    pub members: Vec<MemberResponse>,
    pub invitations: Vec<Invitation>,
}

#[derive(Debug, Serialize)]
pub struct AcceptInvitationResponse {
    pub invitation: Invitation,
    pub member: MemberResponse,
}

#[derive(Debug, Serialize)]
pub struct ListMembersResponse {
    pub members: Vec<MemberResponse>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct GetInvitationResponse {
    #[serde(flatten)]
    pub invitation: Invitation,
    pub company_name: String,
    pub company_slug: String,
    pub inviter_email: Option<String>,
}

/// Summary of a member's user, embedded in member responses.
#[derive(Debug, Clone, Serialize)]
pub struct MemberUserView {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Membership with user details (for API responses).
#[derive(Debug, Clone, Serialize)]
pub struct MemberResponse {
    pub id: String,
    pub company_id: String,
    pub user_id: String,
    pub role: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub user: MemberUserView,
}

impl MemberResponse {
    pub fn from_membership_and_user(membership: &Membership, user: &UserProfile) -> Self {
        Self {
            id: membership.id.clone(),
            company_id: membership.company_id.clone(),
            user_id: membership.user_id.clone(),
            role: membership.role.clone(),
            created_at: membership.created_at,
            user: MemberUserView {
                id: user.id.clone(),
                email: user.email.clone(),
                name: user.name.clone(),
                avatar_url: user.avatar_url.clone(),
            },
        }
    }
}
