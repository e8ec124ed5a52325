use async_trait::async_trait;
use serde::Deserialize;
use vendhub_core::adapters::DatabaseAdapter;
use vendhub_core::{AppContext, AppPlugin, AppRequest, AppResponse, AppResult, HttpMethod, Route};

use crate::plugins::helpers::{parse_query, require_member, require_session, resolve_company_id};

#[derive(Debug, Default, Deserialize)]
struct ListAuditQuery {
    company_id: Option<String>,
    limit: Option<usize>,
}

/// Audit-trail feature area. Entries are written by the other plugins'
/// handlers; this one only reads them back, newest first.
pub struct AuditPlugin;

impl AuditPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AuditPlugin {
    fn default() -> Self {
        Self::new()
    }
}

async fn handle_list_audit<DB: DatabaseAdapter>(
    req: &AppRequest,
    ctx: &AppContext<DB>,
) -> AppResult<AppResponse> {
    let (user, session) = require_session(req, ctx).await?;
    let query = parse_query::<ListAuditQuery>(&req.query);

    let company_id = resolve_company_id(query.company_id.as_deref(), None, &session, ctx).await?;
    require_member(ctx, &company_id, &user.id).await?;

    let mut entries = ctx.database.list_company_audit(&company_id).await?;
    if let Some(limit) = query.limit {
        entries.truncate(limit);
    }

    Ok(AppResponse::json(200, &entries)?)
}

#[async_trait]
impl<DB: DatabaseAdapter> AppPlugin<DB> for AuditPlugin {
    fn name(&self) -> &'static str {
        "audit"
    }

    fn routes(&self) -> Vec<Route> {
        vec![Route::get("/audit/list", "list_audit")]
    }

    async fn on_request(
        &self,
        req: &AppRequest,
        ctx: &AppContext<DB>,
    ) -> AppResult<Option<AppResponse>> {
        match (req.method(), req.path()) {
            (HttpMethod::Get, "/audit/list") => Ok(Some(handle_list_audit(req, ctx).await?)),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use vendhub_core::adapters::AuditOps;
    use vendhub_core::{HttpMethod, RecordAudit};

    use super::handle_list_audit;
    use crate::plugins::test_helpers;

    #[tokio::test]
    async fn lists_company_entries_newest_first() {
        let (ctx, _gw, user, company, session) =
            test_helpers::create_company_context("owner").await;

        for action in ["invoice.created", "invoice.sent"] {
            ctx.database
                .record_audit(RecordAudit::new(&company.id, &user.id, action, "inv-1"))
                .await
                .unwrap();
        }
        ctx.database
            .record_audit(RecordAudit::new("other-co", &user.id, "noise", "x"))
            .await
            .unwrap();

        let mut query = HashMap::new();
        query.insert("company_id".to_string(), company.id.clone());
        let req = test_helpers::create_app_request(
            HttpMethod::Get,
            "/audit/list",
            Some(&session.token),
            None,
            query,
        );

        let response = handle_list_audit(&req, &ctx).await.unwrap();
        assert_eq!(response.status, 200);

        let entries: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        let entries = entries.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["action"], "invoice.sent");
        assert_eq!(entries[1]["action"], "invoice.created");
    }

    #[tokio::test]
    async fn outsiders_cannot_read_the_trail() {
        let (ctx, _gw, _user, company, _session) =
            test_helpers::create_company_context("owner").await;

        let mut query = HashMap::new();
        query.insert("company_id".to_string(), company.id.clone());
        let req = test_helpers::create_app_request(
            HttpMethod::Get,
            "/audit/list",
            None,
            None,
            query,
        );

        let err = handle_list_audit(&req, &ctx).await.unwrap_err();
        assert_eq!(err.status_code(), 401);
    }
}
