//! Phase-1 setup script: seeds a demo company with an owner, a draft
//! invoice, and an active Starter subscription, then prints a session
//! token for poking at the API.

use tracing_subscriber::EnvFilter;

use vendhub::adapters::{
    CompanyOps, InvoiceOps, MembershipOps, ProfileOps, SubscriptionOps,
};
use vendhub::{
    AppBuilder, AppConfig, CreateCompany, CreateInvoice, CreateMembership, CreateProfile,
    CreateSubscription, InvoiceItem, MemoryDatabaseAdapter, PaymentsGateway, PlanId,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(err) = run().await {
        tracing::error!("seed failed: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> vendhub::AppResult<()> {
    let secret = std::env::var("VENDHUB_SECRET")
        .unwrap_or_else(|_| "development-secret-change-me-32-chars!".to_string());

    let app = AppBuilder::new(AppConfig::new(secret))
        .database(MemoryDatabaseAdapter::new())
        .build()
        .await?;

    let db = app.database();

    let owner = db
        .create_profile(CreateProfile::new("owner@demo.vendhub.local").with_name("Demo Owner"))
        .await?;
    tracing::info!("created owner profile {}", owner.id);

    let company = db
        .create_company(CreateCompany {
            id: None,
            name: "Demo Vending Partners".to_string(),
            slug: "demo-vending".to_string(),
            logo: None,
        })
        .await?;
    tracing::info!("created company {} ({})", company.name, company.id);

    db.create_membership(CreateMembership {
        company_id: company.id.clone(),
        user_id: owner.id.clone(),
        role: "owner".to_string(),
    })
    .await?;

    let invoice = db
        .create_invoice(CreateInvoice {
            id: None,
            company_id: company.id.clone(),
            customer_email: "customer@demo.vendhub.local".to_string(),
            currency: "USD".to_string(),
            due_date: chrono::Utc::now().date_naive() + chrono::Duration::days(30),
            items: vec![
                InvoiceItem {
                    description: "Vending machine restock".to_string(),
                    quantity: 2,
                    unit_price_minor: 500,
                },
                InvoiceItem {
                    description: "Site service visit".to_string(),
                    quantity: 1,
                    unit_price_minor: 300,
                },
            ],
        })
        .await?;
    tracing::info!(
        "created draft invoice {} totaling {} minor units",
        invoice.id,
        invoice.total_minor()
    );

    let gateway_sub = app
        .context()
        .gateway
        .create_subscription(&owner.email, PlanId::Starter)
        .await?;
    let subscription = db
        .create_subscription(CreateSubscription {
            company_id: company.id.clone(),
            plan_id: gateway_sub.plan_id,
            gateway_customer_id: gateway_sub.customer_id,
            gateway_subscription_id: gateway_sub.subscription_id,
            current_period_end: gateway_sub.current_period_end,
        })
        .await?;
    tracing::info!(
        "created {} subscription {}",
        subscription.plan_id.as_str(),
        subscription.id
    );

    let session = app.session_manager().create_session(&owner, None, None).await?;
    println!("owner session token: {}", session.token);

    Ok(())
}
