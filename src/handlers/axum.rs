use axum::{
    extract::{Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::VendHub;
use vendhub_core::{AppError, AppRequest, AppResponse, DatabaseAdapter, HttpMethod};

/// Integration trait for the Axum web framework
pub trait AxumIntegration<DB: DatabaseAdapter> {
    /// Create an Axum router with all platform routes
    fn axum_router(self) -> Router<Arc<VendHub<DB>>>;
}

impl<DB: DatabaseAdapter> AxumIntegration<DB> for Arc<VendHub<DB>> {
    fn axum_router(self) -> Router<Arc<VendHub<DB>>> {
        let mut router = Router::new();

        // Core endpoints
        router = router.route("/ok", get(create_platform_handler::<DB>()));
        router = router.route("/health", get(health_check));
        router = router.route("/me", get(create_platform_handler::<DB>()));
        router = router.route("/me/update", post(create_platform_handler::<DB>()));

        // Register plugin routes
        for plugin in self.plugins() {
            for route in plugin.routes() {
                let handler_fn = create_platform_handler::<DB>();
                match route.method {
                    HttpMethod::Get => {
                        router = router.route(&route.path, get(handler_fn.clone()));
                    }
                    HttpMethod::Post => {
                        router = router.route(&route.path, post(handler_fn.clone()));
                    }
                    HttpMethod::Put => {
                        router = router.route(&route.path, axum::routing::put(handler_fn.clone()));
                    }
                    HttpMethod::Delete => {
                        router =
                            router.route(&route.path, axum::routing::delete(handler_fn.clone()));
                    }
                    HttpMethod::Patch => {
                        router =
                            router.route(&route.path, axum::routing::patch(handler_fn.clone()));
                    }
                    _ => {} // Skip unsupported methods
                }
            }
        }

        router.with_state(self)
    }
}

async fn health_check() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
        "service": "vendhub"
    }))
}

fn create_platform_handler<DB: DatabaseAdapter>() -> impl Fn(
    State<Arc<VendHub<DB>>>,
    Request,
) -> std::pin::Pin<
    Box<dyn std::future::Future<Output = Response> + Send>,
> + Clone {
    |State(app): State<Arc<VendHub<DB>>>, req: Request| {
        Box::pin(async move {
            match convert_axum_request(req).await {
                Ok(app_req) => match app.handle_request(app_req).await {
                    Ok(app_response) => convert_app_response(app_response),
                    Err(err) => convert_app_error(err),
                },
                Err(err) => convert_app_error(err),
            }
        })
    }
}

async fn convert_axum_request(req: Request) -> Result<AppRequest, AppError> {
    use std::collections::HashMap;

    let (parts, body) = req.into_parts();

    let method = match parts.method {
        axum::http::Method::GET => HttpMethod::Get,
        axum::http::Method::POST => HttpMethod::Post,
        axum::http::Method::PUT => HttpMethod::Put,
        axum::http::Method::DELETE => HttpMethod::Delete,
        axum::http::Method::PATCH => HttpMethod::Patch,
        axum::http::Method::OPTIONS => HttpMethod::Options,
        axum::http::Method::HEAD => HttpMethod::Head,
        _ => {
            return Err(AppError::bad_request("Unsupported HTTP method"));
        }
    };

    let mut headers = HashMap::new();
    for (name, value) in parts.headers.iter() {
        if let Ok(value_str) = value.to_str() {
            headers.insert(name.to_string(), value_str.to_string());
        }
    }

    let path = parts.uri.path().to_string();

    let mut query = HashMap::new();
    if let Some(query_str) = parts.uri.query() {
        for (key, value) in url::form_urlencoded::parse(query_str.as_bytes()) {
            query.insert(key.to_string(), value.to_string());
        }
    }

    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => {
            if bytes.is_empty() {
                None
            } else {
                Some(bytes.to_vec())
            }
        }
        Err(_) => None,
    };

    Ok(AppRequest {
        method,
        path,
        headers,
        body: body_bytes,
        query,
    })
}

fn convert_app_response(app_response: AppResponse) -> Response {
    let mut response = Response::builder().status(
        StatusCode::from_u16(app_response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
    );

    for (name, value) in app_response.headers {
        if let (Ok(header_name), Ok(header_value)) = (
            axum::http::HeaderName::from_bytes(name.as_bytes()),
            axum::http::HeaderValue::from_str(&value),
        ) {
            response = response.header(header_name, header_value);
        }
    }

    response
        .body(axum::body::Body::from(app_response.body))
        .unwrap_or_else(|_| {
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(axum::body::Body::from("Internal server error"))
                .unwrap()
        })
}

fn convert_app_error(err: AppError) -> Response {
    let status_code =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let message = match err.status_code() {
        500 => "Internal server error".to_string(),
        _ => err.to_string(),
    };

    let body = serde_json::json!({
        "error": message
    });

    (status_code, axum::Json(body)).into_response()
}
