use actix_web::{http::Method, web, HttpRequest, HttpResponse};
use log::error;
use serde::Deserialize;
use serde_json::json;

use crate::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProxyParams {
    #[serde(default)]
    pub path: String,
}

/// Relays a request to the upstream quiz service at the path given in the
/// `path` query parameter. Preflight requests short-circuit with an empty
/// 200. Any relay failure collapses to a uniform 500 so upstream details
/// never leak to the browser.
pub async fn proxy_relay(
    state: web::Data<AppState>,
    request: HttpRequest,
    params: web::Query<ProxyParams>,
    body: web::Bytes,
) -> HttpResponse {
    if request.method() == Method::OPTIONS {
        return HttpResponse::Ok().finish();
    }

    let Some(method) = relay_method(request.method()) else {
        return HttpResponse::MethodNotAllowed().finish();
    };

    match relay(&state, method, &params.path, body).await {
        Ok(response) => response,
        Err(err) => {
            error!("proxy relay to {} failed: {}", params.path, err);
            internal_error()
        }
    }
}

/// Relayable methods. OPTIONS never reaches this point; anything outside
/// the set is refused rather than coerced.
fn relay_method(method: &Method) -> Option<reqwest::Method> {
    match method.as_str() {
        "GET" => Some(reqwest::Method::GET),
        "POST" => Some(reqwest::Method::POST),
        "PUT" => Some(reqwest::Method::PUT),
        "DELETE" => Some(reqwest::Method::DELETE),
        _ => None,
    }
}

async fn relay(
    state: &AppState,
    method: reqwest::Method,
    path: &str,
    body: web::Bytes,
) -> Result<HttpResponse, reqwest::Error> {
    let url = format!("{}{}", state.config.upstream_base_url, path);

    let mut upstream = state
        .proxy_client
        .request(method.clone(), &url)
        .header("Content-Type", "application/json");
    if method != reqwest::Method::GET {
        upstream = upstream.body(body.to_vec());
    }

    let response = upstream.send().await?;
    let status = response.status().as_u16();
    let payload: serde_json::Value = response.json().await?;

    Ok(HttpResponse::build(
        actix_web::http::StatusCode::from_u16(status)
            .unwrap_or(actix_web::http::StatusCode::BAD_GATEWAY),
    )
    .json(payload))
}

fn internal_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(json!({ "error": "Internal server error" }))
}
