use std::sync::{Arc, LazyLock};

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use regex::Regex;
use serde_json::json;
use tracing::info;

use crate::{
    database::{
        advance_order_status, find_customer, insert_customer, insert_order, order_status,
        orders_for_customer,
    },
    error::AppError,
    models::{
        CreateOrderPayload, LoginPayload, OrderStatus, RegisterPayload, UpdateStatusPayload,
    },
    state::AppState,
};

// local@domain.tld, no whitespace, exactly one @, a dot in the domain
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("invalid email pattern"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Trimmed, non-empty value of an optional field.
pub fn required(field: Option<&String>) -> Option<String> {
    field
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub async fn health_handler() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(nombre), Some(email), Some(telefono)) = (
        required(payload.nombre.as_ref()),
        required(payload.email.as_ref()),
        required(payload.telefono.as_ref()),
    ) else {
        return Err(AppError::Validation(
            "nombre, email, telefono requeridos".to_string(),
        ));
    };

    if !is_valid_email(&email) {
        return Err(AppError::Validation("email inválido".to_string()));
    }

    let customer = insert_customer(&state.pool, &nombre, &email, &telefono).await?;

    info!("cliente {} registrado", customer.id);

    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(email), Some(telefono)) = (
        required(payload.email.as_ref()),
        required(payload.telefono.as_ref()),
    ) else {
        return Err(AppError::Validation(
            "email y telefono requeridos".to_string(),
        ));
    };

    // One undifferentiated failure for unknown email and wrong phone.
    let customer = find_customer(&state.pool, &email, &telefono)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    Ok(Json(customer))
}

pub async fn create_order_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    let (Some(cliente_id), Some(platillo_nombre)) = (
        payload.cliente_id,
        required(payload.platillo_nombre.as_ref()),
    ) else {
        return Err(AppError::Validation(
            "cliente_id y platillo_nombre requeridos".to_string(),
        ));
    };

    let notas = required(payload.notas.as_ref());

    // No existence check on cliente_id here; an unknown customer trips
    // the foreign key and surfaces as a store error.
    let order = insert_order(&state.pool, cliente_id, &platillo_nombre, notas.as_deref()).await?;

    info!("orden {} creada para cliente {}", order.id, cliente_id);

    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn list_orders_handler(
    State(state): State<Arc<AppState>>,
    Path(cliente_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let orders = orders_for_customer(&state.pool, cliente_id).await?;

    Ok(Json(orders))
}

pub async fn update_status_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let estado: OrderStatus = payload
        .estado
        .as_deref()
        .unwrap_or_default()
        .trim()
        .parse()
        .map_err(|()| AppError::Validation("estado inválido".to_string()))?;

    if let Some(order) = advance_order_status(&state.pool, id, estado).await? {
        info!("orden {} -> {estado}", order.id);
        return Ok(Json(order));
    }

    // The conditional update matched nothing: either the order does not
    // exist or the requested stage would move it backwards.
    match order_status(&state.pool, id).await? {
        Some(_) => Err(AppError::InvalidTransition),
        None => Err(AppError::OrderNotFound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("ana@x.com"));
        assert!(is_valid_email("ana.maria@cocina.example.mx"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("ana"));
        assert!(!is_valid_email("ana@x"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("ana@"));
        assert!(!is_valid_email("ana maria@x.com"));
        assert!(!is_valid_email("ana@x@y.com"));
        assert!(!is_valid_email("ana@x .com"));
    }

    #[test]
    fn required_trims_and_rejects_blank() {
        assert_eq!(
            required(Some(&"  Ana  ".to_string())),
            Some("Ana".to_string())
        );
        assert_eq!(required(Some(&"   ".to_string())), None);
        assert_eq!(required(None), None);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = health_handler().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
