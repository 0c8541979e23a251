use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;
use thiserror::Error;

/// Customer record as the API returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub nombre: String,
    pub email: String,
    pub telefono: String,
}

/// Order record as the API returns it. `estado` stays a plain string
/// on this side; the server is the authority on the enum.
#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    pub id: i64,
    pub cliente_id: i64,
    pub platillo_nombre: String,
    pub notas: Option<String>,
    pub estado: String,
    pub creado: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never reached the API.
    #[error("No se pudo conectar con la API (verifica la URL base)")]
    Unreachable(#[source] reqwest::Error),

    /// The API answered with a non-success status; the message is the
    /// server's own error text when the body carried one.
    #[error("{0}")]
    Server(String),
}

/// Failure text for a non-success response. Prefers the JSON `{error}`
/// body; a missing or non-JSON body falls back to the bare status.
pub fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|parsed| parsed.error)
        .unwrap_or_else(|_| format!("HTTP {status}"))
}

pub struct ApiClient {
    http: Client,
    base: String,
}

impl ApiClient {
    pub fn new(base: &str) -> Self {
        Self {
            http: Client::new(),
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn register(
        &self,
        nombre: &str,
        email: &str,
        telefono: &str,
    ) -> Result<Customer, ApiError> {
        self.execute(
            self.http
                .post(format!("{}/clientes/registrar", self.base))
                .json(&json!({ "nombre": nombre, "email": email, "telefono": telefono })),
        )
    }

    pub fn login(&self, email: &str, telefono: &str) -> Result<Customer, ApiError> {
        self.execute(
            self.http
                .post(format!("{}/clientes/login", self.base))
                .json(&json!({ "email": email, "telefono": telefono })),
        )
    }

    pub fn create_order(
        &self,
        cliente_id: i64,
        platillo_nombre: &str,
        notas: Option<&str>,
    ) -> Result<Order, ApiError> {
        self.execute(self.http.post(format!("{}/ordenes", self.base)).json(&json!({
            "cliente_id": cliente_id,
            "platillo_nombre": platillo_nombre,
            "notas": notas,
        })))
    }

    pub fn list_orders(&self, cliente_id: i64) -> Result<Vec<Order>, ApiError> {
        self.execute(self.http.get(format!("{}/ordenes/{cliente_id}", self.base)))
    }

    pub fn set_estado(&self, id: i64, estado: &str) -> Result<Order, ApiError> {
        self.execute(
            self.http
                .put(format!("{}/ordenes/{id}/estado", self.base))
                .json(&json!({ "estado": estado })),
        )
    }

    fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().map_err(ApiError::Unreachable)?;

        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .map_err(|e| ApiError::Server(e.to_string()));
        }

        Err(ApiError::Server(failure_text(status.as_u16(), response)))
    }
}

fn failure_text(status: u16, response: Response) -> String {
    let body = response.text().unwrap_or_default();
    error_message(status, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_server_error_text() {
        assert_eq!(
            error_message(409, r#"{"error":"nombre o email ya existe"}"#),
            "nombre o email ya existe"
        );
    }

    #[test]
    fn falls_back_to_status_on_non_json_body() {
        assert_eq!(error_message(502, "<html>bad gateway</html>"), "HTTP 502");
        assert_eq!(error_message(500, ""), "HTTP 500");
    }

    #[test]
    fn base_url_loses_trailing_slashes() {
        let api = ApiClient::new("http://localhost:4000///");
        assert_eq!(api.base(), "http://localhost:4000");
    }
}
