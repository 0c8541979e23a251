use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Registered customer. Immutable after creation; `nombre` and `email`
/// are unique in the store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Customer {
    pub id: i64,
    pub nombre: String,
    pub email: String,
    pub telefono: String,
}

/// Fulfillment stage of an order. The declaration order matches the
/// `estado_orden` Postgres enum, so both Rust and the store agree that
/// `pending < preparing < delivered`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "estado_orden", rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Delivered,
}

impl FromStr for OrderStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "preparing" => Ok(Self::Preparing),
            "delivered" => Ok(Self::Delivered),
            _ => Err(()),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Preparing => "preparing",
            Self::Delivered => "delivered",
        };
        f.write_str(name)
    }
}

/// A single dish request tied to one customer. `estado` is the only
/// mutable field; `creado` is assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: i64,
    pub cliente_id: i64,
    pub platillo_nombre: String,
    pub notas: Option<String>,
    pub estado: OrderStatus,
    pub creado: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub telefono: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub telefono: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderPayload {
    #[serde(default)]
    pub cliente_id: Option<i64>,
    #[serde(default)]
    pub platillo_nombre: Option<String>,
    #[serde(default)]
    pub notas: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusPayload {
    #[serde(default)]
    pub estado: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estado_parses_the_three_stages() {
        assert_eq!("pending".parse(), Ok(OrderStatus::Pending));
        assert_eq!("preparing".parse(), Ok(OrderStatus::Preparing));
        assert_eq!("delivered".parse(), Ok(OrderStatus::Delivered));
    }

    #[test]
    fn estado_rejects_anything_else() {
        assert!("burned".parse::<OrderStatus>().is_err());
        assert!("".parse::<OrderStatus>().is_err());
        assert!("Pending".parse::<OrderStatus>().is_err());
        assert!(" pending".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn estado_orders_forward() {
        assert!(OrderStatus::Pending < OrderStatus::Preparing);
        assert!(OrderStatus::Preparing < OrderStatus::Delivered);
    }

    #[test]
    fn estado_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Preparing).unwrap(),
            "\"preparing\""
        );
    }

    #[test]
    fn customer_uses_wire_field_names() {
        let customer = Customer {
            id: 1,
            nombre: "Ana".into(),
            email: "ana@x.com".into(),
            telefono: "555-1".into(),
        };
        let value = serde_json::to_value(&customer).unwrap();
        assert_eq!(value["nombre"], "Ana");
        assert_eq!(value["telefono"], "555-1");
    }

    #[test]
    fn missing_payload_fields_deserialize_as_none() {
        let payload: RegisterPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.nombre.is_none());
        assert!(payload.email.is_none());
        assert!(payload.telefono.is_none());
    }
}
