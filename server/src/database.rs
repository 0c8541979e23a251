//! # Postgres
//!
//! Relational store for the two tables, `clientes` and `ordenes`.
//!
//! The store owns the constraints the handlers rely on:
//! - unique `nombre` and `email` on `clientes` (duplicate registration
//!   surfaces as a unique violation, mapped to a conflict),
//! - `ordenes.cliente_id` references `clientes(id)` (an order for an
//!   unknown customer fails at the store, it never silently succeeds),
//! - `estado` is the `estado_orden` enum, so only the three stages are
//!   representable and their declaration order is their comparison order.
//!
//! Each function issues a single parameterized query. The status update
//! folds the monotonic-transition gate into its `WHERE` clause, so a
//! concurrent writer can never move an order backwards.
use sqlx::{PgPool, postgres::PgPoolOptions};

use super::models::{Customer, Order, OrderStatus};

pub async fn init_postgres(database_url: &str) -> PgPool {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .expect("Database unreachable!");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Migrations failed!");

    pool
}

pub async fn insert_customer(
    pool: &PgPool,
    nombre: &str,
    email: &str,
    telefono: &str,
) -> Result<Customer, sqlx::Error> {
    sqlx::query_as::<_, Customer>(
        "INSERT INTO clientes (nombre, email, telefono)
         VALUES ($1, $2, $3)
         RETURNING id, nombre, email, telefono",
    )
    .bind(nombre)
    .bind(email)
    .bind(telefono)
    .fetch_one(pool)
    .await
}

pub async fn find_customer(
    pool: &PgPool,
    email: &str,
    telefono: &str,
) -> Result<Option<Customer>, sqlx::Error> {
    sqlx::query_as::<_, Customer>(
        "SELECT id, nombre, email, telefono
         FROM clientes
         WHERE email = $1 AND telefono = $2",
    )
    .bind(email)
    .bind(telefono)
    .fetch_optional(pool)
    .await
}

pub async fn insert_order(
    pool: &PgPool,
    cliente_id: i64,
    platillo_nombre: &str,
    notas: Option<&str>,
) -> Result<Order, sqlx::Error> {
    sqlx::query_as::<_, Order>(
        "INSERT INTO ordenes (cliente_id, platillo_nombre, notas)
         VALUES ($1, $2, $3)
         RETURNING id, cliente_id, platillo_nombre, notas, estado, creado",
    )
    .bind(cliente_id)
    .bind(platillo_nombre)
    .bind(notas)
    .fetch_one(pool)
    .await
}

pub async fn orders_for_customer(
    pool: &PgPool,
    cliente_id: i64,
) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>(
        "SELECT id, cliente_id, platillo_nombre, notas, estado, creado
         FROM ordenes
         WHERE cliente_id = $1
         ORDER BY creado DESC",
    )
    .bind(cliente_id)
    .fetch_all(pool)
    .await
}

/// Moves the order to `estado` only if that is not a backward step.
/// `estado_orden` compares in declaration order, so `estado <= $1`
/// admits same-stage and forward writes. Returns `None` when the order
/// does not exist or the transition goes backwards; [`order_status`]
/// tells the two apart.
pub async fn advance_order_status(
    pool: &PgPool,
    id: i64,
    estado: OrderStatus,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>(
        "UPDATE ordenes
         SET estado = $1
         WHERE id = $2 AND estado <= $1
         RETURNING id, cliente_id, platillo_nombre, notas, estado, creado",
    )
    .bind(estado)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn order_status(pool: &PgPool, id: i64) -> Result<Option<OrderStatus>, sqlx::Error> {
    sqlx::query_scalar::<_, OrderStatus>("SELECT estado FROM ordenes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}
