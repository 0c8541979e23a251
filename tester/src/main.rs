//! End-to-end driver for a live ordenes API.
//!
//! Walks the register → login → order → list → advance sequence plus
//! the negative paths (duplicates, bad credentials, invalid estado,
//! unknown order, backward transition) and exits nonzero on the first
//! mismatch. Registrations use a unique suffix so reruns stay clean.
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, bail, ensure};
use clap::Parser;
use reqwest::blocking::{Client, Response};
use serde_json::{Value, json};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Base URL of a running ordenes API.
    #[arg(default_value = "http://localhost:4000")]
    base_url: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let base = args.base_url.trim_end_matches('/').to_string();
    let http = Client::new();

    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    let nombre = format!("Ana-{suffix}");
    let email = format!("ana-{suffix}@x.com");
    let telefono = "555-1";

    println!("Probing {base}/health");
    let health = get_json(http.get(format!("{base}/health")).send()?, 200)?;
    ensure!(health["ok"] == json!(true), "health body: {health}");

    println!("Registering {nombre}");
    let me = post_json(
        &http,
        &format!("{base}/clientes/registrar"),
        &json!({ "nombre": nombre, "email": email, "telefono": telefono }),
        201,
    )?;
    let cliente_id = me["id"].as_i64().context("registration returned no id")?;

    println!("Duplicate registration must conflict");
    post_json(
        &http,
        &format!("{base}/clientes/registrar"),
        &json!({ "nombre": nombre, "email": email, "telefono": telefono }),
        409,
    )?;

    println!("Malformed email must be rejected");
    post_json(
        &http,
        &format!("{base}/clientes/registrar"),
        &json!({ "nombre": format!("{nombre}-b"), "email": "sin-arroba", "telefono": telefono }),
        400,
    )?;

    println!("Login with the shared secret");
    let login = post_json(
        &http,
        &format!("{base}/clientes/login"),
        &json!({ "email": email, "telefono": telefono }),
        200,
    )?;
    ensure!(
        login["id"].as_i64() == Some(cliente_id),
        "login returned a different id"
    );

    println!("Wrong phone and unknown email must be indistinguishable");
    let wrong_phone = post_json(
        &http,
        &format!("{base}/clientes/login"),
        &json!({ "email": email, "telefono": "000-0" }),
        401,
    )?;
    let unknown_email = post_json(
        &http,
        &format!("{base}/clientes/login"),
        &json!({ "email": format!("nadie-{suffix}@x.com"), "telefono": telefono }),
        401,
    )?;
    ensure!(
        wrong_phone["error"] == unknown_email["error"],
        "credential errors leak which field was wrong"
    );

    println!("Fresh customer lists no orders");
    let empty = get_json(http.get(format!("{base}/ordenes/{cliente_id}")).send()?, 200)?;
    ensure!(
        empty.as_array().is_some_and(Vec::is_empty),
        "expected an empty array, got {empty}"
    );

    println!("Placing an order");
    let order = post_json(
        &http,
        &format!("{base}/ordenes"),
        &json!({ "cliente_id": cliente_id, "platillo_nombre": "Tacos", "notas": "sin cebolla" }),
        201,
    )?;
    let order_id = order["id"].as_i64().context("order returned no id")?;
    ensure!(order["estado"] == json!("pending"), "new order not pending");

    println!("Listing shows the order first");
    let listed = get_json(http.get(format!("{base}/ordenes/{cliente_id}")).send()?, 200)?;
    let first = listed
        .as_array()
        .and_then(|orders| orders.first())
        .context("listing came back empty")?;
    ensure!(first["id"].as_i64() == Some(order_id), "order not first");

    println!("Advancing to preparing");
    let updated = put_json(
        &http,
        &format!("{base}/ordenes/{order_id}/estado"),
        &json!({ "estado": "preparing" }),
        200,
    )?;
    ensure!(updated["estado"] == json!("preparing"), "estado not updated");

    let listed = get_json(http.get(format!("{base}/ordenes/{cliente_id}")).send()?, 200)?;
    ensure!(
        listed[0]["estado"] == json!("preparing"),
        "listing does not reflect the new estado"
    );

    println!("Invalid estado must be rejected without touching the order");
    put_json(
        &http,
        &format!("{base}/ordenes/{order_id}/estado"),
        &json!({ "estado": "burned" }),
        400,
    )?;
    let listed = get_json(http.get(format!("{base}/ordenes/{cliente_id}")).send()?, 200)?;
    ensure!(listed[0]["estado"] == json!("preparing"), "order mutated");

    println!("Unknown order id must 404");
    put_json(
        &http,
        &format!("{base}/ordenes/999999999/estado"),
        &json!({ "estado": "preparing" }),
        404,
    )?;

    println!("Backward transition must conflict");
    put_json(
        &http,
        &format!("{base}/ordenes/{order_id}/estado"),
        &json!({ "estado": "delivered" }),
        200,
    )?;
    put_json(
        &http,
        &format!("{base}/ordenes/{order_id}/estado"),
        &json!({ "estado": "pending" }),
        409,
    )?;
    let listed = get_json(http.get(format!("{base}/ordenes/{cliente_id}")).send()?, 200)?;
    ensure!(listed[0]["estado"] == json!("delivered"), "order moved backwards");

    println!("Another customer must not see these orders");
    let other = post_json(
        &http,
        &format!("{base}/clientes/registrar"),
        &json!({
            "nombre": format!("Beto-{suffix}"),
            "email": format!("beto-{suffix}@x.com"),
            "telefono": "555-2",
        }),
        201,
    )?;
    let other_id = other["id"].as_i64().context("registration returned no id")?;
    let other_orders = get_json(http.get(format!("{base}/ordenes/{other_id}")).send()?, 200)?;
    ensure!(
        other_orders.as_array().is_some_and(Vec::is_empty),
        "orders leaked across customers"
    );

    println!("All checks passed");
    Ok(())
}

fn post_json(http: &Client, url: &str, body: &Value, expected: u16) -> Result<Value> {
    get_json(http.post(url).json(body).send()?, expected)
}

fn put_json(http: &Client, url: &str, body: &Value, expected: u16) -> Result<Value> {
    get_json(http.put(url).json(body).send()?, expected)
}

fn get_json(response: Response, expected: u16) -> Result<Value> {
    let status = response.status().as_u16();
    let url = response.url().to_string();
    let body = response.text().unwrap_or_default();

    if status != expected {
        bail!("{url}: expected {expected}, got {status} ({body})");
    }

    serde_json::from_str(&body).with_context(|| format!("{url}: non-JSON body ({body})"))
}
