//! The three mutually exclusive views and the loop that drives them.
//!
//! The logged-in identity travels inside the [`Session`] handed to each
//! view function; there is no module-level state. Requests are issued
//! one at a time from the prompt loop, so at most one request per form
//! is ever in flight, whatever input path triggered it.
use std::{
    io::{self, BufRead, Write},
    path::Path,
};

use anyhow::Result;

use crate::{
    api::{ApiClient, Order},
    session::Session,
};

const ESTADOS: [&str; 3] = ["pending", "preparing", "delivered"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Register,
    Login,
    Orders,
}

/// Persisted identity jumps straight to the orders view.
pub fn boot_view(session: &Session) -> View {
    if session.me.is_some() {
        View::Orders
    } else {
        View::Register
    }
}

pub fn is_valid_estado(estado: &str) -> bool {
    ESTADOS.contains(&estado)
}

pub fn order_line(order: &Order) -> String {
    let notas = order.notas.as_deref().unwrap_or("");
    format!(
        "#{} {} · {} [{}] {}",
        order.id,
        order.platillo_nombre,
        order.creado.format("%Y-%m-%d %H:%M"),
        order.estado,
        notas
    )
}

pub fn run(api: &ApiClient, session: &mut Session, path: &Path) -> Result<()> {
    let mut view = boot_view(session);

    loop {
        let next = match view {
            View::Register => register_view(api, session)?,
            View::Login => login_view(api, session, path)?,
            View::Orders => orders_view(api, session, path)?,
        };

        match next {
            Some(next) => view = next,
            None => return Ok(()),
        }
    }
}

fn register_view(api: &ApiClient, session: &Session) -> Result<Option<View>> {
    println!("\n=== Registro ===");
    println!("[1] registrarse  [2] ir a login{}  [0] salir", orders_tab(session));

    match prompt("> ")?.as_str() {
        "1" => {
            submit_registration(api)?;
            Ok(Some(View::Register))
        }
        "2" => Ok(Some(View::Login)),
        "3" if session.me.is_some() => Ok(Some(View::Orders)),
        "0" => Ok(None),
        _ => Ok(Some(View::Register)),
    }
}

fn login_view(api: &ApiClient, session: &mut Session, path: &Path) -> Result<Option<View>> {
    println!("\n=== Login ===");
    println!("[1] iniciar sesión  [2] ir a registro{}  [0] salir", orders_tab(session));

    match prompt("> ")?.as_str() {
        "1" => {
            if submit_login(api, session, path)? {
                Ok(Some(View::Orders))
            } else {
                Ok(Some(View::Login))
            }
        }
        "2" => Ok(Some(View::Register)),
        "3" if session.me.is_some() => Ok(Some(View::Orders)),
        "0" => Ok(None),
        _ => Ok(Some(View::Login)),
    }
}

fn orders_view(api: &ApiClient, session: &mut Session, path: &Path) -> Result<Option<View>> {
    let Some(me) = session.me.clone() else {
        // No identity, nothing to show.
        return Ok(Some(View::Login));
    };

    println!("\n=== Pedidos — {} ({}) ===", me.nombre, me.email);
    load_orders(api, me.id);
    println!("[1] nuevo pedido  [2] recargar  [3] cambiar estado  [4] cerrar sesión  [0] salir");

    match prompt("> ")?.as_str() {
        "1" => {
            submit_order(api, me.id)?;
            Ok(Some(View::Orders))
        }
        "2" => Ok(Some(View::Orders)),
        "3" => {
            submit_estado(api)?;
            Ok(Some(View::Orders))
        }
        "4" => {
            session.clear_identity();
            session.save(path)?;
            Ok(Some(View::Login))
        }
        "0" => Ok(None),
        _ => Ok(Some(View::Orders)),
    }
}

fn submit_registration(api: &ApiClient) -> Result<()> {
    let nombre = prompt("Nombre: ")?;
    let email = prompt("Email: ")?;
    let telefono = prompt("Teléfono: ")?;

    if nombre.is_empty() || email.is_empty() || telefono.is_empty() {
        println!("Completa todos los campos");
        return Ok(());
    }

    match api.register(&nombre, &email, &telefono) {
        Ok(_) => println!("Cuenta creada ✔ Ahora inicia sesión."),
        Err(err) => println!("{err}"),
    }

    Ok(())
}

fn submit_login(api: &ApiClient, session: &mut Session, path: &Path) -> Result<bool> {
    let email = prompt("Email: ")?;
    let telefono = prompt("Teléfono: ")?;

    if email.is_empty() || telefono.is_empty() {
        println!("Ingresa email y teléfono");
        return Ok(false);
    }

    match api.login(&email, &telefono) {
        Ok(me) => {
            session.set_identity(me);
            session.save(path)?;
            Ok(true)
        }
        Err(err) => {
            println!("{err}");
            Ok(false)
        }
    }
}

fn submit_order(api: &ApiClient, cliente_id: i64) -> Result<()> {
    let platillo = prompt("Platillo: ")?;
    let notas = prompt("Notas (opcional): ")?;

    if platillo.is_empty() {
        println!("Escribe el nombre del platillo");
        return Ok(());
    }

    let notas = if notas.is_empty() { None } else { Some(notas.as_str()) };

    match api.create_order(cliente_id, &platillo, notas) {
        Ok(_) => println!("Pedido creado"),
        Err(err) => println!("{err}"),
    }

    Ok(())
}

fn submit_estado(api: &ApiClient) -> Result<()> {
    let id = prompt("Id del pedido: ")?;
    let estado = prompt("Estado (pending/preparing/delivered): ")?;

    let Ok(id) = id.parse::<i64>() else {
        println!("Id inválido");
        return Ok(());
    };

    if !is_valid_estado(&estado) {
        println!("estado inválido");
        return Ok(());
    }

    match api.set_estado(id, &estado) {
        Ok(order) => println!("Pedido #{} ahora está {}", order.id, order.estado),
        Err(err) => println!("{err}"),
    }

    Ok(())
}

fn load_orders(api: &ApiClient, cliente_id: i64) {
    match api.list_orders(cliente_id) {
        Ok(orders) if orders.is_empty() => println!("Sin pedidos aún."),
        Ok(orders) => {
            for order in &orders {
                println!("{}", order_line(order));
            }
        }
        Err(err) => println!("{err}"),
    }
}

fn orders_tab(session: &Session) -> &'static str {
    // The orders entry is simply not offered without an identity.
    if session.me.is_some() { "  [3] pedidos" } else { "" }
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{label}");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Customer;
    use chrono::{TimeZone, Utc};

    fn ana() -> Customer {
        Customer {
            id: 7,
            nombre: "Ana".into(),
            email: "ana@x.com".into(),
            telefono: "555-1".into(),
        }
    }

    #[test]
    fn boots_to_register_without_identity() {
        assert_eq!(boot_view(&Session::default()), View::Register);
    }

    #[test]
    fn boots_to_orders_with_identity() {
        let mut session = Session::default();
        session.set_identity(ana());
        assert_eq!(boot_view(&session), View::Orders);
    }

    #[test]
    fn only_the_three_estados_are_valid() {
        for estado in ESTADOS {
            assert!(is_valid_estado(estado));
        }
        assert!(!is_valid_estado("burned"));
        assert!(!is_valid_estado(""));
    }

    #[test]
    fn order_line_tolerates_missing_notas() {
        let order = Order {
            id: 3,
            cliente_id: 7,
            platillo_nombre: "Tacos".into(),
            notas: None,
            estado: "pending".into(),
            creado: Utc.with_ymd_and_hms(2026, 1, 5, 12, 30, 0).unwrap(),
        };

        let line = order_line(&order);
        assert!(line.contains("Tacos"));
        assert!(line.contains("[pending]"));
    }
}
