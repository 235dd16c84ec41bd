// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Customer records keyed by phone number.

use leadline_core::LeadlineError;
use leadline_core::types::{Customer, CustomerPatch, ParsedAddress};
use rusqlite::{OptionalExtension, params};

use super::{NOW, new_id};
use crate::database::Database;

const COLUMNS: &str =
    "id, phone_number, name, email, address, city, state, zip_code, created_at, updated_at";

fn row_to_customer(row: &rusqlite::Row<'_>) -> rusqlite::Result<Customer> {
    Ok(Customer {
        id: row.get(0)?,
        phone_number: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        address: row.get(4)?,
        city: row.get(5)?,
        state: row.get(6)?,
        zip_code: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn select_by_id(conn: &rusqlite::Connection, id: &str) -> rusqlite::Result<Option<Customer>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM customers WHERE id = ?1"),
        params![id],
        row_to_customer,
    )
    .optional()
}

/// Find the customer with `phone_number`, inserting a bare record if absent.
///
/// The insert and the read run in one connection call, and the phone number
/// carries a UNIQUE constraint, so concurrent callers converge on one row.
pub async fn upsert_customer(db: &Database, phone_number: &str) -> Result<Customer, LeadlineError> {
    let phone = phone_number.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO customers (id, phone_number) VALUES (?1, ?2)
                 ON CONFLICT(phone_number) DO NOTHING",
                params![new_id(), phone],
            )?;
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM customers WHERE phone_number = ?1"),
                params![phone],
                row_to_customer,
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_customer(db: &Database, id: &str) -> Result<Option<Customer>, LeadlineError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| select_by_id(conn, &id))
        .await
        .map_err(crate::database::map_tr_err)
}

/// All customers, most recently updated first.
pub async fn list_customers(db: &Database) -> Result<Vec<Customer>, LeadlineError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM customers ORDER BY updated_at DESC, rowid DESC"
            ))?;
            let rows = stmt.query_map([], row_to_customer)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Overwrite the four address fields.
pub async fn set_customer_address(
    db: &Database,
    id: &str,
    address: &ParsedAddress,
) -> Result<(), LeadlineError> {
    let customer_id = id.to_string();
    let address = address.clone();
    let updated = db
        .connection()
        .call(move |conn| {
            conn.execute(
                &format!(
                    "UPDATE customers
                     SET address = ?2, city = ?3, state = ?4, zip_code = ?5, updated_at = {NOW}
                     WHERE id = ?1"
                ),
                params![
                    customer_id,
                    address.street,
                    address.city,
                    address.state,
                    address.zip_code
                ],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    if updated == 0 {
        return Err(LeadlineError::NotFound {
            entity: "customer",
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Apply an agent edit. Absent patch fields are left as they are.
pub async fn update_customer(
    db: &Database,
    id: &str,
    patch: &CustomerPatch,
) -> Result<Option<Customer>, LeadlineError> {
    let id = id.to_string();
    let patch = patch.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                &format!(
                    "UPDATE customers SET
                        name = COALESCE(?2, name),
                        email = COALESCE(?3, email),
                        address = COALESCE(?4, address),
                        city = COALESCE(?5, city),
                        state = COALESCE(?6, state),
                        zip_code = COALESCE(?7, zip_code),
                        updated_at = {NOW}
                     WHERE id = ?1"
                ),
                params![
                    id,
                    patch.name,
                    patch.email,
                    patch.address,
                    patch.city,
                    patch.state,
                    patch.zip_code,
                ],
            )?;
            select_by_id(conn, &id)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
