// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Availability check records.

use leadline_core::LeadlineError;
use leadline_core::types::{AvailabilityCheck, AvailabilityResult};
use rusqlite::{OptionalExtension, params};

use super::{NOW, enum_column, json_list, json_list_column, new_id};
use crate::database::Database;

const COLUMNS: &str = "id, customer_id, conversation_id, address, status, services, \
     fiber_speeds, internet_air, notes, created_at, completed_at";

fn row_to_check(row: &rusqlite::Row<'_>) -> rusqlite::Result<AvailabilityCheck> {
    Ok(AvailabilityCheck {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        conversation_id: row.get(2)?,
        address: row.get(3)?,
        status: enum_column(row, 4)?,
        services: json_list_column(row, 5)?,
        fiber_speeds: json_list_column(row, 6)?,
        internet_air: row.get(7)?,
        notes: row.get(8)?,
        created_at: row.get(9)?,
        completed_at: row.get(10)?,
    })
}

fn select_by_id(
    conn: &rusqlite::Connection,
    id: &str,
) -> rusqlite::Result<Option<AvailabilityCheck>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM availability_checks WHERE id = ?1"),
        params![id],
        row_to_check,
    )
    .optional()
}

/// Insert a PENDING check.
pub async fn create_availability_check(
    db: &Database,
    customer_id: &str,
    conversation_id: Option<&str>,
    address: &str,
) -> Result<AvailabilityCheck, LeadlineError> {
    let customer_id = customer_id.to_string();
    let conversation_id = conversation_id.map(str::to_string);
    let address = address.to_string();
    db.connection()
        .call(move |conn| {
            let id = new_id();
            conn.execute(
                "INSERT INTO availability_checks (id, customer_id, conversation_id, address)
                 VALUES (?1, ?2, ?3, ?4)",
                params![id, customer_id, conversation_id, address],
            )?;
            select_by_id(conn, &id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record the result of a PENDING check.
///
/// A check that already completed is returned unchanged.
pub async fn complete_availability_check(
    db: &Database,
    id: &str,
    result: &AvailabilityResult,
) -> Result<AvailabilityCheck, LeadlineError> {
    let check_id = id.to_string();
    let result = result.clone();
    let stored = db
        .connection()
        .call(move |conn| {
            conn.execute(
                &format!(
                    "UPDATE availability_checks SET
                        status = ?2, services = ?3, fiber_speeds = ?4, internet_air = ?5,
                        notes = ?6, completed_at = {NOW}
                     WHERE id = ?1 AND status = 'PENDING'"
                ),
                params![
                    check_id,
                    result.status.to_string(),
                    json_list(&result.services)?,
                    json_list(&result.fiber_speeds)?,
                    result.internet_air,
                    result.notes,
                ],
            )?;
            select_by_id(conn, &check_id)
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    stored.ok_or_else(|| LeadlineError::NotFound {
        entity: "availability check",
        id: id.to_string(),
    })
}

/// A customer's checks, newest first.
pub async fn list_availability_checks(
    db: &Database,
    customer_id: &str,
) -> Result<Vec<AvailabilityCheck>, LeadlineError> {
    let customer_id = customer_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM availability_checks
                 WHERE customer_id = ?1 ORDER BY created_at DESC, rowid DESC"
            ))?;
            let rows = stmt.query_map(params![customer_id], row_to_check)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
