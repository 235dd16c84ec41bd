// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Installation schedule and the commissions completed installations earn.

use leadline_core::LeadlineError;
use leadline_core::types::{
    Commission, CommissionStats, CommissionStatus, CompletedInstallation, Installation,
    InstallationPatch, InstallationStatus, InstallationSummary, NewInstallation,
};
use rusqlite::{OptionalExtension, TransactionBehavior, params};

use super::{NOW, enum_column, new_id};
use crate::database::Database;

const INSTALLATION_COLUMNS: &str = "i.id, i.customer_id, i.install_date, i.status, \
     i.reminder_sent, i.notes, i.created_at, i.updated_at";

const COMMISSION_COLUMNS: &str = "id, customer_id, installation_id, customer_name, amount, \
     status, kind, install_date, created_at, updated_at";

/// Stored on commissions whose customer has no name on file.
const UNKNOWN_CUSTOMER: &str = "Unknown Customer";

fn row_to_installation(row: &rusqlite::Row<'_>) -> rusqlite::Result<Installation> {
    Ok(Installation {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        install_date: row.get(2)?,
        status: enum_column(row, 3)?,
        reminder_sent: row.get(4)?,
        notes: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn row_to_commission(row: &rusqlite::Row<'_>) -> rusqlite::Result<Commission> {
    Ok(Commission {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        installation_id: row.get(2)?,
        customer_name: row.get(3)?,
        amount: row.get(4)?,
        status: enum_column(row, 5)?,
        kind: enum_column(row, 6)?,
        install_date: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn select_installation(
    conn: &rusqlite::Connection,
    id: &str,
) -> rusqlite::Result<Option<Installation>> {
    conn.query_row(
        &format!("SELECT {INSTALLATION_COLUMNS} FROM installations i WHERE i.id = ?1"),
        params![id],
        row_to_installation,
    )
    .optional()
}

fn select_commission(conn: &rusqlite::Connection, id: &str) -> rusqlite::Result<Option<Commission>> {
    conn.query_row(
        &format!("SELECT {COMMISSION_COLUMNS} FROM commissions WHERE id = ?1"),
        params![id],
        row_to_commission,
    )
    .optional()
}

pub async fn create_installation(
    db: &Database,
    installation: &NewInstallation,
) -> Result<Installation, LeadlineError> {
    let installation = installation.clone();
    db.connection()
        .call(move |conn| {
            let id = new_id();
            conn.execute(
                "INSERT INTO installations (id, customer_id, install_date, notes)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    id,
                    installation.customer_id,
                    installation.install_date,
                    installation.notes,
                ],
            )?;
            select_installation(conn, &id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_installation(
    db: &Database,
    id: &str,
) -> Result<Option<Installation>, LeadlineError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| select_installation(conn, &id))
        .await
        .map_err(crate::database::map_tr_err)
}

/// All installations joined with the customer, latest install date first.
pub async fn list_installations(db: &Database) -> Result<Vec<InstallationSummary>, LeadlineError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {INSTALLATION_COLUMNS}, cu.phone_number, cu.name
                 FROM installations i
                 JOIN customers cu ON cu.id = i.customer_id
                 ORDER BY i.install_date DESC, i.rowid DESC"
            ))?;
            let rows = stmt.query_map([], |row| {
                Ok(InstallationSummary {
                    installation: row_to_installation(row)?,
                    phone_number: row.get(8)?,
                    customer_name: row.get(9)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn update_installation(
    db: &Database,
    id: &str,
    patch: &InstallationPatch,
) -> Result<Option<Installation>, LeadlineError> {
    let id = id.to_string();
    let patch = patch.clone();
    db.connection()
        .call(move |conn| {
            let updated = conn.execute(
                &format!(
                    "UPDATE installations SET
                        status = COALESCE(?2, status),
                        install_date = COALESCE(?3, install_date),
                        notes = COALESCE(?4, notes),
                        updated_at = {NOW}
                     WHERE id = ?1"
                ),
                params![
                    id,
                    patch.status.map(|s| s.to_string()),
                    patch.install_date,
                    patch.notes,
                ],
            )?;
            if updated == 0 {
                return Ok(None);
            }
            select_installation(conn, &id)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

enum CompleteOutcome {
    Done(CompletedInstallation),
    Missing,
    AlreadyCompleted,
}

/// Mark an installation COMPLETED and record its EARNED sale commission.
///
/// The commission is named after the customer (or "Unknown Customer") and
/// dated at completion. Completing twice is a validation error.
pub async fn complete_installation(
    db: &Database,
    id: &str,
    amount: i64,
) -> Result<CompletedInstallation, LeadlineError> {
    let installation_id = id.to_string();
    let outcome = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let Some(current) = select_installation(&tx, &installation_id)? else {
                return Ok(CompleteOutcome::Missing);
            };
            if current.status == InstallationStatus::Completed {
                return Ok(CompleteOutcome::AlreadyCompleted);
            }

            tx.execute(
                &format!(
                    "UPDATE installations SET status = ?2, updated_at = {NOW} WHERE id = ?1"
                ),
                params![installation_id, InstallationStatus::Completed.to_string()],
            )?;

            let name: Option<String> = tx.query_row(
                "SELECT name FROM customers WHERE id = ?1",
                params![current.customer_id],
                |row| row.get(0),
            )?;
            let customer_name = name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string());

            let commission_id = new_id();
            tx.execute(
                &format!(
                    "INSERT INTO commissions
                        (id, customer_id, installation_id, customer_name, amount, status, kind,
                         install_date)
                     VALUES (?1, ?2, ?3, ?4, ?5, 'EARNED', 'SALE', {NOW})"
                ),
                params![
                    commission_id,
                    current.customer_id,
                    installation_id,
                    customer_name,
                    amount,
                ],
            )?;

            let installation = select_installation(&tx, &installation_id)?
                .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
            let commission = select_commission(&tx, &commission_id)?
                .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
            tx.commit()?;
            Ok(CompleteOutcome::Done(CompletedInstallation {
                installation,
                commission,
            }))
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    match outcome {
        CompleteOutcome::Done(completed) => Ok(completed),
        CompleteOutcome::Missing => Err(LeadlineError::NotFound {
            entity: "installation",
            id: id.to_string(),
        }),
        CompleteOutcome::AlreadyCompleted => Err(LeadlineError::Validation(
            "installation is already completed".into(),
        )),
    }
}

pub async fn mark_reminder_sent(db: &Database, id: &str) -> Result<Installation, LeadlineError> {
    let installation_id = id.to_string();
    let updated = db
        .connection()
        .call(move |conn| {
            conn.execute(
                &format!(
                    "UPDATE installations SET reminder_sent = 1, updated_at = {NOW} WHERE id = ?1"
                ),
                params![installation_id],
            )?;
            select_installation(conn, &installation_id)
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    updated.ok_or_else(|| LeadlineError::NotFound {
        entity: "installation",
        id: id.to_string(),
    })
}

/// Commissions, newest first.
pub async fn list_commissions(db: &Database) -> Result<Vec<Commission>, LeadlineError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COMMISSION_COLUMNS} FROM commissions ORDER BY created_at DESC, rowid DESC"
            ))?;
            let rows = stmt.query_map([], row_to_commission)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn commission_stats(db: &Database) -> Result<CommissionStats, LeadlineError> {
    db.connection()
        .call(|conn| {
            conn.query_row(
                "SELECT
                    COUNT(*),
                    COALESCE(SUM(status = 'PENDING'), 0),
                    COALESCE(SUM(status = 'EARNED'), 0),
                    COALESCE(SUM(status = 'PAID'), 0),
                    COALESCE(SUM(status = 'CHARGEBACK'), 0),
                    COALESCE(SUM(CASE WHEN status IN ('EARNED', 'PAID') THEN amount END), 0),
                    COALESCE(SUM(CASE WHEN status = 'PAID' THEN amount END), 0),
                    COALESCE(SUM(CASE WHEN status = 'PENDING' THEN amount END), 0),
                    COALESCE(SUM(CASE WHEN status IN ('EARNED', 'PAID')
                        AND substr(created_at, 1, 7) = strftime('%Y-%m', 'now')
                        THEN amount END), 0),
                    COALESCE(SUM(CASE WHEN status IN ('EARNED', 'PAID')
                        AND substr(created_at, 1, 7)
                            = strftime('%Y-%m', 'now', 'start of month', '-1 month')
                        THEN amount END), 0)
                 FROM commissions",
                [],
                |row| {
                    Ok(CommissionStats {
                        total: row.get(0)?,
                        pending: row.get(1)?,
                        earned: row.get(2)?,
                        paid: row.get(3)?,
                        chargeback: row.get(4)?,
                        total_earned: row.get(5)?,
                        total_paid: row.get(6)?,
                        pending_amount: row.get(7)?,
                        this_month_amount: row.get(8)?,
                        last_month_amount: row.get(9)?,
                    })
                },
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn set_commission_status(
    db: &Database,
    id: &str,
    status: CommissionStatus,
) -> Result<Option<Commission>, LeadlineError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let updated = conn.execute(
                &format!("UPDATE commissions SET status = ?2, updated_at = {NOW} WHERE id = ?1"),
                params![id, status.to_string()],
            )?;
            if updated == 0 {
                return Ok(None);
            }
            select_commission(conn, &id)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
