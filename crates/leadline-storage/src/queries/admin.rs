// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Administrative bulk operations.

use leadline_core::LeadlineError;
use leadline_core::types::{ResetSummary, StoreStats};

use super::NOW;
use crate::database::Database;

/// Delete every message, availability check, and conversation in one
/// transaction. Customers survive; with `clear_addresses` their address
/// fields are nulled.
pub async fn reset_conversations(
    db: &Database,
    clear_addresses: bool,
) -> Result<ResetSummary, LeadlineError> {
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let messages = tx.execute("DELETE FROM messages", [])?;
            let availability_checks = tx.execute("DELETE FROM availability_checks", [])?;
            let conversations = tx.execute("DELETE FROM conversations", [])?;
            let addresses_cleared = if clear_addresses {
                tx.execute(
                    &format!(
                        "UPDATE customers
                         SET address = NULL, city = NULL, state = NULL, zip_code = NULL,
                             updated_at = {NOW}
                         WHERE address IS NOT NULL OR city IS NOT NULL
                            OR state IS NOT NULL OR zip_code IS NOT NULL"
                    ),
                    [],
                )?
            } else {
                0
            };
            tx.commit()?;
            Ok(ResetSummary {
                messages,
                conversations,
                availability_checks,
                addresses_cleared,
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn stats(db: &Database) -> Result<StoreStats, LeadlineError> {
    db.connection()
        .call(|conn| {
            conn.query_row(
                "SELECT
                    (SELECT COUNT(*) FROM customers),
                    (SELECT COUNT(*) FROM conversations),
                    (SELECT COUNT(*) FROM conversations WHERE status <> 'CLOSED'),
                    (SELECT COUNT(*) FROM messages),
                    (SELECT COUNT(*) FROM availability_checks)",
                [],
                |row| {
                    Ok(StoreStats {
                        customers: row.get(0)?,
                        conversations: row.get(1)?,
                        open_conversations: row.get(2)?,
                        messages: row.get(3)?,
                        availability_checks: row.get(4)?,
                    })
                },
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}
