// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Append-only message log.

use leadline_core::LeadlineError;
use leadline_core::types::{
    DeliveryStatus, Direction, InboundRecord, Message, NewInbound, NewMessage,
};
use rusqlite::{OptionalExtension, TransactionBehavior, params};

use super::conversations::open_or_create;
use super::{enum_column, new_id};
use crate::database::Database;

const COLUMNS: &str =
    "id, conversation_id, customer_id, body, direction, status, provider, external_id, created_at";

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        customer_id: row.get(2)?,
        body: row.get(3)?,
        direction: enum_column(row, 4)?,
        status: enum_column(row, 5)?,
        provider: row.get(6)?,
        external_id: row.get(7)?,
        created_at: row.get(8)?,
    })
}

/// Append a message.
///
/// Returns `Ok(None)` without writing when `(provider, external_id)` is
/// already stored, which is how provider redeliveries are detected.
pub async fn insert_message(
    db: &Database,
    message: &NewMessage,
) -> Result<Option<Message>, LeadlineError> {
    let message = message.clone();
    db.connection()
        .call(move |conn| {
            let id = new_id();
            let inserted = conn.execute(
                "INSERT INTO messages
                    (id, conversation_id, customer_id, body, direction, status, provider, external_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT DO NOTHING",
                params![
                    id,
                    message.conversation_id,
                    message.customer_id,
                    message.body,
                    message.direction.to_string(),
                    message.status.to_string(),
                    message.provider,
                    message.external_id,
                ],
            )?;
            if inserted == 0 {
                return Ok(None);
            }
            let stored = conn.query_row(
                &format!("SELECT {COLUMNS} FROM messages WHERE id = ?1"),
                params![id],
                row_to_message,
            )?;
            Ok(Some(stored))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// File an inbound SMS on the customer's open conversation.
///
/// The redelivery check, conversation find-or-create and insert share one
/// IMMEDIATE transaction, so a duplicate never opens a conversation.
pub async fn record_inbound(
    db: &Database,
    inbound: &NewInbound,
) -> Result<InboundRecord, LeadlineError> {
    let inbound = inbound.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            if let Some(external_id) = &inbound.external_id {
                let seen: Option<String> = tx
                    .query_row(
                        "SELECT conversation_id FROM messages
                         WHERE provider = ?1 AND external_id = ?2",
                        params![inbound.provider, external_id],
                        |row| row.get(0),
                    )
                    .optional()?;
                if let Some(conversation_id) = seen {
                    return Ok(InboundRecord::Duplicate { conversation_id });
                }
            }

            let (conversation, created) = open_or_create(&tx, &inbound.customer_id)?;
            let id = new_id();
            tx.execute(
                "INSERT INTO messages
                    (id, conversation_id, customer_id, body, direction, status, provider, external_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    id,
                    conversation.id,
                    inbound.customer_id,
                    inbound.body,
                    Direction::Inbound.to_string(),
                    DeliveryStatus::Received.to_string(),
                    inbound.provider,
                    inbound.external_id,
                ],
            )?;
            let message = tx.query_row(
                &format!("SELECT {COLUMNS} FROM messages WHERE id = ?1"),
                params![id],
                row_to_message,
            )?;
            tx.commit()?;
            Ok(InboundRecord::Stored {
                conversation,
                created,
                message,
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Messages of a conversation in creation order.
///
/// With `limit`, the newest `limit` messages are selected and returned
/// oldest first.
pub async fn list_messages(
    db: &Database,
    conversation_id: &str,
    limit: Option<usize>,
) -> Result<Vec<Message>, LeadlineError> {
    let conversation_id = conversation_id.to_string();
    // SQLite treats a negative LIMIT as unbounded.
    let limit = limit.map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM (
                    SELECT {COLUMNS}, rowid AS seq FROM messages
                    WHERE conversation_id = ?1
                    ORDER BY created_at DESC, rowid DESC
                    LIMIT ?2
                 ) ORDER BY created_at ASC, seq ASC"
            ))?;
            let rows = stmt.query_map(params![conversation_id, limit], row_to_message)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
