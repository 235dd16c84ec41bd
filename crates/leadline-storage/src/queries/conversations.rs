// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation lifecycle: find-or-create, status changes, agent edits.

use leadline_core::LeadlineError;
use leadline_core::types::{
    Conversation, ConversationPatch, ConversationStatus, ConversationSummary,
};
use rusqlite::{OptionalExtension, TransactionBehavior, params};

use super::{NOW, enum_column, json_list, json_list_column, new_id};
use crate::database::Database;

const COLUMNS: &str = "c.id, c.customer_id, c.status, c.assigned_to, c.notes, c.tags, \
     c.scheduled_call_at, c.last_message_at, c.created_at, c.updated_at";

fn row_to_conversation(row: &rusqlite::Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        status: enum_column(row, 2)?,
        assigned_to: row.get(3)?,
        notes: row.get(4)?,
        tags: json_list_column(row, 5)?,
        scheduled_call_at: row.get(6)?,
        last_message_at: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn select_by_id(conn: &rusqlite::Connection, id: &str) -> rusqlite::Result<Option<Conversation>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM conversations c WHERE c.id = ?1"),
        params![id],
        row_to_conversation,
    )
    .optional()
}

fn select_open(
    conn: &rusqlite::Connection,
    customer_id: &str,
) -> rusqlite::Result<Option<Conversation>> {
    conn.query_row(
        &format!(
            "SELECT {COLUMNS} FROM conversations c
             WHERE c.customer_id = ?1 AND c.status <> 'CLOSED'
             ORDER BY c.created_at DESC LIMIT 1"
        ),
        params![customer_id],
        row_to_conversation,
    )
    .optional()
}

/// The open conversation for `customer_id`, inserting one in NEW if there
/// is none. Call inside an IMMEDIATE transaction.
pub(crate) fn open_or_create(
    conn: &rusqlite::Connection,
    customer_id: &str,
) -> rusqlite::Result<(Conversation, bool)> {
    if let Some(existing) = select_open(conn, customer_id)? {
        return Ok((existing, false));
    }
    let id = new_id();
    conn.execute(
        "INSERT INTO conversations (id, customer_id, status) VALUES (?1, ?2, 'NEW')",
        params![id, customer_id],
    )?;
    let created = select_by_id(conn, &id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
    Ok((created, true))
}

/// Return the customer's open conversation or create one in NEW.
///
/// Runs in an IMMEDIATE transaction; the partial unique index on open
/// conversations backs this up should another process share the file.
pub async fn find_or_create_open_conversation(
    db: &Database,
    customer_id: &str,
) -> Result<(Conversation, bool), LeadlineError> {
    let customer_id = customer_id.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let found = open_or_create(&tx, &customer_id)?;
            tx.commit()?;
            Ok(found)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_conversation(
    db: &Database,
    id: &str,
) -> Result<Option<Conversation>, LeadlineError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| select_by_id(conn, &id))
        .await
        .map_err(crate::database::map_tr_err)
}

/// A customer's conversations, newest first.
pub async fn list_customer_conversations(
    db: &Database,
    customer_id: &str,
) -> Result<Vec<Conversation>, LeadlineError> {
    let customer_id = customer_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM conversations c
                 WHERE c.customer_id = ?1 ORDER BY c.created_at DESC, c.rowid DESC"
            ))?;
            let rows = stmt.query_map(params![customer_id], row_to_conversation)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Inbox listing joined with the customer and the latest message body.
pub async fn list_conversations(
    db: &Database,
    status: Option<ConversationStatus>,
) -> Result<Vec<ConversationSummary>, LeadlineError> {
    let status = status.map(|s| s.to_string());
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS}, cu.phone_number, cu.name,
                    (SELECT m.body FROM messages m WHERE m.conversation_id = c.id
                     ORDER BY m.created_at DESC, m.rowid DESC LIMIT 1)
                 FROM conversations c
                 JOIN customers cu ON cu.id = c.customer_id
                 WHERE ?1 IS NULL OR c.status = ?1
                 ORDER BY c.last_message_at DESC, c.rowid DESC"
            ))?;
            let rows = stmt.query_map(params![status], |row| {
                Ok(ConversationSummary {
                    conversation: row_to_conversation(row)?,
                    phone_number: row.get(10)?,
                    customer_name: row.get(11)?,
                    last_message: row.get(12)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn set_conversation_status(
    db: &Database,
    id: &str,
    status: ConversationStatus,
) -> Result<(), LeadlineError> {
    let conversation_id = id.to_string();
    let updated = db
        .connection()
        .call(move |conn| {
            conn.execute(
                &format!("UPDATE conversations SET status = ?2, updated_at = {NOW} WHERE id = ?1"),
                params![conversation_id, status.to_string()],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    if updated == 0 {
        return Err(LeadlineError::NotFound {
            entity: "conversation",
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Outcome of an agent edit, decided inside the connection call.
enum PatchOutcome {
    Updated(Conversation),
    Missing,
    /// Reopening would give the customer a second open conversation.
    Conflict,
}

/// Apply an agent edit. Absent patch fields are left as they are.
///
/// Reopening a CLOSED conversation is rejected with a validation error while
/// the customer already has another open conversation.
pub async fn update_conversation(
    db: &Database,
    id: &str,
    patch: &ConversationPatch,
) -> Result<Option<Conversation>, LeadlineError> {
    let conversation_id = id.to_string();
    let patch = patch.clone();
    let outcome = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let Some(current) = select_by_id(&tx, &conversation_id)? else {
                return Ok(PatchOutcome::Missing);
            };

            if let Some(next) = patch.status
                && next.is_open()
                && !current.status.is_open()
                && select_open(&tx, &current.customer_id)?.is_some()
            {
                return Ok(PatchOutcome::Conflict);
            }

            let tags = patch.tags.as_deref().map(json_list).transpose()?;
            tx.execute(
                &format!(
                    "UPDATE conversations SET
                        status = COALESCE(?2, status),
                        assigned_to = COALESCE(?3, assigned_to),
                        notes = COALESCE(?4, notes),
                        tags = COALESCE(?5, tags),
                        scheduled_call_at = COALESCE(?6, scheduled_call_at),
                        updated_at = {NOW}
                     WHERE id = ?1"
                ),
                params![
                    conversation_id,
                    patch.status.map(|s| s.to_string()),
                    patch.assigned_to,
                    patch.notes,
                    tags,
                    patch.scheduled_call_at,
                ],
            )?;
            let updated =
                select_by_id(&tx, &conversation_id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
            tx.commit()?;
            Ok(PatchOutcome::Updated(updated))
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    match outcome {
        PatchOutcome::Updated(conversation) => Ok(Some(conversation)),
        PatchOutcome::Missing => Ok(None),
        PatchOutcome::Conflict => Err(LeadlineError::Validation(
            "customer already has an open conversation".into(),
        )),
    }
}

/// Bump `last_message_at` (and `updated_at`) to now.
pub async fn touch_conversation(db: &Database, id: &str) -> Result<(), LeadlineError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                &format!(
                    "UPDATE conversations SET last_message_at = {NOW}, updated_at = {NOW}
                     WHERE id = ?1"
                ),
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
