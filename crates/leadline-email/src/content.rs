// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subject and bodies of the new-message email.

use leadline_core::types::InboundNotification;

/// Rendered email parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub subject: String,
    pub text: String,
    pub html: String,
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the alert for one inbound message. `crm_url` is the CRM's base URL.
pub fn compose(notification: &InboundNotification, crm_url: &str) -> EmailContent {
    let sender = notification
        .customer_name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(&notification.phone_number);
    let link = format!(
        "{}/conversations/{}",
        crm_url.trim_end_matches('/'),
        notification.conversation_id
    );

    let subject = format!("New Message from {sender}");
    let text = format!(
        "New message from {sender} ({phone}):\n\n{body}\n\nView conversation: {link}\n",
        phone = notification.phone_number,
        body = notification.body,
    );
    let html = format!(
        "<h2>New message from {sender}</h2>\
         <p><strong>Phone:</strong> {phone}</p>\
         <blockquote>{body}</blockquote>\
         <p><a href=\"{link}\">View conversation in CRM</a></p>",
        sender = escape_html(sender),
        phone = escape_html(&notification.phone_number),
        body = escape_html(&notification.body),
        link = escape_html(&link),
    );

    EmailContent {
        subject,
        text,
        html,
    }
}
