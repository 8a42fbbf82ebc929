//! The trust-selection fragment substituted for `contacts_div`.

use std::fmt::Write;

use lantern_types::ContactEntry;

use crate::trust::TrustStore;

/// One checkbox row per contact, `even`/`odd` by zero-based index, pre-checked
/// when the contact is already trusted.
#[must_use]
pub fn contacts_fragment(entries: &[ContactEntry], trust: &TrustStore) -> String {
    let mut out = String::from("<div id='contacts'>\n");
    for (index, entry) in entries.iter().enumerate() {
        let parity = if index % 2 == 0 { "even" } else { "odd" };
        let checked = if trust.is_trusted(entry.identifier()) {
            " checked='true'"
        } else {
            ""
        };
        let _ = write!(
            out,
            "<div class='contactDiv {parity}'><span class='contactName'>{}</span>\
             <input type='checkbox' name='{}' class='contactCheck' {checked}/></div>\n\
             <div style='clear: both'></div>\n",
            escape_html(entry.display_name()),
            escape_html(entry.identifier()),
        );
    }
    out.push_str("</div>\n");
    out
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
