//! Text rendering for the menu screens: framed windows, contact lists,
//! the field editor, and contextual footer buttons.

use anyhow::Result;
use crossterm::style::Stylize;

use crate::contact::{Contact, Field, FIELD_RULE_WIDTH};

use super::console::Console;

pub const FRAME_SIZE: usize = 60;
const FRAME_CHAR: char = '#';

fn center(text: &str, fill: char) -> String {
    let len = text.chars().count();
    if len >= FRAME_SIZE {
        return text.to_string();
    }
    let pad = FRAME_SIZE - len;
    let left = pad / 2;
    let fill_left: String = std::iter::repeat(fill).take(left).collect();
    let fill_right: String = std::iter::repeat(fill).take(pad - left).collect();
    format!("{fill_left}{text}{fill_right}")
}

fn rule() -> String {
    "-".repeat(FIELD_RULE_WIDTH)
}

/// Framed window: header line, body, footer button line.
pub fn window(console: &mut Console, title: &str, body: &str, buttons: &[String]) -> Result<()> {
    let header = format!("| {title} |");
    console.write(center(&header, FRAME_CHAR).bold())?;
    console.write("")?;
    console.write(body)?;
    console.write("")?;

    let shown: Vec<&str> = buttons
        .iter()
        .map(String::as_str)
        .filter(|b| !b.is_empty())
        .collect();
    let footer = if shown.is_empty() {
        String::new()
    } else {
        format!("| {} |", shown.join(" | "))
    };
    console.write(center(&footer, FRAME_CHAR).bold())?;
    Ok(())
}

/// Numbered page of short views with a page indicator, or the empty-state
/// message when the page has no contacts.
pub fn contact_list(
    contacts: &[Contact],
    page: usize,
    total_pages: usize,
    empty_msg: &str,
) -> String {
    if contacts.is_empty() {
        return center(empty_msg, ' ');
    }

    let mut lines = Vec::new();
    for (i, contact) in contacts.iter().enumerate() {
        lines.push(format!("{}: {}", i + 1, contact.short_view()));
        if i + 1 < contacts.len() {
            lines.push(rule());
        }
    }
    if total_pages > 1 {
        lines.push(format!(
            "{:>width$}",
            format!("Page: {page}/{total_pages}"),
            width = FRAME_SIZE
        ));
    }
    lines.join("\n")
}

/// Numbered field list for the create/edit screens; unset fields show
/// their placeholder.
pub fn field_list(contact: &Contact) -> String {
    let mut lines = Vec::new();
    for (i, field) in Field::ALL.iter().enumerate() {
        let value = contact
            .get(*field)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(field.placeholder());
        lines.push(format!("{}. {}", i + 1, value));
        if i + 1 < Field::COUNT {
            lines.push(rule());
        }
    }
    lines.join("\n")
}

/// Footer buttons for paginated list screens. Page-change and selection
/// buttons hide when they would be no-ops.
pub fn list_buttons(
    page: usize,
    total_pages: usize,
    shown: usize,
    extra: &[&str],
) -> Vec<String> {
    let mut buttons = Vec::new();
    if total_pages > 1 && page > 1 {
        buttons.push("[p] prev".to_string());
    }
    if total_pages > 1 && page < total_pages {
        buttons.push("[n] next".to_string());
    }
    match shown {
        0 => {}
        1 => buttons.push("[1] select".to_string()),
        n => buttons.push(format!("[1-{n}] select")),
    }
    buttons.extend(extra.iter().map(|b| b.to_string()));
    buttons
}

/// Footer buttons for the create/edit screens. Save hides while the
/// contact is empty; delete appears only when editing a stored record.
pub fn editor_buttons(contact: &Contact, deletable: bool) -> Vec<String> {
    let mut buttons = vec![format!("[1-{}] select", Field::COUNT)];
    if !contact.is_empty() {
        buttons.push("[s] save".to_string());
    }
    if deletable {
        buttons.push("[d] delete".to_string());
    }
    buttons.push("[c] cancel".to_string());
    buttons
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(fields: &[(Field, &str)]) -> Contact {
        let mut c = Contact::default();
        for &(f, v) in fields {
            c.set(f, v);
        }
        c
    }

    #[test]
    fn empty_collection_shows_empty_message_without_controls() {
        let body = contact_list(&[], 1, 1, "No Contacts");
        assert!(body.contains("No Contacts"));
        assert!(!body.contains("Page:"));

        let buttons = list_buttons(1, 1, 0, &["[a] add", "[q] quit"]);
        assert!(!buttons.iter().any(|b| b.contains("select")));
        assert!(!buttons.iter().any(|b| b.contains("prev") || b.contains("next")));
        assert!(buttons.iter().any(|b| b.contains("add")));
    }

    #[test]
    fn page_controls_hide_at_boundaries() {
        let first = list_buttons(1, 3, 10, &[]);
        assert!(!first.iter().any(|b| b.contains("prev")));
        assert!(first.iter().any(|b| b.contains("next")));

        let middle = list_buttons(2, 3, 10, &[]);
        assert!(middle.iter().any(|b| b.contains("prev")));
        assert!(middle.iter().any(|b| b.contains("next")));

        let last = list_buttons(3, 3, 10, &[]);
        assert!(last.iter().any(|b| b.contains("prev")));
        assert!(!last.iter().any(|b| b.contains("next")));
    }

    #[test]
    fn page_indicator_renders_only_when_paginating() {
        let contacts = vec![contact(&[(Field::FirstName, "Ann")])];
        assert!(contact_list(&contacts, 1, 1, "").find("Page:").is_none());
        assert!(contact_list(&contacts, 2, 3, "").contains("Page: 2/3"));
    }

    #[test]
    fn field_list_mixes_values_and_placeholders() {
        let c = contact(&[(Field::FirstName, "Ann")]);
        let body = field_list(&c);
        assert!(body.contains("1. Ann"));
        assert!(body.contains("5. Add mobile phone"));
    }

    #[test]
    fn save_button_hidden_for_empty_contact() {
        let empty = Contact::default();
        assert!(!editor_buttons(&empty, false).iter().any(|b| b.contains("save")));
        let filled = contact(&[(Field::Company, "Acme")]);
        assert!(editor_buttons(&filled, true).iter().any(|b| b.contains("save")));
        assert!(editor_buttons(&filled, true).iter().any(|b| b.contains("delete")));
    }
}
