//! Flat CSV mirror of the record store.
//!
//! The mirror is a denormalized export regenerated wholesale after every
//! mutation: a header row of the six field names followed by one row per
//! contact. It is never appended to in place.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::contact::{Contact, Field};

/// Render the full mirror content for the given contacts.
pub fn render(contacts: &[Contact]) -> String {
    let mut lines = Vec::with_capacity(contacts.len() + 1);
    lines.push(
        Field::ALL
            .iter()
            .map(|f| escape(f.name()))
            .collect::<Vec<_>>()
            .join(","),
    );
    for contact in contacts {
        let line = Field::ALL
            .iter()
            .map(|&f| escape(contact.get(f).unwrap_or_default()))
            .collect::<Vec<_>>()
            .join(",");
        lines.push(line);
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Write the mirror file, replacing any previous content.
pub fn write(path: &Path, contacts: &[Contact]) -> Result<()> {
    fs::write(path, render(contacts))
        .with_context(|| format!("failed to write mirror file {}", path.display()))
}

/// Parse mirror-format CSV content into contacts. The header row decides
/// the column-to-field assignment; unknown columns are ignored. Rows that
/// reduce to an empty contact are dropped.
pub fn parse(content: &str) -> Result<Vec<Contact>> {
    let mut lines = content.lines();
    let header = match lines.next() {
        Some(line) => split_line(line),
        None => return Ok(Vec::new()),
    };

    let columns: Vec<Option<Field>> = header
        .iter()
        .map(|name| {
            Field::ALL
                .into_iter()
                .find(|f| f.name() == name.trim())
        })
        .collect();

    let mut contacts = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let cells = split_line(line);
        let mut contact = Contact::default();
        for (cell, field) in cells.iter().zip(&columns) {
            if let Some(field) = field {
                if !cell.trim().is_empty() {
                    contact.set(*field, cell.clone());
                }
            }
        }
        if !contact.is_empty() {
            contacts.push(contact);
        }
    }
    Ok(contacts)
}

fn escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Split one CSV line, honoring double-quoted cells with embedded commas
/// and doubled quotes.
fn split_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    cell.push('"');
                } else {
                    quoted = false;
                }
            }
            '"' if cell.is_empty() => quoted = true,
            ',' if !quoted => {
                cells.push(std::mem::take(&mut cell));
            }
            _ => cell.push(c),
        }
    }
    cells.push(cell);
    cells
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
    fn render_emits_header_and_one_row_per_contact() {
        let contacts = vec![
            contact(&[(Field::FirstName, "Ann"), (Field::Company, "Acme")]),
            contact(&[(Field::LastName, "Lee")]),
        ];
        let out = render(&contacts);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "first_name,last_name,surname,company,mobile,work");
        assert_eq!(lines[1], "Ann,,,Acme,,");
        assert_eq!(lines[2], ",Lee,,,,");
    }

    #[test]
    fn quoted_cells_round_trip() {
        let contacts = vec![contact(&[
            (Field::Company, "Acme, Inc."),
            (Field::FirstName, "An\"n"),
        ])];
        let parsed = parse(&render(&contacts)).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].company.as_deref(), Some("Acme, Inc."));
        assert_eq!(parsed[0].first_name.as_deref(), Some("An\"n"));
    }

    #[test]
    fn parse_ignores_unknown_columns_and_blank_rows() {
        let content = "first_name,nickname,company\nAnn,annie,Acme\n\n,,\n";
        let parsed = parse(content).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].first_name.as_deref(), Some("Ann"));
        assert_eq!(parsed[0].company.as_deref(), Some("Acme"));
        assert!(parsed[0].surname.is_none());
    }

    #[test]
    fn parse_of_empty_content_is_empty() {
        assert!(parse("").unwrap().is_empty());
    }
}
