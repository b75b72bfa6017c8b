use crate::contact::Contact;

/// Normalize a string for search indexing and querying.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

pub fn normalize_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(normalize(trimmed))
    }
}

pub fn like_pattern(normalized: &str) -> String {
    let escaped = normalized
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Normalized concatenation of a contact's field values, stored alongside
/// the record so substring search runs as a LIKE scan.
pub fn haystack(contact: &Contact) -> String {
    let mut out = String::new();
    for (_, value) in contact.set_values() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&normalize(value));
    }
    out
}

/// Whether the query occurs as a substring anywhere in the contact's
/// serialized field set. Matching is case-insensitive.
pub fn matches(contact: &Contact, query: &str) -> bool {
    match normalize_query(query) {
        Some(q) => haystack(contact).contains(&q),
        None => false,
    }
}

/// Every set field value across the given contacts, sorted ascending.
/// Duplicates are kept unless `dedup` is requested.
pub fn field_values(contacts: &[Contact], dedup: bool) -> Vec<String> {
    let mut values: Vec<String> = contacts
        .iter()
        .flat_map(|c| c.set_values().map(|(_, v)| v.to_string()))
        .collect();
    values.sort();
    if dedup {
        values.dedup();
    }
    values
}
