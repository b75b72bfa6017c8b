use serde::{Deserialize, Serialize};

/// Width of the rule separating fields in card and list views.
pub const FIELD_RULE_WIDTH: usize = 30;

/// The six editable contact fields, in declaration order.
///
/// Declaration order is load-bearing: it drives the derived identifier,
/// the mirror file column order, and the short-view fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    FirstName,
    LastName,
    Surname,
    Company,
    Mobile,
    Work,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::FirstName,
        Field::LastName,
        Field::Surname,
        Field::Company,
        Field::Mobile,
        Field::Work,
    ];

    pub const COUNT: usize = 6;

    /// Column name used in the mirror file header and import sources.
    pub fn name(self) -> &'static str {
        match self {
            Field::FirstName => "first_name",
            Field::LastName => "last_name",
            Field::Surname => "surname",
            Field::Company => "company",
            Field::Mobile => "mobile",
            Field::Work => "work",
        }
    }

    /// Human label for the card view.
    pub fn label(self) -> &'static str {
        match self {
            Field::FirstName => "First name",
            Field::LastName => "Last name",
            Field::Surname => "Surname",
            Field::Company => "Company",
            Field::Mobile => "Mobile phone",
            Field::Work => "Work phone",
        }
    }

    /// Placeholder shown in the create/edit menu while the field is unset.
    pub fn placeholder(self) -> &'static str {
        match self {
            Field::FirstName => "First name",
            Field::LastName => "Last name",
            Field::Surname => "Surname",
            Field::Company => "Company",
            Field::Mobile => "Add mobile phone",
            Field::Work => "Add work phone",
        }
    }

    pub fn from_digit(digit: usize) -> Option<Self> {
        Field::ALL.get(digit.checked_sub(1)?).copied()
    }

    /// Phone fields get format validation on entry.
    pub fn is_phone(self) -> bool {
        matches!(self, Field::Mobile | Field::Work)
    }
}

/// A single address-book record. The identifier is absent until the
/// first save and derived from the field content, so identical contacts
/// collide to the same id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work: Option<String>,
}

impl Contact {
    pub fn get(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::Surname => &self.surname,
            Field::Company => &self.company,
            Field::Mobile => &self.mobile,
            Field::Work => &self.work,
        };
        value.as_deref()
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::FirstName => &mut self.first_name,
            Field::LastName => &mut self.last_name,
            Field::Surname => &mut self.surname,
            Field::Company => &mut self.company,
            Field::Mobile => &mut self.mobile,
            Field::Work => &mut self.work,
        };
        *slot = Some(value.into());
    }

    /// A contact is empty when every field is unset or whitespace-only.
    /// Empty contacts are never persisted.
    pub fn is_empty(&self) -> bool {
        Field::ALL
            .iter()
            .all(|&f| self.get(f).map_or(true, |v| v.trim().is_empty()))
    }

    /// Iterate over the set (non-empty after trimming) field values
    /// in declaration order.
    pub fn set_values(&self) -> impl Iterator<Item = (Field, &str)> {
        Field::ALL.into_iter().filter_map(|f| {
            self.get(f)
                .filter(|v| !v.trim().is_empty())
                .map(|v| (f, v))
        })
    }

    /// Derive the stable identifier: set field values concatenated in
    /// declaration order, whitespace removed, lowercased. Contacts with
    /// identical content collide to the same identifier by design.
    pub fn derived_id(&self) -> String {
        let mut id = String::new();
        for (_, value) in self.set_values() {
            for c in value.chars().filter(|c| !c.is_whitespace()) {
                id.extend(c.to_lowercase());
            }
        }
        id
    }

    /// One-line list representation: "first last", then "first company",
    /// then "last company", else the first set field.
    pub fn short_view(&self) -> String {
        let first = self.first_name.as_deref().filter(|v| !v.trim().is_empty());
        let last = self.last_name.as_deref().filter(|v| !v.trim().is_empty());
        let company = self.company.as_deref().filter(|v| !v.trim().is_empty());

        match (first, last, company) {
            (Some(f), Some(l), _) => format!("{f} {l}"),
            (Some(f), None, Some(c)) => format!("{f} {c}"),
            (None, Some(l), Some(c)) => format!("{l} {c}"),
            _ => self
                .set_values()
                .next()
                .map(|(_, v)| v.to_string())
                .unwrap_or_default(),
        }
    }

    /// Multi-line card representation: every set field with its label,
    /// separated by a fixed-width rule.
    pub fn card_view(&self) -> String {
        let rule = "-".repeat(FIELD_RULE_WIDTH);
        let mut lines = Vec::new();
        for (field, value) in self.set_values() {
            if !lines.is_empty() {
                lines.push(rule.clone());
            }
            lines.push(format!("{}: {}", field.label(), value));
        }
        lines.join("\n")
    }
}

/// Dedup criterion, not full field identity: contacts are equal when every
/// field set on both sides matches case-insensitively. Fields set on only
/// one side are ignored, as is the identifier.
impl PartialEq for Contact {
    fn eq(&self, other: &Self) -> bool {
        Field::ALL.iter().all(|&f| match (self.get(f), other.get(f)) {
            (Some(a), Some(b)) => a.trim().eq_ignore_ascii_case(b.trim()),
            _ => true,
        })
    }
}
