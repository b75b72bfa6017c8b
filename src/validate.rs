use std::sync::OnceLock;

use regex::Regex;

/// Phone numbers allow digits, spaces, an optional leading +, parenthesized
/// groups, and dashes. Empty input is always accepted (it clears nothing
/// and is treated as a no-op upstream).
pub fn phone_number(value: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| {
        Regex::new(r"^([+]?[\s0-9]+)?(\d{3}|[(]?[0-9]+[)])?([-]?[\s]?[0-9])+$")
            .unwrap()
    });
    value.is_empty() || re.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_formats() {
        for number in ["5550101", "555-0101", "+7 900 555 01 01", "(495) 555-0101"] {
            assert!(phone_number(number), "rejected {number}");
        }
    }

    #[test]
    fn accepts_empty_input() {
        assert!(phone_number(""));
    }

    #[test]
    fn rejects_letters() {
        assert!(!phone_number("call me"));
        assert!(!phone_number("555-CALL"));
    }
}
