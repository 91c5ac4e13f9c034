// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Output filename policy

/// Characters that never survive into an output filename
pub const FORBIDDEN_CHARS: [char; 10] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|', ' '];

/// Replace every forbidden character with `_`
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if FORBIDDEN_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// `{date}-{source}-{destination}-{description}.pdf`, sanitized.
///
/// No uniqueness check: equal inputs give equal names.
pub fn output_filename(date: &str, source: &str, destination: &str, description: &str) -> String {
    sanitize_filename(&format!("{}-{}-{}-{}.pdf", date, source, destination, description))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_scenario_name() {
        assert_eq!(
            output_filename("20240101", "Acme Corp", "Jane Doe", "Electric bill"),
            "20240101-Acme_Corp-Jane_Doe-Electric_bill.pdf"
        );
    }

    #[test]
    fn replaces_colon_slash_and_space() {
        assert_eq!(sanitize_filename("Rent: March/April"), "Rent__March_April");
    }

    #[test]
    fn replaces_every_forbidden_character() {
        assert_eq!(sanitize_filename(r#"a/b\c:d*e?f"g<h>i|j k"#), "a_b_c_d_e_f_g_h_i_j_k");
    }

    #[test]
    fn sanitize_is_idempotent() {
        for raw in ["Rent: March/April", "plain", "", "  ", "é/ü:ß", "a_b__c"] {
            let once = sanitize_filename(raw);
            assert_eq!(sanitize_filename(&once), once);
        }
    }

    #[test]
    fn empty_source_leaves_double_dash() {
        assert_eq!(
            output_filename("20240101", "", "Jane Doe", "Letter"),
            "20240101--Jane_Doe-Letter.pdf"
        );
    }
}
