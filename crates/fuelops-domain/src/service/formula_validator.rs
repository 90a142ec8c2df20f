//! Syntax check for admin-entered allocation formulas. Nothing is evaluated.

use serde::Serialize;

/// Variables the external evaluator supplies
pub const FORMULA_VARIABLES: &[&str] = &[
    "totalLiters",
    "extraLiters",
    "pricePerLiter",
    "totalAmount",
    "startOdometer",
    "endOdometer",
    "distance",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormulaValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FormulaValidation {
    fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    fn invalid(error: &str) -> Self {
        Self {
            valid: false,
            error: Some(error.to_string()),
        }
    }
}

pub fn validate_formula(formula: &str) -> FormulaValidation {
    let allowed = |c: char| {
        c.is_ascii_alphanumeric() || c.is_ascii_whitespace() || "+-*/()".contains(c)
    };
    if !formula.chars().all(allowed) {
        return FormulaValidation::invalid("Formula contains invalid characters");
    }

    let mut depth: i32 = 0;
    for c in formula.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return FormulaValidation::invalid("Unbalanced parentheses");
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return FormulaValidation::invalid("Unbalanced parentheses");
    }
    FormulaValidation::ok()
}

/// Identifiers outside [`FORMULA_VARIABLES`], in order of first appearance
pub fn unknown_identifiers(formula: &str) -> Vec<String> {
    let mut unknown: Vec<String> = Vec::new();
    let mut current = String::new();
    for c in formula.chars().chain(std::iter::once(' ')) {
        if c.is_ascii_alphanumeric() || c == '_' {
            current.push(c);
            continue;
        }
        let token = std::mem::take(&mut current);
        let is_identifier = token.chars().next().is_some_and(|first| first.is_ascii_alphabetic());
        if is_identifier && !FORMULA_VARIABLES.contains(&token.as_str()) && !unknown.contains(&token) {
            unknown.push(token);
        }
    }
    unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_arithmetic() {
        assert_eq!(validate_formula("totalLiters + extraLiters - 900"), FormulaValidation::ok());
        assert!(validate_formula("(totalLiters * 2) / (distance - 10)").valid);
        assert!(validate_formula("").valid);
    }

    #[test]
    fn rejects_unbalanced_parentheses() {
        let result = validate_formula("totalLiters + (extraLiters - 900");
        assert!(!result.valid);
        assert_eq!(result.error.as_deref(), Some("Unbalanced parentheses"));
        assert!(!validate_formula(")totalLiters(").valid);
    }

    #[test]
    fn rejects_invalid_characters() {
        let result = validate_formula("totalLiters; DROP");
        assert_eq!(result.error.as_deref(), Some("Formula contains invalid characters"));
        assert!(!validate_formula("totalLiters % 2").valid);
        assert!(!validate_formula("1.5 * totalLiters").valid);
    }

    #[test]
    fn lists_unknown_identifiers_once() {
        assert_eq!(
            unknown_identifiers("totalLiters - fudge * 2 + fudge + distance - bonus"),
            vec!["fudge".to_string(), "bonus".to_string()]
        );
        assert!(unknown_identifiers("totalLiters + 100").is_empty());
    }
}
