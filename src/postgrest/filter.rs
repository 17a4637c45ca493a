//! Filter operations for PostgrestClient

/// Operator for filter expressions
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOperator {
    /// Equal to
    Eq,

    /// Not equal to
    Neq,

    /// Greater than or equal to
    Gte,

    /// Less than or equal to
    Lte,

    /// Like (case insensitive)
    ILike,

    /// Is (null, true, false)
    Is,

    /// In a list of values
    In,
}

impl FilterOperator {
    /// Convert the operator to its string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Neq => "neq",
            FilterOperator::Gte => "gte",
            FilterOperator::Lte => "lte",
            FilterOperator::ILike => "ilike",
            FilterOperator::Is => "is",
            FilterOperator::In => "in",
        }
    }

    /// Render `op.value` as PostgREST expects it in a query parameter
    pub fn apply(&self, value: &str) -> String {
        format!("{}.{}", self.as_str(), value)
    }
}

/// Quote a value for use inside `in.(...)` or `or=(...)` lists when it holds
/// characters PostgREST treats as syntax.
pub fn quote_value(value: &str) -> String {
    let reserved = |c: char| matches!(c, ',' | '.' | ':' | '(' | ')' | '"' | '\\') || c.is_whitespace();
    if value.chars().any(reserved) {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{}\"", escaped)
    } else {
        value.to_string()
    }
}

/// `*term*` pattern for a case-insensitive substring search
pub fn contains_pattern(term: &str) -> String {
    format!("*{}*", term.trim().replace('*', ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_values_are_left_alone() {
        assert_eq!(quote_value("42"), "42");
        assert_eq!(quote_value("a1b2"), "a1b2");
    }

    #[test]
    fn reserved_characters_are_quoted() {
        assert_eq!(quote_value("mesa, silla"), "\"mesa, silla\"");
        assert_eq!(quote_value("dice \"hola\""), "\"dice \\\"hola\\\"\"");
    }

    #[test]
    fn operator_renders_prefix() {
        assert_eq!(FilterOperator::Eq.apply("5"), "eq.5");
        assert_eq!(FilterOperator::ILike.apply(&contains_pattern(" lamp* ")), "ilike.*lamp*");
    }
}
