//! Identifier quoting and case folding.
//!
//! All decisions here are settings-driven: the quote character, the
//! legal-identifier pattern, the dialect's storage case and the reserved
//! word list come out of the connection's `SettingsNamespace`. A name
//! that is already quoted is never touched again, so quoting is a
//! fixpoint.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock, OnceLock};

use regex::Regex;
use tracing::warn;

use dialekt_settings::SettingsNamespace;

/// How the dialect stores unquoted identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierCase {
    Upper,
    Lower,
    Mixed,
}

impl IdentifierCase {
    fn from_setting(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "upper" => IdentifierCase::Upper,
            "lower" => IdentifierCase::Lower,
            _ => IdentifierCase::Mixed,
        }
    }
}

const DEFAULT_IDENTIFIER_PATTERN: &str = "^[a-zA-Z_][a-zA-Z0-9_]*$";

static DEFAULT_LEGAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(DEFAULT_IDENTIFIER_PATTERN).expect("default identifier pattern is valid")
});

/// Keywords every dialect treats as reserved. Dialects extend this set
/// through the `reservedwords` setting, and forks inherit their base's
/// additions through the alias chain.
static BASE_RESERVED: &[&str] = &[
    "ALL", "AND", "ANY", "AS", "ASC", "BETWEEN", "BY", "CASE", "CAST", "CHECK", "COLUMN",
    "CONSTRAINT", "CREATE", "CROSS", "CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP",
    "DEFAULT", "DELETE", "DESC", "DISTINCT", "DROP", "ELSE", "END", "EXCEPT", "EXISTS", "FALSE",
    "FOR", "FOREIGN", "FROM", "FULL", "GRANT", "GROUP", "HAVING", "IN", "INNER", "INSERT",
    "INTERSECT", "INTO", "IS", "JOIN", "KEY", "LEFT", "LIKE", "NOT", "NULL", "ON", "OR", "ORDER",
    "OUTER", "PRIMARY", "REFERENCES", "RIGHT", "SELECT", "SET", "TABLE", "THEN", "TO", "TRUE",
    "UNION", "UNIQUE", "UPDATE", "USER", "USING", "VALUES", "WHEN", "WHERE", "WITH",
];

/// Per-connection quoting engine, built once after detection.
pub struct QuoteHandler {
    settings: Arc<SettingsNamespace>,
    quote: String,
    never_quote: bool,
    brackets: bool,
    case: IdentifierCase,
    legal: Regex,
    reserved: OnceLock<HashSet<String>>,
}

impl QuoteHandler {
    /// `probed_quote` is what the connection reported; a `quote.char`
    /// setting overrides it.
    pub fn from_settings(settings: Arc<SettingsNamespace>, probed_quote: &str) -> Self {
        let quote = settings.get_str("quote.char", probed_quote);
        let quote = if quote.trim().is_empty() {
            "\"".to_string()
        } else {
            quote
        };
        let never_quote = settings.get_bool("quote.never", false);
        let brackets = settings.get_bool("quote.brackets", false);
        let case =
            IdentifierCase::from_setting(&settings.get_str("case.objects", "mixed"));
        let pattern = settings.get_str("identifier.pattern", DEFAULT_IDENTIFIER_PATTERN);
        let legal = if pattern == DEFAULT_IDENTIFIER_PATTERN {
            DEFAULT_LEGAL.clone()
        } else {
            match Regex::new(&pattern) {
                Ok(re) => re,
                Err(err) => {
                    warn!(pattern = %pattern, error = %err, "invalid identifier pattern, using default");
                    DEFAULT_LEGAL.clone()
                }
            }
        };
        Self {
            settings,
            quote,
            never_quote,
            brackets,
            case,
            legal,
            reserved: OnceLock::new(),
        }
    }

    pub fn quote_char(&self) -> &str {
        &self.quote
    }

    pub fn identifier_case(&self) -> IdentifierCase {
        self.case
    }

    fn reserved_words(&self) -> &HashSet<String> {
        self.reserved.get_or_init(|| {
            let mut words: HashSet<String> =
                BASE_RESERVED.iter().map(|w| w.to_string()).collect();
            for word in self.settings.get_list_union("reservedwords") {
                words.insert(word.to_ascii_uppercase());
            }
            words
        })
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_words().contains(&name.to_ascii_uppercase())
    }

    /// True when the name is wrapped in the dialect quote character, or
    /// in square brackets where the dialect accepts those.
    pub fn is_quoted(&self, name: &str) -> bool {
        let name = name.trim();
        if name.len() >= 2 && name.starts_with(&self.quote) && name.ends_with(&self.quote) {
            return true;
        }
        self.brackets && name.len() >= 2 && name.starts_with('[') && name.ends_with(']')
    }

    /// Whether an unquoted name would change meaning without quotes.
    pub fn needs_quotes(&self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.is_quoted(name) {
            return false;
        }
        if name.chars().any(char::is_whitespace) {
            return true;
        }
        if !self.legal.is_match(name) {
            return true;
        }
        let case_conflict = match self.case {
            IdentifierCase::Upper => name.chars().any(|c| c.is_ascii_lowercase()),
            IdentifierCase::Lower => name.chars().any(|c| c.is_ascii_uppercase()),
            IdentifierCase::Mixed => false,
        };
        if case_conflict {
            return true;
        }
        self.is_reserved(name)
    }

    pub fn quote_if_needed(&self, name: &str) -> String {
        self.quote_name(name, false)
    }

    /// Quote `name` unless the dialect forbids quoting entirely. Already
    /// quoted input passes through unchanged regardless of `force`.
    pub fn quote_name(&self, name: &str, force: bool) -> String {
        let trimmed = name.trim();
        if self.never_quote {
            return self.strip_quotes(trimmed);
        }
        if trimmed.is_empty() || self.is_quoted(trimmed) {
            return trimmed.to_string();
        }
        if force || self.needs_quotes(trimmed) {
            format!("{}{}{}", self.quote, trimmed, self.quote)
        } else {
            trimmed.to_string()
        }
    }

    /// Remove the dialect quotes (or brackets) from a quoted name.
    pub fn strip_quotes(&self, name: &str) -> String {
        let name = name.trim();
        if !self.is_quoted(name) {
            return name.to_string();
        }
        if name.starts_with(&self.quote) && name.ends_with(&self.quote) {
            name[self.quote.len()..name.len() - self.quote.len()].to_string()
        } else {
            name[1..name.len() - 1].to_string()
        }
    }

    /// Fold an object name to the dialect's storage case. Quoted names
    /// keep their exact spelling.
    pub fn adjust_object_name_case(&self, name: &str) -> String {
        let name = name.trim();
        if self.is_quoted(name) {
            return name.to_string();
        }
        match self.case {
            IdentifierCase::Upper => name.to_uppercase(),
            IdentifierCase::Lower => name.to_lowercase(),
            IdentifierCase::Mixed => name.to_string(),
        }
    }

    /// Schema names fold like object names unless `case.schemas`
    /// overrides the object rule.
    pub fn adjust_schema_name_case(&self, name: &str) -> String {
        let name = name.trim();
        if self.is_quoted(name) {
            return name.to_string();
        }
        let case = match self.settings.resolve("case.schemas") {
            Some(value) => IdentifierCase::from_setting(value),
            None => self.case,
        };
        match case {
            IdentifierCase::Upper => name.to_uppercase(),
            IdentifierCase::Lower => name.to_lowercase(),
            IdentifierCase::Mixed => name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use dialekt_core::{DialectId, VersionBand};
    use dialekt_settings::builtin_defaults;

    use super::*;

    fn handler_for(dialect: DialectId, version: VersionBand) -> QuoteHandler {
        let space = Arc::new(builtin_defaults());
        let settings = Arc::new(SettingsNamespace::new(space, dialect, version));
        QuoteHandler::from_settings(settings, "\"")
    }

    #[test]
    fn test_plain_name_passes_through() {
        let handler = handler_for(DialectId::POSTGRESQL, VersionBand::new(15, 0));
        assert_eq!(handler.quote_if_needed("customers"), "customers");
    }

    #[test]
    fn test_reserved_word_gets_quoted() {
        let handler = handler_for(DialectId::POSTGRESQL, VersionBand::new(15, 0));
        assert_eq!(handler.quote_if_needed("Order"), "\"Order\"");
        assert!(handler.needs_quotes("ORDER"));
    }

    #[test]
    fn test_quoting_is_a_fixpoint() {
        let handler = handler_for(DialectId::POSTGRESQL, VersionBand::new(15, 0));
        let once = handler.quote_if_needed("select");
        let twice = handler.quote_if_needed(&once);
        assert_eq!(once, twice);
        assert_eq!(handler.quote_name(&once, true), once);
    }

    #[test]
    fn test_case_fold_mismatch_triggers_quotes() {
        // Oracle folds unquoted identifiers to upper case.
        let handler = handler_for(DialectId::ORACLE, VersionBand::new(19, 0));
        assert!(handler.needs_quotes("Employees"));
        // Reserved and mixed case at once still means quotes.
        assert!(handler.needs_quotes("Order"));
        assert!(!handler.needs_quotes("EMPLOYEES"));
        assert_eq!(handler.adjust_object_name_case("employees"), "EMPLOYEES");
        assert_eq!(handler.adjust_object_name_case("\"Employees\""), "\"Employees\"");
    }

    #[test]
    fn test_embedded_whitespace_and_symbols() {
        let handler = handler_for(DialectId::POSTGRESQL, VersionBand::new(15, 0));
        assert_eq!(handler.quote_if_needed("my table"), "\"my table\"");
        assert_eq!(handler.quote_if_needed("total$"), "\"total$\"");
    }

    #[test]
    fn test_brackets_count_as_quoted() {
        let handler = handler_for(DialectId::SQL_SERVER, VersionBand::new(15, 0));
        assert!(handler.is_quoted("[Order Details]"));
        assert_eq!(handler.quote_if_needed("[Order Details]"), "[Order Details]");
        assert_eq!(handler.strip_quotes("[Order Details]"), "Order Details");
    }

    #[test]
    fn test_never_quote_dialect_strips() {
        let handler = handler_for(DialectId::INFORMIX, VersionBand::new(14, 10));
        assert_eq!(handler.quote_name("\"customers\"", true), "customers");
        assert_eq!(handler.quote_name("order", true), "order");
    }

    #[test]
    fn test_fork_inherits_base_reserved_words() {
        // MariaDB resolves through the mysql alias for its keyword list.
        let handler = handler_for(DialectId::MARIADB, VersionBand::new(10, 6));
        assert!(handler.is_reserved("index"));
    }
}
