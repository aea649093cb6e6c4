//! Minimal lexical awareness for SQL text.
//!
//! Not a parser. Just enough scanning to strip comments, find a keyword
//! outside quotes and comments, and read the column names back out of a
//! CREATE TABLE body.

/// Remove `--` line comments and `/* */` block comments, leaving quoted
/// strings untouched.
pub fn strip_comments(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' | '`' => {
                out.push(c);
                for inner in chars.by_ref() {
                    out.push(inner);
                    if inner == c {
                        break;
                    }
                }
            }
            '-' if chars.peek() == Some(&'-') => {
                for inner in chars.by_ref() {
                    if inner == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for inner in chars.by_ref() {
                    if prev == '*' && inner == '/' {
                        break;
                    }
                    prev = inner;
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Overwrite comments with spaces instead of deleting them, so every
/// remaining character keeps its original byte offset.
fn mask_comments(sql: &str) -> String {
    fn blank(out: &mut String, c: char) {
        for _ in 0..c.len_utf8() {
            out.push(' ');
        }
    }
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' | '`' => {
                out.push(c);
                for inner in chars.by_ref() {
                    out.push(inner);
                    if inner == c {
                        break;
                    }
                }
            }
            '-' if chars.peek() == Some(&'-') => {
                out.push(' ');
                for inner in chars.by_ref() {
                    if inner == '\n' {
                        out.push('\n');
                        break;
                    }
                    blank(&mut out, inner);
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                out.push(' ');
                chars.next();
                out.push(' ');
                let mut prev = '\0';
                for inner in chars.by_ref() {
                    blank(&mut out, inner);
                    if prev == '*' && inner == '/' {
                        break;
                    }
                    prev = inner;
                }
            }
            _ => out.push(c),
        }
    }
    out
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Byte offset of `keyword` (an ASCII word) as a standalone word outside
/// quotes and comments, case-insensitive. The offset indexes the input
/// exactly as given, comments and all.
pub fn find_keyword(sql: &str, keyword: &str) -> Option<usize> {
    let masked = mask_comments(sql);
    let haystack = masked.as_bytes();
    let needle = keyword.as_bytes();
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    let mut at = 0;
    while at + needle.len() <= haystack.len() {
        if haystack[at..at + needle.len()].eq_ignore_ascii_case(needle) {
            let before_ok = at == 0 || !is_word_byte(haystack[at - 1]);
            let end = at + needle.len();
            let after_ok = end >= haystack.len() || !is_word_byte(haystack[end]);
            if before_ok && after_ok && !in_quotes(&masked, at) {
                return Some(at);
            }
            at = end;
        } else {
            at += 1;
        }
    }
    None
}

fn in_quotes(sql: &str, offset: usize) -> bool {
    let mut open: Option<char> = None;
    for (i, c) in sql.char_indices() {
        if i >= offset {
            break;
        }
        match open {
            Some(quote) if c == quote => open = None,
            Some(_) => {}
            None if c == '\'' || c == '"' || c == '`' => open = Some(c),
            None => {}
        }
    }
    open.is_some()
}

const CLAUSE_STARTERS: &[&str] = &[
    "CONSTRAINT", "PRIMARY", "FOREIGN", "UNIQUE", "CHECK", "KEY", "INDEX", "EXCLUDE",
];

/// Column names from the body of a CREATE TABLE statement, in
/// declaration order. Table-level constraint rows are skipped.
pub fn column_names_from_create(ddl: &str) -> Vec<String> {
    let stripped = strip_comments(ddl);
    let Some(open) = stripped.find('(') else {
        return Vec::new();
    };
    let body = &stripped[open + 1..];

    let mut segments: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for c in body.chars() {
        match quote {
            Some(open_quote) => {
                current.push(c);
                if c == open_quote {
                    quote = None;
                }
                continue;
            }
            None => {}
        }
        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                current.push(c);
            }
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' if depth == 0 => break,
            ')' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => {
                segments.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        segments.push(current);
    }

    segments
        .iter()
        .filter_map(|segment| {
            let trimmed = segment.trim();
            let first = trimmed.split_whitespace().next()?;
            let bare = first.trim_matches(['"', '`', '[', ']']);
            if CLAUSE_STARTERS
                .iter()
                .any(|starter| first.eq_ignore_ascii_case(starter))
            {
                return None;
            }
            Some(bare.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_comments_keeps_quoted_text() {
        let sql = "SELECT '--not a comment' -- real comment\nFROM t /* gone */ WHERE x = 1";
        let stripped = strip_comments(sql);
        assert!(stripped.contains("'--not a comment'"));
        assert!(!stripped.contains("real comment"));
        assert!(!stripped.contains("gone"));
    }

    #[test]
    fn test_find_keyword_skips_quotes_and_substrings() {
        let sql = "SELECT 'WHERE' AS wherever FROM t WHERE id = 1";
        let pos = find_keyword(sql, "WHERE").unwrap();
        assert_eq!(&sql[pos..pos + 5], "WHERE");
        assert!(pos > sql.find("wherever").unwrap());
    }

    #[test]
    fn test_strip_comments_preserves_multibyte_text() {
        let sql = "SELECT 'café' FROM t -- naïve note\n";
        assert_eq!(strip_comments(sql), "SELECT 'café' FROM t \n");
    }

    #[test]
    fn test_find_keyword_offset_valid_after_comment() {
        let sql = "-- leading comment\nSELECT * FROM t WHERE id = 1";
        let pos = find_keyword(sql, "WHERE").unwrap();
        assert_eq!(&sql[pos..pos + 5], "WHERE");

        let sql = "/* früh */ SELECT 1 FROM t";
        let pos = find_keyword(sql, "FROM").unwrap();
        assert_eq!(&sql[pos..pos + 4], "FROM");
    }

    #[test]
    fn test_column_names_skip_constraint_rows() {
        let ddl = "CREATE TABLE t\n(\n   id INT,\n   name VARCHAR(20),\n   CONSTRAINT pk_t PRIMARY KEY (id)\n);\n";
        assert_eq!(column_names_from_create(ddl), vec!["id", "name"]);
    }

    #[test]
    fn test_column_names_handle_nested_parens() {
        let ddl = "CREATE TABLE t (amount NUMERIC(10,2), tag \"Weird Name\" )";
        assert_eq!(column_names_from_create(ddl), vec!["amount", "tag"]);
    }
}
