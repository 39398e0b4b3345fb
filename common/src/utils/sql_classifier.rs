//! SQL statement classifier.
//!
//! Decides whether a request only reads data, which is what makes its
//! result safe to memoize, and whether it touches transaction state.
//!
//! Statements are not tokenized. DuckDB can only start a statement at the
//! beginning of the text or right after a `;`, so every such position is
//! classified on its own, whether or not the `;` sits inside a string or a
//! comment. A `;` inside a literal can only make the answer stricter.

/// Leading keywords of statements that do not modify the database.
const READ_ONLY_KEYWORDS: [&str; 8] = [
    "SELECT", "WITH", "SHOW", "DESCRIBE", "SUMMARIZE", "FROM", "VALUES", "EXPLAIN",
];

/// Leading keywords of transaction control statements.
const TRANSACTION_KEYWORDS: [&str; 6] = ["BEGIN", "START", "COMMIT", "ROLLBACK", "ABORT", "END"];

/// Words that make a `WITH` statement a write (`WITH x AS (...) INSERT ...`).
const WRITE_KEYWORDS: [&str; 8] = [
    "INSERT", "UPDATE", "DELETE", "MERGE", "COPY", "CREATE", "DROP", "ALTER",
];

/// Classifies SQL statements by their leading keyword.
pub struct SqlClassifier;

impl SqlClassifier {
    /// Returns the first keyword of the statement, uppercased.
    ///
    /// Leading whitespace, `--` and (nested) `/* */` comments and opening
    /// parentheses are skipped. Returns `None` when no keyword is found.
    pub fn leading_keyword(sql: &str) -> Option<String> {
        Self::split_keyword(sql).map(|(keyword, _)| keyword)
    }

    /// Returns every suffix of the text that may begin a statement: the
    /// whole text and the text after each `;`.
    ///
    /// Quotes are ignored, so this yields every real statement start plus
    /// some that lie inside literals or comments.
    pub fn statement_starts(sql: &str) -> impl Iterator<Item = &str> {
        std::iter::once(sql).chain(sql.match_indices(';').map(move |(i, _)| &sql[i + 1..]))
    }

    /// Checks whether the text only reads data.
    ///
    /// Every possible statement start must begin a read-only statement.
    /// `EXPLAIN ANALYZE` executes its statement, so it only counts as
    /// read-only when the explained statement does.
    pub fn is_read_only(sql: &str) -> bool {
        let mut found = false;
        for start in Self::statement_starts(sql) {
            match Self::split_keyword(start) {
                Some(_) if !Self::is_read_only_statement(start) => return false,
                Some(_) => found = true,
                None => {}
            }
        }
        found
    }

    /// Checks whether any possible statement start is transaction control.
    pub fn has_transaction_control(sql: &str) -> bool {
        Self::statement_starts(sql).any(|start| {
            Self::leading_keyword(start)
                .is_some_and(|keyword| TRANSACTION_KEYWORDS.contains(&keyword.as_str()))
        })
    }

    fn is_read_only_statement(stmt: &str) -> bool {
        match Self::split_keyword(stmt) {
            Some((keyword, rest)) if keyword == "EXPLAIN" => match Self::split_keyword(rest) {
                Some((inner, tail)) if inner == "ANALYZE" => Self::is_read_only_statement(tail),
                Some(_) => true,
                None => false,
            },
            Some((keyword, rest)) if keyword == "WITH" => !Self::mentions_write(rest),
            Some((keyword, _)) => READ_ONLY_KEYWORDS.contains(&keyword.as_str()),
            None => false,
        }
    }

    fn mentions_write(sql: &str) -> bool {
        sql.split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
            .any(|word| WRITE_KEYWORDS.iter().any(|kw| kw.eq_ignore_ascii_case(word)))
    }

    fn split_keyword(sql: &str) -> Option<(String, &str)> {
        let mut rest = sql;
        loop {
            rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '(');
            if let Some(after) = rest.strip_prefix("--") {
                rest = after.split_once('\n').map(|(_, tail)| tail).unwrap_or("");
            } else if let Some(after) = rest.strip_prefix("/*") {
                rest = skip_block_comment(after);
            } else {
                break;
            }
        }

        let len = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        if len == 0 {
            return None;
        }
        Some((rest[..len].to_ascii_uppercase(), &rest[len..]))
    }
}

/// Returns the text after the block comment whose opening `/*` precedes
/// `body`. Block comments nest; an unterminated comment consumes everything.
fn skip_block_comment(body: &str) -> &str {
    let bytes = body.as_bytes();
    let mut depth = 1;
    let mut i = 0;
    while i + 1 < bytes.len() {
        match (bytes[i], bytes[i + 1]) {
            (b'/', b'*') => {
                depth += 1;
                i += 2;
            }
            (b'*', b'/') => {
                depth -= 1;
                i += 2;
                if depth == 0 {
                    return &body[i..];
                }
            }
            _ => i += 1,
        }
    }
    ""
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_is_read_only() {
        assert!(SqlClassifier::is_read_only("SELECT 42 as test"));
        assert!(SqlClassifier::is_read_only("  select * from t"));
        assert!(SqlClassifier::is_read_only("WITH x AS (SELECT 1) SELECT * FROM x"));
        assert!(SqlClassifier::is_read_only("(SELECT 1) UNION (SELECT 2)"));
        assert!(SqlClassifier::is_read_only("FROM t"));
    }

    #[test]
    fn test_writes_are_not_read_only() {
        assert!(!SqlClassifier::is_read_only("INSERT INTO t VALUES (1)"));
        assert!(!SqlClassifier::is_read_only("CREATE TABLE t (x INT)"));
        assert!(!SqlClassifier::is_read_only("update t set x = 1"));
        assert!(!SqlClassifier::is_read_only(
            "WITH x AS (SELECT 1 AS v) INSERT INTO t SELECT v FROM x"
        ));
        assert!(!SqlClassifier::is_read_only(""));
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            SqlClassifier::leading_keyword("-- note\n/* block */ select 1").as_deref(),
            Some("SELECT")
        );
        assert!(!SqlClassifier::is_read_only("/* SELECT */ DELETE FROM t"));
    }

    #[test]
    fn test_block_comments_nest() {
        assert_eq!(
            SqlClassifier::leading_keyword("/* a /* SELECT */ b */ INSERT INTO t VALUES (1)")
                .as_deref(),
            Some("INSERT")
        );
        assert_eq!(SqlClassifier::leading_keyword("/* open /* */ SELECT 1"), None);
    }

    #[test]
    fn test_explain_analyze_follows_inner_statement() {
        assert!(SqlClassifier::is_read_only("EXPLAIN SELECT 1"));
        assert!(SqlClassifier::is_read_only("EXPLAIN ANALYZE SELECT 1"));
        assert!(!SqlClassifier::is_read_only("EXPLAIN ANALYZE INSERT INTO t VALUES (1)"));
    }

    #[test]
    fn test_statement_starts_follow_every_semicolon() {
        let starts: Vec<&str> = SqlClassifier::statement_starts("SELECT ';'; X").collect();
        assert_eq!(starts, ["SELECT ';'; X", "'; X", " X"]);
    }

    #[test]
    fn test_trailing_write_is_not_read_only() {
        assert!(!SqlClassifier::is_read_only("SELECT 1 AS k; INSERT INTO t VALUES (1)"));
        assert!(SqlClassifier::is_read_only("SELECT 1; SELECT 2;"));
        assert!(SqlClassifier::is_read_only("SELECT 1; -- done"));
        assert!(!SqlClassifier::is_read_only(" ; -- nothing"));
    }

    #[test]
    fn test_quoting_cannot_hide_a_write() {
        // Escape strings and tagged dollar quotes end where a plain lexer
        // would still be inside the literal.
        assert!(!SqlClassifier::is_read_only(
            "SELECT E'\\''; INSERT INTO t VALUES (1); -- '"
        ));
        assert!(!SqlClassifier::is_read_only(
            "SELECT $a$ $$ $a$; INSERT INTO t VALUES (1); SELECT $a$ $$ $a$"
        ));
        assert!(!SqlClassifier::is_read_only(
            "SELECT 1; /* ; */ INSERT INTO t VALUES (1)"
        ));
        // A semicolon inside a plain literal is treated as a boundary too.
        assert!(!SqlClassifier::is_read_only("SELECT ';INSERT' AS s"));
    }

    #[test]
    fn test_transaction_control() {
        assert!(SqlClassifier::has_transaction_control("BEGIN TRANSACTION"));
        assert!(SqlClassifier::has_transaction_control("INSERT INTO t VALUES (1); commit"));
        assert!(!SqlClassifier::has_transaction_control("SELECT 'BEGIN'"));
        assert!(!SqlClassifier::has_transaction_control(
            "SELECT CASE WHEN x THEN 1 END FROM t"
        ));
    }

    #[test]
    fn test_quoting_cannot_hide_transaction_control() {
        assert!(SqlClassifier::has_transaction_control(
            "SELECT E'\\''; BEGIN TRANSACTION; -- '"
        ));
        assert!(SqlClassifier::has_transaction_control(
            "SELECT E'\\''; ROLLBACK; -- '"
        ));
        assert!(SqlClassifier::has_transaction_control(
            "SELECT $x$ $$ $x$; COMMIT; SELECT $x$ $$ $x$"
        ));
        assert!(SqlClassifier::has_transaction_control(
            "SELECT 1; /* ; */ ROLLBACK"
        ));
    }
}
