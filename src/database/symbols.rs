// Symbol and call-site queries backing the call graph

use super::*;
use rusqlite::{OptionalExtension, params};

use super::helpers::{CALL_COLUMNS, SYMBOL_COLUMNS};

/// Escape LIKE wildcards so identifiers containing `_` or `%` match literally
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// True when `target` names `symbol` exactly or through a qualified suffix
pub fn target_matches(target: &str, symbol: &str) -> bool {
    if target == symbol {
        return true;
    }
    [".", "::"].iter().any(|sep| {
        target
            .strip_suffix(symbol)
            .is_some_and(|prefix| prefix.ends_with(sep))
    })
}

impl ContentStore {
    /// Calls whose target is `symbol` or ends in `.symbol` / `::symbol`, by path then line
    pub fn calls_matching_target(&self, symbol: &str) -> Result<Vec<StoredCall>> {
        let escaped = escape_like(symbol);
        let query = format!(
            "SELECT {} FROM calls
             WHERE target = ?1
                OR target LIKE ?2 ESCAPE '\\'
                OR target LIKE ?3 ESCAPE '\\'
             ORDER BY path, line, target",
            CALL_COLUMNS
        );

        let mut stmt = self.conn.prepare(&query).during("prepare incoming calls")?;
        let calls = stmt
            .query_map(
                params![symbol, format!("%.{}", escaped), format!("%::{}", escaped)],
                Self::row_to_call,
            )
            .during("query incoming calls")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .during("read incoming calls")?;

        // LIKE is case-insensitive for ASCII; re-check exactly
        Ok(calls
            .into_iter()
            .filter(|call| target_matches(&call.target, symbol))
            .collect())
    }

    /// The narrowest function, method or constructor in `path` whose range covers `line`
    ///
    /// Equal spans resolve to the later-starting (more deeply nested) symbol.
    pub fn enclosing_symbol(&self, path: &str, line: usize) -> Result<Option<StoredSymbol>> {
        let query = format!(
            "SELECT {} FROM symbols
             WHERE path = ?1 AND line_start <= ?2 AND line_end >= ?2
               AND kind IN ('function', 'method', 'constructor')
             ORDER BY (line_end - line_start) ASC, line_start DESC
             LIMIT 1",
            SYMBOL_COLUMNS
        );

        self.conn
            .query_row(&query, params![path, line as i64], Self::row_to_symbol)
            .optional()
            .during("resolve enclosing symbol")
    }

    /// Definitions of `name`, optionally restricted to one file
    pub fn find_symbol_definitions(
        &self,
        name: &str,
        path: Option<&str>,
    ) -> Result<Vec<StoredSymbol>> {
        let query = format!(
            "SELECT {} FROM symbols
             WHERE name = ?1 AND (?2 IS NULL OR path = ?2)
             ORDER BY path, line_start",
            SYMBOL_COLUMNS
        );

        let mut stmt = self.conn.prepare(&query).during("prepare symbol lookup")?;
        let symbols = stmt
            .query_map(params![name, path], Self::row_to_symbol)
            .during("query symbol lookup")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .during("read symbol lookup")?;

        Ok(symbols)
    }

    /// Calls made from `path` on lines `start..=end`
    pub fn calls_in_range(&self, path: &str, start: usize, end: usize) -> Result<Vec<StoredCall>> {
        let query = format!(
            "SELECT {} FROM calls
             WHERE path = ?1 AND line >= ?2 AND line <= ?3
             ORDER BY line, target",
            CALL_COLUMNS
        );

        let mut stmt = self.conn.prepare(&query).during("prepare outgoing calls")?;
        let calls = stmt
            .query_map(params![path, start as i64, end as i64], Self::row_to_call)
            .during("query outgoing calls")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .during("read outgoing calls")?;

        Ok(calls)
    }

    pub fn calls_from_file(&self, path: &str) -> Result<Vec<StoredCall>> {
        self.calls_in_range(path, 0, i64::MAX as usize)
    }

    pub fn symbols_in_file(&self, path: &str) -> Result<Vec<StoredSymbol>> {
        let query = format!(
            "SELECT {} FROM symbols WHERE path = ?1 ORDER BY line_start, name",
            SYMBOL_COLUMNS
        );

        let mut stmt = self.conn.prepare(&query).during("prepare file symbols")?;
        let symbols = stmt
            .query_map(params![path], Self::row_to_symbol)
            .during("query file symbols")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .during("read file symbols")?;

        Ok(symbols)
    }

    /// Distinct symbol names, sorted (candidates for fuzzy suggestions)
    pub fn symbol_names(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT name FROM symbols ORDER BY name")
            .during("prepare symbol names")?;

        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .during("query symbol names")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .during("read symbol names")?;

        Ok(names)
    }
}
