//! Deferred index creation: rewrite a `CREATE TABLE` so secondary indexes
//! (and optionally foreign keys) are created by a post-load `ALTER TABLE`
//! instead, letting InnoDB build them with fast sorted builds.

/// Locate the `CREATE TABLE` statement inside a table-definition block.
/// The statement runs from `CREATE TABLE` to the first line ending in `;`.
pub fn extract_create_table(block: &str) -> Option<&str> {
    let start = block.find("CREATE TABLE")?;
    let rest = &block[start..];
    let mut consumed = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end().ends_with(';') {
            let end = consumed + line.rfind(';').unwrap_or(line.len() - 1) + 1;
            return Some(&rest[..end]);
        }
        consumed += line.len();
    }
    Some(rest)
}

/// Split the clause list of a table body on top-level commas, respecting
/// parenthesis nesting, backtick quoting and string literals.
fn split_clauses(body: &str) -> Vec<&str> {
    let mut clauses = Vec::new();
    let mut depth = 0usize;
    let mut in_backtick = false;
    let mut in_string: Option<char> = None;
    let mut start = 0;
    let mut prev = '\0';
    for (idx, c) in body.char_indices() {
        if let Some(quote) = in_string {
            if c == quote && prev != '\\' {
                in_string = None;
            }
        } else if in_backtick {
            if c == '`' {
                in_backtick = false;
            }
        } else {
            match c {
                '`' => in_backtick = true,
                '\'' | '"' => in_string = Some(c),
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    clauses.push(&body[start..idx]);
                    start = idx + 1;
                }
                _ => {}
            }
        }
        prev = c;
    }
    clauses.push(&body[start..]);
    clauses
}

/// First backtick-quoted token of a clause.
fn backtick_token(clause: &str) -> Option<&str> {
    let start = clause.find('`')?;
    let end = clause[start + 1..].find('`')?;
    Some(&clause[start + 1..start + 1 + end])
}

/// Column names referenced by a key clause, prefix lengths stripped.
fn key_columns(clause: &str) -> Vec<&str> {
    let Some(open) = clause.find('(') else {
        return Vec::new();
    };
    let Some(close) = clause.rfind(')') else {
        return Vec::new();
    };
    if close <= open {
        return Vec::new();
    }
    clause[open + 1..close]
        .split(',')
        .map(|part| {
            let part = part.trim();
            let part = part.trim_start_matches('`');
            match part.find('`') {
                Some(end) => &part[..end],
                // unquoted column, possibly with a prefix length
                None => part.split('(').next().unwrap_or(part).trim(),
            }
        })
        .collect()
}

fn is_key_clause(clause: &str) -> bool {
    ["KEY", "UNIQUE", "FULLTEXT", "SPATIAL", "INDEX"]
        .iter()
        .any(|kw| clause.starts_with(kw))
}

/// Rewrite `ddl` so only the column list, the primary key, and any key
/// covering an `AUTO_INCREMENT` column remain; everything deferred moves
/// to the returned `ALTER TABLE`. Returns `(None, ddl)` untouched when
/// nothing can be deferred.
pub fn split_indexes(ddl: &str, defer_constraints: bool) -> (Option<String>, String) {
    let Some(open) = ddl.find('(') else {
        return (None, ddl.to_string());
    };
    let Some(close) = matching_paren(ddl, open) else {
        return (None, ddl.to_string());
    };
    let header = &ddl[..open + 1];
    let body = &ddl[open + 1..close];
    let tail = &ddl[close..];

    let Some(table) = backtick_token(header) else {
        return (None, ddl.to_string());
    };

    let clauses = split_clauses(body);

    // Keys that cover an AUTO_INCREMENT column cannot be deferred; InnoDB
    // requires the auto-increment column to be an index prefix.
    let auto_increment: Vec<&str> = clauses
        .iter()
        .filter(|clause| {
            clause.trim_start().starts_with('`') && clause.contains("AUTO_INCREMENT")
        })
        .filter_map(|clause| backtick_token(clause))
        .collect();

    let mut kept: Vec<&str> = Vec::new();
    let mut deferred: Vec<&str> = Vec::new();
    for clause in &clauses {
        let trimmed = clause.trim_start();
        if trimmed.starts_with("PRIMARY KEY") {
            kept.push(clause);
        } else if trimmed.starts_with("CONSTRAINT") {
            if defer_constraints && trimmed.contains("FOREIGN KEY") {
                deferred.push(clause);
            } else {
                kept.push(clause);
            }
        } else if is_key_clause(trimmed) {
            let covers_auto_increment = key_columns(trimmed)
                .iter()
                .any(|column| auto_increment.contains(column));
            if covers_auto_increment {
                kept.push(clause);
            } else {
                deferred.push(clause);
            }
        } else {
            kept.push(clause);
        }
    }

    if deferred.is_empty() {
        return (None, ddl.to_string());
    }

    let additions = deferred
        .iter()
        .map(|clause| clause.trim())
        .collect::<Vec<_>>()
        .join(", ADD ");
    let alter = format!("ALTER TABLE `{table}` ADD {additions};");

    let mut new_body = kept.join(",");
    if !new_body.ends_with('\n') {
        new_body.push('\n');
    }
    (Some(alter), format!("{header}{new_body}{tail}"))
}

fn matching_paren(s: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_backtick = false;
    let mut in_string: Option<char> = None;
    let mut prev = '\0';
    for (idx, c) in s[open..].char_indices() {
        if let Some(quote) = in_string {
            if c == quote && prev != '\\' {
                in_string = None;
            }
        } else if in_backtick {
            if c == '`' {
                in_backtick = false;
            }
        } else {
            match c {
                '`' => in_backtick = true,
                '\'' | '"' => in_string = Some(c),
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(open + idx);
                    }
                }
                _ => {}
            }
        }
        prev = c;
    }
    None
}
