//! MySQL filename escaping.
//!
//! The server stores table files under names where every character outside
//! `[0-9A-Za-z_]` is escaped as `@xxxx`, four lowercase hex digits of the
//! UCS-2 code unit. `db@002ename.frm` on disk is table `db.name`.

/// Decode a filesystem name back into the table name it encodes.
pub fn filename_to_tablename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.char_indices();
    while let Some((idx, c)) = chars.next() {
        if c == '@' {
            if let Some(decoded) = decode_escape(&name[idx + 1..]) {
                out.push(decoded);
                // consume the four hex digits
                for _ in 0..4 {
                    chars.next();
                }
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Encode a table name the way the server names its files.
pub fn tablename_to_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else {
            out.push_str(&format!("@{:04x}", c as u32));
        }
    }
    out
}

fn decode_escape(rest: &str) -> Option<char> {
    let hex = rest.get(..4)?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    char::from_u32(u32::from_str_radix(hex, 16).ok()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_pass_through() {
        assert_eq!(filename_to_tablename("orders_2014"), "orders_2014");
        assert_eq!(tablename_to_filename("orders_2014"), "orders_2014");
    }

    #[test]
    fn escapes_round_trip() {
        assert_eq!(filename_to_tablename("t@002d1"), "t-1");
        assert_eq!(tablename_to_filename("t-1"), "t@002d1");
        assert_eq!(filename_to_tablename("a@0024b"), "a$b");
        assert_eq!(tablename_to_filename("a$b"), "a@0024b");
    }

    #[test]
    fn bare_at_is_escaped() {
        assert_eq!(tablename_to_filename("a@b"), "a@0040b");
        assert_eq!(filename_to_tablename("a@0040b"), "a@b");
    }

    #[test]
    fn truncated_escape_is_literal() {
        assert_eq!(filename_to_tablename("x@00"), "x@00");
    }
}
