use std::collections::BTreeMap;

use serde_json::Value;

/// One materialized result row: column name to value.
///
/// Values are JSON-typed because drivers disagree on wire types: MySQL
/// clients commonly hand back numeric columns as strings. The accessors
/// below normalize both shapes.
pub type Row = BTreeMap<String, Value>;

/// String view of a column. Returns `None` for missing or non-string values.
pub fn str_field<'a>(row: &'a Row, column: &str) -> Option<&'a str> {
    row.get(column).and_then(Value::as_str)
}

/// Integer view of a column. Accepts JSON numbers and numeric strings;
/// returns `None` for missing columns, nulls, and anything unparseable.
pub fn i64_field(row: &Row, column: &str) -> Option<i64> {
    match row.get(column)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row() -> Row {
        let mut r = Row::new();
        r.insert("id".into(), json!(315));
        r.insert("cmid".into(), json!("24161"));
        r.insert("url".into(), json!("player.php?id=315&scoid=26"));
        r.insert("sco_id".into(), Value::Null);
        r
    }

    #[test]
    fn i64_from_number_and_string() {
        let r = row();
        assert_eq!(i64_field(&r, "id"), Some(315));
        assert_eq!(i64_field(&r, "cmid"), Some(24161));
    }

    #[test]
    fn null_and_missing_are_none() {
        let r = row();
        assert_eq!(i64_field(&r, "sco_id"), None);
        assert_eq!(i64_field(&r, "nope"), None);
        assert_eq!(str_field(&r, "sco_id"), None);
    }

    #[test]
    fn str_field_reads_strings_only() {
        let r = row();
        assert_eq!(str_field(&r, "url"), Some("player.php?id=315&scoid=26"));
        assert_eq!(str_field(&r, "id"), None);
    }
}
