use serde_json::Value;

/// A parameterized statement. `?` placeholders in `sql` are bound
/// positionally from `params` by the executor; the engine never interpolates
/// user-controlled text into SQL itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Query {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// A statement with no bound parameters.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn placeholder_count_matches_params() {
        let q = Query::new(
            "SELECT id FROM mdl_user WHERE email = ? AND username = ?",
            vec![json!("a@b.example"), json!("ab")],
        );
        let placeholders = q.sql.matches('?').count();
        assert_eq!(placeholders, q.params.len());
    }
}
