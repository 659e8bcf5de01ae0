/// Query-string builder for list endpoints. Parameters without a value are dropped
/// instead of being sent empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self { Self::default() }

    pub fn push(mut self, key: &str, value: impl ToString) -> Self {
        let v = value.to_string();
        if !v.trim().is_empty() {
            self.pairs.push((key.to_string(), v));
        }
        self
    }

    pub fn opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.push(key, v),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool { self.pairs.is_empty() }

    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omits_missing_and_blank_values() {
        let q = QueryParams::new()
            .opt("search", Some("ali"))
            .opt::<i64>("departmentId", None)
            .push("status", "")
            .push("note", "   ")
            .opt("page", Some(2));
        assert_eq!(q.to_query_string(), "search=ali&page=2");
    }

    #[test]
    fn encodes_values() {
        let q = QueryParams::new().push("search", "a b&c").push("nameAr", "مهندسة");
        assert_eq!(q.to_query_string(), "search=a%20b%26c&nameAr=%D9%85%D9%87%D9%86%D8%AF%D8%B3%D8%A9");
        assert!(QueryParams::new().is_empty());
    }
}
