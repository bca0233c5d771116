//! Document model shared by every store backend.
//!
//! A document is a JSON object whose identifier lives under [`ID_FIELD`].
//! Nested fields are addressed with dotted paths such as `fitness.score`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Key under which every document stores its identifier.
pub const ID_FIELD: &str = "_id";

/// A stored document.
pub type Document = Map<String, Value>;

/// Globally unique document identifier, assigned on insert and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(Ulid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Reads the identifier stored in a document, if any.
    pub fn from_document(document: &Document) -> Option<Self> {
        document.get(ID_FIELD)?.as_str()?.parse().ok()
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for DocumentId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Which documents a query touches.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Filter {
    #[default]
    All,
    /// Documents where the dotted path is present.
    Exists(String),
}

impl Filter {
    pub fn exists(path: impl Into<String>) -> Self {
        Filter::Exists(path.into())
    }

    pub fn matches(&self, document: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Exists(path) => lookup(document, path).is_some(),
        }
    }
}

/// Filtered, projected, sorted and limited find.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filter: Filter,
    /// Fields to keep besides `_id`; `None` keeps the whole document.
    pub projection: Option<Vec<String>>,
    pub sort: Option<(String, SortDirection)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn project<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn sort_by(mut self, path: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some((path.into(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Runs the query over an arbitrary set of documents.
    pub fn apply<'a, I>(&self, documents: I) -> Vec<Document>
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut matched: Vec<&Document> = documents
            .into_iter()
            .filter(|doc| self.filter.matches(doc))
            .collect();

        if let Some((path, direction)) = &self.sort {
            matched.sort_by(|a, b| {
                let by_key = compare_values(lookup(a, path), lookup(b, path));
                let by_key = match direction {
                    SortDirection::Ascending => by_key,
                    SortDirection::Descending => by_key.reverse(),
                };
                by_key.then_with(|| DocumentId::from_document(a).cmp(&DocumentId::from_document(b)))
            });
        }

        let limit = self.limit.unwrap_or(usize::MAX);
        matched
            .into_iter()
            .take(limit)
            .map(|doc| match &self.projection {
                Some(fields) => project(doc, fields),
                None => doc.clone(),
            })
            .collect()
    }
}

/// Resolves a dotted path inside a document.
pub fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = document.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// Copies `_id` and the requested paths into a new document.
pub fn project(document: &Document, fields: &[String]) -> Document {
    let mut projected = Document::new();
    if let Some(id) = document.get(ID_FIELD) {
        projected.insert(ID_FIELD.to_string(), id.clone());
    }
    for path in fields {
        if let Some(value) = lookup(document, path) {
            insert_path(&mut projected, path, value.clone());
        }
    }
    projected
}

fn insert_path(document: &mut Document, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            document.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = document
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(map) = child {
                insert_path(map, rest, value);
            }
        }
    }
}

/// Missing and null values order before numbers, numbers before strings.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None | Some(Value::Null) => 0,
            Some(Value::Number(_)) => 1,
            Some(Value::String(_)) => 2,
            Some(_) => 3,
        }
    }

    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_lookup_nested_path() {
        let d = doc(json!({"fitness": {"score": 1.5}, "wins": 2}));
        assert_eq!(lookup(&d, "fitness.score"), Some(&json!(1.5)));
        assert_eq!(lookup(&d, "wins"), Some(&json!(2)));
        assert_eq!(lookup(&d, "fitness.date"), None);
        assert_eq!(lookup(&d, "wins.count"), None);
    }

    #[test]
    fn test_projection_keeps_id_and_nested_fields() {
        let d = doc(json!({"_id": "x", "fitness": {"score": 1.5, "artifact": [1, 2]}, "wins": 2}));
        let p = project(&d, &["fitness.score".to_string()]);
        assert_eq!(Value::Object(p), json!({"_id": "x", "fitness": {"score": 1.5}}));
    }

    #[test]
    fn test_sort_puts_missing_first_ascending_and_last_descending() {
        let a = doc(json!({"_id": DocumentId::new().to_string(), "score": 2.0}));
        let b = doc(json!({"_id": DocumentId::new().to_string()}));
        let c = doc(json!({"_id": DocumentId::new().to_string(), "score": -1.0}));
        let all = vec![a, b, c];

        let up = Query::new().sort_by("score", SortDirection::Ascending).apply(&all);
        let scores: Vec<_> = up.iter().map(|d| d.get("score").cloned()).collect();
        assert_eq!(scores, vec![None, Some(json!(-1.0)), Some(json!(2.0))]);

        let down = Query::new().sort_by("score", SortDirection::Descending).apply(&all);
        let scores: Vec<_> = down.iter().map(|d| d.get("score").cloned()).collect();
        assert_eq!(scores, vec![Some(json!(2.0)), Some(json!(-1.0)), None]);
    }

    #[test]
    fn test_exists_filter_and_limit() {
        let all = vec![
            doc(json!({"_id": "a", "wins": 3})),
            doc(json!({"_id": "b"})),
            doc(json!({"_id": "c", "wins": 5})),
        ];
        let found = Query::new()
            .filter(Filter::exists("wins"))
            .sort_by("wins", SortDirection::Descending)
            .limit(1)
            .apply(&all);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get("wins"), Some(&json!(5)));
    }
}
