//! Render data and the evaluation scope built from it

use serde::Serialize;
use serde_json::{Map, Value};

use super::error::RenderError;

/// String-keyed data handed to a render call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    values: Map<String, Value>,
}

impl Context {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Set a variable, builder style
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Build a context from any value that serializes to a map
    pub fn from_serialize<T: Serialize>(data: &T) -> Result<Self, RenderError> {
        let value =
            serde_json::to_value(data).map_err(|e| RenderError::InvalidContext(e.to_string()))?;
        Self::from_value(value)
    }

    /// Build a context from a JSON object
    pub fn from_json_str(json: &str) -> Result<Self, RenderError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| RenderError::InvalidContext(e.to_string()))?;
        Self::from_value(value)
    }

    fn from_value(value: Value) -> Result<Self, RenderError> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            other => Err(RenderError::InvalidContext(format!(
                "expected an object, got {}",
                kind(&other)
            ))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The whole context as one JSON object
    pub fn to_value(&self) -> Value {
        Value::Object(self.values.clone())
    }

    /// Bind the data into a scope shared, read-only, by every template of
    /// one render chain
    pub fn bind(&self) -> Scope<'_> {
        Scope {
            values: &self.values,
        }
    }
}

impl From<Map<String, Value>> for Context {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ctx = Context::new();
        for (k, v) in iter {
            ctx.insert(k, v);
        }
        ctx
    }
}

/// Read-only view of render data used during evaluation
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    values: &'a Map<String, Value>,
}

impl<'a> Scope<'a> {
    /// Resolve a dotted path; numeric segments index into arrays
    pub fn lookup(&self, path: &[String]) -> Option<&'a Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.values.get(first)?;
        for segment in rest {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

/// Text form of a value as written into template output
pub fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(p: &str) -> Vec<String> {
        p.split('.').map(String::from).collect()
    }

    #[test]
    fn test_lookup_nested_and_indexed() {
        let ctx = Context::from_serialize(&json!({
            "user": { "name": "Ada", "roles": ["admin", "dev"] }
        }))
        .unwrap();
        let scope = ctx.bind();
        assert_eq!(scope.lookup(&path("user.name")), Some(&json!("Ada")));
        assert_eq!(scope.lookup(&path("user.roles.1")), Some(&json!("dev")));
        assert_eq!(scope.lookup(&path("user.roles.9")), None);
        assert_eq!(scope.lookup(&path("user.name.first")), None);
        assert_eq!(scope.lookup(&path("missing")), None);
    }

    #[test]
    fn test_builder_and_from_iter() {
        let ctx = Context::new().with("a", 1).with("b", "two");
        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx.get("b"), Some(&json!("two")));

        let collected: Context = vec![("x", true)].into_iter().collect();
        assert_eq!(collected.get("x"), Some(&json!(true)));
    }

    #[test]
    fn test_from_serialize_struct() {
        #[derive(Serialize)]
        struct Page {
            title: String,
            views: u32,
        }
        let ctx = Context::from_serialize(&Page {
            title: "Home".into(),
            views: 3,
        })
        .unwrap();
        assert_eq!(ctx.get("views"), Some(&json!(3)));
    }

    #[test]
    fn test_non_object_data_is_rejected() {
        assert!(matches!(
            Context::from_json_str("[1, 2]"),
            Err(RenderError::InvalidContext(msg)) if msg.contains("an array")
        ));
        assert!(Context::from_json_str("{not json").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(display(&json!(null)), "");
        assert_eq!(display(&json!(false)), "false");
        assert_eq!(display(&json!(42)), "42");
        assert_eq!(display(&json!(2.5)), "2.5");
        assert_eq!(display(&json!("text")), "text");
        assert_eq!(display(&json!([1, "a"])), r#"[1,"a"]"#);
        assert_eq!(display(&json!({"k": 1})), r#"{"k":1}"#);
    }
}
