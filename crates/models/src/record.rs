use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ModelError;

/// Content-kind tag stored alongside every route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Json,
    Html,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Json => "json",
            ContentKind::Html => "html",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(ContentKind::Json),
            "html" => Ok(ContentKind::Html),
            _ => Err(ModelError::Validation("Type must be either 'json' or 'html'".into())),
        }
    }
}

/// Payload of a route, tagged by kind.
///
/// Serializes as `{"type": "...", "content": ...}`, which is both the
/// persisted file layout and the admin API wire shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum RouteContent {
    Json(Value),
    Html(String),
}

impl RouteContent {
    pub fn kind(&self) -> ContentKind {
        match self {
            RouteContent::Json(_) => ContentKind::Json,
            RouteContent::Html(_) => ContentKind::Html,
        }
    }

    /// Build from an already-decoded value without reinterpreting strings.
    pub fn from_parts(kind: ContentKind, content: Value) -> Result<Self, ModelError> {
        match (kind, content) {
            (ContentKind::Json, v) => Ok(RouteContent::Json(v)),
            (ContentKind::Html, Value::String(s)) => Ok(RouteContent::Html(s)),
            (ContentKind::Html, _) => Err(ModelError::Validation("HTML content must be a string".into())),
        }
    }

    /// Build from an admin request body.
    ///
    /// JSON content supplied as a string is parsed; any other JSON value is
    /// taken as-is. HTML content is kept byte-for-byte.
    pub fn from_input(kind: ContentKind, content: Value) -> Result<Self, ModelError> {
        match (kind, content) {
            (ContentKind::Json, Value::String(s)) => serde_json::from_str(&s)
                .map(RouteContent::Json)
                .map_err(|_| ModelError::Validation("Invalid JSON format".into())),
            (kind, v) => Self::from_parts(kind, v),
        }
    }

    /// JSON text for the relational `content` column. HTML is stored as a
    /// JSON string literal so the column always holds JSON.
    pub fn to_column_text(&self) -> Result<String, ModelError> {
        let text = match self {
            RouteContent::Json(v) => serde_json::to_string(v),
            RouteContent::Html(s) => serde_json::to_string(s),
        };
        text.map_err(|e| ModelError::Decode(e.to_string()))
    }

    pub fn from_column(kind: &str, text: &str) -> Result<Self, ModelError> {
        let kind = ContentKind::from_str(kind)
            .map_err(|_| ModelError::Decode(format!("unknown content kind {kind:?}")))?;
        let value: Value = serde_json::from_str(text).map_err(|e| ModelError::Decode(e.to_string()))?;
        Self::from_parts(kind, value).map_err(|e| ModelError::Decode(e.to_string()))
    }
}

/// A route key together with its payload.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ContentRecord {
    pub route: String,
    #[serde(flatten)]
    pub content: RouteContent,
}

impl ContentRecord {
    pub fn new(route: &str, content: RouteContent) -> Self {
        Self { route: normalize_route(route), content }
    }

    pub fn kind(&self) -> ContentKind {
        self.content.kind()
    }
}

/// Prefix `route` with `/` unless it already starts with one.
pub fn normalize_route(route: &str) -> String {
    if route.starts_with('/') {
        route.to_string()
    } else {
        format!("/{route}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_route_adds_single_leading_slash() {
        assert_eq!(normalize_route("test"), "/test");
        assert_eq!(normalize_route("/test"), "/test");
        assert_eq!(normalize_route("a/b"), "/a/b");
        assert_eq!(normalize_route(""), "/");
    }

    #[test]
    fn kind_parses_only_known_tags() {
        assert_eq!("json".parse::<ContentKind>().unwrap(), ContentKind::Json);
        assert_eq!("html".parse::<ContentKind>().unwrap(), ContentKind::Html);
        assert!("xml".parse::<ContentKind>().is_err());
        assert!("JSON".parse::<ContentKind>().is_err());
    }

    #[test]
    fn json_input_string_is_parsed() {
        let c = RouteContent::from_input(ContentKind::Json, json!("{\"a\":1}")).unwrap();
        assert_eq!(c, RouteContent::Json(json!({"a": 1})));

        let err = RouteContent::from_input(ContentKind::Json, json!("{not json")).unwrap_err();
        assert_eq!(err.to_string(), "validation error: Invalid JSON format");
    }

    #[test]
    fn json_input_value_is_kept() {
        let c = RouteContent::from_input(ContentKind::Json, json!([1, 2, 3])).unwrap();
        assert_eq!(c, RouteContent::Json(json!([1, 2, 3])));
    }

    #[test]
    fn html_input_is_verbatim_and_must_be_string() {
        let html = "<h1>Hi</h1>  <not-closed";
        let c = RouteContent::from_input(ContentKind::Html, json!(html)).unwrap();
        assert_eq!(c, RouteContent::Html(html.to_string()));
        assert!(RouteContent::from_input(ContentKind::Html, json!({"a": 1})).is_err());
    }

    #[test]
    fn column_text_keeps_both_kinds() {
        let html = RouteContent::Html("<p>\"quoted\"</p>".into());
        let text = html.to_column_text().unwrap();
        assert_eq!(text, "\"<p>\\\"quoted\\\"</p>\"");
        assert_eq!(RouteContent::from_column("html", &text).unwrap(), html);

        let doc = RouteContent::Json(json!({"nested": {"x": [true, null]}}));
        let text = doc.to_column_text().unwrap();
        assert_eq!(RouteContent::from_column("json", &text).unwrap(), doc);
    }

    #[test]
    fn corrupt_column_is_a_decode_error() {
        assert!(matches!(RouteContent::from_column("json", "{oops"), Err(ModelError::Decode(_))));
        assert!(matches!(RouteContent::from_column("html", "{\"a\":1}"), Err(ModelError::Decode(_))));
        assert!(matches!(RouteContent::from_column("xml", "1"), Err(ModelError::Decode(_))));
    }

    #[test]
    fn record_serializes_with_type_tag() {
        let rec = ContentRecord::new("page", RouteContent::Html("<b>x</b>".into()));
        assert_eq!(
            serde_json::to_value(&rec).unwrap(),
            json!({"route": "/page", "type": "html", "content": "<b>x</b>"})
        );
        assert_eq!(rec.kind(), ContentKind::Html);
    }
}
