use serde::Serialize;
use serde_json::{Map, Value};

/// Field names checked, in order, for the new public link.
const LINK_FIELDS: [&str; 3] = ["short_link", "link", "url"];

/// Body of a TeraBox API response.
///
/// The service does not always answer with JSON (captcha pages, login
/// redirects), so a body that is not a JSON object is kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum ShareResponse {
    Structured(Map<String, Value>),
    Raw(String),
}

impl ShareResponse {
    pub fn from_body(body: String) -> Self {
        match serde_json::from_str::<Value>(&body) {
            Ok(Value::Object(map)) => ShareResponse::Structured(map),
            _ => ShareResponse::Raw(body),
        }
    }

    fn as_map(&self) -> Option<&Map<String, Value>> {
        match self {
            ShareResponse::Structured(map) => Some(map),
            ShareResponse::Raw(_) => None,
        }
    }

    /// Value of the `errno` field, when present.
    pub fn errno(&self) -> Option<i64> {
        self.as_map()?.get("errno")?.as_i64()
    }

    /// File ids of the items a save call copied.
    ///
    /// An `info` array wins; each item contributes its `fs_id` when set.
    /// Otherwise a top-level `fs_id` is used on its own.
    pub fn file_ids(&self) -> Vec<FileId> {
        let Some(map) = self.as_map() else {
            return Vec::new();
        };
        match map.get("info") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| item.get("fs_id").and_then(FileId::from_value))
                .collect(),
            _ => map
                .get("fs_id")
                .and_then(FileId::from_value)
                .into_iter()
                .collect(),
        }
    }

    /// Public link from a create-share response.
    ///
    /// Only the first of `short_link`, `link`, `url` present in the body is
    /// looked at; an empty or non-string value there means no link.
    pub fn share_link(&self) -> Option<&str> {
        let map = self.as_map()?;
        let value = LINK_FIELDS.iter().find_map(|key| map.get(*key))?;
        value.as_str().filter(|link| !link.is_empty())
    }
}

/// Identifier of a file in the user's TeraBox account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FileId {
    Number(u64),
    Text(String),
}

impl FileId {
    /// Accepts non-zero numbers and non-empty strings.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_u64().filter(|id| *id != 0).map(FileId::Number),
            Value::String(s) if !s.is_empty() => Some(FileId::Text(s.clone())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn structured(value: Value) -> ShareResponse {
        match value {
            Value::Object(map) => ShareResponse::Structured(map),
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn body_parsing_falls_back_to_raw() {
        assert!(matches!(
            ShareResponse::from_body(r#"{"errno":0}"#.into()),
            ShareResponse::Structured(_)
        ));
        assert_eq!(
            ShareResponse::from_body("<html>login</html>".into()),
            ShareResponse::Raw("<html>login</html>".into())
        );
        assert_eq!(
            ShareResponse::from_body("[1,2]".into()),
            ShareResponse::Raw("[1,2]".into())
        );
    }

    #[test]
    fn empty_object_is_structured_not_failure() {
        let resp = ShareResponse::from_body("{}".into());
        assert_eq!(resp, ShareResponse::Structured(Map::new()));
        assert!(resp.file_ids().is_empty());
    }

    #[test]
    fn file_ids_come_from_info_items() {
        let resp = structured(json!({
            "errno": 0,
            "info": [
                {"fs_id": 111, "path": "/a"},
                {"path": "/b"},
                {"fs_id": 0},
                {"fs_id": "222"}
            ],
            "fs_id": 999
        }));
        assert_eq!(
            resp.file_ids(),
            vec![FileId::Number(111), FileId::Text("222".into())]
        );
        assert_eq!(resp.errno(), Some(0));
    }

    #[test]
    fn empty_info_list_does_not_fall_back() {
        let resp = structured(json!({"info": [], "fs_id": 5}));
        assert!(resp.file_ids().is_empty());
    }

    #[test]
    fn non_list_info_falls_back_to_top_level() {
        let resp = structured(json!({"info": "n/a", "fs_id": 5}));
        assert_eq!(resp.file_ids(), vec![FileId::Number(5)]);
        let resp = structured(json!({"fs_id": null}));
        assert!(resp.file_ids().is_empty());
    }

    #[test]
    fn raw_bodies_carry_nothing() {
        let resp = ShareResponse::Raw("fs_id short_link".into());
        assert!(resp.file_ids().is_empty());
        assert_eq!(resp.share_link(), None);
        assert_eq!(resp.errno(), None);
    }

    #[test]
    fn share_link_uses_priority_order() {
        let resp = structured(json!({"url": "u", "link": "l", "short_link": "s"}));
        assert_eq!(resp.share_link(), Some("s"));
        let resp = structured(json!({"url": "u", "link": "l"}));
        assert_eq!(resp.share_link(), Some("l"));
        let resp = structured(json!({"url": "u"}));
        assert_eq!(resp.share_link(), Some("u"));
    }

    #[test]
    fn first_present_field_decides() {
        let resp = structured(json!({"short_link": "", "link": "l"}));
        assert_eq!(resp.share_link(), None);
        let resp = structured(json!({"short_link": null, "url": "u"}));
        assert_eq!(resp.share_link(), None);
        let resp = structured(json!({"errno": 0}));
        assert_eq!(resp.share_link(), None);
    }

    #[test]
    fn file_ids_serialize_untagged() {
        let ids = vec![FileId::Number(1), FileId::Text("2".into())];
        assert_eq!(serde_json::to_string(&ids).unwrap(), r#"[1,"2"]"#);
    }
}
