//! Conversion between a collection's persisted `directories` column and the
//! in-memory forest.
//!
//! Older writers stored the column JSON-encoded twice (a JSON string whose
//! content is the JSON array). Decoding peels up to two string layers; any
//! other shape decodes to an empty forest. Encoding always writes one layer.
//!
//! Legacy node shapes (numeric IDs, missing `type`, children on files, stale
//! extensions) are adapted here and nowhere else.

use serde::Deserialize;
use serde_json::Value;
use tracing::{error, warn};
use uuid::Uuid;

use super::node::{Node, NodeKind, Tag};
use super::TAG_COLORS;
use crate::datetime::parse_millis;

/// Number of JSON string layers tolerated around the array.
const MAX_STRING_LAYERS: usize = 2;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    #[serde(default)]
    id: Option<Value>,
    name: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    children: Option<Vec<RawNode>>,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tags: Option<Vec<RawTag>>,
    #[serde(default)]
    collection_id: Option<Value>,
    #[serde(default)]
    created_at: Option<Value>,
    #[serde(default)]
    updated_at: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawTag {
    #[serde(default)]
    id: Option<Value>,
    label: String,
    #[serde(default)]
    color: Option<String>,
}

fn id_from(value: Option<Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.is_empty() => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => Uuid::new_v4().to_string(),
    }
}

fn millis_from(value: Option<Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => parse_millis(&s).unwrap_or(0),
        _ => 0,
    }
}

impl From<RawTag> for Tag {
    fn from(raw: RawTag) -> Self {
        Tag {
            id: id_from(raw.id),
            label: raw.label,
            color: raw.color.unwrap_or_else(|| TAG_COLORS[0].to_string()),
        }
    }
}

impl From<RawNode> for Node {
    fn from(raw: RawNode) -> Self {
        let kind = raw
            .kind
            .as_deref()
            .and_then(|k| k.parse::<NodeKind>().ok())
            .unwrap_or(if raw.children.is_some() {
                NodeKind::Folder
            } else {
                NodeKind::File
            });

        let mut node = Node {
            id: id_from(raw.id),
            name: raw.name,
            kind,
            children: raw
                .children
                .map(|children| children.into_iter().map(Node::from).collect()),
            extension: None,
            icon: raw.icon,
            content: raw.content,
            tags: raw
                .tags
                .unwrap_or_default()
                .into_iter()
                .map(Tag::from)
                .collect(),
            collection_id: match raw.collection_id {
                Some(Value::String(s)) => Some(s),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            },
            created_at: millis_from(raw.created_at),
            updated_at: millis_from(raw.updated_at),
        };
        node.normalize();
        node
    }
}

/// Decode a persisted `directories` value into a forest.
///
/// Accepts a native JSON array, a JSON string holding an array, or a JSON
/// string holding a JSON string holding an array. Anything else yields an
/// empty forest.
pub fn decode_directories(raw: &Value) -> Vec<Node> {
    let mut current = raw.clone();

    for _ in 0..=MAX_STRING_LAYERS {
        match current {
            Value::Array(items) => return decode_items(items),
            Value::String(text) => match serde_json::from_str::<Value>(&text) {
                Ok(inner) => current = inner,
                Err(e) => {
                    warn!(error = %e, "Unparseable directories value, using empty forest");
                    return Vec::new();
                }
            },
            Value::Null => return Vec::new(),
            other => {
                warn!(kind = json_kind(&other), "Directories value is not an array");
                return Vec::new();
            }
        }
    }

    warn!("Directories value is nested too deeply, using empty forest");
    Vec::new()
}

/// Decode the raw text of a `directories` column.
pub fn decode_directories_str(raw: &str) -> Vec<Node> {
    decode_directories(&Value::String(raw.to_string()))
}

fn decode_items(items: Vec<Value>) -> Vec<Node> {
    match serde_json::from_value::<Vec<RawNode>>(Value::Array(items)) {
        Ok(raw) => raw.into_iter().map(Node::from).collect(),
        Err(e) => {
            warn!(error = %e, "Malformed node in directories, using empty forest");
            Vec::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Encode a forest for the `directories` column. Always a single JSON layer.
pub fn encode_directories(nodes: &[Node]) -> String {
    serde_json::to_string(nodes).unwrap_or_else(|e| {
        error!(error = %e, "Failed to encode directories");
        "[]".to_string()
    })
}

/// Return a copy of `nodes` with `collection_id` set on every node and every
/// descendant, overwriting stale values.
pub fn assign_collection_id(nodes: &[Node], collection_id: &str) -> Vec<Node> {
    let mut nodes = nodes.to_vec();
    assign_collection_id_in_place(&mut nodes, collection_id);
    nodes
}

/// In-place form of [`assign_collection_id`].
pub fn assign_collection_id_in_place(nodes: &mut [Node], collection_id: &str) {
    for node in nodes {
        node.collection_id = Some(collection_id.to_string());
        if let Some(children) = node.children.as_mut() {
            assign_collection_id_in_place(children, collection_id);
        }
    }
}
