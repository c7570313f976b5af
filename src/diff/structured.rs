use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use treediff::{value::Key, Delegate};

/// A simplified view of a value involved in a change.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ValueRepr {
    String(String),
    Number(serde_json::Number),
    Boolean(bool),
    Null,
    // Summaries for complex types
    Array(String),
    Object(String),
}

impl ValueRepr {
    fn from_json_value(val: &JsonValue) -> Self {
        match val {
            JsonValue::Null => ValueRepr::Null,
            JsonValue::Bool(b) => ValueRepr::Boolean(*b),
            JsonValue::Number(n) => ValueRepr::Number(n.clone()),
            JsonValue::String(s) => ValueRepr::String(s.clone()),
            JsonValue::Array(arr) => ValueRepr::Array(format!("[Array len={}]", arr.len())),
            JsonValue::Object(map) => match map.get("kind").and_then(JsonValue::as_str) {
                Some(kind) => ValueRepr::Object(format!("{{{} block}}", kind)),
                None => ValueRepr::Object("{Object}".to_string()),
            },
        }
    }

    /// Formats the value for display.
    pub fn format_for_display(&self) -> String {
        match self {
            ValueRepr::String(s) => {
                let escaped_s = s
                    .replace('\\', "\\\\")
                    .replace('\n', "\\n")
                    .replace('\r', "\\r")
                    .replace('\t', "\\t")
                    .replace('\'', "\\'");
                format!("'{}'", escaped_s)
            }
            ValueRepr::Number(n) => match n.as_f64() {
                Some(f) if n.is_f64() => format!("{:.1}", f),
                _ => n.to_string(),
            },
            ValueRepr::Boolean(b) => b.to_string(),
            ValueRepr::Null => "null".to_string(),
            ValueRepr::Array(s) | ValueRepr::Object(s) => s.clone(),
        }
    }
}

/// The type of difference detected.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChangeType {
    Added,
    Removed,
    Modified,
}

/// A single difference between two decks.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Change {
    /// Dot-separated path with bracket notation for array indices,
    /// e.g. `pages[1].blocks[0].size.height`.
    pub path: String,
    pub change_type: ChangeType,
    /// The value before the change (None for Added).
    pub old_value: Option<ValueRepr>,
    /// The value after the change (None for Removed).
    pub new_value: Option<ValueRepr>,
}

/// treediff delegate collecting changes, ignoring numeric changes smaller
/// than `tolerance` pixels.
#[derive(Debug)]
pub(crate) struct ChangeCollector {
    pub(crate) changes: Vec<Change>,
    current_path: Vec<String>,
    tolerance: f64,
}

impl ChangeCollector {
    pub(crate) fn new(tolerance: f64) -> Self {
        ChangeCollector {
            changes: Vec::new(),
            current_path: Vec::new(),
            tolerance,
        }
    }

    fn format_path(&self) -> String {
        self.current_path.join("")
    }

    /// Path of a child of the current node; treediff reports added and
    /// removed entries without pushing their key.
    fn format_child_path(&self, key: &Key) -> String {
        let mut path = self.format_path();
        match key {
            Key::String(s) if path.is_empty() => path.push_str(s),
            Key::String(s) => {
                path.push('.');
                path.push_str(s);
            }
            Key::Index(i) => path.push_str(&format!("[{}]", i)),
        }
        path
    }

    fn within_tolerance(&self, old: &JsonValue, new: &JsonValue) -> bool {
        match (old.as_f64(), new.as_f64()) {
            (Some(a), Some(b)) => (a - b).abs() < self.tolerance,
            _ => false,
        }
    }
}

impl<'a> Delegate<'a, Key, JsonValue> for ChangeCollector {
    fn push(&mut self, segment: &Key) {
        let segment_str = match segment {
            Key::String(s) => {
                if self.current_path.is_empty() {
                    s.clone()
                } else {
                    format!(".{}", s)
                }
            }
            Key::Index(i) => format!("[{}]", i),
        };
        self.current_path.push(segment_str);
    }

    fn pop(&mut self) {
        self.current_path.pop();
    }

    fn removed<'b>(&mut self, key: &'b Key, value: &'a JsonValue) {
        let path = self.format_child_path(key);
        self.changes.push(Change {
            path,
            change_type: ChangeType::Removed,
            old_value: Some(ValueRepr::from_json_value(value)),
            new_value: None,
        });
    }

    fn added<'b>(&mut self, key: &'b Key, value: &'a JsonValue) {
        let path = self.format_child_path(key);
        self.changes.push(Change {
            path,
            change_type: ChangeType::Added,
            old_value: None,
            new_value: Some(ValueRepr::from_json_value(value)),
        });
    }

    fn modified(&mut self, old: &'a JsonValue, new: &'a JsonValue) {
        if self.within_tolerance(old, new) {
            return;
        }
        let path = self.format_path();
        self.changes.push(Change {
            path,
            change_type: ChangeType::Modified,
            old_value: Some(ValueRepr::from_json_value(old)),
            new_value: Some(ValueRepr::from_json_value(new)),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use treediff::diff;

    fn collect(old: &JsonValue, new: &JsonValue, tolerance: f64) -> Vec<Change> {
        let mut collector = ChangeCollector::new(tolerance);
        diff(old, new, &mut collector);
        collector.changes
    }

    #[test]
    fn small_numeric_changes_are_ignored() {
        let old = json!({"pages": [{"blocks": [{"size": {"height": 100.0}}]}]});
        let jitter = json!({"pages": [{"blocks": [{"size": {"height": 100.2}}]}]});
        let moved = json!({"pages": [{"blocks": [{"size": {"height": 130.0}}]}]});

        assert!(collect(&old, &jitter, 0.5).is_empty());
        let changes = collect(&old, &moved, 0.5);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, "pages[0].blocks[0].size.height");
        assert_eq!(changes[0].change_type, ChangeType::Modified);
    }

    #[test]
    fn added_blocks_are_summarized_by_kind() {
        let old = json!({"blocks": []});
        let new = json!({"blocks": [{"kind": "image", "id": "b4"}]});
        let changes = collect(&old, &new, 0.0);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, "blocks[0]");
        assert_eq!(
            changes[0].new_value.as_ref().map(ValueRepr::format_for_display),
            Some("{image block}".to_string())
        );
    }
}
