//! Field-level spec diffing.
//!
//! Update reconciliation is driven by a list of leaf-field changes between
//! the last-handled spec and the current spec. Entries carry structured path
//! segments rooted at `spec`, so policy decisions match on path structure
//! instead of substring containment.

use crds::MyAppResourceSpec;
use serde_json::Value;

/// Kind of change a [`DiffEntry`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffOp {
    /// Field present only in the new spec
    Add,
    /// Field present in both with different values
    Change,
    /// Field present only in the old spec
    Remove,
}

/// One changed leaf field between two specs.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffEntry {
    /// What happened to the field
    pub op: DiffOp,
    /// Path segments from the resource root, e.g. `["spec", "redis", "enabled"]`
    pub path: Vec<String>,
    /// Value in the old spec, if any
    pub old: Option<Value>,
    /// Value in the new spec, if any
    pub new: Option<Value>,
}

impl DiffEntry {
    /// The spec field this entry lives under (the segment after `spec`).
    #[must_use]
    pub fn spec_field(&self) -> Option<&str> {
        match self.path.as_slice() {
            [root, field, ..] if root == "spec" => Some(field),
            _ => None,
        }
    }

    /// Whether the path is exactly the given segments.
    #[must_use]
    pub fn path_is(&self, segments: &[&str]) -> bool {
        self.path.len() == segments.len()
            && self.path.iter().zip(segments).all(|(a, b)| a == b)
    }

    /// Whether the new value is boolean `true`.
    #[must_use]
    pub fn new_is_true(&self) -> bool {
        self.new == Some(Value::Bool(true))
    }
}

/// Computes the leaf-field diff between two specs.
///
/// Map keys are descended into; scalars and arrays are compared as leaves.
/// Entry ordering carries no meaning and each entry is evaluated
/// independently by the reconciler.
pub fn spec_diff(
    old: &MyAppResourceSpec,
    new: &MyAppResourceSpec,
) -> Result<Vec<DiffEntry>, serde_json::Error> {
    let old_value = serde_json::to_value(old)?;
    let new_value = serde_json::to_value(new)?;
    let mut entries = Vec::new();
    diff_value(
        &["spec".to_string()],
        Some(&old_value),
        Some(&new_value),
        &mut entries,
    );
    Ok(entries)
}

fn diff_value(
    path: &[String],
    old: Option<&Value>,
    new: Option<&Value>,
    entries: &mut Vec<DiffEntry>,
) {
    match (old, new) {
        (Some(Value::Object(old_map)), Some(Value::Object(new_map))) => {
            for (key, old_child) in old_map {
                let mut child_path = path.to_vec();
                child_path.push(key.clone());
                diff_value(&child_path, Some(old_child), new_map.get(key), entries);
            }
            // Keys only present in the new spec
            for (key, new_child) in new_map {
                if old_map.contains_key(key) {
                    continue;
                }
                let mut child_path = path.to_vec();
                child_path.push(key.clone());
                diff_value(&child_path, None, Some(new_child), entries);
            }
        }
        (Some(old_leaf), Some(new_leaf)) => {
            if old_leaf != new_leaf {
                entries.push(DiffEntry {
                    op: DiffOp::Change,
                    path: path.to_vec(),
                    old: Some(old_leaf.clone()),
                    new: Some(new_leaf.clone()),
                });
            }
        }
        (Some(old_leaf), None) => entries.push(DiffEntry {
            op: DiffOp::Remove,
            path: path.to_vec(),
            old: Some(old_leaf.clone()),
            new: None,
        }),
        (None, Some(new_leaf)) => entries.push(DiffEntry {
            op: DiffOp::Add,
            path: path.to_vec(),
            old: None,
            new: Some(new_leaf.clone()),
        }),
        (None, None) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crds::{ImageSpec, RedisSpec, ResourceSpec};

    fn spec(tag: &str, redis: Option<bool>) -> MyAppResourceSpec {
        MyAppResourceSpec {
            image: ImageSpec {
                repository: "myrepo".to_string(),
                tag: tag.to_string(),
            },
            replica_count: 2,
            resources: ResourceSpec {
                cpu_request: "50m".to_string(),
                memory_limit: "64Mi".to_string(),
            },
            ui: None,
            redis: redis.map(|enabled| RedisSpec { enabled }),
        }
    }

    #[test]
    fn identical_specs_have_no_diff() {
        let entries = spec_diff(&spec("v1", Some(true)), &spec("v1", Some(true))).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn tag_change_is_one_leaf_entry() {
        let entries = spec_diff(&spec("v1", None), &spec("v2", None)).unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.op, DiffOp::Change);
        assert!(entry.path_is(&["spec", "image", "tag"]));
        assert_eq!(entry.old, Some(Value::String("v1".into())));
        assert_eq!(entry.new, Some(Value::String("v2".into())));
        assert_eq!(entry.spec_field(), Some("image"));
    }

    #[test]
    fn enabling_redis_flags_the_enabled_leaf() {
        let entries = spec_diff(&spec("v1", Some(false)), &spec("v1", Some(true))).unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert!(entry.path_is(&["spec", "redis", "enabled"]));
        assert!(entry.new_is_true());
        assert_eq!(entry.spec_field(), Some("redis"));
    }

    #[test]
    fn removing_redis_block_is_a_remove_entry() {
        let entries = spec_diff(&spec("v1", Some(true)), &spec("v1", None)).unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.op, DiffOp::Remove);
        assert!(entry.path_is(&["spec", "redis"]));
        assert!(!entry.new_is_true());
    }

    #[test]
    fn adding_redis_block_descends_to_the_leaf() {
        let entries = spec_diff(&spec("v1", None), &spec("v1", Some(true))).unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.op, DiffOp::Add);
        // The whole block is new, so the entry sits at the block path
        assert!(entry.path_is(&["spec", "redis"]));
        assert_eq!(entry.spec_field(), Some("redis"));
    }

    #[test]
    fn spec_field_rejects_non_spec_roots() {
        let entry = DiffEntry {
            op: DiffOp::Change,
            path: vec!["status".to_string(), "redis".to_string()],
            old: None,
            new: None,
        };
        assert_eq!(entry.spec_field(), None);
    }
}
