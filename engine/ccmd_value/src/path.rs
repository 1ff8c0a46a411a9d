//! Dotted-path traversal.

use crate::value::Value;

/// Walk `path` from `root`, one segment at a time.
///
/// Maps are indexed by exact key, lists by a non-negative decimal index.
/// Returns `None` as soon as a segment is missing or the current value is
/// not indexable. An empty path returns `root` itself.
pub fn traverse(root: &Value, path: &[&str]) -> Option<Value> {
    let mut current = root;
    for segment in path {
        current = match current {
            Value::Map(entries) => entries.get(*segment)?,
            Value::List(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => {
                tracing::trace!(segment, found = current.type_name(), "path not indexable");
                return None;
            }
        };
    }
    Some(current.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Value {
        Value::map_from([(
            "Guild",
            Value::map_from([
                ("Name", Value::string("Hub")),
                (
                    "Roles",
                    Value::list(vec![Value::string("mod"), Value::string("vip")]),
                ),
            ]),
        )])
    }

    #[test]
    fn test_map_and_list_segments() {
        let root = sample();
        assert_eq!(traverse(&root, &["Guild", "Name"]), Some(Value::string("Hub")));
        assert_eq!(
            traverse(&root, &["Guild", "Roles", "1"]),
            Some(Value::string("vip"))
        );
    }

    #[test]
    fn test_misses() {
        let root = sample();
        assert_eq!(traverse(&root, &["Nope"]), None);
        assert_eq!(traverse(&root, &["Guild", "Roles", "9"]), None);
        assert_eq!(traverse(&root, &["Guild", "Roles", "-1"]), None);
        assert_eq!(traverse(&root, &["Guild", "Name", "Deep"]), None);
    }

    #[test]
    fn test_empty_path_is_root() {
        let root = sample();
        assert_eq!(traverse(&root, &[]), Some(root.clone()));
    }
}
