//! Shallow merging of context values.

use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

/// Shallow merge of one context into another.
///
/// Keys present in `other` overwrite keys in `self`; nested values are not
/// merged recursively.
///
/// The default method replaces `self` with `other`, so a struct context
/// opts in with an empty impl and the later fragment's context wins:
///
/// ```rust
/// use statewright::compose::MergeContext;
///
/// #[derive(Clone, Default, Debug, PartialEq)]
/// struct Session {
///     user: Option<String>,
/// }
///
/// impl MergeContext for Session {}
///
/// let mut session = Session::default();
/// session.merge_from(Session { user: Some("ada".into()) });
/// assert_eq!(session.user.as_deref(), Some("ada"));
/// ```
///
/// # Example
///
/// ```rust
/// use statewright::compose::MergeContext;
/// use serde_json::json;
///
/// let mut context = json!({ "a": 1, "shared": "first" });
/// context.merge_from(json!({ "b": 2, "shared": "second" }));
///
/// assert_eq!(context, json!({ "a": 1, "b": 2, "shared": "second" }));
/// ```
pub trait MergeContext: Sized {
    fn merge_from(&mut self, other: Self) {
        *self = other;
    }
}

impl MergeContext for serde_json::Value {
    fn merge_from(&mut self, other: Self) {
        match (self, other) {
            (serde_json::Value::Object(target), serde_json::Value::Object(source)) => {
                target.extend(source);
            }
            // A non-object replaces whatever was there.
            (target, source) => *target = source,
        }
    }
}

impl MergeContext for serde_json::Map<String, serde_json::Value> {
    fn merge_from(&mut self, other: Self) {
        self.extend(other);
    }
}

impl<K: Eq + Hash, V, S: BuildHasher> MergeContext for HashMap<K, V, S> {
    fn merge_from(&mut self, other: Self) {
        self.extend(other);
    }
}

impl<K: Ord, V> MergeContext for BTreeMap<K, V> {
    fn merge_from(&mut self, other: Self) {
        self.extend(other);
    }
}

impl<K: Eq + Hash, V, S: BuildHasher> MergeContext for IndexMap<K, V, S> {
    fn merge_from(&mut self, other: Self) {
        self.extend(other);
    }
}

impl MergeContext for () {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn later_keys_overwrite_earlier() {
        let mut context = json!({ "a": 1, "b": 1 });
        context.merge_from(json!({ "b": 2 }));

        assert_eq!(context, json!({ "a": 1, "b": 2 }));
    }

    #[test]
    fn merge_is_shallow() {
        let mut context = json!({ "nested": { "x": 1, "y": 1 } });
        context.merge_from(json!({ "nested": { "y": 2 } }));

        assert_eq!(context, json!({ "nested": { "y": 2 } }));
    }

    #[test]
    fn non_object_replaces() {
        let mut context = json!({ "a": 1 });
        context.merge_from(json!(5));
        assert_eq!(context, json!(5));

        let mut context = serde_json::Value::Null;
        context.merge_from(json!({ "a": 1 }));
        assert_eq!(context, json!({ "a": 1 }));
    }

    #[test]
    fn default_merge_replaces_whole_value() {
        #[derive(Debug, PartialEq)]
        struct Limits {
            retries: u32,
            timeout: u32,
        }
        impl MergeContext for Limits {}

        let mut limits = Limits {
            retries: 3,
            timeout: 10,
        };
        limits.merge_from(Limits {
            retries: 5,
            timeout: 0,
        });

        assert_eq!(
            limits,
            Limits {
                retries: 5,
                timeout: 0
            }
        );
    }

    #[test]
    fn maps_extend() {
        let mut map: HashMap<&str, i32> = HashMap::from([("a", 1), ("b", 1)]);
        map.merge_from(HashMap::from([("b", 2), ("c", 3)]));

        assert_eq!(map.get("a"), Some(&1));
        assert_eq!(map.get("b"), Some(&2));
        assert_eq!(map.get("c"), Some(&3));

        let mut ordered = BTreeMap::from([("a", 1)]);
        ordered.merge_from(BTreeMap::from([("a", 9)]));
        assert_eq!(ordered.get("a"), Some(&9));
    }
}
