//! Deep merge of config layers.

use log::debug;
use serde_json::Value;

/// Overlay `top` onto `base`: objects merge key by key, anything else replaces.
pub(super) fn overlay(base: &mut Value, top: &Value) {
    match (base, top) {
        (Value::Object(base_map), Value::Object(top_map)) => {
            for (key, value) in top_map {
                match base_map.get_mut(key) {
                    Some(slot) => overlay(slot, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (slot, value) => *slot = value.clone(),
    }
}

/// Overlay honoring requirements: a key whose requirement is a leaf value is
/// locked; a key whose requirement is an object is merged recursively.
pub(super) fn overlay_constrained(base: &mut Value, top: &Value, locked: Option<&Value>) {
    let Some(locked) = locked else {
        overlay(base, top);
        return;
    };
    let (Value::Object(base_map), Value::Object(top_map), Value::Object(locked_map)) =
        (base, top, locked)
    else {
        return;
    };
    for (key, value) in top_map {
        match locked_map.get(key) {
            Some(Value::Object(_)) | None => {
                let slot = base_map.entry(key.clone()).or_insert(Value::Null);
                overlay_constrained(slot, value, locked_map.get(key));
            }
            Some(_) => debug!("ignoring override of locked config key (key={key})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{overlay, overlay_constrained};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn overlay_merges_objects_and_replaces_leaves() {
        let mut base = json!({ "memory": { "dimensions": 384, "path": "a" } });
        overlay(&mut base, &json!({ "memory": { "path": "b" }, "tools": {} }));
        assert_eq!(
            base,
            json!({ "memory": { "dimensions": 384, "path": "b" }, "tools": {} })
        );
    }

    #[test]
    fn locked_leaves_survive_overrides() {
        let locked = json!({ "memory": { "embedding": { "provider": "hash" } } });
        let mut base = locked.clone();
        overlay_constrained(
            &mut base,
            &json!({ "memory": { "embedding": { "provider": "openai", "model": "m" }, "dimensions": 8 } }),
            Some(&locked),
        );
        assert_eq!(
            base,
            json!({ "memory": { "embedding": { "provider": "hash", "model": "m" }, "dimensions": 8 } })
        );
    }

    #[test]
    fn locked_object_is_not_replaced_by_scalar() {
        let locked = json!({ "memory": { "path": "/srv/memory" } });
        let mut base = locked.clone();
        overlay_constrained(&mut base, &json!({ "memory": null }), Some(&locked));
        assert_eq!(base, locked);
    }
}
