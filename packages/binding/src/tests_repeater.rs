/// Repeater tests: clone lifecycle by item identity, per-item updates,
/// nested repeaters, and list handle operations
use crate::*;
use serde_json::json;
use weft_dom::{Document, HostTree, NodeId};

const LIST: &str = r#"<ul><template for="items"><li class="{{kind}}">{{name}}</li></template></ul>"#;

fn bind(source: &str, store: Store) -> (Binding<Document>, NodeId) {
    let doc = Document::parse(source).expect("Failed to parse markup");
    let root = doc.root();
    let binding = Binding::bind(doc, root, store).expect("Failed to bind");
    (binding, root)
}

#[cfg(test)]
mod repeater_tests {
    use super::*;

    #[test]
    fn test_initial_items_are_cloned() {
        let store = Store::from_json(json!({
            "items": [{ "name": "a", "kind": "x" }, { "name": "b", "kind": "y" }]
        }));
        let (binding, root) = bind(LIST, store);

        assert_eq!(
            binding.host().inner_markup(root),
            r#"<ul><li class="x">a</li><li class="y">b</li></ul>"#
        );
        assert_eq!(binding.repeater("items").map(RepeaterBinding::len), Some(2));
    }

    #[test]
    fn test_push_creates_one_clone() {
        let (mut binding, root) = bind(LIST, Store::new());
        binding.list("items").push(json!({ "name": "a" })).expect("push");

        binding.host_mut().reset_stats();
        let id = binding
            .list("items")
            .push(json!({ "name": "b", "kind": "k" }))
            .expect("push");

        let stats = binding.host().stats();
        assert_eq!(stats.insertions, 1);
        assert_eq!(stats.removals, 0);
        assert_eq!(
            binding.host().inner_markup(root),
            r#"<ul><li class="undefined">a</li><li class="k">b</li></ul>"#
        );
        assert!(binding.repeater("items").and_then(|r| r.instance(id)).is_some());
    }

    #[test]
    fn test_clones_sit_before_anchor() {
        let (mut binding, _) = bind(LIST, Store::new());
        let a = binding.list("items").push(json!({ "name": "a" })).expect("push");
        let b = binding.list("items").push(json!({ "name": "b" })).expect("push");

        let repeater = binding.repeater("items").expect("repeater");
        let ul = binding.host().parent(repeater.anchor()).expect("anchor parent");
        let mut expected = Vec::new();
        expected.extend_from_slice(repeater.instance(a).expect("a").nodes());
        expected.extend_from_slice(repeater.instance(b).expect("b").nodes());
        expected.push(repeater.anchor());
        assert_eq!(binding.host().children(ul), expected);
    }

    #[test]
    fn test_replacing_list_with_equal_values_recreates_clones() {
        let (mut binding, root) = bind(LIST, Store::new());
        binding.set("items", json!([{ "name": "a" }, { "name": "b" }])).expect("set");
        let before = binding.repeater("items").expect("repeater").instance_ids();

        binding.host_mut().reset_stats();
        binding.set("items", json!([{ "name": "a" }, { "name": "b" }])).expect("set");

        let after = binding.repeater("items").expect("repeater").instance_ids();
        assert!(before.iter().all(|id| !after.contains(id)));
        assert_eq!(binding.host().stats().removals, 2);
        assert_eq!(binding.host().stats().insertions, 2);
        assert_eq!(
            binding.host().inner_markup(root),
            r#"<ul><li class="undefined">a</li><li class="undefined">b</li></ul>"#
        );
    }

    #[test]
    fn test_item_field_write_touches_only_its_clone() {
        let (mut binding, _) = bind(LIST, Store::new());
        let a = binding.list("items").push(json!({ "name": "a" })).expect("push");
        let b = binding.list("items").push(json!({ "name": "b" })).expect("push");

        binding.host_mut().reset_stats();
        binding
            .list("items")
            .item(b)
            .update(|item| item.set_path(&["kind".to_string()], Value::from("hot")))
            .expect("update");

        assert_eq!(binding.host().stats().attribute_writes, 1);
        assert_eq!(binding.host().stats().text_writes, 0);
        let item = binding.list("items").item(a);
        assert_eq!(item.get("kind"), None);
    }

    #[test]
    fn test_item_handle_reads() {
        let (mut binding, _) = bind(LIST, Store::new());
        let id = binding.list("items").push(json!({ "name": "a" })).expect("push");

        let list = binding.list("items");
        assert_eq!(list.ids(), vec![id]);
        assert_eq!(list.get(id).and_then(|v| v.get("name")), Some(&Value::from("a")));
        assert_eq!(list.iter().count(), 1);

        let item = list.item(id);
        assert_eq!(item.id(), id);
        assert_eq!(item.get("name"), Some(&Value::from("a")));
    }

    #[test]
    fn test_removed_item_handle_errors() {
        let (mut binding, _) = bind(LIST, Store::new());
        let id = binding.list("items").push(json!({ "name": "a" })).expect("push");
        binding.list("items").remove(id).expect("remove");

        let err = binding.list("items").item(id).set("name", "b").unwrap_err();
        assert_eq!(
            err,
            BindError::UnknownItem {
                key: "items".to_string(),
                id
            }
        );
    }

    #[test]
    fn test_remove_returns_value() {
        let (mut binding, _) = bind(LIST, Store::new());
        let id = binding.list("items").push("plain").expect("push");

        let removed = binding.list("items").remove(id).expect("remove");
        assert_eq!(removed, Some(Value::from("plain")));
        assert_eq!(binding.list("items").remove(id).expect("remove"), None);
    }

    #[test]
    fn test_clear_and_retain() {
        let (mut binding, root) = bind(LIST, Store::new());
        for name in ["a", "b", "c"] {
            binding.list("items").push(json!({ "name": name })).expect("push");
        }

        binding
            .list("items")
            .retain(|item| item.get("name") != Some(&Value::from("b")))
            .expect("retain");
        assert_eq!(
            binding.host().inner_markup(root),
            r#"<ul><li class="undefined">a</li><li class="undefined">c</li></ul>"#
        );

        binding.list("items").clear().expect("clear");
        assert_eq!(binding.host().inner_markup(root), "<ul></ul>");
        assert!(binding.list("items").is_empty());
        assert_eq!(binding.repeater("items").map(RepeaterBinding::len), Some(0));
    }

    #[test]
    fn test_insert_appends_clone_at_region_end() {
        let (mut binding, root) = bind(LIST, Store::new());
        binding.list("items").push(json!({ "name": "a" })).expect("push");

        binding.list("items").insert(0, json!({ "name": "first" })).expect("insert");

        let names: Vec<String> = binding.list("items").iter().map(|v| display(v.get("name"))).collect();
        assert_eq!(names, vec!["first", "a"]);
        // Clones are positioned once, at creation
        assert_eq!(
            binding.host().inner_markup(root),
            r#"<ul><li class="undefined">a</li><li class="undefined">first</li></ul>"#
        );
    }

    #[test]
    fn test_reordering_keeps_clone_positions() {
        let (mut binding, root) = bind(LIST, Store::new());
        binding.list("items").push(json!({ "name": "a" })).expect("push");
        binding.list("items").push(json!({ "name": "b" })).expect("push");

        binding.host_mut().reset_stats();
        binding
            .update("items", |items| {
                if let Some(items) = items.as_list_mut() {
                    items.reverse();
                }
            })
            .expect("update");

        assert_eq!(binding.host().stats().total(), 0);
        assert_eq!(
            binding.host().inner_markup(root),
            r#"<ul><li class="undefined">a</li><li class="undefined">b</li></ul>"#
        );
    }

    #[test]
    fn test_index_path_write_replaces_item() {
        let (mut binding, root) = bind(LIST, Store::new());
        let first = binding.list("items").push(json!({ "name": "a" })).expect("push");

        binding.set_path("items.0", json!({ "name": "z" })).expect("set_path");

        let ids = binding.list("items").ids();
        assert_eq!(ids.len(), 1);
        assert_ne!(ids[0], first);
        assert_eq!(
            binding.host().inner_markup(root),
            r#"<ul><li class="undefined">z</li></ul>"#
        );
    }

    #[test]
    fn test_index_path_field_write_updates_in_place() {
        let (mut binding, root) = bind(LIST, Store::new());
        let id = binding.list("items").push(json!({ "name": "a" })).expect("push");

        binding.host_mut().reset_stats();
        binding.set_path("items.0.name", "b").expect("set_path");

        assert_eq!(binding.list("items").ids(), vec![id]);
        assert_eq!(binding.host().stats().insertions, 0);
        assert_eq!(binding.host().stats().text_writes, 1);
        assert_eq!(
            binding.host().inner_markup(root),
            r#"<ul><li class="undefined">b</li></ul>"#
        );
    }

    #[test]
    fn test_nested_repeaters() {
        let source = concat!(
            "<div>",
            r#"<template for="groups"><h2>{{title}}</h2>"#,
            r#"<template for="rows"><p>{{label}}</p></template>"#,
            "</template>",
            "</div>"
        );
        let (mut binding, root) = bind(source, Store::new());

        let group = binding
            .list("groups")
            .push(json!({ "title": "G", "rows": [{ "label": "r1" }, { "label": "r2" }] }))
            .expect("push");
        assert_eq!(
            binding.host().inner_markup(root),
            "<div><h2>G</h2><p>r1</p><p>r2</p></div>"
        );

        let registry = binding.repeater("groups").expect("groups").registry();
        assert_eq!(registry.kind_of("title"), Some(KeyKind::Scalar));
        assert_eq!(registry.kind_of("rows"), Some(KeyKind::Repeater));
        assert!(!binding.registry().contains("title"));

        binding
            .list("groups")
            .item(group)
            .update(|group| {
                group.set_path(&["rows".to_string(), "2".to_string()], Value::from(json!({ "label": "r3" })))
            })
            .expect("update");
        assert_eq!(
            binding.host().inner_markup(root),
            "<div><h2>G</h2><p>r1</p><p>r2</p><p>r3</p></div>"
        );

        binding.list("groups").remove(group).expect("remove");
        assert_eq!(binding.host().inner_markup(root), "<div></div>");
    }

    #[test]
    fn test_nested_repeater_inside_element() {
        let source = r#"<div><template for="groups"><section><template for="rows"><p>{{label}}</p></template></section></template></div>"#;
        let (mut binding, root) = bind(source, Store::new());

        let group = binding
            .list("groups")
            .push(json!({ "rows": [{ "label": "r1" }] }))
            .expect("push");
        assert_eq!(
            binding.host().inner_markup(root),
            "<div><section><p>r1</p></section></div>"
        );

        binding.host_mut().reset_stats();
        binding.list("groups").remove(group).expect("remove");
        assert_eq!(binding.host().stats().removals, 1);
        assert_eq!(binding.host().inner_markup(root), "<div></div>");
    }

    #[test]
    fn test_push_remove_churn_reuses_host_nodes() {
        let (mut binding, _) = bind(LIST, Store::new());
        let live = binding.host().len();

        for round in 0..1000 {
            let id = binding
                .list("items")
                .push(json!({ "name": round, "kind": "row" }))
                .expect("push");
            binding.list("items").remove(id).expect("remove");
        }

        assert_eq!(binding.host().len(), live);
        assert!(binding.host().allocated() < live + 10);
    }

    #[test]
    fn test_removing_nested_groups_frees_their_nodes() {
        let source = concat!(
            "<div>",
            r#"<template for="groups"><h2>{{title}}</h2>"#,
            r#"<section><template for="rows"><p>{{label}}</p></template></section>"#,
            r#"<template for="rows"><b>{{label}}</b></template>"#,
            "</template>",
            "</div>"
        );
        let (mut binding, root) = bind(source, Store::new());
        let live = binding.host().len();

        for _ in 0..50 {
            let group = binding
                .list("groups")
                .push(json!({ "title": "G", "rows": [{ "label": "r1" }, { "label": "r2" }] }))
                .expect("push");
            binding.list("groups").remove(group).expect("remove");
        }

        assert_eq!(binding.host().inner_markup(root), "<div></div>");
        assert_eq!(binding.host().len(), live);
    }

    #[test]
    fn test_untracked_list_is_plain_data() {
        let (mut binding, _) = bind("<p>{{a}}</p>", Store::new());

        binding.host_mut().reset_stats();
        let id = binding.list("later").push(1).expect("push");

        assert_eq!(binding.list("later").ids(), vec![id]);
        assert_eq!(binding.store().tracked("later"), None);
        assert_eq!(binding.host().stats().total(), 0);
    }
}
