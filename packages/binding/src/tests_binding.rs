/// Tests for the binding surface: scalar and object writes, handles,
/// untracked keys, batching, and bind-time errors
use crate::*;
use serde_json::json;
use weft_dom::{Document, HostTree, NodeId};

fn bind(source: &str, store: Store) -> (Binding<Document>, NodeId) {
    let doc = Document::parse(source).expect("Failed to parse markup");
    let root = doc.root();
    let binding = Binding::bind(doc, root, store).expect("Failed to bind");
    (binding, root)
}

fn markup(binding: &Binding<Document>, root: NodeId) -> String {
    binding.host().inner_markup(root)
}

#[cfg(test)]
mod binding_tests {
    use super::*;

    #[test]
    fn test_initial_render_uses_store() {
        let store = Store::from_json(json!({ "name": "Ada", "user": { "role": "admin" } }));
        let (binding, root) = bind("<p>{{name}} ({{user.role}})</p>", store);

        assert_eq!(markup(&binding, root), "<p>Ada (admin)</p>");
    }

    #[test]
    fn test_unset_keys_are_initialized() {
        let (binding, _) = bind(
            r#"<p>{{a}} {{b.c.d}}</p><ul><template for="items"><li>x</li></template></ul>"#,
            Store::new(),
        );

        assert_eq!(binding.get("a"), Some(&Value::Undefined));
        assert_eq!(binding.get("b").and_then(Value::to_json), Some(json!({ "c": {} })));
        assert_eq!(binding.get("items"), Some(&Value::List(Vec::new())));
    }

    #[test]
    fn test_unreferenced_initial_data_is_untracked() {
        let store = Store::from_json(json!({ "a": 1, "extra": true }));
        let (binding, _) = bind("<p>{{a}}</p>", store);

        assert_eq!(binding.store().tracked("extra"), None);
        assert_eq!(binding.store().untracked("extra"), Some(&Value::Bool(true)));
        assert_eq!(binding.get("extra"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_attribute_binding() {
        let (mut binding, root) = bind(r#"<a href="/users/{{id}}" title="{{id}}">x</a>"#, Store::new());

        binding.host_mut().reset_stats();
        binding.set("id", 7).expect("Failed to set id");

        assert_eq!(markup(&binding, root), r#"<a href="/users/7" title="7">x</a>"#);
        assert_eq!(binding.host().stats().attribute_writes, 2);
    }

    #[test]
    fn test_setting_same_scalar_writes_nothing() {
        let (mut binding, _) = bind("<p>{{a}}</p>", Store::new());
        binding.set("a", "x").expect("Failed to set a");

        binding.host_mut().reset_stats();
        binding.set("a", "x").expect("Failed to set a");

        assert_eq!(binding.host().stats().total(), 0);
    }

    #[test]
    fn test_value_coercion() {
        let (mut binding, root) = bind("<p>{{n}}|{{f}}|{{t}}|{{z}}|{{l}}|{{o}}</p>", Store::new());

        binding.set("n", 3).expect("set n");
        binding.set("f", 1.5).expect("set f");
        binding.set("t", true).expect("set t");
        binding.set("z", Value::Null).expect("set z");
        binding.set("l", json!([1, "a", null])).expect("set l");
        binding.set("o", json!({ "k": 1 })).expect("set o");

        assert_eq!(
            markup(&binding, root),
            "<p>3|1.5|true|null|1,a,|[object Object]</p>"
        );
    }

    #[test]
    fn test_nested_object_handles() {
        let (mut binding, root) = bind("<p>{{user.address.city}}</p>", Store::new());

        binding
            .object("user")
            .field("address")
            .set("city", "Paris")
            .expect("Failed to set city");
        assert_eq!(markup(&binding, root), "<p>Paris</p>");

        let user = binding.object("user");
        assert_eq!(
            user.value().and_then(Value::to_json),
            Some(json!({ "address": { "city": "Paris" } }))
        );
        assert!(user.get("address").is_some());
    }

    #[test]
    fn test_object_update_in_place() {
        let (mut binding, root) = bind("<p>{{user.name}}</p>", Store::new());

        let changed = binding
            .object("user")
            .update(|user| user.set_path(&["name".to_string()], Value::from("Lin")))
            .expect("Failed to update user");

        assert_eq!(changed, Some(true));
        assert_eq!(markup(&binding, root), "<p>Lin</p>");
    }

    #[test]
    fn test_object_update_on_missing_path() {
        let (mut binding, _) = bind("<p>{{user.name}}</p>", Store::new());

        let result = binding
            .object("user")
            .field("nowhere")
            .update(|_| "ran")
            .expect("Failed to update");

        assert_eq!(result, None);
    }

    #[test]
    fn test_set_dotted_path() {
        let (mut binding, root) = bind("<p>{{user.address.city}}</p>", Store::new());

        assert!(binding.set_path("user.address.city", "Rome").expect("set_path"));
        assert_eq!(markup(&binding, root), "<p>Rome</p>");
    }

    #[test]
    fn test_write_through_primitive_is_blocked() {
        let (mut binding, root) = bind("<p>{{a.b}}</p>", Store::new());
        binding.set("a", 1).expect("Failed to set a");

        assert!(!binding.set_path("a.b", 2).expect("set_path"));
        assert_eq!(binding.get("a"), Some(&Value::Number(1.0)));
        assert_eq!(markup(&binding, root), "<p>undefined</p>");
    }

    #[test]
    fn test_update_without_change_does_not_propagate() {
        let (mut binding, _) = bind("<p>{{user.name}}</p>", Store::new());
        binding.set_path("user.name", "x").expect("set_path");

        binding.host_mut().reset_stats();
        let len = binding
            .update("user", |user| user.as_object().map(|map| map.len()))
            .expect("update");

        assert_eq!(len, Some(1));
        assert_eq!(binding.host().stats().total(), 0);
    }

    #[test]
    fn test_batch_merges_writes() {
        let (mut binding, root) = bind("<p>{{a}}</p><p>{{b.c}}</p>", Store::new());
        binding.host_mut().reset_stats();

        let mut batch = binding.begin_batch();
        batch.set("a", "1").expect("set a");
        batch.set("a", "2").expect("set a");
        batch.set_path("b.c", "3").expect("set b.c");
        assert_eq!(batch.host().stats().total(), 0);
        assert_eq!(batch.get("a"), Some(&Value::from("2")));

        let rewritten = batch.commit().expect("Failed to commit batch");
        assert_eq!(rewritten, 2);
        assert_eq!(markup(&binding, root), "<p>2</p><p>3</p>");
        assert_eq!(binding.host().stats().text_writes, 2);
    }

    #[test]
    fn test_batch_flushes_on_drop() {
        let (mut binding, root) = bind("<p>{{a}}</p>", Store::new());

        {
            let mut batch = binding.begin_batch();
            batch.set("a", "dropped").expect("set a");
        }

        assert_eq!(markup(&binding, root), "<p>dropped</p>");
    }

    #[test]
    fn test_nested_batches_flush_once() {
        let (mut binding, root) = bind("<p>{{a}}</p>", Store::new());

        let mut outer = binding.begin_batch();
        {
            let mut inner = outer.begin_batch();
            inner.set("a", "inner").expect("set a");
            assert_eq!(inner.commit().expect("commit inner"), 0);
        }
        assert_eq!(outer.host().inner_markup(root), "<p>undefined</p>");
        assert_eq!(outer.commit().expect("commit outer"), 1);

        assert_eq!(markup(&binding, root), "<p>inner</p>");
    }

    #[test]
    fn test_missing_repeater_key_fails_bind() {
        let doc = Document::parse("<ul><template><li>x</li></template></ul>").expect("parse");
        let root = doc.root();

        let err = Binding::bind(doc, root, Store::new()).unwrap_err();
        assert!(matches!(err, BindError::MissingRepeaterKey { .. }));
    }

    #[test]
    fn test_missing_key_inside_repeater_template_fails_bind() {
        let doc = Document::parse(
            "<ul><template for=\"items\"><li><template><b>x</b></template></li></template></ul>",
        )
        .expect("parse");
        let root = doc.root();

        let err = Binding::bind(doc, root, Store::new()).unwrap_err();
        assert_eq!(
            err,
            BindError::MissingRepeaterKey {
                tag: "template".to_string(),
                attribute: "for".to_string(),
            }
        );
    }

    #[test]
    fn test_unchanged_nan_is_not_rewritten() {
        let (mut binding, root) = bind("<p>{{n}}</p>", Store::new());
        binding.set("n", f64::NAN).expect("Failed to set n");
        assert_eq!(markup(&binding, root), "<p>NaN</p>");

        binding.host_mut().reset_stats();
        binding.render().expect("Failed to render");
        binding.set("n", f64::NAN).expect("Failed to set n");

        assert_eq!(binding.host().stats().total(), 0);
    }

    #[test]
    fn test_custom_options() {
        let doc = Document::parse(r#"<ul><repeat each="rows"><li>{{v}}</li></repeat></ul>"#)
            .expect("parse");
        let root = doc.root();
        let options = BindOptions {
            repeater_tag: "repeat".to_string(),
            key_attribute: "each".to_string(),
        };
        let mut binding = Binding::bind_with_options(doc, root, Store::new(), options)
            .expect("Failed to bind");

        binding.list("rows").push(json!({ "v": 1 })).expect("push");

        assert_eq!(binding.host().inner_markup(root), "<ul><li>1</li></ul>");
    }

    #[test]
    fn test_binding_a_subtree_leaves_the_rest_alone() {
        let doc = Document::parse("<p>{{a}}</p><section><p>{{a}}</p></section>").expect("parse");
        let section = doc.first_element("section").expect("section");
        let root = doc.root();
        let mut binding = Binding::bind(doc, section, Store::new()).expect("bind");

        binding.set("a", "in").expect("set a");

        assert_eq!(
            binding.host().inner_markup(root),
            "<p>{{a}}</p><section><p>in</p></section>"
        );
        assert_eq!(binding.host().parent(section), Some(root));
    }
}
