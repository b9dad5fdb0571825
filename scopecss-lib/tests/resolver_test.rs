use scopecss_lib::scope::registry::COMMON_ELEMENT;
use scopecss_lib::{Error, ScopeConfig, ScopeResolver};

#[cfg(test)]
pub mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn local(scope: &str) -> ScopeResolver {
        ScopeResolver::new(ScopeConfig::local(scope))
    }

    fn global(scope: &str) -> ScopeResolver {
        ScopeResolver::new(ScopeConfig::global(scope))
    }

    fn values<'a>(set: Option<&'a std::collections::BTreeSet<String>>) -> Vec<&'a str> {
        set.map(|s| s.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_attribute_without_tag() {
        let mut resolver = local("s");
        assert_eq!(
            resolver.run("[data-foo=\"bar\"]").unwrap(),
            "._data-foo._data-foo_bar"
        );
        let common = resolver.elements().get(COMMON_ELEMENT).unwrap();
        assert_eq!(values(common.props.get("data-foo")), vec!["bar"]);
        assert!(common.mods.is_empty());
    }

    #[test]
    fn test_attribute_without_value() {
        let mut resolver = local("s");
        assert_eq!(resolver.run("[disabled]").unwrap(), "._disabled");
        let common = resolver.elements().get(COMMON_ELEMENT).unwrap();
        assert_eq!(values(common.props.get("disabled")), vec![""]);
    }

    #[test]
    fn test_namespaced_attribute_is_a_mod_of_its_tag() {
        let mut resolver = local("s");
        assert_eq!(
            resolver.run("button[s|size=\"m\"]").unwrap(),
            ".__button._s--size._s--size_m"
        );
        let button = resolver.elements().get("button").unwrap();
        assert_eq!(values(button.mods.get("s--size")), vec!["m"]);
        assert!(button.props.is_empty());
    }

    #[test]
    fn test_owner_lookup_skips_classes_and_pseudos() {
        let mut resolver = local("s");
        assert_eq!(
            resolver.run("input.big:hover[type='text']").unwrap(),
            ".__input.big:hover._type._type_text"
        );
        let input = resolver.elements().get("input").unwrap();
        assert_eq!(values(input.props.get("type")), vec!["text"]);
    }

    #[test]
    fn test_owner_lookup_accepts_id() {
        let mut resolver = local("s");
        assert_eq!(resolver.run("#main[open]").unwrap(), "#main._open");
        assert!(resolver.elements().get("main").unwrap().props.contains_key("open"));
    }

    #[test]
    fn test_owner_lookup_stops_at_combinator() {
        let mut resolver = local("s");
        assert_eq!(resolver.run("div [open]").unwrap(), ".__div ._open");
        assert!(resolver
            .elements()
            .get(COMMON_ELEMENT)
            .unwrap()
            .props
            .contains_key("open"));
    }

    #[test]
    fn test_namespaced_tags() {
        let mut resolver = local("s");
        assert_eq!(resolver.run("s|button").unwrap(), ".__s--button");
        assert!(resolver.elements().contains("s--button"));

        // Foreign and `*` namespaces are left alone.
        assert_eq!(resolver.run("other|button").unwrap(), "other|button");
        assert_eq!(resolver.run("*|button").unwrap(), "*|button");
    }

    #[test]
    fn test_namespace_combinator_marks_wildcard() {
        let mut resolver = local("s1");
        assert_eq!(resolver.run("|div").unwrap(), ".__s1--div");
        assert!(resolver.elements().contains("s1--div"));

        let mut resolver = local("s1");
        assert_eq!(
            resolver.run("s1|button |icon").unwrap(),
            ".__s1--button .__s1--icon"
        );
    }

    #[test]
    fn test_namespace_combinator_survives_unscoped() {
        let mut resolver = global("s1");
        assert_eq!(resolver.run("|div").unwrap(), "|div");
        assert!(resolver.elements().is_empty());

        let mut resolver = local("s1");
        assert_eq!(resolver.run("li:nth-child(|odd)").unwrap(), ".__li:nth-child(|odd)");
    }

    #[test]
    fn test_multi_selector_escape_keeps_every_alternative() {
        let mut resolver = local("s");
        assert_eq!(resolver.run(":global(.a, .b)").unwrap(), ":global(.a,.b)");
        assert_eq!(resolver.run(":global(.a, [b])").unwrap(), ":global(.a,[b])");
        assert_eq!(
            resolver.run(":global(.a, button[b]) span").unwrap(),
            ":global(.a,button[b]) .__span"
        );
        assert!(!resolver.elements().contains("button"));

        let mut resolver = global("s");
        assert_eq!(
            resolver.run(":local(.a, button[b])").unwrap(),
            ":local(.a,.__button._b)"
        );
        assert!(resolver.elements().get("button").unwrap().props.contains_key("b"));
    }

    #[test]
    fn test_global_escape_in_local_mode() {
        let mut resolver = local("s");
        assert_eq!(resolver.run(":global(.link)").unwrap(), ".link");
        assert_eq!(
            resolver.run(":global(button[open]) span").unwrap(),
            "button[open] .__span"
        );
        assert!(!resolver.elements().contains("button"));
        assert!(resolver.elements().get(COMMON_ELEMENT).is_none());
    }

    #[test]
    fn test_local_escape_in_global_mode() {
        let mut resolver = global("s");
        assert_eq!(resolver.run(":local(.link)").unwrap(), ".link");
        assert_eq!(
            resolver.run("main :local(button[s|size=m])").unwrap(),
            "main .__button._s--size._s--size_m"
        );
        let button = resolver.elements().get("button").unwrap();
        assert_eq!(values(button.mods.get("s--size")), vec!["m"]);
        assert!(!resolver.elements().contains("main"));
    }

    #[test]
    fn test_global_mode_leaves_plain_selectors() {
        let mut resolver = global("s");
        assert_eq!(
            resolver.run("button[disabled] > span").unwrap(),
            "button[disabled]>span"
        );
        assert!(resolver.elements().is_empty());
    }

    #[test]
    fn test_skipped_pseudos() {
        let mut resolver = local("s");
        assert_eq!(
            resolver.run("li:nth-child(2n + 1)").unwrap(),
            ".__li:nth-child(2n+1)"
        );
        assert_eq!(resolver.run(":dir(rtl) [open]").unwrap(), ":dir(rtl) ._open");
        assert!(!resolver.elements().contains("rtl"));
        assert!(!resolver.elements().contains("2n"));
    }

    #[test]
    fn test_only_the_immediate_pseudo_counts() {
        let mut resolver = local("s");
        // `button` sits inside `:not`, so the outer `:global` does not escape it.
        assert_eq!(
            resolver.run(":global(:not(button))").unwrap(),
            ":not(.__button)"
        );
        assert!(resolver.elements().contains("button"));
    }

    #[test]
    fn test_selector_lists() {
        let mut resolver = local("s");
        assert_eq!(
            resolver.run("a[href], s|icon:hover").unwrap(),
            ".__a._href,.__s--icon:hover"
        );
    }

    #[test]
    fn test_same_input_same_classes() {
        let mut first = local("s");
        let mut second = local("s");
        let rule = "s|tab[s|active=true] > label[for]";
        assert_eq!(first.run(rule).unwrap(), second.run(rule).unwrap());
        assert_eq!(first.run(rule).unwrap(), second.run(rule).unwrap());
    }

    #[test]
    fn test_state_carries_registry_between_resolvers() {
        let mut first = local("s");
        first.run("button[s|size=s]").unwrap();

        let mut second = local("s");
        second.set_state(first.state());
        second.run("button[s|size=l]").unwrap();

        let button = second.state().elements.get("button").cloned().unwrap();
        assert_eq!(values(button.mods.get("s--size")), vec!["l", "s"]);
        // The first resolver's registry is untouched.
        let earlier = first.elements().get("button").unwrap();
        assert_eq!(values(earlier.mods.get("s--size")), vec!["s"]);
    }

    #[test]
    fn test_attribute_hashes_per_run() {
        let mut resolver = local("s");
        resolver.run("[s|size=m][open]").unwrap();
        let hashes: Vec<&str> = resolver
            .attribute_hashes()
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(hashes, vec!["open", "ssizem"]);

        resolver.run("[hidden]").unwrap();
        assert_eq!(resolver.attribute_hashes().len(), 1);
    }

    #[test]
    fn test_malformed_selector_propagates() {
        let mut resolver = local("s");
        assert!(matches!(
            resolver.run("button[size"),
            Err(Error::Selector { .. })
        ));
        assert!(resolver.elements().is_empty());
    }
}
