//! Binding is total and deterministic over arbitrary input.

use draftline::binder::bind;
use draftline::template::TemplateRegistry;
use draftline::types::{DocumentCategory, GenerationRequest};
use proptest::prelude::*;

fn category() -> impl Strategy<Value = DocumentCategory> {
    prop::sample::select(DocumentCategory::ALL.to_vec())
}

proptest! {
    #[test]
    fn bind_is_deterministic(
        category in category(),
        client in proptest::option::of(".{0,24}"),
        details in ".{1,200}",
    ) {
        let registry = TemplateRegistry::builtin().unwrap();
        let request = GenerationRequest::new(category, client, details);
        let template = registry.lookup(category);
        prop_assert_eq!(bind(template, &request), bind(template, &request));
    }

    #[test]
    fn details_appear_verbatim(
        category in category(),
        details in "[a-zA-Z0-9 {}#/.,!é•-]{1,120}",
    ) {
        let registry = TemplateRegistry::builtin().unwrap();
        let request = GenerationRequest::new(category, None, details.clone());
        let text = bind(registry.lookup(category), &request);
        prop_assert!(text.contains(&details));
    }

    #[test]
    fn blank_client_renders_like_no_client(
        category in category(),
        blank in "[ \t]{0,6}",
        details in "[a-z ]{1,40}",
    ) {
        let registry = TemplateRegistry::builtin().unwrap();
        let template = registry.lookup(category);
        let with_blank = GenerationRequest::new(category, Some(blank), details.clone());
        let without = GenerationRequest::new(category, None, details);
        prop_assert_eq!(bind(template, &with_blank), bind(template, &without));
    }
}
