//! Property-based tests for the prompt window and the cache prefix match

use proptest::prelude::*;

use ghostline_completion::{
    build_prompt, AcceptCommandArgs, CompletionItem, LinesDocument, Position, Range,
    SuggestionBatch, SuggestionCache, TextLimits,
};

fn line_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _().]{0,30}"
}

fn lines_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(line_strategy(), 0..8)
}

proptest! {
    /// A cursor line outside [1, line_count] never produces a payload
    #[test]
    fn prop_out_of_bounds_cursor_yields_none(
        lines in lines_strategy(),
        column in 1u32..40,
        beyond in 1u32..10,
    ) {
        let limits = TextLimits::default();
        let over = lines.len() as u32 + beyond;
        prop_assert!(build_prompt(&lines, Position::new(0, column), &limits, "p").is_none());
        prop_assert!(build_prompt(&lines, Position::new(over, column), &limits, "p").is_none());
    }

    /// Over-long before text is right-truncated to exactly the limit,
    /// keeping the tail nearest the cursor
    #[test]
    fn prop_before_truncation_keeps_exact_tail(
        text in "[a-z]{1,60}",
        limit in 1usize..20,
    ) {
        prop_assume!(text.len() > limit);
        let lines = vec![text.clone()];
        let cursor = Position::new(1, text.len() as u32 + 1);
        let limits = TextLimits { before_cursor: limit, after_cursor: 10 };

        let payload = build_prompt(&lines, cursor, &limits, "p").unwrap();
        let before = &payload.fragments[0];
        prop_assert_eq!(before.text.len(), limit);
        prop_assert_eq!(before.text.as_str(), &text[text.len() - limit..]);
    }

    /// Over-long after text is left-truncated to exactly the limit,
    /// keeping the head nearest the cursor
    #[test]
    fn prop_after_truncation_keeps_exact_head(
        text in "[a-z]{1,60}",
        limit in 1usize..20,
    ) {
        prop_assume!(text.len() > limit);
        let lines = vec![text.clone()];
        let cursor = Position::new(1, 1);
        let limits = TextLimits { before_cursor: 10, after_cursor: limit };

        let payload = build_prompt(&lines, cursor, &limits, "p").unwrap();
        let after = payload.fragments.last().unwrap();
        prop_assert_eq!(after.text.len(), limit);
        prop_assert_eq!(after.text.as_str(), &text[..limit]);
    }

    /// The builder is a pure function over its inputs
    #[test]
    fn prop_build_is_deterministic(
        lines in lines_strategy(),
        line in 1u32..10,
        column in 1u32..40,
    ) {
        let limits = TextLimits::default();
        let cursor = Position::new(line, column);
        let a = build_prompt(&lines, cursor, &limits, "p");
        let b = build_prompt(&lines, cursor, &limits, "p");
        prop_assert_eq!(a, b);
    }

    /// The window never exceeds its limits, whatever the document
    #[test]
    fn prop_fragments_respect_limits(
        lines in lines_strategy(),
        line in 1u32..10,
        column in 1u32..40,
        before_limit in 1usize..50,
        after_limit in 1usize..50,
    ) {
        let limits = TextLimits { before_cursor: before_limit, after_cursor: after_limit };
        if let Some(payload) = build_prompt(&lines, Position::new(line, column), &limits, "p") {
            for fragment in &payload.fragments {
                prop_assert!(fragment.text.len() <= before_limit.max(after_limit));
            }
        }
    }

    /// Once the typed text diverges from a cached suggestion, the match
    /// stays broken at every later cursor position on that text
    #[test]
    fn prop_cache_miss_is_monotonic(
        offered in "[a-z]{3,12}",
        diverge_at in 0usize..3,
    ) {
        prop_assume!(diverge_at < offered.len());

        // typed text agrees up to diverge_at, then differs permanently
        let mut typed = offered[..diverge_at].to_string();
        typed.push('9');
        typed.push_str(&offered[diverge_at..]);

        let mut cache = SuggestionCache::new();
        let anchor = Range::new(Position::new(1, 1), Position::new(1, 1));
        cache.set_batch(SuggestionBatch::new(
            vec![CompletionItem {
                label: offered.clone(),
                insert_text: offered.clone(),
                sort_text: "a".to_string(),
                pristine: offered.clone(),
                range: Some(anchor),
                command: AcceptCommandArgs::default(),
            }],
            "req-1".to_string(),
        ));

        let document = LinesDocument::new(vec![typed.clone()]);
        for column in (diverge_at + 2)..=(typed.len() + 1) {
            let hits = cache.cached_completions(&document, Position::new(1, column as u32));
            prop_assert!(
                hits.is_empty(),
                "diverged text matched again at column {}", column
            );
        }
    }
}
