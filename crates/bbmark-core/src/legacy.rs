use std::borrow::Cow;

const LEGACY_TAGS: &[(&str, &str)] = &[
    ("[ita]", "[i]"),
    ("[bold]", "[b]"),
    ("[under]", "[u]"),
    ("[/ita]", "[/i]"),
    ("[/bold]", "[/b]"),
    ("[/under]", "[/u]"),
];

/// Rewrites the old `[ita]`, `[bold]` and `[under]` spellings to their current tags.
pub fn rewrite_legacy_tags(markup: &str) -> Cow<'_, str> {
    if !LEGACY_TAGS.iter().any(|(old, _)| markup.contains(old)) {
        return Cow::Borrowed(markup);
    }
    let mut out = markup.to_string();
    for (old, new) in LEGACY_TAGS {
        if out.contains(old) {
            out = out.replace(old, new);
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::rewrite_legacy_tags;
    use std::borrow::Cow;

    #[test]
    fn rewrites_old_spellings() {
        assert_eq!(
            rewrite_legacy_tags("[bold]a[/bold] [ita]b[/ita] [under]c[/under]"),
            "[b]a[/b] [i]b[/i] [u]c[/u]"
        );
    }

    #[test]
    fn leaves_current_markup_borrowed() {
        assert!(matches!(rewrite_legacy_tags("[b]a[/b]"), Cow::Borrowed(_)));
    }
}
