use bbmark_core::{Markup, RenderOptions, TagDescriptor, TagRegistry, cleanup_html, render};

fn html(markup: &str) -> String {
    render(markup, &RenderOptions::default())
}

#[test]
fn balanced_tags_map_to_elements() {
    assert_eq!(html("[b]hello[/b]"), "<strong>hello</strong>");
    assert_eq!(html("[i]a[/i] [u]b[/u] [s]c[/s]"), "<em>a</em> <u>b</u> <strike>c</strike>");
}

#[test]
fn tag_names_are_case_insensitive() {
    assert_eq!(html("[B]x[/b]"), "<strong>x</strong>");
}

#[test]
fn multibyte_whitespace_separates_tag_params() {
    assert_eq!(html("[b\u{a0}x]hi[/b]"), "<strong>hi</strong>");
    assert_eq!(html("[b\u{3000}]\u{e9}t\u{e9}"), "<strong>\u{e9}t\u{e9}</strong>");
}

#[test]
fn unknown_tags_are_dropped_by_default() {
    assert_eq!(html("[foo]bar[/foo]"), "bar");
}

#[test]
fn unknown_tags_render_literally_when_enabled() {
    let options = RenderOptions {
        render_unknown_tags: true,
        ..RenderOptions::default()
    };
    assert_eq!(render("[foo]bar[/foo]", &options), "[foo]bar[/foo]");
    assert_eq!(
        render("[foo=\"<x>\"]", &options),
        "[foo=&quot;&lt;x&gt;&quot;]"
    );
}

#[test]
fn overlapping_tags_are_repaired() {
    assert_eq!(
        html("[b]bold [i]both[/b] italic[/i]"),
        "<strong>bold <em>both</em></strong><em> italic</em>"
    );
}

#[test]
fn enclosed_tags_keep_markup_literal() {
    assert_eq!(
        html("[code][b]not bold[/b][/code]"),
        "<div class=\"code\"><pre>[b]not bold[/b]</pre></div>"
    );
}

#[test]
fn text_is_escaped() {
    let out = html("<script>alert(1)</script> & \"q\"");
    assert!(!out.contains("<script>"));
    assert!(out.starts_with("&lt;script&gt;alert(1)&lt;/script&gt; &amp; "));
}

#[test]
fn explicit_links_are_not_autolinked_again() {
    let out = html("[url]http://x.com[/url]");
    assert_eq!(out, "<a href=\"http://x.com/\">http://x.com</a>");
    assert_eq!(out.matches("<a ").count(), 1);
}

#[test]
fn bare_urls_are_autolinked() {
    assert_eq!(
        html("go to http://x.com/a."),
        "go to <a href=\"http://x.com/a\">http://x.com/a</a>."
    );
    let options = RenderOptions {
        auto_link_urls: false,
        ..RenderOptions::default()
    };
    assert_eq!(render("http://x.com", &options), "http://x.com");
}

#[test]
fn nested_links_collapse() {
    assert_eq!(
        html("[url][url]http://x.com[/url][/url]"),
        "<a href=\"http://x.com/\">http://x.com</a>"
    );
}

#[test]
fn unmatched_close_tags_are_ignored() {
    assert_eq!(html("hello[/b]world"), "helloworld");
}

#[test]
fn unclosed_tags_close_at_the_end() {
    assert_eq!(html("[b]x"), "<strong>x</strong>");
}

#[test]
fn list_items_need_no_close() {
    assert_eq!(html("line1[*]line2"), "line1line2");
    assert_eq!(
        html("[list][*]a[*]b[/list]"),
        "<ul><li>a</li><li>b</li></ul>"
    );
}

#[test]
fn empty_and_bracket_only_input() {
    assert_eq!(html(""), "");
    assert_eq!(html("a]b[c"), "a]b[c");
    assert_eq!(html("[ not a tag"), "[ not a tag");
    assert_eq!(html("[/]"), "");
}

#[test]
fn cleanup_is_optional() {
    let options = RenderOptions {
        cleanup_empty_tags: false,
        ..RenderOptions::default()
    };
    assert_eq!(render("[b][/b]", &options), "<strong></strong>");
    assert_eq!(html("[b][/b]"), " ");
    let once = html("[b][i] [/i][/b]\n[code]a\n\n\nb[/code]");
    assert_eq!(cleanup_html(&once).unwrap(), once);
}

#[test]
fn paragraphs_split_on_blank_lines() {
    let options = RenderOptions {
        paragraphs: true,
        ..RenderOptions::default()
    };
    assert_eq!(render("a\n\n\n\nb", &options), "<p>a</p><p>b</p>");
}

#[test]
fn cosmetic_replacements() {
    assert_eq!(html("a -- b..."), "a &ndash; b&#8230;");
    let options = RenderOptions {
        cosmetic_replace: false,
        ..RenderOptions::default()
    };
    assert_eq!(render("a -- b...", &options), "a -- b...");
}

#[test]
fn excluded_tags_are_dropped() {
    let options = RenderOptions::default().exclude_tag("B");
    assert_eq!(render("[b]x[/b] [i]y[/i]", &options), "x <em>y</em>");
}

#[test]
fn newlines_become_breaks() {
    assert_eq!(html("a\r\nb"), "a<br/>b");
}

#[test]
fn sanitize_keeps_standard_output() {
    let options = RenderOptions {
        sanitize: true,
        ..RenderOptions::default()
    };
    assert_eq!(
        render("[b]x[/b] [color=red]y[/color]", &options),
        "<strong>x</strong> <span style=\"color:red\">y</span>"
    );
}

#[test]
fn sections_are_collected() {
    let registry = TagRegistry::builder()
        .tag("section", TagDescriptor::section())
        .build();
    let markup = Markup::new(registry);
    let rendered = markup.render_document("[section=Side Bar]hi [b]x[/b][/section]rest");
    assert_eq!(rendered.html, "rest");
    assert_eq!(rendered.sections["side_bar"], vec!["hi [b]x[/b]"]);
}

#[test]
fn sectioned_markup_collects_without_a_custom_registry() {
    let rendered = Markup::with_sections().render_document("a[section=notes]n[/section]");
    assert_eq!(rendered.html, "a");
    assert_eq!(rendered.sections["notes"], vec!["n"]);
    assert!(Markup::standard().render_document("[section=notes]n[/section]").sections.is_empty());
}

#[test]
fn concurrent_renders_share_one_registry() {
    let markup = Markup::standard();
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|n| {
                let markup = &markup;
                scope.spawn(move || markup.render(&format!("[b]{n}[/b]")))
            })
            .collect();
        for (n, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), format!("<strong>{n}</strong>"));
        }
    });
}
