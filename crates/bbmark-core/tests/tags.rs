use bbmark_core::{
    Markup, RenderOptions, TagCall, TagDescriptor, TagError, TagFlags, TagRegistry, TagRender,
    escape, render,
};

fn html(markup: &str) -> String {
    render(markup, &RenderOptions::default())
}

#[test]
fn links_normalize_their_target() {
    assert_eq!(
        html("[url=http://example.com]site[/url]"),
        "<a href=\"http://example.com/\">site</a>"
    );
    assert_eq!(
        html("[link]example.com/a[/link]"),
        "<a href=\"http://example.com/a\">example.com/a</a>"
    );
}

#[test]
fn links_with_bad_targets_keep_their_text() {
    assert_eq!(html("[url=javascript:alert(1)]x[/url]"), "x");
    assert_eq!(html("[url][/url]"), "");
}

#[test]
fn annotated_links_name_their_domain() {
    let registry = TagRegistry::builder().annotate_links(true).build();
    let markup = Markup::new(registry);
    assert_eq!(
        markup.render("[url=http://www.example.com/a]site[/url]"),
        "<a href=\"http://www.example.com/a\">site</a> [example.com]"
    );
    assert_eq!(
        markup.render("[wiki]rust[/wiki]"),
        "<a href=\"http://en.wikipedia.org/wiki/Special:Search?search=rust\">rust</a> [wikipedia.com]"
    );
}

#[test]
fn search_tags_encode_their_query() {
    assert_eq!(
        html("[wiki]rust lang[/wiki]"),
        "<a href=\"http://en.wikipedia.org/wiki/Special:Search?search=rust+lang\">rust lang</a>"
    );
    assert_eq!(
        html("[dict=café]word[/dict]"),
        "<a href=\"http://dictionary.reference.com/browse/caf%C3%A9\">word</a>"
    );
}

#[test]
fn images_take_the_url_from_contents_or_params() {
    assert_eq!(
        html("[img]http://a.com/x.png[/img]"),
        "<img src=\"http://a.com/x.png\" alt=\"\"/>"
    );
    assert_eq!(
        html("[img=http://a.com/x.png]"),
        "<img src=\"http://a.com/x.png\" alt=\"\"/>"
    );
    assert_eq!(html("[img]javascript:alert(1)[/img]"), "");
}

#[test]
fn image_urls_are_not_autolinked() {
    let out = html("[img]http://a.com/x.png[/img] http://b.com");
    assert_eq!(
        out,
        "<img src=\"http://a.com/x.png\" alt=\"\"/> <a href=\"http://b.com/\">http://b.com</a>"
    );
}

#[test]
fn split_images_render_once() {
    let out = html("[img]http://a.com/x.png[center]c[/center]d[/img]");
    assert_eq!(out.matches("<img").count(), 1, "{out}");
}

#[test]
fn urls_inside_strike_through_stay_text() {
    assert_eq!(
        html("[s]http://y.com[/s] http://z.com"),
        "<strike>http://y.com</strike> <a href=\"http://z.com/\">http://z.com</a>"
    );
}

#[test]
fn tags_inside_code_do_not_stop_autolinking() {
    let out = html("[code][url]x[/code] see http://y.com");
    assert!(out.contains("[url]x"), "{out}");
    assert!(out.ends_with("see <a href=\"http://y.com/\">http://y.com</a>"), "{out}");
}

#[test]
fn list_styles() {
    assert_eq!(
        html("[list=1][*]a[*]b[/list]"),
        "<ol><li>a</li><li>b</li></ol>"
    );
    assert_eq!(
        html("[list=a][*]a[/list]"),
        "<ol style=\"list-style-type: lower-alpha;\"><li>a</li></ol>"
    );
    assert_eq!(
        html("[ol][li]a[li]b[/ol]"),
        "<ol><li>a</li><li>b</li></ol>"
    );
}

#[test]
fn nested_lists_collapse_into_the_outer_list() {
    assert_eq!(
        html("[list][*]a[list][*]b[/list][/list]"),
        "<ul><li>a</li><li>b</li></ul>"
    );
}

#[test]
fn size_is_clamped() {
    assert_eq!(
        html("[size=12]x[/size]"),
        "<span style=\"font-size:12px\">x</span>"
    );
    assert_eq!(
        html("[size=200]x[/size]"),
        "<span style=\"font-size:64px\">x</span>"
    );
    assert_eq!(html("[size=big]x[/size]"), "x");
}

#[test]
fn colors_accept_names_and_hex() {
    assert_eq!(
        html("[color=ff0000]x[/color]"),
        "<span style=\"color:#ff0000\">x</span>"
    );
    assert_eq!(
        html("[color=Red]x[/color]"),
        "<span style=\"color:red\">x</span>"
    );
}

#[test]
fn center_and_quote() {
    assert_eq!(
        html("[center]x[/center]"),
        "<div style=\"text-align:center;\">x</div>"
    );
    assert_eq!(
        html("[quote=Will]hi[/quote]"),
        "<blockquote><em>Will</em><br/>hi</blockquote>"
    );
    assert_eq!(html("[quote]\nhi[/quote]"), "<blockquote>hi</blockquote>");
}

#[test]
fn code_keeps_newlines_and_escapes() {
    assert_eq!(
        html("[code=Rust]let x = \"a\";[/code]"),
        "<div class=\"code\"><pre class=\"language-rust\">let x = &quot;a&quot;;</pre></div>"
    );
    assert_eq!(
        html("[code]\na\nb\n[/code]"),
        "<div class=\"code\"><pre>a\nb</pre></div>"
    );
    assert_eq!(
        html("[code]http://x.com --[/code]"),
        "<div class=\"code\"><pre>http://x.com --</pre></div>"
    );
}

#[test]
fn spoilers_get_unique_ids() {
    assert_eq!(
        html("[spoiler]x[/spoiler]"),
        "<div class=\"spoiler\"><div class=\"spoiler-heading\">\
         <a data-toggle=\"collapse\" href=\"#spoiler-0\" aria-expanded=\"false\" aria-controls=\"spoiler-0\">Spoiler</a>\
         </div><div id=\"spoiler-0\" class=\"spoiler-body collapse\">x</div></div>"
    );
    let out = html("[spoiler=Ending]a[/spoiler][spoiler]b[/spoiler]");
    assert!(out.contains(">Ending</a>"));
    assert_eq!(out.matches("id=\"spoiler-").count(), 2);
    assert!(out.contains("id=\"spoiler-3\""));
}

#[test]
fn videos_embed_known_hosts() {
    assert_eq!(
        html("[video]https://www.youtube.com/embed/abc[/video]"),
        "<div class=\"embed-responsive embed-responsive-16by9\">\
         <iframe class=\"embed-responsive-item\" src=\"https://www.youtube.com/embed/abc\" frameborder=\"0\" allowfullscreen=\"true\"></iframe></div>"
    );
    assert_eq!(
        html("[video]http://a.com/v.mp4[/video]"),
        "<video loop=\"true\" controls=\"true\" src=\"http://a.com/v.mp4\"></video>"
    );
}

#[test]
fn block_tags_split_inline_tags() {
    assert_eq!(
        html("[i]a[quote]b[/quote]c[/i]"),
        "<em>a</em><blockquote><em>b</em></blockquote><em>c</em>"
    );
    assert_eq!(
        html("[b][i]x[/b]y[/i]"),
        "<strong><em>x</em></strong><em>y</em>"
    );
}

#[test]
fn registry_filters_standard_tags() {
    let registry = TagRegistry::builder().include(["b", "i"]).exclude(["i"]).build();
    assert_eq!(registry.tag_names(), vec!["b"]);
    let markup = Markup::new(registry);
    assert_eq!(markup.render("[b]x[/b][i]y[/i]"), "<strong>x</strong>y");
    assert!(TagRegistry::new().is_empty());
    assert!(TagRegistry::standard().contains("*"));
}

struct Shout;

impl TagRender for Shout {
    fn render_open(&self, call: &mut TagCall<'_>) -> Result<Option<String>, TagError> {
        let loud = call.contents().to_uppercase();
        call.skip_contents();
        Ok(Some(escape(&loud)))
    }
}

struct Refuse;

impl TagRender for Refuse {
    fn render_open(&self, call: &mut TagCall<'_>) -> Result<Option<String>, TagError> {
        Err(TagError::Custom(format!("{} is not allowed", call.name())))
    }
}

#[test]
fn custom_tags_render_through_the_registry() {
    let registry = TagRegistry::builder()
        .tag("shout", TagDescriptor::custom(TagFlags::INLINE, Shout))
        .tag("refuse", TagDescriptor::custom(TagFlags::INLINE, Refuse))
        .build();
    let markup = Markup::new(registry);
    assert_eq!(markup.render("[shout]hi <b>[/shout]!"), "HI &lt;B&gt;!");
    assert_eq!(markup.render("[refuse]x[/refuse]"), "x");

    let err = markup.try_render("ok [refuse]x[/refuse]").unwrap_err();
    assert_eq!(err.span().map(|span| span.start), Some(3));
    assert!(err.to_string().contains("refuse is not allowed"));
}
