use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme as SyntectTheme, ThemeSet};
use syntect::html::{IncludeBackground, styled_line_to_highlighted_html};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

const BASE_CSS: &str = include_str!("../assets/bbmark.css");
const BASE_JS: &str = include_str!("../assets/bbmark.js");

const PRE_TAG: &str = "<pre class=\"language-";
const PRE_CLOSE: &str = "</pre>";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Auto,
    Light,
    Dark,
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "auto" => Ok(Theme::Auto),
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme {other:?} (expected auto, light or dark)")),
        }
    }
}

/// How a page refers to the stylesheet and the spoiler script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Assets {
    /// Both are embedded in the page.
    #[default]
    Inline,
    /// `bbmark.css` and `bbmark.js` next to the page, as written by [`Renderer::generate_files`].
    Linked,
    Omitted,
}

/// Page colors as `(name, light, dark)`. Every name becomes a `--bbmark-<name>` variable.
const PALETTE: &[(&str, &str, &str)] = &[
    ("bg", "#fbfbf8", "#0e1116"),
    ("fg", "#1f2328", "#e6edf3"),
    ("muted", "#5f6b76", "#9aa4af"),
    ("border", "#d8dee4", "#2a313b"),
    ("accent", "#2b6cb0", "#63b3ed"),
    ("code-bg", "#f4f6f8", "#202634"),
    ("code-fg", "#1f2328", "#f0f6fc"),
    ("quote-bg", "#f7f6f1", "#1b212b"),
    ("quote-border", "#c9c2b8", "#2d3440"),
    ("mention", "#8a4b08", "#f0b86e"),
];

const VAR_PREFIX: &str = "--bbmark-";

#[derive(Clone, Copy)]
enum Shade {
    Light,
    Dark,
}

const SPOILER_TOGGLE: &str = "data-toggle=\"collapse\"";

/// Wraps rendered posts in a themed HTML page and highlights their code blocks.
#[derive(Debug, Clone)]
pub struct Renderer {
    theme: Theme,
    title: Option<String>,
    overrides: BTreeMap<String, String>,
}

impl Renderer {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            title: None,
            overrides: BTreeMap::new(),
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Overrides a palette color. `name` may be given with or without the `--bbmark-` prefix.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let name = match name.strip_prefix(VAR_PREFIX) {
            Some(short) => short.to_string(),
            None => name,
        };
        self.overrides.insert(name, value.into());
        self
    }

    pub fn stylesheet(&self) -> String {
        let mut css = String::new();
        match self.theme {
            Theme::Light => self.push_palette(&mut css, "", Shade::Light),
            Theme::Dark => self.push_palette(&mut css, "", Shade::Dark),
            Theme::Auto => {
                self.push_palette(&mut css, "", Shade::Light);
                css.push_str("@media (prefers-color-scheme: dark) {\n");
                self.push_palette(&mut css, "  ", Shade::Dark);
                css.push_str("}\n");
            }
        }
        css.push_str(BASE_CSS);
        css
    }

    fn push_palette(&self, css: &mut String, indent: &str, shade: Shade) {
        css.push_str(&format!("{indent}:root {{\n{indent}  color-scheme: light dark;\n"));
        for &(name, light, dark) in PALETTE {
            let value = match (self.overrides.get(name), shade) {
                (Some(value), _) => value.as_str(),
                (None, Shade::Light) => light,
                (None, Shade::Dark) => dark,
            };
            css.push_str(&format!("{indent}  {VAR_PREFIX}{name}: {value};\n"));
        }
        for (name, value) in &self.overrides {
            if !PALETTE.iter().any(|entry| entry.0 == name.as_str()) {
                css.push_str(&format!("{indent}  {VAR_PREFIX}{name}: {value};\n"));
            }
        }
        css.push_str(&format!("{indent}}}\n"));
    }

    /// A complete page around a rendered post. The spoiler script is only added when the
    /// post has spoilers.
    pub fn page(&self, post_html: &str, assets: Assets) -> String {
        let title = escape_html_code(self.title.as_deref().unwrap_or("bbmark"));
        let needs_script = post_html.contains(SPOILER_TOGGLE);
        let (style, script) = match assets {
            Assets::Inline => (
                format!("  <style>\n{}\n  </style>\n", self.stylesheet()),
                needs_script
                    .then(|| format!("  <script>\n{BASE_JS}\n  </script>\n"))
                    .unwrap_or_default(),
            ),
            Assets::Linked => (
                "  <link rel=\"stylesheet\" href=\"bbmark.css\" />\n".to_string(),
                needs_script
                    .then(|| "  <script src=\"bbmark.js\" defer></script>\n".to_string())
                    .unwrap_or_default(),
            ),
            Assets::Omitted => (String::new(), String::new()),
        };
        let newline = if post_html.ends_with('\n') { "" } else { "\n" };
        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n  <meta charset=\"utf-8\" />\n  \
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n  \
             <title>{title}</title>\n{style}{script}</head>\n<body>\n<article class=\"bbmark\">\n\
             {post_html}{newline}</article>\n</body>\n</html>\n"
        )
    }

    /// Writes `bbmark.css` and `bbmark.js` for pages built with [`Assets::Linked`].
    pub fn generate_files(&self, out_dir: &Path) -> io::Result<()> {
        fs::create_dir_all(out_dir)?;
        fs::write(out_dir.join("bbmark.css"), self.stylesheet())?;
        fs::write(out_dir.join("bbmark.js"), BASE_JS)?;
        log::debug!("page assets written to {}", out_dir.display());
        Ok(())
    }

    /// Colors the contents of `<pre class="language-…">` blocks. Blocks in a language
    /// syntect does not know are left as they are.
    pub fn highlight_html(&self, html: &str) -> String {
        if !html.contains(PRE_TAG) {
            return html.to_string();
        }
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let theme_set = ThemeSet::load_defaults();
        match pick_theme(self.theme, &theme_set) {
            Some(theme) => highlight_html_inner(html, &syntax_set, theme),
            None => {
                log::warn!("no highlighting theme available");
                html.to_string()
            }
        }
    }
}

fn pick_theme(theme: Theme, theme_set: &ThemeSet) -> Option<&SyntectTheme> {
    let candidates = match theme {
        Theme::Dark => ["Monokai Extended Bright", "Monokai Extended", "base16-ocean.dark"],
        Theme::Light | Theme::Auto => ["InspiredGitHub", "Solarized (light)", "base16-ocean.light"],
    };
    candidates
        .iter()
        .find_map(|name| theme_set.themes.get(*name))
        .or_else(|| theme_set.themes.values().next())
}

fn highlight_html_inner(html: &str, syntax_set: &SyntaxSet, theme: &SyntectTheme) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(start) = rest.find(PRE_TAG) {
        out.push_str(&rest[..start]);
        let block = &rest[start..];
        let Some(open_end) = block.find('>') else {
            out.push_str(block);
            return out;
        };
        let Some(close) = block.find(PRE_CLOSE) else {
            out.push_str(block);
            return out;
        };
        if close < open_end {
            out.push_str(&block[..open_end + 1]);
            rest = &block[open_end + 1..];
            continue;
        }
        let open_tag = &block[..=open_end];
        let code = &block[open_end + 1..close];
        out.push_str(open_tag);
        match extract_language(open_tag).and_then(|lang| syntax_set.find_syntax_by_token(&lang)) {
            Some(syntax) => out.push_str(&highlight_code(code, syntax_set, syntax, theme)),
            None => out.push_str(code),
        }
        out.push_str(PRE_CLOSE);
        rest = &block[close + PRE_CLOSE.len()..];
    }

    out.push_str(rest);
    out
}

fn highlight_code(
    code_html: &str,
    syntax_set: &SyntaxSet,
    syntax: &SyntaxReference,
    theme: &SyntectTheme,
) -> String {
    let code = unescape_html_code(code_html);
    let mut highlighter = HighlightLines::new(syntax, theme);
    let mut out = String::with_capacity(code_html.len() * 2);
    for line in LinesWithEndings::from(&code) {
        out.push_str(&highlight_line(line, syntax_set, &mut highlighter));
    }
    out
}

fn highlight_line(line: &str, syntax_set: &SyntaxSet, highlighter: &mut HighlightLines) -> String {
    match highlighter.highlight_line(line, syntax_set) {
        Ok(ranges) => match styled_line_to_highlighted_html(&ranges, IncludeBackground::No) {
            Ok(html) => strip_font_weight(&html),
            Err(_) => escape_html_code(line),
        },
        Err(_) => escape_html_code(line),
    }
}

fn extract_language(pre_tag: &str) -> Option<String> {
    let class_attr = extract_attr(pre_tag, "class")?;
    class_attr
        .split_whitespace()
        .filter_map(|class_name| class_name.strip_prefix("language-"))
        .find(|lang| !lang.is_empty())
        .map(str::to_string)
}

fn extract_attr(tag: &str, name: &str) -> Option<String> {
    let needle = format!("{}=\"", name);
    let start = tag.find(&needle)? + needle.len();
    let end = tag[start..].find('"')?;
    Some(tag[start..start + end].to_string())
}

fn escape_html_code(text: &str) -> String {
    let mut out = String::new();
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn unescape_html_code(text: &str) -> String {
    let mut out = String::new();
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some(stripped) = tail.strip_prefix("&amp;") {
            out.push('&');
            rest = stripped;
        } else if let Some(stripped) = tail.strip_prefix("&lt;") {
            out.push('<');
            rest = stripped;
        } else if let Some(stripped) = tail.strip_prefix("&gt;") {
            out.push('>');
            rest = stripped;
        } else if let Some(stripped) = tail.strip_prefix("&quot;") {
            out.push('"');
            rest = stripped;
        } else {
            out.push('&');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

fn strip_font_weight(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(pos) = rest.find("font-weight:") {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos + "font-weight:".len()..];
        let end = match tail.find(';') {
            Some(index) => index + 1,
            None => {
                rest = "";
                break;
            }
        };
        rest = &tail[end..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::{Assets, Renderer, Theme, unescape_html_code};

    #[test]
    fn inline_page_embeds_css_and_spoiler_script() {
        let renderer = Renderer::new(Theme::Light).with_title("Post <1>");
        let post = "<div class=\"spoiler\"><a data-toggle=\"collapse\" href=\"#spoiler-0\">s</a></div>";
        let html = renderer.page(post, Assets::Inline);
        assert!(html.contains("<title>Post &lt;1&gt;</title>"));
        assert!(html.contains("<style>"));
        assert!(html.contains("--bbmark-bg: #fbfbf8;"));
        assert!(html.contains("<script>"));
        assert!(html.contains(&format!("<article class=\"bbmark\">\n{post}\n</article>")));
    }

    #[test]
    fn script_is_left_out_without_spoilers() {
        let renderer = Renderer::new(Theme::Dark);
        let inline = renderer.page("<strong>Hi</strong>", Assets::Inline);
        assert!(inline.contains("--bbmark-bg: #0e1116;"));
        assert!(!inline.contains("<script"));
        let linked = renderer.page("<strong>Hi</strong>", Assets::Linked);
        assert!(linked.contains("href=\"bbmark.css\""));
        assert!(!linked.contains("<style>"));
        let bare = renderer.page("<strong>Hi</strong>", Assets::Omitted);
        assert!(!bare.contains("<style>") && !bare.contains("<link"));
        assert!(bare.contains("<title>bbmark</title>"));
    }

    #[test]
    fn auto_theme_switches_on_color_scheme() {
        let css = Renderer::new(Theme::Auto)
            .with_var("--bbmark-accent", "red")
            .with_var("spoiler-bg", "#eee")
            .stylesheet();
        assert!(css.contains("@media (prefers-color-scheme: dark)"));
        assert!(css.contains("  --bbmark-accent: red;\n"));
        assert!(css.contains("    --bbmark-accent: red;\n"));
        assert!(css.contains("  --bbmark-spoiler-bg: #eee;\n"));
        assert!(!css.contains("#63b3ed"));
    }

    #[test]
    fn generated_files_hold_the_stylesheet() {
        let dir = std::env::temp_dir().join(format!("bbmark_assets_{}", std::process::id()));
        let renderer = Renderer::new(Theme::Light);
        renderer.generate_files(&dir).unwrap();
        let css = std::fs::read_to_string(dir.join("bbmark.css")).unwrap();
        assert_eq!(css, renderer.stylesheet());
        assert!(dir.join("bbmark.js").exists());
    }

    #[test]
    fn highlight_colors_known_languages() {
        let renderer = Renderer::new(Theme::Light);
        let html = "<div class=\"code\"><pre class=\"language-rust\">let x = &quot;a&quot;;\nlet y = 1;</pre></div>";
        let highlighted = renderer.highlight_html(html);
        assert!(highlighted.starts_with("<div class=\"code\"><pre class=\"language-rust\">"));
        assert!(highlighted.ends_with("</pre></div>"));
        assert!(highlighted.contains("style=\""));
        assert!(!highlighted.contains("font-weight"));
    }

    #[test]
    fn unknown_languages_and_plain_blocks_are_untouched() {
        let renderer = Renderer::new(Theme::Dark);
        let html = "<div class=\"code\"><pre class=\"language-nope\">a &lt; b</pre></div><pre>x</pre>";
        assert_eq!(renderer.highlight_html(html), html);
    }

    #[test]
    fn themes_parse_case_insensitively() {
        assert_eq!("Dark".parse::<Theme>(), Ok(Theme::Dark));
        assert!("sepia".parse::<Theme>().is_err());
    }

    #[test]
    fn unescape_leaves_bare_ampersands() {
        assert_eq!(unescape_html_code("a &amp; b & c &lt;"), "a & b & c <");
    }
}
