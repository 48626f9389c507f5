use std::path::PathBuf;

use bbmark_core::Dialect;
use bbmark_renderer::Theme;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "bbmark")]
#[command(version)]
#[command(about = "Render BBCode-style forum markup to HTML")]
#[command(after_help = "\
EXAMPLES:

    # Render a file to an HTML fragment
    bbmark post.bb

    # Render stdin as a standalone page with highlighted code
    cat post.bb | bbmark --standalone --highlight

    # Report the first tag that failed to render
    bbmark --strict post.bb

Example bbmark.toml:

    dialect = \"bbcode\"

    [render]
    paragraphs = true
    excluded_tags = [\"img\"]

    [emoticons]
    static_url = \"/static/\"
    directory = \"static/img/smileys\"

    [mentions]
    users = [{ id = 1, username = \"alice\" }]
")]
pub struct Cli {
    /// Input file; stdin when omitted
    pub input: Option<PathBuf>,

    /// Markup dialect: bbcode or plain
    #[arg(long)]
    pub dialect: Option<Dialect>,

    /// Split blank-line separated text into paragraphs
    #[arg(long)]
    pub paragraphs: bool,

    /// Leave bare URLs as text
    #[arg(long)]
    pub no_autolink: bool,

    /// Keep empty element pairs and newline runs
    #[arg(long)]
    pub no_cleanup: bool,

    /// Skip typographic quotes, dashes and symbols
    #[arg(long)]
    pub no_cosmetic: bool,

    /// Render unknown tags as text instead of dropping them
    #[arg(long)]
    pub render_unknown: bool,

    /// Drop a tag entirely (repeatable)
    #[arg(long = "exclude", value_name = "TAG")]
    pub exclude: Vec<String>,

    /// Pass the output through the HTML allow-list
    #[arg(long)]
    pub sanitize: bool,

    /// Truncate input longer than N chars
    #[arg(long, value_name = "N")]
    pub max_len: Option<usize>,

    /// Path to a TOML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Wrap the output in a complete HTML page
    #[arg(long)]
    pub standalone: bool,

    /// With --standalone, write bbmark.css and bbmark.js into DIR and link them
    #[arg(long, value_name = "DIR", requires = "standalone")]
    pub assets: Option<PathBuf>,

    /// Page theme for --standalone and --highlight
    #[arg(long, default_value = "auto")]
    pub theme: Theme,

    /// Syntax-highlight code blocks that name a language
    #[arg(long)]
    pub highlight: bool,

    /// Collect `[section=name]` contents and print them as JSON on stderr
    #[arg(long)]
    pub sections: bool,

    /// Fail on the first tag that renders as nothing
    #[arg(long)]
    pub strict: bool,
}
