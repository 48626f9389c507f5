mod cli;
mod config;

use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process;

use bbmark_core::{ContentRenderer, Markup, RenderError, RenderOptions, Rendered, SourceMap};
use bbmark_renderer::{Assets, Renderer};
use clap::Parser;

use crate::cli::Cli;
use crate::config::Config;

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).unwrap_or_else(|err| {
        eprintln!("{}", err);
        process::exit(2);
    });
    let emoticons = config.emoticon_table().unwrap_or_else(|err| {
        eprintln!("{}", err);
        process::exit(2);
    });

    let source = match &cli.input {
        Some(path) => read_file(path),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .unwrap_or_else(|err| {
                    eprintln!("failed to read stdin: {}", err);
                    process::exit(1);
                });
            buffer
        }
    };

    let options = render_options(&cli, config.render.clone());
    let markup = if cli.sections || config.sections {
        Markup::with_sections()
    } else {
        Markup::standard()
    };
    let mut renderer = ContentRenderer::new(markup.with_options(options));
    if let Some(table) = emoticons {
        renderer = renderer.with_emoticons(table);
    }
    if let Some(users) = config.users() {
        renderer = renderer.with_users(users);
    }
    let dialect = cli.dialect.unwrap_or(config.dialect);

    let rendered = if cli.strict {
        match renderer.try_render(&source, dialect) {
            Ok(rendered) => rendered,
            Err(err) => {
                eprintln!("{}", error_to_pretty(&err, &source));
                process::exit(1);
            }
        }
    } else {
        renderer.render_document(&source, dialect)
    };

    if cli.sections {
        emit_sections(&rendered);
    }

    let mut page = Renderer::new(cli.theme);
    if let Some(stem) = cli.input.as_deref().and_then(Path::file_stem) {
        page = page.with_title(stem.to_string_lossy());
    }
    let mut html = rendered.html;
    if cli.highlight {
        html = page.highlight_html(&html);
    }
    if cli.standalone {
        let assets = match &cli.assets {
            Some(dir) => {
                if let Err(err) = page.generate_files(dir) {
                    eprintln!("failed to write assets to {}: {}", dir.display(), err);
                    process::exit(1);
                }
                Assets::Linked
            }
            None => Assets::Inline,
        };
        html = page.page(&html, assets);
    }
    print!("{}", html);
}

fn read_file(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|err| {
        eprintln!("failed to read {}: {}", path.display(), err);
        process::exit(1);
    })
}

/// Command-line flags win over the config file.
fn render_options(cli: &Cli, mut options: RenderOptions) -> RenderOptions {
    if cli.paragraphs {
        options.paragraphs = true;
    }
    if cli.no_autolink {
        options.auto_link_urls = false;
    }
    if cli.no_cleanup {
        options.cleanup_empty_tags = false;
    }
    if cli.no_cosmetic {
        options.cosmetic_replace = false;
    }
    if cli.render_unknown {
        options.render_unknown_tags = true;
    }
    if cli.sanitize {
        options.sanitize = true;
    }
    if cli.max_len.is_some() {
        options.max_input_len = cli.max_len;
    }
    for tag in &cli.exclude {
        options = options.exclude_tag(tag.as_str());
    }
    options
}

fn error_to_pretty(err: &RenderError, source: &str) -> String {
    match err.span() {
        Some(span) => {
            let position = SourceMap::new(source).position(span.start);
            format!(
                "{}:{}: error: {}",
                position.line + 1,
                position.character + 1,
                err
            )
        }
        None => format!("error: {}", err),
    }
}

fn emit_sections(rendered: &Rendered) {
    match serde_json::to_string_pretty(&rendered.sections) {
        Ok(json) => eprintln!("{}", json),
        Err(err) => log::error!("failed to serialize sections: {err}"),
    }
}
