use std::collections::BTreeMap;

use bbmark_core::{ContentRenderer, Dialect, Markup, SourceMap};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderOptions {
    dialect: Option<Dialect>,
    auto_link_urls: Option<bool>,
    paragraphs: Option<bool>,
    cleanup_empty_tags: Option<bool>,
    cosmetic_replace: Option<bool>,
    render_unknown_tags: Option<bool>,
    excluded_tags: Option<Vec<String>>,
    max_input_len: Option<usize>,
    sanitize: Option<bool>,
    sections: Option<bool>,
    strict: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderResult {
    html: String,
    sections: BTreeMap<String, Vec<String>>,
    diagnostics: Vec<JsDiagnostic>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsDiagnostic {
    message: String,
    range: Option<JsRange>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsRange {
    start_line: usize,
    start_col: usize,
    end_line: usize,
    end_col: usize,
}

#[wasm_bindgen]
pub fn render_html(source: &str) -> Result<JsValue, JsValue> {
    render_html_with_options(source, JsValue::UNDEFINED)
}

#[wasm_bindgen]
pub fn render_html_with_options(source: &str, options: JsValue) -> Result<JsValue, JsValue> {
    let parsed = options_from_js(options)?;
    let mut render_options = bbmark_core::RenderOptions::default();
    if let Some(value) = parsed.auto_link_urls {
        render_options.auto_link_urls = value;
    }
    if let Some(value) = parsed.paragraphs {
        render_options.paragraphs = value;
    }
    if let Some(value) = parsed.cleanup_empty_tags {
        render_options.cleanup_empty_tags = value;
    }
    if let Some(value) = parsed.cosmetic_replace {
        render_options.cosmetic_replace = value;
    }
    if let Some(value) = parsed.render_unknown_tags {
        render_options.render_unknown_tags = value;
    }
    if let Some(value) = parsed.sanitize {
        render_options.sanitize = value;
    }
    render_options.max_input_len = parsed.max_input_len;
    for tag in parsed.excluded_tags.unwrap_or_default() {
        render_options = render_options.exclude_tag(tag);
    }

    let markup = if parsed.sections.unwrap_or(false) {
        Markup::with_sections()
    } else {
        Markup::standard()
    };
    let renderer = ContentRenderer::new(markup.with_options(render_options));
    let dialect = parsed.dialect.unwrap_or_default();
    let rendered = renderer.render_document(source, dialect);

    let mut diagnostics = Vec::new();
    if parsed.strict.unwrap_or(false)
        && let Err(err) = renderer.try_render(source, dialect)
    {
        let range = err.span().map(|span| {
            let range = SourceMap::new(source).range(span);
            JsRange {
                start_line: range.start.line,
                start_col: range.start.character,
                end_line: range.end.line,
                end_col: range.end.character,
            }
        });
        diagnostics.push(JsDiagnostic {
            message: err.to_string(),
            range,
        });
    }

    let result = RenderResult {
        html: rendered.html,
        sections: rendered.sections,
        diagnostics,
    };
    serde_wasm_bindgen::to_value(&result).map_err(|err| JsValue::from_str(&err.to_string()))
}

fn options_from_js(value: JsValue) -> Result<RenderOptions, JsValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(RenderOptions::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|err| JsValue::from_str(&err.to_string()))
}
