//! First render phase: turns the token stream into an ordered node list, repairing
//! overlapping and unbalanced tags on the way.

use crate::context::RenderContext;
use crate::escape::{cosmetic_replace, escape, escape_no_breaks};
use crate::node::{Node, NodeList, TagInstance};
use crate::options::RenderOptions;
use crate::registry::TagRegistry;
use crate::span::Span;
use crate::tag::{TagDescriptor, TagFlags};
use crate::tokenizer::{TokenKind, parse_tag, tokenize};

pub(crate) fn compile<'r>(
    registry: &'r TagRegistry,
    options: &RenderOptions,
    markup: String,
    ctx: &mut RenderContext,
) -> NodeList<'r> {
    let mut builder = Builder {
        registry,
        options,
        ctx,
        nodes: Vec::new(),
        instances: Vec::new(),
        stack: Vec::new(),
        break_stack: Vec::new(),
        enclosed: 0,
        remove_next_newline: false,
    };
    if options.paragraphs {
        builder.nodes.push(Node::Markup("<p>"));
    }
    for token in tokenize(&markup) {
        match token.kind {
            TokenKind::Text => builder.text(token.text),
            TokenKind::Tag | TokenKind::ParamTag => builder.tag(token.text, token.span),
        }
    }
    builder.finish(markup.len());

    let Builder {
        nodes, instances, ..
    } = builder;
    log::trace!(
        "compiled {} nodes for {} tag instances",
        nodes.len(),
        instances.len()
    );
    NodeList {
        source: markup,
        nodes,
        instances,
    }
}

struct Builder<'r, 'o, 'c> {
    registry: &'r TagRegistry,
    options: &'o RenderOptions,
    ctx: &'c mut RenderContext,
    nodes: Vec<Node>,
    instances: Vec<TagInstance<'r>>,
    // Open instances, innermost last.
    stack: Vec<usize>,
    // Inline instances closed early around a block tag, reopened before the next text.
    break_stack: Vec<usize>,
    enclosed: usize,
    remove_next_newline: bool,
}

impl<'r> Builder<'r, '_, '_> {
    fn text(&mut self, text: &str) {
        let mut text = text;
        if self.ctx.no_breaks > 0 {
            text = text.trim_end();
            if text.trim_start().is_empty() {
                return;
            }
        }
        if self.remove_next_newline {
            text = text.trim_start_matches(' ');
            if let Some(rest) = text.strip_prefix('\n') {
                text = rest;
                if text.is_empty() {
                    return;
                }
            }
            self.remove_next_newline = false;
        }
        if let Some(top) = self
            .stack
            .last()
            .and_then(|&id| self.instances.get_mut(id))
            && top.strip_first_newline
        {
            top.strip_first_newline = false;
            text = text.trim_start();
            if text.is_empty() {
                return;
            }
        }

        if self.enclosed == 0 {
            self.redo_break_stack();
        }

        if self.options.paragraphs && self.stack.is_empty() {
            while let Some((chunk, rest)) = text.split_once("\n\n") {
                if !chunk.trim().is_empty() {
                    self.push_text(chunk);
                }
                self.nodes.push(Node::Markup("</p><p>"));
                text = rest;
            }
        }
        self.push_text(text);
    }

    fn push_text(&mut self, raw: &str) {
        if raw.is_empty() {
            return;
        }
        let escaped = if self.ctx.no_breaks > 0 {
            escape_no_breaks(raw)
        } else {
            escape(raw)
        };
        let html = if self.options.cosmetic_replace {
            cosmetic_replace(&escaped)
        } else {
            escaped
        };
        self.nodes.push(Node::Text {
            raw: raw.to_string(),
            html,
        });
    }

    fn tag(&mut self, raw: &str, span: Span) {
        let token = parse_tag(raw);
        if let Some(top) = self
            .stack
            .last()
            .and_then(|&id| self.instances.get_mut(id))
        {
            top.strip_first_newline = false;
        }

        if self.enclosed > 0 {
            let closes_region = token.closing && self.top_name() == Some(token.name.as_str());
            if !closes_region {
                self.text(raw);
                return;
            }
        }

        if self.options.is_excluded(&token.name) {
            log::trace!("dropping excluded tag {raw}");
            return;
        }

        if token.closing {
            self.close_tag(&token.name, span);
        } else {
            self.open_tag(token.name, token.params, span);
        }
    }

    fn open_tag(&mut self, name: String, params: &str, span: Span) {
        let registry = self.registry;
        let descriptor = match registry.lookup(&name) {
            Some(descriptor) => descriptor,
            None if self.options.render_unknown_tags => registry.fallback(),
            None => {
                log::trace!("dropping unknown tag [{name}]");
                return;
            }
        };

        self.redo_break_stack();
        if !descriptor.is_inline() {
            self.break_inline_tags();
        }

        let id = self.push_instance(name, descriptor, params, span);
        if descriptor.closes_immediately(params) {
            self.stack.pop();
            self.finish_instance(id, span.end);
        }
    }

    fn close_tag(&mut self, name: &str, span: Span) {
        if self
            .break_stack
            .last()
            .is_some_and(|&id| self.instance_name(id) == name)
        {
            if let Some(id) = self.break_stack.pop() {
                // Its last segment is already closed; only the source position is new.
                if let Some(instance) = self.instances.get_mut(id) {
                    instance.close_pos = Some(span.start);
                    instance.close_node = instance.last_close;
                }
                self.release(id);
            }
            return;
        }

        if let Some(depth) = self
            .stack
            .iter()
            .rposition(|&id| self.instance_name(id) == name)
        {
            while self.stack.len() > depth + 1 {
                if let Some(id) = self.stack.pop() {
                    self.emit_close(id);
                    self.break_stack.push(id);
                }
            }
            let Some(id) = self.stack.pop() else {
                return;
            };
            self.finish_instance(id, span.start);

            let inline = self.flags(id).inline;
            if self.options.paragraphs && !inline && self.stack.is_empty() {
                self.nodes.push(Node::Markup("</p><p>"));
            }
            if !inline {
                self.remove_next_newline = true;
            }
            return;
        }

        let registry = self.registry;
        if self.options.render_unknown_tags && !registry.contains(name) {
            self.redo_break_stack();
            let id = self.push_instance(name.to_string(), registry.fallback(), "", span);
            self.stack.pop();
            self.finish_instance(id, span.end);
            return;
        }
        log::trace!("ignoring unmatched [/{name}]");
    }

    fn finish(&mut self, end: usize) {
        if !self.stack.is_empty() {
            self.redo_break_stack();
            while let Some(id) = self.stack.pop() {
                self.finish_instance(id, end);
            }
        }
        for id in std::mem::take(&mut self.break_stack) {
            self.release(id);
        }
        for instance in &mut self.instances {
            if instance.close_node.is_none() {
                instance.close_node = instance.last_close;
            }
        }
        if self.options.paragraphs {
            self.nodes.push(Node::Markup("</p>"));
        }
    }

    fn push_instance(
        &mut self,
        name: String,
        descriptor: &'r TagDescriptor,
        params: &str,
        span: Span,
    ) -> usize {
        let id = self.instances.len();
        let flags = descriptor.flags();
        if flags.enclosed {
            self.enclosed += 1;
        }
        if flags.no_breaks {
            self.ctx.no_breaks += 1;
        }
        self.instances.push(TagInstance {
            name,
            descriptor,
            params: params.to_string(),
            token: span,
            close_pos: None,
            open_node: self.nodes.len(),
            close_node: None,
            last_close: None,
            segment_open: None,
            strip_first_newline: flags.strip_first_newline,
        });
        self.stack.push(id);
        self.emit_open(id);
        id
    }

    fn finish_instance(&mut self, id: usize, close_pos: usize) {
        let close_node = self.nodes.len();
        if let Some(instance) = self.instances.get_mut(id) {
            instance.close_pos = Some(close_pos);
            instance.close_node = Some(close_node);
        }
        self.release(id);
        self.emit_close(id);
    }

    fn release(&mut self, id: usize) {
        let flags = self.flags(id);
        if flags.enclosed {
            self.enclosed = self.enclosed.saturating_sub(1);
        }
        if flags.no_breaks {
            self.ctx.no_breaks = self.ctx.no_breaks.saturating_sub(1);
        }
    }

    fn redo_break_stack(&mut self) {
        while let Some(id) = self.break_stack.pop() {
            self.emit_open(id);
            self.stack.push(id);
        }
    }

    fn break_inline_tags(&mut self) {
        while let Some(&top) = self.stack.last() {
            if !self.flags(top).inline {
                break;
            }
            self.stack.pop();
            self.emit_close(top);
            self.break_stack.push(top);
        }
    }

    fn emit_open(&mut self, id: usize) {
        let index = self.nodes.len();
        // segment_end is patched when the segment closes.
        self.nodes.push(Node::Open {
            instance: id,
            segment_end: index,
        });
        if let Some(instance) = self.instances.get_mut(id) {
            instance.segment_open = Some(index);
        }
    }

    fn emit_close(&mut self, id: usize) {
        let index = self.nodes.len();
        self.nodes.push(Node::Close { instance: id });
        if let Some(instance) = self.instances.get_mut(id) {
            instance.last_close = Some(index);
            if let Some(open) = instance.segment_open.take()
                && let Some(Node::Open { segment_end, .. }) = self.nodes.get_mut(open)
            {
                *segment_end = index;
            }
        }
    }

    fn top_name(&self) -> Option<&str> {
        self.stack.last().map(|&id| self.instance_name(id))
    }

    fn instance_name(&self, id: usize) -> &str {
        self.instances
            .get(id)
            .map(|instance| instance.name.as_str())
            .unwrap_or("")
    }

    fn flags(&self, id: usize) -> TagFlags {
        self.instances
            .get(id)
            .map(|instance| instance.descriptor.flags())
            .unwrap_or_default()
    }
}
