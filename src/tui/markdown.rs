//! Markdown → ratatui `Text`.
//!
//! The terminal counterpart of `render::markdown`. Same parser options and
//! the same code-block language rule; raw HTML is shown as literal dimmed
//! text instead of being interpreted. Fenced code is highlighted with
//! syntect when the language is known.

use std::sync::LazyLock;

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::render::markdown::{DEFAULT_CODE_LANGUAGE, code_language};

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const CODE_THEME: &str = "base16-ocean.dark";
const TAB: &str = "    ";

fn frame_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Render markdown into owned, styled lines using `base_fg` for body text.
pub fn render(content: &str, base_fg: Color) -> Text<'static> {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);
    opts.insert(Options::ENABLE_TABLES);

    let mut builder = TextBuilder::new(base_fg);
    for event in Parser::new_ext(content, opts) {
        builder.event(event);
    }
    builder.finish()
}

enum CodeMode {
    Off,
    Plain,
    Highlighted(Box<HighlightLines<'static>>),
}

struct TextBuilder {
    lines: Vec<Line<'static>>,
    base_fg: Color,
    /// Inline styles, each composed onto its parent.
    styles: Vec<Style>,
    /// Prepended to every new line (blockquote and code gutters).
    gutters: Vec<Span<'static>>,
    /// `None` for bullets, `Some(next)` for numbered lists.
    lists: Vec<Option<u64>>,
    code: CodeMode,
    pending_link: Option<String>,
    /// A finished block wants a blank line before the next one.
    gap: bool,
    in_table_cell: bool,
}

impl TextBuilder {
    fn new(base_fg: Color) -> Self {
        Self {
            lines: Vec::new(),
            base_fg,
            styles: Vec::new(),
            gutters: Vec::new(),
            lists: Vec::new(),
            code: CodeMode::Off,
            pending_link: None,
            gap: false,
            in_table_cell: false,
        }
    }

    fn finish(self) -> Text<'static> {
        Text::from(self.lines)
    }

    fn current_style(&self) -> Style {
        self.styles
            .last()
            .copied()
            .unwrap_or_else(|| Style::default().fg(self.base_fg))
    }

    fn push_style(&mut self, overlay: Style) {
        let composed = self.current_style().patch(overlay);
        self.styles.push(composed);
    }

    fn new_line(&mut self, spans: Vec<Span<'static>>) {
        let mut all = self.gutters.clone();
        all.extend(spans);
        self.lines.push(Line::from(all));
    }

    fn append(&mut self, span: Span<'static>) {
        match self.lines.last_mut() {
            Some(line) => line.push_span(span),
            None => self.new_line(vec![span]),
        }
    }

    fn start_block(&mut self) {
        if self.gap {
            self.new_line(Vec::new());
            self.gap = false;
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.append(Span::styled(
                code.to_string(),
                Style::default().fg(Color::White).bg(Color::DarkGray),
            )),
            Event::Html(raw) => {
                for source_line in raw.lines() {
                    let style = self.literal_style();
                    self.new_line(vec![Span::styled(source_line.to_owned(), style)]);
                }
            }
            Event::InlineHtml(raw) => {
                let style = self.literal_style();
                self.append(Span::styled(raw.to_string(), style));
            }
            Event::SoftBreak => self.append(Span::raw(" ")),
            Event::HardBreak => self.new_line(Vec::new()),
            Event::Rule => {
                self.start_block();
                self.new_line(vec![Span::styled("─".repeat(40), frame_style())]);
                self.gap = true;
            }
            Event::TaskListMarker(done) => {
                self.append(Span::raw(if done { "[x] " } else { "[ ] " }));
            }
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.start_block();
                self.new_line(Vec::new());
            }
            Tag::Heading { level, .. } => {
                self.start_block();
                let style = heading_style(self.base_fg, level);
                self.new_line(vec![Span::styled(
                    format!("{} ", "#".repeat(level as usize)),
                    style,
                )]);
                self.push_style(style);
            }
            Tag::BlockQuote(_) => {
                self.start_block();
                self.gutters.push(Span::styled("│ ", frame_style()));
                self.push_style(Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC));
            }
            Tag::CodeBlock(kind) => {
                if !self.lines.is_empty() {
                    self.new_line(Vec::new());
                }
                let lang = code_language(&kind);
                self.new_line(vec![
                    Span::styled("╭── ", frame_style()),
                    Span::styled(lang.clone(), frame_style().add_modifier(Modifier::BOLD)),
                    Span::styled(" ──", frame_style()),
                ]);
                self.gutters.push(Span::styled("│ ", frame_style()));
                self.code = highlighter_for(&lang)
                    .map(|hl| CodeMode::Highlighted(Box::new(hl)))
                    .unwrap_or(CodeMode::Plain);
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.start_block();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.new_line(Vec::new());
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{indent}{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => format!("{indent}- "),
                };
                self.append(Span::styled(marker, frame_style()));
            }
            Tag::Table(_) | Tag::HtmlBlock => self.start_block(),
            Tag::TableHead => {
                self.new_line(Vec::new());
                self.push_style(Style::default().add_modifier(Modifier::BOLD));
            }
            Tag::TableRow => self.new_line(Vec::new()),
            Tag::TableCell => {
                if self.in_table_cell {
                    self.append(Span::styled(" │ ", frame_style()));
                }
                self.in_table_cell = true;
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { dest_url, .. } => {
                self.pending_link = Some(dest_url.to_string());
                self.push_style(link_style());
            }
            _ => {}
        }
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.gap = true,
            TagEnd::Heading(_) => {
                self.styles.pop();
                self.gap = true;
            }
            TagEnd::BlockQuote(_) => {
                self.gutters.pop();
                self.styles.pop();
                self.gap = true;
            }
            TagEnd::CodeBlock => {
                self.code = CodeMode::Off;
                self.gutters.pop();
                self.new_line(vec![Span::styled("╰──", frame_style())]);
                self.gap = true;
            }
            TagEnd::List(_) => {
                self.lists.pop();
                self.gap = true;
            }
            TagEnd::TableHead => {
                self.styles.pop();
                self.in_table_cell = false;
            }
            TagEnd::TableRow => self.in_table_cell = false,
            TagEnd::Table | TagEnd::HtmlBlock => self.gap = true,
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.styles.pop();
            }
            TagEnd::Link => {
                self.styles.pop();
                if let Some(url) = self.pending_link.take() {
                    self.append(Span::raw(" ("));
                    self.append(Span::styled(url, link_style()));
                    self.append(Span::raw(")"));
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, raw: &str) {
        let text = raw.replace('\t', TAB);
        match std::mem::replace(&mut self.code, CodeMode::Off) {
            CodeMode::Highlighted(mut hl) => {
                for source_line in LinesWithEndings::from(&text) {
                    let spans = match hl.highlight_line(source_line, &SYNTAX_SET) {
                        Ok(ranges) => ranges
                            .into_iter()
                            .filter_map(|(style, fragment)| {
                                let fragment = fragment.trim_end_matches('\n');
                                (!fragment.is_empty()).then(|| {
                                    let fg = style.foreground;
                                    Span::styled(
                                        fragment.to_owned(),
                                        Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b)),
                                    )
                                })
                            })
                            .collect(),
                        Err(_) => vec![Span::raw(source_line.trim_end_matches('\n').to_owned())],
                    };
                    self.new_line(spans);
                }
                self.code = CodeMode::Highlighted(hl);
            }
            CodeMode::Plain => {
                for source_line in text.lines() {
                    self.new_line(vec![Span::styled(
                        source_line.to_owned(),
                        Style::default().fg(Color::White),
                    )]);
                }
                self.code = CodeMode::Plain;
            }
            CodeMode::Off => {
                let style = self.current_style();
                self.append(Span::styled(text, style));
            }
        }
    }

    /// Raw HTML is never interpreted; it is shown dimmed, as typed.
    fn literal_style(&self) -> Style {
        self.current_style().add_modifier(Modifier::DIM)
    }
}

fn highlighter_for(lang: &str) -> Option<HighlightLines<'static>> {
    if lang == DEFAULT_CODE_LANGUAGE {
        return None;
    }
    let syntax = SYNTAX_SET.find_syntax_by_token(lang)?;
    let theme = THEME_SET.themes.get(CODE_THEME)?;
    Some(HighlightLines::new(syntax, theme))
}

fn link_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::UNDERLINED)
}

fn heading_style(base_fg: Color, level: HeadingLevel) -> Style {
    let modifier = match level {
        HeadingLevel::H1 => Modifier::BOLD | Modifier::UNDERLINED,
        HeadingLevel::H2 => Modifier::BOLD,
        _ => Modifier::BOLD | Modifier::ITALIC,
    };
    Style::default().fg(base_fg).add_modifier(modifier)
}
