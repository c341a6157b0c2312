//! Markdown rendering using pulldown-cmark.

use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use folio_core::{ContentDocument, MarkdownConfig, frontmatter::parse_document};
use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::{
    Result,
    syntax::{SyntaxHighlighter, html_escape, plain_code_block},
};

/// Table of contents entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,

    /// Heading text.
    pub text: String,

    /// Anchor ID for linking.
    pub id: String,
}

/// A body rendered to an HTML fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedBody {
    /// HTML fragment, without any page chrome.
    pub html: String,

    /// Headings in document order.
    pub toc: Vec<TocEntry>,
}

/// A parsed document together with its rendered body.
#[derive(Debug, Clone)]
pub struct ParsedContent {
    pub document: ContentDocument,
    pub html: String,
    pub toc: Vec<TocEntry>,
}

/// Markdown parser with optional syntax highlighting.
#[derive(Debug)]
pub struct MarkdownParser {
    highlighter: Option<SyntaxHighlighter>,
    options: Options,
}

impl Default for MarkdownParser {
    fn default() -> Self {
        Self::new(&MarkdownConfig::default())
    }
}

/// Heading being collected until its end tag.
struct OpenHeading<'a> {
    level: HeadingLevel,
    id: Option<String>,
    text: String,
    events: Vec<Event<'a>>,
}

impl MarkdownParser {
    /// Create a parser from the `[markdown]` settings.
    pub fn new(config: &MarkdownConfig) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

        let highlighter = config
            .highlight_code
            .then(|| SyntaxHighlighter::new(&config.highlight_theme));

        Self {
            highlighter,
            options,
        }
    }

    /// Whether fenced code blocks are highlighted.
    pub fn highlights_code(&self) -> bool {
        self.highlighter.is_some()
    }

    /// Split front matter and render the body.
    pub fn parse(&self, content: &str, path: &Path) -> Result<ParsedContent> {
        let document = parse_document(path, content)?;
        let RenderedBody { html, toc } = self.render(document.body());

        Ok(ParsedContent {
            document,
            html,
            toc,
        })
    }

    /// Render a markdown body to HTML with TOC extraction.
    pub fn render(&self, body: &str) -> RenderedBody {
        let mut events: Vec<Event<'_>> = Vec::new();
        let mut toc = Vec::new();
        let mut ids = HeadingIds::default();
        let mut heading: Option<OpenHeading<'_>> = None;
        let mut code: Option<(Option<String>, String)> = None;

        for event in Parser::new_ext(body, self.options) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => code_language(&info),
                        CodeBlockKind::Indented => None,
                    };
                    code = Some((lang, String::new()));
                }

                Event::Text(text) if code.is_some() => {
                    if let Some((_, source)) = code.as_mut() {
                        source.push_str(&text);
                    }
                }

                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, source)) = code.take() {
                        let html = self.render_code(&source, lang.as_deref());
                        events.push(Event::Html(CowStr::from(html)));
                    }
                }

                Event::Start(Tag::Heading { level, id, .. }) => {
                    heading = Some(OpenHeading {
                        level,
                        id: id.map(|i| i.to_string()),
                        text: String::new(),
                        events: Vec::new(),
                    });
                }

                Event::End(TagEnd::Heading(_)) => {
                    if let Some(open) = heading.take() {
                        let level = open.level as u8;
                        let base = open.id.unwrap_or_else(|| slugify(&open.text));
                        let id = ids.unique(&base);

                        events.push(Event::Html(CowStr::from(format!(
                            "<h{level} id=\"{}\">",
                            html_escape(&id)
                        ))));
                        events.extend(open.events);
                        events.push(Event::Html(CowStr::from(format!("</h{level}>\n"))));

                        toc.push(TocEntry {
                            level,
                            text: open.text,
                            id,
                        });
                    }
                }

                other => match heading.as_mut() {
                    Some(open) => {
                        if let Event::Text(text) | Event::Code(text) = &other {
                            open.text.push_str(text);
                        }
                        open.events.push(other);
                    }
                    None => events.push(other),
                },
            }
        }

        let mut html = String::with_capacity(body.len() + body.len() / 2);
        pulldown_cmark::html::push_html(&mut html, events.into_iter());

        RenderedBody { html, toc }
    }

    fn render_code(&self, source: &str, lang: Option<&str>) -> String {
        match &self.highlighter {
            Some(highlighter) => highlighter.highlight(source, lang),
            None => plain_code_block(source, lang),
        }
    }
}

/// Language token of a fence info string (`rust,linenos` → `rust`).
fn code_language(info: &str) -> Option<String> {
    info.split([',', ' ', '{'])
        .next()
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .map(str::to_string)
}

/// Hands out heading ids, suffixing repeats with `-1`, `-2`, ...
///
/// Explicit `{#id}` attributes go through the same registry, so a generated
/// id never collides with one the author wrote.
#[derive(Default)]
struct HeadingIds {
    next_suffix: HashMap<String, usize>,
    used: HashSet<String>,
}

impl HeadingIds {
    fn unique(&mut self, base: &str) -> String {
        let base = if base.is_empty() { "section" } else { base };
        let mut count = self.next_suffix.get(base).copied().unwrap_or(0);
        loop {
            let id = if count == 0 {
                base.to_string()
            } else {
                format!("{base}-{count}")
            };
            count += 1;
            if self.used.insert(id.clone()) {
                self.next_suffix.insert(base.to_string(), count);
                return id;
            }
        }
    }
}

/// Convert text to a URL-safe slug.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c
            } else if c.is_whitespace() || c == '-' || c == '_' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|c| *c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
