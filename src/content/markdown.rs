//! Markdown rendering: GFM to HTML, heading anchors, then syntax highlighting

use lazy_static::lazy_static;
use pulldown_cmark::{html, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd};
use regex::{Captures, Regex};
use std::collections::{HashMap, HashSet};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::helpers::{html_escape, html_unescape, strip_html};

lazy_static! {
    static ref BARE_URL: Regex = Regex::new(r"(?:https?://|\bwww\.)[^\s<>]+").unwrap();
    static ref HEADING: Regex = Regex::new(r"(?s)<h([1-6])([^>]*)>(.*?)</h[1-6]>").unwrap();
    static ref ID_ATTR: Regex = Regex::new(r#"\bid="([^"]*)""#).unwrap();
    static ref CODE_BLOCK: Regex =
        Regex::new(r#"(?s)<pre><code(?: class="language-([^"]+)")?>(.*?)</code></pre>"#).unwrap();
}

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    line_numbers: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_options("base16-ocean.dark", false)
    }

    /// Create with custom settings
    pub fn with_options(theme: &str, line_numbers: bool) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            line_numbers,
        }
    }

    /// Render markdown to HTML through every stage, in order
    pub fn render(&self, markdown: &str) -> String {
        let html = render_gfm(markdown);
        let html = inject_heading_anchors(&html);
        self.highlight_code_blocks(&html)
    }

    /// Replace each fenced code block in already-rendered HTML with highlighted markup
    pub fn highlight_code_blocks(&self, html: &str) -> String {
        CODE_BLOCK
            .replace_all(html, |caps: &Captures| {
                let lang = caps.get(1).map(|m| m.as_str());
                let code = html_unescape(&caps[2]);
                self.highlight_code(&code, lang)
            })
            .into_owned()
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        // Try to find syntax for the language
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next());

        let highlighted = theme.and_then(|theme| {
            highlighted_html_for_string(code, &self.syntax_set, syntax, theme).ok()
        });

        match highlighted {
            Some(highlighted) if self.line_numbers => {
                self.add_line_numbers(&highlighted, code, lang)
            }
            Some(highlighted) => {
                format!(r#"<figure class="highlight {}">{}</figure>"#, lang, highlighted)
            }
            None => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                lang,
                html_escape(code)
            ),
        }
    }

    /// Add a line-number gutter next to highlighted code
    fn add_line_numbers(&self, highlighted: &str, code: &str, lang: &str) -> String {
        let gutter = (1..=code.lines().count().max(1))
            .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
            lang, gutter, highlighted
        )
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// GitHub-flavored markdown to HTML: tables, strikethrough, task lists, autolinks.
///
/// Bare `http(s)://` and `www.` URLs become links; `www.` links get an `http://` scheme.
pub fn render_gfm(markdown: &str) -> String {
    // Front-matter is split off before rendering, so no metadata blocks here
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
        | Options::ENABLE_GFM;
    let parser = Parser::new_ext(markdown, options);

    let mut events: Vec<Event> = Vec::new();
    let mut link_depth = 0usize;
    let mut in_code_block = false;

    for event in parser {
        match event {
            Event::Start(Tag::Link { .. }) => {
                link_depth += 1;
                events.push(event);
            }
            Event::End(TagEnd::Link) => {
                link_depth = link_depth.saturating_sub(1);
                events.push(event);
            }
            Event::Start(Tag::CodeBlock(_)) => {
                in_code_block = true;
                events.push(event);
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                events.push(event);
            }
            Event::Text(text) if link_depth == 0 && !in_code_block => {
                autolink(text, &mut events);
            }
            _ => events.push(event),
        }
    }

    let mut html_output = String::new();
    html::push_html(&mut html_output, events.into_iter());
    html_output
}

/// Split a text event around bare URLs, wrapping each URL in a link
fn autolink<'a>(text: CowStr<'a>, events: &mut Vec<Event<'a>>) {
    if !BARE_URL.is_match(&text) {
        events.push(Event::Text(text));
        return;
    }

    let mut last = 0;
    for m in BARE_URL.find_iter(&text) {
        let url = m
            .as_str()
            .trim_end_matches(['.', ',', ';', ':', '!', '?', ')', '\'', '"']);
        let host = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .or_else(|| url.strip_prefix("www."))
            .unwrap_or(url);
        if host.is_empty() {
            continue;
        }
        let dest = if url.starts_with("www.") {
            format!("http://{}", url)
        } else {
            url.to_string()
        };
        if m.start() > last {
            events.push(Event::Text(CowStr::from(text[last..m.start()].to_string())));
        }
        events.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: CowStr::from(dest),
            title: CowStr::from(""),
            id: CowStr::from(""),
        }));
        events.push(Event::Text(CowStr::from(url.to_string())));
        events.push(Event::End(TagEnd::Link));
        last = m.start() + url.len();
    }
    if last < text.len() {
        events.push(Event::Text(CowStr::from(text[last..].to_string())));
    }
}

/// Give every heading a unique `id` derived from its text.
///
/// Headings that already carry an id keep it; repeated slugs get `-1`, `-2`, ...
pub fn inject_heading_anchors(html: &str) -> String {
    let mut used: HashSet<String> = ID_ATTR
        .captures_iter(html)
        .map(|c| c[1].to_string())
        .collect();
    let mut counters: HashMap<String, usize> = HashMap::new();

    HEADING
        .replace_all(html, |caps: &Captures| {
            let (level, attrs, inner) = (&caps[1], &caps[2], &caps[3]);
            if ID_ATTR.is_match(attrs) {
                return caps[0].to_string();
            }

            let base = heading_slug(&html_unescape(&strip_html(inner)));
            let mut id = base.clone();
            while used.contains(&id) {
                let n = counters.entry(base.clone()).or_insert(0);
                *n += 1;
                id = format!("{}-{}", base, n);
            }
            used.insert(id.clone());

            format!(r#"<h{level}{attrs} id="{}">{inner}</h{level}>"#, html_escape(&id))
        })
        .into_owned()
}

/// GitHub-style heading slug: lowercase, punctuation dropped, spaces to hyphens
fn heading_slug(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            '-' | '_' => Some(c),
            c if c.is_alphanumeric() => Some(c),
            _ => None,
        })
        .collect()
}
