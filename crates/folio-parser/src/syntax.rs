//! Syntax highlighting for code blocks.

use syntect::{
    highlighting::{Theme, ThemeSet},
    html::highlighted_html_for_string,
    parsing::SyntaxSet,
};

/// Syntax highlighter using syntect.
#[derive(Debug)]
pub struct SyntaxHighlighter {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme: String,
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new("base16-ocean.dark")
    }
}

impl SyntaxHighlighter {
    /// Create a new syntax highlighter with the specified theme.
    ///
    /// An unknown theme falls back to the first bundled one.
    pub fn new(theme: &str) -> Self {
        let theme_set = ThemeSet::load_defaults();
        if !theme_set.themes.contains_key(theme) {
            tracing::warn!(theme, "unknown highlight theme, using a bundled default");
        }
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set,
            theme: theme.to_string(),
        }
    }

    /// Whether syntect bundles a theme with this name.
    pub fn has_theme(name: &str) -> bool {
        ThemeSet::load_defaults().themes.contains_key(name)
    }

    /// Get available theme names.
    pub fn available_themes(&self) -> Vec<&str> {
        self.theme_set.themes.keys().map(|s| s.as_str()).collect()
    }

    fn theme(&self) -> Option<&Theme> {
        self.theme_set
            .themes
            .get(&self.theme)
            .or_else(|| self.theme_set.themes.values().next())
    }

    /// Highlight code with the given language.
    ///
    /// If the language is not recognized, the code is highlighted as plain text.
    pub fn highlight(&self, code: &str, lang: Option<&str>) -> String {
        let syntax = lang
            .and_then(|l| self.syntax_set.find_syntax_by_token(l))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let Some(theme) = self.theme() else {
            return plain_code_block(code, lang);
        };

        match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
            Ok(html) => html,
            Err(e) => {
                tracing::debug!(error = %e, "highlighting failed, emitting plain block");
                plain_code_block(code, lang)
            }
        }
    }
}

/// Code block without highlighting: `<pre><code class="language-x">`.
pub fn plain_code_block(code: &str, lang: Option<&str>) -> String {
    let escaped = html_escape(code);
    let lang_class = lang
        .map(|l| format!(" class=\"language-{}\"", html_escape(l)))
        .unwrap_or_default();
    format!("<pre><code{lang_class}>{escaped}</code></pre>\n")
}

/// Escape HTML special characters.
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
