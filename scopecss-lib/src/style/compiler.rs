//! CSS compilation behind the [`CssCompiler`] seam.
//!
//! The engine only needs `source -> {css, tokens}`; [`LightningCompiler`] is the
//! default backend and tests plug in their own.

use std::collections::BTreeMap;

use lightningcss::css_modules::{Config as CssModulesConfig, Pattern};
use lightningcss::printer::PrinterOptions;
use lightningcss::stylesheet::{ParserFlags, ParserOptions, StyleSheet};
use log::trace;

use crate::error::{Error, Result};

/// How the compiler treats one template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Scope `@keyframes` names to the cache key.
    pub keyframe: bool,
    /// Keep the anchor selector in front of the first block. When false, a
    /// leading anchor rule is printed as a bare `{...}` block.
    pub prefix: bool,
}

impl CompileOptions {
    /// Standalone rules, registered as global styles.
    pub const RULES: CompileOptions = CompileOptions {
        keyframe: true,
        prefix: true,
    };

    /// A bare declaration block wrapped as `& {...}`.
    pub const DECLARATIONS: CompileOptions = CompileOptions {
        keyframe: false,
        prefix: false,
    };
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions::RULES
    }
}

/// Output of one compile: CSS text plus the class token mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledCss {
    pub css: String,
    /// Local class name -> generated class name.
    pub tokens: BTreeMap<String, String>,
}

pub trait CssCompiler {
    /// Compiles `source` for cache key `key`. `&` at the top level of `source`
    /// refers to the style's own anchor class, `.___<key>`.
    fn compile(&self, source: &str, key: &str, options: CompileOptions) -> Result<CompiledCss>;
}

/// Anchor class name a compiled style uses for `&`.
pub fn anchor_class(key: &str) -> String {
    format!("___{key}")
}

/// Compiles with lightningcss: nesting enabled, CSS modules naming classes
/// `<local>_<key>`, minified output.
#[derive(Debug, Clone, Copy, Default)]
pub struct LightningCompiler;

impl CssCompiler for LightningCompiler {
    fn compile(&self, source: &str, key: &str, options: CompileOptions) -> Result<CompiledCss> {
        let anchor = format!(".{}", anchor_class(key));
        let code = replace_top_level_nesting(source, &format!(":global({anchor})"));
        trace!("compiling {key}: {code}");

        let pattern_text = format!("[local]_{key}");
        let pattern = Pattern::parse(&pattern_text)
            .map_err(|e| Error::Compile(format!("invalid class pattern: {e:?}")))?;
        let parser_options = ParserOptions {
            filename: format!("{key}.css"),
            css_modules: Some(CssModulesConfig {
                pattern,
                animation: options.keyframe,
                ..CssModulesConfig::default()
            }),
            flags: ParserFlags::NESTING,
            ..ParserOptions::default()
        };

        let sheet = StyleSheet::parse(&code, parser_options)
            .map_err(|e| Error::Compile(e.to_string()))?;
        let printed = sheet
            .to_css(PrinterOptions {
                minify: true,
                ..PrinterOptions::default()
            })
            .map_err(|e| Error::Compile(e.to_string()))?;

        let mut css = printed.code;
        if !options.prefix {
            if let Some(rest) = css.strip_prefix(anchor.as_str()) {
                if rest.starts_with('{') {
                    css = rest.to_string();
                }
            }
        }

        let tokens = printed
            .exports
            .unwrap_or_default()
            .into_iter()
            .map(|(local, export)| (local, export.name))
            .collect();

        Ok(CompiledCss { css, tokens })
    }
}

/// Replaces `&` outside of any block and string with `replacement`.
fn replace_top_level_nesting(source: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(source.len() + replacement.len());
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for ch in source.chars() {
        if let Some(q) = quote {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => {
                quote = Some(ch);
                out.push(ch);
            }
            '{' => {
                depth += 1;
                out.push(ch);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                out.push(ch);
            }
            '&' if depth == 0 => out.push_str(replacement),
            _ => out.push(ch),
        }
    }
    out
}
