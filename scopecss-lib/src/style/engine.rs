//! Template compilation with a structure/value split.
//!
//! A template call is hashed on its literal fragments and on the identities of
//! the mixins it inlines. Scalar values never reach the compiler: each becomes
//! a `var(--<hash>_<n>)` reference, and its value lives on the returned token.
//! Calls that differ only in scalar values therefore share one compiled style.
//!
//! The cache has no eviction. It grows with the number of distinct
//! (template, mixins) pairs compiled through one engine.

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::hash::short_hash;
use crate::style::compiler::{anchor_class, CompileOptions, CssCompiler, LightningCompiler};
use crate::style::sink::{StyleBuffer, StyleSink};
use crate::style::token::{CompiledStyle, Declarations, Interpolation, StyleToken};

/// Compiled styles by cache key.
#[derive(Debug, Default)]
pub struct StyleCache {
    entries: HashMap<String, Rc<CompiledStyle>>,
}

impl StyleCache {
    pub fn get(&self, key: &str) -> Option<&Rc<CompiledStyle>> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    fn insert(&mut self, key: String, compiled: Rc<CompiledStyle>) {
        let _ = self.entries.insert(key, compiled);
    }
}

/// What a template position contributes to the rebuilt source.
enum Slot {
    Css(String),
    Var(String),
}

pub struct StyleEngine<C = LightningCompiler, S = StyleBuffer> {
    compiler: C,
    sink: S,
    cache: StyleCache,
}

impl Default for StyleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleEngine {
    /// Engine backed by lightningcss, collecting global styles in memory.
    pub fn new() -> Self {
        Self::with_parts(LightningCompiler, StyleBuffer::new())
    }
}

impl<C: CssCompiler> StyleEngine<C, StyleBuffer> {
    pub fn with_compiler(compiler: C) -> Self {
        Self::with_parts(compiler, StyleBuffer::new())
    }
}

impl<C: CssCompiler, S: StyleSink> StyleEngine<C, S> {
    pub fn with_parts(compiler: C, sink: S) -> Self {
        StyleEngine {
            compiler,
            sink,
            cache: StyleCache::default(),
        }
    }

    pub fn cache(&self) -> &StyleCache {
        &self.cache
    }

    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Compiles a template: `fragments` surround `interpolations`, so there is
    /// always exactly one more fragment than interpolation.
    pub fn css(
        &mut self,
        fragments: &[&str],
        interpolations: Vec<Interpolation>,
    ) -> Result<StyleToken> {
        if fragments.len() != interpolations.len() + 1 {
            return Err(Error::TemplateArity {
                fragments: fragments.len(),
                interpolations: interpolations.len(),
            });
        }

        let hash = short_hash(&fragments.concat());
        let mut mixins_hash = String::new();
        let mut vars = BTreeMap::new();
        let mut slots = Vec::with_capacity(interpolations.len());

        for (index, value) in interpolations.into_iter().enumerate() {
            let mixin = match value {
                Interpolation::Empty => None,
                Interpolation::Mixin(token) => Some(token),
                Interpolation::Declarations(declarations) => {
                    Some(self.declarations(&declarations)?)
                }
                Interpolation::Value(value) => {
                    let name = format!("--{hash}_{}", index + 1);
                    slots.push(Slot::Var(name.clone()));
                    let _ = vars.insert(name, value);
                    continue;
                }
            };

            match mixin {
                Some(token) => {
                    mixins_hash.push('_');
                    mixins_hash.push_str(token.hash());
                    vars.extend(token.vars().clone());
                    slots.push(Slot::Css(token.css().to_string()));
                }
                None => slots.push(Slot::Css(String::new())),
            }
        }

        let cache_key = short_hash(&format!("{hash}{mixins_hash}"));
        let compiled = match self.cache.get(&cache_key) {
            Some(compiled) => {
                trace!("style cache hit for {cache_key}");
                Rc::clone(compiled)
            }
            None => {
                let compiled = Rc::new(self.compile(&cache_key, fragments, &slots)?);
                self.cache.insert(cache_key, Rc::clone(&compiled));
                compiled
            }
        };

        Ok(StyleToken::new(compiled, vars))
    }

    /// Compiles a plain mapping as a single-fragment template.
    pub fn declarations(&mut self, declarations: &Declarations) -> Result<StyleToken> {
        let source = declarations.to_css();
        self.css(&[source.as_str()], Vec::new())
    }

    fn compile(&mut self, key: &str, fragments: &[&str], slots: &[Slot]) -> Result<CompiledStyle> {
        debug!("style cache miss for {key}, compiling");

        let mut code = String::new();
        for (index, fragment) in fragments.iter().enumerate() {
            code.push_str(fragment);
            match slots.get(index) {
                Some(Slot::Css(css)) => code.push_str(css),
                Some(Slot::Var(name)) => {
                    code.push_str("var(");
                    code.push_str(name);
                    code.push(')');
                }
                None => {}
            }
        }

        let options = if is_declaration_block(&code) {
            code = format!("& {{{code}}}");
            CompileOptions::DECLARATIONS
        } else {
            CompileOptions::RULES
        };

        let compiled = self.compiler.compile(&code, key, options)?;
        let css = if compiled.css.starts_with('{') {
            let anchor = format!(".{}", anchor_class(key));
            format!("&{}", compiled.css.replace(&anchor, "&").replace("}{", "}&{"))
        } else {
            debug!("registering global style {key}");
            self.sink.insert(key, &compiled.css);
            compiled.css
        };

        Ok(CompiledStyle::new(key.to_string(), css, compiled.tokens))
    }
}

/// True when `code` starts with a declaration (`name: ...`) rather than a rule.
fn is_declaration_block(code: &str) -> bool {
    let trimmed = code.trim_start();
    let name_len = trimmed
        .find(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(trimmed.len());
    if name_len == 0 || !trimmed[name_len..].trim_start().starts_with(':') {
        return false;
    }
    // `a:hover {` is a rule; a declaration ends before any block opens.
    let head = trimmed.split(';').next().unwrap_or_default();
    !head.contains('{')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_detection() {
        assert!(is_declaration_block("color: red;"));
        assert!(is_declaration_block("\n  background-color:var(--a_1)"));
        assert!(is_declaration_block("--size: 4px; &:hover { color: red }"));
        assert!(!is_declaration_block("a:hover { color: red }"));
        assert!(!is_declaration_block(".button { color: red }"));
        assert!(!is_declaration_block("&{color:red}"));
        assert!(!is_declaration_block(""));
    }

    #[test]
    fn test_arity_is_checked() {
        let mut engine = StyleEngine::new();
        let result = engine.css(&["color: ", ";"], Vec::new());
        assert_eq!(
            result.unwrap_err(),
            Error::TemplateArity {
                fragments: 2,
                interpolations: 0
            }
        );
        assert!(engine.cache().is_empty());
    }
}
