//! Parses selector lists into a [`SelectorTree`].
//!
//! The grammar covers what component stylesheets write in practice: type,
//! universal, class, id, attribute, pseudo and nesting selectors, the four
//! combinators, namespace prefixes and a bare `|` namespace combinator.
//! Whitespace is not preserved; printing the tree yields a compact form.

use crate::ast::selector_tree::{AttributeMatch, Namespace, NodeId, NodeKind, SelectorTree};
use crate::error::{Error, Result};

/// Parses a comma separated selector list.
pub fn parse_selector_list(input: &str) -> Result<SelectorTree> {
    let mut parser = SelectorParser {
        input,
        pos: 0,
        tree: SelectorTree::new(),
    };
    let root = parser.tree.root();
    parser.parse_list(root, false)?;
    if let Some(ch) = parser.peek() {
        return Err(parser.error(format!("unexpected `{ch}`")));
    }
    Ok(parser.tree)
}

struct SelectorParser<'a> {
    input: &'a str,
    pos: usize,
    tree: SelectorTree,
}

impl<'a> SelectorParser<'a> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::Selector {
            message: message.into(),
            position: self.pos,
        }
    }

    /// Skips whitespace and comments. Returns true if anything was skipped.
    fn skip_trivia(&mut self) -> Result<bool> {
        let start = self.pos;
        loop {
            match self.peek() {
                Some(ch) if ch.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.peek_nth(1) == Some('*') => {
                    let rest = &self.input[self.pos + 2..];
                    match rest.find("*/") {
                        Some(end) => self.pos += 2 + end + 2,
                        None => return Err(self.error("unclosed comment")),
                    }
                }
                _ => break,
            }
        }
        Ok(self.pos != start)
    }

    /// Parses selectors into `parent` until end of input or, when `nested`, a `)`.
    fn parse_list(&mut self, parent: NodeId, nested: bool) -> Result<()> {
        loop {
            let selector = self.tree.create(NodeKind::Selector, "");
            self.tree.append_child(parent, selector);
            self.parse_selector(selector)?;
            if self.tree.children(selector).is_empty() {
                return Err(self.error("empty selector"));
            }
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(')') if nested => return Ok(()),
                None if !nested => return Ok(()),
                None => return Err(self.error("unclosed `(`")),
                Some(ch) => return Err(self.error(format!("unexpected `{ch}`"))),
            }
        }
    }

    fn parse_selector(&mut self, selector: NodeId) -> Result<()> {
        loop {
            let spaced = self.skip_trivia()?;
            let Some(ch) = self.peek() else {
                return Ok(());
            };
            if ch == ',' || ch == ')' {
                return Ok(());
            }

            let last_is_combinator = self
                .tree
                .children(selector)
                .last()
                .map(|&last| self.tree[last].is_combinator());
            if let Some(false) = last_is_combinator {
                if spaced && !matches!(ch, '>' | '+' | '~') {
                    self.push(selector, NodeKind::Combinator, " ");
                }
            }

            match ch {
                '>' | '+' | '~' => {
                    self.bump();
                    self.push(selector, NodeKind::Combinator, ch.to_string());
                }
                '|' => {
                    self.bump();
                    self.push(selector, NodeKind::Combinator, "|");
                }
                '.' => {
                    self.bump();
                    let name = self.expect_ident("class name")?;
                    self.push(selector, NodeKind::Class, name);
                }
                '#' => {
                    self.bump();
                    let name = self.expect_ident("id")?;
                    self.push(selector, NodeKind::Id, name);
                }
                '[' => self.parse_attribute(selector)?,
                ':' => self.parse_pseudo(selector)?,
                '&' => {
                    self.bump();
                    self.push(selector, NodeKind::Nesting, "&");
                }
                '"' | '\'' => {
                    let text = self.read_string()?;
                    self.push(selector, NodeKind::Str, text);
                }
                '*' => {
                    self.bump();
                    if self.at_namespace_separator() {
                        self.bump();
                        self.parse_type(selector, Some(Namespace::Named("*".to_string())))?;
                    } else {
                        self.push(selector, NodeKind::Universal, "*");
                    }
                }
                ch if is_ident_char(ch) => {
                    let name = self.read_ident();
                    if self.at_namespace_separator() {
                        self.bump();
                        self.parse_type(selector, Some(Namespace::Named(name)))?;
                    } else {
                        self.push(selector, NodeKind::Tag, name);
                    }
                }
                ch => return Err(self.error(format!("unexpected `{ch}`"))),
            }
        }
    }

    /// Type or universal selector following a `ns|` prefix.
    fn parse_type(&mut self, selector: NodeId, namespace: Option<Namespace>) -> Result<()> {
        let id = if self.peek() == Some('*') {
            self.bump();
            self.push(selector, NodeKind::Universal, "*")
        } else {
            let name = self.expect_ident("element name")?;
            self.push(selector, NodeKind::Tag, name)
        };
        self.tree[id].namespace = namespace;
        Ok(())
    }

    fn parse_attribute(&mut self, selector: NodeId) -> Result<()> {
        self.bump();
        self.skip_trivia()?;

        let mut namespace = None;
        let name = if self.peek() == Some('*') && self.peek_nth(1) == Some('|') {
            self.bump();
            self.bump();
            namespace = Some(Namespace::Named("*".to_string()));
            self.expect_ident("attribute name")?
        } else if self.peek() == Some('|') && self.peek_nth(1) != Some('=') {
            // `[|attr]` means "no namespace", same as `[attr]`.
            self.bump();
            self.expect_ident("attribute name")?
        } else {
            let first = self.expect_ident("attribute name")?;
            if self.at_namespace_separator() {
                self.bump();
                namespace = Some(Namespace::Named(first));
                self.expect_ident("attribute name")?
            } else {
                first
            }
        };
        self.skip_trivia()?;

        let mut matcher = AttributeMatch::default();
        let operator = match (self.peek(), self.peek_nth(1)) {
            (Some('='), _) => Some("=".to_string()),
            (Some(op @ ('~' | '|' | '^' | '$' | '*')), Some('=')) => Some(format!("{op}=")),
            _ => None,
        };
        if let Some(operator) = operator {
            for _ in 0..operator.len() {
                self.bump();
            }
            self.skip_trivia()?;
            let value = match self.peek() {
                Some('"' | '\'') => self.read_string()?,
                Some(ch) if is_ident_char(ch) => self.read_ident(),
                _ => return Err(self.error("expected attribute value")),
            };
            self.skip_trivia()?;
            if self.peek().is_some_and(is_ident_char) {
                matcher.flag = Some(self.read_ident());
                self.skip_trivia()?;
            }
            matcher.operator = Some(operator);
            matcher.value = Some(value);
        }

        match self.bump() {
            Some(']') => {}
            Some(ch) => return Err(self.error(format!("unexpected `{ch}` in attribute selector"))),
            None => return Err(self.error("unclosed `[`")),
        }

        let id = self.push(selector, NodeKind::Attribute(matcher), name);
        self.tree[id].namespace = namespace;
        Ok(())
    }

    fn parse_pseudo(&mut self, selector: NodeId) -> Result<()> {
        self.bump();
        let mut value = String::from(":");
        if self.peek() == Some(':') {
            self.bump();
            value.push(':');
        }
        value.push_str(&self.expect_ident("pseudo name")?);

        if self.peek() != Some('(') {
            self.push(selector, NodeKind::Pseudo { arguments: false }, value);
            return Ok(());
        }

        self.bump();
        let pseudo = self.push(selector, NodeKind::Pseudo { arguments: true }, value);
        self.skip_trivia()?;
        if self.peek() != Some(')') {
            self.parse_list(pseudo, true)?;
        }
        match self.bump() {
            Some(')') => Ok(()),
            _ => Err(self.error("unclosed `(`")),
        }
    }

    /// Reads a quoted string, quotes and escapes kept as written.
    fn read_string(&mut self) -> Result<String> {
        let start = self.pos;
        let quote = self.bump();
        while let Some(ch) = self.bump() {
            if ch == '\\' {
                self.bump();
            } else if Some(ch) == quote {
                return Ok(self.input[start..self.pos].to_string());
            }
        }
        Err(Error::Selector {
            message: "unclosed string".to_string(),
            position: start,
        })
    }

    fn read_ident(&mut self) -> String {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch == '\\' {
                self.bump();
                self.bump();
            } else if is_ident_char(ch) {
                self.bump();
            } else {
                break;
            }
        }
        self.input[start..self.pos].to_string()
    }

    fn expect_ident(&mut self, what: &str) -> Result<String> {
        let name = self.read_ident();
        if name.is_empty() {
            return Err(self.error(format!("expected {what}")));
        }
        Ok(name)
    }

    /// `|` that separates a namespace prefix, as opposed to `|=` or `||`.
    fn at_namespace_separator(&self) -> bool {
        self.peek() == Some('|') && !matches!(self.peek_nth(1), Some('=' | '|'))
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind, value: impl Into<String>) -> NodeId {
        let id = self.tree.create(kind, value);
        self.tree.append_child(parent, id);
        id
    }
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '\\' || !ch.is_ascii()
}
