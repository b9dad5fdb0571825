use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// The structural half of a style: shared by every call that maps to the same cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledStyle {
    hash: String,
    css: String,
    /// Local class name -> generated class name.
    tokens: BTreeMap<String, String>,
}

impl CompiledStyle {
    pub fn new(hash: String, css: String, tokens: BTreeMap<String, String>) -> Self {
        CompiledStyle { hash, css, tokens }
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn css(&self) -> &str {
        &self.css
    }

    pub fn tokens(&self) -> &BTreeMap<String, String> {
        &self.tokens
    }
}

/// Result of one template call: a shared [`CompiledStyle`] plus this call's
/// custom property bindings.
#[derive(Debug, Clone)]
pub struct StyleToken {
    compiled: Rc<CompiledStyle>,
    vars: BTreeMap<String, String>,
}

impl StyleToken {
    pub(crate) fn new(compiled: Rc<CompiledStyle>, vars: BTreeMap<String, String>) -> Self {
        StyleToken { compiled, vars }
    }

    pub fn compiled(&self) -> &CompiledStyle {
        &self.compiled
    }

    /// Cache key of the compiled style; also its identity when used as a mixin.
    pub fn hash(&self) -> &str {
        self.compiled.hash()
    }

    pub fn css(&self) -> &str {
        self.compiled.css()
    }

    pub fn tokens(&self) -> &BTreeMap<String, String> {
        self.compiled.tokens()
    }

    /// Generated class for a local class name used in the template.
    pub fn class(&self, name: &str) -> Option<&str> {
        self.compiled.tokens().get(name).map(String::as_str)
    }

    /// Custom property bindings, keyed `--<hash>_<n>`.
    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    /// True if both tokens came out of the same cache entry.
    pub fn shares_compiled(&self, other: &StyleToken) -> bool {
        Rc::ptr_eq(&self.compiled, &other.compiled)
    }
}

/// A plain property/value mapping, compiled into an ad hoc mixin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declarations(Vec<(String, String)>);

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push((property.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Flat `property:value;` text.
    pub fn to_css(&self) -> String {
        self.0
            .iter()
            .map(|(property, value)| format!("{property}:{value};"))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Declarations {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Declarations(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// One interpolated value of a template call.
///
/// Only `None` and the empty string convert to `Empty`. Numbers, `0` included,
/// are always a `Value`.
#[derive(Debug, Clone)]
pub enum Interpolation {
    /// Nothing at this position.
    Empty,
    /// A previously compiled style inlined at this position.
    Mixin(StyleToken),
    /// A mapping compiled on the fly and inlined like a mixin.
    Declarations(Declarations),
    /// A dynamic value bound to a generated custom property.
    Value(String),
}

impl From<StyleToken> for Interpolation {
    fn from(token: StyleToken) -> Self {
        Interpolation::Mixin(token)
    }
}

impl From<&StyleToken> for Interpolation {
    fn from(token: &StyleToken) -> Self {
        Interpolation::Mixin(token.clone())
    }
}

impl From<Declarations> for Interpolation {
    fn from(declarations: Declarations) -> Self {
        Interpolation::Declarations(declarations)
    }
}

impl From<String> for Interpolation {
    fn from(value: String) -> Self {
        if value.is_empty() {
            Interpolation::Empty
        } else {
            Interpolation::Value(value)
        }
    }
}

impl From<&str> for Interpolation {
    fn from(value: &str) -> Self {
        Interpolation::from(value.to_string())
    }
}

impl<T: Into<Interpolation>> From<Option<T>> for Interpolation {
    fn from(value: Option<T>) -> Self {
        value.map_or(Interpolation::Empty, Into::into)
    }
}

macro_rules! scalar_interpolation {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Interpolation {
                fn from(value: $ty) -> Self {
                    Interpolation::Value(value.to_string())
                }
            }
        )*
    };
}

scalar_interpolation!(i32, i64, u32, u64, usize, f32, f64);

impl fmt::Display for CompiledStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Hash: {}", self.hash)?;
        for (local, generated) in &self.tokens {
            writeln!(f, "  .{local} -> .{generated}")?;
        }
        write!(f, "{}", self.css)
    }
}
