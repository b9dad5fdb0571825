/// Receives the styles a compile registers globally, once per cache key.
pub trait StyleSink {
    fn insert(&mut self, key: &str, css: &str);
}

/// In-memory sink keeping registrations in insertion order.
#[derive(Debug, Clone, Default)]
pub struct StyleBuffer {
    entries: Vec<(String, String)>,
}

impl StyleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, css)| css.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every registered style, one per line.
    pub fn to_css(&self) -> String {
        self.entries
            .iter()
            .filter(|(_, css)| !css.is_empty())
            .map(|(_, css)| css.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl StyleSink for StyleBuffer {
    fn insert(&mut self, key: &str, css: &str) {
        if self.get(key).is_none() {
            self.entries.push((key.to_string(), css.to_string()));
        }
    }
}
