use std::fmt::{self, Display};

/// One physical line of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Assignment(Assignment),
    Raw(String),
}

impl Line {
    pub fn parse(raw: &str) -> Self {
        match Assignment::parse(raw) {
            Some(assignment) => Line::Assignment(assignment),
            None => Line::Raw(raw.to_owned()),
        }
    }

    pub fn as_assignment(&self) -> Option<&Assignment> {
        match self {
            Line::Assignment(assignment) => Some(assignment),
            Line::Raw(_) => None,
        }
    }
}

impl Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::Assignment(assignment) => write!(f, "{assignment}"),
            Line::Raw(raw) => f.write_str(raw),
        }
    }
}

/// A `key = "value"` line. Keeps its original text until modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    key: String,
    value: String,
    raw: Option<String>,
}

impl Assignment {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            raw: None,
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        let (key, value) = raw.split_once('=')?;
        let key = key.trim();
        if key.is_empty() || !key.chars().all(is_key_char) {
            return None;
        }
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);
        Some(Self {
            key: key.to_owned(),
            value: value.to_owned(),
            raw: Some(raw.to_owned()),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.raw = None;
    }
}

impl Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.raw {
            Some(raw) => f.write_str(raw),
            None => write!(f, "{} = \"{}\"", self.key, self.value),
        }
    }
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | ':' | '_' | '-' | '[' | ']')
}
