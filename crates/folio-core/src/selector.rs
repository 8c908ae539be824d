//! Selector parsing and matching
//!
//! Supports the CSS subset the rule groups bind with:
//!
//! ```text
//! selector  := complex ( "," complex )*
//! complex   := compound ( <whitespace> compound )*      // descendant only
//! compound  := ( tag | "*" )? ( "#" ident | "." ident | attr )*
//! attr      := "[" ident ( ( "=" | "^=" ) value )? "]"
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::dom::{Document, NodeId};
use crate::error::{FolioError, FolioResult};

/// A parsed, comma-separated selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    groups: Vec<Complex>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    /// Left to right; each step is a descendant of the previous
    compounds: Vec<Compound>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrMatch {
    name: String,
    test: Option<(AttrOp, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Equals,
    Prefix,
}

impl Selector {
    pub fn parse(input: &str) -> FolioResult<Self> {
        Parser::new(input).parse()
    }

    /// `#id` selector without going through the parser
    pub fn id(id: &str) -> Self {
        Self::single(Compound {
            id: Some(id.to_string()),
            ..Compound::default()
        })
    }

    /// `.class` selector without going through the parser
    pub fn class(class: &str) -> Self {
        Self::single(Compound {
            classes: vec![class.to_string()],
            ..Compound::default()
        })
    }

    fn single(compound: Compound) -> Self {
        Self {
            groups: vec![Complex {
                compounds: vec![compound],
            }],
        }
    }

    pub fn matches<D: Document + ?Sized>(&self, doc: &D, node: NodeId) -> bool {
        self.groups.iter().any(|complex| complex.matches(doc, node))
    }
}

impl Complex {
    fn matches<D: Document + ?Sized>(&self, doc: &D, node: NodeId) -> bool {
        let Some((last, ancestors)) = self.compounds.split_last() else {
            return false;
        };
        if !last.matches(doc, node) {
            return false;
        }

        // Greedy ancestor walk is exact for descendant-only combinators
        let mut current = node;
        for compound in ancestors.iter().rev() {
            loop {
                match doc.parent(current) {
                    Some(parent) => {
                        current = parent;
                        if compound.matches(doc, current) {
                            break;
                        }
                    }
                    None => return false,
                }
            }
        }
        true
    }
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attrs.is_empty()
    }

    fn matches<D: Document + ?Sized>(&self, doc: &D, node: NodeId) -> bool {
        if let Some(tag) = &self.tag {
            if tag != "*" && !doc.tag(node).eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if doc.attribute(node, "id").as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|class| doc.has_class(node, class)) {
            return false;
        }
        self.attrs.iter().all(|attr| {
            let Some(actual) = doc.attribute(node, &attr.name) else {
                return false;
            };
            match &attr.test {
                None => true,
                Some((AttrOp::Equals, expected)) => actual == *expected,
                Some((AttrOp::Prefix, prefix)) => !prefix.is_empty() && actual.starts_with(prefix),
            }
        })
    }
}

struct Parser<'a> {
    input: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: &str) -> FolioError {
        FolioError::InvalidSelector(format!("{} in {:?} at {}", reason, self.input, self.pos))
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn parse(mut self) -> FolioResult<Selector> {
        let mut groups = vec![self.complex()?];
        while self.peek() == Some(',') {
            self.bump();
            groups.push(self.complex()?);
        }
        match self.peek() {
            None => Ok(Selector { groups }),
            Some(_) => Err(self.error("unexpected character")),
        }
    }

    fn complex(&mut self) -> FolioResult<Complex> {
        self.skip_ws();
        let mut compounds = vec![self.compound()?];
        loop {
            let had_ws = self.skip_ws();
            match self.peek() {
                None | Some(',') => break,
                Some(_) if had_ws => compounds.push(self.compound()?),
                Some(_) => return Err(self.error("unsupported combinator")),
            }
        }
        Ok(Complex { compounds })
    }

    fn compound(&mut self) -> FolioResult<Compound> {
        let mut compound = Compound::default();
        if self.peek() == Some('*') {
            self.bump();
            compound.tag = Some("*".to_string());
        } else if self.peek().is_some_and(is_ident_char) {
            compound.tag = Some(self.ident()?.to_ascii_lowercase());
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    compound.id = Some(self.ident()?);
                }
                Some('.') => {
                    self.bump();
                    compound.classes.push(self.ident()?);
                }
                Some('[') => {
                    self.bump();
                    compound.attrs.push(self.attr()?);
                }
                _ => break,
            }
        }

        if compound.is_empty() {
            return Err(self.error("expected selector"));
        }
        Ok(compound)
    }

    fn ident(&mut self) -> FolioResult<String> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected identifier"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn attr(&mut self) -> FolioResult<AttrMatch> {
        self.skip_ws();
        let name = self.ident()?;
        self.skip_ws();

        let op = match self.peek() {
            Some(']') => {
                self.bump();
                return Ok(AttrMatch { name, test: None });
            }
            Some('=') => {
                self.bump();
                AttrOp::Equals
            }
            Some('^') => {
                self.bump();
                if self.bump() != Some('=') {
                    return Err(self.error("expected '=' after '^'"));
                }
                AttrOp::Prefix
            }
            _ => return Err(self.error("unsupported attribute operator")),
        };

        self.skip_ws();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let start = self.pos;
                while self.peek().is_some_and(|c| c != quote) {
                    self.pos += 1;
                }
                let value: String = self.chars[start..self.pos].iter().collect();
                if self.bump() != Some(quote) {
                    return Err(self.error("unterminated string"));
                }
                value
            }
            _ => self.ident()?,
        };
        self.skip_ws();
        if self.bump() != Some(']') {
            return Err(self.error("expected ']'"));
        }
        Ok(AttrMatch {
            name,
            test: Some((op, value)),
        })
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, complex) in self.groups.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            for (j, compound) in complex.compounds.iter().enumerate() {
                if j > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{}", compound)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(tag) = &self.tag {
            f.write_str(tag)?;
        }
        if let Some(id) = &self.id {
            write!(f, "#{}", id)?;
        }
        for class in &self.classes {
            write!(f, ".{}", class)?;
        }
        for attr in &self.attrs {
            let Some((op, value)) = &attr.test else {
                write!(f, "[{}]", attr.name)?;
                continue;
            };
            let op = match op {
                AttrOp::Equals => "=",
                AttrOp::Prefix => "^=",
            };
            // A parsed value never holds both quote characters
            let quote = if value.contains('"') { '\'' } else { '"' };
            write!(f, "[{}{}{}{}{}]", attr.name, op, quote, value, quote)?;
        }
        Ok(())
    }
}

impl FromStr for Selector {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

impl Serialize for Selector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Selector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Selector::parse(&text).map_err(serde::de::Error::custom)
    }
}
