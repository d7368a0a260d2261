//! Field paths and path patterns.
//!
//! A [`FieldPath`] names one concrete location in an IR tree
//! (`spec.containers[0].image`). A [`PathPattern`] is the authored form
//! used by schema tables, match rules, and hint templates: it may use `[*]`
//! for any list index, `*` for any key, and a leading `**.` to match at any
//! depth. Keys containing `.` or `/` are written quoted:
//! `metadata.annotations."kubectl.kubernetes.io/last-applied-configuration"`.

use serde::Serialize;
use std::fmt;

/// One step in a concrete field path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// A concrete location in an IR tree, root-anchored.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn root() -> Self {
        FieldPath(Vec::new())
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn child(&self, key: &str) -> Self {
        let mut next = self.clone();
        next.0.push(PathSegment::Key(key.to_string()));
        next
    }

    pub fn item(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.0.push(PathSegment::Index(index));
        next
    }

    /// Final key segment, if the path ends on one.
    pub fn last_key(&self) -> Option<&str> {
        match self.0.last() {
            Some(PathSegment::Key(k)) => Some(k),
            _ => None,
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, ".");
        }
        let mut first = true;
        for segment in &self.0 {
            match segment {
                PathSegment::Key(k) => {
                    if !first {
                        write!(f, ".")?;
                    }
                    if k.contains('.') || k.contains('/') || k.contains('[') {
                        write!(f, "\"{}\"", k)?;
                    } else {
                        write!(f, "{}", k)?;
                    }
                    first = false;
                }
                PathSegment::Index(i) => {
                    write!(f, "[{}]", i)?;
                    first = false;
                }
            }
        }
        Ok(())
    }
}

impl Serialize for FieldPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ── Patterns ─────────────────────────────────────────────────────────

/// One step in a path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternSegment {
    Key(String),
    Index(usize),
    AnyIndex,
    AnyKey,
}

impl PatternSegment {
    fn matches(&self, segment: &PathSegment) -> bool {
        match (self, segment) {
            (PatternSegment::Key(a), PathSegment::Key(b)) => a == b,
            (PatternSegment::Index(a), PathSegment::Index(b)) => a == b,
            (PatternSegment::AnyIndex, PathSegment::Index(_)) => true,
            (PatternSegment::AnyKey, PathSegment::Key(_)) => true,
            _ => false,
        }
    }

    fn is_literal(&self) -> bool {
        matches!(self, PatternSegment::Key(_) | PatternSegment::Index(_))
    }
}

/// Where a pattern is allowed to start matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    /// Must match from the IR root.
    Root,
    /// Written with a leading `**.` -- matches as a suffix at any depth.
    Anywhere,
}

/// An authored path pattern, as used in schema tables, match rules, and
/// hint template keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    anchor: Anchor,
    segments: Vec<PatternSegment>,
    text: String,
}

/// A pattern string the engine cannot interpret. Definition-time only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternError {
    pub pattern: String,
    pub message: String,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid path pattern '{}': {}", self.pattern, self.message)
    }
}

impl std::error::Error for PatternError {}

impl PathPattern {
    pub fn parse(text: &str) -> Result<Self, PatternError> {
        let err = |message: &str| PatternError {
            pattern: text.to_string(),
            message: message.to_string(),
        };

        let (anchor, body) = match text.strip_prefix("**.") {
            Some(rest) => (Anchor::Anywhere, rest),
            None => (Anchor::Root, text),
        };
        if body.is_empty() {
            return Err(err("pattern is empty"));
        }

        let mut segments = Vec::new();
        for raw in split_segments(body).map_err(|m| err(&m))? {
            // A raw piece is either a (possibly quoted) key with optional
            // bracket suffixes, or a bare `*`.
            let (key_part, brackets) = split_brackets(&raw).map_err(|m| err(&m))?;
            if !key_part.is_empty() {
                if key_part == "*" {
                    segments.push(PatternSegment::AnyKey);
                } else if key_part == "**" {
                    return Err(err("'**' is only allowed as a leading '**.' prefix"));
                } else {
                    segments.push(PatternSegment::Key(key_part));
                }
            } else if brackets.is_empty() {
                return Err(err("empty segment"));
            }
            for bracket in brackets {
                if bracket == "*" {
                    segments.push(PatternSegment::AnyIndex);
                } else {
                    let index: usize = bracket
                        .parse()
                        .map_err(|_| err("list index must be a number or '*'"))?;
                    segments.push(PatternSegment::Index(index));
                }
            }
        }
        if segments.is_empty() {
            return Err(err("pattern is empty"));
        }

        Ok(PathPattern {
            anchor,
            segments,
            text: text.to_string(),
        })
    }

    /// The pattern as authored.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Does this pattern match the concrete path?
    pub fn matches(&self, path: &FieldPath) -> bool {
        let segments = path.segments();
        match self.anchor {
            Anchor::Root => {
                segments.len() == self.segments.len()
                    && self
                        .segments
                        .iter()
                        .zip(segments)
                        .all(|(pattern, segment)| pattern.matches(segment))
            }
            Anchor::Anywhere => {
                if segments.len() < self.segments.len() {
                    return false;
                }
                let tail = &segments[segments.len() - self.segments.len()..];
                self.segments
                    .iter()
                    .zip(tail)
                    .all(|(pattern, segment)| pattern.matches(segment))
            }
        }
    }

    /// Does this pattern match the field `key` inside a mapping at `parent`?
    /// Used by the defaulting walk, which visits parent mappings.
    pub fn matches_child(&self, parent: &FieldPath, key: &str) -> bool {
        match self.segments.last() {
            Some(PatternSegment::Key(k)) if k == key => {}
            Some(PatternSegment::AnyKey) => {}
            _ => return false,
        }
        self.matches(&parent.child(key))
    }

    /// The final key named by the pattern, if it ends on a literal key.
    pub fn last_key(&self) -> Option<&str> {
        match self.segments.last() {
            Some(PatternSegment::Key(k)) => Some(k),
            _ => None,
        }
    }

    /// Ranking for "most specific hint wins": literal segments count
    /// double, root anchoring breaks ties against `**.` patterns.
    pub fn specificity(&self) -> usize {
        let literals = self.segments.iter().filter(|s| s.is_literal()).count();
        2 * literals + usize::from(self.anchor == Anchor::Root)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Split a pattern body on `.` outside quotes and brackets.
fn split_segments(body: &str) -> Result<Vec<String>, String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut in_bracket = false;
    for c in body.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            '[' if !in_quotes => {
                in_bracket = true;
                current.push(c);
            }
            ']' if !in_quotes => {
                if !in_bracket {
                    return Err("unbalanced ']'".to_string());
                }
                in_bracket = false;
                current.push(c);
            }
            '.' if !in_quotes && !in_bracket => {
                out.push(std::mem::take(&mut current));
                continue;
            }
            _ => current.push(c),
        }
    }
    if in_quotes {
        return Err("unterminated quote".to_string());
    }
    if in_bracket {
        return Err("unterminated '['".to_string());
    }
    out.push(current);
    Ok(out)
}

/// Split one raw segment into its key part and bracket suffixes.
fn split_brackets(raw: &str) -> Result<(String, Vec<String>), String> {
    let mut key = String::new();
    let mut brackets = Vec::new();
    let mut chars = raw.chars().peekable();

    if chars.peek() == Some(&'"') {
        chars.next();
        for c in chars.by_ref() {
            if c == '"' {
                break;
            }
            key.push(c);
        }
    } else {
        while let Some(&c) = chars.peek() {
            if c == '[' {
                break;
            }
            key.push(c);
            chars.next();
        }
    }

    while chars.peek().is_some() {
        if chars.next() != Some('[') {
            return Err("unexpected text after ']'".to_string());
        }
        let mut inner = String::new();
        let mut closed = false;
        for c in chars.by_ref() {
            if c == ']' {
                closed = true;
                break;
            }
            inner.push(c);
        }
        if !closed {
            return Err("unterminated '['".to_string());
        }
        brackets.push(inner);
    }

    Ok((key, brackets))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_keys_with_separators() {
        let path = FieldPath::root()
            .child("metadata")
            .child("annotations")
            .child("kubectl.kubernetes.io/last-applied-configuration");
        assert_eq!(
            path.to_string(),
            "metadata.annotations.\"kubectl.kubernetes.io/last-applied-configuration\""
        );
    }

    #[test]
    fn display_inlines_indices() {
        let path = FieldPath::root().child("spec").child("containers").item(0).child("image");
        assert_eq!(path.to_string(), "spec.containers[0].image");
    }

    #[test]
    fn root_pattern_matches_exactly() {
        let pattern = PathPattern::parse("spec.replicas").unwrap();
        assert!(pattern.matches(&FieldPath::root().child("spec").child("replicas")));
        assert!(!pattern.matches(&FieldPath::root().child("replicas")));
    }

    #[test]
    fn any_index_and_anywhere() {
        let pattern = PathPattern::parse("**.containers[*].image").unwrap();
        let deployment = FieldPath::root()
            .child("spec")
            .child("template")
            .child("spec")
            .child("containers")
            .item(1)
            .child("image");
        let pod = FieldPath::root().child("spec").child("containers").item(0).child("image");
        assert!(pattern.matches(&deployment));
        assert!(pattern.matches(&pod));
        assert!(!pattern.matches(&pod.child("tag")));
    }

    #[test]
    fn any_key_matches_label_values() {
        let pattern = PathPattern::parse("metadata.labels.*").unwrap();
        assert!(pattern.matches(&FieldPath::root().child("metadata").child("labels").child("app")));
        assert!(!pattern.matches(&FieldPath::root().child("metadata").child("labels")));
    }

    #[test]
    fn quoted_pattern_segment() {
        let pattern =
            PathPattern::parse("metadata.annotations.\"kubectl.kubernetes.io/last-applied-configuration\"")
                .unwrap();
        let path = FieldPath::root()
            .child("metadata")
            .child("annotations")
            .child("kubectl.kubernetes.io/last-applied-configuration");
        assert!(pattern.matches(&path));
    }

    #[test]
    fn specificity_prefers_literals_and_root() {
        let generic = PathPattern::parse("**.image").unwrap();
        let specific = PathPattern::parse("spec.containers[*].image").unwrap();
        assert!(specific.specificity() > generic.specificity());
    }

    #[test]
    fn bad_patterns_are_rejected() {
        assert!(PathPattern::parse("").is_err());
        assert!(PathPattern::parse("spec..replicas").is_err());
        assert!(PathPattern::parse("spec.ports[x]").is_err());
        assert!(PathPattern::parse("a.**.b").is_err());
    }
}
