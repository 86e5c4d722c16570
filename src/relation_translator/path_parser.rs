//! Relation paths: what the caller asks to traverse.
//!
//! A path is either a dotted string (`"catalogs.subItems"`) or an ordered list
//! of entries, each a relation key optionally paired with a filter. Keys may
//! carry a `left@` prefix that switches the join translator to a LEFT JOIN
//! for that hop. Any other `word@` prefix is stripped and otherwise ignored.

use lazy_static::lazy_static;
use regex::Regex;

use super::filter::RelationFilter;

lazy_static! {
    /// `[prefix@]name`; replacing every match by its capture strips prefixes.
    static ref RELATION_KEY: Regex =
        Regex::new(r"(?:\w*@)?(\w+)").expect("relation key pattern is valid");
    static ref LEFT_JOIN_PREFIX: Regex =
        Regex::new(r"left@\w+").expect("left join pattern is valid");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinMode {
    #[default]
    Inner,
    Left,
}

/// One parsed hop of a relation path.
#[derive(Debug, Clone)]
pub struct RelationSpec {
    pub name: String,
    pub filter: Option<RelationFilter>,
    pub join_mode: JoinMode,
}

#[derive(Debug, Clone)]
pub enum PathEntry {
    /// Bare relation key, no filter
    Name(String),
    /// Relation key mapped to a (nullable) filter
    Filtered {
        key: String,
        filter: Option<RelationFilter>,
    },
}

/// An ordered relation path as the caller wrote it.
#[derive(Debug, Clone, Default)]
pub struct RelationPath {
    entries: Vec<PathEntry>,
}

impl RelationPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// `"catalogs.subItems"` -> two unfiltered hops.
    pub fn dotted(path: &str) -> Self {
        let entries = path
            .split('.')
            .filter(|segment| {
                if segment.is_empty() {
                    log::warn!("Ignoring empty segment in relation path '{}'", path);
                }
                !segment.is_empty()
            })
            .map(|segment| PathEntry::Name(segment.to_string()))
            .collect();
        RelationPath { entries }
    }

    pub fn relation(mut self, key: impl Into<String>) -> Self {
        self.entries.push(PathEntry::Name(key.into()));
        self
    }

    pub fn filtered(mut self, key: impl Into<String>, filter: RelationFilter) -> Self {
        self.entries.push(PathEntry::Filtered {
            key: key.into(),
            filter: Some(filter),
        });
        self
    }

    /// Entry whose filter may be absent, as in `['catalogs' => null]`.
    pub fn entry(mut self, key: impl Into<String>, filter: Option<RelationFilter>) -> Self {
        self.entries.push(PathEntry::Filtered {
            key: key.into(),
            filter,
        });
        self
    }

    pub fn entries(&self) -> &[PathEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn parse(&self) -> Vec<RelationSpec> {
        self.entries
            .iter()
            .map(|entry| match entry {
                PathEntry::Name(key) => parse_relation_key(key, None),
                PathEntry::Filtered { key, filter } => parse_relation_key(key, filter.clone()),
            })
            .collect()
    }
}

impl From<&str> for RelationPath {
    fn from(path: &str) -> Self {
        RelationPath::dotted(path)
    }
}

impl From<String> for RelationPath {
    fn from(path: String) -> Self {
        RelationPath::dotted(&path)
    }
}

impl From<&RelationPath> for RelationPath {
    fn from(path: &RelationPath) -> Self {
        path.clone()
    }
}

impl FromIterator<PathEntry> for RelationPath {
    fn from_iter<I: IntoIterator<Item = PathEntry>>(iter: I) -> Self {
        RelationPath {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Split a relation key into name and join mode. Never fails: a key that does
/// not match the prefix pattern passes through as the relation name.
pub fn parse_relation_key(key: &str, filter: Option<RelationFilter>) -> RelationSpec {
    let name = RELATION_KEY.replace_all(key, "${1}").into_owned();
    let join_mode = if LEFT_JOIN_PREFIX.is_match(key) {
        JoinMode::Left
    } else {
        JoinMode::Inner
    };
    if name != key && join_mode == JoinMode::Inner {
        log::warn!(
            "Relation key '{}' has a prefix other than left@; joining '{}' as INNER",
            key,
            name
        );
    }
    RelationSpec {
        name,
        filter,
        join_mode,
    }
}
