/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TagParseError {
    #[error("no '=' found in tag string {0:?}")]
    MissingDelimiter(String),
    #[error("empty tag key")]
    EmptyKey,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag {
    key: Arc<str>,
    value: Arc<str>,
}

impl Tag {
    pub fn new<K, V>(key: K, value: V) -> Result<Self, TagParseError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let key = key.as_ref();
        if key.is_empty() {
            return Err(TagParseError::EmptyKey);
        }
        Ok(Tag {
            key: Arc::from(key),
            value: Arc::from(value.as_ref()),
        })
    }

    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl FromStr for Tag {
    type Err = TagParseError;

    /// Split at the first '=', the value keeps any later '=' chars.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match memchr::memchr(b'=', s.as_bytes()) {
            Some(p) => Tag::new(&s[..p], &s[p + 1..]),
            None => Err(TagParseError::MissingDelimiter(s.to_string())),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)?;
        f.write_str("=")?;
        f.write_str(&self.value)
    }
}

/// Immutable tag collection, unique by key.
///
/// Iteration follows insertion order, while equality and hashing ignore
/// the order of the tags.
#[derive(Clone, Debug, Default)]
pub struct TagList {
    inner: Option<Arc<[Tag]>>,
}

impl TagList {
    pub const EMPTY: TagList = TagList { inner: None };

    pub fn from_tags<I>(tags: I) -> Self
    where
        I: IntoIterator<Item = Tag>,
    {
        let mut list: Vec<Tag> = Vec::new();
        for tag in tags {
            insert_or_replace(&mut list, tag);
        }
        TagList::from_vec(list)
    }

    fn from_vec(list: Vec<Tag>) -> Self {
        if list.is_empty() {
            TagList::EMPTY
        } else {
            TagList {
                inner: Some(Arc::from(list)),
            }
        }
    }

    #[inline]
    fn as_slice(&self) -> &[Tag] {
        self.inner.as_deref().unwrap_or(&[])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_none()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.as_slice().iter()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.as_slice()
            .iter()
            .find(|t| t.key() == key)
            .map(|t| t.value())
    }

    pub fn with_tag(&self, tag: Tag) -> TagList {
        let mut list = self.as_slice().to_vec();
        insert_or_replace(&mut list, tag);
        TagList::from_vec(list)
    }

    /// Combine two lists, keys found in both take the value from `other`.
    pub fn union(&self, other: &TagList) -> TagList {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut list = Vec::with_capacity(self.len() + other.len());
        list.extend_from_slice(self.as_slice());
        for tag in other.iter() {
            insert_or_replace(&mut list, tag.clone());
        }
        TagList::from_vec(list)
    }
}

fn insert_or_replace(list: &mut Vec<Tag>, tag: Tag) {
    match list.iter_mut().find(|t| t.key == tag.key) {
        Some(slot) => *slot = tag,
        None => list.push(tag),
    }
}

impl PartialEq for TagList {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|t| other.get(t.key()) == Some(t.value()))
    }
}

impl Eq for TagList {}

impl Hash for TagList {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut sorted: Vec<&Tag> = self.iter().collect();
        sorted.sort_unstable();
        state.write_usize(sorted.len());
        for tag in sorted {
            tag.hash(state);
        }
    }
}

impl<'a> IntoIterator for &'a TagList {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Tag> for TagList {
    fn from_iter<T: IntoIterator<Item = Tag>>(iter: T) -> Self {
        TagList::from_tags(iter)
    }
}

impl fmt::Display for TagList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.iter();
        let Some(first) = iter.next() else {
            return Ok(());
        };
        write!(f, "{first}")?;
        for tag in iter {
            write!(f, ",{tag}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn tag(k: &str, v: &str) -> Tag {
        Tag::new(k, v).unwrap()
    }

    fn hash_of(list: &TagList) -> u64 {
        let mut h = DefaultHasher::new();
        list.hash(&mut h);
        h.finish()
    }

    #[test]
    fn parse() {
        let t = Tag::from_str("k=v=extra").unwrap();
        assert_eq!(t.key(), "k");
        assert_eq!(t.value(), "v=extra");

        let t = Tag::from_str("k=").unwrap();
        assert_eq!(t.value(), "");

        assert_eq!(
            Tag::from_str("novalue").unwrap_err(),
            TagParseError::MissingDelimiter("novalue".to_string())
        );
        assert_eq!(Tag::from_str("=v").unwrap_err(), TagParseError::EmptyKey);
    }

    #[test]
    fn display() {
        let t = tag("a", "b=c");
        assert_eq!(t.to_string(), "a=b=c");

        let list = TagList::from_tags([tag("x", "1"), tag("y", "2")]);
        assert_eq!(list.to_string(), "x=1,y=2");
        assert_eq!(TagList::EMPTY.to_string(), "");
    }

    #[test]
    fn dedup_by_key() {
        let list = TagList::from_tags([tag("a", "1"), tag("b", "2"), tag("a", "3")]);
        assert_eq!(list.len(), 2);
        assert_eq!(list.get("a"), Some("3"));
        let keys: Vec<&str> = list.iter().map(|t| t.key()).collect();
        assert_eq!(keys, ["a", "b"]);
    }

    #[test]
    fn union_override() {
        let first = TagList::from_tags([tag("a", "1"), tag("b", "2")]);
        let second = TagList::from_tags([tag("b", "20"), tag("c", "30")]);
        let merged = first.union(&second);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.get("a"), Some("1"));
        assert_eq!(merged.get("b"), Some("20"));
        assert_eq!(merged.get("c"), Some("30"));
        let keys: Vec<&str> = merged.iter().map(|t| t.key()).collect();
        assert_eq!(keys, ["a", "b", "c"]);

        assert_eq!(TagList::EMPTY.union(&second), second);
        assert_eq!(first.union(&TagList::EMPTY), first);
    }

    #[test]
    fn order_insensitive_eq() {
        let l1 = TagList::from_tags([tag("a", "1"), tag("b", "2")]);
        let l2 = TagList::from_tags([tag("b", "2"), tag("a", "1")]);
        assert_eq!(l1, l2);
        assert_eq!(hash_of(&l1), hash_of(&l2));

        let l3 = TagList::from_tags([tag("a", "1"), tag("b", "3")]);
        assert_ne!(l1, l3);
    }

    #[test]
    fn empty_shared() {
        let list = TagList::from_tags(Vec::new());
        assert!(list.is_empty());
        assert_eq!(list, TagList::EMPTY);
        assert_eq!(TagList::default().len(), 0);
    }
}
