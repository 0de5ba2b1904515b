/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};
use std::time::Duration;

use ahash::AHashSet;
use thiserror::Error;
use tokio::runtime::Handle;

use tally_cache::{ExpiringCache, SweepHandle};
use tally_types::{ArcClock, MetricValue, TagList};

use super::{ArcInstrumented, Instrumented, MemberSet, MonitorDescriptor, object_addr};

const MAX_NESTED_DEPTH: usize = 16;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("duplicate identity members: {first} and {second}")]
    DuplicateIdentity { first: String, second: String },
    #[error("accessor {name} takes {arity} parameters")]
    ParameterizedAccessor { name: String, arity: usize },
    #[error("identity accessor {member} takes {arity} parameters")]
    ParameterizedIdentity { member: String, arity: usize },
    #[error("identity member {member} is not of text type")]
    IdentityType { member: String },
    #[error("object has been dropped")]
    ObjectDropped,
    #[error("nested objects deeper than {}", MAX_NESTED_DEPTH)]
    TooDeep,
}

impl ExtractError {
    /// Errors caused by invalid member declarations
    pub fn is_config_error(&self) -> bool {
        !matches!(self, ExtractError::ObjectDropped)
    }
}

struct Inherited {
    identity: Option<Arc<str>>,
    tags: TagList,
}

/// List all monitors exported by `obj` and the objects it declares as
/// children.
///
/// Children inherit the object tags of their parent, and its identity if
/// they have none. A child that is reachable more than once is only
/// visited the first time.
pub fn extract(obj: &ArcInstrumented) -> Result<Vec<MonitorDescriptor>, ExtractError> {
    let mut visited = AHashSet::new();
    visited.insert(object_addr(obj));
    let mut descriptors = Vec::new();
    let root = Inherited {
        identity: None,
        tags: TagList::EMPTY,
    };
    collect(obj, &root, 0, &mut visited, &mut descriptors)?;
    Ok(descriptors)
}

fn collect(
    obj: &ArcInstrumented,
    inherited: &Inherited,
    depth: usize,
    visited: &mut AHashSet<usize>,
    descriptors: &mut Vec<MonitorDescriptor>,
) -> Result<(), ExtractError> {
    let mut members = MemberSet::default();
    Arc::clone(obj).declare(&mut members);
    if let Some(e) = members.error {
        return Err(e);
    }

    let identity = match members.identity {
        Some(m) => match m.accessor.read() {
            Some(MetricValue::Text(s)) => Some(s),
            Some(_) => return Err(ExtractError::IdentityType { member: m.member }),
            None => return Err(ExtractError::ObjectDropped),
        },
        None => inherited.identity.clone(),
    };

    let mut object_tags = inherited.tags.clone();
    for accessor in &members.tags {
        let tags = accessor.read().ok_or(ExtractError::ObjectDropped)?;
        object_tags = object_tags.union(&tags);
    }

    for m in members.metrics {
        let tags = object_tags.union(m.config.tags());
        descriptors.push(MonitorDescriptor::new(
            m.config,
            tags,
            identity.clone(),
            m.accessor,
        ));
    }

    if members.children.is_empty() {
        return Ok(());
    }
    if depth >= MAX_NESTED_DEPTH {
        return Err(ExtractError::TooDeep);
    }
    let next = Inherited {
        identity,
        tags: object_tags,
    };
    for child in &members.children {
        if !visited.insert(object_addr(child)) {
            continue;
        }
        collect(child, &next, depth + 1, visited, descriptors)?;
    }
    Ok(())
}

/// Cache key of an object, compared by address.
///
/// The weak reference keeps the allocation reserved, so the address can
/// not be reused by another object while the entry is cached.
#[derive(Clone)]
struct ObjectKey {
    addr: usize,
    obj: Weak<dyn Instrumented>,
}

impl ObjectKey {
    fn new(obj: &ArcInstrumented) -> Self {
        ObjectKey {
            addr: object_addr(obj),
            obj: Arc::downgrade(obj),
        }
    }
}

impl PartialEq for ObjectKey {
    fn eq(&self, other: &Self) -> bool {
        self.addr == other.addr
    }
}

impl Eq for ObjectKey {}

impl Hash for ObjectKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr.hash(state);
    }
}

type DescriptorCache = ExpiringCache<ObjectKey, Arc<[MonitorDescriptor]>, ExtractError>;

/// Extract descriptors with the result cached per object.
///
/// Only the descriptor set is cached, values are always read through the
/// accessors.
pub struct MetadataExtractor {
    cache: Arc<DescriptorCache>,
}

impl MetadataExtractor {
    pub fn new(ttl: Duration, clock: ArcClock) -> Self {
        let cache: DescriptorCache = ExpiringCache::new(ttl, clock, |key: &ObjectKey| {
            let obj = key.obj.upgrade().ok_or(ExtractError::ObjectDropped)?;
            extract(&obj).map(Arc::from)
        });
        MetadataExtractor {
            cache: Arc::new(cache),
        }
    }

    pub fn extract(&self, obj: &ArcInstrumented) -> Result<Arc<[MonitorDescriptor]>, ExtractError> {
        self.cache.get(&ObjectKey::new(obj))
    }

    /// Drop the cached descriptors of an object.
    pub fn forget(&self, obj: &ArcInstrumented) {
        self.cache.remove(&ObjectKey::new(obj));
    }

    pub fn cached_count(&self) -> usize {
        self.cache.len()
    }

    pub fn spawn_sweep(&self, interval: Duration, handle: Option<Handle>) -> SweepHandle {
        self.cache.spawn_sweep(interval, handle)
    }
}
