/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use super::{ExtractError, MonitorConfig, TagsAccessor, ValueAccessor};

/// An object that exports metrics.
///
/// `declare` lists the exported members of the object into the given
/// set. It must not change the object, and should declare the same
/// members each time it is called, as the result is cached.
pub trait Instrumented: Send + Sync + 'static {
    fn declare(self: Arc<Self>, members: &mut MemberSet);
}

pub type ArcInstrumented = Arc<dyn Instrumented>;

pub(crate) fn object_addr(obj: &ArcInstrumented) -> usize {
    Arc::as_ptr(obj) as *const () as usize
}

pub(super) struct MetricMember {
    pub(super) config: MonitorConfig,
    pub(super) accessor: ValueAccessor,
}

pub(super) struct IdentityMember {
    pub(super) member: String,
    pub(super) accessor: ValueAccessor,
}

/// Members declared by one object.
///
/// Invalid declarations are recorded, the first one is returned by the
/// extraction of the object.
#[derive(Default)]
pub struct MemberSet {
    pub(super) metrics: Vec<MetricMember>,
    pub(super) identity: Option<IdentityMember>,
    pub(super) tags: Vec<TagsAccessor>,
    pub(super) children: Vec<ArcInstrumented>,
    pub(super) error: Option<ExtractError>,
}

impl MemberSet {
    fn set_error(&mut self, e: ExtractError) {
        if self.error.is_none() {
            self.error = Some(e);
        }
    }

    pub fn field(&mut self, config: MonitorConfig, accessor: ValueAccessor) {
        self.metrics.push(MetricMember { config, accessor });
    }

    /// Declare an accessor method taking `arity` parameters.
    ///
    /// Only methods without parameters can be polled.
    pub fn method(&mut self, config: MonitorConfig, arity: usize, accessor: ValueAccessor) {
        if arity > 0 {
            self.set_error(ExtractError::ParameterizedAccessor {
                name: config.name().to_string(),
                arity,
            });
            return;
        }
        self.field(config, accessor);
    }

    pub fn identity_field(&mut self, member: &str, accessor: ValueAccessor) {
        self.identity_method(member, 0, accessor);
    }

    /// Declare the member that supplies the identity of the object.
    ///
    /// The value should be text, and at most one member may be declared.
    pub fn identity_method(&mut self, member: &str, arity: usize, accessor: ValueAccessor) {
        if arity > 0 {
            self.set_error(ExtractError::ParameterizedIdentity {
                member: member.to_string(),
                arity,
            });
            return;
        }
        if let Some(first) = &self.identity {
            let first = first.member.clone();
            self.set_error(ExtractError::DuplicateIdentity {
                first,
                second: member.to_string(),
            });
            return;
        }
        self.identity = Some(IdentityMember {
            member: member.to_string(),
            accessor,
        });
    }

    /// Object level tags, added to all metrics of this object and its
    /// children.
    pub fn tags(&mut self, accessor: TagsAccessor) {
        self.tags.push(accessor);
    }

    pub fn child(&mut self, obj: ArcInstrumented) {
        self.children.push(obj);
    }
}
