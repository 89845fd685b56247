// ABOUTME: Phantom-typed identifiers for hosting resources.
// ABOUTME: Keeps a deploy ID from being passed where a site ID is expected.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// A kind of remote resource that can be identified.
pub trait Resource {
    /// Type name shown by `Debug`.
    const NAME: &'static str;
}

pub enum SiteResource {}
pub enum DeployResource {}

impl Resource for SiteResource {
    const NAME: &'static str = "SiteId";
}

impl Resource for DeployResource {
    const NAME: &'static str = "DeployId";
}

/// Opaque identifier issued by the hosting service.
///
/// The API hands out bare strings for every resource; the type parameter
/// records which kind this one names.
#[must_use = "IDs reference remote resources and should not be ignored"]
pub struct Id<R: Resource> {
    value: String,
    _resource: PhantomData<fn() -> R>,
}

pub type SiteId = Id<SiteResource>;
pub type DeployId = Id<DeployResource>;

impl<R: Resource> Id<R> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _resource: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl<R: Resource> fmt::Debug for Id<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(R::NAME).field(&self.value).finish()
    }
}

impl<R: Resource> fmt::Display for Id<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<R: Resource> Clone for Id<R> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<R: Resource> PartialEq for Id<R> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<R: Resource> Eq for Id<R> {}

impl<R: Resource> PartialOrd for Id<R> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<R: Resource> Ord for Id<R> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl<R: Resource> Hash for Id<R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<R: Resource> AsRef<str> for Id<R> {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl<R: Resource> Serialize for Id<R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de, R: Resource> Deserialize<'de> for Id<R> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}
