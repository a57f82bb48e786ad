use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for node IDs.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Identifier of a node in a page's element tree.
///
/// Interned: 4 bytes, `Copy`, O(1) `Eq`/`Hash`. Node ids come from the
/// blob (`"ROOT"`, `"node-3"`, ...) and are compared constantly by the
/// selection tracker and gesture controller, so interning keeps those
/// checks cheap.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(Spur);

impl NodeId {
    /// Key of the root container in every serialized tree.
    pub const ROOT_KEY: &'static str = "ROOT";

    /// Intern a string as a NodeId, or return the existing one.
    pub fn intern(s: &str) -> Self {
        NodeId(INTERNER.get_or_intern(s))
    }

    /// The root container's id.
    pub fn root() -> Self {
        Self::intern(Self::ROOT_KEY)
    }

    pub fn is_root(&self) -> bool {
        self.as_str() == Self::ROOT_KEY
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Generate a unique id with a prefix (e.g. `node_4`, `button_7`).
    pub fn with_prefix(prefix: &str) -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        loop {
            let n = COUNTER.fetch_add(1, Ordering::Relaxed);
            let candidate = format!("{prefix}_{n}");
            // Ids loaded from blobs may already occupy a generated name.
            if INTERNER.get(&candidate).is_none() {
                return Self::intern(&candidate);
            }
        }
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(NodeId::intern(&s))
    }
}

/// Identifier of a page in the document store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh, globally unique page id (`page-<uuid>`).
    pub fn fresh() -> Self {
        Self(format!("page-{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = NodeId::intern("hero_button");
        let b = NodeId::intern("hero_button");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "hero_button");
    }

    #[test]
    fn prefixed_ids_are_unique() {
        let a = NodeId::with_prefix("node");
        let b = NodeId::with_prefix("node");
        assert_ne!(a, b);
    }

    #[test]
    fn prefixed_ids_skip_names_already_interned() {
        let taken = NodeId::intern("skiptest_0");
        let generated = NodeId::with_prefix("skiptest");
        assert_ne!(taken, generated);
    }

    #[test]
    fn root_is_recognized() {
        assert!(NodeId::root().is_root());
        assert!(!NodeId::intern("child").is_root());
    }

    #[test]
    fn fresh_page_ids_differ() {
        let a = PageId::fresh();
        let b = PageId::fresh();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("page-"));
    }
}
