pub mod catalog;
pub mod id;
pub mod introspect;
pub mod page;
pub mod store;
pub mod tree;
pub mod value;

pub use catalog::{ElementSpec, ElementType, MediaKind, ResizeHandle, ResizeSpec, SettingsView};
pub use id::{NodeId, PageId};
pub use introspect::{FieldKind, GroupName, PropertyField, PropertyGroup, describe, geometry, group_fields};
pub use page::{Page, PageUpdate};
pub use store::DocumentStore;
pub use tree::{Node, NodeTree, Slot, TreeError, default_page_content};
pub use value::{Color, PropValue, PropertyBag, Size};
