//! Generic property introspection.
//!
//! Works against any element type using only the property bag: the value
//! tag decides the editing widget, and `width`/`height` decide geometry.
//! Per-type editing panels are opt-in through the catalog's settings view.

use crate::value::{PropValue, PropertyBag, Size};
use serde::Serialize;

/// The editing widget a property panel should use for a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldKind {
    Toggle,
    Numeric,
    List,
    Text,
    Color,
    Structured,
    /// Declared but unset; rendered as an empty text field.
    Empty,
}

impl FieldKind {
    pub fn of(value: &PropValue) -> Self {
        match value {
            PropValue::Bool(_) => Self::Toggle,
            PropValue::Number(_) => Self::Numeric,
            PropValue::List(_) => Self::List,
            PropValue::Text(_) => Self::Text,
            PropValue::Color(_) => Self::Color,
            PropValue::Struct(_) => Self::Structured,
            PropValue::Null => Self::Empty,
        }
    }
}

/// One editable property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyField {
    pub key: String,
    pub kind: FieldKind,
    pub value: PropValue,
}

/// Panel section a property is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GroupName {
    Basic,
    Style,
    Layout,
    Advanced,
}

impl GroupName {
    /// Section for a property name. Keyed on names only, never on the
    /// element type, so it applies to every element uniformly.
    pub fn for_key(key: &str) -> Self {
        match key {
            "text" | "src" | "alt" => Self::Basic,
            "color" | "backgroundColor" | "fontSize" | "borderRadius" => Self::Style,
            "width" | "height" | "margin" | "padding" => Self::Layout,
            _ => Self::Advanced,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Style => "Style",
            Self::Layout => "Layout",
            Self::Advanced => "Advanced",
        }
    }
}

/// A titled list of fields.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyGroup {
    pub name: GroupName,
    pub fields: Vec<PropertyField>,
}

/// Every property in the bag, in declaration order.
pub fn describe(bag: &PropertyBag) -> Vec<PropertyField> {
    bag.iter()
        .map(|(key, value)| PropertyField {
            key: key.to_string(),
            kind: FieldKind::of(value),
            value: value.clone(),
        })
        .collect()
}

/// Fields bucketed into panel sections. Empty sections are omitted, and
/// unset values are skipped everywhere except `Advanced`.
pub fn group_fields(bag: &PropertyBag) -> Vec<PropertyGroup> {
    let order = [
        GroupName::Basic,
        GroupName::Style,
        GroupName::Layout,
        GroupName::Advanced,
    ];
    let fields = describe(bag);

    order
        .into_iter()
        .filter_map(|name| {
            let members: Vec<PropertyField> = fields
                .iter()
                .filter(|f| GroupName::for_key(&f.key) == name)
                .filter(|f| name == GroupName::Advanced || f.kind != FieldKind::Empty)
                .cloned()
                .collect();
            (!members.is_empty()).then_some(PropertyGroup {
                name,
                fields: members,
            })
        })
        .collect()
}

/// Geometry of an element: `Some` iff numeric `width` and `height` exist.
pub fn geometry(bag: &PropertyBag) -> Option<Size> {
    bag.size()
}
