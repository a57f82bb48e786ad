//! Tagged property values and the property bag every node carries.
//!
//! Values are tagged once, when a bag is built (from an element's defaults
//! or from a blob), so everything downstream matches over a closed set of
//! tags instead of sniffing runtime types.
//!
//! A string is tagged `Color` only under a color-bearing key (`color`,
//! `background`, `fill`, `stroke`, or any `…Color`). Everywhere else it is
//! text and is written back exactly as it was read, so `#2024` in a
//! headline stays `#2024`.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`. The leading `#` is
    /// required: bare hex strings are ordinary text in a property bag.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#')?;
        let bytes = hex.as_bytes();

        let short = |i: usize| hex_val(bytes[i]).map(|v| (v * 17) as f32 / 255.0);
        let long = |i: usize| -> Option<f32> {
            Some((hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?) as f32 / 255.0)
        };

        match bytes.len() {
            3 => Some(Self::rgba(short(0)?, short(1)?, short(2)?, 1.0)),
            4 => Some(Self::rgba(short(0)?, short(1)?, short(2)?, short(3)?)),
            6 => Some(Self::rgba(long(0)?, long(2)?, long(4)?, 1.0)),
            8 => Some(Self::rgba(long(0)?, long(2)?, long(4)?, long(6)?)),
            _ => None,
        }
    }

    /// Emit as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        let (r, g, b, a) = (
            channel(self.r),
            channel(self.g),
            channel(self.b),
            channel(self.a),
        );
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}

// ─── Geometry ────────────────────────────────────────────────────────────

/// Pixel size of a geometry-bearing element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

// ─── Values ──────────────────────────────────────────────────────────────

/// One property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Color(Color),
    List(Vec<PropValue>),
    Struct(PropertyBag),
    /// Declared but unset (a media element before upload).
    Null,
}

/// Whether strings stored under `key` are colors.
pub fn is_color_key(key: &str) -> bool {
    matches!(key, "color" | "background" | "fill" | "stroke") || key.ends_with("Color")
}

impl PropValue {
    /// Tag a JSON value with no key context. Strings stay text.
    pub fn from_json(value: &Value) -> Self {
        Self::from_json_as(value, false)
    }

    /// Tag the value stored under `key`. Lists under a color key hold
    /// colors too.
    pub fn from_json_keyed(key: &str, value: &Value) -> Self {
        Self::from_json_as(value, is_color_key(key))
    }

    fn from_json_as(value: &Value, color: bool) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => Self::Number(n.as_f64().unwrap_or_default()),
            Value::String(s) => match Color::from_hex(s).filter(|_| color) {
                Some(c) => Self::Color(c),
                None => Self::Text(s.clone()),
            },
            Value::Array(items) => {
                Self::List(items.iter().map(|v| Self::from_json_as(v, color)).collect())
            }
            Value::Object(map) => Self::Struct(PropertyBag::from_json_map(map)),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => number_to_json(*n),
            Self::Text(s) => Value::String(s.clone()),
            Self::Color(c) => Value::String(c.to_hex()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Struct(bag) => Value::Object(bag.to_json_map()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Integral numbers are written without a fractional part so blobs stay
/// close to what a browser would produce (`120`, not `120.0`).
fn number_to_json(n: f64) -> Value {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if n.fract() == 0.0 && n.abs() < MAX_EXACT {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<Color> for PropValue {
    fn from(c: Color) -> Self {
        Self::Color(c)
    }
}

impl From<f64> for PropValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Vec<PropValue>> for PropValue {
    fn from(items: Vec<PropValue>) -> Self {
        Self::List(items)
    }
}

impl From<PropertyBag> for PropValue {
    fn from(bag: PropertyBag) -> Self {
        Self::Struct(bag)
    }
}

// ─── Property bag ────────────────────────────────────────────────────────

/// Open, insertion-ordered mapping from property name to value.
///
/// Bags are small (a couple of dozen keys at most), so a vector with
/// linear lookup keeps declaration order for the property panel without
/// pulling in an ordered-map type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBag {
    entries: Vec<(String, PropValue)>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, used by the element catalog.
    pub fn with(mut self, key: &str, value: impl Into<PropValue>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut PropValue> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Insert or replace. Replacing keeps the key's original position.
    pub fn set(&mut self, key: &str, value: impl Into<PropValue>) {
        let value = value.into();
        match self.get_mut(key) {
            Some(slot) => *slot = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Numeric value of `key`, if present and numeric.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(PropValue::as_f64)
    }

    /// `Some` iff the bag carries numeric `width` and `height`.
    pub fn size(&self) -> Option<Size> {
        Some(Size::new(self.number("width")?, self.number("height")?))
    }

    /// Overlay every entry of `other` onto this bag.
    pub fn merge(&mut self, other: &PropertyBag) {
        for (k, v) in other.iter() {
            self.set(k, v.clone());
        }
    }

    pub fn from_json_map(map: &Map<String, Value>) -> Self {
        Self {
            entries: map
                .iter()
                .map(|(k, v)| (k.clone(), PropValue::from_json_keyed(k, v)))
                .collect(),
        }
    }

    pub fn to_json_map(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect()
    }
}

impl Serialize for PropertyBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Value::Object(self.to_json_map()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PropertyBag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Object(map) => Ok(Self::from_json_map(&map)),
            Value::Null => Ok(Self::new()),
            other => Err(<D::Error as DeError>::custom(format!(
                "expected property object, found {other}"
            ))),
        }
    }
}
