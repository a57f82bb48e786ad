//! Element catalog: the static declaration of every element type.
//!
//! Each type declares its display name, default property bag, resize
//! handles with their size floors, an optional settings view, and the
//! media family it accepts for uploads. Declarations never change at
//! runtime.

use crate::value::PropertyBag;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

/// Every element type the editor can place on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    Container,
    Text,
    Button,
    CodeBlock,
    Image,
    Video,
    Audio,
    Iframe,
    Chart,
    Document,
    ProductSelection,
    CourseTimeline,
    QuizBuilder,
    Shape,
}

/// A resize handle on the element's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    N,
    S,
    E,
    W,
    Ne,
    Nw,
    Se,
    Sw,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        Self::N,
        Self::S,
        Self::E,
        Self::W,
        Self::Ne,
        Self::Nw,
        Self::Se,
        Self::Sw,
    ];

    pub fn has_north(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    pub fn has_south(self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }

    pub fn has_east(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    pub fn has_west(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }

    /// Parse compass (`"se"`) or edge-name (`"bottom-right"`) spellings.
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.trim().to_ascii_lowercase().as_str() {
            "n" | "top" => Self::N,
            "s" | "bottom" => Self::S,
            "e" | "right" => Self::E,
            "w" | "left" => Self::W,
            "ne" | "top-right" => Self::Ne,
            "nw" | "top-left" => Self::Nw,
            "se" | "bottom-right" => Self::Se,
            "sw" | "bottom-left" => Self::Sw,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::N => "n",
            Self::S => "s",
            Self::E => "e",
            Self::W => "w",
            Self::Ne => "ne",
            Self::Nw => "nw",
            Self::Se => "se",
            Self::Sw => "sw",
        }
    }
}

impl fmt::Display for ResizeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which handles an element exposes and how small it may get.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeSpec {
    pub handles: &'static [ResizeHandle],
    pub min_width: f64,
    pub min_height: f64,
}

impl ResizeSpec {
    pub fn allows(&self, handle: ResizeHandle) -> bool {
        self.handles.contains(&handle)
    }
}

/// Right edge, bottom edge, and the corner between them.
const EDGE_HANDLES: &[ResizeHandle] = &[ResizeHandle::E, ResizeHandle::S, ResizeHandle::Se];
const ALL_HANDLES: &[ResizeHandle] = &ResizeHandle::ALL;
const CORNER_HANDLES: &[ResizeHandle] = &[
    ResizeHandle::Nw,
    ResizeHandle::Ne,
    ResizeHandle::Sw,
    ResizeHandle::Se,
];

/// Media family an element accepts from file uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    /// Any file; the element records its name and MIME type.
    AnyFile,
}

impl MediaKind {
    pub fn accepts(self, mime: &str) -> bool {
        match self {
            Self::Image => mime.starts_with("image/"),
            Self::Video => mime.starts_with("video/"),
            Self::Audio => mime.starts_with("audio/"),
            Self::AnyFile => true,
        }
    }
}

/// Opt-in per-type editing panel. Only the name is part of the core; the
/// panel itself belongs to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsView {
    pub name: &'static str,
}

/// The static declaration of one element type.
#[derive(Debug, Clone)]
pub struct ElementSpec {
    pub element_type: ElementType,
    pub display_name: &'static str,
    pub default_props: PropertyBag,
    pub resize: Option<ResizeSpec>,
    pub settings_view: Option<SettingsView>,
    pub accepts_media: Option<MediaKind>,
}

impl ElementType {
    pub const ALL: [ElementType; 14] = [
        Self::Container,
        Self::Text,
        Self::Button,
        Self::CodeBlock,
        Self::Image,
        Self::Video,
        Self::Audio,
        Self::Iframe,
        Self::Chart,
        Self::Document,
        Self::ProductSelection,
        Self::CourseTimeline,
        Self::QuizBuilder,
        Self::Shape,
    ];

    /// The name stored in blobs under `type.resolvedName`.
    pub fn resolved_name(self) -> &'static str {
        match self {
            Self::Container => "Container",
            Self::Text => "Text",
            Self::Button => "Button",
            Self::CodeBlock => "CodeBlock",
            Self::Image => "Image",
            Self::Video => "Video",
            Self::Audio => "Audio",
            Self::Iframe => "Iframe",
            Self::Chart => "Chart",
            Self::Document => "Document",
            Self::ProductSelection => "ProductSelection",
            Self::CourseTimeline => "CourseTimeline",
            Self::QuizBuilder => "QuizBuilder",
            Self::Shape => "Shape",
        }
    }

    pub fn from_resolved_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.resolved_name() == name)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::CodeBlock => "Code Block",
            Self::ProductSelection => "Product Selection",
            Self::CourseTimeline => "Course Timeline",
            Self::QuizBuilder => "Quiz Builder",
            other => other.resolved_name(),
        }
    }

    /// Handles and size floors for direct-manipulation resizing.
    pub fn resize_spec(self) -> ResizeSpec {
        let (handles, min_width, min_height) = match self {
            Self::Container => (CORNER_HANDLES, 50.0, 50.0),
            Self::Shape => (ALL_HANDLES, 20.0, 20.0),
            Self::Text => (EDGE_HANDLES, 50.0, 20.0),
            Self::Button => (EDGE_HANDLES, 50.0, 30.0),
            Self::CodeBlock => (EDGE_HANDLES, 200.0, 100.0),
            Self::Image => (EDGE_HANDLES, 50.0, 50.0),
            Self::Video => (EDGE_HANDLES, 200.0, 100.0),
            Self::Audio => (EDGE_HANDLES, 200.0, 60.0),
            Self::Iframe | Self::Chart | Self::Document => (EDGE_HANDLES, 300.0, 200.0),
            Self::ProductSelection => (EDGE_HANDLES, 400.0, 300.0),
            Self::CourseTimeline => (EDGE_HANDLES, 400.0, 400.0),
            Self::QuizBuilder => (EDGE_HANDLES, 500.0, 400.0),
        };
        ResizeSpec {
            handles,
            min_width,
            min_height,
        }
    }

    pub fn accepts_media(self) -> Option<MediaKind> {
        match self {
            Self::Image => Some(MediaKind::Image),
            Self::Video => Some(MediaKind::Video),
            Self::Audio => Some(MediaKind::Audio),
            Self::Document => Some(MediaKind::AnyFile),
            _ => None,
        }
    }

    pub fn settings_view(self) -> Option<SettingsView> {
        let name = match self {
            Self::Container => "ContainerSettings",
            Self::Text => "TextSettings",
            Self::Button => "ButtonSettings",
            Self::CodeBlock => "CodeBlockSettings",
            Self::Image => "ImageSettings",
            Self::Video => "VideoSettings",
            Self::Audio => "AudioSettings",
            Self::Iframe => "IframeSettings",
            Self::Chart => "ChartSettings",
            Self::Document => "DocumentSettings",
            Self::ProductSelection => "ProductSelectionSettings",
            Self::CourseTimeline => "CourseTimelineSettings",
            Self::QuizBuilder => "QuizBuilderSettings",
            Self::Shape => "ShapeSettings",
        };
        Some(SettingsView { name })
    }

    /// A fresh copy of the type's default property bag.
    pub fn default_props(self) -> PropertyBag {
        let value = match self {
            Self::Container => json!({
                "background": "#ffffff", "backgroundImage": null,
                "padding": [20, 20, 20, 20], "margin": [0, 0, 0, 0],
                "borderRadius": 8, "minHeight": 100, "width": 300, "height": 200,
                "x": 0, "y": 0, "rotation": 0, "opacity": 1, "visible": true,
                "boxShadow": null, "flexDirection": "column",
                "alignItems": "flex-start", "justifyContent": "flex-start",
                "gap": 0, "display": "flex", "textAlign": "left"
            }),
            Self::Text => json!({
                "text": "Click to edit text", "fontFamily": "Arial", "fontSize": 16,
                "textAlign": "left", "color": "#333333", "fontWeight": "normal",
                "fontStyle": "normal", "textDecoration": "none",
                "backgroundColor": "transparent", "lineHeight": 1.2,
                "letterSpacing": 0, "paragraphSpacing": 0,
                "margin": [0, 0, 0, 0], "width": 200, "height": 50
            }),
            Self::Button => json!({
                "text": "Click me", "backgroundColor": "#3B82F6", "color": "#ffffff",
                "padding": [12, 24, 12, 24], "borderRadius": 8,
                "margin": [0, 0, 0, 0], "size": "md", "width": 120, "height": 40
            }),
            Self::CodeBlock => json!({
                "code": "console.log(\"Hello, World!\");", "language": "javascript",
                "showLineNumbers": true, "margin": [16, 0, 16, 0],
                "width": 400, "height": 200
            }),
            Self::Image => json!({
                "src": null, "alt": "Image", "width": 300, "height": 200,
                "borderRadius": 8, "margin": [0, 0, 0, 0],
                "objectFit": "cover", "opacity": 1
            }),
            Self::Video => json!({
                "src": null, "width": 400, "height": 225, "borderRadius": 8,
                "margin": [0, 0, 0, 0], "autoplay": false, "loop": false,
                "muted": true, "controls": true, "poster": null
            }),
            Self::Audio => json!({
                "src": null, "width": 350, "height": 80, "borderRadius": 8,
                "margin": [0, 0, 0, 0], "autoplay": false, "loop": false,
                "muted": false, "controls": true, "title": "Audio Track",
                "backgroundColor": "#1f2937"
            }),
            Self::Iframe => json!({
                "src": null, "title": "Embedded Content", "width": 600, "height": 400,
                "borderRadius": 8, "margin": [0, 0, 0, 0], "allowFullscreen": true,
                "sandbox": "allow-scripts allow-same-origin allow-forms",
                "loading": "lazy"
            }),
            Self::Chart => json!({
                "type": "bar",
                "data": [
                    { "label": "Jan", "value": 65, "value2": 45 },
                    { "label": "Feb", "value": 59, "value2": 55 },
                    { "label": "Mar", "value": 80, "value2": 65 }
                ],
                "title": "Sample Chart", "width": 500, "height": 300,
                "borderRadius": 12, "margin": [0, 0, 0, 0],
                "backgroundColor": "#ffffff", "primaryColor": "#3b82f6",
                "secondaryColor": "#10b981", "showLegend": true,
                "showGrid": true, "animated": true
            }),
            Self::Document => json!({
                "src": null, "fileName": null, "fileType": null,
                "width": 600, "height": 400, "borderRadius": 8,
                "margin": [0, 0, 0, 0], "showToolbar": true, "allowDownload": true
            }),
            Self::ProductSelection => json!({
                "selectedProductId": null, "layout": "grid", "showPricing": true,
                "showFeatures": true, "width": 800, "height": 600,
                "margin": [0, 0, 0, 0], "borderRadius": 12
            }),
            Self::CourseTimeline => json!({
                "sections": [
                    {
                        "id": "1", "title": "Course Introduction",
                        "duration": "15 min", "status": "completed",
                        "lessons": 3, "progress": 100
                    },
                    {
                        "id": "2", "title": "Fundamentals",
                        "duration": "2 hours", "status": "current",
                        "lessons": 8, "progress": 40
                    }
                ],
                "showProgress": true, "showDuration": true, "showLessons": true,
                "width": 600, "height": 700, "margin": [0, 0, 0, 0],
                "borderRadius": 12, "accentColor": "#3b82f6"
            }),
            Self::QuizBuilder => json!({
                "questions": [
                    {
                        "id": "1", "type": "true-false",
                        "question": "Every page keeps its own element tree.",
                        "options": [
                            { "id": "true", "text": "True", "isCorrect": true },
                            { "id": "false", "text": "False", "isCorrect": false }
                        ],
                        "points": 5
                    }
                ],
                "title": "Course Quiz",
                "description": "Test your knowledge with this interactive quiz",
                "timeLimit": 30, "passingScore": 70, "showResults": true,
                "allowRetake": true, "width": 700, "height": 600,
                "margin": [0, 0, 0, 0], "borderRadius": 12
            }),
            Self::Shape => json!({
                "type": "circle", "width": 100, "height": 100,
                "backgroundColor": "#3B82F6", "borderRadius": 0,
                "margin": [0, 0, 0, 0]
            }),
        };
        match value {
            Value::Object(map) => PropertyBag::from_json_map(&map),
            _ => PropertyBag::new(),
        }
    }

    /// The full static declaration.
    pub fn spec(self) -> ElementSpec {
        ElementSpec {
            element_type: self,
            display_name: self.display_name(),
            default_props: self.default_props(),
            resize: Some(self.resize_spec()),
            settings_view: self.settings_view(),
            accepts_media: self.accepts_media(),
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resolved_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_type_is_geometry_bearing() {
        for ty in ElementType::ALL {
            let props = ty.default_props();
            assert!(props.size().is_some(), "{ty} has no numeric width/height");
        }
    }

    #[test]
    fn defaults_respect_resize_floors() {
        for ty in ElementType::ALL {
            let spec = ty.resize_spec();
            let size = ty.default_props().size().unwrap();
            assert!(spec.min_width > 0.0 && spec.min_height > 0.0);
            assert!(size.width >= spec.min_width, "{ty} default width below floor");
            assert!(size.height >= spec.min_height, "{ty} default height below floor");
        }
    }

    #[test]
    fn resolved_names_roundtrip() {
        for ty in ElementType::ALL {
            assert_eq!(ElementType::from_resolved_name(ty.resolved_name()), Some(ty));
        }
        assert_eq!(ElementType::from_resolved_name("Marquee"), None);
    }

    #[test]
    fn handle_sets_follow_element_type() {
        assert!(ElementType::Shape.resize_spec().allows(ResizeHandle::Nw));
        assert!(ElementType::Container.resize_spec().allows(ResizeHandle::Sw));
        assert!(!ElementType::Container.resize_spec().allows(ResizeHandle::N));
        assert!(ElementType::Button.resize_spec().allows(ResizeHandle::Se));
        assert!(!ElementType::Button.resize_spec().allows(ResizeHandle::W));
    }

    #[test]
    fn handle_parsing_accepts_both_spellings() {
        assert_eq!(ResizeHandle::parse("bottom-right"), Some(ResizeHandle::Se));
        assert_eq!(ResizeHandle::parse("se"), Some(ResizeHandle::Se));
        assert_eq!(ResizeHandle::parse("top-left"), Some(ResizeHandle::Nw));
        assert_eq!(ResizeHandle::parse("middle"), None);
    }

    #[test]
    fn handle_axes() {
        assert!(ResizeHandle::Se.has_east() && ResizeHandle::Se.has_south());
        assert!(ResizeHandle::Nw.has_west() && ResizeHandle::Nw.has_north());
        assert!(!ResizeHandle::E.has_south());
    }

    #[test]
    fn media_families() {
        assert!(MediaKind::Image.accepts("image/png"));
        assert!(!MediaKind::Image.accepts("video/mp4"));
        assert!(MediaKind::AnyFile.accepts("application/pdf"));
    }

    #[test]
    fn display_names() {
        assert_eq!(ElementType::CodeBlock.spec().display_name, "Code Block");
        assert_eq!(ElementType::Button.spec().display_name, "Button");
    }
}
