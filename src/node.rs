use crate::{Point, Rectangle};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Group width bounds applied on resize
pub const GROUP_MIN_WIDTH: f64 = 120.0;
pub const GROUP_MAX_WIDTH: f64 = 3000.0;
pub const GROUP_MIN_HEIGHT: f64 = 60.0;
pub const GROUP_MAX_HEIGHT: f64 = 2000.0;

/// Note size bounds applied on resize
pub const NOTE_MIN_WIDTH: f64 = 100.0;
pub const NOTE_MAX_WIDTH: f64 = 800.0;
pub const NOTE_MIN_HEIGHT: f64 = 60.0;
pub const NOTE_MAX_HEIGHT: f64 = 600.0;

/// Generate a prefixed, sortable entity id (e.g. `node-01HV...`)
pub fn new_entity_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new().to_string().to_lowercase())
}

/// Capability category of a node
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Entry point of a flow
    Trigger,
    #[default]
    Process,
    Ai,
    Output,
}

impl NodeType {
    /// Triggers seed layer 0 of the auto-layout and execution playback
    pub fn is_entry_point(self) -> bool {
        matches!(self, NodeType::Trigger)
    }
}

/// Kind of resource a node may link to. Never resolved by the engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Transcript,
    Document,
    Note,
    Dataset,
    Form,
    Page,
}

/// Opaque resource reference carried by a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLink {
    pub resource_type: ResourceType,
    pub resource_id: Option<String>,
}

/// A freeform node on the canvas
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    /// Icon key, resolved by the renderer
    #[serde(default)]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_resource_type: Option<ResourceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_resource_id: Option<String>,
    /// Internal route opened through the injected navigator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_page: Option<String>,
}

impl GraphNode {
    /// Create a new node with a generated id
    pub fn new(node_type: NodeType, label: impl Into<String>, position: Point) -> Self {
        Self::with_id(new_entity_id("node"), node_type, label, position)
    }

    /// Create a new node with a specific id
    pub fn with_id(
        id: impl Into<String>,
        node_type: NodeType,
        label: impl Into<String>,
        position: Point,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: String::new(),
            icon: String::new(),
            logo_url: None,
            node_type,
            x: position.x,
            y: position.y,
            linked_resource_type: None,
            linked_resource_id: None,
            linked_page: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_position(&mut self, position: Point) {
        self.x = position.x;
        self.y = position.y;
    }

    /// Fixed-size box occupied by the node
    pub fn bounds(&self) -> Rectangle {
        Rectangle::node_box(self.position())
    }

    pub fn resource_link(&self) -> Option<ResourceLink> {
        self.linked_resource_type.map(|resource_type| ResourceLink {
            resource_type,
            resource_id: self.linked_resource_id.clone(),
        })
    }

    pub fn set_resource_link(&mut self, link: Option<ResourceLink>) {
        match link {
            Some(link) => {
                self.linked_resource_type = Some(link.resource_type);
                self.linked_resource_id = link.resource_id;
            }
            None => {
                self.linked_resource_type = None;
                self.linked_resource_id = None;
            }
        }
    }
}

/// Color tag of a phase group. Tags saved by newer palettes read as gray.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GroupColor {
    Blue,
    Green,
    #[default]
    Purple,
    Orange,
    Red,
    #[serde(other)]
    Gray,
}

impl GroupColor {
    /// Map a phase hex color to its tag; unknown colors fall back to purple
    pub fn from_hex(hex: &str) -> Self {
        match hex.to_ascii_lowercase().as_str() {
            "#3b82f6" => GroupColor::Blue,
            "#10b981" => GroupColor::Green,
            "#8b5cf6" => GroupColor::Purple,
            "#f59e0b" => GroupColor::Orange,
            "#ef4444" => GroupColor::Red,
            "#6b7280" => GroupColor::Gray,
            _ => GroupColor::Purple,
        }
    }
}

/// A visual phase region, independent of node membership
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub color: GroupColor,
}

impl Group {
    pub fn new(label: impl Into<String>, bounds: Rectangle, color: GroupColor) -> Self {
        Self::with_id(new_entity_id("group"), label, bounds, color)
    }

    pub fn with_id(
        id: impl Into<String>,
        label: impl Into<String>,
        bounds: Rectangle,
        color: GroupColor,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: None,
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            color,
        }
    }

    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(self.x, self.y, self.width, self.height)
    }

    pub fn set_position(&mut self, position: Point) {
        self.x = position.x;
        self.y = position.y;
    }

    /// Resize within the group bounds
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.clamp(GROUP_MIN_WIDTH, GROUP_MAX_WIDTH);
        self.height = height.clamp(GROUP_MIN_HEIGHT, GROUP_MAX_HEIGHT);
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NoteColor {
    #[default]
    Yellow,
    Blue,
    Green,
    Pink,
    Orange,
    Purple,
    Red,
    Gray,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    Normal,
    Italic,
}

/// Optional text formatting of a note
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NoteFormatting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<FontStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
}

/// A sticky note on the canvas
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub color: NoteColor,
    #[serde(flatten)]
    pub formatting: NoteFormatting,
}

impl Note {
    pub fn new(text: impl Into<String>, bounds: Rectangle, color: NoteColor) -> Self {
        Self::with_id(new_entity_id("sticky"), text, bounds, color)
    }

    pub fn with_id(
        id: impl Into<String>,
        text: impl Into<String>,
        bounds: Rectangle,
        color: NoteColor,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            color,
            formatting: NoteFormatting::default(),
        }
    }

    pub fn bounds(&self) -> Rectangle {
        Rectangle::new(self.x, self.y, self.width, self.height)
    }

    pub fn set_position(&mut self, position: Point) {
        self.x = position.x;
        self.y = position.y;
    }

    /// Resize within the note bounds
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.clamp(NOTE_MIN_WIDTH, NOTE_MAX_WIDTH);
        self.height = height.clamp(NOTE_MIN_HEIGHT, NOTE_MAX_HEIGHT);
    }
}
