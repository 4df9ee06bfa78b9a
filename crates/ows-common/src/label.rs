//! Label object model.
//!
//! A `Label` describes how feature text is rendered: font, size, placement,
//! colors, attribute bindings and an ordered list of styles drawn with the
//! text. Fields are public and typed; scripting front-ends that address
//! properties by name go through [`LabelProperty`] and [`PropertyValue`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::{Color, LabelStyle, OwsError, OwsResult};

/// Highest label priority accepted.
pub const MAX_LABEL_PRIORITY: i64 = 10;

/// Font rendering kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelKind {
    #[default]
    TrueType,
    Bitmap,
}

impl LabelKind {
    fn code(self) -> i64 {
        match self {
            LabelKind::TrueType => 0,
            LabelKind::Bitmap => 1,
        }
    }

    fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(LabelKind::TrueType),
            1 => Some(LabelKind::Bitmap),
            _ => None,
        }
    }
}

/// Label placement relative to the anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Ul,
    Lr,
    Ur,
    Ll,
    Cr,
    Cl,
    Uc,
    Lc,
    #[default]
    Cc,
    Auto,
}

impl Position {
    const ALL: [Position; 10] = [
        Position::Ul,
        Position::Lr,
        Position::Ur,
        Position::Ll,
        Position::Cr,
        Position::Cl,
        Position::Uc,
        Position::Lc,
        Position::Cc,
        Position::Auto,
    ];

    /// Numeric code used by mapfiles and scripting bindings (UL = 101).
    pub fn code(self) -> i64 {
        101 + Self::ALL.iter().position(|p| *p == self).unwrap_or(0) as i64
    }

    pub fn from_code(code: i64) -> Option<Self> {
        usize::try_from(code - 101)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }
}

/// Horizontal alignment of multi-line labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    fn code(self) -> i64 {
        match self {
            Align::Left => 0,
            Align::Center => 1,
            Align::Right => 2,
        }
    }

    fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Align::Left),
            1 => Some(Align::Center),
            2 => Some(Align::Right),
            _ => None,
        }
    }
}

/// Leader line drawn from a displaced label back to its feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelLeader {
    pub max_distance: i64,
    pub grid_step: i64,
    #[serde(default)]
    pub styles: Vec<LabelStyle>,
}

impl Default for LabelLeader {
    fn default() -> Self {
        Self {
            max_distance: 0,
            grid_step: 5,
            styles: Vec::new(),
        }
    }
}

/// Label properties that can be bound to a feature attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelBinding {
    Size,
    Angle,
    Color,
    OutlineColor,
    Font,
    Priority,
    Position,
    ShadowSizeX,
    ShadowSizeY,
    OffsetX,
    OffsetY,
}

impl LabelBinding {
    const ALL: [LabelBinding; 11] = [
        LabelBinding::Size,
        LabelBinding::Angle,
        LabelBinding::Color,
        LabelBinding::OutlineColor,
        LabelBinding::Font,
        LabelBinding::Priority,
        LabelBinding::Position,
        LabelBinding::ShadowSizeX,
        LabelBinding::ShadowSizeY,
        LabelBinding::OffsetX,
        LabelBinding::OffsetY,
    ];

    /// Resolve a numeric binding id as used by scripting front-ends.
    pub fn from_id(id: i64) -> OwsResult<Self> {
        usize::try_from(id)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or_else(|| OwsError::Config("Invalid binding id.".to_string()))
    }

    pub fn id(self) -> i64 {
        Self::ALL.iter().position(|b| *b == self).unwrap_or(0) as i64
    }
}

/// Every property addressable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelProperty {
    Font,
    Encoding,
    Type,
    ShadowSizeX,
    ShadowSizeY,
    Size,
    MinSize,
    MaxSize,
    MinScaleDenom,
    MaxScaleDenom,
    Position,
    OffsetX,
    OffsetY,
    Angle,
    AngleMode,
    Buffer,
    Antialias,
    Wrap,
    MinFeatureSize,
    AutoMinFeatureSize,
    RepeatDistance,
    NumStyles,
    MinDistance,
    Partials,
    Force,
    OutlineWidth,
    Align,
    MaxLength,
    MinLength,
    MaxOverlapAngle,
    Priority,
    Color,
    OutlineColor,
    ShadowColor,
    Leader,
}

impl LabelProperty {
    /// Scripting name of the property.
    pub fn name(self) -> &'static str {
        match self {
            LabelProperty::Font => "font",
            LabelProperty::Encoding => "encoding",
            LabelProperty::Type => "type",
            LabelProperty::ShadowSizeX => "shadowsizex",
            LabelProperty::ShadowSizeY => "shadowsizey",
            LabelProperty::Size => "size",
            LabelProperty::MinSize => "minsize",
            LabelProperty::MaxSize => "maxsize",
            LabelProperty::MinScaleDenom => "minscaledenom",
            LabelProperty::MaxScaleDenom => "maxscaledenom",
            LabelProperty::Position => "position",
            LabelProperty::OffsetX => "offsetx",
            LabelProperty::OffsetY => "offsety",
            LabelProperty::Angle => "angle",
            LabelProperty::AngleMode => "anglemode",
            LabelProperty::Buffer => "buffer",
            LabelProperty::Antialias => "antialias",
            LabelProperty::Wrap => "wrap",
            LabelProperty::MinFeatureSize => "minfeaturesize",
            LabelProperty::AutoMinFeatureSize => "autominfeaturesize",
            LabelProperty::RepeatDistance => "repeatdistance",
            LabelProperty::NumStyles => "numstyles",
            LabelProperty::MinDistance => "mindistance",
            LabelProperty::Partials => "partials",
            LabelProperty::Force => "force",
            LabelProperty::OutlineWidth => "outlinewidth",
            LabelProperty::Align => "align",
            LabelProperty::MaxLength => "maxlength",
            LabelProperty::MinLength => "minlength",
            LabelProperty::MaxOverlapAngle => "maxoverlapangle",
            LabelProperty::Priority => "priority",
            LabelProperty::Color => "color",
            LabelProperty::OutlineColor => "outlinecolor",
            LabelProperty::ShadowColor => "shadowcolor",
            LabelProperty::Leader => "leader",
        }
    }

    /// Object-valued properties are modified through their own accessors.
    pub fn is_object(self) -> bool {
        matches!(
            self,
            LabelProperty::Color
                | LabelProperty::OutlineColor
                | LabelProperty::ShadowColor
                | LabelProperty::Leader
        )
    }

    pub fn is_read_only(self) -> bool {
        self == LabelProperty::NumStyles
    }
}

impl fmt::Display for LabelProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LabelProperty {
    type Err = OwsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let property = match s.to_ascii_lowercase().as_str() {
            "font" => LabelProperty::Font,
            "encoding" => LabelProperty::Encoding,
            "type" => LabelProperty::Type,
            "shadowsizex" => LabelProperty::ShadowSizeX,
            "shadowsizey" => LabelProperty::ShadowSizeY,
            "size" => LabelProperty::Size,
            "minsize" => LabelProperty::MinSize,
            "maxsize" => LabelProperty::MaxSize,
            "minscaledenom" => LabelProperty::MinScaleDenom,
            "maxscaledenom" => LabelProperty::MaxScaleDenom,
            "position" => LabelProperty::Position,
            "offsetx" => LabelProperty::OffsetX,
            "offsety" => LabelProperty::OffsetY,
            "angle" => LabelProperty::Angle,
            "anglemode" => LabelProperty::AngleMode,
            "buffer" => LabelProperty::Buffer,
            "antialias" => LabelProperty::Antialias,
            "wrap" => LabelProperty::Wrap,
            "minfeaturesize" => LabelProperty::MinFeatureSize,
            "autominfeaturesize" => LabelProperty::AutoMinFeatureSize,
            "repeatdistance" => LabelProperty::RepeatDistance,
            "numstyles" => LabelProperty::NumStyles,
            "mindistance" => LabelProperty::MinDistance,
            "partials" => LabelProperty::Partials,
            "force" => LabelProperty::Force,
            "outlinewidth" => LabelProperty::OutlineWidth,
            "align" => LabelProperty::Align,
            "maxlength" => LabelProperty::MaxLength,
            "minlength" => LabelProperty::MinLength,
            "maxoverlapangle" => LabelProperty::MaxOverlapAngle,
            "priority" => LabelProperty::Priority,
            "color" => LabelProperty::Color,
            "outlinecolor" => LabelProperty::OutlineColor,
            "shadowcolor" => LabelProperty::ShadowColor,
            "leader" => LabelProperty::Leader,
            _ => {
                return Err(OwsError::Config(format!(
                    "Property '{}' does not exist in this object.",
                    s
                )))
            }
        };
        Ok(property)
    }
}

/// A property value as exchanged with scripting front-ends.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Str(Option<String>),
    Long(i64),
    Double(f64),
    Color(Option<Color>),
    Leader(LabelLeader),
}

impl PropertyValue {
    fn as_long(&self, property: LabelProperty) -> OwsResult<i64> {
        match self {
            PropertyValue::Long(v) => Ok(*v),
            PropertyValue::Double(v) => Ok(*v as i64),
            _ => Err(invalid_value(property)),
        }
    }

    fn as_double(&self, property: LabelProperty) -> OwsResult<f64> {
        match self {
            PropertyValue::Long(v) => Ok(*v as f64),
            PropertyValue::Double(v) => Ok(*v),
            _ => Err(invalid_value(property)),
        }
    }

    fn into_string(self, property: LabelProperty) -> OwsResult<Option<String>> {
        match self {
            PropertyValue::Str(v) => Ok(v),
            _ => Err(invalid_value(property)),
        }
    }
}

fn invalid_value(property: LabelProperty) -> OwsError {
    OwsError::Config(format!("Invalid value for property '{}'.", property))
}

fn invalid_style_index() -> OwsError {
    OwsError::Config("Invalid style index.".to_string())
}

/// Text label rendering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Label {
    pub font: Option<String>,
    pub encoding: Option<String>,
    #[serde(rename = "type")]
    pub kind: LabelKind,
    pub shadow_size_x: i64,
    pub shadow_size_y: i64,
    pub size: f64,
    pub min_size: f64,
    pub max_size: f64,
    pub min_scale_denom: f64,
    pub max_scale_denom: f64,
    pub position: Position,
    pub offset_x: i64,
    pub offset_y: i64,
    pub angle: f64,
    pub angle_mode: i64,
    pub buffer: i64,
    pub antialias: bool,
    pub wrap: Option<char>,
    pub min_feature_size: i64,
    pub auto_min_feature_size: bool,
    pub repeat_distance: i64,
    pub min_distance: i64,
    pub partials: bool,
    pub force: bool,
    pub outline_width: i64,
    pub align: Align,
    pub max_length: i64,
    pub min_length: i64,
    pub max_overlap_angle: f64,
    pub priority: i64,
    pub color: Option<Color>,
    pub outline_color: Option<Color>,
    pub shadow_color: Option<Color>,
    pub leader: LabelLeader,
    bindings: BTreeMap<LabelBinding, String>,
    styles: Vec<LabelStyle>,
}

impl Default for Label {
    fn default() -> Self {
        Self {
            font: None,
            encoding: None,
            kind: LabelKind::TrueType,
            shadow_size_x: 1,
            shadow_size_y: 1,
            size: 10.0,
            min_size: 4.0,
            max_size: 256.0,
            min_scale_denom: -1.0,
            max_scale_denom: -1.0,
            position: Position::Cc,
            offset_x: 0,
            offset_y: 0,
            angle: 0.0,
            angle_mode: 0,
            buffer: 0,
            antialias: false,
            wrap: None,
            min_feature_size: -1,
            auto_min_feature_size: false,
            repeat_distance: 0,
            min_distance: -1,
            partials: true,
            force: false,
            outline_width: 1,
            align: Align::Left,
            max_length: 0,
            min_length: 0,
            max_overlap_angle: 22.5,
            priority: 1,
            color: Some(Color::black()),
            outline_color: None,
            shadow_color: None,
            leader: LabelLeader::default(),
            bindings: BTreeMap::new(),
            styles: Vec::new(),
        }
    }
}

impl Label {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Named property access
    // ------------------------------------------------------------------

    /// Read a property by its scripting name.
    pub fn get_by_name(&self, name: &str) -> OwsResult<PropertyValue> {
        Ok(self.get(name.parse()?))
    }

    /// Write a property by its scripting name.
    pub fn set_by_name(&mut self, name: &str, value: PropertyValue) -> OwsResult<()> {
        self.set(name.parse()?, value)
    }

    pub fn get(&self, property: LabelProperty) -> PropertyValue {
        use PropertyValue::{Double, Long, Str};

        match property {
            LabelProperty::Font => Str(self.font.clone()),
            LabelProperty::Encoding => Str(self.encoding.clone()),
            LabelProperty::Type => Long(self.kind.code()),
            LabelProperty::ShadowSizeX => Long(self.shadow_size_x),
            LabelProperty::ShadowSizeY => Long(self.shadow_size_y),
            LabelProperty::Size => Double(self.size),
            LabelProperty::MinSize => Double(self.min_size),
            LabelProperty::MaxSize => Double(self.max_size),
            LabelProperty::MinScaleDenom => Double(self.min_scale_denom),
            LabelProperty::MaxScaleDenom => Double(self.max_scale_denom),
            LabelProperty::Position => Long(self.position.code()),
            LabelProperty::OffsetX => Long(self.offset_x),
            LabelProperty::OffsetY => Long(self.offset_y),
            LabelProperty::Angle => Double(self.angle),
            LabelProperty::AngleMode => Long(self.angle_mode),
            LabelProperty::Buffer => Long(self.buffer),
            LabelProperty::Antialias => Long(self.antialias as i64),
            LabelProperty::Wrap => Long(self.wrap.map(|c| c as i64).unwrap_or(0)),
            LabelProperty::MinFeatureSize => Long(self.min_feature_size),
            LabelProperty::AutoMinFeatureSize => Long(self.auto_min_feature_size as i64),
            LabelProperty::RepeatDistance => Long(self.repeat_distance),
            LabelProperty::NumStyles => Long(self.styles.len() as i64),
            LabelProperty::MinDistance => Long(self.min_distance),
            LabelProperty::Partials => Long(self.partials as i64),
            LabelProperty::Force => Long(self.force as i64),
            LabelProperty::OutlineWidth => Long(self.outline_width),
            LabelProperty::Align => Long(self.align.code()),
            LabelProperty::MaxLength => Long(self.max_length),
            LabelProperty::MinLength => Long(self.min_length),
            LabelProperty::MaxOverlapAngle => Double(self.max_overlap_angle),
            LabelProperty::Priority => Long(self.priority),
            LabelProperty::Color => PropertyValue::Color(self.color),
            LabelProperty::OutlineColor => PropertyValue::Color(self.outline_color),
            LabelProperty::ShadowColor => PropertyValue::Color(self.shadow_color),
            LabelProperty::Leader => PropertyValue::Leader(self.leader.clone()),
        }
    }

    /// Write a scalar property.
    ///
    /// Object-valued properties and `numstyles` are rejected.
    pub fn set(&mut self, property: LabelProperty, value: PropertyValue) -> OwsResult<()> {
        if property.is_object() {
            return Err(OwsError::Config(format!(
                "Property '{}' is an object and can only be modified through its accessors.",
                property
            )));
        }
        if property.is_read_only() {
            return Err(OwsError::Config(format!(
                "Property '{}' is read-only and cannot be set.",
                property
            )));
        }

        match property {
            LabelProperty::Font => self.font = value.into_string(property)?,
            LabelProperty::Encoding => self.encoding = value.into_string(property)?,
            LabelProperty::Type => {
                self.kind = LabelKind::from_code(value.as_long(property)?)
                    .ok_or_else(|| invalid_value(property))?
            }
            LabelProperty::ShadowSizeX => self.shadow_size_x = value.as_long(property)?,
            LabelProperty::ShadowSizeY => self.shadow_size_y = value.as_long(property)?,
            LabelProperty::Size => self.size = value.as_double(property)?,
            LabelProperty::MinSize => self.min_size = value.as_double(property)?,
            LabelProperty::MaxSize => self.max_size = value.as_double(property)?,
            LabelProperty::MinScaleDenom => self.min_scale_denom = value.as_double(property)?,
            LabelProperty::MaxScaleDenom => self.max_scale_denom = value.as_double(property)?,
            LabelProperty::Position => {
                self.position = Position::from_code(value.as_long(property)?)
                    .ok_or_else(|| invalid_value(property))?
            }
            LabelProperty::OffsetX => self.offset_x = value.as_long(property)?,
            LabelProperty::OffsetY => self.offset_y = value.as_long(property)?,
            LabelProperty::Angle => self.angle = value.as_double(property)?,
            LabelProperty::AngleMode => self.angle_mode = value.as_long(property)?,
            LabelProperty::Buffer => self.buffer = value.as_long(property)?,
            LabelProperty::Antialias => self.antialias = value.as_long(property)? != 0,
            LabelProperty::Wrap => {
                self.wrap = match value {
                    PropertyValue::Str(Some(s)) => s.chars().next(),
                    PropertyValue::Str(None) => None,
                    other => {
                        let code = other.as_long(property)?;
                        if code == 0 {
                            None
                        } else {
                            let byte = u8::try_from(code).map_err(|_| invalid_value(property))?;
                            Some(byte as char)
                        }
                    }
                }
            }
            LabelProperty::MinFeatureSize => self.min_feature_size = value.as_long(property)?,
            LabelProperty::AutoMinFeatureSize => {
                self.auto_min_feature_size = value.as_long(property)? != 0
            }
            LabelProperty::RepeatDistance => self.repeat_distance = value.as_long(property)?,
            LabelProperty::MinDistance => self.min_distance = value.as_long(property)?,
            LabelProperty::Partials => self.partials = value.as_long(property)? != 0,
            LabelProperty::Force => self.force = value.as_long(property)? != 0,
            LabelProperty::OutlineWidth => self.outline_width = value.as_long(property)?,
            LabelProperty::Align => {
                self.align = Align::from_code(value.as_long(property)?)
                    .ok_or_else(|| invalid_value(property))?
            }
            LabelProperty::MaxLength => self.max_length = value.as_long(property)?,
            LabelProperty::MinLength => self.min_length = value.as_long(property)?,
            LabelProperty::MaxOverlapAngle => {
                self.max_overlap_angle = value.as_double(property)?
            }
            LabelProperty::Priority => {
                let priority = value.as_long(property)?;
                if !(1..=MAX_LABEL_PRIORITY).contains(&priority) {
                    return Err(OwsError::Config(format!(
                        "Label priority must be between 1 and {}.",
                        MAX_LABEL_PRIORITY
                    )));
                }
                self.priority = priority;
            }
            LabelProperty::NumStyles
            | LabelProperty::Color
            | LabelProperty::OutlineColor
            | LabelProperty::ShadowColor
            | LabelProperty::Leader => return Err(invalid_value(property)),
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Attribute bindings
    // ------------------------------------------------------------------

    /// Bind a property to a feature attribute, replacing any previous binding.
    pub fn set_binding(&mut self, binding: LabelBinding, item: &str) -> OwsResult<()> {
        if item.is_empty() {
            return Err(OwsError::Config("Invalid binding value.".to_string()));
        }
        self.bindings.insert(binding, item.to_string());
        Ok(())
    }

    pub fn binding(&self, binding: LabelBinding) -> Option<&str> {
        self.bindings.get(&binding).map(String::as_str)
    }

    /// Remove a binding; removing an unbound property is not an error.
    pub fn remove_binding(&mut self, binding: LabelBinding) -> Option<String> {
        self.bindings.remove(&binding)
    }

    pub fn num_bindings(&self) -> usize {
        self.bindings.len()
    }

    // ------------------------------------------------------------------
    // Styles
    // ------------------------------------------------------------------

    pub fn num_styles(&self) -> usize {
        self.styles.len()
    }

    pub fn styles(&self) -> &[LabelStyle] {
        &self.styles
    }

    pub fn style(&self, index: usize) -> OwsResult<&LabelStyle> {
        self.styles.get(index).ok_or_else(invalid_style_index)
    }

    pub fn style_mut(&mut self, index: usize) -> OwsResult<&mut LabelStyle> {
        self.styles.get_mut(index).ok_or_else(invalid_style_index)
    }

    /// Insert a style at `index`, or append it when no index is given.
    /// Returns the index the style ended up at.
    pub fn insert_style(&mut self, style: LabelStyle, index: Option<usize>) -> OwsResult<usize> {
        match index {
            None => {
                self.styles.push(style);
                Ok(self.styles.len() - 1)
            }
            Some(i) if i <= self.styles.len() => {
                self.styles.insert(i, style);
                Ok(i)
            }
            Some(_) => Err(invalid_style_index()),
        }
    }

    /// Remove a style and hand it back to the caller.
    pub fn remove_style(&mut self, index: usize) -> OwsResult<LabelStyle> {
        if index >= self.styles.len() {
            return Err(invalid_style_index());
        }
        Ok(self.styles.remove(index))
    }

    /// Swap a style with the one drawn before it.
    pub fn move_style_up(&mut self, index: usize) -> OwsResult<()> {
        if index == 0 || index >= self.styles.len() {
            return Err(invalid_style_index());
        }
        self.styles.swap(index, index - 1);
        Ok(())
    }

    /// Swap a style with the one drawn after it.
    pub fn move_style_down(&mut self, index: usize) -> OwsResult<()> {
        if index + 1 >= self.styles.len() {
            return Err(invalid_style_index());
        }
        self.styles.swap(index, index + 1);
        Ok(())
    }

    pub fn delete_style(&mut self, index: usize) -> OwsResult<()> {
        self.remove_style(index).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_codes() {
        assert_eq!(Position::Ul.code(), 101);
        assert_eq!(Position::Cc.code(), 109);
        assert_eq!(Position::from_code(110), Some(Position::Auto));
        assert_eq!(Position::from_code(100), None);
        assert_eq!(Position::from_code(111), None);
    }

    #[test]
    fn test_binding_ids() {
        assert_eq!(LabelBinding::from_id(0).unwrap(), LabelBinding::Size);
        assert_eq!(LabelBinding::OffsetY.id(), 10);
        assert!(LabelBinding::from_id(11).is_err());
        assert!(LabelBinding::from_id(-1).is_err());
    }

    #[test]
    fn test_property_names_roundtrip() {
        for name in ["font", "minscaledenom", "numstyles", "leader", "MaxOverlapAngle"] {
            let property: LabelProperty = name.parse().unwrap();
            assert!(property.name().eq_ignore_ascii_case(name));
        }
    }
}
