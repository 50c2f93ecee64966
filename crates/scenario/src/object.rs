use std::fmt;

use serde::{Deserialize, Serialize};

use crate::scenario::GameScenario;
use crate::strings::StringKey;

/// Identifier of an entity within its kind. Assigned by the save file,
/// never generated at runtime; `-1` is reserved as the "no reference"
/// sentinel in link columns and is not a valid id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub i32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Behavior shared by every entity kind.
pub trait GameObject {
    fn id(&self) -> ObjectId;
    fn name(&self) -> String;
    fn ai_tags(&self) -> &str;
    fn set_ai_tags(&mut self, tags: String);

    /// Kind-specific lookup behind [`get_field`]. Returns `None` for names
    /// the kind does not know; the well-known keys `Id`, `Name` and
    /// `AiTags` are handled generically and never reach this method.
    fn field(&self, scenario: &GameScenario, name: &str) -> Option<FieldValue>;
}

/// Value produced by the string-keyed field accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f32),
    Bool(bool),
    Text(String),
    /// A resolved reference: target id plus its display name.
    Object(ObjectId, String),
    /// The field exists but currently has no value.
    Absent,
}

/// Looks up a field by its capitalized display key. Unknown names resolve
/// to `None`, never an error; templated UI text must degrade gracefully.
pub fn get_field(
    scenario: &GameScenario,
    object: &dyn GameObject,
    name: &str,
) -> Option<FieldValue> {
    match name {
        "Id" => Some(FieldValue::Int(i64::from(object.id().0))),
        "Name" => Some(FieldValue::Text(object.name())),
        "AiTags" => Some(FieldValue::Text(object.ai_tags().to_string())),
        _ => object.field(scenario, name),
    }
}

/// Formats a field for display. Floats round to the nearest integer unless
/// `round` is false (then one decimal digit); references render as the
/// target's name; a missing or empty field renders as the localized
/// "no content" text.
pub fn get_field_string(
    scenario: &GameScenario,
    object: &dyn GameObject,
    name: &str,
    round: bool,
) -> String {
    match get_field(scenario, object, name) {
        None | Some(FieldValue::Absent) => {
            scenario.strings().get(StringKey::NoContent).to_string()
        }
        Some(FieldValue::Int(value)) => value.to_string(),
        Some(FieldValue::Float(value)) => {
            if round {
                format!("{}", value.round() as i64)
            } else {
                format!("{value:.1}")
            }
        }
        Some(FieldValue::Bool(value)) => value.to_string(),
        Some(FieldValue::Text(value)) => value,
        Some(FieldValue::Object(_, target_name)) => target_name,
    }
}

/// Evaluates a boolean-valued field used to gate UI affordances. Unknown
/// names and non-boolean fields are `false`, never an error.
pub fn satisfies(scenario: &GameScenario, object: &dyn GameObject, name: &str) -> bool {
    matches!(
        get_field(scenario, object, name),
        Some(FieldValue::Bool(true))
    )
}

/// One member of an entity kind marked as visible to the AI scripting
/// bridge. Only entries listed in a kind's `EXPORTED` table reach Lua.
pub struct ExportedField<T> {
    pub name: &'static str,
    pub get: fn(&GameScenario, &T) -> FieldValue,
}

/// Display color persisted as one packed base-10 integer, 0xRRGGBBAA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl GameColor {
    pub fn from_packed(packed: u32) -> Self {
        Self {
            r: (packed >> 24) as u8,
            g: (packed >> 16) as u8,
            b: (packed >> 8) as u8,
            a: packed as u8,
        }
    }

    pub fn packed(self) -> u32 {
        u32::from(self.r) << 24
            | u32::from(self.g) << 16
            | u32::from(self.b) << 8
            | u32::from(self.a)
    }
}
