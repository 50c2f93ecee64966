use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::list::GameObjectList;
use crate::object::{ExportedField, FieldValue, GameObject, ObjectId};
use crate::scenario::GameScenario;
use crate::strings::{GlobalStrings, StringKey};
use crate::table::{self, TableError};

/// Sprite sheet description for one troop animation. Immutable after
/// construction; assembled through [`TroopAnimationBuilder`].
#[derive(Debug)]
pub struct TroopAnimation {
    id: ObjectId,
    ai_tags: String,
    name: String,
    file_name: String,
    frame_count: i32,
    idle_frame: i32,
    sprite_size: i32,
}

#[derive(Debug, Deserialize, Serialize)]
struct TroopAnimationRow {
    id: i32,
    name: String,
    file_name: String,
    frame_count: i32,
    idle_frame: i32,
    sprite_size: i32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnimationBuildError {
    #[error("animation name cannot be empty")]
    EmptyName,
    #[error("animation file name cannot be empty")]
    EmptyFileName,
    #[error("frame count must be positive, got {0}")]
    NonPositiveFrameCount(i32),
    #[error("idle frame {idle_frame} is outside 0..{frame_count}")]
    IdleFrameOutOfRange { idle_frame: i32, frame_count: i32 },
    #[error("sprite size must be positive, got {0}")]
    NonPositiveSpriteSize(i32),
}

/// Accumulates the positional fields of a [`TroopAnimation`] and validates
/// them only at the final `build` step.
#[derive(Debug)]
pub struct TroopAnimationBuilder {
    id: ObjectId,
    name: String,
    file_name: String,
    frame_count: i32,
    idle_frame: i32,
    sprite_size: i32,
}

impl TroopAnimationBuilder {
    pub fn new(id: ObjectId) -> Self {
        Self {
            id,
            name: String::new(),
            file_name: String::new(),
            frame_count: 0,
            idle_frame: 0,
            sprite_size: 0,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn frame_count(mut self, frame_count: i32) -> Self {
        self.frame_count = frame_count;
        self
    }

    pub fn idle_frame(mut self, idle_frame: i32) -> Self {
        self.idle_frame = idle_frame;
        self
    }

    pub fn sprite_size(mut self, sprite_size: i32) -> Self {
        self.sprite_size = sprite_size;
        self
    }

    pub fn build(self) -> Result<TroopAnimation, AnimationBuildError> {
        if self.name.is_empty() {
            return Err(AnimationBuildError::EmptyName);
        }
        if self.file_name.is_empty() {
            return Err(AnimationBuildError::EmptyFileName);
        }
        if self.frame_count <= 0 {
            return Err(AnimationBuildError::NonPositiveFrameCount(self.frame_count));
        }
        if self.idle_frame < 0 || self.idle_frame >= self.frame_count {
            return Err(AnimationBuildError::IdleFrameOutOfRange {
                idle_frame: self.idle_frame,
                frame_count: self.frame_count,
            });
        }
        if self.sprite_size <= 0 {
            return Err(AnimationBuildError::NonPositiveSpriteSize(self.sprite_size));
        }
        Ok(TroopAnimation {
            id: self.id,
            ai_tags: String::new(),
            name: self.name,
            file_name: self.file_name,
            frame_count: self.frame_count,
            idle_frame: self.idle_frame,
            sprite_size: self.sprite_size,
        })
    }
}

impl TroopAnimation {
    pub const SAVE_FILE: &'static str = "TroopAnimation.csv";

    pub(crate) fn from_csv(dir: &Path) -> Result<GameObjectList<TroopAnimation>, TableError> {
        let path = dir.join(Self::SAVE_FILE);
        let mut result = GameObjectList::new();
        for row in table::read_rows::<TroopAnimationRow>(&path)? {
            let id = ObjectId(row.id);
            let animation = TroopAnimationBuilder::new(id)
                .name(row.name)
                .file_name(row.file_name)
                .frame_count(row.frame_count)
                .idle_frame(row.idle_frame)
                .sprite_size(row.sprite_size)
                .build()
                .map_err(|err| TableError::InvalidObject {
                    path: path.clone(),
                    id,
                    message: err.to_string(),
                })?;
            result.add(animation).map_err(|_| TableError::DuplicateRow {
                path: path.clone(),
                id,
            })?;
        }
        Ok(result)
    }

    pub(crate) fn to_csv(
        dir: &Path,
        list: &GameObjectList<TroopAnimation>,
        strings: &GlobalStrings,
    ) -> Result<(), TableError> {
        let path = dir.join(Self::SAVE_FILE);
        let rows = list.iter().map(|cell| {
            let a = cell.borrow();
            TroopAnimationRow {
                id: a.id.0,
                name: a.name.clone(),
                file_name: a.file_name.clone(),
                frame_count: a.frame_count,
                idle_frame: a.idle_frame,
                sprite_size: a.sprite_size,
            }
        });
        table::write_rows(&path, strings.get(StringKey::TroopAnimationSaveHeader), rows)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn frame_count(&self) -> i32 {
        self.frame_count
    }

    pub fn idle_frame(&self) -> i32 {
        self.idle_frame
    }

    pub fn sprite_size(&self) -> i32 {
        self.sprite_size
    }

    pub(crate) const EXPORTED: &'static [ExportedField<TroopAnimation>] = &[
        ExportedField {
            name: "id",
            get: |_, a| FieldValue::Int(i64::from(a.id.0)),
        },
        ExportedField {
            name: "name",
            get: |_, a| FieldValue::Text(a.name.clone()),
        },
        ExportedField {
            name: "fileName",
            get: |_, a| FieldValue::Text(a.file_name.clone()),
        },
        ExportedField {
            name: "frameCount",
            get: |_, a| FieldValue::Int(i64::from(a.frame_count)),
        },
        ExportedField {
            name: "idleFrame",
            get: |_, a| FieldValue::Int(i64::from(a.idle_frame)),
        },
        ExportedField {
            name: "spriteSize",
            get: |_, a| FieldValue::Int(i64::from(a.sprite_size)),
        },
    ];
}

impl GameObject for TroopAnimation {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn ai_tags(&self) -> &str {
        &self.ai_tags
    }

    fn set_ai_tags(&mut self, tags: String) {
        self.ai_tags = tags;
    }

    fn field(&self, _scenario: &GameScenario, name: &str) -> Option<FieldValue> {
        match name {
            "FileName" => Some(FieldValue::Text(self.file_name.clone())),
            "FrameCount" => Some(FieldValue::Int(i64::from(self.frame_count))),
            "IdleFrame" => Some(FieldValue::Int(i64::from(self.idle_frame))),
            "SpriteSize" => Some(FieldValue::Int(i64::from(self.sprite_size))),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> TroopAnimationBuilder {
        TroopAnimationBuilder::new(ObjectId(1))
            .name("Infantry")
            .file_name("infantry.png")
            .frame_count(8)
            .idle_frame(2)
            .sprite_size(64)
    }

    #[test]
    fn builder_produces_immutable_animation() {
        let animation = builder().build().expect("valid animation");
        assert_eq!(animation.id(), ObjectId(1));
        assert_eq!(animation.name(), "Infantry");
        assert_eq!(animation.file_name(), "infantry.png");
        assert_eq!(animation.frame_count(), 8);
    }

    #[test]
    fn builder_validates_only_at_build() {
        // an intermediate invalid state is fine until build is called
        let staged = builder().frame_count(0);
        let err = staged.build().unwrap_err();
        assert_eq!(err, AnimationBuildError::NonPositiveFrameCount(0));
    }

    #[test]
    fn idle_frame_must_fall_inside_frame_range() {
        let err = builder().idle_frame(8).build().unwrap_err();
        assert_eq!(
            err,
            AnimationBuildError::IdleFrameOutOfRange {
                idle_frame: 8,
                frame_count: 8,
            }
        );
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = builder().name("").build().unwrap_err();
        assert_eq!(err, AnimationBuildError::EmptyName);
    }

    #[test]
    fn invalid_row_surfaces_as_a_load_error_naming_the_file() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        std::fs::write(
            dir.path().join(TroopAnimation::SAVE_FILE),
            "Id,Name,FileName,FrameCount,IdleFrame,SpriteSize\n1,Infantry,infantry.png,0,0,64\n",
        )
        .expect("write");
        let err = TroopAnimation::from_csv(dir.path()).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("TroopAnimation.csv"), "got: {text}");
        assert!(text.contains("frame count"), "got: {text}");
    }
}
