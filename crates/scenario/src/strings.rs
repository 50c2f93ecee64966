use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

/// Keys of localizable text consumed by the entity framework: the save-file
/// header lines and the "no content" placeholder used by the field accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringKey {
    NoContent,
    FactionSaveHeader,
    PersonSaveHeader,
    ArchitectureSaveHeader,
    TroopSaveHeader,
    TroopAnimationSaveHeader,
}

impl StringKey {
    fn default_text(self) -> &'static str {
        match self {
            StringKey::NoContent => "--",
            StringKey::FactionSaveHeader => "Id,AiTags,Name,Color,LeaderId",
            StringKey::PersonSaveHeader => {
                "Id,AiTags,Name,FactionId,LocationId,Command,Strength,Intelligence,Politics,Glamour"
            }
            StringKey::ArchitectureSaveHeader => {
                "Id,AiTags,Name,FactionId,Population,Fund,Food,Agriculture,Commerce"
            }
            StringKey::TroopSaveHeader => {
                "Id,AiTags,Name,FactionId,AnimationId,Quantity,Morale,Combativity,X,Y"
            }
            StringKey::TroopAnimationSaveHeader => "Id,Name,FileName,FrameCount,IdleFrame,SpriteSize",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        match name {
            "NoContent" => Some(StringKey::NoContent),
            "FactionSaveHeader" => Some(StringKey::FactionSaveHeader),
            "PersonSaveHeader" => Some(StringKey::PersonSaveHeader),
            "ArchitectureSaveHeader" => Some(StringKey::ArchitectureSaveHeader),
            "TroopSaveHeader" => Some(StringKey::TroopSaveHeader),
            "TroopAnimationSaveHeader" => Some(StringKey::TroopAnimationSaveHeader),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum StringsError {
    #[error("failed to read strings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("strings file {path} is not valid xml: {source}")]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },
    #[error("strings file {path} has an invalid entry: {message}")]
    InvalidEntry { path: PathBuf, message: String },
}

/// Localized text provider. Built-in defaults, optionally overridden by an
/// XML file of the form `<strings><string key=".." value=".."/></strings>`.
#[derive(Debug, Clone, Default)]
pub struct GlobalStrings {
    overrides: HashMap<StringKey, String>,
}

impl GlobalStrings {
    pub fn defaults() -> Self {
        Self::default()
    }

    pub fn get(&self, key: StringKey) -> &str {
        self.overrides
            .get(&key)
            .map(String::as_str)
            .unwrap_or_else(|| key.default_text())
    }

    pub fn load(path: &Path) -> Result<Self, StringsError> {
        let raw = fs::read_to_string(path).map_err(|source| StringsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let document = roxmltree::Document::parse(&raw).map_err(|source| StringsError::Xml {
            path: path.to_path_buf(),
            source,
        })?;
        let invalid = |message: String| StringsError::InvalidEntry {
            path: path.to_path_buf(),
            message,
        };

        let root = document.root_element();
        if root.tag_name().name() != "strings" {
            return Err(invalid(format!(
                "expected <strings> root, found <{}>",
                root.tag_name().name()
            )));
        }

        let mut overrides = HashMap::new();
        for node in root.children().filter(|node| node.is_element()) {
            if node.tag_name().name() != "string" {
                return Err(invalid(format!(
                    "unexpected element <{}>",
                    node.tag_name().name()
                )));
            }
            let key_name = node
                .attribute("key")
                .ok_or_else(|| invalid("missing key attribute".to_string()))?;
            let value = node
                .attribute("value")
                .ok_or_else(|| invalid(format!("entry {key_name} is missing its value attribute")))?;
            let key = StringKey::parse(key_name)
                .ok_or_else(|| invalid(format!("unknown key {key_name}")))?;
            overrides.insert(key, value.to_string());
        }
        Ok(Self { overrides })
    }

    /// Missing override file is not an error; the defaults apply.
    pub fn load_or_default(path: &Path) -> Result<Self, StringsError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "strings_file_missing_using_defaults");
            Ok(Self::defaults())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn defaults_cover_every_key() {
        let strings = GlobalStrings::defaults();
        assert_eq!(strings.get(StringKey::NoContent), "--");
        assert!(strings
            .get(StringKey::FactionSaveHeader)
            .starts_with("Id,AiTags,Name"));
    }

    #[test]
    fn override_file_replaces_only_listed_keys() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("strings.xml");
        fs::write(
            &path,
            "<strings><string key=\"NoContent\" value=\"(none)\"/></strings>",
        )
        .expect("write");
        let strings = GlobalStrings::load(&path).expect("load");
        assert_eq!(strings.get(StringKey::NoContent), "(none)");
        assert_eq!(
            strings.get(StringKey::TroopAnimationSaveHeader),
            StringKey::TroopAnimationSaveHeader.default_text()
        );
    }

    #[test]
    fn unknown_key_is_rejected_with_the_path() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("strings.xml");
        fs::write(
            &path,
            "<strings><string key=\"Mystery\" value=\"?\"/></strings>",
        )
        .expect("write");
        let err = GlobalStrings::load(&path).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("strings.xml"), "got: {text}");
        assert!(text.contains("Mystery"), "got: {text}");
    }

    #[test]
    fn missing_file_degrades_to_defaults() {
        let temp = TempDir::new().expect("tempdir");
        let strings =
            GlobalStrings::load_or_default(&temp.path().join("absent.xml")).expect("defaults");
        assert_eq!(strings.get(StringKey::NoContent), "--");
    }
}
