use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::architecture::Architecture;
use crate::faction::Faction;
use crate::link::Link;
use crate::list::GameObjectList;
use crate::object::{ExportedField, FieldValue, GameObject, ObjectId};
use crate::scenario::GameScenario;
use crate::strings::{GlobalStrings, StringKey};
use crate::table::{self, TableError};

#[derive(Debug)]
pub struct Person {
    id: ObjectId,
    ai_tags: String,
    name: String,
    faction: Link<Faction>,
    location: Link<Architecture>,
    command: i32,
    strength: i32,
    intelligence: i32,
    politics: i32,
    glamour: i32,
}

#[derive(Debug, Deserialize, Serialize)]
struct PersonRow {
    id: i32,
    ai_tags: String,
    name: String,
    faction_id: i32,
    location_id: i32,
    command: i32,
    strength: i32,
    intelligence: i32,
    politics: i32,
    glamour: i32,
}

impl Person {
    pub const SAVE_FILE: &'static str = "Person.csv";

    pub(crate) fn from_csv(dir: &Path) -> Result<GameObjectList<Person>, TableError> {
        let path = dir.join(Self::SAVE_FILE);
        let mut result = GameObjectList::new();
        for row in table::read_rows::<PersonRow>(&path)? {
            let person = Person {
                id: ObjectId(row.id),
                ai_tags: row.ai_tags,
                name: row.name,
                faction: Link::from_raw(row.faction_id),
                location: Link::from_raw(row.location_id),
                command: row.command,
                strength: row.strength,
                intelligence: row.intelligence,
                politics: row.politics,
                glamour: row.glamour,
            };
            let id = person.id;
            result.add(person).map_err(|_| TableError::DuplicateRow {
                path: path.clone(),
                id,
            })?;
        }
        Ok(result)
    }

    pub(crate) fn to_csv(
        dir: &Path,
        list: &GameObjectList<Person>,
        strings: &GlobalStrings,
    ) -> Result<(), TableError> {
        let path = dir.join(Self::SAVE_FILE);
        let rows = list.iter().map(|cell| {
            let p = cell.borrow();
            PersonRow {
                id: p.id.0,
                ai_tags: p.ai_tags.clone(),
                name: p.name.clone(),
                faction_id: p.faction.save_id(),
                location_id: p.location.save_id(),
                command: p.command,
                strength: p.strength,
                intelligence: p.intelligence,
                politics: p.politics,
                glamour: p.glamour,
            }
        });
        table::write_rows(&path, strings.get(StringKey::PersonSaveHeader), rows)
    }

    pub fn command(&self) -> i32 {
        self.command
    }

    pub fn strength(&self) -> i32 {
        self.strength
    }

    pub fn intelligence(&self) -> i32 {
        self.intelligence
    }

    pub fn politics(&self) -> i32 {
        self.politics
    }

    pub fn glamour(&self) -> i32 {
        self.glamour
    }

    /// Capability ranking used when a faction needs a leader picked.
    pub fn ability_sum(&self) -> i32 {
        self.command + self.strength + self.intelligence + self.politics + self.glamour
    }

    pub fn belonged_faction(&self) -> Option<Rc<RefCell<Faction>>> {
        self.faction.live().cloned()
    }

    pub fn belonged_faction_id(&self) -> Option<ObjectId> {
        self.faction.linked_id()
    }

    pub fn location(&self) -> Option<Rc<RefCell<Architecture>>> {
        self.location.live().cloned()
    }

    pub fn location_id(&self) -> Option<ObjectId> {
        self.location.linked_id()
    }

    /// Gameplay relocation, e.g. a faction AI reassigning a person.
    pub fn move_to(&mut self, architecture: &Rc<RefCell<Architecture>>) {
        let id = architecture.borrow().id();
        self.location.resolve(id, Rc::clone(architecture));
    }

    pub fn join_faction(&mut self, faction: &Rc<RefCell<Faction>>) {
        let id = faction.borrow().id();
        self.faction.resolve(id, Rc::clone(faction));
    }

    pub(crate) fn faction_raw_id(&self) -> Option<ObjectId> {
        self.faction.raw_id()
    }

    pub(crate) fn location_raw_id(&self) -> Option<ObjectId> {
        self.location.raw_id()
    }

    pub(crate) fn resolve_faction(&mut self, id: ObjectId, faction: Rc<RefCell<Faction>>) {
        self.faction.resolve(id, faction);
    }

    pub(crate) fn resolve_location(&mut self, id: ObjectId, architecture: Rc<RefCell<Architecture>>) {
        self.location.resolve(id, architecture);
    }

    pub(crate) const EXPORTED: &'static [ExportedField<Person>] = &[
        ExportedField {
            name: "id",
            get: |_, p| FieldValue::Int(i64::from(p.id.0)),
        },
        ExportedField {
            name: "aiTags",
            get: |_, p| FieldValue::Text(p.ai_tags.clone()),
        },
        ExportedField {
            name: "name",
            get: |_, p| FieldValue::Text(p.name.clone()),
        },
        ExportedField {
            name: "command",
            get: |_, p| FieldValue::Int(i64::from(p.command)),
        },
        ExportedField {
            name: "strength",
            get: |_, p| FieldValue::Int(i64::from(p.strength)),
        },
        ExportedField {
            name: "intelligence",
            get: |_, p| FieldValue::Int(i64::from(p.intelligence)),
        },
        ExportedField {
            name: "politics",
            get: |_, p| FieldValue::Int(i64::from(p.politics)),
        },
        ExportedField {
            name: "glamour",
            get: |_, p| FieldValue::Int(i64::from(p.glamour)),
        },
        ExportedField {
            name: "abilitySum",
            get: |_, p| FieldValue::Int(i64::from(p.ability_sum())),
        },
    ];
}

impl GameObject for Person {
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
            "Command" => Some(FieldValue::Int(i64::from(self.command))),
            "Strength" => Some(FieldValue::Int(i64::from(self.strength))),
            "Intelligence" => Some(FieldValue::Int(i64::from(self.intelligence))),
            "Politics" => Some(FieldValue::Int(i64::from(self.politics))),
            "Glamour" => Some(FieldValue::Int(i64::from(self.glamour))),
            "AbilitySum" => Some(FieldValue::Int(i64::from(self.ability_sum()))),
            "BelongedFaction" => Some(match self.faction.live() {
                Some(faction) => {
                    let f = faction.borrow();
                    FieldValue::Object(f.id(), f.name())
                }
                None => FieldValue::Absent,
            }),
            "Location" => Some(match self.location.live() {
                Some(architecture) => {
                    let a = architecture.borrow();
                    FieldValue::Object(a.id(), a.name())
                }
                None => FieldValue::Absent,
            }),
            _ => None,
        }
    }
}
