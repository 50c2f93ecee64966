use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::faction::Faction;
use crate::link::Link;
use crate::list::GameObjectList;
use crate::object::{ExportedField, FieldValue, GameObject, ObjectId};
use crate::person::Person;
use crate::scenario::GameScenario;
use crate::strings::{GlobalStrings, StringKey};
use crate::table::{self, TableError};

#[derive(Debug)]
pub struct Architecture {
    id: ObjectId,
    ai_tags: String,
    name: String,
    faction: Link<Faction>,
    population: i32,
    fund: i64,
    food: i64,
    agriculture: f32,
    commerce: f32,
}

#[derive(Debug, Deserialize, Serialize)]
struct ArchitectureRow {
    id: i32,
    ai_tags: String,
    name: String,
    faction_id: i32,
    population: i32,
    fund: i64,
    food: i64,
    agriculture: f32,
    commerce: f32,
}

impl Architecture {
    pub const SAVE_FILE: &'static str = "Architecture.csv";

    pub(crate) fn from_csv(dir: &Path) -> Result<GameObjectList<Architecture>, TableError> {
        let path = dir.join(Self::SAVE_FILE);
        let mut result = GameObjectList::new();
        for row in table::read_rows::<ArchitectureRow>(&path)? {
            let architecture = Architecture {
                id: ObjectId(row.id),
                ai_tags: row.ai_tags,
                name: row.name,
                faction: Link::from_raw(row.faction_id),
                population: row.population,
                fund: row.fund,
                food: row.food,
                agriculture: row.agriculture,
                commerce: row.commerce,
            };
            let id = architecture.id;
            result
                .add(architecture)
                .map_err(|_| TableError::DuplicateRow {
                    path: path.clone(),
                    id,
                })?;
        }
        Ok(result)
    }

    pub(crate) fn to_csv(
        dir: &Path,
        list: &GameObjectList<Architecture>,
        strings: &GlobalStrings,
    ) -> Result<(), TableError> {
        let path = dir.join(Self::SAVE_FILE);
        let rows = list.iter().map(|cell| {
            let a = cell.borrow();
            ArchitectureRow {
                id: a.id.0,
                ai_tags: a.ai_tags.clone(),
                name: a.name.clone(),
                faction_id: a.faction.save_id(),
                population: a.population,
                fund: a.fund,
                food: a.food,
                agriculture: a.agriculture,
                commerce: a.commerce,
            }
        });
        table::write_rows(&path, strings.get(StringKey::ArchitectureSaveHeader), rows)
    }

    pub fn population(&self) -> i32 {
        self.population
    }

    pub fn fund(&self) -> i64 {
        self.fund
    }

    pub fn food(&self) -> i64 {
        self.food
    }

    pub fn agriculture(&self) -> f32 {
        self.agriculture
    }

    pub fn commerce(&self) -> f32 {
        self.commerce
    }

    pub fn belonged_faction(&self) -> Option<Rc<RefCell<Faction>>> {
        self.faction.live().cloned()
    }

    pub fn belonged_faction_id(&self) -> Option<ObjectId> {
        self.faction.linked_id()
    }

    /// An architecture without an owning faction is open to capture.
    pub fn capturable(&self) -> bool {
        self.faction.live().is_none()
    }

    /// Persons currently located here, in person collection order.
    pub fn persons(&self, scenario: &GameScenario) -> GameObjectList<Person> {
        scenario
            .persons()
            .filter(|p| p.location_id() == Some(self.id))
    }

    pub(crate) fn faction_raw_id(&self) -> Option<ObjectId> {
        self.faction.raw_id()
    }

    pub(crate) fn resolve_faction(&mut self, id: ObjectId, faction: Rc<RefCell<Faction>>) {
        self.faction.resolve(id, faction);
    }

    pub(crate) const EXPORTED: &'static [ExportedField<Architecture>] = &[
        ExportedField {
            name: "id",
            get: |_, a| FieldValue::Int(i64::from(a.id.0)),
        },
        ExportedField {
            name: "aiTags",
            get: |_, a| FieldValue::Text(a.ai_tags.clone()),
        },
        ExportedField {
            name: "name",
            get: |_, a| FieldValue::Text(a.name.clone()),
        },
        ExportedField {
            name: "population",
            get: |_, a| FieldValue::Int(i64::from(a.population)),
        },
        ExportedField {
            name: "fund",
            get: |_, a| FieldValue::Int(a.fund),
        },
        ExportedField {
            name: "food",
            get: |_, a| FieldValue::Int(a.food),
        },
        ExportedField {
            name: "agriculture",
            get: |_, a| FieldValue::Float(a.agriculture),
        },
        ExportedField {
            name: "commerce",
            get: |_, a| FieldValue::Float(a.commerce),
        },
        ExportedField {
            name: "capturable",
            get: |_, a| FieldValue::Bool(a.capturable()),
        },
    ];
}

impl GameObject for Architecture {
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

    fn field(&self, scenario: &GameScenario, name: &str) -> Option<FieldValue> {
        match name {
            "Population" => Some(FieldValue::Int(i64::from(self.population))),
            "Fund" => Some(FieldValue::Int(self.fund)),
            "Food" => Some(FieldValue::Int(self.food)),
            "Agriculture" => Some(FieldValue::Float(self.agriculture)),
            "Commerce" => Some(FieldValue::Float(self.commerce)),
            "Capturable" => Some(FieldValue::Bool(self.capturable())),
            "PersonCount" => Some(FieldValue::Int(self.persons(scenario).len() as i64)),
            "BelongedFaction" => Some(match self.faction.live() {
                Some(faction) => {
                    let f = faction.borrow();
                    FieldValue::Object(f.id(), f.name())
                }
                None => FieldValue::Absent,
            }),
            _ => None,
        }
    }
}
