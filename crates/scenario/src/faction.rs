use std::cell::RefCell;
use std::cmp::Ordering;
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::architecture::Architecture;
use crate::link::Link;
use crate::list::GameObjectList;
use crate::object::{ExportedField, FieldValue, GameColor, GameObject, ObjectId};
use crate::person::Person;
use crate::scenario::GameScenario;
use crate::strings::{GlobalStrings, StringKey};
use crate::table::{self, QuickEntry, TableError};
use crate::troop::Troop;

#[derive(Debug)]
pub struct Faction {
    id: ObjectId,
    ai_tags: String,
    name: String,
    color: GameColor,
    leader: Link<Person>,
}

#[derive(Debug, Deserialize, Serialize)]
struct FactionRow {
    id: i32,
    ai_tags: String,
    name: String,
    color: u32,
    leader_id: i32,
}

impl Faction {
    pub const SAVE_FILE: &'static str = "Faction.csv";

    pub(crate) fn from_csv(dir: &Path) -> Result<GameObjectList<Faction>, TableError> {
        let path = dir.join(Self::SAVE_FILE);
        let mut result = GameObjectList::new();
        for row in table::read_rows::<FactionRow>(&path)? {
            let faction = Faction {
                id: ObjectId(row.id),
                ai_tags: row.ai_tags,
                name: row.name,
                color: GameColor::from_packed(row.color),
                leader: Link::from_raw(row.leader_id),
            };
            let id = faction.id;
            result.add(faction).map_err(|_| TableError::DuplicateRow {
                path: path.clone(),
                id,
            })?;
        }
        Ok(result)
    }

    /// Quick load for selection lists: id and name only, link columns
    /// skipped. The result cannot be mixed into a full scenario.
    pub fn from_csv_quick(dir: &Path) -> Result<Vec<QuickEntry>, TableError> {
        table::read_quick(&dir.join(Self::SAVE_FILE), 2)
    }

    pub(crate) fn to_csv(
        dir: &Path,
        list: &GameObjectList<Faction>,
        strings: &GlobalStrings,
    ) -> Result<(), TableError> {
        let path = dir.join(Self::SAVE_FILE);
        let rows = list.iter().map(|cell| {
            let f = cell.borrow();
            FactionRow {
                id: f.id.0,
                ai_tags: f.ai_tags.clone(),
                name: f.name.clone(),
                color: f.color.packed(),
                leader_id: f.leader.save_id(),
            }
        });
        table::write_rows(&path, strings.get(StringKey::FactionSaveHeader), rows)
    }

    pub fn color(&self) -> GameColor {
        self.color
    }

    /// Every faction has exactly one leader once resolution completes.
    pub fn leader(&self) -> Rc<RefCell<Person>> {
        self.leader.expect_live("faction leader")
    }

    pub fn leader_name(&self) -> String {
        self.leader().borrow().name()
    }

    pub fn persons(&self, scenario: &GameScenario) -> GameObjectList<Person> {
        scenario
            .persons()
            .filter(|p| p.belonged_faction_id() == Some(self.id))
    }

    pub fn architectures(&self, scenario: &GameScenario) -> GameObjectList<Architecture> {
        scenario
            .architectures()
            .filter(|a| a.belonged_faction_id() == Some(self.id))
    }

    pub fn troops(&self, scenario: &GameScenario) -> GameObjectList<Troop> {
        scenario
            .troops()
            .filter(|t| t.belonged_faction_id() == Some(self.id))
    }

    pub fn person_count(&self, scenario: &GameScenario) -> usize {
        self.persons(scenario).len()
    }

    pub fn architecture_count(&self, scenario: &GameScenario) -> usize {
        self.architectures(scenario).len()
    }

    pub fn fund(&self, scenario: &GameScenario) -> i64 {
        self.architectures(scenario)
            .iter()
            .map(|cell| cell.borrow().fund())
            .sum()
    }

    pub fn food(&self, scenario: &GameScenario) -> i64 {
        self.architectures(scenario)
            .iter()
            .map(|cell| cell.borrow().food())
            .sum()
    }

    pub fn troop_quantity(&self, scenario: &GameScenario) -> i64 {
        self.troops(scenario)
            .iter()
            .map(|cell| i64::from(cell.borrow().quantity()))
            .sum()
    }

    pub(crate) fn leader_raw_id(&self) -> Option<ObjectId> {
        self.leader.raw_id()
    }

    pub(crate) fn has_leader(&self) -> bool {
        self.leader.live().is_some()
    }

    pub(crate) fn set_leader(&mut self, id: ObjectId, person: Rc<RefCell<Person>>) {
        self.leader.resolve(id, person);
    }

    /// Capability ranking with a deterministic tie-break: equal sums go to
    /// the lowest id.
    fn leader_ranking(a: &Person, b: &Person) -> Ordering {
        a.ability_sum()
            .cmp(&b.ability_sum())
            .then_with(|| b.id().cmp(&a.id()))
    }

    pub(crate) fn pick_leader(
        &self,
        persons: &GameObjectList<Person>,
    ) -> Option<Rc<RefCell<Person>>> {
        persons
            .filter(|p| p.belonged_faction_id() == Some(self.id))
            .max_by(Self::leader_ranking)
    }

    pub(crate) const EXPORTED: &'static [ExportedField<Faction>] = &[
        ExportedField {
            name: "id",
            get: |_, f| FieldValue::Int(i64::from(f.id.0)),
        },
        ExportedField {
            name: "aiTags",
            get: |_, f| FieldValue::Text(f.ai_tags.clone()),
        },
        ExportedField {
            name: "name",
            get: |_, f| FieldValue::Text(f.name.clone()),
        },
        ExportedField {
            name: "leaderName",
            get: |_, f| FieldValue::Text(f.leader_name()),
        },
        ExportedField {
            name: "personCount",
            get: |s, f| FieldValue::Int(f.person_count(s) as i64),
        },
        ExportedField {
            name: "architectureCount",
            get: |s, f| FieldValue::Int(f.architecture_count(s) as i64),
        },
        ExportedField {
            name: "fund",
            get: |s, f| FieldValue::Int(f.fund(s)),
        },
        ExportedField {
            name: "food",
            get: |s, f| FieldValue::Int(f.food(s)),
        },
        ExportedField {
            name: "troopQuantity",
            get: |s, f| FieldValue::Int(f.troop_quantity(s)),
        },
    ];
}

impl GameObject for Faction {
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
            "Leader" => Some(match self.leader.live() {
                Some(person) => {
                    let p = person.borrow();
                    FieldValue::Object(p.id(), p.name())
                }
                None => FieldValue::Absent,
            }),
            "LeaderName" => Some(match self.leader.live() {
                Some(person) => FieldValue::Text(person.borrow().name()),
                None => FieldValue::Absent,
            }),
            "PersonCount" => Some(FieldValue::Int(self.person_count(scenario) as i64)),
            "ArchitectureCount" => Some(FieldValue::Int(self.architecture_count(scenario) as i64)),
            "Fund" => Some(FieldValue::Int(self.fund(scenario))),
            "Food" => Some(FieldValue::Int(self.food(scenario))),
            "TroopQuantity" => Some(FieldValue::Int(self.troop_quantity(scenario))),
            _ => None,
        }
    }
}
