use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::faction::Faction;
use crate::link::Link;
use crate::list::GameObjectList;
use crate::object::{ExportedField, FieldValue, GameObject, ObjectId};
use crate::scenario::GameScenario;
use crate::strings::{GlobalStrings, StringKey};
use crate::table::{self, TableError};
use crate::troop_animation::TroopAnimation;

#[derive(Debug)]
pub struct Troop {
    id: ObjectId,
    ai_tags: String,
    name: String,
    faction: Link<Faction>,
    animation: Link<TroopAnimation>,
    quantity: i32,
    morale: i32,
    combativity: i32,
    x: i32,
    y: i32,
}

#[derive(Debug, Deserialize, Serialize)]
struct TroopRow {
    id: i32,
    ai_tags: String,
    name: String,
    faction_id: i32,
    animation_id: i32,
    quantity: i32,
    morale: i32,
    combativity: i32,
    x: i32,
    y: i32,
}

impl Troop {
    pub const SAVE_FILE: &'static str = "Troop.csv";

    pub(crate) fn from_csv(dir: &Path) -> Result<GameObjectList<Troop>, TableError> {
        let path = dir.join(Self::SAVE_FILE);
        let mut result = GameObjectList::new();
        for row in table::read_rows::<TroopRow>(&path)? {
            let troop = Troop {
                id: ObjectId(row.id),
                ai_tags: row.ai_tags,
                name: row.name,
                faction: Link::from_raw(row.faction_id),
                animation: Link::from_raw(row.animation_id),
                quantity: row.quantity,
                morale: row.morale,
                combativity: row.combativity,
                x: row.x,
                y: row.y,
            };
            let id = troop.id;
            result.add(troop).map_err(|_| TableError::DuplicateRow {
                path: path.clone(),
                id,
            })?;
        }
        Ok(result)
    }

    pub(crate) fn to_csv(
        dir: &Path,
        list: &GameObjectList<Troop>,
        strings: &GlobalStrings,
    ) -> Result<(), TableError> {
        let path = dir.join(Self::SAVE_FILE);
        let rows = list.iter().map(|cell| {
            let t = cell.borrow();
            TroopRow {
                id: t.id.0,
                ai_tags: t.ai_tags.clone(),
                name: t.name.clone(),
                faction_id: t.faction.save_id(),
                animation_id: t.animation.save_id(),
                quantity: t.quantity,
                morale: t.morale,
                combativity: t.combativity,
                x: t.x,
                y: t.y,
            }
        });
        table::write_rows(&path, strings.get(StringKey::TroopSaveHeader), rows)
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    pub fn morale(&self) -> i32 {
        self.morale
    }

    pub fn combativity(&self) -> i32 {
        self.combativity
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Every troop belongs to a faction; mandatory once resolved.
    pub fn belonged_faction(&self) -> Rc<RefCell<Faction>> {
        self.faction.expect_live("troop faction")
    }

    pub fn belonged_faction_id(&self) -> Option<ObjectId> {
        self.faction.linked_id()
    }

    pub fn animation(&self) -> Rc<RefCell<TroopAnimation>> {
        self.animation.expect_live("troop animation")
    }

    pub(crate) fn faction_raw_id(&self) -> Option<ObjectId> {
        self.faction.raw_id()
    }

    pub(crate) fn faction_is_unset(&self) -> bool {
        self.faction.is_unset()
    }

    pub(crate) fn animation_raw_id(&self) -> Option<ObjectId> {
        self.animation.raw_id()
    }

    pub(crate) fn animation_is_unset(&self) -> bool {
        self.animation.is_unset()
    }

    pub(crate) fn resolve_faction(&mut self, id: ObjectId, faction: Rc<RefCell<Faction>>) {
        self.faction.resolve(id, faction);
    }

    pub(crate) fn resolve_animation(&mut self, id: ObjectId, animation: Rc<RefCell<TroopAnimation>>) {
        self.animation.resolve(id, animation);
    }

    pub(crate) const EXPORTED: &'static [ExportedField<Troop>] = &[
        ExportedField {
            name: "id",
            get: |_, t| FieldValue::Int(i64::from(t.id.0)),
        },
        ExportedField {
            name: "aiTags",
            get: |_, t| FieldValue::Text(t.ai_tags.clone()),
        },
        ExportedField {
            name: "name",
            get: |_, t| FieldValue::Text(t.name.clone()),
        },
        ExportedField {
            name: "quantity",
            get: |_, t| FieldValue::Int(i64::from(t.quantity)),
        },
        ExportedField {
            name: "morale",
            get: |_, t| FieldValue::Int(i64::from(t.morale)),
        },
        ExportedField {
            name: "combativity",
            get: |_, t| FieldValue::Int(i64::from(t.combativity)),
        },
        ExportedField {
            name: "x",
            get: |_, t| FieldValue::Int(i64::from(t.x)),
        },
        ExportedField {
            name: "y",
            get: |_, t| FieldValue::Int(i64::from(t.y)),
        },
    ];
}

impl GameObject for Troop {
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
            "Quantity" => Some(FieldValue::Int(i64::from(self.quantity))),
            "Morale" => Some(FieldValue::Int(i64::from(self.morale))),
            "Combativity" => Some(FieldValue::Int(i64::from(self.combativity))),
            "X" => Some(FieldValue::Int(i64::from(self.x))),
            "Y" => Some(FieldValue::Int(i64::from(self.y))),
            "BelongedFaction" => Some(match self.faction.live() {
                Some(faction) => {
                    let f = faction.borrow();
                    FieldValue::Object(f.id(), f.name())
                }
                None => FieldValue::Absent,
            }),
            "Animation" => Some(match self.animation.live() {
                Some(animation) => {
                    let a = animation.borrow();
                    FieldValue::Object(a.id(), a.name())
                }
                None => FieldValue::Absent,
            }),
            _ => None,
        }
    }
}
