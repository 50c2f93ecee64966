use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::architecture::Architecture;
use crate::faction::Faction;
use crate::list::GameObjectList;
use crate::object::{GameObject, ObjectId};
use crate::person::Person;
use crate::strings::GlobalStrings;
use crate::table::TableError;
use crate::troop::Troop;
use crate::troop_animation::TroopAnimation;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{kind} {id} references missing {field} {target}")]
    DanglingReference {
        kind: &'static str,
        id: ObjectId,
        field: &'static str,
        target: ObjectId,
    },
    #[error("{kind} {id} is missing its required {field} reference")]
    MissingRequiredReference {
        kind: &'static str,
        id: ObjectId,
        field: &'static str,
    },
    #[error("faction {id} names leader {leader}, who does not belong to it")]
    LeaderOutsideFaction { id: ObjectId, leader: ObjectId },
    #[error("faction {id} has no person eligible to lead it")]
    NoEligibleLeader { id: ObjectId },
}

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Load(#[from] TableError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// All collections loaded, foreign keys still raw ids. Consumed by
/// [`UnresolvedScenario::resolve`], so a running session can never fall
/// back into the unresolved state; a fresh load starts over from files.
#[derive(Debug)]
pub struct UnresolvedScenario {
    strings: GlobalStrings,
    factions: GameObjectList<Faction>,
    persons: GameObjectList<Person>,
    architectures: GameObjectList<Architecture>,
    troops: GameObjectList<Troop>,
    troop_animations: GameObjectList<TroopAnimation>,
}

impl UnresolvedScenario {
    /// Loads every entity kind. Load order carries no dependencies; codecs
    /// never dereference other kinds during this phase.
    pub fn load(save_dir: &Path, strings: GlobalStrings) -> Result<Self, TableError> {
        let troop_animations = TroopAnimation::from_csv(save_dir)?;
        let factions = Faction::from_csv(save_dir)?;
        let persons = Person::from_csv(save_dir)?;
        let architectures = Architecture::from_csv(save_dir)?;
        let troops = Troop::from_csv(save_dir)?;
        Ok(Self {
            strings,
            factions,
            persons,
            architectures,
            troops,
            troop_animations,
        })
    }

    /// Turns every raw foreign key into a live reference, then checks the
    /// derived invariants. Factions resolve last so that the leader
    /// membership check can rely on already-resolved person links.
    pub fn resolve(self) -> Result<GameScenario, ResolveError> {
        let Self {
            strings,
            factions,
            persons,
            architectures,
            troops,
            troop_animations,
        } = self;

        for cell in &persons {
            let mut person = cell.borrow_mut();
            if let Some(target) = person.faction_raw_id() {
                let faction =
                    factions
                        .get_by_id(target)
                        .ok_or(ResolveError::DanglingReference {
                            kind: "person",
                            id: person.id(),
                            field: "faction",
                            target,
                        })?;
                person.resolve_faction(target, faction);
            }
            if let Some(target) = person.location_raw_id() {
                let architecture =
                    architectures
                        .get_by_id(target)
                        .ok_or(ResolveError::DanglingReference {
                            kind: "person",
                            id: person.id(),
                            field: "location",
                            target,
                        })?;
                person.resolve_location(target, architecture);
            }
        }

        for cell in &architectures {
            let mut architecture = cell.borrow_mut();
            if let Some(target) = architecture.faction_raw_id() {
                let faction =
                    factions
                        .get_by_id(target)
                        .ok_or(ResolveError::DanglingReference {
                            kind: "architecture",
                            id: architecture.id(),
                            field: "faction",
                            target,
                        })?;
                architecture.resolve_faction(target, faction);
            }
        }

        for cell in &troops {
            let mut troop = cell.borrow_mut();
            if troop.faction_is_unset() {
                return Err(ResolveError::MissingRequiredReference {
                    kind: "troop",
                    id: troop.id(),
                    field: "faction",
                });
            }
            if let Some(target) = troop.faction_raw_id() {
                let faction =
                    factions
                        .get_by_id(target)
                        .ok_or(ResolveError::DanglingReference {
                            kind: "troop",
                            id: troop.id(),
                            field: "faction",
                            target,
                        })?;
                troop.resolve_faction(target, faction);
            }
            if troop.animation_is_unset() {
                return Err(ResolveError::MissingRequiredReference {
                    kind: "troop",
                    id: troop.id(),
                    field: "animation",
                });
            }
            if let Some(target) = troop.animation_raw_id() {
                let animation =
                    troop_animations
                        .get_by_id(target)
                        .ok_or(ResolveError::DanglingReference {
                            kind: "troop",
                            id: troop.id(),
                            field: "animation",
                            target,
                        })?;
                troop.resolve_animation(target, animation);
            }
        }

        for cell in &factions {
            let mut faction = cell.borrow_mut();
            if let Some(target) = faction.leader_raw_id() {
                let person =
                    persons
                        .get_by_id(target)
                        .ok_or(ResolveError::DanglingReference {
                            kind: "faction",
                            id: faction.id(),
                            field: "leader",
                            target,
                        })?;
                if person.borrow().belonged_faction_id() != Some(faction.id()) {
                    return Err(ResolveError::LeaderOutsideFaction {
                        id: faction.id(),
                        leader: target,
                    });
                }
                faction.set_leader(target, person);
            } else if !faction.has_leader() {
                // Recoverable default rather than corruption: pick the
                // highest-ranked member, ties going to the lowest id.
                let pick = faction
                    .pick_leader(&persons)
                    .ok_or(ResolveError::NoEligibleLeader { id: faction.id() })?;
                let leader_id = pick.borrow().id();
                info!(
                    faction_id = faction.id().0,
                    leader_id = leader_id.0,
                    "leader_auto_assigned"
                );
                faction.set_leader(leader_id, pick);
            }
        }

        let scenario = GameScenario {
            strings,
            factions,
            persons,
            architectures,
            troops,
            troop_animations,
        };
        info!(
            factions = scenario.factions.len(),
            persons = scenario.persons.len(),
            architectures = scenario.architectures.len(),
            troops = scenario.troops.len(),
            troop_animations = scenario.troop_animations.len(),
            "scenario_resolved"
        );
        Ok(scenario)
    }
}

/// The resolved entity graph. Downstream consumers (field accessor, AI
/// bridge, turn runner) only ever see this state.
#[derive(Debug)]
pub struct GameScenario {
    strings: GlobalStrings,
    factions: GameObjectList<Faction>,
    persons: GameObjectList<Person>,
    architectures: GameObjectList<Architecture>,
    troops: GameObjectList<Troop>,
    troop_animations: GameObjectList<TroopAnimation>,
}

impl GameScenario {
    pub fn load(save_dir: &Path, strings: GlobalStrings) -> Result<Self, ScenarioError> {
        Ok(UnresolvedScenario::load(save_dir, strings)?.resolve()?)
    }

    /// Whole-snapshot save, one file per kind, collection order preserved.
    pub fn save(&self, save_dir: &Path) -> Result<(), TableError> {
        TroopAnimation::to_csv(save_dir, &self.troop_animations, &self.strings)?;
        Faction::to_csv(save_dir, &self.factions, &self.strings)?;
        Person::to_csv(save_dir, &self.persons, &self.strings)?;
        Architecture::to_csv(save_dir, &self.architectures, &self.strings)?;
        Troop::to_csv(save_dir, &self.troops, &self.strings)?;
        info!(save_dir = %save_dir.display(), "scenario_saved");
        Ok(())
    }

    pub fn strings(&self) -> &GlobalStrings {
        &self.strings
    }

    pub fn factions(&self) -> &GameObjectList<Faction> {
        &self.factions
    }

    pub fn persons(&self) -> &GameObjectList<Person> {
        &self.persons
    }

    pub fn architectures(&self) -> &GameObjectList<Architecture> {
        &self.architectures
    }

    pub fn troops(&self) -> &GameObjectList<Troop> {
        &self.troops
    }

    pub fn troop_animations(&self) -> &GameObjectList<TroopAnimation> {
        &self.troop_animations
    }

    pub fn persons_mut(&mut self) -> &mut GameObjectList<Person> {
        &mut self.persons
    }
}
