use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use mlua::{Function, Lua, Table, Value};
use thiserror::Error;
use tracing::debug;

use crate::architecture::Architecture;
use crate::faction::Faction;
use crate::object::{ExportedField, FieldValue, GameObject};
use crate::person::Person;
use crate::scenario::GameScenario;
use crate::troop::Troop;
use crate::troop_animation::TroopAnimation;

/// Global function every faction AI script must define. It receives the
/// acting faction's table and the scenario summary table.
pub const FACTION_AI_ENTRY: &str = "runFactionAi";

#[derive(Debug, Error)]
pub enum AiError {
    #[error("failed to read ai script {path}: {source}")]
    ReadScript {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("ai script {path} failed: {source}")]
    Script {
        path: PathBuf,
        #[source]
        source: mlua::Error,
    },
}

/// Runs one faction's AI script. A fresh interpreter is built per call and
/// the exported tables are plain snapshots; nothing is cached between
/// turns, so a script always sees current game state.
pub fn run_faction_ai(
    scenario: &GameScenario,
    faction: &Rc<RefCell<Faction>>,
    script_path: &Path,
) -> Result<(), AiError> {
    let source = fs::read_to_string(script_path).map_err(|source| AiError::ReadScript {
        path: script_path.to_path_buf(),
        source,
    })?;
    let script = |source: mlua::Error| AiError::Script {
        path: script_path.to_path_buf(),
        source,
    };

    let lua = Lua::new();
    lua.load(&source)
        .set_name(script_path.display().to_string())
        .exec()
        .map_err(script)?;
    let entry: Function = lua.globals().get(FACTION_AI_ENTRY).map_err(script)?;

    let faction_export = faction_table(&lua, scenario, faction).map_err(script)?;
    let scenario_export = scenario_table(&lua, scenario).map_err(script)?;
    debug!(
        faction_id = faction.borrow().id().0,
        script = %script_path.display(),
        "faction_ai_invoked"
    );
    entry
        .call::<()>((faction_export, scenario_export))
        .map_err(script)
}

/// Copies a kind's exported fields into `out`. Only entries in the kind's
/// export table cross the boundary; everything else stays engine-side.
fn export_fields<T>(
    lua: &Lua,
    scenario: &GameScenario,
    value: &T,
    fields: &[ExportedField<T>],
    out: &Table,
) -> mlua::Result<()> {
    for field in fields {
        out.set(field.name, lua_value(lua, (field.get)(scenario, value))?)?;
    }
    Ok(())
}

fn lua_value(lua: &Lua, value: FieldValue) -> mlua::Result<Value> {
    Ok(match value {
        FieldValue::Int(v) => Value::Integer(v),
        FieldValue::Float(v) => Value::Number(f64::from(v)),
        FieldValue::Bool(v) => Value::Boolean(v),
        FieldValue::Text(v) => Value::String(lua.create_string(&v)?),
        FieldValue::Object(id, name) => {
            let table = lua.create_table()?;
            table.set("id", id.0)?;
            table.set("name", lua.create_string(&name)?)?;
            Value::Table(table)
        }
        FieldValue::Absent => Value::Nil,
    })
}

fn faction_table(
    lua: &Lua,
    scenario: &GameScenario,
    cell: &Rc<RefCell<Faction>>,
) -> mlua::Result<Table> {
    let table = lua.create_table()?;
    {
        let faction = cell.borrow();
        export_fields(lua, scenario, &*faction, Faction::EXPORTED, &table)?;

        let architectures = lua.create_table()?;
        for (index, arch) in faction.architectures(scenario).iter().enumerate() {
            architectures.raw_set(index + 1, architecture_table(lua, scenario, arch)?)?;
        }
        table.set("architectures", architectures)?;

        let troops = lua.create_table()?;
        for (index, troop) in faction.troops(scenario).iter().enumerate() {
            troops.raw_set(index + 1, troop_table(lua, scenario, troop)?)?;
        }
        table.set("troops", troops)?;
    }

    let writeback = Rc::clone(cell);
    table.set(
        "setAiTags",
        lua.create_function(move |_, tags: String| {
            writeback.borrow_mut().set_ai_tags(tags);
            Ok(())
        })?,
    )?;
    Ok(table)
}

fn architecture_table(
    lua: &Lua,
    scenario: &GameScenario,
    cell: &Rc<RefCell<Architecture>>,
) -> mlua::Result<Table> {
    let table = lua.create_table()?;
    let architecture = cell.borrow();
    export_fields(lua, scenario, &*architecture, Architecture::EXPORTED, &table)?;

    let persons = lua.create_table()?;
    for (index, person) in architecture.persons(scenario).iter().enumerate() {
        persons.raw_set(index + 1, person_table(lua, scenario, person)?)?;
    }
    table.set("persons", persons)?;
    Ok(table)
}

fn troop_table(
    lua: &Lua,
    scenario: &GameScenario,
    cell: &Rc<RefCell<Troop>>,
) -> mlua::Result<Table> {
    let table = lua.create_table()?;
    let troop = cell.borrow();
    export_fields(lua, scenario, &*troop, Troop::EXPORTED, &table)?;

    let animation = troop.animation();
    let animation = animation.borrow();
    let animation_export = lua.create_table()?;
    export_fields(
        lua,
        scenario,
        &*animation,
        TroopAnimation::EXPORTED,
        &animation_export,
    )?;
    table.set("animation", animation_export)?;
    Ok(table)
}

fn person_table(
    lua: &Lua,
    scenario: &GameScenario,
    cell: &Rc<RefCell<Person>>,
) -> mlua::Result<Table> {
    let table = lua.create_table()?;
    export_fields(lua, scenario, &*cell.borrow(), Person::EXPORTED, &table)?;
    Ok(table)
}

fn scenario_table(lua: &Lua, scenario: &GameScenario) -> mlua::Result<Table> {
    let table = lua.create_table()?;
    table.set("factionCount", scenario.factions().len())?;
    table.set("personCount", scenario.persons().len())?;
    table.set("architectureCount", scenario.architectures().len())?;
    table.set("troopCount", scenario.troops().len())?;

    let factions = lua.create_table()?;
    for (index, cell) in scenario.factions().iter().enumerate() {
        let entry = lua.create_table()?;
        let faction = cell.borrow();
        entry.set("id", faction.id().0)?;
        entry.set("name", lua.create_string(&faction.name())?)?;
        factions.raw_set(index + 1, entry)?;
    }
    table.set("factions", factions)?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::object::ObjectId;
    use crate::test_fixtures;

    fn write_script(dir: &TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("faction.lua");
        fs::write(&path, body).expect("write script");
        path
    }

    #[test]
    fn script_sees_fields_and_writes_back_ai_tags() {
        let (_dir, scenario) = test_fixtures::load_scenario();
        let scripts = TempDir::new().expect("scripts dir");
        let path = write_script(
            &scripts,
            r#"
            function runFactionAi(faction, scenario)
                assert(faction.name == "Wei")
                assert(faction.leaderName == "Xiahou Dun")
                assert(faction.fund == 15000)
                assert(scenario.factionCount == 2)
                assert(scenario.factions[2].name == "Shu")
                faction.setAiTags("expand:" .. faction.architectures[1].name)
            end
            "#,
        );

        let wei = scenario.factions().get_by_id(ObjectId(1)).expect("wei");
        run_faction_ai(&scenario, &wei, &path).expect("script run");
        assert_eq!(wei.borrow().ai_tags(), "expand:Xu Chang");
    }

    #[test]
    fn export_is_rebuilt_fresh_on_every_call() {
        let (_dir, scenario) = test_fixtures::load_scenario();
        let scripts = TempDir::new().expect("scripts dir");
        let path = write_script(
            &scripts,
            r#"
            function runFactionAi(faction, scenario)
                faction.setAiTags(tostring(#faction.architectures[1].persons))
            end
            "#,
        );

        let wei = scenario.factions().get_by_id(ObjectId(1)).expect("wei");
        run_faction_ai(&scenario, &wei, &path).expect("first run");
        assert_eq!(wei.borrow().ai_tags(), "2");

        // relocate Liu Bei into Xu Chang between calls
        let xu_chang = scenario
            .architectures()
            .get_by_id(ObjectId(1))
            .expect("xu chang");
        scenario
            .persons()
            .get_by_id(ObjectId(3))
            .expect("liu bei")
            .borrow_mut()
            .move_to(&xu_chang);

        run_faction_ai(&scenario, &wei, &path).expect("second run");
        assert_eq!(wei.borrow().ai_tags(), "3");
    }

    #[test]
    fn troops_and_their_animations_reach_the_script() {
        let (_dir, scenario) = test_fixtures::load_scenario();
        let scripts = TempDir::new().expect("scripts dir");
        let path = write_script(
            &scripts,
            r#"
            function runFactionAi(faction, scenario)
                assert(#faction.troops == 1)
                local troop = faction.troops[1]
                assert(troop.name == "Wei Vanguard")
                assert(troop.quantity == 8000)
                assert(troop.animation.name == "Infantry")
                assert(troop.animation.frameCount == 8)
                assert(troop.animation.fileName == "infantry.png")
                -- link ids stay engine-side
                assert(troop.factionId == nil)
                assert(troop.animationId == nil)
            end
            "#,
        );

        let wei = scenario.factions().get_by_id(ObjectId(1)).expect("wei");
        run_faction_ai(&scenario, &wei, &path).expect("script run");
    }

    #[test]
    fn only_marked_fields_cross_the_boundary() {
        let (_dir, scenario) = test_fixtures::load_scenario();
        let scripts = TempDir::new().expect("scripts dir");
        let path = write_script(
            &scripts,
            r#"
            function runFactionAi(faction, scenario)
                assert(faction.leaderId == nil)
                assert(faction.color == nil)
                local person = faction.architectures[1].persons[1]
                assert(person.abilitySum ~= nil)
                assert(person.factionId == nil)
                assert(person.location == nil)
            end
            "#,
        );

        let wei = scenario.factions().get_by_id(ObjectId(1)).expect("wei");
        run_faction_ai(&scenario, &wei, &path).expect("script run");
    }

    #[test]
    fn missing_entry_function_is_a_script_error() {
        let (_dir, scenario) = test_fixtures::load_scenario();
        let scripts = TempDir::new().expect("scripts dir");
        let path = write_script(&scripts, "local x = 1");

        let wei = scenario.factions().get_by_id(ObjectId(1)).expect("wei");
        let err = run_faction_ai(&scenario, &wei, &path).unwrap_err();
        assert!(matches!(err, AiError::Script { .. }), "got: {err:?}");
    }

    #[test]
    fn missing_script_file_names_the_path() {
        let (_dir, scenario) = test_fixtures::load_scenario();
        let wei = scenario.factions().get_by_id(ObjectId(1)).expect("wei");
        let err =
            run_faction_ai(&scenario, &wei, Path::new("/nonexistent/faction.lua")).unwrap_err();
        assert!(err.to_string().contains("faction.lua"), "got: {err}");
    }

    #[test]
    fn runtime_failure_in_the_script_is_reported_not_swallowed() {
        let (_dir, scenario) = test_fixtures::load_scenario();
        let scripts = TempDir::new().expect("scripts dir");
        let path = write_script(
            &scripts,
            r#"
            function runFactionAi(faction, scenario)
                error("deliberate failure")
            end
            "#,
        );

        let wei = scenario.factions().get_by_id(ObjectId(1)).expect("wei");
        let err = run_faction_ai(&scenario, &wei, &path).unwrap_err();
        assert!(err.to_string().contains("faction.lua"), "got: {err}");
    }
}
