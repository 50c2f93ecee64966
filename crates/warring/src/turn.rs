use std::path::Path;

use scenario::{GameObject, GameScenario};
use tracing::warn;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct TurnReport {
    pub factions_run: usize,
    pub script_failures: usize,
}

/// Runs the faction AI script once for every faction, in collection order.
/// One faction's script failing does not stop the others; the failure is
/// logged and counted.
pub fn run_turn(scenario: &GameScenario, script_path: &Path) -> TurnReport {
    let mut report = TurnReport::default();
    for faction in scenario.factions() {
        report.factions_run += 1;
        if let Err(err) = scenario::run_faction_ai(scenario, faction, script_path) {
            report.script_failures += 1;
            warn!(
                faction_id = faction.borrow().id().0,
                error = %err,
                "faction_ai_failed"
            );
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use std::fs;

    use scenario::{GameObject, GameScenario, GlobalStrings, ObjectId};
    use tempfile::TempDir;

    use super::*;

    const FACTIONS: &str = "\
Id,AiTags,Name,Color,LeaderId
1,,Wei,4285563904,1
2,,Shu,2864429055,2
";

    const PERSONS: &str = "\
Id,AiTags,Name,FactionId,LocationId,Command,Strength,Intelligence,Politics,Glamour
1,,Cao Cao,1,-1,96,72,91,94,96
2,,Liu Bei,2,-1,72,68,74,85,95
";

    const ARCHITECTURES: &str =
        "Id,AiTags,Name,FactionId,Population,Fund,Food,Agriculture,Commerce\n";
    const TROOPS: &str = "Id,AiTags,Name,FactionId,AnimationId,Quantity,Morale,Combativity,X,Y\n";
    const TROOP_ANIMATIONS: &str = "Id,Name,FileName,FrameCount,IdleFrame,SpriteSize\n";

    fn scenario_dir() -> TempDir {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("Faction.csv"), FACTIONS).expect("write");
        fs::write(dir.path().join("Person.csv"), PERSONS).expect("write");
        fs::write(dir.path().join("Architecture.csv"), ARCHITECTURES).expect("write");
        fs::write(dir.path().join("Troop.csv"), TROOPS).expect("write");
        fs::write(dir.path().join("TroopAnimation.csv"), TROOP_ANIMATIONS).expect("write");
        dir
    }

    #[test]
    fn every_faction_runs_once_per_turn() {
        let dir = scenario_dir();
        let game =
            GameScenario::load(dir.path(), GlobalStrings::defaults()).expect("scenario");
        let script = dir.path().join("faction.lua");
        fs::write(
            &script,
            "function runFactionAi(faction, scenario)\n\
             faction.setAiTags(\"visited\")\nend\n",
        )
        .expect("write script");

        let report = run_turn(&game, &script);
        assert_eq!(
            report,
            TurnReport {
                factions_run: 2,
                script_failures: 0,
            }
        );
        for id in [1, 2] {
            let faction = game.factions().get_by_id(ObjectId(id)).expect("faction");
            assert_eq!(faction.borrow().ai_tags(), "visited");
        }
    }

    #[test]
    fn one_failing_script_does_not_stop_the_turn() {
        let dir = scenario_dir();
        let game =
            GameScenario::load(dir.path(), GlobalStrings::defaults()).expect("scenario");
        let script = dir.path().join("faction.lua");
        fs::write(
            &script,
            "function runFactionAi(faction, scenario)\n\
             if faction.name == \"Wei\" then error(\"wei refuses\") end\n\
             faction.setAiTags(\"visited\")\nend\n",
        )
        .expect("write script");

        let report = run_turn(&game, &script);
        assert_eq!(report.factions_run, 2);
        assert_eq!(report.script_failures, 1);
        let shu = game.factions().get_by_id(ObjectId(2)).expect("shu");
        assert_eq!(shu.borrow().ai_tags(), "visited");
    }

    #[test]
    fn missing_script_counts_a_failure_for_each_faction() {
        let dir = scenario_dir();
        let game =
            GameScenario::load(dir.path(), GlobalStrings::defaults()).expect("scenario");
        let report = run_turn(&game, &dir.path().join("absent.lua"));
        assert_eq!(report.factions_run, 2);
        assert_eq!(report.script_failures, 2);
    }
}
