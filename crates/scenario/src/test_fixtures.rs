//! Small Three-Kingdoms save used across the crate's tests. The files use
//! the default header strings so that load→save comparisons can match the
//! originals byte for byte.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use crate::scenario::GameScenario;
use crate::strings::GlobalStrings;

pub const FACTIONS: &str = "\
Id,AiTags,Name,Color,LeaderId
1,,Wei,4285563904,2
2,,Shu,2864429055,-1
";

// Xiahou Dun leads Wei by explicit id even though Cao Cao ranks higher;
// Shu's sentinel leader column exercises the auto-pick (Guan Yu, id 4).
pub const PERSONS: &str = "\
Id,AiTags,Name,FactionId,LocationId,Command,Strength,Intelligence,Politics,Glamour
1,,Cao Cao,1,1,96,72,91,94,96
2,,Xiahou Dun,1,1,89,90,70,60,72
3,,Liu Bei,2,2,72,68,74,85,95
4,,Guan Yu,2,2,95,97,75,62,93
5,,Zhang Fei,2,2,85,98,64,30,60
6,,Sima Hui,-1,-1,20,10,95,70,80
";

pub const ARCHITECTURES: &str = "\
Id,AiTags,Name,FactionId,Population,Fund,Food,Agriculture,Commerce
1,,Xu Chang,1,200000,15000,300000,4500.0,5200.5
2,,Cheng Du,2,150000,12000,250000,6000.0,3100.0
3,,Jiang Xia,-1,80000,4000,90000,2000.5,1500.0
";

pub const TROOPS: &str = "\
Id,AiTags,Name,FactionId,AnimationId,Quantity,Morale,Combativity,X,Y
1,,Wei Vanguard,1,1,8000,80,75,10,4
2,,Shu Guard,2,2,5000,90,85,3,12
";

pub const TROOP_ANIMATIONS: &str = "\
Id,Name,FileName,FrameCount,IdleFrame,SpriteSize
1,Infantry,infantry.png,8,2,64
2,Cavalry,cavalry.png,12,0,96
";

pub fn write_fixture(dir: &Path) {
    fs::write(dir.join("Faction.csv"), FACTIONS).expect("write factions");
    fs::write(dir.join("Person.csv"), PERSONS).expect("write persons");
    fs::write(dir.join("Architecture.csv"), ARCHITECTURES).expect("write architectures");
    fs::write(dir.join("Troop.csv"), TROOPS).expect("write troops");
    fs::write(dir.join("TroopAnimation.csv"), TROOP_ANIMATIONS).expect("write animations");
}

pub fn fixture_dir() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    write_fixture(dir.path());
    dir
}

pub fn load_scenario() -> (TempDir, GameScenario) {
    let dir = fixture_dir();
    let scenario =
        GameScenario::load(dir.path(), GlobalStrings::defaults()).expect("fixture scenario");
    (dir, scenario)
}
