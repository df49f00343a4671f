use std::collections::HashSet;
use std::path::PathBuf;

use scout_terminal::locate::locate;
use scout_terminal::per90::{INSUFFICIENT_PLAYING_TIME, Per90Block};
use scout_terminal::percentile::ReferenceScope;
use scout_terminal::population::{PlayerRecord, Population, Stat, load_population};
use scout_terminal::profile::build_profile;
use scout_terminal::rating::{INSUFFICIENT_DATA, NO_STRENGTH, NO_WEAKNESS};

fn fixture_population() -> Population {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("players_sample.csv");
    load_population(&path).expect("fixture should load")
}

#[test]
fn forward_profile_end_to_end() {
    let population = fixture_population();
    let alpha = locate(&population, "alpha", Some("arsenal")).expect("fixture row");
    let profile = build_profile(&population, alpha.record);

    assert_eq!(profile.personal_info.age, Some(25));
    assert_eq!(profile.base_stats.minutes, 2520);
    assert_eq!(profile.base_stats.goals, 20);
    assert_eq!(profile.composite_rating, 64.3);
    assert_eq!(profile.style, "Finisher");
    assert_eq!(
        profile.strengths,
        vec!["Finishing", "Shot quality", "Advanced receptions"]
    );
    assert_eq!(profile.weaknesses, vec![NO_WEAKNESS]);
    assert_eq!(profile.reference.scope, ReferenceScope::SamePosition);
    assert_eq!(profile.activity_zones.attack, 30);
    assert_eq!(profile.performance.defensive_contribution, 30);

    let rates = profile.per_90.rates().expect("has minutes");
    assert_eq!(rates.goals_per_90, 0.71);
    assert_eq!(rates.xg_per_90, 0.66);
}

#[test]
fn zero_minutes_marks_the_whole_per90_block() {
    let population = fixture_population();
    let bench = locate(&population, "November Bench", None).expect("fixture row");
    let profile = build_profile(&population, bench.record);

    assert!(profile.per_90.is_insufficient());
    let json = serde_json::to_value(&profile).expect("serializes");
    assert_eq!(json["per_90"]["insufficient_data"], true);
    assert_eq!(json["per_90"]["message"], INSUFFICIENT_PLAYING_TIME);
    assert!(json["per_90"].get("goals_per_90").is_none());

    // All zeros sit at the shared minimum.
    assert!(profile.percentiles.iter().all(|(_, pct)| pct == 0.0));
    assert_eq!(profile.composite_rating, 0.0);
    assert_eq!(profile.strengths, vec![NO_STRENGTH]);
    assert_eq!(profile.weaknesses.len(), 7);
}

#[test]
fn midfielder_with_small_position_group_uses_full_table() {
    let population = fixture_population();
    let golf = locate(&population, "Golf Pivot", None).expect("fixture row");
    let profile = build_profile(&population, golf.record);
    assert_eq!(profile.reference.scope, ReferenceScope::FullPopulation);
    assert_eq!(profile.reference.size, population.len());
    assert_eq!(profile.style, "Versatile midfielder");
    assert_eq!(profile.performance.consistency, 100.0);
}

#[test]
fn compound_position_prefers_defensive_tables() {
    let population = fixture_population();
    let smith = locate(&population, "Alex Smith", Some("Chelsea")).expect("fixture row");
    assert_eq!(smith.match_count, 1);
    let profile = build_profile(&population, smith.record);
    assert_eq!(profile.style, "Solid defender");
    assert_eq!(profile.activity_zones.defence, 50);
    assert_eq!(profile.performance.defensive_contribution, 85);
}

#[test]
fn no_statistics_gives_neutral_rating() {
    let population = fixture_population();
    let blank = PlayerRecord::new("Blank Slate", "Nowhere", "MF").with_playing_time(5, 5, 450);
    let profile = build_profile(&population, &blank);
    assert!(profile.percentiles.is_empty());
    assert_eq!(profile.composite_rating, 50.0);
    assert_eq!(profile.strengths, vec![INSUFFICIENT_DATA]);
    assert_eq!(profile.weaknesses, vec![INSUFFICIENT_DATA]);
    match profile.per_90 {
        Per90Block::Rates(rates) => assert_eq!(rates.goals_per_90, 0.0),
        Per90Block::Insufficient(_) => panic!("has minutes"),
    }
}

#[test]
fn strengths_and_weaknesses_never_overlap() {
    let population = fixture_population();
    for record in population.iter() {
        let profile = build_profile(&population, record);
        let strengths: HashSet<&String> = profile.strengths.iter().collect();
        assert!(
            profile.weaknesses.iter().all(|w| !strengths.contains(w)),
            "{} overlaps",
            record.name
        );
        for (_, pct) in profile.percentiles.iter() {
            assert!((0.0..=100.0).contains(&pct));
        }
    }
}

#[test]
fn profile_json_shape() {
    let population = fixture_population();
    let keeper = locate(&population, "keeper", None).expect("fixture row");
    let json = serde_json::to_value(build_profile(&population, keeper.record)).expect("serializes");

    for key in [
        "personal_info",
        "base_stats",
        "advanced_stats",
        "per_90",
        "performance",
        "percentiles",
        "reference",
        "composite_rating",
        "style",
        "strengths",
        "weaknesses",
        "activity_zones",
    ] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    assert_eq!(json["style"], "Shot-stopper");
    assert_eq!(json["reference"]["scope"], "full_population");
    assert_eq!(json["activity_zones"]["central_midfield"], 30);
    assert!(json["percentiles"].get("Gls").is_some());
    assert_eq!(json["advanced_stats"]["xa"], 0.1);
}

#[test]
fn record_outside_population_is_profiled() {
    let population = Population::empty();
    let visitor = PlayerRecord::new("Visitor", "Away", "FW")
        .with_playing_time(3, 3, 270)
        .with_stat(Stat::Goals, 3.0);
    let profile = build_profile(&population, &visitor);
    assert_eq!(profile.composite_rating, 50.0);
    assert_eq!(profile.reference.size, 0);
    assert_eq!(profile.per_90.rates().map(|r| r.goals_per_90), Some(1.0));
}
