//! Bundled scenarios and end-to-end runs against stub engines.

use std::path::PathBuf;

use battle_core::og::OgUnit;
use battle_core::BattleEngine;
use battle_sim::{run_batch, BatchConfig, Scenario, UnitSource};

fn scenario_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(name)
}

#[test]
fn test_og_example_matches_builtin() {
    let loaded = Scenario::load(scenario_path("og_example.ron")).unwrap();
    let builtin = Scenario::og_example().unwrap();

    assert_eq!(loaded.units, UnitSource::Og);
    assert_eq!(loaded.attackers, builtin.attackers);
    assert_eq!(loaded.defenders, builtin.defenders);
    assert_eq!(loaded.engine, builtin.engine);
    assert_eq!(loaded.defenders[0].unit_count(OgUnit::DeathStar.kind()), 250);
}

#[test]
fn test_custom_skirmish_builds_registry() {
    let scenario = Scenario::load(scenario_path("custom_skirmish.ron")).unwrap();
    let registry = scenario.registry().unwrap();

    assert_eq!(registry.len(), 3);
    assert_eq!(scenario.defenders.len(), 2);
    assert_eq!(scenario.engine.timeout_secs, Some(60));
    assert_eq!(scenario.units.names().name(battle_core::registry::UnitKind::new(2)), "Carrier");
}

#[cfg(unix)]
mod stub_engine {
    use battle_core::protocol::ResponseShape;
    use battle_core::BattleError;
    use battle_test_utils::fixtures::idle_output;
    use battle_test_utils::stub::StubEngine;

    use super::*;

    #[test]
    fn test_batch_over_stub_engine() {
        let scenario = Scenario::load(scenario_path("custom_skirmish.ron")).unwrap();
        let shape = ResponseShape::new(3, 1, 2);
        let stub = StubEngine::printing(&idle_output(shape, 2, 1)).unwrap();

        let mut engine_config = scenario.engine.clone();
        engine_config.path = stub.path().to_path_buf();
        let engine = BattleEngine::new(scenario.registry().unwrap(), engine_config.process_engine());

        let results = run_batch(
            &engine,
            &scenario.attackers,
            &scenario.defenders,
            BatchConfig::new(3).with_seed(10),
        )
        .unwrap();

        assert_eq!(results.summary.num_simulations, 3);
        assert_eq!(results.summary.mean_rounds, 2.0);
        assert_eq!(results.summary.wins.draws, 3);
        assert_eq!(results.summary.attackers[0].kinds.len(), 2);
        assert_eq!(results.summary.defenders[1].kinds[0].remaining.max, 1);
    }

    #[test]
    fn test_batch_with_failing_engine() {
        let scenario = Scenario::load(scenario_path("custom_skirmish.ron")).unwrap();
        let stub = StubEngine::new("cat > /dev/null\necho 'engine offline' >&2\nexit 2").unwrap();
        let engine = BattleEngine::with_binary(stub.path(), scenario.registry().unwrap());

        let err = run_batch(
            &engine,
            &scenario.attackers,
            &scenario.defenders,
            BatchConfig::new(2),
        )
        .unwrap_err();
        assert!(matches!(err, BattleError::Engine(ref msg) if msg == "engine offline\n"));
    }
}
