use std::sync::Arc;

use combat_content::{ConfigLoader, ContentFactory, EffectCatalogLoader};
use combat_core::{
    Ability, ActionEffect, CombatEvent, CombatSession, CombatState, Combatant, EffectCatalog,
    EffectTarget, SequenceRng, Side,
};

fn shipped() -> ContentFactory {
    ContentFactory::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data"))
}

#[test]
fn shipped_directory_matches_embedded_copies() {
    let factory = shipped();
    assert_eq!(factory.load_config().unwrap(), ConfigLoader::bundled().unwrap());
    assert_eq!(factory.load_catalog().unwrap(), EffectCatalogLoader::bundled().unwrap());
}

#[test]
fn electrocution_stuns_the_opponent_inside_a_session() {
    let factory = shipped();
    let catalog: Arc<dyn EffectCatalog> = Arc::new(factory.load_catalog().unwrap());
    let config = factory.load_config().unwrap();

    let mage = Combatant::builder("mage", "Mage", Arc::clone(&catalog))
        .max_health(60)
        .attack(8)
        .speed(10)
        .ability(
            Ability::new("soak", "Soak", 0)
                .with_effect(ActionEffect::apply_to(EffectTarget::Opponent, "wet")),
        )
        .ability(
            Ability::new("zap", "Zap", 0)
                .with_effect(ActionEffect::apply_to(EffectTarget::Opponent, "shock")),
        )
        .build();
    let dummy = Combatant::builder("dummy", "Training Dummy", Arc::clone(&catalog))
        .max_health(500)
        .attack(1)
        .build();

    let mut rng = SequenceRng::constant(0.5);
    let mut session = CombatSession::start(mage, dummy, config, &mut rng);
    assert_eq!(session.current_actor(), Side::Player);

    session.use_ability("soak", &mut rng).unwrap();
    let report = session.use_ability("zap", &mut rng).unwrap();

    assert_eq!(report.state, CombatState::InCombat);
    assert!(report.events.iter().any(|event| matches!(
        event,
        CombatEvent::ComboTriggered { rule, .. } if rule == "Electrocution"
    )));
    assert!(report.events.iter().any(|event| matches!(
        event,
        CombatEvent::TurnSkipped { side: Side::Opponent }
    )));
    assert!(report.opponent.health < 500);
    assert!(report.messages().any(|line| line.contains("stunned")));
}
