use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use combat_content::EffectCatalogLoader;
use combat_core::{
    ActionEffect, Attributes, CombatAction, CombatError, CombatItem, CombatState, Combatant,
    EffectCatalog, RewardTrigger, Side, Tier,
};
use combat_runtime::{
    CombatantRepository, EncounterError, EncounterOutcome, EncounterRegistry,
    InMemoryCombatantRepo, Loot, LootProducer, PlayerRecord, RegistryConfig, RepositoryError,
    TierLootTable,
};

#[derive(Default)]
struct CountingLoot {
    calls: AtomicUsize,
}

impl LootProducer for CountingLoot {
    fn produce(&self, trigger: &RewardTrigger) -> Loot {
        self.calls.fetch_add(1, Ordering::SeqCst);
        TierLootTable::default().produce(trigger)
    }
}

/// Fails the first outcome write, then delegates.
struct FailOnceRepo {
    inner: InMemoryCombatantRepo,
    failed: AtomicBool,
}

impl CombatantRepository for FailOnceRepo {
    fn load_player(&self, player_id: &str) -> Result<Option<PlayerRecord>, RepositoryError> {
        self.inner.load_player(player_id)
    }

    fn record_outcome(&self, outcome: &EncounterOutcome) -> Result<(), RepositoryError> {
        if !self.failed.swap(true, Ordering::SeqCst) {
            return Err(RepositoryError::Storage("disk full".into()));
        }
        self.inner.record_outcome(outcome)
    }
}

fn catalog() -> Arc<dyn EffectCatalog> {
    Arc::new(EffectCatalogLoader::bundled().expect("bundled catalog loads"))
}

fn alice(id: &str) -> PlayerRecord {
    PlayerRecord::new(
        id,
        "Alice",
        100,
        Attributes {
            attack: 200,
            defense: 5,
            speed: 10,
            magic: 0,
        },
    )
    .with_item(CombatItem::new("potion", "Potion", 1).with_effect(ActionEffect::Heal(20)))
}

fn goblin(catalog: &Arc<dyn EffectCatalog>, max_health: u32) -> Combatant {
    Combatant::builder("goblin", "Goblin", Arc::clone(catalog))
        .side(Side::Opponent)
        .max_health(max_health)
        .attack(1)
        .speed(0)
        .build()
}

struct Fixture {
    catalog: Arc<dyn EffectCatalog>,
    repo: Arc<InMemoryCombatantRepo>,
    loot: Arc<CountingLoot>,
    registry: EncounterRegistry,
}

fn fixture(config: RegistryConfig, players: &[&str]) -> Fixture {
    let catalog = catalog();
    let repo = Arc::new(InMemoryCombatantRepo::with_players(
        players.iter().map(|id| alice(id)),
    ));
    let loot = Arc::new(CountingLoot::default());
    let registry = EncounterRegistry::new(
        config,
        Arc::clone(&catalog),
        repo.clone(),
        loot.clone(),
    );
    Fixture {
        catalog,
        repo,
        loot,
        registry,
    }
}

#[test]
fn victory_is_settled_exactly_once() {
    let fx = fixture(RegistryConfig::default(), &["alice"]);

    let opened = fx
        .registry
        .begin("alice", goblin(&fx.catalog, 10), 1)
        .unwrap();
    assert_eq!(opened.report.state, CombatState::InCombat);
    assert_eq!(opened.report.current_actor, Side::Player);
    assert!(opened.loot.is_none());

    let finished = fx.registry.act("alice", CombatAction::Attack).unwrap();
    assert_eq!(finished.report.state, CombatState::Victory);
    assert_eq!(finished.loot, Some(TierLootTable::default().normal));
    assert_eq!(fx.loot.calls.load(Ordering::SeqCst), 1);

    assert!(!fx.registry.is_active("alice").unwrap());
    assert!(matches!(
        fx.registry.act("alice", CombatAction::Attack),
        Err(EncounterError::NotFound(_))
    ));
    assert_eq!(fx.loot.calls.load(Ordering::SeqCst), 1);

    let outcomes = fx.repo.outcomes().unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].state, CombatState::Victory);
    assert_eq!(outcomes[0].opponent_id, "goblin");
}

#[test]
fn defeat_during_the_opening_settles_inside_begin() {
    let fx = fixture(RegistryConfig::default(), &[]);
    fx.repo
        .insert(PlayerRecord::new("bob", "Bob", 5, Attributes::default()))
        .unwrap();

    let ogre = Combatant::builder("ogre", "Ogre", Arc::clone(&fx.catalog))
        .tier(Tier::Elite)
        .max_health(500)
        .attack(200)
        .speed(100)
        .build();

    let update = fx.registry.begin("bob", ogre, 9).unwrap();
    assert_eq!(update.report.state, CombatState::Defeat);
    assert!(update.loot.is_none());
    assert!(!fx.registry.is_active("bob").unwrap());
    assert_eq!(fx.loot.calls.load(Ordering::SeqCst), 0);

    let stored = fx.repo.load_player("bob").unwrap().unwrap();
    assert_eq!(stored.health, 0);
}

#[test]
fn unknown_player_cannot_begin() {
    let fx = fixture(RegistryConfig::default(), &[]);
    let err = fx
        .registry
        .begin("nobody", goblin(&fx.catalog, 10), 1)
        .unwrap_err();
    assert!(matches!(err, EncounterError::UnknownPlayer(id) if id == "nobody"));
}

#[test]
fn one_encounter_per_player() {
    let fx = fixture(RegistryConfig::default(), &["alice"]);
    fx.registry
        .begin("alice", goblin(&fx.catalog, 10_000), 1)
        .unwrap();

    let err = fx
        .registry
        .begin("alice", goblin(&fx.catalog, 10), 2)
        .unwrap_err();
    assert!(matches!(err, EncounterError::AlreadyInEncounter(_)));
    assert_eq!(fx.registry.active_count().unwrap(), 1);
}

#[test]
fn rejected_action_leaves_the_encounter_untouched() {
    let fx = fixture(RegistryConfig::default(), &["alice"]);
    fx.registry
        .begin("alice", goblin(&fx.catalog, 10_000), 3)
        .unwrap();
    let before = fx.registry.report("alice").unwrap();

    let err = fx
        .registry
        .act("alice", CombatAction::ability("fireball"))
        .unwrap_err();
    assert!(matches!(
        err,
        EncounterError::Combat(CombatError::UnknownAbility(_))
    ));
    assert_eq!(fx.registry.report("alice").unwrap().log, before.log);
    assert!(fx.registry.is_active("alice").unwrap());
}

#[test]
fn spent_items_and_health_are_persisted() {
    let fx = fixture(RegistryConfig::default(), &["alice"]);
    fx.registry
        .begin("alice", goblin(&fx.catalog, 10), 4)
        .unwrap();

    let after_potion = fx
        .registry
        .act("alice", CombatAction::item("potion"))
        .unwrap();
    assert_eq!(after_potion.report.state, CombatState::InCombat);

    let finished = fx.registry.act("alice", CombatAction::Attack).unwrap();
    assert_eq!(finished.report.state, CombatState::Victory);

    let stored = fx.repo.load_player("alice").unwrap().unwrap();
    assert!(stored.health < 100);
    assert_eq!(stored.items[0].quantity, 0);
}

#[test]
fn expired_encounter_is_discarded_without_settling() {
    let config = RegistryConfig::default().with_time_limit(Duration::ZERO);
    let fx = fixture(config, &["alice"]);
    fx.registry
        .begin("alice", goblin(&fx.catalog, 10), 5)
        .unwrap();

    let err = fx.registry.act("alice", CombatAction::Attack).unwrap_err();
    assert!(matches!(err, EncounterError::Expired { .. }));
    assert!(!fx.registry.is_active("alice").unwrap());
    assert!(fx.repo.outcomes().unwrap().is_empty());
    assert_eq!(fx.loot.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn sweep_removes_only_stale_encounters() {
    let config = RegistryConfig::default().with_time_limit(Duration::ZERO);
    let fx = fixture(config, &["alice", "carol"]);
    for (player, seed) in [("alice", 1), ("carol", 2)] {
        fx.registry
            .begin(player, goblin(&fx.catalog, 10_000), seed)
            .unwrap();
    }

    assert_eq!(fx.registry.expire_stale().unwrap(), vec!["alice", "carol"]);
    assert_eq!(fx.registry.active_count().unwrap(), 0);

    let fx = fixture(RegistryConfig::default().without_time_limit(), &["alice"]);
    fx.registry
        .begin("alice", goblin(&fx.catalog, 10_000), 1)
        .unwrap();
    assert!(fx.registry.expire_stale().unwrap().is_empty());
    assert!(fx.registry.is_active("alice").unwrap());
}

#[test]
fn abandon_drops_the_session() {
    let fx = fixture(RegistryConfig::default(), &["alice"]);
    fx.registry
        .begin("alice", goblin(&fx.catalog, 10_000), 6)
        .unwrap();

    assert!(fx.registry.abandon("alice").unwrap());
    assert!(!fx.registry.abandon("alice").unwrap());
    assert!(fx.repo.outcomes().unwrap().is_empty());
}

#[test]
fn same_seed_replays_the_same_fight() {
    let fx = fixture(RegistryConfig::default(), &["first", "second"]);

    let mut logs = Vec::new();
    for player in ["first", "second"] {
        fx.registry
            .begin(player, goblin(&fx.catalog, 10_000), 77)
            .unwrap();
        fx.registry.act(player, CombatAction::Attack).unwrap();
        let report = fx.registry.act(player, CombatAction::Attack).unwrap().report;
        logs.push(report.log);
    }
    assert_eq!(logs[0], logs[1]);
}

#[test]
fn players_fight_in_parallel() {
    let players: Vec<String> = (0..8).map(|i| format!("player-{i}")).collect();
    let ids: Vec<&str> = players.iter().map(String::as_str).collect();
    let fx = fixture(RegistryConfig::default(), &ids);

    std::thread::scope(|scope| {
        for (seed, player) in ids.iter().enumerate() {
            let registry = &fx.registry;
            let catalog = &fx.catalog;
            scope.spawn(move || {
                registry
                    .begin(player, goblin(catalog, 10), seed as u64)
                    .unwrap();
                let update = registry.act(player, CombatAction::Attack).unwrap();
                assert_eq!(update.report.state, CombatState::Victory);
            });
        }
    });

    assert_eq!(fx.registry.active_count().unwrap(), 0);
    assert_eq!(fx.repo.outcomes().unwrap().len(), 8);
    assert_eq!(fx.loot.calls.load(Ordering::SeqCst), 8);
}

#[test]
fn failed_outcome_write_is_retried_on_the_next_call() {
    let catalog = catalog();
    let repo = Arc::new(FailOnceRepo {
        inner: InMemoryCombatantRepo::with_players([alice("alice")]),
        failed: AtomicBool::new(false),
    });
    let loot = Arc::new(CountingLoot::default());
    let registry = EncounterRegistry::new(
        RegistryConfig::default(),
        Arc::clone(&catalog),
        repo.clone(),
        loot.clone(),
    );

    registry.begin("alice", goblin(&catalog, 10), 1).unwrap();
    let err = registry.act("alice", CombatAction::Attack).unwrap_err();
    assert!(matches!(err, EncounterError::Repository(RepositoryError::Storage(_))));
    assert!(registry.is_active("alice").unwrap());
    assert_eq!(loot.calls.load(Ordering::SeqCst), 0);
    assert!(registry.expire_stale().unwrap().is_empty());

    let retried = registry.act("alice", CombatAction::Attack).unwrap();
    assert_eq!(retried.report.state, CombatState::Victory);
    assert_eq!(retried.loot, Some(TierLootTable::default().normal));
    assert_eq!(loot.calls.load(Ordering::SeqCst), 1);
    assert!(!registry.is_active("alice").unwrap());
    assert_eq!(repo.inner.outcomes().unwrap().len(), 1);

    registry.begin("alice", goblin(&catalog, 10), 2).unwrap();
    assert!(registry.is_active("alice").unwrap());
}
