use std::time::Duration;

use battle_content::{ContentFactory, CueTable};
use battle_core::{
    AgentId, BattleConfig, BattleEvent, CombatState, Combatant, CueSpec, ExitReason, Side, Tick,
    Tier, TriggerType, Vec2, tags,
};
use battle_runtime::{BattleRuntime, Event, RuntimeError, SimAgent, Topic, logging};
use tokio::sync::broadcast;

const PLAYER: AgentId = AgentId::PLAYER;
const GOBLIN: AgentId = AgentId(1);

fn cues() -> CueTable {
    CueTable::new()
        .with_universal(CueSpec::new("battle_theme", 10, 1.0))
        .with_prototype("goblin", CueSpec::new("goblin_drums", 1, 0.8))
}

fn player() -> SimAgent {
    SimAgent::new(PLAYER, Side::Player, Vec2::ZERO).with_prototype("hero")
}

fn goblin(x: f32) -> SimAgent {
    SimAgent::new(GOBLIN, Side::Enemy, Vec2::new(x, 0.0))
        .with_prototype("goblin")
        .with_hp(30.0)
}

fn runtime(agents: Vec<SimAgent>) -> BattleRuntime {
    logging::init_tracing();
    agents
        .into_iter()
        .fold(BattleRuntime::builder().cues(cues()), |builder, agent| {
            builder.agent(agent)
        })
        .build()
        .expect("runtime builds")
}

fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<BattleEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event.battle);
    }
    events
}

#[test]
fn mutual_sighting_starts_a_battle() {
    let mut rt = runtime(vec![player(), goblin(5.0)]);
    let mut session_rx = rt.subscribe(Topic::Session);
    let mut membership_rx = rt.subscribe(Topic::Membership);

    let summary = rt.step();
    assert_eq!(summary.started.len(), 1);
    let id = summary.started[0];

    let session = rt.manager().session(id).expect("active");
    assert_eq!(session.trigger_type(), TriggerType::Standoff);
    assert_eq!(session.field_radius(), 10.0);
    assert_eq!(session.field_center(), Vec2::new(2.5, 0.0));

    assert!(matches!(
        drain(&mut session_rx).as_slice(),
        [BattleEvent::BattleStarted { session, trigger_agent, .. }] if *session == id && *trigger_agent == PLAYER
    ));
    assert_eq!(drain(&mut membership_rx).len(), 2);

    assert!(rt.mixer().is_playing("battle_theme"));
    assert!(rt.mixer().is_playing("goblin_drums"));
    assert_eq!(rt.mixer().dominant().map(|c| c.clip.as_str()), Some("battle_theme"));
    assert_eq!(rt.mixer().marker_count(), 1);

    let hero = rt.world().agent(PLAYER).unwrap();
    assert_eq!(hero.combat_state(), CombatState::Battle);
}

#[test]
fn killing_the_last_enemy_ends_the_battle() {
    let mut rt = runtime(vec![player(), goblin(5.0)]);
    let mut observer_rx = rt.subscribe(Topic::Observer);
    let id = rt.step().started[0];

    for _ in 0..3 {
        assert_eq!(rt.attack(PLAYER, GOBLIN, 10.0).unwrap(), id);
    }
    assert!(rt.world().agent(GOBLIN).unwrap().is_dead());
    let session = rt.manager().session(id).unwrap();
    assert_eq!(session.ledger_entry(PLAYER, GOBLIN), Some(-30.0));

    let summary = rt.step();
    assert_eq!(summary.died, 1);
    assert_eq!(summary.finished, vec![id]);
    assert_eq!(
        drain(&mut observer_rx),
        vec![BattleEvent::ObserverKillEnemy {
            session: id,
            agent: GOBLIN
        }]
    );

    assert!(rt.manager().session(id).is_none());
    assert!(rt.manager().completed_session(id).is_some());
    assert_eq!(rt.mixer().playing_count(), 0);
    assert_eq!(rt.mixer().marker_count(), 0);
    assert_eq!(rt.world().agent(GOBLIN).unwrap().record().deaths, 1);
    assert_eq!(rt.world().agent(PLAYER).unwrap().record().finishes, 1);
}

#[test]
fn striking_a_bystander_starts_a_sneak_attack() {
    let villager = AgentId(7);
    let mut rt = runtime(vec![
        player(),
        SimAgent::new(villager, Side::Neutral, Vec2::new(1.0, 1.0)).with_prototype("villager"),
    ]);

    let id = rt.attack(PLAYER, villager, 15.0).unwrap();

    let target = rt.world().agent(villager).unwrap();
    assert_eq!(target.side(), Side::Enemy);
    assert_eq!(target.hp(), 85.0);
    assert_eq!(target.record().sneak_attacked, 1);
    assert_eq!(rt.world().agent(PLAYER).unwrap().record().sneak_attacks, 1);

    let session = rt.manager().session(id).unwrap();
    assert_eq!(session.trigger_type(), TriggerType::SneakAttack);
    assert_eq!(session.ledger().size(), 2);
    assert_eq!(session.ledger_entry(PLAYER, villager), Some(-15.0));
}

#[test]
fn refused_hit_leaves_target_unharmed() {
    let ally = AgentId(4);
    let mut rt = runtime(vec![
        player(),
        SimAgent::new(ally, Side::Player, Vec2::new(1.0, 0.0)),
    ]);

    let err = rt.attack(PLAYER, ally, 10.0).unwrap_err();
    assert!(matches!(err, RuntimeError::Battle(_)));
    assert!(err.is_recoverable());
    assert_eq!(rt.world().agent(ally).unwrap().hp(), SimAgent::DEFAULT_HP);

    assert!(matches!(
        rt.attack(PLAYER, AgentId(99), 1.0),
        Err(RuntimeError::UnknownAgent { agent }) if agent == AgentId(99)
    ));
}

#[test]
fn wounded_enemy_flees_and_battle_ends() {
    let mut rt = runtime(vec![
        player(),
        SimAgent::new(GOBLIN, Side::Enemy, Vec2::new(3.0, 0.0))
            .with_prototype("goblin")
            .flees_below(0.5),
    ]);
    let mut membership_rx = rt.subscribe(Topic::Membership);
    let id = rt.step().started[0];

    rt.attack(PLAYER, GOBLIN, 60.0).unwrap();
    let summary = rt.step();
    assert!(summary.finished.is_empty(), "goblin decides to flee this step");
    assert_eq!(
        rt.world().agent(GOBLIN).unwrap().combat_state(),
        CombatState::Warning
    );

    let summary = rt.step();
    assert_eq!(summary.escaped, 1);
    assert_eq!(summary.finished, vec![id]);
    assert!(summary.started.is_empty(), "a fleeing goblin is not re-engaged");
    assert!(drain(&mut membership_rx).contains(&BattleEvent::CharacterExitBattle {
        session: id,
        agent: GOBLIN,
        reason: ExitReason::Escaped
    }));
}

#[test]
fn boss_arrival_escalates_the_session() {
    let boss = AgentId(9);
    let mut rt = runtime(vec![
        player(),
        goblin(4.0),
        SimAgent::new(boss, Side::Enemy, Vec2::new(30.0, 0.0))
            .with_prototype("ogre")
            .with_tag(tags::BOSS),
    ]);
    let mut session_rx = rt.subscribe(Topic::Session);
    let id = rt.step().started[0];
    assert_eq!(rt.manager().session(id).unwrap().tier(), Tier::Easy);

    // the boss wanders into the field already on alert
    let ogre = rt.world_mut().agent_mut(boss).unwrap();
    ogre.move_to(Vec2::new(6.0, 2.0));
    ogre.set_combat_state(CombatState::Warning);

    let summary = rt.step();
    assert_eq!(summary.joined, 1);
    assert_eq!(rt.manager().session(id).unwrap().tier(), Tier::Hard);
    assert!(drain(&mut session_rx).contains(&BattleEvent::BattleLevelUpgraded {
        session: id,
        from: Tier::Easy,
        to: Tier::Hard
    }));
}

#[test]
fn content_directory_configures_the_runtime() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "minimum_field_radius = 4.0\nfield_margin = 1.0\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("cues.ron"),
        r#"(
            universal: Some((clip: "arena", priority: 3)),
            prototypes: { "goblin": (clip: "drums") },
        )"#,
    )
    .unwrap();

    let mut rt = BattleRuntime::builder()
        .content(&ContentFactory::new(dir.path()))
        .unwrap()
        .agent(player())
        .agent(goblin(6.0))
        .build()
        .unwrap();

    let id = rt.step().started[0];
    assert_eq!(rt.manager().config().minimum_field_radius, 4.0);
    assert_eq!(rt.manager().session(id).unwrap().field_radius(), 4.0);
    assert!(rt.mixer().is_playing("arena"));
    assert!(rt.mixer().is_playing("drums"));
}

#[test]
fn missing_cue_table_is_a_content_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let result = BattleRuntime::builder().content(&ContentFactory::new(dir.path()));
    assert!(matches!(result, Err(RuntimeError::Content(_))));
}

#[test]
fn headless_runtime_binds_no_audio() {
    let mut rt = BattleRuntime::builder()
        .battle_config(BattleConfig::new().with_observer(None))
        .cues(cues())
        .agent(player())
        .agent(goblin(5.0))
        .build()
        .unwrap();

    let id = rt.step().started[0];
    assert!(!rt.manager().is_observer_active_in_session(id));
    assert_eq!(rt.mixer().playing_count(), 0);
}

#[test]
fn shutdown_completes_independent_battles() {
    let mut rt = runtime(vec![
        player(),
        goblin(5.0),
        SimAgent::new(AgentId(5), Side::Player, Vec2::new(100.0, 0.0)),
        SimAgent::new(AgentId(6), Side::Enemy, Vec2::new(104.0, 0.0)),
    ]);
    let mut session_rx = rt.subscribe(Topic::Session);

    assert_eq!(rt.step().started.len(), 2);
    assert_eq!(rt.manager().registry().active_len(), 2);

    assert_eq!(rt.shutdown(), 2);
    assert_eq!(rt.manager().registry().active_len(), 0);
    let finished = drain(&mut session_rx)
        .into_iter()
        .filter(|e| matches!(e, BattleEvent::BattleFinished { .. }))
        .count();
    assert_eq!(finished, 2);
    assert_eq!(rt.mixer().playing_count(), 0);
}

#[tokio::test]
async fn fixed_step_loop_runs_until_the_battle_ends() {
    let mut rt = runtime(vec![
        player(),
        SimAgent::new(GOBLIN, Side::Enemy, Vec2::new(2.0, 0.0))
            .with_prototype("goblin")
            .flees_below(0.5),
    ]);
    let id = rt.attack(PLAYER, GOBLIN, 60.0).unwrap();

    let steps = rt
        .run_until(Duration::from_millis(1), |summary| summary.finished.contains(&id))
        .await
        .unwrap();
    assert_eq!(steps, 2);
    assert_eq!(rt.manager().clock(), Tick(2));
    assert!(rt.manager().completed_session(id).is_some());
}

#[tokio::test]
async fn fixed_step_loop_counts_steps() {
    let mut rt = runtime(vec![player()]);
    let summaries = rt.run_steps(Duration::from_millis(1), 3).await.unwrap();
    let ticks: Vec<_> = summaries.iter().map(|s| s.tick).collect();
    assert_eq!(ticks, vec![Tick(1), Tick(2), Tick(3)]);

    assert!(matches!(
        rt.run_steps(Duration::ZERO, 1).await,
        Err(RuntimeError::ZeroPeriod)
    ));
}
