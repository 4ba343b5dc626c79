use std::sync::{Arc, Mutex};

use chunked_ecs::{
    CommandBuffer, EcsConfig, EcsError, Phase, Result, Schedule, System, SystemAccess,
    SystemScheduler, World,
};

#[derive(Default, Clone)]
struct Log(Arc<Mutex<Vec<&'static str>>>);

impl Log {
    fn record(&self, name: &'static str) {
        self.0.lock().unwrap().push(name);
    }
    fn snapshot(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }
}

struct Named {
    name: &'static str,
    phase: Phase,
    run_after: Vec<&'static str>,
    log: Log,
}

impl System for Named {
    fn name(&self) -> &'static str {
        self.name
    }
    fn phase(&self) -> Phase {
        self.phase
    }
    fn run_after(&self) -> &[&'static str] {
        &self.run_after
    }
    fn access(&self) -> SystemAccess {
        SystemAccess::empty()
    }
    fn run(&mut self, _world: &World, _commands: &mut CommandBuffer) -> Result<()> {
        self.log.record(self.name);
        Ok(())
    }
}

#[test]
fn phases_run_in_fixed_order_regardless_of_registration_order() {
    let log = Log::default();
    let mut scheduler = SystemScheduler::new(Schedule::new());
    scheduler.add_system(Box::new(Named {
        name: "late",
        phase: Phase::LateUpdate,
        run_after: vec![],
        log: log.clone(),
    }));
    scheduler.add_system(Box::new(Named {
        name: "early",
        phase: Phase::EarlyUpdate,
        run_after: vec![],
        log: log.clone(),
    }));
    scheduler.add_system(Box::new(Named {
        name: "mid",
        phase: Phase::Update,
        run_after: vec![],
        log: log.clone(),
    }));

    let world = World::new(EcsConfig::default());
    scheduler.run(&world).unwrap();

    assert_eq!(log.snapshot(), vec!["early", "mid", "late"]);
}

#[test]
fn explicit_run_after_orders_systems_within_a_phase() {
    let log = Log::default();
    let mut scheduler = SystemScheduler::new(Schedule::new());
    scheduler.add_system(Box::new(Named {
        name: "second",
        phase: Phase::Update,
        run_after: vec!["first"],
        log: log.clone(),
    }));
    scheduler.add_system(Box::new(Named {
        name: "first",
        phase: Phase::Update,
        run_after: vec![],
        log: log.clone(),
    }));

    let world = World::new(EcsConfig::default());
    scheduler.run(&world).unwrap();

    assert_eq!(log.snapshot(), vec!["first", "second"]);
}

#[test]
fn a_run_after_cycle_fails_registration() {
    let log = Log::default();
    let mut scheduler = SystemScheduler::new(Schedule::new());
    scheduler.add_system(Box::new(Named {
        name: "a",
        phase: Phase::Update,
        run_after: vec!["b"],
        log: log.clone(),
    }));
    scheduler.add_system(Box::new(Named {
        name: "b",
        phase: Phase::Update,
        run_after: vec!["a"],
        log: log.clone(),
    }));

    let world = World::new(EcsConfig::default());
    let err = scheduler.run(&world).unwrap_err();
    assert!(matches!(err, EcsError::SystemCycleDetected));
}

struct FailingSystem;
impl System for FailingSystem {
    fn name(&self) -> &'static str {
        "failing"
    }
    fn access(&self) -> SystemAccess {
        SystemAccess::empty()
    }
    fn run(&mut self, _world: &World, _commands: &mut CommandBuffer) -> Result<()> {
        Err(EcsError::EntityNotFound)
    }
}

#[test]
fn a_faulting_system_does_not_stop_the_rest_of_the_phase_but_the_phase_reports_an_error() {
    let log = Log::default();
    let mut scheduler = SystemScheduler::new(Schedule::new());
    scheduler.add_system(Box::new(FailingSystem));
    scheduler.add_system(Box::new(Named {
        name: "sibling",
        phase: Phase::Update,
        run_after: vec![],
        log: log.clone(),
    }));

    let world = World::new(EcsConfig::default());
    let result = scheduler.run(&world);

    assert!(result.is_err());
    assert_eq!(log.snapshot(), vec!["sibling"]);
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Marker;

struct Despawner(chunked_ecs::EntityId);
impl System for Despawner {
    fn name(&self) -> &'static str {
        "despawner"
    }
    fn access(&self) -> SystemAccess {
        SystemAccess::empty()
    }
    fn run(&mut self, _world: &World, commands: &mut CommandBuffer) -> Result<()> {
        commands.despawn(self.0);
        Ok(())
    }
}

struct Observer {
    target: chunked_ecs::EntityId,
    saw_alive: Arc<Mutex<bool>>,
}
impl System for Observer {
    fn name(&self) -> &'static str {
        "observer"
    }
    fn access(&self) -> SystemAccess {
        SystemAccess::empty()
    }
    fn run(&mut self, world: &World, _commands: &mut CommandBuffer) -> Result<()> {
        *self.saw_alive.lock().unwrap() = world.is_alive(self.target);
        Ok(())
    }
}

#[test]
fn a_level_is_a_barrier_siblings_never_see_a_mid_level_despawn() {
    let world = World::new(EcsConfig::default());
    let e = world.spawn((Marker,)).unwrap();
    let saw_alive = Arc::new(Mutex::new(false));

    let mut scheduler = SystemScheduler::new(Schedule::new());
    scheduler.add_system(Box::new(Despawner(e)));
    scheduler.add_system(Box::new(Observer {
        target: e,
        saw_alive: saw_alive.clone(),
    }));

    scheduler.run(&world).unwrap();

    assert!(
        *saw_alive.lock().unwrap(),
        "observer ran in the same level as the despawn, before the post-level flush"
    );
    assert!(!world.is_alive(e), "despawn applies once the level completes");
}
