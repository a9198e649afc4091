//! Tests driving a ship against mocked name and crew collaborators.

use glam::Vec2;
use mockall::mock;
use mockall::predicate::eq;
use ship_overlay::{
    CrewId, CrewRegistry, FrameContext, IconSet, OverlayConfig, RetainedBackend, Rgb,
    ShipDescriptor, ShipNames, SpawnError, TrackedShip, UpdateOutcome,
};
use test_utils::{memory_with, ship_ahead, viewer};

mock! {
    pub Names {}
    impl ShipNames for Names {
        fn lookup(&self, raw_kind: &str) -> Option<ShipDescriptor>;
    }
}

mock! {
    pub Crews {}
    impl CrewRegistry for Crews {
        fn color_of(&self, crew: CrewId) -> Option<Rgb>;
    }
}

#[test]
fn custom_name_drives_label_and_variant() {
    let mut names = MockNames::new();
    names
        .expect_lookup()
        .with(eq("BP_CustomHull_C"))
        .times(1)
        .returning(|_| Some(ShipDescriptor::from_display_name("Brig Raider (Near)")));
    let mut crews = MockCrews::new();
    crews
        .expect_color_of()
        .with(eq(CrewId(7)))
        .returning(|_| Some(Rgb::new(0, 0, 255)));

    let image = ship_ahead(0x10_0000, 1, "BP_CustomHull_C", 250.0).with_crew(CrewId(7));
    let memory = memory_with(&[image.clone()]);
    let config = OverlayConfig::default();
    let mut backend = RetainedBackend::new();
    let mut ctx = FrameContext {
        memory: &memory,
        crews: &crews,
        backend: &mut backend,
        config: &config,
    };

    let mut ship = TrackedShip::spawn(
        image.sighting(),
        &names,
        &IconSet::default(),
        &viewer(),
        &mut ctx,
    )
    .expect("custom hull should spawn");
    assert_eq!(ship.update(&viewer(), &mut ctx), UpdateOutcome::Visible);

    let visuals = ship.visuals().expect("visuals live");
    assert_eq!(visuals.text(), "Brig Raider (Near) - 250m");
    assert_eq!(visuals.color(), Rgb::new(0, 0, 255));
    assert_eq!(visuals.marker_position(), Vec2::new(487.5, 387.5));
    ship.dispose(&mut backend);
    assert_eq!(backend.live_count(), 0);
}

#[test]
fn unknown_kind_never_touches_crews_or_backend() {
    let mut names = MockNames::new();
    names.expect_lookup().returning(|_| None);
    let mut crews = MockCrews::new();
    crews.expect_color_of().never();

    let image = ship_ahead(0x10_0000, 1, "BP_Barrel_C", 100.0);
    let memory = memory_with(&[image.clone()]);
    let config = OverlayConfig::default();
    let mut backend = RetainedBackend::new();
    let mut ctx = FrameContext {
        memory: &memory,
        crews: &crews,
        backend: &mut backend,
        config: &config,
    };

    let result = TrackedShip::spawn(
        image.sighting(),
        &names,
        &IconSet::default(),
        &viewer(),
        &mut ctx,
    );
    assert!(matches!(result, Err(SpawnError::UnknownKind(kind)) if kind == "BP_Barrel_C"));
    assert_eq!(backend.created_count(), 0);
}

#[test]
fn unreadable_actor_fails_to_spawn() {
    let mut names = MockNames::new();
    names
        .expect_lookup()
        .returning(|_| Some(ShipDescriptor::from_display_name("Sloop (Near)")));
    let crews = MockCrews::new();

    let image = ship_ahead(0x10_0000, 1, "BP_SmallShipTemplate_C", 100.0);
    let memory = memory_with(&[]);
    let config = OverlayConfig::default();
    let mut backend = RetainedBackend::new();
    let mut ctx = FrameContext {
        memory: &memory,
        crews: &crews,
        backend: &mut backend,
        config: &config,
    };

    let result = TrackedShip::spawn(
        image.sighting(),
        &names,
        &IconSet::default(),
        &viewer(),
        &mut ctx,
    );
    assert!(matches!(result, Err(SpawnError::Access(_))));
    assert_eq!(backend.created_count(), 0);
}
