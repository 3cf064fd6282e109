use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use image_anchor_tracking::placement::IndicatorGeometry;
use image_anchor_tracking::{
    DetectedImage, ImageId, ImageRegistry, ImageTrackingObserver, LifecycleEvent, PlacementOffset,
    PoseMatrix, SceneRoot, TrackingConfig, TrackingCoordinator,
};
use nalgebra as na;

#[derive(Debug, Clone, PartialEq)]
enum Notification {
    Detected(ImageId, usize),
    Updated(ImageId, usize),
    Removed(ImageId, usize),
}

/// Records every callback together with the registry size seen at that moment.
#[derive(Default)]
struct RecordingObserver {
    notifications: Mutex<Vec<Notification>>,
    seen_names: Mutex<Vec<Option<String>>>,
}

impl RecordingObserver {
    fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

impl ImageTrackingObserver for RecordingObserver {
    fn image_detected(&self, image: &DetectedImage, registry: &ImageRegistry) {
        let stored = registry.get(&image.id).map(|i| i.name.clone());
        self.seen_names.lock().unwrap().push(stored.flatten());
        self.notifications
            .lock()
            .unwrap()
            .push(Notification::Detected(image.id, registry.len()));
    }

    fn image_updated(&self, image: &DetectedImage, registry: &ImageRegistry) {
        let stored = registry.get(&image.id).map(|i| i.name.clone());
        self.seen_names.lock().unwrap().push(stored.flatten());
        self.notifications
            .lock()
            .unwrap()
            .push(Notification::Updated(image.id, registry.len()));
    }

    fn image_removed(&self, id: &ImageId, registry: &ImageRegistry) {
        assert!(!registry.contains(id));
        self.notifications
            .lock()
            .unwrap()
            .push(Notification::Removed(*id, registry.len()));
    }
}

#[derive(Default)]
struct FakeScene {
    indicators: HashMap<ImageId, IndicatorGeometry>,
    entities: HashMap<String, Option<PoseMatrix>>,
}

impl SceneRoot for FakeScene {
    fn attach_indicator(
        &mut self,
        id: &ImageId,
        geometry: &IndicatorGeometry,
        _color: (u8, u8, u8, u8),
    ) {
        self.indicators.insert(*id, geometry.clone());
    }

    fn detach_indicator(&mut self, id: &ImageId) {
        self.indicators.remove(id);
    }

    fn place_entity(&mut self, name: &str, transform: &PoseMatrix) -> bool {
        match self.entities.get_mut(name) {
            Some(slot) => {
                *slot = Some(*transform);
                true
            }
            None => false,
        }
    }
}

fn image(id: ImageId, name: &str, translation: [f32; 3]) -> DetectedImage {
    let transform =
        na::Translation3::new(translation[0], translation[1], translation[2]).to_homogeneous();
    DetectedImage::new(id, 0.2, 0.15, transform).with_name(name)
}

#[test]
fn test_added_then_updated_keeps_one_entry() {
    let observer = Arc::new(RecordingObserver::default());
    let mut coordinator = TrackingCoordinator::new(TrackingConfig::default());
    coordinator.set_observer(&observer);

    let id = ImageId::new();
    coordinator.handle_event(LifecycleEvent::Added(image(id, "first", [1.0, 0.0, 0.0])));
    let updated = image(id, "second", [2.0, 0.5, 0.0]).with_scale_factor(0.9);
    coordinator.handle_event(LifecycleEvent::Updated(updated.clone()));

    assert_eq!(coordinator.registry().len(), 1);
    assert_eq!(coordinator.image(&id), Some(&updated));
    assert_eq!(
        observer.notifications(),
        vec![Notification::Detected(id, 1), Notification::Updated(id, 1)]
    );
    // the observer sees post-mutation state
    assert_eq!(
        *observer.seen_names.lock().unwrap(),
        vec![Some("first".to_string()), Some("second".to_string())]
    );
}

#[test]
fn test_remove_unknown_still_notifies() {
    let observer = Arc::new(RecordingObserver::default());
    let mut coordinator = TrackingCoordinator::new(TrackingConfig::default());
    coordinator.set_observer(&observer);

    let id = ImageId::new();
    coordinator.handle_event(LifecycleEvent::Removed(id));

    assert!(coordinator.registry().is_empty());
    assert_eq!(observer.notifications(), vec![Notification::Removed(id, 0)]);
}

#[test]
fn test_two_images_tracked_independently() {
    let observer = Arc::new(RecordingObserver::default());
    let mut coordinator = TrackingCoordinator::new(TrackingConfig::default());
    coordinator.set_observer(&observer);

    let a = ImageId::new();
    let b = ImageId::new();
    coordinator.handle_event(LifecycleEvent::Added(image(a, "poster", [0.0; 3])));
    coordinator.handle_event(LifecycleEvent::Added(image(b, "menu", [1.0; 3])));

    assert_eq!(coordinator.registry().len(), 2);
    assert_eq!(coordinator.image(&a).unwrap().name.as_deref(), Some("poster"));
    assert_eq!(coordinator.image(&b).unwrap().name.as_deref(), Some("menu"));
    assert_eq!(
        observer.notifications(),
        vec![Notification::Detected(a, 1), Notification::Detected(b, 2)]
    );

    coordinator.handle_event(LifecycleEvent::Removed(a));
    assert_eq!(coordinator.registry().len(), 1);
    assert!(coordinator.image(&a).is_none());
    assert_eq!(observer.notifications().last(), Some(&Notification::Removed(a, 1)));
}

#[test]
fn test_update_for_untracked_image_inserts() {
    let mut coordinator = TrackingCoordinator::new(TrackingConfig::default());
    let id = ImageId::new();
    coordinator.handle_event(LifecycleEvent::Updated(image(id, "late", [0.0; 3])));
    assert!(coordinator.registry().contains(&id));
}

#[test]
fn test_dropped_observer_is_skipped() {
    let mut coordinator = TrackingCoordinator::new(TrackingConfig::default());
    {
        let observer = Arc::new(RecordingObserver::default());
        coordinator.set_observer(&observer);
    }
    let id = ImageId::new();
    coordinator.handle_event(LifecycleEvent::Added(image(id, "orphan", [0.0; 3])));
    assert_eq!(coordinator.registry().len(), 1);
}

#[test]
fn test_observer_is_not_kept_alive() {
    let observer = Arc::new(RecordingObserver::default());
    let mut coordinator = TrackingCoordinator::new(TrackingConfig::default());
    coordinator.set_observer(&observer);
    assert_eq!(Arc::strong_count(&observer), 1);

    coordinator.clear_observer();
    coordinator.handle_event(LifecycleEvent::Removed(ImageId::new()));
    assert!(observer.notifications().is_empty());
}

#[test]
fn test_scene_indicator_lifecycle() {
    let scene = Arc::new(Mutex::new(FakeScene::default()));
    let mut coordinator = TrackingCoordinator::new(TrackingConfig::default());
    coordinator.set_scene(&scene);

    let id = ImageId::new();
    let added = image(id, "poster", [1.0, 2.0, 3.0]).with_scale_factor(2.0);
    coordinator.handle_event(LifecycleEvent::Added(added.clone()));
    {
        let scene = scene.lock().unwrap();
        let geometry = scene.indicators.get(&id).unwrap();
        assert_eq!(*geometry, coordinator.create_indicator_geometry(&added));
        assert!((geometry.width - 0.4).abs() < 1e-6);
        assert!((geometry.height - 0.3).abs() < 1e-6);
    }

    coordinator.handle_event(LifecycleEvent::Updated(image(id, "poster", [4.0, 2.0, 3.0])));
    {
        let scene = scene.lock().unwrap();
        assert!((scene.indicators[&id].center().x - 4.0).abs() < 1e-6);
    }

    coordinator.handle_event(LifecycleEvent::Removed(id));
    assert!(scene.lock().unwrap().indicators.is_empty());
}

#[test]
fn test_named_entity_placed_at_target_transform() {
    let mut fake = FakeScene::default();
    fake.entities.insert("robot".to_string(), None);
    let scene = Arc::new(Mutex::new(fake));

    let config = TrackingConfig::default()
        .with_indicator(false)
        .with_entity_to_place("robot")
        .with_placement_offset(PlacementOffset::new(-1.0, -0.5, -2.0));
    let mut coordinator = TrackingCoordinator::new(config);
    coordinator.set_scene(&scene);

    let id = ImageId::new();
    coordinator.handle_event(LifecycleEvent::Added(image(id, "target", [5.0, 3.0, 4.0])));

    let scene = scene.lock().unwrap();
    assert!(scene.indicators.is_empty());
    let placed = scene.entities["robot"].unwrap();
    assert!((placed[(0, 3)] - 4.0).abs() < 1e-3);
    assert!((placed[(1, 3)] - 2.5).abs() < 1e-3);
    assert!((placed[(2, 3)] - 2.0).abs() < 1e-3);
}

struct PanickingScene;

impl SceneRoot for PanickingScene {
    fn attach_indicator(
        &mut self,
        _id: &ImageId,
        _geometry: &IndicatorGeometry,
        _color: (u8, u8, u8, u8),
    ) {
        panic!("indicator mesh unavailable");
    }

    fn detach_indicator(&mut self, _id: &ImageId) {}

    fn place_entity(&mut self, _name: &str, _transform: &PoseMatrix) -> bool {
        false
    }
}

#[test]
fn test_poisoned_scene_is_skipped() {
    let scene = Arc::new(Mutex::new(PanickingScene));
    let observer = Arc::new(RecordingObserver::default());
    let mut coordinator = TrackingCoordinator::new(TrackingConfig::default());
    coordinator.set_scene(&scene);
    coordinator.set_observer(&observer);

    let first = ImageId::new();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        coordinator.handle_event(LifecycleEvent::Added(image(first, "first", [0.0; 3])));
    }));
    assert!(result.is_err());
    assert!(scene.is_poisoned());
    // registry was mutated before the scene side effect
    assert!(coordinator.registry().contains(&first));
    assert!(observer.notifications().is_empty());

    let second = ImageId::new();
    coordinator.handle_event(LifecycleEvent::Added(image(second, "second", [1.0; 3])));
    coordinator.handle_event(LifecycleEvent::Removed(first));

    assert_eq!(coordinator.registry().ids(), vec![second]);
    assert_eq!(
        observer.notifications(),
        vec![Notification::Detected(second, 2), Notification::Removed(first, 1)]
    );
}

#[test]
fn test_dropped_scene_is_skipped() {
    let observer = Arc::new(RecordingObserver::default());
    let mut coordinator = TrackingCoordinator::new(TrackingConfig::default());
    coordinator.set_observer(&observer);
    {
        let scene = Arc::new(Mutex::new(FakeScene::default()));
        coordinator.set_scene(&scene);
    }

    let id = ImageId::new();
    coordinator.handle_event(LifecycleEvent::Added(image(id, "poster", [0.0; 3])));
    coordinator.handle_event(LifecycleEvent::Updated(image(id, "poster", [1.0; 3])));
    assert_eq!(coordinator.registry().len(), 1);
    coordinator.handle_event(LifecycleEvent::Removed(id));

    assert!(coordinator.registry().is_empty());
    assert_eq!(
        observer.notifications(),
        vec![
            Notification::Detected(id, 1),
            Notification::Updated(id, 1),
            Notification::Removed(id, 0),
        ]
    );
}
