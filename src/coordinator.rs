use std::sync::{Arc, Mutex, Weak};

use tokio::sync::mpsc;

use crate::config::TrackingConfig;
use crate::observer::ImageTrackingObserver;
use crate::placement::{IndicatorGeometry, offset_transform};
use crate::registry::ImageRegistry;
use crate::scene::SceneRoot;
use crate::session::TrackingSession;
use crate::types::{DetectedImage, ImageId, LifecycleEvent, PoseMatrix};

type SharedScene = Mutex<dyn SceneRoot + Send>;

/// Applies lifecycle events to the registry, drives scene side effects and
/// notifies the observer.
///
/// Each event is applied to completion before the next one is looked at: registry
/// mutation first, then scene side effects, then the observer callback.
pub struct TrackingCoordinator {
    config: TrackingConfig,
    registry: ImageRegistry,
    observer: Option<Weak<dyn ImageTrackingObserver>>,
    scene: Option<Weak<SharedScene>>,
    session: Option<TrackingSession>,
}

impl TrackingCoordinator {
    pub fn new(config: TrackingConfig) -> TrackingCoordinator {
        TrackingCoordinator {
            config,
            registry: ImageRegistry::new(),
            observer: None,
            scene: None,
            session: None,
        }
    }

    pub fn config(&self) -> &TrackingConfig {
        &self.config
    }

    pub fn registry(&self) -> &ImageRegistry {
        &self.registry
    }

    pub fn image(&self, id: &ImageId) -> Option<&DetectedImage> {
        self.registry.get(id)
    }

    /// Registers the single observer, replacing any previous one.
    /// The coordinator only keeps a weak handle.
    pub fn set_observer<O>(&mut self, observer: &Arc<O>)
    where
        O: ImageTrackingObserver + 'static,
    {
        let observer: Arc<dyn ImageTrackingObserver> = observer.clone();
        self.observer = Some(Arc::downgrade(&observer));
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    pub fn set_scene<S>(&mut self, scene: &Arc<Mutex<S>>)
    where
        S: SceneRoot + Send + 'static,
    {
        let scene: Arc<SharedScene> = scene.clone();
        self.scene = Some(Arc::downgrade(&scene));
    }

    pub fn clear_scene(&mut self) {
        self.scene = None;
    }

    pub fn handle_event(&mut self, event: LifecycleEvent) {
        log::trace!("{} {}", event.kind(), event.image_id());
        match event {
            LifecycleEvent::Added(image) => {
                self.registry.upsert(image.clone());
                self.place_in_scene(&image, true);
                if let Some(observer) = self.observer() {
                    observer.image_detected(&image, &self.registry);
                }
            }
            LifecycleEvent::Updated(image) => {
                if self.registry.upsert(image.clone()) {
                    log::debug!("update for untracked image {}, inserting", image.id);
                }
                self.place_in_scene(&image, false);
                if let Some(observer) = self.observer() {
                    observer.image_updated(&image, &self.registry);
                }
            }
            LifecycleEvent::Removed(id) => {
                if self.registry.remove(&id).is_none() {
                    log::debug!("remove for untracked image {}", id);
                }
                if self.config.create_indicator_entity {
                    self.with_scene(|scene| scene.detach_indicator(&id));
                }
                if let Some(observer) = self.observer() {
                    observer.image_removed(&id, &self.registry);
                }
            }
        }
    }

    /// Pose for content attached to `image`: its transform shifted by the
    /// configured placement offset.
    pub fn target_transform(&self, image: &DetectedImage) -> PoseMatrix {
        offset_transform(&image.transform, &self.config.placement_offset)
    }

    pub fn create_indicator_geometry(&self, image: &DetectedImage) -> IndicatorGeometry {
        IndicatorGeometry::for_image(image)
    }

    /// Drains `receiver` until every sender is gone. Returns the number of events applied.
    ///
    /// Dropping the returned future between events leaves the registry consistent.
    pub async fn run(&mut self, receiver: &mut mpsc::UnboundedReceiver<LifecycleEvent>) -> usize {
        let mut processed = 0;
        while let Some(event) = receiver.recv().await {
            self.handle_event(event);
            processed += 1;
        }
        log::debug!("event stream closed after {} events", processed);
        processed
    }

    pub fn attach_session(&mut self, session: TrackingSession) {
        if self.session.is_some() {
            log::warn!("replacing active tracking session");
        }
        self.session = Some(session);
    }

    pub fn detach_session(&mut self) -> Option<TrackingSession> {
        self.session.take()
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Drains the attached session until it closes, then drops it.
    ///
    /// Without an attached session this only logs a warning and returns 0.
    pub async fn process_session_events(&mut self) -> usize {
        if self.session.is_none() {
            log::warn!("no active tracking session, nothing to process");
            return 0;
        }
        let mut processed = 0;
        loop {
            let next = match self.session.as_mut() {
                Some(session) => session.next_event().await,
                None => break,
            };
            match next {
                Some(event) => {
                    self.handle_event(event);
                    processed += 1;
                }
                None => break,
            }
        }
        self.session = None;
        log::debug!("tracking session ended after {} events", processed);
        processed
    }

    fn observer(&self) -> Option<Arc<dyn ImageTrackingObserver>> {
        self.observer.as_ref().and_then(Weak::upgrade)
    }

    fn with_scene<F>(&self, f: F)
    where
        F: FnOnce(&mut (dyn SceneRoot + Send)),
    {
        let Some(scene) = self.scene.as_ref().and_then(Weak::upgrade) else {
            log::debug!("scene dropped, skipping scene update");
            return;
        };
        match scene.lock() {
            Ok(mut guard) => f(&mut *guard),
            Err(_) => log::error!("scene lock poisoned, skipping scene update"),
        };
    }

    fn place_in_scene(&self, image: &DetectedImage, is_new: bool) {
        if self.scene.is_none() {
            return;
        }
        let create_indicator = self.config.create_indicator_entity;
        let entity_name = self.config.entity_to_place_name.as_deref();
        if !create_indicator && entity_name.is_none() {
            return;
        }
        let geometry = create_indicator.then(|| self.create_indicator_geometry(image));
        let target = self.target_transform(image);
        let color = self.config.indicator_color.to_rgba8();
        self.with_scene(|scene| {
            if let Some(geometry) = &geometry {
                scene.attach_indicator(&image.id, geometry, color);
            }
            if let Some(name) = entity_name {
                if !scene.place_entity(name, &target) && is_new {
                    log::warn!("entity {} not found in scene", name);
                }
            }
        });
    }
}
