use bevy::prelude::*;
use bevy::tasks::{AsyncComputeTaskPool, TaskPool};
use crossbeam::channel::{Receiver, Sender, unbounded};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

use super::error::RegistryError;
use super::loader::{ContentLoader, LoadCompletion};
use super::record::{ObjectContent, ObjectHandle, VirtualObjectRecord};
use crate::engine::placement::AnchorId;

/// What to do when a loader completes the same object twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateCompletionPolicy {
    /// Panic immediately.
    FailFast,
    /// Log at error level and return `DuplicateCompletion` to the caller.
    LogAndIgnore,
}

impl Default for DuplicateCompletionPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::FailFast
        } else {
            Self::LogAndIgnore
        }
    }
}

/// Result of applying a load completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The record moved from pending to ready.
    Ready,
    /// The record was removed before its load finished; content dropped.
    Discarded,
}

/// Owner of every placed virtual object.
///
/// All mutation goes through `&mut self`, so within the ECS the collection has
/// a single writer: the chained frame systems. Background loads only reach it
/// through the completion channel, which is drained by [`Self::drain_completions`].
#[derive(Resource)]
pub struct ObjectRegistry {
    records: Vec<VirtualObjectRecord>,
    next_handle: u64,
    loader: Arc<dyn ContentLoader>,
    completions_tx: Sender<LoadCompletion>,
    completions_rx: Receiver<LoadCompletion>,
    duplicate_policy: DuplicateCompletionPolicy,
    /// New records start hidden while set, e.g. during a session interruption.
    hide_new: bool,
}

impl ObjectRegistry {
    pub fn new(loader: Arc<dyn ContentLoader>, duplicate_policy: DuplicateCompletionPolicy) -> Self {
        let (completions_tx, completions_rx) = unbounded();
        Self {
            records: Vec::new(),
            next_handle: 0,
            loader,
            completions_tx,
            completions_rx,
            duplicate_policy,
            hide_new: false,
        }
    }

    /// Create a pending record and start loading its content in the background.
    /// Returns without waiting for the load.
    pub fn request_placement(&mut self, template_id: &str) -> ObjectHandle {
        let handle = ObjectHandle::from_raw(self.next_handle);
        self.next_handle += 1;
        let mut record = VirtualObjectRecord::pending(handle, template_id);
        record.set_hidden(self.hide_new);
        self.records.push(record);

        let loader = Arc::clone(&self.loader);
        let completions = self.completions_tx.clone();
        let template = template_id.to_string();

        AsyncComputeTaskPool::get_or_init(TaskPool::new)
            .spawn(async move {
                let result = loader.load(&template);
                // The receiver lives in the registry; if it is gone there is nobody to tell.
                let _ = completions.send(LoadCompletion { handle, result });
            })
            .detach();

        info!("Requested placement of '{}' as {}", template_id, handle);
        handle
    }

    /// Apply every completion that has arrived since the last call.
    /// Returns the handles that became ready, in arrival order.
    pub fn drain_completions(&mut self) -> Vec<ObjectHandle> {
        let arrived: Vec<LoadCompletion> = self.completions_rx.try_iter().collect();
        let mut ready = Vec::new();

        for LoadCompletion { handle, result } in arrived {
            match result {
                Ok(content) => match self.on_load_complete(handle, content) {
                    Ok(CompletionOutcome::Ready) => ready.push(handle),
                    Ok(CompletionOutcome::Discarded) => {}
                    Err(err) => error!("Rejected load completion: {}", err),
                },
                Err(err) => {
                    warn!("Content for {} failed to load, object stays pending: {}", handle, err);
                }
            }
        }

        ready
    }

    /// Mark `handle` ready with its loaded content.
    ///
    /// A completion for an object that was issued and then removed is dropped
    /// silently. A handle this registry never issued is `UnknownHandle`.
    pub fn on_load_complete(
        &mut self,
        handle: ObjectHandle,
        content: ObjectContent,
    ) -> Result<CompletionOutcome, RegistryError> {
        let Some(record) = self.records.iter_mut().find(|r| r.handle() == handle) else {
            if handle.id() < self.next_handle {
                debug!("Late completion for removed {}, content discarded", handle);
                return Ok(CompletionOutcome::Discarded);
            }
            return Err(RegistryError::UnknownHandle(handle));
        };

        if record.is_ready() {
            let err = RegistryError::DuplicateCompletion(handle);
            match self.duplicate_policy {
                DuplicateCompletionPolicy::FailFast => panic!("{}", err),
                DuplicateCompletionPolicy::LogAndIgnore => {
                    error!("{}", err);
                    return Err(err);
                }
            }
        }

        record.mark_ready(content);
        debug!("{} ready", handle);
        Ok(CompletionOutcome::Ready)
    }

    /// Bind a ready object to a pose and an anchor.
    pub fn attach(
        &mut self,
        handle: ObjectHandle,
        pose: Transform,
        anchor: AnchorId,
    ) -> Result<(), RegistryError> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.handle() == handle)
            .ok_or(RegistryError::UnknownHandle(handle))?;

        if !record.is_ready() {
            return Err(RegistryError::NotReady(handle));
        }

        record.bind(pose, anchor);
        Ok(())
    }

    /// Update the pose of every object bound to `anchor`.
    /// Returns how many records moved; zero for anchors with nothing bound.
    pub fn sync_pose(&mut self, anchor: AnchorId, pose: Transform) -> usize {
        let mut updated = 0;
        for record in self
            .records
            .iter_mut()
            .filter(|r| r.anchor() == Some(anchor))
        {
            record.set_pose(pose);
            updated += 1;
        }
        updated
    }

    /// Remove one object. Unknown or already removed handles are a no-op.
    pub fn remove(&mut self, handle: ObjectHandle) -> Option<VirtualObjectRecord> {
        let index = self.records.iter().position(|r| r.handle() == handle)?;
        Some(self.records.remove(index))
    }

    /// Remove every object bound to `anchor`, last inserted first.
    pub fn remove_bound_to(&mut self, anchor: AnchorId) -> Vec<VirtualObjectRecord> {
        let mut removed = Vec::new();
        for index in (0..self.records.len()).rev() {
            if self.records[index].anchor() == Some(anchor) {
                removed.push(self.records.remove(index));
            }
        }
        removed
    }

    /// Remove every object, walking from the last inserted to the first so
    /// earlier indices stay valid while removing.
    pub fn remove_all(&mut self) -> Vec<VirtualObjectRecord> {
        let mut removed = Vec::with_capacity(self.records.len());
        for index in (0..self.records.len()).rev() {
            removed.push(self.records.remove(index));
        }
        removed
    }

    /// Ready objects the frustum predicate accepts. Hidden state is left to
    /// the predicate.
    pub fn visible_set(
        &self,
        in_frustum: impl Fn(&VirtualObjectRecord) -> bool,
    ) -> BTreeSet<ObjectHandle> {
        self.records
            .iter()
            .filter(|r| r.is_ready())
            .filter(|r| in_frustum(*r))
            .map(|r| r.handle())
            .collect()
    }

    /// Hide or show every record, including ones requested from now on.
    pub fn set_all_hidden(&mut self, hidden: bool) {
        self.hide_new = hidden;
        for record in &mut self.records {
            record.set_hidden(hidden);
        }
    }

    pub fn get(&self, handle: ObjectHandle) -> Option<&VirtualObjectRecord> {
        self.records.iter().find(|r| r.handle() == handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VirtualObjectRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::objects::loader::LoadError;
    use crate::engine::objects::record::LoadStatus;
    use std::time::Duration;

    struct FixedLoader;

    impl ContentLoader for FixedLoader {
        fn load(&self, template_id: &str) -> Result<ObjectContent, LoadError> {
            if template_id == "missing" {
                return Err(LoadError::UnknownTemplate(template_id.to_string()));
            }
            Ok(content(template_id))
        }
    }

    fn content(template_id: &str) -> ObjectContent {
        ObjectContent {
            template_id: template_id.to_string(),
            scene_path: format!("models/{template_id}.scn"),
            size: Vec3::ONE,
        }
    }

    fn registry(policy: DuplicateCompletionPolicy) -> ObjectRegistry {
        ObjectRegistry::new(Arc::new(FixedLoader), policy)
    }

    fn drain_until(registry: &mut ObjectRegistry, expected: usize) -> Vec<ObjectHandle> {
        let mut ready = Vec::new();
        for _ in 0..400 {
            ready.extend(registry.drain_completions());
            if ready.len() >= expected {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        ready
    }

    #[test]
    fn placement_request_returns_pending_record() {
        let mut registry = registry(DuplicateCompletionPolicy::LogAndIgnore);
        let h1 = registry.request_placement("car");
        let h2 = registry.request_placement("car");

        assert_ne!(h1, h2);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(h1).unwrap().status(), LoadStatus::Pending);
        assert_eq!(registry.get(h1).unwrap().template_id(), "car");
    }

    #[test]
    fn background_load_completes_through_drain() {
        let mut registry = registry(DuplicateCompletionPolicy::LogAndIgnore);
        let h1 = registry.request_placement("car");
        let h2 = registry.request_placement("lamp");

        let mut ready = drain_until(&mut registry, 2);
        ready.sort();
        assert_eq!(ready, vec![h1, h2]);
        assert_eq!(
            registry.get(h2).unwrap().content().unwrap().scene_path,
            "models/lamp.scn"
        );
    }

    #[test]
    fn failed_load_leaves_record_pending() {
        let mut registry = registry(DuplicateCompletionPolicy::LogAndIgnore);
        let missing = registry.request_placement("missing");
        let car = registry.request_placement("car");

        assert_eq!(drain_until(&mut registry, 1), vec![car]);
        assert_eq!(registry.get(missing).unwrap().status(), LoadStatus::Pending);
    }

    #[test]
    fn completion_moves_exactly_one_record_to_ready() {
        let mut registry = registry(DuplicateCompletionPolicy::LogAndIgnore);
        let h1 = registry.request_placement("car");
        let h2 = registry.request_placement("car");

        assert_eq!(
            registry.on_load_complete(h1, content("car")),
            Ok(CompletionOutcome::Ready)
        );
        assert!(registry.get(h1).unwrap().is_ready());
        assert!(!registry.get(h2).unwrap().is_ready());
    }

    #[test]
    fn second_completion_is_rejected() {
        let mut registry = registry(DuplicateCompletionPolicy::LogAndIgnore);
        let h1 = registry.request_placement("car");

        registry.on_load_complete(h1, content("car")).unwrap();
        assert_eq!(
            registry.on_load_complete(h1, content("car")),
            Err(RegistryError::DuplicateCompletion(h1))
        );
    }

    #[test]
    #[should_panic(expected = "load completion delivered twice")]
    fn second_completion_fails_fast_when_configured() {
        let mut registry = registry(DuplicateCompletionPolicy::FailFast);
        let h1 = registry.request_placement("car");

        registry.on_load_complete(h1, content("car")).unwrap();
        let _ = registry.on_load_complete(h1, content("car"));
    }

    #[test]
    fn completion_for_never_issued_handle_is_unknown() {
        let mut registry = registry(DuplicateCompletionPolicy::LogAndIgnore);
        let forged = ObjectHandle::from_raw(42);
        assert_eq!(
            registry.on_load_complete(forged, content("car")),
            Err(RegistryError::UnknownHandle(forged))
        );
    }

    #[test]
    fn late_completion_after_removal_is_discarded() {
        let mut registry = registry(DuplicateCompletionPolicy::LogAndIgnore);
        let h1 = registry.request_placement("car");
        assert!(registry.remove(h1).is_some());

        assert_eq!(
            registry.on_load_complete(h1, content("car")),
            Ok(CompletionOutcome::Discarded)
        );
        assert!(registry.is_empty());
        assert!(drain_until(&mut registry, 1).is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn attach_requires_ready_record() {
        let mut registry = registry(DuplicateCompletionPolicy::LogAndIgnore);
        let h1 = registry.request_placement("car");
        let pose = Transform::from_xyz(0.5, 0.0, -2.0);

        assert_eq!(
            registry.attach(h1, pose, AnchorId(1)),
            Err(RegistryError::NotReady(h1))
        );

        registry.on_load_complete(h1, content("car")).unwrap();
        registry.attach(h1, pose, AnchorId(1)).unwrap();

        let record = registry.get(h1).unwrap();
        assert_eq!(record.anchor(), Some(AnchorId(1)));
        assert_eq!(record.pose(), Some(&pose));
    }

    #[test]
    fn attach_to_unknown_handle_is_reported() {
        let mut registry = registry(DuplicateCompletionPolicy::LogAndIgnore);
        let h1 = registry.request_placement("car");
        registry.remove(h1);

        assert_eq!(
            registry.attach(h1, Transform::IDENTITY, AnchorId(1)),
            Err(RegistryError::UnknownHandle(h1))
        );
    }

    #[test]
    fn sync_pose_moves_only_bound_records() {
        let mut registry = registry(DuplicateCompletionPolicy::LogAndIgnore);
        let h1 = registry.request_placement("car");
        let h2 = registry.request_placement("car");
        for handle in [h1, h2] {
            registry.on_load_complete(handle, content("car")).unwrap();
        }
        registry.attach(h1, Transform::IDENTITY, AnchorId(1)).unwrap();
        registry.attach(h2, Transform::IDENTITY, AnchorId(2)).unwrap();

        let moved = Transform::from_xyz(1.0, 0.0, 0.0);
        assert_eq!(registry.sync_pose(AnchorId(1), moved), 1);
        assert_eq!(registry.get(h1).unwrap().pose(), Some(&moved));
        assert_eq!(registry.get(h2).unwrap().pose(), Some(&Transform::IDENTITY));

        // Plane anchors have nothing bound.
        assert_eq!(registry.sync_pose(AnchorId(99), moved), 0);
    }

    #[test]
    fn remove_twice_is_a_no_op() {
        let mut registry = registry(DuplicateCompletionPolicy::LogAndIgnore);
        let h1 = registry.request_placement("car");

        assert!(registry.remove(h1).is_some());
        assert!(registry.remove(h1).is_none());
        assert!(registry.remove(ObjectHandle::from_raw(500)).is_none());
    }

    #[test]
    fn remove_all_releases_each_record_once_in_reverse_order() {
        let mut registry = registry(DuplicateCompletionPolicy::LogAndIgnore);
        let h1 = registry.request_placement("car");
        let h2 = registry.request_placement("car");
        let h3 = registry.request_placement("car");

        let released: Vec<ObjectHandle> = registry
            .remove_all()
            .iter()
            .map(|record| record.handle())
            .collect();

        assert_eq!(released, vec![h3, h2, h1]);
        assert!(registry.is_empty());
        assert!(registry.remove_all().is_empty());
    }

    #[test]
    fn remove_all_empties_any_size() {
        for n in [0, 1, 5, 17] {
            let mut registry = registry(DuplicateCompletionPolicy::LogAndIgnore);
            for _ in 0..n {
                registry.request_placement("car");
            }
            let removed = registry.remove_all();
            let unique: BTreeSet<ObjectHandle> = removed.iter().map(|r| r.handle()).collect();
            assert_eq!(removed.len(), n);
            assert_eq!(unique.len(), n);
            assert!(registry.is_empty());
        }
    }

    #[test]
    fn remove_bound_to_drops_records_on_lost_anchor() {
        let mut registry = registry(DuplicateCompletionPolicy::LogAndIgnore);
        let h1 = registry.request_placement("car");
        let h2 = registry.request_placement("car");
        for handle in [h1, h2] {
            registry.on_load_complete(handle, content("car")).unwrap();
        }
        registry.attach(h2, Transform::IDENTITY, AnchorId(4)).unwrap();

        let removed = registry.remove_bound_to(AnchorId(4));
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].handle(), h2);
        assert!(registry.get(h1).is_some());
        assert!(registry.remove_bound_to(AnchorId(4)).is_empty());
    }

    #[test]
    fn visible_set_filters_pending_and_out_of_view() {
        let mut registry = registry(DuplicateCompletionPolicy::LogAndIgnore);
        let near = registry.request_placement("car");
        let far = registry.request_placement("car");
        let pending = registry.request_placement("car");
        for handle in [near, far] {
            registry.on_load_complete(handle, content("car")).unwrap();
        }
        registry.attach(near, Transform::from_xyz(0.0, 0.0, -1.0), AnchorId(1)).unwrap();
        registry.attach(far, Transform::from_xyz(0.0, 0.0, -50.0), AnchorId(2)).unwrap();

        let in_view = |record: &VirtualObjectRecord| {
            record.pose().is_some_and(|pose| pose.translation.length() < 10.0)
        };

        let visible = registry.visible_set(in_view);
        assert_eq!(visible, BTreeSet::from([near]));
        assert!(!visible.contains(&pending));

        registry.set_all_hidden(true);
        assert_eq!(registry.visible_set(in_view), BTreeSet::from([near]));
        assert!(
            registry
                .visible_set(|record| !record.is_hidden() && in_view(record))
                .is_empty()
        );
        assert_eq!(registry.visible_set(|_| true), BTreeSet::from([near, far]));
    }

    #[test]
    fn records_requested_while_hidden_start_hidden() {
        let mut registry = registry(DuplicateCompletionPolicy::LogAndIgnore);
        let before = registry.request_placement("car");
        registry.set_all_hidden(true);
        let during = registry.request_placement("car");

        assert!(registry.get(before).unwrap().is_hidden());
        assert!(registry.get(during).unwrap().is_hidden());

        registry.set_all_hidden(false);
        let after = registry.request_placement("car");
        assert!(!registry.get(during).unwrap().is_hidden());
        assert!(!registry.get(after).unwrap().is_hidden());
    }
}
