//! Photo use-case service: image store plus photo and plan bookkeeping.
//!
//! # Responsibility
//! - Store picked image files and persist their photo records.
//! - Keep a treatment plan's `photo_ids` list in step with its photos.
//!
//! # Invariants
//! - A photo linked to a plan appears in that plan's `photo_ids` exactly once.
//! - The plan link is checked before any file is copied.
//! - Deleting a photo whose plan is already gone still succeeds.

use super::{found, read_back, ServiceError, ServiceResult};
use crate::media::ImageStore;
use crate::model::photo::FishPhoto;
use crate::model::RecordId;
use crate::repo::photo_repo::PhotoRepository;
use crate::repo::treatment_repo::TreatmentRepository;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

const ENTITY: &str = "photo";
const PLAN_ENTITY: &str = "treatment plan";

pub struct PhotoService<P: PhotoRepository, T: TreatmentRepository> {
    photos: P,
    plans: T,
    store: ImageStore,
}

impl<P: PhotoRepository, T: TreatmentRepository> PhotoService<P, T> {
    pub fn new(photos: P, plans: T, store: ImageStore) -> Self {
        Self {
            photos,
            plans,
            store,
        }
    }

    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    /// Copies `source` into the image store and records it.
    ///
    /// When `treatment_plan_id` is set the plan must exist; the new photo id
    /// is appended to its `photo_ids`.
    pub fn add_photo(
        &self,
        source: &Path,
        caption: &str,
        category: &str,
        treatment_plan_id: Option<RecordId>,
        now: DateTime<Utc>,
    ) -> ServiceResult<FishPhoto> {
        let plan = match treatment_plan_id {
            Some(plan_id) => Some(found(self.plans.get_plan(plan_id)?, PLAN_ENTITY, plan_id)?),
            None => None,
        };

        let photo = self
            .store
            .save_image(source, caption, category, treatment_plan_id, now)?;
        let id = self.photos.create_photo(&photo)?;

        if let Some(mut plan) = plan {
            if plan.attach_photo(id) {
                self.plans.update_plan(&plan)?;
            }
        }

        read_back(self.photos.get_photo(id)?, "created photo not found in read-back")
    }

    /// Persists caption/category edits and re-links the plan when it changed.
    pub fn update_photo(&self, photo: &FishPhoto) -> ServiceResult<()> {
        let id = photo.id.ok_or(ServiceError::InconsistentState(
            "photo has no id; create it first",
        ))?;
        let previous = self.get_photo(id)?;

        if let Some(plan_id) = photo.treatment_plan_id {
            found(self.plans.get_plan(plan_id)?, PLAN_ENTITY, plan_id)?;
        }
        self.photos.update_photo(photo)?;

        if previous.treatment_plan_id != photo.treatment_plan_id {
            if let Some(old_plan) = previous.treatment_plan_id {
                self.unlink(old_plan, id)?;
            }
            if let Some(new_plan) = photo.treatment_plan_id {
                self.link(new_plan, id)?;
            }
        }
        Ok(())
    }

    /// Removes the stored file, the record, and any plan link.
    pub fn delete_photo(&self, id: RecordId) -> ServiceResult<()> {
        let photo = self.get_photo(id)?;
        self.store.delete_image(&photo)?;
        self.photos.delete_photo(id)?;

        if let Some(plan_id) = photo.treatment_plan_id {
            self.unlink(plan_id, id)?;
        }
        Ok(())
    }

    pub fn get_photo(&self, id: RecordId) -> ServiceResult<FishPhoto> {
        found(self.photos.get_photo(id)?, ENTITY, id)
    }

    pub fn list_photos(&self) -> ServiceResult<Vec<FishPhoto>> {
        Ok(self.photos.list_photos()?)
    }

    pub fn list_for_treatment(&self, plan_id: RecordId) -> ServiceResult<Vec<FishPhoto>> {
        Ok(self.photos.list_for_treatment(plan_id)?)
    }

    /// Path of the cached thumbnail for photo `id`, generated on demand.
    pub fn thumbnail(&self, id: RecordId) -> ServiceResult<PathBuf> {
        let photo = self.get_photo(id)?;
        Ok(self.store.thumbnail(&photo)?)
    }

    fn link(&self, plan_id: RecordId, photo_id: RecordId) -> ServiceResult<()> {
        let mut plan = found(self.plans.get_plan(plan_id)?, PLAN_ENTITY, plan_id)?;
        if plan.attach_photo(photo_id) {
            self.plans.update_plan(&plan)?;
        }
        Ok(())
    }

    fn unlink(&self, plan_id: RecordId, photo_id: RecordId) -> ServiceResult<()> {
        let Some(mut plan) = self.plans.get_plan(plan_id)? else {
            return Ok(());
        };
        if plan.detach_photo(photo_id) {
            self.plans.update_plan(&plan)?;
        }
        Ok(())
    }
}
