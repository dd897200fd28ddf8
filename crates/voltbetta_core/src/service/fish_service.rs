//! Fish profile service.

use super::{found, ServiceResult};
use crate::model::fish::{FishProfile, DEFAULT_FISH_ID};
use crate::model::RecordId;
use crate::repo::fish_repo::FishRepository;

const ENTITY: &str = "fish profile";

pub struct FishService<R: FishRepository> {
    repo: R,
}

impl<R: FishRepository> FishService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn get_profile(&self, id: RecordId) -> ServiceResult<FishProfile> {
        found(self.repo.get_profile(id)?, ENTITY, id)
    }

    /// The seeded single-fish profile.
    pub fn default_profile(&self) -> ServiceResult<FishProfile> {
        self.get_profile(DEFAULT_FISH_ID)
    }

    pub fn list_profiles(&self) -> ServiceResult<Vec<FishProfile>> {
        Ok(self.repo.list_profiles()?)
    }

    pub fn update_profile(&self, profile: &FishProfile) -> ServiceResult<()> {
        Ok(self.repo.update_profile(profile)?)
    }
}
