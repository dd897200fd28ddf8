//! Plant use-case service, including the issue tracker.

use super::{found, read_back, ServiceResult};
use crate::model::plant::{IssueSeverity, Plant};
use crate::model::RecordId;
use crate::repo::plant_repo::PlantRepository;
use chrono::{DateTime, Utc};

const ENTITY: &str = "plant";

pub struct PlantService<R: PlantRepository> {
    repo: R,
}

impl<R: PlantRepository> PlantService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_plant(&self, plant: &Plant) -> ServiceResult<Plant> {
        let id = self.repo.create_plant(plant)?;
        read_back(self.repo.get_plant(id)?, "created plant not found in read-back")
    }

    pub fn update_plant(&self, plant: &Plant) -> ServiceResult<()> {
        Ok(self.repo.update_plant(plant)?)
    }

    pub fn delete_plant(&self, id: RecordId) -> ServiceResult<()> {
        Ok(self.repo.delete_plant(id)?)
    }

    pub fn get_plant(&self, id: RecordId) -> ServiceResult<Plant> {
        found(self.repo.get_plant(id)?, ENTITY, id)
    }

    pub fn list_plants(&self) -> ServiceResult<Vec<Plant>> {
        Ok(self.repo.list_plants()?)
    }

    /// Records a new unresolved issue on plant `id`.
    pub fn add_issue(
        &self,
        id: RecordId,
        description: &str,
        severity: IssueSeverity,
        now: DateTime<Utc>,
    ) -> ServiceResult<Plant> {
        let mut plant = self.get_plant(id)?;
        plant.add_issue(description, severity, now);
        self.repo.update_plant(&plant)?;
        Ok(plant)
    }

    /// Resolves the issue at `index`; an unknown index is a validation error.
    pub fn resolve_issue(
        &self,
        id: RecordId,
        index: usize,
        notes: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<Plant> {
        let mut plant = self.get_plant(id)?;
        plant.resolve_issue(index, now, notes)?;
        self.repo.update_plant(&plant)?;
        Ok(plant)
    }
}
