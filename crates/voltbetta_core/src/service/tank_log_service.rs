//! Tank log use-case service.

use super::{found, read_back, ServiceResult};
use crate::model::tank_log::TankLog;
use crate::model::RecordId;
use crate::repo::tank_log_repo::TankLogRepository;

const ENTITY: &str = "tank log";

pub struct TankLogService<R: TankLogRepository> {
    repo: R,
}

impl<R: TankLogRepository> TankLogService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Persists a new entry and returns the stored copy.
    pub fn create_log(&self, log: &TankLog) -> ServiceResult<TankLog> {
        let id = self.repo.create_log(log)?;
        read_back(self.repo.get_log(id)?, "created tank log not found in read-back")
    }

    pub fn update_log(&self, log: &TankLog) -> ServiceResult<()> {
        Ok(self.repo.update_log(log)?)
    }

    pub fn delete_log(&self, id: RecordId) -> ServiceResult<()> {
        Ok(self.repo.delete_log(id)?)
    }

    pub fn get_log(&self, id: RecordId) -> ServiceResult<TankLog> {
        found(self.repo.get_log(id)?, ENTITY, id)
    }

    pub fn list_logs(&self) -> ServiceResult<Vec<TankLog>> {
        Ok(self.repo.list_logs()?)
    }
}
