//! Treatment plan use-case service.
//!
//! # Responsibility
//! - CRUD over plans.
//! - Diary, symptom and lifecycle operations, each a load/mutate/persist step.
//!
//! # Invariants
//! - A closed plan (completed or discontinued) keeps accepting diary entries
//!   and symptom updates; only its status and `ended_at` are frozen by close.

use super::{found, read_back, ServiceResult};
use crate::model::treatment::{SymptomSeverity, TreatmentPlan};
use crate::model::RecordId;
use crate::repo::treatment_repo::TreatmentRepository;
use chrono::{DateTime, Utc};
use log::info;

const ENTITY: &str = "treatment plan";

pub struct TreatmentService<R: TreatmentRepository> {
    repo: R,
}

impl<R: TreatmentRepository> TreatmentService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_plan(&self, plan: &TreatmentPlan) -> ServiceResult<TreatmentPlan> {
        let id = self.repo.create_plan(plan)?;
        read_back(self.repo.get_plan(id)?, "created plan not found in read-back")
    }

    pub fn update_plan(&self, plan: &TreatmentPlan) -> ServiceResult<()> {
        Ok(self.repo.update_plan(plan)?)
    }

    pub fn delete_plan(&self, id: RecordId) -> ServiceResult<()> {
        Ok(self.repo.delete_plan(id)?)
    }

    pub fn get_plan(&self, id: RecordId) -> ServiceResult<TreatmentPlan> {
        found(self.repo.get_plan(id)?, ENTITY, id)
    }

    pub fn list_plans(&self) -> ServiceResult<Vec<TreatmentPlan>> {
        Ok(self.repo.list_plans()?)
    }

    fn modify(
        &self,
        id: RecordId,
        change: impl FnOnce(&mut TreatmentPlan) -> ServiceResult<()>,
    ) -> ServiceResult<TreatmentPlan> {
        let mut plan = self.get_plan(id)?;
        change(&mut plan)?;
        self.repo.update_plan(&plan)?;
        Ok(plan)
    }

    pub fn add_log(
        &self,
        id: RecordId,
        actions: &str,
        notes: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<TreatmentPlan> {
        self.modify(id, |plan| {
            plan.add_log(now, actions, notes);
            Ok(())
        })
    }

    pub fn add_symptom(
        &self,
        id: RecordId,
        name: &str,
        severity: SymptomSeverity,
        now: DateTime<Utc>,
    ) -> ServiceResult<TreatmentPlan> {
        self.modify(id, |plan| {
            plan.add_symptom(name, severity, now);
            Ok(())
        })
    }

    /// Records a new severity for the symptom at `index`.
    pub fn update_symptom(
        &self,
        id: RecordId,
        index: usize,
        severity: SymptomSeverity,
        notes: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<TreatmentPlan> {
        self.modify(id, |plan| {
            plan.update_symptom_severity(index, severity, notes, now)?;
            Ok(())
        })
    }

    pub fn complete(
        &self,
        id: RecordId,
        outcome: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<TreatmentPlan> {
        let plan = self.modify(id, |plan| {
            plan.complete(outcome, now);
            Ok(())
        })?;
        info!("event=treatment_close module=service status=ok outcome=completed");
        Ok(plan)
    }

    pub fn discontinue(
        &self,
        id: RecordId,
        reason: &str,
        now: DateTime<Utc>,
    ) -> ServiceResult<TreatmentPlan> {
        let plan = self.modify(id, |plan| {
            plan.discontinue(reason, now);
            Ok(())
        })?;
        info!("event=treatment_close module=service status=ok outcome=discontinued");
        Ok(plan)
    }

    /// Links `photo_id` to plan `id`; linking twice is a no-op.
    pub fn attach_photo(&self, id: RecordId, photo_id: RecordId) -> ServiceResult<TreatmentPlan> {
        self.modify(id, |plan| {
            plan.attach_photo(photo_id);
            Ok(())
        })
    }

    /// Unlinks `photo_id` from plan `id`; unlinking an absent id is a no-op.
    pub fn detach_photo(&self, id: RecordId, photo_id: RecordId) -> ServiceResult<TreatmentPlan> {
        self.modify(id, |plan| {
            plan.detach_photo(photo_id);
            Ok(())
        })
    }
}
