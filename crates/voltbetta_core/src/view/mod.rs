//! In-memory view state for list/detail screens.
//!
//! # Responsibility
//! - Hold one record collection with its selection, edit draft and filter.
//! - Derive the visible list through a single filter/sort pass.
//!
//! # Invariants
//! - State changes only through `ViewState::apply`.
//! - `selected` always names an item present in `items`, or is `None`.
//! - A draft exists only while an item is selected.
//! - `visible()` never mutates state; the same state yields the same list.

use crate::model::fish::FishProfile;
use crate::model::maintenance::MaintenanceTask;
use crate::model::note::Note;
use crate::model::photo::FishPhoto;
use crate::model::plant::Plant;
use crate::model::tank_log::TankLog;
use crate::model::treatment::TreatmentPlan;
use crate::model::RecordId;
use std::cmp::Ordering;

pub mod filters;

pub use filters::{
    distinct_log_categories, distinct_note_tags, distinct_photo_categories, NoteFilter,
    PhotoFilter, PlantFilter, TankLogFilter, TaskFilter, TreatmentFilter,
};

/// Record that can be addressed by its store id.
pub trait Identified {
    fn record_id(&self) -> Option<RecordId>;
}

macro_rules! identified {
    ($($ty:ty),+ $(,)?) => {
        $(impl Identified for $ty {
            fn record_id(&self) -> Option<RecordId> {
                self.id
            }
        })+
    };
}

identified!(
    TankLog,
    MaintenanceTask,
    Plant,
    TreatmentPlan,
    FishPhoto,
    Note,
    FishProfile,
);

/// Predicate plus ordering applied to one record kind.
pub trait ViewFilter<T> {
    fn matches(&self, item: &T) -> bool;
    fn order(&self, a: &T, b: &T) -> Ordering;
}

/// Filters then sorts `items` in one pass over the collection.
pub fn filter_sorted<'a, T, F: ViewFilter<T>>(items: &'a [T], filter: &F) -> Vec<&'a T> {
    let mut visible: Vec<&T> = items.iter().filter(|item| filter.matches(item)).collect();
    visible.sort_by(|a, b| filter.order(a, b));
    visible
}

/// Reducer input for `ViewState::apply`.
#[derive(Debug, Clone)]
pub enum ViewAction<T, F> {
    /// Replaces the collection, e.g. after a reload from the store.
    Load(Vec<T>),
    /// Selects an item by id; unknown ids clear the selection.
    Select(Option<RecordId>),
    /// Opens an editable copy of the selected item.
    BeginEdit,
    /// Discards the editable copy.
    CancelEdit,
    /// Inserts or replaces an item by id and selects it.
    Upsert(T),
    /// Drops an item by id.
    Remove(RecordId),
    SetFilter(F),
}

#[derive(Debug, Clone)]
pub struct ViewState<T, F> {
    items: Vec<T>,
    selected: Option<RecordId>,
    draft: Option<T>,
    filter: F,
}

impl<T, F> Default for ViewState<T, F>
where
    T: Identified + Clone,
    F: ViewFilter<T> + Default,
{
    fn default() -> Self {
        Self::new(F::default())
    }
}

impl<T, F> ViewState<T, F>
where
    T: Identified + Clone,
    F: ViewFilter<T>,
{
    pub fn new(filter: F) -> Self {
        Self {
            items: Vec::new(),
            selected: None,
            draft: None,
            filter,
        }
    }

    pub fn apply(&mut self, action: ViewAction<T, F>) {
        match action {
            ViewAction::Load(items) => {
                self.items = items;
                if !self.contains(self.selected) {
                    self.clear_selection();
                }
            }
            ViewAction::Select(id) => {
                self.draft = None;
                self.selected = if self.contains(id) { id } else { None };
            }
            ViewAction::BeginEdit => {
                self.draft = self.selected().cloned();
            }
            ViewAction::CancelEdit => {
                self.draft = None;
            }
            ViewAction::Upsert(item) => {
                let id = item.record_id();
                match self.position(id) {
                    Some(index) => self.items[index] = item,
                    None => self.items.push(item),
                }
                self.selected = id;
                self.draft = None;
            }
            ViewAction::Remove(id) => {
                self.items.retain(|item| item.record_id() != Some(id));
                if self.selected == Some(id) {
                    self.clear_selection();
                }
            }
            ViewAction::SetFilter(filter) => {
                self.filter = filter;
            }
        }
    }

    /// Items passing the current filter, in the filter's order.
    pub fn visible(&self) -> Vec<&T> {
        filter_sorted(&self.items, &self.filter)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn selected(&self) -> Option<&T> {
        self.position(self.selected).map(|index| &self.items[index])
    }

    pub fn selected_id(&self) -> Option<RecordId> {
        self.selected
    }

    pub fn draft(&self) -> Option<&T> {
        self.draft.as_ref()
    }

    /// Mutable access to the open draft for field edits.
    pub fn draft_mut(&mut self) -> Option<&mut T> {
        self.draft.as_mut()
    }

    pub fn is_editing(&self) -> bool {
        self.draft.is_some()
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    fn position(&self, id: Option<RecordId>) -> Option<usize> {
        let id = id?;
        self.items
            .iter()
            .position(|item| item.record_id() == Some(id))
    }

    fn contains(&self, id: Option<RecordId>) -> bool {
        self.position(id).is_some()
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.draft = None;
    }
}
