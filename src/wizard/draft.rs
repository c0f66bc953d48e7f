//! Field store for the in-progress design request
//!
//! Drafts are immutable snapshots behind an `Arc`. Every update builds a new
//! draft and swaps it in, so a snapshot taken with [`FieldStore::get`] never
//! changes under the caller.

use std::sync::Arc;
use thiserror::Error;

use crate::types::{BudgetRange, DesignStyle, PresetDesignRequest, PropertyType, RoomEntry, RoomType};

/// User input collected by the wizard
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    pub property_type: Option<PropertyType>,
    pub style: Option<DesignStyle>,
    pub rooms: Vec<RoomEntry>,
    pub budget: Option<BudgetRange>,
    /// Free-text preferences, sent as `additional_preferences`
    pub details: String,
    /// Project the design is linked to, if started from one
    pub project_id: Option<i64>,
}

/// The draft cannot be turned into a request yet
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("design draft is missing {0}")]
pub struct IncompleteDraft(pub &'static str);

impl Draft {
    pub fn has_property_type(&self) -> bool {
        self.property_type.is_some()
    }

    pub fn has_style(&self) -> bool {
        self.style.is_some()
    }

    /// At least one room, and every room has a quantity and a positive area
    pub fn has_valid_rooms(&self) -> bool {
        !self.rooms.is_empty() && self.rooms.iter().all(RoomEntry::is_valid)
    }

    pub fn has_budget(&self) -> bool {
        self.budget.is_some()
    }

    /// Build the preset generation payload
    pub fn to_preset_request(&self) -> Result<PresetDesignRequest, IncompleteDraft> {
        let property_type = self
            .property_type
            .ok_or(IncompleteDraft("a property type"))?;
        let design_style = self.style.ok_or(IncompleteDraft("a design style"))?;
        if !self.has_valid_rooms() {
            return Err(IncompleteDraft("at least one valid room"));
        }
        let budget_range = self.budget.ok_or(IncompleteDraft("a budget range"))?;

        Ok(PresetDesignRequest {
            property_type,
            design_style,
            rooms: self.rooms.clone(),
            budget_range,
            additional_preferences: self.details.clone(),
            project_id: self.project_id,
        })
    }
}

/// A single top-level draft field with its new value
#[derive(Debug, Clone, PartialEq)]
pub enum DraftField {
    PropertyType(Option<PropertyType>),
    Style(Option<DesignStyle>),
    Rooms(Vec<RoomEntry>),
    Budget(Option<BudgetRange>),
    Details(String),
    ProjectId(Option<i64>),
}

/// A single field of one room entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoomField {
    Type(RoomType),
    Quantity(u32),
    Area(f64),
}

/// Holds the current draft; all mutation goes through here
#[derive(Debug, Clone, Default)]
pub struct FieldStore {
    current: Arc<Draft>,
}

impl FieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_draft(draft: Draft) -> Self {
        Self {
            current: Arc::new(draft),
        }
    }

    /// Snapshot of the current draft
    pub fn get(&self) -> Arc<Draft> {
        Arc::clone(&self.current)
    }

    /// Replace one field, leaving every other field as it was
    pub fn update(&mut self, field: DraftField) -> Arc<Draft> {
        self.replace(|draft| match field {
            DraftField::PropertyType(v) => draft.property_type = v,
            DraftField::Style(v) => draft.style = v,
            DraftField::Rooms(v) => draft.rooms = v,
            DraftField::Budget(v) => draft.budget = v,
            DraftField::Details(v) => draft.details = v,
            DraftField::ProjectId(v) => draft.project_id = v,
        })
    }

    pub fn add_room(&mut self, entry: RoomEntry) -> Arc<Draft> {
        self.replace(|draft| draft.rooms.push(entry))
    }

    /// Change one field of the room at `index`; out of range is a no-op
    pub fn update_room(&mut self, index: usize, field: RoomField) -> Arc<Draft> {
        if index >= self.current.rooms.len() {
            return self.get();
        }
        self.replace(|draft| {
            let room = &mut draft.rooms[index];
            match field {
                RoomField::Type(v) => room.room_type = v,
                RoomField::Quantity(v) => room.quantity = v,
                RoomField::Area(v) => room.area = v,
            }
        })
    }

    /// Remove the room at `index`; out of range is a no-op
    pub fn remove_room(&mut self, index: usize) -> Arc<Draft> {
        if index >= self.current.rooms.len() {
            return self.get();
        }
        self.replace(|draft| {
            draft.rooms.remove(index);
        })
    }

    /// Start over with an empty draft
    pub fn clear(&mut self) -> Arc<Draft> {
        self.current = Arc::new(Draft::default());
        self.get()
    }

    fn replace(&mut self, edit: impl FnOnce(&mut Draft)) -> Arc<Draft> {
        let mut next = (*self.current).clone();
        edit(&mut next);
        self.current = Arc::new(next);
        self.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_draft() -> Draft {
        Draft {
            property_type: Some(PropertyType::Villa),
            style: Some(DesignStyle::ModernLuxury),
            rooms: vec![RoomEntry::new(RoomType::LivingRoom, 1, 30.0)],
            budget: Some(BudgetRange::Premium),
            details: String::new(),
            project_id: None,
        }
    }

    #[test]
    fn test_update_does_not_touch_previous_snapshot() {
        let mut store = FieldStore::new();
        let d1 = store.get();
        let d2 = store.update(DraftField::Details("marble floors".to_string()));

        assert_eq!(*d1, Draft::default());
        assert_eq!(d2.details, "marble floors");
        assert_eq!(*store.get(), *d2);
    }

    #[test]
    fn test_update_replaces_only_one_field() {
        let mut store = FieldStore::with_draft(complete_draft());
        let before = store.get();
        let after = store.update(DraftField::Budget(Some(BudgetRange::Royal)));

        assert_eq!(after.budget, Some(BudgetRange::Royal));
        assert_eq!(after.property_type, before.property_type);
        assert_eq!(after.style, before.style);
        assert_eq!(after.rooms, before.rooms);
        assert_eq!(before.budget, Some(BudgetRange::Premium));
    }

    #[test]
    fn test_room_operations_copy_on_write() {
        let mut store = FieldStore::new();
        store.add_room(RoomEntry::preset(RoomType::Kitchen));
        let with_kitchen = store.get();

        store.add_room(RoomEntry::preset(RoomType::Bedroom));
        store.update_room(0, RoomField::Area(18.0));
        store.update_room(1, RoomField::Quantity(2));
        let edited = store.get();

        assert_eq!(with_kitchen.rooms, vec![RoomEntry::preset(RoomType::Kitchen)]);
        assert_eq!(edited.rooms[0].area, 18.0);
        assert_eq!(edited.rooms[1].quantity, 2);

        let removed = store.remove_room(0);
        assert_eq!(removed.rooms.len(), 1);
        assert_eq!(removed.rooms[0].room_type, RoomType::Bedroom);
        assert_eq!(edited.rooms.len(), 2);
    }

    #[test]
    fn test_out_of_range_room_index_is_noop() {
        let mut store = FieldStore::new();
        store.add_room(RoomEntry::preset(RoomType::Office));
        let before = store.get();

        let after = store.update_room(5, RoomField::Quantity(3));
        assert_eq!(*after, *before);
        let after = store.remove_room(1);
        assert_eq!(*after, *before);
    }

    #[test]
    fn test_store_does_not_validate() {
        let mut store = FieldStore::new();
        store.add_room(RoomEntry::preset(RoomType::Office));
        let draft = store.update_room(0, RoomField::Quantity(0));
        assert_eq!(draft.rooms[0].quantity, 0);
        assert!(!draft.has_valid_rooms());
    }

    #[test]
    fn test_to_preset_request() {
        let request = complete_draft().to_preset_request().unwrap();
        assert_eq!(request.property_type, PropertyType::Villa);
        assert_eq!(request.design_style, DesignStyle::ModernLuxury);
        assert_eq!(request.budget_range, BudgetRange::Premium);
        assert_eq!(request.additional_preferences, "");
        assert!(request.project_id.is_none());
    }

    #[test]
    fn test_to_preset_request_reports_first_missing_field() {
        let mut draft = complete_draft();
        draft.style = None;
        assert_eq!(
            draft.to_preset_request().unwrap_err(),
            IncompleteDraft("a design style")
        );

        let mut draft = complete_draft();
        draft.rooms[0].area = -1.0;
        assert_eq!(
            draft.to_preset_request().unwrap_err(),
            IncompleteDraft("at least one valid room")
        );
    }

    #[test]
    fn test_clear() {
        let mut store = FieldStore::with_draft(complete_draft());
        let kept = store.get();
        let cleared = store.clear();
        assert_eq!(*cleared, Draft::default());
        assert!(kept.has_budget());
    }
}
