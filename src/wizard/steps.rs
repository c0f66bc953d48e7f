//! Step sequencing for the design wizard

use thiserror::Error;

use super::draft::Draft;

/// One step of the wizard
#[derive(Debug, Clone, Copy)]
pub struct StepDescriptor {
    /// 1-based position
    pub index: usize,
    pub title: &'static str,
    /// Whether the draft satisfies this step
    pub is_complete: fn(&Draft) -> bool,
    /// Selecting a value on this step moves straight to the next one
    pub auto_advance_on_select: bool,
}

/// The four design steps, in order
pub const DESIGN_STEPS: &[StepDescriptor] = &[
    StepDescriptor {
        index: 1,
        title: "Property Type",
        is_complete: Draft::has_property_type,
        auto_advance_on_select: true,
    },
    StepDescriptor {
        index: 2,
        title: "Aesthetic Style",
        is_complete: Draft::has_style,
        auto_advance_on_select: true,
    },
    StepDescriptor {
        index: 3,
        title: "Room Configuration",
        is_complete: Draft::has_valid_rooms,
        auto_advance_on_select: false,
    },
    StepDescriptor {
        index: 4,
        title: "Final Details",
        is_complete: Draft::has_budget,
        auto_advance_on_select: false,
    },
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("step {index} ({title}) is not complete")]
    Incomplete { index: usize, title: &'static str },

    #[error("a wizard needs at least one step")]
    NoSteps,
}

/// Tracks the current step and gates forward movement on step predicates
#[derive(Debug, Clone)]
pub struct StepSequencer {
    steps: &'static [StepDescriptor],
    current: usize,
    auto_advance: bool,
}

impl Default for StepSequencer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl StepSequencer {
    pub fn new(auto_advance: bool) -> Self {
        Self {
            steps: DESIGN_STEPS,
            current: 1,
            auto_advance,
        }
    }

    /// Sequencer over a custom step list; the list must not be empty
    pub fn with_steps(
        steps: &'static [StepDescriptor],
        auto_advance: bool,
    ) -> Result<Self, NavigationError> {
        if steps.is_empty() {
            return Err(NavigationError::NoSteps);
        }
        Ok(Self {
            steps,
            current: 1,
            auto_advance,
        })
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.steps.len()
    }

    pub fn steps(&self) -> &'static [StepDescriptor] {
        self.steps
    }

    pub fn descriptor(&self) -> Option<&'static StepDescriptor> {
        self.steps.get(self.current - 1)
    }

    pub fn is_last(&self) -> bool {
        self.current >= self.total()
    }

    /// Whether the current step's predicate holds for `draft`
    pub fn can_advance(&self, draft: &Draft) -> bool {
        self.descriptor().is_some_and(|s| (s.is_complete)(draft))
    }

    /// Move forward one step if the current step is complete.
    /// On the last step a complete draft stays put and still succeeds.
    pub fn next(&mut self, draft: &Draft) -> Result<usize, NavigationError> {
        if let Some(step) = self.descriptor() {
            if !(step.is_complete)(draft) {
                return Err(NavigationError::Incomplete {
                    index: step.index,
                    title: step.title,
                });
            }
        }
        self.current = (self.current + 1).min(self.total());
        Ok(self.current)
    }

    /// Move back one step; a no-op on step 1
    pub fn back(&mut self) -> usize {
        if self.current > 1 {
            self.current -= 1;
        }
        self.current
    }

    /// Called after a value was selected on the current step.
    /// Returns true when the sequencer advanced.
    pub fn after_select(&mut self, draft: &Draft) -> bool {
        let auto = self
            .descriptor()
            .is_some_and(|s| s.auto_advance_on_select);
        self.auto_advance && auto && self.next(draft).is_ok()
    }

    /// The first step whose predicate fails, if any
    pub fn first_incomplete(&self, draft: &Draft) -> Option<&'static StepDescriptor> {
        self.steps.iter().find(|s| !(s.is_complete)(draft))
    }

    pub fn all_complete(&self, draft: &Draft) -> bool {
        self.first_incomplete(draft).is_none()
    }

    pub fn reset(&mut self) {
        self.current = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BudgetRange, DesignStyle, PropertyType, RoomEntry, RoomType};

    fn draft_with_type() -> Draft {
        Draft {
            property_type: Some(PropertyType::Apartment),
            ..Draft::default()
        }
    }

    #[test]
    fn test_design_steps_are_ordered() {
        let indexes: Vec<usize> = DESIGN_STEPS.iter().map(|s| s.index).collect();
        assert_eq!(indexes, vec![1, 2, 3, 4]);
        assert_eq!(DESIGN_STEPS[2].title, "Room Configuration");
    }

    #[test]
    fn test_next_requires_complete_step() {
        let mut seq = StepSequencer::new(true);
        let err = seq.next(&Draft::default()).unwrap_err();
        assert_eq!(
            err,
            NavigationError::Incomplete {
                index: 1,
                title: "Property Type"
            }
        );
        assert_eq!(seq.current(), 1);

        assert_eq!(seq.next(&draft_with_type()), Ok(2));
    }

    #[test]
    fn test_back_on_first_step_is_noop() {
        let mut seq = StepSequencer::new(true);
        assert_eq!(seq.back(), 1);
        seq.next(&draft_with_type()).unwrap();
        assert_eq!(seq.back(), 1);
    }

    #[test]
    fn test_next_on_last_step_stays() {
        let draft = Draft {
            property_type: Some(PropertyType::Villa),
            style: Some(DesignStyle::Industrial),
            rooms: vec![RoomEntry::preset(RoomType::Kitchen)],
            budget: Some(BudgetRange::Economy),
            ..Draft::default()
        };
        let mut seq = StepSequencer::new(true);
        assert_eq!(seq.next(&draft), Ok(2));
        assert_eq!(seq.next(&draft), Ok(3));
        assert_eq!(seq.next(&draft), Ok(4));
        assert!(seq.is_last());
        assert_eq!(seq.next(&draft), Ok(4));
        assert_eq!(seq.current(), 4);
        assert!(seq.all_complete(&draft));

        let mut no_budget = draft.clone();
        no_budget.budget = None;
        assert_eq!(
            seq.next(&no_budget),
            Err(NavigationError::Incomplete {
                index: 4,
                title: "Final Details"
            })
        );
    }

    #[test]
    fn test_with_steps_rejects_empty_list() {
        assert_eq!(
            StepSequencer::with_steps(&[], true).unwrap_err(),
            NavigationError::NoSteps
        );
        let seq = StepSequencer::with_steps(&DESIGN_STEPS[..2], false).unwrap();
        assert_eq!(seq.total(), 2);
        assert_eq!(seq.current(), 1);
    }

    #[test]
    fn test_after_select_auto_advances_on_choice_steps() {
        let mut seq = StepSequencer::new(true);
        assert!(seq.after_select(&draft_with_type()));
        assert_eq!(seq.current(), 2);
    }

    #[test]
    fn test_after_select_respects_disabled_auto_advance() {
        let mut seq = StepSequencer::new(false);
        assert!(!seq.after_select(&draft_with_type()));
        assert_eq!(seq.current(), 1);
    }

    #[test]
    fn test_rooms_step_blocks_invalid_rooms() {
        let mut draft = draft_with_type();
        draft.style = Some(DesignStyle::Minimalist);
        let mut seq = StepSequencer::new(true);
        seq.next(&draft).unwrap();
        seq.next(&draft).unwrap();

        assert!(!seq.can_advance(&draft));
        draft.rooms.push(RoomEntry::new(RoomType::Bedroom, 0, 25.0));
        assert!(!seq.can_advance(&draft));
        draft.rooms[0].quantity = 1;
        assert!(seq.can_advance(&draft));
        // Room step never auto-advances
        assert!(!seq.after_select(&draft));
    }

    #[test]
    fn test_first_incomplete() {
        let seq = StepSequencer::new(true);
        assert_eq!(seq.first_incomplete(&draft_with_type()).map(|s| s.index), Some(2));
    }
}
