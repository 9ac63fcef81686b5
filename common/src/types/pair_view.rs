use crate::errors::PairingError;
use crate::types::candidate::Candidate;
use crate::types::slot::Slot;

/// Lifecycle of the pairing screen.
#[derive(Debug, Clone, PartialEq)]
pub enum PairPhase {
    Loading,
    Ready,
    Error(PairingError),
}

/// Content of one display slot.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotState {
    Loading,
    Filled {
        candidate: Candidate,
        /// Overlay from the favorites cache, not part of the candidate.
        is_favorite: bool,
    },
}

impl SlotState {
    pub fn filled(candidate: Candidate, is_favorite: bool) -> Self {
        SlotState::Filled {
            candidate,
            is_favorite,
        }
    }

    pub fn candidate(&self) -> Option<&Candidate> {
        match self {
            SlotState::Filled { candidate, .. } => Some(candidate),
            SlotState::Loading => None,
        }
    }

    pub fn is_favorite(&self) -> bool {
        matches!(
            self,
            SlotState::Filled {
                is_favorite: true,
                ..
            }
        )
    }
}

/// What a front end renders. `generation` grows with every published change:
/// phase, slot replacement or favorite flag.
#[derive(Debug, Clone, PartialEq)]
pub struct PairView {
    pub phase: PairPhase,
    pub left: SlotState,
    pub right: SlotState,
    pub generation: u64,
}

impl PairView {
    pub fn slot(&self, slot: Slot) -> &SlotState {
        match slot {
            Slot::Left => &self.left,
            Slot::Right => &self.right,
        }
    }

    pub fn candidate_id(&self, slot: Slot) -> Option<&str> {
        self.slot(slot).candidate().map(|c| c.id.as_str())
    }

    pub fn is_ready(&self) -> bool {
        self.phase == PairPhase::Ready
    }

    pub fn error(&self) -> Option<&PairingError> {
        match &self.phase {
            PairPhase::Error(e) => Some(e),
            _ => None,
        }
    }
}
