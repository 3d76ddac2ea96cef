use log::info;
use model::{ids::ParticipantId, participant::Participant};
use thiserror::Error;

use crate::Ledger;

#[derive(Debug, Error)]
pub enum ParticipantError {
    #[error("Participant not found: {0:?}")]
    NotFound(ParticipantId),
}

#[derive(Debug, Error)]
pub enum ReorderError {
    #[error("Reordering is disabled while the roster is filtered")]
    FilteredView,
    #[error("Position out of range")]
    OutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RosterTab {
    #[default]
    Active,
    Archived,
}

/// Which roster slice the caller is looking at. Reordering is only
/// allowed on the full active list: with a filter active, indices would
/// be ambiguous between the filtered and the stored order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RosterView {
    pub tab: RosterTab,
    pub search: String,
}

impl RosterView {
    pub fn active() -> RosterView {
        RosterView::default()
    }

    pub fn archived() -> RosterView {
        RosterView {
            tab: RosterTab::Archived,
            search: String::new(),
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> RosterView {
        self.search = search.into();
        self
    }

    pub fn is_reorderable(&self) -> bool {
        self.tab == RosterTab::Active && self.search.is_empty()
    }

    pub fn matches(&self, participant: &Participant) -> bool {
        let tab_ok = match self.tab {
            RosterTab::Active => !participant.is_archived,
            RosterTab::Archived => participant.is_archived,
        };
        tab_ok
            && participant
                .name
                .to_lowercase()
                .contains(&self.search.to_lowercase())
    }
}

impl Ledger {
    pub fn add_participant(&mut self, name: impl Into<String>) -> ParticipantId {
        let participant = Participant::new(name);
        let id = participant.id;
        info!("Adding participant {id}");
        self.state.participants.push(participant);
        self.dirty();
        id
    }

    pub fn rename_participant(
        &mut self,
        id: ParticipantId,
        name: impl Into<String>,
    ) -> Result<(), ParticipantError> {
        let participant = self
            .state
            .participant_mut(id)
            .ok_or(ParticipantError::NotFound(id))?;
        participant.name = name.into();
        self.dirty();
        Ok(())
    }

    /// Archive or restore. Payments and attendance history stay intact.
    pub fn set_archived(
        &mut self,
        id: ParticipantId,
        archived: bool,
    ) -> Result<(), ParticipantError> {
        let participant = self
            .state
            .participant_mut(id)
            .ok_or(ParticipantError::NotFound(id))?;
        participant.is_archived = archived;
        info!(
            "Participant {id} {}",
            if archived { "archived" } else { "restored" }
        );
        self.dirty();
        Ok(())
    }

    /// Permanent delete: removes the record and purges every attendance
    /// key of the participant, so no orphaned keys accumulate.
    /// Confirmation is the caller's responsibility; once invoked the
    /// mutation is unconditional.
    pub fn delete_participant(&mut self, id: ParticipantId) -> Result<(), ParticipantError> {
        let index = self
            .state
            .participants
            .iter()
            .position(|p| p.id == id)
            .ok_or(ParticipantError::NotFound(id))?;
        self.state.participants.remove(index);
        let purged = self.state.attendance.purge_participant(id);
        info!("Deleted participant {id}, purged {purged} attendance entries");
        self.dirty();
        Ok(())
    }

    pub fn roster(&self, view: &RosterView) -> Vec<&Participant> {
        self.state
            .participants
            .iter()
            .filter(|participant| view.matches(participant))
            .collect()
    }

    /// Moves the participant shown at `src` to `dst` within the active
    /// roster. Indices address the active subsequence of the stored
    /// list; archived entries keep their positions.
    pub fn reorder_participant(
        &mut self,
        src: usize,
        dst: usize,
        view: &RosterView,
    ) -> Result<(), ReorderError> {
        if !view.is_reorderable() {
            return Err(ReorderError::FilteredView);
        }
        let active: Vec<usize> = self
            .state
            .participants
            .iter()
            .enumerate()
            .filter(|(_, participant)| !participant.is_archived)
            .map(|(index, _)| index)
            .collect();
        let src_index = *active.get(src).ok_or(ReorderError::OutOfRange)?;
        let dst_index = *active.get(dst).ok_or(ReorderError::OutOfRange)?;
        if src_index == dst_index {
            return Ok(());
        }
        let participant = self.state.participants.remove(src_index);
        self.state.participants.insert(dst_index, participant);
        self.dirty();
        Ok(())
    }
}
