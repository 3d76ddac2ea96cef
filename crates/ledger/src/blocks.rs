use log::info;
use model::{
    amount::Amount,
    block::{Block, BlockKind},
    ids::{BlockId, NO_PAYMENT_BLOCK},
};
use thiserror::Error;

use crate::Ledger;

#[derive(Debug, Error)]
pub enum BlockError {
    #[error("Block not found: {0:?}")]
    NotFound(BlockId),
    #[error("The no-payment block cannot be deleted")]
    Protected,
}

/// Fields of a catalog block the editor can change. Only the field
/// matching the kind is kept; the other one is zeroed.
#[derive(Debug, Clone)]
pub struct BlockDraft {
    pub name: String,
    pub cost: Amount,
    pub kind: BlockKind,
    pub training_count: u32,
    pub duration: u32,
}

impl BlockDraft {
    fn apply(self, block: &mut Block) {
        block.name = self.name;
        block.cost = self.cost;
        block.kind = self.kind;
        match self.kind {
            BlockKind::Count => {
                block.training_count = self.training_count;
                block.duration = 0;
            }
            BlockKind::Time => {
                block.training_count = 0;
                block.duration = self.duration;
            }
        }
    }
}

impl Ledger {
    pub fn create_block(&mut self, draft: BlockDraft) -> BlockId {
        let mut block = Block::count(String::new(), Amount::zero(), 0);
        let id = block.id;
        draft.apply(&mut block);
        info!("Creating block {} ({id:?})", block.name);
        self.state.blocks.push(block);
        self.dirty();
        id
    }

    /// Edits the live definition. Snapshots on existing payments are
    /// frozen facts and stay untouched.
    pub fn edit_block(&mut self, id: BlockId, draft: BlockDraft) -> Result<(), BlockError> {
        let block = self
            .state
            .blocks
            .iter_mut()
            .find(|block| block.id == id)
            .ok_or(BlockError::NotFound(id))?;
        draft.apply(block);
        self.dirty();
        Ok(())
    }

    /// Deletes a catalog block. History referencing it stays displayable
    /// through payment snapshots; nothing cascades. The no-payment block
    /// is rejected.
    pub fn delete_block(&mut self, id: BlockId) -> Result<(), BlockError> {
        if id == NO_PAYMENT_BLOCK {
            return Err(BlockError::Protected);
        }
        let index = self
            .state
            .blocks
            .iter()
            .position(|block| block.id == id)
            .ok_or(BlockError::NotFound(id))?;
        let block = self.state.blocks.remove(index);
        info!("Deleted block {}", block.name);
        self.dirty();
        Ok(())
    }

    /// Raw value; consumers repair it through `effective_rent`.
    pub fn set_rent(&mut self, rent: Amount) {
        self.state.rent_amount = rent;
        self.dirty();
    }
}
