// src/profile/history.rs - Undo/redo command log for profile edits
//
// Every recorded edit is a `Command` value. Undo pops a command, the profile
// reverts it and the command moves to the redo stack, and redo does the
// reverse. Segments that are currently out of the profile are owned by the
// command that removed them (`detached`).
use std::collections::VecDeque;

use crate::error::{ProfileError, Result};
use crate::segments::motion::{InitialConditions, MotionSegment};
use crate::segments::{LoadSegment, SegmentData, SegmentId};

#[derive(Debug, Clone)]
pub enum Command {
    Insert {
        segment_id: SegmentId,
        before_id: Option<SegmentId>,
        detached: Option<Box<MotionSegment>>,
    },
    Append {
        segment_id: SegmentId,
        detached: Option<Box<MotionSegment>>,
    },
    Delete {
        segment_id: SegmentId,
        /// Successor at the time of the delete; `None` if it was last.
        before_id: Option<SegmentId>,
        detached: Option<Box<MotionSegment>>,
    },
    Modify {
        segment_id: SegmentId,
        before: SegmentData,
        after: SegmentData,
        initial_conditions: InitialConditions,
    },
    SetInitialConditions {
        before: InitialConditions,
        after: InitialConditions,
    },
    AddLoad {
        load: LoadSegment,
    },
    DeleteLoad {
        load: LoadSegment,
    },
    ModifyLoad {
        old: LoadSegment,
        new: LoadSegment,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Insert { .. } => "insert",
            Command::Append { .. } => "append",
            Command::Delete { .. } => "delete",
            Command::Modify { .. } => "modify",
            Command::SetInitialConditions { .. } => "set initial conditions",
            Command::AddLoad { .. } => "add load",
            Command::DeleteLoad { .. } => "delete load",
            Command::ModifyLoad { .. } => "modify load",
        }
    }
}

/// Undo and redo stacks. `limit` caps the undo stack, 0 means unbounded.
#[derive(Debug, Clone, Default)]
pub struct History {
    /// Oldest entry at the front so the limit can drop it cheaply.
    undo: VecDeque<Command>,
    redo: Vec<Command>,
    limit: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self { limit, ..Self::default() }
    }

    /// Record a freshly performed edit. Invalidates everything that could be redone.
    pub fn record(&mut self, command: Command) {
        self.redo.clear();
        self.push_undo(command);
    }

    pub(crate) fn push_undo(&mut self, command: Command) {
        self.undo.push_back(command);
        if self.limit > 0 && self.undo.len() > self.limit {
            if let Some(dropped) = self.undo.pop_front() {
                tracing::trace!("History limit {} reached, dropping oldest {}", self.limit, dropped.name());
            }
        }
    }

    pub(crate) fn push_redo(&mut self, command: Command) {
        self.redo.push(command);
    }

    pub(crate) fn pop_undo(&mut self) -> Result<Command> {
        self.undo.pop_back().ok_or(ProfileError::NothingToUndo)
    }

    pub(crate) fn pop_redo(&mut self) -> Result<Command> {
        self.redo.pop().ok_or(ProfileError::NothingToRedo)
    }

    pub fn has_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn has_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
