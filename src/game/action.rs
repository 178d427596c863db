//! # Actions (or moves)

use super::{colour::Colour, piece::PieceKind, square::Tile};

/// What happened on the board besides the moving piece changing tiles.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Debug)]
pub enum ActionKind {
    Quiet,
    Capture(PieceKind),
    /// The captured pawn stood on `captured`, not on the target tile.
    EnPassant {
        captured: Tile,
    },
    /// The rook travelled alongside the king.
    Castle {
        rook_origin: Tile,
        rook_target: Tile,
    },
    /// The pawn was replaced by a queen, possibly after capturing.
    Promotion {
        captured: Option<PieceKind>,
    },
}

/// A move that has been played on the board.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Debug)]
pub struct Action {
    pub piece: PieceKind,
    pub colour: Colour,
    pub origin: Tile,
    pub target: Tile,
    pub kind: ActionKind,
}
impl Action {
    /// Kind of the piece captured by this action, if any.
    pub fn captured(&self) -> Option<PieceKind> {
        match self.kind {
            ActionKind::Capture(kind) => Some(kind),
            ActionKind::EnPassant { .. } => Some(PieceKind::Pawn),
            ActionKind::Promotion { captured } => captured,
            ActionKind::Quiet | ActionKind::Castle { .. } => None,
        }
    }
}
