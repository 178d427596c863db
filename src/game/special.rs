//! Castling, en passant and promotion.
//!
//! Castling eligibility is read from the `moved` flags of the king and rooks,
//! en passant from the piece that played the last move.

use super::{
    board::Board,
    pattern::{self, Occupancy},
    piece::{Piece, PieceKind},
    square::{File, Tile},
    tileset::TileSet,
};

/// Files involved in castling towards one side of the board.
struct CastlingLane {
    rook: File,
    /// Tiles that must be empty, between the king and the rook.
    between: &'static [File],
    /// Tile the king crosses.
    crossed: File,
    king_target: File,
    rook_target: File,
}

const KINGSIDE: CastlingLane = CastlingLane {
    rook: File::H,
    between: &[File::F, File::G],
    crossed: File::F,
    king_target: File::G,
    rook_target: File::F,
};

const QUEENSIDE: CastlingLane = CastlingLane {
    rook: File::A,
    between: &[File::B, File::C, File::D],
    crossed: File::D,
    king_target: File::C,
    rook_target: File::D,
};

impl Board {
    /// Castling destinations of the king at `index`, given the tiles attacked
    /// by the opponent.
    pub(super) fn castling_targets(
        &self,
        index: usize,
        attacked: TileSet,
        occupancy: &Occupancy,
    ) -> TileSet {
        let king = &self.pieces[index];
        let mut targets = TileSet::empty();
        if king.moved || king.tile.file() != File::E || attacked.contains(king.tile) {
            return targets;
        }

        let rank = king.tile.rank();
        for lane in [KINGSIDE, QUEENSIDE] {
            let rook_ready = self
                .piece_on(Tile::new(lane.rook, rank))
                .is_some_and(|r| r.kind == PieceKind::Rook && r.colour == king.colour && !r.moved);
            let lane_empty = lane
                .between
                .iter()
                .all(|&file| !occupancy.is_occupied(Tile::new(file, rank)));
            let lane_safe = [lane.crossed, lane.king_target]
                .into_iter()
                .all(|file| !attacked.contains(Tile::new(file, rank)));
            if rook_ready && lane_empty && lane_safe {
                targets.insert(Tile::new(lane.king_target, rank))
            }
        }
        targets
    }

    /// Rook origin and target if moving `mover` to `target` is a castling move.
    pub(super) fn castling_rook(&self, mover: &Piece, target: Tile) -> Option<(Tile, Tile)> {
        if mover.kind != PieceKind::King
            || mover.moved
            || (target.file() as i8 - mover.tile.file() as i8).abs() != 2
        {
            return None;
        }
        let lane = if target.file() == KINGSIDE.king_target {
            KINGSIDE
        } else {
            QUEENSIDE
        };
        let rank = mover.tile.rank();
        Some((Tile::new(lane.rook, rank), Tile::new(lane.rook_target, rank)))
    }

    /// Adds the en passant capture, if any, to the pawns standing next to a
    /// pawn that just advanced two tiles.
    pub(super) fn add_en_passant_targets(&mut self) {
        let Some(last) = self.last_piece().copied() else {
            return;
        };
        if !last.just_double_stepped() {
            return;
        }
        let Some(behind) = last.tile.translate(pattern::pawn_push(last.colour.inverse())) else {
            return;
        };

        for piece in self.pieces.iter_mut() {
            if piece.kind == PieceKind::Pawn
                && piece.colour != last.colour
                && piece.tile.rank() == last.tile.rank()
                && (piece.tile.file() as i8 - last.tile.file() as i8).abs() == 1
            {
                piece.legal.insert(behind)
            }
        }
    }

    /// Tile of the pawn captured en passant if `mover` goes to `target`.
    pub(super) fn en_passant_capture(&self, mover: &Piece, target: Tile) -> Option<Tile> {
        if mover.kind != PieceKind::Pawn
            || target.file() == mover.tile.file()
            || self.piece_on(target).is_some()
        {
            return None;
        }
        let passed = Tile::new(target.file(), mover.tile.rank());
        self.last_piece()
            .filter(|last| {
                last.tile == passed && last.colour != mover.colour && last.just_double_stepped()
            })
            .map(|last| last.tile)
    }

    /// Checks if the piece stands on its promotion rank.
    pub(super) fn promotes(&self, piece: &Piece) -> bool {
        piece.kind == PieceKind::Pawn && piece.tile.rank() == pattern::pawn_promotion_rank(piece.colour)
    }

    /// A queen replacing the pawn at `index`.
    pub(super) fn promote(&self, index: usize) -> Piece {
        let pawn = self.pieces[index];
        Piece {
            moved: true,
            last_move: pawn.last_move,
            ..Piece::new(PieceKind::Queen, pawn.colour, pawn.tile)
        }
    }
}
