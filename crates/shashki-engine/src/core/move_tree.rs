//! Move-tree construction.
//!
//! At every turn boundary the whole space of legal moves for the active color
//! is computed up front as a forest: one tree per piece that may move. The
//! turn state machine then only matches clicks against precomputed nodes and
//! re-homes subtrees as a capture chain progresses; it never re-derives rules
//! mid-turn, except when a promotion mid-chain opens queen directions.
//!
//! Capture legality is global: if any piece of the mover's color can capture,
//! the forest contains capture trees only and pieces limited to simple steps
//! are absent from it.

use std::collections::BTreeMap;

use arrayvec::ArrayVec;

use crate::core::{
    board::{Board, Cell},
    cell::{CellId, Direction},
    piece::PieceColor,
};

/// A node of a move tree.
///
/// The tree is owned root-to-leaf: children vectors own their nodes and
/// traversal never needs back-pointers. A `Landing` is a cell the moving
/// piece may come to occupy; its `next` nodes are the capture markers it
/// could chain into. A `Capture` marks an enemy cell consumed by a jump and
/// owns the landings reachable beyond it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveNode {
    Landing { cell: CellId, next: Vec<MoveNode> },
    Capture { cell: CellId, landings: Vec<MoveNode> },
}

impl MoveNode {
    #[must_use]
    pub fn cell(&self) -> CellId {
        match self {
            MoveNode::Landing { cell, .. } | MoveNode::Capture { cell, .. } => *cell,
        }
    }

    #[must_use]
    pub fn is_capture(&self) -> bool {
        matches!(self, MoveNode::Capture { .. })
    }

    #[must_use]
    pub fn children(&self) -> &[MoveNode] {
        match self {
            MoveNode::Landing { next, .. } => next,
            MoveNode::Capture { landings, .. } => landings,
        }
    }

    #[must_use]
    pub fn into_children(self) -> Vec<MoveNode> {
        match self {
            MoveNode::Landing { next, .. } => next,
            MoveNode::Capture { landings, .. } => landings,
        }
    }
}

/// The per-turn move forest: a root landing node for every piece of the
/// active color that has at least one legal move. Its key set is exactly the
/// set of pieces the mover may select this turn.
#[derive(Debug, Clone, Default)]
pub struct MoveForest {
    trees: BTreeMap<CellId, MoveNode>,
}

impl MoveForest {
    /// A forest restricted to a single piece; used while a capture chain is
    /// in flight.
    #[must_use]
    pub fn single(cell: CellId, tree: MoveNode) -> Self {
        Self {
            trees: BTreeMap::from([(cell, tree)]),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    #[must_use]
    pub fn tree(&self, cell: CellId) -> Option<&MoveNode> {
        self.trees.get(&cell)
    }

    pub fn take_tree(&mut self, cell: CellId) -> Option<MoveNode> {
        self.trees.remove(&cell)
    }

    /// Cells of the pieces that have at least one legal move, in cell order.
    pub fn pieces_with_moves(&self) -> impl Iterator<Item = CellId> + '_ {
        self.trees.keys().copied()
    }

    #[must_use]
    pub fn has_captures(&self) -> bool {
        self.trees
            .values()
            .any(|tree| tree.children().iter().any(MoveNode::is_capture))
    }
}

/// Builds the move forest for `active`. An empty forest means the active
/// color has no legal move and loses immediately (out-of-moves).
#[must_use]
pub fn build_move_forest(board: &Board, active: PieceColor) -> MoveForest {
    let mut trees = BTreeMap::new();

    // Capture pass always runs first; any hit makes captures mandatory for
    // the whole color.
    for piece in board.pieces_of(active) {
        let cell = piece.cell.expect("on-board piece has a cell");
        let mut captured = Vec::new();
        let markers = capture_moves(board, cell, active, piece.is_queen, &mut captured, None);
        if !markers.is_empty() {
            trees.insert(cell, MoveNode::Landing { cell, next: markers });
        }
    }
    if !trees.is_empty() {
        return MoveForest { trees };
    }

    for piece in board.pieces_of(active) {
        let cell = piece.cell.expect("on-board piece has a cell");
        let landings = simple_moves(board, cell, active, piece.is_queen);
        if !landings.is_empty() {
            trees.insert(
                cell,
                MoveNode::Landing {
                    cell,
                    next: landings,
                },
            );
        }
    }
    MoveForest { trees }
}

/// Capture continuations for one piece standing on `cell`, with the cells in
/// `captured` already consumed this chain and `banned` excluded as the
/// immediate reversal direction. Used by the turn state machine when a piece
/// promotes mid-chain and its captures must be recomputed as a queen.
#[must_use]
pub fn capture_continuations(
    board: &Board,
    cell: CellId,
    color: PieceColor,
    is_queen: bool,
    captured: &[CellId],
    banned: Option<Direction>,
) -> Vec<MoveNode> {
    let mut captured = captured.to_vec();
    capture_moves(board, cell, color, is_queen, &mut captured, banned)
}

fn capture_moves(
    board: &Board,
    from: CellId,
    color: PieceColor,
    is_queen: bool,
    captured: &mut Vec<CellId>,
    banned: Option<Direction>,
) -> Vec<MoveNode> {
    let mut markers = Vec::new();
    for dir in Direction::ALL {
        if Some(dir) == banned {
            continue;
        }
        if let Some(marker) = capture_in_direction(board, from, dir, color, is_queen, captured) {
            markers.push(marker);
        }
    }
    markers
}

fn capture_in_direction(
    board: &Board,
    from: CellId,
    dir: Direction,
    color: PieceColor,
    is_queen: bool,
    captured: &mut Vec<CellId>,
) -> Option<MoveNode> {
    // Walk to the first occupied cell: a queen flies over empties, a man only
    // looks one cell out.
    let mut cur = board.step(from, dir)?;
    let enemy_cell = loop {
        match board.cell(cur) {
            Cell::Invalid => return None,
            Cell::Occupied(_) => break cur,
            Cell::Empty => {
                if !is_queen {
                    return None;
                }
                cur = board.step(cur, dir)?;
            }
        }
    };
    let piece = board.piece_at(enemy_cell).expect("occupied cell has a piece");
    if piece.color == color || captured.contains(&enemy_cell) {
        // Own piece, or an enemy already consumed this chain: both block.
        return None;
    }

    // Empty cells beyond the enemy are the landing options; anything else is
    // a second obstacle and aborts the direction. A man lands exactly one
    // cell beyond, a queen on any cell of the open run.
    let mut landing_cells: Vec<CellId> = Vec::new();
    let mut next = board.step(enemy_cell, dir);
    while let Some(cell) = next {
        if board.cell(cell) != Cell::Empty {
            break;
        }
        landing_cells.push(cell);
        if !is_queen {
            break;
        }
        next = board.step(cell, dir);
    }
    if landing_cells.is_empty() {
        return None;
    }

    captured.push(enemy_cell);
    let mut landings: Vec<MoveNode> = landing_cells
        .into_iter()
        .map(|cell| MoveNode::Landing {
            cell,
            next: capture_moves(board, cell, color, is_queen, captured, Some(dir.opposite())),
        })
        .collect();
    captured.pop();

    // Greedy continuation preference: when any landing under this marker can
    // capture on, landings that end the chain are dropped. One level only;
    // this is not a longest-chain rule.
    if landings.iter().any(|node| !node.children().is_empty()) {
        landings.retain(|node| !node.children().is_empty());
    }
    Some(MoveNode::Capture {
        cell: enemy_cell,
        landings,
    })
}

fn simple_moves(board: &Board, from: CellId, color: PieceColor, is_queen: bool) -> Vec<MoveNode> {
    let mut dirs: ArrayVec<Direction, 4> = ArrayVec::new();
    if is_queen {
        dirs.extend(Direction::ALL);
    } else {
        let dr = color.forward_step();
        dirs.push(Direction { dr, dc: -1 });
        dirs.push(Direction { dr, dc: 1 });
    }

    let mut landings = Vec::new();
    for dir in dirs {
        let mut next = board.step(from, dir);
        while let Some(cell) = next {
            if board.cell(cell) != Cell::Empty {
                break;
            }
            landings.push(MoveNode::Landing {
                cell,
                next: Vec::new(),
            });
            if !is_queen {
                break;
            }
            next = board.step(cell, dir);
        }
    }
    landings
}
