//! Move-plan enumeration and the model-driven player.
//!
//! A plan is one complete move: the root-to-leaf click path through a move
//! tree (piece cell, then every landing in order) plus the enemy cells the
//! path consumes. The model player scores the board each plan would leave
//! behind and commits to the best plan up front, emitting its clicks one per
//! tick without re-scoring mid-chain.

use std::collections::VecDeque;

use shashki_engine::{Board, CellId, GameView, MoveForest, MoveNode, Player};

use crate::{encoding::encode_board, model::ScoringModel};

/// One complete move, possibly a multi-jump chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    /// Cells to click, in order: the piece cell, then each landing.
    pub clicks: Vec<CellId>,
    /// Enemy cells consumed along the path.
    pub captures: Vec<CellId>,
}

/// Every complete move available in `forest`.
#[must_use]
pub fn enumerate_plans(forest: &MoveForest) -> Vec<MovePlan> {
    fn walk(
        node: &MoveNode,
        clicks: &mut Vec<CellId>,
        captures: &mut Vec<CellId>,
        out: &mut Vec<MovePlan>,
    ) {
        match node {
            MoveNode::Landing { cell, next } => {
                clicks.push(*cell);
                if next.is_empty() {
                    out.push(MovePlan {
                        clicks: clicks.clone(),
                        captures: captures.clone(),
                    });
                } else {
                    for child in next {
                        walk(child, clicks, captures, out);
                    }
                }
                clicks.pop();
            }
            MoveNode::Capture { cell, landings } => {
                captures.push(*cell);
                for child in landings {
                    walk(child, clicks, captures, out);
                }
                captures.pop();
            }
        }
    }

    let mut out = Vec::new();
    for piece_cell in forest.pieces_with_moves() {
        let tree = forest.tree(piece_cell).expect("forest key has a tree");
        let mut clicks = vec![piece_cell];
        let mut captures = Vec::new();
        for child in tree.children() {
            walk(child, &mut clicks, &mut captures, &mut out);
        }
    }
    out
}

/// The board as it would look after `plan` runs to completion: captured
/// pieces removed, the mover re-homed to the final landing and promoted if
/// any landing of the path touches its promotion rank.
#[must_use]
pub fn apply_plan(board: &Board, plan: &MovePlan) -> Board {
    let mut board = board.clone();
    let src = plan.clicks[0];
    let dest = *plan.clicks.last().expect("plan has at least the piece cell");
    let color = board
        .piece_at(src)
        .expect("plan starts on a piece")
        .color;
    for &cell in &plan.captures {
        board.remove_piece(cell);
    }
    board.move_piece(src, dest);
    let promotion_row = board.promotion_row(color);
    let promotes = plan.clicks[1..]
        .iter()
        .any(|&cell| board.row_col(cell).0 == promotion_row);
    if promotes {
        board.promote(dest);
    }
    board
}

/// Player that delegates move choice to a scoring model.
///
/// Each time its click queue runs dry it enumerates the forest's plans,
/// scores the hypothetical board at the end of each plan from the active
/// side's perspective, and queues the best plan's clicks. Mid-chain the
/// engine restricts the forest to the continuing piece, so a re-plan after a
/// promotion-extended chain stays coherent.
pub struct ModelPlayer<'a> {
    model: &'a (dyn ScoringModel + 'a),
    planned: VecDeque<CellId>,
}

impl<'a> ModelPlayer<'a> {
    #[must_use]
    pub fn new(model: &'a (dyn ScoringModel + 'a)) -> Self {
        Self {
            model,
            planned: VecDeque::new(),
        }
    }
}

impl Player for ModelPlayer<'_> {
    fn turn(&mut self, view: &GameView<'_>) -> Option<CellId> {
        if let Some(cell) = self.planned.pop_front() {
            return Some(cell);
        }

        let mut best: Option<(f32, MovePlan)> = None;
        for plan in enumerate_plans(view.forest) {
            let hypothetical = apply_plan(view.board, &plan);
            let features = encode_board(&hypothetical, view.active);
            let score = self.model.forward(&self.model.adjust_shape(features));
            if best.as_ref().is_none_or(|(s, _)| score > *s) {
                best = Some((score, plan));
            }
        }
        let (_, plan) = best?;
        self.planned.extend(plan.clicks);
        self.planned.pop_front()
    }
}
