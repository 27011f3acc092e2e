//! Board -> feature-vector encoding.
//!
//! Every cell becomes a one-hot group of [`CELL_FEATURE_WIDTH`] values from
//! the scoring side's perspective; light cells encode as empty. The encoding
//! is lossless for occupancy/side/queen status: [`decode_features`] inverts
//! it exactly, which the trainer relies on never to drift.

use shashki_engine::{Board, PieceColor};

/// One-hot width per cell: empty / own man / own queen / enemy man / enemy
/// queen.
pub const CELL_FEATURE_WIDTH: usize = 5;

/// What one cell's one-hot group decodes back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellFeature {
    Empty,
    OwnMan,
    OwnQueen,
    EnemyMan,
    EnemyQueen,
}

impl CellFeature {
    fn offset(self) -> usize {
        match self {
            CellFeature::Empty => 0,
            CellFeature::OwnMan => 1,
            CellFeature::OwnQueen => 2,
            CellFeature::EnemyMan => 3,
            CellFeature::EnemyQueen => 4,
        }
    }
}

/// Feature-vector length for `board`.
#[must_use]
pub fn feature_width(board: &Board) -> usize {
    board.cell_count() * CELL_FEATURE_WIDTH
}

/// Encodes `board` as seen by `perspective`.
#[must_use]
pub fn encode_board(board: &Board, perspective: PieceColor) -> Vec<f32> {
    let mut features = vec![0.0; feature_width(board)];
    for index in 0..board.cell_count() {
        let cell = shashki_engine::CellId(index);
        let feature = match board.piece_at(cell) {
            None => CellFeature::Empty,
            Some(piece) => match (piece.color == perspective, piece.is_queen) {
                (true, false) => CellFeature::OwnMan,
                (true, true) => CellFeature::OwnQueen,
                (false, false) => CellFeature::EnemyMan,
                (false, true) => CellFeature::EnemyQueen,
            },
        };
        features[index * CELL_FEATURE_WIDTH + feature.offset()] = 1.0;
    }
    features
}

/// Decodes a feature vector produced by [`encode_board`].
///
/// # Panics
///
/// Panics if the vector length is not a multiple of [`CELL_FEATURE_WIDTH`]
/// or a group is not one-hot; both mean the vector did not come from
/// [`encode_board`].
#[must_use]
#[expect(clippy::float_cmp)]
pub fn decode_features(features: &[f32]) -> Vec<CellFeature> {
    assert_eq!(features.len() % CELL_FEATURE_WIDTH, 0);
    features
        .chunks_exact(CELL_FEATURE_WIDTH)
        .map(|group| {
            let hot: Vec<usize> = (0..CELL_FEATURE_WIDTH)
                .filter(|&i| group[i] == 1.0)
                .collect();
            assert_eq!(hot.len(), 1, "group {group:?} is not one-hot");
            match hot[0] {
                0 => CellFeature::Empty,
                1 => CellFeature::OwnMan,
                2 => CellFeature::OwnQueen,
                3 => CellFeature::EnemyMan,
                4 => CellFeature::EnemyQueen,
                _ => unreachable!(),
            }
        })
        .collect()
}

/// Pads with zeros or truncates so `features` fits a model expecting
/// `width` inputs.
#[must_use]
pub fn adjust_width(mut features: Vec<f32>, width: usize) -> Vec<f32> {
    features.resize(width, 0.0);
    features
}
