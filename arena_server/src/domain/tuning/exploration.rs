/// Fitness accrual: how movement is batched and how the novelty grid is laid out.

#[derive(Debug, Clone, Copy)]
pub struct ExplorationTuning {
    /// Buffered travel that triggers a flush into fitness.
    pub flush_distance: f32,

    /// Coarse grid cell width.
    pub cell_width: f32,

    /// Coarse grid cell height.
    pub cell_height: f32,

    /// Score for the first visit to a cell.
    pub novelty_bonus: f32,
}

impl Default for ExplorationTuning {
    fn default() -> Self {
        Self {
            flush_distance: 20.0,
            cell_width: 97.0,
            cell_height: 67.0,
            novelty_bonus: 200.0,
        }
    }
}
