use crate::domain::model::MAX_BATCH_ROWS;
use crate::utils::error::{GeocodeError, Result};

/// Half-open row range `[start, end)` of one batch upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

impl ChunkRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    total_rows: usize,
    chunk_size: usize,
}

impl ChunkPlan {
    pub fn new(total_rows: usize, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 || chunk_size > MAX_BATCH_ROWS {
            return Err(GeocodeError::InvalidConfigValueError {
                field: "chunk_size".to_string(),
                value: chunk_size.to_string(),
                reason: format!("Value must be between 1 and {}", MAX_BATCH_ROWS),
            });
        }
        Ok(Self {
            total_rows,
            chunk_size,
        })
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn total_chunks(&self) -> usize {
        self.total_rows.div_ceil(self.chunk_size)
    }

    pub fn range(&self, index: usize) -> Option<ChunkRange> {
        if index >= self.total_chunks() {
            return None;
        }
        let start = index * self.chunk_size;
        let end = (start + self.chunk_size).min(self.total_rows);
        Some(ChunkRange { index, start, end })
    }

    pub fn ranges(&self) -> impl Iterator<Item = ChunkRange> + '_ {
        (0..self.total_chunks()).filter_map(move |index| self.range(index))
    }
}
