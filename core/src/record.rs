//! The synthetic `Record` schema and a batch generator for it.
//!
//! Every generated dataset has three columns: a sequential `id` starting at
//! 1, a uniform random `value` in `[0, 1)`, and a `category` drawn uniformly
//! from [`CATEGORIES`].

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Alphabet the `category` column is drawn from.
pub const CATEGORIES: [&str; 3] = ["A", "B", "C"];

pub const ID_COLUMN: &str = "id";
pub const VALUE_COLUMN: &str = "value";
pub const CATEGORY_COLUMN: &str = "category";

/// Arrow schema of a generated dataset.
pub fn record_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new(ID_COLUMN, DataType::Int64, false),
        Field::new(VALUE_COLUMN, DataType::Float64, false),
        Field::new(CATEGORY_COLUMN, DataType::Utf8, false),
    ]))
}

/// Produces the rows `1..=num_rows` as a sequence of record batches.
///
/// Ids continue across batches, so concatenating the output gives exactly
/// one row per id. Only the final batch can be shorter than `batch_size`.
#[derive(Debug)]
pub struct RecordBatchGenerator<R = StdRng> {
    schema: SchemaRef,
    rng: R,
    next_id: i64,
    remaining: usize,
    batch_size: usize,
}

impl RecordBatchGenerator<StdRng> {
    /// Generator seeded from the operating system.
    pub fn new(num_rows: usize, batch_size: usize) -> Self {
        Self::with_rng(num_rows, batch_size, StdRng::from_os_rng())
    }

    /// Generator whose output is fully determined by `seed`.
    pub fn with_seed(num_rows: usize, batch_size: usize, seed: u64) -> Self {
        Self::with_rng(num_rows, batch_size, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RecordBatchGenerator<R> {
    pub fn with_rng(num_rows: usize, batch_size: usize, rng: R) -> Self {
        Self {
            schema: record_schema(),
            rng,
            next_id: 1,
            remaining: num_rows,
            batch_size: batch_size.max(1),
        }
    }

    pub fn schema(&self) -> SchemaRef {
        self.schema.clone()
    }

    /// Rows not yet emitted.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    fn next_batch(&mut self, len: usize) -> Result<RecordBatch, ArrowError> {
        let first_id = self.next_id;
        let ids = Int64Array::from_iter_values(first_id..first_id + len as i64);

        let rng = &mut self.rng;
        let values = Float64Array::from_iter_values((0..len).map(|_| rng.random::<f64>()));
        let categories = StringArray::from_iter_values(
            (0..len).map(|_| CATEGORIES[rng.random_range(0..CATEGORIES.len())]),
        );

        self.next_id += len as i64;
        self.remaining -= len;

        RecordBatch::try_new(
            self.schema.clone(),
            vec![
                Arc::new(ids) as ArrayRef,
                Arc::new(values) as ArrayRef,
                Arc::new(categories) as ArrayRef,
            ],
        )
    }
}

impl<R: Rng> Iterator for RecordBatchGenerator<R> {
    type Item = Result<RecordBatch, ArrowError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let len = self.remaining.min(self.batch_size);
        Some(self.next_batch(len))
    }
}
