//! The driver's gRPC surface: a single `GetTask` operation.
//!
//! Workers never report completion explicitly; coming back for another task
//! is the signal. The whole handler body (bucket recording, state machine
//! transition, response construction) runs under one lock so that two
//! workers racing through the map-count check can never draw the same task
//! number.

use std::collections::HashMap;
use std::sync::Mutex;

use tonic::{Request, Response, Status};
use tracing::info;

use crate::ledger::{Assignment, TaskLedger};
use crate::partition;
use crate::rpc::word_count_server::WordCount;
use crate::rpc::{Task, TaskRequest, TaskResponse, TaskType};

/// Serves `GetTask` for an unbounded pool of polling workers.
pub struct WordCountService {
    ledger: Mutex<TaskLedger>,
    bucket_ref: HashMap<String, String>,
    n_map: u32,
    n_reduce: u32,
}

impl WordCountService {
    /// Build the service for `n_map` map tasks and `n_reduce` reduce tasks.
    /// The bucket map is derived here, once, and never recomputed.
    pub fn new(n_map: u32, n_reduce: u32) -> anyhow::Result<Self> {
        anyhow::ensure!(
            n_map > 0,
            "number of map tasks must be positive, got {n_map}"
        );
        let bucket_ref = partition::bucket_map(n_reduce)?
            .into_iter()
            .map(|(symbol, bucket)| (symbol.to_string(), bucket))
            .collect();
        Ok(Self {
            ledger: Mutex::new(TaskLedger::new(n_map, n_reduce)),
            bucket_ref,
            n_map,
            n_reduce,
        })
    }

    fn describe(&self, assignment: Assignment) -> Task {
        let (task_type, task_number) = match assignment {
            Assignment::Map(n) => (TaskType::Map, n),
            Assignment::Reduce(n) => (TaskType::Reduce, n),
            Assignment::Done => (TaskType::Done, 0),
        };
        Task {
            task_type: task_type as i32,
            task_number: task_number as i32,
            number_map_tasks: self.n_map as i32,
            number_reduce_tasks: self.n_reduce as i32,
            bucket_ref: self.bucket_ref.clone(),
        }
    }
}

#[tonic::async_trait]
impl WordCount for WordCountService {
    async fn get_task(
        &self,
        request: Request<TaskRequest>,
    ) -> Result<Response<TaskResponse>, Status> {
        let req = request.into_inner();
        let mut ledger = self.ledger.lock().unwrap_or_else(|e| e.into_inner());

        if !req.available_buckets.is_empty() && ledger.record_buckets(&req.available_buckets) {
            info!(buckets = ?req.available_buckets, "reduce buckets reported");
        }

        // Anything other than "active" is a probe: answer from current state
        // without consuming a task. Unrecognized signal values land here too,
        // silently, to keep polling workers simple.
        let assignment = if req.message == "active" {
            let assignment = ledger.assign();
            match assignment {
                Assignment::Map(n) => info!(
                    task = n,
                    remaining_map = ledger.remaining_map(),
                    remaining_reduce = ledger.remaining_reduce(),
                    "assigned map task"
                ),
                Assignment::Reduce(n) => info!(
                    task = n,
                    remaining_map = ledger.remaining_map(),
                    remaining_reduce = ledger.remaining_reduce(),
                    "assigned reduce task"
                ),
                Assignment::Done => info!("no more tasks available"),
            }
            assignment
        } else {
            ledger.peek()
        };
        drop(ledger);

        let message = match assignment {
            Assignment::Done => "done",
            _ => "task",
        };
        Ok(Response::new(TaskResponse {
            message: message.into(),
            task: Some(self.describe(assignment)),
        }))
    }
}
