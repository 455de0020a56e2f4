//! A minimal distributed word-count system.
//!
//! A single driver hands out map and reduce tasks over gRPC to a pool of
//! stateless polling workers. For simplicity, data moves through a shared
//! working directory visible to every process, unlike Hadoop or GFS: map
//! tasks partition the input corpus into per-bucket shard files, reduce
//! tasks fold the shards for one bucket into final word counts.
//!
//! Assignment is at-most-once with no lease, heartbeat, or reassignment: a
//! worker that dies mid-task takes that task's output with it. This is a
//! deliberate limitation of the design, not an accident; see `DESIGN.md`.

pub mod cmd;
pub mod corpus;
pub mod driver;
pub mod ledger;
pub mod partition;
pub mod worker;
pub mod workspace;

/// Generated gRPC types for the `wordcount` protocol.
pub mod rpc {
    tonic::include_proto!("wordcount");
}
