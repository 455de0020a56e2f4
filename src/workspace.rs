//! Layout of the shared working directory.
//!
//! Driver and workers see the same tree: `inputs/` holds the corpus,
//! `intermediate/` the per-(map task, bucket) shards, `out/` the final
//! counts. Shard and output names encode their owning task, so concurrent
//! workers never write the same file and no locking is needed on disk.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const INPUT_DIR: &str = "inputs";
pub const INTERMEDIATE_DIR: &str = "intermediate";
pub const OUT_DIR: &str = "out";

/// Glob pattern matching the whole input corpus.
pub fn input_pattern(dir: &Path) -> String {
    format!("{}/{INPUT_DIR}/*.txt", dir.display())
}

/// `intermediate/mr-<map task>-<bucket>.txt`: written once by one map task,
/// read only by the reduce task owning `bucket`.
pub fn shard_path(dir: &Path, map_task: u32, bucket: &str) -> PathBuf {
    dir.join(INTERMEDIATE_DIR)
        .join(format!("mr-{map_task}-{bucket}.txt"))
}

/// Glob pattern matching every shard feeding `bucket`, across all map tasks.
pub fn shard_pattern(dir: &Path, bucket: &str) -> String {
    format!("{}/{INTERMEDIATE_DIR}/*-{bucket}.txt", dir.display())
}

/// `out/out-<bucket>.txt`: the terminal artifact for one bucket.
pub fn output_path(dir: &Path, bucket: &str) -> PathBuf {
    dir.join(OUT_DIR).join(format!("out-{bucket}.txt"))
}

/// Delete `intermediate/` and `out/` so a fresh run never observes
/// artifacts from a previous one. Called once at driver startup; failure
/// is fatal there.
pub fn clean(dir: &Path) -> Result<()> {
    for sub in [INTERMEDIATE_DIR, OUT_DIR] {
        let path = dir.join(sub);
        if path.exists() {
            fs::remove_dir_all(&path)
                .with_context(|| format!("removing stale `{}`", path.display()))?;
        }
    }
    Ok(())
}
