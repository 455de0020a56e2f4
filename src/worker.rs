//! The worker: a single-threaded polling loop plus task execution.
//!
//! Each worker pulls one task at a time, runs it to completion including
//! all file I/O, then asks for the next. Bucket ids populated by a map task
//! ride along on the *next* request so the driver learns which reduce tasks
//! exist. There is no retry anywhere: with no reassignment mechanism on the
//! driver, a half-done task cannot be recovered, so any I/O failure simply
//! kills the worker process.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use dashmap::DashMap;
use indexmap::IndexMap;
use itertools::Itertools;
use tonic::Request;
use tracing::info;

use crate::corpus;
use crate::rpc::word_count_client::WordCountClient;
use crate::rpc::{Task, TaskRequest, TaskType};
use crate::workspace;

/// Tokens grouped by the bucket id that owns them.
type Buckets = DashMap<String, Vec<String>>;

/// Poll the driver at `addr` until it reports `done`, executing every
/// assigned task against the shared working directory `dir`.
pub async fn run(addr: &str, dir: &Path) -> Result<()> {
    let mut client = WordCountClient::connect(format!("http://{addr}")).await?;
    let mut discovered: Vec<String> = Vec::new();

    loop {
        info!("requesting a task");
        let request = Request::new(TaskRequest {
            message: "active".into(),
            available_buckets: std::mem::take(&mut discovered),
        });
        let response = client.get_task(request).await?.into_inner();
        let task = response
            .task
            .ok_or_else(|| anyhow!("driver response carried no task"))?;

        if response.message == "done" || task.task_type == TaskType::Done as i32 {
            info!("all tasks have been executed");
            break;
        }
        match TaskType::try_from(task.task_type) {
            Ok(TaskType::Map) => {
                info!(task = task.task_number, "executing map task");
                discovered = run_map(dir, &task)?;
            }
            Ok(TaskType::Reduce) => {
                info!(task = task.task_number, "executing reduce task");
                run_reduce(dir, &task)?;
            }
            _ => bail!("driver assigned an unknown task type {}", task.task_type),
        }
    }
    Ok(())
}

/// Partition this task's slice of the corpus into per-bucket shard files.
///
/// Returns the bucket ids that actually received tokens, sorted, ready to
/// report on the next `GetTask`.
pub fn run_map(dir: &Path, task: &Task) -> Result<Vec<String>> {
    let tokens = corpus::read(dir)?;
    let slice = corpus::slice(&tokens, task.number_map_tasks as u32, task.task_number as u32);

    let buckets: Buckets = Buckets::new();
    for token in slice {
        let Some(first) = token.chars().next() else {
            continue;
        };
        let bucket = task
            .bucket_ref
            .get(&first.to_string())
            .ok_or_else(|| anyhow!("no bucket owns tokens starting with {first:?}"))?;
        buckets.entry(bucket.clone()).or_default().push(token.clone());
    }

    fs::create_dir_all(dir.join(workspace::INTERMEDIATE_DIR))?;
    let mut populated = Vec::new();
    for (bucket, words) in buckets.into_iter() {
        let path = workspace::shard_path(dir, task.task_number as u32, &bucket);
        let mut shard = File::create(&path)
            .with_context(|| format!("creating shard `{}`", path.display()))?;
        for word in &words {
            writeln!(shard, "{word}")?;
        }
        populated.push(bucket);
    }
    Ok(populated.into_iter().sorted().collect())
}

/// Fold every shard for this task's bucket into final `word count` lines,
/// ordered by each distinct word's first appearance in the shard stream.
pub fn run_reduce(dir: &Path, task: &Task) -> Result<()> {
    let bucket = task.task_number.to_string();

    let mut counts: IndexMap<String, u64> = IndexMap::new();
    for entry in glob::glob(&workspace::shard_pattern(dir, &bucket))? {
        let path = entry?;
        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading shard `{}`", path.display()))?;
        for word in text.split_whitespace() {
            *counts.entry(word.to_string()).or_insert(0) += 1;
        }
    }

    fs::create_dir_all(dir.join(workspace::OUT_DIR))?;
    let path = workspace::output_path(dir, &bucket);
    let mut out = File::create(&path)
        .with_context(|| format!("creating output `{}`", path.display()))?;
    for (word, count) in &counts {
        writeln!(out, "{word} {count}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition;
    use std::collections::HashMap;

    fn scratch(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("wclite-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(dir.join(workspace::INPUT_DIR)).unwrap();
        dir
    }

    fn task(task_type: TaskType, task_number: i32, n_map: i32, n_reduce: u32) -> Task {
        let bucket_ref: HashMap<String, String> = partition::bucket_map(n_reduce)
            .unwrap()
            .into_iter()
            .map(|(symbol, bucket)| (symbol.to_string(), bucket))
            .collect();
        Task {
            task_type: task_type as i32,
            task_number,
            number_map_tasks: n_map,
            number_reduce_tasks: n_reduce as i32,
            bucket_ref,
        }
    }

    fn read_counts(path: &Path) -> HashMap<String, u64> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| {
                let (word, count) = line.split_once(' ').unwrap();
                (word.to_string(), count.parse().unwrap())
            })
            .collect()
    }

    #[test]
    fn map_writes_one_shard_per_populated_bucket() {
        let dir = scratch("map");
        fs::write(dir.join(workspace::INPUT_DIR).join("a.txt"), "apple zebra apricot").unwrap();

        // One map task over the whole corpus, two buckets: a* goes to 0,
        // z* to 1.
        let populated = run_map(&dir, &task(TaskType::Map, 0, 1, 2)).unwrap();
        assert_eq!(populated, vec!["0", "1"]);
        assert_eq!(
            fs::read_to_string(workspace::shard_path(&dir, 0, "0")).unwrap(),
            "apple\napricot\n"
        );
        assert_eq!(
            fs::read_to_string(workspace::shard_path(&dir, 0, "1")).unwrap(),
            "zebra\n"
        );

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn map_reports_only_populated_buckets() {
        let dir = scratch("map-sparse");
        fs::write(dir.join(workspace::INPUT_DIR).join("a.txt"), "zig zag").unwrap();

        let populated = run_map(&dir, &task(TaskType::Map, 0, 1, 4)).unwrap();
        assert_eq!(populated, vec!["3"]);
        assert!(!workspace::shard_path(&dir, 0, "0").exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn reduce_preserves_first_insertion_order() {
        let dir = scratch("reduce-order");
        fs::create_dir_all(dir.join(workspace::INTERMEDIATE_DIR)).unwrap();
        // Shards are consumed in alphabetical path order: mr-0 then mr-1.
        fs::write(workspace::shard_path(&dir, 0, "1"), "the\nsat\n").unwrap();
        fs::write(workspace::shard_path(&dir, 1, "1"), "the\nran\n").unwrap();
        // A shard for another bucket must not leak in.
        fs::write(workspace::shard_path(&dir, 0, "0"), "cat\n").unwrap();

        run_reduce(&dir, &task(TaskType::Reduce, 1, 1, 2)).unwrap();
        assert_eq!(
            fs::read_to_string(workspace::output_path(&dir, "1")).unwrap(),
            "the 2\nsat 1\nran 1\n"
        );

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn end_to_end_word_count_over_three_maps_and_two_reduces() {
        let dir = scratch("end-to-end");
        fs::write(
            dir.join(workspace::INPUT_DIR).join("corpus.txt"),
            "the cat sat. The DOG ran!",
        )
        .unwrap();

        let mut discovered = Vec::new();
        for map_task in 0..3 {
            discovered.extend(run_map(&dir, &task(TaskType::Map, map_task, 3, 2)).unwrap());
        }
        discovered.sort();
        discovered.dedup();
        assert_eq!(discovered, vec!["0", "1"]);

        for bucket in 0..2 {
            run_reduce(&dir, &task(TaskType::Reduce, bucket, 3, 2)).unwrap();
        }

        let mut combined = read_counts(&workspace::output_path(&dir, "0"));
        combined.extend(read_counts(&workspace::output_path(&dir, "1")));
        let expected: HashMap<String, u64> = [("the", 2), ("cat", 1), ("sat", 1), ("dog", 1), ("ran", 1)]
            .into_iter()
            .map(|(word, count)| (word.to_string(), count))
            .collect();
        assert_eq!(combined, expected);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn token_outside_the_alphabet_is_fatal() {
        let dir = scratch("map-unmapped");
        fs::write(dir.join(workspace::INPUT_DIR).join("a.txt"), "émigré").unwrap();

        assert!(run_map(&dir, &task(TaskType::Map, 0, 1, 2)).is_err());

        fs::remove_dir_all(&dir).unwrap();
    }
}
