//! Reading, tokenizing, and slicing the input corpus.
//!
//! Every map task re-reads the whole corpus and takes its own slice. That
//! only works if all workers derive the identical token sequence, so input
//! files are consumed in alphabetical order and tokenization is fully
//! deterministic.

use std::fs;
use std::path::Path;

use anyhow::{ensure, Context, Result};

use crate::partition;
use crate::workspace;

/// Tokenize raw text: lowercase, punctuation treated as whitespace,
/// underscores dropped, then split on whitespace.
pub fn tokenize(raw: &str) -> Vec<String> {
    let cleaned: String = raw
        .to_lowercase()
        .chars()
        .filter_map(|c| {
            if c == '_' {
                None
            } else if c.is_alphanumeric() || c.is_whitespace() {
                Some(c)
            } else {
                Some(' ')
            }
        })
        .collect();
    cleaned.split_whitespace().map(str::to_string).collect()
}

/// Read every `inputs/*.txt` under `dir` and tokenize the concatenation.
///
/// The `glob` crate yields paths in alphabetical order, which is what keeps
/// the token sequence identical across workers.
pub fn read(dir: &Path) -> Result<Vec<String>> {
    let input_dir = dir.join(workspace::INPUT_DIR);
    ensure!(
        input_dir.is_dir(),
        "input directory `{}` is missing",
        input_dir.display()
    );
    let mut raw = String::new();
    for entry in glob::glob(&workspace::input_pattern(dir))? {
        let path = entry?;
        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading input file `{}`", path.display()))?;
        raw.push_str(&text);
        raw.push('\n');
    }
    Ok(tokenize(&raw))
}

/// The slice of the corpus owned by map task `task_number` out of `n_map`,
/// under the same even-split rule that shapes the bucket map.
///
/// Panics if `task_number >= n_map` or `n_map` is zero; the driver only
/// hands out task numbers below its validated map count.
pub fn slice(tokens: &[String], n_map: u32, task_number: u32) -> &[String] {
    let spans = partition::even_spans(tokens.len(), n_map as usize);
    &tokens[spans[task_number as usize].clone()]
}
