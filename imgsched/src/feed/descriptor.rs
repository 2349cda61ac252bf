//! Task descriptors and the streaming JSON feed that yields them.
//!
//! The feed is a sequence of JSON objects, one per task, separated by
//! whitespace (typically one per line):
//!
//! ```text
//! {"inPath": "IMG_2020.png", "outPath": "IMG_2020_Out.png", "effects": ["S","B","E"]}
//! {"inPath": "IMG_2724.png", "outPath": "IMG_2724_Out.png", "effects": ["G"]}
//! ```

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::de::IoRead;
use serde_json::StreamDeserializer;
use tracing::warn;

use crate::effect::{parse_effects, Effect};
use crate::error::SchedulerError;

/// How the feed treats an entry it cannot parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedPolicy {
    /// Treat malformed input as the end of the feed.
    #[default]
    Lenient,
    /// Fail the run on malformed input.
    Strict,
}

/// One task: an input image name, an output image name and the effects to
/// apply, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDescriptor {
    pub input: String,
    pub output: String,
    pub effects: Arc<[Effect]>,
}

impl TaskDescriptor {
    /// Creates a descriptor.
    pub fn new(input: impl Into<String>, output: impl Into<String>, effects: Vec<Effect>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            effects: effects.into(),
        }
    }
}

/// Wire form of a task. Effect codes stay strings here so an unknown code is
/// reported as such rather than as malformed input. A missing or `null`
/// effect list means no effects.
#[derive(Debug, Deserialize)]
struct RawTask {
    #[serde(rename = "inPath")]
    in_path: String,
    #[serde(rename = "outPath")]
    out_path: String,
    #[serde(default)]
    effects: Option<Vec<String>>,
}

impl TryFrom<RawTask> for TaskDescriptor {
    type Error = SchedulerError;

    fn try_from(raw: RawTask) -> Result<Self, Self::Error> {
        let codes = raw.effects.unwrap_or_default();
        let effects = parse_effects(codes.as_slice())?;
        Ok(TaskDescriptor::new(raw.in_path, raw.out_path, effects))
    }
}

/// Lazy stream of [`TaskDescriptor`]s read from JSON input.
///
/// Yields `Err` for an unknown effect code (always fatal) and, under
/// [`FeedPolicy::Strict`], for malformed input. Under
/// [`FeedPolicy::Lenient`] malformed input simply ends the stream. After the
/// first `Err` or end of input the feed is fused.
pub struct TaskFeed<R: Read> {
    stream: StreamDeserializer<'static, IoRead<R>, RawTask>,
    policy: FeedPolicy,
    done: bool,
}

impl TaskFeed<BufReader<File>> {
    /// Opens the feed file at `path`.
    ///
    /// Re-opening the file restarts the feed from the first task.
    pub fn open(path: &Path, policy: FeedPolicy) -> Result<Self, SchedulerError> {
        let file = File::open(path).map_err(|source| SchedulerError::FeedOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_reader(BufReader::new(file), policy))
    }
}

impl<R: Read> TaskFeed<R> {
    /// Creates a feed over any reader.
    pub fn from_reader(reader: R, policy: FeedPolicy) -> Self {
        Self {
            stream: serde_json::Deserializer::from_reader(reader).into_iter(),
            policy,
            done: false,
        }
    }

    /// Returns the policy this feed applies to malformed entries.
    pub fn policy(&self) -> FeedPolicy {
        self.policy
    }
}

impl<R: Read> Iterator for TaskFeed<R> {
    type Item = Result<TaskDescriptor, SchedulerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let item = match self.stream.next()? {
            Ok(raw) => TaskDescriptor::try_from(raw),
            Err(e) if e.is_io() => Err(SchedulerError::Feed(e)),
            Err(e) => match self.policy {
                FeedPolicy::Strict => Err(SchedulerError::Feed(e)),
                FeedPolicy::Lenient => {
                    warn!(error = %e, "Malformed task feed entry, treating as end of feed");
                    self.done = true;
                    return None;
                }
            },
        };

        if item.is_err() {
            self.done = true;
        }
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_TASKS: &str = r#"
{"inPath": "a.png", "outPath": "a_out.png", "effects": ["S", "B"]}
{"inPath": "b.png", "outPath": "b_out.png", "effects": []}
"#;

    fn collect(input: &str, policy: FeedPolicy) -> Vec<Result<TaskDescriptor, SchedulerError>> {
        TaskFeed::from_reader(input.as_bytes(), policy).collect()
    }

    #[test]
    fn test_reads_tasks_in_order() {
        let tasks: Vec<_> = collect(TWO_TASKS, FeedPolicy::Strict)
            .into_iter()
            .map(Result::unwrap)
            .collect();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].input, "a.png");
        assert_eq!(tasks[0].output, "a_out.png");
        assert_eq!(&*tasks[0].effects, &[Effect::Sharpen, Effect::Blur]);
        assert!(tasks[1].effects.is_empty());
    }

    #[test]
    fn test_missing_or_null_effects_mean_no_effects() {
        let input = r#"
{"inPath": "a.png", "outPath": "a_out.png"}
{"inPath": "b.png", "outPath": "b_out.png", "effects": null}
{"inPath": "c.png", "outPath": "c_out.png", "effects": ["G"]}
"#;
        for policy in [FeedPolicy::Lenient, FeedPolicy::Strict] {
            let tasks: Vec<_> = collect(input, policy)
                .into_iter()
                .map(Result::unwrap)
                .collect();
            assert_eq!(tasks.len(), 3, "{:?}", policy);
            assert!(tasks[0].effects.is_empty());
            assert!(tasks[1].effects.is_empty());
            assert_eq!(&*tasks[2].effects, &[Effect::Grayscale]);
        }
    }

    #[test]
    fn test_empty_input_is_not_an_error() {
        assert!(collect("", FeedPolicy::Strict).is_empty());
        assert!(collect("  \n\n", FeedPolicy::Lenient).is_empty());
    }

    #[test]
    fn test_lenient_truncates_at_malformed_entry() {
        let input = format!("{}{{\"inPath\": 3}}\n{}", TWO_TASKS, TWO_TASKS);
        let results = collect(&input, FeedPolicy::Lenient);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(Result::is_ok));
    }

    #[test]
    fn test_strict_fails_on_malformed_entry() {
        let input = format!("{}not json at all", TWO_TASKS);
        let results = collect(&input, FeedPolicy::Strict);
        assert_eq!(results.len(), 3);
        assert!(matches!(results[2], Err(SchedulerError::Feed(_))));
    }

    #[test]
    fn test_unknown_effect_is_fatal_even_when_lenient() {
        let input = r#"{"inPath": "a.png", "outPath": "b.png", "effects": ["G", "X"]}"#;
        let results = collect(input, FeedPolicy::Lenient);
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(SchedulerError::UnknownEffect(ref c)) if c == "X"));
    }

    #[test]
    fn test_feed_is_fused_after_error() {
        let input = r#"{"inPath": "a", "outPath": "b", "effects": ["Q"]} {"inPath": "c", "outPath": "d", "effects": []}"#;
        let mut feed = TaskFeed::from_reader(input.as_bytes(), FeedPolicy::Strict);
        assert!(feed.next().unwrap().is_err());
        assert!(feed.next().is_none());
    }

    #[test]
    fn test_open_missing_file() {
        let err = TaskFeed::open(Path::new("/no/such/effects.txt"), FeedPolicy::Lenient)
            .err()
            .unwrap();
        assert!(matches!(err, SchedulerError::FeedOpen { .. }));
    }

    #[test]
    fn test_open_restarts_from_first_task() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("effects.txt");
        std::fs::write(&path, TWO_TASKS).unwrap();

        let first: Vec<_> = TaskFeed::open(&path, FeedPolicy::Strict).unwrap().collect();
        let second: Vec<_> = TaskFeed::open(&path, FeedPolicy::Strict).unwrap().collect();
        assert_eq!(first.len(), 2);
        assert_eq!(
            first.into_iter().map(Result::unwrap).collect::<Vec<_>>(),
            second.into_iter().map(Result::unwrap).collect::<Vec<_>>()
        );
    }
}
