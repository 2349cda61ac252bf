//! Dry-run validation of a feed against a data layout.

use std::io::Read;
use std::path::PathBuf;

use tracing::debug;

use super::{DataLayout, TaskFeed};
use crate::error::SchedulerError;

/// Outcome of [`check_feed`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedReport {
    /// Task descriptors parsed.
    pub descriptors: usize,
    /// Work items the descriptors expand to.
    pub work_items: usize,
    /// Effect applications a run would perform.
    pub effect_applications: usize,
    /// Input files that do not exist, in feed order.
    pub missing_inputs: Vec<PathBuf>,
}

impl FeedReport {
    /// True when every input exists.
    pub fn is_complete(&self) -> bool {
        self.missing_inputs.is_empty()
    }
}

/// Parses the whole feed and checks that every input file exists, without
/// decoding any image.
///
/// Feed errors (malformed entries under the strict policy, unknown effect
/// codes) are returned as errors; missing files are collected in the report.
pub fn check_feed<R: Read>(feed: TaskFeed<R>, layout: &DataLayout) -> Result<FeedReport, SchedulerError> {
    let mut report = FeedReport::default();
    for task in feed {
        let task = task?;
        report.descriptors += 1;
        for dir in layout.dirs() {
            let input = layout.input_path(dir, &task.input);
            if !input.is_file() {
                debug!(input = %input.display(), "Missing input");
                report.missing_inputs.push(input);
            }
            report.work_items += 1;
            report.effect_applications += task.effects.len();
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::FeedPolicy;

    #[test]
    fn test_counts_and_missing_inputs() {
        let root = tempfile::tempdir().unwrap();
        let small = root.path().join("in").join("small");
        std::fs::create_dir_all(&small).unwrap();
        std::fs::write(small.join("a.png"), b"not decoded").unwrap();

        let input = r#"
{"inPath": "a.png", "outPath": "a_out.png", "effects": ["G", "B"]}
{"inPath": "b.png", "outPath": "b_out.png", "effects": []}
"#;
        let layout = DataLayout::new(root.path(), vec!["small".to_string(), "big".to_string()]);
        let feed = TaskFeed::from_reader(input.as_bytes(), FeedPolicy::Strict);
        let report = check_feed(feed, &layout).unwrap();

        assert_eq!(report.descriptors, 2);
        assert_eq!(report.work_items, 4);
        assert_eq!(report.effect_applications, 4);
        assert_eq!(
            report.missing_inputs,
            vec![
                root.path().join("in/big/a.png"),
                root.path().join("in/small/b.png"),
                root.path().join("in/big/b.png"),
            ]
        );
        assert!(!report.is_complete());
    }

    #[test]
    fn test_unknown_effect_is_an_error() {
        let layout = DataLayout::new("/data", vec!["small".to_string()]);
        let feed = TaskFeed::from_reader(
            r#"{"inPath": "a.png", "outPath": "b.png", "effects": ["W"]}"#.as_bytes(),
            FeedPolicy::Lenient,
        );
        assert!(matches!(
            check_feed(feed, &layout),
            Err(SchedulerError::UnknownEffect(_))
        ));
    }

    #[test]
    fn test_empty_feed_is_complete() {
        let layout = DataLayout::new("/data", vec!["small".to_string()]);
        let feed = TaskFeed::from_reader("".as_bytes(), FeedPolicy::Strict);
        let report = check_feed(feed, &layout).unwrap();
        assert_eq!(report, FeedReport::default());
        assert!(report.is_complete());
    }
}
