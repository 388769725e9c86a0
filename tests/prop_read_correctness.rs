// Property: for any file, limit, filter pair and chunk size, a head read
// returns the first min(limit, matches) matching lines and a tail read the
// last min(limit, matches), both in file order.

use log_vision::{LineFilter, ReadDirection, ReadRequest, ResourceReader};
use proptest::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

const INCLUDES: &[&str] = &["", "a", "^b", "[0-9]$", "zz"];
const EXCLUDES: &[&str] = &["", "c", "^$", "1"];

fn write_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn build_content(lines: &[String], trailing_newline: bool) -> String {
    let mut content = lines.join("\n");
    if trailing_newline && !content.is_empty() {
        content.push('\n');
    }
    content
}

/// Straightforward model: split the whole file and filter every line
fn expected(content: &str, include: &str, exclude: &str) -> Vec<String> {
    let filter = LineFilter::new(Some(include), Some(exclude)).unwrap();
    content
        .split_terminator('\n')
        .filter(|line| filter.matches(line))
        .map(str::to_string)
        .collect()
}

fn request(file: &NamedTempFile, direction: ReadDirection, limit: usize, include: &str, exclude: &str) -> ReadRequest {
    ReadRequest::new(file.path(), direction, limit as i64)
        .with_include(include)
        .with_exclude(exclude)
}

fn lines_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[abc0-9]{0,8}", 0..60)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_head_returns_first_matches(
        lines in lines_strategy(),
        trailing in any::<bool>(),
        limit in 0usize..80,
        include in prop::sample::select(INCLUDES),
        exclude in prop::sample::select(EXCLUDES),
        chunk_size in 1usize..64,
    ) {
        let content = build_content(&lines, trailing);
        let file = write_file(&content);
        let reader = ResourceReader::new(chunk_size);

        let result = reader.read(&request(&file, ReadDirection::Head, limit, include, exclude)).unwrap();

        let all = expected(&content, include, exclude);
        let want: Vec<String> = all.iter().take(limit).cloned().collect();
        prop_assert_eq!(result.lines, want);
    }

    #[test]
    fn prop_tail_returns_last_matches(
        lines in lines_strategy(),
        trailing in any::<bool>(),
        limit in 0usize..80,
        include in prop::sample::select(INCLUDES),
        exclude in prop::sample::select(EXCLUDES),
        chunk_size in 1usize..64,
    ) {
        let content = build_content(&lines, trailing);
        let file = write_file(&content);
        let reader = ResourceReader::new(chunk_size);

        let result = reader.read(&request(&file, ReadDirection::Tail, limit, include, exclude)).unwrap();

        let all = expected(&content, include, exclude);
        let skip = all.len().saturating_sub(limit);
        let want: Vec<String> = all[skip..].to_vec();
        prop_assert_eq!(result.lines, want);
    }

    /// Chunk size only changes how much is read, never what is returned
    #[test]
    fn prop_tail_chunk_size_independent(
        lines in lines_strategy(),
        trailing in any::<bool>(),
        limit in 0usize..30,
        include in prop::sample::select(INCLUDES),
        small in 1usize..16,
        large in 16usize..4096,
    ) {
        let content = build_content(&lines, trailing);
        let file = write_file(&content);

        let a = ResourceReader::new(small)
            .read(&request(&file, ReadDirection::Tail, limit, include, ""))
            .unwrap();
        let b = ResourceReader::new(large)
            .read(&request(&file, ReadDirection::Tail, limit, include, ""))
            .unwrap();
        let c = ResourceReader::default()
            .read(&request(&file, ReadDirection::Tail, limit, include, ""))
            .unwrap();

        prop_assert_eq!(&a.lines, &b.lines);
        prop_assert_eq!(&b.lines, &c.lines);
    }

    /// A final line terminator never adds or removes a line
    #[test]
    fn prop_trailing_terminator_irrelevant(
        lines in prop::collection::vec("[ab]{1,5}", 1..30),
        limit in 1usize..40,
        chunk_size in 1usize..32,
    ) {
        let with = write_file(&build_content(&lines, true));
        let without = write_file(&build_content(&lines, false));
        let reader = ResourceReader::new(chunk_size);

        for direction in [ReadDirection::Head, ReadDirection::Tail] {
            let a = reader.read(&request(&with, direction, limit, "", "")).unwrap();
            let b = reader.read(&request(&without, direction, limit, "", "")).unwrap();
            prop_assert_eq!(&a.lines, &b.lines);
            prop_assert_eq!(a.len(), limit.min(lines.len()));
        }
    }

    /// Reading twice from an unchanged file gives the same answer
    #[test]
    fn prop_read_idempotent(
        lines in lines_strategy(),
        limit in 0usize..40,
        chunk_size in 1usize..64,
    ) {
        let file = write_file(&build_content(&lines, true));
        let reader = ResourceReader::new(chunk_size);

        for direction in [ReadDirection::Head, ReadDirection::Tail] {
            let first = reader.read(&request(&file, direction, limit, "a", "")).unwrap();
            let second = reader.read(&request(&file, direction, limit, "a", "")).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
