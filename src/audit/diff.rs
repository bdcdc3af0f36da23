//! Line-based unified diff.
//!
//! Produces standard unified-diff output (`---`/`+++` headers, `@@` hunks
//! with three lines of context) from two texts. Applying the emitted hunks to
//! the old text reproduces the new text exactly, which is what makes the
//! changelog usable for recovery.

/// One step in the edit script. Positions are 0-based indices into the old
/// and new line arrays at the point the op applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpKind {
    Equal,
    Delete,
    Insert,
}

#[derive(Debug, Clone, Copy)]
struct Op {
    kind: OpKind,
    old_pos: usize,
    new_pos: usize,
}

/// Compute a unified diff between `old` and `new` with `context` lines of
/// surrounding context. Returns an empty string when the texts are equal.
pub fn unified_diff(
    old: &str,
    new: &str,
    from_label: &str,
    to_label: &str,
    context: usize,
) -> String {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();

    let ops = edit_script(&old_lines, &new_lines);
    if !ops.iter().any(|op| op.kind != OpKind::Equal) {
        return String::new();
    }

    let mut out = String::new();
    out.push_str(&format!("--- {from_label}\n"));
    out.push_str(&format!("+++ {to_label}\n"));

    for (start, end) in hunk_ranges(&ops, context) {
        let hunk = &ops[start..end];
        let old_count = hunk
            .iter()
            .filter(|op| op.kind != OpKind::Insert)
            .count();
        let new_count = hunk
            .iter()
            .filter(|op| op.kind != OpKind::Delete)
            .count();
        let old_start = hunk[0].old_pos;
        let new_start = hunk[0].new_pos;

        out.push_str(&format!(
            "@@ -{} +{} @@\n",
            format_range(old_start, old_count),
            format_range(new_start, new_count)
        ));

        for op in hunk {
            match op.kind {
                OpKind::Equal => {
                    out.push(' ');
                    out.push_str(old_lines[op.old_pos]);
                }
                OpKind::Delete => {
                    out.push('-');
                    out.push_str(old_lines[op.old_pos]);
                }
                OpKind::Insert => {
                    out.push('+');
                    out.push_str(new_lines[op.new_pos]);
                }
            }
            out.push('\n');
        }
    }

    out
}

/// Count added and removed lines in a rendered diff, excluding the
/// `+++`/`---` file headers.
pub fn added_removed(diff: &str) -> (usize, usize) {
    let mut additions = 0;
    let mut deletions = 0;
    for line in diff.lines() {
        if line.starts_with('+') && !line.starts_with("+++") {
            additions += 1;
        } else if line.starts_with('-') && !line.starts_with("---") {
            deletions += 1;
        }
    }
    (additions, deletions)
}

/// Render one side of a `@@` header: `start,count` with the count omitted
/// when it is 1 and the start shifted back when the range is empty.
fn format_range(start: usize, count: usize) -> String {
    match count {
        0 => format!("{start},0"),
        1 => format!("{}", start + 1),
        _ => format!("{},{}", start + 1, count),
    }
}

/// Longest-common-subsequence edit script over lines.
///
/// Suffix-form DP table so the backtrack walks forward through both inputs.
fn edit_script(old: &[&str], new: &[&str]) -> Vec<Op> {
    let n = old.len();
    let m = new.len();

    let mut table = vec![vec![0u32; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[i][j] = if old[i] == new[j] {
                table[i + 1][j + 1] + 1
            } else {
                table[i + 1][j].max(table[i][j + 1])
            };
        }
    }

    let mut ops = Vec::with_capacity(n.max(m));
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i] == new[j] {
            ops.push(Op {
                kind: OpKind::Equal,
                old_pos: i,
                new_pos: j,
            });
            i += 1;
            j += 1;
        } else if table[i + 1][j] >= table[i][j + 1] {
            ops.push(Op {
                kind: OpKind::Delete,
                old_pos: i,
                new_pos: j,
            });
            i += 1;
        } else {
            ops.push(Op {
                kind: OpKind::Insert,
                old_pos: i,
                new_pos: j,
            });
            j += 1;
        }
    }
    while i < n {
        ops.push(Op {
            kind: OpKind::Delete,
            old_pos: i,
            new_pos: j,
        });
        i += 1;
    }
    while j < m {
        ops.push(Op {
            kind: OpKind::Insert,
            old_pos: i,
            new_pos: j,
        });
        j += 1;
    }
    ops
}

/// Group changed ops into hunk ranges over the op array. Adjacent change
/// groups separated by at most `2 * context` equal lines merge into one hunk.
fn hunk_ranges(ops: &[Op], context: usize) -> Vec<(usize, usize)> {
    let changes: Vec<usize> = ops
        .iter()
        .enumerate()
        .filter(|(_, op)| op.kind != OpKind::Equal)
        .map(|(idx, _)| idx)
        .collect();

    let mut groups: Vec<(usize, usize)> = Vec::new();
    for idx in changes {
        match groups.last_mut() {
            Some((_, last)) if idx - *last <= 2 * context + 1 => *last = idx,
            _ => groups.push((idx, idx)),
        }
    }

    groups
        .into_iter()
        .map(|(first, last)| {
            (
                first.saturating_sub(context),
                (last + context + 1).min(ops.len()),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Apply a unified diff back onto `old`. Test-only reference
    /// implementation used to verify the round-trip property.
    fn apply(old: &str, diff: &str) -> String {
        let old_lines: Vec<&str> = old.lines().collect();
        let mut out: Vec<String> = Vec::new();
        let mut old_pos = 0usize;

        for line in diff.lines() {
            if line.starts_with("--- ") || line.starts_with("+++ ") {
                continue;
            }
            if let Some(header) = line.strip_prefix("@@ -") {
                let old_range = header.split_whitespace().next().unwrap();
                let mut parts = old_range.split(',');
                let start: usize = parts.next().unwrap().parse().unwrap();
                let count: usize = parts.next().map_or(1, |c| c.parse().unwrap());
                let hunk_start = if count == 0 { start } else { start - 1 };
                while old_pos < hunk_start {
                    out.push(old_lines[old_pos].to_string());
                    old_pos += 1;
                }
            } else if let Some(ctx) = line.strip_prefix(' ') {
                out.push(ctx.to_string());
                old_pos += 1;
            } else if line.starts_with('-') {
                old_pos += 1;
            } else if let Some(added) = line.strip_prefix('+') {
                out.push(added.to_string());
            }
        }
        while old_pos < old_lines.len() {
            out.push(old_lines[old_pos].to_string());
            old_pos += 1;
        }

        let mut text = out.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        text
    }

    #[test]
    fn identical_texts_yield_empty_diff() {
        let text = "a\nb\nc\n";
        assert_eq!(unified_diff(text, text, "old", "new", 3), "");
    }

    #[test]
    fn simple_replacement() {
        let old = "a\nb\nc\n";
        let new = "a\nB\nc\n";
        let diff = unified_diff(old, new, "old", "new", 3);
        assert!(diff.starts_with("--- old\n+++ new\n"));
        assert!(diff.contains("@@ -1,3 +1,3 @@"));
        assert!(diff.contains("-b\n"));
        assert!(diff.contains("+B\n"));
        assert_eq!(apply(old, &diff), new);
    }

    #[test]
    fn insertion_from_empty() {
        let old = "";
        let new = "one\ntwo\n";
        let diff = unified_diff(old, new, "old", "new", 3);
        assert!(diff.contains("@@ -0,0 +1,2 @@"));
        assert_eq!(apply(old, &diff), new);
    }

    #[test]
    fn deletion_to_empty() {
        let old = "one\ntwo\n";
        let new = "";
        let diff = unified_diff(old, new, "old", "new", 3);
        assert!(diff.contains("@@ -1,2 +0,0 @@"));
        assert_eq!(apply(old, &diff), new);
    }

    #[test]
    fn distant_changes_make_separate_hunks() {
        let old: String = (0..40).map(|i| format!("line {i}\n")).collect();
        let mut new_lines: Vec<String> = (0..40).map(|i| format!("line {i}")).collect();
        new_lines[2] = "changed near top".into();
        new_lines[35] = "changed near bottom".into();
        let new = new_lines.join("\n") + "\n";

        let diff = unified_diff(&old, &new, "old", "new", 3);
        let hunk_count = diff.lines().filter(|l| l.starts_with("@@")).count();
        assert_eq!(hunk_count, 2);
        assert_eq!(apply(&old, &diff), new);
    }

    #[test]
    fn close_changes_merge_into_one_hunk() {
        let old: String = (0..20).map(|i| format!("line {i}\n")).collect();
        let mut new_lines: Vec<String> = (0..20).map(|i| format!("line {i}")).collect();
        new_lines[5] = "first change".into();
        new_lines[9] = "second change".into();
        let new = new_lines.join("\n") + "\n";

        let diff = unified_diff(&old, &new, "old", "new", 3);
        let hunk_count = diff.lines().filter(|l| l.starts_with("@@")).count();
        assert_eq!(hunk_count, 1);
        assert_eq!(apply(&old, &diff), new);
    }

    #[test]
    fn json_document_round_trip() {
        let old = "{\n  \"hardware\": {\n    \"cpu\": \"EPYC 7453\"\n  }\n}\n";
        let new = "{\n  \"hardware\": {\n    \"cpu\": \"EPYC 7453\"\n  },\n  \"servers\": {\n    \"web\": {\n      \"ip\": \"10.0.0.5\"\n    }\n  }\n}\n";
        let diff = unified_diff(old, new, "old", "new", 3);
        assert!(diff.contains("+      \"ip\": \"10.0.0.5\"\n"));
        assert_eq!(apply(old, &diff), new);
    }

    #[test]
    fn added_removed_ignores_file_headers() {
        let diff = "--- old\n+++ new\n@@ -1,2 +1,2 @@\n-a\n+b\n c\n";
        assert_eq!(added_removed(diff), (1, 1));
    }
}
