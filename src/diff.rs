//! Unified diff rendering for `fix --diff` and `fmt` previews.

use similar::TextDiff;

/// Render a unified diff between the original and rewritten source.
/// Returns an empty string when the contents are identical.
pub fn unified_diff(filename: &str, original: &str, updated: &str) -> String {
    if original == updated {
        return String::new();
    }

    TextDiff::from_lines(original, updated)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{}", filename), &format!("b/{}", filename))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_contents_produce_empty_diff() {
        assert_eq!(unified_diff("Dockerfile", "FROM a\n", "FROM a\n"), "");
    }

    #[test]
    fn changed_lines_appear_with_markers() {
        let diff = unified_diff(
            "Dockerfile",
            "FROM ubuntu\nRUN a\n",
            "FROM ubuntu:22.04\nRUN a\n",
        );
        assert!(diff.contains("--- a/Dockerfile"));
        assert!(diff.contains("+++ b/Dockerfile"));
        assert!(diff.contains("-FROM ubuntu"));
        assert!(diff.contains("+FROM ubuntu:22.04"));
        assert!(diff.contains(" RUN a"));
    }
}
