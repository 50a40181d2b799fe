// Blackbox (ignore-list) filter
//
// Pure decision logic over per-script boundary positions and URL patterns.
// Nothing here touches the runtime; the agent feeds it locations and acts on
// the verdict (auto-step, auto-resume, or surface the pause).

use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

use crate::protocol::{DebuggerError, DebuggerResult};
use crate::runtime::ScriptId;

/// Per-session blackbox configuration. Each `set_*` call replaces the
/// corresponding piece wholesale; nothing is merged.
#[derive(Debug, Default)]
pub struct BlackboxFilter {
    /// Boundary positions per script, character offsets in the originating
    /// source. Segments alternate starting "not blackboxed" before the first
    /// boundary.
    ranges: HashMap<ScriptId, Vec<u64>>,
    /// Single matcher compiled from all URL patterns as one alternation.
    pattern: Option<Regex>,
    blackbox_anonymous: bool,
}

impl BlackboxFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the boundary positions for one script. Positions must be
    /// non-decreasing; an empty list clears blackboxing for the script.
    pub fn set_ranges(&mut self, script_id: ScriptId, positions: Vec<u64>) -> DebuggerResult<()> {
        if positions.windows(2).any(|w| w[0] > w[1]) {
            return Err(DebuggerError::InvalidRanges(script_id));
        }

        if positions.is_empty() {
            self.ranges.remove(&script_id);
        } else {
            debug!(script_id, boundaries = positions.len(), "blackboxed ranges set");
            self.ranges.insert(script_id, positions);
        }
        Ok(())
    }

    /// Replace the URL pattern list, compiled into a single alternation.
    /// An empty list clears pattern matching.
    pub fn set_patterns(
        &mut self,
        patterns: &[String],
        blackbox_anonymous: bool,
    ) -> DebuggerResult<()> {
        self.pattern = if patterns.is_empty() {
            None
        } else {
            let alternation = patterns.join("|");
            let compiled = Regex::new(&alternation)
                .map_err(|e| DebuggerError::InvalidPattern(e.to_string()))?;
            Some(compiled)
        };
        self.blackbox_anonymous = blackbox_anonymous;
        Ok(())
    }

    /// Whether a location is blackboxed. `position` is the character offset
    /// from the start of the script source, the same unit `set_ranges`
    /// boundaries use. A script with no configuration is never blackboxed.
    pub fn is_blackboxed(
        &self,
        script_id: ScriptId,
        script_url: Option<&str>,
        position: u64,
    ) -> bool {
        match script_url {
            Some(url) if !url.is_empty() => {
                if let Some(pattern) = &self.pattern {
                    if pattern.is_match(url) {
                        return true;
                    }
                }
            }
            _ => {
                if self.blackbox_anonymous {
                    return true;
                }
            }
        }

        match self.ranges.get(&script_id) {
            // Parity rule: an odd number of boundaries at or below the
            // position puts it inside a blackboxed segment.
            Some(bounds) => bounds.partition_point(|b| *b <= position) % 2 == 1,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_parity() {
        let mut filter = BlackboxFilter::new();
        filter.set_ranges(1, vec![10, 20, 30, 40]).unwrap();

        assert!(!filter.is_blackboxed(1, Some("app.js"), 5));
        assert!(filter.is_blackboxed(1, Some("app.js"), 15));
        assert!(!filter.is_blackboxed(1, Some("app.js"), 25));
        assert!(filter.is_blackboxed(1, Some("app.js"), 35));
        assert!(!filter.is_blackboxed(1, Some("app.js"), 45));
    }

    #[test]
    fn test_boundary_starts_its_segment() {
        let mut filter = BlackboxFilter::new();
        filter.set_ranges(1, vec![10, 20]).unwrap();

        // [10, 20) is blackboxed: the start boundary is inside, the end
        // boundary is outside.
        assert!(filter.is_blackboxed(1, None, 10));
        assert!(!filter.is_blackboxed(1, None, 20));
    }

    #[test]
    fn test_unconfigured_script_never_blackboxed() {
        let filter = BlackboxFilter::new();
        assert!(!filter.is_blackboxed(9, Some("whatever.js"), 0));
        assert!(!filter.is_blackboxed(9, None, 1000));
    }

    #[test]
    fn test_decreasing_positions_rejected() {
        let mut filter = BlackboxFilter::new();
        let err = filter.set_ranges(2, vec![10, 5]).unwrap_err();
        assert_eq!(err, DebuggerError::InvalidRanges(2));
    }

    #[test]
    fn test_equal_positions_allowed() {
        // An empty segment is degenerate but well-formed.
        let mut filter = BlackboxFilter::new();
        filter.set_ranges(2, vec![10, 10, 20]).unwrap();
        assert!(filter.is_blackboxed(2, None, 25));
    }

    #[test]
    fn test_ranges_replaced_wholesale() {
        let mut filter = BlackboxFilter::new();
        filter.set_ranges(1, vec![10, 20]).unwrap();
        filter.set_ranges(1, vec![100, 200]).unwrap();

        assert!(!filter.is_blackboxed(1, None, 15));
        assert!(filter.is_blackboxed(1, None, 150));
    }

    #[test]
    fn test_empty_ranges_clear_script() {
        let mut filter = BlackboxFilter::new();
        filter.set_ranges(1, vec![10, 20]).unwrap();
        filter.set_ranges(1, vec![]).unwrap();

        assert!(!filter.is_blackboxed(1, None, 15));
    }

    #[test]
    fn test_url_patterns_match_as_alternation() {
        let mut filter = BlackboxFilter::new();
        filter
            .set_patterns(&["node_modules".to_string(), "^vendor/".to_string()], false)
            .unwrap();

        assert!(filter.is_blackboxed(1, Some("node_modules/lodash/index.js"), 0));
        assert!(filter.is_blackboxed(2, Some("vendor/bundle.js"), 0));
        assert!(!filter.is_blackboxed(3, Some("src/app.js"), 0));
    }

    #[test]
    fn test_anonymous_scripts() {
        let mut filter = BlackboxFilter::new();
        filter.set_patterns(&[], true).unwrap();

        assert!(filter.is_blackboxed(1, None, 0));
        assert!(filter.is_blackboxed(1, Some(""), 0));
        assert!(!filter.is_blackboxed(1, Some("app.js"), 0));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let mut filter = BlackboxFilter::new();
        let err = filter.set_patterns(&["[unclosed".to_string()], false).unwrap_err();
        assert!(matches!(err, DebuggerError::InvalidPattern(_)));
    }

    #[test]
    fn test_pattern_and_ranges_are_independent() {
        let mut filter = BlackboxFilter::new();
        filter.set_patterns(&["vendor".to_string()], false).unwrap();
        filter.set_ranges(1, vec![10, 20]).unwrap();

        // URL match wins regardless of position.
        assert!(filter.is_blackboxed(1, Some("vendor.js"), 5));
        // Range verdict applies when the URL does not match.
        assert!(filter.is_blackboxed(1, Some("app.js"), 15));
        assert!(!filter.is_blackboxed(1, Some("app.js"), 5));
    }
}
