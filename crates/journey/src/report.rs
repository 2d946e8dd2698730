use serde::Serialize;

/// Counters for one processing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProcessReport {
    pub features: usize,
    pub lines: usize,
    /// Lines that were cut at least once.
    pub split_lines: usize,
    pub crossings: usize,
    /// Lines left unsplit because the engine failed or timed out.
    pub failures: usize,
}

impl ProcessReport {
    pub(crate) fn record_split(&mut self, source_lines: usize, segments: usize) {
        let crossings = segments.saturating_sub(source_lines);
        if crossings > 0 {
            self.split_lines += 1;
        }
        self.crossings += crossings;
    }
}

impl std::ops::AddAssign for ProcessReport {
    fn add_assign(&mut self, other: Self) {
        self.features += other.features;
        self.lines += other.lines;
        self.split_lines += other.split_lines;
        self.crossings += other.crossings;
        self.failures += other.failures;
    }
}

#[cfg(test)]
mod tests {
    use super::ProcessReport;

    #[test]
    fn records_crossings_per_source_line() {
        let mut r = ProcessReport::default();
        r.record_split(1, 1);
        r.record_split(1, 3);
        r.record_split(2, 3);
        assert_eq!(r.split_lines, 2);
        assert_eq!(r.crossings, 3);
    }

    #[test]
    fn add_assign_sums_fields() {
        let mut a = ProcessReport {
            features: 2,
            lines: 1,
            split_lines: 1,
            crossings: 1,
            failures: 0,
        };
        a += ProcessReport {
            features: 3,
            lines: 2,
            split_lines: 0,
            crossings: 0,
            failures: 1,
        };
        assert_eq!(
            a,
            ProcessReport {
                features: 5,
                lines: 3,
                split_lines: 1,
                crossings: 1,
                failures: 1,
            }
        );
    }
}
