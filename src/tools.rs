//! Small standalone utilities that ride alongside the main pipeline.

/// One BLAST-tabular alignment record as consumed by [`post_filter`].
#[derive(Debug, Clone, PartialEq)]
pub struct TabRecord {
    pub query_id: String,
    pub evalue: f64,
}

/// Re-implements `filter_blasttab`: keeps at most `max_alignments` records
/// per query (counted in input order, first one free), each still subject
/// to `max_evalue`. The per-query counter resets whenever `query_id`
/// changes, so the input must already be grouped by query.
pub fn post_filter(records: &[TabRecord], max_alignments: usize, max_evalue: f64) -> Vec<TabRecord> {
    let mut out = Vec::new();
    let mut current_query: Option<&str> = None;
    let mut query_hit = 0usize;
    for r in records {
        match current_query {
            Some(q) if q == r.query_id => query_hit += 1,
            _ => {
                current_query = Some(&r.query_id);
                query_hit = 0;
            }
        }
        if query_hit < max_alignments && r.evalue <= max_evalue {
            out.push(r.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(q: &str, e: f64) -> TabRecord {
        TabRecord { query_id: q.to_string(), evalue: e }
    }

    #[test]
    fn counter_resets_per_query_and_evalue_cutoff_applies() {
        let records = vec![
            rec("q1", 0.0001),
            rec("q1", 0.0005),
            rec("q1", 1.0), // fails evalue cutoff
            rec("q2", 0.0002),
        ];
        let kept = post_filter(&records, 2, 0.01);
        assert_eq!(kept.len(), 3);
        assert_eq!(kept[2].query_id, "q2");
    }

    #[test]
    fn max_alignments_truncates_within_a_query() {
        let records = vec![rec("q1", 0.0), rec("q1", 0.0), rec("q1", 0.0)];
        let kept = post_filter(&records, 2, 1.0);
        assert_eq!(kept.len(), 2);
    }
}
