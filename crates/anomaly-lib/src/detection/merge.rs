//! Interval merge for detected graph anomalies

use crate::models::GraphAnomaly;

/// Collapse overlapping or touching anomalies of the same type.
///
/// A missing start means "before the graph" and a missing end means
/// "still ongoing", so an open-ended anomaly absorbs every later one of its
/// type. Output is ordered by type, then start time.
pub fn merge_overlapping(mut anomalies: Vec<GraphAnomaly>) -> Vec<GraphAnomaly> {
    anomalies.sort_by_key(|a| (a.anomaly_type, a.start_time));

    let mut merged: Vec<GraphAnomaly> = Vec::with_capacity(anomalies.len());
    for anomaly in anomalies {
        match merged.last_mut() {
            Some(current) if overlaps(current, &anomaly) => absorb(current, anomaly),
            _ => merged.push(anomaly),
        }
    }
    merged
}

fn overlaps(current: &GraphAnomaly, next: &GraphAnomaly) -> bool {
    if current.anomaly_type != next.anomaly_type {
        return false;
    }
    match (next.start_time, current.end_time) {
        (Some(start), Some(end)) => start <= end,
        _ => true,
    }
}

fn absorb(current: &mut GraphAnomaly, next: GraphAnomaly) {
    current.end_time = match (current.end_time, next.end_time) {
        (Some(a), Some(b)) => Some(a.max(b)),
        _ => None,
    };
    current.magnitude = current.magnitude.max(next.magnitude);
    current.affected_nodes.extend(next.affected_nodes);
}
