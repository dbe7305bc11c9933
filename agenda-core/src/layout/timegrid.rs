//! Day/week time-grid geometry.
//!
//! Vertical position is linear in minutes since midnight:
//! `top = minutes / 60 * hour_height`. Heights are floored at the configured
//! minimum duration so very short appointments stay clickable.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use super::{LayoutBlock, Placement, first_fit, select_visible};
use crate::appointment::Appointment;
use crate::config::LayoutConfig;
use crate::time::start_of_day;

/// Lay out one day column. Blocks come back in input order.
pub(super) fn layout_column<'a>(
    config: &LayoutConfig,
    day: NaiveDate,
    column: usize,
    appointments: &'a [Appointment],
) -> Vec<LayoutBlock<'a>> {
    let day_start = start_of_day(day);
    let day_end = day_start + Duration::days(1);
    let minutes_to_px = |minutes: i64| minutes as f64 / 60.0 * config.hour_height;

    let mut blocks: Vec<LayoutBlock<'a>> = select_visible(appointments, day_start, day_end)
        .into_iter()
        .map(|appt| {
            let visible_start = appt.start.max(day_start);
            let visible_end = appt.end.min(day_end);
            let offset = (visible_start - day_start).num_minutes();
            let duration = (visible_end - visible_start)
                .num_minutes()
                .max(config.min_block_duration_minutes);

            LayoutBlock {
                appointment: appt,
                visible_start,
                visible_end,
                column,
                row: 0,
                clipped: appt.start < day_start || appt.end > day_end,
                placement: Placement::TimeGrid {
                    top: minutes_to_px(offset),
                    height: minutes_to_px(duration),
                    lane: 0,
                    lanes: 1,
                },
            }
        })
        .collect();

    assign_lanes(config, &mut blocks);
    blocks
}

/// Split overlapping blocks into side-by-side lanes.
///
/// Blocks are packed first-fit in order of visible start (ties by input
/// order) using their rendered extent, so a short block padded to the
/// minimum height still claims the space it is drawn in. Every block of a
/// connected overlap cluster reports the cluster's lane count.
fn assign_lanes(config: &LayoutConfig, blocks: &mut [LayoutBlock<'_>]) {
    let min = Duration::minutes(config.min_block_duration_minutes);
    let extents: Vec<(NaiveDateTime, NaiveDateTime)> = blocks
        .iter()
        .map(|b| (b.visible_start, b.visible_end.max(b.visible_start + min)))
        .collect();

    let mut order: Vec<usize> = (0..blocks.len()).collect();
    order.sort_by_key(|&i| extents[i].0);

    let mut lane_of = vec![0; blocks.len()];
    let mut lane_count = vec![1; blocks.len()];
    let mut cluster: Vec<usize> = Vec::new();
    let mut tracks: Vec<Vec<(NaiveDateTime, NaiveDateTime)>> = Vec::new();
    let mut cluster_end: Option<NaiveDateTime> = None;

    for i in order {
        let (start, end) = extents[i];
        if cluster_end.is_some_and(|e| start >= e) {
            for &j in &cluster {
                lane_count[j] = tracks.len();
            }
            cluster.clear();
            tracks.clear();
            cluster_end = None;
        }
        lane_of[i] = first_fit(&mut tracks, (start, end), |a, b| a.0 < b.1 && b.0 < a.1);
        cluster.push(i);
        cluster_end = Some(cluster_end.map_or(end, |e| e.max(end)));
    }
    for &j in &cluster {
        lane_count[j] = tracks.len();
    }

    for (i, block) in blocks.iter_mut().enumerate() {
        block.row = lane_of[i];
        if let Placement::TimeGrid { lane, lanes, .. } = &mut block.placement {
            *lane = lane_of[i];
            *lanes = lane_count[i];
        }
    }
}
