// Daily reducers over a chronologically sorted reading sequence
use super::buckets::DailyWindow;
use super::reading::{Reading, WINDOW_OPEN};
use super::severity::{SeverityLevel, Thresholds};

/// Bucket index and gas level for every reading that lands inside the window.
fn gas_slots<'a>(
    readings: &'a [Reading],
    window: &'a DailyWindow,
) -> impl Iterator<Item = (usize, f64)> + 'a {
    let offset = window.offset();
    readings.iter().filter_map(move |reading| {
        let instant = reading.instant(offset)?;
        let slot = window.slot(instant)?;
        Some((slot, reading.gas_level?))
    })
}

/// Highest gas level per day; days without readings are 0.
pub fn max_per_day(readings: &[Reading], window: &DailyWindow) -> Vec<f64> {
    gas_slots(readings, window).fold(vec![0.0; window.len()], |mut acc, (slot, level)| {
        acc[slot] = acc[slot].max(level);
        acc
    })
}

/// Lowest gas level per day, `None` for days without readings.
pub fn min_per_day_occupied(readings: &[Reading], window: &DailyWindow) -> Vec<Option<f64>> {
    gas_slots(readings, window).fold(vec![None; window.len()], |mut acc, (slot, level)| {
        acc[slot] = Some(acc[slot].map_or(level, |current: f64| current.min(level)));
        acc
    })
}

/// Lowest gas level per day; days without readings report 0, same as a 0 ppm reading.
pub fn min_per_day(readings: &[Reading], window: &DailyWindow) -> Vec<f64> {
    min_per_day_occupied(readings, window)
        .into_iter()
        .map(|value| value.unwrap_or(0.0))
        .collect()
}

/// Count transitions into `target` per day.
///
/// The cursor starts empty for each call and is never reset at day boundaries,
/// so a crossing is attributed to the day of the reading that enters `target`.
/// Readings before the window start, with unparseable timestamps, or for which
/// `state_of` yields `None` do not move the cursor. Readings after the last day
/// still move it.
fn rising_edges_per_day<S, F>(
    readings: &[Reading],
    window: &DailyWindow,
    state_of: F,
    target: &S,
) -> Vec<f64>
where
    S: PartialEq,
    F: Fn(&Reading) -> Option<S>,
{
    let offset = window.offset();
    let start = window.start();
    let (counts, _) = readings.iter().fold(
        (vec![0.0; window.len()], None::<S>),
        |(mut counts, last), reading| {
            let Some(instant) = reading.instant(offset) else {
                return (counts, last);
            };
            if instant < start {
                return (counts, last);
            }
            let Some(current) = state_of(reading) else {
                return (counts, last);
            };
            let entered = current == *target && last.as_ref() != Some(target);
            if entered {
                if let Some(slot) = window.slot(instant) {
                    counts[slot] += 1.0;
                }
            }
            (counts, Some(current))
        },
    );
    counts
}

/// Entries into the critical level per day.
pub fn critical_entries_per_day(
    readings: &[Reading],
    window: &DailyWindow,
    thresholds: &Thresholds,
) -> Vec<f64> {
    rising_edges_per_day(
        readings,
        window,
        |reading| reading.severity(thresholds),
        &SeverityLevel::Critical,
    )
}

/// Window openings per day, taken from the raw reported window state.
/// A reading without a window state counts as not open.
pub fn window_opens_per_day(readings: &[Reading], window: &DailyWindow) -> Vec<f64> {
    rising_edges_per_day(
        readings,
        window,
        |reading| Some(reading.window_state.clone().unwrap_or_default()),
        &WINDOW_OPEN.to_string(),
    )
}
