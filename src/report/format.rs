use crate::models::TimeEntry;

/// Renders a duration as `H:MM:SS`. Hours are not wrapped at 24.
pub fn format_duration(millis: u64) -> String {
    let total_secs = millis / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours}:{minutes:02}:{seconds:02}")
}

/// Entries in display order: newest `start_time` first, ties by `id`.
pub fn history(entries: &[TimeEntry]) -> Vec<TimeEntry> {
    let mut ordered = entries.to_vec();
    ordered.sort_by(|a, b| {
        b.start_time
            .cmp(&a.start_time)
            .then_with(|| a.id.cmp(&b.id))
    });
    ordered
}
