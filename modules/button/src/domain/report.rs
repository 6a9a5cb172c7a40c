use crate::contract::model::RecencyEntry;
use crate::domain::directory::UserDirectory;
use crate::domain::repo::PressLog;

/// Every user who ever pressed, ordered by their latest press, oldest first.
/// Users with equal times keep directory order.
pub async fn recency_report(
    press_log: &dyn PressLog,
    directory: &dyn UserDirectory,
) -> anyhow::Result<Vec<RecencyEntry>> {
    let mut entries = Vec::new();
    for user in directory.all() {
        if let Some(press) = press_log.most_recent_press_by_user(&user.user_id).await? {
            insert_sorted(
                &mut entries,
                RecencyEntry {
                    name: user.name,
                    time_millis: press.time_millis,
                },
            );
        }
    }
    Ok(entries)
}

fn insert_sorted(entries: &mut Vec<RecencyEntry>, entry: RecencyEntry) {
    let at = entries.partition_point(|e| e.time_millis <= entry.time_millis);
    entries.insert(at, entry);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, time_millis: i64) -> RecencyEntry {
        RecencyEntry {
            name: name.into(),
            time_millis,
        }
    }

    #[test]
    fn inserts_keep_ascending_order_and_tie_arrival() {
        let mut entries = Vec::new();
        for e in [entry("c", 30), entry("a", 10), entry("b", 20), entry("a2", 10)] {
            insert_sorted(&mut entries, e);
        }

        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a", "a2", "b", "c"]);
    }
}
