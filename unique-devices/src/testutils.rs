use crate::store::{DeviceRow, MemoryStore};
use crate::types::Granularity;
use chrono::NaiveDate;

/// One daily row per day in `[start, end]`, dates given as `YYYY-MM-DD`.
pub fn daily_fixture(project: &str, access_site: &str, start: &str, end: &str) -> MemoryStore {
    let start: NaiveDate = start.parse().expect("fixture start date");
    let end: NaiveDate = end.parse().expect("fixture end date");

    let mut store = MemoryStore::new();
    for (n, day) in start.iter_days().take_while(|day| *day <= end).enumerate() {
        let devices = 1_000 + n as u64;
        store.insert(
            project,
            access_site,
            Granularity::Daily,
            DeviceRow {
                timestamp: format!("{}00", day.format("%Y%m%d")),
                devices,
                offset: 10,
                underestimate: devices - 10,
            },
        );
    }
    store
}
