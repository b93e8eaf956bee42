use tracing::{debug, info};

use crate::models::{
    Assignment, AttendanceRecord, Class, Enrollment, Grade, Record, Student,
};
use crate::store::{Query, RecordStore, StoreResult};

/// Checks that every table ClassHub reads answers a projected query.
pub async fn verify_tables(store: &dyn RecordStore) -> StoreResult<()> {
    verify::<Student>(store).await?;
    verify::<Class>(store).await?;
    verify::<Enrollment>(store).await?;
    verify::<Assignment>(store).await?;
    verify::<Grade>(store).await?;
    verify::<AttendanceRecord>(store).await?;

    info!("All record store tables verified");
    Ok(())
}

async fn verify<T: Record>(store: &dyn RecordStore) -> StoreResult<()> {
    let query = Query::new(T::FIELDS).limit(1);
    let rows = store.fetch_records(T::TABLE, &query).await?;
    debug!(table = T::TABLE, sampled = rows.len(), "Table reachable");
    Ok(())
}
