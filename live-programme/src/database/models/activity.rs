//! Activity record database model.

use sqlx::FromRow;

use crate::database::time::{datetime_to_ms, ms_to_datetime};
use crate::domain::ActivityRecord;

#[derive(Debug, Clone, FromRow)]
pub struct ActivityRecordDbModel {
    pub id: String,
    pub streamer_id: String,
    pub start_time: i64,
    pub end_time: i64,
    pub platform: String,
    pub created_at: i64,
}

impl From<&ActivityRecord> for ActivityRecordDbModel {
    fn from(record: &ActivityRecord) -> Self {
        Self {
            id: record.id.clone(),
            streamer_id: record.streamer_id.clone(),
            start_time: datetime_to_ms(record.start_time),
            end_time: datetime_to_ms(record.end_time),
            platform: record.platform.clone(),
            created_at: datetime_to_ms(record.created_at),
        }
    }
}

impl From<ActivityRecordDbModel> for ActivityRecord {
    fn from(model: ActivityRecordDbModel) -> Self {
        Self {
            id: model.id,
            streamer_id: model.streamer_id,
            start_time: ms_to_datetime(model.start_time),
            end_time: ms_to_datetime(model.end_time),
            platform: model.platform,
            created_at: ms_to_datetime(model.created_at),
        }
    }
}
