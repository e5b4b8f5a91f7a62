use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use run_classifier::RunIdentifier;
use tracing::debug;

use crate::{
    ManifestRecord, ManifestStore, StoreError, ADDED_AT_ATTRIBUTE, ADDED_BY_ATTRIBUTE,
    RUN_ID_ATTRIBUTE, TO_SKIP_ATTRIBUTE,
};

/// Manifest table stored in DynamoDB, keyed by [`RUN_ID_ATTRIBUTE`].
#[derive(Debug, Clone)]
pub struct DynamoManifestStore {
    client: Client,
    table_name: String,
}

impl DynamoManifestStore {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

#[async_trait]
impl ManifestStore for DynamoManifestStore {
    async fn contains(&self, identifier: &RunIdentifier) -> Result<bool, StoreError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(RUN_ID_ATTRIBUTE, AttributeValue::S(identifier.to_string()))
            .send()
            .await
            .map_err(|err| {
                StoreError::Access(format!(
                    "get_item {identifier} from {}: {}",
                    self.table_name,
                    DisplayErrorContext(&err)
                ))
            })?;
        Ok(output.item().is_some())
    }

    async fn insert_skip_record(
        &self,
        identifier: &RunIdentifier,
        tool_version: &str,
        now_epoch_seconds: i64,
    ) -> Result<(), StoreError> {
        let record = ManifestRecord::skip(identifier.clone(), tool_version, now_epoch_seconds);
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item_from_record(&record)))
            .send()
            .await
            .map_err(|err| {
                StoreError::Access(format!(
                    "put_item {identifier} into {}: {}",
                    self.table_name,
                    DisplayErrorContext(&err)
                ))
            })?;
        debug!(table = %self.table_name, run_id = %identifier, "put skip record");
        Ok(())
    }
}

pub(crate) fn item_from_record(record: &ManifestRecord) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (
            RUN_ID_ATTRIBUTE.to_string(),
            AttributeValue::S(record.run_id.to_string()),
        ),
        (
            ADDED_BY_ATTRIBUTE.to_string(),
            AttributeValue::S(record.added_by.clone()),
        ),
        (
            ADDED_AT_ATTRIBUTE.to_string(),
            AttributeValue::N(record.added_at.to_string()),
        ),
        (
            TO_SKIP_ATTRIBUTE.to_string(),
            AttributeValue::Bool(record.to_skip),
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_record_item_uses_manifest_attribute_types() {
        let record = ManifestRecord::skip(
            RunIdentifier::new("enriched/archive/run=2024-01-01-00-00-00/"),
            "backfill-script-0.1.0",
            1_705_276_800,
        );
        let item = item_from_record(&record);

        assert_eq!(item.len(), 4);
        assert_eq!(
            item[RUN_ID_ATTRIBUTE],
            AttributeValue::S("enriched/archive/run=2024-01-01-00-00-00/".into())
        );
        assert_eq!(
            item[ADDED_BY_ATTRIBUTE],
            AttributeValue::S("backfill-script-0.1.0".into())
        );
        assert_eq!(item[ADDED_AT_ATTRIBUTE], AttributeValue::N("1705276800".into()));
        assert_eq!(item[TO_SKIP_ATTRIBUTE], AttributeValue::Bool(true));
    }
}
