//! Key-value store node.
//!
//! Operations: `storeValue`, `getValue`, `deleteValue`.
//! Output items are `{key, ...result}`; incoming data is not passed through.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use symbiosika_store::{Clock, ValueStore, ValueType};

use crate::base::{self, Node, NodeItem};

pub struct KeyValueStoreNode {
    values: ValueStore,
    clock: Arc<dyn Clock>,
}

impl KeyValueStoreNode {
    pub fn new(values: ValueStore, clock: Arc<dyn Clock>) -> Self {
        Self { values, clock }
    }

    fn value_type(item: &NodeItem) -> anyhow::Result<ValueType> {
        match base::optional_string(&item.params, "valueType") {
            Some(raw) => raw.parse::<ValueType>().map_err(anyhow::Error::msg),
            None => Ok(ValueType::Auto),
        }
    }
}

#[async_trait]
impl Node for KeyValueStoreNode {
    fn name(&self) -> &str {
        "symbiosikaKeyValueStore"
    }

    fn description(&self) -> &str {
        "Store and manage key-value pairs"
    }

    fn operations(&self) -> &[&'static str] {
        &["storeValue", "getValue", "deleteValue"]
    }

    async fn execute_item(&self, operation: &str, item: &NodeItem) -> anyhow::Result<Value> {
        let key = base::string_or_empty(&item.params, "key");
        let lifetime = base::f64_or(
            &item.params,
            "valueLifetime",
            self.values.default_lifetime_minutes(),
        );
        let now = self.clock.now();

        let mut out = Map::new();
        out.insert("key".into(), Value::String(key.clone()));

        match operation {
            "storeValue" => {
                let raw = base::param_text(&item.params, "value");
                let declared = Self::value_type(item)?;
                let record = self
                    .values
                    .store_value(&key, raw.as_deref(), declared, lifetime, now)?;
                base::merge_record(&mut out, &record)?;
            }
            "getValue" => {
                let record = self.values.get_value(&key, lifetime, now)?;
                base::merge_record(&mut out, &record)?;
            }
            "deleteValue" => {
                let record = self.values.delete_value(&key, now)?;
                base::merge_record(&mut out, &record)?;
            }
            other => anyhow::bail!("Unknown operation: {other}"),
        }

        debug!(key = %key, operation, "key-value node item done");
        Ok(Value::Object(out))
    }
}
