//! Pull the entity identifiers the projection engine needs out of an
//! opaque raw event payload. The wire format of the payload is provider
//! defined; this module only knows a handful of candidate key spellings.

use serde_json::Value;

const TASK_PDA_KEYS: &[&str] = &["task_pda", "taskPda", "task"];
const DISPUTE_ID_KEYS: &[&str] = &["dispute_id", "disputeId", "dispute_pda", "disputePda"];

fn find_str(event: &Value, keys: &[&str]) -> Option<String> {
    let obj = event.as_object()?;
    keys.iter().find_map(|k| obj.get(*k)).and_then(|v| v.as_str()).map(str::to_string)
}

pub fn task_pda(event: &Value) -> Option<String> {
    find_str(event, TASK_PDA_KEYS)
}

pub fn dispute_id(event: &Value) -> Option<String> {
    find_str(event, DISPUTE_ID_KEYS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_snake_and_camel_case_task_pda() {
        assert_eq!(task_pda(&json!({"task_pda": "t1"})), Some("t1".into()));
        assert_eq!(task_pda(&json!({"taskPda": "t1"})), Some("t1".into()));
        assert_eq!(task_pda(&json!({})), None);
    }

    #[test]
    fn reads_dispute_id_variants() {
        assert_eq!(dispute_id(&json!({"disputeId": "d1"})), Some("d1".into()));
        assert_eq!(dispute_id(&json!({"dispute_pda": "d1"})), Some("d1".into()));
    }
}
