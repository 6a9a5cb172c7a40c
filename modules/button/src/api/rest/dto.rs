use serde::{Deserialize, Serialize};

use crate::contract::model::{ButtonStatus, RecencyEntry};

/// REST DTO for a press request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PressReq {
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PressResp {
    pub time: i64,
}

/// REST DTO for the button status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DataResp {
    pub presses: i64,
    pub who_pressed: String,
    pub expiry: i64,
    pub millis_per_press: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WhoWasLastEntry {
    pub name: String,
    pub time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WhoWasLastResp {
    pub users: Vec<WhoWasLastEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorDto {
    pub error: String,
}

impl From<ButtonStatus> for DataResp {
    fn from(s: ButtonStatus) -> Self {
        Self {
            presses: s.presses,
            who_pressed: s.who_pressed,
            expiry: s.expiry,
            millis_per_press: s.millis_per_press,
        }
    }
}

impl From<RecencyEntry> for WhoWasLastEntry {
    fn from(e: RecencyEntry) -> Self {
        Self {
            name: e.name,
            time: e.time_millis,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_names_are_camel_case() {
        let req: PressReq = serde_json::from_value(json!({ "userId": "abc" })).unwrap();
        assert_eq!(req.user_id, "abc");

        let data = DataResp::from(ButtonStatus {
            presses: 3,
            who_pressed: "Ann".into(),
            expiry: 10,
            millis_per_press: 2,
        });
        assert_eq!(
            serde_json::to_value(data).unwrap(),
            json!({ "presses": 3, "whoPressed": "Ann", "expiry": 10, "millisPerPress": 2 })
        );
    }
}
