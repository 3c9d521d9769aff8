//! The slice of the game world-state document the poller cares about.
//!
//! The feed uses Mongo extended JSON: ids are wrapped in `{"$oid": ..}` and
//! dates in `{"$date": {"$numberLong": "<millis>"}}`.

use serde::Deserialize;
use time::OffsetDateTime;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorldState {
    #[serde(rename = "ActiveMissions", default)]
    pub active_missions: Vec<ActiveMission>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActiveMission {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(rename = "Node")]
    pub node: String,
    #[serde(rename = "MissionType")]
    pub mission_type: String,
    #[serde(rename = "Hard", default)]
    pub hard: bool,
    #[serde(rename = "Expiry")]
    pub expiry: MongoDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObjectId {
    #[serde(rename = "$oid")]
    pub oid: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoDate {
    #[serde(rename = "$date")]
    pub date: NumberLong,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NumberLong {
    #[serde(rename = "$numberLong")]
    pub number_long: String,
}

impl ActiveMission {
    pub fn id(&self) -> &str {
        &self.id.oid
    }

    /// Expiry truncated to whole seconds, `None` when the feed value is malformed.
    pub fn expiry(&self) -> Option<OffsetDateTime> {
        let millis: i64 = self.expiry.date.number_long.trim().parse().ok()?;
        OffsetDateTime::from_unix_timestamp(millis.div_euclid(1000)).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "Version": 10,
        "ActiveMissions": [
            {
                "_id": { "$oid": "66aa01" },
                "Region": 22,
                "Activation": { "$date": { "$numberLong": "1700000000000" } },
                "Expiry": { "$date": { "$numberLong": "1700003600500" } },
                "Node": "SolNode232",
                "MissionType": "MT_VOID_CASCADE",
                "Modifier": "VoidT5",
                "Hard": true
            },
            {
                "_id": { "$oid": "66aa02" },
                "Expiry": { "$date": { "$numberLong": "garbage" } },
                "Node": "SolNode1",
                "MissionType": "MT_SURVIVAL"
            }
        ]
    }"#;

    #[test]
    fn test_parse_active_missions() {
        let world: WorldState = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(world.active_missions.len(), 2);

        let cascade = &world.active_missions[0];
        assert_eq!(cascade.id(), "66aa01");
        assert!(cascade.hard);
        assert_eq!(
            cascade.expiry().map(|t| t.unix_timestamp()),
            Some(1_700_003_600)
        );

        let survival = &world.active_missions[1];
        assert!(!survival.hard);
        assert!(survival.expiry().is_none());
    }

    #[test]
    fn test_missing_mission_list_defaults_to_empty() {
        let world: WorldState = serde_json::from_str(r#"{"Version": 1}"#).unwrap();
        assert!(world.active_missions.is_empty());
    }
}
