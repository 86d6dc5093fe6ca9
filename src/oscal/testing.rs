//! Plan builders shared by unit tests.

use serde_json::Map;

use super::plan::{
    Activity, AssessmentPlan, ControlSelection, ImportSsp, LocalDefinitions, Metadata,
    ReviewedControls, Step,
};

pub fn reviewed(selections: Vec<ControlSelection>) -> ReviewedControls {
    ReviewedControls {
        control_selections: selections,
        ..ReviewedControls::default()
    }
}

pub fn step(uuid: &str, selections: Option<Vec<ControlSelection>>) -> Step {
    Step {
        uuid: uuid.to_string(),
        title: None,
        description: format!("step {uuid}"),
        props: None,
        reviewed_controls: selections.map(reviewed),
        extra: Map::new(),
    }
}

pub fn activity(
    uuid: &str,
    related: Option<Vec<ControlSelection>>,
    steps: Option<Vec<Step>>,
) -> Activity {
    Activity {
        uuid: uuid.to_string(),
        title: Some(format!("activity {uuid}")),
        description: String::new(),
        props: None,
        steps,
        related_controls: related.map(reviewed),
        extra: Map::new(),
    }
}

pub fn plan(activities: Option<Vec<Activity>>, top: Vec<ControlSelection>) -> AssessmentPlan {
    AssessmentPlan {
        uuid: String::from("0b7d4b5e-3c39-4c0e-9a0e-0f2b7c4b8a11"),
        metadata: Metadata::new("Test Plan", "1.1.3"),
        import_ssp: ImportSsp {
            href: String::from("ssp.json"),
            extra: Map::new(),
        },
        local_definitions: activities.map(|a| LocalDefinitions {
            activities: Some(a),
            extra: Map::new(),
        }),
        reviewed_controls: reviewed(top),
        extra: Map::new(),
    }
}
