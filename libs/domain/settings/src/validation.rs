use std::collections::HashSet;

use thiserror::Error;

use crate::AnalyzeSettings;

/// Raised by `Job Controller::start` before a run is issued a `RunId`.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SettingsError {
    #[error("SETTINGS_INVALID: no pipelines declared")]
    NoPipelines,

    #[error("SETTINGS_INVALID: pipeline {uid} declares channel {c_stack} which does not exist in the image inventory (channel count {available})")]
    ChannelOutOfRange { uid: String, c_stack: i32, available: u32 },

    #[error("SETTINGS_INVALID: pipeline {uid} references class {class_id} which is not in the project's classification set")]
    UnknownClass { uid: String, class_id: u16 },
}

/// Validates settings against a known channel count (from the image
/// inventory). Mirrors §6.5's `start()` contract: "non-empty pipeline list,
/// each pipeline's declared channels exist, classification set covers all
/// referenced classes".
pub fn validate(settings: &AnalyzeSettings, available_channels: u32) -> Result<(), SettingsError> {
    if settings.pipelines.is_empty() {
        return Err(SettingsError::NoPipelines);
    }

    let known_classes: HashSet<u16> =
        settings.project_settings.classification.classes.iter().map(|c| c.class_id.0).collect();

    for pipeline in &settings.pipelines {
        if !pipeline.is_channel_agnostic() {
            let c_stack = pipeline.pipeline_setup.c_stack_index;
            if c_stack as u32 >= available_channels {
                return Err(SettingsError::ChannelOutOfRange {
                    uid: pipeline.meta.uid.clone(),
                    c_stack,
                    available: available_channels,
                });
            }
        }

        let default_class = pipeline.pipeline_setup.default_class_id.0;
        if !known_classes.contains(&default_class) {
            return Err(SettingsError::UnknownClass {
                uid: pipeline.meta.uid.clone(),
                class_id: default_class,
            });
        }
    }

    Ok(())
}
