use std::collections::HashMap;

use super::model::{FormatRecord, AUDIO_ONLY_RESOLUTION};

/// Which formats a console variant lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPolicy {
    /// Combined audio+video streams only. Rows without an id are dropped by
    /// both policies since they cannot be selected.
    Progressive,
    /// Everything with an id, except audio-only rows whose note does not say
    /// "audio".
    Permissive,
}

impl FilterPolicy {
    pub fn keeps(self, format: &FormatRecord) -> bool {
        match self {
            Self::Progressive => !format.id.is_empty() && format.is_progressive(),
            Self::Permissive => {
                let audio_note = format
                    .note
                    .as_deref()
                    .is_some_and(|note| note.to_lowercase().contains("audio"));
                !format.id.is_empty()
                    && (format.resolution.as_deref() != Some(AUDIO_ONLY_RESOLUTION) || audio_note)
            }
        }
    }

    pub fn empty_message(self) -> &'static str {
        match self {
            Self::Progressive => "No progressive (video+audio) formats found.",
            Self::Permissive => "No matching formats found.",
        }
    }
}

/// Formats that passed a filter, keyed by id, in provider order.
#[derive(Debug, Clone, Default)]
pub struct FormatTable {
    rows: Vec<FormatRecord>,
    by_id: HashMap<String, usize>,
}

impl FormatTable {
    pub fn build(formats: &[FormatRecord], policy: FilterPolicy) -> Self {
        let mut table = Self::default();
        for format in formats.iter().filter(|f| policy.keeps(f)) {
            if table.by_id.contains_key(&format.id) {
                tracing::warn!("duplicate format id {} ignored", format.id);
                continue;
            }
            table.by_id.insert(format.id.clone(), table.rows.len());
            table.rows.push(format.clone());
        }
        tracing::debug!(
            "{:?} filter kept {} of {} formats",
            policy,
            table.rows.len(),
            formats.len()
        );
        table
    }

    pub fn get(&self, id: &str) -> Option<&FormatRecord> {
        self.by_id.get(id).map(|&idx| &self.rows[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn rows(&self) -> &[FormatRecord] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}
