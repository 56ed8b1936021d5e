use crate::color::{Color, HuePalette};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

/// Neutral slate for external OpenStreetMap data
pub const OSM_COLOR: Color = Color::rgb(0x64748b);
/// Amber for user-owned custom points
pub const CUSTOM_COLOR: Color = Color::rgb(0xf59e0b);

/// Per-data-source marker colors
///
/// `osm` and `custom` always get their fixed colors. Any other source is
/// handed the next golden-angle color the first time it shows up and keeps
/// it for the lifetime of the palette. Safe to share between threads: the
/// check-and-insert happens under one lock, so two callers racing on a new
/// source still agree on its color.
#[derive(Debug, Default)]
pub struct SourcePalette {
    assigned: Mutex<HashMap<String, Color>>,
}

impl SourcePalette {
    pub fn new() -> Self {
        Self::default()
    }

    /// Color for a source id. Missing or blank ids count as `osm`.
    pub fn assign(&self, source: Option<&str>) -> Color {
        let source = match source.map(str::trim) {
            None | Some("") | Some("osm") => return OSM_COLOR,
            Some("custom") => return CUSTOM_COLOR,
            Some(s) => s,
        };

        let mut assigned = self.assigned.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(color) = assigned.get(source) {
            return *color;
        }

        // entries are never removed, so the count is the first-seen position
        let index = assigned.len() as u32;
        let color = HuePalette::SOURCE.color_for_index(index);
        assigned.insert(source.to_string(), color);
        debug!("Assigned {} to source '{}'", color, source);

        color
    }

    /// Number of lazily assigned sources. Fixed sources aren't counted.
    pub fn len(&self) -> usize {
        self.assigned.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
