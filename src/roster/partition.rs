use serde::Serialize;

use crate::roster::types::{Shift, ShiftEvent};

/// Shift events split into one list per track
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventsByTrack {
    pub day: Vec<ShiftEvent>,
    pub swing: Vec<ShiftEvent>,
    pub night: Vec<ShiftEvent>,
}

impl EventsByTrack {
    pub fn track(&self, shift: Shift) -> &[ShiftEvent] {
        match shift {
            Shift::Day => &self.day,
            Shift::Swing => &self.swing,
            Shift::Night => &self.night,
        }
    }

    /// Every event, track by track
    pub fn all(&self) -> impl Iterator<Item = &ShiftEvent> {
        self.day.iter().chain(&self.swing).chain(&self.night)
    }

    pub fn len(&self) -> usize {
        self.day.len() + self.swing.len() + self.night.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Splits events by their shift, keeping relative order within each track
pub fn partition(events: Vec<ShiftEvent>) -> EventsByTrack {
    let mut tracks = EventsByTrack::default();
    for event in events {
        match event.shift {
            Shift::Day => tracks.day.push(event),
            Shift::Swing => tracks.swing.push(event),
            Shift::Night => tracks.night.push(event),
        }
    }
    tracks
}
