//! Replay recorder: captures tick history for post-wave analysis.
//!
//! Records two streams: throttled position snapshots (driven by the
//! engine at `SNAPSHOT_RATE_HZ`) and a filtered subset of published
//! events (combat and wave lifecycle only). Frames are bounded by a
//! ring buffer so long sessions don't grow memory without limit.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tritium_core::constants::{HEATMAP_GRID_SIZE, REPLAY_MAX_FRAMES};
use tritium_core::events::SimEvent;
use tritium_core::state::UnitView;

/// Event kinds the recorder archives; everything else is dropped on
/// arrival. Kept in sync with [`SimEvent::kind`]'s discriminants.
pub const REPLAY_EVENT_TYPES: &[&str] = &[
    "projectile_fired",
    "projectile_hit",
    "target_eliminated",
    "unit_destroyed",
    "wave_start",
    "wave_complete",
    "game_over",
];

#[derive(Debug, Clone)]
pub struct Frame {
    pub sim_time: f64,
    pub units: Vec<UnitView>,
}

#[derive(Debug, Clone)]
pub struct EventRecord {
    pub sim_time: f64,
    pub event: SimEvent,
}

#[derive(Debug, Clone)]
pub struct WaveSummary {
    pub wave_number: u32,
    pub eliminations: u32,
    pub duration: f64,
    pub shots_fired: u32,
    pub shots_hit: u32,
}

#[derive(Debug, Clone)]
pub struct HeatmapCell {
    pub x: f64,
    pub y: f64,
    pub count: u32,
}

/// Serialized replay document, loadable back into a recorder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayExport {
    pub metadata: ReplayMetadata,
    pub frames: Vec<ExportFrame>,
    pub events: Vec<ExportEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayMetadata {
    pub total_frames: usize,
    pub total_events: usize,
    /// Wall-clock start of the recording; supplied by the caller and
    /// excluded from reproducibility comparisons.
    pub start_time: f64,
    pub duration: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportFrame {
    pub timestamp: f64,
    pub targets: Vec<UnitView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportEvent {
    pub timestamp: f64,
    pub event_type: String,
    pub data: Value,
}

/// Records simulation history while `recording` is set, bounded to
/// `REPLAY_MAX_FRAMES` snapshot frames (a ring buffer; the oldest
/// frame is dropped once the cap is hit).
#[derive(Debug, Default)]
pub struct ReplayRecorder {
    frames: VecDeque<Frame>,
    events: Vec<EventRecord>,
    recording: bool,
}

impl ReplayRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn start(&mut self) {
        self.recording = true;
    }

    pub fn stop(&mut self) {
        self.recording = false;
    }

    pub fn clear(&mut self) {
        self.frames.clear();
        self.events.clear();
        self.recording = false;
    }

    pub fn record_snapshot(&mut self, sim_time: f64, units: Vec<UnitView>) {
        if !self.recording {
            return;
        }
        if self.frames.len() >= REPLAY_MAX_FRAMES {
            self.frames.pop_front();
        }
        self.frames.push_back(Frame { sim_time, units });
    }

    /// Record `event` only if its [`SimEvent::kind`] is in
    /// [`REPLAY_EVENT_TYPES`].
    pub fn record_event(&mut self, sim_time: f64, event: SimEvent) {
        if !self.recording || !REPLAY_EVENT_TYPES.contains(&event.kind()) {
            return;
        }
        self.events.push(EventRecord { sim_time, event });
    }

    pub fn frames(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Stats for one wave: eliminations, duration, and shot accuracy
    /// between its `wave_start` and `wave_complete` events. `None` if
    /// the wave never started.
    pub fn get_wave_summary(&self, wave_number: u32) -> Option<WaveSummary> {
        let start = self.events.iter().find(|e| matches!(&e.event, SimEvent::WaveStart { wave_number: w } if *w == wave_number))?;
        let end = self.events.iter().find(|e| matches!(&e.event, SimEvent::WaveComplete { wave_number: w } if *w == wave_number));
        let end_time = end.map(|e| e.sim_time).unwrap_or(f64::INFINITY);

        let mut shots_fired = 0;
        let mut shots_hit = 0;
        let mut eliminations = 0;
        for record in &self.events {
            if record.sim_time < start.sim_time || record.sim_time > end_time {
                continue;
            }
            match &record.event {
                SimEvent::ProjectileFired { .. } => shots_fired += 1,
                SimEvent::ProjectileHit { .. } => shots_hit += 1,
                SimEvent::TargetEliminated { .. } => eliminations += 1,
                _ => {}
            }
        }

        let duration = end.map(|e| e.sim_time - start.sim_time).unwrap_or(0.0);
        Some(WaveSummary { wave_number, eliminations, duration, shots_fired, shots_hit })
    }

    /// Position-frequency data per unit, quantized onto a
    /// `HEATMAP_GRID_SIZE`-meter grid, for heatmap rendering.
    pub fn get_heatmap_data(&self) -> std::collections::HashMap<String, Vec<HeatmapCell>> {
        let mut grid: std::collections::HashMap<String, std::collections::HashMap<(i64, i64), u32>> = std::collections::HashMap::new();
        for frame in &self.frames {
            for unit in &frame.units {
                let gx = (unit.position.x / HEATMAP_GRID_SIZE).floor() as i64;
                let gy = (unit.position.y / HEATMAP_GRID_SIZE).floor() as i64;
                *grid.entry(unit.id.clone()).or_default().entry((gx, gy)).or_insert(0) += 1;
            }
        }
        grid.into_iter()
            .map(|(id, cells)| {
                let cells = cells
                    .into_iter()
                    .map(|((gx, gy), count)| HeatmapCell { x: gx as f64 * HEATMAP_GRID_SIZE, y: gy as f64 * HEATMAP_GRID_SIZE, count })
                    .collect();
                (id, cells)
            })
            .collect()
    }

    /// All recorded events in chronological order (they are already
    /// appended in time order, so this is just a borrow).
    pub fn get_timeline(&self) -> &[EventRecord] {
        &self.events
    }

    /// Serializable document covering the full recording.
    pub fn export(&self, start_time: f64) -> ReplayExport {
        let frames: Vec<ExportFrame> = self
            .frames
            .iter()
            .map(|f| ExportFrame { timestamp: f.sim_time, targets: f.units.clone() })
            .collect();
        let events: Vec<ExportEvent> = self
            .events
            .iter()
            .map(|e| {
                let mut data = serde_json::to_value(&e.event).unwrap_or(Value::Null);
                if let Value::Object(ref mut map) = data {
                    map.remove("type");
                }
                ExportEvent { timestamp: e.sim_time, event_type: e.event.kind().to_string(), data }
            })
            .collect();
        let duration = match (frames.first(), frames.last()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => 0.0,
        };
        ReplayExport {
            metadata: ReplayMetadata {
                total_frames: frames.len(),
                total_events: events.len(),
                start_time,
                duration,
            },
            frames,
            events,
        }
    }

    pub fn export_json(&self, start_time: f64) -> serde_json::Result<String> {
        serde_json::to_string(&self.export(start_time))
    }

    /// Rebuild a (stopped) recorder from an exported document. Events
    /// whose type no longer deserializes are skipped.
    pub fn load(export: &ReplayExport) -> Self {
        let frames: VecDeque<Frame> = export
            .frames
            .iter()
            .map(|f| Frame { sim_time: f.timestamp, units: f.targets.clone() })
            .collect();
        let events: Vec<EventRecord> = export
            .events
            .iter()
            .filter_map(|e| {
                let mut value = e.data.clone();
                if let Value::Object(ref mut map) = value {
                    map.insert("type".to_string(), Value::String(e.event_type.clone()));
                }
                serde_json::from_value::<SimEvent>(value)
                    .ok()
                    .map(|event| EventRecord { sim_time: e.timestamp, event })
            })
            .collect();
        Self { frames, events, recording: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tritium_core::enums::{Alliance, AssetType};
    use tritium_core::types::Point;

    fn view(id: &str, x: f64, y: f64) -> UnitView {
        UnitView {
            id: id.into(), name: id.into(), alliance: Alliance::Friendly, asset_type: AssetType::Rover,
            position: Point::new(x, y), heading: 0.0, speed: 1.0, health: 10.0, max_health: 10.0,
            health_fraction: 1.0, status: tritium_core::enums::UnitStatus::Active, fsm_state: String::new(),
            squad_id: None, detected: false, morale: 0.7, degradation: 0.0, kills: 0,
        }
    }

    #[test]
    fn test_snapshot_dropped_when_not_recording() {
        let mut recorder = ReplayRecorder::new();
        recorder.record_snapshot(0.0, vec![view("a", 0.0, 0.0)]);
        assert_eq!(recorder.frame_count(), 0);
    }

    #[test]
    fn test_records_frames_and_filters_events() {
        let mut recorder = ReplayRecorder::new();
        recorder.start();
        recorder.record_snapshot(0.0, vec![view("a", 0.0, 0.0)]);
        recorder.record_event(0.0, SimEvent::WaveStart { wave_number: 1 });
        recorder.record_event(0.0, SimEvent::StateChange { target_id: "a".into(), fsm_state: "engaging".into() });
        assert_eq!(recorder.frame_count(), 1);
        assert_eq!(recorder.event_count(), 1);
    }

    #[test]
    fn test_wave_summary_counts_events_in_range() {
        let mut recorder = ReplayRecorder::new();
        recorder.start();
        recorder.record_event(0.0, SimEvent::WaveStart { wave_number: 1 });
        recorder.record_event(1.0, SimEvent::ProjectileFired { shooter_id: "a".into(), target_id: "b".into(), hit: true, damage: 5.0, aim: Point::ZERO });
        recorder.record_event(1.0, SimEvent::ProjectileHit { shooter_id: "a".into(), target_id: "b".into(), damage: 5.0 });
        recorder.record_event(2.0, SimEvent::WaveComplete { wave_number: 1 });

        let summary = recorder.get_wave_summary(1).unwrap();
        assert_eq!(summary.shots_fired, 1);
        assert_eq!(summary.shots_hit, 1);
        assert!((summary.duration - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_heatmap_quantizes_by_grid_cell() {
        let mut recorder = ReplayRecorder::new();
        recorder.start();
        recorder.record_snapshot(0.0, vec![view("a", 0.5, 0.5)]);
        recorder.record_snapshot(0.5, vec![view("a", 0.9, 0.9)]);
        let heatmap = recorder.get_heatmap_data();
        let cells = &heatmap["a"];
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].count, 2);
    }

    #[test]
    fn test_export_load_round_trip_is_stable() {
        let mut recorder = ReplayRecorder::new();
        recorder.start();
        recorder.record_snapshot(0.0, vec![view("a", 1.0, 2.0)]);
        recorder.record_snapshot(0.5, vec![view("a", 1.5, 2.5)]);
        recorder.record_event(0.1, SimEvent::WaveStart { wave_number: 1 });
        recorder.record_event(0.3, SimEvent::ProjectileFired {
            shooter_id: "a".into(), target_id: "b".into(), hit: true, damage: 5.0, aim: Point::ZERO,
        });

        let first = recorder.export_json(0.0).unwrap();
        let parsed: ReplayExport = serde_json::from_str(&first).unwrap();
        let reloaded = ReplayRecorder::load(&parsed);
        let second = reloaded.export_json(0.0).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_ring_buffer_caps_frame_count() {
        let mut recorder = ReplayRecorder::new();
        recorder.start();
        for i in 0..(REPLAY_MAX_FRAMES + 5) {
            recorder.record_snapshot(i as f64, vec![]);
        }
        assert_eq!(recorder.frame_count(), REPLAY_MAX_FRAMES);
    }
}
