//! Spectator playback: VCR-style controls over a recorded
//! [`crate::replay::ReplayRecorder`] timeline, independent of the live
//! engine clock.

use tritium_core::constants::{SNAPSHOT_RATE_HZ, SPECTATOR_MAX_SPEED, SPECTATOR_MIN_SPEED};

use crate::replay::{EventRecord, Frame, ReplayRecorder};

const FRAME_RATE: f64 = SNAPSHOT_RATE_HZ;
const FRAME_INTERVAL: f64 = 1.0 / FRAME_RATE;
const WAVE_SEEK_EPSILON: f64 = 0.01;

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct SpectatorState {
    pub playing: bool,
    pub speed: f64,
    pub current_frame: usize,
    pub total_frames: usize,
    pub duration: f64,
    pub current_time: f64,
    pub progress: f64,
}

/// Plays back a [`ReplayRecorder`]'s frames at an adjustable speed,
/// independent of the live simulation clock.
#[derive(Debug, Default)]
pub struct SpectatorMode {
    playing: bool,
    speed: f64,
    frame_index: usize,
    elapsed: f64,
}

impl SpectatorMode {
    pub fn new() -> Self {
        Self { playing: false, speed: 1.0, frame_index: 0, elapsed: 0.0 }
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn stop(&mut self) {
        self.playing = false;
        self.frame_index = 0;
        self.elapsed = 0.0;
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed.clamp(SPECTATOR_MIN_SPEED, SPECTATOR_MAX_SPEED);
    }

    pub fn seek(&mut self, frame: usize, total_frames: usize) {
        self.frame_index = frame.min(total_frames.saturating_sub(1));
        self.elapsed = 0.0;
    }

    pub fn seek_time(&mut self, seconds: f64, total_frames: usize) {
        let frame = (seconds * FRAME_RATE).round().max(0.0) as usize;
        self.seek(frame, total_frames);
    }

    /// Jumps to the frame nearest the timestamp of `wave_number`'s
    /// `wave_start` event. No-op if the wave never started.
    pub fn seek_wave(&mut self, wave_number: u32, recorder: &ReplayRecorder) {
        let Some(start) = recorder.events().iter().find(|e| {
            matches!(&e.event, tritium_core::events::SimEvent::WaveStart { wave_number: w } if *w == wave_number)
        }) else {
            return;
        };
        let frames: Vec<&Frame> = recorder.frames().collect();
        if frames.is_empty() {
            return;
        }
        let nearest = frames
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| (a.sim_time - start.sim_time).abs().total_cmp(&(b.sim_time - start.sim_time).abs()))
            .map(|(i, _)| i)
            .unwrap_or(0);
        self.seek(nearest, frames.len());
    }

    pub fn step_forward(&mut self, total_frames: usize) {
        if total_frames == 0 {
            return;
        }
        self.frame_index = (self.frame_index + 1).min(total_frames - 1);
        self.elapsed = 0.0;
    }

    pub fn step_backward(&mut self) {
        self.frame_index = self.frame_index.saturating_sub(1);
        self.elapsed = 0.0;
    }

    /// Advances playback by `dt` real seconds (scaled by playback
    /// speed). Returns the new frame index if it changed.
    pub fn tick(&mut self, dt: f64, total_frames: usize) -> Option<usize> {
        if !self.playing || total_frames == 0 {
            return None;
        }
        let effective_dt = dt * self.speed;
        self.elapsed += effective_dt;
        let frames_to_advance = (self.elapsed / FRAME_INTERVAL).floor() as usize;
        if frames_to_advance == 0 {
            return None;
        }
        self.elapsed -= frames_to_advance as f64 * FRAME_INTERVAL;

        let last = total_frames - 1;
        let before = self.frame_index;
        self.frame_index = (self.frame_index + frames_to_advance).min(last);
        if self.frame_index == last {
            self.playing = false;
        }
        if self.frame_index != before {
            Some(self.frame_index)
        } else {
            None
        }
    }

    pub fn current_frame(&self) -> usize {
        self.frame_index
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn get_frame<'a>(&self, recorder: &'a ReplayRecorder) -> Option<&'a Frame> {
        recorder.frames().nth(self.frame_index)
    }

    /// Events whose timestamp falls within `[frames[start], frames[end]]`
    /// (inclusive, epsilon-tolerant).
    pub fn get_events_in_range<'a>(&self, recorder: &'a ReplayRecorder, start_frame: usize, end_frame: usize) -> Vec<&'a EventRecord> {
        let frames: Vec<&Frame> = recorder.frames().collect();
        if frames.is_empty() || start_frame >= frames.len() || end_frame >= frames.len() {
            return Vec::new();
        }
        let lo = frames[start_frame].sim_time - WAVE_SEEK_EPSILON;
        let hi = frames[end_frame].sim_time + WAVE_SEEK_EPSILON;
        recorder.events().iter().filter(|e| e.sim_time >= lo && e.sim_time <= hi).collect()
    }

    pub fn get_state(&self, total_frames: usize) -> SpectatorState {
        let duration = if total_frames > 1 { (total_frames - 1) as f64 / FRAME_RATE } else { 0.0 };
        let current_time = self.frame_index as f64 / FRAME_RATE;
        let progress = if total_frames > 1 { self.frame_index as f64 / (total_frames - 1) as f64 } else { 0.0 };
        SpectatorState {
            playing: self.playing,
            speed: self.speed,
            current_frame: self.frame_index,
            total_frames,
            duration,
            current_time,
            progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder_with_frames(n: usize) -> ReplayRecorder {
        let mut recorder = ReplayRecorder::new();
        recorder.start();
        for i in 0..n {
            recorder.record_snapshot(i as f64 * FRAME_INTERVAL, vec![]);
        }
        recorder
    }

    #[test]
    fn test_seek_clamps_to_last_frame() {
        let mut spectator = SpectatorMode::new();
        spectator.seek(100, 10);
        assert_eq!(spectator.current_frame(), 9);
    }

    #[test]
    fn test_tick_advances_frames_while_playing() {
        let recorder = recorder_with_frames(10);
        let mut spectator = SpectatorMode::new();
        spectator.play();
        let advanced = spectator.tick(FRAME_INTERVAL, recorder.frame_count());
        assert_eq!(advanced, Some(1));
    }

    #[test]
    fn test_tick_noop_when_paused() {
        let recorder = recorder_with_frames(10);
        let mut spectator = SpectatorMode::new();
        assert_eq!(spectator.tick(10.0, recorder.frame_count()), None);
    }

    #[test]
    fn test_tick_pauses_at_last_frame() {
        let recorder = recorder_with_frames(3);
        let mut spectator = SpectatorMode::new();
        spectator.play();
        spectator.tick(10.0, recorder.frame_count());
        assert_eq!(spectator.current_frame(), 2);
        assert!(!spectator.is_playing());
    }

    #[test]
    fn test_set_speed_clamps_to_bounds() {
        let mut spectator = SpectatorMode::new();
        spectator.set_speed(100.0);
        assert_eq!(spectator.get_state(10).speed, SPECTATOR_MAX_SPEED);
        spectator.set_speed(0.0);
        assert_eq!(spectator.get_state(10).speed, SPECTATOR_MIN_SPEED);
    }

    #[test]
    fn test_get_state_progress_and_duration() {
        let mut spectator = SpectatorMode::new();
        spectator.seek(4, 9);
        let state = spectator.get_state(9);
        assert!((state.progress - 0.5).abs() < 1e-9);
        assert!((state.duration - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_seek_wave_finds_nearest_frame() {
        let mut recorder = recorder_with_frames(5);
        recorder.record_event(2.1, tritium_core::events::SimEvent::WaveStart { wave_number: 1 });
        let mut spectator = SpectatorMode::new();
        spectator.seek_wave(1, &recorder);
        assert_eq!(spectator.current_frame(), 4);
    }
}
