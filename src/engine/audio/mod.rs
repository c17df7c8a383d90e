// Audio interface: the combat core fires sounds and never waits on them

/// Game sound effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sound {
    Footstep,
    SwordClash,
    ShieldBreak,
}

/// Fire-and-forget playback sink implemented by the host audio backend
pub trait AudioSink {
    /// Start playing a sound
    fn play(&mut self, sound: Sound);

    /// Whether the last playback of a sound has finished. Backends without
    /// playback tracking can keep the default, which re-arms every frame.
    fn is_finished(&self, _sound: Sound) -> bool {
        true
    }
}

/// No-op sink for tests and headless runs
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _sound: Sound) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_audio_is_always_finished() {
        let audio = NullAudio;
        assert!(audio.is_finished(Sound::Footstep));
    }
}
