//! User preference queries

use lantern_dom::Environment;

const SCREEN_READER_SIGNATURES: [&str; 3] = ["NVDA", "JAWS", "VoiceOver"];

/// `(prefers-reduced-motion: reduce)`
pub fn prefers_reduced_motion(env: &Environment) -> bool {
    env.media.prefers_reduced_motion
}

/// `(prefers-contrast: high)`
pub fn prefers_high_contrast(env: &Environment) -> bool {
    env.media.prefers_high_contrast
}

/// Best-effort guess: speech synthesis is available, or the user agent
/// names a known screen reader
pub fn is_using_assistive_technology(env: &Environment) -> bool {
    env.capabilities.speech_synthesis
        || SCREEN_READER_SIGNATURES
            .iter()
            .any(|sig| env.user_agent.contains(sig))
}
