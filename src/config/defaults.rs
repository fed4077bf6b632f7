use super::VadEngineKind;

pub const DEFAULT_VAD_THRESHOLD_DB: f32 = -45.0;
pub const DEFAULT_VAD_FRAME_MS: u64 = 20;
pub const DEFAULT_VAD_SMOOTHING_FRAMES: usize = 3;
pub const DEFAULT_MIN_SPEECH_RATIO: f64 = 0.1;
pub const DEFAULT_LANG: &str = "en";
pub const MAX_WHISPER_BEAM_SIZE: u32 = 10;

pub const MIN_VAD_FRAME_MS: u64 = 5;
pub const MAX_VAD_FRAME_MS: u64 = 120;
/// Frame sizes Earshot accepts at 16 kHz.
pub const EARSHOT_FRAME_MS: [u64; 3] = [10, 20, 30];

pub fn default_vad_engine() -> VadEngineKind {
    if cfg!(feature = "vad_earshot") {
        VadEngineKind::Earshot
    } else {
        VadEngineKind::Simple
    }
}

pub(super) const ISO_639_1_CODES: &[&str] = &[
    "aa", "ab", "ae", "af", "ak", "am", "an", "ar", "as", "av", "ay", "az", "ba", "be", "bg", "bh",
    "bi", "bm", "bn", "bo", "br", "bs", "ca", "ce", "ch", "co", "cr", "cs", "cu", "cv", "cy", "da",
    "de", "dv", "dz", "ee", "el", "en", "eo", "es", "et", "eu", "fa", "ff", "fi", "fj", "fo", "fr",
    "fy", "ga", "gd", "gl", "gn", "gu", "gv", "ha", "he", "hi", "ho", "hr", "ht", "hu", "hy", "hz",
    "ia", "id", "ie", "ig", "ii", "ik", "io", "is", "it", "iu", "ja", "jv", "ka", "kg", "ki", "kj",
    "kk", "kl", "km", "kn", "ko", "kr", "ks", "ku", "kv", "kw", "ky", "la", "lb", "lg", "li", "ln",
    "lo", "lt", "lu", "lv", "mg", "mh", "mi", "mk", "ml", "mn", "mr", "ms", "mt", "my", "na", "nb",
    "nd", "ne", "ng", "nl", "nn", "no", "nr", "nv", "ny", "oc", "oj", "om", "or", "os", "pa", "pi",
    "pl", "ps", "pt", "qu", "rm", "rn", "ro", "ru", "rw", "sa", "sc", "sd", "se", "sg", "si", "sk",
    "sl", "sm", "sn", "so", "sq", "sr", "ss", "st", "su", "sv", "sw", "ta", "te", "tg", "th", "ti",
    "tk", "tl", "tn", "to", "tr", "ts", "tt", "tw", "ty", "ug", "uk", "ur", "uz", "ve", "vi", "vo",
    "wa", "wo", "xh", "yi", "yo", "za", "zh", "zu",
];
