//! Where each cue's audio comes from.

use std::path::{Path, PathBuf};

use crate::types::CueId;

/// Supported cue file extensions.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["wav", "mp3", "flac", "ogg"];

/// Represents the source of a cue to be played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundSource {
    /// An audio file on disk.
    File {
        /// Display name (the file stem)
        name: String,
        /// Full path to the file
        path: PathBuf,
    },
    /// A built-in tone.
    Embedded {
        /// Which cue's tone to synthesize
        cue: CueId,
    },
}

impl SoundSource {
    /// Creates a file source named after the file stem.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::File { name, path }
    }

    /// Creates a built-in tone source.
    #[must_use]
    pub fn embedded(cue: CueId) -> Self {
        Self::Embedded { cue }
    }

    /// Returns the name of the sound source.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::File { name, .. } => name,
            Self::Embedded { cue } => cue.as_str(),
        }
    }

    #[must_use]
    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded { .. })
    }

    /// Returns the file path if this is a file source.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File { path, .. } => Some(path),
            Self::Embedded { .. } => None,
        }
    }
}

/// Returns true if the path has a cue file extension we can decode.
#[must_use]
pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// The source for each of the three cues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueSources {
    pub inhale: SoundSource,
    pub exhale: SoundSource,
    pub completion: SoundSource,
}

impl Default for CueSources {
    fn default() -> Self {
        Self {
            inhale: SoundSource::embedded(CueId::Inhale),
            exhale: SoundSource::embedded(CueId::Exhale),
            completion: SoundSource::embedded(CueId::Completion),
        }
    }
}

impl CueSources {
    /// Uses the given files where present and built-in tones elsewhere.
    #[must_use]
    pub fn from_files(
        inhale: Option<&Path>,
        exhale: Option<&Path>,
        completion: Option<&Path>,
    ) -> Self {
        let pick = |path: Option<&Path>, cue: CueId| match path {
            Some(path) => SoundSource::file(path),
            None => SoundSource::embedded(cue),
        };
        Self {
            inhale: pick(inhale, CueId::Inhale),
            exhale: pick(exhale, CueId::Exhale),
            completion: pick(completion, CueId::Completion),
        }
    }

    /// Returns the source for a cue.
    #[must_use]
    pub fn get(&self, cue: CueId) -> &SoundSource {
        match cue {
            CueId::Inhale => &self.inhale,
            CueId::Exhale => &self.exhale,
            CueId::Completion => &self.completion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_source_named_after_stem() {
        let source = SoundSource::file("/cues/soft-bell.wav");
        assert_eq!(source.name(), "soft-bell");
        assert_eq!(source.path(), Some(Path::new("/cues/soft-bell.wav")));
        assert!(!source.is_embedded());
    }

    #[test]
    fn test_embedded_source() {
        let source = SoundSource::embedded(CueId::Exhale);
        assert!(source.is_embedded());
        assert_eq!(source.name(), "exhale");
        assert!(source.path().is_none());
    }

    #[test]
    fn test_supported_extensions() {
        assert!(has_supported_extension(Path::new("a.wav")));
        assert!(has_supported_extension(Path::new("a.MP3")));
        assert!(!has_supported_extension(Path::new("a.txt")));
        assert!(!has_supported_extension(Path::new("noext")));
    }

    #[test]
    fn test_default_sources_are_embedded() {
        let sources = CueSources::default();
        for cue in CueId::ALL {
            assert_eq!(sources.get(cue), &SoundSource::embedded(cue));
        }
    }

    #[test]
    fn test_from_files_mixes_files_and_tones() {
        let sources = CueSources::from_files(Some(Path::new("/cues/in.wav")), None, None);

        assert_eq!(sources.get(CueId::Inhale).name(), "in");
        assert!(sources.get(CueId::Exhale).is_embedded());
        assert!(sources.get(CueId::Completion).is_embedded());
    }
}
