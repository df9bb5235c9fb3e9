//! Settings and constants.

use thiserror::Error;

/// Actor name used for subtitles whose speaker is explicitly unknown (sequential-format imports,
/// block-format events with an empty actor field).
pub const UNKNOWN_ACTOR: &str = "?";

/// Maximum number of characters in a region display name. Longer names are ellipsized.
pub const REGION_NAME_MAX_CHARS: usize = 64;

/// Compression level for the settings blob stored in project files.
pub const SETTINGS_COMPRESSION_LEVEL: u8 = 6;

/// Upper bound for the decompressed settings blob, to avoid decompression bombs from broken
/// project files.
const SETTINGS_DECOMPRESS_LIMIT: usize = 64 * 1024;

/// User-facing switches that influence how subtitles are shown on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Whether regions get their actor's colour. If false, regions are created without colour
    /// and the host's default is used.
    pub coloured_regions: bool,

    /// Whether the linked actor name is shown in front of the actor in region names and in the
    /// merged display text.
    pub actor_prefix: bool,

    /// Whether the display is read-only. While locked, all overlapping subtitles are merged into
    /// one text; otherwise only the selected one is shown for editing.
    pub locked: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            coloured_regions: true,
            actor_prefix: true,
            locked: true,
        }
    }
}

impl Settings {
    /// Serialize into the compact alphanumeric form stored in project files
    /// (CBOR, then deflate, then base64).
    ///
    /// # Errors
    /// Returns an error when CBOR serialization failed.
    pub fn to_blob(&self) -> anyhow::Result<String> {
        let mut data: Vec<u8> = vec![];
        ciborium::into_writer(self, &mut data)?;

        Ok(data_encoding::BASE64.encode(
            miniz_oxide::deflate::compress_to_vec(data.as_slice(), SETTINGS_COMPRESSION_LEVEL)
                .as_slice(),
        ))
    }

    /// Inverse of [`Settings::to_blob`].
    ///
    /// # Errors
    /// Returns an error when any decoding stage fails, see [`DeserializeError`].
    pub fn from_blob(value: &[u8]) -> Result<Self, DeserializeError> {
        let decoded = data_encoding::BASE64
            .decode(value)
            .map_err(DeserializeError::Base64)?;
        let decompressed = miniz_oxide::inflate::decompress_to_vec_with_limit(
            decoded.as_slice(),
            SETTINGS_DECOMPRESS_LIMIT,
        )
        .map_err(DeserializeError::Decompress)?;
        ciborium::from_reader::<Self, _>(decompressed.as_slice())
            .map_err(|de_error| DeserializeError::Cbor(format!("{de_error:?}")))
    }
}

#[derive(Error, Debug)]
pub enum DeserializeError {
    #[error("Failed to decode base64 settings data: {0}")]
    Base64(data_encoding::DecodeError),

    #[error("Failed to decompress settings: {0}")]
    Decompress(miniz_oxide::inflate::DecompressError),

    #[error("Failed to deserialize settings: {0}")]
    Cbor(String),
}
