//! Importing external subtitle files: every accepted entry becomes a new region in the host's
//! store plus a [`RegionSubtitle`] bound to it.

use std::ffi::OsStr;
use std::path::Path;

use thiserror::Error;

use super::{RegionSubtitle, parse, region_name, tags};
use crate::actor::Actor;
use crate::config::UNKNOWN_ACTOR;
use crate::project::Project;
use crate::region::{NewRegion, RegionId, RegionStore, Time};

const BYTE_ORDER_MARK: char = '\u{feff}';

/// What an import added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// Number of regions (and subtitles) created.
    pub created: usize,

    /// Earliest start time among the created regions, for placing the cursor after import.
    pub first_start: Time,
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to read subtitle file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed subtitle file: {0}")]
    Malformed(parse::Error),

    #[error("Subtitle file contains no usable entries")]
    Empty,
}

/// The two supported interchange formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Sectioned format with `Dialogue:` event lines and `{\...}` override tags (`.ass`).
    Block,

    /// Numbered entries with `-->` timing lines and `<...>` tags (`.srt`).
    Sequential,
}

impl Format {
    /// `.ass` files (any case) are block format, everything else is treated as sequential.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(OsStr::to_str) {
            Some(extension) if extension.eq_ignore_ascii_case("ass") => Self::Block,
            _ => Self::Sequential,
        }
    }
}

/// Reads the file at `path` and imports it in the format implied by its extension.
///
/// # Errors
/// Returns an error if the file cannot be read, or see [`import`].
pub fn import_path(
    path: &Path,
    store: &mut dyn RegionStore,
    project: &mut Project,
) -> Result<ImportSummary, ImportError> {
    let data = std::fs::read(path)?;
    let format = Format::from_path(path);
    tracing::debug!("importing {} as {format:?}", path.display());
    import(&data, format, store, project)
}

/// Imports subtitle file contents. Malformed lines are skipped; entries created before a fatal
/// error are kept.
///
/// # Errors
/// Returns [`ImportError::Malformed`] if the file broke off before anything was imported, and
/// [`ImportError::Empty`] if it simply contained nothing usable.
pub fn import(
    data: &[u8],
    format: Format,
    store: &mut dyn RegionStore,
    project: &mut Project,
) -> Result<ImportSummary, ImportError> {
    let decoded = String::from_utf8_lossy(data);
    let content: &str = decoded.strip_prefix(BYTE_ORDER_MARK).unwrap_or(&decoded);

    let mut importer = Importer {
        store,
        project,
        created: 0,
        first_start: None,
    };

    let fatal = match format {
        Format::Block => {
            importer.read_block(content);
            None
        }
        Format::Sequential => importer.read_sequential(content).err(),
    };

    let Importer {
        created,
        first_start,
        ..
    } = importer;

    match (first_start, fatal) {
        (Some(first_start), _) => {
            tracing::info!("imported {created} subtitles");
            Ok(ImportSummary {
                created,
                first_start,
            })
        }
        (None, Some(error)) => Err(ImportError::Malformed(error)),
        (None, None) => Err(ImportError::Empty),
    }
}

struct Importer<'a> {
    store: &'a mut dyn RegionStore,
    project: &'a mut Project,
    created: usize,
    first_start: Option<Time>,
}

impl Importer<'_> {
    fn read_block(&mut self, content: &str) {
        let mut in_events = false;

        for (line_index, line) in content.lines().enumerate() {
            if let Some(is_events) = parse::section_header(line) {
                in_events = is_events;
                continue;
            }

            if !in_events || !line.get(..9).is_some_and(|p| p.eq_ignore_ascii_case("dialogue:")) {
                continue;
            }

            let event = match parse::parse_dialogue_line(line) {
                Ok(event) => event,
                Err(error) => {
                    tracing::warn!(line = line_index + 1, "skipping event line: {error}");
                    continue;
                }
            };

            let actor = if event.actor.is_empty() {
                UNKNOWN_ACTOR
            } else {
                event.actor
            };
            let notes = tags::strip_block_tags(event.text);
            self.add(event.start, event.end, actor, &notes, None);
        }
    }

    fn read_sequential(&mut self, content: &str) -> Result<(), parse::Error> {
        let mut lines = content.lines().enumerate();

        while let Some((_, line)) = lines.next() {
            let Ok(index) = parse::parse_index_line(line) else {
                continue;
            };

            let Some((line_index, timing)) = lines.next() else {
                break;
            };
            let (start, end) = parse::parse_time_range(timing).inspect_err(|error| {
                tracing::warn!(line = line_index + 1, "aborting import: {error}");
            })?;

            let mut text_lines = vec![];
            for (_, text) in lines.by_ref() {
                if text.is_empty() {
                    break;
                }
                text_lines.push(text);
            }

            let notes = tags::strip_angle_tags(&text_lines.join("\n"));
            self.add(start, end, UNKNOWN_ACTOR, &notes, Some(index));
        }

        Ok(())
    }

    fn add(
        &mut self,
        start: Time,
        end: Time,
        actor: &str,
        notes: &str,
        index_hint: Option<i32>,
    ) -> Option<RegionId> {
        let project = &mut *self.project;
        // The actor is only added once the host accepted the region
        let colour = project
            .actors
            .get(actor)
            .map_or_else(|| Actor::new(actor).effective_colour(), Actor::effective_colour)
            .filter(|_| project.settings.coloured_regions);
        let name = region_name(&project.actors, &project.settings, actor, notes);

        let Some(region) = self.store.create_region(NewRegion {
            start,
            end,
            name: &name,
            colour,
            index_hint,
        }) else {
            tracing::warn!("host refused region {}..{}", start.0, end.0);
            return None;
        };

        project.actors.find_or_create(actor);
        project
            .subtitles
            .push(RegionSubtitle::new(region, start, end, notes, actor));
        self.created += 1;
        self.first_start = Some(self.first_start.map_or(start, |first| first.min(start)));
        Some(region)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches2::assert_matches;

    use super::*;
    use crate::colour;
    use crate::region::MemoryRegionStore;
    use crate::test_utils::test_file;

    const BLOCK: &str = "\u{feff}[Script Info]\r
Title: test\r
Dialogue: 0,0:00:00.00,0:00:01.00,Default,Ignored,0,0,0,,not in events\r
\r
[Events]\r
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\r
Dialogue: 0,0:00:03.00,0:00:04.00,Default,Alice,0,0,0,,{\\i1}Hi{\\i0} there\\Nfriend\r
Dialogue: 0,0:00:01.50,0:00:02.00,Default,,0,0,0,,Who said that?\r
Dialogue: 0,broken,0:00:02.00,Default,Bob,0,0,0,,skipped\r
Dialogue: 0,0:00:05.00,0:00:06.00,Default,Bob,0,0,0,,\r
Comment: 0,0:00:05.00,0:00:06.00,Default,Bob,0,0,0,,comment\r
\r
[Fonts]\r
Dialogue: 0,0:00:07.00,0:00:08.00,Default,Carol,0,0,0,,not in events either\r
";

    #[test]
    fn block_format() {
        let mut store = MemoryRegionStore::new_empty();
        let mut project = Project::new();

        let summary = import(BLOCK.as_bytes(), Format::Block, &mut store, &mut project).unwrap();
        assert_eq!(summary.created, 2);
        assert_eq!(summary.first_start, Time(1500));

        let subtitles: Vec<&RegionSubtitle> = project.subtitles.iter().collect();
        assert_eq!(subtitles[0].actor, "Alice");
        assert_eq!(subtitles[0].notes, "Hi there\nfriend");
        assert_eq!(subtitles[1].actor, UNKNOWN_ACTOR);
        assert_eq!(subtitles[1].notes, "Who said that?");

        let alice = store.get(subtitles[0].region().unwrap()).unwrap();
        assert_eq!(alice.name, "(Alice) Hi there friend");
        assert_eq!(alice.colour, Some(colour::colour_for("Alice")));
        assert_eq!((alice.start, alice.end), (Time(3000), Time(4000)));

        let unknown = store.get(subtitles[1].region().unwrap()).unwrap();
        assert_eq!(unknown.name, "Who said that?");
        assert_eq!(unknown.colour, None);

        // Bob only appeared on skipped lines
        assert!(!project.actors.contains("Bob"));
        assert!(project.actors.contains(UNKNOWN_ACTOR));
    }

    #[test]
    fn uncoloured_import() {
        let mut store = MemoryRegionStore::new_empty();
        let mut project = Project::new();
        project.settings.coloured_regions = false;

        import(BLOCK.as_bytes(), Format::Block, &mut store, &mut project).unwrap();
        assert!(store.iter().all(|region| region.colour.is_none()));
    }

    #[test]
    fn sequential_format() {
        let data = "1\r\n00:00:01,000 --> 00:00:02,500\r\n<i>Hello</i> world\r\nsecond line\r\n\r\n\
                    7\r\n00:00:03,000 --> 00:00:04,000\r\nLater\r\n";
        let mut store = MemoryRegionStore::new_empty();
        let mut project = Project::new();

        let summary = import(data.as_bytes(), Format::Sequential, &mut store, &mut project).unwrap();
        assert_eq!(summary.created, 2);
        assert_eq!(summary.first_start, Time(1000));

        let notes: Vec<&str> = project.subtitles.iter().map(|s| s.notes.as_str()).collect();
        assert_eq!(notes, ["Hello world\nsecond line", "Later"]);
        assert!(project.subtitles.iter().all(|s| s.actor == UNKNOWN_ACTOR));

        let later = project.subtitles.iter().nth(1).unwrap().region().unwrap();
        assert_eq!(store.find_region(later).unwrap().index, 7);
    }

    #[test]
    fn sequential_abort_keeps_earlier_entries() {
        let data = "1\n00:00:01,000 --> 00:00:02,000\nfirst\n\n2\nnot a time\nsecond\n\n\
                    3\n00:00:05,000 --> 00:00:06,000\nthird\n";
        let mut store = MemoryRegionStore::new_empty();
        let mut project = Project::new();

        let summary = import(data.as_bytes(), Format::Sequential, &mut store, &mut project).unwrap();
        assert_eq!(summary.created, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn failures() {
        let mut store = MemoryRegionStore::new_empty();
        let mut project = Project::new();

        assert_matches!(
            import(b"1\nnonsense\n", Format::Sequential, &mut store, &mut project),
            Err(ImportError::Malformed(parse::Error::InvalidTimeRange(_)))
        );
        assert_matches!(
            import(b"", Format::Sequential, &mut store, &mut project),
            Err(ImportError::Empty)
        );
        assert_matches!(
            import(b"[Events]\n", Format::Block, &mut store, &mut project),
            Err(ImportError::Empty)
        );
        assert!(store.is_empty());
        assert!(project.subtitles.is_empty());
    }

    #[test]
    fn oversized_timecodes() {
        let mut store = MemoryRegionStore::new_empty();
        let mut project = Project::new();

        let block = "[Events]\n\
                     Dialogue: 0,3000000000000:00:00.00,0:00:01.00,Default,,0,0,0,,huge\n\
                     Dialogue: 0,0:00:02.00,0:00:03.00,Default,,0,0,0,,fine\n";
        let summary = import(block.as_bytes(), Format::Block, &mut store, &mut project).unwrap();
        assert_eq!(summary.created, 1);
        assert_eq!(summary.first_start, Time(2000));

        assert_matches!(
            import(
                b"1\n3000000000000:00:00,000 --> 3000000000000:00:01,000\nhuge\n",
                Format::Sequential,
                &mut store,
                &mut project
            ),
            Err(ImportError::Malformed(parse::Error::InvalidTimeRange(_)))
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn refused_region_adds_no_actor() {
        let mut store = MemoryRegionStore::new_empty();
        let mut project = Project::new();

        let block = "[Events]\n\
                     Dialogue: 0,0:00:05.00,0:00:01.00,Default,Dave,0,0,0,,backwards\n\
                     Dialogue: 0,0:00:02.00,0:00:03.00,Default,Erin,0,0,0,,fine\n";
        let summary = import(block.as_bytes(), Format::Block, &mut store, &mut project).unwrap();
        assert_eq!(summary.created, 1);
        assert!(!project.actors.contains("Dave"));
        assert!(project.actors.contains("Erin"));

        let erin = project.subtitles.iter().next().unwrap().region().unwrap();
        assert_eq!(store.get(erin).unwrap().colour, Some(colour::colour_for("Erin")));
    }

    #[test]
    fn import_from_path() {
        let mut store = MemoryRegionStore::new_empty();
        let mut project = Project::new();

        let summary =
            import_path(&test_file("test_files/sample.ass"), &mut store, &mut project).unwrap();
        assert_eq!(summary.created, 4);

        let summary =
            import_path(&test_file("test_files/sample.srt"), &mut store, &mut project).unwrap();
        assert_eq!(summary.created, 1);
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(Format::from_path(Path::new("a/b.ass")), Format::Block);
        assert_eq!(Format::from_path(Path::new("b.ASS")), Format::Block);
        assert_eq!(Format::from_path(Path::new("b.srt")), Format::Sequential);
        assert_eq!(Format::from_path(Path::new("no_extension")), Format::Sequential);
    }
}
