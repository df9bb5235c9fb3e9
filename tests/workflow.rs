use assert_matches2::assert_matches;
use renotes::colour::{Colour, colour_for};
use renotes::config::UNKNOWN_ACTOR;
use renotes::region::{NewRegion, RegionId, Time};
use renotes::subtitle::import::{self, Format, ImportError};
use renotes::subtitle::{Binding, RegionSubtitle};
use renotes::sync::{self, Session};
use renotes::{MemoryRegionStore, Project, RegionStore, export, roles};

const SAMPLE_ASS: &[u8] = include_bytes!("../test_files/sample.ass");
const SAMPLE_SRT: &[u8] = include_bytes!("../test_files/sample.srt");
const ROLES: &str = include_str!("../test_files/roles.ini");

/// Shows the crate's log output for failing tests, filtered by `RUST_LOG`.
fn init_logging() {
    // Tests race to install it, only the first one wins
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

fn notes_by_actor(project: &Project) -> Vec<(&str, &str)> {
    project
        .subtitles
        .iter()
        .map(|subtitle| (subtitle.actor.as_str(), subtitle.notes.as_str()))
        .collect()
}

#[test]
fn sequential_sample() {
    let mut store = MemoryRegionStore::new_empty();
    let mut project = Project::new();

    let summary = import::import(SAMPLE_SRT, Format::Sequential, &mut store, &mut project).unwrap();
    assert_eq!(summary.created, 1);
    assert_eq!(summary.first_start, Time(1000));

    assert_eq!(notes_by_actor(&project), [(UNKNOWN_ACTOR, "Hello world")]);

    let region = project.subtitles.iter().next().unwrap().region().unwrap();
    let info = store.region_info(region).unwrap();
    assert_eq!((info.start, info.end), (Time(1000), Time(2500)));
    assert_eq!(info.index, 1);
    assert_eq!(info.name, "Hello world");
    assert_eq!(info.colour, None);
}

#[test]
fn block_sample() {
    init_logging();
    let mut store = MemoryRegionStore::new_empty();
    let mut project = Project::new();

    let summary = import::import(SAMPLE_ASS, Format::Block, &mut store, &mut project).unwrap();
    assert_eq!(summary.created, 4);
    assert_eq!(summary.first_start, Time(2000));

    assert_eq!(
        notes_by_actor(&project),
        [
            ("Alice", "Where were you,\nall night?"),
            ("Bob", "Out."),
            (UNKNOWN_ACTOR, "(door slams)"),
            ("Alice", "Fine."),
        ]
    );
    assert!(!project.actors.contains("Carol"));

    let names: Vec<String> = store.iter().map(|info| info.name.clone()).collect();
    assert_eq!(
        names,
        [
            "(door slams)",
            "(Alice) Where were you, all night?",
            "(Bob) Out.",
            "(Alice) Fine."
        ]
    );
}

#[test]
fn roles_then_hide_and_show() -> anyhow::Result<()> {
    init_logging();
    let mut store = MemoryRegionStore::new_empty();
    let mut project = Project::new();
    import::import(SAMPLE_ASS, Format::Block, &mut store, &mut project)?;

    roles::decode_role_file(ROLES, &mut project.actors, &mut project.imported_roles);
    sync::refresh_regions(&mut store, &project);

    let orange = Colour::new(0xe0, 0x5a, 0x00);
    let alice_regions: Vec<RegionId> = project
        .subtitles
        .iter()
        .filter(|subtitle| subtitle.actor == "Alice")
        .filter_map(RegionSubtitle::region)
        .collect();
    for &region in &alice_regions {
        assert_eq!(store.region_info(region).unwrap().colour, Some(orange));
    }
    assert_eq!(
        store.region_info(alice_regions[1]).unwrap().name,
        "Narrator (Alice) Fine."
    );
    assert_eq!(project.imported_roles.len(), 3);

    let exported = roles::encode_role_file(&project.actors, &project.imported_roles)?;
    assert_eq!(roles::parse_role_file(&exported), roles::parse_role_file(ROLES));

    let before = store.len();
    assert!(sync::set_actor_enabled(
        &mut store,
        &mut project,
        "Alice",
        false
    ));
    assert_eq!(store.len(), before - 2);
    for region in &alice_regions {
        assert!(store.find_region(*region).is_none());
    }
    let orphaned: Vec<Binding> = project
        .subtitles
        .iter()
        .filter(|subtitle| subtitle.actor == "Alice")
        .map(|subtitle| subtitle.binding)
        .collect();
    assert_eq!(
        orphaned,
        [
            Binding::Orphaned {
                start: Time(4000),
                end: Time(6500)
            },
            Binding::Orphaned {
                start: Time(10_000),
                end: Time(12_000)
            },
        ]
    );

    // Orphaned subtitles survive a save and load cycle
    let document = project.save(&store)?;
    let mut project = Project::load(&document)?;
    assert_eq!(project.subtitles.len(), 4);
    assert!(!project.actors.get("Alice").unwrap().enabled);

    assert!(sync::set_actor_enabled(
        &mut store,
        &mut project,
        "Alice",
        true
    ));
    assert_eq!(store.len(), before);
    let restored: Vec<(Time, Time, Option<Colour>)> = project
        .subtitles
        .iter()
        .filter(|subtitle| subtitle.actor == "Alice")
        .map(|subtitle| {
            let info = store.region_info(subtitle.region().unwrap()).unwrap();
            (info.start, info.end, info.colour)
        })
        .collect();
    assert_eq!(
        restored,
        [
            (Time(4000), Time(6500), Some(orange)),
            (Time(10_000), Time(12_000), Some(orange))
        ]
    );

    Ok(())
}

#[test]
fn host_deleted_region_keeps_notes() -> anyhow::Result<()> {
    init_logging();
    let mut store = MemoryRegionStore::new_empty();
    let mut project = Project::new();
    import::import(SAMPLE_SRT, Format::Sequential, &mut store, &mut project)?;

    let region = project.subtitles.iter().next().unwrap().region().unwrap();
    assert!(store.delete_region(region));

    // Saved while the region is gone, the subtitle comes back orphaned
    let loaded = Project::load(&project.save(&store)?)?;
    assert_eq!(notes_by_actor(&loaded), [(UNKNOWN_ACTOR, "Hello world")]);
    assert_eq!(
        loaded.subtitles.iter().next().unwrap().binding,
        Binding::Orphaned {
            start: Time(1000),
            end: Time(2500)
        }
    );

    assert!(sync::set_actor_enabled(
        &mut store,
        &mut project,
        UNKNOWN_ACTOR,
        false
    ));
    assert!(sync::set_actor_enabled(
        &mut store,
        &mut project,
        UNKNOWN_ACTOR,
        true
    ));
    assert_eq!(store.len(), 1);

    let restored = project.subtitles.iter().next().unwrap().region().unwrap();
    let info = store.region_info(restored).unwrap();
    assert_eq!((info.start, info.end), (Time(1000), Time(2500)));
    assert_eq!(info.name, "Hello world");

    let loaded = Project::load(&project.save(&store)?)?;
    assert_eq!(loaded.subtitles.len(), 1);
    assert_eq!(loaded.subtitles.iter().next().unwrap().region(), Some(restored));
    Ok(())
}

#[test]
fn overlaps_follow_store_order() {
    let mut store = MemoryRegionStore::new_empty();
    let mut project = Project::new();
    let mut session = Session::new();

    let mut add = |start: i64, end: i64| {
        store
            .create_region(NewRegion {
                start: Time(start),
                end: Time(end),
                name: "",
                colour: None,
                index_hint: None,
            })
            .unwrap()
    };
    let first = add(0, 5000);
    let unsubtitled = add(1000, 5000);
    let third = add(2000, 5000);

    project
        .subtitles
        .push(RegionSubtitle::new(third, Time(2000), Time(5000), "third", "Bob"));
    project
        .subtitles
        .push(RegionSubtitle::new(first, Time(0), Time(5000), "first", "Alice"));
    project.actors.find_or_create("Alice");
    project.actors.find_or_create("Bob");

    let overlaps = session.overlaps_at(&store, &project, Time(3000));
    assert_eq!(overlaps.regions, [first, third]);
    assert!(!overlaps.regions.contains(&unsubtitled));
    assert!(overlaps.changed);

    let again = session.overlaps_at(&store, &project, Time(3000));
    assert_eq!(again.regions, [first, third]);
    assert!(!again.changed);

    let refresh = session.reconcile(&store, &mut project, Time(3000)).unwrap();
    assert_eq!(refresh.text, "(Alice) first\r\n(Bob) third");
    assert_eq!(
        sync::overlap_labels(&store, &project, session.overlaps()),
        ["Alice", "Bob"]
    );
}

#[test]
fn export_sample() {
    let mut store = MemoryRegionStore::new_empty();
    let mut project = Project::new();

    for (start, end, actor, notes) in [
        (60_000, 62_000, "B", "B says hi"),
        (1000, 3000, "A", "A says hi"),
    ] {
        let region = store
            .create_region(NewRegion {
                start: Time(start),
                end: Time(end),
                name: notes,
                colour: None,
                index_hint: None,
            })
            .unwrap();
        project.actors.find_or_create(actor);
        project
            .subtitles
            .push(RegionSubtitle::new(region, Time(start), Time(end), notes, actor));
    }
    sync::link_actor(&mut store, &mut project, "B", "Narrator");
    assert_eq!(
        store.iter().map(|info| info.colour).collect::<Vec<_>>(),
        [Some(colour_for("A")), Some(colour_for("Narrator"))]
    );

    assert_matches!(
        export::copy_markers(&store, &project),
        Err(export::Error::NothingToCopy)
    );

    store.add_marker(Time(2000), "");
    store.add_marker(Time(61_000), "");
    assert_eq!(
        export::copy_markers(&store, &project).unwrap(),
        "0:01 - 0:03 A says hi\n\nNarrator\n1:00 - 1:02 B says hi"
    );
}

#[test]
fn import_errors() {
    let mut store = MemoryRegionStore::new_empty();
    let mut project = Project::new();

    assert_matches!(
        import::import_path(
            std::path::Path::new("test_files/missing.srt"),
            &mut store,
            &mut project
        ),
        Err(ImportError::Io(_))
    );
    assert_matches!(
        import::import(b"\xef\xbb\xbf", Format::Block, &mut store, &mut project),
        Err(ImportError::Empty)
    );
}
