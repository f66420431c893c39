//! Raw filesystem events
//!
//! A [`RawEvent`] is what the watch mechanism hands to the event loop: one
//! path, one operation kind, and the moment it was received.

use std::path::PathBuf;

use notify::event::{EventKind, ModifyKind, RenameMode};
use tokio::time::Instant;

// ═══════════════════════════════════════════════════════════════════════════
// TYPES
// ═══════════════════════════════════════════════════════════════════════════

/// Classification of a filesystem change notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "UPPERCASE")]
pub enum OpKind {
    Create,
    Write,
    Remove,
    Rename,
    Chmod,
}

/// One notification from the watch mechanism
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub path: PathBuf,
    pub op: OpKind,
    pub received_at: Instant,
}

impl RawEvent {
    /// Create an event stamped with the current time
    pub fn new(path: impl Into<PathBuf>, op: OpKind) -> Self {
        Self {
            path: path.into(),
            op,
            received_at: Instant::now(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// NOTIFY TRANSLATION
// ═══════════════════════════════════════════════════════════════════════════

/// Translate a notify event into zero or more raw events.
///
/// A path moved into a watched directory is reported as `Create`, the same
/// way inotify's `IN_MOVED_TO` reaches most watchers: editors that save via
/// rename-over-temp-file then still trigger a run, and directories moved in
/// still get watched.
///
/// A paired rename (`RenameMode::Both`) yields nothing. The backend already
/// reported each side on its own as `From` and `To`, so one save stays one
/// `Create`.
pub fn from_notify(event: notify::Event) -> Vec<RawEvent> {
    let received_at = Instant::now();
    let stamp = |path: PathBuf, op: OpKind| RawEvent {
        path,
        op,
        received_at,
    };

    match event.kind {
        EventKind::Create(_) => single(event.paths, OpKind::Create, stamp),
        EventKind::Modify(ModifyKind::Metadata(_)) => single(event.paths, OpKind::Chmod, stamp),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            single(event.paths, OpKind::Create, stamp)
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both))
        | EventKind::Access(_)
        | EventKind::Any
        | EventKind::Other => Vec::new(),
        EventKind::Modify(ModifyKind::Name(_)) => single(event.paths, OpKind::Rename, stamp),
        EventKind::Modify(_) => single(event.paths, OpKind::Write, stamp),
        EventKind::Remove(_) => single(event.paths, OpKind::Remove, stamp),
    }
}

fn single(
    paths: Vec<PathBuf>,
    op: OpKind,
    stamp: impl Fn(PathBuf, OpKind) -> RawEvent,
) -> Vec<RawEvent> {
    paths.into_iter().map(|path| stamp(path, op)).collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use notify::event::{CreateKind, DataChange, MetadataKind, RemoveKind};

    use super::*;

    fn notify_event(kind: EventKind, paths: &[&str]) -> notify::Event {
        paths
            .iter()
            .fold(notify::Event::new(kind), |ev, p| ev.add_path(PathBuf::from(p)))
    }

    fn ops(events: &[RawEvent]) -> Vec<(PathBuf, OpKind)> {
        events.iter().map(|e| (e.path.clone(), e.op)).collect()
    }

    #[test]
    fn test_op_kind_display_matches_watcher_names() {
        assert_eq!(OpKind::Create.to_string(), "CREATE");
        assert_eq!(OpKind::Write.to_string(), "WRITE");
        assert_eq!(OpKind::Chmod.to_string(), "CHMOD");
    }

    #[test]
    fn test_create_maps_to_create() {
        let ev = notify_event(EventKind::Create(CreateKind::File), &["/proj/a/x.go"]);
        assert_eq!(
            ops(&from_notify(ev)),
            vec![(PathBuf::from("/proj/a/x.go"), OpKind::Create)]
        );
    }

    #[test]
    fn test_data_change_maps_to_write() {
        let ev = notify_event(
            EventKind::Modify(ModifyKind::Data(DataChange::Content)),
            &["/proj/a/x.go"],
        );
        assert_eq!(
            ops(&from_notify(ev)),
            vec![(PathBuf::from("/proj/a/x.go"), OpKind::Write)]
        );
    }

    #[test]
    fn test_metadata_maps_to_chmod() {
        let ev = notify_event(
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
            &["/proj/a/x.go"],
        );
        assert_eq!(from_notify(ev)[0].op, OpKind::Chmod);
    }

    #[test]
    fn test_rename_to_maps_to_create() {
        let ev = notify_event(
            EventKind::Modify(ModifyKind::Name(RenameMode::To)),
            &["/proj/a/x.go"],
        );
        assert_eq!(
            ops(&from_notify(ev)),
            vec![(PathBuf::from("/proj/a/x.go"), OpKind::Create)]
        );
    }

    #[test]
    fn test_rename_pair_adds_no_second_create() {
        // inotify reports a rename as From, To, then Both for the pair
        let reported = [
            notify_event(
                EventKind::Modify(ModifyKind::Name(RenameMode::From)),
                &["/proj/a/.x.go.swp"],
            ),
            notify_event(
                EventKind::Modify(ModifyKind::Name(RenameMode::To)),
                &["/proj/a/x.go"],
            ),
            notify_event(
                EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
                &["/proj/a/.x.go.swp", "/proj/a/x.go"],
            ),
        ];

        let events: Vec<_> = reported.into_iter().flat_map(from_notify).collect();

        assert_eq!(
            ops(&events),
            vec![
                (PathBuf::from("/proj/a/.x.go.swp"), OpKind::Rename),
                (PathBuf::from("/proj/a/x.go"), OpKind::Create),
            ]
        );
    }

    #[test]
    fn test_rename_from_maps_to_rename() {
        let ev = notify_event(
            EventKind::Modify(ModifyKind::Name(RenameMode::From)),
            &["/proj/a/x.go"],
        );
        assert_eq!(from_notify(ev)[0].op, OpKind::Rename);
    }

    #[test]
    fn test_remove_maps_to_remove() {
        let ev = notify_event(EventKind::Remove(RemoveKind::Folder), &["/proj/a"]);
        assert_eq!(from_notify(ev)[0].op, OpKind::Remove);
    }

    #[test]
    fn test_access_is_dropped() {
        let ev = notify_event(
            EventKind::Access(notify::event::AccessKind::Any),
            &["/proj/a/x.go"],
        );
        assert!(from_notify(ev).is_empty());
    }
}
