//! Log output of catalog binding, captured through a scoped subscriber.

use planner_core::binder::{BindPolicy, WorldBuilder};
use planner_core::test_utils::*;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing::subscriber::with_default;
use tracing_subscriber::EnvFilter;

#[derive(Clone)]
struct BufferWriter {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl BufferWriter {
    fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn contents(&self) -> String {
        let bytes = self.inner.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for BufferWriter {
    type Writer = BufferGuard;

    fn make_writer(&'a self) -> Self::Writer {
        BufferGuard {
            inner: self.inner.clone(),
        }
    }
}

struct BufferGuard {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl Write for BufferGuard {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn capture_logs<F: FnOnce()>(filter: &str, f: F) -> String {
    let writer = BufferWriter::new();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_ansi(false)
        .without_time()
        .with_writer(writer.clone())
        .finish();
    with_default(subscriber, f);
    writer.contents()
}

#[test]
fn unresolved_reference_is_warned() {
    let (items, buildings, mut drafts) = iron_catalog();
    drafts.push(draft(
        "Recipe_Mystery_C",
        "Mystery",
        &[("Desc_Unobtainium_C", "1")],
        &[(IRON_PLATE, "1")],
        &["Build_Nowhere_C"],
    ));

    let logs = capture_logs("warn", || {
        let world =
            WorldBuilder::bind_all("iron", BindPolicy::default(), items, buildings, &drafts).unwrap();
        assert_eq!(world.unresolved().len(), 2);
    });

    assert!(logs.contains("dropping unresolved catalog reference"));
    assert!(logs.contains("Desc_Unobtainium_C"));
    assert!(logs.contains("Build_Nowhere_C"));
    assert!(logs.contains("WARN"));
}

#[test]
fn duplicate_keys_are_warned() {
    let (mut items, buildings, drafts) = iron_catalog();
    items.push(item(IRON_PLATE, "Second Iron Plate"));

    let logs = capture_logs("warn", || {
        let world =
            WorldBuilder::bind_all("iron", BindPolicy::default(), items, buildings, &drafts).unwrap();
        let plate = world.item_id(IRON_PLATE).unwrap();
        assert_eq!(world.item(plate).unwrap().name, "Iron Plate");
    });

    assert!(logs.contains("duplicate catalog key, keeping first entry"));
}

#[test]
fn binding_summary_is_debug_only() {
    let (items, buildings, drafts) = iron_catalog();
    let quiet = capture_logs("warn", || {
        WorldBuilder::bind_all("iron", BindPolicy::default(), items.clone(), buildings.clone(), &drafts)
            .unwrap();
    });
    assert!(quiet.is_empty());

    let verbose = capture_logs("debug", || {
        WorldBuilder::bind_all("iron", BindPolicy::default(), items, buildings, &drafts).unwrap();
    });
    assert!(verbose.contains("recipes bound"));
    assert!(verbose.contains("default recipes bound"));
}
