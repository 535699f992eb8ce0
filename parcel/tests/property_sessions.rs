use futures::executor::block_on;
use parcel::engine::SketchEventKind;
use parcel::memory::{MemorySketch, MemoryView};
use parcel::model::ScreenPoint;
use parcel::{EditController, GeometryStore, SceneBinder, SketchEvent};
use proptest::prelude::*;

const POINTS: [ScreenPoint; 3] = [
    ScreenPoint { x: -13039300.0, y: 4039200.0 },
    ScreenPoint { x: -13045000.0, y: 4035000.0 },
    ScreenPoint { x: 0.0, y: 0.0 },
];

const PHASES: [Option<&str>; 8] = [
    None,
    Some("move-start"),
    Some("move"),
    Some("move-stop"),
    Some("reshape-start"),
    Some("reshape"),
    Some("reshape-stop"),
    Some("vertex-add"),
];

#[derive(Clone, Debug)]
enum Op {
    Click { point: usize },
    Event { phase: usize, kind: u8 },
    Cancel,
    FeedToolEvents,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..POINTS.len()).prop_map(|point| Op::Click { point }),
        (0..PHASES.len(), 0u8..3).prop_map(|(phase, kind)| Op::Event { phase, kind }),
        Just(Op::Cancel),
        Just(Op::FeedToolEvents),
    ]
}

fn kind(k: u8) -> SketchEventKind {
    match k {
        0 => SketchEventKind::Update,
        1 => SketchEventKind::Undo,
        _ => SketchEventKind::Redo,
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn never_more_than_one_session(ops in proptest::collection::vec(op_strategy(), 1..60)) {
        let binder = SceneBinder::initialize(MemoryView::new(), &GeometryStore::default());
        let tool = MemorySketch::new(Some(binder.editable_layer()));
        let mut c = EditController::new(binder, tool);
        let target = c.binder().editable_graphic();

        for op in ops {
            match op {
                Op::Click { point } => {
                    let hits_before = c.binder().view().hit_test_count();
                    let was_active = parcel::SketchTool::is_active(c.tool());
                    let _ = block_on(c.click(POINTS[point]));
                    if was_active {
                        prop_assert_eq!(c.binder().view().hit_test_count(), hits_before);
                    }
                }
                Op::Event { phase, kind: k } => {
                    let ev = SketchEvent::update(PHASES[phase]).with_kind(kind(k));
                    let _ = c.handle_event(&ev);
                }
                Op::Cancel => c.tool_mut().cancel(),
                Op::FeedToolEvents => {
                    for ev in c.tool_mut().drain_events() {
                        let _ = c.handle_event(&ev);
                    }
                }
            }
            prop_assert!(c.tool().active_sessions() <= 1);
            prop_assert!(!c.has_outstanding_click());
            for (graphics, _) in c.tool().update_calls() {
                prop_assert_eq!(graphics.as_slice(), &[target][..]);
            }
        }
    }
}
