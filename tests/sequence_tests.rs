//! Integration tests for call sequence windowing and rendering.

use callchain_diag::stack::frame_at;
use callchain_diag::{
    call_sequence, checkpoint, enter, participant, CallerInfo, DiagConfig, FrameHandle,
    FrameInspector, ScopeRegistry, SequenceFormatter, StackUnavailable,
};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::sync::{mpsc, Arc};

/// Module name rendered for frames declared in this file
const MODULE: &str = "sequence_tests";

macro_rules! here {
    () => {{
        checkpoint!();
        line!()
    }};
}

fn formatter() -> SequenceFormatter {
    let _ = env_logger::builder().is_test(true).try_init();
    let registry = ScopeRegistry::new().with_class(module_path!(), "Pump").unwrap();
    SequenceFormatter::new(
        FrameInspector::new(Arc::new(registry)),
        &DiagConfig::default(),
    )
}

fn entry(function: &str, line: u32) -> String {
    CallerInfo::new(MODULE, "", function, line).to_string()
}

/// f0 (innermost) <- f1 <- f2, each returning the lines it is parked on
fn f2(formatter: &SequenceFormatter, latest: usize, depth: usize) -> (String, [u32; 3]) {
    let _frame = enter!("f2");
    let line = here!();
    let (chain, [l0, l1, _]) = f1(formatter, latest, depth);
    (chain, [l0, l1, line])
}

fn f1(formatter: &SequenceFormatter, latest: usize, depth: usize) -> (String, [u32; 3]) {
    let _frame = enter!("f1");
    let line = here!();
    let (chain, [l0, _, _]) = f0(formatter, latest, depth);
    (chain, [l0, line, 0])
}

fn f0(formatter: &SequenceFormatter, latest: usize, depth: usize) -> (String, [u32; 3]) {
    let _frame = enter!("f0");
    let line = here!();
    (formatter.format_call_sequence(latest, depth), [line, 0, 0])
}

#[test]
fn test_three_deep_outermost_left() {
    let formatter = formatter();
    let (chain, [l0, l1, l2]) = f2(&formatter, 0, 3);
    assert_eq!(
        chain,
        format!("{} -> {} -> {}", entry("f2", l2), entry("f1", l1), entry("f0", l0))
    );
}

#[test]
fn test_window_skips_latest() {
    let formatter = formatter();
    let (chain, [_, l1, _]) = f2(&formatter, 1, 1);
    assert_eq!(chain, entry("f1", l1));
}

#[test]
fn test_window_middle_pair() {
    let formatter = formatter();
    let _frame = enter!("test_window_middle_pair");
    let (chain, [_, l1, l2]) = f2(&formatter, 1, 2);
    assert_eq!(chain, format!("{} -> {}", entry("f2", l2), entry("f1", l1)));
}

#[test]
fn test_depth_zero_is_empty() {
    let formatter = formatter();
    let (chain, _) = f2(&formatter, 0, 0);
    assert_eq!(chain, "");
}

#[test]
fn test_latest_past_bottom_is_empty() {
    let formatter = formatter();
    let (chain, _) = f2(&formatter, 3, 2);
    assert_eq!(chain, "");
    let (chain, _) = f2(&formatter, usize::MAX, usize::MAX);
    assert_eq!(chain, "");
}

#[test]
fn test_depth_past_bottom_truncates() {
    let formatter = formatter();
    let (chain, [l0, l1, l2]) = f2(&formatter, 0, 10);
    assert_eq!(
        chain,
        format!("{} -> {} -> {}", entry("f2", l2), entry("f1", l1), entry("f0", l0))
    );
}

#[test]
fn test_no_frames_is_empty() {
    let formatter = formatter();
    assert_eq!(formatter.format_call_sequence(0, 3), "");
    assert_eq!(formatter.format_default(0), "");
}

#[test]
fn test_repeat_calls_are_identical() {
    let formatter = formatter();
    let _frame = enter!("test_repeat_calls_are_identical");
    checkpoint!();
    let first = formatter.format_call_sequence(0, 3);
    let second = formatter.format_call_sequence(0, 3);
    assert_eq!(first, second);
}

#[test]
fn test_macro_records_call_line() {
    let formatter = formatter();
    let _frame = enter!("test_macro_records_call_line");
    let (chain, line) = (call_sequence!(formatter, 0, 1), line!());
    assert_eq!(chain, entry("test_macro_records_call_line", line));
}

#[test]
fn test_default_depth() {
    let formatter = formatter();
    assert_eq!(formatter.default_depth(), 3);

    fn level(formatter: &SequenceFormatter, remaining: usize) -> String {
        let _frame = enter!("level");
        if remaining == 0 {
            call_sequence!(formatter)
        } else {
            level(formatter, remaining - 1)
        }
    }

    let chain = level(&formatter, 5);
    assert_eq!(chain.matches(" -> ").count(), 2);
    assert!(chain.split(" -> ").all(|e| e.starts_with("sequence_tests.level:")));
}

#[test]
fn test_method_entries_show_class() {
    let formatter = formatter();

    struct Pump;
    participant!(Pump);

    impl Pump {
        fn prime(&self, formatter: &SequenceFormatter) -> (String, u32, u32) {
            let _frame = enter!("Pump.prime", recv = self);
            let outer = here!();
            let (chain, inner) = self.stroke(formatter);
            (chain, outer, inner)
        }

        fn stroke(&self, formatter: &SequenceFormatter) -> (String, u32) {
            let _frame = enter!("Pump.stroke", recv = self);
            let line = here!();
            (formatter.format_call_sequence(0, 2), line)
        }
    }

    let (chain, outer, inner) = Pump.prime(&formatter);
    assert_eq!(
        chain,
        format!("sequence_tests::Pump.prime:{outer} -> sequence_tests::Pump.stroke:{inner}")
    );
}

#[test]
fn test_callers_are_innermost_first() {
    let formatter = formatter();
    let _outer = enter!("outer");
    let _inner = enter!("inner");
    let callers = formatter.callers(0, 5);
    let names: Vec<&str> = callers.iter().map(|c| c.function_name.as_str()).collect();
    assert_eq!(names, vec!["inner", "outer"]);
}

#[test]
fn test_threads_see_only_their_own_stack() {
    let formatter = formatter();
    let _frame = enter!("main_side");

    let chains: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let formatter = formatter.clone();
                scope.spawn(move || {
                    let _frame = enter!("worker");
                    formatter.format_call_sequence(0, 5)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for chain in chains {
        assert!(chain.starts_with("sequence_tests.worker:"));
        assert!(!chain.contains("main_side"));
    }
}

type TeardownReport = (String, Result<Option<FrameHandle>, StackUnavailable>);

/// Formats a sequence from its destructor, while its thread exits
struct TeardownCheck {
    formatter: SequenceFormatter,
    report: mpsc::Sender<TeardownReport>,
}

impl Drop for TeardownCheck {
    fn drop(&mut self) {
        let chain = self.formatter.format_call_sequence(0, 3);
        let _ = self.report.send((chain, frame_at(0)));
    }
}

thread_local! {
    static TEARDOWN: RefCell<Option<TeardownCheck>> = const { RefCell::new(None) };
}

#[test]
fn test_unavailable_stack_during_thread_teardown() {
    let formatter = formatter();
    let (report, results) = mpsc::channel();

    std::thread::spawn(move || {
        // Thread-local destructors run in reverse order of first use, so
        // the frame stack is gone by the time TEARDOWN is dropped.
        TEARDOWN.with(|slot| *slot.borrow_mut() = Some(TeardownCheck { formatter, report }));
        let _frame = enter!("exiting");
    })
    .join()
    .unwrap();

    let (chain, frame) = results.recv().unwrap();
    assert_eq!(chain, "");
    assert_eq!(frame, Err(StackUnavailable));
}
