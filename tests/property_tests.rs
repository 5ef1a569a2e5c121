//! Property-based tests for hierarchy dispatch.
//!
//! These tests use proptest to drive a small machine with random event
//! sequences and verify the configuration stays well formed.

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use strata::builder::{simple_transition, HierarchyBuilder};
use strata::{from_fn, Hierarchy, NodeId, StateKind, TransFlags, Transitions};

#[derive(Clone, Copy, PartialEq, Debug)]
enum Ev {
    ToggleA,
    ToggleR1,
    ToggleR2,
    Jump,
    Back,
    Noise,
    Corrupt,
}

struct Fixture {
    machine: Hierarchy<Ev, ()>,
    r1: NodeId,
    r2: NodeId,
    split: NodeId,
}

// top ─┬─ Work ─┬─ Idle
//      │        └─ Busy
//      └─ Split ─┬─ R1 ─┬─ Off
//                │      └─ On
//                └─ R2 ─┬─ Low
//                       └─ High
fn fixture() -> Fixture {
    let mut builder = HierarchyBuilder::<Ev, ()>::new(());
    builder.initial(1u32);

    let work = builder.composite(NodeId::TOP, 1u32, "Work", 1u32);
    let idle = builder.simple(work, 1u32, "Idle");
    let busy = builder.simple(work, 2u32, "Busy");

    let split = builder.parallel(NodeId::TOP, 2u32, "Split");
    let r1 = builder.region(split, 1u32, "R1", 1u32);
    let off = builder.simple(r1, 1u32, "Off");
    let on = builder.simple(r1, 2u32, "On");
    let r2 = builder.region(split, 2u32, "R2", 1u32);
    let low = builder.simple(r2, 1u32, "Low");
    let high = builder.simple(r2, 2u32, "High");

    builder.behavior(idle, simple_transition(Ev::ToggleA, idle, busy));
    builder.behavior(
        busy,
        from_fn(move |event: Option<&Ev>, cx: &mut Transitions<'_, ()>| match event {
            Some(Ev::ToggleA) => cx.transition(busy, idle, TransFlags::CONSUMED),
            Some(Ev::Corrupt) => TransFlags::STATE_ERROR,
            _ => TransFlags::NOT_CONSUMED,
        }),
    );
    builder.behavior(off, simple_transition(Ev::ToggleR1, off, on));
    builder.behavior(
        on,
        from_fn(move |event: Option<&Ev>, cx: &mut Transitions<'_, ()>| match event {
            Some(Ev::ToggleR1) => cx.transition(on, off, TransFlags::CONSUMED),
            Some(Ev::Corrupt) => TransFlags::STATE_ERROR,
            _ => TransFlags::NOT_CONSUMED,
        }),
    );
    builder.behavior(low, simple_transition(Ev::ToggleR2, low, high));
    builder.behavior(high, simple_transition(Ev::ToggleR2, high, low));
    builder.behavior(
        work,
        from_fn(move |event: Option<&Ev>, cx: &mut Transitions<'_, ()>| match event {
            Some(Ev::Jump) => cx.switch_to(split, TransFlags::CONSUMED),
            _ => TransFlags::NOT_CONSUMED,
        }),
    );
    builder.behavior(
        split,
        from_fn(move |event: Option<&Ev>, cx: &mut Transitions<'_, ()>| match event {
            Some(Ev::Back) => cx.switch_to(work, TransFlags::CONSUMED),
            _ => TransFlags::NOT_CONSUMED,
        }),
    );

    let mut machine = builder.build().unwrap();
    machine.start().unwrap();
    Fixture {
        machine,
        r1,
        r2,
        split,
    }
}

// A composite reset by a fatal error holds no active child until its next
// dispatch; `settled` is false right after such an error.
fn check_invariants(machine: &Hierarchy<Ev, ()>, settled: bool) -> Result<(), TestCaseError> {
    prop_assert!(machine.is_active(NodeId::TOP));

    for node in machine.nodes() {
        let active = machine.is_active(node);

        if active {
            if let Some(parent) = machine.enclosing(node) {
                prop_assert!(
                    machine.is_active(parent),
                    "{} is active under an inactive parent",
                    machine.path(node)
                );
            }
        }

        match machine.kind(node) {
            StateKind::Simple => {}
            StateKind::Composite if active => {
                let active_children: Vec<NodeId> = machine
                    .children(node)
                    .iter()
                    .copied()
                    .filter(|child| machine.is_active(*child))
                    .collect();
                if settled {
                    prop_assert_eq!(active_children.len(), 1, "{}", machine.path(node));
                } else {
                    prop_assert!(active_children.len() <= 1, "{}", machine.path(node));
                }
                if let Some(child) = active_children.first() {
                    prop_assert_eq!(machine.active_child(node), Some(*child));
                } else {
                    prop_assert_eq!(machine.active_id(node), None);
                }
            }
            StateKind::Composite => {
                for child in machine.children(node) {
                    prop_assert!(!machine.is_active(*child));
                }
            }
            StateKind::Parallel if active => {
                for region in machine.children(node) {
                    prop_assert!(machine.is_active(*region));
                }
            }
            StateKind::Parallel => {}
        }
    }

    for leaf in machine.active_leaves() {
        prop_assert!(machine.stats(leaf).entries >= 1);
    }
    Ok(())
}

fn arbitrary_event_or_fault() -> impl Strategy<Value = Ev> {
    prop_oneof![4 => arbitrary_event(), 1 => Just(Ev::Corrupt)]
}

fn arbitrary_event() -> impl Strategy<Value = Ev> {
    prop_oneof![
        Just(Ev::ToggleA),
        Just(Ev::ToggleR1),
        Just(Ev::ToggleR2),
        Just(Ev::Jump),
        Just(Ev::Back),
        Just(Ev::Noise),
    ]
}

proptest! {
    #[test]
    fn configuration_stays_well_formed(events in prop::collection::vec(arbitrary_event(), 0..40)) {
        let mut fixture = fixture();
        check_invariants(&fixture.machine, true)?;

        for event in &events {
            let flags = fixture.machine.process(event).unwrap();
            prop_assert!(!flags.is_state_error());
            check_invariants(&fixture.machine, true)?;
        }
    }

    #[test]
    fn fatal_errors_leave_configuration_consistent(
        events in prop::collection::vec(arbitrary_event_or_fault(), 0..40),
    ) {
        let mut fixture = fixture();

        for event in &events {
            match fixture.machine.process(event) {
                Ok(_) => check_invariants(&fixture.machine, true)?,
                Err(err) => {
                    prop_assert_eq!(*event, Ev::Corrupt);
                    prop_assert!(err.flags().is_state_error());
                    check_invariants(&fixture.machine, false)?;
                }
            }
        }

        fixture.machine.process(&Ev::Noise).unwrap();
        check_invariants(&fixture.machine, true)?;
    }

    #[test]
    fn regions_do_not_disturb_each_other(events in prop::collection::vec(arbitrary_event(), 0..40)) {
        let mut fixture = fixture();

        for event in &events {
            let in_split = fixture.machine.is_active(fixture.split);
            let r1_before = fixture.machine.active_id(fixture.r1);
            let r2_before = fixture.machine.active_id(fixture.r2);

            fixture.machine.process(event).unwrap();

            if in_split {
                match event {
                    Ev::ToggleR1 => {
                        prop_assert_ne!(fixture.machine.active_id(fixture.r1), r1_before);
                        prop_assert_eq!(fixture.machine.active_id(fixture.r2), r2_before);
                    }
                    Ev::ToggleR2 => {
                        prop_assert_eq!(fixture.machine.active_id(fixture.r1), r1_before);
                        prop_assert_ne!(fixture.machine.active_id(fixture.r2), r2_before);
                    }
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn unhandled_events_change_nothing(events in prop::collection::vec(arbitrary_event(), 0..20)) {
        let mut fixture = fixture();
        for event in &events {
            fixture.machine.process(event).unwrap();
        }
        let before = fixture.machine.snapshot();

        let flags = fixture.machine.process(&Ev::Noise).unwrap();

        prop_assert_eq!(flags, TransFlags::NOT_CONSUMED);
        prop_assert_eq!(fixture.machine.snapshot().states, before.states);
    }

    #[test]
    fn restored_machine_follows_original(
        prefix in prop::collection::vec(arbitrary_event(), 0..20),
        suffix in prop::collection::vec(arbitrary_event(), 0..20),
    ) {
        let mut original = fixture();
        for event in &prefix {
            original.machine.process(event).unwrap();
        }
        let mut resumed = fixture();
        resumed.machine.restore(&original.machine.snapshot()).unwrap();

        for event in &suffix {
            let expected = original.machine.process(event).unwrap();
            prop_assert_eq!(resumed.machine.process(event).unwrap(), expected);
        }
        prop_assert_eq!(resumed.machine.configuration(), original.machine.configuration());
    }
}
