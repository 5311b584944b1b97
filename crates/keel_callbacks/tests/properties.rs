//! Property tests for callback ordering.
//!
//! Each case registers a random sequence of callbacks on one event and checks
//! the recorded execution trace against the ordering rules:
//!
//! - befores run once each, in registration order, before anything else
//! - around pre-proceed code runs in registration order, post-proceed code in reverse
//! - the body runs exactly once, between the innermost pre and post
//! - afters run once each, in registration order, last

use keel_callbacks::{ActionError, CallbackRegistry};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Slot {
    Before,
    Around,
    After,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Before(usize),
    Pre(usize),
    Body,
    Post(usize),
    After(usize),
}

fn arb_slots() -> impl Strategy<Value = Vec<Slot>> {
    prop::collection::vec(
        prop_oneof![Just(Slot::Before), Just(Slot::Around), Just(Slot::After)],
        0..12,
    )
}

fn build(slots: &[Slot], failing_before: Option<usize>) -> CallbackRegistry<Vec<Step>> {
    let mut registry = CallbackRegistry::new();
    registry.declare("event").unwrap();
    for (index, slot) in slots.iter().enumerate() {
        let name = format!("cb{index}");
        match slot {
            Slot::Before => {
                let fails = failing_before == Some(index);
                registry
                    .before("event", name, move |trace: &mut Vec<Step>| {
                        trace.push(Step::Before(index));
                        if fails {
                            Err(ActionError::failed("before failed"))
                        } else {
                            Ok(())
                        }
                    })
                    .unwrap();
            }
            Slot::Around => {
                registry
                    .around("event", name, move |trace: &mut Vec<Step>, next| {
                        trace.push(Step::Pre(index));
                        let result = next.proceed(trace);
                        trace.push(Step::Post(index));
                        result
                    })
                    .unwrap();
            }
            Slot::After => {
                registry
                    .after("event", name, move |trace: &mut Vec<Step>| {
                        trace.push(Step::After(index));
                        Ok(())
                    })
                    .unwrap();
            }
        }
    }
    registry
}

fn indices(slots: &[Slot], wanted: fn(Slot) -> bool) -> Vec<usize> {
    slots
        .iter()
        .enumerate()
        .filter(|(_, slot)| wanted(**slot))
        .map(|(index, _)| index)
        .collect()
}

fn expected_trace(slots: &[Slot]) -> Vec<Step> {
    let befores = indices(slots, |s| matches!(s, Slot::Before));
    let arounds = indices(slots, |s| matches!(s, Slot::Around));
    let afters = indices(slots, |s| matches!(s, Slot::After));

    let mut trace: Vec<Step> = befores.into_iter().map(Step::Before).collect();
    trace.extend(arounds.iter().copied().map(Step::Pre));
    trace.push(Step::Body);
    trace.extend(arounds.iter().rev().copied().map(Step::Post));
    trace.extend(afters.into_iter().map(Step::After));
    trace
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Every registration sequence produces the canonical nesting.
    #[test]
    fn prop_trace_matches_canonical_order(slots in arb_slots()) {
        let registry = build(&slots, None);
        let mut trace = Vec::new();

        registry
            .run("event", &mut trace, |trace| {
                trace.push(Step::Body);
                Ok(())
            })
            .unwrap();

        prop_assert_eq!(trace, expected_trace(&slots));
    }

    /// A failing before stops the run right after itself.
    #[test]
    fn prop_failing_before_stops_the_run(slots in arb_slots(), pick in any::<prop::sample::Index>()) {
        let befores = indices(&slots, |s| matches!(s, Slot::Before));
        prop_assume!(!befores.is_empty());
        let failing = befores[pick.index(befores.len())];

        let registry = build(&slots, Some(failing));
        let mut trace = Vec::new();

        let result = registry.run("event", &mut trace, |trace| {
            trace.push(Step::Body);
            Ok(())
        });

        prop_assert!(result.is_err());
        let expected: Vec<Step> = befores
            .into_iter()
            .take_while(|index| *index <= failing)
            .map(Step::Before)
            .collect();
        prop_assert_eq!(trace, expected);
    }

    /// A failing body unwinds every around and skips every after.
    #[test]
    fn prop_failing_body_skips_afters(slots in arb_slots()) {
        let registry = build(&slots, None);
        let mut trace = Vec::new();

        let result = registry.run("event", &mut trace, |trace| -> Result<(), ActionError> {
            trace.push(Step::Body);
            Err(ActionError::failed("body failed"))
        });

        prop_assert!(result.is_err());
        let expected: Vec<Step> = expected_trace(&slots)
            .into_iter()
            .filter(|step| !matches!(step, Step::After(_)))
            .collect();
        prop_assert_eq!(trace, expected);
    }
}
