//! Traffic Light Hierarchy
//!
//! This example demonstrates a cyclic light nested inside an operating mode.
//!
//! Key concepts:
//! - Identity enums declared with `state_ids!`
//! - A composite (`Operating`) whose children cycle on timer events
//! - An outer transition (`Fault`) handled by the composite itself
//! - Deep re-entry of the default child after recovery
//!
//! Run with: RUST_LOG=strata=trace cargo run --example traffic_light

use strata::builder::{simple_transition, HierarchyBuilder};
use strata::{from_fn, state_ids, NodeId, TransFlags, Transitions};
use tracing_subscriber::EnvFilter;

state_ids! {
    enum Mode {
        Operating = 1,
        Flashing,
    }
}

state_ids! {
    enum Light {
        Red = 1,
        Green,
        Yellow,
    }
}

#[derive(Debug, PartialEq)]
enum Signal {
    Timer,
    Fault,
    Reset,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Traffic Light Hierarchy ===\n");

    let mut builder = HierarchyBuilder::<Signal, ()>::new(());
    builder.initial(Mode::Operating);

    let operating = builder.composite(
        NodeId::TOP,
        Mode::Operating,
        Mode::Operating.name(),
        Light::Red,
    );
    let red = builder.simple(operating, Light::Red, Light::Red.name());
    let green = builder.simple(operating, Light::Green, Light::Green.name());
    let yellow = builder.simple(operating, Light::Yellow, Light::Yellow.name());
    let flashing = builder.simple(NodeId::TOP, Mode::Flashing, Mode::Flashing.name());

    builder.behavior(red, simple_transition(Signal::Timer, red, green));
    builder.behavior(green, simple_transition(Signal::Timer, green, yellow));
    builder.behavior(yellow, simple_transition(Signal::Timer, yellow, red));
    builder.behavior(
        operating,
        from_fn(move |event: Option<&Signal>, cx: &mut Transitions<'_, ()>| match event {
            Some(Signal::Fault) => cx.switch_to(flashing, TransFlags::CONSUMED),
            _ => TransFlags::NOT_CONSUMED,
        }),
    );
    builder.behavior(
        flashing,
        from_fn(move |event: Option<&Signal>, cx: &mut Transitions<'_, ()>| match event {
            Some(Signal::Reset) => cx.switch_to(operating, TransFlags::CONSUMED),
            _ => TransFlags::NOT_CONSUMED,
        }),
    );

    let mut machine = match builder.build() {
        Ok(machine) => machine,
        Err(errors) => {
            eprintln!("{errors}");
            return;
        }
    };

    if let Err(e) = machine.start() {
        eprintln!("start failed: {e}");
        return;
    }
    println!("Initial configuration: {:?}\n", machine.configuration());

    let script = [
        Signal::Timer,
        Signal::Timer,
        Signal::Fault,
        Signal::Timer,
        Signal::Reset,
        Signal::Timer,
    ];

    for signal in &script {
        match machine.process(signal) {
            Ok(flags) => println!(
                "  {:<6} -> {:<12} {:?}",
                format!("{signal:?}"),
                flags.to_string(),
                machine.configuration()
            ),
            Err(e) => println!("  {signal:?} failed: {e}"),
        }
    }

    println!("\nEntry counts:");
    for node in [red, green, yellow, flashing] {
        println!("  {:<8} {}", machine.name(node), machine.stats(node).entries);
    }

    println!("\n=== Example Complete ===");
}
