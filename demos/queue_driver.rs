//! Queue-Driven Media Player
//!
//! This example demonstrates driving a hierarchy from an async event queue.
//!
//! Key concepts:
//! - The engine stays synchronous; a tokio task owns it and drains a channel
//! - A parallel state with two orthogonal regions (playback and volume)
//! - Guarded transitions reading the shared environment
//! - Checkpointing the configuration as JSON
//!
//! Run with: RUST_LOG=strata=debug cargo run --example queue_driver

use strata::builder::{guarded_transition, simple_transition, HierarchyBuilder};
use strata::{from_fn, state_ids, BuildErrors, Hierarchy, NodeId, TransFlags, Transitions};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

state_ids! {
    enum Regions {
        Playback = 1,
        Volume,
    }
}

state_ids! {
    enum Playback {
        Stopped = 1,
        Playing,
        Paused,
    }
}

state_ids! {
    enum Volume {
        Audible = 1,
        Muted,
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Play,
    Pause,
    Stop,
    Mute,
    Unmute,
}

struct Library {
    tracks: usize,
}

fn assemble(library: Library) -> Result<Hierarchy<Command, Library>, BuildErrors> {
    let mut builder = HierarchyBuilder::<Command, Library>::new(library);
    builder.initial(1u32);

    let player = builder.parallel(NodeId::TOP, 1u32, "Player");

    let playback = builder.region(
        player,
        Regions::Playback,
        Regions::Playback.name(),
        Playback::Stopped,
    );
    let stopped = builder.simple(playback, Playback::Stopped, Playback::Stopped.name());
    let playing = builder.simple(playback, Playback::Playing, Playback::Playing.name());
    let paused = builder.simple(playback, Playback::Paused, Playback::Paused.name());

    let volume = builder.region(
        player,
        Regions::Volume,
        Regions::Volume.name(),
        Volume::Audible,
    );
    let audible = builder.simple(volume, Volume::Audible, Volume::Audible.name());
    let muted = builder.simple(volume, Volume::Muted, Volume::Muted.name());

    builder.behavior(
        stopped,
        guarded_transition(Command::Play, stopped, playing, |library: &Library| {
            library.tracks > 0
        }),
    );
    builder.behavior(
        playing,
        from_fn(move |event: Option<&Command>, cx: &mut Transitions<'_, Library>| match event {
            Some(Command::Pause) => cx.transition(playing, paused, TransFlags::CONSUMED),
            Some(Command::Stop) => cx.transition(playing, stopped, TransFlags::CONSUMED),
            _ => TransFlags::NOT_CONSUMED,
        }),
    );
    builder.behavior(paused, simple_transition(Command::Play, paused, playing));
    builder.behavior(audible, simple_transition(Command::Mute, audible, muted));
    builder.behavior(muted, simple_transition(Command::Unmute, muted, audible));

    builder.build()
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Queue-Driven Media Player ===\n");

    let mut machine = match assemble(Library { tracks: 12 }) {
        Ok(machine) => machine,
        Err(errors) => {
            eprintln!("{errors}");
            return;
        }
    };

    let (tx, mut rx) = mpsc::channel::<Command>(16);

    let driver = tokio::spawn(async move {
        if let Err(e) = machine.start() {
            eprintln!("start failed: {e}");
            return machine;
        }
        while let Some(command) = rx.recv().await {
            match machine.process(&command) {
                Ok(flags) => info!(?command, %flags, "processed"),
                Err(e) => eprintln!("dispatch of {command:?} failed: {e}"),
            }
            println!("  {:<7} {:?}", format!("{command:?}"), machine.configuration());
        }
        machine
    });

    for command in [
        Command::Play,
        Command::Mute,
        Command::Pause,
        Command::Unmute,
        Command::Play,
        Command::Stop,
    ] {
        if tx.send(command).await.is_err() {
            break;
        }
    }
    drop(tx);

    let machine = match driver.await {
        Ok(machine) => machine,
        Err(e) => {
            eprintln!("driver task failed: {e}");
            return;
        }
    };

    println!("\nLibrary holds {} tracks", machine.env().tracks);
    match machine.snapshot().to_json() {
        Ok(json) => println!("Checkpoint: {} bytes of JSON", json.len()),
        Err(e) => eprintln!("checkpoint failed: {e}"),
    }

    println!("\n=== Example Complete ===");
}
