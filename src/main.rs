//! Replay a recorded frame-router session.
//!
//! Each line of the trace is a JSON step: host setup (`view`, `destroy`),
//! an inbound frame `message`, or a controller command (`follow-start`,
//! `follow-stop`, `reset-links`, `dispatch`, `prune`, `close-view`). Every
//! outbound delivery and controller event is printed as one JSON line.

use anyhow::{Context, Result, bail};
use rune_config::RuneConfig;
use rune_frames::{
    ControllerEvent, Delivery, FollowFilter, FrameController, FrameEvent, FrameHost, FrameId,
    Inbound, RecordingHost, ViewId,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
enum Step {
    View {
        id: ViewId,
        main_frame: FrameId,
        #[serde(default)]
        frames: Vec<FrameId>,
    },
    Destroy {
        frame: FrameId,
    },
    Message {
        message: Inbound,
    },
    FollowStart {
        view: ViewId,
        #[serde(default)]
        filter: FollowFilter,
    },
    FollowStop,
    ResetLinks,
    Dispatch {
        view: ViewId,
        event: FrameEvent,
    },
    Prune {
        view: ViewId,
    },
    CloseView {
        view: ViewId,
    },
}

fn main() -> Result<()> {
    if let Err(e) = env_logger::try_init() {
        log::debug!("logger already initialised: {}", e);
    }

    let mut args = env::args().skip(1).collect::<Vec<_>>();
    if args.is_empty() {
        eprintln!("Usage: rune-router <trace.jsonl> [--config <rune.toml>] [--dump-registry]");
        bail!("missing <trace.jsonl>");
    }
    let trace = PathBuf::from(args.remove(0));

    let mut config_path: Option<PathBuf> = None;
    let mut dump_registry = false;
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                if i + 1 >= args.len() {
                    bail!("--config expects a path");
                }
                config_path = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--dump-registry" => {
                dump_registry = true;
                i += 1;
            }
            other => bail!("unknown argument: {}", other),
        }
    }

    let config = match config_path {
        Some(path) => RuneConfig::load_path(&path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RuneConfig::load(),
    };
    log::info!("routing with tie-break {:?}", config.routing.tie_break);

    let text = fs::read_to_string(&trace)
        .with_context(|| format!("reading trace {}", trace.display()))?;

    let mut controller = FrameController::from_config(&config);
    let mut host = RecordingHost::new();

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let step: Step = serde_json::from_str(line)
            .with_context(|| format!("{}:{}: bad step", trace.display(), index + 1))?;
        let outcome = run_step(&mut controller, &mut host, step);

        for delivery in host.take_deliveries() {
            println!("{}", delivery_json(&delivery));
        }
        for diagnostic in host.notifications.drain(..) {
            log::warn!("line {}: {}", index + 1, diagnostic);
            println!("{}", json!({ "diagnostic": diagnostic }));
        }
        if let Some(value) = outcome {
            println!("{}", value);
        }
    }

    if dump_registry {
        println!("{}", serde_json::to_string_pretty(&controller.registry().snapshot())?);
    }
    Ok(())
}

fn run_step(controller: &mut FrameController, host: &mut RecordingHost, step: Step) -> Option<Value> {
    match step {
        Step::View { id, main_frame, mut frames } => {
            if !frames.contains(&main_frame) {
                frames.insert(0, main_frame);
            }
            host.add_view(id, main_frame, frames);
            None
        }
        Step::Destroy { frame } => {
            host.destroy_frame(frame);
            None
        }
        Step::Message { message } => controller.handle(host, message).map(|event| match event {
            ControllerEvent::Geometry { frame, placed } => json!({ "geometry": frame, "placed": placed }),
            ControllerEvent::Links(links) => json!({ "links": links }),
            ControllerEvent::Event(absolute) => json!({ "event": absolute }),
        }),
        Step::FollowStart { view, filter } => {
            let told = controller.start_follow_mode(host, view, filter);
            Some(json!({ "follow_started": view, "frames": told }))
        }
        Step::FollowStop => {
            let told = controller.stop_follow_mode(host);
            Some(json!({ "follow_stopped": told }))
        }
        Step::ResetLinks => {
            controller.reset_links();
            None
        }
        Step::Dispatch { view, event } => {
            let dispatched = controller.dispatch(host, view, event);
            Some(json!({ "dispatched": format!("{:?}", dispatched) }))
        }
        Step::Prune { view } => {
            let removed = controller.prune_view(host, view);
            Some(json!({ "pruned": removed }))
        }
        Step::CloseView { view } => {
            let removed = match host.view(view) {
                Some(handle) => {
                    host.remove_view(view);
                    controller.close_view(host, handle)
                }
                None => 0,
            };
            Some(json!({ "closed": view, "removed": removed }))
        }
    }
}

fn delivery_json(delivery: &Delivery) -> Value {
    match delivery {
        Delivery::Frame { frame, message } => json!({ "to": frame, "message": message }),
        Delivery::NativeKey { view, event } => json!({ "native_key": view, "event": event }),
    }
}
