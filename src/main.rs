// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::time::Instant;

use anyhow::{bail, Context};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use pipeflow::config::{load_and_validate_config, OperationRegistry, RuntimeBuilder};
use pipeflow::engine::RequestData;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        bail!(
            "usage: {} <config.yaml> <payload>\nexample: {} pipelines/extract.yaml '{{\"user\":{{\"name\":\"ada\"}}}}'",
            args[0],
            args[0]
        );
    }
    let (config_file, payload) = (&args[1], &args[2]);

    let start_time = Instant::now();
    let config = load_and_validate_config(config_file)
        .with_context(|| format!("loading {}", config_file))?;
    let runtime = RuntimeBuilder::from_config(&config, &OperationRegistry::with_builtins())
        .await
        .context("building graph")?;

    let mut events = runtime.sink.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => println!("{} {}", event.channel(), event.payload()),
                Err(RecvError::Lagged(skipped)) => eprintln!("skipped {} notifications", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let request = RequestData::new(payload.as_str());
    let wave = runtime.wave();
    for root in runtime.graph.roots() {
        wave.trigger(root.id(), request.clone())?;
    }
    wave.wait().await;

    // closing the last sender ends the printer
    drop(wave);
    drop(runtime);
    printer.await.context("notification printer")?;

    println!("run {} finished in {:?}", request.id, start_time.elapsed());
    Ok(())
}
