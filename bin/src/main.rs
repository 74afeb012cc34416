#[macro_use]
extern crate log;

mod scenes;

use clap::Parser;
use integrators::*;
use scenes::*;
use std::sync::Arc;
use volpath_core::app::*;
use volpath_core::error::*;
use volpath_core::integrator::Integrator;

fn main() {
    // Initialize `env_logger`.
    env_logger::init();

    let options = Options::parse();
    if let Err(err) = run(&options) {
        error!("{}", err);
        std::process::exit(1);
    }
}

/// Builds the requested scene and renders it.
fn run(options: &Options) -> Result<(), String> {
    let reporter = Arc::new(ErrorReporter::new(options.quiet));

    let desc = build_scene(options, Arc::clone(&reporter))?;
    let mut integrator = create_volpath_integrator(
        &desc.integrator_params,
        desc.sampler,
        desc.camera,
        Arc::clone(&reporter),
    );

    integrator.preprocess(&desc.scene);
    integrator.render(&desc.scene, options)?;

    if options.stats {
        volpath_core::print_stats!();
    }
    Ok(())
}
