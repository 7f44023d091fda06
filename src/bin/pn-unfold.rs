use anyhow::{Context, Result};
use std::fs;
use std::time::Instant;

use pn_unfold::config::UnfoldConfig;
use pn_unfold::net::io::{self, NetDocument};
use pn_unfold::options::Options;
use pn_unfold::report::UnfoldReport;
use pn_unfold::unfold::Unfolder;

fn main() -> Result<()> {
    if std::env::var("PN_LOG").is_ok() {
        let e = env_logger::Env::new()
            .filter("PN_LOG")
            .write_style("PN_LOG_STYLE");
        env_logger::init_from_env(e);
    }

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    if let Ok(flags) = std::env::var("PN_FLAGS") {
        let extra = shellwords::split(&flags).context("Failed to split PN_FLAGS")?;
        args.extend(extra);
    }
    let options = Options::parse_from_args(&args)?;
    log::debug!("PN options: {:?}", options);

    let mut config = UnfoldConfig::load_from_file(&options.config)?;
    options.apply_to(&mut config);
    log::debug!("engine config: {:?}", config);

    let document: NetDocument = io::read_document(&options.input)
        .with_context(|| format!("Failed to read net from {:?}", options.input))?;
    let net = document
        .into_net()
        .with_context(|| format!("Malformed net in {:?}", options.input))?;

    if !options.quiet {
        println!("Input matrix:");
        print!("{}", net.render_matrix());
        println!(
            "Initial marking: {}",
            itertools::join(net.initial_marking().0.iter(), " ")
        );
    }

    let start = Instant::now();
    let unfolding = Unfolder::new(&net, config).run()?;
    let elapsed = start.elapsed();

    io::write_document(&options.output, &unfolding.to_document(), options.format)
        .with_context(|| format!("Failed to write unfolding to {:?}", options.output))?;
    log::info!("unfolding written to {:?}", options.output);

    if !options.quiet {
        println!("Unfolded matrix:");
        print!("{}", unfolding.render_matrix());
    }

    if let Some(path) = &options.dot {
        unfolding
            .write_dot(path)
            .with_context(|| format!("Failed to write dot file {:?}", path))?;
    }

    if let Some(path) = &options.state_graph {
        match &unfolding.graph {
            Some(graph) => graph
                .write_dot(path)
                .with_context(|| format!("Failed to write state graph {:?}", path))?,
            None => log::warn!("exploration graph was not recorded"),
        }
    }

    if let Some(path) = &options.report {
        let report = UnfoldReport::new(&net, &unfolding, elapsed);
        log::info!("{}", report);
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json).with_context(|| format!("Failed to write report {:?}", path))?;
    }

    Ok(())
}
