//! Parsing Options.
//! `--input {file}` 读取网, `--output {file}` 写出展开结果, 其余参数覆盖配置文件.

use anyhow::{Result, anyhow};
use clap::{Arg, ArgAction, Command, value_parser};
use std::path::PathBuf;

use crate::config::UnfoldConfig;
use crate::net::io::Format;
use crate::unfold::SeedPolicy;

fn make_options_parser() -> clap::Command {
    let parser = Command::new("pn-unfold")
        .no_binary_name(true)
        .version(env!("CARGO_PKG_VERSION"))
        .about("Unfold a Petri net given as an incidence matrix")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FILE")
                .help("Net document with `matrix` and `initialMarking`")
                .default_value("input_matrix.json"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Path to file where the unfolded net will be stored")
                .default_value("output_matrix.json"), // 默认的文件路径
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .default_value("unfold.toml"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .help("Output document format")
                .default_value("json")
                .value_parser(["json", "ron"]),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .help("Rows and columns the output starts from")
                .value_parser(["input", "reachable"]),
        )
        .arg(
            Arg::new("step-limit")
                .long("step-limit")
                .value_name("N")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("dot")
                .long("dot")
                .value_name("FILE")
                .help("Write the unfolded net as Graphviz"),
        )
        .arg(
            Arg::new("state-graph")
                .long("state-graph")
                .value_name("FILE")
                .help("Record the explored markings and write them as Graphviz"),
        )
        .arg(
            Arg::new("report")
                .long("report")
                .value_name("FILE")
                .help("Write a JSON summary of the run"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .help("Do not print the matrices to stdout"),
        );
    parser
}

#[derive(Debug, Clone)]
pub struct Options {
    pub input: PathBuf,
    pub output: PathBuf,
    pub config: PathBuf,
    pub format: Format,
    pub seed: Option<SeedPolicy>,
    pub step_limit: Option<usize>,
    pub dot: Option<PathBuf>,
    pub state_graph: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub quiet: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            input: PathBuf::from("input_matrix.json"),
            output: PathBuf::from("output_matrix.json"),
            config: PathBuf::from("unfold.toml"),
            format: Format::Json,
            seed: None,
            step_limit: None,
            dot: None,
            state_graph: None,
            report: None,
            quiet: false,
        }
    }
}

impl Options {
    pub fn parse_from_str(s: &str) -> Result<Self> {
        let flags = shellwords::split(s)?;
        Self::parse_from_args(&flags)
    }

    pub fn parse_from_args(flags: &[String]) -> Result<Self> {
        let app = make_options_parser();
        let matches = app.try_get_matches_from(flags.iter())?;

        let path = |id: &str| matches.get_one::<String>(id).map(PathBuf::from);
        let required = |id: &str| path(id).ok_or_else(|| anyhow!("missing value for --{}", id));

        let format = match matches.get_one::<String>("format").map(String::as_str) {
            Some("ron") => Format::Ron,
            Some("json") | None => Format::Json,
            Some(other) => return Err(anyhow!("unsupported format: {}", other)),
        };
        let seed = match matches.get_one::<String>("seed").map(String::as_str) {
            Some("input") => Some(SeedPolicy::Input),
            Some("reachable") => Some(SeedPolicy::Reachable),
            None => None,
            Some(other) => return Err(anyhow!("unsupported seed policy: {}", other)),
        };

        Ok(Options {
            input: required("input")?,
            output: required("output")?,
            config: required("config")?,
            format,
            seed,
            step_limit: matches.get_one::<usize>("step-limit").copied(),
            dot: path("dot"),
            state_graph: path("state-graph"),
            report: path("report"),
            quiet: matches.get_flag("quiet"),
        })
    }

    /// Command-line values take precedence over the config file.
    pub fn apply_to(&self, config: &mut UnfoldConfig) {
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.step_limit.is_some() {
            config.step_limit = self.step_limit;
        }
        if self.state_graph.is_some() {
            config.record_graph = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::parse_from_str("").unwrap();
        assert_eq!(options.input, PathBuf::from("input_matrix.json"));
        assert_eq!(options.output, PathBuf::from("output_matrix.json"));
        assert_eq!(options.format, Format::Json);
        assert!(options.seed.is_none());
        assert!(!options.quiet);
    }

    #[test]
    fn test_parse_from_str() {
        let options = Options::parse_from_str(
            "-i 'nets/my net.ron' -o out.ron -f ron --seed reachable --step-limit 40 --state-graph g.dot",
        )
        .unwrap();
        assert_eq!(options.input, PathBuf::from("nets/my net.ron"));
        assert_eq!(options.format, Format::Ron);
        assert_eq!(options.seed, Some(SeedPolicy::Reachable));
        assert_eq!(options.step_limit, Some(40));

        let mut config = UnfoldConfig::default();
        options.apply_to(&mut config);
        assert_eq!(config.seed, SeedPolicy::Reachable);
        assert_eq!(config.step_limit, Some(40));
        assert!(config.record_graph);
    }

    #[test]
    fn test_config_kept_without_flags() {
        let options = Options::parse_from_str("-q").unwrap();
        let mut config = UnfoldConfig {
            step_limit: Some(7),
            ..UnfoldConfig::default()
        };
        options.apply_to(&mut config);
        assert_eq!(config.step_limit, Some(7));
        assert!(!config.record_graph);
        assert!(options.quiet);
    }

    #[test]
    fn test_parse_from_str_err() {
        let options = Options::parse_from_str("-f yaml --seed everything");
        assert!(options.is_err());
    }

    #[test]
    fn test_parse_from_args_err() {
        let options = Options::parse_from_args(&[
            "--step-limit".to_owned(),
            "many".to_owned(),
        ]);
        assert!(options.is_err());
    }
}
