//! Configuration knobs consumed by the core.
//!
//! Three construction paths: [`Config::default`] for library callers and
//! tests, [`Config::from_env`] for a `.env`/environment-driven deployment,
//! [`Config::from_file`] for a TOML config, and [`CliArgs`] for the demo
//! binary.

use serde::Deserialize;

/// Search sensitivity profile selected by the clustering driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Sensitivity {
    Default,
    Sensitive,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Top-K cap for the ranking list builder.
    pub global_ranking_targets: usize,
    /// Half-window width used by the overflow rescorer.
    pub ungapped_window: usize,
    /// Seeder profile selected by the clustering driver.
    pub sensitivity: Sensitivity,
    /// Minimum query coverage percentage (0-100) required in clustering.
    pub query_cover: u8,
    /// Minimum subject coverage percentage (0-100) required in clustering.
    pub subject_cover: u8,
    /// Post-filter: maximum e-value kept per record.
    pub max_evalue: f64,
    /// Post-filter: maximum alignments retained per query.
    pub max_alignments: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            global_ranking_targets: 25,
            ungapped_window: 32,
            sensitivity: Sensitivity::Default,
            query_cover: 80,
            subject_cover: 80,
            max_evalue: 0.001,
            max_alignments: 25,
        }
    }
}

impl Config {
    /// Load from process environment (optionally via a `.env` file), falling
    /// back to [`Config::default`] for any variable that is unset.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        let d = Config::default();
        Self {
            global_ranking_targets: env_or("GLOBAL_RANKING_TARGETS", d.global_ranking_targets),
            ungapped_window: env_or("UNGAPPED_WINDOW", d.ungapped_window),
            sensitivity: match std::env::var("SENSITIVITY").as_deref() {
                Ok("sensitive") | Ok("SENSITIVE") => Sensitivity::Sensitive,
                _ => d.sensitivity,
            },
            query_cover: env_or("QUERY_COVER", d.query_cover),
            subject_cover: env_or("SUBJECT_COVER", d.subject_cover),
            max_evalue: env_or("MAX_EVALUE", d.max_evalue),
            max_alignments: env_or("MAX_ALIGNMENTS", d.max_alignments),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load from a TOML file via the `config` crate. Missing keys fall back
    /// to [`Config::default`].
    pub fn from_file(path: &str) -> crate::error::Result<Self> {
        let d = Config::default();
        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name(path).format(::config::FileFormat::Toml).required(false))
            .build()
            .map_err(|e| crate::error::AlignError::MalformedRecord(e.to_string()))?;

        Ok(Self {
            global_ranking_targets: settings
                .get("global_ranking_targets")
                .unwrap_or(d.global_ranking_targets),
            ungapped_window: settings.get("ungapped_window").unwrap_or(d.ungapped_window),
            sensitivity: d.sensitivity,
            query_cover: settings.get("query_cover").unwrap_or(d.query_cover),
            subject_cover: settings.get("subject_cover").unwrap_or(d.subject_cover),
            max_evalue: settings.get("max_evalue").unwrap_or(d.max_evalue),
            max_alignments: settings.get("max_alignments").unwrap_or(d.max_alignments),
        })
    }
}

/// CLI surface for the demo binary.
#[derive(Debug, clap::Parser)]
#[command(name = "seq-align-core-demo", about = "Run the aligner core pipeline on synthetic data")]
pub struct CliArgs {
    #[arg(long, default_value_t = 25)]
    pub global_ranking_targets: usize,

    #[arg(long, default_value_t = 32)]
    pub ungapped_window: usize,

    #[arg(long, default_value_t = 80)]
    pub query_cover: u8,

    #[arg(long, default_value_t = 80)]
    pub subject_cover: u8,
}

impl From<CliArgs> for Config {
    fn from(a: CliArgs) -> Self {
        Self {
            global_ranking_targets: a.global_ranking_targets,
            ungapped_window: a.ungapped_window,
            query_cover: a.query_cover,
            subject_cover: a.subject_cover,
            ..Config::default()
        }
    }
}
