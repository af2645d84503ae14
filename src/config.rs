use crate::{algorithm::AlignmentParameters, corpus::LevelComparison, error::InputError};
use clap::{Args, ValueEnum};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Tab separated files with 1-based coordinates.
    Tsv,
    /// The whole alignment as JSON, also 1-based.
    Json,
}

macro_rules! config_structs {
    {
        $(
            $( #[doc = $doc:literal] )*
            $( #[config_opt($attr:meta)] )*
            pub $name:ident: $typ:ty,
        )*
        $(
            #[config_alias($atarget:ident = $avalue:expr)]
            $( #[doc = $adoc:literal] )*
            $( #[config_opt($aattr:meta)] )*
            pub $aname:ident: bool,
        )*
    } => {
        #[derive(Clone, Debug, PartialEq)]
        pub struct Config {
            $( pub $name: $typ, )*
        }

        #[derive(Args, Deserialize, Default)]
        #[serde(deny_unknown_fields)]
        pub struct ConfigOpt {
            $( $( #[doc = $adoc] )* $( #[$aattr] )* #[serde(skip)] pub $aname: bool, )*
            $( $( #[doc = $doc] )* $( #[$attr] )* pub $name: Option<$typ>, )*
        }

        impl Config {
            pub fn update(self, mut opt: ConfigOpt) -> Config {
                $(
                    if opt.$aname {
                        opt.$atarget = Some($avalue);
                    }
                )*
                Config {
                    $( $name: opt.$name.unwrap_or(self.$name), )*
                }
            }
        }
    }
}

config_structs! {
    /// Paragraphs align when their similarity exceeds this.
    #[config_opt(arg(long, value_name = "NUM"))]
    pub paragraph_threshold: f64,

    /// Sentences align when their similarity exceeds this.
    #[config_opt(arg(long, value_name = "NUM"))]
    pub sentence_threshold: f64,

    /// How far the similarity may drop while a one-to-many run grows.
    #[config_opt(arg(long, value_name = "NUM"))]
    pub extension_slack: f64,

    /// Penalize short sentences whose terms are scattered over a long one.
    #[config_opt(arg(
        long,
        require_equals = true,
        num_args = 0..=1,
        default_missing_value = "true",
        value_name = "BOOL",
        group = "concentration_group"
    ))]
    pub concentration: bool,

    #[config_opt(arg(long, value_name = "NUM"))]
    pub concentration_modifier: f64,

    #[config_opt(arg(long, value_name = "NUM"))]
    pub max_vocabulary: usize,

    /// Alignment passes when comparing explicitly given files.
    #[config_opt(arg(long, value_name = "NUM"))]
    pub passes: usize,

    /// Level pairs compared in corpus mode.
    #[config_opt(arg(long, value_name = "LO:HI[:PASSES]", value_delimiter = ',', num_args = 1..))]
    pub levels: Vec<LevelComparison>,

    #[config_opt(arg(long))]
    pub format: OutputFormat,

    #[config_opt(arg(skip))]
    pub paragraph_vicinities: Vec<Vec<[usize; 2]>>,

    #[config_opt(arg(skip))]
    pub sentence_vicinities: Vec<Vec<[usize; 2]>>,

    #[config_alias(concentration = false)]
    #[config_opt(arg(long, group = "concentration_group"))]
    pub no_concentration: bool,
}

impl Default for Config {
    fn default() -> Config {
        let parameters = AlignmentParameters::default();
        Config {
            paragraph_threshold: parameters.paragraph_threshold,
            sentence_threshold: parameters.sentence_threshold,
            extension_slack: parameters.extension_slack,
            concentration: parameters.concentration_modifier.is_some(),
            concentration_modifier: parameters.concentration_modifier.unwrap_or(2.0),
            max_vocabulary: parameters.max_vocabulary,
            passes: 1,
            levels: LevelComparison::default_list(),
            format: OutputFormat::Tsv,
            paragraph_vicinities: parameters.paragraph_vicinities,
            sentence_vicinities: parameters.sentence_vicinities,
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("vdalign").join("config.toml"))
}

impl ConfigOpt {
    pub fn from_file(path: &Path) -> Result<ConfigOpt, InputError> {
        let text = std::fs::read_to_string(path).map_err(|source| InputError::Io {
            path: path.to_owned(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| InputError::Config {
            path: path.to_owned(),
            source,
        })
    }
}

impl Config {
    /// Defaults overlaid with the configuration file. An explicitly given path
    /// has to exist; the default location is used only when present.
    pub fn load(path: Option<&Path>) -> Result<Config, InputError> {
        let opt = match path {
            Some(path) => ConfigOpt::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.is_file() => {
                    tracing::debug!(path = %path.display(), "reading configuration");
                    ConfigOpt::from_file(&path)?
                }
                _ => ConfigOpt::default(),
            },
        };
        Ok(Config::default().update(opt))
    }

    pub fn parameters(&self) -> AlignmentParameters {
        AlignmentParameters {
            paragraph_threshold: self.paragraph_threshold,
            sentence_threshold: self.sentence_threshold,
            extension_slack: self.extension_slack,
            concentration_modifier: self.concentration.then_some(self.concentration_modifier),
            max_vocabulary: self.max_vocabulary,
            paragraph_vicinities: self.paragraph_vicinities.clone(),
            sentence_vicinities: self.sentence_vicinities.clone(),
        }
    }
}
