//! graphwire CLI: resolve objects from configuration graphs.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::Result;

use graphwire::factory::FactoryHandle;
use graphwire::loader::read_with_imports;
use graphwire::paths::ConfigPaths;
use graphwire::{
    ConfigurationLoader, Credentials, Graph, Instance, LoaderConfig, Permission,
    Proxy, Resolver, TripleStore, UserGroup, vocab,
};

#[derive(Parser)]
#[command(name = "graphwire", version, about = "Build objects from configuration graphs")]
struct Cli {
    /// Loader config (TOML). Defaults to `$XDG_CONFIG_HOME/graphwire/loader.toml` if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one node of a graph and describe the object it produces.
    Resolve {
        /// Path to a JSON graph document. Its `cfg:imports` are followed.
        #[arg(long)]
        graph: PathBuf,

        /// Node to resolve: an IRI, or `_:label` for a blank node.
        #[arg(long)]
        node: String,

        /// Extra app-setting, `KEY=VALUE`. May be repeated.
        #[arg(long = "set", value_parser = parse_setting)]
        settings: Vec<(String, String)>,
    },

    /// List the subjects of a graph with their declared and default types.
    Inspect {
        /// Path to a JSON graph document.
        #[arg(long)]
        graph: PathBuf,
    },

    /// Write a default loader config.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

fn parse_setting(s: &str) -> std::result::Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got \"{s}\""))
}

fn load_config(explicit: Option<PathBuf>) -> Result<LoaderConfig> {
    if let Some(path) = explicit {
        return Ok(LoaderConfig::load(&path)?);
    }
    let default = ConfigPaths::resolve()?.loader_config();
    if default.exists() {
        tracing::debug!(path = %default.display(), "using default loader config");
        Ok(LoaderConfig::load(&default)?)
    } else {
        Ok(LoaderConfig::default())
    }
}

fn describe(instance: &Instance) -> String {
    if let Some(g) = instance.downcast_ref::<Graph>() {
        let base = g
            .base_iri()
            .map(|b| format!(" <{}>", b.as_str()))
            .unwrap_or_default();
        format!("graph{base} with {} triples", g.len())
    } else if let Some(s) = instance.downcast_ref::<TripleStore>() {
        format!(
            "triple store with {} graphs, {} triples",
            s.len(),
            s.triple_count()
        )
    } else if let Some(c) = instance.downcast_ref::<Credentials>() {
        format!("credentials for user \"{}\"", c.user)
    } else if let Some(p) = instance.downcast_ref::<Proxy>() {
        match &p.credentials {
            Some(c) => format!("proxy {} (as \"{}\")", p.server, c.user),
            None => format!("proxy {}", p.server),
        }
    } else if let Some(g) = instance.downcast_ref::<UserGroup>() {
        format!("user group with {} members", g.members().len())
    } else if let Some(p) = instance.downcast_ref::<Permission>() {
        format!("permission for {}", p.actions().join(", "))
    } else if let Some(h) = instance.downcast_ref::<FactoryHandle>() {
        format!("factory {}", h.descriptor())
    } else {
        "object of an application-defined type".into()
    }
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve {
            graph,
            node,
            settings,
        } => {
            let mut config = load_config(cli.config)?;
            config.app_settings.extend(settings);
            let resolver = config.build_resolver();
            let mut loader =
                ConfigurationLoader::from_file(&graph, resolver, config.auto_configure)?;
            let instance = loader.load_identifier(&node)?;
            println!("{node}: {}", describe(&instance));
        }

        Commands::Inspect { graph } => {
            let config = load_config(cli.config)?;
            let resolver: Resolver = config.build_resolver();
            let graph = read_with_imports(&graph, &resolver)?;
            let values = resolver.values(&graph);
            println!("{} triples, {} subjects", graph.len(), graph.subjects().len());
            for subject in graph.subjects() {
                let declared = values.string(subject, vocab::PROP_TYPE);
                let default = resolver.default_type(&graph, subject);
                let classes: Vec<String> = graph
                    .objects_for(subject, vocab::RDF_TYPE)
                    .filter_map(|c| c.as_iri())
                    .map(vocab::qname)
                    .collect();
                println!(
                    "  {subject}  classes=[{}]  type={}  default={}",
                    classes.join(", "),
                    declared.as_deref().unwrap_or("-"),
                    default.as_ref().map(|d| d.name()).unwrap_or("-"),
                );
            }
        }

        Commands::InitConfig { force } => {
            let path = match cli.config {
                Some(p) => p,
                None => ConfigPaths::resolve()?.loader_config(),
            };
            if path.exists() && !force {
                return Err(miette::miette!(
                    help = "Pass --force to overwrite it.",
                    "{} already exists",
                    path.display()
                ));
            }
            LoaderConfig::default().save(&path)?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_parse_as_key_value() {
        assert_eq!(
            parse_setting("X=4=2").unwrap(),
            ("X".to_string(), "4=2".to_string())
        );
        assert!(parse_setting("novalue").is_err());
    }

    #[test]
    fn describe_known_objects() {
        let graph: Instance = std::sync::Arc::new(Graph::new());
        assert_eq!(describe(&graph), "graph with 0 triples");
        let other: Instance = std::sync::Arc::new(5u8);
        assert!(describe(&other).contains("application-defined"));
    }
}
