//! CLI binary for vocabulary graphs: flatten, tree, path, and canonicalization queries.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use vocab_core::config::VocabConfig;
use vocab_core::graph::{CodeField, Node, VocabGraph};
use vocab_core::hierarchy::Hierarchy;
use vocab_core::storage;
use vocab_core::store::CodeLookup;
use vocab_nav::format::{format_path, format_tree};
use vocab_nav::walk::TraversalPath;
use vocab_nav::{Limits, Navigator};

#[derive(Parser)]
#[command(name = "vocab", about = "Controlled-vocabulary graph queries")]
struct Cli {
    /// Project root directory holding .vocab/ (defaults to current directory)
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    /// Output format: json, text
    #[arg(short, long, global = true, default_value = "json")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

/// Hierarchy selection shared by every query command.
#[derive(Args, Debug, Clone)]
struct Scope {
    /// Root handle of the hierarchy
    #[arg(short, long)]
    root: String,

    /// Functional relationship type
    #[arg(long, default_value = "_predicate_enum-of")]
    predicate: String,

    /// Structural relationship types (repeatable; defaults to config)
    #[arg(long)]
    structural: Vec<String>,

    /// Ignore structural relationship types altogether
    #[arg(long, conflicts_with = "structural")]
    no_structural: bool,

    /// Relationships point parent → child instead of child → parent
    #[arg(long)]
    descending: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show store statistics
    Info,

    /// Validate store integrity (dangling endpoints, rootless edges, etc.)
    Validate,

    /// List every member of a hierarchy
    Flatten {
        #[command(flatten)]
        scope: Scope,

        /// What to emit: handles, edges, nodes
        #[arg(short, long, default_value = "handles")]
        output: String,
    },

    /// Show the parent → children tree of a hierarchy
    Tree {
        #[command(flatten)]
        scope: Scope,

        /// Levels to expand (defaults to the flatten ceiling)
        #[arg(long)]
        levels: Option<usize>,
    },

    /// Enumerate paths from an origin to a target term
    Path {
        #[command(flatten)]
        scope: Scope,

        /// Handle the paths start from
        origin: String,

        /// Handle the paths end at
        target: String,

        /// Maximum path length in edges
        #[arg(long)]
        max_level: Option<usize>,
    },

    /// Enumerate paths from an origin to terms carrying a code
    PathCode {
        #[command(flatten)]
        scope: Scope,

        /// Handle the paths start from
        origin: String,

        /// Code value (a shell glob with --glob)
        code: String,

        /// Code field: lid, gid, aid, pid, nid
        #[arg(long, default_value = "lid")]
        field: String,

        /// Treat the code as a glob pattern
        #[arg(long)]
        glob: bool,

        /// Maximum path length in edges
        #[arg(long)]
        max_level: Option<usize>,
    },

    /// Resolve a term to its preferred term
    Resolve {
        #[command(flatten)]
        scope: Scope,

        /// Term handle
        handle: String,
    },

    /// Resolve a code to its preferred terms
    ResolveCode {
        #[command(flatten)]
        scope: Scope,

        /// Code value
        code: String,

        /// Code field: lid, gid, aid, pid, nid
        #[arg(long, default_value = "gid")]
        field: String,

        /// Show every candidate and what it resolved to
        #[arg(long)]
        candidates: bool,
    },

    /// Resolve many codes at once
    ResolveMany {
        #[command(flatten)]
        scope: Scope,

        /// Code values
        #[arg(required = true)]
        codes: Vec<String>,

        /// Code field: lid, gid, aid, pid, nid
        #[arg(long, default_value = "gid")]
        field: String,
    },

    /// Report which handles are members of a hierarchy
    CheckMembership {
        #[command(flatten)]
        scope: Scope,

        /// Term handles
        #[arg(required = true)]
        handles: Vec<String>,
    },

    /// Report which terms carrying each code are members of a hierarchy
    CheckCodes {
        #[command(flatten)]
        scope: Scope,

        /// Code values
        #[arg(required = true)]
        codes: Vec<String>,

        /// Code field: lid, gid, aid, pid, nid
        #[arg(long, default_value = "gid")]
        field: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Text,
}

impl Format {
    fn parse(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            other => anyhow::bail!("unknown output format '{}' (expected json or text)", other),
        }
    }
}

impl Scope {
    fn hierarchy(&self, config: &VocabConfig) -> Result<Hierarchy> {
        let ascending = !self.descending;
        let hierarchy = if !self.structural.is_empty() {
            Hierarchy::parse(&self.root, ascending, &self.predicate, Some(self.structural.as_slice()))?
        } else {
            let structural = if self.no_structural {
                Vec::new()
            } else {
                config.resolution.structural.clone()
            };
            Hierarchy::parse(&self.root, ascending, &self.predicate, None)?
                .with_structural(structural)?
        };
        Ok(hierarchy)
    }
}

fn get_project_root(cli: &Cli) -> Result<PathBuf> {
    match &cli.project {
        Some(p) => Ok(p.clone()),
        None => std::env::current_dir().context("failed to get current directory"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let project_root = get_project_root(&cli)?;
    let format = Format::parse(&cli.format)?;

    let session = Session::load(&project_root, format)?;
    session.run(cli.command)
}

/// Store, config, and output format for one invocation.
struct Session {
    graph: VocabGraph,
    config: VocabConfig,
    format: Format,
}

impl Session {
    fn load(project_root: &Path, format: Format) -> Result<Self> {
        let graph = load_store(project_root)?;
        let config = VocabConfig::load(project_root).with_context(|| {
            format!("failed to load config from {}", storage::vocab_dir(project_root).display())
        })?;
        tracing::debug!(
            nodes = graph.nodes.len(),
            max_level = config.traversal.max_level,
            parallel = config.resolution.parallel_batches,
            "session ready"
        );
        Ok(Self {
            graph,
            config,
            format,
        })
    }

    fn run(&self, command: Commands) -> Result<()> {
        let nav = Navigator::with_limits(&self.graph, Limits::from(&self.config));
        match command {
            Commands::Info => cmd_info(&self.graph, self.format),
            Commands::Validate => cmd_validate(&self.graph),
            Commands::Flatten { scope, output } => {
                let h = scope.hierarchy(&self.config)?;
                match output.as_str() {
                    "handles" => {
                        let handles = nav.flatten(&h)?;
                        self.emit(&handles, || lines(handles.iter()))
                    }
                    "edges" => {
                        let edges = nav.flatten_edges(&h)?;
                        self.emit(&edges, || {
                            lines(edges.iter().map(|e| format!("{} -[{}]-> {}", e.from, e.predicate, e.to)))
                        })
                    }
                    "nodes" => {
                        let nodes = nav.flatten_nodes(&h)?;
                        self.emit(&nodes, || lines(nodes.iter().map(node_line)))
                    }
                    other => anyhow::bail!(
                        "unknown flatten output '{}' (expected handles, edges, or nodes)",
                        other
                    ),
                }
            }
            Commands::Tree { scope, levels } => {
                let h = scope.hierarchy(&self.config)?;
                let tree = nav.build_tree(&h, levels)?;
                self.emit(&tree, || format_tree(&tree, &h.root))
            }
            Commands::Path {
                scope,
                origin,
                target,
                max_level,
            } => {
                let h = scope.hierarchy(&self.config)?;
                let paths = nav.path_to_target(&h, &origin, &target, max_level)?;
                self.emit_paths(&paths)
            }
            Commands::PathCode {
                scope,
                origin,
                code,
                field,
                glob,
                max_level,
            } => {
                let h = scope.hierarchy(&self.config)?;
                let field: CodeField = field.parse()?;
                let lookup = if glob {
                    CodeLookup::pattern(&code)?
                } else {
                    CodeLookup::exact(code)
                };
                let paths = nav.path_to_code(&h, &origin, &lookup, field, max_level)?;
                self.emit_paths(&paths)
            }
            Commands::Resolve { scope, handle } => {
                let h = scope.hierarchy(&self.config)?;
                let node = nav.resolve_by_handle(&h, &handle)?;
                self.emit(&node, || match &node {
                    Some(n) => format!("{}\n", node_line(n)),
                    None => format!("{}: no preferred term under {}\n", handle, h.root),
                })
            }
            Commands::ResolveCode {
                scope,
                code,
                field,
                candidates,
            } => {
                let h = scope.hierarchy(&self.config)?;
                let field: CodeField = field.parse()?;
                if candidates {
                    let resolved = nav.resolve_candidates_by_code(&h, &code, field)?;
                    self.emit(&resolved, || {
                        lines(resolved.iter().map(|(candidate, node)| {
                            format!("{} => {}", candidate, node.handle)
                        }))
                    })
                } else {
                    let nodes = nav.resolve_by_code(&h, &code, field)?;
                    self.emit(&nodes, || lines(nodes.iter().map(node_line)))
                }
            }
            Commands::ResolveMany {
                scope,
                codes,
                field,
            } => {
                let h = scope.hierarchy(&self.config)?;
                let field: CodeField = field.parse()?;
                let resolved = nav.resolve_many_by_code(&h, field, &codes)?;
                self.emit(&resolved, || {
                    lines(resolved.iter().map(|(code, nodes)| {
                        let handles: Vec<&str> = nodes.iter().map(|n| n.handle.as_str()).collect();
                        format!("{}\t{}", code, or_dash(&handles.join(",")))
                    }))
                })
            }
            Commands::CheckMembership { scope, handles } => {
                let h = scope.hierarchy(&self.config)?;
                let membership = nav.check_membership(&h, &handles)?;
                self.emit(&membership, || {
                    lines(membership.iter().map(|(handle, parent)| {
                        format!("{}\t{}", handle, parent.as_deref().unwrap_or("-"))
                    }))
                })
            }
            Commands::CheckCodes {
                scope,
                codes,
                field,
            } => {
                let h = scope.hierarchy(&self.config)?;
                let field: CodeField = field.parse()?;
                let members = nav.check_codes(&h, field, &codes)?;
                self.emit(&members, || {
                    lines(
                        members
                            .iter()
                            .map(|(code, handles)| format!("{}\t{}", code, or_dash(&handles.join(",")))),
                    )
                })
            }
        }
    }

    fn emit_paths(&self, paths: &[TraversalPath]) -> Result<()> {
        self.emit(&paths, || lines(paths.iter().map(format_path)))
    }

    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        match self.format {
            Format::Json => println!("{}", serde_json::to_string_pretty(value)?),
            Format::Text => print!("{}", text()),
        }
        Ok(())
    }
}

fn lines<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: std::fmt::Display,
{
    let mut output = String::new();
    for item in items {
        output.push_str(&format!("{}\n", item));
    }
    output
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() { "-" } else { s }
}

fn node_line(node: &Node) -> String {
    match &node.label {
        Some(label) => format!("{}\t{}\t{}", node.handle, node.code.gid, label),
        None => format!("{}\t{}", node.handle, node.code.gid),
    }
}

fn load_store(project_root: &Path) -> Result<VocabGraph> {
    if !storage::exists(project_root) {
        anyhow::bail!(
            "No vocabulary store found at {}",
            storage::vocab_file(project_root).display()
        );
    }
    storage::load(project_root)
}

fn cmd_info(graph: &VocabGraph, format: Format) -> Result<()> {
    if format == Format::Json {
        #[derive(Serialize)]
        struct Info<'a> {
            version: &'a str,
            created_at: String,
            updated_at: String,
            metadata: &'a vocab_core::graph::GraphMetadata,
            roots: Vec<&'a str>,
        }
        let info = Info {
            version: &graph.version,
            created_at: graph.created_at.to_rfc3339(),
            updated_at: graph.updated_at.to_rfc3339(),
            metadata: &graph.metadata,
            roots: graph.roots().into_iter().collect(),
        };
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Vocabulary store v{}", graph.version);
    println!("Created: {}", graph.created_at);
    println!("Updated: {}", graph.updated_at);
    println!();
    println!("Nodes: {}", graph.metadata.total_nodes);
    println!("Functional edges: {}", graph.metadata.functional_edges);
    println!("Structural edges: {}", graph.metadata.structural_edges);
    println!("Total edges: {}", graph.metadata.total_edges);
    let roots = graph.roots();
    if !roots.is_empty() {
        println!("\nRoots ({}):", roots.len());
        for root in roots {
            let label = graph
                .get_node(root)
                .and_then(|n| n.label.as_deref())
                .unwrap_or("");
            println!("  {} {}", root, label);
        }
    }
    Ok(())
}

fn cmd_validate(graph: &VocabGraph) -> Result<()> {
    let problems = graph.validate();
    for problem in &problems {
        println!("WARN: {}", problem);
    }
    if problems.is_empty() {
        println!(
            "OK: {} nodes, {} edges, {} roots",
            graph.nodes.len(),
            graph.edges.len(),
            graph.roots().len()
        );
        Ok(())
    } else {
        anyhow::bail!("{} integrity problem(s) found", problems.len())
    }
}
