//! Armature CLI - Command-line interface for procedural rig assembly

use anyhow::{Context, Result};
use armature_core::guide::GuideTree;
use armature_core::registry::{ModuleKind, ModuleRegistry};
use armature_core::resolver::GuideTreeResolver;
use armature_engine::RigBuilder;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "armature")]
#[command(about = "Procedural rig assembly for articulated characters", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a rig from a guide dump and print its outputs
    Build {
        /// Guide dump file (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Rig name, used as the prefix of every generated node
        #[arg(short, long, default_value = "rig")]
        name: String,

        /// Print each deformer joint instead of only the counts
        #[arg(long)]
        joints: bool,

        /// Emit the rig outputs as JSON instead of the text summary
        #[arg(long)]
        json: bool,
    },

    /// Resolve a guide dump into limb records without building
    Inspect {
        /// Guide dump file (JSON)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// List the registered module types and their role signatures
    Modules,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            input,
            name,
            joints,
            json,
        } => run_build(&input, &name, joints, json)?,
        Commands::Inspect { input } => run_inspect(&input)?,
        Commands::Modules => run_modules(),
    }

    Ok(())
}

fn load_tree(input: &PathBuf) -> Result<GuideTree> {
    let json = std::fs::read_to_string(input)
        .with_context(|| format!("reading guide dump {}", input.display()))?;
    Ok(GuideTree::from_json(&json)?)
}

fn run_build(input: &PathBuf, name: &str, print_joints: bool, as_json: bool) -> Result<()> {
    let tree = load_tree(input)?;
    tracing::info!(guides = tree.len(), rig = name, "building rig");

    let rig = RigBuilder::new(name).build(&tree)?;

    if as_json {
        let modules: Vec<_> = rig
            .modules()
            .iter()
            .map(|module| {
                serde_json::json!({
                    "name": module.name,
                    "kind": module.kind.name(),
                    "joints": module.joints.len(),
                    "controls": module.controls.len(),
                })
            })
            .collect();
        let report = serde_json::json!({
            "rig": name,
            "modules": modules,
            "deformer_joints": rig.deformer_joints(),
            "sockets": rig.sockets().len(),
            "anchors": rig.anchors().len(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Building rig '{name}' from {} guides...", tree.len());
    println!("Modules ({}):", rig.modules().len());
    for module in rig.modules() {
        let attached = match module.attachment {
            Some(a) => format!("-> {}", rig.sockets().get(a.socket).name),
            None => "(rig root)".to_string(),
        };
        println!(
            "  {:<16} {:>2} joints, {:>2} controls  {attached}",
            module.name,
            module.joints.len(),
            module.controls.len(),
        );
    }

    println!(
        "Outputs: {} deformer joints, {} sockets, {} anchors",
        rig.deformer_joints().len(),
        rig.sockets().len(),
        rig.anchors().len(),
    );
    if print_joints {
        for joint in rig.deformer_joints() {
            println!("  {joint}");
        }
    }
    Ok(())
}

fn run_inspect(input: &PathBuf) -> Result<()> {
    let tree = load_tree(input)?;
    let registry = ModuleRegistry::new();
    let resolver = GuideTreeResolver::new(&registry);

    for &root in tree.roots() {
        let records = resolver.resolve(&tree, root)?;
        println!(
            "Root guide '{}': {} records",
            tree.node(root).name,
            records.len()
        );
        for record in &records {
            let parent = record
                .parent_guide
                .map_or("-".to_string(), |g| tree.node(g).name.clone());
            println!(
                "  {:<10} side {:?}  {} guides  parent guide {}",
                record.kind.name(),
                record.side,
                record.guides().len(),
                parent,
            );
        }
    }
    Ok(())
}

fn run_modules() {
    let registry = ModuleRegistry::new();
    println!("Registered module types:");
    for kind in ModuleKind::ALL {
        let sig = registry.signature(kind);
        let multi = sig
            .multi_role
            .map_or(String::new(), |r| format!(" (multi: {r})"));
        let sided = if sig.sided { "sided" } else { "center" };
        println!(
            "  {:<10} roles {:?}{multi}  [{sided}]",
            kind.name(),
            sig.roles,
        );
    }
}
