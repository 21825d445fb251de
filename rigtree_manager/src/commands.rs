use anyhow::{bail, Context, Result};
use colored::*;
use rigtree_core::{
    canonicalize, JointIndexRegistry, NodeId, NodeKind, PathOnlyResolver, RigConfig, RobotLoader,
    Scene, UNMAPPED_JOINT_INDEX,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub struct InspectOptions {
    pub file: PathBuf,
    pub config: Option<PathBuf>,
    pub root: Option<String>,
    pub json: bool,
    pub check_meshes: bool,
    pub strict: bool,
}

#[derive(Serialize)]
struct SceneSummary {
    robot_name: Option<String>,
    root_link: String,
    links: usize,
    joints: usize,
    revolute_joints: Vec<JointSummary>,
    diagnostics: Vec<DiagnosticSummary>,
}

#[derive(Serialize)]
struct JointSummary {
    index: i32,
    name: String,
    canonical: String,
    axis: [f32; 3],
}

#[derive(Serialize)]
struct DiagnosticSummary {
    kind: String,
    message: String,
}

fn load_config(path: Option<&Path>) -> Result<RigConfig> {
    match path {
        Some(path) => RigConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(RigConfig::default()),
    }
}

fn load_scene(file: &Path, config: RigConfig, check_meshes: bool) -> Result<Scene> {
    let mut loader = RobotLoader::new(config).context("invalid loader configuration")?;
    if check_meshes {
        tracing::debug!(
            "Resolving meshes under {}",
            loader.config().mesh_base_path.display()
        );
    } else {
        loader = loader.with_resolver(PathOnlyResolver);
    }
    let scene = loader
        .load_file(file)
        .with_context(|| format!("failed to load {}", file.display()))?;
    tracing::debug!(
        "Loaded {} with {} diagnostics",
        file.display(),
        scene.diagnostics.len()
    );
    Ok(scene)
}

fn revolute_summaries(scene: &Scene) -> Vec<JointSummary> {
    scene
        .revolute_joints
        .iter()
        .filter_map(|(index, joint)| {
            let node = scene.tree.node(joint.node)?;
            Some(JointSummary {
                index,
                name: node.name.clone(),
                canonical: canonicalize(&node.name),
                axis: joint.axis.to_array(),
            })
        })
        .collect()
}

pub fn inspect(options: &InspectOptions) -> Result<()> {
    let mut config = load_config(options.config.as_deref())?;
    if let Some(root) = &options.root {
        config.root_link = root.clone();
    }
    let root_link = config.root_link.clone();
    let scene = load_scene(&options.file, config, options.check_meshes)?;

    if options.json {
        let summary = SceneSummary {
            robot_name: scene.robot_name.clone(),
            root_link,
            links: scene.tree.link_count(),
            joints: scene.tree.joint_count(),
            revolute_joints: revolute_summaries(&scene),
            diagnostics: scene
                .diagnostics
                .iter()
                .map(|d| DiagnosticSummary {
                    kind: format!("{:?}", d.kind()),
                    message: d.to_string(),
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{} {}",
            "Robot:".cyan().bold(),
            scene.robot_name.as_deref().unwrap_or("<unnamed>")
        );
        println!(
            "  {} links, {} joints, {} actuated",
            scene.tree.link_count(),
            scene.tree.joint_count(),
            scene.revolute_joints.mapped().count()
        );
        println!();
        print_tree(&scene);

        if scene.diagnostics.is_empty() {
            println!("\n{} No diagnostics", "✓".green());
        } else {
            println!(
                "\n{} {} diagnostics",
                "!".yellow().bold(),
                scene.diagnostics.len()
            );
            for diagnostic in &scene.diagnostics {
                println!("  {} {}", "-".dimmed(), diagnostic);
            }
        }
    }

    if options.strict && !scene.diagnostics.is_empty() {
        bail!(
            "{} diagnostics recorded for {}",
            scene.diagnostics.len(),
            options.file.display()
        );
    }
    Ok(())
}

fn print_tree(scene: &Scene) {
    let mut stack = vec![(scene.anchor, 0)];
    while let Some((id, depth)) = stack.pop() {
        print_node(scene, id, depth);
        let children = scene.tree.children(id);
        stack.extend(children.iter().rev().map(|child| (*child, depth + 1)));
    }
}

fn print_node(scene: &Scene, id: NodeId, depth: usize) {
    let Some(node) = scene.tree.node(id) else {
        return;
    };
    let indent = "  ".repeat(depth);

    match &node.kind {
        NodeKind::Anchor { collisions } => {
            println!("{}{} ({} body shapes)", indent, node.name.bold(), collisions.len());
        }
        NodeKind::Link { visuals, collisions } => {
            println!(
                "{}{} {}",
                indent,
                node.name.green(),
                format!("[{} visual, {} collision]", visuals.len(), collisions.len()).dimmed()
            );
        }
        NodeKind::Joint { joint_type, index } => {
            let index = match index {
                Some(UNMAPPED_JOINT_INDEX) => "unmapped".yellow().to_string(),
                Some(i) => format!("#{}", i),
                None => String::new(),
            };
            println!("{}{} ({}) {}", indent, node.name.blue(), joint_type, index);
        }
    }
}

pub fn joints(file: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let scene = load_scene(file, config, false)?;
    let summaries = revolute_summaries(&scene);

    if summaries.is_empty() {
        println!("{} No revolute joints", "!".yellow());
        return Ok(());
    }

    println!("{:>6}  {:<32} {}", "INDEX".bold(), "JOINT".bold(), "AXIS".bold());
    for joint in summaries {
        let index = if joint.index == UNMAPPED_JOINT_INDEX {
            format!("{:>6}", "-").yellow().to_string()
        } else {
            format!("{:>6}", joint.index)
        };
        println!(
            "{}  {:<32} [{:.3}, {:.3}, {:.3}]",
            index, joint.name, joint.axis[0], joint.axis[1], joint.axis[2]
        );
    }
    Ok(())
}

pub fn canonical(name: &str, config: Option<&Path>) -> Result<()> {
    let registry = match config {
        Some(_) => load_config(config)?.joint_registry()?,
        None => JointIndexRegistry::humanoid(),
    };
    let canonical = canonicalize(name);

    match registry.lookup(&canonical) {
        Some(index) => println!("{} -> {} (index {})", name, canonical.green(), index),
        None => println!("{} -> {} ({})", name, canonical.yellow(), "unmapped".yellow()),
    }
    Ok(())
}
