use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use clap::Parser;
use heck::ToSnakeCase;
use schema2assert::{generate, render_asserts, render_classes, Generation, ProtoMap, Target};

/// Generates data classes and matching validation constraints from an
/// OpenAPI/Swagger-style schema document.
#[derive(Parser, Debug)]
#[clap(author, version, about = "Schema to class and assertion generator")]
struct Cli {
    /// Path to the YAML schema document.
    file: PathBuf,
    /// One of 'full', 'object', 'http'.
    #[clap(short, long, default_value = "full")]
    target: String,
    /// Class name to generate; only meaningful with --target object.
    #[clap(short, long)]
    class: Option<String>,
    /// Output directory; prints to stdout when absent.
    #[clap(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    run(Cli::parse())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let target = Target::from_str(&cli.target)?;
    let content = fs::read_to_string(&cli.file)
        .with_context(|| format!("unable to read '{}'", cli.file.display()))?;
    let tree = serde_yaml::from_str::<serde_yaml::Value>(&content)?;
    let object_name = if target.is_objectable() {
        cli.class.as_deref()
    } else {
        None
    };

    match generate(&tree, target, object_name).context("generation failed")? {
        Generation::Single(protos) => emit(&protos, cli.output.as_deref())?,
        Generation::PerDirection(directions) => {
            // Same-named entities may exist per direction; each direction gets
            // its own output subdirectory.
            for (direction, protos) in &directions {
                if cli.output.is_none() {
                    println!("{}:", direction);
                }
                let dir = cli.output.as_ref().map(|output| output.join(direction));
                emit(protos, dir.as_deref())?;
            }
        }
    }
    Ok(())
}

fn emit(protos: &ProtoMap, output: Option<&Path>) -> anyhow::Result<()> {
    let classes = render_classes(protos).context("unable to transform to class")?;
    let asserts = render_asserts(protos).context("unable to transform to assert")?;

    for (name, class_text) in &classes {
        let assert_text = &asserts[name.as_str()];
        match output {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                let path = dir.join(format!("{}.rs", name.to_snake_case()));
                log::debug!("writing '{}'", path.display());
                fs::write(&path, merge_artifacts(name, class_text, assert_text))?;
            }
            None => {
                println!("{}:", name);
                println!("{}", class_text);
                println!("{}", assert_text);
            }
        }
    }
    Ok(())
}

/// File-writing convention: the class text followed by an appended impl block
/// exposing the constraint lines through a `constraints` accessor.
fn merge_artifacts(name: &str, class_text: &str, assert_text: &str) -> String {
    let mut out = String::with_capacity(class_text.len() + assert_text.len() + 128);
    out.push_str(class_text);
    out.push('\n');
    out.push_str(&format!(
        "impl {} {{\n    pub fn constraints() -> &'static [&'static str] {{\n        &[\n",
        name
    ));
    for line in assert_text.lines() {
        out.push_str(&format!("            {:?},\n", line));
    }
    out.push_str("        ]\n    }\n}\n");
    out
}
