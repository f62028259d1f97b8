//! Heirloom CLI
//!
//! Usage:
//!   heirloom [OPTIONS] [NAME]
//!
//! Options:
//!   -v, --views <DIR>        Views root directory
//!   -d, --data <FILE>        JSON data file (`-` reads stdin)
//!   -s, --set <KEY=VALUE>    Set a string variable (repeatable)
//!   -c, --config <FILE>      Engine configuration (TOML format)
//!   -o, --output <FILE>      Write the result to a file
//!       --check              Parse the template without rendering it
//!       --syntax             Show template syntax reference
//!   -h, --help               Print help

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Parser;
use log::debug;

use heirloom::{Context, Engine, EngineConfig, RenderError};

#[derive(Parser)]
#[command(name = "heirloom")]
#[command(about = "Render block and inheritance view templates")]
struct Cli {
    /// Logical template name, e.g. `pages.home`
    name: Option<String>,

    /// Views root directory
    #[arg(short, long)]
    views: Option<PathBuf>,

    /// JSON file with template data (`-` reads stdin)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Set a string variable
    #[arg(short, long = "set", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    set: Vec<(String, String)>,

    /// Engine configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum number of templates in one inheritance chain
    #[arg(long)]
    max_depth: Option<usize>,

    /// Fail on undefined variables instead of printing nothing
    #[arg(long)]
    strict: bool,

    /// Template file extension
    #[arg(long)]
    extension: Option<String>,

    /// Output file (writes to stdout if not provided)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Parse the template without rendering it
    #[arg(long)]
    check: bool,

    /// Show template syntax reference
    #[arg(long)]
    syntax: bool,
}

fn main() {
    let cli = Cli::parse();
    setup_logging();

    if cli.syntax {
        print_syntax();
        return;
    }

    let Some(name) = cli.name.as_deref() else {
        print_intro();
        return;
    };

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(message) => fail(&message),
    };
    debug!("views root: {}", config.views_root.display());
    let engine = Engine::new(config);

    if cli.check {
        match engine.check(name) {
            Ok(template) => {
                let location = template
                    .path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| template.name.clone());
                println!("{}: ok", location);
                for parent in template.document.extends() {
                    println!("  extends {}", parent);
                }
                for section in template.document.sections() {
                    println!("  section {}", section);
                }
            }
            Err(e) => report(&e),
        }
        return;
    }

    let data = match load_data(&cli) {
        Ok(data) => data,
        Err(message) => fail(&message),
    };

    let result = match &cli.output {
        Some(path) => engine.fetch(name, &data).and_then(|text| {
            fs::write(path, text).map_err(RenderError::Output)
        }),
        None => engine.render(name, &data, false).map(|_| ()),
    };
    if let Err(e) = result {
        report(&e);
    }
}

fn setup_logging() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

/// Config file first, then command-line overrides
fn load_config(cli: &Cli) -> Result<EngineConfig, String> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)
            .map_err(|e| format!("Error loading config '{}': {}", path.display(), e))?,
        None => EngineConfig::default(),
    };
    if let Some(views) = &cli.views {
        config = config.with_views_root(views);
    }
    if let Some(extension) = &cli.extension {
        config = config.with_extension(extension);
    }
    if let Some(depth) = cli.max_depth {
        config = config.with_max_chain_depth(depth);
    }
    if cli.strict {
        config = config.with_strict_variables(true);
    }
    Ok(config)
}

fn load_data(cli: &Cli) -> Result<Context, String> {
    let mut data = match &cli.data {
        Some(path) if path.as_os_str() == "-" => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| format!("Error reading from stdin: {}", e))?;
            Context::from_json_str(&buffer).map_err(|e| format!("Error in data from stdin: {}", e))?
        }
        Some(path) => {
            let content = fs::read_to_string(path)
                .map_err(|e| format!("Error reading file '{}': {}", path.display(), e))?;
            Context::from_json_str(&content)
                .map_err(|e| format!("Error in data file '{}': {}", path.display(), e))?
        }
        None => Context::new(),
    };
    for (key, value) in &cli.set {
        data.insert(key.clone(), value.clone());
    }
    Ok(data)
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{}`", s))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in `{}`", s));
    }
    Ok((key.to_string(), value.to_string()))
}

fn report(error: &RenderError) -> ! {
    match error.diagnostics() {
        Some(diagnostics) => eprint!("{}", diagnostics),
        None => eprintln!("Error: {}", error),
    }
    std::process::exit(1);
}

fn fail(message: &str) -> ! {
    eprintln!("{}", message);
    std::process::exit(1);
}

fn print_intro() {
    println!(
        r#"Heirloom - block and inheritance view templates

USAGE:
    heirloom [OPTIONS] <NAME>

OPTIONS:
    -v, --views <DIR>        Views root (default: views)
    -d, --data <FILE>        JSON data file, `-` for stdin
    -s, --set <KEY=VALUE>    Set a string variable (repeatable)
    -c, --config <FILE>      Engine configuration (TOML)
    -o, --output <FILE>      Write to a file instead of stdout
        --max-depth <N>      Maximum inheritance chain length
        --strict             Fail on undefined variables
        --extension <EXT>    Template file extension (default: html)
        --check              Parse the template and list its blocks
        --syntax             Show template syntax reference
    -h, --help               Print help

QUICK START:
    heirloom -v views -s title=Home pages.home > home.html

Renders views/pages/home.html through its @extends chain.
Run --syntax for the template syntax reference."#
    );
}

fn print_syntax() {
    println!(
        r#"HEIRLOOM TEMPLATE SYNTAX
========================

OUTPUT
------
{{{{ expr }}}}          Escaped output (& < > " ')
{{!! expr !!}}        Raw output
{{{{-- note --}}}}      Comment, removed
@@                  A literal @

INHERITANCE
-----------
@extends("layouts.main")            Render layouts/main after this template
@section("name") ... @endsection    Define block, replacing earlier content
@section("name") ... @append        Add to the end of an existing block
@section("name") ... @show          Define block and output it in place
@section("name", expr)              Define block from an expression
@yield("name")                      Output a block (empty if undefined)
@yield("name", expr)                Output a block or a default
@include("partials.nav")            Evaluate another template in place

Every template's own output becomes the "content" block, so a layout can
place the previous template's text with @yield("content").

EXPRESSIONS
-----------
user.name           Variable path
items.0             Array index
"text" 'text'       Strings
42  1.5  -3         Numbers
true false null     Constants
a ?? b              b when a is undefined or null
expr | upper        Filters: upper, lower, trim, json, length

NAMES
-----
Template names use dots for directories:
    pages.home  ->  <views>/pages/home.html"#
    );
}
