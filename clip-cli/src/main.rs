// Command-line interface for clip
//
// This binary converts captured content between formats and checks it for
// problems. The core capabilities come from the clip-content crate; this
// layer only wires files, stdin/stdout, and configuration to them.
//
// Converting:
//
// The conversion needs a from and to pair. The from can be auto-detected
// from the input file extension, while being overridable by an explicit
// --from flag. Reading from stdin ("-") defaults to html.
// Usage:
//  clip <input> --to <format> [--from <format>] [--output <file>]  - Convert (default)
//  clip convert <input> --to <format> [...]                        - Same, explicit
//  clip validate <input>                 - Check a JSON document, exit 1 if invalid
//  clip check <input> --platform <name>  - Platform compatibility, exit 1 if lossy

use clap::{Arg, ArgAction, Command, ValueHint};
use clip_config::{ClipConfig, Loader};
use clip_content::parse::{parse_document_full, parse_text, ParseOptions, ParsedDocument};
use clip_content::render::{
    Flavor, HtmlRenderer, JsonRenderer, MarkdownOptions, MarkdownRenderer, Renderer,
    RendererRegistry,
};
use clip_content::{sanitize, validate, ClippyContent, PlatformRegistry};
use std::fs;
use std::io::Read;
use std::str::FromStr;

fn build_cli() -> Command {
    Command::new("clip")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for converting and checking captured web content")
        .long_about(
            "clip is a command-line tool for working with captured content documents.\n\n\
            Commands:\n  \
            - convert:  Render a document as HTML, Markdown, or canonical JSON\n  \
            - validate: Check a JSON document against the content model\n  \
            - check:    Report what a platform would lose when pasting\n\n\
            Examples:\n  \
            clip page.html --to markdown                 # Capture to markdown (stdout)\n  \
            clip page.html --to markdown --flavor slack  # Slack dialect\n  \
            clip doc.json --to html -o out.html          # Render stored capture\n  \
            cat page.html | clip - --to json             # Read from stdin"
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-renderers")
                .long("list-renderers")
                .help("List available output renderers")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a clip.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert a document between formats (default command)")
                .long_about(
                    "Parse captured input and render it in another format.\n\n\
                    Input formats (--from):\n  \
                    - html: Captured page markup (.html, .htm)\n  \
                    - text: Plain text, blank-line separated paragraphs (.txt)\n  \
                    - json: A stored canonical document (.json)\n\n\
                    Output formats (--to): html, markdown, json\n\n\
                    The input format is auto-detected from the file extension.\n\
                    Output goes to stdout by default, or use -o to specify a file.\n\n\
                    Examples:\n  \
                    clip convert page.html --to markdown            # Markdown to stdout\n  \
                    clip convert page.html --to json -o doc.json    # Store the capture\n  \
                    clip convert doc.json --to markdown --flavor discord"
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path, or '-' for stdin")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Input format (auto-detected from file extension if not specified)")
                        .value_parser(["html", "text", "json"])
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Output format (required)")
                        .long_help(
                            "Output format to render.\n\n\
                            Available formats: html, markdown, json\n\
                            Use --list-renderers to see all options."
                        )
                        .required(true)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("flavor")
                        .long("flavor")
                        .help("Markdown flavor: github, discord, slack, or standard")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("platform")
                        .long("platform")
                        .help("Warn about content the named platform cannot represent")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Check a JSON document against the content model")
                .long_about(
                    "Deserialize a stored JSON document and report every broken\n\
                    invariant. Hard errors make the exit code 1; warnings do not.\n\n\
                    With --fix, a repaired copy is written to stdout instead.\n\n\
                    Examples:\n  \
                    clip validate doc.json          # Report, exit 1 if invalid\n  \
                    clip validate doc.json --fix    # Print a repaired document"
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path, or '-' for stdin")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("fix")
                        .long("fix")
                        .help("Write a repaired copy to stdout")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Report what a platform would lose when pasting a document")
                .arg(
                    Arg::new("input")
                        .help("Input file path, or '-' for stdin")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("platform")
                        .long("platform")
                        .help("Platform name (discord, slack, gmail, notion, plaintext)")
                        .required(true)
                        .value_hint(ValueHint::Other),
                ),
        )
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Try to parse args. If no subcommand is provided, inject "convert"
    let args: Vec<String> = std::env::args().collect();

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&args) {
        Ok(m) => m,
        Err(e) => {
            // A bare input path means an implicit convert
            if args.len() > 1
                && args[1] != "convert"
                && args[1] != "validate"
                && args[1] != "check"
                && args[1] != "help"
                && !args[1].starts_with("--")
            {
                let mut new_args = vec![args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&args[1..]);

                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    if matches.get_flag("list-renderers") {
        handle_list_renderers_command();
        return;
    }

    let config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));

    match matches.subcommand() {
        Some(("convert", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            let to = sub_matches.get_one::<String>("to").expect("to is required");

            let from = match sub_matches.get_one::<String>("from") {
                Some(f) => f.to_string(),
                None => match detect_input_format(input) {
                    Some(detected) => detected,
                    None => {
                        eprintln!("Error: Could not detect input format from '{input}'");
                        eprintln!("Please specify --from explicitly");
                        std::process::exit(1);
                    }
                },
            };

            let flavor = sub_matches.get_one::<String>("flavor").map(|s| s.as_str());
            let platform = sub_matches.get_one::<String>("platform").map(|s| s.as_str());
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_convert_command(input, &from, to, flavor, platform, output, &config);
        }
        Some(("validate", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            let fix = sub_matches.get_flag("fix");
            handle_validate_command(input, fix);
        }
        Some(("check", sub_matches)) => {
            let input = sub_matches
                .get_one::<String>("input")
                .expect("input is required");
            let platform = sub_matches
                .get_one::<String>("platform")
                .expect("platform is required");
            handle_check_command(input, platform);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

/// Map a file extension to an input format name.
fn detect_input_format(input: &str) -> Option<String> {
    if input == "-" {
        // Stdin carries no extension; captured markup is the common case.
        return Some("html".to_string());
    }
    let extension = std::path::Path::new(input)
        .extension()
        .and_then(|ext| ext.to_str())?;
    match extension {
        "html" | "htm" => Some("html".to_string()),
        "txt" | "text" => Some("text".to_string()),
        "json" => Some("json".to_string()),
        _ => None,
    }
}

/// Read the input file, or stdin when the path is "-".
fn read_input(input: &str) -> String {
    if input == "-" {
        let mut source = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut source) {
            eprintln!("Error reading stdin: {e}");
            std::process::exit(1);
        }
        source
    } else {
        fs::read_to_string(input).unwrap_or_else(|e| {
            eprintln!("Error reading file '{input}': {e}");
            std::process::exit(1);
        })
    }
}

/// Parse or deserialize the input into a document, reporting degradations
/// on stderr.
fn load_document(source: &str, from: &str, config: &ClipConfig) -> ClippyContent {
    let options: ParseOptions = (&config.parse).into();
    match from {
        "html" => {
            let ParsedDocument { content, warnings } = parse_document_full(source, &options);
            for warning in &warnings {
                eprintln!("warning: {warning}");
            }
            content
        }
        "text" => parse_text(source, &options),
        "json" => ClippyContent::from_json(source).unwrap_or_else(|e| {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }),
        other => {
            eprintln!("Error: unknown input format '{other}'");
            std::process::exit(1);
        }
    }
}

/// Handle the convert command
fn handle_convert_command(
    input: &str,
    from: &str,
    to: &str,
    flavor: Option<&str>,
    platform: Option<&str>,
    output: Option<&str>,
    config: &ClipConfig,
) {
    let source = read_input(input);
    let content = load_document(&source, from, config);

    // Platform issues are advisory during convert; rendering continues.
    if let Some(name) = platform {
        let registry = PlatformRegistry::default();
        match registry.validate_for_platform(&content, name) {
            Ok(report) => {
                for issue in &report.issues {
                    eprintln!("warning: {issue}");
                }
            }
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    }

    let renderer = build_renderer(to, flavor, config);
    let rendered = renderer.render(&content).unwrap_or_else(|e| {
        eprintln!("Render error: {e}");
        std::process::exit(1);
    });

    match output {
        Some(path) => {
            fs::write(path, &rendered).unwrap_or_else(|e| {
                eprintln!("Error writing file '{path}': {e}");
                std::process::exit(1);
            });
        }
        None => {
            println!("{rendered}");
        }
    }
}

/// A renderer configured from the config file plus CLI overrides.
fn build_renderer(to: &str, flavor: Option<&str>, config: &ClipConfig) -> Box<dyn Renderer> {
    match to {
        "html" => Box::new(HtmlRenderer {
            options: (&config.html).into(),
        }),
        "markdown" => {
            let mut options: MarkdownOptions = (&config.markdown).into();
            if let Some(raw) = flavor {
                match Flavor::from_str(raw) {
                    // A flavor override resets its dialect defaults too.
                    Ok(parsed) => options = MarkdownOptions::for_flavor(parsed),
                    Err(e) => {
                        eprintln!("Error: {e}");
                        std::process::exit(1);
                    }
                }
            }
            Box::new(MarkdownRenderer { options })
        }
        "json" => Box::new(JsonRenderer),
        other => {
            eprintln!("Error: unknown output format '{other}'");
            eprintln!("Available renderers:");
            for name in RendererRegistry::default().list_renderers() {
                eprintln!("  {name}");
            }
            std::process::exit(1);
        }
    }
}

/// Handle the validate command
fn handle_validate_command(input: &str, fix: bool) {
    let source = read_input(input);
    let content = ClippyContent::from_json(&source).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    if fix {
        let repaired = sanitize(&content);
        let json = repaired.to_json_pretty().unwrap_or_else(|e| {
            eprintln!("Error: {e}");
            std::process::exit(1);
        });
        println!("{json}");
        return;
    }

    let report = validate(&content);
    for error in &report.errors {
        println!("error: {error}");
    }
    for warning in &report.warnings {
        println!("warning: {warning}");
    }
    if report.is_valid {
        println!(
            "valid: {} blocks, {} warnings",
            content.blocks.len(),
            report.warnings.len()
        );
    } else {
        std::process::exit(1);
    }
}

/// Handle the check command
fn handle_check_command(input: &str, platform: &str) {
    let source = read_input(input);
    let content = ClippyContent::from_json(&source).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    let registry = PlatformRegistry::default();
    let report = registry
        .validate_for_platform(&content, platform)
        .unwrap_or_else(|e| {
            eprintln!("Error: {e}");
            eprintln!("Known platforms:");
            for name in registry.list_platforms() {
                eprintln!("  {name}");
            }
            std::process::exit(1);
        });

    for issue in &report.issues {
        println!("issue: {issue}");
    }
    if report.compatible {
        println!("compatible with {platform}");
    } else {
        std::process::exit(1);
    }
}

/// Handle the list-renderers command
fn handle_list_renderers_command() {
    println!("Available renderers:");
    let registry = RendererRegistry::default();
    for name in registry.list_renderers() {
        println!("  {name}");
    }
    println!("\nMarkdown flavors: github, discord, slack, standard");
    println!("\nKnown platforms:");
    let platforms = PlatformRegistry::default();
    for name in platforms.list_platforms() {
        println!("  {name}");
    }
}

fn load_cli_config(explicit_path: Option<&str>) -> ClipConfig {
    let loader = Loader::new().with_optional_file("clip.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}
