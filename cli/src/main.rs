use clap::{Parser, Subcommand};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wl_gena::load_protocols;
use wl_gena_compiler::error::GenaError;
use wl_gena_compiler::options::include_directive;
use wl_gena_compiler::{
    compile_header, compile_protocol, dependency_dot, protocol_to_json, GenerateOptions,
};

#[derive(Parser)]
#[command(name = "wl-gena")]
#[command(about = "Generate C++ client bindings from Wayland-style protocol XML", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump the parsed protocol as JSON
    Json {
        /// Input protocol `.xml` file
        #[arg(short, long)]
        input: PathBuf,

        /// Output `.json` file (if omitted, prints to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Drop the leading `wl_` from protocol, interface and owner names
        #[arg(long)]
        wl_strip: bool,
    },

    /// Generate the C++ header for a protocol
    Header {
        /// Input protocol `.xml` file
        #[arg(short, long)]
        input: PathBuf,

        /// Output header file
        #[arg(short, long)]
        output: PathBuf,

        /// Comma separated includes; a leading `/` selects `#include <...>`
        #[arg(long, value_delimiter = ',')]
        includes: Vec<String>,

        /// Comma separated protocol files whose interfaces may be referenced
        #[arg(long, value_delimiter = ',')]
        context_protocols: Vec<PathBuf>,

        /// Namespace wrapping the generated protocol namespace
        #[arg(long)]
        namespace: Option<String>,
    },

    /// Print the interface dependency graph in DOT format
    Deps {
        /// Input protocol `.xml` file
        #[arg(short, long)]
        input: PathBuf,

        /// Comma separated protocol files whose interfaces may be referenced
        #[arg(long, value_delimiter = ',')]
        context_protocols: Vec<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Replace `path` with `contents` in one step, so a failed run never leaves a
/// partial file behind.
fn write_atomic(path: &Path, contents: &str) -> Result<(), GenaError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(contents.as_bytes())?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn main() -> Result<(), GenaError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Json { input, output, wl_strip } => {
            let text = fs::read_to_string(input)?;
            let mut protocol = compile_protocol(&text)?;
            if *wl_strip {
                protocol = protocol.strip_wl_prefix();
            }
            let json = protocol_to_json(&protocol)?;
            if let Some(out_path) = output {
                write_atomic(out_path, &json)?;
                info!(input = %input.display(), output = %out_path.display(), "wrote JSON");
            } else {
                println!("{}", json);
            }
            Ok(())
        }

        Commands::Header { input, output, includes, context_protocols, namespace } => {
            let text = fs::read_to_string(input)?;
            let options = GenerateOptions {
                includes:  includes.iter().map(|path| include_directive(path)).collect(),
                context:   load_protocols(context_protocols)?,
                namespace: namespace.clone(),
            };
            info!(
                input = %input.display(),
                context = options.context.len(),
                "generating header"
            );
            let header = compile_header(&text, &options)?;
            write_atomic(output, &header)?;
            info!(output = %output.display(), bytes = header.len(), "wrote header");
            Ok(())
        }

        Commands::Deps { input, context_protocols } => {
            let text = fs::read_to_string(input)?;
            let protocol = compile_protocol(&text)?;
            let context = load_protocols(context_protocols)?;
            print!("{}", dependency_dot(&protocol, &context)?);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_comma_lists() {
        let cli = Cli::parse_from([
            "wl-gena",
            "-vv",
            "header",
            "-i",
            "in.xml",
            "-o",
            "out.hh",
            "--includes",
            "/cstdint,traits.hh",
            "--context-protocols",
            "a.xml,b.xml",
            "--namespace",
            "wl",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Header { includes, context_protocols, namespace, .. } => {
                assert_eq!(includes, vec!["/cstdint", "traits.hh"]);
                assert_eq!(context_protocols, vec![PathBuf::from("a.xml"), PathBuf::from("b.xml")]);
                assert_eq!(namespace.as_deref(), Some("wl"));
            }
            _ => panic!("expected header command"),
        }
    }

    #[test]
    fn test_cli_parses_wl_strip() {
        let cli = Cli::parse_from(["wl-gena", "json", "-i", "wayland.xml", "--wl-strip"]);
        match cli.command {
            Commands::Json { input, output, wl_strip } => {
                assert_eq!(input, PathBuf::from("wayland.xml"));
                assert!(output.is_none());
                assert!(wl_strip);
            }
            _ => panic!("expected json command"),
        }

        let cli = Cli::parse_from(["wl-gena", "json", "-i", "wayland.xml"]);
        assert!(matches!(cli.command, Commands::Json { wl_strip: false, .. }));
    }

    #[test]
    fn test_write_atomic_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.hh");
        fs::write(&path, "old").unwrap();
        write_atomic(&path, "#pragma once\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "#pragma once\n");
    }
}
