use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use protoc_gen_protogate::commands::{plugin, routes, standalone};
use protoc_gen_protogate::logging::init_tracing;

#[derive(Parser)]
#[command(
    name = "protoc-gen-protogate",
    version,
    about = "protoc plugin generating HTTP/JSON gateways for tonic services",
    long_about = "Without arguments, runs as a protoc plugin: reads a CodeGeneratorRequest \
                  on stdin and writes a CodeGeneratorResponse on stdout.\n\n\
                  With --descriptor-set, generates from a FileDescriptorSet instead."
)]
struct Cli {
    /// FileDescriptorSet produced by `protoc --include_imports --descriptor_set_out`
    #[arg(long, value_name = "FILE")]
    descriptor_set: Option<PathBuf>,

    /// Proto file to generate (repeatable); defaults to every file with services
    #[arg(long = "file", value_name = "NAME", requires = "descriptor_set")]
    files: Vec<String>,

    /// Generator option, e.g. `pb_path=crate::pb` (repeatable)
    #[arg(long = "param", value_name = "KEY=VALUE", requires = "descriptor_set")]
    params: Vec<String>,

    /// Directory receiving the generated files
    #[arg(long, value_name = "DIR", requires = "descriptor_set")]
    out_dir: Option<PathBuf>,

    /// Print the route table instead of writing files
    #[arg(long, requires = "descriptor_set", conflicts_with = "out_dir")]
    list_routes: bool,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match (&cli.descriptor_set, &cli.out_dir) {
        (None, _) => plugin::run(std::io::stdin().lock(), std::io::stdout().lock()),
        (Some(set), _) if cli.list_routes => routes::run(set, &cli.files, &cli.params),
        (Some(set), Some(out_dir)) => standalone::run(set, &cli.files, &cli.params, out_dir).map(|_| ()),
        (Some(_), None) => Cli::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "--out-dir <DIR> is required with --descriptor-set unless --list-routes is given",
            )
            .exit(),
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "generation failed");
        eprintln!(
            "{}",
            colored::Colorize::red(format!("protoc-gen-protogate: error: {e}").as_str())
        );
        std::process::exit(1);
    }
}
