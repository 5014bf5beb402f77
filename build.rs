// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn build_cli() -> Command {
    Command::new("debwrap")
        .version(env!("CARGO_PKG_VERSION"))
        .author("debwrap Contributors")
        .about("Generate conda recipes that wrap Debian binary packages")
        .subcommand_required(true)
        .subcommand(
            Command::new("gen")
                .about("Generate recipes for every package in a manifest")
                .arg(
                    Arg::new("manifest")
                        .long("manifest")
                        .value_name("PATH")
                        .required(true)
                        .help("Manifest listing the packages to wrap"),
                )
                .arg(
                    Arg::new("rules")
                        .long("rules")
                        .value_name("PATH")
                        .required(true)
                        .help("Rules document with dependency mappings and test snippets"),
                )
                .arg(
                    Arg::new("deb_src")
                        .long("deb-src")
                        .value_name("DIR")
                        .help("Local directory holding (or receiving) source .deb files"),
                )
                .arg(
                    Arg::new("no_dso_scan")
                        .long("no-dso-scan")
                        .action(clap::ArgAction::SetTrue)
                        .help("Skip mapping shared library dependencies to run dependencies"),
                )
                .arg(
                    Arg::new("workspace")
                        .long("workspace")
                        .value_name("DIR")
                        .default_value("workspace/recipes")
                        .help("Recipe workspace root"),
                )
                .arg(
                    Arg::new("templates")
                        .long("templates")
                        .value_name("DIR")
                        .help("Directory with template overrides"),
                )
                .arg(
                    Arg::new("progress")
                        .long("progress")
                        .action(clap::ArgAction::SetTrue)
                        .help("Show download progress bars"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = match env::var("OUT_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=OUT_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = out_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("debwrap.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
