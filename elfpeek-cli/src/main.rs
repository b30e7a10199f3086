mod highlight;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use elfpeek_core::{Binary, Elf64Ehdr, Elf64Phdr, Header, ResolvedSection};
use render::{HeaderText, SectionsText, SegmentsText};
use serde::Serialize;

/// Simple ELF64 introspection CLI
#[derive(Parser)]
#[command(
    name = "elfpeek",
    about = "Inspect ELF64 binaries (file header, program headers and sections)",
    version,
    author
)]
struct Cli {
    /// Path to binary file
    #[arg(required = true)]
    path: std::path::PathBuf,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Print program headers and sections as one-row-per-entry tables
    #[arg(long, global = true)]
    table: bool,

    /// When to highlight text output
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    color: ColorMode,

    /// Decode even if the identification bytes are not little-endian ELF64
    #[arg(long, global = true)]
    no_verify: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Show the file header
    #[command(visible_alias = "h")]
    Header,
    /// Show the program headers
    #[command(visible_aliases = ["program-headers", "l"])]
    Segments,
    /// Show the section headers with their names
    #[command(visible_aliases = ["section-headers", "S"])]
    Sections,
    /// Show everything
    #[command(visible_alias = "a")]
    All,
}

#[derive(ValueEnum, Clone, Copy, PartialEq, Eq, Debug)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Serialize)]
struct Report<'a> {
    header: &'a Elf64Ehdr,
    program_headers: &'a [Elf64Phdr],
    section_headers: &'a [ResolvedSection],
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.color {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {}
    }

    let mut bin = Binary::open(&cli.path)
        .with_context(|| format!("failed to read ELF header from {}", cli.path.display()))?;

    if !cli.no_verify {
        bin.header.check_ident().with_context(|| {
            format!(
                "{} is not a little-endian ELF64 file (pass --no-verify to decode it anyway)",
                bin.path
            )
        })?;
    } else {
        log::warn!("skipping identification check for {}", bin.path);
    }

    let wants_segments = matches!(cli.command, Command::Segments | Command::All);
    let wants_sections = matches!(cli.command, Command::Sections | Command::All);

    let segments = if wants_segments {
        bin.program_headers()
            .with_context(|| format!("failed to read program headers of {}", bin.path))?
    } else {
        Vec::new()
    };
    let sections = if wants_sections {
        bin.sections()
            .with_context(|| format!("failed to read section headers of {}", bin.path))?
    } else {
        Vec::new()
    };

    if cli.json {
        let json = match cli.command {
            Command::Header => serde_json::to_string_pretty(&bin.header)?,
            Command::Segments => serde_json::to_string_pretty(&segments)?,
            Command::Sections => serde_json::to_string_pretty(&sections)?,
            Command::All => serde_json::to_string_pretty(&Report {
                header: &bin.header,
                program_headers: &segments,
                section_headers: &sections,
            })?,
        };
        println!("{json}");
        return Ok(());
    }

    let mut out = String::new();
    if let Command::All = cli.command {
        out.push_str(&format!("{}: {}\n\n", bin.path, bin.header.summary()));
    }
    if matches!(cli.command, Command::Header | Command::All) {
        out.push_str(&HeaderText(&bin.header).to_string());
    }
    if wants_segments {
        if let Command::All = cli.command {
            out.push('\n');
        }
        if cli.table {
            out.push_str(&render::segments_table(&segments));
        } else {
            out.push_str(&SegmentsText(&segments).to_string());
        }
    }
    if wants_sections {
        if let Command::All = cli.command {
            out.push('\n');
        }
        if cli.table {
            out.push_str(&render::sections_table(&sections));
        } else {
            out.push_str(&SectionsText(&sections).to_string());
        }
    }
    print!("{}", highlight::highlight(&out));

    Ok(())
}
