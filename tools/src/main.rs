use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use glob::Pattern;
use lludp_tools::{
    decode_datagram_json, encode_json_packet, format_decode_pretty, format_inspect_report,
    format_protocol_table, inspect_datagram, load_protocol, DecodeOutput,
};
use tracing::info;
use wire::Limits;

#[derive(Parser)]
#[command(
    name = "lludp-tools",
    version,
    about = "lludp datagram inspection, decoding and encoding tools"
)]
struct Cli {
    /// Protocol JSON; defaults to the bundled sample protocol.
    #[arg(long, global = true)]
    protocol: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Inspect datagram headers and block sizes.
    Inspect {
        /// A datagram file, or a directory of them.
        packet_path: PathBuf,
        /// Optional glob filter when inspecting a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Sort inspected datagrams.
        #[arg(long, value_enum)]
        sort: Option<InspectSort>,
        /// Limit the number of inspected datagrams (after sorting).
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Decode a datagram into structured JSON.
    Decode {
        /// Path to the datagram bytes.
        packet_file: PathBuf,
        /// Output format.
        #[arg(long, value_enum, default_value_t = DecodeFormat::Json)]
        format: DecodeFormat,
    },
    /// Encode structured JSON into one datagram file per fragment.
    Encode {
        /// JSON in the shape produced by `decode`.
        input: PathBuf,
        /// Directory receiving `<packet>-<n>.bin` files.
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// Maximum datagram size.
        #[arg(long, default_value_t = wire::MTU)]
        mtu: usize,
    },
    /// List the packet types of the protocol.
    Protocol {
        /// Print the protocol as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InspectSort {
    Size,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DecodeFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let protocol = load_protocol(cli.protocol.as_deref()).context("load protocol")?;
    match cli.command {
        Command::Inspect {
            packet_path,
            glob,
            sort,
            limit,
        } => {
            if packet_path.is_dir() {
                let entries = collect_packet_entries(&packet_path, glob.as_deref())?;
                let mut entries = maybe_sort_entries(entries, sort);
                let limit = limit.or(sort.map(|InspectSort::Size| 10));
                if let Some(limit) = limit {
                    entries.truncate(limit);
                }
                for entry in entries {
                    let bytes = fs::read(&entry.path)
                        .with_context(|| format!("read packet {}", entry.path.display()))?;
                    let report = inspect_datagram(&bytes, Some(&protocol))
                        .with_context(|| format!("inspect {}", entry.path.display()))?;
                    println!("== {} ({} bytes) ==", entry.path.display(), entry.size);
                    println!("{}", format_inspect_report(&report));
                }
            } else {
                let bytes = fs::read(&packet_path)
                    .with_context(|| format!("read packet {}", packet_path.display()))?;
                let report = inspect_datagram(&bytes, Some(&protocol))?;
                println!("{}", format_inspect_report(&report));
            }
        }
        Command::Decode {
            packet_file,
            format,
        } => {
            let bytes = fs::read(&packet_file)
                .with_context(|| format!("read packet {}", packet_file.display()))?;
            let output = decode_datagram_json(&bytes, &protocol)?;
            match format {
                DecodeFormat::Json => {
                    let json = serde_json::to_string_pretty(&output).context("serialize json")?;
                    println!("{json}");
                }
                DecodeFormat::Pretty => {
                    println!("{}", format_decode_pretty(&protocol, &output)?);
                }
            }
        }
        Command::Encode {
            input,
            out_dir,
            mtu,
        } => {
            let contents = fs::read_to_string(&input)
                .with_context(|| format!("read input {}", input.display()))?;
            let packet: DecodeOutput =
                serde_json::from_str(&contents).context("parse input json")?;
            let buffers = encode_json_packet(&packet, &protocol, &Limits::with_mtu(mtu))?;
            write_fragments(&out_dir, &packet.packet, &buffers)?;
            info!(
                packet = %packet.packet,
                fragments = buffers.len(),
                out_dir = %out_dir.display(),
                "encoded"
            );
        }
        Command::Protocol { json } => {
            if json {
                let json = serde_json::to_string_pretty(&protocol).context("serialize json")?;
                println!("{json}");
            } else {
                println!("{}", format_protocol_table(&protocol));
            }
        }
    }
    Ok(())
}

fn write_fragments(dir: &Path, name: &str, buffers: &[Vec<u8>]) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create dir {}", dir.display()))?;
    for (index, buf) in buffers.iter().enumerate() {
        let path = dir.join(format!("{name}-{index}.bin"));
        fs::write(&path, buf).with_context(|| format!("write {}", path.display()))?;
    }
    Ok(())
}

struct PacketEntry {
    path: PathBuf,
    size: u64,
}

fn collect_packet_entries(dir: &Path, glob: Option<&str>) -> Result<Vec<PacketEntry>> {
    let filter = glob
        .map(Pattern::new)
        .transpose()
        .context("invalid glob pattern")?;
    let selected = |path: &Path| {
        filter.as_ref().map_or(true, |pattern| {
            pattern.matches_path(path)
                || path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| pattern.matches(name))
        })
    };

    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && selected(&path) {
            let size = entry.metadata()?.len();
            entries.push(PacketEntry { path, size });
        }
    }
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

fn maybe_sort_entries(
    mut entries: Vec<PacketEntry>,
    sort: Option<InspectSort>,
) -> Vec<PacketEntry> {
    if let Some(InspectSort::Size) = sort {
        entries.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
    }
    entries
}
