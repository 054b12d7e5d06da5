//! Font inventory
//!
//! Scans font directories and prints the catalog as JSON, one object per
//! face. Optionally writes a subset of one font.
//!
//! Usage:
//!   cargo run --release --bin font_inventory -- /usr/share/fonts/truetype/dejavu
//!   cargo run --release --bin font_inventory -- fonts/ --language de-DE
//!   cargo run --release --bin font_inventory -- fonts/ --subset 3 out.ttf 0,36,68
//!
//! Set `RUST_LOG=debug` to see why files were skipped.

use printfont::{CatalogConfig, FontId, FontManager, LanguageId, SubsetRequest};
use std::path::PathBuf;
use std::process::ExitCode;

struct SubsetArgs {
    font: FontId,
    output: PathBuf,
    glyphs: Vec<u16>,
}

struct InventoryConfig {
    font_dirs: Vec<PathBuf>,
    language: Option<String>,
    subset: Option<SubsetArgs>,
    pretty: bool,
}

impl InventoryConfig {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        let mut config = Self {
            font_dirs: Vec::new(),
            language: None,
            subset: None,
            pretty: false,
        };

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--language" => {
                    i += 1;
                    config.language = args.get(i).cloned();
                },
                "--subset" => {
                    let (Some(id), Some(output), Some(glyphs)) =
                        (args.get(i + 1), args.get(i + 2), args.get(i + 3))
                    else {
                        return Err("--subset needs FONT_ID OUTPUT GLYPHS".to_string());
                    };
                    let font = id
                        .parse::<u32>()
                        .map(FontId)
                        .map_err(|e| format!("bad font id {}: {}", id, e))?;
                    let glyphs = glyphs
                        .split(',')
                        .map(|g| g.trim().parse::<u16>())
                        .collect::<Result<Vec<_>, _>>()
                        .map_err(|e| format!("bad glyph list {}: {}", glyphs, e))?;
                    config.subset = Some(SubsetArgs {
                        font,
                        output: PathBuf::from(output),
                        glyphs,
                    });
                    i += 3;
                },
                "--pretty" => {
                    config.pretty = true;
                },
                other => config.font_dirs.push(PathBuf::from(other)),
            }
            i += 1;
        }

        if config.font_dirs.is_empty() {
            return Err("no font directories given".to_string());
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match InventoryConfig::from_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!(
                "Usage: font_inventory DIR... [--language TAG] [--pretty] [--subset ID OUT GLYPHS]"
            );
            return ExitCode::FAILURE;
        },
    };

    let mut catalog = CatalogConfig::new();
    if let Some(tag) = &args.language {
        match LanguageId::from_tag(tag) {
            Some(language) => catalog = catalog.with_language(language),
            None => eprintln!("Unknown language {}, using en-US", tag),
        }
    }
    for dir in &args.font_dirs {
        catalog = catalog.with_font_path(dir);
    }

    let mut manager = FontManager::new(catalog);
    manager.initialize();

    let infos: Vec<_> = manager
        .font_list()
        .into_iter()
        .filter_map(|id| manager.font_info(id))
        .collect();
    let json = if args.pretty {
        serde_json::to_string_pretty(&infos)
    } else {
        serde_json::to_string(&infos)
    };
    match json {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        },
    }

    if let Some(subset) = args.subset {
        // glyphs take encoding bytes in the order given, so glyph 0 first
        // keeps .notdef at byte 0
        let encoding: Vec<u8> = (0..subset.glyphs.len()).map(|b| b as u8).collect();
        let request = SubsetRequest::new(subset.glyphs, encoding);
        match manager.create_font_subset(subset.font, &subset.output, &request) {
            Ok(info) => {
                eprintln!(
                    "Wrote {:?} subset of {} to {}",
                    info.font_type,
                    info.ps_name,
                    subset.output.display()
                );
            },
            Err(e) => {
                eprintln!("Error: subset failed: {}", e);
                return ExitCode::FAILURE;
            },
        }
    }

    ExitCode::SUCCESS
}
