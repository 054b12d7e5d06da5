//! Glyph width and Unicode map extraction tests

mod common;

use common::{write_font, TestFont};
use printfont::{CatalogConfig, FontManager};
use tempfile::TempDir;

#[test]
fn test_widths_cover_every_glyph() {
    let dir = TempDir::new().unwrap();
    let path = write_font(dir.path(), "w.ttf", &TestFont::new("Widths").build());
    let mut manager = FontManager::new(CatalogConfig::new());
    let id = manager.add_font_file(&path)[0];

    let widths = manager.glyph_widths(id, false).unwrap();
    assert_eq!(widths.widths, vec![500, 250, 600, 610, 720, 830]);

    let vertical = manager.glyph_widths(id, true).unwrap();
    assert_eq!(vertical.widths, vec![1000; 6]);
}

#[test]
fn test_unicode_map_walks_the_cmap() {
    let dir = TempDir::new().unwrap();
    let path = write_font(dir.path(), "u.ttf", &TestFont::new("Unicode").build());
    let mut manager = FontManager::new(CatalogConfig::new());
    let id = manager.add_font_file(&path)[0];

    let widths = manager.glyph_widths(id, false).unwrap();
    let pairs: Vec<(char, u16)> = widths.unicode.into_iter().collect();
    assert_eq!(pairs, vec![(' ', 1), ('A', 2), ('B', 3), ('C', 4), ('D', 5)]);
}

#[test]
fn test_widths_scale_with_units_per_em() {
    let dir = TempDir::new().unwrap();
    let mut font = TestFont::new("Scaled").with_units_per_em(2000);
    font.advances = vec![1000, 2000, 500];
    font.cmap = vec![(0x61, 1), (0x62, 2)];
    let path = write_font(dir.path(), "s.ttf", &font.build());
    let mut manager = FontManager::new(CatalogConfig::new());
    let id = manager.add_font_file(&path)[0];

    let widths = manager.glyph_widths(id, false).unwrap();
    assert_eq!(widths.widths, vec![500, 1000, 250]);
    assert_eq!(widths.unicode.get(&'b'), Some(&2));
}

#[test]
fn test_cff_font_widths() {
    let dir = TempDir::new().unwrap();
    let path = write_font(dir.path(), "c.otf", &TestFont::new("Cff Widths").cff().build());
    let mut manager = FontManager::new(CatalogConfig::new());
    let id = manager.add_font_file(&path)[0];

    let widths = manager.glyph_widths(id, false).unwrap();
    assert_eq!(widths.widths.len(), 6);
    assert_eq!(widths.unicode.len(), 5);
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write_font(dir.path(), "gone.ttf", &TestFont::new("Gone").build());
    let mut manager = FontManager::new(CatalogConfig::new());
    let id = manager.add_font_file(&path)[0];

    std::fs::remove_file(&path).unwrap();
    assert!(matches!(
        manager.glyph_widths(id, false),
        Err(printfont::Error::Io(_))
    ));
}
