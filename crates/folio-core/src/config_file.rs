use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub parsing: Option<ParsingSection>,
    pub extraction: Option<ExtractionSection>,
    pub glossary: Option<GlossarySection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsingSection {
    pub marker_pattern: Option<String>,
    pub page_steps: Option<Vec<u32>>,
    /// `"following"` or `"straddle"`.
    pub attribution: Option<String>,
    pub leading_page: Option<u32>,
    pub min_line_chars: Option<usize>,
    pub garbled_min_len: Option<usize>,
    pub min_alpha_ratio: Option<f64>,
    pub noise_patterns: Option<Vec<String>>,
    /// When true, `noise_patterns` replaces the built-in list instead of extending it.
    pub replace_noise_patterns: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionSection {
    pub column_reorder: Option<bool>,
    pub header_exclusion: Option<f32>,
    pub footer_exclusion: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlossarySection {
    pub table: Option<String>,
    pub book_id: Option<String>,
    pub title: Option<String>,
    pub source: Option<String>,
}

/// Platform config directory path: `<config_dir>/folio/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("folio").join("config.toml"))
}

/// Load config by cascading CWD `.folio.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".folio.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

fn pick<S, T>(overlay: Option<&S>, base: Option<&S>, field: impl Fn(&S) -> Option<T>) -> Option<T> {
    overlay.and_then(&field).or_else(|| base.and_then(&field))
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let (bp, op) = (base.parsing.as_ref(), overlay.parsing.as_ref());
    let (be, oe) = (base.extraction.as_ref(), overlay.extraction.as_ref());
    let (bg, og) = (base.glossary.as_ref(), overlay.glossary.as_ref());

    ConfigFile {
        parsing: Some(ParsingSection {
            marker_pattern: pick(op, bp, |p| p.marker_pattern.clone()),
            page_steps: pick(op, bp, |p| p.page_steps.clone()),
            attribution: pick(op, bp, |p| p.attribution.clone()),
            leading_page: pick(op, bp, |p| p.leading_page),
            min_line_chars: pick(op, bp, |p| p.min_line_chars),
            garbled_min_len: pick(op, bp, |p| p.garbled_min_len),
            min_alpha_ratio: pick(op, bp, |p| p.min_alpha_ratio),
            noise_patterns: pick(op, bp, |p| p.noise_patterns.clone()),
            replace_noise_patterns: pick(op, bp, |p| p.replace_noise_patterns),
        }),
        extraction: Some(ExtractionSection {
            column_reorder: pick(oe, be, |e| e.column_reorder),
            header_exclusion: pick(oe, be, |e| e.header_exclusion),
            footer_exclusion: pick(oe, be, |e| e.footer_exclusion),
        }),
        glossary: Some(GlossarySection {
            table: pick(og, bg, |g| g.table.clone()),
            book_id: pick(og, bg, |g| g.book_id.clone()),
            title: pick(og, bg, |g| g.title.clone()),
            source: pick(og, bg, |g| g.source.clone()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsing_section_round_trip_toml() {
        let config = ConfigFile {
            parsing: Some(ParsingSection {
                page_steps: Some(vec![1, 2, 3]),
                attribution: Some("straddle".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: ConfigFile = toml::from_str(&toml_str).unwrap();
        let parsing = parsed.parsing.unwrap();
        assert_eq!(parsing.page_steps.unwrap(), vec![1, 2, 3]);
        assert_eq!(parsing.attribution.unwrap(), "straddle");
    }

    #[test]
    fn absent_fields_deserialize_as_none() {
        let toml_str = "[extraction]\ncolumn_reorder = false\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        let extraction = parsed.extraction.unwrap();
        assert_eq!(extraction.column_reorder, Some(false));
        assert!(extraction.header_exclusion.is_none());
        assert!(parsed.parsing.is_none());
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ConfigFile {
            glossary: Some(GlossarySection {
                table: Some("base_table".to_string()),
                book_id: Some("base-book".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            glossary: Some(GlossarySection {
                table: Some("overlay_table".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay).glossary.unwrap();
        assert_eq!(merged.table.unwrap(), "overlay_table");
        assert_eq!(merged.book_id.unwrap(), "base-book");
    }

    #[test]
    fn merge_base_preserved_when_overlay_absent() {
        let base = ConfigFile {
            parsing: Some(ParsingSection {
                min_alpha_ratio: Some(0.5),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, ConfigFile::default());
        assert_eq!(merged.parsing.unwrap().min_alpha_ratio, Some(0.5));
    }

    #[test]
    fn load_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[parsing]\nleading_page = 0\n").unwrap();
        let config = load_from_path(&path).unwrap();
        assert_eq!(config.parsing.unwrap().leading_page, Some(0));
    }

    #[test]
    fn load_from_path_missing_or_invalid_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from_path(&dir.path().join("absent.toml")).is_none());
        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "this is = = not toml").unwrap();
        assert!(load_from_path(&bad).is_none());
    }
}
