use std::path::{Path, PathBuf};

/// System fonts with CJK coverage, in preference order. Single-font files only.
const SYSTEM_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/noto/NotoSansJP-Regular.ttf",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJKjp-Regular.otf",
    "/usr/share/fonts/opentype/noto/NotoSansCJKjp-Regular.otf",
    "/usr/share/fonts/opentype/ipafont-gothic/ipag.ttf",
    "/usr/share/fonts/truetype/fonts-japanese-gothic.ttf",
    "/usr/share/fonts/truetype/takao-gothic/TakaoPGothic.ttf",
    "/Library/Fonts/Arial Unicode.ttf",
    "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
    "C:\\Windows\\Fonts\\ipag.ttf",
];

/// File names looked up in the user's font directory.
const USER_FONT_NAMES: &[&str] = &["NotoSansJP-Regular.ttf", "NotoSansCJKjp-Regular.otf", "ipag.ttf"];

/// Every candidate path, system locations first and then the user font directory.
pub fn default_candidates() -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = SYSTEM_CANDIDATES.iter().map(PathBuf::from).collect();
    if let Some(dir) = dirs::font_dir() {
        candidates.extend(USER_FONT_NAMES.iter().map(|name| dir.join(name)));
    }
    candidates
}

/// Candidates that exist on disk and hold a single embeddable face, preserving order.
pub fn existing(candidates: &[PathBuf]) -> Vec<&Path> {
    candidates
        .iter()
        .map(PathBuf::as_path)
        .filter(|p| !is_collection(p) && p.is_file())
        .collect()
}

/// `.ttc`/`.otc` collections bundle several faces; printpdf would embed the whole file.
pub fn is_collection(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("ttc") || ext.eq_ignore_ascii_case("otc"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_existing_filters_missing_paths() {
        let temp = TempDir::new().unwrap();
        let present = temp.path().join("font.ttf");
        std::fs::write(&present, b"not really a font").unwrap();

        let candidates = vec![temp.path().join("missing.ttf"), present.clone()];
        assert_eq!(existing(&candidates), vec![present.as_path()]);
    }

    #[test]
    fn test_existing_skips_font_collections() {
        let temp = TempDir::new().unwrap();
        let collection = temp.path().join("NotoSansCJK-Regular.ttc");
        let upper = temp.path().join("MSGOTHIC.TTC");
        let single = temp.path().join("ipag.ttf");
        for path in [&collection, &upper, &single] {
            std::fs::write(path, b"font bytes").unwrap();
        }

        let candidates = vec![collection, upper, single.clone()];
        assert_eq!(existing(&candidates), vec![single.as_path()]);
    }

    #[test]
    fn test_default_candidates_are_single_fonts() {
        let candidates = default_candidates();
        assert!(candidates.len() >= SYSTEM_CANDIDATES.len());
        assert!(candidates.iter().all(|p| !is_collection(p)));
    }
}
