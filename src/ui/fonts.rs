use std::fs;
use std::sync::Arc;

use eframe::egui;

/// egui's bundled fonts have no CJK glyphs.
const CJK_FONT_CANDIDATES: &[&str] = &[
    // Linux
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    "/usr/share/fonts/wenquanyi/wqy-microhei/wqy-microhei.ttc",
    // macOS
    "/System/Library/Fonts/PingFang.ttc",
    "/System/Library/Fonts/STHeiti Medium.ttc",
    "/Library/Fonts/Arial Unicode.ttf",
    // Windows
    "C:\\Windows\\Fonts\\msyh.ttc",
    "C:\\Windows\\Fonts\\simhei.ttf",
];

const FONT_ENV: &str = "EARTH_ONLINE_FONT";

/// Appends the first CJK font found as a fallback for every family.
pub fn install_cjk_font(ctx: &egui::Context) {
    let override_path = std::env::var(FONT_ENV).ok();
    let candidates = override_path
        .as_deref()
        .into_iter()
        .chain(CJK_FONT_CANDIDATES.iter().copied());

    for path in candidates {
        let Ok(bytes) = fs::read(path) else {
            continue;
        };

        let mut fonts = egui::FontDefinitions::default();
        fonts
            .font_data
            .insert("cjk".to_owned(), Arc::new(egui::FontData::from_owned(bytes)));

        for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
            fonts.families.entry(family).or_default().push("cjk".to_owned());
        }

        ctx.set_fonts(fonts);
        tracing::info!(path, "loaded CJK font");
        return;
    }

    tracing::warn!("no CJK font found; set {FONT_ENV} to a .ttf/.ttc path");
}
