use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use usvg::fontdb;

pub const DEFAULT_BOLD_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf";
pub const DEFAULT_REGULAR_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";
/// Generic family appended after the resolved family in text markup.
pub const FALLBACK_FAMILY: &str = "sans-serif";
/// Family of the face compiled into the binary.
pub const BUNDLED_FAMILY: &str = "DejaVu Sans";

static BUNDLED_FONT: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");

/// Preferred font files. Both must load for the preferred set to be used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontSources {
    pub bold: PathBuf,
    pub regular: PathBuf,
}

impl Default for FontSources {
    fn default() -> Self {
        Self {
            bold: PathBuf::from(DEFAULT_BOLD_FONT),
            regular: PathBuf::from(DEFAULT_REGULAR_FONT),
        }
    }
}

impl FontSources {
    /// Look for `DejaVuSans-Bold.ttf` and `DejaVuSans.ttf` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            bold: dir.join("DejaVuSans-Bold.ttf"),
            regular: dir.join("DejaVuSans.ttf"),
        }
    }
}

/// Pixel sizes of the text roles used on a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontSizes {
    pub header: f32,
    pub body: f32,
    pub small: f32,
    pub banner: f32,
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            header: 24.0,
            body: 16.0,
            small: 12.0,
            banner: 36.0,
        }
    }
}

/// Fonts resolved for rasterizing frame text.
#[derive(Clone)]
pub struct FontSet {
    db: Arc<fontdb::Database>,
    family: String,
    fallback: bool,
    pub sizes: FontSizes,
}

impl FontSet {
    /// Best-effort load: any failure to read the preferred files yields [`FontSet::fallback`].
    pub fn load(sources: &FontSources) -> Self {
        match load_preferred(sources) {
            Ok((db, family)) => {
                tracing::debug!(%family, faces = db.len(), "loaded preferred fonts");
                Self {
                    db: Arc::new(db),
                    family,
                    fallback: false,
                    sizes: FontSizes::default(),
                }
            }
            Err(err) => {
                tracing::warn!("preferred fonts unavailable, using default font: {err:#}");
                Self::fallback()
            }
        }
    }

    /// The bundled face, plus whatever system fonts exist for glyph coverage. Never fails and
    /// always has at least one face, so text is drawn on hosts without any installed fonts.
    pub fn fallback() -> Self {
        let mut db = fontdb::Database::new();
        load_bundled(&mut db);
        let family = db
            .faces()
            .find_map(|face| face.families.first().map(|(name, _)| name.clone()))
            .unwrap_or_else(|| BUNDLED_FAMILY.to_string());
        db.load_system_fonts();
        db.set_sans_serif_family(family.clone());
        Self {
            db: Arc::new(db),
            family,
            fallback: true,
            sizes: FontSizes::default(),
        }
    }

    /// Font set with no faces at all. Text is not drawn; useful when only shapes matter.
    pub fn empty() -> Self {
        Self {
            db: Arc::new(fontdb::Database::new()),
            family: FALLBACK_FAMILY.to_string(),
            fallback: true,
            sizes: FontSizes::default(),
        }
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    pub fn fontdb(&self) -> Arc<fontdb::Database> {
        Arc::clone(&self.db)
    }
}

impl std::fmt::Debug for FontSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSet")
            .field("family", &self.family)
            .field("fallback", &self.fallback)
            .field("faces", &self.db.len())
            .field("sizes", &self.sizes)
            .finish()
    }
}

fn load_preferred(sources: &FontSources) -> anyhow::Result<(fontdb::Database, String)> {
    let mut db = fontdb::Database::new();
    for path in [&sources.bold, &sources.regular] {
        let before = db.len();
        db.load_font_file(path)
            .with_context(|| format!("load font '{}'", path.display()))?;
        if db.len() == before {
            anyhow::bail!("no usable font faces in '{}'", path.display());
        }
    }

    let family = db
        .faces()
        .find_map(|face| face.families.first().map(|(name, _)| name.clone()))
        .context("loaded fonts carry no family name")?;

    // Last resort for glyphs the preferred files lack.
    load_bundled(&mut db);
    db.set_sans_serif_family(BUNDLED_FAMILY);
    Ok((db, family))
}

fn load_bundled(db: &mut fontdb::Database) {
    db.load_font_data(BUNDLED_FONT.to_vec());
}

/// Resolver that prefers the requested families, then sans-serif, then any face at all.
pub(crate) fn font_resolver() -> usvg::FontResolver<'static> {
    usvg::FontResolver {
        select_font: Box::new(|font, db| {
            let mut families = Vec::<fontdb::Family<'_>>::new();
            for family in font.families() {
                families.push(match family {
                    usvg::FontFamily::Serif => fontdb::Family::Serif,
                    usvg::FontFamily::SansSerif => fontdb::Family::SansSerif,
                    usvg::FontFamily::Cursive => fontdb::Family::Cursive,
                    usvg::FontFamily::Fantasy => fontdb::Family::Fantasy,
                    usvg::FontFamily::Monospace => fontdb::Family::Monospace,
                    usvg::FontFamily::Named(s) => fontdb::Family::Name(s),
                });
            }
            families.push(fontdb::Family::SansSerif);

            let style = match font.style() {
                usvg::FontStyle::Normal => fontdb::Style::Normal,
                usvg::FontStyle::Italic => fontdb::Style::Italic,
                usvg::FontStyle::Oblique => fontdb::Style::Oblique,
            };

            let query = fontdb::Query {
                families: &families,
                weight: fontdb::Weight(font.weight()),
                stretch: fontdb::Stretch::Normal,
                style,
            };

            db.query(&query).or_else(|| db.faces().next().map(|f| f.id))
        }),
        select_fallback: usvg::FontResolver::default_fallback_selector(),
    }
}
