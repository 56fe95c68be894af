//! Face discovery through fontdb: installed system fonts and uploaded files.

use ab_glyph::{FontArc, FontVec};
use fontdb::{Database, Family, Query, Stretch, Style, Weight};

use super::{Face, RegisteredFace};

/// Metric-compatible stand-ins tried when a built-in family is not installed.
pub(super) fn substitutes(family: &str) -> &'static [&'static str] {
    match family {
        "Arial" => &["Liberation Sans", "Arimo"],
        "Times New Roman" => &["Liberation Serif", "Tinos"],
        "Courier New" => &["Liberation Mono", "Cousine"],
        _ => &[],
    }
}

fn load_face(db: &Database, id: fontdb::ID) -> Option<RegisteredFace> {
    let info = db.face(id)?;
    let weight = info.weight.0;
    let italic = !matches!(info.style, Style::Normal);

    let font = db
        .with_face_data(id, |data, index| {
            FontVec::try_from_vec_and_index(data.to_vec(), index).ok()
        })
        .flatten()?;

    Some(RegisteredFace {
        weight,
        italic,
        face: Face::Outline(FontArc::new(font)),
    })
}

/// Regular, bold, italic and bold-italic faces of `family` from `db`.
pub(super) fn query_family(db: &Database, family: &str) -> Vec<RegisteredFace> {
    let mut seen = Vec::new();
    let mut faces = Vec::new();

    for (weight, style) in [
        (400, Style::Normal),
        (700, Style::Normal),
        (400, Style::Italic),
        (700, Style::Italic),
    ] {
        let families = [Family::Name(family)];
        let query = Query {
            families: &families,
            weight: Weight(weight),
            stretch: Stretch::Normal,
            style,
        };

        if let Some(id) = db.query(&query) {
            if seen.contains(&id) {
                continue;
            }
            seen.push(id);
            if let Some(face) = load_face(db, id) {
                faces.push(face);
            }
        }
    }

    faces
}

/// Parse every face in a font file or collection.
pub(super) fn faces_from_bytes(bytes: Vec<u8>) -> Vec<RegisteredFace> {
    let mut db = Database::new();
    db.load_font_data(bytes);

    let ids: Vec<fontdb::ID> = db.faces().map(|info| info.id).collect();
    ids.into_iter().filter_map(|id| load_face(&db, id)).collect()
}

pub(super) fn system_database() -> Database {
    let mut db = Database::new();
    db.load_system_fonts();
    db
}
